// src/services/filing_service.rs

use chrono::{Datelike, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{FilingRepository, RetentionRepository},
    models::{
        filing::{
            CaseFile, CaseFileDetail, CaseFileStatus, CaseFileSummary, CreateCaseFilePayload, Document,
            FileDocumentPayload, LinkDocumentPayload,
        },
        retention::RetentionScheduleItem,
    },
};

/// Número de radicação: `RAD-2025-000042`.
pub fn format_filing_number(year: i32, sequence: i32) -> String {
    format!("RAD-{year}-{sequence:06}")
}

#[derive(Clone)]
pub struct FilingService {
    filing_repo: FilingRepository,
    retention_repo: RetentionRepository,
}

impl FilingService {
    pub fn new(filing_repo: FilingRepository, retention_repo: RetentionRepository) -> Self {
        Self { filing_repo, retention_repo }
    }

    async fn retention_item(
        &self,
        conn: &mut sqlx::PgConnection,
        organization_id: Uuid,
        item_id: Option<Uuid>,
    ) -> Result<Option<RetentionScheduleItem>, AppError> {
        let Some(item_id) = item_id else {
            return Ok(None);
        };

        let item = self
            .retention_repo
            .find_item(conn, organization_id, item_id)
            .await?
            .ok_or(AppError::ResourceNotFound("retention_item"))?;
        Ok(Some(item))
    }

    // =========================================================================
    //  1. RADICAÇÃO
    // =========================================================================

    pub async fn file_document<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &FileDocumentPayload,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        payload.validate()?;

        let mut tx = executor.begin().await?;

        let item = self
            .retention_item(&mut *tx, organization_id, payload.retention_item_id)
            .await?;

        // O contador é por ano; a linha fica travada até o commit
        let year = Utc::now().year();
        let sequence = self
            .filing_repo
            .next_filing_sequence(&mut *tx, organization_id, year)
            .await?;
        let filing_number = format_filing_number(year, sequence);

        let document = self
            .filing_repo
            .create_document(&mut *tx, organization_id, &filing_number, payload, item.as_ref())
            .await?;

        tx.commit().await?;

        tracing::info!("📨 Documento radicado: {}", document.filing_number);
        Ok(document)
    }

    pub async fn list_documents<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.filing_repo.list_documents(executor, organization_id).await
    }

    // =========================================================================
    //  2. EXPEDIENTES
    // =========================================================================

    pub async fn create_case_file<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &CreateCaseFilePayload,
    ) -> Result<CaseFile, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        payload.validate()?;

        let mut tx = executor.begin().await?;

        let item = self
            .retention_item(&mut *tx, organization_id, payload.retention_item_id)
            .await?;

        let case_file = self
            .filing_repo
            .create_case_file(&mut *tx, organization_id, payload, item.as_ref())
            .await?;

        tx.commit().await?;
        Ok(case_file)
    }

    pub async fn list_case_files<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<CaseFileSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.filing_repo.list_case_files(executor, organization_id).await
    }

    pub async fn get_case_file<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        case_file_id: Uuid,
    ) -> Result<CaseFileDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let case_file = self
            .filing_repo
            .find_case_file(&mut *tx, organization_id, case_file_id, false)
            .await?
            .ok_or(AppError::ResourceNotFound("case_file"))?;

        let documents = self.filing_repo.list_linked_documents(&mut *tx, case_file.id).await?;

        Ok(CaseFileDetail { case_file, documents })
    }

    /// Só expedientes abertos recebem documentos.
    pub async fn link_document<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        case_file_id: Uuid,
        payload: &LinkDocumentPayload,
    ) -> Result<CaseFileDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        payload.validate()?;

        let mut tx = executor.begin().await?;

        // FOR UPDATE: um fechamento concorrente espera este vínculo
        let case_file = self
            .filing_repo
            .find_case_file(&mut *tx, organization_id, case_file_id, true)
            .await?
            .ok_or(AppError::ResourceNotFound("case_file"))?;

        if case_file.status == CaseFileStatus::Closed {
            return Err(AppError::CaseFileClosed);
        }

        self.filing_repo
            .find_document(&mut *tx, organization_id, payload.document_id)
            .await?
            .ok_or(AppError::ResourceNotFound("document"))?;

        self.filing_repo.link_document(&mut *tx, case_file.id, payload).await?;
        let documents = self.filing_repo.list_linked_documents(&mut *tx, case_file.id).await?;

        tx.commit().await?;
        Ok(CaseFileDetail { case_file, documents })
    }

    pub async fn close_case_file<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        case_file_id: Uuid,
    ) -> Result<CaseFile, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        if let Some(closed) = self
            .filing_repo
            .close_case_file(&mut *tx, organization_id, case_file_id)
            .await?
        {
            tx.commit().await?;
            tracing::info!("🔒 Expediente {} fechado", closed.code);
            return Ok(closed);
        }

        // Nada foi atualizado: ou não existe, ou já estava fechado
        match self
            .filing_repo
            .find_case_file(&mut *tx, organization_id, case_file_id, false)
            .await?
        {
            Some(_) => Err(AppError::CaseFileClosed),
            None => Err(AppError::ResourceNotFound("case_file")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filing_number_is_zero_padded() {
        assert_eq!(format_filing_number(2025, 42), "RAD-2025-000042");
        assert_eq!(format_filing_number(2025, 1), "RAD-2025-000001");
        assert_eq!(format_filing_number(2026, 1_234_567), "RAD-2026-1234567");
    }
}
