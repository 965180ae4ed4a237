// src/db/filing_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::unique_violation, error::AppError},
    models::{
        filing::{
            CaseFile, CaseFileSummary, CreateCaseFilePayload, Document, FileDocumentPayload,
            LinkDocumentPayload, LinkedDocument,
        },
        retention::RetentionScheduleItem,
    },
};

const DOCUMENT_COLUMNS: &str = "d.id, d.organization_id, d.filing_number, d.filed_at, d.document_type, \
    d.subject, d.description, d.sender, d.recipient, d.is_digital, d.physical_location, \
    d.file_name, d.mime_type, d.file_size, d.file_path, d.retention_item_id, d.series_code, d.series_name";

const CASE_FILE_COLUMNS: &str = "c.id, c.organization_id, c.code, c.title, c.description, c.status, \
    c.retention_item_id, c.series_code, c.series_name, c.subseries_name, c.opened_at, c.closed_at";

#[derive(Clone, Default)]
pub struct FilingRepository;

impl FilingRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  RADICAÇÃO
    // =========================================================================

    /// Próximo número da sequência anual. O UPSERT trava a linha do contador,
    /// então duas radicações simultâneas nunca recebem o mesmo número.
    pub async fn next_filing_sequence<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        year: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (value,): (i32,) = sqlx::query_as(
            "INSERT INTO filing_counters (organization_id, year, last_value)
             VALUES ($1, $2, 1)
             ON CONFLICT (organization_id, year)
             DO UPDATE SET last_value = filing_counters.last_value + 1
             RETURNING last_value",
        )
        .bind(organization_id)
        .bind(year)
        .fetch_one(executor)
        .await?;

        Ok(value)
    }

    pub async fn create_document<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        filing_number: &str,
        payload: &FileDocumentPayload,
        retention_item: Option<&RetentionScheduleItem>,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(&format!(
            "INSERT INTO documents AS d (
                organization_id, filing_number, document_type, subject, description,
                sender, recipient, is_digital, physical_location,
                file_name, mime_type, file_size, file_path,
                retention_item_id, series_code, series_name
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(filing_number)
        .bind(payload.document_type.trim())
        .bind(payload.subject.trim())
        .bind(payload.description.as_deref())
        .bind(payload.sender.as_deref())
        .bind(payload.recipient.as_deref())
        .bind(payload.stored_digitally())
        .bind(payload.physical_location.as_deref())
        .bind(payload.file_name.as_deref())
        .bind(payload.mime_type.as_deref())
        .bind(payload.file_size)
        .bind(payload.file_path.as_deref())
        .bind(retention_item.map(|item| item.id))
        .bind(retention_item.map(|item| item.series_code.as_str()))
        .bind(retention_item.map(|item| item.series_name.as_str()))
        .fetch_one(executor)
        .await?;

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
        let documents = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents d
             WHERE d.organization_id = $1
             ORDER BY d.filed_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(executor)
        .await?;

        Ok(documents)
    }

    pub async fn find_document<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents d
             WHERE d.organization_id = $1 AND d.id = $2"
        ))
        .bind(organization_id)
        .bind(document_id)
        .fetch_optional(executor)
        .await?;

        Ok(document)
    }

    // =========================================================================
    //  EXPEDIENTES
    // =========================================================================

    pub async fn create_case_file<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &CreateCaseFilePayload,
        retention_item: Option<&RetentionScheduleItem>,
    ) -> Result<CaseFile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let code = payload.code.trim();

        let case_file = sqlx::query_as::<_, CaseFile>(&format!(
            "INSERT INTO case_files AS c (
                organization_id, code, title, description, retention_item_id,
                series_code, series_name, subseries_name
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {CASE_FILE_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(code)
        .bind(payload.title.trim())
        .bind(payload.description.as_deref())
        .bind(retention_item.map(|item| item.id))
        .bind(retention_item.map(|item| item.series_code.as_str()))
        .bind(retention_item.map(|item| item.series_name.as_str()))
        .bind(retention_item.and_then(|item| item.subseries_name.as_deref()))
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if unique_violation(&e) == Some("case_files_code_key") {
                return AppError::CaseFileCodeAlreadyExists(code.to_string());
            }
            e.into()
        })?;

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
        let case_files = sqlx::query_as::<_, CaseFileSummary>(&format!(
            "SELECT {CASE_FILE_COLUMNS}, COUNT(cd.document_id) AS document_count
             FROM case_files c
             LEFT JOIN case_file_documents cd ON cd.case_file_id = c.id
             WHERE c.organization_id = $1
             GROUP BY c.id
             ORDER BY c.opened_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(executor)
        .await?;

        Ok(case_files)
    }

    /// `for_update` trava a linha até o fim da transação (vínculo x fechamento).
    pub async fn find_case_file<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        case_file_id: Uuid,
        for_update: bool,
    ) -> Result<Option<CaseFile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lock = if for_update { " FOR UPDATE" } else { "" };

        let case_file = sqlx::query_as::<_, CaseFile>(&format!(
            "SELECT {CASE_FILE_COLUMNS} FROM case_files c
             WHERE c.organization_id = $1 AND c.id = $2{lock}"
        ))
        .bind(organization_id)
        .bind(case_file_id)
        .fetch_optional(executor)
        .await?;

        Ok(case_file)
    }

    pub async fn list_linked_documents<'e, E>(
        &self,
        executor: E,
        case_file_id: Uuid,
    ) -> Result<Vec<LinkedDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, LinkedDocument>(&format!(
            "SELECT {DOCUMENT_COLUMNS}, cd.linked_at, cd.folio_start, cd.folio_end
             FROM case_file_documents cd
             JOIN documents d ON d.id = cd.document_id
             WHERE cd.case_file_id = $1
             ORDER BY cd.linked_at ASC"
        ))
        .bind(case_file_id)
        .fetch_all(executor)
        .await?;

        Ok(documents)
    }

    pub async fn link_document<'e, E>(
        &self,
        executor: E,
        case_file_id: Uuid,
        payload: &LinkDocumentPayload,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO case_file_documents (case_file_id, document_id, folio_start, folio_end)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(case_file_id)
        .bind(payload.document_id)
        .bind(payload.folio_start)
        .bind(payload.folio_end)
        .execute(executor)
        .await
        .map_err(|e| {
            if unique_violation(&e) == Some("case_file_documents_pkey") {
                return AppError::DocumentAlreadyLinked;
            }
            AppError::from(e)
        })?;

        Ok(())
    }

    /// Fecha só expedientes abertos; `None` se não havia o que fechar.
    pub async fn close_case_file<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        case_file_id: Uuid,
    ) -> Result<Option<CaseFile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case_file = sqlx::query_as::<_, CaseFile>(&format!(
            "UPDATE case_files AS c
             SET status = 'CLOSED', closed_at = NOW()
             WHERE c.organization_id = $1 AND c.id = $2 AND c.status = 'OPEN'
             RETURNING {CASE_FILE_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(case_file_id)
        .fetch_optional(executor)
        .await?;

        Ok(case_file)
    }
}
