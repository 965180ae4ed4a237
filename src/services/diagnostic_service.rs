// src/services/diagnostic_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DiagnosticRepository,
    domain::diagnostic::{reduce_all, DiagnosticForm, FormAction},
    models::diagnostic::DiagnosticReport,
};

#[derive(Clone)]
pub struct DiagnosticService {
    repo: DiagnosticRepository,
}

impl DiagnosticService {
    pub fn new(repo: DiagnosticRepository) -> Self {
        Self { repo }
    }

    /// Organização sem diagnóstico recebe o formulário vazio.
    pub async fn get_report<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<DiagnosticReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = match self.repo.get(executor, organization_id).await? {
            Some(row) => {
                let updated_at = row.updated_at;
                DiagnosticReport::new(DiagnosticForm::from(row), Some(updated_at))
            }
            None => DiagnosticReport::new(DiagnosticForm::default(), None),
        };

        Ok(report)
    }

    /// Aplica as ações sobre o estado salvo e grava o resultado.
    pub async fn apply_changes<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        changes: Vec<FormAction>,
    ) -> Result<DiagnosticReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Dois PATCH concorrentes: o segundo lê o que o primeiro gravou
        self.repo.lock(&mut *tx, organization_id).await?;

        let current = self
            .repo
            .get(&mut *tx, organization_id)
            .await?
            .map(DiagnosticForm::from)
            .unwrap_or_default();

        let form = reduce_all(current, changes);
        let saved = self.repo.save(&mut *tx, organization_id, &form).await?;

        tx.commit().await?;

        let report = DiagnosticReport::new(DiagnosticForm::from(saved.clone()), Some(saved.updated_at));
        tracing::info!(
            "📏 Diagnóstico atualizado: {} m lineares",
            report.estimate.linear_meters
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // O que o lock garante: o segundo PATCH parte do estado gravado pelo primeiro
    #[test]
    fn serialized_patches_keep_both_changes() {
        let saved = reduce_all(DiagnosticForm::default(), vec![FormAction::Boxes(10)]);
        let saved = reduce_all(saved, vec![FormAction::Humidity("60%".into())]);

        assert_eq!(saved.counts.boxes, 10);
        assert_eq!(saved.infrastructure.humidity, "60%");
    }

    #[test]
    fn report_estimate_follows_the_counts() {
        let form = reduce_all(
            DiagnosticForm::default(),
            vec![FormAction::Boxes(10), FormAction::LooseFolders(50), FormAction::Volumes(2)],
        );
        let report = DiagnosticReport::new(form, None);

        assert_eq!(report.estimate.linear_meters.to_string(), "1.76");
    }
}
