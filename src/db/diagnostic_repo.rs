// src/db/diagnostic_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    domain::diagnostic::DiagnosticForm,
    models::diagnostic::DiagnosticRow,
};

const DIAGNOSTIC_COLUMNS: &str = "organization_id, institutional_history, previous_structures, \
    boxes, loose_folders, volumes, other_units, physical_condition, temperature, humidity, \
    infrastructure_notes, proposed_classification, observations, updated_at";

#[derive(Clone, Default)]
pub struct DiagnosticRepository;

impl DiagnosticRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Option<DiagnosticRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DiagnosticRow>(&format!(
            "SELECT {DIAGNOSTIC_COLUMNS} FROM diagnostics WHERE organization_id = $1"
        ))
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    /// Serializa as edições do diagnóstico da organização até o fim da
    /// transação. Vale também quando a linha ainda não existe.
    pub async fn lock<'e, E>(&self, executor: E, organization_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended('diagnostic:' || $1::text, 0))")
            .bind(organization_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Só o estado do formulário é gravado; metros lineares são sempre recalculados.
    pub async fn save<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        form: &DiagnosticForm,
    ) -> Result<DiagnosticRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let row = sqlx::query_as::<_, DiagnosticRow>(&format!(
            "INSERT INTO diagnostics (
                organization_id, institutional_history, previous_structures,
                boxes, loose_folders, volumes, other_units,
                physical_condition, temperature, humidity, infrastructure_notes,
                proposed_classification, observations
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             ON CONFLICT (organization_id)
             DO UPDATE SET
                institutional_history = EXCLUDED.institutional_history,
                previous_structures = EXCLUDED.previous_structures,
                boxes = EXCLUDED.boxes,
                loose_folders = EXCLUDED.loose_folders,
                volumes = EXCLUDED.volumes,
                other_units = EXCLUDED.other_units,
                physical_condition = EXCLUDED.physical_condition,
                temperature = EXCLUDED.temperature,
                humidity = EXCLUDED.humidity,
                infrastructure_notes = EXCLUDED.infrastructure_notes,
                proposed_classification = EXCLUDED.proposed_classification,
                observations = EXCLUDED.observations,
                updated_at = NOW()
             RETURNING {DIAGNOSTIC_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(&form.institutional_history)
        .bind(&form.previous_structures)
        .bind(i64::from(form.counts.boxes))
        .bind(i64::from(form.counts.loose_folders))
        .bind(i64::from(form.counts.volumes))
        .bind(i64::from(form.counts.other))
        .bind(&form.infrastructure.physical_condition)
        .bind(&form.infrastructure.temperature)
        .bind(&form.infrastructure.humidity)
        .bind(&form.infrastructure.notes)
        .bind(&form.proposed_classification)
        .bind(&form.observations)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }
}
