// src/db/period_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::unique_violation, error::AppError},
    models::periods::{CreatePeriodPayload, CreateUnitPayload, HistoricalPeriod, OrganizationalUnit},
};

const PERIOD_COLUMNS: &str =
    "id, organization_id, name, start_date, end_date, legal_act, description, created_at";

const UNIT_COLUMNS: &str =
    "id, organization_id, period_id, code, name, hierarchy_level, parent_id, active, created_at";

#[derive(Clone, Default)]
pub struct PeriodRepository;

impl PeriodRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  PERÍODOS HISTÓRICOS
    // =========================================================================

    /// Ordem estável: é a ordem que o buscador de períodos recebe.
    pub async fn list_periods<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<HistoricalPeriod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let periods = sqlx::query_as::<_, HistoricalPeriod>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM historical_periods
             WHERE organization_id = $1
             ORDER BY start_date ASC, created_at ASC"
        ))
        .bind(organization_id)
        .fetch_all(executor)
        .await?;

        Ok(periods)
    }

    pub async fn find_period<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        period_id: Uuid,
    ) -> Result<Option<HistoricalPeriod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let period = sqlx::query_as::<_, HistoricalPeriod>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM historical_periods
             WHERE organization_id = $1 AND id = $2"
        ))
        .bind(organization_id)
        .bind(period_id)
        .fetch_optional(executor)
        .await?;

        Ok(period)
    }

    pub async fn create_period<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &CreatePeriodPayload,
    ) -> Result<HistoricalPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let period = sqlx::query_as::<_, HistoricalPeriod>(&format!(
            "INSERT INTO historical_periods (organization_id, name, start_date, end_date, legal_act, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PERIOD_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(payload.name.trim())
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.legal_act.as_deref())
        .bind(payload.description.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(period)
    }

    /// Serializa criações de período da mesma organização até o fim da transação.
    pub async fn lock_periods<'e, E>(&self, executor: E, organization_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(organization_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// As dependências do período caem junto (ON DELETE CASCADE).
    pub async fn delete_period<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        period_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM historical_periods WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(period_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  DEPENDÊNCIAS
    // =========================================================================

    pub async fn list_units<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        period_id: Option<Uuid>,
    ) -> Result<Vec<OrganizationalUnit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let units = sqlx::query_as::<_, OrganizationalUnit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM organizational_units
             WHERE organization_id = $1
               AND ($2::uuid IS NULL OR period_id = $2)
             ORDER BY code ASC"
        ))
        .bind(organization_id)
        .bind(period_id)
        .fetch_all(executor)
        .await?;

        Ok(units)
    }

    pub async fn find_unit<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Option<OrganizationalUnit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, OrganizationalUnit>(&format!(
            "SELECT {UNIT_COLUMNS} FROM organizational_units
             WHERE organization_id = $1 AND id = $2"
        ))
        .bind(organization_id)
        .bind(unit_id)
        .fetch_optional(executor)
        .await?;

        Ok(unit)
    }

    pub async fn create_unit<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &CreateUnitPayload,
    ) -> Result<OrganizationalUnit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let code = payload.code.trim();

        let unit = sqlx::query_as::<_, OrganizationalUnit>(&format!(
            "INSERT INTO organizational_units
                (organization_id, period_id, code, name, hierarchy_level, parent_id, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {UNIT_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(payload.period_id)
        .bind(code)
        .bind(payload.name.trim())
        .bind(payload.hierarchy_level)
        .bind(payload.parent_id)
        .bind(payload.active)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Tratamento de erro de chave duplicada
            if unique_violation(&e) == Some("organizational_units_code_key") {
                return AppError::UnitCodeAlreadyExists(code.to_string());
            }
            e.into()
        })?;

        Ok(unit)
    }

    pub async fn delete_unit<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        unit_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM organizational_units WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(unit_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
