// src/db/retention_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::retention::{
        RetentionSchedule, RetentionScheduleItem, ScheduleItemInput, ValuationItemInput,
        ValuationTableItem,
    },
};

const SCHEDULE_COLUMNS: &str = "id, organization_id, name, version, active, created_at, updated_at";

const ITEM_COLUMNS: &str = "i.id, i.schedule_id, i.position, i.series_code, i.series_name, \
    i.subseries_code, i.subseries_name, i.office_retention_years, i.central_retention_years, \
    i.final_disposition, i.procedure, i.observations";

const VALUATION_COLUMNS: &str = "id, organization_id, organizational_unit_id, position, series, \
    subseries, administrative_value, legal_value, fiscal_value, accounting_value, technical_value, \
    historical_value, office_retention_years, central_retention_years, final_disposition, observations";

#[derive(Clone, Default)]
pub struct RetentionRepository;

impl RetentionRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  TRD
    // =========================================================================

    pub async fn find_active_schedule<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Option<RetentionSchedule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, RetentionSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM retention_schedules
             WHERE organization_id = $1 AND active"
        ))
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;

        Ok(schedule)
    }

    pub async fn list_schedule_items<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
    ) -> Result<Vec<RetentionScheduleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, RetentionScheduleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM retention_schedule_items i
             WHERE i.schedule_id = $1
             ORDER BY i.position ASC"
        ))
        .bind(schedule_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Itens da TRD vigente (lista vazia se a organização ainda não tem TRD).
    pub async fn list_active_items<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<RetentionScheduleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, RetentionScheduleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM retention_schedule_items i
             JOIN retention_schedules s ON s.id = i.schedule_id
             WHERE s.organization_id = $1 AND s.active
             ORDER BY i.position ASC"
        ))
        .bind(organization_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    pub async fn find_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<RetentionScheduleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, RetentionScheduleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM retention_schedule_items i
             JOIN retention_schedules s ON s.id = i.schedule_id
             WHERE s.organization_id = $1 AND i.id = $2"
        ))
        .bind(organization_id)
        .bind(item_id)
        .fetch_optional(executor)
        .await?;

        Ok(item)
    }

    pub async fn create_schedule<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        name: &str,
    ) -> Result<RetentionSchedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, RetentionSchedule>(&format!(
            "INSERT INTO retention_schedules (organization_id, name, version, active)
             VALUES ($1, $2, 1, TRUE)
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(schedule)
    }

    // Nova versão da mesma TRD: renomeia e incrementa a versão
    pub async fn bump_schedule<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        schedule_id: Uuid,
        name: &str,
    ) -> Result<RetentionSchedule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let schedule = sqlx::query_as::<_, RetentionSchedule>(&format!(
            "UPDATE retention_schedules
             SET name = $3, version = version + 1, updated_at = NOW()
             WHERE organization_id = $1 AND id = $2
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(schedule_id)
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(schedule)
    }

    /// Remove os itens que saíram da TRD. Documentos e expedientes que
    /// apontavam para eles ficam sem o vínculo (ON DELETE SET NULL).
    pub async fn delete_schedule_items_except<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
        keep: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM retention_schedule_items
             WHERE schedule_id = $1 AND NOT (id = ANY($2))",
        )
        .bind(schedule_id)
        .bind(keep)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    // Atualiza no lugar: o id continua o mesmo para quem já o referencia
    pub async fn update_schedule_item<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
        item_id: Uuid,
        position: i32,
        input: &ScheduleItemInput,
    ) -> Result<RetentionScheduleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, RetentionScheduleItem>(
            "UPDATE retention_schedule_items
             SET position = $3, series_code = $4, series_name = $5, subseries_code = $6,
                 subseries_name = $7, office_retention_years = $8, central_retention_years = $9,
                 final_disposition = $10, procedure = $11, observations = $12
             WHERE schedule_id = $1 AND id = $2
             RETURNING id, schedule_id, position, series_code, series_name, subseries_code,
                subseries_name, office_retention_years, central_retention_years,
                final_disposition, procedure, observations",
        )
        .bind(schedule_id)
        .bind(item_id)
        .bind(position)
        .bind(input.series_code.trim())
        .bind(input.series_name.trim())
        .bind(input.subseries_code.as_deref().map(str::trim))
        .bind(input.subseries_name.as_deref())
        .bind(input.office_retention_years)
        .bind(input.central_retention_years)
        .bind(input.final_disposition)
        .bind(input.procedure.as_deref())
        .bind(input.observations.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn insert_schedule_item<'e, E>(
        &self,
        executor: E,
        schedule_id: Uuid,
        position: i32,
        input: &ScheduleItemInput,
    ) -> Result<RetentionScheduleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, RetentionScheduleItem>(
            "INSERT INTO retention_schedule_items (
                schedule_id, position, series_code, series_name, subseries_code, subseries_name,
                office_retention_years, central_retention_years, final_disposition, procedure, observations
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id, schedule_id, position, series_code, series_name, subseries_code,
                subseries_name, office_retention_years, central_retention_years,
                final_disposition, procedure, observations",
        )
        .bind(schedule_id)
        .bind(position)
        .bind(input.series_code.trim())
        .bind(input.series_name.trim())
        .bind(input.subseries_code.as_deref().map(str::trim))
        .bind(input.subseries_name.as_deref())
        .bind(input.office_retention_years)
        .bind(input.central_retention_years)
        .bind(input.final_disposition)
        .bind(input.procedure.as_deref())
        .bind(input.observations.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    // =========================================================================
    //  TVD
    // =========================================================================

    pub async fn list_valuation_items<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<ValuationTableItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ValuationTableItem>(&format!(
            "SELECT {VALUATION_COLUMNS} FROM valuation_table_items
             WHERE organization_id = $1
             ORDER BY position ASC"
        ))
        .bind(organization_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    pub async fn delete_valuation_items<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM valuation_table_items WHERE organization_id = $1")
            .bind(organization_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn insert_valuation_item<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        position: i32,
        input: &ValuationItemInput,
    ) -> Result<ValuationTableItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ValuationTableItem>(&format!(
            "INSERT INTO valuation_table_items (
                organization_id, organizational_unit_id, position, series, subseries,
                administrative_value, legal_value, fiscal_value, accounting_value,
                technical_value, historical_value, office_retention_years,
                central_retention_years, final_disposition, observations
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {VALUATION_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(input.organizational_unit_id)
        .bind(position)
        .bind(input.series.trim())
        .bind(input.subseries.as_deref())
        .bind(input.administrative_value)
        .bind(input.legal_value)
        .bind(input.fiscal_value)
        .bind(input.accounting_value)
        .bind(input.technical_value)
        .bind(input.historical_value)
        .bind(input.office_retention_years)
        .bind(input.central_retention_years)
        .bind(input.final_disposition)
        .bind(input.observations.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(item)
    }
}
