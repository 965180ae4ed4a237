// src/services/period_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PeriodRepository,
    domain::periods::{find_overlap, find_period},
    models::periods::{CreatePeriodPayload, CreateUnitPayload, HistoricalPeriod, OrganizationalUnit},
};

#[derive(Clone)]
pub struct PeriodService {
    repo: PeriodRepository,
}

impl PeriodService {
    pub fn new(repo: PeriodRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  1. PERÍODOS HISTÓRICOS
    // =========================================================================

    pub async fn list_periods<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<HistoricalPeriod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_periods(executor, organization_id).await
    }

    pub async fn get_period<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        period_id: Uuid,
    ) -> Result<HistoricalPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_period(executor, organization_id, period_id)
            .await?
            .ok_or(AppError::ResourceNotFound("period"))
    }

    /// Períodos novos não podem se sobrepor aos existentes.
    pub async fn create_period<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &CreatePeriodPayload,
    ) -> Result<HistoricalPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if payload.start_date > payload.end_date {
            return Err(AppError::InvalidDateRange);
        }

        let mut tx = executor.begin().await?;

        self.repo.lock_periods(&mut *tx, organization_id).await?;
        let existing = self.repo.list_periods(&mut *tx, organization_id).await?;

        if let Some(clash) = find_overlap(payload.start_date, payload.end_date, &existing) {
            return Err(AppError::PeriodOverlap(clash.name.clone()));
        }

        let period = self.repo.create_period(&mut *tx, organization_id, payload).await?;
        tx.commit().await?;

        tracing::info!(
            "📜 Período '{}' criado ({} a {})",
            period.name,
            period.start_date,
            period.end_date
        );
        Ok(period)
    }

    pub async fn delete_period<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        period_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_period(executor, organization_id, period_id).await? {
            return Err(AppError::ResourceNotFound("period"));
        }
        Ok(())
    }

    /// Período histórico vigente em uma data.
    pub async fn lookup<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> Result<HistoricalPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let periods = self.repo.list_periods(executor, organization_id).await?;

        find_period(date, &periods)
            .cloned()
            .ok_or(AppError::NoPeriodForDate(date))
    }

    // =========================================================================
    //  2. DEPENDÊNCIAS
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
        self.repo.list_units(executor, organization_id, period_id).await
    }

    pub async fn create_unit<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &CreateUnitPayload,
    ) -> Result<OrganizationalUnit, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. O período precisa existir
        self.repo
            .find_period(&mut *tx, organization_id, payload.period_id)
            .await?
            .ok_or(AppError::ResourceNotFound("period"))?;

        // 2. A dependência superior, se houver, é do mesmo período
        if let Some(parent_id) = payload.parent_id {
            let parent = self
                .repo
                .find_unit(&mut *tx, organization_id, parent_id)
                .await?
                .ok_or(AppError::ResourceNotFound("unit"))?;

            if parent.period_id != payload.period_id {
                return Err(AppError::ParentUnitMismatch);
            }
        }

        // 3. Salva (código duplicado vira 409 no repositório)
        let unit = self.repo.create_unit(&mut *tx, organization_id, payload).await?;
        tx.commit().await?;

        Ok(unit)
    }

    pub async fn delete_unit<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        unit_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_unit(executor, organization_id, unit_id).await? {
            return Err(AppError::ResourceNotFound("unit"));
        }
        Ok(())
    }
}
