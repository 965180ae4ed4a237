// src/services/inventory_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, PeriodRepository, RetentionRepository},
    domain::{
        periods::find_period,
        valuation::{classify, value_record},
    },
    models::{
        inventory::{InventoryRecord, InventoryRecordInput, InventoryRow},
        periods::{HistoricalPeriod, OrganizationalUnit},
        retention::RetentionScheduleItem,
    },
    services::spreadsheet_service,
};

/// Resolve o período histórico da linha pela data inicial.
///
/// Sem dependência, a linha pode ficar sem período. Com dependência, o
/// período é obrigatório e precisa ser o mesmo da dependência.
pub fn resolve_placement(
    input: &InventoryRecordInput,
    periods: &[HistoricalPeriod],
    unit: Option<&OrganizationalUnit>,
) -> Result<Option<Uuid>, AppError> {
    if input.start_date > input.end_date {
        return Err(AppError::InvalidDateRange);
    }

    let period = find_period(input.start_date, periods);

    match (unit, period) {
        (None, period) => Ok(period.map(|p| p.id)),
        (Some(_), None) => Err(AppError::NoPeriodForDate(input.start_date)),
        (Some(unit), Some(period)) if unit.period_id != period.id => Err(AppError::UnitOutsidePeriod),
        (Some(_), Some(period)) => Ok(Some(period.id)),
    }
}

/// Junta cada registro com a sua valoração e o destaque da linha.
pub fn build_rows(
    records: Vec<InventoryRecord>,
    items: &[RetentionScheduleItem],
    today: NaiveDate,
) -> Vec<InventoryRow> {
    records
        .into_iter()
        .map(|record| {
            let valuation = value_record(&record, items, today);
            let highlight = valuation.as_ref().and_then(|v| classify(v.status.as_str()));
            InventoryRow { record, valuation, highlight }
        })
        .collect()
}

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    period_repo: PeriodRepository,
    retention_repo: RetentionRepository,
}

impl InventoryService {
    pub fn new(
        inventory_repo: InventoryRepository,
        period_repo: PeriodRepository,
        retention_repo: RetentionRepository,
    ) -> Self {
        Self { inventory_repo, period_repo, retention_repo }
    }

    // --- LISTAGEM COM VALORAÇÃO ---
    pub async fn list_rows<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<InventoryRow>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let records = self.inventory_repo.list_records(&mut *tx, organization_id).await?;
        let items = self.retention_repo.list_active_items(&mut *tx, organization_id).await?;

        Ok(build_rows(records, &items, Utc::now().date_naive()))
    }

    // --- CRIAÇÃO (idempotente) ---
    /// Retorna o registro e se ele foi criado agora (`false` = chave repetida).
    pub async fn create_record<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        input: &InventoryRecordInput,
        request_key: Option<&str>,
    ) -> Result<(InventoryRecord, bool), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        input.validate()?;

        let mut tx = executor.begin().await?;

        // 1. Reenvio com a mesma chave: devolve o que já existe
        if let Some(key) = request_key {
            if let Some(existing) = self
                .inventory_repo
                .find_by_request_key(&mut *tx, organization_id, key)
                .await?
            {
                return Ok((existing, false));
            }
        }

        // 2. Período e dependência
        let period_id = self.placement(&mut *tx, organization_id, input).await?;

        // 3. Insere (ON CONFLICT na chave cobre a corrida entre dois envios)
        let created = self
            .inventory_repo
            .create_record(&mut *tx, organization_id, input, period_id, request_key)
            .await?;

        let result = match (created, request_key) {
            (Some(record), _) => (record, true),
            (None, Some(key)) => {
                let existing = self
                    .inventory_repo
                    .find_by_request_key(&mut *tx, organization_id, key)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("Registro da chave '{key}' sumiu"))?;
                (existing, false)
            }
            (None, None) => return Err(anyhow::anyhow!("INSERT sem chave não retornou linha").into()),
        };

        tx.commit().await?;
        Ok(result)
    }

    pub async fn update_record<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
        input: &InventoryRecordInput,
    ) -> Result<InventoryRecord, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        input.validate()?;

        let mut tx = executor.begin().await?;

        let period_id = self.placement(&mut *tx, organization_id, input).await?;

        let record = self
            .inventory_repo
            .update_record(&mut *tx, organization_id, record_id, input, period_id)
            .await?
            .ok_or(AppError::ResourceNotFound("inventory_record"))?;

        tx.commit().await?;
        Ok(record)
    }

    pub async fn delete_record<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.inventory_repo.delete_record(executor, organization_id, record_id).await? {
            return Err(AppError::ResourceNotFound("inventory_record"));
        }
        Ok(())
    }

    async fn placement(
        &self,
        conn: &mut sqlx::PgConnection,
        organization_id: Uuid,
        input: &InventoryRecordInput,
    ) -> Result<Option<Uuid>, AppError> {
        let periods = self.period_repo.list_periods(&mut *conn, organization_id).await?;

        let unit = match input.organizational_unit_id {
            Some(unit_id) => Some(
                self.period_repo
                    .find_unit(&mut *conn, organization_id, unit_id)
                    .await?
                    .ok_or(AppError::ResourceNotFound("unit"))?,
            ),
            None => None,
        };

        resolve_placement(input, &periods, unit.as_ref())
    }

    // --- PLANILHA ---

    /// Cada linha é gravada de forma independente; as que falham voltam
    /// com o número da linha.
    pub async fn import_csv<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        bytes: &[u8],
    ) -> Result<(usize, Vec<(usize, AppError)>), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let rows = spreadsheet_service::parse_inventory_csv(bytes)?;
        let mut tx = executor.begin().await?;

        let mut inserted = 0;
        let mut failed = Vec::new();

        for parsed in rows {
            let outcome = match parsed.input {
                Ok(input) => self.create_record(&mut *tx, organization_id, &input, None).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(_) => inserted += 1,
                Err(e) => failed.push((parsed.row, e)),
            }
        }

        // Cada create_record abre um savepoint; a linha que falha só desfaz o seu
        tx.commit().await?;

        tracing::info!(
            "📥 Importação do inventário: {} linha(s) gravada(s), {} com erro",
            inserted,
            failed.len()
        );
        Ok((inserted, failed))
    }

    pub async fn export_csv<'e, E>(&self, executor: E, organization_id: Uuid) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let rows = self.list_rows(executor, organization_id).await?;
        spreadsheet_service::write_inventory_csv(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::{ConservationUnit, RowHighlight, ValuationStatus};
    use crate::models::retention::FinalDisposition;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate) -> HistoricalPeriod {
        HistoricalPeriod {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            name: "Periodo".into(),
            start_date: start,
            end_date: end,
            legal_act: None,
            description: None,
            created_at: Utc::now(),
        }
    }

    fn unit(period_id: Uuid) -> OrganizationalUnit {
        OrganizationalUnit {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            period_id,
            code: "100".into(),
            name: "Gerencia".into(),
            hierarchy_level: None,
            parent_id: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn input(start: NaiveDate, end: NaiveDate) -> InventoryRecordInput {
        InventoryRecordInput {
            order_number: 1,
            code: "100.2".into(),
            subject: "Contratos".into(),
            start_date: start,
            end_date: end,
            conservation_unit: ConservationUnit::Box,
            box_number: None,
            folder_number: None,
            folio_count: 10,
            organizational_unit_id: None,
            notes: None,
        }
    }

    fn record(code: &str, end: NaiveDate) -> InventoryRecord {
        InventoryRecord {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            order_number: 1,
            code: code.into(),
            subject: "Contratos".into(),
            start_date: date(1980, 1, 1),
            end_date: end,
            conservation_unit: ConservationUnit::Box,
            box_number: None,
            folder_number: None,
            folio_count: 0,
            organizational_unit_id: None,
            historical_period_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn schedule_item(series_code: &str, years: i32) -> RetentionScheduleItem {
        RetentionScheduleItem {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            position: 0,
            series_code: series_code.into(),
            series_name: "Contratos".into(),
            subseries_code: None,
            subseries_name: None,
            office_retention_years: years,
            central_retention_years: 0,
            final_disposition: FinalDisposition::Elimination,
            procedure: None,
            observations: None,
        }
    }

    #[test]
    fn placement_rejects_inverted_dates() {
        let result = resolve_placement(&input(date(1990, 1, 2), date(1990, 1, 1)), &[], None);
        assert!(matches!(result, Err(AppError::InvalidDateRange)));
    }

    #[test]
    fn placement_without_unit_tolerates_missing_period() {
        let result = resolve_placement(&input(date(1990, 1, 1), date(1990, 12, 31)), &[], None);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn placement_with_unit_requires_a_period() {
        let p = period(date(2000, 1, 1), date(2010, 12, 31));
        let u = unit(p.id);
        let result = resolve_placement(&input(date(1990, 1, 1), date(1990, 12, 31)), &[p], Some(&u));
        assert!(matches!(result, Err(AppError::NoPeriodForDate(d)) if d == date(1990, 1, 1)));
    }

    #[test]
    fn placement_with_unit_of_another_period_is_rejected() {
        let old = period(date(1980, 1, 1), date(1999, 12, 31));
        let new = period(date(2000, 1, 1), date(2010, 12, 31));
        let u = unit(new.id);
        let result = resolve_placement(&input(date(1990, 1, 1), date(1990, 12, 31)), &[old, new], Some(&u));
        assert!(matches!(result, Err(AppError::UnitOutsidePeriod)));
    }

    #[test]
    fn placement_matches_the_period_of_the_start_date() {
        let p = period(date(1980, 1, 1), date(1999, 12, 31));
        let u = unit(p.id);
        let expected = p.id;
        let result = resolve_placement(&input(date(1999, 12, 31), date(2001, 1, 1)), &[p], Some(&u));
        assert_eq!(result.unwrap(), Some(expected));
    }

    #[test]
    fn rows_carry_valuation_and_highlight() {
        let items = vec![schedule_item("100", 10)];
        let today = date(2024, 6, 1);
        let rows = build_rows(
            vec![
                record("100", date(2000, 1, 1)),
                record("100", date(2020, 1, 1)),
                record("999", date(2000, 1, 1)),
            ],
            &items,
            today,
        );

        assert_eq!(rows[0].valuation.as_ref().unwrap().status, ValuationStatus::Fulfilled);
        assert_eq!(rows[0].highlight, Some(RowHighlight::Disposal));
        assert_eq!(rows[1].valuation.as_ref().unwrap().status, ValuationStatus::Current);
        assert_eq!(rows[1].highlight, Some(RowHighlight::Retained));
        assert!(rows[2].valuation.is_none());
        assert!(rows[2].highlight.is_none());
    }
}
