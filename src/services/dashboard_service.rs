// src/services/dashboard_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, DiagnosticRepository, InventoryRepository, RetentionRepository},
    domain::{diagnostic::DiagnosticForm, valuation::value_record},
    models::{
        dashboard::{ArchiveCounts, ArchiveSummary},
        inventory::{InventoryRecord, ValuationStatus},
        retention::RetentionScheduleItem,
    },
};

/// Monta os cards do painel. Os derivados (retenção cumprida e metros
/// lineares) são recalculados aqui, nunca lidos do banco.
pub fn summarize(
    counts: ArchiveCounts,
    records: &[InventoryRecord],
    items: &[RetentionScheduleItem],
    diagnostic: Option<&DiagnosticForm>,
    today: chrono::NaiveDate,
) -> ArchiveSummary {
    let fulfilled = records
        .iter()
        .filter_map(|r| value_record(r, items, today))
        .filter(|v| v.status == ValuationStatus::Fulfilled)
        .count();

    ArchiveSummary {
        periods: counts.periods,
        units: counts.units,
        inventory_records: counts.inventory_records,
        fulfilled_records: i64::try_from(fulfilled).unwrap_or(i64::MAX),
        open_case_files: counts.open_case_files,
        filed_documents: counts.filed_documents,
        linear_meters: diagnostic.map_or(Decimal::ZERO, |form| form.estimate().linear_meters),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    dashboard_repo: DashboardRepository,
    inventory_repo: InventoryRepository,
    retention_repo: RetentionRepository,
    diagnostic_repo: DiagnosticRepository,
}

impl DashboardService {
    pub fn new(
        dashboard_repo: DashboardRepository,
        inventory_repo: InventoryRepository,
        retention_repo: RetentionRepository,
        diagnostic_repo: DiagnosticRepository,
    ) -> Self {
        Self { dashboard_repo, inventory_repo, retention_repo, diagnostic_repo }
    }

    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<ArchiveSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let counts = self.dashboard_repo.get_counts(&mut *tx, organization_id).await?;
        let records = self.inventory_repo.list_records(&mut *tx, organization_id).await?;
        let items = self.retention_repo.list_active_items(&mut *tx, organization_id).await?;
        let diagnostic = self
            .diagnostic_repo
            .get(&mut *tx, organization_id)
            .await?
            .map(DiagnosticForm::from);

        Ok(summarize(counts, &records, &items, diagnostic.as_ref(), Utc::now().date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::volumetry::UnitCount;
    use crate::models::inventory::ConservationUnit;
    use crate::models::retention::FinalDisposition;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(code: &str, end: NaiveDate) -> InventoryRecord {
        InventoryRecord {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            order_number: 1,
            code: code.into(),
            subject: "Actas".into(),
            start_date: end,
            end_date: end,
            conservation_unit: ConservationUnit::Folder,
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

    #[test]
    fn summary_counts_fulfilled_rows_and_diagnostic_meters() {
        let items = vec![RetentionScheduleItem {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            position: 0,
            series_code: "200".into(),
            series_name: "Actas".into(),
            subseries_code: None,
            subseries_name: None,
            office_retention_years: 2,
            central_retention_years: 3,
            final_disposition: FinalDisposition::TotalConservation,
            procedure: None,
            observations: None,
        }];
        let records = vec![
            record("200", NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()),
            record("200", NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
            record("300", NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
        ];
        let form = DiagnosticForm {
            counts: UnitCount { boxes: 10, loose_folders: 50, volumes: 2, other: 0 },
            ..DiagnosticForm::default()
        };
        let counts = ArchiveCounts { inventory_records: 3, ..ArchiveCounts::default() };

        let summary = summarize(
            counts,
            &records,
            &items,
            Some(&form),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );

        assert_eq!(summary.inventory_records, 3);
        assert_eq!(summary.fulfilled_records, 1);
        assert_eq!(summary.linear_meters, Decimal::from_str("1.76").unwrap());
    }

    #[test]
    fn summary_without_diagnostic_has_zero_meters() {
        let summary = summarize(
            ArchiveCounts::default(),
            &[],
            &[],
            None,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert_eq!(summary.linear_meters, Decimal::ZERO);
        assert_eq!(summary.fulfilled_records, 0);
    }
}
