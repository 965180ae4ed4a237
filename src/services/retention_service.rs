// src/services/retention_service.rs

use std::collections::{BTreeSet, HashSet};

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, PeriodRepository, RetentionRepository},
    domain::valuation::suggest_from_inventory,
    models::retention::{
        RetentionScheduleItem, SaveSchedulePayload, SaveValuationTablePayload, ScheduleItemInput,
        ScheduleWithItems, ValuationItemInput, ValuationTableItem,
    },
};

/// Para cada item recebido, o id do item gravado que ele substitui
/// (`None` = item novo). Casa pelo `id` explícito e, na falta dele, pelo
/// par série/subsérie; cada item gravado é usado uma vez só.
pub fn match_schedule_items(
    current: &[RetentionScheduleItem],
    inputs: &[ScheduleItemInput],
) -> Result<Vec<Option<Uuid>>, AppError> {
    let mut taken: HashSet<Uuid> = HashSet::new();
    let mut plan = vec![None; inputs.len()];

    // 1. ids explícitos
    for (slot, input) in plan.iter_mut().zip(inputs) {
        let Some(id) = input.id else { continue };
        if !current.iter().any(|item| item.id == id) {
            return Err(AppError::ResourceNotFound("retention_item"));
        }
        if !taken.insert(id) {
            return Err(AppError::DuplicateScheduleItem);
        }
        *slot = Some(id);
    }

    // 2. mesmo código de série e subsérie
    for (slot, input) in plan.iter_mut().zip(inputs) {
        if slot.is_some() || input.id.is_some() {
            continue;
        }
        let key = series_key(&input.series_code, input.subseries_code.as_deref());
        if let Some(item) = current.iter().find(|item| {
            !taken.contains(&item.id)
                && series_key(&item.series_code, item.subseries_code.as_deref()) == key
        }) {
            taken.insert(item.id);
            *slot = Some(item.id);
        }
    }

    Ok(plan)
}

fn series_key(series: &str, subseries: Option<&str>) -> (String, String) {
    (
        series.trim().to_lowercase(),
        subseries.map(|s| s.trim().to_lowercase()).unwrap_or_default(),
    )
}

fn referenced_units(items: &[ValuationItemInput]) -> BTreeSet<Uuid> {
    items.iter().filter_map(|item| item.organizational_unit_id).collect()
}

#[derive(Clone)]
pub struct RetentionService {
    retention_repo: RetentionRepository,
    inventory_repo: InventoryRepository,
    period_repo: PeriodRepository,
}

impl RetentionService {
    pub fn new(
        retention_repo: RetentionRepository,
        inventory_repo: InventoryRepository,
        period_repo: PeriodRepository,
    ) -> Self {
        Self { retention_repo, inventory_repo, period_repo }
    }

    // =========================================================================
    //  TRD
    // =========================================================================

    pub async fn get_schedule<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Option<ScheduleWithItems>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let Some(schedule) = self
            .retention_repo
            .find_active_schedule(&mut *tx, organization_id)
            .await?
        else {
            return Ok(None);
        };

        let items = self.retention_repo.list_schedule_items(&mut *tx, schedule.id).await?;
        Ok(Some(ScheduleWithItems { schedule, items }))
    }

    /// Grava a TRD ativa e sobe a versão (ou cria a versão 1). Itens que
    /// continuam na tabela mantêm o id, então documentos e expedientes que
    /// os referenciam não perdem o vínculo.
    pub async fn save_schedule<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &SaveSchedulePayload,
    ) -> Result<ScheduleWithItems, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        payload.validate()?;

        let mut tx = executor.begin().await?;
        let name = payload.name.trim();

        let (schedule, current_items) =
            match self.retention_repo.find_active_schedule(&mut *tx, organization_id).await? {
                Some(current) => {
                    // O UPDATE trava a TRD: os itens são lidos já depois de uma gravação concorrente
                    let schedule = self
                        .retention_repo
                        .bump_schedule(&mut *tx, organization_id, current.id, name)
                        .await?;
                    let items = self.retention_repo.list_schedule_items(&mut *tx, schedule.id).await?;
                    (schedule, items)
                }
                None => (
                    self.retention_repo.create_schedule(&mut *tx, organization_id, name).await?,
                    Vec::new(),
                ),
            };

        let plan = match_schedule_items(&current_items, &payload.items)?;

        let keep: Vec<Uuid> = plan.iter().filter_map(|slot| *slot).collect();
        let removed = self
            .retention_repo
            .delete_schedule_items_except(&mut *tx, schedule.id, &keep)
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for ((position, input), slot) in (0_i32..).zip(&payload.items).zip(&plan) {
            let item = match slot {
                Some(item_id) => {
                    self.retention_repo
                        .update_schedule_item(&mut *tx, schedule.id, *item_id, position, input)
                        .await?
                }
                None => {
                    self.retention_repo
                        .insert_schedule_item(&mut *tx, schedule.id, position, input)
                        .await?
                }
            };
            items.push(item);
        }

        tx.commit().await?;

        tracing::info!(
            "🗂️ TRD '{}' salva (versão {}, {} série(s), {} removida(s))",
            schedule.name,
            schedule.version,
            items.len(),
            removed
        );
        Ok(ScheduleWithItems { schedule, items })
    }

    // =========================================================================
    //  TVD
    // =========================================================================

    pub async fn get_valuation_table<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<ValuationTableItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.retention_repo.list_valuation_items(executor, organization_id).await
    }

    pub async fn save_valuation_table<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        payload: &SaveValuationTablePayload,
    ) -> Result<Vec<ValuationTableItem>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        payload.validate()?;

        let mut tx = executor.begin().await?;

        // A FK não passa pela RLS: a dependência tem de ser desta organização
        for unit_id in referenced_units(&payload.items) {
            self.period_repo
                .find_unit(&mut *tx, organization_id, unit_id)
                .await?
                .ok_or(AppError::ResourceNotFound("unit"))?;
        }

        self.retention_repo.delete_valuation_items(&mut *tx, organization_id).await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for (position, input) in (0_i32..).zip(&payload.items) {
            items.push(
                self.retention_repo
                    .insert_valuation_item(&mut *tx, organization_id, position, input)
                    .await?,
            );
        }

        tx.commit().await?;
        Ok(items)
    }

    /// Sugestões para a TVD a partir do inventário da dependência. Nada é gravado.
    pub async fn suggest_valuation<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Vec<ValuationItemInput>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let records = self
            .inventory_repo
            .list_records_by_unit(&mut *tx, organization_id, unit_id)
            .await?;
        let existing = self.retention_repo.list_valuation_items(&mut *tx, organization_id).await?;

        Ok(suggest_from_inventory(unit_id, &records, &existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::i18n::I18nStore;
    use crate::middleware::i18n::Locale;
    use crate::models::retention::FinalDisposition;
    use axum::http::StatusCode;

    fn stored(series: &str, subseries: Option<&str>) -> RetentionScheduleItem {
        RetentionScheduleItem {
            id: Uuid::new_v4(),
            schedule_id: Uuid::nil(),
            position: 0,
            series_code: series.into(),
            series_name: "Serie".into(),
            subseries_code: subseries.map(Into::into),
            subseries_name: None,
            office_retention_years: 2,
            central_retention_years: 8,
            final_disposition: FinalDisposition::TotalConservation,
            procedure: None,
            observations: None,
        }
    }

    fn input(id: Option<Uuid>, series: &str, subseries: Option<&str>) -> ScheduleItemInput {
        ScheduleItemInput {
            id,
            series_code: series.into(),
            series_name: "Serie".into(),
            subseries_code: subseries.map(Into::into),
            subseries_name: None,
            office_retention_years: 1,
            central_retention_years: 4,
            final_disposition: FinalDisposition::Selection,
            procedure: None,
            observations: None,
        }
    }

    fn valuation(unit: Option<Uuid>) -> ValuationItemInput {
        ValuationItemInput {
            organizational_unit_id: unit,
            series: "Actas".into(),
            subseries: None,
            administrative_value: true,
            legal_value: false,
            fiscal_value: false,
            accounting_value: false,
            technical_value: false,
            historical_value: false,
            office_retention_years: 1,
            central_retention_years: 9,
            final_disposition: FinalDisposition::Selection,
            observations: None,
        }
    }

    #[test]
    fn resaving_the_same_series_keeps_item_ids() {
        let contracts = stored("100", Some("100.2"));
        let minutes = stored("200", None);
        let current = vec![contracts.clone(), minutes.clone()];

        // Mesma TRD reordenada, com um item novo no fim
        let plan = match_schedule_items(
            &current,
            &[input(None, "200", None), input(None, " 100 ", Some("100.2")), input(None, "300", None)],
        )
        .unwrap();

        assert_eq!(plan, vec![Some(minutes.id), Some(contracts.id), None]);
    }

    #[test]
    fn explicit_id_wins_even_when_the_code_changes() {
        let item = stored("100", None);
        let plan = match_schedule_items(&[item.clone()], &[input(Some(item.id), "110", None)]).unwrap();
        assert_eq!(plan, vec![Some(item.id)]);
    }

    #[test]
    fn series_removed_from_the_table_is_not_kept() {
        let item = stored("100", None);
        let plan = match_schedule_items(&[item], &[input(None, "100", Some("100.1"))]).unwrap();
        assert_eq!(plan, vec![None]);
    }

    #[test]
    fn unknown_or_repeated_ids_are_rejected() {
        let item = stored("100", None);

        assert!(matches!(
            match_schedule_items(&[item.clone()], &[input(Some(Uuid::new_v4()), "100", None)]),
            Err(AppError::ResourceNotFound("retention_item"))
        ));
        assert!(matches!(
            match_schedule_items(
                &[item.clone()],
                &[input(Some(item.id), "100", None), input(Some(item.id), "100", None)]
            ),
            Err(AppError::DuplicateScheduleItem)
        ));
    }

    #[test]
    fn valuation_units_are_checked_once_each() {
        let unit = Uuid::new_v4();
        let units = referenced_units(&[valuation(Some(unit)), valuation(None), valuation(Some(unit))]);
        assert_eq!(units.into_iter().collect::<Vec<_>>(), vec![unit]);
    }

    #[test]
    fn unknown_valuation_unit_is_not_found() {
        let i18n = I18nStore::new().unwrap();
        let api = AppError::ResourceNotFound("unit").to_api_error(&Locale("es".into()), &i18n);

        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Dependencia no encontrado.");
    }
}
