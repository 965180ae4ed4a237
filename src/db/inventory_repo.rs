// src/db/inventory_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::inventory::{InventoryRecord, InventoryRecordInput},
};

// `request_key` fica de fora: só serve para a idempotência do POST
const RECORD_COLUMNS: &str = "id, organization_id, order_number, code, subject, start_date, end_date, \
    conservation_unit, box_number, folder_number, folio_count, organizational_unit_id, \
    historical_period_id, notes, created_at, updated_at";

#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn list_records<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<Vec<InventoryRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, InventoryRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM inventory_records
             WHERE organization_id = $1
             ORDER BY order_number ASC, created_at ASC"
        ))
        .bind(organization_id)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn list_records_by_unit<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        unit_id: Uuid,
    ) -> Result<Vec<InventoryRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, InventoryRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM inventory_records
             WHERE organization_id = $1 AND organizational_unit_id = $2
             ORDER BY order_number ASC, created_at ASC"
        ))
        .bind(organization_id)
        .bind(unit_id)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn find_record<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<InventoryRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM inventory_records
             WHERE organization_id = $1 AND id = $2"
        ))
        .bind(organization_id)
        .bind(record_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    pub async fn find_by_request_key<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        request_key: &str,
    ) -> Result<Option<InventoryRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM inventory_records
             WHERE organization_id = $1 AND request_key = $2"
        ))
        .bind(organization_id)
        .bind(request_key)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    // ---
    // Escrita
    // ---

    /// Retorna `None` quando a chave de idempotência já foi usada
    /// (o INSERT não acontece).
    pub async fn create_record<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        input: &InventoryRecordInput,
        historical_period_id: Option<Uuid>,
        request_key: Option<&str>,
    ) -> Result<Option<InventoryRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "INSERT INTO inventory_records (
                organization_id, order_number, code, subject, start_date, end_date,
                conservation_unit, box_number, folder_number, folio_count,
                organizational_unit_id, historical_period_id, notes, request_key
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             ON CONFLICT (organization_id, request_key) DO NOTHING
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(input.order_number)
        .bind(input.code.trim())
        .bind(input.subject.trim())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.conservation_unit)
        .bind(input.box_number.as_deref())
        .bind(input.folder_number.as_deref())
        .bind(input.folio_count)
        .bind(input.organizational_unit_id)
        .bind(historical_period_id)
        .bind(input.notes.as_deref())
        .bind(request_key)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    pub async fn update_record<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
        input: &InventoryRecordInput,
        historical_period_id: Option<Uuid>,
    ) -> Result<Option<InventoryRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, InventoryRecord>(&format!(
            "UPDATE inventory_records SET
                order_number = $3, code = $4, subject = $5, start_date = $6, end_date = $7,
                conservation_unit = $8, box_number = $9, folder_number = $10, folio_count = $11,
                organizational_unit_id = $12, historical_period_id = $13, notes = $14,
                updated_at = NOW()
             WHERE organization_id = $1 AND id = $2
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(organization_id)
        .bind(record_id)
        .bind(input.order_number)
        .bind(input.code.trim())
        .bind(input.subject.trim())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.conservation_unit)
        .bind(input.box_number.as_deref())
        .bind(input.folder_number.as_deref())
        .bind(input.folio_count)
        .bind(input.organizational_unit_id)
        .bind(historical_period_id)
        .bind(input.notes.as_deref())
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    pub async fn delete_record<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        record_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM inventory_records WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(record_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
