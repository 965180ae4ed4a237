// src/models/inventory.rs

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc, NaiveDate};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::retention::FinalDisposition;

// --- Tipo de unidade de conservação ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "conservation_unit_type", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum ConservationUnit {
    Box,    // Vira "BOX"
    Folder, // Vira "FOLDER"
    Volume,
    Other,
}

// --- Linha do inventário documental ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = 1)]
    pub order_number: i32,
    #[schema(example = "100.2")]
    pub code: String,
    #[schema(example = "Contratos de arrendamiento")]
    pub subject: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub conservation_unit: ConservationUnit,
    pub box_number: Option<String>,
    pub folder_number: Option<String>,
    pub folio_count: i32,
    pub organizational_unit_id: Option<Uuid>,
    // Período resolvido pela data inicial (None quando nenhum período a cobre)
    pub historical_period_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Valoração calculada no servidor ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValuationStatus {
    /// Ainda dentro do prazo de retenção
    Current,
    /// Prazo de retenção cumprido: aplicar a disposição final
    Fulfilled,
}

impl ValuationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationStatus::Current => "current",
            ValuationStatus::Fulfilled => "fulfilled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RowHighlight {
    Disposal,
    Retained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub status: ValuationStatus,
    #[schema(example = "Eliminación")]
    pub suggested_action: String,
    pub final_disposition: FinalDisposition,
    pub final_disposition_date: NaiveDate,
}

// O que a tela de inventário recebe: a linha + valoração + destaque
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub valuation: Option<Valuation>,
    pub highlight: Option<RowHighlight>,
}

// --- Resumo da importação em lote ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    /// Linha da planilha (1 = primeira linha de dados)
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inserted: usize,
    pub failed: Vec<ImportFailure>,
}

// --- Entrada (JSON ou linha de planilha) ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecordInput {
    #[validate(range(min = 1, message = "validation.order_number"))]
    #[schema(example = 1)]
    pub order_number: i32,

    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "100.2")]
    pub code: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub subject: String,

    #[schema(example = "1985-02-01")]
    pub start_date: NaiveDate,
    #[schema(example = "1987-11-30")]
    pub end_date: NaiveDate,

    pub conservation_unit: ConservationUnit,
    pub box_number: Option<String>,
    pub folder_number: Option<String>,

    #[validate(range(min = 0, message = "validation.not_negative"))]
    #[serde(default)]
    pub folio_count: i32,

    pub organizational_unit_id: Option<Uuid>,
    pub notes: Option<String>,
}
