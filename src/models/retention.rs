// src/models/retention.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Disposição final (convenções da TRD) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "final_disposition")]
pub enum FinalDisposition {
    #[sqlx(rename = "CT")]
    #[serde(rename = "CT")]
    TotalConservation,
    #[sqlx(rename = "E")]
    #[serde(rename = "E")]
    Elimination,
    #[sqlx(rename = "M")]
    #[serde(rename = "M")]
    MicrofilmDigitize,
    #[sqlx(rename = "S")]
    #[serde(rename = "S")]
    Selection,
}

impl FinalDisposition {
    pub fn code(&self) -> &'static str {
        match self {
            FinalDisposition::TotalConservation => "CT",
            FinalDisposition::Elimination => "E",
            FinalDisposition::MicrofilmDigitize => "M",
            FinalDisposition::Selection => "S",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FinalDisposition::TotalConservation => "Conservación Total",
            FinalDisposition::Elimination => "Eliminación",
            FinalDisposition::MicrofilmDigitize => "Microfilmación/Digitalización",
            FinalDisposition::Selection => "Selección",
        }
    }
}

// ---
// 1. TRD (cabeçalho versionado)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionSchedule {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = "TRD General")]
    pub name: String,
    #[schema(example = 3)]
    pub version: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Série / subsérie da TRD
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionScheduleItem {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub position: i32,
    #[schema(example = "100.2")]
    pub series_code: String,
    #[schema(example = "Contratos")]
    pub series_name: String,
    pub subseries_code: Option<String>,
    pub subseries_name: Option<String>,
    /// Anos no Arquivo de Gestão (AG)
    #[schema(example = 2)]
    pub office_retention_years: i32,
    /// Anos no Arquivo Central (AC)
    #[schema(example = 8)]
    pub central_retention_years: i32,
    pub final_disposition: FinalDisposition,
    pub procedure: Option<String>,
    pub observations: Option<String>,
}

impl RetentionScheduleItem {
    pub fn total_retention_years(&self) -> u32 {
        let total = self.office_retention_years.max(0) + self.central_retention_years.max(0);
        u32::try_from(total).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWithItems {
    #[serde(flatten)]
    pub schedule: RetentionSchedule,
    pub items: Vec<RetentionScheduleItem>,
}

// Item como chega do editor da TRD
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemInput {
    /// Item já gravado; sem ele, o item é casado pelo código da série/subsérie
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "validation.series_code_required"))]
    pub series_code: String,
    #[validate(length(min = 1, message = "validation.series_name_required"))]
    pub series_name: String,
    pub subseries_code: Option<String>,
    pub subseries_name: Option<String>,
    #[validate(range(min = 0, max = 200, message = "validation.retention_years"))]
    #[serde(default)]
    pub office_retention_years: i32,
    #[validate(range(min = 0, max = 200, message = "validation.retention_years"))]
    #[serde(default)]
    pub central_retention_years: i32,
    pub final_disposition: FinalDisposition,
    pub procedure: Option<String>,
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSchedulePayload {
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "TRD General de la Empresa")]
    pub name: String,
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<ScheduleItemInput>,
}

// ---
// 3. TVD (valoração por dependência)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuationTableItem {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organizational_unit_id: Option<Uuid>,
    pub position: i32,
    pub series: String,
    pub subseries: Option<String>,
    pub administrative_value: bool,
    pub legal_value: bool,
    pub fiscal_value: bool,
    pub accounting_value: bool,
    pub technical_value: bool,
    pub historical_value: bool,
    pub office_retention_years: i32,
    pub central_retention_years: i32,
    pub final_disposition: FinalDisposition,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuationItemInput {
    pub organizational_unit_id: Option<Uuid>,
    #[validate(length(min = 1, message = "validation.required"))]
    pub series: String,
    pub subseries: Option<String>,
    #[serde(default)]
    pub administrative_value: bool,
    #[serde(default)]
    pub legal_value: bool,
    #[serde(default)]
    pub fiscal_value: bool,
    #[serde(default)]
    pub accounting_value: bool,
    #[serde(default)]
    pub technical_value: bool,
    #[serde(default)]
    pub historical_value: bool,
    #[validate(range(min = 0, max = 200, message = "validation.retention_years"))]
    #[serde(default)]
    pub office_retention_years: i32,
    #[validate(range(min = 0, max = 200, message = "validation.retention_years"))]
    #[serde(default)]
    pub central_retention_years: i32,
    pub final_disposition: FinalDisposition,
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveValuationTablePayload {
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<ValuationItemInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestValuationPayload {
    pub organizational_unit_id: Uuid,
}
