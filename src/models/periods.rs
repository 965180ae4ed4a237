// src/models/periods.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::periods::DateRange;

// ---
// 1. Período histórico
// ---
// Intervalo em que uma estrutura orgânica esteve vigente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPeriod {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[schema(example = "Fundación")]
    pub name: String,
    #[schema(example = "1950-01-01")]
    pub start_date: NaiveDate,
    #[schema(example = "1969-12-31")]
    pub end_date: NaiveDate,
    #[schema(example = "Decreto 1234 de 1950")]
    pub legal_act: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DateRange for HistoricalPeriod {
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

// ---
// 2. Dependência (unidade organizacional)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "hierarchy_level", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HierarchyLevel {
    Direction,
    Subdirection,
    Division,
    Section,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationalUnit {
    pub id: Uuid,
    pub organization_id: Uuid,
    // Referência, não posse: o período existe por conta própria.
    pub period_id: Uuid,
    #[schema(example = "100")]
    pub code: String,
    #[schema(example = "Gerencia General")]
    pub name: String,
    pub hierarchy_level: Option<HierarchyLevel>,
    pub parent_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeriodPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "Reforma administrativa")]
    pub name: String,
    #[schema(example = "1970-01-01")]
    pub start_date: NaiveDate,
    #[schema(example = "1991-06-30")]
    pub end_date: NaiveDate,
    pub legal_act: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitPayload {
    pub period_id: Uuid,
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "110")]
    pub code: String,
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "Oficina Jurídica")]
    pub name: String,
    pub hierarchy_level: Option<HierarchyLevel>,
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// ?date=YYYY-MM-DD
#[derive(Debug, Deserialize, IntoParams)]
pub struct PeriodLookupQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UnitsQuery {
    pub period_id: Option<Uuid>,
}
