// src/models/dashboard.rs

use serde::Serialize;
use rust_decimal::Decimal;
use sqlx::FromRow;
use utoipa::ToSchema;

// Contagens diretas do banco (uma única consulta)
#[derive(Debug, Clone, Default, FromRow)]
pub struct ArchiveCounts {
    pub periods: i64,
    pub units: i64,
    pub inventory_records: i64,
    pub open_case_files: i64,
    pub filed_documents: i64,
}

// Os cards do topo do painel
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSummary {
    pub periods: i64,
    pub units: i64,
    pub inventory_records: i64,
    /// Linhas do inventário com prazo de retenção cumprido
    pub fulfilled_records: i64,
    pub open_case_files: i64,
    pub filed_documents: i64,
    /// Volume do diagnóstico
    #[schema(value_type = f64, example = 1.76)]
    pub linear_meters: Decimal,
}
