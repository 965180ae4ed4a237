// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use utoipa::ToSchema;

// Dados do Fondo usados nos rótulos de caixa
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    #[schema(ignore)] // O contexto (Header) já define a organização
    pub organization_id: Uuid,

    #[schema(example = "Fondo Documental Empresa S.A.S.")]
    pub fund_name: Option<String>,

    #[schema(example = "900.123.456-7")]
    pub document_number: Option<String>,

    #[schema(example = "Calle 10 # 20-30, Bogotá")]
    pub address: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl OrganizationSettings {
    pub fn empty(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            fund_name: None,
            document_number: None,
            address: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "Fondo Documental Empresa S.A.S.")]
    pub fund_name: Option<String>,

    #[schema(example = "900.123.456-7")]
    pub document_number: Option<String>,

    #[schema(example = "Calle 10 # 20-30, Bogotá")]
    pub address: Option<String>,
}
