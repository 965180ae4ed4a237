// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::settings::{OrganizationSettings, UpdateSettingsRequest},
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<OrganizationSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Organização sem configuração ainda: tratamos "Not Found" como "Vazio".
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            "SELECT organization_id, fund_name, document_number, address, updated_at
             FROM organization_settings WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;

        Ok(settings.unwrap_or_else(|| OrganizationSettings::empty(organization_id)))
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        input: &UpdateSettingsRequest,
    ) -> Result<OrganizationSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            "INSERT INTO organization_settings (organization_id, fund_name, document_number, address)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (organization_id)
             DO UPDATE SET
                fund_name = EXCLUDED.fund_name,
                document_number = EXCLUDED.document_number,
                address = EXCLUDED.address,
                updated_at = NOW()
             RETURNING organization_id, fund_name, document_number, address, updated_at",
        )
        .bind(organization_id)
        .bind(input.fund_name.as_deref())
        .bind(input.document_number.as_deref())
        .bind(input.address.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
