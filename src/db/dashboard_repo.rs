// src/db/dashboard_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::dashboard::ArchiveCounts,
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // Contagens gerais em uma única ida ao banco
    pub async fn get_counts<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
    ) -> Result<ArchiveCounts, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, ArchiveCounts>(
            "SELECT
                (SELECT COUNT(*) FROM historical_periods WHERE organization_id = $1) AS periods,
                (SELECT COUNT(*) FROM organizational_units WHERE organization_id = $1) AS units,
                (SELECT COUNT(*) FROM inventory_records WHERE organization_id = $1) AS inventory_records,
                (SELECT COUNT(*) FROM case_files
                    WHERE organization_id = $1 AND status = 'OPEN') AS open_case_files,
                (SELECT COUNT(*) FROM documents WHERE organization_id = $1) AS filed_documents",
        )
        .bind(organization_id)
        .fetch_one(executor)
        .await?;

        Ok(counts)
    }
}
