// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse};
use uuid::Uuid;

use crate::{
    common::{db_utils::get_rls_connection, error::ApiError, response::ApiResponse},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::dashboard::ArchiveSummary,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo do arquivo", body = ArchiveSummary),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Sem acesso ao Fondo")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .dashboard_service
        .get_summary(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(summary))
}
