// src/handlers/diagnostic.rs

use axum::{extract::State, response::IntoResponse, Json};
use uuid::Uuid;

use crate::{
    common::{db_utils::get_rls_connection, error::ApiError, response::ApiResponse},
    config::AppState,
    domain::volumetry::{self, Estimate, UnitCount},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermArchiveWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::diagnostic::{DiagnosticReport, UpdateDiagnosticPayload},
};

#[utoipa::path(
    get,
    path = "/api/diagnostic",
    tag = "Diagnóstico",
    responses(
        (status = 200, description = "Formulário e estimativa de volume", body = DiagnosticReport)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_diagnostic(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .diagnostic_service
        .get_report(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(report))
}

#[utoipa::path(
    patch,
    path = "/api/diagnostic",
    tag = "Diagnóstico",
    request_body = UpdateDiagnosticPayload,
    responses(
        (status = 200, description = "Formulário atualizado, estimativa recalculada", body = DiagnosticReport)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_diagnostic(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    Json(payload): Json<UpdateDiagnosticPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .diagnostic_service
        .apply_changes(&mut *rls_conn, tenant.0, payload.changes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(report))
}

// Cálculo puro: não toca no banco
#[utoipa::path(
    post,
    path = "/api/diagnostic/estimate",
    tag = "Diagnóstico",
    request_body = UnitCount,
    responses(
        (status = 200, description = "Metros lineares e insumos", body = Estimate)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn estimate_volume(Json(counts): Json<UnitCount>) -> impl IntoResponse {
    ApiResponse::ok(volumetry::estimate(&counts))
}
