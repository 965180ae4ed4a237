// src/handlers/retention.rs

use axum::{extract::State, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
        response::ApiResponse,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermScheduleWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::retention::{
        SaveSchedulePayload, SaveValuationTablePayload, ScheduleWithItems, SuggestValuationPayload,
        ValuationItemInput, ValuationTableItem,
    },
};

// =============================================================================
//  TRD
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/retention-schedule",
    tag = "TRD / TVD",
    responses(
        (status = 200, description = "TRD ativa com as séries (null se ainda não existe)", body = Option<ScheduleWithItems>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_schedule(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let schedule = app_state
        .retention_service
        .get_schedule(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(schedule))
}

#[utoipa::path(
    put,
    path = "/api/retention-schedule",
    tag = "TRD / TVD",
    request_body = SaveSchedulePayload,
    responses(
        (status = 200, description = "TRD salva (nova versão)", body = ScheduleWithItems),
        (status = 400, description = "Série sem código ou sem nome, ou item repetido"),
        (status = 404, description = "Item da TRD informado por id não existe")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn save_schedule(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermScheduleWrite>,
    Json(payload): Json<SaveSchedulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let schedule = app_state
        .retention_service
        .save_schedule(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(schedule))
}

// =============================================================================
//  TVD
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/valuation-table",
    tag = "TRD / TVD",
    responses(
        (status = 200, description = "Itens da TVD", body = Vec<ValuationTableItem>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_valuation_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let items = app_state
        .retention_service
        .get_valuation_table(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    put,
    path = "/api/valuation-table",
    tag = "TRD / TVD",
    request_body = SaveValuationTablePayload,
    responses(
        (status = 200, description = "TVD substituída", body = Vec<ValuationTableItem>),
        (status = 404, description = "Dependência não encontrada nesta organização")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn save_valuation_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermScheduleWrite>,
    Json(payload): Json<SaveValuationTablePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let items = app_state
        .retention_service
        .save_valuation_table(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/valuation-table/suggestions",
    tag = "TRD / TVD",
    request_body = SuggestValuationPayload,
    responses(
        (status = 200, description = "Séries sugeridas a partir do inventário (não gravadas)", body = Vec<ValuationItemInput>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn suggest_valuation(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<SuggestValuationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let suggestions = app_state
        .retention_service
        .suggest_valuation(&mut *rls_conn, tenant.0, payload.organizational_unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(suggestions))
}
