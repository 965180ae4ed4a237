// src/handlers/periods.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
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
        rbac::{PermArchiveWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::periods::{
        CreatePeriodPayload, CreateUnitPayload, HistoricalPeriod, OrganizationalUnit, PeriodLookupQuery,
        UnitsQuery,
    },
};

// =============================================================================
//  PERÍODOS HISTÓRICOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/periods",
    tag = "Historia Institucional",
    responses(
        (status = 200, description = "Períodos ordenados pela data inicial", body = Vec<HistoricalPeriod>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_periods(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let periods = app_state
        .period_service
        .list_periods(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(periods))
}

#[utoipa::path(
    post,
    path = "/api/periods",
    tag = "Historia Institucional",
    request_body = CreatePeriodPayload,
    responses(
        (status = 201, description = "Período criado", body = HistoricalPeriod),
        (status = 400, description = "Dados inválidos ou data inicial depois da final"),
        (status = 409, description = "Sobrepõe um período existente")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_period(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    Json(payload): Json<CreatePeriodPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let period = app_state
        .period_service
        .create_period(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(period))
}

#[utoipa::path(
    get,
    path = "/api/periods/{id}",
    tag = "Historia Institucional",
    responses(
        (status = 200, description = "Período", body = HistoricalPeriod),
        (status = 404, description = "Não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do período"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_period(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(period_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let period = app_state
        .period_service
        .get_period(&mut *rls_conn, tenant.0, period_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(period))
}

#[utoipa::path(
    delete,
    path = "/api/periods/{id}",
    tag = "Historia Institucional",
    responses(
        (status = 204, description = "Período e dependências removidos"),
        (status = 404, description = "Não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do período"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn delete_period(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    Path(period_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .period_service
        .delete_period(&mut *rls_conn, tenant.0, period_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/periods/lookup",
    tag = "Historia Institucional",
    responses(
        (status = 200, description = "Período vigente na data", body = HistoricalPeriod),
        (status = 404, description = "Nenhum período histórico definido para a data")
    ),
    params(
        PeriodLookupQuery,
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn lookup_period(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<PeriodLookupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let period = app_state
        .period_service
        .lookup(&mut *rls_conn, tenant.0, query.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(period))
}

// =============================================================================
//  DEPENDÊNCIAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/units",
    tag = "Historia Institucional",
    responses(
        (status = 200, description = "Dependências (de um período, se informado)", body = Vec<OrganizationalUnit>)
    ),
    params(
        UnitsQuery,
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_units(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<UnitsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let units = app_state
        .period_service
        .list_units(&mut *rls_conn, tenant.0, query.period_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(units))
}

#[utoipa::path(
    post,
    path = "/api/units",
    tag = "Historia Institucional",
    request_body = CreateUnitPayload,
    responses(
        (status = 201, description = "Dependência criada", body = OrganizationalUnit),
        (status = 404, description = "Período ou dependência superior inexistente"),
        (status = 409, description = "Código já usado no período"),
        (status = 422, description = "Dependência superior de outro período")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    Json(payload): Json<CreateUnitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let unit = app_state
        .period_service
        .create_unit(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(unit))
}

#[utoipa::path(
    delete,
    path = "/api/units/{id}",
    tag = "Historia Institucional",
    responses(
        (status = 204, description = "Dependência removida"),
        (status = 404, description = "Não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da dependência"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn delete_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    Path(unit_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .period_service
        .delete_unit(&mut *rls_conn, tenant.0, unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
