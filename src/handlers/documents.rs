// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
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
        rbac::{PermFilingWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::filing::{
        CaseFile, CaseFileDetail, CaseFileSummary, CreateCaseFilePayload, Document, FileDocumentPayload,
        LinkDocumentPayload,
    },
};

// =============================================================================
//  RADICAÇÃO
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Radicación",
    request_body = FileDocumentPayload,
    responses(
        (status = 201, description = "Documento radicado com número sequencial", body = Document),
        (status = 404, description = "Item da TRD inexistente")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn file_document(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermFilingWrite>,
    Json(payload): Json<FileDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let document = app_state
        .filing_service
        .file_document(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(document))
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Radicación",
    responses(
        (status = 200, description = "Documentos radicados (mais recentes primeiro)", body = Vec<Document>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let documents = app_state
        .filing_service
        .list_documents(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(documents))
}

// =============================================================================
//  EXPEDIENTES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/case-files",
    tag = "Expedientes",
    request_body = CreateCaseFilePayload,
    responses(
        (status = 201, description = "Expediente aberto", body = CaseFile),
        (status = 409, description = "Código já existe")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_case_file(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermFilingWrite>,
    Json(payload): Json<CreateCaseFilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let case_file = app_state
        .filing_service
        .create_case_file(&mut *rls_conn, tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::created(case_file))
}

#[utoipa::path(
    get,
    path = "/api/case-files",
    tag = "Expedientes",
    responses(
        (status = 200, description = "Expedientes com a contagem de documentos", body = Vec<CaseFileSummary>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_case_files(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let case_files = app_state
        .filing_service
        .list_case_files(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(case_files))
}

#[utoipa::path(
    get,
    path = "/api/case-files/{id}",
    tag = "Expedientes",
    responses(
        (status = 200, description = "Expediente com documentos e folios", body = CaseFileDetail),
        (status = 404, description = "Não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do expediente"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_case_file(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(case_file_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .filing_service
        .get_case_file(&mut *rls_conn, tenant.0, case_file_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(detail))
}

#[utoipa::path(
    patch,
    path = "/api/case-files/{id}/documents",
    tag = "Expedientes",
    request_body = LinkDocumentPayload,
    responses(
        (status = 200, description = "Documento vinculado", body = CaseFileDetail),
        (status = 409, description = "Expediente fechado ou documento já vinculado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do expediente"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn link_document(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermFilingWrite>,
    Path(case_file_id): Path<Uuid>,
    Json(payload): Json<LinkDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .filing_service
        .link_document(&mut *rls_conn, tenant.0, case_file_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(detail))
}

#[utoipa::path(
    post,
    path = "/api/case-files/{id}/close",
    tag = "Expedientes",
    responses(
        (status = 200, description = "Expediente fechado", body = CaseFile),
        (status = 409, description = "Já estava fechado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do expediente"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn close_case_file(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermFilingWrite>,
    Path(case_file_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let case_file = app_state
        .filing_service
        .close_case_file(&mut *rls_conn, tenant.0, case_file_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(case_file))
}
