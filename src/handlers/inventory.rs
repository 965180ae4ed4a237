// src/handlers/inventory.rs

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
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
    models::inventory::{ImportFailure, ImportSummary, InventoryRecord, InventoryRecordInput, InventoryRow},
};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// Chave opcional; vazia conta como ausente
fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "Inventario",
    responses(
        (status = 200, description = "Linhas do inventário com valoração e destaque", body = Vec<InventoryRow>)
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state
        .inventory_service
        .list_rows(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventario",
    request_body = InventoryRecordInput,
    responses(
        (status = 201, description = "Registro criado", body = InventoryRecord),
        (status = 200, description = "Chave de idempotência repetida: registro já existente", body = InventoryRecord),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Dependência fora do período da data inicial")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo"),
        ("idempotency-key" = Option<String>, Header, description = "Evita registros duplicados em reenvios")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    headers: HeaderMap,
    Json(payload): Json<InventoryRecordInput>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request_key = idempotency_key(&headers);

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (record, created) = app_state
        .inventory_service
        .create_record(&mut *rls_conn, tenant.0, &payload, request_key.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    if created {
        Ok(ApiResponse::created(record))
    } else {
        Ok(ApiResponse::ok(record))
    }
}

#[utoipa::path(
    patch,
    path = "/api/inventory/{id}",
    tag = "Inventario",
    request_body = InventoryRecordInput,
    responses(
        (status = 200, description = "Registro atualizado", body = InventoryRecord),
        (status = 404, description = "Não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_record(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    Path(record_id): Path<Uuid>,
    Json(payload): Json<InventoryRecordInput>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .inventory_service
        .update_record(&mut *rls_conn, tenant.0, record_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ApiResponse::ok(record))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    tag = "Inventario",
    responses(
        (status = 204, description = "Registro removido"),
        (status = 404, description = "Não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn delete_record(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    Path(record_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .inventory_service
        .delete_record(&mut *rls_conn, tenant.0, record_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Rótulo de caixa (PDF)
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/{id}/label",
    tag = "Inventario",
    responses(
        (status = 200, description = "Rótulo em PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Registro não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do registro"),
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn box_label(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(record_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let pdf_bytes = app_state
        .document_service
        .generate_box_label_pdf(&mut *rls_conn, tenant.0, record_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"rotulo_{record_id}.pdf\""),
        ),
    ];

    Ok((StatusCode::OK, headers, pdf_bytes))
}

// ---
// Planilha
// ---
#[utoipa::path(
    get,
    path = "/api/inventory/export",
    tag = "Inventario",
    responses(
        (status = 200, description = "Inventário em CSV com a valoração", body = String, content_type = "text/csv")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn export_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let csv_bytes = app_state
        .inventory_service
        .export_csv(&mut *rls_conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (header::CONTENT_DISPOSITION, "attachment; filename=\"inventario.csv\""),
    ];

    Ok((StatusCode::OK, headers, csv_bytes))
}

#[utoipa::path(
    post,
    path = "/api/inventory/import",
    tag = "Inventario",
    request_body(content = String, content_type = "multipart/form-data", description = "Campo `file` com o CSV"),
    responses(
        (status = 200, description = "Linhas gravadas e linhas com erro", body = ImportSummary),
        (status = 400, description = "Arquivo ausente ou sem as colunas obrigatórias")
    ),
    params(
        ("x-organization-id" = Uuid, Header, description = "ID do Fondo")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn import_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermArchiveWrite>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    // Usa o primeiro arquivo enviado
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| to_api(AppError::InvalidImport(e.to_string())))?
    {
        if field.file_name().is_some() || field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| to_api(AppError::InvalidImport(e.to_string())))?;
            file = Some(data);
            break;
        }
    }
    let file = file.ok_or_else(|| to_api(AppError::InvalidImport("file".to_string())))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(to_api)?;

    let (inserted, failures) = app_state
        .inventory_service
        .import_csv(&mut *rls_conn, tenant.0, &file)
        .await
        .map_err(to_api)?;

    // Os erros de cada linha saem traduzidos, como nas outras respostas
    let failed = failures
        .into_iter()
        .map(|(row, e)| {
            let api = to_api(e);
            let error = match api.details {
                Some(details) => format!("{} {}", api.error, details),
                None => api.error,
            };
            ImportFailure { row, error }
        })
        .collect();

    Ok(ApiResponse::ok(ImportSummary { inserted, failed }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn blank_idempotency_key_is_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(idempotency_key(&headers), None);

        headers.insert(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_static("  "));
        assert_eq!(idempotency_key(&headers), None);

        headers.insert(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_static(" form-42 "));
        assert_eq!(idempotency_key(&headers).as_deref(), Some("form-42"));
    }
}
