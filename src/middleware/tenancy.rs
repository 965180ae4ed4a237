// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// O nome do nosso cabeçalho HTTP customizado
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";

// A organização (Fondo) que o usuário quer acessar nesta requisição
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

// Roda depois do auth_guard: exige o cabeçalho e confere se a
// organização está entre as do token.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| to_api(AppError::InvalidToken))?;

    let organization_id = parse_organization_header(request.headers()).map_err(to_api)?;

    if !user.0.can_access(organization_id) {
        tracing::warn!(
            "⛔ Usuário {} tentou acessar a organização {}",
            user.0.sub,
            organization_id
        );
        return Err(to_api(AppError::TenantNotAllowed));
    }

    request.extensions_mut().insert(TenantContext(organization_id));
    Ok(next.run(request).await)
}

fn parse_organization_header(headers: &axum::http::HeaderMap) -> Result<Uuid, AppError> {
    let value = headers
        .get(ORGANIZATION_ID_HEADER)
        .ok_or(AppError::TenantHeaderMissing)?;

    let value_str = value.to_str().map_err(|_| AppError::TenantHeaderInvalid)?;
    Uuid::parse_str(value_str.trim()).map_err(|_| AppError::TenantHeaderInvalid)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::TenantHeaderMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn header_must_be_present_and_a_uuid() {
        let headers = HeaderMap::new();
        assert!(matches!(
            parse_organization_header(&headers),
            Err(AppError::TenantHeaderMissing)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(ORGANIZATION_ID_HEADER, HeaderValue::from_static("fondo-1"));
        assert!(matches!(
            parse_organization_header(&headers),
            Err(AppError::TenantHeaderInvalid)
        ));

        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(ORGANIZATION_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(parse_organization_header(&headers).unwrap(), id);
    }
}
