// src/handlers/auth.rs

use axum::response::IntoResponse;

use crate::{
    common::response::ApiResponse,
    middleware::{auth::AuthenticatedUser, rbac::declared_permissions},
    models::auth::{Identity, Permission},
};

// O login acontece no provedor de identidade; aqui só lemos o token.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Identidade do token", body = Identity),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_me(AuthenticatedUser(claims): AuthenticatedUser) -> impl IntoResponse {
    ApiResponse::ok(Identity::from(&claims))
}

#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "Auth",
    responses(
        (status = 200, description = "Permissões declaradas no sistema", body = Vec<Permission>)
    )
)]
pub async fn list_permissions() -> impl IntoResponse {
    ApiResponse::ok(declared_permissions())
}
