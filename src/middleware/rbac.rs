// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Permission,
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// Registro estático de cada permissão declarada (coletado pelo crate `inventory`).
pub struct PermissionEntry {
    pub slug: &'static str,
    pub module: &'static str,
    pub description: &'static str,
}

::inventory::collect!(PermissionEntry);

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // As permissões vêm no próprio token (provedor de identidade externo)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        let required_perm = T::slug();
        if !user.0.has_permission(required_perm) {
            return Err(AppError::Forbidden(required_perm).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

/// Todas as permissões declaradas no binário, ordenadas pelo slug.
pub fn declared_permissions() -> Vec<Permission> {
    let mut permissions: Vec<Permission> = ::inventory::iter::<PermissionEntry>
        .into_iter()
        .map(|entry| Permission {
            slug: entry.slug.to_string(),
            module: entry.module.to_string(),
            description: entry.description.to_string(),
        })
        .collect();
    permissions.sort_by(|a, b| a.slug.cmp(&b.slug));
    permissions
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $slug:literal, $module:literal, $description:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn slug() -> &'static str {
                $slug
            }
        }
        ::inventory::submit! {
            PermissionEntry { slug: $slug, module: $module, description: $description }
        }
    };
}

permission!(
    PermArchiveWrite,
    "archive:write",
    "ARCHIVE",
    "Crear y editar inventario, períodos históricos y dependencias"
);
permission!(
    PermScheduleWrite,
    "schedule:write",
    "SCHEDULES",
    "Editar la TRD y la TVD"
);
permission!(
    PermFilingWrite,
    "filing:write",
    "FILING",
    "Radicar documentos y gestionar expedientes"
);
permission!(
    PermSettingsWrite,
    "settings:write",
    "SETTINGS",
    "Editar los datos del fondo documental"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_permission_is_listed_once() {
        let slugs: Vec<String> = declared_permissions().into_iter().map(|p| p.slug).collect();
        assert_eq!(
            slugs,
            vec!["archive:write", "filing:write", "schedule:write", "settings:write"]
        );
        assert_eq!(PermArchiveWrite::slug(), "archive:write");
    }
}
