// src/common/db_utils.rs

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::tenancy::TenantContext;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Adquire uma conexão da pool e define as variáveis de sessão usadas pelas políticas RLS.
pub(crate) async fn get_rls_connection(
    app_state: &AppState,
    tenant_ctx: &TenantContext,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // O '?' converte sqlx::Error -> AppError::DatabaseError
    let mut conn = app_state.db_pool.acquire().await?;

    // false = vale para a sessão inteira, não só para a transação corrente.
    // As conexões voltam para a pool, então o valor é sempre redefinido aqui.
    sqlx::query("SELECT set_config('app.organization_id', $1, false)")
        .bind(tenant_ctx.0.to_string())
        .execute(&mut *conn)
        .await?;

    sqlx::query("SELECT set_config('app.user_id', $1, false)")
        .bind(user.0.sub.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}

// Nome da constraint violada, quando o erro for de unicidade
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
