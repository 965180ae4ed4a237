// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::{I18nStore, FALLBACK_LOCALE},
    db::{
        DashboardRepository, DiagnosticRepository, FilingRepository, InventoryRepository,
        PeriodRepository, RetentionRepository, SettingsRepository,
    },
    services::{
        auth::AuthService, dashboard_service::DashboardService,
        diagnostic_service::DiagnosticService, document_service::DocumentService,
        filing_service::FilingService, inventory_service::InventoryService,
        period_service::PeriodService, retention_service::RetentionService,
    },
};

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub fonts_dir: PathBuf,
    pub default_locale: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections,
            fonts_dir: env::var("FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./fonts")),
            default_locale: env::var("DEFAULT_LOCALE")
                .unwrap_or_else(|_| FALLBACK_LOCALE.to_string()),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub period_service: PeriodService,
    pub inventory_service: InventoryService,
    pub retention_service: RetentionService,
    pub diagnostic_service: DiagnosticService,
    pub filing_service: FilingService,
    pub document_service: DocumentService,
    pub dashboard_service: DashboardService,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(config, db_pool)
    }

    // Monta o gráfico de dependências sobre uma pool já criada
    pub fn with_pool(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::new()?);

        let period_repo = PeriodRepository::new();
        let inventory_repo = InventoryRepository::new();
        let retention_repo = RetentionRepository::new();
        let diagnostic_repo = DiagnosticRepository::new();
        let filing_repo = FilingRepository::new();
        let settings_repo = SettingsRepository::new();
        let dashboard_repo = DashboardRepository::new();

        let auth_service = AuthService::new(&config.jwt_secret);
        let period_service = PeriodService::new(period_repo.clone());
        let inventory_service = InventoryService::new(
            inventory_repo.clone(),
            period_repo.clone(),
            retention_repo.clone(),
        );
        let retention_service = RetentionService::new(
            retention_repo.clone(),
            inventory_repo.clone(),
            period_repo.clone(),
        );
        let diagnostic_service = DiagnosticService::new(diagnostic_repo.clone());
        let filing_service = FilingService::new(filing_repo, retention_repo.clone());
        let document_service = DocumentService::new(
            inventory_repo.clone(),
            period_repo,
            retention_repo.clone(),
            settings_repo.clone(),
            config.fonts_dir.clone(),
        );
        let dashboard_service = DashboardService::new(
            dashboard_repo,
            inventory_repo,
            retention_repo,
            diagnostic_repo,
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            period_service,
            inventory_service,
            retention_service,
            diagnostic_service,
            filing_service,
            document_service,
            dashboard_service,
            settings_repo,
        })
    }
}
