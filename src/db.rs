pub mod period_repo;
pub use period_repo::PeriodRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod retention_repo;
pub use retention_repo::RetentionRepository;
pub mod diagnostic_repo;
pub use diagnostic_repo::DiagnosticRepository;
pub mod filing_repo;
pub use filing_repo::FilingRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
