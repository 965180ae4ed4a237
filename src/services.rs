pub mod auth;
pub mod dashboard_service;
pub mod diagnostic_service;
pub mod document_service;
pub mod filing_service;
pub mod inventory_service;
pub mod period_service;
pub mod retention_service;
pub mod spreadsheet_service;
