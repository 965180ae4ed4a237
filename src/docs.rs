// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::domain;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::get_me,
        handlers::auth::list_permissions,

        // --- Historia institucional ---
        handlers::periods::list_periods,
        handlers::periods::create_period,
        handlers::periods::get_period,
        handlers::periods::delete_period,
        handlers::periods::lookup_period,
        handlers::periods::list_units,
        handlers::periods::create_unit,
        handlers::periods::delete_unit,

        // --- Inventario ---
        handlers::inventory::list_inventory,
        handlers::inventory::create_record,
        handlers::inventory::update_record,
        handlers::inventory::delete_record,
        handlers::inventory::box_label,
        handlers::inventory::export_inventory,
        handlers::inventory::import_inventory,

        // --- TRD / TVD ---
        handlers::retention::get_schedule,
        handlers::retention::save_schedule,
        handlers::retention::get_valuation_table,
        handlers::retention::save_valuation_table,
        handlers::retention::suggest_valuation,

        // --- Diagnóstico ---
        handlers::diagnostic::get_diagnostic,
        handlers::diagnostic::update_diagnostic,
        handlers::diagnostic::estimate_volume,

        // --- Radicación / Expedientes ---
        handlers::documents::file_document,
        handlers::documents::list_documents,
        handlers::documents::create_case_file,
        handlers::documents::list_case_files,
        handlers::documents::get_case_file,
        handlers::documents::link_document,
        handlers::documents::close_case_file,

        // --- Settings / Dashboard ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Identity,
            models::auth::Permission,

            // --- Volumetria / Diagnóstico ---
            domain::volumetry::UnitCount,
            domain::volumetry::SupplyProjection,
            domain::volumetry::Estimate,
            domain::diagnostic::Infrastructure,
            domain::diagnostic::DiagnosticForm,
            models::diagnostic::DiagnosticReport,
            models::diagnostic::UpdateDiagnosticPayload,

            // --- Períodos ---
            models::periods::HistoricalPeriod,
            models::periods::HierarchyLevel,
            models::periods::OrganizationalUnit,
            models::periods::CreatePeriodPayload,
            models::periods::CreateUnitPayload,

            // --- Inventario ---
            models::inventory::ConservationUnit,
            models::inventory::InventoryRecord,
            models::inventory::ValuationStatus,
            models::inventory::RowHighlight,
            models::inventory::Valuation,
            models::inventory::InventoryRow,
            models::inventory::InventoryRecordInput,
            models::inventory::ImportFailure,
            models::inventory::ImportSummary,

            // --- TRD / TVD ---
            models::retention::FinalDisposition,
            models::retention::RetentionSchedule,
            models::retention::RetentionScheduleItem,
            models::retention::ScheduleWithItems,
            models::retention::ScheduleItemInput,
            models::retention::SaveSchedulePayload,
            models::retention::ValuationTableItem,
            models::retention::ValuationItemInput,
            models::retention::SaveValuationTablePayload,
            models::retention::SuggestValuationPayload,

            // --- Radicación / Expedientes ---
            models::filing::Document,
            models::filing::FileDocumentPayload,
            models::filing::CaseFileStatus,
            models::filing::CaseFile,
            models::filing::CaseFileSummary,
            models::filing::LinkedDocument,
            models::filing::CaseFileDetail,
            models::filing::CreateCaseFilePayload,
            models::filing::LinkDocumentPayload,

            // --- Settings / Dashboard ---
            models::settings::OrganizationSettings,
            models::settings::UpdateSettingsRequest,
            models::dashboard::ArchiveSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Identidade do token e permissões"),
        (name = "Historia Institucional", description = "Períodos históricos e dependências"),
        (name = "Inventario", description = "Inventário documental, rótulos e planilhas"),
        (name = "TRD / TVD", description = "Tabelas de Retenção e de Valoração Documental"),
        (name = "Diagnóstico", description = "Diagnóstico integral e estimativa de volume"),
        (name = "Radicación", description = "Radicação de documentos"),
        (name = "Expedientes", description = "Expedientes e seus documentos"),
        (name = "Configuración", description = "Dados do Fondo"),
        (name = "Dashboard", description = "Indicadores do arquivo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
