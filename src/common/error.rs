// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erros da aplicação. A mensagem do `#[error]` é só para o log;
// o cliente recebe o texto traduzido de `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão ausente: {0}")]
    Forbidden(&'static str),

    #[error("Cabeçalho X-Organization-ID ausente")]
    TenantHeaderMissing,

    #[error("Cabeçalho X-Organization-ID inválido")]
    TenantHeaderInvalid,

    #[error("Organização fora do token")]
    TenantNotAllowed,

    // O argumento é o nome do recurso ("period", "unit", ...)
    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(&'static str),

    #[error("Nenhum período histórico cobre a data {0}")]
    NoPeriodForDate(NaiveDate),

    #[error("Intervalo de datas inválido")]
    InvalidDateRange,

    #[error("Período sobreposto a '{0}'")]
    PeriodOverlap(String),

    #[error("Código de dependência já existe: {0}")]
    UnitCodeAlreadyExists(String),

    #[error("Dependência fora do período da data inicial")]
    UnitOutsidePeriod,

    #[error("Dependência superior de outro período")]
    ParentUnitMismatch,

    #[error("Expediente fechado")]
    CaseFileClosed,

    #[error("Documento já vinculado ao expediente")]
    DocumentAlreadyLinked,

    #[error("Código de expediente já existe: {0}")]
    CaseFileCodeAlreadyExists(String),

    #[error("Item da TRD repetido na mesma gravação")]
    DuplicateScheduleItem,

    #[error("Importação inválida: {0}")]
    InvalidImport(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` carrega o contexto do erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Representação HTTP de um erro, já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "body": {
                "error": self.error,
                "details": self.details,
            }
        }));
        (self.status, body).into_response()
    }
}

// Fallback para rejeições de extratores, onde não há idioma disponível.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = if status.is_server_error() {
            tracing::error!("🔥 Erro Interno do Servidor: {}", self);
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        ApiError { status, error, details: None }.into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidDateRange
            | AppError::InvalidImport(_)
            | AppError::DuplicateScheduleItem
            | AppError::TenantHeaderMissing
            | AppError::TenantHeaderInvalid => StatusCode::BAD_REQUEST,

            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,

            AppError::Forbidden(_) | AppError::TenantNotAllowed => StatusCode::FORBIDDEN,

            AppError::ResourceNotFound(_) | AppError::NoPeriodForDate(_) => StatusCode::NOT_FOUND,

            AppError::PeriodOverlap(_)
            | AppError::UnitCodeAlreadyExists(_)
            | AppError::CaseFileClosed
            | AppError::DocumentAlreadyLinked
            | AppError::CaseFileCodeAlreadyExists(_) => StatusCode::CONFLICT,

            AppError::UnitOutsidePeriod | AppError::ParentUnitMismatch => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut fields = BTreeMap::new();
                collect_validation_messages(errors, "", lang, i18n, &mut fields);
                (i18n.translate(lang, "error.validation"), Some(json!(fields)))
            }
            AppError::InvalidToken | AppError::JwtError(_) => {
                (i18n.translate(lang, "error.invalid_token"), None)
            }
            AppError::Forbidden(slug) => (i18n.translate_with(lang, "error.forbidden", &[*slug]), None),
            AppError::TenantHeaderMissing => (i18n.translate(lang, "error.tenant_header_missing"), None),
            AppError::TenantHeaderInvalid => (i18n.translate(lang, "error.tenant_header_invalid"), None),
            AppError::TenantNotAllowed => (i18n.translate(lang, "error.tenant_not_allowed"), None),
            AppError::ResourceNotFound(resource) => {
                let name = i18n.translate(lang, &format!("resource.{resource}"));
                (i18n.translate_with(lang, "error.not_found", &[name.as_str()]), None)
            }
            AppError::NoPeriodForDate(date) => {
                let date = date.to_string();
                (
                    i18n.translate_with(lang, "error.no_period_for_date", &[date.as_str()]),
                    Some(json!({ "date": date })),
                )
            }
            AppError::InvalidDateRange => (i18n.translate(lang, "error.invalid_date_range"), None),
            AppError::PeriodOverlap(name) => {
                (i18n.translate_with(lang, "error.period_overlap", &[name.as_str()]), None)
            }
            AppError::UnitCodeAlreadyExists(code) => {
                (i18n.translate_with(lang, "error.unit_code_exists", &[code.as_str()]), None)
            }
            AppError::UnitOutsidePeriod => (i18n.translate(lang, "error.unit_outside_period"), None),
            AppError::ParentUnitMismatch => (i18n.translate(lang, "error.parent_unit_mismatch"), None),
            AppError::CaseFileClosed => (i18n.translate(lang, "error.case_file_closed"), None),
            AppError::DocumentAlreadyLinked => {
                (i18n.translate(lang, "error.document_already_linked"), None)
            }
            AppError::CaseFileCodeAlreadyExists(code) => {
                (i18n.translate_with(lang, "error.case_file_code_exists", &[code.as_str()]), None)
            }
            AppError::DuplicateScheduleItem => {
                (i18n.translate(lang, "error.duplicate_schedule_item"), None)
            }
            AppError::InvalidImport(reason) => {
                (i18n.translate_with(lang, "error.invalid_import", &[reason.as_str()]), None)
            }
            AppError::FontNotFound(_) => {
                tracing::error!("🔥 {}", self);
                (i18n.translate(lang, "error.font_not_found"), None)
            }
            // Banco e erros inesperados viram a mesma mensagem genérica.
            // O detalhe fica só no log.
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", self);
                (i18n.translate(lang, "error.internal"), None)
            }
        };

        ApiError { status, error, details }
    }
}

// Achata erros aninhados ("items[0].series_code") em uma lista de mensagens por campo.
fn collect_validation_messages(
    errors: &ValidationErrors,
    prefix: &str,
    lang: &str,
    i18n: &I18nStore,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        let key = e.message.as_deref().unwrap_or("validation.invalid");
                        i18n.translate(lang, key)
                    })
                    .collect::<Vec<_>>();
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_messages(inner, &path, lang, i18n, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_messages(inner, &format!("{path}[{index}]"), lang, i18n, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::retention::{SaveSchedulePayload, ScheduleItemInput};
    use crate::models::retention::FinalDisposition;
    use validator::Validate;

    fn es() -> Locale {
        Locale("es".to_string())
    }

    #[test]
    fn domain_errors_map_to_their_status() {
        let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        assert_eq!(AppError::NoPeriodForDate(date).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::PeriodOverlap("A".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::UnitOutsidePeriod.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::Forbidden("archive:write").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidDateRange.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_period_message_names_the_date() {
        let i18n = I18nStore::new().unwrap();
        let date = NaiveDate::from_ymd_opt(1900, 5, 1).unwrap();
        let api = AppError::NoPeriodForDate(date).to_api_error(&Locale("en".into()), &i18n);
        assert_eq!(api.error, "No historical period defined for date 1900-05-01.");
        assert_eq!(api.details, Some(json!({ "date": "1900-05-01" })));
    }

    #[test]
    fn unexpected_errors_are_generic() {
        let i18n = I18nStore::new().unwrap();
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo do banco"))
            .to_api_error(&es(), &i18n);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
    }

    #[test]
    fn nested_validation_errors_are_flattened() {
        let i18n = I18nStore::new().unwrap();
        let payload = SaveSchedulePayload {
            name: "TRD".into(),
            items: vec![ScheduleItemInput {
                id: None,
                series_code: String::new(),
                series_name: "Actas".into(),
                subseries_code: None,
                subseries_name: None,
                office_retention_years: 2,
                central_retention_years: 8,
                final_disposition: FinalDisposition::TotalConservation,
                procedure: None,
                observations: None,
            }],
        };

        let errors = payload.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&es(), &i18n);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);

        let details = api.details.unwrap();
        assert_eq!(
            details["items[0].series_code"][0],
            "El código de la serie es obligatorio."
        );
    }
}
