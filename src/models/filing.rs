// src/models/filing.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Documento radicado
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    #[schema(ignore)]
    pub organization_id: Uuid,
    #[schema(example = "RAD-2025-000042")]
    pub filing_number: String,
    pub filed_at: DateTime<Utc>,
    #[schema(example = "Oficio")]
    pub document_type: String,
    #[schema(example = "Solicitud de certificado laboral")]
    pub subject: String,
    pub description: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub is_digital: bool,
    #[schema(example = "Estante 3, Caja 12")]
    pub physical_location: Option<String>,
    // Anexo digital (só os metadados; o arquivo fica no armazenamento)
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_path: Option<String>,
    pub retention_item_id: Option<Uuid>,
    // Cópia do item da TRD no momento da radicação
    pub series_code: Option<String>,
    pub series_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDocumentPayload {
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "Oficio")]
    pub document_type: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub subject: String,

    pub description: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,

    #[serde(default)]
    pub is_digital: bool,

    pub physical_location: Option<String>,

    #[schema(example = "oficio-042.pdf")]
    pub file_name: Option<String>,
    #[schema(example = "application/pdf")]
    pub mime_type: Option<String>,
    #[validate(range(min = 0, message = "validation.not_negative"))]
    pub file_size: Option<i64>,
    pub file_path: Option<String>,

    pub retention_item_id: Option<Uuid>,
}

impl FileDocumentPayload {
    /// Documento com anexo é digital mesmo que o campo não venha marcado.
    pub fn stored_digitally(&self) -> bool {
        self.is_digital || self.file_name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }
}

// ---
// 2. Expediente
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "case_file_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseFileStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseFile {
    pub id: Uuid,
    #[schema(ignore)]
    pub organization_id: Uuid,
    #[schema(example = "EXP-2025-001")]
    pub code: String,
    #[schema(example = "Contrato de obra 045")]
    pub title: String,
    pub description: Option<String>,
    pub status: CaseFileStatus,
    pub retention_item_id: Option<Uuid>,
    pub series_code: Option<String>,
    pub series_name: Option<String>,
    pub subseries_name: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

// Listagem: o expediente + quantos documentos tem
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseFileSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub case_file: CaseFile,
    pub document_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkedDocument {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub document: Document,
    pub linked_at: DateTime<Utc>,
    pub folio_start: Option<i32>,
    pub folio_end: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseFileDetail {
    #[serde(flatten)]
    pub case_file: CaseFile,
    pub documents: Vec<LinkedDocument>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseFilePayload {
    #[validate(length(min = 1, message = "validation.required"))]
    #[schema(example = "EXP-2025-001")]
    pub code: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub title: String,

    pub description: Option<String>,
    pub retention_item_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_folio_range"))]
pub struct LinkDocumentPayload {
    pub document_id: Uuid,
    #[validate(range(min = 1, message = "validation.folio_min"))]
    pub folio_start: Option<i32>,
    #[validate(range(min = 1, message = "validation.folio_min"))]
    pub folio_end: Option<i32>,
}

fn validate_folio_range(payload: &LinkDocumentPayload) -> Result<(), validator::ValidationError> {
    match (payload.folio_start, payload.folio_end) {
        (Some(start), Some(end)) if start > end => {
            let mut err = validator::ValidationError::new("folio_range");
            err.message = Some("validation.folio_range".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folio_range_must_be_ordered() {
        let payload = LinkDocumentPayload {
            document_id: Uuid::new_v4(),
            folio_start: Some(10),
            folio_end: Some(2),
        };
        assert!(payload.validate().is_err());

        let payload = LinkDocumentPayload {
            document_id: Uuid::new_v4(),
            folio_start: Some(1),
            folio_end: None,
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn zero_folio_uses_the_folio_message() {
        let payload = LinkDocumentPayload {
            document_id: Uuid::new_v4(),
            folio_start: Some(0),
            folio_end: None,
        };

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["folio_start"][0].message.as_deref(), Some("validation.folio_min"));
    }

    fn filing(is_digital: bool, file_name: Option<&str>, file_size: Option<i64>) -> FileDocumentPayload {
        FileDocumentPayload {
            document_type: "Oficio".into(),
            subject: "Solicitud".into(),
            description: None,
            sender: None,
            recipient: None,
            is_digital,
            physical_location: None,
            file_name: file_name.map(Into::into),
            mime_type: file_name.map(|_| "application/pdf".into()),
            file_size,
            file_path: None,
            retention_item_id: None,
        }
    }

    #[test]
    fn attachment_marks_the_document_as_digital() {
        assert!(filing(false, Some("oficio.pdf"), Some(2048)).stored_digitally());
        assert!(filing(true, None, None).stored_digitally());
        assert!(!filing(false, Some("  "), None).stored_digitally());
        assert!(!filing(false, None, None).stored_digitally());
    }

    #[test]
    fn attachment_size_cannot_be_negative() {
        assert!(filing(false, Some("oficio.pdf"), Some(-1)).validate().is_err());
        assert!(filing(false, Some("oficio.pdf"), Some(0)).validate().is_ok());
    }
}
