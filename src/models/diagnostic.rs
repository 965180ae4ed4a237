// src/models/diagnostic.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::diagnostic::{DiagnosticForm, FormAction, Infrastructure};
use crate::domain::volumetry::{Estimate, UnitCount};

// Linha da tabela `diagnostics` (contagens em BIGINT)
#[derive(Debug, Clone, FromRow)]
pub struct DiagnosticRow {
    pub organization_id: Uuid,
    pub institutional_history: String,
    pub previous_structures: String,
    pub boxes: i64,
    pub loose_folders: i64,
    pub volumes: i64,
    pub other_units: i64,
    pub physical_condition: String,
    pub temperature: String,
    pub humidity: String,
    pub infrastructure_notes: String,
    pub proposed_classification: String,
    pub observations: String,
    pub updated_at: DateTime<Utc>,
}

fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl From<DiagnosticRow> for DiagnosticForm {
    fn from(row: DiagnosticRow) -> Self {
        DiagnosticForm {
            institutional_history: row.institutional_history,
            previous_structures: row.previous_structures,
            counts: UnitCount {
                boxes: to_count(row.boxes),
                loose_folders: to_count(row.loose_folders),
                volumes: to_count(row.volumes),
                other: to_count(row.other_units),
            },
            infrastructure: Infrastructure {
                physical_condition: row.physical_condition,
                temperature: row.temperature,
                humidity: row.humidity,
                notes: row.infrastructure_notes,
            },
            proposed_classification: row.proposed_classification,
            observations: row.observations,
        }
    }
}

// O que a tela recebe: estado + derivados recalculados
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub form: DiagnosticForm,
    pub estimate: Estimate,
    pub has_results: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DiagnosticReport {
    pub fn new(form: DiagnosticForm, updated_at: Option<DateTime<Utc>>) -> Self {
        let estimate = form.estimate();
        Self {
            has_results: estimate.has_results(),
            estimate,
            form,
            updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiagnosticPayload {
    #[schema(value_type = Vec<Object>, example = json!([{ "field": "boxes", "value": 10 }]))]
    pub changes: Vec<FormAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_counts_are_clamped_into_the_form() {
        let row = DiagnosticRow {
            organization_id: Uuid::new_v4(),
            institutional_history: "Historia".into(),
            previous_structures: String::new(),
            boxes: 3,
            loose_folders: -5,
            volumes: i64::MAX,
            other_units: 0,
            physical_condition: String::new(),
            temperature: String::new(),
            humidity: String::new(),
            infrastructure_notes: "Estantería metálica".into(),
            proposed_classification: String::new(),
            observations: String::new(),
            updated_at: Utc::now(),
        };

        let form = DiagnosticForm::from(row);
        assert_eq!(form.counts.boxes, 3);
        assert_eq!(form.counts.loose_folders, 0);
        assert_eq!(form.counts.volumes, u32::MAX);
        assert_eq!(form.infrastructure.notes, "Estantería metálica");
    }

    #[test]
    fn empty_report_has_no_results() {
        let report = DiagnosticReport::new(DiagnosticForm::default(), None);
        assert!(!report.has_results);
        assert_eq!(report.estimate, Estimate::default());
    }
}
