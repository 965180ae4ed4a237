// src/domain/diagnostic.rs

//! Estado explícito do formulário de diagnóstico e o redutor que o atualiza.
//!
//! O formulário só muda através de `FormAction`; os campos derivados
//! (metros lineares e insumos) nunca fazem parte do estado, são sempre
//! recalculados a partir das contagens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::volumetry::{self, Estimate, UnitCount};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Infrastructure {
    #[schema(example = "Cajas con humedad en el sótano")]
    pub physical_condition: String,
    #[schema(example = "22 °C")]
    pub temperature: String,
    #[schema(example = "65 %")]
    pub humidity: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticForm {
    pub institutional_history: String,
    pub previous_structures: String,
    pub counts: UnitCount,
    pub infrastructure: Infrastructure,
    /// Resumo do Quadro de Classificação (CCD) proposto
    pub proposed_classification: String,
    pub observations: String,
}

/// Uma ação por campo editável.
///
/// Em JSON: `{ "field": "boxes", "value": 10 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FormAction {
    InstitutionalHistory(String),
    PreviousStructures(String),
    Boxes(u32),
    LooseFolders(u32),
    Volumes(u32),
    Other(u32),
    PhysicalCondition(String),
    Temperature(String),
    Humidity(String),
    InfrastructureNotes(String),
    ProposedClassification(String),
    Observations(String),
    /// Volta o formulário ao estado vazio
    Reset,
}

/// Aplica uma ação e devolve o novo estado. Função pura.
pub fn reduce(mut form: DiagnosticForm, action: FormAction) -> DiagnosticForm {
    match action {
        FormAction::InstitutionalHistory(text) => form.institutional_history = text,
        FormAction::PreviousStructures(text) => form.previous_structures = text,
        FormAction::Boxes(n) => form.counts.boxes = n,
        FormAction::LooseFolders(n) => form.counts.loose_folders = n,
        FormAction::Volumes(n) => form.counts.volumes = n,
        FormAction::Other(n) => form.counts.other = n,
        FormAction::PhysicalCondition(text) => form.infrastructure.physical_condition = text,
        FormAction::Temperature(text) => form.infrastructure.temperature = text,
        FormAction::Humidity(text) => form.infrastructure.humidity = text,
        FormAction::InfrastructureNotes(text) => form.infrastructure.notes = text,
        FormAction::ProposedClassification(text) => form.proposed_classification = text,
        FormAction::Observations(text) => form.observations = text,
        FormAction::Reset => return DiagnosticForm::default(),
    }
    form
}

pub fn reduce_all<I>(form: DiagnosticForm, actions: I) -> DiagnosticForm
where
    I: IntoIterator<Item = FormAction>,
{
    actions.into_iter().fold(form, reduce)
}

impl DiagnosticForm {
    pub fn estimate(&self) -> Estimate {
        volumetry::estimate(&self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn count_actions_only_touch_their_field() {
        let form = reduce(DiagnosticForm::default(), FormAction::Boxes(10));
        assert_eq!(form.counts, UnitCount { boxes: 10, ..Default::default() });

        let form = reduce(form, FormAction::Other(4));
        assert_eq!(form.counts.boxes, 10);
        assert_eq!(form.counts.other, 4);
        assert!(form.institutional_history.is_empty());
    }

    #[test]
    fn estimate_follows_the_counts() {
        let form = reduce_all(
            DiagnosticForm::default(),
            vec![FormAction::Boxes(10), FormAction::LooseFolders(50), FormAction::Volumes(2)],
        );
        let estimate = form.estimate();
        assert_eq!(estimate.linear_meters, Decimal::new(176, 2));
        assert_eq!(estimate.supplies.boxes_needed, 15);

        let form = reduce(form, FormAction::Boxes(0));
        assert_eq!(form.estimate().linear_meters, Decimal::new(56, 2));
    }

    #[test]
    fn reset_clears_everything() {
        let form = reduce_all(
            DiagnosticForm::default(),
            vec![
                FormAction::InstitutionalHistory("Fundada en 1950".into()),
                FormAction::Humidity("70 %".into()),
                FormAction::Reset,
            ],
        );
        assert_eq!(form, DiagnosticForm::default());
    }

    #[test]
    fn later_actions_win() {
        let form = reduce_all(
            DiagnosticForm::default(),
            vec![
                FormAction::Observations("primera".into()),
                FormAction::Observations("segunda".into()),
            ],
        );
        assert_eq!(form.observations, "segunda");
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let actions: Vec<FormAction> = serde_json::from_value(json!([
            { "field": "looseFolders", "value": 25 },
            { "field": "physicalCondition", "value": "Regular" },
            { "field": "reset" }
        ]))
        .unwrap();

        assert_eq!(
            actions,
            vec![
                FormAction::LooseFolders(25),
                FormAction::PhysicalCondition("Regular".into()),
                FormAction::Reset,
            ]
        );
    }

    #[test]
    fn negative_counts_are_rejected() {
        let result: Result<FormAction, _> =
            serde_json::from_value(json!({ "field": "boxes", "value": -1 }));
        assert!(result.is_err());
    }
}
