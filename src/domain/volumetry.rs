// src/domain/volumetry.rs

//! Estimativa de volume documental em metros lineares e projeção de insumos.
//!
//! Os coeficientes são os valores padrão usados no diagnóstico de fundos
//! acumulados: uma caixa X200 ocupa 0,12 m, uma pasta solta 0,01 m e um
//! tomo/livro 0,03 m de estante.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 0,12 m por caixa X200.
pub const METERS_PER_BOX: Decimal = Decimal::from_parts(12, 0, 0, false, 2);
/// 0,01 m por pasta solta.
pub const METERS_PER_LOOSE_FOLDER: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// 0,03 m por tomo.
pub const METERS_PER_VOLUME: Decimal = Decimal::from_parts(3, 0, 0, false, 2);
/// Pastas novas por metro linear (100 unidades soltas por metro).
pub const FOLDERS_PER_METER: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

// --- Contagem física (entrada do formulário) ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitCount {
    #[schema(example = 10)]
    pub boxes: u32,
    #[schema(example = 50)]
    pub loose_folders: u32,
    #[schema(example = 2)]
    pub volumes: u32,
    // Não entra na fórmula de metros lineares.
    #[schema(example = 0)]
    pub other: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplyProjection {
    /// Caixas X200 novas
    pub boxes_needed: u64,
    /// Pastas de yute
    pub folders_needed: u64,
    /// Ganchos legajadores (um por pasta)
    pub fasteners_needed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    #[schema(value_type = f64, example = 1.76)]
    pub linear_meters: Decimal,
    pub supplies: SupplyProjection,
}

impl Estimate {
    /// Só há resultado a mostrar quando existe volume.
    pub fn has_results(&self) -> bool {
        self.linear_meters > Decimal::ZERO
    }
}

pub fn linear_meters(counts: &UnitCount) -> Decimal {
    let raw = Decimal::from(counts.boxes) * METERS_PER_BOX
        + Decimal::from(counts.loose_folders) * METERS_PER_LOOSE_FOLDER
        + Decimal::from(counts.volumes) * METERS_PER_VOLUME;

    raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn project_supplies(linear_meters: Decimal) -> SupplyProjection {
    if linear_meters <= Decimal::ZERO {
        return SupplyProjection::default();
    }

    let folders_needed = ceil_to_u64(linear_meters * FOLDERS_PER_METER);
    let boxes_needed = ceil_to_u64(linear_meters / METERS_PER_BOX);

    SupplyProjection {
        boxes_needed,
        folders_needed,
        fasteners_needed: folders_needed,
    }
}

pub fn estimate(counts: &UnitCount) -> Estimate {
    let linear_meters = linear_meters(counts);
    Estimate {
        linear_meters,
        supplies: project_supplies(linear_meters),
    }
}

fn ceil_to_u64(value: Decimal) -> u64 {
    value.ceil().to_u64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(boxes: u32, loose_folders: u32, volumes: u32, other: u32) -> UnitCount {
        UnitCount { boxes, loose_folders, volumes, other }
    }

    #[test]
    fn zero_counts_have_no_volume_nor_supplies() {
        let result = estimate(&UnitCount::default());
        assert_eq!(result.linear_meters, Decimal::ZERO);
        assert_eq!(result.supplies, SupplyProjection::default());
        assert!(!result.has_results());
    }

    #[test]
    fn one_box_is_twelve_centimeters() {
        let result = estimate(&counts(1, 0, 0, 0));
        assert_eq!(result.linear_meters, Decimal::new(12, 2));
        assert_eq!(result.supplies.boxes_needed, 1);
        assert_eq!(result.supplies.folders_needed, 12);
    }

    #[test]
    fn one_hundred_loose_folders_make_one_meter() {
        let result = estimate(&counts(0, 100, 0, 0));
        assert_eq!(result.linear_meters, Decimal::ONE);
        assert_eq!(result.supplies.folders_needed, 100);
        // 1 / 0,12 = 8,33.. -> 9 caixas
        assert_eq!(result.supplies.boxes_needed, 9);
    }

    #[test]
    fn mixed_counts_follow_the_archival_coefficients() {
        let result = estimate(&counts(10, 50, 2, 0));
        assert_eq!(result.linear_meters, Decimal::new(176, 2));
        assert_eq!(result.supplies.folders_needed, 176);
        assert_eq!(result.supplies.boxes_needed, 15);
        assert_eq!(result.supplies.fasteners_needed, result.supplies.folders_needed);
    }

    #[test]
    fn other_units_do_not_add_volume() {
        assert_eq!(estimate(&counts(0, 0, 0, 40)), estimate(&UnitCount::default()));
        assert_eq!(estimate(&counts(3, 0, 0, 9)), estimate(&counts(3, 0, 0, 0)));
    }

    #[test]
    fn exact_box_multiples_do_not_round_up() {
        let result = estimate(&counts(3, 0, 0, 0));
        assert_eq!(result.linear_meters, Decimal::new(36, 2));
        assert_eq!(result.supplies.boxes_needed, 3);
    }

    #[test]
    fn estimate_is_pure() {
        let input = counts(7, 13, 4, 1);
        assert_eq!(estimate(&input), estimate(&input));
    }

    #[test]
    fn fasteners_always_match_folders() {
        for (b, f, v) in [(0, 1, 0), (5, 0, 0), (0, 0, 9), (123, 456, 78)] {
            let supplies = estimate(&counts(b, f, v, 0)).supplies;
            assert_eq!(supplies.fasteners_needed, supplies.folders_needed);
        }
    }

    #[test]
    fn counts_accept_partial_json() {
        let parsed: UnitCount = serde_json::from_str(r#"{"boxes":4,"looseFolders":2}"#).unwrap();
        assert_eq!(parsed, counts(4, 2, 0, 0));
    }

    #[test]
    fn negative_counts_are_rejected_by_deserialization() {
        assert!(serde_json::from_str::<UnitCount>(r#"{"boxes":-1}"#).is_err());
    }

    #[test]
    fn estimate_serializes_linear_meters_as_number() {
        let json = serde_json::to_value(estimate(&counts(10, 50, 2, 0))).unwrap();
        assert_eq!(json["linearMeters"], serde_json::json!(1.76));
        assert_eq!(json["supplies"]["boxesNeeded"], 15);
    }
}
