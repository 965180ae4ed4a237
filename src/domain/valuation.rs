// src/domain/valuation.rs

use std::collections::HashSet;

use chrono::{Months, NaiveDate};
use uuid::Uuid;

use crate::models::inventory::{InventoryRecord, RowHighlight, Valuation, ValuationStatus};
use crate::models::retention::{
    FinalDisposition, RetentionScheduleItem, ValuationItemInput, ValuationTableItem,
};

/// Mapeia o status de valoração para o destaque da linha.
///
/// Total: valores desconhecidos simplesmente não recebem destaque.
pub fn classify(status: &str) -> Option<RowHighlight> {
    match status.trim().to_ascii_lowercase().as_str() {
        "fulfilled" => Some(RowHighlight::Disposal),
        "current" => Some(RowHighlight::Retained),
        _ => None,
    }
}

/// Item da TRD aplicável a um código de inventário.
///
/// Subséries são mais específicas, então são consultadas antes das séries.
pub fn find_retention_item<'a>(
    code: &str,
    items: &'a [RetentionScheduleItem],
) -> Option<&'a RetentionScheduleItem> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    items
        .iter()
        .find(|item| {
            item.subseries_code
                .as_deref()
                .is_some_and(|sub| sub.trim().eq_ignore_ascii_case(code))
        })
        .or_else(|| {
            items
                .iter()
                .find(|item| item.series_code.trim().eq_ignore_ascii_case(code))
        })
}

/// Data em que o prazo de retenção (AG + AC) se cumpre, contado a partir da data final.
pub fn final_disposition_date(end_date: NaiveDate, retention_years: u32) -> NaiveDate {
    retention_years
        .checked_mul(12)
        .and_then(|months| end_date.checked_add_months(Months::new(months)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn evaluate(end_date: NaiveDate, item: &RetentionScheduleItem, today: NaiveDate) -> Valuation {
    let final_disposition_date = final_disposition_date(end_date, item.total_retention_years());
    let status = if today >= final_disposition_date {
        ValuationStatus::Fulfilled
    } else {
        ValuationStatus::Current
    };

    Valuation {
        status,
        suggested_action: item.final_disposition.label().to_string(),
        final_disposition: item.final_disposition,
        final_disposition_date,
    }
}

pub fn value_record(
    record: &InventoryRecord,
    items: &[RetentionScheduleItem],
    today: NaiveDate,
) -> Option<Valuation> {
    find_retention_item(&record.code, items).map(|item| evaluate(record.end_date, item, today))
}

/// Séries sugeridas para a TVD a partir do inventário de uma dependência.
///
/// A chave da série é o código do registro (ou o assunto, se não houver código);
/// séries já valoradas para a dependência são ignoradas.
pub fn suggest_from_inventory(
    unit_id: Uuid,
    records: &[InventoryRecord],
    existing: &[ValuationTableItem],
) -> Vec<ValuationItemInput> {
    let mut seen: HashSet<String> = existing
        .iter()
        .filter(|item| item.organizational_unit_id == Some(unit_id))
        .map(|item| item.series.trim().to_string())
        .collect();

    let mut suggestions = Vec::new();
    for record in records.iter().filter(|r| r.organizational_unit_id == Some(unit_id)) {
        let key = if record.code.trim().is_empty() {
            record.subject.trim()
        } else {
            record.code.trim()
        };
        if key.is_empty() || !seen.insert(key.to_string()) {
            continue;
        }

        suggestions.push(ValuationItemInput {
            organizational_unit_id: Some(unit_id),
            series: key.to_string(),
            subseries: Some(record.subject.clone()),
            administrative_value: true,
            legal_value: false,
            fiscal_value: false,
            accounting_value: false,
            technical_value: false,
            historical_value: false,
            office_retention_years: 1,
            central_retention_years: 9,
            final_disposition: FinalDisposition::Selection,
            observations: None,
        });
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::ConservationUnit;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(series: &str, subseries: Option<&str>, office: i32, central: i32, disposition: FinalDisposition) -> RetentionScheduleItem {
        RetentionScheduleItem {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            position: 0,
            series_code: series.to_string(),
            series_name: format!("Serie {series}"),
            subseries_code: subseries.map(str::to_string),
            subseries_name: None,
            office_retention_years: office,
            central_retention_years: central,
            final_disposition: disposition,
            procedure: None,
            observations: None,
        }
    }

    fn record(code: &str, subject: &str, unit: Option<Uuid>, end: NaiveDate) -> InventoryRecord {
        InventoryRecord {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            order_number: 1,
            code: code.to_string(),
            subject: subject.to_string(),
            start_date: date(1980, 1, 1),
            end_date: end,
            conservation_unit: ConservationUnit::Box,
            box_number: Some("1".into()),
            folder_number: Some("1".into()),
            folio_count: 120,
            organizational_unit_id: unit,
            historical_period_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn classifier_maps_known_statuses() {
        assert_eq!(classify("fulfilled"), Some(RowHighlight::Disposal));
        assert_eq!(classify("current"), Some(RowHighlight::Retained));
        assert_eq!(classify(" Fulfilled "), Some(RowHighlight::Disposal));
    }

    #[test]
    fn classifier_ignores_unknown_statuses() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("pending"), None);
    }

    #[test]
    fn classifier_round_trips_valuation_status() {
        assert_eq!(classify(ValuationStatus::Fulfilled.as_str()), Some(RowHighlight::Disposal));
        assert_eq!(classify(ValuationStatus::Current.as_str()), Some(RowHighlight::Retained));
    }

    #[test]
    fn subseries_code_wins_over_series_code() {
        let items = vec![
            item("200", None, 1, 1, FinalDisposition::Elimination),
            item("100", Some("200"), 2, 2, FinalDisposition::TotalConservation),
        ];
        let found = find_retention_item("200", &items).unwrap();
        assert_eq!(found.final_disposition, FinalDisposition::TotalConservation);
    }

    #[test]
    fn item_lookup_ignores_case_and_blank_codes() {
        let items = vec![item("ACT", None, 1, 1, FinalDisposition::Selection)];
        assert!(find_retention_item("act", &items).is_some());
        assert!(find_retention_item("  ", &items).is_none());
    }

    #[test]
    fn retention_counts_from_end_date() {
        let rule = item("100", None, 2, 8, FinalDisposition::Elimination);
        let before = evaluate(date(2000, 6, 30), &rule, date(2010, 6, 29));
        assert_eq!(before.final_disposition_date, date(2010, 6, 30));
        assert_eq!(before.status, ValuationStatus::Current);

        let on_date = evaluate(date(2000, 6, 30), &rule, date(2010, 6, 30));
        assert_eq!(on_date.status, ValuationStatus::Fulfilled);
        assert_eq!(on_date.suggested_action, "Eliminación");
    }

    #[test]
    fn leap_day_end_dates_clamp_to_month_end() {
        assert_eq!(final_disposition_date(date(2020, 2, 29), 1), date(2021, 2, 28));
    }

    #[test]
    fn records_without_matching_series_have_no_valuation() {
        let items = vec![item("100", None, 1, 1, FinalDisposition::Elimination)];
        let r = record("999", "Otro", None, date(1990, 1, 1));
        assert!(value_record(&r, &items, date(2024, 1, 1)).is_none());
    }

    #[test]
    fn suggestions_are_unique_per_series_and_skip_valued_ones() {
        let unit = Uuid::new_v4();
        let other_unit = Uuid::new_v4();
        let records = vec![
            record("100", "Actas", Some(unit), date(1990, 1, 1)),
            record("100", "Actas de junta", Some(unit), date(1991, 1, 1)),
            record("", "Correspondencia", Some(unit), date(1992, 1, 1)),
            record("300", "Nómina", Some(unit), date(1993, 1, 1)),
            record("400", "Ajeno", Some(other_unit), date(1993, 1, 1)),
        ];
        let existing = vec![ValuationTableItem {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            organizational_unit_id: Some(unit),
            position: 0,
            series: "300".into(),
            subseries: None,
            administrative_value: true,
            legal_value: false,
            fiscal_value: false,
            accounting_value: false,
            technical_value: false,
            historical_value: false,
            office_retention_years: 1,
            central_retention_years: 1,
            final_disposition: FinalDisposition::Elimination,
            observations: None,
        }];

        let suggestions = suggest_from_inventory(unit, &records, &existing);
        let series: Vec<&str> = suggestions.iter().map(|s| s.series.as_str()).collect();
        assert_eq!(series, vec!["100", "Correspondencia"]);

        let first = &suggestions[0];
        assert_eq!(first.subseries.as_deref(), Some("Actas"));
        assert!(first.administrative_value);
        assert_eq!((first.office_retention_years, first.central_retention_years), (1, 9));
        assert_eq!(first.final_disposition, FinalDisposition::Selection);
    }
}
