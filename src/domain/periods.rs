// src/domain/periods.rs

use chrono::NaiveDate;

/// Qualquer coisa que cubra um intervalo de datas fechado (início e fim inclusivos).
pub trait DateRange {
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;

    fn contains(&self, date: NaiveDate) -> bool {
        self.start_date() <= date && date <= self.end_date()
    }

    fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date() <= end && start <= self.end_date()
    }
}

/// Retorna o primeiro período (na ordem recebida) que contém a data.
///
/// Não há regra de desempate: se dois períodos se sobrepõem, vence o que
/// aparece primeiro. Quem chama define a ordem (o repositório lista por
/// `start_date, created_at`).
pub fn find_period<P: DateRange>(date: NaiveDate, periods: &[P]) -> Option<&P> {
    periods.iter().find(|period| period.contains(date))
}

/// Primeiro período existente que colide com o intervalo informado.
pub fn find_overlap<P: DateRange>(start: NaiveDate, end: NaiveDate, periods: &[P]) -> Option<&P> {
    periods.iter().find(|period| period.overlaps(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Era {
        name: &'static str,
        start: NaiveDate,
        end: NaiveDate,
    }

    impl DateRange for Era {
        fn start_date(&self) -> NaiveDate {
            self.start
        }
        fn end_date(&self) -> NaiveDate {
            self.end
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn era(name: &'static str, start: NaiveDate, end: NaiveDate) -> Era {
        Era { name, start, end }
    }

    fn timeline() -> Vec<Era> {
        vec![
            era("Fundación", date(1950, 1, 1), date(1969, 12, 31)),
            era("Reforma", date(1970, 1, 1), date(1991, 6, 30)),
            era("Actual", date(1991, 7, 1), date(2030, 12, 31)),
        ]
    }

    #[test]
    fn finds_the_single_containing_period() {
        let periods = timeline();
        let found = find_period(date(1980, 5, 17), &periods).unwrap();
        assert_eq!(found.name, "Reforma");
    }

    #[test]
    fn returns_none_outside_every_period() {
        let periods = timeline();
        assert!(find_period(date(1949, 12, 31), &periods).is_none());
        assert!(find_period(date(2031, 1, 1), &periods).is_none());
    }

    #[test]
    fn bounds_are_inclusive() {
        let periods = timeline();
        assert_eq!(find_period(date(1970, 1, 1), &periods).unwrap().name, "Reforma");
        assert_eq!(find_period(date(1991, 6, 30), &periods).unwrap().name, "Reforma");
        assert_eq!(find_period(date(1991, 7, 1), &periods).unwrap().name, "Actual");
    }

    #[test]
    fn overlapping_periods_resolve_to_the_first_in_order() {
        let first = vec![
            era("A", date(2000, 1, 1), date(2010, 12, 31)),
            era("B", date(2005, 1, 1), date(2015, 12, 31)),
        ];
        assert_eq!(find_period(date(2007, 3, 3), &first).unwrap().name, "A");

        let reversed: Vec<Era> = first.into_iter().rev().collect();
        assert_eq!(find_period(date(2007, 3, 3), &reversed).unwrap().name, "B");
    }

    #[test]
    fn single_day_period_matches_its_day() {
        let periods = vec![era("Día", date(2001, 9, 11), date(2001, 9, 11))];
        assert!(find_period(date(2001, 9, 11), &periods).is_some());
        assert!(find_period(date(2001, 9, 12), &periods).is_none());
    }

    #[test]
    fn empty_list_never_matches() {
        let periods: Vec<Era> = Vec::new();
        assert!(find_period(date(2001, 1, 1), &periods).is_none());
    }

    #[test]
    fn overlap_detection_includes_touching_bounds() {
        let periods = timeline();
        let hit = find_overlap(date(1969, 12, 31), date(1969, 12, 31), &periods).unwrap();
        assert_eq!(hit.name, "Fundación");
        assert!(find_overlap(date(1900, 1, 1), date(1949, 12, 31), &periods).is_none());
        assert!(find_overlap(date(2031, 1, 1), date(2040, 1, 1), &periods).is_none());
    }
}
