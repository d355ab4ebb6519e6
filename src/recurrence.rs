//! Recurring-date classification and projection.
//!
//! Two projections live here and they are intentionally different. The
//! timeline sort key ([`comparison_instant`]) places a recurring date in the
//! *reference* year whether or not this year's occurrence has already
//! passed; the upcoming-window math ([`next_occurrence`]) always rolls
//! forward to the nearest future anniversary, for known-year records too.

use chrono::{Datelike, NaiveDate};

use crate::model::DateRecord;

/// Resolve `(month, day)` within `year`, clamping the leap day.
///
/// Feb 29 projected onto a non-leap year resolves to Feb 28. This is an
/// explicit policy choice, not silent truncation.
pub fn project_onto_year(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or_default()
}

/// Compute the instant a record sorts by on a single linear timeline.
///
/// Known-year records sort by their actual calendar date. Recurring records
/// are projected onto `reference_year` so they interleave with fixed dates
/// relative to "today"; whether this year's occurrence already passed is
/// not considered.
pub fn comparison_instant(record: &DateRecord, reference_year: i32) -> NaiveDate {
    if record.year_known {
        record.date
    } else {
        project_onto_year(reference_year, record.month, record.day)
    }
}

/// The smallest date on or after `today` whose month and day match.
///
/// Always anniversary mode: a known-year record whose original date has
/// passed rolls forward exactly like an unknown-year one.
pub fn next_occurrence(month: u32, day: u32, today: NaiveDate) -> NaiveDate {
    let this_year = project_onto_year(today.year(), month, day);
    if this_year >= today {
        this_year
    } else {
        project_onto_year(today.year() + 1, month, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNKNOWN_YEAR;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(y: i32, m: u32, d: u32) -> DateRecord {
        DateRecord::new(Uuid::new_v4(), Uuid::new_v4(), "event", date(y, m, d))
    }

    #[test]
    fn known_year_sorts_by_actual_date() {
        let r = record(1990, 5, 10);
        assert_eq!(comparison_instant(&r, 2024), date(1990, 5, 10));
    }

    #[test]
    fn unknown_year_projects_onto_reference_year() {
        let r = record(UNKNOWN_YEAR, 5, 10);
        assert_eq!(comparison_instant(&r, 2024), date(2024, 5, 10));
        assert_eq!(comparison_instant(&r, 1999), date(1999, 5, 10));
    }

    #[test]
    fn leap_day_clamps_on_non_leap_reference() {
        let r = record(UNKNOWN_YEAR, 2, 29);
        assert_eq!(comparison_instant(&r, 2023), date(2023, 2, 28));
        assert_eq!(comparison_instant(&r, 2024), date(2024, 2, 29));
    }

    #[test]
    fn next_occurrence_rolls_forward() {
        let today = date(2024, 6, 15);
        // later this year
        assert_eq!(next_occurrence(12, 25, today), date(2024, 12, 25));
        // already passed, next year
        assert_eq!(next_occurrence(1, 1, today), date(2025, 1, 1));
        // today counts
        assert_eq!(next_occurrence(6, 15, today), date(2024, 6, 15));
    }

    #[test]
    fn next_occurrence_clamps_leap_day() {
        // 2025 is not a leap year
        let today = date(2024, 3, 1);
        assert_eq!(next_occurrence(2, 29, today), date(2025, 2, 28));
        // still in range this leap year
        assert_eq!(next_occurrence(2, 29, date(2024, 2, 1)), date(2024, 2, 29));
    }
}
