//! In-process projection of date records onto a lookahead window

use chrono::{Duration, NaiveDate};

use crate::model::{DateRecord, UpcomingDate};
use crate::recurrence::next_occurrence;

/// Default lookahead horizon, in days
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 30;

/// Project records to their next occurrence and keep those inside the horizon.
///
/// Every record is treated as an annual anniversary, `year_known` or not.
/// The horizon is inclusive: an occurrence exactly `days_ahead` days from
/// `today` is kept, one day further is dropped. Results are ordered by
/// `next_occurrence` ascending, ties broken by label so the order is
/// deterministic.
///
/// The backing store may compute this projection server-side instead; see
/// [`RecordStore::compute_upcoming`](crate::store::RecordStore::compute_upcoming).
pub fn resolve_upcoming(
    records: &[DateRecord],
    today: NaiveDate,
    days_ahead: i64,
) -> Vec<UpcomingDate> {
    let horizon = today + Duration::days(days_ahead);

    let mut upcoming: Vec<UpcomingDate> = records
        .iter()
        .map(|record| UpcomingDate {
            date_id: record.id,
            person_id: record.person_id,
            label: record.label.clone(),
            event_date: record.date,
            next_occurrence: next_occurrence(record.month, record.day, today),
        })
        .filter(|u| u.next_occurrence <= horizon)
        .collect();

    sort_upcoming(&mut upcoming);
    upcoming
}

/// Order upcoming dates by soonest occurrence, ties by label.
///
/// Applied by the service to store-computed projections as well, so the
/// ordering guarantee holds regardless of where the math ran.
pub fn sort_upcoming(upcoming: &mut [UpcomingDate]) {
    upcoming.sort_by(|a, b| {
        a.next_occurrence
            .cmp(&b.next_occurrence)
            .then_with(|| a.label.cmp(&b.label))
    });
}
