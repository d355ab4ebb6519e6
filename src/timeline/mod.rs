//! Timeline assembly across all of a user's people

mod filter;

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use log::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::model::{PersonWithDetails, TimelineEntry, UpcomingDate};
use crate::recurrence::comparison_instant;
use crate::store::RecordStore;
use crate::upcoming::{sort_upcoming, DEFAULT_LOOKAHEAD_DAYS};

pub use filter::TimelineOptions;

fn current_date() -> NaiveDate {
    Utc::now().date_naive()
}

/// Read-side service merging per-person date records into one ordered
/// timeline, over any [`RecordStore`].
///
/// # Example
///
/// ```no_run
/// use kith_core::store::PostgrestStore;
/// use kith_core::timeline::{TimelineOptions, TimelineService};
///
/// # async fn run() -> Result<(), kith_core::Error> {
/// let store = PostgrestStore::new("https://your-project.supabase.co", "your-anon-key");
/// let timelines = TimelineService::new(store);
///
/// let user_id = uuid::Uuid::new_v4();
/// let entries = timelines
///     .timeline_for_user(user_id, &TimelineOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct TimelineService<S> {
    store: S,

    /// Source of "today", swappable so recurrence projection is
    /// deterministic under test
    today: fn() -> NaiveDate,
}

impl<S: RecordStore> TimelineService<S> {
    /// Create a service over a record store, using the wall clock for "today"
    pub fn new(store: S) -> Self {
        Self {
            store,
            today: current_date,
        }
    }

    /// Replace the source of "today"
    pub fn with_today_source(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// The underlying record store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every active date across the user's active people, ordered
    /// chronologically.
    ///
    /// Recurring unknown-year dates are projected onto the current year for
    /// ordering so they interleave with fixed dates; whether this year's
    /// occurrence already passed is not considered. Records tied on the
    /// projected instant keep their fetch order (the sort is stable), which
    /// is only deterministic across calls insofar as the store's fetch
    /// order is. A user with no active people gets an empty timeline, not
    /// an error.
    pub async fn timeline_for_user(
        &self,
        user_id: Uuid,
        options: &TimelineOptions,
    ) -> Result<Vec<TimelineEntry>, Error> {
        options.validate()?;

        let persons = self.store.list_active_persons(user_id).await?;
        if persons.is_empty() {
            return Ok(Vec::new());
        }

        let person_ids: Vec<Uuid> = persons.iter().map(|p| p.id).collect();
        let person_by_id: HashMap<Uuid, &crate::model::Person> =
            persons.iter().map(|p| (p.id, p)).collect();

        let records = self
            .store
            .list_active_dates(&person_ids, Some(&options.source_filter()))
            .await?;
        let records = options.filter(records);

        debug!(
            "assembling timeline for user {user_id}: {} persons, {} date records",
            persons.len(),
            records.len()
        );

        let mut entries: Vec<TimelineEntry> = records
            .into_iter()
            .map(|record| {
                let person = person_by_id.get(&record.person_id).copied();
                TimelineEntry::new(record, person)
            })
            .collect();

        let reference_year = (self.today)().year();
        entries.sort_by_key(|entry| comparison_instant(&entry.record, reference_year));

        Ok(options.apply_limit(entries))
    }

    /// Timeline narrowed to one calendar month.
    ///
    /// Derives the first and last day of the month and delegates to
    /// [`timeline_for_user`](Self::timeline_for_user) with unknown years
    /// included.
    pub async fn timeline_for_month(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<TimelineEntry>, Error> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::invalid_input(format!("no such month: {year}-{month:02}")))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| Error::invalid_input(format!("no such month: {year}-{month:02}")))?;
        let last = next_month - Duration::days(1);

        let options = TimelineOptions::default()
            .with_start_date(first)
            .with_end_date(last)
            .with_unknown_years(true);
        self.timeline_for_user(user_id, &options).await
    }

    /// Dates occurring within the default 30-day lookahead horizon
    pub async fn upcoming_dates(&self, user_id: Uuid) -> Result<Vec<UpcomingDate>, Error> {
        self.upcoming_dates_within(user_id, DEFAULT_LOOKAHEAD_DAYS)
            .await
    }

    /// Dates occurring within `days_ahead` days, soonest first.
    ///
    /// Every date is treated as an annual anniversary here, known year or
    /// not, which differs from the timeline's sort projection. The
    /// horizon is inclusive at its edge. The projection may run
    /// server-side; the result is re-sorted locally so the ordering
    /// guarantee holds either way.
    pub async fn upcoming_dates_within(
        &self,
        user_id: Uuid,
        days_ahead: i64,
    ) -> Result<Vec<UpcomingDate>, Error> {
        if days_ahead <= 0 {
            return Err(Error::invalid_input(format!(
                "days_ahead must be positive, got {days_ahead}"
            )));
        }

        let mut upcoming = self
            .store
            .compute_upcoming(user_id, days_ahead, (self.today)())
            .await?;
        sort_upcoming(&mut upcoming);
        Ok(upcoming)
    }

    /// One person with all their active facts and dates.
    ///
    /// The two collection lookups are independent, so they are issued
    /// concurrently and joined; either may fail on its own. An absent or
    /// soft-deleted person is [`Error::NotFound`].
    pub async fn person_details(&self, person_id: Uuid) -> Result<PersonWithDetails, Error> {
        let person = self
            .store
            .get_active_person(person_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("person {person_id}")))?;

        let person_ids = [person_id];
        let (mut facts, mut dates) = tokio::try_join!(
            self.store.list_active_facts(person_id),
            self.store.list_active_dates(&person_ids, None),
        )?;

        // newest facts first, dates chronological by literal date
        facts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        dates.sort_by_key(|d| d.date);

        Ok(PersonWithDetails {
            person,
            facts,
            dates,
        })
    }
}
