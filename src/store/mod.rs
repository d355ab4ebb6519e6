//! The record store contract the core consumes
//!
//! The core performs no I/O of its own; every read is delegated to a
//! [`RecordStore`] implementation. The production implementation talks to a
//! PostgREST endpoint ([`PostgrestStore`]); tests plug in an in-memory one.

mod postgrest;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Error;
use crate::model::{DateRecord, Fact, Person, UpcomingDate};
use crate::upcoming::resolve_upcoming;

pub use postgrest::PostgrestStore;

/// Source-level narrowing hint for a date query.
///
/// Stores apply as much of this as their backend supports; the timeline
/// assembler re-applies the full filter in memory, so a store that ignores
/// the hint is merely less efficient, never incorrect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFilter {
    /// Inclusive lower bound on the literal stored date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the literal stored date
    pub end_date: Option<NaiveDate>,
    /// Drop unknown-year records at the source
    pub known_years_only: bool,
}

/// Asynchronous read access to persons, facts and date records.
///
/// Every listing returns only *active* rows: a row is invisible once it, or
/// the person owning it, carries a deletion timestamp. Row order is
/// whatever the backend yields; callers needing a particular order sort for
/// themselves, and tie-break determinism across calls is only as strong as
/// the backend's fetch order.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All active persons belonging to a user
    async fn list_active_persons(&self, user_id: Uuid) -> Result<Vec<Person>, Error>;

    /// One active person by id, `None` when absent or soft-deleted
    async fn get_active_person(&self, person_id: Uuid) -> Result<Option<Person>, Error>;

    /// Active date records owned by any of the given persons.
    ///
    /// `filter` is a push-down hint, not a contract; see [`DateFilter`].
    async fn list_active_dates(
        &self,
        person_ids: &[Uuid],
        filter: Option<&DateFilter>,
    ) -> Result<Vec<DateRecord>, Error>;

    /// Active facts recorded about a person
    async fn list_active_facts(&self, person_id: Uuid) -> Result<Vec<Fact>, Error>;

    /// Next occurrences of a user's dates within `days_ahead` days of `today`.
    ///
    /// The default implementation projects in-process from the user's active
    /// date records. Backends with a precomputed server-side projection
    /// override this; such backends run on their own clock and may ignore
    /// `today`. `days_ahead` is validated positive by the caller.
    async fn compute_upcoming(
        &self,
        user_id: Uuid,
        days_ahead: i64,
        today: NaiveDate,
    ) -> Result<Vec<UpcomingDate>, Error> {
        let persons = self.list_active_persons(user_id).await?;
        let person_ids: Vec<Uuid> = persons.iter().map(|p| p.id).collect();
        let dates = self.list_active_dates(&person_ids, None).await?;
        Ok(resolve_upcoming(&dates, today, days_ahead))
    }
}
