//! Kith Core
//!
//! Timeline and recurring-date engine for the Kith personal CRM. The crate
//! merges the calendar dates recorded across all of a user's people into a
//! single chronological timeline, treating unknown-year dates (stored with
//! the sentinel year 0001) as annually recurring events, and answers
//! "what's coming up in the next N days".
//!
//! Rows live in an external record store consumed through the
//! [`store::RecordStore`] trait; [`store::PostgrestStore`] is the
//! production implementation, reading soft-delete-filtering views over a
//! PostgREST endpoint. The core itself performs no I/O beyond those
//! delegated reads.

pub mod config;
pub mod error;
mod fetch;
pub mod model;
pub mod recurrence;
pub mod store;
pub mod timeline;
pub mod upcoming;

pub use crate::error::Error;
pub use crate::timeline::{TimelineOptions, TimelineService};

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::StoreOptions;
    pub use crate::error::Error;
    pub use crate::model::{
        DateRecord, Person, PersonWithDetails, TimelineEntry, UpcomingDate,
    };
    pub use crate::store::{PostgrestStore, RecordStore};
    pub use crate::timeline::{TimelineOptions, TimelineService};
}
