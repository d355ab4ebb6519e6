//! Row types and read projections for the Kith record store

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Sentinel year marking a date whose year is unknown.
///
/// A stored year of 0001 denotes an annually recurring event; its month and
/// day are authoritative and the year itself is meaningless.
pub const UNKNOWN_YEAR: i32 = 1;

/// Maximum length of a person's name
pub const MAX_NAME_LEN: usize = 60;
/// Maximum length of a date or fact label
pub const MAX_LABEL_LEN: usize = 100;
/// Maximum length of a fact's value
pub const MAX_FACT_VALUE_LEN: usize = 500;

/// Lifecycle state derived from a row's deletion timestamp.
///
/// Rows are never physically removed by this crate; deletion marks the row
/// with a timestamp and every read path filters on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The row is visible
    Active,
    /// The row was soft-deleted at the given instant
    Deleted(DateTime<Utc>),
}

impl Lifecycle {
    fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            None => Lifecycle::Active,
            Some(at) => Lifecycle::Deleted(at),
        }
    }
}

/// A tracked person, owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Person {
    /// Lifecycle state of this row
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_deleted_at(self.deleted_at)
    }

    /// Whether this row is visible to read paths
    pub fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }
}

/// A qualitative fact recorded about a person
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fact {
    pub id: Uuid,
    pub person_id: Uuid,
    pub label: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Fact {
    /// Lifecycle state of this row
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_deleted_at(self.deleted_at)
    }

    /// Whether this row is visible to read paths
    pub fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }
}

/// A calendar date recorded about a person.
///
/// `month`, `day` and `year_known` are derived from `date`; the store's
/// read views materialize them so recurring dates can be matched without
/// re-parsing the date column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateRecord {
    pub id: Uuid,
    pub person_id: Uuid,
    pub label: String,
    pub date: NaiveDate,
    pub month: u32,
    pub day: u32,
    pub year_known: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DateRecord {
    /// Create a record for `date`, deriving the month/day/year-known columns
    pub fn new(id: Uuid, person_id: Uuid, label: impl Into<String>, date: NaiveDate) -> Self {
        let now = Utc::now();
        DateRecord {
            id,
            person_id,
            label: label.into(),
            date,
            month: date.month(),
            day: date.day(),
            year_known: date.year() != UNKNOWN_YEAR,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether this date is an annually recurring unknown-year event
    pub fn is_recurring(&self) -> bool {
        !self.year_known
    }

    /// Lifecycle state of this row
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_deleted_at(self.deleted_at)
    }

    /// Whether this row is visible to read paths
    pub fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }
}

/// Minimal person identity embedded in timeline entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
}

/// A date record enriched with its owner, ready for display.
///
/// Constructed on demand by the timeline assembler, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub record: DateRecord,
    pub person: PersonRef,
}

impl TimelineEntry {
    /// Attach the owning person to a date record.
    ///
    /// When the person lookup is missing the entry falls back to an empty
    /// name so assembly stays total.
    pub fn new(record: DateRecord, person: Option<&Person>) -> Self {
        let person = match person {
            Some(p) => PersonRef {
                id: p.id,
                name: p.name.clone(),
            },
            None => PersonRef {
                id: record.person_id,
                name: String::new(),
            },
        };
        TimelineEntry { record, person }
    }
}

/// A date projected to its next occurrence within a lookahead horizon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpcomingDate {
    pub date_id: Uuid,
    pub person_id: Uuid,
    pub label: String,
    /// The literally stored event date
    pub event_date: NaiveDate,
    /// The nearest anniversary of the event on or after the reference day
    pub next_occurrence: NaiveDate,
}

/// A person together with all active facts and dates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonWithDetails {
    #[serde(flatten)]
    pub person: Person,
    pub facts: Vec<Fact>,
    pub dates: Vec<DateRecord>,
}

/// Payload for creating a person
#[derive(Debug, Clone, Serialize)]
pub struct NewPerson {
    pub user_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl NewPerson {
    /// Check field constraints before the payload reaches the store
    pub fn validate(&self) -> Result<(), Error> {
        validate_text("name", &self.name, MAX_NAME_LEN)
    }
}

/// Partial update for a person
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl PersonChanges {
    /// Check field constraints before the payload reaches the store
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.name {
            validate_text("name", name, MAX_NAME_LEN)?;
        }
        Ok(())
    }
}

/// Payload for recording a date
#[derive(Debug, Clone, Serialize)]
pub struct NewDate {
    pub person_id: Uuid,
    pub label: String,
    pub date: NaiveDate,
}

impl NewDate {
    /// Check field constraints before the payload reaches the store
    pub fn validate(&self) -> Result<(), Error> {
        validate_text("label", &self.label, MAX_LABEL_LEN)
    }
}

/// Partial update for a date
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl DateChanges {
    /// Check field constraints before the payload reaches the store
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(label) = &self.label {
            validate_text("label", label, MAX_LABEL_LEN)?;
        }
        Ok(())
    }
}

/// Payload for recording a fact
#[derive(Debug, Clone, Serialize)]
pub struct NewFact {
    pub person_id: Uuid,
    pub label: String,
    pub value: String,
}

impl NewFact {
    /// Check field constraints before the payload reaches the store
    pub fn validate(&self) -> Result<(), Error> {
        validate_text("label", &self.label, MAX_LABEL_LEN)?;
        validate_text("value", &self.value, MAX_FACT_VALUE_LEN)
    }
}

/// Partial update for a fact
#[derive(Debug, Clone, Default, Serialize)]
pub struct FactChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FactChanges {
    /// Check field constraints before the payload reaches the store
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(label) = &self.label {
            validate_text("label", label, MAX_LABEL_LEN)?;
        }
        if let Some(value) = &self.value {
            validate_text("value", value, MAX_FACT_VALUE_LEN)?;
        }
        Ok(())
    }
}

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(Error::validation(format!(
            "{field} must be {max} characters or less"
        )));
    }
    Ok(())
}
