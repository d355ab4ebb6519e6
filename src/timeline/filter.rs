//! Range, limit and recurrence filtering of timeline candidates

use chrono::NaiveDate;

use crate::error::Error;
use crate::model::DateRecord;
use crate::store::DateFilter;

/// Options for narrowing a timeline query
///
/// # Example
///
/// ```
/// use kith_core::timeline::TimelineOptions;
/// use chrono::NaiveDate;
///
/// let options = TimelineOptions::default()
///     .with_start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
///     .with_limit(20)
///     .with_unknown_years(false);
/// ```
#[derive(Debug, Clone)]
pub struct TimelineOptions {
    /// Inclusive lower bound on the record's literal stored date
    pub start_date: Option<NaiveDate>,

    /// Inclusive upper bound on the record's literal stored date
    pub end_date: Option<NaiveDate>,

    /// Maximum number of entries, applied after sorting
    pub limit: Option<usize>,

    /// Whether unknown-year (recurring) records are included
    pub include_unknown_years: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            limit: None,
            include_unknown_years: true,
        }
    }
}

impl TimelineOptions {
    /// Set the inclusive start of the date range
    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Set the inclusive end of the date range
    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Cap the number of returned entries (first N chronologically)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Include or exclude unknown-year recurring records
    pub fn with_unknown_years(mut self, include: bool) -> Self {
        self.include_unknown_years = include;
        self
    }

    /// Reject impossible ranges before any store call is made
    pub fn validate(&self) -> Result<(), Error> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(Error::InvalidRange { start, end });
            }
        }
        Ok(())
    }

    /// The portion of these options a store can push into its source query
    pub fn source_filter(&self) -> DateFilter {
        DateFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            known_years_only: !self.include_unknown_years,
        }
    }

    /// Whether a single record survives the range and recurrence filters.
    ///
    /// Range bounds compare against the record's literal stored date, not
    /// its projected instant; a recurring record keeps its sentinel year
    /// here, so a window covering only real years excludes every recurring
    /// record. Callers wanting recurring events inside a real-world window
    /// use the upcoming resolver instead.
    pub fn matches(&self, record: &DateRecord) -> bool {
        if !self.include_unknown_years && !record.year_known {
            return false;
        }
        if let Some(start) = self.start_date {
            if record.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.date > end {
                return false;
            }
        }
        true
    }

    /// Narrow a candidate set to the records matching these options.
    ///
    /// The store may already have applied [`source_filter`](Self::source_filter)
    /// as a hint; filtering here is authoritative either way. The limit is
    /// not applied at this stage, since it caps the *sorted* result; see
    /// [`apply_limit`](Self::apply_limit).
    pub fn filter(&self, records: Vec<DateRecord>) -> Vec<DateRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }

    /// Truncate a sorted result to the configured limit
    pub fn apply_limit<T>(&self, mut entries: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.limit {
            entries.truncate(limit);
        }
        entries
    }
}
