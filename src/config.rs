//! Configuration options for the PostgREST record store

use std::time::Duration;

/// Configuration options for [`PostgrestStore`](crate::store::PostgrestStore)
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema queried through PostgREST
    pub db_schema: String,

    /// The soft-delete-filtering view active persons are read from
    pub persons_view: String,

    /// The soft-delete-filtering view active date records are read from
    pub dates_view: String,

    /// The soft-delete-filtering view active facts are read from
    pub facts_view: String,

    /// The server-side function computing the upcoming-dates projection
    pub upcoming_function: String,

    /// Value sent as the X-Client-Info header
    pub client_info: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            persons_view: "v_persons".to_string(),
            dates_view: "v_dates".to_string(),
            facts_view: "v_facts".to_string(),
            upcoming_function: "upcoming_dates".to_string(),
            client_info: concat!("kith-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl StoreOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the active-persons view
    pub fn with_persons_view(mut self, value: &str) -> Self {
        self.persons_view = value.to_string();
        self
    }

    /// Set the active-dates view
    pub fn with_dates_view(mut self, value: &str) -> Self {
        self.dates_view = value.to_string();
        self
    }

    /// Set the active-facts view
    pub fn with_facts_view(mut self, value: &str) -> Self {
        self.facts_view = value.to_string();
        self
    }

    /// Set the upcoming-dates function name
    pub fn with_upcoming_function(mut self, value: &str) -> Self {
        self.upcoming_function = value.to_string();
        self
    }
}
