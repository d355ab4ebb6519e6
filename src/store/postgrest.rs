//! PostgREST-backed record store
//!
//! Reads go through the soft-delete-filtering views (`v_persons`,
//! `v_dates`, `v_facts`), so parent soft-delete and row-level security are
//! enforced server-side. Writes go to the base tables; deletion is a
//! `PATCH` setting `deleted_at`, never a SQL `DELETE`.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::StoreOptions;
use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::model::{
    DateChanges, DateRecord, Fact, FactChanges, NewDate, NewFact, NewPerson, Person,
    PersonChanges, UpcomingDate,
};
use crate::store::{DateFilter, RecordStore};

const PERSONS_TABLE: &str = "persons";
const DATES_TABLE: &str = "dates";
const FACTS_TABLE: &str = "facts";

/// Record store talking to a PostgREST endpoint
///
/// # Example
///
/// ```no_run
/// use kith_core::store::PostgrestStore;
///
/// let store = PostgrestStore::new("https://your-project.supabase.co", "your-anon-key");
/// ```
pub struct PostgrestStore {
    /// The base URL of the PostgREST endpoint
    url: String,

    /// The anonymous API key
    key: String,

    /// Access token of the signed-in user, when one is set
    bearer_token: Option<String>,

    /// HTTP client used for requests
    client: Client,

    /// Store options
    options: StoreOptions,
}

impl PostgrestStore {
    /// Create a new store with default options
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, StoreOptions::default())
    }

    /// Create a new store with custom options
    pub fn new_with_options(url: &str, key: &str, options: StoreOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|_| Client::new());

        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            bearer_token: None,
            client,
            options,
        }
    }

    /// Attach the signed-in user's access token to every request.
    ///
    /// Without it requests run under the anonymous role and row-level
    /// security hides every user-owned row.
    pub fn with_auth(mut self, access_token: &str) -> Self {
        self.bearer_token = Some(access_token.to_string());
        self
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.url, function)
    }

    fn authorize<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        let token = self.bearer_token.as_deref().unwrap_or(&self.key);
        fetch
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.options.client_info)
            .bearer_auth(token)
    }

    fn read(&self, url: &str) -> FetchBuilder<'_> {
        self.authorize(Fetch::get(&self.client, url))
            .header("Accept-Profile", &self.options.db_schema)
    }

    fn write(&self, url: &str, method: WriteMethod) -> FetchBuilder<'_> {
        let fetch = match method {
            WriteMethod::Insert => Fetch::post(&self.client, url),
            WriteMethod::Update => Fetch::patch(&self.client, url),
        };
        self.authorize(fetch)
            .header("Content-Profile", &self.options.db_schema)
            .header("Prefer", "return=representation")
    }

    async fn insert_row<T, B>(&self, table: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let rows: Vec<T> = self
            .write(&self.rest_url(table), WriteMethod::Insert)
            .json(body)?
            .execute()
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::unexpected("store returned no representation for insert"))
    }

    async fn patch_row<T, B>(&self, table: &str, id: Uuid, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let rows: Vec<T> = self
            .write(&self.rest_url(table), WriteMethod::Update)
            .query(vec![("id".to_string(), format!("eq.{id}"))])
            .json(body)?
            .execute()
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("{table} row {id}")))
    }

    /// Merge a fresh `updated_at` into a partial-update payload
    fn stamped<B: Serialize>(changes: &B) -> Result<serde_json::Value, Error> {
        let mut body = serde_json::to_value(changes)?;
        if let Some(map) = body.as_object_mut() {
            map.insert("updated_at".to_string(), json!(Utc::now()));
        }
        Ok(body)
    }

    /// Create a person
    pub async fn create_person(&self, person: &NewPerson) -> Result<Person, Error> {
        person.validate()?;
        self.insert_row(PERSONS_TABLE, person).await
    }

    /// Update a person
    pub async fn update_person(&self, id: Uuid, changes: &PersonChanges) -> Result<Person, Error> {
        changes.validate()?;
        self.patch_row(PERSONS_TABLE, id, &Self::stamped(changes)?)
            .await
    }

    /// Soft-delete a person; their dates and facts become invisible with them
    pub async fn delete_person(&self, id: Uuid) -> Result<Person, Error> {
        self.patch_row(PERSONS_TABLE, id, &json!({ "deleted_at": Utc::now() }))
            .await
    }

    /// Record a date for a person
    pub async fn create_date(&self, date: &NewDate) -> Result<DateRecord, Error> {
        date.validate()?;
        self.insert_row(DATES_TABLE, date).await
    }

    /// Update a date
    pub async fn update_date(&self, id: Uuid, changes: &DateChanges) -> Result<DateRecord, Error> {
        changes.validate()?;
        self.patch_row(DATES_TABLE, id, &Self::stamped(changes)?)
            .await
    }

    /// Soft-delete a date
    pub async fn delete_date(&self, id: Uuid) -> Result<DateRecord, Error> {
        self.patch_row(DATES_TABLE, id, &json!({ "deleted_at": Utc::now() }))
            .await
    }

    /// Record a fact about a person
    pub async fn create_fact(&self, fact: &NewFact) -> Result<Fact, Error> {
        fact.validate()?;
        self.insert_row(FACTS_TABLE, fact).await
    }

    /// Update a fact
    pub async fn update_fact(&self, id: Uuid, changes: &FactChanges) -> Result<Fact, Error> {
        changes.validate()?;
        self.patch_row(FACTS_TABLE, id, &Self::stamped(changes)?)
            .await
    }

    /// Soft-delete a fact
    pub async fn delete_fact(&self, id: Uuid) -> Result<Fact, Error> {
        self.patch_row(FACTS_TABLE, id, &json!({ "deleted_at": Utc::now() }))
            .await
    }
}

enum WriteMethod {
    Insert,
    Update,
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn list_active_persons(&self, user_id: Uuid) -> Result<Vec<Person>, Error> {
        debug!("listing active persons for user {user_id}");
        self.read(&self.rest_url(&self.options.persons_view))
            .query(vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), format!("eq.{user_id}")),
            ])
            .execute()
            .await
    }

    async fn get_active_person(&self, person_id: Uuid) -> Result<Option<Person>, Error> {
        let rows: Vec<Person> = self
            .read(&self.rest_url(&self.options.persons_view))
            .query(vec![
                ("select".to_string(), "*".to_string()),
                ("id".to_string(), format!("eq.{person_id}")),
                ("limit".to_string(), "1".to_string()),
            ])
            .execute()
            .await?;
        Ok(rows.into_iter().next().filter(|p| p.is_active()))
    }

    async fn list_active_dates(
        &self,
        person_ids: &[Uuid],
        filter: Option<&DateFilter>,
    ) -> Result<Vec<DateRecord>, Error> {
        if person_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = person_ids.iter().map(Uuid::to_string).collect();
        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            ("person_id".to_string(), format!("in.({})", ids.join(","))),
            ("order".to_string(), "date.asc".to_string()),
        ];

        if let Some(filter) = filter {
            if let Some(start) = filter.start_date {
                params.push(("date".to_string(), format!("gte.{start}")));
            }
            if let Some(end) = filter.end_date {
                params.push(("date".to_string(), format!("lte.{end}")));
            }
            if filter.known_years_only {
                params.push(("year_known".to_string(), "is.true".to_string()));
            }
        }

        debug!("listing active dates for {} persons", person_ids.len());
        self.read(&self.rest_url(&self.options.dates_view))
            .query(params)
            .execute()
            .await
    }

    async fn list_active_facts(&self, person_id: Uuid) -> Result<Vec<Fact>, Error> {
        self.read(&self.rest_url(&self.options.facts_view))
            .query(vec![
                ("select".to_string(), "*".to_string()),
                ("person_id".to_string(), format!("eq.{person_id}")),
                ("order".to_string(), "created_at.desc".to_string()),
            ])
            .execute()
            .await
    }

    /// Delegates to the server-side projection; the database clock is the
    /// reference day, so `today` is unused here.
    async fn compute_upcoming(
        &self,
        user_id: Uuid,
        days_ahead: i64,
        _today: NaiveDate,
    ) -> Result<Vec<UpcomingDate>, Error> {
        debug!("computing upcoming dates for user {user_id} within {days_ahead} days");
        self.authorize(Fetch::post(
            &self.client,
            &self.rpc_url(&self.options.upcoming_function),
        ))
        .header("Content-Profile", &self.options.db_schema)
        .json(&json!({ "days_ahead": days_ahead }))?
        .execute()
        .await
    }
}
