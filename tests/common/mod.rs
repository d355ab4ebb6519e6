//! In-memory record store and fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use kith_core::error::Error;
use kith_core::model::{DateRecord, Fact, Person, UNKNOWN_YEAR};
use kith_core::store::{DateFilter, RecordStore};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn instant(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn person(user_id: Uuid, name: &str) -> Person {
    Person {
        id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        photo_url: None,
        created_at: instant(2023, 1, 1),
        updated_at: instant(2023, 1, 1),
        deleted_at: None,
    }
}

pub fn deleted_person(user_id: Uuid, name: &str) -> Person {
    Person {
        deleted_at: Some(instant(2024, 1, 1)),
        ..person(user_id, name)
    }
}

pub fn date_record(person_id: Uuid, label: &str, on: NaiveDate) -> DateRecord {
    DateRecord::new(Uuid::new_v4(), person_id, label, on)
}

pub fn recurring(person_id: Uuid, label: &str, month: u32, day: u32) -> DateRecord {
    date_record(person_id, label, date(UNKNOWN_YEAR, month, day))
}

pub fn fact(person_id: Uuid, label: &str, value: &str, created: DateTime<Utc>) -> Fact {
    Fact {
        id: Uuid::new_v4(),
        person_id,
        label: label.to_string(),
        value: value.to_string(),
        created_at: created,
        updated_at: created,
        deleted_at: None,
    }
}

/// Store over plain vectors, standing in for the backend views.
///
/// Visibility rules match the production views: a row is listed only while
/// it and its owning person are active. Deliberately ignores the date
/// push-down hint, so tests prove the assembler's in-memory filtering is
/// authoritative.
#[derive(Default)]
pub struct MemoryStore {
    pub persons: Vec<Person>,
    pub dates: Vec<DateRecord>,
    pub facts: Vec<Fact>,
}

impl MemoryStore {
    fn person_is_active(&self, person_id: Uuid) -> bool {
        self.persons
            .iter()
            .any(|p| p.id == person_id && p.is_active())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_active_persons(&self, user_id: Uuid) -> Result<Vec<Person>, Error> {
        Ok(self
            .persons
            .iter()
            .filter(|p| p.user_id == user_id && p.is_active())
            .cloned()
            .collect())
    }

    async fn get_active_person(&self, person_id: Uuid) -> Result<Option<Person>, Error> {
        Ok(self
            .persons
            .iter()
            .find(|p| p.id == person_id && p.is_active())
            .cloned())
    }

    async fn list_active_dates(
        &self,
        person_ids: &[Uuid],
        _filter: Option<&DateFilter>,
    ) -> Result<Vec<DateRecord>, Error> {
        Ok(self
            .dates
            .iter()
            .filter(|d| {
                person_ids.contains(&d.person_id)
                    && d.is_active()
                    && self.person_is_active(d.person_id)
            })
            .cloned()
            .collect())
    }

    async fn list_active_facts(&self, person_id: Uuid) -> Result<Vec<Fact>, Error> {
        Ok(self
            .facts
            .iter()
            .filter(|f| {
                f.person_id == person_id && f.is_active() && self.person_is_active(f.person_id)
            })
            .cloned()
            .collect())
    }
}

/// Store whose every call fails, for error propagation tests
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn list_active_persons(&self, _user_id: Uuid) -> Result<Vec<Person>, Error> {
        Err(Error::Connection("record store unreachable".to_string()))
    }

    async fn get_active_person(&self, _person_id: Uuid) -> Result<Option<Person>, Error> {
        Err(Error::Connection("record store unreachable".to_string()))
    }

    async fn list_active_dates(
        &self,
        _person_ids: &[Uuid],
        _filter: Option<&DateFilter>,
    ) -> Result<Vec<DateRecord>, Error> {
        Err(Error::Connection("record store unreachable".to_string()))
    }

    async fn list_active_facts(&self, _person_id: Uuid) -> Result<Vec<Fact>, Error> {
        Err(Error::Connection("record store unreachable".to_string()))
    }
}
