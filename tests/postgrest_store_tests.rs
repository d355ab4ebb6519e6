mod common;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::date;
use kith_core::error::Error;
use kith_core::model::{NewDate, UpcomingDate};
use kith_core::store::{DateFilter, PostgrestStore, RecordStore};
use kith_core::timeline::{TimelineOptions, TimelineService};

fn person_row(id: Uuid, user_id: Uuid, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": user_id,
        "name": name,
        "photo_url": null,
        "created_at": "2023-01-01T12:00:00Z",
        "updated_at": "2023-01-01T12:00:00Z",
        "deleted_at": null
    })
}

fn date_row(
    id: Uuid,
    person_id: Uuid,
    label: &str,
    date: &str,
    month: u32,
    day: u32,
    year_known: bool,
) -> serde_json::Value {
    json!({
        "id": id,
        "person_id": person_id,
        "label": label,
        "date": date,
        "month": month,
        "day": day,
        "year_known": year_known,
        "created_at": "2023-01-01T12:00:00Z",
        "updated_at": "2023-01-01T12:00:00Z",
        "deleted_at": null
    })
}

#[tokio::test]
async fn lists_active_persons_through_the_view() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let person_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/v_persons"))
        .and(query_param("user_id", format!("eq.{user_id}")))
        .and(header("apikey", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([person_row(person_id, user_id, "Alice")])),
        )
        .mount(&mock_server)
        .await;

    let store = PostgrestStore::new(&mock_server.uri(), "test-key");
    let persons = store.list_active_persons(user_id).await.unwrap();

    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].id, person_id);
    assert_eq!(persons[0].name, "Alice");
    assert!(persons[0].is_active());
}

#[tokio::test]
async fn pushes_date_filters_into_the_source_query() {
    let mock_server = MockServer::start().await;
    let person_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/v_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = PostgrestStore::new(&mock_server.uri(), "test-key");
    let filter = DateFilter {
        start_date: Some(date(2024, 1, 1)),
        end_date: Some(date(2024, 12, 31)),
        known_years_only: true,
    };
    store
        .list_active_dates(&[person_id], Some(&filter))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    // range filters repeat the column key, one pair per bound
    assert!(pairs.contains(&("person_id".to_string(), format!("in.({person_id})"))));
    assert!(pairs.contains(&("date".to_string(), "gte.2024-01-01".to_string())));
    assert!(pairs.contains(&("date".to_string(), "lte.2024-12-31".to_string())));
    assert!(pairs.contains(&("year_known".to_string(), "is.true".to_string())));
    assert!(pairs.contains(&("order".to_string(), "date.asc".to_string())));
}

#[tokio::test]
async fn skips_the_request_when_no_persons_are_given() {
    let mock_server = MockServer::start().await;
    let store = PostgrestStore::new(&mock_server.uri(), "test-key");

    let dates = store.list_active_dates(&[], None).await.unwrap();
    assert!(dates.is_empty());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn translates_postgrest_error_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/v_persons"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "message": "permission denied for view v_persons"
        })))
        .mount(&mock_server)
        .await;

    let store = PostgrestStore::new(&mock_server.uri(), "test-key");
    let err = store.list_active_persons(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn delegates_upcoming_to_the_server_side_function() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let date_id = Uuid::new_v4();
    let person_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/upcoming_dates"))
        .and(body_json(json!({ "days_ahead": 14 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "date_id": date_id,
            "person_id": person_id,
            "label": "birthday",
            "event_date": "0001-06-05",
            "next_occurrence": "2024-06-05"
        }])))
        .mount(&mock_server)
        .await;

    let store = PostgrestStore::new(&mock_server.uri(), "test-key");
    let upcoming: Vec<UpcomingDate> = store
        .compute_upcoming(user_id, 14, date(2024, 6, 1))
        .await
        .unwrap();

    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].date_id, date_id);
    assert_eq!(upcoming[0].next_occurrence, date(2024, 6, 5));
}

#[tokio::test]
async fn rejects_invalid_payloads_before_any_request() {
    let mock_server = MockServer::start().await;
    let store = PostgrestStore::new(&mock_server.uri(), "test-key");

    let blank = NewDate {
        person_id: Uuid::new_v4(),
        label: "   ".to_string(),
        date: date(2024, 6, 1),
    };
    let err = store.create_date(&blank).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_view_names_are_honored() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    // the mock only matches when the custom view and schema reach the wire
    Mock::given(method("GET"))
        .and(path("/rest/v1/people_view"))
        .and(header("Accept-Profile", "crm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let options = kith_core::config::StoreOptions::default()
        .with_persons_view("people_view")
        .with_db_schema("crm");
    let store = PostgrestStore::new_with_options(&mock_server.uri(), "test-key", options);
    let persons = store.list_active_persons(user_id).await.unwrap();
    assert!(persons.is_empty());
}

#[tokio::test]
async fn updates_stamp_updated_at() {
    let mock_server = MockServer::start().await;
    let date_id = Uuid::new_v4();
    let person_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/dates"))
        .and(query_param("id", format!("eq.{date_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([date_row(
            date_id,
            person_id,
            "renamed",
            "2024-06-01",
            6,
            1,
            true
        )])))
        .mount(&mock_server)
        .await;

    let store = PostgrestStore::new(&mock_server.uri(), "test-key");
    let changes = kith_core::model::DateChanges {
        label: Some("renamed".to_string()),
        date: None,
    };
    let updated = store.update_date(date_id, &changes).await.unwrap();
    assert_eq!(updated.label, "renamed");

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["label"], "renamed");
    assert!(body.get("updated_at").is_some(), "partial updates carry a fresh updated_at");
    assert!(body.get("date").is_none(), "unset fields stay out of the payload");
}

#[tokio::test]
async fn soft_delete_patches_the_deletion_timestamp() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let person_id = Uuid::new_v4();

    let mut deleted = person_row(person_id, user_id, "Alice");
    deleted["deleted_at"] = json!("2024-06-01T12:00:00Z");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/persons"))
        .and(query_param("id", format!("eq.{person_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([deleted])))
        .mount(&mock_server)
        .await;

    let store = PostgrestStore::new(&mock_server.uri(), "test-key");
    let person = store.delete_person(person_id).await.unwrap();
    assert!(person.deleted_at.is_some());

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("deleted_at").is_some());
}

#[tokio::test]
async fn timeline_assembles_over_a_postgrest_store() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let alice_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/v_persons"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([person_row(alice_id, user_id, "Alice")])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/v_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            date_row(Uuid::new_v4(), alice_id, "graduation", "2024-07-04", 7, 4, true),
            date_row(Uuid::new_v4(), alice_id, "birthday", "0001-05-10", 5, 10, false),
        ])))
        .mount(&mock_server)
        .await;

    fn today() -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    let store = PostgrestStore::new(&mock_server.uri(), "test-key");
    let timelines = TimelineService::new(store).with_today_source(today);
    let entries = timelines
        .timeline_for_user(user_id, &TimelineOptions::default())
        .await
        .unwrap();

    let labels: Vec<&str> = entries.iter().map(|e| e.record.label.as_str()).collect();
    // the recurring birthday projects onto 2024-05-10, ahead of graduation
    assert_eq!(labels, ["birthday", "graduation"]);
    assert!(entries.iter().all(|e| e.person.name == "Alice"));
}
