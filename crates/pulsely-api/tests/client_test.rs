#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulsely_api::filters::{HeartRateFilters, Location, SortOrder, WorkoutFilters, WorkoutSortKey};
use pulsely_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn heart_rate_body() -> serde_json::Value {
    json!({
        "data": [{
            "id": 1,
            "workout_id": "7cbf1440-5c2e-4ff5-9f42-0c7e3a7d2a11",
            "date": "2024-06-15T07:30:00",
            "source": "Apple Watch",
            "units": "bpm",
            "avg": { "value": 132.4, "unit": "bpm" },
            "min": { "value": 98.0, "unit": "bpm" },
            "max": { "value": 171.0, "unit": "bpm" }
        }],
        "recovery_data": [],
        "summary": {
            "total_records": 1,
            "avg_heart_rate": 132.4,
            "max_heart_rate": 171.0,
            "min_heart_rate": 98.0,
            "avg_recovery_rate": 0.0,
            "max_recovery_rate": 0.0,
            "min_recovery_rate": 0.0
        },
        "meta": {
            "requested_at": "2024-06-15T08:00:00Z",
            "filters": { "limit": 5 },
            "result_count": 1,
            "date_range": { "start": "1900-01-01T00:00:00Z", "end": "2024-06-15T08:00:00Z" }
        }
    })
}

// ── Current user ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_current_user() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "auth0|u1",
            "email": "runner@example.com",
            "permissions": ["read:health"]
        })))
        .mount(&server)
        .await;

    let user = client.get_current_user("token-abc").await.unwrap();

    assert_eq!(user.user_id, "auth0|u1");
    assert_eq!(user.email, "runner@example.com");
    assert_eq!(user.permissions, vec!["read:health"]);
}

// ── Heart rate ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_heart_rate_parses_full_payload() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/heart-rate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(heart_rate_body()))
        .mount(&server)
        .await;

    let resp = client
        .get_heart_rate_data("t", &HeartRateFilters::default())
        .await
        .unwrap();

    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.data[0].avg.as_ref().unwrap().value, 132.4);
    assert!(resp.recovery_data.is_empty());
    assert_eq!(resp.summary.total_records, 1);
    assert_eq!(resp.meta.result_count, 1);
}

#[tokio::test]
async fn test_heart_rate_limit_is_the_only_param() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/heart-rate"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(heart_rate_body()))
        .mount(&server)
        .await;

    let filters = HeartRateFilters {
        limit: Some(5),
        ..Default::default()
    };
    client.get_heart_rate_data("t", &filters).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("limit=5"));
}

// ── Workouts ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_workouts_empty_filters_have_no_query_string() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "meta": { "requested_at": "2024-06-15T08:00:00Z", "result_count": 0 }
        })))
        .mount(&server)
        .await;

    client
        .get_workouts("t", &WorkoutFilters::default())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_workouts_full_filter_set() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/workouts"))
        .and(query_param("workout_type", "Running"))
        .and(query_param("location", "Outdoor"))
        .and(query_param("sort_by", "startDate"))
        .and(query_param("sort_order", "desc"))
        .and(query_param("min_duration", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "w1",
                "type": "Running",
                "startDate": "2024-06-14T06:00:00",
                "endDate": "2024-06-14T06:45:00",
                "duration": 45.0,
                "durationUnit": "min",
                "sourceName": "Apple Watch",
                "user_id": "auth0|u1",
                "summary": {
                    "total_statistics": 4,
                    "avg_statistic_value": 10.0,
                    "max_statistic_value": 20.0,
                    "min_statistic_value": 5.0,
                    "avg_heart_rate": 140.0,
                    "max_heart_rate": 175.0,
                    "min_heart_rate": 90.0,
                    "total_calories": 512.0
                }
            }],
            "meta": { "requested_at": "2024-06-15T08:00:00Z", "result_count": 1 }
        })))
        .mount(&server)
        .await;

    let filters = WorkoutFilters {
        workout_type: Some("Running".into()),
        location: Some(Location::Outdoor),
        min_duration: Some(20.0),
        sort_by: Some(WorkoutSortKey::StartDate),
        sort_order: Some(SortOrder::Desc),
        ..Default::default()
    };
    let resp = client.get_workouts("t", &filters).await.unwrap();

    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.data[0].workout_type.as_deref(), Some("Running"));
    assert_eq!(resp.data[0].summary.as_ref().unwrap().total_calories, 512.0);
}

// ── Import ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_import_sends_multipart_file_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/import-data"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("export.json"))
        .and(body_string_contains("{\"workouts\":[]}"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "response": "imported 0 records" })),
        )
        .mount(&server)
        .await;

    let ack = client
        .import_data("t", "export.json", b"{\"workouts\":[]}".to_vec())
        .await
        .unwrap();

    assert_eq!(ack["response"], "imported 0 records");
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_dedicated_variant() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_current_user("stale").await;

    assert!(
        matches!(result, Err(Error::Unauthorized)),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_carries_status_and_detail() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/heart-rate"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "database unavailable" })),
        )
        .mount(&server)
        .await;

    let result = client
        .get_heart_rate_data("t", &HeartRateFilters::default())
        .await;

    match result {
        Err(Error::Api {
            status, message, ..
        }) => {
            assert_eq!(status, 500);
            assert!(
                message.contains("database unavailable"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.get_workouts("t", &WorkoutFilters::default()).await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
