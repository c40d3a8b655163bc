#![allow(clippy::unwrap_used)]
// Behavioral tests for the data-access feeds, backed by wiremock.

use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulsely_core::api::filters::{HeartRateFilters, WorkoutFilters};
use pulsely_core::api::{ApiClient, IdentityProvider, ProviderConfig, TokenSet};
use pulsely_core::{HeartRateFeed, Session, WorkoutFeed};

// ── Helpers ─────────────────────────────────────────────────────────

fn token_set(valid_for_secs: i64) -> TokenSet {
    TokenSet {
        access_token: SecretString::from("at-test"),
        id_token: Some("idt-test".to_owned()),
        refresh_token: Some(SecretString::from("rt-test")),
        expires_at: Utc::now() + chrono::Duration::seconds(valid_for_secs),
    }
}

/// Anonymous session with both HTTP surfaces pointed at one mock server.
async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let http = reqwest::Client::new();
    let api = ApiClient::from_reqwest(&server.uri(), http.clone()).unwrap();
    let provider = IdentityProvider::from_reqwest(
        ProviderConfig {
            domain: server.uri(),
            client_id: "client-test".into(),
            audience: "pulsely-api".into(),
        },
        http,
    );
    (server, Session::new(provider, api))
}

/// Session that has already signed in, with the identity endpoints mocked.
async fn signed_in() -> (MockServer, Session) {
    let (server, session) = setup().await;
    mount_identity(&server).await;
    session.install_tokens(token_set(3600)).await;
    (server, session)
}

async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "auth0|u1",
            "email": "runner@example.com",
            "permissions": []
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sub": "auth0|u1" })))
        .mount(server)
        .await;
}

fn heart_rate_body(avg: f64) -> serde_json::Value {
    json!({
        "data": [{
            "id": 1,
            "date": "2024-06-15T07:30:00",
            "source": "Apple Watch",
            "units": "bpm",
            "avg": { "value": avg, "unit": "bpm" }
        }],
        "recovery_data": [],
        "summary": {
            "total_records": 1,
            "avg_heart_rate": avg,
            "max_heart_rate": avg,
            "min_heart_rate": avg,
            "avg_recovery_rate": 0.0,
            "max_recovery_rate": 0.0,
            "min_recovery_rate": 0.0
        },
        "meta": {
            "requested_at": "2024-06-15T08:00:00Z",
            "filters": {},
            "result_count": 1
        }
    })
}

fn workouts_body(count: usize) -> serde_json::Value {
    let workouts: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("w{i}"),
                "type": "Running",
                "startDate": "2024-06-14T06:00:00",
                "endDate": "2024-06-14T06:45:00",
                "duration": 45.0,
                "durationUnit": "min",
                "sourceName": "Apple Watch"
            })
        })
        .collect();
    json!({
        "data": workouts,
        "meta": { "requested_at": "2024-06-15T08:00:00Z", "result_count": count }
    })
}

// ── Success path ────────────────────────────────────────────────────

#[tokio::test]
async fn heart_rate_success_populates_every_field() {
    let (server, session) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/heart-rate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(heart_rate_body(132.0)))
        .mount(&server)
        .await;

    let feed = HeartRateFeed::new(
        session.clone(),
        session.api_client(),
        HeartRateFilters::default(),
    );
    feed.refetch().await;

    let state = feed.state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.data.samples.len(), 1);
    assert_eq!(state.data.samples[0].avg.as_ref().unwrap().value, 132.0);
    assert_eq!(state.data.summary.as_ref().unwrap().total_records, 1);
    assert_eq!(state.data.meta.as_ref().unwrap().result_count, 1);
}

// ── Stale-on-error ──────────────────────────────────────────────────

#[tokio::test]
async fn failed_refetch_keeps_previous_data() {
    let (server, session) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workouts_body(2)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workouts"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "boom" })))
        .mount(&server)
        .await;

    let feed = WorkoutFeed::new(
        session.clone(),
        session.api_client(),
        WorkoutFilters::default(),
    );

    feed.refetch().await;
    assert_eq!(feed.state().data.workouts.len(), 2);
    assert_eq!(feed.state().error, None);

    feed.refetch().await;
    let state = feed.state();
    assert_eq!(state.data.workouts.len(), 2, "stale data survives the error");
    let error = state.error.expect("error should be recorded");
    assert!(error.contains("boom"), "unexpected error: {error}");
    assert!(!state.loading);
}

// ── Sequential refetches ────────────────────────────────────────────

#[tokio::test]
async fn second_awaited_refetch_wins() {
    let (server, session) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workouts_body(1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workouts_body(3)))
        .mount(&server)
        .await;

    let feed = WorkoutFeed::new(
        session.clone(),
        session.api_client(),
        WorkoutFilters::default(),
    );
    feed.refetch().await;
    feed.refetch().await;

    let state = feed.state();
    assert_eq!(state.data.workouts.len(), 3);
    assert_eq!(state.data.meta.as_ref().unwrap().result_count, 3);
}

// ── Authentication guards ───────────────────────────────────────────

#[tokio::test]
async fn anonymous_refetch_is_a_silent_noop() {
    let (server, session) = setup().await;

    let feed = HeartRateFeed::new(
        session.clone(),
        session.api_client(),
        HeartRateFilters::default(),
    );
    feed.refetch().await;

    let state = feed.state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert!(state.data.samples.is_empty());
    assert!(
        server.received_requests().await.unwrap().is_empty(),
        "no request may be issued while anonymous"
    );
}

#[tokio::test]
async fn missing_token_surfaces_the_no_token_error() {
    let (server, session) = setup().await;

    // Expired access token and a refresh endpoint that rejects: silent
    // retrieval resolves to None, so the feed errors without a request.
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    session.install_tokens(token_set(0)).await;

    let feed = HeartRateFeed::new(
        session.clone(),
        session.api_client(),
        HeartRateFilters::default(),
    );
    feed.refetch().await;

    let state = feed.state();
    assert_eq!(state.error.as_deref(), Some("No access token available"));
    assert!(state.data.samples.is_empty());

    let hr_requests: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/heart-rate")
        .collect();
    assert!(hr_requests.is_empty(), "no API call without a token");
}

// ── Filter changes ──────────────────────────────────────────────────

#[tokio::test]
async fn changing_filters_refetches_with_the_new_query() {
    let (server, session) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/heart-rate"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(heart_rate_body(101.0)))
        .mount(&server)
        .await;

    let feed = HeartRateFeed::new(
        session.clone(),
        session.api_client(),
        HeartRateFilters::default(),
    );

    let filters = HeartRateFilters {
        limit: Some(2),
        ..Default::default()
    };
    feed.set_filters(filters.clone()).await;
    assert_eq!(feed.state().data.samples.len(), 1);

    // Setting identical filters must not trigger another request.
    let before = server.received_requests().await.unwrap().len();
    feed.set_filters(filters).await;
    let after = server.received_requests().await.unwrap().len();
    assert_eq!(before, after);
}

// ── Session watcher ─────────────────────────────────────────────────

#[tokio::test]
async fn session_watcher_populates_the_feed_after_sign_in() {
    let (server, session) = setup().await;
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/heart-rate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(heart_rate_body(120.0)))
        .mount(&server)
        .await;

    let feed = HeartRateFeed::new(
        session.clone(),
        session.api_client(),
        HeartRateFilters::default(),
    );
    let watcher = feed.spawn_session_watcher();
    let mut updates = feed.subscribe();

    session.install_tokens(token_set(3600)).await;

    let populated = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if !updates.borrow_and_update().data.samples.is_empty() {
                break;
            }
            updates.changed().await.unwrap();
        }
    })
    .await;
    assert!(populated.is_ok(), "feed never populated after sign-in");

    watcher.abort();
}
