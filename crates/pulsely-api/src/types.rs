//! Wire types for the Pulsely API.
//!
//! All of these are plain data carried verbatim from server responses;
//! nothing here is derived or mutated client-side. Timestamps formatted
//! by the server are kept as strings — the upstream serializer emits a
//! mix of naive and `Z`-suffixed ISO 8601, so parsing into a fixed
//! offset type would reject live payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identity ─────────────────────────────────────────────────────────

/// The server's notion of the signed-in user (`GET /me`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Profile claims from the identity provider (`GET /userinfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

// ── Heart rate ───────────────────────────────────────────────────────

/// A single aggregated reading with its unit (e.g. `72.5 bpm`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateValue {
    pub value: f64,
    pub unit: String,
}

/// One heart-rate record tied to a workout.
///
/// Serves both the primary and the recovery series — the wire shape is
/// identical for the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub id: i64,
    #[serde(default)]
    pub workout_id: Option<Uuid>,
    /// ISO 8601 as formatted by the server.
    pub date: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub avg: Option<HeartRateValue>,
    #[serde(default)]
    pub min: Option<HeartRateValue>,
    #[serde(default)]
    pub max: Option<HeartRateValue>,
}

/// Aggregate statistics computed server-side over the matched range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeartRateSummary {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub avg_heart_rate: f64,
    #[serde(default)]
    pub max_heart_rate: f64,
    #[serde(default)]
    pub min_heart_rate: f64,
    #[serde(default)]
    pub avg_recovery_rate: f64,
    #[serde(default)]
    pub max_recovery_rate: f64,
    #[serde(default)]
    pub min_recovery_rate: f64,
}

/// The date range a response covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Pagination and provenance metadata echoed with a heart-rate response.
///
/// `filters` is kept opaque: the server echoes whatever parameter set it
/// applied, and that shape has drifted between deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateMeta {
    pub requested_at: String,
    #[serde(default)]
    pub filters: serde_json::Value,
    #[serde(default)]
    pub result_count: u64,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// Full payload of `GET /heart-rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateResponse {
    #[serde(default)]
    pub data: Vec<HeartRateSample>,
    #[serde(default)]
    pub recovery_data: Vec<HeartRateSample>,
    pub summary: HeartRateSummary,
    pub meta: HeartRateMeta,
}

// ── Workouts ─────────────────────────────────────────────────────────

/// Aggregate statistics nested in a workout record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkoutSummary {
    #[serde(default)]
    pub total_statistics: u64,
    #[serde(default)]
    pub avg_statistic_value: f64,
    #[serde(default)]
    pub max_statistic_value: f64,
    #[serde(default)]
    pub min_statistic_value: f64,
    #[serde(default)]
    pub avg_heart_rate: f64,
    #[serde(default)]
    pub max_heart_rate: f64,
    #[serde(default)]
    pub min_heart_rate: f64,
    #[serde(default)]
    pub total_calories: f64,
}

/// One imported workout.
///
/// The server mixes camelCase (HealthKit-derived) and snake_case field
/// names on this record; renames are per-field rather than blanket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    #[serde(rename = "type", default)]
    pub workout_type: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(rename = "durationUnit", default)]
    pub duration_unit: Option<String>,
    #[serde(rename = "sourceName", default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub summary: Option<WorkoutSummary>,
}

/// Provenance metadata echoed with a workout response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutMeta {
    pub requested_at: String,
    #[serde(default)]
    pub result_count: u64,
}

/// Full payload of `GET /workouts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutResponse {
    #[serde(default)]
    pub data: Vec<Workout>,
    pub meta: WorkoutMeta,
}
