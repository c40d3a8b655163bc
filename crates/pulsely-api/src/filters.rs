//! Filter objects mapped 1:1 onto query-string parameters.
//!
//! Presence is explicit: a `Some` field is appended to the query string
//! (numbers in their decimal form), a `None` field is omitted entirely.
//! `Some(0)` is a real value and is sent — absence and zero are not
//! conflated.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters accepted by `GET /heart-rate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateFilters {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl HeartRateFilters {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_date(&mut params, "start_date", self.start_date);
        push_date(&mut params, "end_date", self.end_date);
        push_display(&mut params, "limit", self.limit);
        push_display(&mut params, "offset", self.offset);
        params
    }
}

/// Where a workout took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Indoor,
    Outdoor,
}

impl Location {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Indoor => "Indoor",
            Self::Outdoor => "Outdoor",
        }
    }
}

/// Sort key for workout listings. Wire names follow the server's
/// HealthKit-derived camelCase fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkoutSortKey {
    #[serde(rename = "startDate")]
    StartDate,
    #[serde(rename = "endDate")]
    EndDate,
    #[serde(rename = "duration")]
    Duration,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "sourceName")]
    SourceName,
}

impl WorkoutSortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::Duration => "duration",
            Self::Type => "type",
            Self::SourceName => "sourceName",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Query parameters accepted by `GET /workouts` — a superset of the
/// heart-rate filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutFilters {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub workout_type: Option<String>,
    pub location: Option<Location>,
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub sort_by: Option<WorkoutSortKey>,
    pub sort_order: Option<SortOrder>,
}

impl WorkoutFilters {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_date(&mut params, "start_date", self.start_date);
        push_date(&mut params, "end_date", self.end_date);
        push_display(&mut params, "limit", self.limit);
        push_display(&mut params, "offset", self.offset);
        if let Some(ref t) = self.workout_type {
            params.push(("workout_type", t.clone()));
        }
        if let Some(loc) = self.location {
            params.push(("location", loc.as_str().to_owned()));
        }
        push_display(&mut params, "min_duration", self.min_duration);
        push_display(&mut params, "max_duration", self.max_duration);
        push_display(&mut params, "min_distance", self.min_distance);
        push_display(&mut params, "max_distance", self.max_distance);
        if let Some(key) = self.sort_by {
            params.push(("sort_by", key.as_str().to_owned()));
        }
        if let Some(order) = self.sort_order {
            params.push(("sort_order", order.as_str().to_owned()));
        }
        params
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn push_date(
    params: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<DateTime<Utc>>,
) {
    if let Some(dt) = value {
        params.push((key, dt.to_rfc3339_opts(SecondsFormat::Secs, true)));
    }
}

fn push_display<T: std::fmt::Display>(
    params: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<T>,
) {
    if let Some(v) = value {
        params.push((key, v.to_string()));
    }
}
