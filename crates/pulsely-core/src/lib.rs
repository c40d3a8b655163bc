//! Business logic for pulsely.
//!
//! Sits between the raw HTTP clients in `pulsely-api` and the
//! presentation layer: [`Session`] wraps the identity provider and owns
//! token material; [`HeartRateFeed`], [`WorkoutFeed`], and
//! [`ImportTask`] are per-resource state machines holding
//! `{data, loading, error}` snapshots behind watch channels.

mod error;
mod feed;
mod import;
mod session;

pub use pulsely_api as api;

pub use error::CoreError;
pub use feed::{FeedState, HeartRateData, HeartRateFeed, WorkoutData, WorkoutFeed};
pub use import::{ImportState, ImportTask};
pub use session::Session;
