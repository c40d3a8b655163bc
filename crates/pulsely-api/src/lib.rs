//! Async client for the Pulsely health metrics API.
//!
//! Two HTTP surfaces live here:
//!
//! - [`ApiClient`] — the backend REST API (`/me`, `/heart-rate`,
//!   `/workouts`, `/import-data`), authenticated with a bearer token.
//! - [`IdentityProvider`] — the hosted OIDC provider that issues those
//!   tokens (authorize redirect, code exchange, silent refresh,
//!   `/userinfo` profile claims).
//!
//! Both are plain request/response wrappers; session state, token
//! caching, and fetch orchestration live in `pulsely-core`.

mod client;
mod error;
pub mod filters;
mod provider;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::Error;
pub use provider::{IdentityProvider, ProviderConfig, TokenSet};
pub use transport::TransportConfig;
