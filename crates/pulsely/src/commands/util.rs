//! Shared helpers for command handlers: configuration resolution,
//! session bootstrap, and date parsing.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::warn;

use pulsely_config::Config;
use pulsely_core::api::{ApiClient, IdentityProvider, ProviderConfig, TransportConfig};
use pulsely_core::{CoreError, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load configuration and apply CLI flag overrides (flags win).
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = pulsely_config::load_config_or_default()?;
    if let Some(ref url) = global.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(timeout) = global.timeout {
        config.timeout_secs = timeout;
    }
    Ok(config)
}

/// Build an anonymous session from configuration.
pub fn build_session(config: &Config) -> Result<Session, CliError> {
    if !config.has_provider() {
        return Err(CliError::ProviderNotConfigured);
    }

    let transport =
        TransportConfig::default().with_timeout(Duration::from_secs(config.timeout_secs));
    let api = ApiClient::new(&config.api.base_url, &transport).map_err(CoreError::Api)?;
    let provider = IdentityProvider::new(
        ProviderConfig {
            domain: config.auth.domain.clone(),
            client_id: config.auth.client_id.clone(),
            audience: config.auth.audience.clone(),
        },
        &transport,
    )
    .map_err(CoreError::Api)?;

    Ok(Session::new(provider, api))
}

/// Build a session and restore it from the stored refresh token.
///
/// Keyring trouble is treated as "not signed in" rather than a hard
/// failure, so a headless machine still gets the actionable auth hint.
pub async fn establish_session(global: &GlobalOpts) -> Result<(Config, Session), CliError> {
    let config = load_config(global)?;
    let session = build_session(&config)?;

    let refresh_token = match pulsely_config::resolve_refresh_token() {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "keyring unavailable");
            None
        }
    };
    let Some(refresh_token) = refresh_token else {
        return Err(CliError::AuthRequired);
    };

    match session.restore(refresh_token).await {
        Ok(()) => Ok((config, session)),
        // A rejected refresh token means the stored session is dead.
        Err(CoreError::Api(pulsely_core::api::Error::Provider { message })) => {
            warn!(%message, "stored session could not be restored");
            Err(CliError::AuthRequired)
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse a user-supplied date bound: RFC 3339, or a bare `YYYY-MM-DD`
/// taken as midnight UTC.
pub fn parse_date(value: &str, field: &str) -> Result<DateTime<Utc>, CliError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(CliError::Validation {
        field: field.into(),
        reason: format!("invalid date '{value}' (use RFC 3339 or YYYY-MM-DD)"),
    })
}

/// Parse an optional `--start`/`--end` pair and check ordering.
pub fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), CliError> {
    let start = start.map(|s| parse_date(s, "start")).transpose()?;
    let end = end.map(|s| parse_date(s, "end")).transpose()?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(CliError::Validation {
                field: "start".into(),
                reason: "start must be <= end".into(),
            });
        }
    }
    Ok((start, end))
}
