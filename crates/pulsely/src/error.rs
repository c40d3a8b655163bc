//! CLI error types with miette diagnostics.
//!
//! Maps core/config failures into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use pulsely_core::CoreError;

/// Exit codes for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in")]
    #[diagnostic(
        code(pulsely::auth_required),
        help("Sign in with: pulsely login")
    )]
    AuthRequired,

    #[error("No identity provider configured")]
    #[diagnostic(
        code(pulsely::no_provider),
        help(
            "Set auth.domain and auth.client_id in the configuration file,\n\
             or run: pulsely config init"
        )
    )]
    ProviderNotConfigured,

    #[error("Sign-in failed: {message}")]
    #[diagnostic(
        code(pulsely::login_failed),
        help("Try again with: pulsely login")
    )]
    LoginFailed { message: String },

    // ── Data access ──────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(pulsely::fetch_failed))]
    Fetch { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pulsely::validation))]
    Validation { field: String, reason: String },

    // ── Pass-through layers ──────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(pulsely::api))]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(code(pulsely::config))]
    Config(#[from] pulsely_config::ConfigError),

    #[error(transparent)]
    #[diagnostic(code(pulsely::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthRequired | Self::ProviderNotConfigured | Self::LoginFailed { .. } => {
                exit_code::AUTH
            }
            Self::Validation { .. } => exit_code::USAGE,
            Self::Core(CoreError::NotAuthenticated | CoreError::NoAccessToken) => exit_code::AUTH,
            Self::Core(CoreError::Api(e)) => match e {
                pulsely_core::api::Error::Unauthorized | pulsely_core::api::Error::Provider { .. } => {
                    exit_code::AUTH
                }
                pulsely_core::api::Error::Transport(_) => exit_code::CONNECTION,
                e if e.is_not_found() => exit_code::NOT_FOUND,
                _ => exit_code::GENERAL,
            },
            _ => exit_code::GENERAL,
        }
    }
}
