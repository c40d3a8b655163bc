//! Clap derive structures for the `pulsely` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use pulsely_core::api::filters::{Location, SortOrder, WorkoutSortKey};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pulsely -- your imported health metrics from the command line
#[derive(Debug, Parser)]
#[command(
    name = "pulsely",
    version,
    about = "View and import personal health metrics from the command line",
    long_about = "A command-line client for the Pulsely health metrics API.\n\n\
        Sign in once with `pulsely login` (hosted browser flow); the session\n\
        is restored silently on later invocations.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// API base URL (overrides configuration)
    #[arg(long, env = "PULSELY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PULSELY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides configuration)
    #[arg(long, env = "PULSELY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in through the hosted provider login page
    Login(LoginArgs),

    /// Sign out and discard the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List heart-rate records
    #[command(alias = "hr")]
    HeartRate(HeartRateArgs),

    /// List workouts
    #[command(alias = "w")]
    Workouts(WorkoutsArgs),

    /// Upload a health export file
    Import(ImportArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Local port for the provider's redirect back to the CLI
    #[arg(long, default_value = "8917")]
    pub port: u16,

    /// Print the login URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,
}

#[derive(Debug, Args)]
pub struct HeartRateArgs {
    /// Earliest date to include (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Latest date to include (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Number of results to return
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Also list the recovery series
    #[arg(long)]
    pub recovery: bool,
}

#[derive(Debug, Args)]
pub struct WorkoutsArgs {
    /// Earliest date to include (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Latest date to include (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Number of results to return
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Workout type (e.g. Running, Cycling)
    #[arg(long = "type")]
    pub workout_type: Option<String>,

    /// Indoor or outdoor workouts only
    #[arg(long)]
    pub location: Option<LocationArg>,

    /// Minimum duration in minutes
    #[arg(long)]
    pub min_duration: Option<f64>,

    /// Maximum duration in minutes
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// Minimum distance
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Maximum distance
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Sort field
    #[arg(long)]
    pub sort_by: Option<SortKeyArg>,

    /// Sort direction
    #[arg(long)]
    pub sort_order: Option<SortOrderArg>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Health export file to upload
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,
    /// Interactively create the configuration file
    Init,
    /// Print the configuration file location
    Path,
}

// ── Filter enum bridges ──────────────────────────────────────────────
//
// clap-facing mirrors of the API filter enums, so the api crate stays
// free of CLI dependencies.

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LocationArg {
    Indoor,
    Outdoor,
}

impl From<LocationArg> for Location {
    fn from(value: LocationArg) -> Self {
        match value {
            LocationArg::Indoor => Self::Indoor,
            LocationArg::Outdoor => Self::Outdoor,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKeyArg {
    StartDate,
    EndDate,
    Duration,
    Type,
    SourceName,
}

impl From<SortKeyArg> for WorkoutSortKey {
    fn from(value: SortKeyArg) -> Self {
        match value {
            SortKeyArg::StartDate => Self::StartDate,
            SortKeyArg::EndDate => Self::EndDate,
            SortKeyArg::Duration => Self::Duration,
            SortKeyArg::Type => Self::Type,
            SortKeyArg::SourceName => Self::SourceName,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(value: SortOrderArg) -> Self {
        match value {
            SortOrderArg::Asc => Self::Asc,
            SortOrderArg::Desc => Self::Desc,
        }
    }
}
