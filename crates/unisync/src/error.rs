//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and cycle-level `CoreError`s into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use unisync_config::ConfigError;
use unisync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFIG: i32 = 4;
    pub const PARTIAL_SYNC: i32 = 5;
    pub const INTERRUPTED: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(unisync::no_config),
        help(
            "Create it, or point to another file with --config / UNISYNC_CONFIG.\n\
             Run: unisync config path"
        )
    )]
    NoConfig { path: String },

    #[error("No controllers configured")]
    #[diagnostic(
        code(unisync::no_controllers),
        help("Add at least one [[controllers]] entry with a host and an API key.")
    )]
    NoControllers,

    #[error("Controller '{id}' is configured more than once")]
    #[diagnostic(
        code(unisync::duplicate_controller),
        help("Give each controller a distinct `name`.")
    )]
    DuplicateController { id: String },

    #[error("No API key for controller '{controller}'")]
    #[diagnostic(
        code(unisync::no_credentials),
        help(
            "Set api_key_env to an environment variable holding the key,\n\
             or store it in the keyring: unisync config set-key {controller}"
        )
    )]
    NoCredentials { controller: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unisync::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(unisync::config))]
    Config(Box<ConfigError>),

    // ── Sync ─────────────────────────────────────────────────────────
    #[error("Sync finished with failures: {failed_operations} failed operation(s), {failed_controllers} unreachable controller(s)")]
    #[diagnostic(
        code(unisync::partial_sync),
        help("Successful changes were kept. Run with -v for details; the next cycle retries.")
    )]
    PartialSync {
        failed_operations: usize,
        failed_controllers: usize,
    },

    #[error("Sync cycle cancelled before any change was made")]
    #[diagnostic(code(unisync::cancelled))]
    Cancelled,

    #[error(transparent)]
    #[diagnostic(code(unisync::sync))]
    Sync(CoreError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(unisync::json))]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization failed: {0}")]
    #[diagnostic(code(unisync::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NoConfig { .. }
            | Self::NoControllers
            | Self::DuplicateController { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::Validation { .. } => exit_code::USAGE,
            Self::PartialSync { .. } => exit_code::PARTIAL_SYNC,
            Self::Cancelled => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::NoControllers => CliError::NoControllers,
            ConfigError::DuplicateController { id } => CliError::DuplicateController { id },
            ConfigError::NoCredentials { controller } => CliError::NoCredentials { controller },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoControllers => CliError::NoControllers,
            CoreError::DuplicateController { id } => CliError::DuplicateController { id },
            CoreError::Cancelled => CliError::Cancelled,
            other => CliError::Sync(other),
        }
    }
}
