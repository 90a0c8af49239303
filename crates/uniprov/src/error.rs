//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use uniprov_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Usage ────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(uniprov::usage), help("See: uniprov --help"))]
    Usage { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(uniprov::validation))]
    Validation { field: String, reason: String },

    #[error("No site selected")]
    #[diagnostic(
        code(uniprov::missing_site),
        help("Pass --site, or set `site` in your profile. Run: uniprov sites")
    )]
    MissingSite,

    // ── Configuration ────────────────────────────────────────────────
    #[error("No controller configured")]
    #[diagnostic(
        code(uniprov::no_config),
        help(
            "Pass --controller (or UNIPROV_CONTROLLER), or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(uniprov::profile_not_found), help("Available profiles: {available}"))]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(uniprov::config))]
    Config(Box<figment::Error>),

    // ── Authentication ───────────────────────────────────────────────
    #[error("No password available: {reason}")]
    #[diagnostic(
        code(uniprov::no_credentials),
        help("Use --password-env NAME with NAME set, set UNIPROV_PASSWORD, or run interactively.")
    )]
    NoCredentials { reason: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(uniprov::auth_failed),
        help("Check --username and the password. Local controller accounts are required.")
    )]
    AuthFailed { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(uniprov::connection_failed),
        help(
            "Check that the controller is reachable.\n\
             Self-signed certificate? Use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(uniprov::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Interrupted")]
    #[diagnostic(code(uniprov::cancelled))]
    Cancelled,

    // ── Resolution ───────────────────────────────────────────────────
    #[error("Could not resolve '{identifier}': {reason}")]
    #[diagnostic(code(uniprov::resolution))]
    Resolution { identifier: String, reason: String },

    #[error("No device found for '{identifier}'")]
    #[diagnostic(
        code(uniprov::not_found),
        help("Run: uniprov devices -x to see every address the controller knows")
    )]
    NotFound { identifier: String },

    // ── Controller ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(uniprov::controller))]
    Controller { status: u16, message: String },

    #[error("{message}")]
    #[diagnostic(code(uniprov::invalid_address))]
    InvalidAddress { message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(uniprov::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(uniprov::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(uniprov::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. }
            | Self::Validation { .. }
            | Self::MissingSite
            | Self::NoConfig { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            Self::NoCredentials { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Resolution { .. } | Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Usage { message } => CliError::Usage { message },
            CoreError::Config { message } => CliError::Validation {
                field: "controller".into(),
                reason: message,
            },
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Cancelled => CliError::Cancelled,
            CoreError::MissingSite => CliError::MissingSite,
            CoreError::Controller { message, status } => CliError::Controller { status, message },
            CoreError::InvalidAddress { message } => CliError::InvalidAddress { message },
            CoreError::ResolutionFailed { identifier, reason } => {
                CliError::Resolution { identifier, reason }
            }
            CoreError::NoDeviceFound { identifier } => CliError::NotFound { identifier },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
