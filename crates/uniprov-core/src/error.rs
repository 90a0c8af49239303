// ── Core error types ──
//
// User-facing errors from uniprov-core. The `From<uniprov_api::Error>`
// impl translates transport-layer errors into domain variants, so
// consumers never match on reqwest or serde failures directly.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    /// Required configuration missing before any network call.
    #[error("Usage error: {message}")]
    Usage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Operation cancelled")]
    Cancelled,

    // ── Controller errors ────────────────────────────────────────────
    #[error("No site selected -- pass --site or set it in the profile")]
    MissingSite,

    #[error("{message}")]
    Controller { message: String, status: u16 },

    #[error("Invalid address in controller data: {message}")]
    InvalidAddress { message: String },

    // ── Resolution errors ────────────────────────────────────────────
    #[error("Failed to resolve {identifier}: {reason}")]
    ResolutionFailed { identifier: String, reason: String },

    #[error("No device found for {identifier}")]
    NoDeviceFound { identifier: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<uniprov_api::Error> for CoreError {
    fn from(err: uniprov_api::Error) -> Self {
        match err {
            uniprov_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            uniprov_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "not logged in".into(),
            },
            uniprov_api::Error::MissingSite => CoreError::MissingSite,
            uniprov_api::Error::InvalidAddress { message } => {
                CoreError::InvalidAddress { message }
            }
            uniprov_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            uniprov_api::Error::Controller { status, message } => {
                CoreError::Controller { message, status }
            }
            // The session already turns request timeouts into `Timeout`.
            uniprov_api::Error::Transport(e) => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            uniprov_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            uniprov_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            uniprov_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            uniprov_api::Error::Cancelled => CoreError::Cancelled,
        }
    }
}
