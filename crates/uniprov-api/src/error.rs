use thiserror::Error;

/// Top-level error type for the `uniprov-api` crate.
///
/// Covers every failure mode of a controller session: authentication,
/// transport, controller-reported errors, and malformed device data.
/// `uniprov-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login was rejected by the controller.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An operation was attempted before a successful login.
    #[error("Not logged in -- call login() before issuing controller requests")]
    NotAuthenticated,

    // ── Session scope ───────────────────────────────────────────────
    /// A site-scoped operation was attempted without a site identifier.
    #[error("No site selected for a site-scoped operation")]
    MissingSite,

    // ── Data ────────────────────────────────────────────────────────
    /// An IP or MAC address failed to parse.
    #[error("Invalid address: {message}")]
    InvalidAddress { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Controller ──────────────────────────────────────────────────
    /// Non-200 response, carrying the decoded controller message.
    #[error("{message}")]
    Controller { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or joining error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The caller cancelled the in-flight request.
    #[error("Request cancelled")]
    Cancelled,
}
