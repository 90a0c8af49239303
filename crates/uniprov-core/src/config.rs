// ── Runtime connection configuration ──
//
// Describes how to reach and log in to a controller. Carries credentials
// but never touches disk: the CLI builds a `ControllerConfig` and hands
// it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use uniprov_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one controller session.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// Site to operate on. Only site-scoped operations need it.
    pub site: Option<String>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl ControllerConfig {
    /// The configured site, or a usage error naming what is missing.
    pub fn require_site(&self) -> Result<&str, crate::CoreError> {
        self.site
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| crate::CoreError::Usage {
                message: "--site is required".into(),
            })
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}
