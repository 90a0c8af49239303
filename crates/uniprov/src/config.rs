//! CLI-owned configuration: TOML profiles, credential resolution, and
//! translation to `uniprov_core::ControllerConfig`.
//!
//! Core never sees these types -- it receives a pre-built `ControllerConfig`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use uniprov_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Password fallback when no `--password-env` is configured.
pub const PASSWORD_ENV: &str = "UNIPROV_PASSWORD";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── TOML config structs ──────────────────────────────────────────────

/// CLI-owned TOML configuration. Core never touches this type.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when --profile is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// One controller.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://192.168.1.1").
    pub controller: Option<String>,
    pub site: Option<String>,
    pub username: Option<String>,
    /// Environment variable holding the password.
    pub password_env: Option<String>,
    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,
    pub insecure: Option<bool>,
    pub timeout: Option<u64>,
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "uniprov", "uniprov").map_or_else(
        || {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config/uniprov/config.toml")
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from file + environment. A missing file is fine.
///
/// Environment keys nest on a double underscore:
/// `UNIPROV_PROFILES__HOME__SITE` sets `profiles.home.site`.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("UNIPROV_").split("__").filter(|key| {
            // Flag-backed variables (UNIPROV_SITE, ...) belong to clap.
            let key = key.as_str().to_ascii_lowercase();
            key == "default_profile" || key.starts_with("defaults.") || key.starts_with("profiles.")
        }));

    Ok(figment.extract()?)
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the config file, profile, and flags.
///
/// Checks run in a fixed order so the cheapest mistake is reported first:
/// site (when `need_site`), controller, username, then the password, which
/// may prompt.
pub fn build_controller_config(
    global: &GlobalOpts,
    need_site: bool,
) -> Result<ControllerConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let fallback = Profile::default();
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile,
        // An explicitly named profile has to exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => &fallback,
    };

    resolve_profile(profile, &cfg.defaults, global, need_site, resolve_password)
}

/// Translate a CLI `Profile` + global flags into a `ControllerConfig`.
///
/// This is the single boundary where CLI config types cross into core types.
pub fn resolve_profile(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
    need_site: bool,
    password: impl FnOnce(Option<&str>) -> Result<SecretString, CliError>,
) -> Result<ControllerConfig, CliError> {
    // 1. Site (flag > env > profile)
    let site = global
        .site
        .clone()
        .or_else(|| profile.site.clone())
        .filter(|s| !s.is_empty());
    if need_site && site.is_none() {
        return Err(CliError::Usage {
            message: "--site is required".into(),
        });
    }

    // 2. Controller URL
    let url_str = global
        .controller
        .as_deref()
        .or(profile.controller.as_deref())
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 3. Username
    let username = global
        .username
        .clone()
        .or_else(|| profile.username.clone())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CliError::Usage {
            message: "--username is required".into(),
        })?;

    // 4. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 5. Timeout
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    // 6. Password, last: it may prompt.
    let password_env = global
        .password_env
        .as_deref()
        .or(profile.password_env.as_deref());
    let password = password(password_env)?;

    Ok(ControllerConfig {
        url,
        username,
        password,
        site,
        tls,
        timeout: Duration::from_secs(timeout),
    })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

// ── Credential helpers ───────────────────────────────────────────────

/// Password from the named env var, else `UNIPROV_PASSWORD`, else a prompt.
///
/// A named variable that is unset or empty is an error; it never falls
/// through to the prompt.
fn resolve_password(env_name: Option<&str>) -> Result<SecretString, CliError> {
    if let Some(name) = env_name {
        return match std::env::var(name) {
            Ok(pw) if !pw.is_empty() => Ok(SecretString::from(pw)),
            _ => Err(CliError::NoCredentials {
                reason: format!("no password found in environment variable {name}"),
            }),
        };
    }

    if let Some(pw) = std::env::var(PASSWORD_ENV).ok().filter(|pw| !pw.is_empty()) {
        return Ok(SecretString::from(pw));
    }

    rpassword::prompt_password("Password: ")
        .map(SecretString::from)
        .map_err(|e| CliError::NoCredentials {
            reason: format!("failed to read password: {e}"),
        })
}
