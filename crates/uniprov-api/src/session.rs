// Controller session
//
// One cookie-bearing HTTP client bound to one controller base URL. Owns
// the login state machine (Unauthenticated -> Authenticated, no way back),
// the single request primitive every endpoint goes through, and the
// decoding of controller error bodies.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};
use url::Url;

use crate::csrf;
use crate::error::Error;
use crate::models::ErrorEnvelope;
use crate::transport::TransportConfig;

/// UniFi OS login endpoint.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Header the UniFi OS proxy checks against the token cookie.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Upper bound on how much of an error body is read.
const MAX_ERROR_BODY: usize = 1000;

/// An HTTP session with a single controller.
///
/// Not meant to be shared between concurrent callers: the authenticated
/// flag is plain state and the cookie jar is rewritten by every response.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    site: Option<String>,
    cookie_jar: Arc<Jar>,
    timeout: Duration,
    cancel: CancellationToken,
    authenticated: bool,
}

impl Session {
    /// Create an unauthenticated session.
    ///
    /// Uses the transport's cookie jar if it has one, otherwise creates a
    /// fresh jar. An empty `site` is treated as no site.
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        site: Option<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let (http, cookie_jar) = transport.build_client()?;

        Ok(Self {
            http,
            base_url,
            username: username.into(),
            site: site.filter(|s| !s.is_empty()),
            cookie_jar,
            timeout: transport.timeout,
            cancel: CancellationToken::new(),
            authenticated: false,
        })
    }

    /// Abort in-flight requests with [`Error::Cancelled`] once `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The site identifier, if one was configured.
    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Fail with [`Error::NotAuthenticated`] unless `login` has succeeded.
    pub fn require_authenticated(&self) -> Result<(), Error> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }

    /// The site identifier, or [`Error::MissingSite`].
    pub fn require_site(&self) -> Result<&str, Error> {
        self.site().ok_or(Error::MissingSite)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in with the session's username.
    ///
    /// The controller answers with session cookies (including `TOKEN`)
    /// which the jar replays on every later request. Any non-200 answer
    /// becomes [`Error::Authentication`] and the session stays logged out.
    pub async fn login(&mut self, password: &SecretString) -> Result<(), Error> {
        debug!(username = %self.username, "logging in at {}", self.base_url);

        let body = json!({
            "username": self.username,
            "password": password.expose_secret(),
        });

        match self.send_request(Method::POST, LOGIN_PATH, Some(&body)).await {
            Ok(_) => {
                self.authenticated = true;
                info!(username = %self.username, "login successful");
                Ok(())
            }
            Err(Error::Controller { message, .. }) => Err(Error::Authentication { message }),
            Err(e) => Err(e),
        }
    }

    // ── CSRF ─────────────────────────────────────────────────────────

    /// Derive the CSRF token from the cookies currently held for the
    /// base URL. `None` is not an error; requests just go without it.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.cookie_jar.cookies(&self.base_url)?;
        let token = csrf::from_cookie_header(header.to_str().ok()?);
        trace!(found = token.is_some(), "derived CSRF token");
        token
    }

    // ── Request primitive ────────────────────────────────────────────

    /// Send one request and return the open response on HTTP 200.
    ///
    /// `path` is resolved against the base URL as a relative reference.
    /// Non-200 responses are decoded into [`Error::Controller`].
    pub async fn send_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.base_url.join(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        builder = match body {
            Some(body) => builder.json(body),
            None => builder.header(CONTENT_TYPE, "application/json"),
        };
        if let Some(token) = self.csrf_token() {
            builder = builder.header(CSRF_HEADER, token);
        }

        let resp = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(Error::Cancelled),
            result = builder.send() => result.map_err(|e| self.transport_error(e))?,
        };

        if resp.status() != StatusCode::OK {
            return Err(self.decode_error(resp).await);
        }
        Ok(resp)
    }

    /// Read a whole response body as text, abandoning it on cancellation.
    pub async fn read_body(&self, resp: reqwest::Response) -> Result<String, Error> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = resp.text() => result.map_err(|e| self.transport_error(e)),
        }
    }

    /// Turn a non-200 response into [`Error::Controller`].
    ///
    /// Reads at most [`MAX_ERROR_BODY`] bytes; a failed read just ends the
    /// body. Cancellation wins over whatever was read so far.
    async fn decode_error(&self, mut resp: reqwest::Response) -> Error {
        let status = resp.status();
        let mut body = Vec::new();

        while body.len() < MAX_ERROR_BODY {
            let chunk = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Error::Cancelled,
                chunk = resp.chunk() => chunk,
            };
            match chunk {
                Ok(Some(chunk)) => {
                    let take = chunk.len().min(MAX_ERROR_BODY - body.len());
                    body.extend_from_slice(&chunk[..take]);
                }
                Ok(None) | Err(_) => break,
            }
        }

        Error::Controller {
            status: status.as_u16(),
            message: error_message(status, &body),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

// ── Error decoding ───────────────────────────────────────────────────

/// Message for an error response: the controller's first reported error
/// if the body is a non-empty `{"Errors": [...]}`, else the status line.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if let Some(first) = envelope.errors.into_iter().next() {
            return format!("error from controller: {first}");
        }
    }

    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_str()),
        None => status.as_str().to_owned(),
    }
}
