// Controller facade
//
// Business operations on top of a `Session`: login, site listing, device
// listing, and device commands. Endpoint groups live in their own files as
// inherent `impl Controller` blocks; this module holds the shared
// envelope handling.

mod devices;
mod sites;

use reqwest::Method;
use secrecy::SecretString;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::models::DataEnvelope;
use crate::session::Session;

/// Prefix of every Network application endpoint behind the UniFi OS proxy.
const API_PREFIX: &str = "/proxy/network/api";

/// Length of the body preview kept in deserialization errors.
const PREVIEW_CHARS: usize = 200;

/// Authenticated access to one controller (and optionally one site).
pub struct Controller {
    session: Session,
}

impl Controller {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Log in; see [`Session::login`].
    pub async fn login(&mut self, password: &SecretString) -> Result<(), Error> {
        self.session.login(password).await
    }

    /// Controller-level path: `/proxy/network/api/{suffix}`.
    fn api_path(suffix: &str) -> String {
        format!("{API_PREFIX}/{suffix}")
    }

    /// Site-scoped path: `/proxy/network/api/s/{site}/{suffix}`.
    fn site_path(&self, suffix: &str) -> Result<String, Error> {
        let site = self.session.require_site()?;
        Ok(format!("{API_PREFIX}/s/{site}/{suffix}"))
    }

    /// GET `path` and unwrap the `{"Data": [...]}` envelope.
    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        let resp = self
            .session
            .send_request(Method::GET, path, None::<&()>)
            .await?;
        let body = self.session.read_body(resp).await?;

        let envelope: DataEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(PREVIEW_CHARS).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        Ok(envelope.data)
    }
}
