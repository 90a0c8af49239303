// Site listing is controller-scoped, not site-scoped.

use tracing::debug;

use super::Controller;
use crate::error::Error;
use crate::models::{RawSite, Site};

impl Controller {
    /// List all sites visible to the logged-in user.
    ///
    /// `GET /proxy/network/api/stat/sites`
    pub async fn list_sites(&self) -> Result<Vec<Site>, Error> {
        self.session.require_authenticated()?;
        debug!("listing sites");

        let raw: Vec<RawSite> = self.get_data(&Self::api_path("stat/sites")).await?;
        Ok(raw.into_iter().map(Site::from).collect())
    }
}
