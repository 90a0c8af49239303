// Device listing via stat/device and commands via cmd/devmgr.

use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use super::Controller;
use crate::address::MacAddress;
use crate::error::Error;
use crate::models::{Device, RawDevice};

impl Controller {
    /// List every device of the current site, extra ports included.
    ///
    /// `GET /proxy/network/api/s/{site}/stat/device`
    ///
    /// All-or-nothing: the first device or port with a bad IP or MAC fails
    /// the whole listing.
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        self.session.require_authenticated()?;
        let path = self.site_path("stat/device")?;
        debug!("listing devices");

        let raw: Vec<RawDevice> = self.get_data(&path).await?;
        raw.into_iter().map(Device::try_from).collect()
    }

    /// Make a device re-fetch and reapply its full configuration.
    ///
    /// `POST /proxy/network/api/s/{site}/cmd/devmgr` with
    /// `{"mac": "...", "cmd": "force-provision"}`
    pub async fn force_provision(&self, mac: MacAddress) -> Result<(), Error> {
        self.session.require_authenticated()?;
        let path = self.site_path("cmd/devmgr")?;
        debug!(%mac, "force-provisioning device");

        let body = json!({
            "mac": mac.to_string(),
            "cmd": "force-provision",
        });
        self.session
            .send_request(Method::POST, &path, Some(&body))
            .await?;

        info!(%mac, "force-provision accepted");
        Ok(())
    }
}
