// ── Provisioning workflow ──

use tracing::info;
use uniprov_api::{Controller, MacAddress};

use crate::error::CoreError;
use crate::identifier::DeviceIdentifier;
use crate::resolver::{Candidates, resolve_candidates, select_mac};

/// Resolve `identifier` against the controller's devices and force-provision
/// the match. Returns the MAC that was provisioned.
pub async fn force_provision_device(
    controller: &Controller,
    identifier: &DeviceIdentifier,
) -> Result<MacAddress, CoreError> {
    let candidates = resolve_candidates(identifier).await?;
    force_provision_candidates(controller, candidates).await
}

/// Second half of [`force_provision_device`], for callers that resolved
/// the identifier before connecting.
pub async fn force_provision_candidates(
    controller: &Controller,
    candidates: Candidates,
) -> Result<MacAddress, CoreError> {
    let mac = select_mac(candidates, move || async move {
        controller.list_devices().await.map_err(CoreError::from)
    })
    .await?;

    info!(%mac, "provisioning device");
    controller.force_provision(mac).await?;
    Ok(mac)
}
