// ── Device resolution ──
//
// Turns a `DeviceIdentifier` into the primary MAC the controller knows the
// device by. Hostnames are resolved locally first; the device list is only
// fetched once there is something to match against it.

use std::future::Future;
use std::net::IpAddr;

use tracing::debug;
use uniprov_api::{Device, MacAddress};

use crate::error::CoreError;
use crate::identifier::DeviceIdentifier;

/// What an identifier resolves to before the controller is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    /// The identifier was a MAC: use it verbatim.
    Resolved(MacAddress),
    /// IPs to look for among the controller's devices.
    Addresses {
        identifier: String,
        ips: Vec<IpAddr>,
    },
}

/// Resolve an identifier to candidate IPs without touching the controller.
///
/// Hostnames go through the system resolver; a lookup error or an empty
/// answer is a [`CoreError::ResolutionFailed`].
pub async fn resolve_candidates(identifier: &DeviceIdentifier) -> Result<Candidates, CoreError> {
    let ips = match identifier {
        DeviceIdentifier::Mac(mac) => return Ok(Candidates::Resolved(*mac)),
        DeviceIdentifier::Ip(ip) => vec![*ip],
        DeviceIdentifier::Hostname(host) => resolve_hostname(host).await?,
    };
    Ok(Candidates::Addresses {
        identifier: identifier.to_string(),
        ips,
    })
}

/// All addresses `host` resolves to, deduplicated, in resolver order.
pub async fn resolve_hostname(host: &str) -> Result<Vec<IpAddr>, CoreError> {
    let failed = |reason: String| CoreError::ResolutionFailed {
        identifier: host.to_owned(),
        reason,
    };

    let addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| failed(e.to_string()))?;

    let mut ips: Vec<IpAddr> = Vec::new();
    for addr in addrs {
        if !ips.contains(&addr.ip()) {
            ips.push(addr.ip());
        }
    }

    if ips.is_empty() {
        return Err(failed("no addresses found".into()));
    }
    debug!(host, ?ips, "resolved hostname");
    Ok(ips)
}

/// Pick the MAC for `candidates`, calling `fetch_devices` only if needed.
pub async fn select_mac<F, Fut>(
    candidates: Candidates,
    fetch_devices: F,
) -> Result<MacAddress, CoreError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Device>, CoreError>>,
{
    let (identifier, ips) = match candidates {
        Candidates::Resolved(mac) => return Ok(mac),
        Candidates::Addresses { identifier, ips } => (identifier, ips),
    };

    let devices = fetch_devices().await?;
    debug!(count = devices.len(), "matching against controller devices");

    find_mac(&devices, &ips).ok_or(CoreError::NoDeviceFound { identifier })
}

/// Resolve `identifier` end to end. See [`resolve_candidates`] and
/// [`select_mac`].
pub async fn resolve_identifier<F, Fut>(
    identifier: &DeviceIdentifier,
    fetch_devices: F,
) -> Result<MacAddress, CoreError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Device>, CoreError>>,
{
    let candidates = resolve_candidates(identifier).await?;
    select_mac(candidates, fetch_devices).await
}

/// Primary MAC of the first device (in list order) owning any of `ips` on
/// its primary address or one of its extra ports.
///
/// IPv4-mapped IPv6 addresses compare equal to their IPv4 form.
pub fn find_mac(devices: &[Device], ips: &[IpAddr]) -> Option<MacAddress> {
    devices
        .iter()
        .find(|device| {
            device
                .addresses()
                .any(|addr| ips.iter().any(|ip| ip.to_canonical() == addr.ip.to_canonical()))
        })
        .map(|device| device.primary.mac)
}
