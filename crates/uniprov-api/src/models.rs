// Controller wire types and the validated domain types built from them.
//
// The controller's JSON is documented with capitalized keys (`Data`,
// `Name`, `IP`, ...) but UniFi OS emits lowercase ones; every field
// accepts both spellings. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

use crate::address::{DeviceAddress, parse_address};
use crate::error::Error;

// ── Envelopes ────────────────────────────────────────────────────────

/// Success envelope wrapping every listing:
/// ```json
/// { "Data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(rename = "Data", alias = "data", default = "Vec::new")]
    pub data: Vec<T>,
}

/// Best-effort error envelope on non-200 responses:
/// ```json
/// { "Errors": ["site not found"] }
/// ```
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "Errors", alias = "errors", default)]
    pub errors: Vec<String>,
}

// ── Raw records ──────────────────────────────────────────────────────

/// Site entry from `stat/sites`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSite {
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "Desc", alias = "desc", default)]
    pub desc: String,
}

/// Device entry from `stat/device`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDevice {
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "IP", alias = "ip", default)]
    pub ip: String,
    #[serde(rename = "MAC", alias = "mac", default)]
    pub mac: String,
    #[serde(default)]
    pub network_table: Vec<RawPort>,
}

/// One row of a device's `network_table`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPort {
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "IP", alias = "ip", default)]
    pub ip: String,
    #[serde(rename = "MAC", alias = "mac", default)]
    pub mac: String,
}

// ── Domain types ─────────────────────────────────────────────────────

/// A site managed by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub name: String,
    pub description: String,
}

impl From<RawSite> for Site {
    fn from(raw: RawSite) -> Self {
        Self {
            name: raw.name,
            description: raw.desc,
        }
    }
}

/// A managed device: its primary address plus any extra ports.
///
/// Extra ports are additional interfaces of the same unit, e.g. a
/// gateway's WAN side, each with its own IP and MAC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub primary: DeviceAddress,
    pub extra_ports: Vec<DeviceAddress>,
}

impl Device {
    pub fn name(&self) -> &str {
        &self.primary.name
    }

    /// The primary address first, then extra ports in controller order.
    pub fn addresses(&self) -> impl Iterator<Item = &DeviceAddress> {
        std::iter::once(&self.primary).chain(self.extra_ports.iter())
    }
}

impl TryFrom<RawDevice> for Device {
    type Error = Error;

    fn try_from(raw: RawDevice) -> Result<Self, Self::Error> {
        let primary = parse_address(&raw.name, &raw.ip, &raw.mac)
            .map_err(|e| with_context(e, &format!("device {:?}", raw.name)))?;

        let extra_ports = raw
            .network_table
            .iter()
            .enumerate()
            .map(|(idx, port)| {
                parse_address(&port.name, &port.ip, &port.mac).map_err(|e| {
                    with_context(
                        e,
                        &format!("device {:?} port {idx} ({:?})", raw.name, port.name),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            primary,
            extra_ports,
        })
    }
}

fn with_context(err: Error, context: &str) -> Error {
    match err {
        Error::InvalidAddress { message } => Error::InvalidAddress {
            message: format!("{context}: {message}"),
        },
        other => other,
    }
}
