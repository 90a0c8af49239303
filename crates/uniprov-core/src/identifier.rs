// ── Device identifiers ──
//
// What the operator typed on the command line, classified once into a
// MAC, an IP literal, or a hostname. Everything downstream matches on the
// variant instead of re-probing the string.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use uniprov_api::MacAddress;

/// A user-supplied device identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentifier {
    /// Already a hardware address; nothing left to resolve.
    Mac(MacAddress),
    /// An IP literal, to be matched against controller devices.
    Ip(IpAddr),
    /// Anything else: resolved through the system resolver.
    Hostname(String),
}

impl DeviceIdentifier {
    /// Classify raw input. MAC wins over IP, IP over hostname.
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(mac) = raw.parse::<MacAddress>() {
            Self::Mac(mac)
        } else if let Ok(ip) = raw.parse::<IpAddr>() {
            Self::Ip(ip)
        } else {
            Self::Hostname(raw.to_owned())
        }
    }
}

impl FromStr for DeviceIdentifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::classify(s))
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mac(mac) => write!(f, "{mac}"),
            Self::Ip(ip) => write!(f, "{ip}"),
            Self::Hostname(host) => f.write_str(host),
        }
    }
}
