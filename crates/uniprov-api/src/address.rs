// ── Device addresses ──
//
// MacAddress and DeviceAddress are the validated forms of the
// name/IP/MAC triples the controller reports for each device and port.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::Error;

// ── MacAddress ──────────────────────────────────────────────────────

/// 48-bit hardware address.
///
/// Parses colon- or hyphen-separated hex in any case and always displays
/// in lowercase colon-separated form (`aa:bb:cc:dd:ee:ff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAddress {
            message: format!("{s:?} is not a 6-byte hardware address"),
        };

        let sep = if s.contains(':') {
            ':'
        } else if s.contains('-') {
            '-'
        } else {
            return Err(invalid());
        };

        let mut octets = [0u8; 6];
        let mut count = 0;
        for group in s.split(sep) {
            let slot = octets.get_mut(count).ok_or_else(invalid)?;
            if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(group, 16).map_err(|_| invalid())?;
            count += 1;
        }

        if count != octets.len() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── DeviceAddress ───────────────────────────────────────────────────

/// One named network interface: a device's primary address or one of
/// its extra ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceAddress {
    pub name: String,
    pub ip: IpAddr,
    pub mac: MacAddress,
}

/// Validate a name/IP/MAC triple into a [`DeviceAddress`].
///
/// The name is kept verbatim. Fails with [`Error::InvalidAddress`] if
/// either the IP or the MAC does not parse; no partial record is built.
pub fn parse_address(name: &str, ip_text: &str, mac_text: &str) -> Result<DeviceAddress, Error> {
    let ip = ip_text
        .parse::<IpAddr>()
        .map_err(|e| Error::InvalidAddress {
            message: format!("bad IP {ip_text:?}: {e}"),
        })?;

    let mac = mac_text.parse::<MacAddress>().map_err(|e| match e {
        Error::InvalidAddress { message } => Error::InvalidAddress {
            message: format!("bad MAC: {message}"),
        },
        other => other,
    })?;

    Ok(DeviceAddress {
        name: name.to_owned(),
        ip,
        mac,
    })
}
