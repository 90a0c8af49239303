// ── Local neighbour table ──
//
// Answers "what MAC does this host have on the local segment" without a
// controller: read the kernel ARP cache, and if the entry is missing,
// send one ICMP echo to populate it and look again.

use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};
use tracing::{debug, warn};
use uniprov_api::MacAddress;

use crate::error::CoreError;
use crate::identifier::DeviceIdentifier;
use crate::resolver::{Candidates, resolve_candidates};

/// Kernel ARP cache (Linux).
pub const ARP_TABLE: &str = "/proc/net/arp";

/// Column of the hardware address in [`ARP_TABLE`].
const HW_ADDRESS_COLUMN: usize = 3;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const PROBE_PAYLOAD: [u8; 56] = [0; 56];

/// Find the MAC for `ip` in the text of an ARP table.
///
/// `None` when no complete entry exists. Incomplete entries carry an
/// all-zero hardware address and count as missing. A row whose MAC column
/// does not parse is an error.
pub fn parse_arp_table(contents: &str, ip: IpAddr) -> Option<Result<MacAddress, CoreError>> {
    let wanted = ip.to_string();

    let mut row = contents
        .lines()
        .skip(1)
        .map(str::split_whitespace)
        .find_map(|mut fields| (fields.next() == Some(wanted.as_str())).then_some(fields))?;

    // The IP column is already consumed.
    let Some(hw) = row.nth(HW_ADDRESS_COLUMN - 1) else {
        return Some(Err(malformed(ip, "missing hardware address column")));
    };

    match hw.parse::<MacAddress>() {
        Ok(mac) if mac.octets() == [0; 6] => None,
        Ok(mac) => Some(Ok(mac)),
        Err(e) => Some(Err(malformed(ip, &e.to_string()))),
    }
}

fn malformed(ip: IpAddr, reason: &str) -> CoreError {
    CoreError::ResolutionFailed {
        identifier: ip.to_string(),
        reason: format!("bad entry in {ARP_TABLE}: {reason}"),
    }
}

/// Look `ip` up in the kernel ARP cache.
pub async fn lookup_arp(ip: IpAddr) -> Result<Option<MacAddress>, CoreError> {
    let contents = tokio::fs::read_to_string(ARP_TABLE)
        .await
        .map_err(|e| CoreError::ResolutionFailed {
            identifier: ip.to_string(),
            reason: format!("cannot read {ARP_TABLE}: {e}"),
        })?;
    parse_arp_table(&contents, ip).transpose()
}

/// Send a single ICMP echo to `ip` and wait for the reply.
///
/// Uses an unprivileged datagram ICMP socket where the kernel allows it.
pub async fn probe(ip: IpAddr) -> Result<(), CoreError> {
    debug!(%ip, "probing");
    let failed = |reason: String| CoreError::ResolutionFailed {
        identifier: ip.to_string(),
        reason,
    };

    let config = match ip {
        IpAddr::V4(_) => Config::default(),
        IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
    };
    let client = Client::new(&config).map_err(|e| failed(format!("cannot open ICMP socket: {e}")))?;

    let id = u16::try_from(std::process::id() % u32::from(u16::MAX)).unwrap_or(1);
    client
        .pinger(ip, PingIdentifier(id))
        .await
        .timeout(PROBE_TIMEOUT)
        .ping(PingSequence(0), &PROBE_PAYLOAD)
        .await
        .map_err(|e| failed(format!("no echo reply: {e}")))?;
    Ok(())
}

/// MAC of `identifier` on the local segment.
///
/// MACs come back unchanged. Otherwise the first candidate IP is looked up
/// in the ARP cache, probing once if the cache has no entry yet.
pub async fn local_mac(identifier: &DeviceIdentifier) -> Result<MacAddress, CoreError> {
    let ip = match resolve_candidates(identifier).await? {
        Candidates::Resolved(mac) => return Ok(mac),
        Candidates::Addresses { ips, .. } => ips.first().copied().ok_or_else(|| {
            CoreError::ResolutionFailed {
                identifier: identifier.to_string(),
                reason: "no addresses found".into(),
            }
        })?,
    };

    if let Some(mac) = lookup_arp(ip).await? {
        return Ok(mac);
    }

    warn!(%ip, "no neighbour entry, probing to populate it");
    probe(ip).await?;

    lookup_arp(ip)
        .await?
        .ok_or_else(|| CoreError::NoDeviceFound {
            identifier: identifier.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TABLE: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         aa:bb:cc:00:00:02     *        eth0
192.168.1.7      0x1         0x0         00:00:00:00:00:00     *        eth0
10.0.0.5         0x1         0x2         AA:BB:CC:00:00:03     *        eth1
192.168.1.9      0x1         0x2         not-a-mac             *        eth0
";

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn finds_complete_entry() {
        let mac = parse_arp_table(TABLE, ip("192.168.1.1")).unwrap().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:00:00:02");

        let mac = parse_arp_table(TABLE, ip("10.0.0.5")).unwrap().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:00:00:03");
    }

    #[test]
    fn missing_and_incomplete_entries_are_none() {
        assert!(parse_arp_table(TABLE, ip("192.168.1.50")).is_none());
        assert!(parse_arp_table(TABLE, ip("192.168.1.7")).is_none());
    }

    #[test]
    fn header_is_never_matched() {
        assert!(parse_arp_table("IP address HW type\n", ip("192.168.1.1")).is_none());
        assert!(parse_arp_table("", ip("192.168.1.1")).is_none());
    }

    #[test]
    fn no_prefix_matches() {
        // 192.168.1.1 must not match 192.168.1.10 or vice versa.
        let table = "IP address HW type Flags HW address Mask Device\n\
                     192.168.1.10 0x1 0x2 aa:bb:cc:00:00:10 * eth0\n";
        assert!(parse_arp_table(table, ip("192.168.1.1")).is_none());
    }

    #[test]
    fn malformed_mac_is_an_error() {
        let result = parse_arp_table(TABLE, ip("192.168.1.9")).unwrap();
        assert!(matches!(result, Err(CoreError::ResolutionFailed { .. })));
    }

    #[test]
    fn truncated_row_is_an_error() {
        let table = "IP address HW type Flags HW address Mask Device\n192.168.1.1 0x1\n";
        let result = parse_arp_table(table, ip("192.168.1.1")).unwrap();
        assert!(matches!(result, Err(CoreError::ResolutionFailed { .. })));
    }

    #[tokio::test]
    async fn mac_identifier_is_returned_unchanged() {
        let id = DeviceIdentifier::classify("aa-bb-cc-dd-ee-ff");
        let mac = local_mac(&id).await.unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }
}
