//! Device listing handler.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use uniprov_core::{CoreError, Device};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

impl From<&Device> for DeviceRow {
    fn from(device: &Device) -> Self {
        Self {
            name: device.primary.name.clone(),
            ip: device.primary.ip.to_string(),
            mac: device.primary.mac.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Tabled)]
struct PortRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Extra Name")]
    extra_name: String,
    #[tabled(rename = "Extra IP")]
    extra_ip: String,
    #[tabled(rename = "Extra MAC")]
    extra_mac: String,
}

/// One row per extra port; the device columns are only filled on the
/// first. Devices without extra ports still get a row.
fn port_rows(devices: &[Device]) -> Vec<PortRow> {
    let mut rows = Vec::new();
    for device in devices {
        let DeviceRow { name, ip, mac } = DeviceRow::from(device);
        if device.extra_ports.is_empty() {
            rows.push(PortRow {
                name,
                ip,
                mac,
                extra_name: String::new(),
                extra_ip: String::new(),
                extra_mac: String::new(),
            });
            continue;
        }

        let mut head = Some((name, ip, mac));
        for port in &device.extra_ports {
            let (name, ip, mac) = head.take().unwrap_or_default();
            rows.push(PortRow {
                name,
                ip,
                mac,
                extra_name: port.name.clone(),
                extra_ip: port.ip.to_string(),
                extra_mac: port.mac.to_string(),
            });
        }
    }
    rows
}

pub async fn handle(
    args: DevicesArgs,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let controller = super::connect(global, true, cancel).await?;
    let mut devices = controller.list_devices().await.map_err(CoreError::from)?;
    devices.sort_by(|a, b| a.name().cmp(b.name()));

    let id_fn = |device: &Device| device.primary.mac.to_string();
    let out = if args.verbose_ports {
        output::render_list(global.output, &devices, port_rows, id_fn)?
    } else {
        output::render_list(
            global.output,
            &devices,
            |devices| devices.iter().map(DeviceRow::from).collect(),
            id_fn,
        )?
    };
    output::print_output(&out, global.quiet)
}
