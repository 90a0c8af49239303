//! Force-provision handler.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use uniprov_core::{DeviceIdentifier, MacAddress};

use crate::cli::{ForceProvisionArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Provisioned {
    device: String,
    mac: MacAddress,
}

pub async fn handle(
    args: ForceProvisionArgs,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    // Validate the identifier (and resolve hostnames) before asking for a
    // password or touching the controller.
    let identifier = DeviceIdentifier::classify(&args.device);
    let candidates = uniprov_core::resolve_candidates(&identifier).await?;
    debug!(?candidates, "identifier resolved locally");

    let controller = super::connect(global, true, cancel).await?;
    let mac = uniprov_core::force_provision_candidates(&controller, candidates).await?;

    let result = Provisioned {
        device: args.device,
        mac,
    };
    let out = output::render_single(
        global.output,
        &result,
        |r| format!("Force-provision sent to {} ({})", r.device, r.mac),
        |r| r.mac.to_string(),
    )?;
    output::print_output(&out, global.quiet)
}
