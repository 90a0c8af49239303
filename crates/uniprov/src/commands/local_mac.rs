//! Local neighbour-table lookup. Needs no controller.

use serde::Serialize;

use uniprov_core::{DeviceIdentifier, MacAddress};

use crate::cli::{GlobalOpts, LocalMacArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Neighbour<'a> {
    host: &'a str,
    mac: MacAddress,
}

pub async fn handle(args: &LocalMacArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let identifier = DeviceIdentifier::classify(&args.host);
    let mac = uniprov_core::local_mac(&identifier).await?;

    let result = Neighbour {
        host: &args.host,
        mac,
    };
    let out = output::render_single(
        global.output,
        &result,
        |r| format!("{} is at {}", r.host, r.mac),
        |r| r.mac.to_string(),
    )?;
    output::print_output(&out, global.quiet)
}
