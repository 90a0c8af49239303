//! Command dispatch: bridges CLI args -> core workflows -> output formatting.

pub mod devices;
pub mod local_mac;
pub mod provision;
pub mod sites;

use tokio_util::sync::CancellationToken;

use uniprov_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a command to its handler.
pub async fn dispatch(
    cmd: Command,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites => sites::handle(global, cancel).await,
        Command::Devices(args) => devices::handle(args, global, cancel).await,
        Command::ForceProvision(args) => provision::handle(args, global, cancel).await,
        Command::LocalMac(args) => local_mac::handle(&args, global).await,
        // Completions never reach the network and is handled in main.
        Command::Completions(_) => Err(CliError::Internal(
            "completions dispatched as a controller command".into(),
        )),
    }
}

/// Resolve configuration, then log in. With `need_site`, a missing site
/// is reported before any prompt or network traffic.
async fn connect(
    global: &GlobalOpts,
    need_site: bool,
    cancel: CancellationToken,
) -> Result<Controller, CliError> {
    let controller_config = config::build_controller_config(global, need_site)?;
    let controller = if need_site {
        uniprov_core::connect_site(&controller_config, Some(cancel)).await?
    } else {
        uniprov_core::connect(&controller_config, Some(cancel)).await?
    };
    Ok(controller)
}
