// ── Session bootstrap ──

use tokio_util::sync::CancellationToken;
use tracing::debug;
use uniprov_api::{Controller, Session};

use crate::config::ControllerConfig;
use crate::error::CoreError;

/// Build a session from `config`, log in, and hand back the facade.
///
/// `cancel` aborts whatever request is in flight when it fires, login
/// included.
pub async fn connect(
    config: &ControllerConfig,
    cancel: Option<CancellationToken>,
) -> Result<Controller, CoreError> {
    debug!(url = %config.url, site = ?config.site, "connecting");

    let mut session = Session::new(
        config.url.clone(),
        config.username.clone(),
        config.site.clone(),
        &config.transport(),
    )?;
    if let Some(token) = cancel {
        session = session.with_cancellation(token);
    }

    let mut controller = Controller::new(session);
    controller.login(&config.password).await?;
    Ok(controller)
}

/// Like [`connect`], but refuses to touch the network without a site.
pub async fn connect_site(
    config: &ControllerConfig,
    cancel: Option<CancellationToken>,
) -> Result<Controller, CoreError> {
    config.require_site()?;
    connect(config, cancel).await
}
