//! Site command handler.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use uniprov_core::{CoreError, Site};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Site> for SiteRow {
    fn from(site: &Site) -> Self {
        Self {
            name: site.name.clone(),
            description: site.description.clone(),
        }
    }
}

pub async fn handle(global: &GlobalOpts, cancel: CancellationToken) -> Result<(), CliError> {
    let controller = super::connect(global, false, cancel).await?;
    let sites = controller.list_sites().await.map_err(CoreError::from)?;

    let out = output::render_list(
        global.output,
        &sites,
        |sites| sites.iter().map(SiteRow::from).collect(),
        |site| site.name.clone(),
    )?;
    output::print_output(&out, global.quiet)
}
