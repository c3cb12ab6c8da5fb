//! `pangosync sites`: control-plane sites.

use pangosync_api::{PangolinClient, Site};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Nice ID")]
    nice_id: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            id: s.site_id,
            name: s.name.clone(),
            nice_id: s.nice_id.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(plane: &PangolinClient, global: &GlobalOpts) -> Result<(), CliError> {
    let sites = plane.list_sites().await?;
    let out = output::render_list(&global.output, &sites, |s| SiteRow::from(s), |s| {
        s.name.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
