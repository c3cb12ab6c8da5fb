//! `pangosync domains`: base domains registered on the control plane.

use pangosync_api::{Domain, PangolinClient};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Domain")]
    base_domain: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Domain> for DomainRow {
    fn from(d: &Domain) -> Self {
        Self {
            base_domain: d.base_domain.clone(),
            id: d.domain_id.clone(),
        }
    }
}

pub async fn handle(plane: &PangolinClient, global: &GlobalOpts) -> Result<(), CliError> {
    let domains = plane.list_domains().await?;
    let out = output::render_list(&global.output, &domains, |d| DomainRow::from(d), |d| {
        d.base_domain.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
