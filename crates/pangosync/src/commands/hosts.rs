//! `pangosync hosts`: what discovery would turn into HTTP forwards.

use pangosync_config::Settings;
use pangosync_core::discovery::{discover_hosts, split_hostname};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, HostsArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct HostRow {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Subdomain")]
    subdomain: String,
    #[tabled(rename = "Domain")]
    domain: String,
}

pub async fn handle(args: HostsArgs, settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let sites: Vec<_> = settings
        .traefik_sites
        .iter()
        .filter(|s| args.site.as_deref().is_none_or(|name| s.site_name == name))
        .collect();

    if let (Some(name), true) = (&args.site, sites.is_empty()) {
        return Err(CliError::NotFound {
            resource_type: "Traefik site".into(),
            identifier: name.clone(),
            list_command: "config show".into(),
        });
    }

    let mut rows = Vec::new();
    for site in sites {
        let client = config::traefik_client(settings, site)?;
        for host in discover_hosts(&site.discovery_site(), &client).await? {
            let (subdomain, domain) = split_hostname(&host);
            rows.push(HostRow {
                site: site.site_name.clone(),
                host,
                subdomain,
                domain,
            });
        }
    }

    let out = output::render_list(&global.output, &rows, HostRow::clone, |r| r.host.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

