//! `pangosync resources`: what the control plane currently holds.

use pangosync_api::{PangolinClient, Resource};
use pangosync_core::RemoteStateCache;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// A resource with its site reference resolved to a name.
#[derive(Serialize)]
struct ResourceView<'a> {
    #[serde(flatten)]
    resource: &'a Resource,
    site_name: &'a str,
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Domain / Port")]
    entry: String,
    #[tabled(rename = "Site")]
    site: String,
}

fn kind(r: &Resource) -> String {
    if r.http {
        "HTTP".into()
    } else {
        r.protocol.as_deref().unwrap_or("?").to_uppercase()
    }
}

fn entry(r: &Resource) -> String {
    if r.http {
        r.full_domain.clone().unwrap_or_default()
    } else {
        r.proxy_port.map(|p| p.to_string()).unwrap_or_default()
    }
}

impl From<&ResourceView<'_>> for ResourceRow {
    fn from(v: &ResourceView<'_>) -> Self {
        Self {
            id: v.resource.resource_id.map(|id| id.to_string()).unwrap_or_default(),
            kind: kind(v.resource),
            name: v.resource.name.clone().unwrap_or_default(),
            entry: entry(v.resource),
            site: v.site_name.to_owned(),
        }
    }
}

pub async fn handle(plane: PangolinClient, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cache = RemoteStateCache::new();
    cache.build(&plane).await?;

    let views: Vec<ResourceView<'_>> = cache
        .resources()
        .iter()
        .map(|resource| ResourceView {
            resource,
            site_name: cache.site_name_for(resource.site_id.as_ref()),
        })
        .collect();

    let out = output::render_list(&global.output, &views, |v| ResourceRow::from(v), |v| {
        format!("{}\t{}", kind(v.resource), entry(v.resource))
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
