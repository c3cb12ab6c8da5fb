// ── Forward → wire conversions ──

use pangosync_api::{NewResource, NewTarget, SiteId, Target};

use crate::model::Forward;

/// Resource body for a forward. `domain_id` is only used for HTTP.
pub fn new_resource(forward: &Forward, site_id: SiteId, domain_id: Option<&str>) -> NewResource {
    match forward {
        Forward::Http(h) => NewResource {
            name: h.fqdn(),
            site_id,
            http: true,
            protocol: "tcp".into(),
            subdomain: (!h.subdomain.is_empty()).then(|| h.subdomain.clone()),
            domain_id: domain_id.map(str::to_owned),
            proxy_port: None,
        },
        Forward::Port(p) => NewResource {
            name: p.resource_name(),
            site_id,
            http: false,
            protocol: p.protocol.as_str().into(),
            subdomain: None,
            domain_id: None,
            proxy_port: Some(p.source_port),
        },
    }
}

/// Enabled target body pointing at the forward's destination.
pub fn new_target(forward: &Forward) -> NewTarget {
    NewTarget {
        ip: forward.target_host().to_owned(),
        method: forward.target_method().to_owned(),
        port: forward.target_port(),
        enabled: true,
    }
}

/// Whether `target` already routes where `forward` wants.
///
/// Host and method compare case-insensitively; a target without a method
/// never matches.
pub fn target_matches(forward: &Forward, target: &Target) -> bool {
    target.ip.eq_ignore_ascii_case(forward.target_host())
        && target.port == forward.target_port()
        && target
            .method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(forward.target_method()))
}
