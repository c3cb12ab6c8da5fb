// ── Orphan reaper ──
//
// Finds resources whose identity is not in the run's valid-key union and
// deletes them. Classification is pure; deletion is one independent call
// per orphan.

use pangosync_api::{Resource, ResourceId};
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::RemoteStateCache;
use crate::collector::ValidKeys;
use crate::control_plane::ControlPlane;
use crate::model::{ForwardKey, Protocol};
use crate::outcome::{Failure, Step};

/// A resource that no desired forward accounts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Orphan {
    pub resource_id: ResourceId,
    pub key: ForwardKey,
}

/// What happened to one orphan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReapedResource {
    #[serde(flatten)]
    pub orphan: Orphan,
    pub site_name: String,
    /// `old.example.com→ https://10.0.0.5:443 (site-a)` style label.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl ReapedResource {
    pub fn deleted(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapReport {
    pub resources: Vec<ReapedResource>,
}

impl ReapReport {
    pub fn deleted_count(&self) -> usize {
        self.resources.iter().filter(|r| r.deleted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.resources.len() - self.deleted_count()
    }
}

/// Identity key of a listed resource, if it has one the reaper understands.
fn resource_key(resource: &Resource) -> Option<ForwardKey> {
    if resource.http {
        return resource.domain_key().map(ForwardKey::Domain);
    }
    let protocol = match resource.protocol.as_deref() {
        Some("tcp") => Protocol::Tcp,
        Some("udp") => Protocol::Udp,
        _ => return None,
    };
    resource
        .proxy_port
        .map(|port| ForwardKey::Port(protocol, port))
}

/// Resources whose identity is absent from `valid`, in listing order.
///
/// Resources without an id, HTTP resources without a domain, port
/// resources without a port, and unknown kinds are never orphans.
pub fn classify_orphans(resources: &[Resource], valid: &ValidKeys) -> Vec<Orphan> {
    resources
        .iter()
        .filter_map(|r| {
            let resource_id = r.resource_id?;
            let key = resource_key(r)?;
            (!valid.contains(&key)).then_some(Orphan { resource_id, key })
        })
        .collect()
}

async fn describe<C: ControlPlane>(orphan: &Orphan, site_name: &str, plane: &C) -> String {
    let target = plane
        .list_targets(orphan.resource_id)
        .await
        .ok()
        .and_then(|t| t.into_iter().next());

    match (&orphan.key, target) {
        (ForwardKey::Domain(domain), Some(t)) => format!(
            "{domain}→ {}://{}:{} ({site_name})",
            t.method.as_deref().unwrap_or("unknown").to_lowercase(),
            t.ip,
            t.port
        ),
        (ForwardKey::Port(..), Some(t)) => {
            format!("{}→ {}:{} ({site_name})", orphan.key, t.ip, t.port)
        }
        (key, None) => format!("{key}→ unknown ({site_name})"),
    }
}

/// Delete every orphan in the cached resource list.
///
/// Invalidates the resource cache when at least one deletion succeeded.
pub async fn reap<C: ControlPlane>(
    cache: &mut RemoteStateCache,
    plane: &C,
    valid: &ValidKeys,
) -> ReapReport {
    if cache.resources().is_empty() {
        info!("No resources in cache to clean up");
        return ReapReport::default();
    }

    let orphans: Vec<(Orphan, String)> = classify_orphans(cache.resources(), valid)
        .into_iter()
        .map(|o| {
            let site = cache
                .resources()
                .iter()
                .find(|r| r.resource_id == Some(o.resource_id))
                .and_then(|r| r.site_id.as_ref());
            let site_name = cache.site_name_for(site).to_owned();
            (o, site_name)
        })
        .collect();

    let mut report = ReapReport::default();
    for (orphan, site_name) in orphans {
        let description = describe(&orphan, &site_name, plane).await;
        info!("[{description}] Deleting orphaned resource...");

        let failure = match plane.delete_resource(orphan.resource_id).await {
            Ok(()) => None,
            Err(e) => {
                warn!("[{description}] Failed to delete resource: {e}");
                Some(Failure::RemoteRejected {
                    step: Step::DeleteResource,
                    message: e.to_string(),
                })
            }
        };
        report.resources.push(ReapedResource {
            orphan,
            site_name,
            description,
            failure,
        });
    }

    let deleted = report.deleted_count();
    if deleted > 0 {
        info!("Deleted {deleted} orphaned resources");
        cache.invalidate_resources();
    } else {
        info!("No orphaned resources found");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(id: Option<u64>, domain: Option<&str>) -> Resource {
        Resource {
            resource_id: id,
            name: None,
            http: true,
            protocol: Some("tcp".into()),
            full_domain: domain.map(Into::into),
            proxy_port: None,
            site_id: None,
        }
    }

    fn port(id: u64, protocol: &str, port: Option<u16>) -> Resource {
        Resource {
            resource_id: Some(id),
            name: None,
            http: false,
            protocol: Some(protocol.into()),
            full_domain: None,
            proxy_port: port,
            site_id: None,
        }
    }

    fn valid() -> ValidKeys {
        let mut v = ValidKeys::default();
        v.insert(ForwardKey::Domain("new.example.com".into()));
        v.insert(ForwardKey::Port(Protocol::Tcp, 5000));
        v.insert(ForwardKey::Port(Protocol::Udp, 53));
        v
    }

    #[test]
    fn stale_domain_is_orphaned() {
        let orphans = classify_orphans(&[http(Some(1), Some("Old.Example.com"))], &valid());
        assert_eq!(
            orphans,
            vec![Orphan {
                resource_id: 1,
                key: ForwardKey::Domain("old.example.com".into()),
            }]
        );
    }

    #[test]
    fn valid_keys_are_kept() {
        let resources = [
            http(Some(1), Some("NEW.example.com")),
            port(2, "tcp", Some(5000)),
            port(3, "udp", Some(53)),
        ];
        assert!(classify_orphans(&resources, &valid()).is_empty());
    }

    #[test]
    fn port_protocols_are_checked_separately() {
        let resources = [port(2, "udp", Some(5000)), port(3, "tcp", Some(53))];
        let ids: Vec<_> = classify_orphans(&resources, &valid())
            .into_iter()
            .map(|o| o.resource_id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn incomplete_records_are_never_orphans() {
        let resources = [
            http(None, Some("old.example.com")),
            http(Some(1), None),
            http(Some(2), Some("")),
            port(3, "tcp", None),
            port(4, "sctp", Some(9)),
        ];
        assert!(classify_orphans(&resources, &valid()).is_empty());
    }

    #[test]
    fn classification_is_idempotent() {
        let resources = [http(Some(1), Some("old.example.com")), port(2, "tcp", Some(1))];
        let v = valid();
        assert_eq!(classify_orphans(&resources, &v), classify_orphans(&resources, &v));
    }
}
