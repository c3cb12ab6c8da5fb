// ── Drift detection and application ──
//
// Brings one desired forward into line with the control plane. Every path
// ends in an `Outcome`; nothing here returns an error to the caller.

use pangosync_api::{Resource, SiteId};
use tracing::{debug, error, info, warn};

use crate::cache::RemoteStateCache;
use crate::config::ExistingPolicy;
use crate::control_plane::ControlPlane;
use crate::convert::{new_resource, new_target, target_matches};
use crate::model::Forward;
use crate::outcome::{Failure, Outcome, Step};

/// Apply one forward against the cached snapshot.
pub async fn apply<C: ControlPlane>(
    forward: &Forward,
    cache: &RemoteStateCache,
    plane: &C,
    policy: ExistingPolicy,
) -> Outcome {
    let Some(existing) = cache.find(&forward.key()) else {
        return create(forward, cache, plane).await;
    };

    match policy {
        ExistingPolicy::Skip => {
            info!("[{forward}] Already in Pangolin. Skipping...");
            Outcome::Skipped
        }
        ExistingPolicy::Update => update(forward, existing, plane).await,
    }
}

fn rejected(forward: &Forward, step: Step, err: &pangosync_api::Error) -> Outcome {
    error!("[{forward}] {step} failed: {err}");
    Failure::RemoteRejected {
        step,
        message: err.to_string(),
    }
    .into()
}

// ── Create path ─────────────────────────────────────────────────────

/// Resolve the ids a new resource needs: `(siteId, domainId)`.
fn resolve_ids<'a>(
    forward: &Forward,
    cache: &'a RemoteStateCache,
) -> Result<(SiteId, Option<&'a str>), Failure> {
    let domain_id = match forward {
        Forward::Http(h) => {
            let Some(id) = cache.lookup_domain_id(&h.domain) else {
                return Err(Failure::MissingDomain {
                    domain: h.domain.clone(),
                });
            };
            Some(id)
        }
        Forward::Port(_) => None,
    };
    let site_id = cache
        .lookup_site_id(forward.site_name())
        .ok_or_else(|| Failure::MissingSite {
            site_name: forward.site_name().to_owned(),
        })?;
    Ok((site_id, domain_id))
}

async fn create<C: ControlPlane>(forward: &Forward, cache: &RemoteStateCache, plane: &C) -> Outcome {
    let kind = forward.kind_label();
    let (site_id, domain_id) = match resolve_ids(forward, cache) {
        Ok(ids) => ids,
        Err(failure) => {
            if matches!(failure, Failure::MissingDomain { .. }) {
                error!("[{forward}] {failure}; is the domain registered in Pangolin?");
            } else {
                error!("[{forward}] {failure}");
            }
            return failure.into();
        }
    };

    info!("[{forward}] Creating {kind} resource...");
    let body = new_resource(forward, site_id, domain_id);
    let resource_id = match plane.create_resource(site_id, &body).await {
        Ok(id) => id,
        Err(e) => return rejected(forward, Step::CreateResource, &e),
    };

    if matches!(forward, Forward::Http(_)) {
        info!("[{forward}] Disabling SSO...");
        if let Err(e) = plane.disable_sso(resource_id).await {
            return rejected(forward, Step::DisableSso, &e);
        }
    }

    info!("[{forward}] Creating {kind} target...");
    match plane.create_target(resource_id, &new_target(forward)).await {
        Ok(target_id) => Outcome::Created {
            resource_id,
            target_id,
        },
        Err(e) => rejected(forward, Step::CreateTarget, &e),
    }
}

// ── Compare-and-update path ─────────────────────────────────────────

async fn update<C: ControlPlane>(forward: &Forward, existing: &Resource, plane: &C) -> Outcome {
    let Some(resource_id) = existing.resource_id else {
        warn!("[{forward}] Existing resource has no resourceId; cannot compare targets");
        return Failure::RemoteRejected {
            step: Step::ListTargets,
            message: "resource has no resourceId".into(),
        }
        .into();
    };

    let targets = match plane.list_targets(resource_id).await {
        Ok(t) => t,
        Err(e) => return rejected(forward, Step::ListTargets, &e),
    };
    let Some(first) = targets.first() else {
        warn!("[{forward}] Resource {resource_id} has no targets; leaving it unmodified");
        return Failure::NoTargets { resource_id }.into();
    };

    if target_matches(forward, first) {
        debug!("[{forward}] Target is up to date");
        return Outcome::UpToDate { resource_id };
    }

    info!(
        "[{forward}] Target drifted (currently {}:{} {}). Updating...",
        first.ip,
        first.port,
        first.method.as_deref().unwrap_or("-")
    );
    match plane.update_target(first.target_id, &new_target(forward)).await {
        Ok(()) => Outcome::Updated {
            resource_id,
            target_id: first.target_id,
        },
        Err(e) => rejected(forward, Step::UpdateTarget, &e),
    }
}
