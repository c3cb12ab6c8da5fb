// ── Reconciler ──
//
// One strictly sequential pass: build the cache, collect desired state,
// apply every forward, then reap orphans when it is safe to.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::applier::apply;
use crate::cache::RemoteStateCache;
use crate::collector::{self, DesiredState, DiscoverySource};
use crate::config::{DiscoverySite, SyncConfig};
use crate::control_plane::{ControlPlane, RouterSource};
use crate::error::CoreError;
use crate::model::Forward;
use crate::outcome::Outcome;
use crate::reaper::{self, ReapReport};

/// Outcome of one desired forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardReport {
    pub forward: Forward,
    pub outcome: Outcome,
}

/// Whether orphan cleanup ran, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupStatus {
    Disabled,
    /// A discovery source or the resource snapshot failed, so absence
    /// from the desired state is not evidence of anything.
    SkippedIncomplete,
    Ran(ReapReport),
}

/// Everything one run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub forwards: Vec<ForwardReport>,
    pub cleanup: CleanupStatus,
    /// Why the resource snapshot could not be loaded, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_error: Option<String>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.forwards.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Updated { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, Outcome::UpToDate { .. } | Outcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    pub fn reap(&self) -> Option<&ReapReport> {
        match &self.cleanup {
            CleanupStatus::Ran(r) => Some(r),
            _ => None,
        }
    }

    /// Failed forwards, failed deletions, and a failed snapshot load.
    pub fn failure_count(&self) -> usize {
        self.failed()
            + self.reap().map_or(0, ReapReport::failed_count)
            + usize::from(self.snapshot_error.is_some())
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }
}

/// Drives reconciliation against one control plane.
pub struct Reconciler<C, R> {
    plane: C,
    sources: Vec<DiscoverySource<R>>,
    config: SyncConfig,
    cache: RemoteStateCache,
}

impl<C: ControlPlane, R: RouterSource> Reconciler<C, R> {
    pub fn new(plane: C, config: SyncConfig) -> Self {
        Self {
            plane,
            sources: Vec::new(),
            config,
            cache: RemoteStateCache::new(),
        }
    }

    /// Add a discovery site read through `source`.
    pub fn with_source(mut self, site: DiscoverySite, source: R) -> Self {
        self.sources.push(DiscoverySource { site, source });
        self
    }

    pub fn plane(&self) -> &C {
        &self.plane
    }

    pub fn cache(&self) -> &RemoteStateCache {
        &self.cache
    }

    /// Populate the cache and compute the full desired state.
    ///
    /// A resource snapshot that failed to load is handed back next to the
    /// state, which is then marked incomplete so nothing gets reaped.
    pub async fn desired_state(&mut self) -> (DesiredState, Option<CoreError>) {
        let snapshot_error = self.cache.build(&self.plane).await.err();
        let mut desired =
            collector::collect(&self.config.static_forwards, &self.sources, &self.cache).await;
        if snapshot_error.is_some() {
            desired.complete = false;
        }
        (desired, snapshot_error)
    }

    /// Run one reconciliation pass. Nothing aborts the run; every problem
    /// is recorded in the report.
    pub async fn run(&mut self) -> RunReport {
        info!(">>> Building Pangolin resource cache...");
        let (desired, snapshot_error) = self.desired_state().await;
        if let Some(ref e) = snapshot_error {
            error!(error = %e, "continuing without a resource snapshot");
        }

        info!(">>> Syncing {} forwards...", desired.len());
        let mut forwards = Vec::with_capacity(desired.len());
        for forward in desired.iter() {
            let outcome = apply(forward, &self.cache, &self.plane, self.config.on_existing).await;
            forwards.push(ForwardReport {
                forward: forward.clone(),
                outcome,
            });
        }

        let cleanup = if !self.config.cleanup {
            info!(">>> Skipping cleanup of orphaned resources (disabled in settings)");
            CleanupStatus::Disabled
        } else if snapshot_error.is_some() {
            warn!(">>> Skipping cleanup of orphaned resources (resource snapshot unavailable)");
            CleanupStatus::SkippedIncomplete
        } else if !desired.complete {
            warn!(">>> Skipping cleanup of orphaned resources (a discovery source failed)");
            CleanupStatus::SkippedIncomplete
        } else {
            info!(">>> Cleaning up orphaned resources...");
            CleanupStatus::Ran(reaper::reap(&mut self.cache, &self.plane, &desired.valid).await)
        };

        info!(">>> All syncs completed");
        RunReport {
            forwards,
            cleanup,
            snapshot_error: snapshot_error.map(|e| e.to_string()),
        }
    }
}
