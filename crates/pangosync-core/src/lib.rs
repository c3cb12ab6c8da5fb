//! Reconciliation engine between desired forwards and a Pangolin control plane.
//!
//! One pass of the engine:
//!
//! - **[`RemoteStateCache`]** - lazily populated snapshot of the control
//!   plane's domains, sites, and resources. Each mapping is fetched at most
//!   once per run; the resource list is invalidated after a deletion batch.
//!
//! - **Collector** ([`collector`]) - merges static forward definitions with
//!   hostnames discovered from Traefik sites into one insertion-ordered
//!   desired set, plus the [`ValidKeys`] union used for orphan detection.
//!
//! - **Applier** ([`applier`]) - per-forward decision: create, update the
//!   first target when it drifted, or leave it alone. Failures are reported
//!   as an [`Outcome`] and never abort the run.
//!
//! - **Reaper** ([`reaper`]) - deletes cached resources whose identity key
//!   is absent from the full valid-key union.
//!
//! - **[`Reconciler`]** - runs the above in order and returns a [`RunReport`].
//!
//! The control plane and discovery sources are reached through the
//! [`ControlPlane`] and [`RouterSource`] traits, implemented for the
//! `pangosync-api` clients.

pub mod applier;
pub mod cache;
pub mod collector;
pub mod config;
pub mod control_plane;
pub mod convert;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod model;
pub mod outcome;
pub mod reaper;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::RemoteStateCache;
pub use collector::{DesiredState, DiscoverySource, ValidKeys};
pub use config::{
    DiscoverySite, ExistingPolicy, StaticForwards, StaticHttpEntry, StaticPortEntry, SyncConfig,
};
pub use control_plane::{ControlPlane, RouterSource};
pub use engine::{CleanupStatus, ForwardReport, Reconciler, RunReport};
pub use error::CoreError;
pub use model::{Forward, ForwardKey, HttpForward, HttpMethod, PortForward, Protocol};
pub use outcome::{Failure, Outcome, Step};
pub use reaper::{Orphan, ReapReport, ReapedResource};
