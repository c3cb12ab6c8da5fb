// ── Per-forward outcomes ──
//
// Every forward and every orphan deletion ends in exactly one of these.
// None of them abort the run; the engine records them and moves on.

use std::fmt;

use pangosync_api::{ResourceId, TargetId};
use serde::Serialize;
use strum::Display;

/// Which remote call a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateResource,
    DisableSso,
    CreateTarget,
    ListTargets,
    UpdateTarget,
    DeleteResource,
}

/// Why a forward (or orphan) could not be brought into line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Failure {
    /// The forward names a site the control plane does not know.
    MissingSite { site_name: String },
    /// The forward's base domain is not registered on the control plane.
    MissingDomain { domain: String },
    /// A remote call failed (transport, non-2xx, or `success: false`).
    RemoteRejected { step: Step, message: String },
    /// The resource exists but has no target to compare or update.
    NoTargets { resource_id: ResourceId },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSite { site_name } => write!(f, "no siteId for site '{site_name}'"),
            Self::MissingDomain { domain } => write!(f, "no domainId for domain '{domain}'"),
            Self::RemoteRejected { step, message } => write!(f, "{step} failed: {message}"),
            Self::NoTargets { resource_id } => {
                write!(f, "resource {resource_id} has no targets")
            }
        }
    }
}

/// Terminal state of one forward's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Created {
        resource_id: ResourceId,
        target_id: TargetId,
    },
    Updated {
        resource_id: ResourceId,
        target_id: TargetId,
    },
    /// Compared against the first target; nothing to change.
    UpToDate { resource_id: ResourceId },
    /// Already present and the policy is to leave existing resources alone.
    Skipped,
    Failed(Failure),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Short status word for tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::UpToDate { .. } => "up to date",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Self::Failed(failure)
    }
}
