// Control-plane and router API wire types
//
// Pangolin wraps every payload in `Envelope<T>`. Fields use
// `#[serde(default)]` liberally because older control-plane versions omit
// attributes that are irrelevant to the resource kind (no `fullDomain` on
// port forwards, no `proxyPort` on HTTP resources).

use std::fmt;

use serde::{Deserialize, Serialize};

pub type ResourceId = u64;
pub type TargetId = u64;
pub type SiteId = u64;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard Pangolin response envelope.
///
/// ```json
/// { "success": true, "message": "optional", "data": { ... } }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Error body shape returned alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ── Resource ─────────────────────────────────────────────────────────

/// A control-plane resource: the persisted form of one forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub http: bool,
    /// `"tcp"` or `"udp"`. HTTP resources also report `"tcp"` here.
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub full_domain: Option<String>,
    #[serde(default)]
    pub proxy_port: Option<u16>,
    #[serde(default)]
    pub site_id: Option<SiteRef>,
}

impl Resource {
    /// Lower-cased `fullDomain`, if the resource has a non-empty one.
    pub fn domain_key(&self) -> Option<String> {
        self.full_domain
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether this is a non-HTTP forward for the given protocol name.
    pub fn is_port_forward(&self, protocol: &str) -> bool {
        !self.http && self.protocol.as_deref() == Some(protocol)
    }
}

/// Site reference carried on a listed resource.
///
/// Depending on the control-plane version this is the numeric `siteId`
/// or the site's string `niceId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiteRef {
    Id(SiteId),
    NiceId(String),
}

impl fmt::Display for SiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::NiceId(nice) => f.write_str(nice),
        }
    }
}

// ── Target ───────────────────────────────────────────────────────────

/// Where a resource actually routes traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub target_id: TargetId,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

// ── Site / Domain ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub site_id: SiteId,
    pub name: String,
    #[serde(default)]
    pub nice_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub domain_id: String,
    pub base_domain: String,
}

// ── Request bodies ───────────────────────────────────────────────────

/// Body for `PUT /org/{org}/site/{siteId}/resource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub name: String,
    pub site_id: SiteId,
    pub http: bool,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<u16>,
}

/// Body for target creation and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTarget {
    pub ip: String,
    pub method: String,
    pub port: u16,
    pub enabled: bool,
}

// ── Router (Traefik) ─────────────────────────────────────────────────

/// One entry from Traefik's `/api/http/routers` listing.
///
/// Only `rule` matters for discovery; the rest is kept for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Router {
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
