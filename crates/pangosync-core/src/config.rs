// ── Engine configuration ──
//
// What the engine needs to run, independent of where it was loaded from.
// `pangosync-config` builds a `SyncConfig` from the settings file; tests
// build one directly.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::HttpMethod;

/// What to do with a desired forward whose resource already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Leave it alone.
    #[default]
    Skip,
    /// Compare against its first target and update on drift.
    Update,
}

/// A statically configured HTTP forward.
///
/// `site_name` is optional in the settings file so that a missing value can
/// be reported per entry instead of rejecting the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticHttpEntry {
    pub subdomain: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    pub target_host: String,
    pub target_port: u16,
    pub target_method: HttpMethod,
}

impl StaticHttpEntry {
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }
}

/// A statically configured TCP or UDP forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPortEntry {
    pub site_name: String,
    pub source_port: u16,
    pub target_host: String,
    pub target_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticForwards {
    #[serde(default)]
    pub http: Vec<StaticHttpEntry>,
    #[serde(default)]
    pub tcp: Vec<StaticPortEntry>,
    #[serde(default)]
    pub udp: Vec<StaticPortEntry>,
}

/// Where hosts discovered on one upstream router are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySite {
    pub site_name: String,
    pub target_host: String,
    pub target_port: u16,
    pub target_method: HttpMethod,
    /// A rule is kept if it contains any of these as a substring.
    #[serde(default)]
    pub host_whitelist: Vec<String>,
}

/// Engine-level settings for one reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    pub static_forwards: StaticForwards,
    /// Delete resources absent from the desired state.
    pub cleanup: bool,
    pub on_existing: ExistingPolicy,
}
