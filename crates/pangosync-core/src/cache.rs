// ── Remote state cache ──
//
// Session-scoped snapshot of the control plane. Each mapping is fetched at
// most once unless explicitly invalidated. Membership checks are linear
// scans; resource counts are in the tens to low hundreds.

use std::collections::HashMap;

use indexmap::IndexMap;
use pangosync_api::{Domain, Resource, Site, SiteId, SiteRef};
use tracing::{debug, error, info, warn};

use crate::control_plane::ControlPlane;
use crate::error::CoreError;
use crate::model::{ForwardKey, Protocol};

/// Population state of one cached mapping.
#[derive(Debug, Clone, Default)]
pub enum Mapping<T> {
    #[default]
    Unpopulated,
    Populated(T),
}

impl<T> Mapping<T> {
    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Populated(v) => Some(v),
            Self::Unpopulated => None,
        }
    }
}

/// Site name ⇄ id lookups built from one `list_sites` response.
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    sites: Vec<Site>,
    id_by_name: HashMap<String, SiteId>,
    name_by_nice_id: HashMap<String, String>,
    name_by_id: HashMap<SiteId, String>,
}

impl SiteIndex {
    fn new(sites: Vec<Site>) -> Self {
        let mut index = Self::default();
        for site in &sites {
            index.id_by_name.insert(site.name.clone(), site.site_id);
            index.name_by_id.insert(site.site_id, site.name.clone());
            if let Some(nice) = &site.nice_id {
                index.name_by_nice_id.insert(nice.clone(), site.name.clone());
            }
        }
        index.sites = sites;
        index
    }
}

/// Snapshot of domains, sites, and resources held for one run.
#[derive(Debug, Default)]
pub struct RemoteStateCache {
    domains: Mapping<IndexMap<String, String>>,
    sites: Mapping<SiteIndex>,
    resources: Mapping<Vec<Resource>>,
}

impl RemoteStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fully populated cache, without touching the network.
    pub fn from_snapshot(resources: Vec<Resource>, domains: Vec<Domain>, sites: Vec<Site>) -> Self {
        let mut cache = Self::new();
        cache.set_resources(resources);
        cache.set_domains(domains);
        cache.sites = Mapping::Populated(SiteIndex::new(sites));
        cache
    }

    // ── Population ───────────────────────────────────────────────────

    /// Fetch every mapping that is still unpopulated.
    ///
    /// Domain and site failures are logged and leave the mapping empty;
    /// forwards that need them will fail individually. A resource listing
    /// failure is returned: every create/skip/delete decision depends on it.
    pub async fn build<C: ControlPlane>(&mut self, plane: &C) -> Result<(), CoreError> {
        let mut resource_error = None;

        if !self.resources.is_populated() {
            match plane.list_resources().await {
                Ok(resources) => {
                    info!("Loaded {} resources into cache", resources.len());
                    self.set_resources(resources);
                }
                Err(e) => {
                    error!(error = %e, "failed to load resources");
                    resource_error = Some(e);
                }
            }
        }

        if !self.domains.is_populated() {
            match plane.list_domains().await {
                Ok(domains) => {
                    info!("Loaded {} domain<>domainID mappings into cache", domains.len());
                    for d in &domains {
                        debug!("  {}→ {}", d.base_domain, d.domain_id);
                    }
                    self.set_domains(domains);
                }
                Err(e) => error!(error = %e, "failed to load domains"),
            }
        }

        if !self.sites.is_populated() {
            match plane.list_sites().await {
                Ok(sites) => {
                    info!("Loaded {} siteName<>siteID mappings into cache", sites.len());
                    for s in &sites {
                        debug!("  {}→ {}", s.name, s.site_id);
                    }
                    self.sites = Mapping::Populated(SiteIndex::new(sites));
                }
                Err(e) => error!(error = %e, "failed to load sites"),
            }
        }

        match resource_error.map(CoreError::from) {
            None => Ok(()),
            Some(CoreError::Api { message, .. }) => Err(CoreError::CacheUnavailable { message }),
            Some(other) => Err(other),
        }
    }

    fn set_resources(&mut self, resources: Vec<Resource>) {
        self.resources = Mapping::Populated(resources);
    }

    fn set_domains(&mut self, domains: Vec<Domain>) {
        self.domains = Mapping::Populated(
            domains
                .into_iter()
                .map(|d| (d.base_domain, d.domain_id))
                .collect(),
        );
    }

    /// Drop the resource snapshot; the next `build` re-fetches it.
    pub fn invalidate_resources(&mut self) {
        self.resources = Mapping::Unpopulated;
    }

    pub fn resources_populated(&self) -> bool {
        self.resources.is_populated()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// Site id for a site name. Logs and returns `None` when unknown.
    pub fn lookup_site_id(&self, site_name: &str) -> Option<SiteId> {
        let id = self
            .sites
            .get()
            .and_then(|idx| idx.id_by_name.get(site_name).copied());
        if id.is_none() {
            warn!("Unable to find siteId for site name {site_name} in cache");
        }
        id
    }

    /// Domain id for a base domain. Logs and returns `None` when unknown.
    pub fn lookup_domain_id(&self, domain: &str) -> Option<&str> {
        let id = self
            .domains
            .get()
            .and_then(|m| m.get(domain))
            .map(String::as_str);
        if id.is_none() {
            warn!("Unable to find domainId for domain {domain} in cache");
        }
        id
    }

    /// Human-readable site name for a resource's site reference.
    pub fn site_name_for(&self, site_ref: Option<&SiteRef>) -> &str {
        let Some(index) = self.sites.get() else {
            return "unknown";
        };
        let name = match site_ref {
            Some(SiteRef::NiceId(nice)) => index.name_by_nice_id.get(nice),
            Some(SiteRef::Id(id)) => index.name_by_id.get(id),
            None => None,
        };
        name.map_or("unknown", String::as_str)
    }

    // ── Membership ───────────────────────────────────────────────────

    pub fn has_domain(&self, fqdn: &str) -> bool {
        self.find_http(fqdn).is_some()
    }

    pub fn has_tcp_port(&self, port: u16) -> bool {
        self.find_port(Protocol::Tcp, port).is_some()
    }

    pub fn has_udp_port(&self, port: u16) -> bool {
        self.find_port(Protocol::Udp, port).is_some()
    }

    /// The cached resource matching an identity key.
    pub fn find(&self, key: &ForwardKey) -> Option<&Resource> {
        match key {
            ForwardKey::Domain(fqdn) => self.find_http(fqdn),
            ForwardKey::Port(protocol, port) => self.find_port(*protocol, *port),
        }
    }

    pub fn find_http(&self, fqdn: &str) -> Option<&Resource> {
        let wanted = fqdn.to_lowercase();
        self.resources()
            .iter()
            .find(|r| r.domain_key().as_deref() == Some(wanted.as_str()))
    }

    pub fn find_port(&self, protocol: Protocol, port: u16) -> Option<&Resource> {
        self.resources()
            .iter()
            .find(|r| r.proxy_port == Some(port) && r.is_port_forward(protocol.as_str()))
    }

    // ── Read access ──────────────────────────────────────────────────

    /// Cached resources; empty when unpopulated.
    pub fn resources(&self) -> &[Resource] {
        self.resources.get().map_or(&[], Vec::as_slice)
    }

    /// `(baseDomain, domainId)` pairs in listing order.
    pub fn domains(&self) -> impl Iterator<Item = (&str, &str)> {
        self.domains
            .get()
            .into_iter()
            .flat_map(|m| m.iter().map(|(d, id)| (d.as_str(), id.as_str())))
    }

    pub fn sites(&self) -> &[Site] {
        self.sites.get().map_or(&[], |idx| idx.sites.as_slice())
    }
}
