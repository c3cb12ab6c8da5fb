// ── Desired-state collection ──
//
// Merges static forwards and every discovery site into one ordered desired
// set, plus the valid-key union the reaper compares against.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::RemoteStateCache;
use crate::config::{DiscoverySite, StaticForwards};
use crate::control_plane::RouterSource;
use crate::discovery::{discover_hosts, forward_for_host};
use crate::model::{Forward, ForwardKey, HttpForward, PortForward, Protocol};

/// A discovery site paired with the router API it is read from.
#[derive(Debug, Clone)]
pub struct DiscoverySource<R> {
    pub site: DiscoverySite,
    pub source: R,
}

/// Every identity a resource may legitimately carry after this run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidKeys {
    /// Lower-cased FQDNs.
    pub domains: HashSet<String>,
    pub tcp_ports: BTreeSet<u16>,
    pub udp_ports: BTreeSet<u16>,
}

impl ValidKeys {
    pub fn insert(&mut self, key: ForwardKey) {
        match key {
            ForwardKey::Domain(d) => {
                self.domains.insert(d);
            }
            ForwardKey::Port(Protocol::Tcp, port) => {
                self.tcp_ports.insert(port);
            }
            ForwardKey::Port(Protocol::Udp, port) => {
                self.udp_ports.insert(port);
            }
        }
    }

    pub fn contains(&self, key: &ForwardKey) -> bool {
        match key {
            ForwardKey::Domain(d) => self.domains.contains(d),
            ForwardKey::Port(Protocol::Tcp, port) => self.tcp_ports.contains(port),
            ForwardKey::Port(Protocol::Udp, port) => self.udp_ports.contains(port),
        }
    }
}

/// The full desired state of one run.
#[derive(Debug, Clone)]
pub struct DesiredState {
    /// Insertion-ordered; a later forward with the same key replaces the
    /// earlier one in place.
    pub forwards: IndexMap<ForwardKey, Forward>,
    pub valid: ValidKeys,
    /// `false` when a discovery source could not be read. Orphan cleanup
    /// must not run against an incomplete desired state.
    pub complete: bool,
}

impl Default for DesiredState {
    fn default() -> Self {
        Self {
            forwards: IndexMap::new(),
            valid: ValidKeys::default(),
            complete: true,
        }
    }
}

impl DesiredState {
    /// Add a forward and its key. Returns `true` if it replaced an earlier one.
    pub fn insert(&mut self, forward: Forward) -> bool {
        let key = forward.key();
        self.valid.insert(key.clone());
        match self.forwards.insert(key, forward) {
            Some(previous) => {
                debug!(replaced = %previous, "duplicate forward key; keeping the later definition");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.forwards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forwards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Forward> {
        self.forwards.values()
    }
}

/// Statically configured forwards, in HTTP, TCP, UDP order.
pub fn collect_static(statics: &StaticForwards, state: &mut DesiredState) {
    for entry in &statics.http {
        let Some(site_name) = entry.site_name.as_deref().filter(|s| !s.is_empty()) else {
            error!(
                "Unable to create resource for {}: no site_name provided",
                entry.fqdn()
            );
            continue;
        };
        state.insert(Forward::Http(HttpForward {
            subdomain: entry.subdomain.clone(),
            domain: entry.domain.clone(),
            site_name: site_name.to_owned(),
            target_host: entry.target_host.clone(),
            target_port: entry.target_port,
            target_method: entry.target_method,
        }));
    }

    for (protocol, entries) in [(Protocol::Tcp, &statics.tcp), (Protocol::Udp, &statics.udp)] {
        for entry in entries {
            state.insert(Forward::Port(PortForward {
                protocol,
                site_name: entry.site_name.clone(),
                source_port: entry.source_port,
                target_host: entry.target_host.clone(),
                target_port: entry.target_port,
                name: entry.name.clone(),
            }));
        }
    }
}

/// Hosts from every discovery site whose site name the control plane knows.
pub async fn collect_discovered<R: RouterSource>(
    sources: &[DiscoverySource<R>],
    cache: &RemoteStateCache,
    state: &mut DesiredState,
) {
    for DiscoverySource { site, source } in sources {
        if cache.lookup_site_id(&site.site_name).is_none() {
            warn!("Skipping discovery site {}: unknown site name", site.site_name);
            continue;
        }

        info!(">>> Processing Traefik site: {}", site.site_name);
        let hosts = match discover_hosts(site, source).await {
            Ok(hosts) => hosts,
            Err(e) => {
                error!(site = %site.site_name, error = %e, "Error fetching Traefik hosts");
                state.complete = false;
                continue;
            }
        };

        if hosts.is_empty() {
            warn!("No Traefik hosts found for site {}", site.site_name);
            continue;
        }
        for host in &hosts {
            state.insert(Forward::Http(forward_for_host(site, host)));
        }
    }
}

/// Static forwards followed by every discovery site.
pub async fn collect<R: RouterSource>(
    statics: &StaticForwards,
    sources: &[DiscoverySource<R>],
    cache: &RemoteStateCache,
) -> DesiredState {
    let mut state = DesiredState::default();
    collect_static(statics, &mut state);
    collect_discovered(sources, cache, &mut state).await;
    state
}
