//! In-memory control plane and router source for engine tests.
//!
//! The fake records every call in order so tests can assert on exactly
//! which remote operations a run performed.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use pangosync_api::{
    Domain, Error, NewResource, NewTarget, Resource, ResourceId, Router, Site, SiteId, SiteRef,
    Target, TargetId,
};
use pangosync_core::{ControlPlane, RouterSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListResources,
    ListDomains,
    ListSites,
    CreateResource(SiteId, NewResource),
    DisableSso(ResourceId),
    DeleteResource(ResourceId),
    ListTargets(ResourceId),
    CreateTarget(ResourceId, NewTarget),
    UpdateTarget(TargetId, NewTarget),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::ListResources | Self::ListDomains | Self::ListSites | Self::ListTargets(_)
        )
    }
}

#[derive(Default)]
struct State {
    resources: Vec<Resource>,
    domains: Vec<Domain>,
    sites: Vec<Site>,
    targets: HashMap<ResourceId, Vec<Target>>,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    next_id: u64,
}

#[derive(Default)]
pub struct FakePlane {
    state: Mutex<State>,
}

fn rejected(op: &str) -> Error {
    Error::Rejected {
        message: format!("{op} refused by fake"),
    }
}

impl FakePlane {
    pub fn new() -> Self {
        let plane = Self::default();
        plane.state.lock().unwrap().next_id = 100;
        plane
    }

    pub fn with_site(self, site_id: SiteId, name: &str, nice_id: &str) -> Self {
        self.state.lock().unwrap().sites.push(Site {
            site_id,
            name: name.into(),
            nice_id: Some(nice_id.into()),
        });
        self
    }

    pub fn with_domain(self, domain_id: &str, base_domain: &str) -> Self {
        self.state.lock().unwrap().domains.push(Domain {
            domain_id: domain_id.into(),
            base_domain: base_domain.into(),
        });
        self
    }

    pub fn with_http_resource(self, resource_id: ResourceId, full_domain: &str, site: &str) -> Self {
        self.state.lock().unwrap().resources.push(Resource {
            resource_id: Some(resource_id),
            name: Some(full_domain.into()),
            http: true,
            protocol: Some("tcp".into()),
            full_domain: Some(full_domain.into()),
            proxy_port: None,
            site_id: Some(SiteRef::NiceId(site.into())),
        });
        self
    }

    pub fn with_port_resource(self, resource_id: ResourceId, protocol: &str, port: u16) -> Self {
        self.state.lock().unwrap().resources.push(Resource {
            resource_id: Some(resource_id),
            name: None,
            http: false,
            protocol: Some(protocol.into()),
            full_domain: None,
            proxy_port: Some(port),
            site_id: None,
        });
        self
    }

    pub fn with_target(
        self,
        resource_id: ResourceId,
        target_id: TargetId,
        ip: &str,
        port: u16,
        method: &str,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .targets
            .entry(resource_id)
            .or_default()
            .push(Target {
                target_id,
                ip: ip.into(),
                port,
                method: Some(method.into()),
                enabled: true,
            });
        self
    }

    /// Make every call to the named operation fail.
    pub fn failing(self, op: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call, op: &'static str) -> Result<std::sync::MutexGuard<'_, State>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(op) {
            return Err(rejected(op));
        }
        Ok(state)
    }
}

impl ControlPlane for FakePlane {
    async fn list_resources(&self) -> Result<Vec<Resource>, Error> {
        Ok(self.record(Call::ListResources, "list_resources")?.resources.clone())
    }

    async fn list_domains(&self) -> Result<Vec<Domain>, Error> {
        Ok(self.record(Call::ListDomains, "list_domains")?.domains.clone())
    }

    async fn list_sites(&self) -> Result<Vec<Site>, Error> {
        Ok(self.record(Call::ListSites, "list_sites")?.sites.clone())
    }

    async fn create_resource(&self, site_id: SiteId, body: &NewResource) -> Result<ResourceId, Error> {
        let mut state = self.record(Call::CreateResource(site_id, body.clone()), "create_resource")?;
        state.next_id += 1;
        let id = state.next_id;
        state.resources.push(Resource {
            resource_id: Some(id),
            name: Some(body.name.clone()),
            http: body.http,
            protocol: Some(body.protocol.clone()),
            full_domain: body.http.then(|| body.name.clone()),
            proxy_port: body.proxy_port,
            site_id: Some(SiteRef::Id(site_id)),
        });
        Ok(id)
    }

    async fn disable_sso(&self, resource_id: ResourceId) -> Result<(), Error> {
        drop(self.record(Call::DisableSso(resource_id), "disable_sso")?);
        Ok(())
    }

    async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), Error> {
        let mut state = self.record(Call::DeleteResource(resource_id), "delete_resource")?;
        state.resources.retain(|r| r.resource_id != Some(resource_id));
        state.targets.remove(&resource_id);
        Ok(())
    }

    async fn list_targets(&self, resource_id: ResourceId) -> Result<Vec<Target>, Error> {
        let state = self.record(Call::ListTargets(resource_id), "list_targets")?;
        Ok(state.targets.get(&resource_id).cloned().unwrap_or_default())
    }

    async fn create_target(&self, resource_id: ResourceId, body: &NewTarget) -> Result<TargetId, Error> {
        let mut state = self.record(Call::CreateTarget(resource_id, body.clone()), "create_target")?;
        state.next_id += 1;
        let id = state.next_id;
        state.targets.entry(resource_id).or_default().push(Target {
            target_id: id,
            ip: body.ip.clone(),
            port: body.port,
            method: Some(body.method.clone()),
            enabled: body.enabled,
        });
        Ok(id)
    }

    async fn update_target(&self, target_id: TargetId, body: &NewTarget) -> Result<(), Error> {
        drop(self.record(Call::UpdateTarget(target_id, body.clone()), "update_target")?);
        Ok(())
    }
}

/// Router listing that either returns fixed rules or fails.
pub struct FakeRouters {
    rules: Option<Vec<String>>,
    calls: Mutex<usize>,
}

impl FakeRouters {
    pub fn with_rules(rules: &[&str]) -> Self {
        Self {
            rules: Some(rules.iter().map(|r| (*r).to_owned()).collect()),
            calls: Mutex::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            rules: None,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl RouterSource for FakeRouters {
    async fn list_routers(&self) -> Result<Vec<Router>, Error> {
        *self.calls.lock().unwrap() += 1;
        match &self.rules {
            Some(rules) => Ok(rules
                .iter()
                .map(|rule| Router {
                    rule: rule.clone(),
                    ..Router::default()
                })
                .collect()),
            None => Err(Error::Api {
                status: 503,
                message: "Service Unavailable".into(),
            }),
        }
    }
}

impl RouterSource for &FakeRouters {
    async fn list_routers(&self) -> Result<Vec<Router>, Error> {
        (**self).list_routers().await
    }
}
