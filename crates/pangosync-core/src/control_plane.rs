// ── Collaborator seams ──
//
// The engine only needs these operations from the outside world. The
// `pangosync-api` clients implement them directly; tests supply in-memory
// fakes.

use std::future::Future;

use pangosync_api::{
    Domain, Error, NewResource, NewTarget, PangolinClient, Resource, ResourceId, Router, Site,
    SiteId, Target, TargetId, TraefikClient,
};

/// CRUD surface of the control plane.
pub trait ControlPlane: Sync {
    fn list_resources(&self) -> impl Future<Output = Result<Vec<Resource>, Error>> + Send;
    fn list_domains(&self) -> impl Future<Output = Result<Vec<Domain>, Error>> + Send;
    fn list_sites(&self) -> impl Future<Output = Result<Vec<Site>, Error>> + Send;

    fn create_resource(
        &self,
        site_id: SiteId,
        body: &NewResource,
    ) -> impl Future<Output = Result<ResourceId, Error>> + Send;
    fn disable_sso(&self, resource_id: ResourceId)
    -> impl Future<Output = Result<(), Error>> + Send;
    fn delete_resource(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn list_targets(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<Vec<Target>, Error>> + Send;
    fn create_target(
        &self,
        resource_id: ResourceId,
        body: &NewTarget,
    ) -> impl Future<Output = Result<TargetId, Error>> + Send;
    fn update_target(
        &self,
        target_id: TargetId,
        body: &NewTarget,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// One upstream routing API to discover hostnames from.
pub trait RouterSource: Sync {
    fn list_routers(&self) -> impl Future<Output = Result<Vec<Router>, Error>> + Send;
}

impl ControlPlane for PangolinClient {
    async fn list_resources(&self) -> Result<Vec<Resource>, Error> {
        PangolinClient::list_resources(self).await
    }

    async fn list_domains(&self) -> Result<Vec<Domain>, Error> {
        PangolinClient::list_domains(self).await
    }

    async fn list_sites(&self) -> Result<Vec<Site>, Error> {
        PangolinClient::list_sites(self).await
    }

    async fn create_resource(&self, site_id: SiteId, body: &NewResource) -> Result<ResourceId, Error> {
        PangolinClient::create_resource(self, site_id, body).await
    }

    async fn disable_sso(&self, resource_id: ResourceId) -> Result<(), Error> {
        PangolinClient::disable_sso(self, resource_id).await
    }

    async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), Error> {
        PangolinClient::delete_resource(self, resource_id).await
    }

    async fn list_targets(&self, resource_id: ResourceId) -> Result<Vec<Target>, Error> {
        PangolinClient::list_targets(self, resource_id).await
    }

    async fn create_target(&self, resource_id: ResourceId, body: &NewTarget) -> Result<TargetId, Error> {
        PangolinClient::create_target(self, resource_id, body).await
    }

    async fn update_target(&self, target_id: TargetId, body: &NewTarget) -> Result<(), Error> {
        PangolinClient::update_target(self, target_id, body).await
    }
}

impl RouterSource for TraefikClient {
    async fn list_routers(&self) -> Result<Vec<Router>, Error> {
        TraefikClient::list_routers(self).await
    }
}
