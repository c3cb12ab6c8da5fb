// Pangolin control-plane HTTP client
//
// Wraps `reqwest::Client` with org-scoped URL construction, bearer auth,
// and `{ success, message, data }` envelope unwrapping. Every method is a
// single request; nothing is retried or cached here.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    Domain, Envelope, ErrorBody, NewResource, NewTarget, Resource, ResourceId, Site, SiteId,
    Target, TargetId,
};
use crate::transport::TransportConfig;

// ── Data payload shapes ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ResourcesData {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Deserialize)]
struct DomainsData {
    #[serde(default)]
    domains: Vec<Domain>,
}

#[derive(Deserialize)]
struct SitesData {
    #[serde(default)]
    sites: Vec<Site>,
}

#[derive(Deserialize)]
struct TargetsData {
    #[serde(default)]
    targets: Vec<Target>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResource {
    resource_id: ResourceId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedTarget {
    target_id: TargetId,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Pangolin integration API.
///
/// All org-scoped endpoints live under `{base}/org/{org_id}/...`; resource
/// and target endpoints are addressed by numeric id directly under `{base}`.
pub struct PangolinClient {
    http: reqwest::Client,
    base_url: Url,
    org_id: String,
}

impl PangolinClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `Authorization: Bearer <key>` as a sensitive default header.
    pub fn from_api_key(
        base_url: &str,
        org_id: impl Into<String>,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Url::parse(base_url)?;

        Ok(Self {
            http,
            base_url,
            org_id: org_id.into(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: Url, org_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            org_id: org_id.into(),
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{path}`, tolerating a trailing slash on the base.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// `{base}/org/{org_id}/{path}`
    fn org_url(&self, path: &str) -> Result<Url, Error> {
        self.url(&format!("org/{}/{path}", self.org_id))
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        parse_envelope(resp).await
    }

    async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        parse_envelope(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        parse_envelope(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        let _: Option<IgnoredAny> = parse_envelope(resp).await?;
        Ok(())
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Listings ─────────────────────────────────────────────────────

    /// `GET /org/{org}/resources`
    pub async fn list_resources(&self) -> Result<Vec<Resource>, Error> {
        let data: Option<ResourcesData> = self.get(self.org_url("resources")?).await?;
        Ok(data.map(|d| d.resources).unwrap_or_default())
    }

    /// `GET /org/{org}/domains`
    pub async fn list_domains(&self) -> Result<Vec<Domain>, Error> {
        let data: Option<DomainsData> = self.get(self.org_url("domains")?).await?;
        Ok(data.map(|d| d.domains).unwrap_or_default())
    }

    /// `GET /org/{org}/sites`
    pub async fn list_sites(&self) -> Result<Vec<Site>, Error> {
        let data: Option<SitesData> = self.get(self.org_url("sites")?).await?;
        Ok(data.map(|d| d.sites).unwrap_or_default())
    }

    // ── Resources ────────────────────────────────────────────────────

    /// `PUT /org/{org}/site/{siteId}/resource`
    pub async fn create_resource(
        &self,
        site_id: SiteId,
        body: &NewResource,
    ) -> Result<ResourceId, Error> {
        debug!(site_id, name = %body.name, "creating resource");
        let url = self.org_url(&format!("site/{site_id}/resource"))?;
        let created: Option<CreatedResource> = self.put(url, body).await?;
        created
            .map(|c| c.resource_id)
            .ok_or_else(|| missing_field("resourceId"))
    }

    /// `POST /resource/{id}` with `{"sso": false}`
    pub async fn disable_sso(&self, resource_id: ResourceId) -> Result<(), Error> {
        debug!(resource_id, "disabling SSO");
        let url = self.url(&format!("resource/{resource_id}"))?;
        let _: Option<IgnoredAny> = self.post(url, &serde_json::json!({ "sso": false })).await?;
        Ok(())
    }

    /// `DELETE /resource/{id}`
    pub async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), Error> {
        debug!(resource_id, "deleting resource");
        self.delete(self.url(&format!("resource/{resource_id}"))?)
            .await
    }

    // ── Targets ──────────────────────────────────────────────────────

    /// `GET /resource/{id}/targets`
    pub async fn list_targets(&self, resource_id: ResourceId) -> Result<Vec<Target>, Error> {
        let url = self.url(&format!("resource/{resource_id}/targets"))?;
        let data: Option<TargetsData> = self.get(url).await?;
        Ok(data.map(|d| d.targets).unwrap_or_default())
    }

    /// `PUT /resource/{id}/target`
    pub async fn create_target(
        &self,
        resource_id: ResourceId,
        body: &NewTarget,
    ) -> Result<TargetId, Error> {
        debug!(resource_id, ip = %body.ip, port = body.port, "creating target");
        let url = self.url(&format!("resource/{resource_id}/target"))?;
        let created: Option<CreatedTarget> = self.put(url, body).await?;
        created
            .map(|c| c.target_id)
            .ok_or_else(|| missing_field("targetId"))
    }

    /// `POST /target/{targetId}`
    pub async fn update_target(&self, target_id: TargetId, body: &NewTarget) -> Result<(), Error> {
        debug!(target_id, ip = %body.ip, port = body.port, "updating target");
        let url = self.url(&format!("target/{target_id}"))?;
        let _: Option<IgnoredAny> = self.post(url, body).await?;
        Ok(())
    }

    /// `DELETE /target/{targetId}`
    pub async fn delete_target(&self, target_id: TargetId) -> Result<(), Error> {
        debug!(target_id, "deleting target");
        self.delete(self.url(&format!("target/{target_id}"))?)
            .await
    }
}

fn missing_field(field: &str) -> Error {
    Error::Deserialization {
        message: format!("response envelope carried no {field}"),
        body: String::new(),
    }
}

/// Parse the `{ success, message, data }` envelope, returning `data` on
/// success.
///
/// Any status other than 200 or 201 becomes `Error::Api` (or
/// `Error::Authentication` for 401) with the body's `message` when one is
/// present. An accepted response whose envelope says `success: false`
/// becomes `Error::Rejected`.
const ACCEPTED: [reqwest::StatusCode; 2] = [reqwest::StatusCode::OK, reqwest::StatusCode::CREATED];

async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Option<T>, Error> {
    let status = resp.status();

    if !ACCEPTED.contains(&status) {
        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                }
            });
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication { message });
        }
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = resp.text().await?;
    let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })?;

    if !envelope.success {
        return Err(Error::Rejected {
            message: envelope
                .message
                .unwrap_or_else(|| "Unknown error".into()),
        });
    }

    Ok(envelope.data)
}
