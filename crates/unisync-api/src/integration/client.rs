// Async client for the Integration API of one controller.
//
// Every list endpoint is paged with `offset`/`limit`; the public methods
// walk all pages and hand back the whole collection.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;
use uuid::Uuid;

use super::types::{ConnectedClient, DnsPolicy, DnsPolicyBody, Page, Site};
use crate::{ControllerPlatform, Error, HttpSettings};

const DEFAULT_PAGE_SIZE: i32 = 200;

/// Longest slice of a bad body kept in a decode error message.
const BODY_PREVIEW_CHARS: usize = 200;

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for a single controller's `/integration/v1/` API.
#[derive(Debug, Clone)]
pub struct IntegrationClient {
    http: reqwest::Client,
    base_url: Url,
    page_size: i32,
}

impl IntegrationClient {
    /// Connect with an API key sent as `X-API-KEY` on every request.
    pub fn connect(
        url: &str,
        api_key: &SecretString,
        settings: &HttpSettings,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|e| Error::MalformedApiKey {
                reason: e.to_string(),
            })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-API-KEY", key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self::with_http_client(url, settings.client(headers)?, platform)
    }

    /// Use a caller-built `reqwest::Client`; no auth header is added.
    pub fn with_http_client(
        url: &str,
        http: reqwest::Client,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: integration_root(url, platform)?,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The `.../integration/` root every request path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Sites, clients, DNS policies ────────────────────────────────

    pub async fn sites(&self) -> Result<Vec<Site>, Error> {
        self.list_all("v1/sites").await
    }

    pub async fn clients(&self, site_id: &Uuid) -> Result<Vec<ConnectedClient>, Error> {
        self.list_all(&format!("v1/sites/{site_id}/clients")).await
    }

    pub async fn dns_policies(&self, site_id: &Uuid) -> Result<Vec<DnsPolicy>, Error> {
        self.list_all(&format!("v1/sites/{site_id}/dns/policies"))
            .await
    }

    pub async fn create_dns_policy(
        &self,
        site_id: &Uuid,
        body: &DnsPolicyBody,
    ) -> Result<DnsPolicy, Error> {
        let url = self.endpoint(&format!("v1/sites/{site_id}/dns/policies"))?;
        self.send(self.request(Method::POST, url).json(body)).await
    }

    /// Replace the policy `policy_id` with `body`.
    pub async fn update_dns_policy(
        &self,
        site_id: &Uuid,
        policy_id: &Uuid,
        body: &DnsPolicyBody,
    ) -> Result<DnsPolicy, Error> {
        let url = self.endpoint(&format!("v1/sites/{site_id}/dns/policies/{policy_id}"))?;
        self.send(self.request(Method::PUT, url).json(body)).await
    }

    // ── Plumbing ────────────────────────────────────────────────────

    /// Walk `offset` forward until a short or empty page, or `totalCount`.
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        let url = self.endpoint(path)?;
        let page_size = usize::try_from(self.page_size).unwrap_or(1);
        let mut items: Vec<T> = Vec::new();
        let mut offset: i64 = 0;

        loop {
            let request = self
                .request(Method::GET, url.clone())
                .query(&[("offset", offset), ("limit", i64::from(self.page_size))]);
            let page: Page<T> = self.send(request).await?;
            let received = page.data.len();
            items.extend(page.data);

            let collected = i64::try_from(items.len()).unwrap_or(i64::MAX);
            if received < page_size || page.total_count.is_some_and(|total| collected >= total) {
                break;
            }
            offset = collected;
        }

        trace!(%url, count = items.len(), "listed all pages");
        Ok(items)
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{method} {url}");
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(rejection(status, body));
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            Error::Decode {
                message: format!("{e} (body starts {preview:?})"),
                body,
            }
        })
    }
}

fn rejection(status: StatusCode, body: String) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        return Error::InvalidApiKey;
    }

    let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => (parsed.code, parsed.message),
        Err(_) => (None, Some(body).filter(|b| !b.trim().is_empty())),
    };

    Error::Rejected {
        status: status.as_u16(),
        code,
        message: message.unwrap_or_else(|| status.to_string()),
    }
}

/// Resolve the Integration API root for `url`.
///
/// A URL that already ends in `/integration` is used as given; otherwise
/// the platform prefix is appended to whatever path it carries.
fn integration_root(url: &str, platform: ControllerPlatform) -> Result<Url, Error> {
    let mut root = Url::parse(url)?;
    let path = root.path().trim_end_matches('/').to_owned();

    if path.ends_with("/integration") {
        root.set_path(&format!("{path}/"));
    } else {
        root.set_path(&format!("{path}{}/", platform.integration_prefix()));
    }
    Ok(root)
}
