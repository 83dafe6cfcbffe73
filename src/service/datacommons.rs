//! Data Commons API client
//!
//! Rate-limited HTTP client for the Data Commons REST v2 API. Name
//! resolution goes through `POST /resolve`, property fetches through
//! `POST /node`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::debug;
use url::Url;

use super::types::{NodeRequest, NodeResponse, ResolveResponse};
use super::{PlaceService, ServiceResult};
use crate::error::ServiceError;

const PUBLIC_API_BASE: &str = "https://api.datacommons.org/v2";
const PUBLIC_INSTANCE: &str = "api.datacommons.org";
const DEFAULT_INSTANCE: &str = "datacommons.one.org";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RATE_LIMIT_MS: u64 = 100;

/// Connection settings for a Data Commons instance.
///
/// An explicit `url` wins over `instance`. A custom instance is served under
/// `https://{instance}/core/api/v2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataCommonsSettings {
    pub instance: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub rate_limit_ms: u64,
}

impl Default for DataCommonsSettings {
    fn default() -> Self {
        Self {
            instance: Some(DEFAULT_INSTANCE.to_string()),
            url: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
        }
    }
}

impl DataCommonsSettings {
    /// The public `api.datacommons.org` endpoint.
    pub fn public(api_key: impl Into<String>) -> Self {
        Self {
            instance: Some(PUBLIC_INSTANCE.to_string()),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Base URL every endpoint hangs off, without a trailing slash.
    pub fn base_url(&self) -> Result<Url> {
        let raw = match (&self.url, &self.instance) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(instance)) if instance != PUBLIC_INSTANCE => {
                format!("https://{}/core/api/v2", instance.trim_end_matches('/'))
            }
            _ => PUBLIC_API_BASE.to_string(),
        };
        Url::parse(&raw).with_context(|| format!("Invalid Data Commons URL: {raw}"))
    }
}

/// Data Commons API client
pub struct DataCommonsClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    rate_limit: Duration,
    next_slot: Mutex<Instant>,
}

impl DataCommonsClient {
    /// Create a client from `DC_INSTANCE`, `DC_URL` and `DC_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let mut settings = DataCommonsSettings::default();
        if let Ok(instance) = std::env::var("DC_INSTANCE") {
            settings.instance = Some(instance);
        }
        settings.url = std::env::var("DC_URL").ok();
        settings.api_key = std::env::var("DC_API_KEY").ok();
        Self::new(settings)
    }

    pub fn new(settings: DataCommonsSettings) -> Result<Self> {
        let base_url = settings.base_url()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key,
            rate_limit: Duration::from_millis(settings.rate_limit_ms),
            next_slot: Mutex::new(Instant::now()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Reserve the next request slot and wait for it.
    async fn rate_limit(&self) {
        let wait = self.reserve_slot(Instant::now());
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }

    /// Claims a slot under one lock so concurrent callers are spaced apart.
    fn reserve_slot(&self, now: Instant) -> Duration {
        let mut next = self.next_slot.lock().unwrap_or_else(|e| e.into_inner());
        let slot = (*next).max(now);
        *next = slot + self.rate_limit;
        slot - now
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &NodeRequest<'_>,
    ) -> ServiceResult<T> {
        self.rate_limit().await;

        let url = format!("{}/{}", self.base_url(), endpoint);
        debug!(
            url = %url,
            nodes = body.nodes.len(),
            property = %body.property,
            "Data Commons request"
        );

        let mut request = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Property expression asking for the identifiers described by a name.
pub(crate) fn resolve_expression(entity_type: Option<&str>) -> String {
    match entity_type {
        Some(t) => format!("<-description{{typeOf:{t}}}->dcid"),
        None => "<-description->dcid".to_string(),
    }
}

pub(crate) fn candidates_by_name(response: ResolveResponse) -> HashMap<String, Vec<String>> {
    let mut mapping: HashMap<String, Vec<String>> = HashMap::new();
    for entity in response.entities {
        mapping
            .entry(entity.node)
            .or_default()
            .extend(entity.candidates.into_iter().filter_map(|c| c.dcid));
    }
    mapping
}

pub(crate) fn values_by_id(
    mut response: NodeResponse,
    ids: &[String],
    property: &str,
) -> HashMap<String, Vec<String>> {
    ids.iter()
        .map(|id| {
            let values = response
                .data
                .remove(id)
                .and_then(|mut node| node.arcs.remove(property))
                .map(|arcs| arcs.nodes.into_iter().filter_map(|n| n.into_value()).collect())
                .unwrap_or_default();
            (id.clone(), values)
        })
        .collect()
}

#[async_trait]
impl PlaceService for DataCommonsClient {
    async fn resolve_names(
        &self,
        names: &[String],
        entity_type: Option<&str>,
    ) -> ServiceResult<HashMap<String, Vec<String>>> {
        let body = NodeRequest {
            nodes: names,
            property: resolve_expression(entity_type),
            next_token: None,
        };
        let response: ResolveResponse = self.post("resolve", &body).await?;
        Ok(candidates_by_name(response))
    }

    async fn fetch_properties(
        &self,
        ids: &[String],
        property: &str,
    ) -> ServiceResult<HashMap<String, Vec<String>>> {
        let mut body = NodeRequest {
            nodes: ids,
            property: format!("->{property}"),
            next_token: None,
        };
        let mut response: NodeResponse = self.post("node", &body).await?;
        let mut pages = 1;
        while let Some(token) = response.next_token.take() {
            body.next_token = Some(token);
            let page: NodeResponse = self.post("node", &body).await?;
            response.merge(page);
            pages += 1;
        }
        if pages > 1 {
            debug!(property, pages, "merged paginated Data Commons node response");
        }
        Ok(values_by_id(response, ids, property))
    }
}
