use reqwest::{Client, Response};
use serde::Deserialize;

use crate::catalog::AgentRecord;
use crate::checkout::{CheckoutRequest, CheckoutSession};
use crate::error::{MarketError, Result};

pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// Client for a running catalog service.
pub struct MarketClient {
    http: Client,
    base_url: String,
}

/// Body of a successful seed call.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedReport {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub count: usize,
}

impl MarketClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn check(resp: Response) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(MarketError::Api { status, body })
    }

    /// Every record in the catalog, unfiltered.
    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>> {
        let url = format!("{}/api/agents", self.base_url);
        let resp = Self::check(self.http.get(&url).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn get_agent(&self, id: u32) -> Result<AgentRecord> {
        let url = format!("{}/api/agents/{id}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if resp.status().as_u16() == 404 {
            return Err(MarketError::NotFound(id));
        }
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Fetch several records, keeping the order of `ids`.
    pub async fn get_agents(&self, ids: &[u32]) -> Result<Vec<AgentRecord>> {
        let all = self.list_agents().await?;
        ids.iter()
            .map(|&id| {
                all.iter()
                    .find(|a| a.id == id)
                    .cloned()
                    .ok_or(MarketError::NotFound(id))
            })
            .collect()
    }

    /// Replace the service's catalog with its bundled data.
    pub async fn seed(&self) -> Result<SeedReport> {
        let url = format!("{}/api/seed", self.base_url);
        let resp = Self::check(self.http.get(&url).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_checkout(&self, req: &CheckoutRequest) -> Result<CheckoutSession> {
        let url = format!("{}/api/checkout_sessions", self.base_url);
        let resp = self.http.post(&url).json(req).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}
