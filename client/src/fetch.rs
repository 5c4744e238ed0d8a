use std::future::Future;

use costmap_shared::{FeatureId, RegionCosts};
use tracing::warn;

use crate::config::MapConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "cost request failed: {msg}"),
            Self::Status(code) => write!(f, "cost API returned HTTP {code}"),
            Self::Decode(msg) => write!(f, "invalid cost payload: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Result of one cost fetch, tagged with the district it was issued for so
/// the receiver can compare it against whatever is selected by then.
#[derive(Debug, Clone, PartialEq)]
pub struct CostFetchOutcome {
    pub district_id: FeatureId,
    pub result: Result<RegionCosts, FetchError>,
}

/// Where cost breakdowns come from.
pub trait CostSource: Send + Sync + 'static {
    fn fetch_costs(
        &self,
        district_id: FeatureId,
    ) -> impl Future<Output = Result<RegionCosts, FetchError>> + Send;
}

/// Cost breakdowns from the open-data HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCostSource {
    client: reqwest::Client,
    api_base: String,
    year: u16,
}

impl HttpCostSource {
    pub fn new(config: &MapConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("costmap-client/0.1")
            .timeout(config.http_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(config.http_timeout)
                    .connect_timeout(config.connect_timeout)
                    .build()
            })?;
        Ok(Self::with_client(client, &config.api_base, config.cost_year))
    }

    pub fn with_client(client: reqwest::Client, api_base: &str, year: u16) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            year,
        }
    }

    pub fn costs_url(&self, district_id: FeatureId) -> String {
        format!(
            "{}/api/regions/{district_id}/costs?year={}",
            self.api_base, self.year
        )
    }
}

impl CostSource for HttpCostSource {
    async fn fetch_costs(&self, district_id: FeatureId) -> Result<RegionCosts, FetchError> {
        let resp = self
            .client
            .get(self.costs_url(district_id))
            .send()
            .await?
            .error_for_status()?;
        let costs: RegionCosts = resp.json().await?;
        Ok(costs)
    }
}
