//! CoinGecko price adapter
//!
//! Serves the ETH price metric from the public CoinGecko API: current value
//! from `simple/price`, history from `market_chart`. The range token is a
//! day count (`"30"`) or the provider keyword `"max"` for the full history.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{
    COINGECKO_API_URL, COINGECKO_MARKET_CHART_ENDPOINT, COINGECKO_SIMPLE_PRICE_ENDPOINT,
    REQUEST_TIMEOUT_SECS, USER_AGENT,
};
use crate::error::ProviderError;
use crate::normalize::ProviderKind;
use crate::provider::MetricProvider;

const PROVIDER_NAME: &str = "coingecko";

/// CoinGecko response for simple price queries
#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    ethereum: EthereumPrice,
}

#[derive(Debug, Deserialize)]
struct EthereumPrice {
    usd: f64,
}

/// CoinGecko price adapter
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko adapter against the public API
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(COINGECKO_API_URL)
    }

    /// Creates an adapter against a custom origin (tests, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::network(PROVIDER_NAME, base_url.clone(), e))?;

        Ok(Self { client, base_url })
    }

    async fn get_json(&self, url: &str) -> Result<Value, ProviderError> {
        tracing::debug!(provider = PROVIDER_NAME, %url, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::status(PROVIDER_NAME, url, status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, url, e))?;
        serde_json::from_str(&text)
            .map_err(|e| ProviderError::invalid_response(PROVIDER_NAME, url, e.to_string()))
    }
}

#[async_trait]
impl MetricProvider for CoinGeckoProvider {
    async fn fetch_current(&self) -> Result<f64, ProviderError> {
        let url = format!(
            "{}{}?ids=ethereum&vs_currencies=usd",
            self.base_url, COINGECKO_SIMPLE_PRICE_ENDPOINT
        );
        let body = self.get_json(&url).await?;
        let parsed: SimplePriceResponse = serde_json::from_value(body)
            .map_err(|e| ProviderError::invalid_response(PROVIDER_NAME, &url, e.to_string()))?;
        Ok(parsed.ethereum.usd)
    }

    async fn fetch_history(&self, range_token: &str) -> Result<Value, ProviderError> {
        let url = format!(
            "{}{}?vs_currency=usd&days={}",
            self.base_url, COINGECKO_MARKET_CHART_ENDPOINT, range_token
        );
        self.get_json(&url).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::CoinGecko
    }
}
