//! DeFi Pulse adapter for the total-value-locked metric
//!
//! Reads the first-party proxy wrapping the keyed DeFi Pulse API. Current
//! value is the aggregate `ethereumTVL` field; history comes from the
//! `GetHistory` window where the range token is a period keyword (`"1m"`
//! or `"all"`). The raw TVL arrives in USD; scaling to the displayed
//! billions happens in the normalizer.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::constants::PROXY_DEFIPULSE_PATH;
use crate::error::ProviderError;
use crate::normalize::{self, ProviderKind};
use crate::provider::MetricProvider;

const PROVIDER_NAME: &str = "defipulse";

/// DeFi Pulse TVL adapter
pub struct DefiPulseProvider {
    cache: Arc<ResponseCache>,
}

impl DefiPulseProvider {
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl MetricProvider for DefiPulseProvider {
    async fn fetch_current(&self) -> Result<f64, ProviderError> {
        let body = self.cache.get_data(PROVIDER_NAME, PROXY_DEFIPULSE_PATH).await?;
        body.get("ethereumTVL")
            .and_then(normalize::numeric)
            .ok_or_else(|| {
                ProviderError::invalid_response(
                    PROVIDER_NAME,
                    PROXY_DEFIPULSE_PATH,
                    "missing ethereumTVL",
                )
            })
    }

    async fn fetch_history(&self, range_token: &str) -> Result<Value, ProviderError> {
        let path = format!(
            "{}?period={}&length=days",
            PROXY_DEFIPULSE_PATH, range_token
        );
        self.cache.get_data(PROVIDER_NAME, &path).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DefiPulse
    }
}
