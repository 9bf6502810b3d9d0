//! Etherscan adapters for the node-count and tx-count metrics
//!
//! Both read first-party proxy endpoints that wrap the keyed Etherscan
//! stats API, through the shared response cache. The range token is an
//! absolute start date (`YYYY-MM-DD`); the end of the window is always
//! today, computed at fetch time.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::constants::{PROXY_ETHERSCAN_PATH, PROXY_TXS_PATH};
use crate::error::ProviderError;
use crate::normalize::{self, ProviderKind};
use crate::provider::MetricProvider;

const PROVIDER_NAME: &str = "etherscan";

fn history_path(base_path: &str, start_date: &str) -> String {
    let end_date = Utc::now().format("%Y-%m-%d");
    format!(
        "{}?startdate={}&enddate={}&sort=asc",
        base_path, start_date, end_date
    )
}

/// Reachable-node-count adapter
///
/// Current value: `result.TotalNodeCount` from the proxy stats endpoint.
/// History: the `nodecounthistory` window selected by the start-date token.
pub struct EtherscanNodesProvider {
    cache: Arc<ResponseCache>,
}

impl EtherscanNodesProvider {
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl MetricProvider for EtherscanNodesProvider {
    async fn fetch_current(&self) -> Result<f64, ProviderError> {
        let body = self.cache.get_data(PROVIDER_NAME, PROXY_ETHERSCAN_PATH).await?;
        body.get("result")
            .and_then(|r| r.get("TotalNodeCount"))
            .and_then(normalize::numeric)
            .ok_or_else(|| {
                ProviderError::invalid_response(
                    PROVIDER_NAME,
                    PROXY_ETHERSCAN_PATH,
                    "missing result.TotalNodeCount",
                )
            })
    }

    async fn fetch_history(&self, range_token: &str) -> Result<Value, ProviderError> {
        let path = history_path(PROXY_ETHERSCAN_PATH, range_token);
        self.cache.get_data(PROVIDER_NAME, &path).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::EtherscanNodes
    }
}

/// Daily-transaction-count adapter
///
/// Current value: the newest row of the proxy's recent window
/// (`result[0].transactionCount`, newest first). History: the daily window
/// selected by the start-date token, oldest first.
pub struct EtherscanTxsProvider {
    cache: Arc<ResponseCache>,
}

impl EtherscanTxsProvider {
    pub fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl MetricProvider for EtherscanTxsProvider {
    async fn fetch_current(&self) -> Result<f64, ProviderError> {
        let body = self.cache.get_data(PROVIDER_NAME, PROXY_TXS_PATH).await?;
        body.get("result")
            .and_then(|r| r.get(0))
            .and_then(|row| row.get("transactionCount"))
            .and_then(normalize::numeric)
            .ok_or_else(|| {
                ProviderError::invalid_response(
                    PROVIDER_NAME,
                    PROXY_TXS_PATH,
                    "missing result[0].transactionCount",
                )
            })
    }

    async fn fetch_history(&self, range_token: &str) -> Result<Value, ProviderError> {
        let path = history_path(PROXY_TXS_PATH, range_token);
        self.cache.get_data(PROVIDER_NAME, &path).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::EtherscanTxs
    }
}
