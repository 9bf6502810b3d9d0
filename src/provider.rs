//! Provider abstraction for fetching metric data from external sources

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;
use crate::normalize::ProviderKind;

/// Uniform fetch contract implemented by every data source
///
/// Adapters hold no mutable state and return fresh data on each call.
/// They never catch-and-swallow: any network, status, or payload problem
/// propagates as a `ProviderError` so the store can attribute it to the
/// owning metric.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    /// Fetches the current scalar for the metric
    async fn fetch_current(&self) -> Result<f64, ProviderError>;

    /// Fetches the raw historical payload for a range token
    ///
    /// Token semantics are provider-specific (a day count, a start date, or
    /// a provider keyword) and documented on each adapter.
    async fn fetch_history(&self, range_token: &str) -> Result<Value, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;

    /// Selects the normalizer extraction rule for this provider's history
    fn kind(&self) -> ProviderKind;
}
