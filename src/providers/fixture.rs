//! Deterministic in-memory adapter
//!
//! Stands in for the live providers during development and in tests, so
//! the board renders without network access. Selected through
//! `BoardConfig { mode: ProviderMode::Fixture, .. }` rather than an
//! environment branch inside the state logic.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::normalize::ProviderKind;
use crate::provider::MetricProvider;
use crate::types::MetricId;

/// Fixture series start, an arbitrary fixed epoch
const SERIES_EPOCH_SECS: i64 = 1_600_000_000;

/// Points generated when the range token is not a day count
const DEFAULT_SERIES_LEN: usize = 90;

/// Deterministic provider with a constant current value and a generated
/// ascending history ramp
pub struct FixtureProvider {
    current: f64,
}

impl FixtureProvider {
    pub fn new(current: f64) -> Self {
        Self { current }
    }

    /// Fixture values per metric, matching the development placeholders
    /// the dashboard renders offline
    pub fn for_metric(id: MetricId) -> Self {
        let current = match id {
            MetricId::Price => 1_330.0,
            MetricId::TxCount => 1_234_567.0,
            MetricId::ValueLocked => 23_456_789_000.0,
            MetricId::NodeCount => 8_040.0,
        };
        Self::new(current)
    }
}

#[async_trait]
impl MetricProvider for FixtureProvider {
    async fn fetch_current(&self) -> Result<f64, ProviderError> {
        Ok(self.current)
    }

    async fn fetch_history(&self, range_token: &str) -> Result<Value, ProviderError> {
        // a day-count token sizes the window, anything else gets the long ramp
        let len = range_token.parse::<usize>().unwrap_or(DEFAULT_SERIES_LEN);
        let points: Vec<Value> = (0..len)
            .map(|i| {
                let stamp = SERIES_EPOCH_SECS + (i as i64) * 86_400;
                let progress = if len > 1 { i as f64 / (len - 1) as f64 } else { 1.0 };
                let value = self.current * (0.9 + 0.1 * progress);
                json!([stamp, value])
            })
            .collect();
        Ok(json!({ "points": points }))
    }

    fn provider_name(&self) -> &'static str {
        "fixture"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Fixture
    }
}
