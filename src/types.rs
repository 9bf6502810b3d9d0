//! Types for the network stats board

use serde::{Deserialize, Serialize};

/// The dashboard statistics tracked by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricId {
    /// Current ETH price
    Price,
    /// Daily transaction count
    TxCount,
    /// Total value locked in DeFi
    ValueLocked,
    /// Reachable node count
    NodeCount,
}

impl MetricId {
    /// Stable key used in logs and snapshots
    pub fn key(&self) -> &'static str {
        match self {
            MetricId::Price => "price",
            MetricId::TxCount => "txCount",
            MetricId::ValueLocked => "valueLocked",
            MetricId::NodeCount => "nodeCount",
        }
    }

    /// All tracked metrics
    pub fn all() -> &'static [MetricId] {
        &[
            MetricId::Price,
            MetricId::TxCount,
            MetricId::ValueLocked,
            MetricId::NodeCount,
        ]
    }
}

/// Which of the two range toggles is active for a metric
///
/// `Short` is the default window (e.g. 30 days), `Long` the full history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeIndex {
    #[default]
    Short,
    Long,
}

impl RangeIndex {
    /// Position into a descriptor's `range_tokens`
    pub fn index(&self) -> usize {
        match self {
            RangeIndex::Short => 0,
            RangeIndex::Long => 1,
        }
    }
}

/// Formatting rule applied to a metric's current scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Full currency, e.g. "$1,330"
    Currency,
    /// Compacted currency, e.g. "$23.46B"
    CompactCurrency,
    /// Compacted plain count, e.g. "1.235M"
    CompactCount,
    /// Plain grouped count, e.g. "8,040"
    Count,
}

/// Current-value slice of a metric
///
/// `value == None && !has_error` is the loading state. A fetch completion is
/// the only mutation: success sets the formatted value, failure sets
/// `has_error` and leaves the value empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueState {
    /// Formatted display string, present once the fetch resolved
    pub value: Option<String>,
    /// Last fetch failed
    pub has_error: bool,
}

impl ValueState {
    /// True until the first fetch resolves either way
    pub fn is_loading(&self) -> bool {
        self.value.is_none() && !self.has_error
    }
}

/// Timestamp attached to a series point
///
/// Providers disagree on the axis type: CoinGecko sends millisecond
/// timestamps, Etherscan sends UTC date strings, DeFi Pulse unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointStamp {
    Unix(i64),
    Date(String),
}

/// One point of a historical series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub stamp: PointStamp,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(stamp: PointStamp, value: f64) -> Self {
        Self { stamp, value }
    }
}

/// Historical-series slice of a metric
///
/// `loading` distinguishes the initial/in-flight state from a resolved but
/// genuinely empty series. While a range switch is in flight the previous
/// points stay visible (`loading = true` over non-empty `points`); a failed
/// fetch drops them so a chart never shows data for the wrong range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesState {
    pub points: Vec<SeriesPoint>,
    pub has_error: bool,
    pub loading: bool,
}

impl SeriesState {
    /// Resolved successfully (possibly with zero points)
    pub fn is_ready(&self) -> bool {
        !self.loading && !self.has_error
    }
}

/// Static display metadata for one metric
///
/// Created once at board construction and never mutated. Titles and
/// descriptions are translation keys; string lookup belongs to the
/// presentation layer.
#[derive(Debug, Clone)]
pub struct MetricDescriptor {
    pub id: MetricId,
    pub title_key: &'static str,
    pub description_key: &'static str,
    /// Attribution shown next to the widget, e.g. "CoinGecko"
    pub api_provider_name: &'static str,
    /// Link target for the attribution
    pub api_url: &'static str,
    /// Provider-specific history tokens, indexed by `RangeIndex`
    pub range_tokens: [String; 2],
    pub value_format: ValueFormat,
}

impl MetricDescriptor {
    /// Token for the given toggle position
    pub fn range_token(&self, range: RangeIndex) -> &str {
        &self.range_tokens[range.index()]
    }
}

/// Read snapshot of one metric's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub value: ValueState,
    pub series: SeriesState,
    pub active_range: RangeIndex,
}

/// Overall board health
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// All metrics resolved without error
    Healthy,
    /// Some metrics failed, the rest are usable
    Degraded,
    /// Every metric failed
    Unhealthy,
}

/// Health roll-up across all metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardHealth {
    pub status: HealthStatus,
    /// Metrics whose value or series slice is in error
    pub failed: Vec<MetricId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_state_loading_until_resolution() {
        let state = ValueState::default();
        assert!(state.is_loading());

        let ready = ValueState {
            value: Some("$1,330".to_string()),
            has_error: false,
        };
        assert!(!ready.is_loading());

        let failed = ValueState {
            value: None,
            has_error: true,
        };
        assert!(!failed.is_loading());
    }

    #[test]
    fn range_index_positions() {
        assert_eq!(RangeIndex::Short.index(), 0);
        assert_eq!(RangeIndex::Long.index(), 1);
        assert_eq!(RangeIndex::default(), RangeIndex::Short);
    }

    #[test]
    fn empty_series_is_distinct_from_loading() {
        let resolved_empty = SeriesState {
            points: vec![],
            has_error: false,
            loading: false,
        };
        assert!(resolved_empty.is_ready());

        let loading = SeriesState {
            points: vec![],
            has_error: false,
            loading: true,
        };
        assert!(!loading.is_ready());
    }
}
