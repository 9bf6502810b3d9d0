//! Stats board composition
//!
//! Assembles the four dashboard metrics with their display metadata and
//! adapters, and fronts the store for whatever layer renders them. All
//! state lives in the store; all drawing, styling, and translation lookup
//! stays outside this crate.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Months, Utc};

use crate::cache::{CacheConfig, ResponseCache};
use crate::constants::{
    COINGECKO_RANGE_TOKENS, DEFIPULSE_RANGE_TOKENS, ETHERSCAN_LONG_START_DATE,
};
use crate::error::ProviderError;
use crate::format::Locale;
use crate::provider::MetricProvider;
use crate::providers::{
    CoinGeckoProvider, DefiPulseProvider, EtherscanNodesProvider, EtherscanTxsProvider,
    FixtureProvider,
};
use crate::store::MetricStore;
use crate::telemetry::ProviderTelemetry;
use crate::types::{
    BoardHealth, HealthStatus, MetricDescriptor, MetricId, MetricSnapshot, RangeIndex,
    ValueFormat,
};

/// Which adapter family serves the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderMode {
    /// Network adapters against the real providers
    #[default]
    Live,
    /// Deterministic in-memory adapters, no network
    Fixture,
}

/// Board construction options
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub mode: ProviderMode,
    pub locale: Locale,
    /// Origin serving the first-party proxy functions; empty means
    /// same-origin relative paths
    pub proxy_base_url: String,
    pub cache: CacheConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Live,
            locale: Locale::default(),
            proxy_base_url: String::new(),
            cache: CacheConfig::default(),
        }
    }
}

/// The network stats board
///
/// # Example
/// ```no_run
/// use network_stats_sdk::{BoardConfig, MetricId, ProviderMode, RangeIndex, StatsBoard};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let board = StatsBoard::new(BoardConfig::default())?;
/// board.initialize().await;
///
/// let price = board.snapshot(MetricId::Price).await.unwrap();
/// if let Some(value) = &price.value.value {
///     println!("ETH: {}", value);
/// }
///
/// board.switch_range(MetricId::Price, RangeIndex::Long).await;
/// # Ok(())
/// # }
/// ```
pub struct StatsBoard {
    store: MetricStore,
}

impl StatsBoard {
    /// Builds the board with the four dashboard metrics
    pub fn new(config: BoardConfig) -> Result<Self, ProviderError> {
        let descriptors = build_descriptors();
        let entries: Vec<(MetricDescriptor, Arc<dyn MetricProvider>)> = match config.mode {
            ProviderMode::Fixture => descriptors
                .into_iter()
                .map(|descriptor| {
                    let provider: Arc<dyn MetricProvider> =
                        Arc::new(FixtureProvider::for_metric(descriptor.id));
                    (descriptor, provider)
                })
                .collect(),
            ProviderMode::Live => {
                let cache = Arc::new(ResponseCache::new(
                    config.proxy_base_url.clone(),
                    config.cache.clone(),
                )?);
                let mut entries = Vec::with_capacity(descriptors.len());
                for descriptor in descriptors {
                    let provider: Arc<dyn MetricProvider> = match descriptor.id {
                        MetricId::Price => Arc::new(CoinGeckoProvider::new()?),
                        MetricId::TxCount => Arc::new(EtherscanTxsProvider::new(cache.clone())),
                        MetricId::ValueLocked => Arc::new(DefiPulseProvider::new(cache.clone())),
                        MetricId::NodeCount => {
                            Arc::new(EtherscanNodesProvider::new(cache.clone()))
                        }
                    };
                    entries.push((descriptor, provider));
                }
                entries
            }
        };

        Ok(Self {
            store: MetricStore::new(entries, config.locale),
        })
    }

    /// Builds a board over custom descriptor/provider pairs
    ///
    /// This is primarily for testing with mock providers.
    pub fn with_providers(
        entries: Vec<(MetricDescriptor, Arc<dyn MetricProvider>)>,
        locale: Locale,
    ) -> Self {
        Self {
            store: MetricStore::new(entries, locale),
        }
    }

    /// Triggers the default fetch for every metric (current value plus
    /// active-range history), concurrently and independently
    pub async fn initialize(&self) {
        self.store.initialize().await;
    }

    /// Switches one metric's history range and re-fetches only that series
    pub async fn switch_range(&self, id: MetricId, range: RangeIndex) {
        self.store.switch_range(id, range).await;
    }

    /// Current state snapshot for one metric
    pub async fn snapshot(&self, id: MetricId) -> Option<MetricSnapshot> {
        self.store.snapshot(id).await
    }

    /// Current state snapshots for all metrics
    pub async fn snapshots(&self) -> HashMap<MetricId, MetricSnapshot> {
        self.store.snapshots().await
    }

    /// Static display metadata for one metric
    pub fn descriptor(&self, id: MetricId) -> Option<&MetricDescriptor> {
        self.store.descriptor(id)
    }

    /// Descriptors in display order
    pub fn descriptors(&self) -> Vec<&MetricDescriptor> {
        MetricId::all()
            .iter()
            .filter_map(|id| self.store.descriptor(*id))
            .collect()
    }

    /// Fetch telemetry for one metric's provider
    pub async fn telemetry(&self, id: MetricId) -> Option<ProviderTelemetry> {
        self.store.telemetry(id).await
    }

    /// Health roll-up across all metrics
    pub async fn health(&self) -> BoardHealth {
        let snapshots = self.snapshots().await;
        let failed: Vec<MetricId> = MetricId::all()
            .iter()
            .copied()
            .filter(|id| {
                snapshots
                    .get(id)
                    .map(|s| s.value.has_error || s.series.has_error)
                    .unwrap_or(false)
            })
            .collect();

        let status = if failed.is_empty() {
            HealthStatus::Healthy
        } else if failed.len() == snapshots.len() {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        BoardHealth { status, failed }
    }
}

/// The four dashboard metrics in display order
fn build_descriptors() -> Vec<MetricDescriptor> {
    let month_ago = month_ago_date();
    vec![
        MetricDescriptor {
            id: MetricId::Price,
            title_key: "page-index-network-stats-eth-price-description",
            description_key: "page-index-network-stats-eth-price-explainer",
            api_provider_name: "CoinGecko",
            api_url: "https://www.coingecko.com/en/coins/ethereum",
            range_tokens: COINGECKO_RANGE_TOKENS.map(String::from),
            value_format: ValueFormat::Currency,
        },
        MetricDescriptor {
            id: MetricId::TxCount,
            title_key: "page-index-network-stats-tx-day-description",
            description_key: "page-index-network-stats-tx-day-explainer",
            api_provider_name: "Etherscan",
            api_url: "https://etherscan.io/",
            range_tokens: [month_ago.clone(), ETHERSCAN_LONG_START_DATE.to_string()],
            value_format: ValueFormat::CompactCount,
        },
        MetricDescriptor {
            id: MetricId::ValueLocked,
            title_key: "page-index-network-stats-value-defi-description",
            description_key: "page-index-network-stats-value-defi-explainer",
            api_provider_name: "DeFi Pulse",
            api_url: "https://defipulse.com",
            range_tokens: DEFIPULSE_RANGE_TOKENS.map(String::from),
            value_format: ValueFormat::CompactCurrency,
        },
        MetricDescriptor {
            id: MetricId::NodeCount,
            title_key: "page-index-network-stats-nodes-description",
            description_key: "page-index-network-stats-nodes-explainer",
            api_provider_name: "Etherscan",
            api_url: "https://etherscan.io/nodetracker",
            range_tokens: [month_ago, ETHERSCAN_LONG_START_DATE.to_string()],
            value_format: ValueFormat::Count,
        },
    ]
}

/// Start of the short Etherscan window, one month back from today
fn month_ago_date() -> String {
    let today = Utc::now().date_naive();
    let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    start.format("%Y-%m-%d").to_string()
}
