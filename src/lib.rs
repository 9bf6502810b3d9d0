//! # Network Stats Dashboard Core
//!
//! Tracks a small set of network statistics (ETH price, daily transactions,
//! DeFi TVL, node count), each with a locale-formatted current value and a
//! sparkline history behind a two-way range toggle. Data comes from external
//! providers (CoinGecko, Etherscan via a first-party proxy, DeFi Pulse);
//! rendering and translation lookup stay outside this crate.
//!
//! ## Usage
//!
//! ```no_run
//! use network_stats_sdk::{BoardConfig, MetricId, RangeIndex, StatsBoard};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let board = StatsBoard::new(BoardConfig::default())?;
//!
//! // Kick off every metric's current value and default-range history
//! board.initialize().await;
//!
//! // Read whatever has resolved so far
//! for (id, snapshot) in board.snapshots().await {
//!     match (&snapshot.value.value, snapshot.value.has_error) {
//!         (Some(value), _) => println!("{}: {}", id.key(), value),
//!         (None, true) => println!("{}: error, please refresh", id.key()),
//!         (None, false) => println!("{}: loading", id.key()),
//!     }
//! }
//!
//! // Re-fetch only the price history for the full range
//! board.switch_range(MetricId::Price, RangeIndex::Long).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! StatsBoard (descriptors + config)
//!     ↓
//! MetricStore (per-metric ValueState / SeriesState, sequence-guarded commits)
//!     ↓
//! MetricProvider adapters (CoinGecko, Etherscan, DeFi Pulse, fixture)
//!     ↓
//! normalize / format (uniform series points, locale display strings)
//! ```
//!
//! Each metric fails independently: an adapter error marks only that
//! metric's slice with `has_error` and never crosses to its siblings.
//! Racing range switches resolve last-request-wins, so a slow stale fetch
//! can never overwrite a newer one.

pub mod board;
pub mod cache;
pub mod constants;
pub mod error;
pub mod format;
pub mod normalize;
pub mod provider;
pub mod providers;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use board::{BoardConfig, ProviderMode, StatsBoard};
pub use cache::CacheConfig;
pub use error::ProviderError;
pub use format::Locale;
pub use provider::MetricProvider;
pub use telemetry::ProviderTelemetry;
pub use types::{
    BoardHealth, HealthStatus, MetricDescriptor, MetricId, MetricSnapshot, PointStamp,
    RangeIndex, SeriesPoint, SeriesState, ValueFormat, ValueState,
};
