//! Metric provider implementations

pub mod coingecko;
pub mod defipulse;
pub mod etherscan;
pub mod fixture;

pub use coingecko::CoinGeckoProvider;
pub use defipulse::DefiPulseProvider;
pub use etherscan::{EtherscanNodesProvider, EtherscanTxsProvider};
pub use fixture::FixtureProvider;
