//! Constants for the network stats board
//!
//! Endpoint locations and fixed fetch parameters are centralized here.
//! Runtime choices (provider mode, locale, proxy origin) live in
//! `board::BoardConfig` instead.

/// HTTP request timeout when fetching from providers (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long a cached proxy response stays fresh (in seconds)
pub const CACHE_TTL_SECS: u64 = 60;

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko endpoint for the current ETH price
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

/// CoinGecko endpoint for historical ETH prices
pub const COINGECKO_MARKET_CHART_ENDPOINT: &str = "/coins/ethereum/market_chart";

/// First-party proxy path wrapping the Etherscan node stats API
pub const PROXY_ETHERSCAN_PATH: &str = "/.netlify/functions/etherscan";

/// First-party proxy path wrapping the Etherscan daily transactions API
pub const PROXY_TXS_PATH: &str = "/.netlify/functions/txs";

/// First-party proxy path wrapping the DeFi Pulse API
pub const PROXY_DEFIPULSE_PATH: &str = "/.netlify/functions/defipulse";

/// CoinGecko history tokens: trailing 30 days, full history keyword
pub const COINGECKO_RANGE_TOKENS: [&str; 2] = ["30", "max"];

/// DeFi Pulse history tokens: one month, full history keyword
pub const DEFIPULSE_RANGE_TOKENS: [&str; 2] = ["1m", "all"];

/// Start date of the long Etherscan window (node tracker launch)
pub const ETHERSCAN_LONG_START_DATE: &str = "2019-10-30";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "network-stats-sdk/0.1.0";
