//! Series normalization for heterogeneous provider payloads
//!
//! Each provider reports history in its own shape and units; `normalize`
//! reduces all of them to an ordered `SeriesPoint` sequence. Malformed or
//! empty input yields an empty sequence — fetch-level failures are the
//! adapter's job, not this module's.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::types::{PointStamp, SeriesPoint};

/// Names the extraction rule for a provider's history payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `{"prices": [[ms_timestamp, price], ..]}`, oldest first
    CoinGecko,
    /// `{"result": [{"UTCDate", "TotalNodeCount"}, ..]}`, oldest first
    EtherscanNodes,
    /// `{"result": [{"UTCDate", "transactionCount"}, ..]}`, oldest first
    EtherscanTxs,
    /// `[{"timestamp", "tvlUSD"}, ..]`, newest first, TVL in raw USD
    DefiPulse,
    /// `{"points": [[unix_secs, value], ..]}`, oldest first
    Fixture,
}

/// Converts a raw history response into chronological `SeriesPoint`s.
///
/// Output is ascending in the provider's natural order; duplicate
/// timestamps collapse to a single point holding the last value seen.
pub fn normalize(kind: ProviderKind, raw: &Value) -> Vec<SeriesPoint> {
    let points = match kind {
        ProviderKind::CoinGecko => pairs(raw.get("prices")),
        ProviderKind::EtherscanNodes => dated_counts(raw, "TotalNodeCount"),
        ProviderKind::EtherscanTxs => dated_counts(raw, "transactionCount"),
        ProviderKind::DefiPulse => defipulse_history(raw),
        ProviderKind::Fixture => pairs(raw.get("points")),
    };
    dedupe_last_wins(points)
}

/// Extracts `[[timestamp, value], ..]` pair arrays (CoinGecko, fixture).
fn pairs(raw: Option<&Value>) -> Vec<SeriesPoint> {
    let Some(rows) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| {
            let row = row.as_array()?;
            let t = row.first().and_then(numeric)? as i64;
            let v = row.get(1).and_then(numeric)?;
            Some(SeriesPoint::new(PointStamp::Unix(t), v))
        })
        .collect()
}

/// Extracts Etherscan `result` rows keyed by a UTC date string.
fn dated_counts(raw: &Value, count_field: &str) -> Vec<SeriesPoint> {
    let Some(rows) = raw.get("result").and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| {
            let date = row.get("UTCDate")?.as_str()?;
            let count = row.get(count_field).and_then(numeric)?;
            Some(SeriesPoint::new(PointStamp::Date(date.to_string()), count))
        })
        .collect()
}

/// DeFi Pulse delivers newest-first with TVL in raw USD; the chart wants
/// oldest-first in billions.
fn defipulse_history(raw: &Value) -> Vec<SeriesPoint> {
    let Some(rows) = raw.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .rev()
        .enumerate()
        .filter_map(|(i, row)| {
            let tvl = row.get("tvlUSD").and_then(numeric)?;
            let stamp = match row.get("timestamp").and_then(numeric) {
                Some(secs) => PointStamp::Unix(secs as i64),
                None => PointStamp::Unix(i as i64),
            };
            Some(SeriesPoint::new(stamp, tvl / 1e9))
        })
        .collect()
}

/// Accepts a JSON number or a numeric string (Etherscan mixes both).
pub(crate) fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Collapses duplicate timestamps, keeping the original chronological slot
/// with the last value the provider reported for it.
fn dedupe_last_wins(points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    let mut seen: HashMap<PointStamp, usize> = HashMap::with_capacity(points.len());
    let mut out: Vec<SeriesPoint> = Vec::with_capacity(points.len());
    for point in points {
        match seen.get(&point.stamp) {
            Some(&idx) => out[idx].value = point.value,
            None => {
                seen.insert(point.stamp.clone(), out.len());
                out.push(point);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coingecko_prices_keep_order() {
        let raw = json!({
            "prices": [[1600000000000i64, 350.2], [1600003600000i64, 351.9], [1600007200000i64, 349.0]]
        });
        let points = normalize(ProviderKind::CoinGecko, &raw);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].stamp, PointStamp::Unix(1600000000000));
        assert_eq!(points[2].value, 349.0);
    }

    #[test]
    fn etherscan_counts_accept_strings_and_numbers() {
        let raw = json!({
            "result": [
                {"UTCDate": "2020-09-01", "TotalNodeCount": "7980"},
                {"UTCDate": "2020-09-02", "TotalNodeCount": 8040}
            ]
        });
        let points = normalize(ProviderKind::EtherscanNodes, &raw);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 7980.0);
        assert_eq!(points[1].stamp, PointStamp::Date("2020-09-02".to_string()));
        assert_eq!(points[1].value, 8040.0);
    }

    #[test]
    fn defipulse_reverses_and_scales_to_billions() {
        let raw = json!([
            {"timestamp": 1600172800, "tvlUSD": 11_500_000_000.0},
            {"timestamp": 1600086400, "tvlUSD": 11_000_000_000.0},
            {"timestamp": 1600000000, "tvlUSD": 10_000_000_000.0}
        ]);
        let points = normalize(ProviderKind::DefiPulse, &raw);
        assert_eq!(points.len(), 3);
        // oldest first, scaled down to the displayed billions
        assert_eq!(points[0].stamp, PointStamp::Unix(1600000000));
        assert_eq!(points[0].value, 10.0);
        assert_eq!(points[2].value, 11.5);
    }

    #[test]
    fn duplicate_timestamps_keep_last_value() {
        let raw = json!({
            "result": [
                {"UTCDate": "2020-09-01", "transactionCount": 100},
                {"UTCDate": "2020-09-02", "transactionCount": 200},
                {"UTCDate": "2020-09-01", "transactionCount": 150}
            ]
        });
        let points = normalize(ProviderKind::EtherscanTxs, &raw);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].stamp, PointStamp::Date("2020-09-01".to_string()));
        assert_eq!(points[0].value, 150.0);
        assert_eq!(points[1].value, 200.0);
    }

    #[test]
    fn malformed_input_yields_empty() {
        for kind in [
            ProviderKind::CoinGecko,
            ProviderKind::EtherscanNodes,
            ProviderKind::EtherscanTxs,
            ProviderKind::DefiPulse,
            ProviderKind::Fixture,
        ] {
            assert!(normalize(kind, &json!("not a history payload")).is_empty());
            assert!(normalize(kind, &json!({})).is_empty());
            assert!(normalize(kind, &json!(null)).is_empty());
        }
        // rows of the wrong shape are skipped, not fatal
        let raw = json!({"prices": [[1600000000000i64, 350.2], ["bad"], 7]});
        assert_eq!(normalize(ProviderKind::CoinGecko, &raw).len(), 1);
    }

    #[test]
    fn normalization_is_idempotent_on_the_same_payload() {
        let raw = json!({
            "prices": [[1600000000000i64, 350.2], [1600003600000i64, 351.9]]
        });
        let first = normalize(ProviderKind::CoinGecko, &raw);
        let second = normalize(ProviderKind::CoinGecko, &raw);
        assert_eq!(first, second);
    }
}
