//! Per-metric state container
//!
//! Owns every metric's `ValueState`/`SeriesState` slot and runs the fetch
//! lifecycle `Uninitialized -> Loading -> (Ready | Failed)` against the
//! metric's adapter. Failures are converted into the owning slice's error
//! flag at this boundary and never propagate to sibling metrics or the
//! caller.
//!
//! History commits are guarded by a per-metric request-sequence token: the
//! token is bumped when a fetch is issued and compared again under the slot
//! write lock before committing, so only the latest-initiated request for a
//! metric can land. Superseded completions are discarded; in-flight
//! requests are never aborted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::RwLock;

use crate::format::{self, Locale};
use crate::normalize;
use crate::provider::MetricProvider;
use crate::telemetry::{ProviderTelemetry, TelemetryCollector};
use crate::types::{
    MetricDescriptor, MetricId, MetricSnapshot, RangeIndex, SeriesState, ValueState,
};

/// State and fetch plumbing for one metric
struct MetricSlot {
    descriptor: MetricDescriptor,
    provider: Arc<dyn MetricProvider>,
    value: RwLock<ValueState>,
    series: RwLock<SeriesState>,
    active_range: RwLock<RangeIndex>,
    /// Bumped on every history fetch; completions carrying an older token
    /// are discarded at commit time
    series_seq: AtomicU64,
    telemetry: TelemetryCollector,
}

/// Exclusive owner of all metric state
pub struct MetricStore {
    slots: HashMap<MetricId, Arc<MetricSlot>>,
    locale: Locale,
}

impl MetricStore {
    /// Creates a store over descriptor/provider pairs
    pub fn new(
        entries: Vec<(MetricDescriptor, Arc<dyn MetricProvider>)>,
        locale: Locale,
    ) -> Self {
        let slots = entries
            .into_iter()
            .map(|(descriptor, provider)| {
                let telemetry = TelemetryCollector::new(provider.provider_name());
                let slot = MetricSlot {
                    descriptor,
                    provider,
                    value: RwLock::new(ValueState::default()),
                    series: RwLock::new(SeriesState::default()),
                    active_range: RwLock::new(RangeIndex::Short),
                    series_seq: AtomicU64::new(0),
                    telemetry,
                };
                (slot.descriptor.id, Arc::new(slot))
            })
            .collect();

        Self { slots, locale }
    }

    /// Fetches every metric's current value and active-range history,
    /// concurrently and independently. One metric failing never blocks or
    /// fails another; this call itself cannot fail.
    pub async fn initialize(&self) {
        let jobs = self.slots.values().map(|slot| {
            let slot = slot.clone();
            let locale = self.locale.clone();
            async move {
                let range = *slot.active_range.read().await;
                futures::join!(
                    Self::refresh_value(&slot, &locale),
                    Self::refresh_series(&slot, range),
                );
            }
        });
        join_all(jobs).await;
    }

    /// Re-fetches only the history of one metric for the newly selected
    /// range. The current-value scalar is left alone. Prior points stay
    /// visible while the fetch is in flight; if two switches race, the
    /// most recently initiated one wins regardless of completion order.
    pub async fn switch_range(&self, id: MetricId, range: RangeIndex) {
        let Some(slot) = self.slots.get(&id) else {
            tracing::warn!(metric = id.key(), "switch_range on unknown metric");
            return;
        };
        *slot.active_range.write().await = range;
        Self::refresh_series(slot, range).await;
    }

    /// Cloned state snapshot for one metric
    pub async fn snapshot(&self, id: MetricId) -> Option<MetricSnapshot> {
        let slot = self.slots.get(&id)?;
        Some(MetricSnapshot {
            value: slot.value.read().await.clone(),
            series: slot.series.read().await.clone(),
            active_range: *slot.active_range.read().await,
        })
    }

    /// Snapshots for every tracked metric
    pub async fn snapshots(&self) -> HashMap<MetricId, MetricSnapshot> {
        let mut out = HashMap::with_capacity(self.slots.len());
        for (id, slot) in &self.slots {
            out.insert(
                *id,
                MetricSnapshot {
                    value: slot.value.read().await.clone(),
                    series: slot.series.read().await.clone(),
                    active_range: *slot.active_range.read().await,
                },
            );
        }
        out
    }

    /// Static display metadata for one metric
    pub fn descriptor(&self, id: MetricId) -> Option<&MetricDescriptor> {
        self.slots.get(&id).map(|slot| &slot.descriptor)
    }

    /// Fetch telemetry for one metric's provider
    pub async fn telemetry(&self, id: MetricId) -> Option<ProviderTelemetry> {
        match self.slots.get(&id) {
            Some(slot) => Some(slot.telemetry.read().await),
            None => None,
        }
    }

    async fn refresh_value(slot: &Arc<MetricSlot>, locale: &Locale) {
        let started = Instant::now();
        let result = slot.provider.fetch_current().await;
        slot.telemetry
            .record_request(started.elapsed(), result.is_ok())
            .await;

        let mut value = slot.value.write().await;
        match result {
            Ok(n) => {
                let formatted = format::format_value(slot.descriptor.value_format, n, locale);
                tracing::debug!(
                    metric = slot.descriptor.id.key(),
                    value = %formatted,
                    "committing current value"
                );
                *value = ValueState {
                    value: Some(formatted),
                    has_error: false,
                };
            }
            Err(e) => {
                tracing::warn!(
                    metric = slot.descriptor.id.key(),
                    error = %e,
                    "current value fetch failed"
                );
                *value = ValueState {
                    value: None,
                    has_error: true,
                };
            }
        }
    }

    async fn refresh_series(slot: &Arc<MetricSlot>, range: RangeIndex) {
        let token = slot.descriptor.range_token(range).to_string();
        let seq = slot.series_seq.fetch_add(1, Ordering::AcqRel) + 1;
        {
            // stale-while-revalidate: keep prior points visible while loading
            let mut series = slot.series.write().await;
            series.loading = true;
            series.has_error = false;
        }
        tracing::debug!(
            metric = slot.descriptor.id.key(),
            token = %token,
            seq,
            "fetching history"
        );

        let started = Instant::now();
        let result = slot.provider.fetch_history(&token).await;
        slot.telemetry
            .record_request(started.elapsed(), result.is_ok())
            .await;

        let mut series = slot.series.write().await;
        if slot.series_seq.load(Ordering::Acquire) != seq {
            tracing::debug!(
                metric = slot.descriptor.id.key(),
                seq,
                "discarding superseded history result"
            );
            return;
        }
        match result {
            Ok(raw) => {
                let points = normalize::normalize(slot.provider.kind(), &raw);
                tracing::debug!(
                    metric = slot.descriptor.id.key(),
                    points = points.len(),
                    "committing history"
                );
                *series = SeriesState {
                    points,
                    has_error: false,
                    loading: false,
                };
            }
            Err(e) => {
                tracing::warn!(
                    metric = slot.descriptor.id.key(),
                    error = %e,
                    "history fetch failed"
                );
                // a failed slice must not keep showing points for a range
                // it no longer corresponds to
                *series = SeriesState {
                    points: Vec::new(),
                    has_error: true,
                    loading: false,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::types::ValueFormat;
    use serde_json::json;
    use std::time::Duration;

    fn descriptor(id: MetricId, value_format: ValueFormat) -> MetricDescriptor {
        MetricDescriptor {
            id,
            title_key: "title",
            description_key: "description",
            api_provider_name: "Mock",
            api_url: "https://example.com",
            range_tokens: ["short".to_string(), "long".to_string()],
            value_format,
        }
    }

    fn store_with(
        entries: Vec<(MetricId, ValueFormat, Arc<MockProvider>)>,
    ) -> MetricStore {
        let entries = entries
            .into_iter()
            .map(|(id, value_format, provider)| {
                (
                    descriptor(id, value_format),
                    provider as Arc<dyn MetricProvider>,
                )
            })
            .collect();
        MetricStore::new(entries, Locale::en_us())
    }

    fn ten_ascending_points() -> serde_json::Value {
        let points: Vec<_> = (0..10)
            .map(|i| json!([1_600_000_000 + i * 86_400, 300.0 + i as f64]))
            .collect();
        json!({ "points": points })
    }

    #[tokio::test]
    async fn initialize_resolves_value_and_series() {
        let provider = Arc::new(MockProvider::new("price"));
        provider.set_current(1330.0);
        provider.set_history(ten_ascending_points());

        let store = store_with(vec![(MetricId::Price, ValueFormat::Currency, provider)]);
        store.initialize().await;

        let snap = store.snapshot(MetricId::Price).await.unwrap();
        assert_eq!(snap.value.value.as_deref(), Some("$1,330"));
        assert!(!snap.value.has_error);
        assert!(snap.series.is_ready());
        assert_eq!(snap.series.points.len(), 10);
        assert!(snap
            .series
            .points
            .windows(2)
            .all(|w| w[0].value <= w[1].value));
    }

    #[tokio::test]
    async fn one_failing_metric_leaves_siblings_untouched() {
        let healthy = Arc::new(MockProvider::new("price"));
        healthy.set_current(1330.0);
        healthy.set_history(ten_ascending_points());

        let broken = Arc::new(MockProvider::new("defipulse"));
        broken.fail_current("api down");
        broken.fail_history("api down");

        let store = store_with(vec![
            (MetricId::Price, ValueFormat::Currency, healthy),
            (MetricId::ValueLocked, ValueFormat::CompactCurrency, broken),
        ]);
        store.initialize().await;

        let good = store.snapshot(MetricId::Price).await.unwrap();
        assert_eq!(good.value.value.as_deref(), Some("$1,330"));
        assert!(good.series.is_ready());

        let bad = store.snapshot(MetricId::ValueLocked).await.unwrap();
        assert!(bad.value.has_error);
        assert!(bad.value.value.is_none());
        assert!(bad.series.has_error);
        assert!(bad.series.points.is_empty());
    }

    #[tokio::test]
    async fn settled_state_is_value_or_error_never_both() {
        let ok = Arc::new(MockProvider::new("ok"));
        ok.set_current(8040.0);
        ok.set_history(json!({"points": []}));

        let failing = Arc::new(MockProvider::new("failing"));
        failing.fail_current("boom");
        failing.fail_history("boom");

        let store = store_with(vec![
            (MetricId::NodeCount, ValueFormat::Count, ok),
            (MetricId::TxCount, ValueFormat::CompactCount, failing),
        ]);
        store.initialize().await;

        for snap in store.snapshots().await.values() {
            assert!(snap.value.value.is_some() ^ snap.value.has_error);
        }
    }

    #[tokio::test]
    async fn empty_history_resolves_ready_not_failed() {
        let provider = Arc::new(MockProvider::new("txs"));
        provider.set_current(1_234_567.0);
        provider.set_history(json!({"points": []}));

        let store = store_with(vec![(MetricId::TxCount, ValueFormat::CompactCount, provider)]);
        store.initialize().await;

        let snap = store.snapshot(MetricId::TxCount).await.unwrap();
        assert!(snap.series.is_ready());
        assert!(snap.series.points.is_empty());
        assert!(!snap.series.has_error);
    }

    #[tokio::test]
    async fn latest_initiated_range_switch_wins_the_race() {
        let provider = Arc::new(MockProvider::new("price"));
        provider.set_current(1330.0);
        provider.set_history(ten_ascending_points());

        let store = store_with(vec![(MetricId::Price, ValueFormat::Currency, provider.clone())]);
        store.initialize().await;

        // first switch resolves slowly, second quickly: the second must win
        provider.push_history(
            50,
            Ok(json!({"points": [[1_600_000_000, 111.0]]})),
        );
        provider.push_history(
            5,
            Ok(json!({"points": [[1_600_000_000, 222.0], [1_600_086_400, 223.0]]})),
        );

        futures::join!(
            store.switch_range(MetricId::Price, RangeIndex::Short),
            store.switch_range(MetricId::Price, RangeIndex::Long),
        );

        let snap = store.snapshot(MetricId::Price).await.unwrap();
        assert_eq!(snap.active_range, RangeIndex::Long);
        assert!(snap.series.is_ready());
        assert_eq!(snap.series.points.len(), 2);
        assert_eq!(snap.series.points[0].value, 222.0);
        assert_eq!(provider.seen_tokens(), vec!["short", "short", "long"]);
    }

    #[tokio::test]
    async fn prior_points_stay_visible_while_a_switch_is_in_flight() {
        let provider = Arc::new(MockProvider::new("price"));
        provider.set_current(1330.0);
        provider.set_history(ten_ascending_points());

        let store = Arc::new(store_with(vec![(
            MetricId::Price,
            ValueFormat::Currency,
            provider.clone(),
        )]));
        store.initialize().await;

        provider.push_history(40, Ok(json!({"points": [[1_600_000_000, 999.0]]})));

        let switching = {
            let store = store.clone();
            tokio::spawn(async move {
                store.switch_range(MetricId::Price, RangeIndex::Long).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        let mid = store.snapshot(MetricId::Price).await.unwrap();
        assert!(mid.series.loading);
        assert!(!mid.series.has_error);
        assert_eq!(mid.series.points.len(), 10);

        switching.await.unwrap();
        let done = store.snapshot(MetricId::Price).await.unwrap();
        assert!(done.series.is_ready());
        assert_eq!(done.series.points.len(), 1);
        assert_eq!(done.series.points[0].value, 999.0);
    }

    #[tokio::test]
    async fn failed_switch_discards_stale_points() {
        let provider = Arc::new(MockProvider::new("nodes"));
        provider.set_current(8040.0);
        provider.set_history(ten_ascending_points());

        let store = store_with(vec![(MetricId::NodeCount, ValueFormat::Count, provider.clone())]);
        store.initialize().await;

        provider.push_history(0, Err("window not available"));
        store.switch_range(MetricId::NodeCount, RangeIndex::Long).await;

        let snap = store.snapshot(MetricId::NodeCount).await.unwrap();
        assert!(snap.series.has_error);
        assert!(snap.series.points.is_empty());
        assert!(!snap.series.loading);
        // the scalar is untouched by a range switch
        assert_eq!(snap.value.value.as_deref(), Some("8,040"));
        assert_eq!(provider.current_calls(), 1);
    }

    #[tokio::test]
    async fn reselecting_a_range_recovers_from_failure() {
        let provider = Arc::new(MockProvider::new("price"));
        provider.set_current(1330.0);
        provider.push_history(0, Err("flaky"));
        provider.set_history(ten_ascending_points());

        let store = store_with(vec![(MetricId::Price, ValueFormat::Currency, provider.clone())]);
        store.initialize().await;

        let failed = store.snapshot(MetricId::Price).await.unwrap();
        assert!(failed.series.has_error);

        store.switch_range(MetricId::Price, RangeIndex::Short).await;
        let recovered = store.snapshot(MetricId::Price).await.unwrap();
        assert!(recovered.series.is_ready());
        assert_eq!(recovered.series.points.len(), 10);
    }

    #[tokio::test]
    async fn telemetry_tracks_fetch_outcomes() {
        let provider = Arc::new(MockProvider::new("defipulse"));
        provider.fail_current("api down");
        provider.set_history(ten_ascending_points());

        let store = store_with(vec![(
            MetricId::ValueLocked,
            ValueFormat::CompactCurrency,
            provider,
        )]);
        store.initialize().await;

        let telemetry = store.telemetry(MetricId::ValueLocked).await.unwrap();
        assert_eq!(telemetry.total_requests, 2);
        assert_eq!(telemetry.failed_requests, 1);
        assert_eq!(telemetry.success_rate, 0.5);
    }
}
