//! Buffers normalized records and delivers them in batches.
//!
//! Two triggers cause delivery: the queue reaching the configured threshold,
//! and a periodic task owned by the dispatcher. Delivery is single-flight and
//! at-least-once; a failed batch stays queued, in order, ahead of anything
//! submitted in the meantime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::entry::Entry;

struct Queue {
    entries: Vec<Entry>,
    retry_at: Option<Instant>,
}

struct Shared {
    http: reqwest::Client,
    config: Config,
    queue: Mutex<Queue>,
    in_flight: AtomicBool,
}

/// Clears the single-flight flag on every exit path out of a flush.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Batching dispatcher. Owns the pending queue and the periodic flush task;
/// dropping it stops the task without a final delivery, [`Dispatcher::shutdown`]
/// delivers what is left first.
pub struct Dispatcher {
    shared: Arc<Shared>,
    ticker: JoinHandle<()>,
}

impl Dispatcher {
    /// Validates the config and starts the periodic flush task. Must be
    /// called from within a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            http: reqwest::Client::new(),
            config,
            queue: Mutex::new(Queue {
                entries: Vec::new(),
                retry_at: None,
            }),
            in_flight: AtomicBool::new(false),
        });

        let ticker = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move {
                loop {
                    shared.flush().await;
                    tokio::time::sleep(shared.config.flush_interval()).await;
                }
            }
        });

        Ok(Self { shared, ticker })
    }

    /// Queue one record. Delivery happens immediately once the queue reaches
    /// the configured threshold; failures never surface here.
    pub async fn submit(&self, entry: Entry) {
        let threshold_reached = {
            let mut queue = self.shared.queue.lock().await;
            queue.entries.push(entry);

            // The cap is not enforced while a batch is in flight so the
            // snapshot prefix stays intact for the pending removal.
            if !self.shared.in_flight.load(Ordering::Acquire) {
                let overflow = queue
                    .entries
                    .len()
                    .saturating_sub(self.shared.config.max_pending);
                if overflow > 0 {
                    queue.entries.drain(..overflow);
                    warn!(
                        "Buffer cap of {} reached, dropped {} oldest record(s)",
                        self.shared.config.max_pending, overflow
                    );
                }
            }

            queue.entries.len() >= self.shared.config.threshold
        };

        if threshold_reached {
            self.shared.flush().await;
        }
    }

    /// Attempt a delivery right now. No-op when the queue is empty, a flush
    /// is already in flight, or a retry backoff is pending.
    pub async fn flush(&self) {
        self.shared.flush().await;
    }

    /// Number of records currently buffered.
    pub async fn pending(&self) -> usize {
        self.shared.queue.lock().await.entries.len()
    }

    /// Stop the periodic task and deliver anything still buffered, ignoring
    /// any pending retry backoff.
    pub async fn shutdown(&self) {
        self.ticker.abort();
        self.shared.queue.lock().await.retry_at = None;
        self.shared.flush().await;
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

impl Shared {
    async fn flush(&self) {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return;
        }
        let _guard = FlightGuard(&self.in_flight);

        let batch = {
            let queue = self.queue.lock().await;
            if queue.entries.is_empty() {
                return;
            }
            if let Some(retry_at) = queue.retry_at {
                if Instant::now() < retry_at {
                    debug!("Delivery backoff pending, skipping flush");
                    return;
                }
            }
            queue.entries.clone()
        };

        let count = batch.len();
        let body = render_batch(&batch, &self.config);
        info!(
            "Dispatching {} {}",
            count,
            if count == 1 { "entry" } else { "entries" }
        );

        let result = self.http.post(&self.config.endpoint).json(&body).send().await;

        let mut queue = self.queue.lock().await;
        match result {
            Ok(response) if response.status().is_success() => {
                queue.entries.drain(..count);
                queue.retry_at = None;
            }
            Ok(response) => {
                error!(
                    "Analytics endpoint returned response with status code {}",
                    response.status()
                );
                queue.retry_at = self.config.retry_backoff().map(|backoff| Instant::now() + backoff);
            }
            Err(err) => {
                error!("Error communicating with analytics endpoint: {err:#}");
                queue.retry_at = self.config.retry_backoff().map(|backoff| Instant::now() + backoff);
            }
        }
    }
}

/// Serialize a batch, applying the configured field filtering.
fn render_batch(entries: &[Entry], config: &Config) -> Vec<serde_json::Value> {
    entries
        .iter()
        .map(|entry| {
            let mut value = serde_json::to_value(entry).unwrap_or_default();
            if let Some(object) = value.as_object_mut() {
                if let Some(include) = &config.include {
                    object.retain(|key, _| include.iter().any(|keep| keep == key));
                }
                if let Some(exclude) = &config.exclude {
                    object.retain(|key, _| !exclude.iter().any(|drop| drop == key));
                }
            }
            value
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use crate::entry::BotIdentity;
    use crate::normalizer::normalize;
    use crate::update::Update;

    struct Collector {
        batches: StdMutex<Vec<Vec<serde_json::Value>>>,
        fail: AtomicBool,
        delay_ms: AtomicU64,
    }

    async fn ingest(
        State(collector): State<Arc<Collector>>,
        Json(batch): Json<Vec<serde_json::Value>>,
    ) -> StatusCode {
        let delay = collector.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if collector.fail.load(Ordering::SeqCst) {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
        collector.batches.lock().unwrap().push(batch);
        StatusCode::OK
    }

    async fn spawn_collector() -> (Arc<Collector>, String) {
        let collector = Arc::new(Collector {
            batches: StdMutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
        });
        let app = Router::new()
            .route("/ingest", post(ingest))
            .with_state(Arc::clone(&collector));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (collector, format!("http://{addr}/ingest"))
    }

    fn sample_entry(seq: i64) -> Entry {
        let update: Update = serde_json::from_value(json!({
            "update_id": seq,
            "message": {
                "message_id": seq,
                "from": {"id": seq, "is_bot": false, "first_name": "Ada"},
                "chat": {"id": seq, "type": "private", "first_name": "Ada"},
                "date": 1_700_000_000,
                "text": format!("msg {seq}")
            }
        }))
        .unwrap();
        let bot = BotIdentity {
            id: 7,
            first_name: "StatBot".to_string(),
            last_name: None,
            username: "statbot".to_string(),
        };
        normalize(&update, &bot).unwrap()
    }

    fn test_config(endpoint: &str, threshold: usize) -> Config {
        let mut config = Config::new(endpoint);
        config.threshold = threshold;
        // Keep the periodic loop out of the way unless a test wants it.
        config.flush_interval_secs = 3600;
        config
    }

    fn delivered_froms(batch: &[serde_json::Value]) -> Vec<i64> {
        batch.iter().map(|e| e["from"].as_i64().unwrap()).collect()
    }

    #[tokio::test]
    async fn threshold_boundary_triggers_exactly_one_delivery() {
        let (collector, endpoint) = spawn_collector().await;
        let dispatcher = Dispatcher::new(test_config(&endpoint, 3)).unwrap();

        dispatcher.submit(sample_entry(1)).await;
        dispatcher.submit(sample_entry(2)).await;
        assert!(collector.batches.lock().unwrap().is_empty());
        assert_eq!(dispatcher.pending().await, 2);

        dispatcher.submit(sample_entry(3)).await;
        let batches = collector.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(delivered_froms(&batches[0]), [1, 2, 3]);
        drop(batches);
        assert_eq!(dispatcher.pending().await, 0);
    }

    #[tokio::test]
    async fn flushing_an_empty_queue_sends_nothing() {
        let (collector, endpoint) = spawn_collector().await;
        let dispatcher = Dispatcher::new(test_config(&endpoint, 10)).unwrap();

        dispatcher.flush().await;
        assert!(collector.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_keeps_the_queue_for_retry() {
        let (collector, endpoint) = spawn_collector().await;
        collector.fail.store(true, Ordering::SeqCst);
        let dispatcher = Dispatcher::new(test_config(&endpoint, 3)).unwrap();

        for seq in 1..=3 {
            dispatcher.submit(sample_entry(seq)).await;
        }
        assert_eq!(dispatcher.pending().await, 3);
        assert!(collector.batches.lock().unwrap().is_empty());

        // A later submission queues behind the retried batch.
        dispatcher.submit(sample_entry(4)).await;
        assert_eq!(dispatcher.pending().await, 4);

        collector.fail.store(false, Ordering::SeqCst);
        dispatcher.flush().await;

        let batches = collector.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(delivered_froms(&batches[0]), [1, 2, 3, 4]);
        drop(batches);
        assert_eq!(dispatcher.pending().await, 0);
    }

    #[tokio::test]
    async fn concurrent_flush_is_a_single_delivery() {
        let (collector, endpoint) = spawn_collector().await;
        collector.delay_ms.store(200, Ordering::SeqCst);
        let dispatcher = Dispatcher::new(test_config(&endpoint, 100)).unwrap();

        dispatcher.submit(sample_entry(1)).await;
        tokio::join!(dispatcher.flush(), dispatcher.flush());

        assert_eq!(collector.batches.lock().unwrap().len(), 1);
        assert_eq!(dispatcher.pending().await, 0);
    }

    #[tokio::test]
    async fn entries_submitted_during_a_delivery_stay_queued() {
        let (collector, endpoint) = spawn_collector().await;
        collector.delay_ms.store(200, Ordering::SeqCst);
        let dispatcher = Arc::new(Dispatcher::new(test_config(&endpoint, 100)).unwrap());

        dispatcher.submit(sample_entry(1)).await;
        dispatcher.submit(sample_entry(2)).await;

        let background = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.flush().await })
        };
        // Let the delivery reach the wire, then submit more.
        tokio::time::sleep(Duration::from_millis(50)).await;
        dispatcher.submit(sample_entry(3)).await;
        background.await.unwrap();

        let batches = collector.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(delivered_froms(&batches[0]), [1, 2]);
        drop(batches);
        assert_eq!(dispatcher.pending().await, 1);
    }

    #[tokio::test]
    async fn periodic_task_delivers_below_threshold_entries() {
        let (collector, endpoint) = spawn_collector().await;
        let mut config = test_config(&endpoint, 100);
        config.flush_interval_secs = 1;
        let dispatcher = Dispatcher::new(config).unwrap();

        dispatcher.submit(sample_entry(1)).await;
        dispatcher.submit(sample_entry(2)).await;
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let batches = collector.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(delivered_froms(&batches[0]), [1, 2]);
    }

    #[tokio::test]
    async fn backoff_suppresses_retries_until_shutdown_overrides_it() {
        let (collector, endpoint) = spawn_collector().await;
        collector.fail.store(true, Ordering::SeqCst);
        let mut config = test_config(&endpoint, 2);
        config.retry_backoff_secs = 3600;
        let dispatcher = Dispatcher::new(config).unwrap();

        dispatcher.submit(sample_entry(1)).await;
        dispatcher.submit(sample_entry(2)).await;
        assert_eq!(dispatcher.pending().await, 2);

        collector.fail.store(false, Ordering::SeqCst);
        dispatcher.flush().await;
        assert!(collector.batches.lock().unwrap().is_empty());
        assert_eq!(dispatcher.pending().await, 2);

        dispatcher.shutdown().await;
        let batches = collector.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(delivered_froms(&batches[0]), [1, 2]);
        drop(batches);
        assert_eq!(dispatcher.pending().await, 0);
    }

    #[tokio::test]
    async fn buffer_cap_drops_the_oldest_records() {
        let (collector, endpoint) = spawn_collector().await;
        collector.fail.store(true, Ordering::SeqCst);
        let mut config = test_config(&endpoint, 3);
        config.max_pending = 3;
        let dispatcher = Dispatcher::new(config).unwrap();

        for seq in 1..=5 {
            dispatcher.submit(sample_entry(seq)).await;
        }
        assert_eq!(dispatcher.pending().await, 3);

        collector.fail.store(false, Ordering::SeqCst);
        dispatcher.flush().await;
        let batches = collector.batches.lock().unwrap();
        assert_eq!(delivered_froms(&batches[0]), [3, 4, 5]);
    }

    #[tokio::test]
    async fn exclude_filter_removes_fields_from_the_wire() {
        let (collector, endpoint) = spawn_collector().await;
        let mut config = test_config(&endpoint, 1);
        config.exclude = Some(vec!["payload".to_string(), "message_text".to_string()]);
        let dispatcher = Dispatcher::new(config).unwrap();

        dispatcher.submit(sample_entry(1)).await;

        let batches = collector.batches.lock().unwrap();
        let record = batches[0][0].as_object().unwrap();
        assert!(!record.contains_key("payload"));
        assert!(!record.contains_key("message_text"));
        assert_eq!(record["from"], 1);
        assert_eq!(record.len(), Entry::FIELD_NAMES.len() - 2);
    }

    #[tokio::test]
    async fn include_filter_keeps_only_the_named_fields() {
        let (collector, endpoint) = spawn_collector().await;
        let mut config = test_config(&endpoint, 1);
        config.include = Some(vec!["type".to_string(), "from".to_string(), "to".to_string()]);
        let dispatcher = Dispatcher::new(config).unwrap();

        dispatcher.submit(sample_entry(9)).await;

        let batches = collector.batches.lock().unwrap();
        let record = batches[0][0].as_object().unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record["from"], 9);
        assert_eq!(record["to"], 7);
        assert_eq!(record["type"], 1);
    }

    #[tokio::test]
    async fn invalid_config_fails_construction() {
        let mut config = Config::new("http://localhost:1/ingest");
        config.include = Some(vec!["bogus".to_string()]);
        assert!(Dispatcher::new(config).is_err());
    }
}
