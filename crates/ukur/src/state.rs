// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use siri::FeedKind;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::archive::MessageArchive;
use crate::cluster::SharedMap;
use crate::config::UkurConfig;
use crate::journeys::LiveJourneys;
use crate::metrics::Metrics;
use crate::notify::{LogNotifier, LogSxHandler, Notifier, SxHandler};
use crate::subscription::{InMemorySubscriptionIndex, SubscriptionIndex};
use crate::tiamat::QuayRegistry;

/// Shared-map key carrying the cluster-wide requestor id.
pub const REQUESTOR_ID_KEY: &str = "AnsharRequestorId";

/// Shared-map key carrying the last-received instant for a feed kind.
pub fn last_received_key(kind: FeedKind) -> String {
    format!("AnsharLastReceived-{kind}")
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

const QUEUE_CAPACITY: usize = 1024;

/// Shared service state.
pub struct UkurState {
    pub config: UkurConfig,
    pub shutdown: CancellationToken,
    pub shared_map: Arc<dyn SharedMap>,
    /// Cluster-wide stable identifier; first replica to start wins the write.
    pub requestor_id: String,
    pub started_at_ms: u64,
    pub metrics: Arc<Metrics>,
    pub quays: Arc<QuayRegistry>,
    pub live_journeys: Arc<LiveJourneys>,
    pub subscriptions: Arc<dyn SubscriptionIndex>,
    pub notifier: Arc<dyn Notifier>,
    pub sx_handler: Arc<dyn SxHandler>,
    pub archive: Option<MessageArchive>,
    pub http: reqwest::Client,
    /// Message qualifier source, unique per outbound subscription request.
    pub message_counter: AtomicU64,
    et_tx: mpsc::Sender<String>,
    sx_tx: mpsc::Sender<String>,
}

/// Consumer ends of the per-kind feed queues, handed to `spawn_consumers`.
pub struct FeedReceivers {
    pub et: mpsc::Receiver<String>,
    pub sx: mpsc::Receiver<String>,
}

impl UkurState {
    pub fn build(
        config: UkurConfig,
        shared_map: Arc<dyn SharedMap>,
        shutdown: CancellationToken,
        subscriptions: Arc<dyn SubscriptionIndex>,
        notifier: Arc<dyn Notifier>,
        sx_handler: Arc<dyn SxHandler>,
    ) -> (Arc<Self>, FeedReceivers) {
        let requestor_id =
            shared_map.put_if_absent(REQUESTOR_ID_KEY, uuid::Uuid::new_v4().to_string());
        let archive = config
            .store_messages_to_file
            .then(|| MessageArchive::new(config.archive_dir.clone()));
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        let (et_tx, et_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (sx_tx, sx_rx) = mpsc::channel(QUEUE_CAPACITY);

        let state = Arc::new(Self {
            config,
            shutdown,
            shared_map,
            requestor_id,
            started_at_ms: epoch_ms(),
            metrics: Arc::new(Metrics::default()),
            quays: Arc::new(QuayRegistry::default()),
            live_journeys: Arc::new(LiveJourneys::default()),
            subscriptions,
            notifier,
            sx_handler,
            archive,
            http,
            message_counter: AtomicU64::new(0),
            et_tx,
            sx_tx,
        });
        (state, FeedReceivers { et: et_rx, sx: sx_rx })
    }

    /// `build` with the in-process collaborator stand-ins.
    pub fn with_defaults(
        config: UkurConfig,
        shared_map: Arc<dyn SharedMap>,
        shutdown: CancellationToken,
    ) -> (Arc<Self>, FeedReceivers) {
        Self::build(
            config,
            shared_map,
            shutdown,
            Arc::new(InMemorySubscriptionIndex::default()),
            Arc::new(LogNotifier),
            Arc::new(LogSxHandler),
        )
    }

    /// Hand one raw element to the kind's queue.
    pub async fn enqueue(&self, kind: FeedKind, fragment: String) {
        let tx = match kind {
            FeedKind::Et => &self.et_tx,
            FeedKind::Sx => &self.sx_tx,
        };
        if tx.send(fragment).await.is_err() {
            tracing::debug!(kind = %kind, "feed queue closed, dropping element");
        }
    }

    /// Record that a subscribed payload for `kind` just arrived.
    pub fn touch_last_received(&self, kind: FeedKind) {
        self.shared_map.set(&last_received_key(kind), epoch_ms().to_string());
    }

    /// Epoch millis of the last subscribed payload for `kind`, if any.
    pub fn last_received(&self, kind: FeedKind) -> Option<u64> {
        self.shared_map.get(&last_received_key(kind)).and_then(|v| v.parse().ok())
    }
}
