// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use siri::FeedKind;

use crate::error::ErrorKind;

/// Configuration for the ukur notifier service.
#[derive(Debug, Clone, clap::Parser)]
pub struct UkurConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "UKUR_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9700, env = "UKUR_PORT")]
    pub port: u16,

    /// Base polling cadence in milliseconds.
    #[arg(long, default_value_t = 60_000, env = "UKUR_POLLING_INTERVAL_MS")]
    pub polling_interval_ms: u64,

    /// Ingest the Estimated Timetable feed.
    #[arg(long, default_value_t = true, env = "UKUR_ET_ENABLED", action = clap::ArgAction::Set)]
    pub et_enabled: bool,

    /// Ingest the Situation Exchange feed.
    #[arg(long, default_value_t = true, env = "UKUR_SX_ENABLED", action = clap::ArgAction::Set)]
    pub sx_enabled: bool,

    /// Push subscriptions instead of polling.
    #[arg(long, default_value_t = false, env = "UKUR_USE_SUBSCRIPTION", action = clap::ArgAction::Set)]
    pub use_subscription: bool,

    /// Anshar ET polling URL (polling mode).
    #[arg(long, default_value = "", env = "UKUR_POLLING_ET_URL")]
    pub polling_et_url: String,

    /// Anshar SX polling URL (polling mode).
    #[arg(long, default_value = "", env = "UKUR_POLLING_SX_URL")]
    pub polling_sx_url: String,

    /// Anshar subscription URL (subscription mode).
    #[arg(long, default_value = "", env = "UKUR_SUBSCRIPTION_URL")]
    pub subscription_url: String,

    /// Externally reachable base URL of this service, used in callback addresses.
    #[arg(long, default_value = "http://localhost:9700", env = "UKUR_OWN_BASE_URL")]
    pub own_base_url: String,

    /// Refresh the quay to stop place mapping from Tiamat.
    #[arg(long, default_value_t = false, env = "UKUR_TIAMAT_ENABLED", action = clap::ArgAction::Set)]
    pub tiamat_enabled: bool,

    /// Tiamat mapping URL.
    #[arg(long, default_value = "", env = "UKUR_TIAMAT_URL")]
    pub tiamat_url: String,

    /// Tiamat refresh cadence in milliseconds.
    #[arg(long, default_value_t = 3_600_000, env = "UKUR_TIAMAT_INTERVAL_MS")]
    pub tiamat_interval_ms: u64,

    /// Only elements attributed to this operator are processed.
    #[arg(long, default_value = "NSB", env = "UKUR_OPERATOR")]
    pub operator: String,

    /// Archive every inbound SIRI document to disk.
    #[arg(long, default_value_t = false, env = "UKUR_STORE_MESSAGES_TO_FILE", action = clap::ArgAction::Set)]
    pub store_messages_to_file: bool,

    /// Directory the message archive writes into.
    #[arg(long, default_value = "ukur-messages", env = "UKUR_ARCHIVE_DIR")]
    pub archive_dir: std::path::PathBuf,
}

impl UkurConfig {
    pub fn polling_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.polling_interval_ms)
    }

    pub fn tiamat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tiamat_interval_ms)
    }

    pub fn kind_enabled(&self, kind: FeedKind) -> bool {
        match kind {
            FeedKind::Et => self.et_enabled,
            FeedKind::Sx => self.sx_enabled,
        }
    }

    /// Kinds this deployment ingests, in a fixed order.
    pub fn enabled_kinds(&self) -> Vec<FeedKind> {
        [FeedKind::Et, FeedKind::Sx].into_iter().filter(|k| self.kind_enabled(*k)).collect()
    }

    /// Polling URL for a kind, carrying the requestor id so the upstream can
    /// de-duplicate pages per consumer.
    pub fn polling_url(&self, kind: FeedKind, requestor_id: &str) -> String {
        let base = match kind {
            FeedKind::Et => &self.polling_et_url,
            FeedKind::Sx => &self.polling_sx_url,
        };
        format!("{base}?requestorId={requestor_id}")
    }

    /// Callback address the aggregator pushes to.
    pub fn consumer_address(&self, kind: FeedKind, requestor_id: &str) -> String {
        format!("{}/siriMessages/{}/{}", self.own_base_url.trim_end_matches('/'), requestor_id, kind)
    }

    /// Configuration combinations that leave the selected mode with nothing
    /// to do. The caller warns and skips trigger registration.
    pub fn validate(&self) -> Option<ErrorKind> {
        if self.use_subscription && self.enabled_kinds().is_empty() {
            return Some(ErrorKind::ConfigMisuse);
        }
        None
    }
}
