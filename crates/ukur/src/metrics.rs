// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process counters, snapshotted on the health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::ErrorKind;

#[derive(Debug, Default)]
pub struct Metrics {
    pub polls: AtomicU64,
    pub renewals: AtomicU64,
    pub et_messages: AtomicU64,
    pub sx_messages: AtomicU64,
    pub journeys_matched: AtomicU64,
    upstream_unavailable: AtomicU64,
    malformed_payload: AtomicU64,
    rejected_callback: AtomicU64,
    config_misuse: AtomicU64,
    transient_leadership: AtomicU64,
    notify_failure: AtomicU64,
}

impl Metrics {
    pub fn record_error(&self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::UpstreamUnavailable => &self.upstream_unavailable,
            ErrorKind::MalformedPayload => &self.malformed_payload,
            ErrorKind::RejectedCallback => &self.rejected_callback,
            ErrorKind::ConfigMisuse => &self.config_misuse,
            ErrorKind::TransientLeadership => &self.transient_leadership,
            ErrorKind::NotifyFailure => &self.notify_failure,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error_count(&self, kind: ErrorKind) -> u64 {
        let counter = match kind {
            ErrorKind::UpstreamUnavailable => &self.upstream_unavailable,
            ErrorKind::MalformedPayload => &self.malformed_payload,
            ErrorKind::RejectedCallback => &self.rejected_callback,
            ErrorKind::ConfigMisuse => &self.config_misuse,
            ErrorKind::TransientLeadership => &self.transient_leadership,
            ErrorKind::NotifyFailure => &self.notify_failure,
        };
        counter.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            polls: self.polls.load(Ordering::Relaxed),
            renewals: self.renewals.load(Ordering::Relaxed),
            et_messages: self.et_messages.load(Ordering::Relaxed),
            sx_messages: self.sx_messages.load(Ordering::Relaxed),
            journeys_matched: self.journeys_matched.load(Ordering::Relaxed),
            upstream_unavailable: self.upstream_unavailable.load(Ordering::Relaxed),
            malformed_payload: self.malformed_payload.load(Ordering::Relaxed),
            rejected_callback: self.rejected_callback.load(Ordering::Relaxed),
            config_misuse: self.config_misuse.load(Ordering::Relaxed),
            transient_leadership: self.transient_leadership.load(Ordering::Relaxed),
            notify_failure: self.notify_failure.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub polls: u64,
    pub renewals: u64,
    pub et_messages: u64,
    pub sx_messages: u64,
    pub journeys_matched: u64,
    pub upstream_unavailable: u64,
    pub malformed_payload: u64,
    pub rejected_callback: u64,
    pub config_misuse: u64,
    pub transient_leadership: u64,
    pub notify_failure: u64,
}
