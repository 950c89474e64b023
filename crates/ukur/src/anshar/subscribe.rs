// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription-mode ingestion: renew and liveness-check workflows.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Utc;
use siri::subscribe::SubscriptionRequest;
use siri::FeedKind;

use crate::anshar::{HEARTBEAT_INTERVAL_MS, SUBSCRIPTION_DURATION_MIN};
use crate::error::ErrorKind;
use crate::state::{epoch_ms, UkurState};

/// A kind silent for longer than this is assumed lapsed upstream.
pub const LIVENESS_THRESHOLD_MS: u64 = 3 * HEARTBEAT_INTERVAL_MS;

/// The `AnsharSubscriptionRenewer` workflow: one request per enabled kind.
/// Failures are logged and left to the next scheduled renewal.
pub async fn renew_subscriptions(state: &Arc<UkurState>) {
    for kind in state.config.enabled_kinds() {
        if let Err(e) = renew_one(state, kind).await {
            tracing::warn!(kind = %kind, err = %e, "subscription request failed");
            state.metrics.record_error(ErrorKind::UpstreamUnavailable);
        }
    }
}

/// POST one subscription request. Anything but 200 is a failure.
pub async fn renew_one(state: &Arc<UkurState>, kind: FeedKind) -> anyhow::Result<()> {
    let seq = state.message_counter.fetch_add(1, Ordering::Relaxed);
    let now = Utc::now();
    let request = SubscriptionRequest {
        kind,
        requestor_ref: state.requestor_id.clone(),
        message_identifier: format!("{}-msg-{seq}", state.requestor_id),
        consumer_address: state.config.consumer_address(kind, &state.requestor_id),
        timestamp: now,
        heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
        initial_termination_time: now + chrono::Duration::minutes(SUBSCRIPTION_DURATION_MIN),
    };

    let resp = state
        .http
        .post(&state.config.subscription_url)
        .header(reqwest::header::CONTENT_TYPE, "application/xml")
        .body(request.to_xml())
        .send()
        .await?;
    if resp.status() != reqwest::StatusCode::OK {
        anyhow::bail!("subscription request rejected with {}", resp.status());
    }

    state.metrics.renewals.fetch_add(1, Ordering::Relaxed);
    tracing::info!(
        kind = %kind,
        subscription = %request.subscription_identifier(),
        "subscription established"
    );
    Ok(())
}

/// The `AnsharSubscriptionChecker` workflow: re-subscribe any enabled kind
/// whose pushes have gone silent for three heartbeats.
///
/// An absent liveness key means nothing was received yet, which is normal
/// early in a subscription's life and does not trigger renewal.
pub async fn check_liveness(state: &Arc<UkurState>) {
    let now = epoch_ms();
    for kind in state.config.enabled_kinds() {
        let Some(last) = state.last_received(kind) else { continue };
        let silent_ms = now.saturating_sub(last);
        if silent_ms <= LIVENESS_THRESHOLD_MS {
            continue;
        }
        tracing::warn!(kind = %kind, silent_ms, "no pushes within liveness window, renewing");
        if let Err(e) = renew_one(state, kind).await {
            tracing::warn!(kind = %kind, err = %e, "renewal after silence failed");
            state.metrics.record_error(ErrorKind::UpstreamUnavailable);
        }
    }
}
