// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Anshar ingestion: polling and subscription modes, the per-kind pipeline,
//! and the feed queues.

pub mod pipeline;
pub mod poll;
pub mod queue;
pub mod subscribe;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use siri::FeedKind;

use crate::scheduler::TriggerScheduler;
use crate::state::UkurState;

pub const HEARTBEAT_INTERVAL_MS: u64 = 60_000;
pub const SUBSCRIPTION_DURATION_MIN: i64 = 720;

/// Client name sent with every polling request.
pub const CLIENT_NAME: &str = "Ukur";

/// Client id sent with every polling request: the hostname, or a fixed
/// fallback when it cannot be resolved.
pub fn client_id() -> &'static str {
    static CLIENT_ID: OnceLock<String> = OnceLock::new();
    CLIENT_ID.get_or_init(|| {
        hostname::get()
            .ok()
            .map(|h| h.to_string_lossy().into_owned())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "Ukur-UnknownHost".to_owned())
    })
}

/// Register the ingestion triggers for the configured mode.
pub fn register_triggers(scheduler: &TriggerScheduler, state: &Arc<UkurState>) {
    if state.config.use_subscription {
        if state.config.validate().is_some() {
            tracing::warn!(
                "subscription mode selected but both feeds are disabled; not registering subscription triggers"
            );
            state.metrics.record_error(crate::error::ErrorKind::ConfigMisuse);
            return;
        }

        let renew_state = Arc::clone(state);
        scheduler.register(
            "AnsharSubscriptionRenewer",
            Duration::from_millis(SUBSCRIPTION_DURATION_MIN as u64 * 60_000),
            "AnsharSubscriptionRenewer",
            move || {
                let state = Arc::clone(&renew_state);
                async move { subscribe::renew_subscriptions(&state).await }
            },
        );

        let check_state = Arc::clone(state);
        scheduler.register(
            "AnsharSubscriptionChecker",
            Duration::from_millis(HEARTBEAT_INTERVAL_MS),
            "AnsharSubscriptionChecker",
            move || {
                let state = Arc::clone(&check_state);
                async move { subscribe::check_liveness(&state).await }
            },
        );
        return;
    }

    if state.config.et_enabled {
        let et_state = Arc::clone(state);
        scheduler.register(
            "AnsharPollET",
            state.config.polling_interval(),
            "AnsharPollET",
            move || {
                let state = Arc::clone(&et_state);
                async move { poll::run_poll_chain(state, FeedKind::Et).await }
            },
        );
    }
    if state.config.sx_enabled {
        let sx_state = Arc::clone(state);
        scheduler.register(
            "AnsharPollSX",
            state.config.polling_interval(),
            "AnsharPollSX",
            move || {
                let state = Arc::clone(&sx_state);
                async move { poll::run_poll_chain(state, FeedKind::Sx).await }
            },
        );
    }
}
