// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-kind queue consumers.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::ErrorKind;
use crate::et::EtProcessor;
use crate::state::{FeedReceivers, UkurState};

/// Spawn one consumer task per feed kind.
pub fn spawn_consumers(state: &Arc<UkurState>, receivers: FeedReceivers) {
    let processor = Arc::new(EtProcessor::new(
        Arc::clone(&state.subscriptions),
        Arc::clone(&state.notifier),
        Arc::clone(&state.live_journeys),
        Arc::clone(&state.quays),
        Arc::clone(&state.metrics),
    ));
    spawn_et_consumer(Arc::clone(state), receivers.et, processor);
    spawn_sx_consumer(Arc::clone(state), receivers.sx);
}

fn spawn_et_consumer(
    state: Arc<UkurState>,
    mut rx: mpsc::Receiver<String>,
    processor: Arc<EtProcessor>,
) {
    tokio::spawn(async move {
        loop {
            let fragment = tokio::select! {
                _ = state.shutdown.cancelled() => break,
                fragment = rx.recv() => fragment,
            };
            let Some(fragment) = fragment else { break };

            match siri::parse::estimated_vehicle_journey(&fragment) {
                Ok(journey) => {
                    state.metrics.et_messages.fetch_add(1, Ordering::Relaxed);
                    processor.process(&journey);
                }
                Err(e) => {
                    state.metrics.record_error(ErrorKind::MalformedPayload);
                    tracing::warn!(bytes = fragment.len(), err = %e, "dropping unparseable journey");
                }
            }
        }
    });
}

fn spawn_sx_consumer(state: Arc<UkurState>, mut rx: mpsc::Receiver<String>) {
    tokio::spawn(async move {
        loop {
            let fragment = tokio::select! {
                _ = state.shutdown.cancelled() => break,
                fragment = rx.recv() => fragment,
            };
            let Some(fragment) = fragment else { break };

            state.metrics.sx_messages.fetch_add(1, Ordering::Relaxed);
            if let Err(e) = state.sx_handler.handle(&fragment) {
                tracing::error!(err = %e, "situation processing failed");
                state.metrics.record_error(ErrorKind::NotifyFailure);
            }
        }
    });
}
