// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use siri::FeedKind;

use crate::anshar::pipeline;
use crate::error::ErrorKind;
use crate::metrics::MetricsSnapshot;
use crate::state::{epoch_ms, UkurState};

const ACCEPTED_BODY: &str = "OK\n\n";
const REJECTED_BODY: &str = "FORBIDDEN\n\n";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub requestor_id: String,
    pub uptime_ms: u64,
    pub quay_mappings: usize,
    pub live_journeys: usize,
    pub metrics: MetricsSnapshot,
}

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<UkurState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        requestor_id: s.requestor_id.clone(),
        uptime_ms: epoch_ms().saturating_sub(s.started_at_ms),
        quay_mappings: s.quays.len(),
        live_journeys: s.live_journeys.len(),
        metrics: s.metrics.snapshot(),
    })
}

/// `POST /siriMessages/{requestorId}/{kind}` — the aggregator's push callback.
///
/// Liveness bookkeeping and enqueueing happen before the response; the
/// parse and pipeline run on a detached task so the aggregator never waits
/// on processing. Every replica accepts pushes, leadership plays no part
/// here.
pub async fn siri_messages(
    State(s): State<Arc<UkurState>>,
    Path((requestor_id, kind)): Path<(String, String)>,
    body: String,
) -> impl IntoResponse {
    if requestor_id != s.requestor_id {
        return reject(&s, "unknown requestor id");
    }
    let Some(kind) = FeedKind::from_path(&kind) else {
        return reject(&s, "unknown kind");
    };
    if !s.config.kind_enabled(kind) {
        return reject(&s, "kind disabled");
    }

    s.touch_last_received(kind);

    let state = Arc::clone(&s);
    tokio::spawn(async move {
        // Pipeline errors are already counted and logged there.
        let _ = pipeline::process_document(&state, kind, &body).await;
    });

    (StatusCode::OK, ACCEPTED_BODY)
}

fn reject(s: &Arc<UkurState>, reason: &str) -> (StatusCode, &'static str) {
    s.metrics.record_error(ErrorKind::RejectedCallback);
    tracing::warn!(reason, "rejected siri callback");
    (StatusCode::FORBIDDEN, REJECTED_BODY)
}
