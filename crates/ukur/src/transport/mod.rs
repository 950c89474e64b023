// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport: the aggregator callback and the health endpoint.

pub mod http;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::UkurState;

/// Build the axum `Router` with all routes.
pub fn build_router(state: Arc<UkurState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::health))
        .route("/siriMessages/{requestor_id}/{kind}", post(http::siri_messages))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
