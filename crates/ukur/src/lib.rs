// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ukur: real-time transit-disruption notifier.
//!
//! Ingests SIRI ET and SX updates from an upstream aggregator, matches
//! per-stop deviations against registered subscriptions, and hands the
//! affected sets to the notifier.

pub mod anshar;
pub mod archive;
pub mod cluster;
pub mod config;
pub mod error;
pub mod et;
pub mod inflight;
pub mod journeys;
pub mod metrics;
pub mod notify;
pub mod scheduler;
pub mod state;
pub mod subscription;
pub mod tiamat;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::cluster::{Coordinator, InMemorySharedMap, SharedMap};
use crate::config::UkurConfig;
use crate::inflight::InflightRegistry;
use crate::scheduler::TriggerScheduler;
use crate::state::UkurState;


/// Run the service until shutdown.
pub async fn run(config: UkurConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let shared_map: Arc<dyn SharedMap> = Arc::new(InMemorySharedMap::default());
    let (state, receivers) = UkurState::with_defaults(config, shared_map, shutdown.clone());
    tracing::info!(requestor_id = %state.requestor_id, "node started");

    anshar::queue::spawn_consumers(&state, receivers);

    let coordinator = Coordinator::new(
        Arc::clone(&state.shared_map),
        uuid::Uuid::new_v4().to_string(),
        shutdown.clone(),
        Arc::clone(&state.metrics),
    );
    let scheduler =
        TriggerScheduler::new(coordinator, Arc::new(InflightRegistry::default()), shutdown.clone());
    register_triggers(&scheduler, &state);

    // Ctrl-C cancels the token; in-flight workflows finish, timers stop.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                shutdown.cancel();
            }
        });
    }

    tracing::info!("ukur listening on {addr}");
    let router = transport::build_router(Arc::clone(&state));
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}

/// Register every trigger the configuration calls for.
fn register_triggers(scheduler: &TriggerScheduler, state: &Arc<UkurState>) {
    {
        let flush_state = Arc::clone(state);
        scheduler.register(
            "FlushOldJourneys",
            state.config.polling_interval(),
            "FlushOldJourneys",
            move || {
                let state = Arc::clone(&flush_state);
                async move { journeys::flush_old(&state).await }
            },
        );
    }

    if state.config.tiamat_enabled {
        let tiamat_state = Arc::clone(state);
        scheduler.register(
            "TiamatRefresh",
            state.config.tiamat_interval(),
            "TiamatRefresh",
            move || {
                let state = Arc::clone(&tiamat_state);
                async move { tiamat::refresh(&state).await }
            },
        );
    }

    anshar::register_triggers(scheduler, state);
}
