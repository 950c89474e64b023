// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leader-gated periodic triggers.
//!
//! Each trigger runs on its own timer task so a workflow blocked on a slow
//! upstream never delays the others. Missed ticks are dropped, never
//! caught up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cluster::Coordinator;
use crate::inflight::InflightRegistry;

/// Delay before a freshly registered trigger first fires.
pub const WARMUP_DELAY: Duration = Duration::from_secs(5);

pub struct TriggerScheduler {
    coordinator: Arc<Coordinator>,
    inflight: Arc<InflightRegistry>,
    shutdown: CancellationToken,
}

impl TriggerScheduler {
    pub fn new(
        coordinator: Arc<Coordinator>,
        inflight: Arc<InflightRegistry>,
        shutdown: CancellationToken,
    ) -> Self {
        Self { coordinator, inflight, shutdown }
    }

    pub fn inflight(&self) -> &Arc<InflightRegistry> {
        &self.inflight
    }

    /// Register a periodic trigger.
    ///
    /// `fire` produces one invocation of `workflow`; it runs on its own task
    /// holding the inflight slot. At each tick the invocation is skipped
    /// unless this replica leads `name` and no `workflow` invocation is
    /// still running in this process.
    pub fn register<F, Fut>(
        &self,
        name: &'static str,
        period: Duration,
        workflow: &'static str,
        fire: F,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.coordinator.register(name);

        let coordinator = Arc::clone(&self.coordinator);
        let inflight = Arc::clone(&self.inflight);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(WARMUP_DELAY) => {}
            }

            let mut tick = tokio::time::interval(period);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tick.tick() => {}
                }

                if !coordinator.is_leader(name) {
                    tracing::trace!(trigger = name, "skipping fire, not leader");
                    continue;
                }
                if !inflight.is_idle(workflow) {
                    tracing::debug!(trigger = name, workflow, "skipping fire, still in flight");
                    continue;
                }

                let guard = inflight.begin(workflow);
                let invocation = fire();
                tokio::spawn(async move {
                    invocation.await;
                    drop(guard);
                });
            }
        });
    }
}
