// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-trigger leader election over the shared map.
//!
//! Each registered trigger gets a lease loop: acquire or renew
//! `lock/<trigger>` on a cadence well inside the lease TTL, and publish the
//! outcome in an atomic the scheduler reads at fire time. Leadership is
//! authoritative only while the lease is held; a replica that loses its
//! lease stops claiming leadership at the next renewal at the latest.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cluster::map::SharedMap;
use crate::error::ErrorKind;
use crate::metrics::Metrics;

pub const LEASE_TTL: Duration = Duration::from_secs(30);
pub const LEASE_RENEW_INTERVAL: Duration = Duration::from_secs(10);

pub struct Coordinator {
    map: Arc<dyn SharedMap>,
    replica_id: String,
    held: Mutex<HashMap<String, Arc<AtomicBool>>>,
    shutdown: CancellationToken,
    metrics: Arc<Metrics>,
}

impl Coordinator {
    pub fn new(
        map: Arc<dyn SharedMap>,
        replica_id: String,
        shutdown: CancellationToken,
        metrics: Arc<Metrics>,
    ) -> Arc<Self> {
        Arc::new(Self { map, replica_id, held: Mutex::new(HashMap::new()), shutdown, metrics })
    }

    pub fn replica_id(&self) -> &str {
        &self.replica_id
    }

    /// True while this replica holds the lease for `trigger`.
    pub fn is_leader(&self, trigger: &str) -> bool {
        match self.held.lock() {
            Ok(held) => held.get(trigger).is_some_and(|flag| flag.load(Ordering::Relaxed)),
            Err(_) => false,
        }
    }

    /// Start the lease loop for a named trigger. Idempotent per name.
    pub fn register(self: &Arc<Self>, trigger: &str) {
        let flag = {
            let Ok(mut held) = self.held.lock() else { return };
            if held.contains_key(trigger) {
                return;
            }
            let flag = Arc::new(AtomicBool::new(false));
            held.insert(trigger.to_owned(), Arc::clone(&flag));
            flag
        };

        let this = Arc::clone(self);
        let trigger = trigger.to_owned();
        tokio::spawn(async move {
            let key = format!("lock/{trigger}");
            loop {
                let acquired = this.map.try_acquire_lease(&key, &this.replica_id, LEASE_TTL);
                let was_leader = flag.swap(acquired, Ordering::Relaxed);
                if was_leader && !acquired {
                    tracing::warn!(trigger = %trigger, "leadership lease lost");
                    this.metrics.record_error(ErrorKind::TransientLeadership);
                } else if !was_leader && acquired {
                    tracing::info!(trigger = %trigger, "leadership lease acquired");
                }

                tokio::select! {
                    _ = this.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(LEASE_RENEW_INTERVAL) => {}
                }
            }
            flag.store(false, Ordering::Relaxed);
            this.map.release_lease(&key, &this.replica_id);
        });
    }
}
