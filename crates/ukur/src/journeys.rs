// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory cache of the latest state per vehicle journey.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use siri::EstimatedVehicleJourney;
use tokio::time::Instant;

use crate::state::UkurState;

/// Entries untouched for this long are dropped by `FlushOldJourneys`.
pub const MAX_JOURNEY_AGE: Duration = Duration::from_secs(30 * 60);

struct CachedJourney {
    journey: EstimatedVehicleJourney,
    updated_at: Instant,
}

/// Latest journey per `DatedVehicleJourneyRef`.
#[derive(Default)]
pub struct LiveJourneys {
    inner: Mutex<HashMap<String, CachedJourney>>,
}

impl LiveJourneys {
    /// Store or overwrite the journey. Journeys without a dated ref are
    /// not cacheable and are ignored.
    pub fn update(&self, journey: &EstimatedVehicleJourney) {
        let Some(key) = journey.dated_vehicle_journey_ref.clone() else { return };
        if let Ok(mut inner) = self.inner.lock() {
            inner.insert(key, CachedJourney { journey: journey.clone(), updated_at: Instant::now() });
        }
    }

    pub fn get(&self, dated_ref: &str) -> Option<EstimatedVehicleJourney> {
        match self.inner.lock() {
            Ok(inner) => inner.get(dated_ref).map(|c| c.journey.clone()),
            Err(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries older than `max_age`. Returns how many were removed.
    pub fn flush_older_than(&self, max_age: Duration) -> usize {
        let Ok(mut inner) = self.inner.lock() else { return 0 };
        let now = Instant::now();
        let before = inner.len();
        inner.retain(|_, cached| now.duration_since(cached.updated_at) < max_age);
        before - inner.len()
    }
}

/// The `FlushOldJourneys` workflow.
pub async fn flush_old(state: &Arc<UkurState>) {
    let removed = state.live_journeys.flush_older_than(MAX_JOURNEY_AGE);
    if removed > 0 {
        tracing::debug!(removed, remaining = state.live_journeys.len(), "flushed old journeys");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey(dated_ref: Option<&str>) -> EstimatedVehicleJourney {
        EstimatedVehicleJourney {
            dated_vehicle_journey_ref: dated_ref.map(str::to_owned),
            ..EstimatedVehicleJourney::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn caches_latest_per_dated_ref() {
        let cache = LiveJourneys::default();
        cache.update(&journey(Some("j1")));

        let mut updated = journey(Some("j1"));
        updated.cancellation = true;
        cache.update(&updated);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("j1").is_some_and(|j| j.cancellation));
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_journeys_without_dated_ref() {
        let cache = LiveJourneys::default();
        cache.update(&journey(None));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn flushes_only_stale_entries() {
        let cache = LiveJourneys::default();
        cache.update(&journey(Some("old")));

        tokio::time::advance(MAX_JOURNEY_AGE + Duration::from_secs(1)).await;
        cache.update(&journey(Some("fresh")));

        let removed = cache.flush_older_than(MAX_JOURNEY_AGE);
        assert_eq!(removed, 1);
        assert!(cache.get("old").is_none());
        assert!(cache.get("fresh").is_some());
    }
}
