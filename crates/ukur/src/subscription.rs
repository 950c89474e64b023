// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read side of the subscription store.
//!
//! Subscriptions are owned by the external CRUD API; the matching engine
//! only ever looks candidates up by stop, line, or vehicle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use indexmap::IndexSet;

/// A push subscription registered by an end user.
///
/// Empty `line_refs`/`vehicle_refs` mean "match any". The stop sets keep
/// insertion order; the direction check walks them in that order.
#[derive(Debug, Clone, Default)]
pub struct Subscription {
    pub id: String,
    pub from_stop_points: IndexSet<String>,
    pub to_stop_points: IndexSet<String>,
    pub line_refs: IndexSet<String>,
    pub vehicle_refs: IndexSet<String>,
}

/// Candidate lookup along the three matching dimensions.
pub trait SubscriptionIndex: Send + Sync {
    /// Subscriptions whose FROM or TO set contains `stop`.
    fn for_stop(&self, stop: &str) -> Vec<Arc<Subscription>>;

    fn for_line(&self, line: &str) -> Vec<Arc<Subscription>>;

    fn for_vehicle(&self, vehicle: &str) -> Vec<Arc<Subscription>>;
}

#[derive(Default)]
struct Inner {
    by_stop: HashMap<String, Vec<Arc<Subscription>>>,
    by_line: HashMap<String, Vec<Arc<Subscription>>>,
    by_vehicle: HashMap<String, Vec<Arc<Subscription>>>,
}

/// In-memory reverse-map index, fed by the subscription store.
#[derive(Default)]
pub struct InMemorySubscriptionIndex {
    inner: RwLock<Inner>,
}

impl InMemorySubscriptionIndex {
    pub fn add(&self, subscription: Subscription) -> Arc<Subscription> {
        let subscription = Arc::new(subscription);
        if let Ok(mut inner) = self.inner.write() {
            for stop in subscription.from_stop_points.iter().chain(&subscription.to_stop_points) {
                inner.by_stop.entry(stop.clone()).or_default().push(Arc::clone(&subscription));
            }
            for line in &subscription.line_refs {
                inner.by_line.entry(line.clone()).or_default().push(Arc::clone(&subscription));
            }
            for vehicle in &subscription.vehicle_refs {
                inner
                    .by_vehicle
                    .entry(vehicle.clone())
                    .or_default()
                    .push(Arc::clone(&subscription));
            }
        }
        subscription
    }
}

impl SubscriptionIndex for InMemorySubscriptionIndex {
    fn for_stop(&self, stop: &str) -> Vec<Arc<Subscription>> {
        match self.inner.read() {
            Ok(inner) => inner.by_stop.get(stop).cloned().unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn for_line(&self, line: &str) -> Vec<Arc<Subscription>> {
        match self.inner.read() {
            Ok(inner) => inner.by_line.get(line).cloned().unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn for_vehicle(&self, vehicle: &str) -> Vec<Arc<Subscription>> {
        match self.inner.read() {
            Ok(inner) => inner.by_vehicle.get(vehicle).cloned().unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(id: &str, from: &[&str], to: &[&str]) -> Subscription {
        Subscription {
            id: id.to_owned(),
            from_stop_points: from.iter().map(|s| (*s).to_owned()).collect(),
            to_stop_points: to.iter().map(|s| (*s).to_owned()).collect(),
            ..Subscription::default()
        }
    }

    #[test]
    fn indexes_both_stop_sides() {
        let index = InMemorySubscriptionIndex::default();
        index.add(subscription("s1", &["NSR:StopPlace:1"], &["NSR:StopPlace:2"]));

        assert_eq!(index.for_stop("NSR:StopPlace:1").len(), 1);
        assert_eq!(index.for_stop("NSR:StopPlace:2").len(), 1);
        assert!(index.for_stop("NSR:StopPlace:3").is_empty());
    }

    #[test]
    fn indexes_line_and_vehicle() {
        let index = InMemorySubscriptionIndex::default();
        let mut sub = subscription("s2", &["NSR:StopPlace:1"], &["NSR:StopPlace:2"]);
        sub.line_refs.insert("NSB:Line:L1".to_owned());
        sub.vehicle_refs.insert("2202".to_owned());
        index.add(sub);

        assert_eq!(index.for_line("NSB:Line:L1").len(), 1);
        assert_eq!(index.for_vehicle("2202").len(), 1);
        assert!(index.for_line("NSB:Line:L2").is_empty());
    }
}
