// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ET matching engine: per-stop deviations from one journey, joined
//! against the subscription index.

pub mod deviation;
pub mod index;
pub mod matcher;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use siri::EstimatedVehicleJourney;

use crate::error::ErrorKind;
use crate::et::deviation::deviations;
use crate::et::index::{build_stop_index, has_nsr_prefix, QUAY_PREFIX};
use crate::et::matcher::{deviation_applies, direction_holds, line_filter, vehicle_filter};
use crate::journeys::LiveJourneys;
use crate::metrics::Metrics;
use crate::notify::Notifier;
use crate::subscription::{Subscription, SubscriptionIndex};
use crate::tiamat::QuayRegistry;

/// Journeys carrying this service feature are not passenger journeys.
const FREIGHT_TRAIN: &str = "freightTrain";

pub struct EtProcessor {
    subscriptions: Arc<dyn SubscriptionIndex>,
    notifier: Arc<dyn Notifier>,
    live_journeys: Arc<LiveJourneys>,
    quays: Arc<QuayRegistry>,
    metrics: Arc<Metrics>,
}

impl EtProcessor {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionIndex>,
        notifier: Arc<dyn Notifier>,
        live_journeys: Arc<LiveJourneys>,
        quays: Arc<QuayRegistry>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { subscriptions, notifier, live_journeys, quays, metrics }
    }

    /// Process one journey. Returns false when it was ignored outright.
    pub fn process(&self, journey: &EstimatedVehicleJourney) -> bool {
        self.process_at(journey, Utc::now())
    }

    /// `process` with an explicit clock.
    pub fn process_at(&self, journey: &EstimatedVehicleJourney, now: DateTime<Utc>) -> bool {
        if journey.service_feature_refs.iter().any(|f| f.eq_ignore_ascii_case(FREIGHT_TRAIN)) {
            tracing::debug!(journey = journey.journey_ref(), "ignoring freight journey");
            return false;
        }

        self.live_journeys.update(journey);

        let devs = deviations(journey, now);
        if devs.is_empty() {
            return true;
        }
        tracing::debug!(journey = journey.journey_ref(), deviations = devs.len(), "journey deviates");

        let index = build_stop_index(journey, &self.quays);
        let line_ref = journey.line_ref.as_deref().filter(|l| !l.trim().is_empty());
        let vehicle_ref = journey.vehicle_ref.as_deref().filter(|v| !v.trim().is_empty());

        // Union per-deviation candidates by subscription id: a subscription
        // matched on both its FROM and TO stops is notified exactly once.
        let mut to_notify: IndexMap<String, Arc<Subscription>> = IndexMap::new();
        for dev in &devs {
            let stop = dev.stop_point_ref.as_str();
            if !has_nsr_prefix(stop) {
                continue;
            }
            let mut candidates = self.subscriptions.for_stop(stop);
            if stop.starts_with(QUAY_PREFIX) {
                if let Some(parent) = self.quays.stop_place_for(stop) {
                    candidates.extend(self.subscriptions.for_stop(&parent));
                }
            }
            for sub in candidates {
                if to_notify.contains_key(&sub.id) {
                    continue;
                }
                if direction_holds(&sub, &index)
                    && deviation_applies(dev, &sub, &self.quays)
                    && line_filter(&sub, line_ref)
                    && vehicle_filter(&sub, vehicle_ref)
                {
                    to_notify.insert(sub.id.clone(), sub);
                }
            }
        }

        if !to_notify.is_empty() {
            self.metrics.journeys_matched.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            let subscriptions: Vec<_> = to_notify.into_values().collect();
            if let Err(e) = self.notifier.notify_on_stops(&subscriptions, journey) {
                tracing::error!(journey = journey.journey_ref(), err = %e, "stop notification failed");
                self.metrics.record_error(ErrorKind::NotifyFailure);
            }
        }

        // Whole-line / whole-vehicle subscribers get the full journey
        // independently of stop matching.
        let mut full: IndexMap<String, Arc<Subscription>> = IndexMap::new();
        if let Some(line) = line_ref {
            for sub in self.subscriptions.for_line(line) {
                if vehicle_filter(&sub, vehicle_ref) {
                    full.entry(sub.id.clone()).or_insert(sub);
                }
            }
        }
        if let Some(vehicle) = vehicle_ref {
            for sub in self.subscriptions.for_vehicle(vehicle) {
                if line_filter(&sub, line_ref) {
                    full.entry(sub.id.clone()).or_insert(sub);
                }
            }
        }
        if !full.is_empty() {
            let subscriptions: Vec<_> = full.into_values().collect();
            if let Err(e) = self.notifier.notify_full_message(&subscriptions, journey) {
                tracing::error!(journey = journey.journey_ref(), err = %e, "full message notification failed");
                self.metrics.record_error(ErrorKind::NotifyFailure);
            }
        }

        true
    }
}
