// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery boundaries: the subscriber notifier and the SX processor.

use std::sync::Arc;

use siri::EstimatedVehicleJourney;

use crate::subscription::Subscription;

/// Delivery to matched subscribers. The production implementation pushes
/// to each subscriber's endpoint; delivery is best effort.
pub trait Notifier: Send + Sync {
    /// Deliver a journey to subscriptions matched on their stops.
    fn notify_on_stops(
        &self,
        subscriptions: &[Arc<Subscription>],
        journey: &EstimatedVehicleJourney,
    ) -> anyhow::Result<()>;

    /// Deliver a journey to subscriptions on the whole line or vehicle.
    fn notify_full_message(
        &self,
        subscriptions: &[Arc<Subscription>],
        journey: &EstimatedVehicleJourney,
    ) -> anyhow::Result<()>;
}

/// Stand-in notifier that logs deliveries.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_on_stops(
        &self,
        subscriptions: &[Arc<Subscription>],
        journey: &EstimatedVehicleJourney,
    ) -> anyhow::Result<()> {
        tracing::info!(
            journey = journey.journey_ref(),
            subscriptions = subscriptions.len(),
            "notifying on stops"
        );
        Ok(())
    }

    fn notify_full_message(
        &self,
        subscriptions: &[Arc<Subscription>],
        journey: &EstimatedVehicleJourney,
    ) -> anyhow::Result<()> {
        tracing::info!(
            journey = journey.journey_ref(),
            subscriptions = subscriptions.len(),
            "notifying full message"
        );
        Ok(())
    }
}

/// Processing boundary for Situation Exchange elements.
pub trait SxHandler: Send + Sync {
    fn handle(&self, situation_xml: &str) -> anyhow::Result<()>;
}

/// Stand-in SX processor that logs the situation size.
pub struct LogSxHandler;

impl SxHandler for LogSxHandler {
    fn handle(&self, situation_xml: &str) -> anyhow::Result<()> {
        tracing::debug!(bytes = situation_xml.len(), "situation received");
        Ok(())
    }
}
