// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The matching predicates.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use siri::{ArrivalBoardingActivity, DepartureBoardingActivity};

use crate::et::deviation::{DeviatingStop, Deviation};
use crate::et::index::{JourneyStopIndex, QUAY_PREFIX};
use crate::subscription::Subscription;
use crate::tiamat::QuayRegistry;

#[derive(Clone, Copy)]
enum Side {
    From,
    To,
}

/// The journey passes the subscription's FROM stop before its TO stop.
///
/// Both sides must resolve to a stop of this journey where the passenger
/// can actually board (FROM) or alight (TO).
pub fn direction_holds(subscription: &Subscription, index: &JourneyStopIndex) -> bool {
    let from = resolve_one(&subscription.from_stop_points, Side::From, index);
    let to = resolve_one(&subscription.to_stop_points, Side::To, index);
    matches!((from, to), (Some(from), Some(to)) if from < to)
}

/// Walk `points` in order; the first one present in the index decides.
/// A boarding activity that forbids the subscribed use of the stop makes
/// the whole side unresolvable.
fn resolve_one(
    points: &IndexSet<String>,
    side: Side,
    index: &JourneyStopIndex,
) -> Option<DateTime<Utc>> {
    for point in points {
        let Some(data) = index.get(point) else { continue };
        match side {
            Side::From => {
                if data
                    .departure_boarding_activity
                    .is_some_and(|a| a != DepartureBoardingActivity::Boarding)
                {
                    return None;
                }
            }
            Side::To => {
                if data
                    .arrival_boarding_activity
                    .is_some_and(|a| a != ArrivalBoardingActivity::Alighting)
                {
                    return None;
                }
            }
        }
        return data.aimed_departure_time;
    }
    None
}

/// A cancellation concerns every subscription; a delay only those
/// subscribed to the deviating stop on the delayed side. A quay deviation
/// is re-checked under its parent stop place.
pub fn deviation_applies(
    dev: &DeviatingStop,
    subscription: &Subscription,
    quays: &QuayRegistry,
) -> bool {
    let Deviation::Delayed { departure, arrival } = dev.deviation else {
        return true;
    };
    let touches = |stop: &str| {
        (departure && subscription.from_stop_points.contains(stop))
            || (arrival && subscription.to_stop_points.contains(stop))
    };
    if touches(&dev.stop_point_ref) {
        return true;
    }
    if dev.stop_point_ref.starts_with(QUAY_PREFIX) {
        if let Some(parent) = quays.stop_place_for(&dev.stop_point_ref) {
            return touches(&parent);
        }
    }
    false
}

/// Empty filter or absent/blank journey ref matches everything.
pub fn line_filter(subscription: &Subscription, line_ref: Option<&str>) -> bool {
    subscription.line_refs.is_empty()
        || line_ref.map_or(true, |line| subscription.line_refs.contains(line))
}

pub fn vehicle_filter(subscription: &Subscription, vehicle_ref: Option<&str>) -> bool {
    subscription.vehicle_refs.is_empty()
        || vehicle_ref.map_or(true, |vehicle| subscription.vehicle_refs.contains(vehicle))
}
