// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-stop deviation extraction from one journey.

use chrono::{DateTime, Utc};
use siri::{CallStatus, EstimatedVehicleJourney};

/// What went wrong at one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deviation {
    Cancelled,
    /// At least one of the two sides is delayed.
    Delayed { departure: bool, arrival: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviatingStop {
    pub stop_point_ref: String,
    pub deviation: Deviation,
}

/// Extract deviations for the calls still ahead of `now`.
///
/// A journey-level cancellation cancels every future call; otherwise a call
/// deviates when its status says delayed or its expected time slipped past
/// the aimed time, on either side. Calls already passed emit nothing.
pub fn deviations(journey: &EstimatedVehicleJourney, now: DateTime<Utc>) -> Vec<DeviatingStop> {
    let mut out = Vec::new();
    for call in &journey.estimated_calls {
        let Some(stop_point_ref) = call.stop_point_ref.clone() else { continue };
        let Some(departure) = call.effective_departure_time() else { continue };
        if departure <= now {
            continue;
        }

        if journey.cancellation || call.cancellation {
            out.push(DeviatingStop { stop_point_ref, deviation: Deviation::Cancelled });
            continue;
        }

        let departure_delayed = call.departure_status == Some(CallStatus::Delayed)
            || matches!(
                (call.aimed_departure_time, call.expected_departure_time),
                (Some(aimed), Some(expected)) if expected > aimed
            );
        let arrival_delayed = call.arrival_status == Some(CallStatus::Delayed)
            || matches!(
                (call.aimed_arrival_time, call.expected_arrival_time),
                (Some(aimed), Some(expected)) if expected > aimed
            );
        if departure_delayed || arrival_delayed {
            out.push(DeviatingStop {
                stop_point_ref,
                deviation: Deviation::Delayed {
                    departure: departure_delayed,
                    arrival: arrival_delayed,
                },
            });
        }
    }
    out
}
