// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-journey stop index.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use siri::{ArrivalBoardingActivity, DepartureBoardingActivity, EstimatedVehicleJourney};

use crate::tiamat::QuayRegistry;

pub const NSR_PREFIX: &str = "NSR:";
pub const QUAY_PREFIX: &str = "NSR:Quay:";

/// Case-insensitive check for the national stop registry namespace.
pub fn has_nsr_prefix(stop: &str) -> bool {
    stop.len() >= NSR_PREFIX.len() && stop[..NSR_PREFIX.len()].eq_ignore_ascii_case(NSR_PREFIX)
}

/// What the matcher needs to know about one stop of one journey.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopData {
    pub aimed_departure_time: Option<DateTime<Utc>>,
    pub arrival_boarding_activity: Option<ArrivalBoardingActivity>,
    pub departure_boarding_activity: Option<DepartureBoardingActivity>,
}

/// `stopPointRef` → `StopData` for exactly one journey. Every quay entry
/// with a resolvable parent is additionally mirrored under the parent's
/// `NSR:StopPlace:` key.
pub type JourneyStopIndex = HashMap<String, StopData>;

pub fn build_stop_index(
    journey: &EstimatedVehicleJourney,
    quays: &QuayRegistry,
) -> JourneyStopIndex {
    // Call order decides last-writer-wins, both for repeated stops and for
    // quays sharing a parent.
    let mut ordered: Vec<(String, StopData)> = Vec::new();
    for call in &journey.recorded_calls {
        if let Some(stop) = &call.stop_point_ref {
            ordered.push((
                stop.clone(),
                StopData { aimed_departure_time: call.aimed_departure_time, ..StopData::default() },
            ));
        }
    }
    for call in &journey.estimated_calls {
        if let Some(stop) = &call.stop_point_ref {
            ordered.push((
                stop.clone(),
                StopData {
                    aimed_departure_time: call.aimed_departure_time,
                    arrival_boarding_activity: call.arrival_boarding_activity,
                    departure_boarding_activity: call.departure_boarding_activity,
                },
            ));
        }
    }

    let mut index = JourneyStopIndex::with_capacity(ordered.len() * 2);
    for (stop, data) in &ordered {
        index.insert(stop.clone(), data.clone());
    }
    // Mirror quays under their parent stop place; originals stay.
    for (stop, data) in &ordered {
        if stop.starts_with(QUAY_PREFIX) {
            if let Some(parent) = quays.stop_place_for(stop) {
                index.insert(parent, data.clone());
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use siri::{EstimatedCall, RecordedCall};
    use std::collections::HashMap as StdHashMap;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, hour, min, 0).unwrap()
    }

    fn registry(pairs: &[(&str, &str)]) -> QuayRegistry {
        let registry = QuayRegistry::default();
        registry.replace(
            pairs.iter().map(|(q, s)| ((*q).to_owned(), (*s).to_owned())).collect::<StdHashMap<_, _>>(),
        );
        registry
    }

    #[test]
    fn estimated_calls_carry_boarding_activities() {
        let journey = EstimatedVehicleJourney {
            recorded_calls: vec![RecordedCall {
                stop_point_ref: Some("NSR:Quay:1".to_owned()),
                aimed_departure_time: Some(at(9, 0)),
            }],
            estimated_calls: vec![EstimatedCall {
                stop_point_ref: Some("NSR:Quay:2".to_owned()),
                aimed_departure_time: Some(at(10, 0)),
                departure_boarding_activity: Some(DepartureBoardingActivity::Boarding),
                ..EstimatedCall::default()
            }],
            ..EstimatedVehicleJourney::default()
        };
        let index = build_stop_index(&journey, &QuayRegistry::default());

        let recorded = &index["NSR:Quay:1"];
        assert_eq!(recorded.aimed_departure_time, Some(at(9, 0)));
        assert!(recorded.departure_boarding_activity.is_none());

        let estimated = &index["NSR:Quay:2"];
        assert_eq!(
            estimated.departure_boarding_activity,
            Some(DepartureBoardingActivity::Boarding)
        );
    }

    #[test]
    fn quays_are_mirrored_under_parents_additively() {
        let quays = registry(&[("NSR:Quay:9", "NSR:StopPlace:1")]);
        let journey = EstimatedVehicleJourney {
            estimated_calls: vec![EstimatedCall {
                stop_point_ref: Some("NSR:Quay:9".to_owned()),
                aimed_departure_time: Some(at(10, 0)),
                ..EstimatedCall::default()
            }],
            ..EstimatedVehicleJourney::default()
        };
        let index = build_stop_index(&journey, &quays);

        assert_eq!(index.len(), 2);
        assert_eq!(index["NSR:Quay:9"], index["NSR:StopPlace:1"]);
    }

    #[test]
    fn later_quay_wins_on_shared_parent() {
        let quays =
            registry(&[("NSR:Quay:8", "NSR:StopPlace:1"), ("NSR:Quay:9", "NSR:StopPlace:1")]);
        let journey = EstimatedVehicleJourney {
            estimated_calls: vec![
                EstimatedCall {
                    stop_point_ref: Some("NSR:Quay:8".to_owned()),
                    aimed_departure_time: Some(at(10, 0)),
                    ..EstimatedCall::default()
                },
                EstimatedCall {
                    stop_point_ref: Some("NSR:Quay:9".to_owned()),
                    aimed_departure_time: Some(at(11, 0)),
                    ..EstimatedCall::default()
                },
            ],
            ..EstimatedVehicleJourney::default()
        };
        let index = build_stop_index(&journey, &quays);

        assert_eq!(index["NSR:StopPlace:1"].aimed_departure_time, Some(at(11, 0)));
        // Originals remain.
        assert_eq!(index["NSR:Quay:8"].aimed_departure_time, Some(at(10, 0)));
        assert_eq!(index["NSR:Quay:9"].aimed_departure_time, Some(at(11, 0)));
    }

    #[test]
    fn unresolvable_quays_are_not_mirrored() {
        let journey = EstimatedVehicleJourney {
            estimated_calls: vec![EstimatedCall {
                stop_point_ref: Some("NSR:Quay:404".to_owned()),
                aimed_departure_time: Some(at(10, 0)),
                ..EstimatedCall::default()
            }],
            ..EstimatedVehicleJourney::default()
        };
        let index = build_stop_index(&journey, &QuayRegistry::default());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn nsr_prefix_is_case_insensitive() {
        assert!(has_nsr_prefix("NSR:StopPlace:1"));
        assert!(has_nsr_prefix("nsr:Quay:1"));
        assert!(!has_nsr_prefix("RUT:StopPlace:1"));
        assert!(!has_nsr_prefix("NS"));
    }
}
