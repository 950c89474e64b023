// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed model for the SIRI elements this service consumes.

use chrono::{DateTime, Utc};

/// The two feed kinds ingested from the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// Estimated Timetable: per-journey stop-by-stop expected times.
    Et,
    /// Situation Exchange: free-text disruption situations.
    Sx,
}

impl FeedKind {
    /// Lowercase form used in URLs and shared-map keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Et => "et",
            Self::Sx => "sx",
        }
    }

    /// Uppercase form used in subscription identifiers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Et => "ET",
            Self::Sx => "SX",
        }
    }

    /// Parse the path segment of a callback URL.
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "et" => Some(Self::Et),
            "sx" => Some(Self::Sx),
            _ => None,
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SIRI call status (`DepartureStatus` / `ArrivalStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    OnTime,
    Early,
    Delayed,
    Cancelled,
    Arrived,
    Departed,
    Missed,
    NoReport,
}

impl CallStatus {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "onTime" => Some(Self::OnTime),
            "early" => Some(Self::Early),
            "delayed" => Some(Self::Delayed),
            "cancelled" => Some(Self::Cancelled),
            "arrived" => Some(Self::Arrived),
            "departed" => Some(Self::Departed),
            "missed" => Some(Self::Missed),
            "noReport" => Some(Self::NoReport),
            _ => None,
        }
    }
}

/// Whether passengers may leave the vehicle at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalBoardingActivity {
    Alighting,
    NoAlighting,
    PassThru,
}

impl ArrivalBoardingActivity {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "alighting" => Some(Self::Alighting),
            "noAlighting" => Some(Self::NoAlighting),
            "passThru" => Some(Self::PassThru),
            _ => None,
        }
    }
}

/// Whether passengers may board the vehicle at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureBoardingActivity {
    Boarding,
    NoBoarding,
    PassThru,
}

impl DepartureBoardingActivity {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "boarding" => Some(Self::Boarding),
            "noBoarding" => Some(Self::NoBoarding),
            "passThru" => Some(Self::PassThru),
            _ => None,
        }
    }
}

/// One `EstimatedVehicleJourney` element.
#[derive(Debug, Clone, Default)]
pub struct EstimatedVehicleJourney {
    pub line_ref: Option<String>,
    pub direction_ref: Option<String>,
    pub dated_vehicle_journey_ref: Option<String>,
    pub vehicle_ref: Option<String>,
    pub operator_ref: Option<String>,
    pub service_feature_refs: Vec<String>,
    pub cancellation: bool,
    pub recorded_calls: Vec<RecordedCall>,
    pub estimated_calls: Vec<EstimatedCall>,
}

impl EstimatedVehicleJourney {
    /// Best available identifier for logs.
    pub fn journey_ref(&self) -> &str {
        self.dated_vehicle_journey_ref
            .as_deref()
            .or(self.vehicle_ref.as_deref())
            .unwrap_or("<unknown journey>")
    }
}

/// A stop the vehicle has already passed.
#[derive(Debug, Clone, Default)]
pub struct RecordedCall {
    pub stop_point_ref: Option<String>,
    pub aimed_departure_time: Option<DateTime<Utc>>,
}

/// A stop the vehicle has not yet passed.
#[derive(Debug, Clone, Default)]
pub struct EstimatedCall {
    pub stop_point_ref: Option<String>,
    pub cancellation: bool,
    pub aimed_arrival_time: Option<DateTime<Utc>>,
    pub expected_arrival_time: Option<DateTime<Utc>>,
    pub arrival_status: Option<CallStatus>,
    pub arrival_boarding_activity: Option<ArrivalBoardingActivity>,
    pub aimed_departure_time: Option<DateTime<Utc>>,
    pub expected_departure_time: Option<DateTime<Utc>>,
    pub departure_status: Option<CallStatus>,
    pub departure_boarding_activity: Option<DepartureBoardingActivity>,
}

impl EstimatedCall {
    /// The departure instant used to decide whether the call is still ahead:
    /// expected when present, aimed otherwise.
    pub fn effective_departure_time(&self) -> Option<DateTime<Utc>> {
        self.expected_departure_time.or(self.aimed_departure_time)
    }
}
