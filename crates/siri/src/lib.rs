// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SIRI XML boundary: typed model, pull parsing, and request rendering.
//!
//! Only the slice of SIRI 2.0 this service consumes is modeled: Estimated
//! Timetable journeys, the `ServiceDelivery` paging envelope, and the
//! `SubscriptionRequest` document sent to the aggregator.

pub mod fragment;
pub mod model;
pub mod parse;
pub mod subscribe;

pub use model::{
    ArrivalBoardingActivity, CallStatus, DepartureBoardingActivity, EstimatedCall,
    EstimatedVehicleJourney, FeedKind, RecordedCall,
};

/// SIRI schema version spoken on both directions.
pub const SIRI_VERSION: &str = "2.0";
