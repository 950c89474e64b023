// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull parsing of inbound SIRI documents.
//!
//! Element matching is on local names so prefixed and default-namespace
//! documents parse the same.

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::model::{
    ArrivalBoardingActivity, CallStatus, DepartureBoardingActivity, EstimatedCall,
    EstimatedVehicleJourney, RecordedCall,
};

fn local(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.local_name().as_ref()).into_owned()
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text).ok().map(|t| t.with_timezone(&Utc))
}

fn parse_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}

/// Read `/Siri/ServiceDelivery/MoreData` from a delivery envelope.
///
/// Absent element means no further pages.
pub fn more_data(xml: &str) -> anyhow::Result<bool> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).context("malformed SIRI envelope")? {
            Event::Start(ref e) => stack.push(local(e.name())),
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(ref e) => {
                if stack.ends_with(
                    &["Siri".to_owned(), "ServiceDelivery".to_owned(), "MoreData".to_owned()],
                ) {
                    let text = e.unescape().context("malformed SIRI envelope")?;
                    return Ok(parse_bool(text.trim()));
                }
            }
            Event::Eof => return Ok(false),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse one `EstimatedVehicleJourney` fragment into the typed model.
pub fn estimated_vehicle_journey(xml: &str) -> anyhow::Result<EstimatedVehicleJourney> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();

    let mut journey = EstimatedVehicleJourney::default();
    let mut seen_root = false;
    let mut recorded: Option<RecordedCall> = None;
    let mut estimated: Option<EstimatedCall> = None;

    loop {
        match reader.read_event_into(&mut buf).context("malformed EstimatedVehicleJourney")? {
            Event::Start(ref e) => {
                let name = local(e.name());
                match name.as_str() {
                    "EstimatedVehicleJourney" => seen_root = true,
                    "RecordedCall" => recorded = Some(RecordedCall::default()),
                    "EstimatedCall" => estimated = Some(EstimatedCall::default()),
                    _ => {}
                }
                stack.push(name);
            }
            Event::End(ref e) => {
                match local(e.name()).as_str() {
                    "RecordedCall" => {
                        if let Some(call) = recorded.take() {
                            journey.recorded_calls.push(call);
                        }
                    }
                    "EstimatedCall" => {
                        if let Some(call) = estimated.take() {
                            journey.estimated_calls.push(call);
                        }
                    }
                    _ => {}
                }
                stack.pop();
            }
            Event::Text(ref e) => {
                let raw = e.unescape().context("malformed EstimatedVehicleJourney")?;
                let text = raw.trim();
                if text.is_empty() || stack.len() < 2 {
                    buf.clear();
                    continue;
                }
                let field = stack[stack.len() - 1].clone();
                let parent = stack[stack.len() - 2].clone();
                if let Some(call) = estimated.as_mut() {
                    if parent == "EstimatedCall" {
                        apply_estimated_field(call, &field, text);
                    }
                } else if let Some(call) = recorded.as_mut() {
                    if parent == "RecordedCall" {
                        apply_recorded_field(call, &field, text);
                    }
                } else {
                    apply_journey_field(&mut journey, &parent, &field, text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(anyhow!("missing EstimatedVehicleJourney element"));
    }
    Ok(journey)
}

fn apply_journey_field(journey: &mut EstimatedVehicleJourney, parent: &str, field: &str, text: &str) {
    // DatedVehicleJourneyRef may sit directly on the journey or inside
    // a FramedVehicleJourneyRef wrapper.
    if field == "DatedVehicleJourneyRef"
        && (parent == "EstimatedVehicleJourney" || parent == "FramedVehicleJourneyRef")
    {
        journey.dated_vehicle_journey_ref = Some(text.to_owned());
        return;
    }
    if parent != "EstimatedVehicleJourney" {
        return;
    }
    match field {
        "LineRef" => journey.line_ref = Some(text.to_owned()),
        "DirectionRef" => journey.direction_ref = Some(text.to_owned()),
        "VehicleRef" => journey.vehicle_ref = Some(text.to_owned()),
        "OperatorRef" => journey.operator_ref = Some(text.to_owned()),
        "ServiceFeatureRef" => journey.service_feature_refs.push(text.to_owned()),
        "Cancellation" => journey.cancellation = parse_bool(text),
        _ => {}
    }
}

fn apply_recorded_field(call: &mut RecordedCall, field: &str, text: &str) {
    match field {
        "StopPointRef" => call.stop_point_ref = Some(text.to_owned()),
        "AimedDepartureTime" => call.aimed_departure_time = parse_time(text),
        _ => {}
    }
}

fn apply_estimated_field(call: &mut EstimatedCall, field: &str, text: &str) {
    match field {
        "StopPointRef" => call.stop_point_ref = Some(text.to_owned()),
        "Cancellation" => call.cancellation = parse_bool(text),
        "AimedArrivalTime" => call.aimed_arrival_time = parse_time(text),
        "ExpectedArrivalTime" => call.expected_arrival_time = parse_time(text),
        "ArrivalStatus" => call.arrival_status = CallStatus::parse(text),
        "ArrivalBoardingActivity" => {
            call.arrival_boarding_activity = ArrivalBoardingActivity::parse(text)
        }
        "AimedDepartureTime" => call.aimed_departure_time = parse_time(text),
        "ExpectedDepartureTime" => call.expected_departure_time = parse_time(text),
        "DepartureStatus" => call.departure_status = CallStatus::parse(text),
        "DepartureBoardingActivity" => {
            call.departure_boarding_activity = DepartureBoardingActivity::parse(text)
        }
        _ => {}
    }
}
