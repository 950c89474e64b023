// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering of the outbound `SubscriptionRequest` document.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::FeedKind;
use crate::SIRI_VERSION;

/// One subscription request towards the aggregator.
///
/// The subscription identifier is stable across renewals
/// (`<requestorRef>-<KIND>`), so a repeated request re-establishes the same
/// subscription rather than creating a new one.
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    pub kind: FeedKind,
    pub requestor_ref: String,
    pub message_identifier: String,
    pub consumer_address: String,
    pub timestamp: DateTime<Utc>,
    pub heartbeat_interval_ms: u64,
    pub initial_termination_time: DateTime<Utc>,
}

impl SubscriptionRequest {
    /// Identifier the aggregator keys this subscription on.
    pub fn subscription_identifier(&self) -> String {
        format!("{}-{}", self.requestor_ref, self.kind.code())
    }

    pub fn to_xml(&self) -> String {
        let (subscription_element, request_element) = match self.kind {
            FeedKind::Et => ("EstimatedTimetableSubscriptionRequest", "EstimatedTimetableRequest"),
            FeedKind::Sx => ("SituationExchangeSubscriptionRequest", "SituationExchangeRequest"),
        };
        let timestamp = rfc3339(self.timestamp);
        let termination = rfc3339(self.initial_termination_time);
        let heartbeat = iso_duration_secs(self.heartbeat_interval_ms);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Siri version="{version}" xmlns="http://www.siri.org.uk/siri">
  <SubscriptionRequest>
    <RequestTimestamp>{timestamp}</RequestTimestamp>
    <RequestorRef>{requestor}</RequestorRef>
    <MessageIdentifier>{message}</MessageIdentifier>
    <ConsumerAddress>{consumer}</ConsumerAddress>
    <SubscriptionContext>
      <HeartbeatInterval>{heartbeat}</HeartbeatInterval>
    </SubscriptionContext>
    <{subscription_element}>
      <SubscriberRef>{requestor}</SubscriberRef>
      <SubscriptionIdentifier>{identifier}</SubscriptionIdentifier>
      <InitialTerminationTime>{termination}</InitialTerminationTime>
      <{request_element} version="{version}">
        <RequestTimestamp>{timestamp}</RequestTimestamp>
      </{request_element}>
    </{subscription_element}>
  </SubscriptionRequest>
</Siri>
"#,
            version = SIRI_VERSION,
            requestor = self.requestor_ref,
            message = self.message_identifier,
            consumer = self.consumer_address,
            identifier = self.subscription_identifier(),
        )
    }
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a millisecond interval as an ISO-8601 duration (`PT60S`).
fn iso_duration_secs(ms: u64) -> String {
    format!("PT{}S", ms / 1000)
}
