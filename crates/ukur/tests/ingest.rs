// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for Anshar ingestion, against a wiremock upstream.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use siri::{EstimatedVehicleJourney, FeedKind};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ukur::anshar::poll::run_poll_chain;
use ukur::anshar::subscribe::{check_liveness, renew_subscriptions, LIVENESS_THRESHOLD_MS};
use ukur::anshar::queue::spawn_consumers;
use ukur::cluster::{InMemorySharedMap, SharedMap};
use ukur::config::UkurConfig;
use ukur::error::ErrorKind;
use ukur::notify::{LogSxHandler, Notifier};
use ukur::state::{epoch_ms, last_received_key, FeedReceivers, UkurState};
use ukur::subscription::{InMemorySubscriptionIndex, Subscription, SubscriptionIndex};

fn config_for(upstream: &MockServer) -> UkurConfig {
    UkurConfig {
        host: "127.0.0.1".into(),
        port: 0,
        polling_interval_ms: 60_000,
        et_enabled: true,
        sx_enabled: true,
        use_subscription: false,
        polling_et_url: format!("{}/et", upstream.uri()),
        polling_sx_url: format!("{}/sx", upstream.uri()),
        subscription_url: format!("{}/subscribe", upstream.uri()),
        own_base_url: "http://ukur.example.net".into(),
        tiamat_enabled: false,
        tiamat_url: String::new(),
        tiamat_interval_ms: 3_600_000,
        operator: "NSB".into(),
        store_messages_to_file: false,
        archive_dir: "ukur-messages".into(),
    }
}

fn state_for(config: UkurConfig) -> (Arc<UkurState>, FeedReceivers) {
    let map: Arc<dyn SharedMap> = Arc::new(InMemorySharedMap::default());
    UkurState::with_defaults(config, map, CancellationToken::new())
}

fn page(more_data: bool, line: &str) -> String {
    format!(
        r#"<Siri xmlns="http://www.siri.org.uk/siri">
  <ServiceDelivery>
    <MoreData>{more_data}</MoreData>
    <EstimatedTimetableDelivery>
      <EstimatedVehicleJourney>
        <LineRef>{line}</LineRef>
        <OperatorRef>NSB</OperatorRef>
      </EstimatedVehicleJourney>
    </EstimatedTimetableDelivery>
  </ServiceDelivery>
</Siri>"#
    )
}

// -- Polling mode -------------------------------------------------------------

#[tokio::test]
async fn poll_follows_the_more_data_chain() {
    let upstream = MockServer::start().await;
    let (state, mut receivers) = state_for(config_for(&upstream));

    // First page says there is more; the chain re-polls immediately and
    // stops at the second page.
    Mock::given(method("GET"))
        .and(path("/et"))
        .and(query_param("requestorId", state.requestor_id.as_str()))
        .and(header("ET-Client-Name", "Ukur"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(true, "NSB:Line:L1")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/et"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(false, "NSB:Line:L2")))
        .expect(1)
        .mount(&upstream)
        .await;

    run_poll_chain(Arc::clone(&state), FeedKind::Et).await;

    assert_eq!(state.metrics.snapshot().polls, 2);
    let first = receivers.et.try_recv().expect("first page element");
    let second = receivers.et.try_recv().expect("second page element");
    assert!(first.contains("NSB:Line:L1"));
    assert!(second.contains("NSB:Line:L2"));
    assert!(receivers.et.try_recv().is_err());
}

#[tokio::test]
async fn failed_poll_abandons_the_chain() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/et"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&upstream)
        .await;

    let (state, mut receivers) = state_for(config_for(&upstream));
    run_poll_chain(Arc::clone(&state), FeedKind::Et).await;

    assert_eq!(state.metrics.error_count(ErrorKind::UpstreamUnavailable), 1);
    assert!(receivers.et.try_recv().is_err());
}

#[tokio::test]
async fn malformed_poll_body_is_counted_and_dropped() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/et"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<Siri><Broken"))
        .expect(1)
        .mount(&upstream)
        .await;

    let (state, _receivers) = state_for(config_for(&upstream));
    run_poll_chain(Arc::clone(&state), FeedKind::Et).await;

    assert_eq!(state.metrics.error_count(ErrorKind::MalformedPayload), 1);
}

// -- Subscription mode --------------------------------------------------------

#[tokio::test]
async fn renew_posts_one_request_per_enabled_kind() {
    let upstream = MockServer::start().await;
    let (state, _receivers) = state_for(config_for(&upstream));

    Mock::given(method("POST"))
        .and(path("/subscribe"))
        .and(body_string_contains("EstimatedTimetableSubscriptionRequest"))
        .and(body_string_contains(format!("{}-ET", state.requestor_id)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/subscribe"))
        .and(body_string_contains("SituationExchangeSubscriptionRequest"))
        .and(body_string_contains(format!("{}-SX", state.requestor_id)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;

    renew_subscriptions(&state).await;
    assert_eq!(state.metrics.snapshot().renewals, 2);
}

#[tokio::test]
async fn rejected_renewals_are_logged_and_survived() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscribe"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&upstream)
        .await;

    let (state, _receivers) = state_for(config_for(&upstream));
    renew_subscriptions(&state).await;

    // Both kinds were attempted despite the failures.
    assert_eq!(state.metrics.error_count(ErrorKind::UpstreamUnavailable), 2);
    assert_eq!(state.metrics.snapshot().renewals, 0);
}

#[tokio::test]
async fn checker_renews_after_liveness_lapse() {
    let upstream = MockServer::start().await;
    let mut config = config_for(&upstream);
    config.use_subscription = true;
    config.sx_enabled = false;
    let (state, _receivers) = state_for(config);

    Mock::given(method("POST"))
        .and(path("/subscribe"))
        .and(body_string_contains("EstimatedTimetableSubscriptionRequest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;

    // Last ET push three heartbeats and change ago.
    state.shared_map.set(
        &last_received_key(FeedKind::Et),
        (epoch_ms() - LIVENESS_THRESHOLD_MS - 1).to_string(),
    );

    check_liveness(&state).await;
    assert_eq!(state.metrics.snapshot().renewals, 1);
}

#[tokio::test]
async fn checker_leaves_live_subscriptions_alone() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscribe"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let mut config = config_for(&upstream);
    config.use_subscription = true;
    let (state, _receivers) = state_for(config);

    // ET pushed recently; SX never pushed at all. Neither renews.
    state.touch_last_received(FeedKind::Et);
    check_liveness(&state).await;

    assert_eq!(state.metrics.snapshot().renewals, 0);
}

// -- End to end ---------------------------------------------------------------

#[derive(Default)]
struct RecordingNotifier {
    on_stops: Mutex<Vec<Vec<String>>>,
}

impl RecordingNotifier {
    fn deliveries(&self) -> Vec<Vec<String>> {
        self.on_stops.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_on_stops(
        &self,
        subscriptions: &[Arc<Subscription>],
        _journey: &EstimatedVehicleJourney,
    ) -> anyhow::Result<()> {
        if let Ok(mut deliveries) = self.on_stops.lock() {
            deliveries.push(subscriptions.iter().map(|s| s.id.clone()).collect());
        }
        Ok(())
    }

    fn notify_full_message(
        &self,
        _subscriptions: &[Arc<Subscription>],
        _journey: &EstimatedVehicleJourney,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A poll whose payload delays a subscribed journey ends in a notification.
#[tokio::test]
async fn polled_delay_reaches_the_notifier() {
    let upstream = MockServer::start().await;

    let aimed = chrono::Utc::now() + chrono::Duration::minutes(30);
    let expected = aimed + chrono::Duration::minutes(5);
    let arrival = aimed + chrono::Duration::minutes(20);
    let body = format!(
        r#"<Siri xmlns="http://www.siri.org.uk/siri">
  <ServiceDelivery>
    <MoreData>false</MoreData>
    <EstimatedTimetableDelivery>
      <EstimatedVehicleJourney>
        <LineRef>NSB:Line:L1</LineRef>
        <DatedVehicleJourneyRef>2202:2026-08-01</DatedVehicleJourneyRef>
        <OperatorRef>NSB</OperatorRef>
        <EstimatedCalls>
          <EstimatedCall>
            <StopPointRef>NSR:StopPlace:1</StopPointRef>
            <AimedDepartureTime>{aimed}</AimedDepartureTime>
            <ExpectedDepartureTime>{expected}</ExpectedDepartureTime>
            <DepartureStatus>delayed</DepartureStatus>
            <DepartureBoardingActivity>boarding</DepartureBoardingActivity>
          </EstimatedCall>
          <EstimatedCall>
            <StopPointRef>NSR:StopPlace:2</StopPointRef>
            <AimedArrivalTime>{arrival}</AimedArrivalTime>
            <ExpectedArrivalTime>{arrival}</ExpectedArrivalTime>
            <AimedDepartureTime>{arrival}</AimedDepartureTime>
            <ArrivalBoardingActivity>alighting</ArrivalBoardingActivity>
          </EstimatedCall>
        </EstimatedCalls>
      </EstimatedVehicleJourney>
    </EstimatedTimetableDelivery>
  </ServiceDelivery>
</Siri>"#,
        aimed = aimed.to_rfc3339(),
        expected = expected.to_rfc3339(),
        arrival = arrival.to_rfc3339(),
    );
    Mock::given(method("GET"))
        .and(path("/et"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&upstream)
        .await;

    let subscriptions = Arc::new(InMemorySubscriptionIndex::default());
    subscriptions.add(Subscription {
        id: "commuter".to_owned(),
        from_stop_points: ["NSR:StopPlace:1".to_owned()].into_iter().collect(),
        to_stop_points: ["NSR:StopPlace:2".to_owned()].into_iter().collect(),
        ..Subscription::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let map: Arc<dyn SharedMap> = Arc::new(InMemorySharedMap::default());
    let (state, receivers) = UkurState::build(
        config_for(&upstream),
        map,
        CancellationToken::new(),
        Arc::clone(&subscriptions) as Arc<dyn SubscriptionIndex>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::new(LogSxHandler),
    );
    spawn_consumers(&state, receivers);

    run_poll_chain(Arc::clone(&state), FeedKind::Et).await;

    // The consumer runs on its own task; wait for the delivery.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if !notifier.deliveries().is_empty() {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "no notification within deadline");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(notifier.deliveries(), vec![vec!["commuter".to_owned()]]);
    assert!(state.live_journeys.get("2202:2026-08-01").is_some());
}
