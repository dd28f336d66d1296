//! Integration tests: SampleLoop end to end against mock adapters.
//!
//! Each test drives `start` + `run` with a [`ScriptedDelay`] that raises
//! the shutdown signal during a chosen inter-sample delay, so the number
//! of iterations is deterministic.

use std::time::Duration;

use thermolink::Error;
use thermolink::app::controller::{LoopState, SampleLoop};
use thermolink::app::events::AppEvent;
use thermolink::app::ports::{AcquisitionError, DeliveryToken, DisplayError, TransportError};
use thermolink::app::presenter::PALETTE;
use thermolink::app::publisher::DeliveryOutcome;
use thermolink::config::{QoS, TelemetryConfig};
use thermolink::shutdown::ShutdownSignal;

use crate::mock_hw::{
    DisplayCall, FixedClock, MockDisplay, MockSensor, MockTransport, RecordingSink,
    ScriptedDelay, TransportCall,
};

const EPOCH: u64 = 1_700_000_000;

type Loop<'a> = SampleLoop<&'a mut MockTransport, &'a mut MockDisplay, &'a mut MockSensor, FixedClock>;

fn start<'a>(
    transport: &'a mut MockTransport,
    display: &'a mut MockDisplay,
    sensor: &'a mut MockSensor,
    sink: &mut RecordingSink,
) -> Loop<'a> {
    SampleLoop::start(
        &TelemetryConfig::default(),
        transport,
        move || Ok(display),
        move || Ok(sensor),
        FixedClock(EPOCH),
        sink,
    )
    .unwrap()
}

/// Run the loop until shutdown is raised during the `stop_on`-th delay.
fn run_until(
    transport: &mut MockTransport,
    display: &mut MockDisplay,
    sensor: &mut MockSensor,
    sink: &mut RecordingSink,
    stop_on: usize,
) -> (thermolink::Result<thermolink::app::controller::LoopStats>, ScriptedDelay) {
    let shutdown = ShutdownSignal::new();
    let mut delay = ScriptedDelay::stop_during(&shutdown, stop_on);
    let sample_loop = start(transport, display, sensor, sink);
    let result = sample_loop.run(&shutdown, &mut delay, sink);
    (result, delay)
}

// ── Reference sample ──────────────────────────────────────────

#[test]
fn reference_sample_renders_and_publishes() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let (result, _) = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 1);
    let stats = result.unwrap();
    assert_eq!(stats.samples, 1);
    assert_eq!(stats.delivered, 1);

    assert_eq!(
        display.calls,
        vec![
            DisplayCall::Cursor(0, 0),
            DisplayCall::Text("Temperature: ".into()),
            DisplayCall::Cursor(1, 0),
            DisplayCall::Text("F: 53 & C: 12".into()),
            DisplayCall::Color(0xd1, 0x00, 0x00),
        ]
    );

    let publish = transport
        .calls
        .iter()
        .find(|c| matches!(c, TransportCall::Publish { .. }))
        .unwrap();
    assert_eq!(
        publish,
        &TransportCall::Publish {
            topic: "sensors/temperature/data".into(),
            payload: br#"{"sensor_id":"temperature","value":"12","timestamp":"1700000000"}"#
                .to_vec(),
            qos: QoS::AtLeastOnce,
        }
    );
}

#[test]
fn sampled_event_carries_both_units() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    run_until(&mut transport, &mut display, &mut sensor, &mut sink, 1)
        .0
        .unwrap();

    let reading = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Sampled { iteration: 0, reading } => Some(*reading),
            _ => None,
        })
        .unwrap();
    assert_eq!(reading.celsius_whole(), 12);
    assert_eq!(reading.fahrenheit, 53);
}

// ── Palette ───────────────────────────────────────────────────

#[test]
fn palette_cycles_over_seven_samples() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    run_until(&mut transport, &mut display, &mut sensor, &mut sink, 8)
        .0
        .unwrap();

    let colors = display.colors();
    assert_eq!(colors.len(), 8);
    assert_eq!(&colors[..7], &PALETTE[..]);
    assert_eq!(colors[7], colors[0]);
}

// ── Delivery ──────────────────────────────────────────────────

#[test]
fn delivered_publish_proceeds_to_delay() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(30.0);
    let mut sink = RecordingSink::new();

    let (result, delay) = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 3);
    let stats = result.unwrap();

    assert_eq!(stats.delivered, 3);
    assert_eq!(delay.delays_ms, vec![1000, 1000, 1000]);
    assert!(sink.outcomes().iter().all(DeliveryOutcome::is_delivered));
    assert!(transport.calls.iter().any(|c| matches!(
        c,
        TransportCall::Wait { timeout, .. } if *timeout == Duration::from_secs(10)
    )));
}

#[test]
fn timeout_is_reported_without_retry() {
    let mut transport = MockTransport::new();
    transport.wait_results.push_back(Err(TransportError::Timeout));
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let (result, delay) = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 2);
    let stats = result.unwrap();

    assert_eq!(stats.samples, 2);
    assert_eq!(stats.timed_out, 1);
    assert_eq!(stats.delivered, 1);
    assert_eq!(transport.payloads().len(), 2, "one publish per iteration");
    assert_eq!(delay.delays_ms.len(), 2);
    assert_eq!(
        sink.outcomes(),
        vec![
            DeliveryOutcome::TimedOut(DeliveryToken(1)),
            DeliveryOutcome::Delivered(DeliveryToken(2)),
        ]
    );
}

#[test]
fn rejected_publish_is_not_fatal() {
    let mut transport = MockTransport::new();
    transport.publish_error = Some(TransportError::NotConnected);
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let stats = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 2)
        .0
        .unwrap();

    assert_eq!(stats.transport_errors, 2);
    assert!(
        !transport
            .calls
            .iter()
            .any(|c| matches!(c, TransportCall::Wait { .. })),
        "nothing to wait for after a rejected publish"
    );
}

#[test]
fn wait_failure_other_than_timeout_is_transport_error() {
    let mut transport = MockTransport::new();
    transport
        .wait_results
        .push_back(Err(TransportError::Protocol("unexpected packet")));
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let stats = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 1)
        .0
        .unwrap();

    assert_eq!(stats.transport_errors, 1);
    assert_eq!(
        sink.outcomes(),
        vec![DeliveryOutcome::TransportError(TransportError::Protocol(
            "unexpected packet"
        ))]
    );
}

// ── Display faults ────────────────────────────────────────────

#[test]
fn display_fault_does_not_stop_publishing() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    display.fail_with = Some(DisplayError::Bus);
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let stats = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 2)
        .0
        .unwrap();

    assert_eq!(stats.display_faults, 2);
    assert_eq!(stats.delivered, 2);
    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::DisplayFault(_)))
            .count(),
        2
    );
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_during_delay_completes_iteration_then_releases() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let (result, delay) = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 3);
    let stats = result.unwrap();

    assert_eq!(stats.samples, 3);
    assert_eq!(sensor.reads, 3);
    assert_eq!(transport.payloads().len(), 3);
    assert_eq!(delay.delays_ms.len(), 3);

    assert_eq!(sensor.closed, 1);
    assert_eq!(display.closed, 1);
    assert_eq!(
        transport.calls.last(),
        Some(&TransportCall::Disconnect(Duration::from_secs(10)))
    );
    assert_eq!(
        sink.states(),
        vec![LoopState::Running, LoopState::Draining, LoopState::Stopped]
    );
    assert!(matches!(sink.events.last(), Some(AppEvent::Stopped(s)) if *s == stats));
}

#[test]
fn repeated_shutdown_requests_stop_once() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let shutdown = ShutdownSignal::new();
    let mut delay = ScriptedDelay::stop_during(&shutdown, 2).repeated(5);
    let stats = start(&mut transport, &mut display, &mut sensor, &mut sink)
        .run(&shutdown, &mut delay, &mut sink)
        .unwrap();

    assert_eq!(delay.requests, vec![true, false, false, false, false]);
    assert_eq!(stats.samples, 2);
    assert_eq!(transport.payloads().len(), 2);
    assert_eq!(
        sink.states(),
        vec![LoopState::Running, LoopState::Draining, LoopState::Stopped]
    );
    let stopped = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Stopped(_)))
        .count();
    assert_eq!(stopped, 1);
    assert_eq!(transport.disconnects(), 1);
    assert_eq!(sensor.closed, 1);
    assert_eq!(display.closed, 1);
}

#[test]
fn shutdown_before_first_sample_releases_everything() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let shutdown = ShutdownSignal::new();
    shutdown.request();
    let mut delay = ScriptedDelay::stop_during(&shutdown, 1);
    let stats = start(&mut transport, &mut display, &mut sensor, &mut sink)
        .run(&shutdown, &mut delay, &mut sink)
        .unwrap();

    assert_eq!(stats.samples, 0);
    assert_eq!(sensor.reads, 0);
    assert!(delay.delays_ms.is_empty());
    assert_eq!(sensor.closed, 1);
    assert_eq!(display.closed, 1);
    assert_eq!(transport.disconnects(), 1);
}

#[test]
fn event_order_for_one_iteration() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    run_until(&mut transport, &mut display, &mut sensor, &mut sink, 1)
        .0
        .unwrap();

    let kinds: Vec<&str> = sink
        .events
        .iter()
        .map(|e| match e {
            AppEvent::Connected => "connected",
            AppEvent::StateChanged { .. } => "state",
            AppEvent::Sampled { .. } => "sampled",
            AppEvent::DisplayFault(_) => "display",
            AppEvent::EncodeFailed => "encode",
            AppEvent::Published(_) => "published",
            AppEvent::Fatal(_) => "fatal",
            AppEvent::Stopped(_) => "stopped",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["connected", "state", "sampled", "published", "state", "state", "stopped"]
    );
}

// ── Sensor failure ────────────────────────────────────────────

#[test]
fn sensor_failure_mid_loop_is_fatal_and_releases() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor =
        MockSensor::scripted([Ok(20.0), Err(AcquisitionError::ReadFailed)]);
    let mut sink = RecordingSink::new();

    let (result, delay) = run_until(&mut transport, &mut display, &mut sensor, &mut sink, 100);

    assert_eq!(
        result.unwrap_err(),
        Error::Sensor(AcquisitionError::ReadFailed)
    );
    assert_eq!(transport.payloads().len(), 1);
    assert_eq!(delay.delays_ms.len(), 1);
    assert_eq!(sink.fatal_count(), 1);
    assert_eq!(sensor.closed, 1);
    assert_eq!(display.closed, 1);
    assert_eq!(transport.disconnects(), 1);
    assert_eq!(sink.states().last(), Some(&LoopState::Stopped));
}

// ── Direct stepping ───────────────────────────────────────────

#[test]
fn step_advances_iteration_index() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sensor = MockSensor::steady(20.0);
    let mut sink = RecordingSink::new();

    let mut sample_loop = start(&mut transport, &mut display, &mut sensor, &mut sink);
    assert_eq!(sample_loop.state(), LoopState::Connecting);
    assert_eq!(sample_loop.iteration(), 0);

    sample_loop.step(&mut sink).unwrap();
    sample_loop.step(&mut sink).unwrap();

    assert_eq!(sample_loop.iteration(), 2);
    assert_eq!(sample_loop.stats().samples, 2);
}
