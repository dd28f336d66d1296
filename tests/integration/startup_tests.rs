//! Integration tests: resource acquisition order and cleanup on fatal
//! startup failures.

use std::time::Duration;

use thermolink::Error;
use thermolink::app::controller::SampleLoop;
use thermolink::app::ports::{AcquisitionError, ConnectOptions, DisplayError, TransportError};
use thermolink::config::TelemetryConfig;

use crate::mock_hw::{
    FixedClock, MockDisplay, MockSensor, MockTransport, RecordingSink, TransportCall,
};

#[test]
fn connect_uses_configured_session() {
    let mut transport = MockTransport::new();
    let mut sink = RecordingSink::new();

    let started = SampleLoop::start(
        &TelemetryConfig::default(),
        &mut transport,
        || Ok(MockDisplay::new()),
        || Ok(MockSensor::steady(0.0)),
        FixedClock(0),
        &mut sink,
    );
    assert!(started.is_ok());
    drop(started);

    assert_eq!(
        transport.calls,
        vec![TransportCall::Connect(ConnectOptions {
            client_id: "MQTTExample".into(),
            keep_alive_secs: 20,
            clean_session: true,
            connect_timeout: Duration::from_secs(30),
        })]
    );
}

#[test]
fn refused_connect_opens_nothing_else() {
    let mut transport = MockTransport::refusing(TransportError::Refused(5));
    let mut sink = RecordingSink::new();
    let mut display_opened = false;
    let mut sensor_opened = false;

    let result = SampleLoop::start(
        &TelemetryConfig::default(),
        &mut transport,
        || {
            display_opened = true;
            Ok(MockDisplay::new())
        },
        || {
            sensor_opened = true;
            Ok(MockSensor::steady(0.0))
        },
        FixedClock(0),
        &mut sink,
    );

    assert_eq!(
        result.err(),
        Some(Error::Transport(TransportError::Refused(5)))
    );
    assert!(!display_opened);
    assert!(!sensor_opened);
    assert_eq!(transport.disconnects(), 0);
    assert_eq!(sink.fatal_count(), 1);
}

#[test]
fn display_failure_disconnects_transport() {
    let mut transport = MockTransport::new();
    let mut sink = RecordingSink::new();
    let mut sensor_opened = false;

    let result = SampleLoop::start(
        &TelemetryConfig::default(),
        &mut transport,
        || Err::<MockDisplay, _>(DisplayError::Unavailable),
        || {
            sensor_opened = true;
            Ok(MockSensor::steady(0.0))
        },
        FixedClock(0),
        &mut sink,
    );

    assert_eq!(
        result.err(),
        Some(Error::Display(DisplayError::Unavailable))
    );
    assert!(!sensor_opened);
    assert_eq!(transport.disconnects(), 1);
    assert_eq!(sink.fatal_count(), 1);
}

#[test]
fn sensor_failure_closes_display_and_disconnects() {
    let mut transport = MockTransport::new();
    let mut display = MockDisplay::new();
    let mut sink = RecordingSink::new();
    let display_ref = &mut display;

    let result = SampleLoop::start(
        &TelemetryConfig::default(),
        &mut transport,
        move || Ok(display_ref),
        || Err::<MockSensor, _>(AcquisitionError::Unavailable),
        FixedClock(0),
        &mut sink,
    );

    assert_eq!(
        result.err(),
        Some(Error::Sensor(AcquisitionError::Unavailable))
    );
    assert_eq!(display.closed, 1);
    assert_eq!(transport.disconnects(), 1);
    assert_eq!(sink.fatal_count(), 1);
}
