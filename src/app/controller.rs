//! Sample loop controller: the only long-lived, stateful component.
//!
//! ```text
//!  Connecting ──▶ Running ──▶ Draining ──▶ Stopped
//!      │             │
//!      └── fatal ────┴──────────────────────▶ (release, Err)
//! ```
//!
//! [`SampleLoop::start`] acquires the transport session, the display and
//! the sensor in that order; [`SampleLoop::run`] iterates until the
//! [`ShutdownSignal`] is observed and then releases them in reverse.  Every
//! exit path, fatal or not, goes through the same release sequence.

use core::fmt;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::TelemetryConfig;
use crate::error::{Error, Result};
use crate::shutdown::ShutdownSignal;

use super::convert::UnitConverter;
use super::events::AppEvent;
use super::message;
use super::ports::{
    AcquisitionError, ClockPort, ConnectOptions, DisplayError, DisplayPort, EventSink,
    SensorPort, TransportPort,
};
use super::presenter::{present, render};
use super::publisher::{DeliveryOutcome, Publisher};

/// Lifecycle of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    Connecting,
    Running,
    Draining,
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Per-run counters, reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub samples: u64,
    pub delivered: u64,
    pub timed_out: u64,
    pub transport_errors: u64,
    pub display_faults: u64,
    pub encode_failures: u64,
}

/// Owns every resource handle for the lifetime of the process.
pub struct SampleLoop<T, D, S, K> {
    converter: UnitConverter,
    publisher: Publisher<T>,
    display: D,
    sensor: S,
    clock: K,
    label: String,
    interval_ms: u32,
    disconnect_grace: Duration,
    state: LoopState,
    iteration: u64,
    stats: LoopStats,
}

impl<T, D, S, K> SampleLoop<T, D, S, K>
where
    T: TransportPort,
    D: DisplayPort,
    S: SensorPort,
    K: ClockPort,
{
    // ── Connecting ────────────────────────────────────────────

    /// Open the transport session, then the display, then the sensor.
    ///
    /// Any failure is fatal.  Whatever was already acquired is released
    /// before the error is returned.
    pub fn start<FD, FS>(
        config: &TelemetryConfig,
        mut transport: T,
        open_display: FD,
        open_sensor: FS,
        clock: K,
        sink: &mut impl EventSink,
    ) -> Result<Self>
    where
        FD: FnOnce() -> core::result::Result<D, DisplayError>,
        FS: FnOnce() -> core::result::Result<S, AcquisitionError>,
    {
        let options = ConnectOptions {
            client_id: config.client_id.clone(),
            keep_alive_secs: config.keep_alive_secs,
            clean_session: config.clean_session,
            connect_timeout: config.connect_timeout(),
        };
        let grace = config.disconnect_grace();

        info!(
            "Connecting to {} as '{}'",
            config.broker_address, config.client_id
        );
        if let Err(e) = transport.connect(&options) {
            return Err(fatal(sink, e.into()));
        }
        sink.emit(&AppEvent::Connected);

        let mut display = match open_display() {
            Ok(display) => display,
            Err(e) => {
                transport.disconnect(grace);
                return Err(fatal(sink, e.into()));
            }
        };

        let sensor = match open_sensor() {
            Ok(sensor) => sensor,
            Err(e) => {
                display.close();
                transport.disconnect(grace);
                return Err(fatal(sink, e.into()));
            }
        };

        Ok(Self {
            converter: UnitConverter::new(config.scale_factor),
            publisher: Publisher::new(
                transport,
                config.topic.as_str(),
                config.qos,
                config.publish_timeout(),
            ),
            display,
            sensor,
            clock,
            label: config.sensor_label.clone(),
            interval_ms: config.sample_interval_ms,
            disconnect_grace: grace,
            state: LoopState::Connecting,
            iteration: 0,
            stats: LoopStats::default(),
        })
    }

    // ── Running ───────────────────────────────────────────────

    /// Iterate until `shutdown` is observed or a sample cannot be
    /// acquired, then drain and release everything.
    ///
    /// The flag is checked only between iterations, so an iteration that
    /// has started always completes, publish included.
    pub fn run(
        mut self,
        shutdown: &ShutdownSignal,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<LoopStats> {
        self.transition(LoopState::Running, sink);

        let outcome = loop {
            if shutdown.is_requested() {
                break Ok(());
            }
            if let Err(e) = self.step(sink) {
                sink.emit(&AppEvent::Fatal(e));
                break Err(e);
            }
            delay.delay_ms(self.interval_ms);
        };

        // Iterations are synchronous end to end; nothing is left to drain.
        self.transition(LoopState::Draining, sink);
        let stats = self.release(sink);
        outcome.map(|()| stats)
    }

    /// One sample → render → publish pass, without the trailing delay.
    ///
    /// Only a failed acquisition is returned as an error; display, encode
    /// and delivery failures are reported through `sink` and swallowed.
    pub fn step(&mut self, sink: &mut impl EventSink) -> Result<()> {
        let raw = self.sensor.acquire()?;
        let reading = self.converter.convert(raw);

        let iteration = self.iteration;
        self.iteration = self.iteration.wrapping_add(1);
        self.stats.samples += 1;
        sink.emit(&AppEvent::Sampled { iteration, reading });

        let frame = present(&reading, iteration);
        if let Err(fault) = render(&frame, &mut self.display) {
            self.stats.display_faults += 1;
            sink.emit(&AppEvent::DisplayFault(fault));
        }

        let payload = match message::encode(&self.label, reading.celsius, self.clock.epoch_secs())
        {
            Ok(payload) => payload,
            Err(e) => {
                debug!("encode failed: {e}");
                self.stats.encode_failures += 1;
                sink.emit(&AppEvent::EncodeFailed);
                return Ok(());
            }
        };

        let outcome = self.publisher.publish(&payload);
        match outcome {
            DeliveryOutcome::Delivered(_) => self.stats.delivered += 1,
            DeliveryOutcome::TimedOut(_) => self.stats.timed_out += 1,
            DeliveryOutcome::TransportError(_) => self.stats.transport_errors += 1,
        }
        sink.emit(&AppEvent::Published(outcome));
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Index the next sample will be presented with.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    // ── Internal ──────────────────────────────────────────────

    /// Release in reverse order of acquisition: sensor, display, transport.
    fn release(&mut self, sink: &mut impl EventSink) -> LoopStats {
        self.sensor.close();
        self.display.close();
        self.publisher
            .transport_mut()
            .disconnect(self.disconnect_grace);
        self.transition(LoopState::Stopped, sink);
        sink.emit(&AppEvent::Stopped(self.stats));
        self.stats
    }

    fn transition(&mut self, to: LoopState, sink: &mut impl EventSink) {
        let from = self.state;
        if from != to {
            self.state = to;
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }
}

fn fatal(sink: &mut impl EventSink, error: Error) -> Error {
    sink.emit(&AppEvent::Fatal(error));
    error
}
