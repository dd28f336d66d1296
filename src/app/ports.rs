//! Port traits: the hexagonal boundary between the sample loop and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SampleLoop (domain)
//! ```
//!
//! Driven adapters (sensor, display, transport, clock, event sinks)
//! implement these traits.  The [`SampleLoop`](super::controller::SampleLoop)
//! consumes them via generics, so the loop never touches hardware or
//! sockets directly and runs unchanged against the mocks in `tests/`.
//!
//! ## Failure contract
//!
//! - **SensorPort** failures are fatal to the loop.
//! - **DisplayPort** failures are never fatal; the presenter reports them.
//! - **TransportPort::connect** failures are fatal; publish/wait failures
//!   are folded into a [`DeliveryOutcome`](super::publisher::DeliveryOutcome).

use core::fmt;
use core::time::Duration;

use crate::config::QoS;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the loop calls this once per iteration.
pub trait SensorPort {
    /// Acquire one raw sample in the sensor's native unit.
    fn acquire(&mut self) -> Result<f32, AcquisitionError>;

    /// Release the underlying device.  Called exactly once at shutdown.
    fn close(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → two-line text display)
// ───────────────────────────────────────────────────────────────

/// A two-line character display with an RGB backlight.
///
/// Each call is independently fallible; callers must not assume that a
/// frame is applied atomically.
pub trait DisplayPort {
    /// Move the write cursor to `row`, `col` (zero-based).
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError>;

    /// Write text at the current cursor position.
    fn write_text(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Set the backlight colour.
    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), DisplayError>;

    /// Release the display.  Called exactly once at shutdown.
    fn close(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ publish/subscribe broker)
// ───────────────────────────────────────────────────────────────

/// Session parameters for [`TransportPort::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub client_id: String,
    pub keep_alive_secs: u16,
    pub clean_session: bool,
    pub connect_timeout: Duration,
}

/// Opaque handle identifying one in-flight publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeliveryToken(pub u16);

impl fmt::Display for DeliveryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publish/subscribe client session.
pub trait TransportPort {
    /// Open the session.  Blocks until the broker accepts or refuses it.
    fn connect(&mut self, options: &ConnectOptions) -> Result<(), TransportError>;

    /// Hand `payload` to the transport.  Returns as soon as the message is
    /// written; completion is awaited separately.
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
    ) -> Result<DeliveryToken, TransportError>;

    /// Block until `token` is acknowledged or `timeout` elapses
    /// ([`TransportError::Timeout`]).
    fn wait_for_completion(
        &mut self,
        token: DeliveryToken,
        timeout: Duration,
    ) -> Result<(), TransportError>;

    /// Close the session, waiting at most `grace` for outstanding
    /// acknowledgments.
    fn disconnect(&mut self, grace: Duration);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for message timestamps.
pub trait ClockPort {
    /// Whole seconds since the Unix epoch.
    fn epoch_secs(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The loop emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Borrowed adapters
// ───────────────────────────────────────────────────────────────
//
// The loop takes its ports by value.  Lending `&mut adapter` instead
// lets the caller inspect the adapter once the loop has released it.

impl<P: SensorPort + ?Sized> SensorPort for &mut P {
    fn acquire(&mut self) -> Result<f32, AcquisitionError> {
        (**self).acquire()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

impl<P: DisplayPort + ?Sized> DisplayPort for &mut P {
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        (**self).set_cursor(row, col)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).write_text(text)
    }

    fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), DisplayError> {
        (**self).set_color(r, g, b)
    }

    fn close(&mut self) {
        (**self).close();
    }
}

impl<P: TransportPort + ?Sized> TransportPort for &mut P {
    fn connect(&mut self, options: &ConnectOptions) -> Result<(), TransportError> {
        (**self).connect(options)
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
    ) -> Result<DeliveryToken, TransportError> {
        (**self).publish(topic, payload, qos)
    }

    fn wait_for_completion(
        &mut self,
        token: DeliveryToken,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        (**self).wait_for_completion(token, timeout)
    }

    fn disconnect(&mut self, grace: Duration) {
        (**self).disconnect(grace);
    }
}

impl<P: ClockPort + ?Sized> ClockPort for &P {
    fn epoch_secs(&self) -> u64 {
        (**self).epoch_secs()
    }
}

impl<P: EventSink + ?Sized> EventSink for &mut P {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SensorPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The device could not be opened.
    Unavailable,
    /// The bus or file read failed.
    ReadFailed,
    /// The raw value could not be parsed.
    Malformed,
    /// The reading is outside the physically plausible range.
    OutOfRange,
}

/// Errors from [`DisplayPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The display controller could not be opened or initialised.
    Unavailable,
    /// An I2C write to the display failed.
    Bus,
    /// Cursor position outside the display geometry.
    OutOfBounds,
}

/// Errors from [`TransportPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Broker address is not of the form `tcp://host:port`.
    InvalidAddress,
    /// Socket-level failure.
    Io(std::io::ErrorKind),
    /// The broker answered CONNECT with a non-zero return code.
    Refused(u8),
    /// The client rejected the request or the session failed.
    Protocol(&'static str),
    /// Operation requires an open session.
    NotConnected,
    /// The bounded wait elapsed.
    Timeout,
}

impl TransportError {
    /// Numeric diagnostic code, paho-style (negative for client-side failures).
    pub fn code(&self) -> i32 {
        match self {
            Self::Io(_) => -1,
            Self::InvalidAddress => -2,
            Self::NotConnected => -3,
            Self::Protocol(_) => -4,
            Self::Timeout => -5,
            Self::Refused(rc) => i32::from(*rc),
        }
    }
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "sensor unavailable"),
            Self::ReadFailed => write!(f, "sensor read failed"),
            Self::Malformed => write!(f, "malformed sensor value"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "display unavailable"),
            Self::Bus => write!(f, "display bus write failed"),
            Self::OutOfBounds => write!(f, "cursor out of bounds"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress => write!(f, "invalid broker address"),
            Self::Io(kind) => write!(f, "socket error: {kind}"),
            Self::Refused(rc) => write!(f, "connection refused, return code {rc}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::NotConnected => write!(f, "not connected"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

impl std::error::Error for AcquisitionError {}
impl std::error::Error for DisplayError {}
impl std::error::Error for TransportError {}
