//! Outbound application events.
//!
//! The [`SampleLoop`](super::controller::SampleLoop) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, count them in a
//! test, etc.

use super::controller::{LoopState, LoopStats};
use super::convert::Reading;
use super::presenter::RenderFault;
use super::publisher::DeliveryOutcome;
use crate::error::Error;

/// Structured events emitted by the sample loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The transport session is open.
    Connected,

    /// The loop moved between lifecycle states.
    StateChanged { from: LoopState, to: LoopState },

    /// A sample was acquired and converted.
    Sampled { iteration: u64, reading: Reading },

    /// A display write failed; the frame is partially applied.
    DisplayFault(RenderFault),

    /// The payload could not be serialised; nothing was published.
    EncodeFailed,

    /// Outcome of the iteration's publish.
    Published(DeliveryOutcome),

    /// A fatal error ended the loop or its startup.
    Fatal(Error),

    /// All resources are released.
    Stopped(LoopStats),
}
