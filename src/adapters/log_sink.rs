//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every [`AppEvent`] through the
//! `log` facade (stderr via `env_logger` in the binary).  Per-iteration
//! faults log at `warn`; only fatal errors log at `error`.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::publisher::DeliveryOutcome;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Connected => info!("BROKER | connected"),
            AppEvent::StateChanged { from, to } => info!("STATE | {} -> {}", from, to),
            AppEvent::Sampled { iteration, reading } => info!(
                "SAMPLE #{} | {} degrees Celsius, or {} degrees Fahrenheit",
                iteration,
                reading.celsius_whole(),
                reading.fahrenheit
            ),
            AppEvent::DisplayFault(fault) => {
                warn!("LCD | write failed at {}: {}", fault.stage, fault.error);
            }
            AppEvent::EncodeFailed => warn!("PUBLISH | payload encoding failed, skipped"),
            AppEvent::Published(outcome) => match outcome {
                DeliveryOutcome::Delivered(token) => {
                    info!("PUBLISH | Message with delivery token {} delivered", token);
                }
                DeliveryOutcome::TimedOut(token) => {
                    warn!("PUBLISH | delivery token {} not confirmed in time", token);
                }
                DeliveryOutcome::TransportError(e) => {
                    warn!("PUBLISH | failed, return code {}: {}", e.code(), e);
                }
            },
            AppEvent::Fatal(e) => error!("FATAL | {}", e),
            AppEvent::Stopped(stats) => info!(
                "STOP | samples={} delivered={} timed_out={} transport_errors={} \
                 display_faults={} encode_failures={}",
                stats.samples,
                stats.delivered,
                stats.timed_out,
                stats.transport_errors,
                stats.display_faults,
                stats.encode_failures,
            ),
        }
    }
}
