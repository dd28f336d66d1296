//! Publisher: one publish plus one bounded wait, no retries.

use core::fmt;
use core::time::Duration;

use crate::config::QoS;

use super::ports::{DeliveryToken, TransportError, TransportPort};

/// Result of handing one payload to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The broker confirmed delivery within the timeout.
    Delivered(DeliveryToken),
    /// No confirmation arrived in time; the message may still be in flight.
    TimedOut(DeliveryToken),
    /// The transport rejected the publish or failed while waiting.
    TransportError(TransportError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered(token) => write!(f, "delivered (token {token})"),
            Self::TimedOut(token) => write!(f, "timed out (token {token})"),
            Self::TransportError(e) => write!(f, "transport error {}: {e}", e.code()),
        }
    }
}

/// Binds a transport to the fixed topic, QoS and delivery timeout.
pub struct Publisher<T> {
    transport: T,
    topic: String,
    qos: QoS,
    timeout: Duration,
}

impl<T: TransportPort> Publisher<T> {
    pub fn new(transport: T, topic: impl Into<String>, qos: QoS, timeout: Duration) -> Self {
        Self {
            transport,
            topic: topic.into(),
            qos,
            timeout,
        }
    }

    /// Publish `payload` and block up to the configured timeout for
    /// confirmation.  Never retries.
    pub fn publish(&mut self, payload: &[u8]) -> DeliveryOutcome {
        let token = match self.transport.publish(&self.topic, payload, self.qos) {
            Ok(token) => token,
            Err(e) => return DeliveryOutcome::TransportError(e),
        };
        match self.transport.wait_for_completion(token, self.timeout) {
            Ok(()) => DeliveryOutcome::Delivered(token),
            Err(TransportError::Timeout) => DeliveryOutcome::TimedOut(token),
            Err(e) => DeliveryOutcome::TransportError(e),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
