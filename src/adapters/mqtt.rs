//! MQTT client adapter.
//!
//! Implements [`TransportPort`] on `rumqttc`'s blocking [`Client`] /
//! [`Connection`] pair.  The connection's event loop is driven inline
//! from the calling thread: each port call polls it until the event it
//! needs arrives or its deadline passes.
//!
//! | Port call             | Polls until                                   |
//! |-----------------------|-----------------------------------------------|
//! | `connect`             | CONNACK                                       |
//! | `publish`             | the PUBLISH is written (packet id = token)    |
//! | `wait_for_completion` | PUBACK, or PUBCOMP for QoS 2                  |
//! | `disconnect`          | outstanding acks (bounded), then DISCONNECT   |
//!
//! A connection error drops the session; there is no reconnect.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, MqttOptions, Outgoing, Packet,
    RecvTimeoutError,
};

use crate::app::ports::{ConnectOptions, DeliveryToken, TransportError, TransportPort};
use crate::config::QoS;

/// Port used when the broker address does not name one.
pub const DEFAULT_PORT: u16 = 1883;

/// Unacknowledged QoS 1/2 publishes tracked at once.
const MAX_INFLIGHT: usize = 16;

/// Requests buffered between the client handle and its event loop.
const REQUEST_CAPACITY: usize = 10;

/// Bound on handing one request to the socket.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

// ───────────────────────────────────────────────────────────────
// Broker address
// ───────────────────────────────────────────────────────────────

/// `tcp://host:port`, `mqtt://host:port`, `host:port` or `host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl BrokerAddress {
    pub fn parse(address: &str) -> Result<Self, TransportError> {
        let rest = address
            .strip_prefix("tcp://")
            .or_else(|| address.strip_prefix("mqtt://"))
            .unwrap_or(address);
        if rest.contains("://") || rest.contains('/') {
            return Err(TransportError::InvalidAddress);
        }

        let (host, port) = if let Some(v6) = rest.strip_prefix('[') {
            let (host, tail) = v6.split_once(']').ok_or(TransportError::InvalidAddress)?;
            let port = match tail {
                "" => DEFAULT_PORT,
                t => parse_port(t.strip_prefix(':').ok_or(TransportError::InvalidAddress)?)?,
            };
            (host, port)
        } else {
            match rest.split_once(':') {
                Some((host, port)) => (host, parse_port(port)?),
                None => (rest, DEFAULT_PORT),
            }
        };

        if host.is_empty() {
            return Err(TransportError::InvalidAddress);
        }
        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }
}

fn parse_port(s: &str) -> Result<u16, TransportError> {
    s.parse().map_err(|_| TransportError::InvalidAddress)
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

struct Session {
    client: Client,
    connection: Connection,
}

/// Blocking single-session MQTT client.
pub struct MqttClient {
    address: BrokerAddress,
    session: Option<Session>,
    inflight: heapless::Vec<u16, MAX_INFLIGHT>,
}

impl MqttClient {
    pub fn new(address: BrokerAddress) -> Self {
        Self {
            address,
            session: None,
            inflight: heapless::Vec::new(),
        }
    }

    /// Parse `address` and build an unconnected client.
    pub fn from_address(address: &str) -> Result<Self, TransportError> {
        BrokerAddress::parse(address).map(Self::new)
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Publishes still waiting for their final acknowledgment.
    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }

    /// Advance the event loop by one event, waiting at most until `deadline`.
    fn poll(&mut self, deadline: Instant) -> Result<Event, TransportError> {
        let session = self.session.as_mut().ok_or(TransportError::NotConnected)?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(TransportError::Timeout);
        }
        match session.connection.recv_timeout(remaining) {
            Ok(Ok(event)) => Ok(event),
            Ok(Err(e)) => {
                warn!("MQTT session lost: {e}");
                self.drop_session();
                Err(connection_error(&e))
            }
            Err(RecvTimeoutError::Timeout) => Err(TransportError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                self.drop_session();
                Err(TransportError::NotConnected)
            }
        }
    }

    /// Retire in-flight publishes as their final acks arrive.
    fn track(&mut self, event: &Event) {
        match event {
            Event::Incoming(Packet::PubAck(ack)) => self.complete(ack.pkid),
            Event::Incoming(Packet::PubComp(comp)) => self.complete(comp.pkid),
            Event::Incoming(Packet::PubRec(rec)) => debug!("PUBREC for token {}", rec.pkid),
            _ => {}
        }
    }

    fn complete(&mut self, id: u16) {
        self.inflight.retain(|pending| *pending != id);
    }

    fn is_pending(&self, id: u16) -> bool {
        self.inflight.contains(&id)
    }

    fn drop_session(&mut self) {
        self.session = None;
    }
}

impl TransportPort for MqttClient {
    fn connect(&mut self, options: &ConnectOptions) -> Result<(), TransportError> {
        if self.session.is_some() {
            return Ok(());
        }
        // rumqttc panics on these instead of returning an error.
        if options.client_id.is_empty() || options.client_id.starts_with(' ') {
            return Err(TransportError::Protocol("invalid client id"));
        }

        let mut mqtt = MqttOptions::new(
            options.client_id.as_str(),
            self.address.host.as_str(),
            self.address.port,
        );
        mqtt.set_keep_alive(Duration::from_secs(u64::from(options.keep_alive_secs)))
            .set_clean_session(options.clean_session)
            .set_inflight(MAX_INFLIGHT as u16);

        let (client, connection) = Client::new(mqtt, REQUEST_CAPACITY);
        self.session = Some(Session { client, connection });
        self.inflight.clear();

        let deadline = Instant::now() + options.connect_timeout;
        loop {
            match self.poll(deadline) {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    info!(
                        "Connected to {}:{} (session present: {})",
                        self.address.host, self.address.port, ack.session_present
                    );
                    return Ok(());
                }
                Ok(event) => debug!("before CONNACK: {:?}", event),
                Err(e) => {
                    self.drop_session();
                    return Err(e);
                }
            }
        }
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
    ) -> Result<DeliveryToken, TransportError> {
        let session = self.session.as_mut().ok_or(TransportError::NotConnected)?;
        session
            .client
            .publish(topic, wire_qos(qos), false, payload.to_vec())
            .map_err(|e| {
                warn!("publish to '{}' rejected: {}", topic, e);
                TransportError::Protocol("publish rejected")
            })?;

        let deadline = Instant::now() + FLUSH_TIMEOUT;
        loop {
            let event = self.poll(deadline)?;
            self.track(&event);
            if let Event::Outgoing(Outgoing::Publish(pkid)) = event {
                if qos != QoS::AtMostOnce && self.inflight.push(pkid).is_err() {
                    warn!("In-flight window full; token {} is not tracked", pkid);
                }
                return Ok(DeliveryToken(pkid));
            }
        }
    }

    fn wait_for_completion(
        &mut self,
        token: DeliveryToken,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let deadline = Instant::now() + timeout;
        while self.is_pending(token.0) {
            let event = self.poll(deadline)?;
            self.track(&event);
        }
        Ok(())
    }

    fn disconnect(&mut self, grace: Duration) {
        if self.session.is_none() {
            return;
        }
        let deadline = Instant::now() + grace;
        while !self.inflight.is_empty() {
            match self.poll(deadline) {
                Ok(event) => self.track(&event),
                Err(_) => break,
            }
        }
        if !self.inflight.is_empty() {
            warn!(
                "Disconnecting with {} unacknowledged message(s)",
                self.inflight.len()
            );
            self.inflight.clear();
        }

        let requested = match self.session.as_mut() {
            Some(session) => match session.client.disconnect() {
                Ok(()) => true,
                Err(e) => {
                    debug!("DISCONNECT not queued: {e}");
                    false
                }
            },
            None => false,
        };
        if requested {
            let flush = Instant::now() + FLUSH_TIMEOUT;
            loop {
                match self.poll(flush) {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(event) => self.track(&event),
                }
            }
        }
        self.drop_session();
        info!("Disconnected from {}:{}", self.address.host, self.address.port);
    }
}

fn wire_qos(qos: QoS) -> rumqttc::QoS {
    match qos {
        QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
        QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
        QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
    }
}

fn connection_error(e: &ConnectionError) -> TransportError {
    match e {
        ConnectionError::ConnectionRefused(code) => TransportError::Refused(return_code(*code)),
        ConnectionError::Io(io) => TransportError::Io(io.kind()),
        ConnectionError::NetworkTimeout => TransportError::Timeout,
        _ => TransportError::Protocol("session failed"),
    }
}

/// MQTT 3.1.1 CONNACK return code.
fn return_code(code: ConnectReturnCode) -> u8 {
    match code {
        ConnectReturnCode::Success => 0,
        ConnectReturnCode::RefusedProtocolVersion => 1,
        ConnectReturnCode::BadClientId => 2,
        ConnectReturnCode::ServiceUnavailable => 3,
        ConnectReturnCode::BadUserNamePassword => 4,
        ConnectReturnCode::NotAuthorized => 5,
    }
}
