//! System configuration parameters
//!
//! Fixed constants for the sample → render → publish loop.  There is no
//! file or environment override layer; [`TelemetryConfig::default`] is the
//! configuration.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// MQTT 3.1.1 guarantees brokers accept client ids up to this length.
pub const MAX_CLIENT_ID_LEN: usize = 23;

/// Delivery guarantee for a published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum QoS {
    /// Fire and forget.
    AtMostOnce = 0,
    /// Acknowledged; duplicates possible.
    AtLeastOnce = 1,
    /// Four-way handshake; no duplicates.
    ExactlyOnce = 2,
}

impl QoS {
    pub const fn level(self) -> u8 {
        self as u8
    }

    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::AtMostOnce),
            1 => Some(Self::AtLeastOnce),
            2 => Some(Self::ExactlyOnce),
            _ => None,
        }
    }
}

/// Core loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    // --- Broker ---
    /// Broker address, `tcp://host:port`
    pub broker_address: String,
    /// MQTT client identifier
    pub client_id: String,
    /// Topic every reading is published to
    pub topic: String,
    /// Publish quality of service
    pub qos: QoS,
    /// Keep-alive interval announced in CONNECT (seconds)
    pub keep_alive_secs: u16,
    /// Discard broker-side session state on connect
    pub clean_session: bool,

    // --- Timing ---
    /// Upper bound on waiting for CONNACK (milliseconds)
    pub connect_timeout_ms: u32,
    /// Upper bound on waiting for delivery confirmation (milliseconds)
    pub publish_timeout_ms: u32,
    /// Grace period for outstanding acks on disconnect (milliseconds)
    pub disconnect_grace_ms: u32,
    /// Delay between samples (milliseconds)
    pub sample_interval_ms: u32,

    // --- Sensor ---
    /// Sensor-circuit correction applied to every raw sample
    pub scale_factor: f64,
    /// Constant label carried in the `sensor_id` field of every message
    pub sensor_label: String,
    /// IIO device index of the ADC
    pub iio_device: u8,
    /// ADC channel the thermistor is wired to
    pub adc_channel: u8,
    /// ADC resolution in bits
    pub adc_bits: u8,

    // --- Display ---
    /// I2C bus number (`/dev/i2c-N`)
    pub i2c_bus: u8,
    /// LCD text controller address
    pub lcd_address: u8,
    /// RGB backlight controller address
    pub rgb_address: u8,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            // Broker
            broker_address: "tcp://localhost:1883".into(),
            client_id: "MQTTExample".into(),
            topic: "sensors/temperature/data".into(),
            qos: QoS::AtLeastOnce,
            keep_alive_secs: 20,
            clean_session: true,

            // Timing
            connect_timeout_ms: 30_000,
            publish_timeout_ms: 10_000,
            disconnect_grace_ms: 10_000,
            sample_interval_ms: 1_000, // 1 Hz

            // Sensor
            scale_factor: 0.6, // 5 V Arduino-shield divider correction
            sensor_label: "temperature".into(),
            iio_device: 1,
            adc_channel: 0,
            adc_bits: 12,

            // Display
            i2c_bus: 0,
            lcd_address: 0x3e,
            rgb_address: 0x62,
        }
    }
}

impl TelemetryConfig {
    /// Reject constants that would make the loop misbehave at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() || self.client_id.len() > MAX_CLIENT_ID_LEN {
            return Err(ConfigError::ClientId);
        }
        if self.topic.is_empty() || self.topic.contains(['+', '#']) {
            return Err(ConfigError::Topic);
        }
        if self.sensor_label.is_empty() {
            return Err(ConfigError::SensorLabel);
        }
        for (field, value) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("publish_timeout_ms", self.publish_timeout_ms),
            ("sample_interval_ms", self.sample_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration(field));
            }
        }
        // Every iteration sends a PUBLISH, which doubles as the keep-alive.
        if self.keep_alive_secs != 0
            && u64::from(self.sample_interval_ms) >= u64::from(self.keep_alive_secs) * 1000
        {
            return Err(ConfigError::KeepAlive);
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(ConfigError::ScaleFactor);
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.connect_timeout_ms))
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.publish_timeout_ms))
    }

    pub fn disconnect_grace(&self) -> Duration {
        Duration::from_millis(u64::from(self.disconnect_grace_ms))
    }
}
