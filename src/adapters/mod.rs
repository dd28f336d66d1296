//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements     | Connects to                 |
//! |-------------------|----------------|-----------------------------|
//! | `console_display` | DisplayPort    | Log output (no LCD present) |
//! | `log_sink`        | EventSink      | `log` facade                |
//! | `mqtt`            | TransportPort  | MQTT 3.1.1 broker (rumqttc) |
//! | `time`            | ClockPort      | System wall clock           |
//!
//! The LCD and the thermistor live in `drivers` and `sensors`; they
//! implement the same ports directly.

pub mod console_display;
pub mod log_sink;
pub mod mqtt;
pub mod time;
