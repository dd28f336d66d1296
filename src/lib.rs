//! thermolink: periodic temperature telemetry.
//!
//! Samples a thermistor, shows the reading on a two-line RGB LCD and
//! publishes it as JSON to an MQTT broker, once per interval, until
//! interrupted.  Hardware and network access sit behind the port traits
//! in [`app::ports`] so the loop runs unchanged against test doubles.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod sensors;
pub mod shutdown;

mod error;

pub use error::{ConfigError, Error, Result};
