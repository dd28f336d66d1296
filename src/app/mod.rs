//! Application core: the sample → render → publish cycle, zero I/O.
//!
//! All interaction with the sensor, display, broker and clock happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals or a network.

pub mod controller;
pub mod convert;
pub mod events;
pub mod message;
pub mod ports;
pub mod presenter;
pub mod publisher;
