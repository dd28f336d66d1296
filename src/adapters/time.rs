//! Wall-clock adapter.
//!
//! Message timestamps are whole seconds since the Unix epoch, read from
//! the system clock at encode time.  A clock set before 1970 reads as 0
//! rather than failing the iteration.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;

/// [`ClockPort`] backed by `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
