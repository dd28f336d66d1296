//! Peripheral drivers built on `embedded-hal` traits.

pub mod delay;
pub mod jhd1313m1;
