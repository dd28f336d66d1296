//! Analog inputs feeding the thermistor.
//!
//! ## Dual-target design
//!
//! With the `linux-hw` feature the reading comes from the kernel IIO
//! subsystem (`/sys/bus/iio/devices/iio:deviceN/in_voltageC_raw`).
//! Otherwise [`SimAdc`] reports a fixed, injectable raw value.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::app::ports::AcquisitionError;

/// A single ADC channel.
pub trait AnalogInput {
    /// Latest conversion result, `0..=self.full_scale()`.
    fn read_raw(&mut self) -> Result<u16, AcquisitionError>;

    /// Largest value [`read_raw`](Self::read_raw) can return.
    fn full_scale(&self) -> u16;
}

impl<A: AnalogInput + ?Sized> AnalogInput for &mut A {
    fn read_raw(&mut self) -> Result<u16, AcquisitionError> {
        (**self).read_raw()
    }

    fn full_scale(&self) -> u16 {
        (**self).full_scale()
    }
}

fn full_scale_for(bits: u8) -> u16 {
    match bits {
        0 => 0,
        1..=15 => (1u16 << bits) - 1,
        _ => u16::MAX,
    }
}

// ── IIO sysfs ──────────────────────────────────────────────────

const IIO_ROOT: &str = "/sys/bus/iio/devices";

/// One `in_voltage<N>_raw` channel of an IIO device.
#[derive(Debug)]
pub struct IioAdc {
    path: PathBuf,
    full_scale: u16,
}

impl IioAdc {
    /// Open channel `channel` of `iio:device<device>`.
    pub fn open(device: u8, channel: u8, bits: u8) -> Result<Self, AcquisitionError> {
        let path = Path::new(IIO_ROOT)
            .join(format!("iio:device{device}"))
            .join(format!("in_voltage{channel}_raw"));
        Self::open_path(path, bits)
    }

    /// Open an arbitrary sysfs-style attribute file.
    pub fn open_path(path: impl Into<PathBuf>, bits: u8) -> Result<Self, AcquisitionError> {
        let path = path.into();
        if let Err(e) = fs::metadata(&path) {
            warn!("ADC {} unavailable: {e}", path.display());
            return Err(AcquisitionError::Unavailable);
        }
        debug!("ADC opened at {}", path.display());
        Ok(Self {
            path,
            full_scale: full_scale_for(bits),
        })
    }
}

impl AnalogInput for IioAdc {
    fn read_raw(&mut self) -> Result<u16, AcquisitionError> {
        let text = fs::read_to_string(&self.path).map_err(|_| AcquisitionError::ReadFailed)?;
        let raw: u16 = text
            .trim()
            .parse()
            .map_err(|_| AcquisitionError::Malformed)?;
        if raw > self.full_scale {
            return Err(AcquisitionError::Malformed);
        }
        Ok(raw)
    }

    fn full_scale(&self) -> u16 {
        self.full_scale
    }
}

// ── Simulation ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SimAdc {
    full_scale: u16,
    raw: u16,
}

impl SimAdc {
    /// Reads mid-scale, 25 C for the Grove thermistor.
    pub fn new(bits: u8) -> Self {
        let full_scale = full_scale_for(bits);
        Self {
            full_scale,
            raw: (full_scale >> 1) + 1,
        }
    }

    /// Report `raw` instead, clamped to the converter's resolution.
    pub fn with_raw(mut self, raw: u16) -> Self {
        self.raw = raw.min(self.full_scale);
        self
    }
}

impl AnalogInput for SimAdc {
    fn read_raw(&mut self) -> Result<u16, AcquisitionError> {
        Ok(self.raw)
    }

    fn full_scale(&self) -> u16 {
        self.full_scale
    }
}
