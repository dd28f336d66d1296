//! Grove temperature sensor v1.2 (NCP18WF104F03RC thermistor).
//!
//! 100 kOhm NTC in a divider with a 100 kOhm resistor, B = 4275.  With the
//! ADC normalised to `n = raw / full_scale` the thermistor ratio is
//! `R / R0 = 1/n - 1`, and the simplified Beta equation gives
//! `T = 1 / (ln(R/R0) / B + 1/298.15) - 273.15`.

use log::trace;

use crate::app::ports::{AcquisitionError, SensorPort};

use super::adc::AnalogInput;

const BETA: f64 = 4275.0;
const T25_K: f64 = 298.15;
const KELVIN_OFFSET: f64 = 273.15;

pub struct GroveTemperature<A> {
    adc: A,
}

impl<A: AnalogInput> GroveTemperature<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }
}

/// Degrees Celsius for `raw` on a converter spanning `0..=full_scale`.
///
/// The rails are not physical readings: 0 means an open divider, full
/// scale a shorted thermistor.
pub fn raw_to_celsius(raw: u16, full_scale: u16) -> Result<f64, AcquisitionError> {
    if raw == 0 || raw >= full_scale {
        return Err(AcquisitionError::OutOfRange);
    }
    let ratio = f64::from(full_scale) / f64::from(raw) - 1.0;
    let inv_t = ratio.ln() / BETA + 1.0 / T25_K;
    if inv_t <= 0.0 {
        return Err(AcquisitionError::OutOfRange);
    }
    Ok(1.0 / inv_t - KELVIN_OFFSET)
}

impl<A: AnalogInput> SensorPort for GroveTemperature<A> {
    fn acquire(&mut self) -> Result<f32, AcquisitionError> {
        let raw = self.adc.read_raw()?;
        let celsius = raw_to_celsius(raw, self.adc.full_scale())?;
        trace!("thermistor raw={raw} -> {celsius:.2} C");
        Ok(celsius as f32)
    }
}
