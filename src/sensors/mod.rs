//! Sensor drivers: the Grove thermistor and the ADC channels feeding it.

pub mod adc;
pub mod temperature;
