//! Unit conversion from raw sensor samples to Celsius and Fahrenheit.

/// Derived values for one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Corrected primary reading in degrees Celsius.
    pub celsius: f64,
    /// Secondary reading in degrees Fahrenheit, truncated toward zero.
    pub fahrenheit: i32,
}

impl Reading {
    /// Integer portion of the Celsius reading, truncated toward zero.
    pub fn celsius_whole(&self) -> i64 {
        self.celsius.trunc() as i64
    }
}

/// Applies the sensor-circuit correction and the Celsius → Fahrenheit map.
#[derive(Debug, Clone, Copy)]
pub struct UnitConverter {
    scale: f64,
}

impl UnitConverter {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn convert(&self, raw: f32) -> Reading {
        let celsius = f64::from(raw) * self.scale;
        Reading {
            celsius,
            fahrenheit: celsius_to_fahrenheit(celsius),
        }
    }
}

/// `c * 9/5 + 32`, truncated toward zero.
pub fn celsius_to_fahrenheit(celsius: f64) -> i32 {
    (celsius * 9.0 / 5.0 + 32.0) as i32
}
