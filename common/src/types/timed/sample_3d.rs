use std::fmt;

use crate::constants::N_XYZ_COORDINATES;
use crate::types::untimed::XYZ;
use crate::IMUSample;

/// One reading of a 3-axis sensor, stamped on arrival.
///
/// `timestamp` is expressed in seconds since the Unix epoch. Samples are immutable once built.
///
/// ```
/// use common::{IMUSample, Sample3D, XYZ};
///
/// let sample = Sample3D::new(1_700_000_000.25, [0.12, 0.34, 9.81]);
///
/// assert_eq!(sample.get_timestamp(), 1_700_000_000.25);
/// assert_eq!(sample.measurement(), &XYZ::new([0.12, 0.34, 9.81]));
/// assert_eq!(sample.to_string(), "X: 0.12 Y: 0.34 Z: 9.81");
/// ```
#[derive(Debug, Clone, Default, PartialEq, PartialOrd)]
pub struct Sample3D {
    timestamp: f64,
    measurement: XYZ,
}

impl Sample3D {
    pub fn new(timestamp: f64, measurement: [f64; N_XYZ_COORDINATES]) -> Self {
        Self {
            timestamp,
            measurement: XYZ::new(measurement),
        }
    }

    /// Borrows the measurement without cloning it
    pub fn measurement(&self) -> &XYZ {
        &self.measurement
    }
}

impl IMUSample for Sample3D {
    type Untimed = XYZ;

    fn get_timestamp(&self) -> f64 {
        self.timestamp
    }

    fn get_measurement(&self) -> XYZ {
        self.measurement.clone()
    }

    fn from_measurement(timestamp: f64, measurement: XYZ) -> Self {
        Self {
            timestamp,
            measurement,
        }
    }
}

// Displays render readings without their timestamp.
impl fmt::Display for Sample3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.measurement, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_measurement_keeps_both_parts() {
        let measurement = XYZ::new([0.5, -0.25, 9.75]);
        let sample = Sample3D::from_measurement(12.5, measurement.clone());

        assert_eq!(sample.get_timestamp(), 12.5);
        assert_eq!(sample.get_measurement(), measurement);
        assert_eq!(sample, Sample3D::new(12.5, [0.5, -0.25, 9.75]));
    }

    #[test]
    fn test_default_is_zeroed() {
        let sample = Sample3D::default();
        assert_eq!(sample.get_timestamp(), 0.0);
        assert_eq!(sample.measurement().norm(), 0.0);
    }

    #[test]
    fn test_display_hides_timestamp() {
        let sample = Sample3D::new(99.0, [1.0, 2.346, -3.0]);
        assert_eq!(sample.to_string(), "X: 1.00 Y: 2.35 Z: -3.00");
    }
}
