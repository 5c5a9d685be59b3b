use nalgebra::Vector3;

use std::fmt;
use std::ops::Add;

use crate::constants::N_XYZ_COORDINATES;

/// 3-axis measurement (m/s² for accelerometers, rad/s for gyroscopes).
///
/// ```
/// use common::types::untimed::XYZ;
///
/// let xyz = XYZ::new([0.123, -4.5, 9.8066]);
/// assert_eq!(xyz.x(), 0.123);
/// assert_eq!(xyz.to_string(), "X: 0.12 Y: -4.50 Z: 9.81");
/// ```
#[derive(Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct XYZ(Vector3<f64>);

impl XYZ {
    pub fn new(data: [f64; N_XYZ_COORDINATES]) -> Self {
        Self(Vector3::from(data))
    }

    pub fn inner(&self) -> [f64; N_XYZ_COORDINATES] {
        [self.0.x, self.0.y, self.0.z]
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }
}

/// Two decimals per axis, as listed on displays.
impl fmt::Display for XYZ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X: {:.2} Y: {:.2} Z: {:.2}",
            self.0.x, self.0.y, self.0.z
        )
    }
}

impl From<[f64; N_XYZ_COORDINATES]> for XYZ {
    fn from(value: [f64; N_XYZ_COORDINATES]) -> Self {
        Self::new(value)
    }
}

/// Builds a measurement from a decoded row. Fails unless exactly three components are given.
impl TryFrom<Vec<f64>> for XYZ {
    type Error = &'static str;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        if value.len() != N_XYZ_COORDINATES {
            return Err("Can't convert to XYZ");
        }
        Ok(Self(Vector3::from_vec(value)))
    }
}

impl Add for XYZ {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
