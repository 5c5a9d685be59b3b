use std::fmt;
use uuid::Uuid;

/// Kind of a sensor source, tagged with the id of the physical (or simulated) device.
///
/// ```
/// use common::SensorType;
/// use uuid::Uuid;
///
/// let id = Uuid::new_v4();
/// let sensor = SensorType::Gyroscope(id);
/// assert_eq!(sensor.kind(), "gyroscope");
/// assert_eq!(sensor.to_string(), format!("gyroscope::{}", id));
/// ```
#[derive(Clone, Debug, PartialEq, PartialOrd, Hash, Eq)]
pub enum SensorType {
    Accelerometer(Uuid),
    Gyroscope(Uuid),
    /// Any other sensor, named by the source that provides it
    Other(Uuid, String),
}

impl SensorType {
    /// Human readable kind of the sensor, without its id
    pub fn kind(&self) -> &str {
        match self {
            SensorType::Accelerometer(_) => "accelerometer",
            SensorType::Gyroscope(_) => "gyroscope",
            SensorType::Other(_, name) => name.as_str(),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            SensorType::Accelerometer(id)
            | SensorType::Gyroscope(id)
            | SensorType::Other(id, _) => *id,
        }
    }

    pub fn is_accelerometer(&self) -> bool {
        matches!(self, SensorType::Accelerometer(_))
    }

    pub fn is_gyroscope(&self) -> bool {
        matches!(self, SensorType::Gyroscope(_))
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.kind(), self.id())
    }
}
