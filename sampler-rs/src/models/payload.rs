use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use common::types::Sample3D;

/// Batch sent to the upload endpoint.
///
/// Serializes as
/// `{"realizado": "2024-05-01T10:00:00.000Z", "accelerometer": [{"x":..,"y":..,"z":..}], "gyroscope": [...]}`.
/// Sample timestamps are not part of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadPayload {
    #[serde(rename = "realizado", serialize_with = "serialize_instant")]
    pub completed_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_samples")]
    pub accelerometer: Vec<Sample3D>,
    #[serde(serialize_with = "serialize_samples")]
    pub gyroscope: Vec<Sample3D>,
}

#[derive(Serialize)]
struct AxisReading {
    x: f64,
    y: f64,
    z: f64,
}

impl From<&Sample3D> for AxisReading {
    fn from(sample: &Sample3D) -> Self {
        let measurement = sample.measurement();
        Self {
            x: measurement.x(),
            y: measurement.y(),
            z: measurement.z(),
        }
    }
}

impl UploadPayload {
    pub fn new(
        completed_at: DateTime<Utc>,
        accelerometer: Vec<Sample3D>,
        gyroscope: Vec<Sample3D>,
    ) -> Self {
        Self {
            completed_at,
            accelerometer,
            gyroscope,
        }
    }

    /// Total number of samples in the batch
    pub fn len(&self) -> usize {
        self.accelerometer.len() + self.gyroscope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn serialize_instant<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn serialize_samples<S>(samples: &[Sample3D], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(samples.len()))?;
    for sample in samples {
        seq.serialize_element(&AxisReading::from(sample))?;
    }
    seq.end()
}
