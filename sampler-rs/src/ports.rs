use std::time::Duration;

use async_trait::async_trait;

use common::traits::Notifiable;
use common::types::{Sample3D, SensorType, XYZ};
use publisher::Subscription;

use crate::errors::SamplerError;

/// A sensor that pushes timestamped samples to its listeners.
///
/// Listeners stay registered until the returned [`Subscription`] is removed or dropped.
pub trait SensorSource: Send + Sync {
    fn get_sensor_type(&self) -> &SensorType;

    /// Sets how often samples are delivered. Takes effect on the next tick.
    fn set_update_interval(&self, period: Duration);

    /// Returns `SensorUnavailable` if the sensor cannot deliver samples.
    fn add_listener(
        &self,
        listener: &mut dyn Notifiable<Sample3D>,
    ) -> Result<Subscription, SamplerError>;
}

/// Pull side of a periodic source: asked for the latest reading once per tick.
#[async_trait]
pub trait SampleReader: Send + Sync + 'static {
    /// Called once before the first read of a polling run.
    async fn prepare(&self) -> Result<(), SamplerError> {
        Ok(())
    }

    /// Latest reading, or `None` if nothing new is available.
    async fn read_latest(&self) -> Result<Option<XYZ>, SamplerError>;

    /// Called once after the last read of a polling run.
    async fn finish(&self) {}
}
