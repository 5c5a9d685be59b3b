use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use common::traits::Notifiable;
use common::types::{Clock, Sample3D, SensorType};
use publisher::{Publishable, Publisher, Subscription};

use crate::constants::DEFAULT_UPDATE_INTERVAL_MS;
use crate::errors::SamplerError;
use crate::ports::SensorSource;

/// Manually driven sensor source.
///
/// Nothing is delivered until [`SensorMock::emit`] is called, which makes session timing fully
/// controllable from tests and demos.
pub struct SensorMock {
    sensor_type: SensorType,
    publisher: Publisher<Sample3D>,
    available: AtomicBool,
    period_millis: AtomicU64,
}

impl SensorMock {
    pub fn new(sensor_type: SensorType) -> Self {
        Self {
            sensor_type,
            publisher: Publisher::new(),
            available: AtomicBool::new(true),
            period_millis: AtomicU64::new(DEFAULT_UPDATE_INTERVAL_MS),
        }
    }

    pub fn accelerometer() -> Self {
        Self::new(SensorType::Accelerometer(Uuid::new_v4()))
    }

    pub fn gyroscope() -> Self {
        Self::new(SensorType::Gyroscope(Uuid::new_v4()))
    }

    /// An unavailable mock refuses new listeners with `SensorUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Stamps `measurement` with the current time and delivers it to every listener.
    pub fn emit(&self, measurement: [f64; 3]) {
        self.emit_sample(Sample3D::new(Clock::now().as_secs(), measurement));
    }

    pub fn emit_sample(&self, sample: Sample3D) {
        log::debug!("{} emitting {}", self.sensor_type, sample);
        self.publisher.notify_listeners(Arc::new(sample));
    }

    pub fn listener_count(&self) -> usize {
        self.publisher.len()
    }

    pub fn get_update_interval(&self) -> Duration {
        Duration::from_millis(self.period_millis.load(Ordering::Acquire))
    }
}

impl SensorSource for SensorMock {
    fn get_sensor_type(&self) -> &SensorType {
        &self.sensor_type
    }

    fn set_update_interval(&self, period: Duration) {
        self.period_millis
            .store(period.as_millis() as u64, Ordering::Release);
    }

    fn add_listener(
        &self,
        listener: &mut dyn Notifiable<Sample3D>,
    ) -> Result<Subscription, SamplerError> {
        if !self.available.load(Ordering::Acquire) {
            return Err(SamplerError::SensorUnavailable(format!(
                "{} is not available",
                self.sensor_type.kind()
            )));
        }
        Ok(self.publisher.subscribe(listener))
    }
}
