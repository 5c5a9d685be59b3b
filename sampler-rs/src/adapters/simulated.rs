use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::types::XYZ;

use super::gaussian::GaussianNoise;
use crate::constants::STANDARD_GRAVITY;
use crate::errors::SamplerError;
use crate::helpers::lock;
use crate::ports::SampleReader;

const ACC_NOISE_STDEV: f64 = 0.05;
const GYRO_NOISE_STDEV: f64 = 0.01;

/// Simulated sensor: a constant baseline plus optional Gaussian noise on every axis.
pub struct GaussianReader {
    baseline: XYZ,
    noise: Option<GaussianNoise>,
    rng: Mutex<StdRng>,
}

impl GaussianReader {
    pub fn new(baseline: XYZ, noise_stdev: Option<f64>) -> Result<Self, SamplerError> {
        let noise = noise_stdev
            .map(|stdev| GaussianNoise::new(0.0, stdev))
            .transpose()?;
        Ok(Self {
            baseline,
            noise,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Device lying flat: gravity along Z.
    pub fn accelerometer(add_noise: bool) -> Result<Self, SamplerError> {
        Self::new(
            XYZ::new([0.0, 0.0, STANDARD_GRAVITY]),
            add_noise.then_some(ACC_NOISE_STDEV),
        )
    }

    /// Device at rest: no rotation.
    pub fn gyroscope(add_noise: bool) -> Result<Self, SamplerError> {
        Self::new(XYZ::default(), add_noise.then_some(GYRO_NOISE_STDEV))
    }

    pub fn baseline(&self) -> &XYZ {
        &self.baseline
    }

    fn next_reading(&self) -> XYZ {
        match &self.noise {
            Some(noise) => {
                let mut rng = lock(&self.rng);
                self.baseline.clone() + noise.draw_xyz(&mut rng)
            }
            None => self.baseline.clone(),
        }
    }
}

#[async_trait]
impl SampleReader for GaussianReader {
    async fn read_latest(&self) -> Result<Option<XYZ>, SamplerError> {
        Ok(Some(self.next_reading()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noiseless_reader_returns_baseline() {
        let reader = GaussianReader::accelerometer(false).unwrap();
        let reading = reader.read_latest().await.unwrap().unwrap();
        assert_eq!(reading, XYZ::new([0.0, 0.0, STANDARD_GRAVITY]));
    }

    #[tokio::test]
    async fn test_noisy_reader_stays_close_to_baseline() {
        let reader = GaussianReader::gyroscope(true).unwrap();
        for _ in 0..20 {
            let reading = reader.read_latest().await.unwrap().unwrap();
            assert!(reading.norm() < 10.0 * GYRO_NOISE_STDEV * 3.0);
        }
    }
}
