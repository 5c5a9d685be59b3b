use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use common::types::XYZ;

use crate::errors::SamplerError;

/// Functionality to add some Gaussian noise.
#[derive(Clone, Debug)]
pub(crate) struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Creates new distribution from mean and stdev
    pub(crate) fn new(mean: f64, stdev: f64) -> Result<Self, SamplerError> {
        let normal = Normal::new(mean, stdev)
            .map_err(|e| SamplerError::InvalidConfig(format!("noise distribution: {}", e)))?;
        Ok(Self { normal })
    }

    /// Sample from distribution
    pub(crate) fn draw_sample(&self, rng: &mut StdRng) -> f64 {
        self.normal.sample(rng)
    }

    /// Independent draw for every axis
    pub(crate) fn draw_xyz(&self, rng: &mut StdRng) -> XYZ {
        XYZ::new([
            self.draw_sample(rng),
            self.draw_sample(rng),
            self.draw_sample(rng),
        ])
    }
}
