//! Stand-in analyzer for demos and manual testing

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{CameraImage, ImageAnalyzer};
use crate::{CatpointError, Result};

/// Analyzer that ignores the pixels and reports a cat at random
///
/// Each call draws one boolean with probability `cat_probability`. A seed
/// makes a session reproducible.
#[derive(Debug)]
pub struct FakeImageAnalyzer {
    cat_probability: f64,
    rng: Mutex<StdRng>,
}

impl FakeImageAnalyzer {
    pub fn new(cat_probability: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&cat_probability) {
            return Err(CatpointError::InvalidConfig(format!(
                "cat probability must be in [0.0, 1.0], got {}",
                cat_probability
            )));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            cat_probability,
            rng: Mutex::new(rng),
        })
    }

    pub fn cat_probability(&self) -> f64 {
        self.cat_probability
    }
}

impl Default for FakeImageAnalyzer {
    fn default() -> Self {
        Self {
            cat_probability: 0.5,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl ImageAnalyzer for FakeImageAnalyzer {
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        let cat = self.rng.lock().gen_bool(self.cat_probability);
        tracing::debug!(
            "Fake analysis of {} bytes (threshold {}%): cat={}",
            image.len(),
            confidence_threshold,
            cat
        );
        Ok(cat)
    }
}
