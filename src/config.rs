use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{QuantizeError, Result};
use crate::kmeans::Seeding;

/// Number of palette colors when none is requested.
pub const DEFAULT_CLUSTERS: usize = 32;
/// Pixels drawn for training when none is requested.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;
/// Lloyd iterations before training gives up on stabilizing.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Parameters for a single quantization run.
#[derive(Clone, Debug)]
pub struct QuantizeConfig {
    /// Number of clusters (`K`), i.e. colors in the output palette.
    pub clusters: usize,
    /// Number of pixels (`N`) drawn for training.
    pub sample_size: usize,
    pub max_iterations: usize,
    /// Fixed seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub seeding: Seeding,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            seeding: Seeding::PlusPlus,
        }
    }
}

impl QuantizeConfig {
    pub fn with_clusters(mut self, clusters: usize) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = seeding;
        self
    }

    /// Cluster count must fit the requested sample. Checked before sampling,
    /// which is the costly part when the sample nears the pixel count.
    pub fn validate(&self) -> Result<()> {
        if self.clusters == 0 || self.clusters > self.sample_size {
            return Err(QuantizeError::InvalidClusterCount {
                clusters: self.clusters,
                samples: self.sample_size,
            });
        }
        Ok(())
    }

    /// Random source shared by the sampler and the trainer for one run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn defaults_match_reference_run() {
        let config = QuantizeConfig::default();
        assert_eq!(config.clusters, 32);
        assert_eq!(config.sample_size, 1000);
        assert_eq!(config.max_iterations, 100);
        assert!(config.seed.is_none());
    }

    #[test]
    fn cluster_count_is_checked_against_sample_size() {
        let config = QuantizeConfig::default();
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.clone().with_clusters(0).validate(),
            Err(QuantizeError::InvalidClusterCount { clusters: 0, samples: 1000 })
        ));
        assert!(matches!(
            config.with_clusters(11).with_sample_size(10).validate(),
            Err(QuantizeError::InvalidClusterCount { clusters: 11, samples: 10 })
        ));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let config = QuantizeConfig::default().with_seed(7);
        let a: Vec<u32> = (0..8).map(|_| config.rng().random()).collect();
        let mut first = config.rng();
        let mut second = config.rng();
        let b: Vec<u32> = (0..8).map(|_| first.random()).collect();
        let c: Vec<u32> = (0..8).map(|_| second.random()).collect();
        assert_eq!(b, c);
        // a fresh rng per draw always yields the first value of the stream
        assert!(a.iter().all(|&v| v == b[0]));
    }
}
