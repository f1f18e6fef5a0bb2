use palette::Srgb;
use rand::Rng;

use crate::config::{DEFAULT_MAX_ITERATIONS, QuantizeConfig};
use crate::error::{QuantizeError, Result};
use crate::features::distance_squared;
use crate::reconstruct::denormalize;
use crate::sampler::sample_indices;

/// One cluster of the trained palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    /// Position in the centroid set, `0..K`.
    pub id: usize,
    pub color: Srgb<f32>,
}

impl Centroid {
    pub fn to_rgb8(&self) -> [u8; 3] {
        denormalize(&self.color)
    }

    /// `RRGGBB`, upper-case, no leading `#`.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("{r:02X}{g:02X}{b:02X}")
    }
}

/// How the initial centroids are picked from the training sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Seeding {
    /// `K` distinct sample points chosen uniformly.
    Random,
    /// k-means++: each further centroid is drawn with probability proportional
    /// to its squared distance from the nearest centroid chosen so far.
    #[default]
    PlusPlus,
}

/// Outcome of a training run besides the centroids themselves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingReport {
    /// Assignment passes performed, including the final one that found no change.
    pub iterations: usize,
    /// `false` when the iteration cap was hit while points were still moving.
    pub converged: bool,
    /// Within-cluster sum of squared distances over the training sample.
    pub inertia: f32,
}

/// Lloyd's algorithm over a training sample.
#[derive(Clone, Debug)]
pub struct KMeans {
    clusters: usize,
    max_iterations: usize,
    seeding: Seeding,
}

impl KMeans {
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seeding: Seeding::default(),
        }
    }

    pub fn from_config(config: &QuantizeConfig) -> Self {
        Self {
            clusters: config.clusters,
            max_iterations: config.max_iterations,
            seeding: config.seeding,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = seeding;
        self
    }

    /// Train `K` centroids on `sample`.
    ///
    /// Alternates assignment and update steps until no point changes cluster,
    /// or until `max_iterations` assignment passes have run. Running out of
    /// iterations is not an error; the latest centroids are returned.
    /// The result depends only on `sample` and the state of `rng`.
    pub fn train<R: Rng + ?Sized>(
        &self,
        sample: &[Srgb<f32>],
        rng: &mut R,
    ) -> Result<(Vec<Centroid>, TrainingReport)> {
        if self.clusters == 0 || self.clusters > sample.len() {
            return Err(QuantizeError::InvalidClusterCount {
                clusters: self.clusters,
                samples: sample.len(),
            });
        }

        let mut centroids = self.seed(sample, rng)?;
        let mut labels: Vec<usize> = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            let next = nearest_labels(sample, &centroids);
            let moved = if labels.is_empty() {
                next.len()
            } else {
                labels.iter().zip(&next).filter(|(a, b)| a != b).count()
            };
            log::debug!("iteration {iterations}: {moved} points changed cluster");
            if moved == 0 {
                converged = true;
                break;
            }
            labels = next;
            update_centroids(sample, &labels, &mut centroids);
        }

        if !converged {
            log::warn!(
                "k-means stopped at the iteration cap ({}) before stabilizing",
                self.max_iterations
            );
        }

        let inertia = sample
            .iter()
            .map(|p| distance_squared(p, &centroids[nearest(p, &centroids)].color))
            .sum();

        Ok((
            centroids,
            TrainingReport {
                iterations,
                converged,
                inertia,
            },
        ))
    }

    fn seed<R: Rng + ?Sized>(&self, sample: &[Srgb<f32>], rng: &mut R) -> Result<Vec<Centroid>> {
        let colors: Vec<Srgb<f32>> = match self.seeding {
            Seeding::Random => sample_indices(sample.len(), self.clusters, rng)?
                .into_iter()
                .map(|i| sample[i])
                .collect(),
            Seeding::PlusPlus => plus_plus(sample, self.clusters, rng),
        };
        Ok(colors
            .into_iter()
            .enumerate()
            .map(|(id, color)| Centroid { id, color })
            .collect())
    }
}

fn plus_plus<R: Rng + ?Sized>(sample: &[Srgb<f32>], k: usize, rng: &mut R) -> Vec<Srgb<f32>> {
    let n = sample.len();
    let first = sample[rng.random_range(0..n)];
    let mut chosen = Vec::with_capacity(k);
    chosen.push(first);

    let mut weights: Vec<f64> = sample
        .iter()
        .map(|p| distance_squared(p, &first) as f64)
        .collect();

    while chosen.len() < k {
        let total: f64 = weights.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            weights
                .iter()
                .position(|&w| {
                    acc += w;
                    acc > target
                })
                .or_else(|| weights.iter().rposition(|&w| w > 0.0))
                .unwrap_or(n - 1)
        } else {
            // every point already coincides with a centroid
            rng.random_range(0..n)
        };
        let next = sample[pick];
        chosen.push(next);
        for (w, p) in weights.iter_mut().zip(sample) {
            *w = w.min(distance_squared(p, &next) as f64);
        }
    }
    chosen
}

/// Id of the centroid closest to `point`. Exact ties go to the lowest id.
#[inline]
pub fn nearest(point: &Srgb<f32>, centroids: &[Centroid]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = distance_squared(point, &c.color);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Nearest-centroid id for every point, in input order.
pub(crate) fn nearest_labels(points: &[Srgb<f32>], centroids: &[Centroid]) -> Vec<usize> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points.par_iter().map(|p| nearest(p, centroids)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        points.iter().map(|p| nearest(p, centroids)).collect()
    }
}

/// Move each centroid to the mean of its points. Empty clusters stay put.
fn update_centroids(points: &[Srgb<f32>], labels: &[usize], centroids: &mut [Centroid]) {
    let mut sums = vec![[0f64; 3]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (p, &label) in points.iter().zip(labels) {
        let s = &mut sums[label];
        s[0] += p.red as f64;
        s[1] += p.green as f64;
        s[2] += p.blue as f64;
        counts[label] += 1;
    }
    for ((c, s), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
        if count == 0 {
            continue;
        }
        let n = count as f64;
        c.color = Srgb::new((s[0] / n) as f32, (s[1] / n) as f32, (s[2] / n) as f32);
    }
}
