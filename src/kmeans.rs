//! Seeded k-means over the rows of a dense matrix.
//!
//! The clustering stage is pinned down tightly so a run is reproducible
//! bit for bit: k-means++ initialization drawn from a seeded RNG, nearest
//! centroid resolved to the lowest index on ties, clusters that lose all
//! their points keep their previous centroid, and the loop stops as soon as
//! one full pass changes no assignment. Only the per-point assignment step
//! is parallel; centroid sums stay sequential so floating-point summation
//! order never depends on thread scheduling.

use log::warn;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Centroid initialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMethod {
    /// Squared-distance weighted seeding, the pipeline default.
    KMeansPlusPlus,
    /// Distinct data points sampled uniformly.
    RandomPoints,
}

/// Lloyd's algorithm with a fixed seed and iteration cap.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub n_clusters: usize,
    pub max_iter: usize,
    pub init: InitMethod,
    pub seed: u64,
}

/// Labels and centroids from one k-means run.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster index per input row.
    pub labels: Vec<usize>,
    /// `n_clusters x dim` centroid matrix.
    pub centroids: Array2<f64>,
    /// Lloyd passes executed, including the final no-change pass.
    pub iterations: usize,
    /// Whether assignments stabilized before `max_iter`.
    pub converged: bool,
}

impl KMeans {
    pub fn new(n_clusters: usize, max_iter: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            max_iter,
            init: InitMethod::KMeansPlusPlus,
            seed,
        }
    }

    /// Cluster the rows of `data`.
    ///
    /// Expects at least one point and `n_clusters >= 1`; the pipeline
    /// validates both before calling.
    pub fn fit(&self, data: ArrayView2<'_, f64>) -> KMeansResult {
        debug_assert!(data.nrows() > 0);
        debug_assert!(self.n_clusters > 0);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = match self.init {
            InitMethod::KMeansPlusPlus => self.init_plusplus(data, &mut rng),
            InitMethod::RandomPoints => self.init_random(data, &mut rng),
        };

        let mut labels = vec![usize::MAX; data.nrows()];
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..self.max_iter {
            iterations += 1;
            let new_labels = assign(data, centroids.view());
            if new_labels == labels {
                converged = true;
                break;
            }
            labels = new_labels;
            update_centroids(data, &labels, &mut centroids);
        }

        if !converged {
            warn!(
                "k-means stopped at the iteration cap ({}) with assignments still moving",
                self.max_iter
            );
        }

        KMeansResult {
            labels,
            centroids,
            iterations,
            converged,
        }
    }

    /// k-means++: first centroid uniform, each next one drawn with
    /// probability proportional to the squared distance from the nearest
    /// centroid chosen so far. When every point already coincides with a
    /// centroid the weights are all zero and the draw falls back to uniform.
    fn init_plusplus(&self, data: ArrayView2<'_, f64>, rng: &mut StdRng) -> Array2<f64> {
        let n = data.nrows();
        let mut centroids = Array2::zeros((self.n_clusters, data.ncols()));

        let first = rng.gen_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        let mut dist2 = vec![f64::INFINITY; n];
        for c in 1..self.n_clusters {
            let last = centroids.row(c - 1);
            for (i, d) in dist2.iter_mut().enumerate() {
                let candidate = squared_distance(data.row(i), last);
                if candidate < *d {
                    *d = candidate;
                }
            }

            let chosen = match WeightedIndex::new(dist2.iter().copied()) {
                Ok(weights) => weights.sample(rng),
                Err(_) => rng.gen_range(0..n),
            };
            centroids.row_mut(c).assign(&data.row(chosen));
        }

        centroids
    }

    /// Partial Fisher-Yates over the row indices, taking the first
    /// `n_clusters` slots as distinct picks. Once every point has been
    /// taken, the remaining centroids are drawn uniformly with replacement,
    /// matching the exhausted-weights fallback of the k-means++ path.
    fn init_random(&self, data: ArrayView2<'_, f64>, rng: &mut StdRng) -> Array2<f64> {
        let n = data.nrows();
        let mut centroids = Array2::zeros((self.n_clusters, data.ncols()));
        let mut indices: Vec<usize> = (0..n).collect();
        for c in 0..self.n_clusters {
            let pick = if c < n {
                let swap = rng.gen_range(c..n);
                indices.swap(c, swap);
                indices[c]
            } else {
                rng.gen_range(0..n)
            };
            centroids.row_mut(c).assign(&data.row(pick));
        }
        centroids
    }
}

/// Nearest-centroid label for every row, ties resolved to the lowest
/// centroid index. Points are independent, so this is the one step that
/// runs on the rayon pool; collect keeps input order.
fn assign(data: ArrayView2<'_, f64>, centroids: ArrayView2<'_, f64>) -> Vec<usize> {
    (0..data.nrows())
        .into_par_iter()
        .map(|i| nearest_centroid(data.row(i), centroids))
        .collect()
}

fn nearest_centroid(point: ArrayView1<'_, f64>, centroids: ArrayView2<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Replace each centroid with the mean of its assigned points. A cluster
/// with no points keeps its previous centroid.
fn update_centroids(data: ArrayView2<'_, f64>, labels: &[usize], centroids: &mut Array2<f64>) {
    let k = centroids.nrows();
    let mut sums = Array2::<f64>::zeros(centroids.dim());
    let mut counts = vec![0usize; k];

    for (i, &label) in labels.iter().enumerate() {
        counts[label] += 1;
        let mut sum = sums.row_mut(label);
        sum += &data.row(i);
    }

    for c in 0..k {
        if counts[c] > 0 {
            let inv = 1.0 / counts[c] as f64;
            let mut centroid = centroids.row_mut(c);
            centroid.assign(&sums.row(c));
            centroid.mapv_inplace(|v| v * inv);
        }
    }
}
