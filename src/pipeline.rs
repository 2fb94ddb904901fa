//! End-to-end co-clustering pipeline.
//!
//! `SpectralCoclusterer` wires the three stages together: degree
//! normalization, spectral embedding, and seeded k-means over the stacked
//! coordinates. The joint labels are split back at the row count, so row
//! entity `i` maps to `row_labels[i]` and column entity `j` to
//! `col_labels[j]`, with shared cluster ids across both sides.

use std::time::Instant;

use log::{debug, info};
use ndarray::Array2;

use crate::config::CoclusterConfig;
use crate::embedding::spectral_embedding;
use crate::kmeans::KMeans;
use crate::normalize::bistochastic_normalize;
use crate::types::{CoclusterError, CoclusterResult, RunDiagnostics};

/// Spectral co-clusterer for dense non-negative affinity matrices.
#[derive(Debug, Clone)]
pub struct SpectralCoclusterer {
    config: CoclusterConfig,
}

impl SpectralCoclusterer {
    pub fn new(config: CoclusterConfig) -> Self {
        Self { config }
    }

    /// Default parameters with a custom cluster count.
    pub fn with_clusters(n_clusters: usize) -> Self {
        Self::new(CoclusterConfig::new(n_clusters))
    }

    pub fn config(&self) -> &CoclusterConfig {
        &self.config
    }

    /// Run the full pipeline on `affinity`.
    ///
    /// Identical input, configuration, and seed give identical output. The
    /// input must be non-negative, finite, and large enough to supply
    /// `effective_k + 1` singular vectors.
    pub fn fit(&self, affinity: &Array2<f64>) -> Result<CoclusterResult, CoclusterError> {
        self.config.validate()?;
        validate_input(affinity)?;

        let (m, n) = (affinity.nrows(), affinity.ncols());
        let start = Instant::now();

        let normalized = bistochastic_normalize(affinity);
        let degenerate_rows = normalized.scaling.degenerate_rows();
        let degenerate_cols = normalized.scaling.degenerate_cols();
        debug!("normalization done in {:?}", start.elapsed());

        let svd_start = Instant::now();
        let embedding = spectral_embedding(&normalized, self.config.effective_k())?;
        debug!("spectral embedding done in {:?}", svd_start.elapsed());

        let kmeans_start = Instant::now();
        let kmeans = KMeans::new(self.config.n_clusters, self.config.max_iter, self.config.seed);
        let clustering = kmeans.fit(embedding.coords.view());
        debug!(
            "k-means done in {:?} after {} passes",
            kmeans_start.elapsed(),
            clustering.iterations
        );

        let mut row_labels = clustering.labels;
        let col_labels = row_labels.split_off(m);

        info!(
            "co-clustered {}x{} matrix into {} clusters in {:?}",
            m,
            n,
            self.config.n_clusters,
            start.elapsed()
        );

        Ok(CoclusterResult {
            row_labels,
            col_labels,
            centroids: clustering.centroids,
            diagnostics: RunDiagnostics {
                degenerate_rows,
                degenerate_cols,
                kmeans_iterations: clustering.iterations,
                kmeans_converged: clustering.converged,
                singular_values: embedding.singular_values,
            },
        })
    }
}

/// Reject matrices the pipeline is not defined for: empty, negative, or
/// non-finite ones. Runs before any arithmetic touches the data.
fn validate_input(affinity: &Array2<f64>) -> Result<(), CoclusterError> {
    let (rows, cols) = (affinity.nrows(), affinity.ncols());
    if rows == 0 || cols == 0 {
        return Err(CoclusterError::EmptyInput { rows, cols });
    }
    for ((row, col), &value) in affinity.indexed_iter() {
        if !value.is_finite() {
            return Err(CoclusterError::NonFiniteEntry { row, col });
        }
        if value < 0.0 {
            return Err(CoclusterError::NegativeEntry { row, col, value });
        }
    }
    Ok(())
}
