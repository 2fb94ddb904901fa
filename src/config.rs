//! Run parameters for the co-clustering pipeline.

use serde::{Deserialize, Serialize};

use crate::types::CoclusterError;

/// Parameters of one co-clustering run.
///
/// The defaults mirror the classic setup for bipartite spectral graph
/// partitioning: two co-clusters, up to 100 Lloyd passes, seed 42.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoclusterConfig {
    /// Number of co-clusters shared by rows and columns.
    pub n_clusters: usize,
    /// Iteration cap for the k-means stage.
    pub max_iter: usize,
    /// Seed for k-means++ initialization.
    pub seed: u64,
    /// Override for the number of singular vectors kept after the trivial
    /// one. `None` keeps `n_clusters` of them.
    pub embedding_dim: Option<usize>,
}

impl Default for CoclusterConfig {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            max_iter: 100,
            seed: 42,
            embedding_dim: None,
        }
    }
}

impl CoclusterConfig {
    /// Default parameters with a custom cluster count.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }

    /// Embedding dimensionality actually used by the SVD stage.
    pub fn effective_k(&self) -> usize {
        self.embedding_dim.unwrap_or(self.n_clusters)
    }

    pub fn validate(&self) -> Result<(), CoclusterError> {
        if self.n_clusters == 0 {
            return Err(CoclusterError::InvalidConfiguration(
                "n_clusters must be at least 1".to_string(),
            ));
        }
        if self.max_iter == 0 {
            return Err(CoclusterError::InvalidConfiguration(
                "max_iter must be at least 1".to_string(),
            ));
        }
        if self.embedding_dim == Some(0) {
            return Err(CoclusterError::InvalidConfiguration(
                "embedding_dim must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}
