//! Bipartite spectral co-clustering of dense non-negative matrices.
//!
//! Given an `m x n` affinity matrix relating two entity sets, for example
//! documents against terms, the pipeline partitions rows and columns
//! jointly into a shared set of clusters:
//!
//! 1. degree-based normalization, `A_norm = D_r^{-1/2} A D_c^{-1/2}`;
//! 2. thin SVD of `A_norm`, dropping the trivial leading singular pair and
//!    rescaling the next `k` left and right singular vectors into one
//!    `(m + n) x k` joint embedding;
//! 3. seeded k-means over the stacked embedding, split back into row and
//!    column labels.
//!
//! Runs are deterministic: the same matrix, configuration, and seed
//! reproduce the same embedding, labels, and centroids.
//!
//! ```
//! use ndarray::array;
//! use spectral_cocluster::{CoclusterConfig, SpectralCoclusterer};
//!
//! let affinity = array![
//!     [5.0, 5.0, 0.1, 0.1],
//!     [5.0, 5.0, 0.1, 0.1],
//!     [0.1, 0.1, 5.0, 5.0],
//!     [0.1, 0.1, 5.0, 5.0],
//! ];
//! let result = SpectralCoclusterer::new(CoclusterConfig::default())
//!     .fit(&affinity)
//!     .unwrap();
//! assert_eq!(result.row_labels.len(), 4);
//! assert_eq!(result.col_labels.len(), 4);
//! ```

pub mod config;
pub mod embedding;
pub mod io;
pub mod kmeans;
pub mod normalize;
pub mod pipeline;
pub mod types;
pub mod util;

pub use config::CoclusterConfig;
pub use embedding::{spectral_embedding, Embedding};
pub use kmeans::{InitMethod, KMeans, KMeansResult};
pub use normalize::{bistochastic_normalize, DegreeScaling, Normalized};
pub use pipeline::SpectralCoclusterer;
pub use types::{CoclusterError, CoclusterResult, RunDiagnostics};
