//! Shared result and error types for the co-clustering pipeline.

use std::error::Error;
use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fatal failures that abort a co-clustering run.
///
/// Degenerate rows or columns (zero degree) are deliberately not in this
/// list: they are tolerated, counted in [`RunDiagnostics`], and logged.
#[derive(Debug, Clone, PartialEq)]
pub enum CoclusterError {
    /// The affinity matrix has a zero dimension.
    EmptyInput { rows: usize, cols: usize },
    /// The affinity matrix contains a negative entry.
    NegativeEntry { row: usize, col: usize, value: f64 },
    /// The affinity matrix contains a NaN or infinite entry.
    NonFiniteEntry { row: usize, col: usize },
    /// The embedding needs more singular vectors than `min(m, n)` provides.
    InsufficientRank { requested: usize, rank: usize },
    /// The SVD backend did not produce a decomposition.
    SvdFailed(String),
    /// A configuration field is out of range.
    InvalidConfiguration(String),
}

impl fmt::Display for CoclusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoclusterError::EmptyInput { rows, cols } => {
                write!(
                    f,
                    "affinity matrix must have at least one row and one column, got {}x{}",
                    rows, cols
                )
            }
            CoclusterError::NegativeEntry { row, col, value } => {
                write!(
                    f,
                    "affinity matrix entry ({}, {}) is negative: {}",
                    row, col, value
                )
            }
            CoclusterError::NonFiniteEntry { row, col } => {
                write!(f, "affinity matrix entry ({}, {}) is not finite", row, col)
            }
            CoclusterError::InsufficientRank { requested, rank } => {
                write!(
                    f,
                    "embedding needs {} non-trivial singular vectors but min(m, n) = {} \
                     admits at most {}",
                    requested,
                    rank,
                    rank.saturating_sub(1)
                )
            }
            CoclusterError::SvdFailed(reason) => write!(f, "SVD failed: {}", reason),
            CoclusterError::InvalidConfiguration(reason) => {
                write!(f, "invalid configuration: {}", reason)
            }
        }
    }
}

impl Error for CoclusterError {}

/// Recoverable conditions observed during a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Rows whose degree was zero, so their scaling collapsed to zero.
    pub degenerate_rows: usize,
    /// Columns whose degree was zero, so their scaling collapsed to zero.
    pub degenerate_cols: usize,
    /// Lloyd passes actually executed.
    pub kmeans_iterations: usize,
    /// Whether assignments stabilized before the iteration cap.
    pub kmeans_converged: bool,
    /// Singular values of the normalized matrix, descending.
    pub singular_values: Vec<f64>,
}

/// Final output of a co-clustering run.
#[derive(Debug, Clone)]
pub struct CoclusterResult {
    /// Cluster label per row entity, length `m`.
    pub row_labels: Vec<usize>,
    /// Cluster label per column entity, length `n`.
    pub col_labels: Vec<usize>,
    /// Final k-means centroids, one row per cluster.
    pub centroids: Array2<f64>,
    /// Counters and flags collected along the way.
    pub diagnostics: RunDiagnostics,
}

impl CoclusterResult {
    /// Row indices assigned to `cluster`.
    pub fn rows_in_cluster(&self, cluster: usize) -> Vec<usize> {
        indices_with_label(&self.row_labels, cluster)
    }

    /// Column indices assigned to `cluster`.
    pub fn cols_in_cluster(&self, cluster: usize) -> Vec<usize> {
        indices_with_label(&self.col_labels, cluster)
    }
}

fn indices_with_label(labels: &[usize], wanted: usize) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, &label)| label == wanted)
        .map(|(idx, _)| idx)
        .collect()
}
