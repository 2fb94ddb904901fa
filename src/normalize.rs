//! Degree-based normalization of the affinity matrix.
//!
//! One closed-form pass rescales every entry by the inverse square roots of
//! its row and column degrees:
//!
//! ```text
//! A_norm = D_r^{-1/2} · A · D_c^{-1/2}
//! ```
//!
//! Rows or columns with zero degree get a zero scaling factor instead of
//! producing NaN or infinity; they are counted and reported, never fatal.
//! Exact doubly-stochastic balancing would take an iterative scheme and is
//! not attempted here.

use log::warn;
use ndarray::{Array1, Array2, Axis};

/// Inverse-sqrt degree scalings for rows and columns.
#[derive(Debug, Clone)]
pub struct DegreeScaling {
    /// `1 / sqrt(row degree)` per row, `0.0` where the degree is zero.
    pub row: Array1<f64>,
    /// `1 / sqrt(column degree)` per column, `0.0` where the degree is zero.
    pub col: Array1<f64>,
}

impl DegreeScaling {
    /// Number of rows whose scaling collapsed to zero.
    pub fn degenerate_rows(&self) -> usize {
        self.row.iter().filter(|&&s| s == 0.0).count()
    }

    /// Number of columns whose scaling collapsed to zero.
    pub fn degenerate_cols(&self) -> usize {
        self.col.iter().filter(|&&s| s == 0.0).count()
    }
}

/// An affinity matrix after degree normalization, together with the
/// scalings that produced it.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub matrix: Array2<f64>,
    pub scaling: DegreeScaling,
}

/// Map degrees to inverse square roots, zeroing anything that is not a
/// strictly positive finite degree.
fn inverse_sqrt(degrees: &Array1<f64>) -> Array1<f64> {
    degrees.mapv(|d| {
        if d > 0.0 {
            let inv = 1.0 / d.sqrt();
            if inv.is_finite() {
                inv
            } else {
                0.0
            }
        } else {
            0.0
        }
    })
}

/// Compute `A_norm = D_r^{-1/2} · A · D_c^{-1/2}`.
///
/// The input is expected to be non-negative and finite; the pipeline checks
/// this before calling. Degenerate rows and columns are logged once.
pub fn bistochastic_normalize(a: &Array2<f64>) -> Normalized {
    let row_degrees = a.sum_axis(Axis(1));
    let col_degrees = a.sum_axis(Axis(0));

    let scaling = DegreeScaling {
        row: inverse_sqrt(&row_degrees),
        col: inverse_sqrt(&col_degrees),
    };

    let mut matrix = a.clone();
    for (i, &scale) in scaling.row.iter().enumerate() {
        matrix.row_mut(i).mapv_inplace(|v| v * scale);
    }
    for (j, &scale) in scaling.col.iter().enumerate() {
        matrix.column_mut(j).mapv_inplace(|v| v * scale);
    }

    let zero_rows = scaling.degenerate_rows();
    let zero_cols = scaling.degenerate_cols();
    if zero_rows > 0 || zero_cols > 0 {
        warn!(
            "degree scaling zeroed out {} rows and {} columns with no mass",
            zero_rows, zero_cols
        );
    }

    Normalized { matrix, scaling }
}
