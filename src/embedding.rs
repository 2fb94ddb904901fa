//! Spectral embedding of the normalized affinity matrix.
//!
//! A thin SVD of `A_norm` is taken, the leading singular pair is dropped
//! (for a connected bipartite graph it only encodes the degree structure),
//! and the next `k` left and right singular vectors are rescaled by the
//! degree scalings and stacked into a single `(m + n) x k` coordinate
//! matrix. Rows and columns live in the same space afterwards, which is
//! what lets one k-means run cluster both sides at once.

use log::debug;
use nalgebra::DMatrix;
use ndarray::Array2;

use crate::normalize::Normalized;
use crate::types::CoclusterError;
use crate::util::clone_to_dmatrix;

/// Joint row/column coordinates produced by the SVD stage.
#[derive(Debug, Clone)]
pub struct Embedding {
    /// Stacked coordinates: rows `0..m` belong to row entities, rows
    /// `m..m + n` to column entities.
    pub coords: Array2<f64>,
    /// Full singular spectrum of the normalized matrix, descending.
    pub singular_values: Vec<f64>,
}

/// Thin SVD with singular values sorted descending.
///
/// Returns `(U, sigma, V)` with `U` of size `m x r` and `V` of size
/// `n x r` where `r = min(m, n)`.
pub(crate) fn thin_svd(
    matrix: &Array2<f64>,
) -> Result<(DMatrix<f64>, Vec<f64>, DMatrix<f64>), CoclusterError> {
    let na_matrix = clone_to_dmatrix(matrix.view());
    let svd = na_matrix
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or_else(|| CoclusterError::SvdFailed("iteration did not converge".to_string()))?;

    let u = svd
        .u
        .ok_or_else(|| CoclusterError::SvdFailed("left singular vectors missing".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| CoclusterError::SvdFailed("right singular vectors missing".to_string()))?;
    let singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();

    Ok((u, singular_values, v_t.transpose()))
}

/// Flip each singular-vector pair so the largest-magnitude component of the
/// stacked `[u_j; v_j]` vector is non-negative, first occurrence winning
/// ties. SVD signs are arbitrary; pinning them keeps runs bit-reproducible.
/// A pair always flips as a whole so the decomposition stays valid.
fn fix_signs(u_k: &mut DMatrix<f64>, v_k: &mut DMatrix<f64>) {
    for j in 0..u_k.ncols() {
        let mut max_abs = 0.0_f64;
        let mut max_val = 0.0_f64;
        for &x in u_k.column(j).iter().chain(v_k.column(j).iter()) {
            if x.abs() > max_abs {
                max_abs = x.abs();
                max_val = x;
            }
        }
        if max_val < 0.0 {
            for x in u_k.column_mut(j).iter_mut() {
                *x = -*x;
            }
            for x in v_k.column_mut(j).iter_mut() {
                *x = -*x;
            }
        }
    }
}

/// Build the joint spectral embedding from a normalized matrix, keeping `k`
/// singular vectors after the trivial leading pair.
///
/// Requires `k + 1 <= min(m, n)`; the check runs before the SVD so an
/// undersized matrix never reaches the clustering stage.
pub fn spectral_embedding(normalized: &Normalized, k: usize) -> Result<Embedding, CoclusterError> {
    let (m, n) = (normalized.matrix.nrows(), normalized.matrix.ncols());
    let rank = m.min(n);
    if k >= rank {
        return Err(CoclusterError::InsufficientRank { requested: k, rank });
    }

    let (u, singular_values, v) = thin_svd(&normalized.matrix)?;
    debug!(
        "thin SVD of {}x{} matrix: leading singular value {:.6}",
        m,
        n,
        singular_values.first().copied().unwrap_or(0.0)
    );

    let mut u_k = u.columns(1, k).into_owned();
    let mut v_k = v.columns(1, k).into_owned();
    fix_signs(&mut u_k, &mut v_k);

    let r_scale = &normalized.scaling.row;
    let c_scale = &normalized.scaling.col;
    let coords = Array2::from_shape_fn((m + n, k), |(i, j)| {
        if i < m {
            r_scale[i] * u_k[(i, j)]
        } else {
            c_scale[i - m] * v_k[(i - m, j)]
        }
    });

    Ok(Embedding {
        coords,
        singular_values,
    })
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::normalize::bistochastic_normalize;

    fn random_affinity(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::random_using((rows, cols), Uniform::new(0.1, 1.0), &mut rng)
    }

    #[test]
    fn test_singular_vectors_are_orthonormal() {
        let a = random_affinity(12, 8, 5);
        let normalized = bistochastic_normalize(&a);
        let (u, _, v) = thin_svd(&normalized.matrix).unwrap();

        assert_eq!((u.nrows(), u.ncols()), (12, 8));
        assert_eq!((v.nrows(), v.ncols()), (8, 8));

        let u_gram = u.transpose() * &u;
        let v_gram = v.transpose() * &v;
        let identity = DMatrix::<f64>::identity(8, 8);
        assert!((u_gram - &identity).amax() < 1e-6);
        assert!((v_gram - &identity).amax() < 1e-6);
    }

    #[test]
    fn test_singular_values_descending() {
        let a = random_affinity(10, 14, 17);
        let normalized = bistochastic_normalize(&a);
        let (_, sigma, _) = thin_svd(&normalized.matrix).unwrap();

        assert_eq!(sigma.len(), 10);
        for pair in sigma.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_circulant_spectrum() {
        // Row and column sums are all 2, so A_norm = A / 2 and its singular
        // values are {1.0, 0.5, 0.5}.
        let a = array![[1.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 0.0, 1.0]];
        let normalized = bistochastic_normalize(&a);
        let embedding = spectral_embedding(&normalized, 1).unwrap();

        assert_eq!(embedding.coords.dim(), (6, 1));
        let sigma = &embedding.singular_values;
        assert!((sigma[0] - 1.0).abs() < 1e-9);
        assert!((sigma[1] - 0.5).abs() < 1e-9);
        assert!((sigma[2] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_rank_is_rejected() {
        let a = array![[1.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 0.0, 1.0]];
        let normalized = bistochastic_normalize(&a);

        let err = spectral_embedding(&normalized, 3).unwrap_err();
        assert_eq!(
            err,
            CoclusterError::InsufficientRank {
                requested: 3,
                rank: 3
            }
        );

        // A wide matrix is bounded by its smaller side.
        let wide = random_affinity(2, 5, 3);
        let normalized = bistochastic_normalize(&wide);
        assert!(matches!(
            spectral_embedding(&normalized, 2),
            Err(CoclusterError::InsufficientRank { rank: 2, .. })
        ));
    }

    #[test]
    fn test_huge_dimension_request_is_rejected() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let normalized = bistochastic_normalize(&a);

        let err = spectral_embedding(&normalized, usize::MAX).unwrap_err();
        assert_eq!(
            err,
            CoclusterError::InsufficientRank {
                requested: usize::MAX,
                rank: 2
            }
        );
    }

    #[test]
    fn test_embedding_is_deterministic() {
        let a = random_affinity(9, 7, 11);
        let normalized = bistochastic_normalize(&a);

        let first = spectral_embedding(&normalized, 2).unwrap();
        let second = spectral_embedding(&normalized, 2).unwrap();
        assert_eq!(first.coords, second.coords);
        assert_eq!(first.singular_values, second.singular_values);
    }

    #[test]
    fn test_zero_row_maps_to_origin() {
        let mut a = random_affinity(5, 4, 23);
        a.row_mut(2).fill(0.0);
        let normalized = bistochastic_normalize(&a);

        let embedding = spectral_embedding(&normalized, 2).unwrap();
        assert!(embedding.coords.iter().all(|v| v.is_finite()));
        assert!(embedding.coords.row(2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fix_signs_flips_whole_pairs() {
        let mut u = DMatrix::from_row_slice(2, 2, &[0.1, -0.3, 0.2, 0.4]);
        let mut v = DMatrix::from_row_slice(2, 2, &[-0.9, 0.2, 0.3, -0.5]);
        fix_signs(&mut u, &mut v);

        // Column 0: dominant entry was v[0] = -0.9, so the pair flips.
        assert_eq!((u[(0, 0)], u[(1, 0)]), (-0.1, -0.2));
        assert_eq!((v[(0, 0)], v[(1, 0)]), (0.9, -0.3));
        // Column 1: dominant entry was v[1] = -0.5, so the pair flips.
        assert_eq!((u[(0, 1)], u[(1, 1)]), (0.3, -0.4));
        assert_eq!((v[(0, 1)], v[(1, 1)]), (-0.2, 0.5));
    }

    #[test]
    fn test_fix_signs_first_occurrence_wins_ties() {
        let mut u = DMatrix::from_row_slice(1, 1, &[0.5]);
        let mut v = DMatrix::from_row_slice(1, 1, &[-0.5]);
        fix_signs(&mut u, &mut v);

        assert_eq!(u[(0, 0)], 0.5);
        assert_eq!(v[(0, 0)], -0.5);
    }
}
