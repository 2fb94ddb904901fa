use std::collections::HashMap;

use nalgebra::DMatrix;
use ndarray::ArrayView2;

/// Check whether two label vectors describe the same partition up to a
/// renaming of cluster ids.
pub fn are_equivalent_classifications(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut a_to_b = HashMap::new();
    let mut b_to_a = HashMap::new();

    for (&a_class, &b_class) in a.iter().zip(b.iter()) {
        let a_mapped = a_to_b.entry(a_class).or_insert(b_class);
        let b_mapped = b_to_a.entry(b_class).or_insert(a_class);

        if *a_mapped != b_class || *b_mapped != a_class {
            return false;
        }
    }

    true
}

/// Clone an ndarray view into a nalgebra matrix.
///
/// `DMatrix::from_vec` fills column-major while ndarray iterates row-major,
/// so the matrix is built transposed and flipped back.
pub fn clone_to_dmatrix(view: ArrayView2<'_, f64>) -> DMatrix<f64> {
    let elements: Vec<f64> = view.iter().copied().collect();
    DMatrix::from_vec(view.ncols(), view.nrows(), elements).transpose()
}
