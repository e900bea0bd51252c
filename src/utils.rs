use crate::prelude::*;

/// Outer product of two vectors: `M[i][j] = a[i] * b[j]`.
///
/// The lengths of `a` and `b` are unrelated; the result is `a.len() x b.len()`.
pub fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}

/// Elementwise maximum of a vector and a scalar.
pub fn maximum(arr: &Array1<f64>, num: f64) -> Array1<f64> {
    arr.mapv(|v| v.max(num))
}

/// Elementwise pairwise maximum of two vectors of equal length.
pub fn maximum_vec(arr1: &Array1<f64>, arr2: &Array1<f64>) -> Result<Array1<f64>> {
    if arr1.len() != arr2.len() {
        return Err(NNError::IncompatibleShape(format!(
            "maximum_vec requires equal lengths, got {} and {}",
            arr1.len(),
            arr2.len()
        )));
    }
    Ok(Zip::from(arr1).and(arr2).map_collect(|&x, &y| x.max(y)))
}
