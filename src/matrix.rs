/**
 * File: /src/matrix.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Dense / CSR feature matrix
 */

use ndarray::{Array1, Array2, ArrayView1};
use sprs::CsMat;

use crate::util::lp_norm;

/// Observation matrix: n rows (observations) × m columns (features)
///
/// Sparse input is kept in compressed-row form; a CSC matrix is converted on
/// construction so row access stays cheap.
#[derive(Debug, Clone)]
pub enum FeatureMatrix {
    Dense(Array2<f64>),
    Sparse(CsMat<f64>),
}

impl From<Array2<f64>> for FeatureMatrix {
    fn from(data: Array2<f64>) -> Self {
        FeatureMatrix::Dense(data)
    }
}

impl From<CsMat<f64>> for FeatureMatrix {
    fn from(data: CsMat<f64>) -> Self {
        FeatureMatrix::sparse(data)
    }
}

impl FeatureMatrix {
    pub fn dense(data: Array2<f64>) -> Self {
        FeatureMatrix::Dense(data)
    }

    pub fn sparse(data: CsMat<f64>) -> Self {
        if data.is_csr() {
            FeatureMatrix::Sparse(data)
        } else {
            FeatureMatrix::Sparse(data.to_csr())
        }
    }

    pub fn nrows(&self) -> usize {
        match self {
            FeatureMatrix::Dense(d) => d.nrows(),
            FeatureMatrix::Sparse(s) => s.rows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            FeatureMatrix::Dense(d) => d.ncols(),
            FeatureMatrix::Sparse(s) => s.cols(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureMatrix::Sparse(_))
    }

    /// Row `i` as a dense vector
    pub fn row_dense(&self, i: usize) -> Array1<f64> {
        match self {
            FeatureMatrix::Dense(d) => d.row(i).to_owned(),
            FeatureMatrix::Sparse(s) => {
                let mut row = Array1::zeros(s.cols());
                if let Some(view) = s.outer_view(i) {
                    for (j, &v) in view.iter() {
                        row[j] = v;
                    }
                }
                row
            }
        }
    }

    /// p-norm of every row; sparse rows only visit stored values
    pub fn row_norms(&self, p: f64) -> Array1<f64> {
        match self {
            FeatureMatrix::Dense(d) => d
                .rows()
                .into_iter()
                .map(|row| lp_norm(row.iter().copied(), p))
                .collect(),
            FeatureMatrix::Sparse(s) => s
                .outer_iterator()
                .map(|row| lp_norm(row.data().iter().copied(), p))
                .collect(),
        }
    }

    /// Copy of the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> FeatureMatrix {
        match self {
            FeatureMatrix::Dense(d) => FeatureMatrix::Dense(d.select(ndarray::Axis(0), rows)),
            FeatureMatrix::Sparse(s) => {
                let mut indptr = Vec::with_capacity(rows.len() + 1);
                let mut indices = Vec::new();
                let mut data = Vec::new();
                indptr.push(0);
                for &r in rows {
                    if let Some(view) = s.outer_view(r) {
                        indices.extend_from_slice(view.indices());
                        data.extend_from_slice(view.data());
                    }
                    indptr.push(indices.len());
                }
                FeatureMatrix::Sparse(CsMat::new((rows.len(), s.cols()), indptr, indices, data))
            }
        }
    }

    /// Multiply every row `i` by `factors[i]`
    pub fn scale_rows(&self, factors: &Array1<f64>) -> FeatureMatrix {
        match self {
            FeatureMatrix::Dense(d) => {
                let mut scaled = d.clone();
                for (mut row, &f) in scaled.rows_mut().into_iter().zip(factors.iter()) {
                    row.mapv_inplace(|v| v * f);
                }
                FeatureMatrix::Dense(scaled)
            }
            FeatureMatrix::Sparse(s) => {
                let mut indptr = Vec::with_capacity(s.rows() + 1);
                let mut indices = Vec::with_capacity(s.nnz());
                let mut data = Vec::with_capacity(s.nnz());
                indptr.push(0);
                for (row, &f) in s.outer_iterator().zip(factors.iter()) {
                    if f.is_finite() {
                        indices.extend_from_slice(row.indices());
                        data.extend(row.data().iter().map(|&v| v * f));
                    } else {
                        // 0 * f is NaN, so implicit zeros must be stored too
                        let mut full = vec![0.0; s.cols()];
                        for (j, &v) in row.iter() {
                            full[j] = v;
                        }
                        indices.extend(0..s.cols());
                        data.extend(full.into_iter().map(|v| v * f));
                    }
                    indptr.push(indices.len());
                }
                FeatureMatrix::Sparse(CsMat::new(s.shape(), indptr, indices, data))
            }
        }
    }

    /// y = B·v, `v` has one entry per column
    pub fn mul_vec(&self, v: ArrayView1<f64>) -> Array1<f64> {
        match self {
            FeatureMatrix::Dense(d) => d.dot(&v),
            FeatureMatrix::Sparse(s) => s
                .outer_iterator()
                .map(|row| row.iter().map(|(j, &x)| x * v[j]).sum())
                .collect(),
        }
    }

    /// y = Bᵗ·v, `v` has one entry per row
    pub fn t_mul_vec(&self, v: ArrayView1<f64>) -> Array1<f64> {
        match self {
            FeatureMatrix::Dense(d) => d.t().dot(&v),
            FeatureMatrix::Sparse(s) => {
                let mut out = Array1::zeros(s.cols());
                for (i, row) in s.outer_iterator().enumerate() {
                    let vi = v[i];
                    if vi == 0.0 {
                        continue;
                    }
                    for (j, &x) in row.iter() {
                        out[j] += x * vi;
                    }
                }
                out
            }
        }
    }

    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            FeatureMatrix::Dense(d) => d.clone(),
            FeatureMatrix::Sparse(s) => {
                let mut dense = Array2::zeros(s.shape());
                for (i, row) in s.outer_iterator().enumerate() {
                    for (j, &v) in row.iter() {
                        dense[(i, j)] = v;
                    }
                }
                dense
            }
        }
    }

    /// Mean of all rows
    pub fn centroid(&self) -> Array1<f64> {
        let n = self.nrows();
        if n == 0 {
            return Array1::zeros(self.ncols());
        }
        let ones = Array1::from_elem(n, 1.0 / n as f64);
        self.t_mul_vec(ones.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::test_utils::to_sparse;
    use ndarray::array;

    fn sample() -> Array2<f64> {
        array![[1.0, 0.0, 2.0], [0.0, 0.0, 3.0], [4.0, 5.0, 0.0], [0.0, 1.0, 1.0]]
    }

    #[test]
    fn test_shape() {
        let dense = FeatureMatrix::dense(sample());
        let sparse = FeatureMatrix::sparse(to_sparse(&sample()));
        assert_eq!(dense.shape(), (4, 3));
        assert_eq!(sparse.shape(), (4, 3));
        assert!(!dense.is_sparse());
        assert!(sparse.is_sparse());
    }

    #[test]
    fn test_csc_input_is_converted() {
        let csc = to_sparse(&sample()).to_csc();
        let matrix = FeatureMatrix::sparse(csc);
        match &matrix {
            FeatureMatrix::Sparse(s) => assert!(s.is_csr()),
            _ => panic!("Expected sparse matrix"),
        }
        assert_eq!(matrix.to_dense(), sample());
    }

    #[test]
    fn test_products_agree() {
        let dense = FeatureMatrix::dense(sample());
        let sparse = FeatureMatrix::sparse(to_sparse(&sample()));
        let v = array![0.5, -1.0, 2.0];
        let w = array![1.0, 2.0, -1.0, 0.5];

        let a = dense.mul_vec(v.view());
        let b = sparse.mul_vec(v.view());
        for i in 0..4 {
            assert_relative_eq!(a[i], b[i], epsilon = 1e-12);
        }
        assert_relative_eq!(a[0], 4.5, epsilon = 1e-12);

        let a = dense.t_mul_vec(w.view());
        let b = sparse.t_mul_vec(w.view());
        for j in 0..3 {
            assert_relative_eq!(a[j], b[j], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_select_rows_keeps_order() {
        let sparse = FeatureMatrix::sparse(to_sparse(&sample()));
        let picked = sparse.select_rows(&[2, 0]);
        assert_eq!(picked.to_dense(), array![[4.0, 5.0, 0.0], [1.0, 0.0, 2.0]]);

        let dense = FeatureMatrix::dense(sample()).select_rows(&[3]);
        assert_eq!(dense.to_dense(), array![[0.0, 1.0, 1.0]]);
    }

    #[test]
    fn test_row_norms() {
        let sparse = FeatureMatrix::sparse(to_sparse(&sample()));
        let norms = sparse.row_norms(1.0);
        assert_eq!(norms, array![3.0, 3.0, 9.0, 2.0]);
        let norms = FeatureMatrix::dense(sample()).row_norms(2.0);
        assert_relative_eq!(norms[2], 41.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_scale_rows_and_centroid() {
        let sparse = FeatureMatrix::sparse(to_sparse(&sample()));
        let scaled = sparse.scale_rows(&array![1.0, 2.0, 0.5, 0.0]);
        assert_eq!(scaled.row_dense(1), array![0.0, 0.0, 6.0]);
        assert_eq!(scaled.row_dense(3), array![0.0, 0.0, 0.0]);

        let c = FeatureMatrix::dense(sample()).centroid();
        assert_relative_eq!(c[0], 1.25, epsilon = 1e-12);
        assert_relative_eq!(c[1], 1.5, epsilon = 1e-12);
        assert_relative_eq!(c[2], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_factor_fills_sparse_row() {
        let factors = array![1.0, f64::NAN, 1.0, f64::INFINITY];
        let dense = FeatureMatrix::dense(sample()).scale_rows(&factors).to_dense();
        let sparse = FeatureMatrix::sparse(to_sparse(&sample()))
            .scale_rows(&factors)
            .to_dense();
        for (a, b) in dense.iter().zip(sparse.iter()) {
            assert_eq!(a.is_nan(), b.is_nan());
            if !a.is_nan() {
                assert_eq!(a, b);
            }
        }
        assert!(sparse.row(1).iter().all(|v| v.is_nan()));
        assert!(sparse[(3, 0)].is_nan());
        assert_eq!(sparse[(3, 1)], f64::INFINITY);
    }
}
