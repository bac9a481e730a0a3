//! # Matrix-free linear operators
//!
//! Products needed by the eigensolvers without forming an n×n matrix.
//! Every operator here is self-adjoint when its inputs are symmetric, so the
//! same closure serves as product and adjoint product.

/**
 * File: /src/operator.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Matrix-free operators for the eigensolvers
 */

use ndarray::{Array1, Array2, ArrayView1};

use crate::matrix::FeatureMatrix;

/// Square operator known only through its matrix-vector product
pub trait LinearOperator: Send + Sync {
    fn dim(&self) -> usize;

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64>;

    /// Dense matrix of the operator, one product per column
    fn materialize(&self) -> Array2<f64> {
        let n = self.dim();
        let mut out = Array2::zeros((n, n));
        let mut unit = Array1::zeros(n);
        for j in 0..n {
            unit[j] = 1.0;
            out.column_mut(j).assign(&self.apply(unit.view()));
            unit[j] = 0.0;
        }
        out
    }
}

impl<T: LinearOperator + ?Sized> LinearOperator for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64> {
        (**self).apply(v)
    }

    fn materialize(&self) -> Array2<f64> {
        (**self).materialize()
    }
}

impl LinearOperator for Array2<f64> {
    fn dim(&self) -> usize {
        self.nrows()
    }

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64> {
        self.dot(&v)
    }

    fn materialize(&self) -> Array2<f64> {
        self.clone()
    }
}

/// S = 1·1ᵗ − invDiamSq·(norm²·1ᵗ + 1·norm²ᵗ − 2·B·Bᵗ)
///
/// i.e. S(x, y) = 1 − ‖x − y‖² / D² over the rows of B.
#[derive(Debug, Clone)]
pub struct NormSimilarityOperator {
    features: FeatureMatrix,
    norm_sq: Array1<f64>,
    inv_diam_sq: f64,
}

impl NormSimilarityOperator {
    pub fn new(features: FeatureMatrix, norm_sq: Array1<f64>, inv_diam_sq: f64) -> Self {
        debug_assert_eq!(features.nrows(), norm_sq.len());
        Self {
            features,
            norm_sq,
            inv_diam_sq,
        }
    }

    /// Closed form of the operator, O(n²·m)
    pub fn to_dense(&self) -> Array2<f64> {
        let b = self.features.to_dense();
        let gram = b.dot(&b.t());
        let n = self.norm_sq.len();
        Array2::from_shape_fn((n, n), |(i, j)| {
            1.0 - self.inv_diam_sq * (self.norm_sq[i] + self.norm_sq[j] - 2.0 * gram[(i, j)])
        })
    }
}

impl LinearOperator for NormSimilarityOperator {
    fn dim(&self) -> usize {
        self.norm_sq.len()
    }

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64> {
        let total = v.sum();
        let weighted = self.norm_sq.dot(&v);
        let bbtv = self.features.mul_vec(self.features.t_mul_vec(v).view());

        let mut dist = &self.norm_sq * total;
        dist += weighted;
        dist -= &(bbtv * 2.0);
        dist *= self.inv_diam_sq;
        dist.mapv(|d| total - d)
    }

    fn materialize(&self) -> Array2<f64> {
        self.to_dense()
    }
}

/// B·Bᵗ over the rows of a feature matrix, never formed
#[derive(Debug, Clone, Copy)]
pub struct GramOperator<'a> {
    features: &'a FeatureMatrix,
}

impl<'a> GramOperator<'a> {
    pub fn new(features: &'a FeatureMatrix) -> Self {
        Self { features }
    }
}

impl LinearOperator for GramOperator<'_> {
    fn dim(&self) -> usize {
        self.features.nrows()
    }

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64> {
        self.features.mul_vec(self.features.t_mul_vec(v).view())
    }
}

/// A(i, i) = diag(i)
#[derive(Debug, Clone)]
pub struct DiagonalOperator {
    diag: Array1<f64>,
}

impl DiagonalOperator {
    pub fn new(diag: Array1<f64>) -> Self {
        Self { diag }
    }

    pub fn diagonal(&self) -> &Array1<f64> {
        &self.diag
    }
}

impl LinearOperator for DiagonalOperator {
    fn dim(&self) -> usize {
        self.diag.len()
    }

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64> {
        &self.diag * &v
    }

    fn materialize(&self) -> Array2<f64> {
        Array2::from_diag(&self.diag)
    }
}

/// lhs − rhs, e.g. the Laplacian diag(row_sums) − S
#[derive(Debug, Clone)]
pub struct DifferenceOperator<A, B> {
    lhs: A,
    rhs: B,
}

impl<A: LinearOperator, B: LinearOperator> DifferenceOperator<A, B> {
    pub fn new(lhs: A, rhs: B) -> Self {
        debug_assert_eq!(lhs.dim(), rhs.dim());
        Self { lhs, rhs }
    }
}

impl<A: LinearOperator, B: LinearOperator> LinearOperator for DifferenceOperator<A, B> {
    fn dim(&self) -> usize {
        self.lhs.dim()
    }

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64> {
        self.lhs.apply(v) - self.rhs.apply(v)
    }

    fn materialize(&self) -> Array2<f64> {
        self.lhs.materialize() - self.rhs.materialize()
    }
}

/// D·A·D for a diagonal D, e.g. D^{-1/2}·S·D^{-1/2}
#[derive(Debug, Clone)]
pub struct SymmetricScaling<A> {
    inner: A,
    scale: DiagonalOperator,
}

impl<A: LinearOperator> SymmetricScaling<A> {
    pub fn new(inner: A, scale: Array1<f64>) -> Self {
        debug_assert_eq!(inner.dim(), scale.len());
        Self {
            inner,
            scale: DiagonalOperator::new(scale),
        }
    }
}

impl<A: LinearOperator> LinearOperator for SymmetricScaling<A> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn apply(&self, v: ArrayView1<f64>) -> Array1<f64> {
        let scaled = self.scale.apply(v);
        self.scale.apply(self.inner.apply(scaled.view()).view())
    }
}
