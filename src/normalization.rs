/**
 * File: /src/normalization.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Row normalization to unit p-norm
 */

use log::{debug, warn};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::matrix::FeatureMatrix;
use crate::types::SimilarityError;

/// What to do with a row whose p-norm is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DegenerateRowPolicy {
    /// Fail with `SimilarityError::DegenerateRow`
    #[default]
    Fail,
    /// Divide anyway; the row becomes NaN
    Propagate,
    /// Leave the row as it is (all zeros)
    Skip,
}

/// Scales every row to unit p-norm.
///
/// Returns a new matrix; the input is never touched.
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    p: f64,
    policy: DegenerateRowPolicy,
}

impl RowNormalizer {
    pub fn new(p: f64) -> Result<Self, SimilarityError> {
        if p.is_nan() || p < 1.0 {
            return Err(SimilarityError::InvalidParameter(format!(
                "normalization norm must be >= 1, got {}",
                p
            )));
        }
        Ok(Self {
            p,
            policy: DegenerateRowPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: DegenerateRowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn row_norms(&self, matrix: &FeatureMatrix) -> Array1<f64> {
        matrix.row_norms(self.p)
    }

    /// Dense and sparse inputs go through the same per-row factors:
    /// DR = diag(norms ^ -1), X = DR * X
    pub fn normalize(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix, SimilarityError> {
        debug!(
            "Normalizing {} rows ({}) with p = {}",
            matrix.nrows(),
            if matrix.is_sparse() { "sparse" } else { "dense" },
            self.p
        );
        let norms = self.row_norms(matrix);
        let factors = self.inverse_norms(&norms)?;
        Ok(matrix.scale_rows(&factors))
    }

    fn inverse_norms(&self, norms: &Array1<f64>) -> Result<Array1<f64>, SimilarityError> {
        let mut factors = Array1::zeros(norms.len());
        let mut degenerate = 0usize;
        for (i, &norm) in norms.iter().enumerate() {
            if norm != 0.0 {
                factors[i] = 1.0 / norm;
                continue;
            }
            degenerate += 1;
            factors[i] = match self.policy {
                DegenerateRowPolicy::Fail => return Err(SimilarityError::DegenerateRow { row: i }),
                DegenerateRowPolicy::Propagate => f64::NAN,
                DegenerateRowPolicy::Skip => 1.0,
            };
        }
        if degenerate > 0 {
            warn!(
                "{} zero-norm rows found during normalization (policy {:?})",
                degenerate, self.policy
            );
        }
        Ok(factors)
    }
}
