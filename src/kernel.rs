/**
 * File: /src/kernel.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Similarity kernel families
 */

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::types::SimilarityError;
use crate::util::{lp_distance, lp_norm};

/// Similarity kernel families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// B·Bᵗ on unit rows, split through a rank-2 truncated SVD
    #[default]
    CosineSparse,
    /// 1 − ‖x−y‖²/D², kept as a matrix-free operator
    NormSparse,
    Cosine,
    NegExp,
    Laplacian,
    Gaussian,
    DivBySum,
    DivByDeltaMax,
}

impl Kernel {
    pub const ALL: [Kernel; 8] = [
        Kernel::CosineSparse,
        Kernel::NormSparse,
        Kernel::Cosine,
        Kernel::NegExp,
        Kernel::Laplacian,
        Kernel::Gaussian,
        Kernel::DivBySum,
        Kernel::DivByDeltaMax,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Kernel::CosineSparse => "cosine_sparse",
            Kernel::NormSparse => "norm_sparse",
            Kernel::Cosine => "cosine",
            Kernel::NegExp => "neg_exp",
            Kernel::Laplacian => "laplacian",
            Kernel::Gaussian => "gaussian",
            Kernel::DivBySum => "div_by_sum",
            Kernel::DivByDeltaMax => "div_by_delta_max",
        }
    }

    pub fn is_translation_invariant(&self) -> bool {
        matches!(
            self,
            Kernel::NegExp | Kernel::Laplacian | Kernel::Gaussian | Kernel::DivByDeltaMax
        )
    }

    /// Kernels whose similarity matrix is never materialized
    pub fn is_implicit(&self) -> bool {
        matches!(self, Kernel::CosineSparse | Kernel::NormSparse)
    }

    /// Kernels that always work on row-normalized features
    pub fn requires_normalized_rows(&self) -> bool {
        matches!(self, Kernel::CosineSparse | Kernel::DivBySum)
    }

    /// Kernels defined only for the L1 and L2 norms
    pub fn requires_l1_or_l2(&self) -> bool {
        matches!(self, Kernel::DivBySum | Kernel::DivByDeltaMax)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = SimilarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kernel::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                SimilarityError::InvalidParameter(format!("unexpected similarity function: {}", s))
            })
    }
}

/// Fully resolved parameters of a dense pairwise kernel
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairwiseKernel {
    pub kernel: Kernel,
    pub p: f64,
    pub power: f64,
    pub gamma: f64,
}

impl PairwiseKernel {
    /// Value for a pair of rows; `div_by_delta_max` returns the raw distance
    /// and is rescaled once the diameter of the whole set is known.
    pub fn eval(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        match self.kernel {
            Kernel::Cosine => {
                let nx = lp_norm(x.iter().copied(), 2.0);
                let ny = lp_norm(y.iter().copied(), 2.0);
                if nx == 0.0 || ny == 0.0 {
                    0.0
                } else {
                    x.dot(&y) / (nx * ny)
                }
            }
            Kernel::NegExp => {
                let delta = lp_distance(x, y, self.p).powf(self.power);
                (-delta * self.gamma).exp()
            }
            Kernel::Laplacian => (-lp_distance(x, y, 1.0) * self.gamma).exp(),
            Kernel::Gaussian => {
                let d: f64 = x.iter().zip(y.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
                (-d * self.gamma).exp()
            }
            Kernel::DivBySum => {
                let denom = lp_norm(x.iter().copied(), self.p) + lp_norm(y.iter().copied(), self.p);
                if denom == 0.0 {
                    1.0
                } else {
                    1.0 - lp_distance(x, y, self.p) / denom
                }
            }
            Kernel::DivByDeltaMax => lp_distance(x, y, self.p),
            Kernel::CosineSparse | Kernel::NormSparse => {
                unreachable!("implicit kernels are never evaluated pairwise")
            }
        }
    }
}
