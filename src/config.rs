/**
 * File: /src/config.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Similarity / bipartition configuration
 */
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diameter::DiameterStrategy;
use crate::kernel::Kernel;
use crate::normalization::DegenerateRowPolicy;
use crate::types::{PartitionError, SimilarityError};
use crate::util::workers_for_rows;

/// Uniform additive shift applied to a dense similarity matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum ShiftPolicy {
    #[default]
    None,
    /// Add a fixed value to every entry
    Fixed(f64),
    /// Add the smallest shift that makes every entry non-negative
    UntilNonNegative,
}

/// Number of workers used for dense pairwise evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WorkerPolicy {
    /// Row-count heuristic capped by the hardware parallelism
    #[default]
    Auto,
    Fixed(usize),
}

impl WorkerPolicy {
    pub fn resolve(&self, n_rows: usize) -> usize {
        match self {
            WorkerPolicy::Auto => workers_for_rows(n_rows, num_cpus::get()),
            WorkerPolicy::Fixed(n) => (*n).max(1),
        }
    }
}

/// Similarity build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub kernel: Kernel,
    /// p of the p-norm, >= 1
    pub p_norm: f64,
    /// Exponent of the distance in `neg_exp`, > 0
    pub power: f64,
    /// Kernel bandwidth, > 0; `None` means 1 / number of features
    pub gamma: Option<f64>,
    /// Normalize rows before building (always on for cosine_sparse and div_by_sum)
    pub normalize_rows: bool,
    pub degenerate_rows: DegenerateRowPolicy,
    pub shift: ShiftPolicy,
    /// Where to store the dense matrix as `.npy`; a directory gets `similarity_matrix.npy`
    pub store_path: Option<PathBuf>,
    pub workers: WorkerPolicy,
    /// Diameter strategy used by norm_sparse
    pub diameter: DiameterStrategy,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::CosineSparse,
            p_norm: 2.0,
            power: 1.0,
            gamma: None,
            normalize_rows: false,
            degenerate_rows: DegenerateRowPolicy::Fail,
            shift: ShiftPolicy::None,
            store_path: None,
            workers: WorkerPolicy::Auto,
            diameter: DiameterStrategy::CentroidBound,
        }
    }
}

impl SimilarityConfig {
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            ..Default::default()
        }
    }

    /// Config for a kernel given by name, e.g. `"gaussian"`
    pub fn from_kernel_name(name: &str) -> Result<Self, SimilarityError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn validate(&self) -> Result<(), SimilarityError> {
        if self.p_norm.is_nan() || self.p_norm < 1.0 {
            return Err(SimilarityError::InvalidParameter(format!(
                "unexpected similarity norm: {}",
                self.p_norm
            )));
        }
        if self.power.is_nan() || self.power <= 0.0 {
            return Err(SimilarityError::InvalidParameter(format!(
                "unexpected similarity power: {}",
                self.power
            )));
        }
        if let Some(gamma) = self.gamma {
            if gamma.is_nan() || gamma <= 0.0 {
                return Err(SimilarityError::InvalidParameter(format!(
                    "unexpected similarity gamma: {}",
                    gamma
                )));
            }
        }
        if self.kernel.requires_l1_or_l2() && self.p_norm != 1.0 && self.p_norm != 2.0 {
            return Err(SimilarityError::InvalidParameter(format!(
                "{} requires the L1 or L2 norm, got p = {}",
                self.kernel, self.p_norm
            )));
        }
        if let ShiftPolicy::Fixed(v) = self.shift {
            if !v.is_finite() {
                return Err(SimilarityError::InvalidParameter(format!(
                    "unexpected similarity shift: {}",
                    v
                )));
            }
        }
        Ok(())
    }

    /// gamma, defaulting to 1 / n_features
    pub fn resolved_gamma(&self, n_features: usize) -> Result<f64, SimilarityError> {
        match self.gamma {
            Some(gamma) => Ok(gamma),
            None if n_features > 0 => Ok(1.0 / n_features as f64),
            None => Err(SimilarityError::InvalidParameter(
                "default gamma needs at least one feature".to_string(),
            )),
        }
    }

    pub fn normalizes_rows(&self) -> bool {
        self.normalize_rows || self.kernel.requires_normalized_rows()
    }
}

/// Truncated eigensolver settings for operator blocks and the sparse SVD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobpcgConfig {
    /// Residual norm at which an eigenpair counts as converged
    pub tol: f32,
    pub max_iter: usize,
    /// Seed of the random initial block
    pub seed: u64,
}

impl Default for LobpcgConfig {
    fn default() -> Self {
        Self {
            tol: 1e-7,
            max_iter: 500,
            seed: 0,
        }
    }
}

/// Spectral bipartition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BipartitionConfig {
    /// Row sums with magnitude below this count as zero
    pub eps: f64,
    /// Blocks above this size log a cost warning before a dense solve
    pub expensive_block_rows: usize,
    /// For cosine_sparse, skip the truncated SVD and solve (L, M) directly
    pub use_symmetric_solver: bool,
    /// Refuse dense eigen-solves on larger blocks
    pub max_dense_rows: Option<usize>,
    pub lobpcg: LobpcgConfig,
}

impl Default for BipartitionConfig {
    fn default() -> Self {
        Self {
            eps: 1e-9,
            expensive_block_rows: 5000,
            use_symmetric_solver: false,
            max_dense_rows: None,
            lobpcg: LobpcgConfig::default(),
        }
    }
}

impl BipartitionConfig {
    pub fn validate(&self) -> Result<(), PartitionError> {
        if !(self.eps >= 0.0) {
            return Err(PartitionError::InvalidParameter(format!(
                "eps must be non-negative, got {}",
                self.eps
            )));
        }
        if self.lobpcg.max_iter == 0 {
            return Err(PartitionError::InvalidParameter(
                "lobpcg needs at least one iteration".to_string(),
            ));
        }
        if !(self.lobpcg.tol > 0.0) {
            return Err(PartitionError::InvalidParameter(format!(
                "lobpcg tolerance must be positive, got {}",
                self.lobpcg.tol
            )));
        }
        Ok(())
    }
}
