//! # Similarity Builder
//!
//! Builds the similarity representation once from a feature matrix. Dense
//! kernels are evaluated pairwise on a dedicated thread pool; `cosine_sparse`
//! and `norm_sparse` keep the (normalized) features and never form the n×n
//! matrix.

/**
 * File: /src/similarity.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Similarity representations for eight kernels
 */

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, Axis};
use ndarray_npy::WriteNpyExt;

use crate::config::{ShiftPolicy, SimilarityConfig};
use crate::diameter::DiameterEstimator;
use crate::kernel::{Kernel, PairwiseKernel};
use crate::matrix::FeatureMatrix;
use crate::normalization::RowNormalizer;
use crate::operator::{LinearOperator, NormSimilarityOperator};
use crate::types::SimilarityError;

pub const DEFAULT_MATRIX_FILE: &str = "similarity_matrix.npy";

/// Document-frequency reweighting applied before the similarity build
/// (fit on the count matrix, then transform it).
pub trait Reweighter: Send {
    fn fit_transform(&mut self, counts: &FeatureMatrix) -> Result<FeatureMatrix, SimilarityError>;
}

/// Similarity representation, built once and shared read-only afterwards
#[derive(Debug, Clone)]
pub enum SimilarityMatrix {
    /// S = B·Bᵗ over unit rows
    CosineSparse { features: FeatureMatrix },
    /// S = 1 − ‖x − y‖² · inv_diam_sq
    NormSparse {
        features: FeatureMatrix,
        norm_sq: Array1<f64>,
        inv_diam_sq: f64,
    },
    Dense(Array2<f64>),
}

impl SimilarityMatrix {
    pub fn nrows(&self) -> usize {
        match self {
            SimilarityMatrix::CosineSparse { features } => features.nrows(),
            SimilarityMatrix::NormSparse { features, .. } => features.nrows(),
            SimilarityMatrix::Dense(d) => d.nrows(),
        }
    }

    pub fn as_dense(&self) -> Option<&Array2<f64>> {
        match self {
            SimilarityMatrix::Dense(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_cosine_sparse(&self) -> bool {
        matches!(self, SimilarityMatrix::CosineSparse { .. })
    }

    /// Similarity restricted to `rows` (rows and columns, in the given order)
    pub fn restrict(&self, rows: &[usize]) -> SimilarityBlock {
        match self {
            SimilarityMatrix::CosineSparse { features } => {
                SimilarityBlock::Gram(features.select_rows(rows))
            }
            SimilarityMatrix::NormSparse {
                features,
                norm_sq,
                inv_diam_sq,
            } => SimilarityBlock::Norm(NormSimilarityOperator::new(
                features.select_rows(rows),
                norm_sq.select(Axis(0), rows),
                *inv_diam_sq,
            )),
            SimilarityMatrix::Dense(d) => {
                SimilarityBlock::Dense(d.select(Axis(0), rows).select(Axis(1), rows))
            }
        }
    }

    /// Store a dense matrix as `.npy`; a directory gets `similarity_matrix.npy`
    pub fn store(&self, path: &Path) -> Result<PathBuf, SimilarityError> {
        match self {
            SimilarityMatrix::Dense(d) => store_dense(d, path),
            _ => Err(SimilarityError::InvalidParameter(
                "only dense similarity matrices can be stored".to_string(),
            )),
        }
    }
}

/// Similarity of one row subset
#[derive(Debug, Clone)]
pub enum SimilarityBlock {
    Dense(Array2<f64>),
    /// S = B·Bᵗ, B holds the unit rows of the subset
    Gram(FeatureMatrix),
    Norm(NormSimilarityOperator),
}

impl SimilarityBlock {
    /// S·1
    pub fn row_sums(&self) -> Array1<f64> {
        let ones = Array1::ones(self.dim());
        self.apply(ones.view())
    }

    pub fn to_dense(&self) -> Array2<f64> {
        self.materialize()
    }

    /// True when the block is only available through products
    pub fn is_matrix_free(&self) -> bool {
        matches!(self, SimilarityBlock::Norm(_))
    }
}

impl LinearOperator for SimilarityBlock {
    fn dim(&self) -> usize {
        match self {
            SimilarityBlock::Dense(d) => d.nrows(),
            SimilarityBlock::Gram(b) => b.nrows(),
            SimilarityBlock::Norm(op) => op.dim(),
        }
    }

    fn apply(&self, v: ndarray::ArrayView1<f64>) -> Array1<f64> {
        match self {
            SimilarityBlock::Dense(d) => d.dot(&v),
            SimilarityBlock::Gram(b) => b.mul_vec(b.t_mul_vec(v).view()),
            SimilarityBlock::Norm(op) => op.apply(v),
        }
    }

    fn materialize(&self) -> Array2<f64> {
        match self {
            SimilarityBlock::Dense(d) => d.clone(),
            SimilarityBlock::Gram(b) => {
                let dense = b.to_dense();
                dense.dot(&dense.t())
            }
            SimilarityBlock::Norm(op) => op.to_dense(),
        }
    }
}

/// Builds a `SimilarityMatrix` from features and a `SimilarityConfig`
pub struct SimilarityBuilder {
    config: SimilarityConfig,
    reweighter: Option<Box<dyn Reweighter>>,
}

impl SimilarityBuilder {
    /// Validates the configuration before any matrix is touched
    pub fn new(config: SimilarityConfig) -> Result<Self, SimilarityError> {
        config.validate()?;
        Ok(Self {
            config,
            reweighter: None,
        })
    }

    pub fn with_reweighter(mut self, reweighter: Box<dyn Reweighter>) -> Self {
        self.reweighter = Some(reweighter);
        self
    }

    pub fn build(&mut self, features: &FeatureMatrix) -> Result<SimilarityMatrix, SimilarityError> {
        let kernel = self.config.kernel;
        let gamma = self.config.resolved_gamma(features.ncols())?;

        let reweighted = self.reweight(features)?;
        let x = reweighted.as_ref().unwrap_or(features);

        let normalized = if self.config.normalizes_rows() {
            let t0 = Instant::now();
            let normalizer = RowNormalizer::new(self.config.p_norm)?
                .with_policy(self.config.degenerate_rows);
            let out = normalizer.normalize(x)?;
            info!(
                "Elapsed time for normalization: {:.2} seconds.",
                t0.elapsed().as_secs_f64()
            );
            Some(out)
        } else {
            None
        };
        let x = normalized.as_ref().unwrap_or(x);

        info!(
            "Working with similarity_function={} on {} x {} ({})",
            kernel,
            x.nrows(),
            x.ncols(),
            if x.is_sparse() { "sparse" } else { "dense" }
        );

        match kernel {
            Kernel::CosineSparse => Ok(SimilarityMatrix::CosineSparse {
                features: x.clone(),
            }),
            Kernel::NormSparse => self.build_norm_sparse(x),
            _ => {
                let pairwise = PairwiseKernel {
                    kernel,
                    p: self.config.p_norm,
                    power: self.config.power,
                    gamma,
                };
                self.build_dense(x, pairwise).map(SimilarityMatrix::Dense)
            }
        }
    }

    fn reweight(&mut self, features: &FeatureMatrix) -> Result<Option<FeatureMatrix>, SimilarityError> {
        let reweighter = match self.reweighter.as_mut() {
            Some(r) => r,
            None => return Ok(None),
        };
        let t0 = Instant::now();
        info!("Using inverse document frequency (IDF).");
        let out = reweighter.fit_transform(features)?;
        if out.nrows() != features.nrows() {
            return Err(SimilarityError::ShapeMismatch {
                expected: features.nrows(),
                found: out.nrows(),
            });
        }
        // A dense input stays dense even if the reweighter produced CSR.
        let out = if out.is_sparse() && !features.is_sparse() {
            FeatureMatrix::Dense(out.to_dense())
        } else {
            out
        };
        info!(
            "Elapsed time for IDF build: {:.2} seconds.",
            t0.elapsed().as_secs_f64()
        );
        Ok(Some(out))
    }

    fn build_norm_sparse(&self, x: &FeatureMatrix) -> Result<SimilarityMatrix, SimilarityError> {
        let norm_sq = x.row_norms(2.0).mapv(|v| v * v);
        let diam = DiameterEstimator::new(self.config.diameter).estimate(x, 2.0)?;
        let inv_diam_sq = if diam > 0.0 {
            1.0 / (diam * diam)
        } else {
            warn!("All observations coincide; norm_sparse similarity is constant");
            0.0
        };
        debug!("norm_sparse diameter estimate: {}", diam);
        Ok(SimilarityMatrix::NormSparse {
            features: x.clone(),
            norm_sq,
            inv_diam_sq,
        })
    }

    fn build_dense(&self, x: &FeatureMatrix, pairwise: PairwiseKernel) -> Result<Array2<f64>, SimilarityError> {
        let t0 = Instant::now();
        info!("Building similarity matrix ...");
        let n_workers = self.config.workers.resolve(x.nrows());
        info!("Using n_workers={}.", n_workers);

        let points = match x {
            FeatureMatrix::Dense(d) => std::borrow::Cow::Borrowed(d),
            FeatureMatrix::Sparse(_) => {
                debug!("Densifying sparse features for pairwise evaluation");
                std::borrow::Cow::Owned(x.to_dense())
            }
        };
        let mut matrix = pairwise_matrix(&points, pairwise, n_workers)?;

        if pairwise.kernel == Kernel::DivByDeltaMax {
            let diam = matrix.iter().copied().fold(0.0, f64::max);
            if diam > 0.0 {
                matrix.mapv_inplace(|d| 1.0 - d / diam);
            } else {
                matrix.fill(1.0);
            }
        }

        apply_shift(&mut matrix, self.config.shift);

        if let Some(path) = &self.config.store_path {
            let stored = store_dense(&matrix, path)?;
            info!("Similarity matrix stored at {}", stored.display());
        }

        info!("Similarity matrix has been built.");
        info!(
            "Elapsed time for similarity build: {:.2} minutes.",
            t0.elapsed().as_secs_f64() / 60.0
        );
        Ok(matrix)
    }
}

/// Evaluates the upper triangle row by row on `n_workers` threads and mirrors
/// it, so the output does not depend on the worker count.
fn pairwise_matrix(
    points: &Array2<f64>,
    kernel: PairwiseKernel,
    n_workers: usize,
) -> Result<Array2<f64>, SimilarityError> {
    let n = points.nrows();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_workers)
        .build()
        .map_err(|e| SimilarityError::ThreadPool(e.to_string()))?;

    let mut matrix = Array2::zeros((n, n));
    pool.install(|| {
        matrix
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut row)| {
                let xi = points.row(i);
                for j in i..n {
                    row[j] = kernel.eval(xi, points.row(j));
                }
            });
    });
    for i in 1..n {
        for j in 0..i {
            matrix[(i, j)] = matrix[(j, i)];
        }
    }
    Ok(matrix)
}

fn apply_shift(matrix: &mut Array2<f64>, policy: ShiftPolicy) -> f64 {
    let shift = match policy {
        ShiftPolicy::None => 0.0,
        ShiftPolicy::Fixed(v) => v,
        ShiftPolicy::UntilNonNegative => {
            let min_value = matrix.iter().copied().fold(f64::INFINITY, f64::min);
            if min_value < 0.0 {
                -min_value
            } else {
                0.0
            }
        }
    };
    if shift != 0.0 {
        info!("Similarity matrix will be shifted. Shift: {}.", shift);
        *matrix += shift;
    }
    shift
}

fn store_dense(matrix: &Array2<f64>, path: &Path) -> Result<PathBuf, SimilarityError> {
    let target = if path.is_dir() {
        path.join(DEFAULT_MATRIX_FILE)
    } else {
        path.to_path_buf()
    };
    let file = File::create(&target)
        .map_err(|e| SimilarityError::Persist(format!("{}: {}", target.display(), e)))?;
    matrix
        .write_npy(BufWriter::new(file))
        .map_err(|e| SimilarityError::Persist(format!("{}: {}", target.display(), e)))?;
    Ok(target)
}
