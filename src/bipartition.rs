//! # Spectral Bipartitioner
//!
//! Splits a row subset in two with the eigenvector of the normalized
//! Laplacian pencil (L, M) and scores the split by its modularity gain.

/**
 * File: /src/bipartition.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Modularity bipartition with strategy selection and fallback
 */

use std::collections::HashSet;
use std::time::Instant;

use log::{debug, warn};
use ndarray::{Array1, Array2};
use rayon::prelude::*;

use crate::config::BipartitionConfig;
use crate::eigen;
use crate::operator::{DiagonalOperator, DifferenceOperator, LinearOperator};
use crate::similarity::{SimilarityBlock, SimilarityMatrix};
use crate::types::{EigenSolution, EigenStrategy, PartitionError, PartitionResult, SolveOutcome};

/// Modularity gain Q of a labelling of the rows of `similarity`
///
/// Q = Σ_c [O_c / L_all − (L_c / L_all)²] with O_c = 1_cᵗ·S·1_c − |c|,
/// L_c = 1_cᵗ·row_sums − |c| and L_all = 1ᵗ·row_sums − n.
pub fn modularity<O: LinearOperator + ?Sized>(
    similarity: &O,
    row_sums: &Array1<f64>,
    labels: &[usize],
) -> f64 {
    let n = labels.len();
    let total = row_sums.sum() - n as f64;
    if total == 0.0 {
        return 0.0;
    }
    let n_classes = labels.iter().max().map_or(0, |&m| m + 1);
    (0..n_classes)
        .map(|c| {
            let indicator: Array1<f64> = labels
                .iter()
                .map(|&l| if l == c { 1.0 } else { 0.0 })
                .collect();
            let size = indicator.sum();
            if size == 0.0 {
                return 0.0;
            }
            let inner = indicator.dot(&similarity.apply(indicator.view())) - size;
            let degree = indicator.dot(row_sums) - size;
            inner / total - (degree / total).powi(2)
        })
        .sum()
}

/// Rejects out-of-range and repeated row indices
fn validate_rows(rows: &[usize], n_rows: usize) -> Result<(), PartitionError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for &r in rows {
        if r >= n_rows {
            return Err(PartitionError::InvalidParameter(format!(
                "row index {} out of range for {} rows",
                r, n_rows
            )));
        }
        if !seen.insert(r) {
            return Err(PartitionError::InvalidParameter(format!(
                "row index {} appears more than once",
                r
            )));
        }
    }
    Ok(())
}

pub struct SpectralBipartitioner {
    config: BipartitionConfig,
}

impl SpectralBipartitioner {
    pub fn new(config: BipartitionConfig) -> Result<Self, PartitionError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Splits `rows` (indices into `similarity`) into two classes
    ///
    /// Returns an unsplit result when the subset has fewer than 3 rows, has
    /// no graph mass, or the split vector puts every row on one side.
    pub fn partition(
        &self,
        similarity: &SimilarityMatrix,
        rows: &[usize],
    ) -> Result<PartitionResult, PartitionError> {
        validate_rows(rows, similarity.nrows())?;
        let n = rows.len();
        if n < 3 {
            debug!("Subset of {} rows is too small to split", n);
            return Ok(PartitionResult::unsplit());
        }

        let t0 = Instant::now();
        let block = similarity.restrict(rows);
        let eps = self.config.eps;
        let mut row_sums = block.row_sums();

        let has_zero = row_sums.iter().any(|s| s.abs() < eps);
        let has_neg = row_sums.iter().any(|&s| s < -eps);
        if has_zero && has_neg {
            return Err(PartitionError::UnprocessableMatrix);
        }
        row_sums.mapv_inplace(|s| if s.abs() < eps { 0.0 } else { s });

        if row_sums.iter().all(|&s| s == 0.0) {
            debug!("All row sums are zero, nothing to split");
            return Ok(PartitionResult::unsplit());
        }
        let total = row_sums.sum() - n as f64;
        if total.abs() < eps {
            debug!("Total edge weight {} is zero, nothing to split", total);
            return Ok(PartitionResult::unsplit());
        }

        let (solution, strategy) = self.split_vector(&block, &row_sums, has_zero, has_neg)?;

        let labels: Vec<usize> = solution
            .eigenvector
            .iter()
            .map(|&w| if w > 0.0 { 0 } else { 1 })
            .collect();
        let mut parts = vec![Vec::new(), Vec::new()];
        for (&row, &label) in rows.iter().zip(labels.iter()) {
            parts[label].push(row);
        }
        if parts.iter().any(Vec::is_empty) {
            debug!("Split vector is one-sided ({:?})", strategy);
            return Ok(PartitionResult::unsplit());
        }

        let q = modularity(&block, &row_sums, &labels);
        debug!(
            "Split {} rows into {} / {} with Q = {:.6} ({:?}, eigenvalue {:.3e}, {:.2}s)",
            n,
            parts[0].len(),
            parts[1].len(),
            q,
            strategy,
            solution.eigenvalue,
            t0.elapsed().as_secs_f64()
        );
        Ok(PartitionResult {
            modularity: q,
            parts,
            strategy: Some(strategy),
        })
    }

    /// `partition` on a dedicated pool of `num_threads` workers
    pub fn partition_parallel(
        &self,
        similarity: &SimilarityMatrix,
        rows: &[usize],
        num_threads: usize,
    ) -> Result<PartitionResult, PartitionError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| PartitionError::ThreadPool(e.to_string()))?;

        pool.install(|| self.partition(similarity, rows))
    }

    /// Partitions disjoint subsets concurrently, results in input order
    pub fn partition_many(
        &self,
        similarity: &SimilarityMatrix,
        subsets: &[Vec<usize>],
    ) -> Result<Vec<PartitionResult>, PartitionError> {
        let all: Vec<usize> = subsets.concat();
        validate_rows(&all, similarity.nrows())?;

        subsets
            .par_iter()
            .map(|rows| self.partition(similarity, rows))
            .collect()
    }

    fn split_vector(
        &self,
        block: &SimilarityBlock,
        row_sums: &Array1<f64>,
        has_zero: bool,
        has_neg: bool,
    ) -> Result<(EigenSolution, EigenStrategy), PartitionError> {
        if let SimilarityBlock::Gram(features) = block {
            if !has_neg && !has_zero && !self.config.use_symmetric_solver {
                match eigen::truncated_svd(features, row_sums, &self.config.lobpcg) {
                    SolveOutcome::Converged(solution) => {
                        return Ok((solution, EigenStrategy::TruncatedSvd))
                    }
                    SolveOutcome::NumericFailure(msg) => {
                        debug!("Truncated SVD not usable ({}), solving (L, M)", msg)
                    }
                }
            }
        }

        if has_neg {
            let laplacian = self.dense_laplacian(block, row_sums)?;
            return eigen::general(&laplacian, row_sums).map(|s| (s, EigenStrategy::General));
        }

        let laplacian = if block.is_matrix_free() {
            None
        } else {
            Some(self.dense_laplacian(block, row_sums)?)
        };
        let first = match &laplacian {
            Some(l) => eigen::symmetric_definite_dense(l, row_sums),
            None => eigen::symmetric_definite_operator(block, row_sums, &self.config.lobpcg),
        };

        match first {
            SolveOutcome::Converged(solution) => Ok((solution, EigenStrategy::SymmetricDefinite)),
            SolveOutcome::NumericFailure(msg) => {
                warn!(
                    "Symmetric-definite solve failed ({}), falling back to the general solver",
                    msg
                );
                let laplacian = match laplacian {
                    Some(l) => l,
                    None => self.dense_laplacian(block, row_sums)?,
                };
                eigen::general(&laplacian, row_sums).map(|s| (s, EigenStrategy::GeneralFallback))
            }
        }
    }

    /// L = diag(row_sums) − S, densely, for the O(n³) solvers
    fn dense_laplacian(
        &self,
        block: &SimilarityBlock,
        row_sums: &Array1<f64>,
    ) -> Result<Array2<f64>, PartitionError> {
        let n = block.dim();
        if let Some(limit) = self.config.max_dense_rows {
            if n > limit {
                return Err(PartitionError::SizeLimitExceeded { rows: n, limit });
            }
        }
        if n > self.config.expensive_block_rows {
            warn!(
                "This operation is very expensive for a block of {} rows (dense eigen-solve)",
                n
            );
        }
        Ok(DifferenceOperator::new(DiagonalOperator::new(row_sums.clone()), block).materialize())
    }
}
