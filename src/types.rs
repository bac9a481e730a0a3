//! # Bipartition Data Structures
//!
//! Results and error types shared by the similarity builder and the
//! spectral bipartitioner.

/**
 * File: /src/types.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Result and error types for spectral bipartition
 */

use ndarray::Array1;
use std::error::Error;
use std::fmt;

/// Eigensolver that produced a split vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EigenStrategy {
    /// Rank-2 truncated SVD of the degree-scaled feature block (cosine_sparse)
    TruncatedSvd,
    /// Symmetric-definite solve of (L, M)
    SymmetricDefinite,
    /// General solver, chosen directly because of negative row sums
    General,
    /// General solver after the symmetric-definite attempt failed
    GeneralFallback,
}

/// One eigenpair of the generalized problem L·w = λ·M·w
#[derive(Debug, Clone)]
pub struct EigenSolution {
    pub eigenvalue: f64,
    pub eigenvector: Array1<f64>,
}

/// Typed outcome of a solver attempt that may be retried with another solver
#[derive(Debug)]
pub enum SolveOutcome {
    Converged(EigenSolution),
    NumericFailure(String),
}

/// Result of a single 2-way split
///
/// `parts` is either empty (no split) or holds exactly two non-empty,
/// disjoint row subsets whose union is the input subset.
#[derive(Debug, Clone)]
pub struct PartitionResult {
    /// Modularity gain Q of the split (0 when there is no split)
    pub modularity: f64,
    /// Original row indices of each class
    pub parts: Vec<Vec<usize>>,
    /// Solver that produced the split vector, if one ran
    pub strategy: Option<EigenStrategy>,
}

impl PartitionResult {
    /// No split: too small, degenerate split or no graph mass
    pub fn unsplit() -> Self {
        Self {
            modularity: 0.0,
            parts: Vec::new(),
            strategy: None,
        }
    }

    pub fn is_split(&self) -> bool {
        !self.parts.is_empty()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while building a similarity representation
#[derive(Debug)]
pub enum SimilarityError {
    InvalidParameter(String),
    /// A row with zero p-norm was found during normalization
    DegenerateRow { row: usize },
    ShapeMismatch { expected: usize, found: usize },
    Persist(String),
    ThreadPool(String),
}

impl fmt::Display for SimilarityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimilarityError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SimilarityError::DegenerateRow { row } => {
                write!(f, "Row {} has zero norm and cannot be normalized", row)
            }
            SimilarityError::ShapeMismatch { expected, found } => write!(
                f,
                "Shape mismatch: expected {} rows, found {}",
                expected, found
            ),
            SimilarityError::Persist(msg) => {
                write!(f, "Failed to store similarity matrix: {}", msg)
            }
            SimilarityError::ThreadPool(msg) => write!(f, "Thread pool creation failed: {}", msg),
        }
    }
}

impl Error for SimilarityError {}

/// Errors raised by the spectral bipartitioner
#[derive(Debug)]
pub enum PartitionError {
    InvalidParameter(String),
    /// Row sums of the block are simultaneously zero and negative
    UnprocessableMatrix,
    /// The general eigensolver failed (after the one allowed fallback)
    SolverFailure(String),
    /// A dense eigen-solve was requested on a block above the configured cap
    SizeLimitExceeded { rows: usize, limit: usize },
    ThreadPool(String),
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PartitionError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PartitionError::UnprocessableMatrix => {
                write!(f, "This matrix cannot be processed: zero and negative row sums")
            }
            PartitionError::SolverFailure(msg) => write!(f, "Eigensolver failed: {}", msg),
            PartitionError::SizeLimitExceeded { rows, limit } => write!(
                f,
                "Block of {} rows exceeds the dense solver limit of {} rows",
                rows, limit
            ),
            PartitionError::ThreadPool(msg) => write!(f, "Thread pool creation failed: {}", msg),
        }
    }
}

impl Error for PartitionError {}

impl From<SimilarityError> for PartitionError {
    fn from(e: SimilarityError) -> Self {
        match e {
            SimilarityError::InvalidParameter(msg) => PartitionError::InvalidParameter(msg),
            SimilarityError::ThreadPool(msg) => PartitionError::ThreadPool(msg),
            other => PartitionError::InvalidParameter(other.to_string()),
        }
    }
}
