//! Similarity-matrix construction and spectral bipartition by modularity.
//!
//! ```ignore
//! let similarity = SimilarityBuilder::new(SimilarityConfig::new(Kernel::Gaussian))?
//!     .build(&FeatureMatrix::dense(points))?;
//! let bipartitioner = SpectralBipartitioner::new(BipartitionConfig::default())?;
//! let result = bipartitioner.partition(&similarity, &rows)?;
//! ```

/**
 * File: /src/lib.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Similarity matrices and modularity spectral bipartition
 */

pub mod bipartition;
pub mod config;
pub mod diameter;
pub mod eigen;
pub mod kernel;
pub mod matrix;
pub mod normalization;
pub mod operator;
pub mod similarity;
pub mod types;
pub mod util;

#[cfg(test)]
pub(crate) mod test_utils;

use log::LevelFilter;

pub use bipartition::{modularity, SpectralBipartitioner};
pub use config::{BipartitionConfig, LobpcgConfig, ShiftPolicy, SimilarityConfig, WorkerPolicy};
pub use diameter::{DiameterEstimator, DiameterStrategy};
pub use kernel::Kernel;
pub use matrix::FeatureMatrix;
pub use normalization::{DegenerateRowPolicy, RowNormalizer};
pub use operator::LinearOperator;
pub use similarity::{Reweighter, SimilarityBlock, SimilarityBuilder, SimilarityMatrix};
pub use types::{
    EigenSolution, EigenStrategy, PartitionError, PartitionResult, SimilarityError, SolveOutcome,
};

/// Installs `simple_logger` at `level`; the library itself only emits `log` records
pub fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    simple_logger::SimpleLogger::new().with_level(level).init()
}
