//! # Eigen strategies
//!
//! Split vectors for the generalized problem L·w = λ·M·w with
//! L = diag(row_sums) − S and M = diag(row_sums). Every strategy keeps the
//! two eigenvalues closest to zero and returns the one with the larger
//! magnitude. Near a degenerate pair this is an approximation of the
//! Fiedler vector, not an exact one.

/**
 * File: /src/eigen.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Symmetric-definite, general and truncated SVD solves
 */

use log::debug;
use nalgebra::SVD;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_linalg::lobpcg::{self, LobpcgResult};
use ndarray_linalg::{Eig, Eigh, Inverse, TruncatedOrder, UPLO};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use crate::config::LobpcgConfig;
use crate::matrix::FeatureMatrix;
use crate::operator::{GramOperator, LinearOperator, SymmetricScaling};
use crate::types::{EigenSolution, PartitionError, SolveOutcome};
use crate::util::clone_to_dmatrix;

/// Eigenvalues of D^{-1/2}·S·D^{-1/2} may not exceed 1 by more than this
const SPECTRAL_BOUND_TOL: f64 = 1e-8;

/// Two eigenvalues below this magnitude span a null space
const NULL_SPACE_TOL: f64 = 1e-10;

/// Eigenpairs extracted by the truncated solvers
const PAIRS: usize = 2;

/// Positions of the two smallest magnitudes, smallest first
///
/// NaN magnitudes are ignored; `None` when fewer than two remain.
fn two_smallest(magnitudes: &[f64]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..magnitudes.len())
        .filter(|&i| !magnitudes[i].is_nan())
        .collect();
    if order.len() < 2 {
        return None;
    }
    order.sort_by(|&a, &b| magnitudes[a].total_cmp(&magnitudes[b]));
    Some((order[0], order[1]))
}

/// Position of the larger-magnitude value among the two smallest magnitudes
pub(crate) fn larger_of_two_smallest(magnitudes: &[f64]) -> Option<usize> {
    two_smallest(magnitudes).map(|(_, larger)| larger)
}

/// Vector of span{u, v} that is M-orthogonal to the constant vector
///
/// With two vanishing eigenvalues the graph has separate components and the
/// solver may return any basis of the null space, e.g. one indicator per
/// component. The combination orthogonal to the trivial mode M·1 is the one
/// that changes sign across them.
fn null_space_split(u: ArrayView1<f64>, v: ArrayView1<f64>, mass: &Array1<f64>) -> Array1<f64> {
    let (mu, mv) = (mass.dot(&u), mass.dot(&v));
    let w = &u * mv - &v * mu;
    if w.iter().any(|&x| x != 0.0) {
        w
    } else {
        v.to_owned()
    }
}

/// Selection over real eigenpairs; `vectors` holds columns in L, M coordinates
fn select_split(values: &[f64], vectors: &Array2<f64>, mass: &Array1<f64>) -> SolveOutcome {
    let magnitudes: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    let (small, large) = match two_smallest(&magnitudes) {
        Some(pair) => pair,
        None => return SolveOutcome::NumericFailure("fewer than two eigenvalues".to_string()),
    };
    let eigenvector = if magnitudes[large] < NULL_SPACE_TOL {
        debug!("Null space of dimension >= 2, splitting along its non-constant direction");
        null_space_split(vectors.column(small), vectors.column(large), mass)
    } else {
        vectors.column(large).to_owned()
    };
    SolveOutcome::Converged(EigenSolution {
        eigenvalue: values[large],
        eigenvector,
    })
}

fn inverse_sqrt(mass: &Array1<f64>) -> Option<Array1<f64>> {
    if mass.iter().any(|&m| !(m > 0.0)) {
        return None;
    }
    Some(mass.mapv(|m| 1.0 / m.sqrt()))
}

/// Multiplies row i of `vectors` by `scale[i]`
fn scale_rows(mut vectors: Array2<f64>, scale: &Array1<f64>) -> Array2<f64> {
    for (mut row, &d) in vectors.rows_mut().into_iter().zip(scale.iter()) {
        row *= d;
    }
    vectors
}

/// The two algebraically largest eigenpairs of a symmetric operator
///
/// Small operators are materialized and fully decomposed; larger ones go
/// through LOBPCG and are touched only through `apply`.
pub fn largest_pairs<O: LinearOperator + ?Sized>(
    op: &O,
    config: &LobpcgConfig,
) -> Result<(Array1<f64>, Array2<f64>), String> {
    let n = op.dim();
    if n < PAIRS {
        return Err(format!(
            "cannot extract {} eigenpairs from dimension {}",
            PAIRS, n
        ));
    }

    // use full eigenvalue decomposition for small problem sizes
    if n < 5 * PAIRS + 1 {
        let (values, vectors) = op
            .materialize()
            .eigh(UPLO::Lower)
            .map_err(|e| format!("eigh failed: {}", e))?;
        let (values, vectors) = (values.slice_move(s![..;-1]), vectors.slice_move(s![.., ..;-1]));
        return Ok((
            values.slice_move(s![..PAIRS]),
            vectors.slice_move(s![.., ..PAIRS]),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let x = Array2::random_using((n, PAIRS), Uniform::new(0.0, 1.0), &mut rng);
    let result = lobpcg::lobpcg(
        |block: ArrayView2<f64>| {
            let mut out = Array2::<f64>::zeros(block.raw_dim());
            for (mut col, v) in out.columns_mut().into_iter().zip(block.columns()) {
                col.assign(&op.apply(v));
            }
            out
        },
        x,
        |_| {},
        None,
        config.tol,
        config.max_iter,
        TruncatedOrder::Largest,
    );

    match result {
        LobpcgResult::Ok(values, vectors, _) => Ok((values, vectors)),
        LobpcgResult::Err(_, _, _, e) => Err(format!("lobpcg did not converge: {}", e)),
        LobpcgResult::NoResult(e) => Err(format!("lobpcg failed: {}", e)),
    }
}

/// Dense symmetric-definite solve through D^{-1/2}·L·D^{-1/2}
pub fn symmetric_definite_dense(laplacian: &Array2<f64>, mass: &Array1<f64>) -> SolveOutcome {
    let scale = match inverse_sqrt(mass) {
        Some(scale) => scale,
        None => {
            return SolveOutcome::NumericFailure(
                "mass matrix is not positive definite".to_string(),
            )
        }
    };

    let n = laplacian.nrows();
    let scaled = Array2::from_shape_fn((n, n), |(i, j)| scale[i] * laplacian[(i, j)] * scale[j]);
    let (values, vectors) = match scaled.eigh(UPLO::Lower) {
        Ok(pair) => pair,
        Err(e) => return SolveOutcome::NumericFailure(format!("eigh failed: {}", e)),
    };

    let outcome = select_split(&values.to_vec(), &scale_rows(vectors, &scale), mass);
    if let SolveOutcome::Converged(solution) = &outcome {
        debug!("Symmetric-definite eigenvalue: {}", solution.eigenvalue);
    }
    outcome
}

/// Matrix-free symmetric-definite solve: the two largest eigenvalues μ of
/// D^{-1/2}·S·D^{-1/2} are the two smallest λ = 1 − μ.
pub fn symmetric_definite_operator<O: LinearOperator>(
    similarity: &O,
    mass: &Array1<f64>,
    config: &LobpcgConfig,
) -> SolveOutcome {
    let scale = match inverse_sqrt(mass) {
        Some(scale) => scale,
        None => {
            return SolveOutcome::NumericFailure(
                "mass matrix is not positive definite".to_string(),
            )
        }
    };

    let normalized = SymmetricScaling::new(similarity, scale.clone());
    let (mu, vectors) = match largest_pairs(&normalized, config) {
        Ok(pairs) => pairs,
        Err(msg) => return SolveOutcome::NumericFailure(msg),
    };
    debug!("Largest normalized eigenvalues: {:?}", mu);

    let top = mu.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if top > 1.0 + SPECTRAL_BOUND_TOL {
        return SolveOutcome::NumericFailure(format!(
            "normalized similarity has eigenvalue {} above 1",
            top
        ));
    }

    let lambdas: Vec<f64> = mu.iter().map(|m| 1.0 - m).collect();
    select_split(&lambdas, &scale_rows(vectors, &scale), mass)
}

/// Rank-2 truncated SVD of C = D^{-1/2}·B for S = B·Bᵗ
///
/// σ² are the eigenvalues of C·Cᵗ = D^{-1/2}·S·D^{-1/2}; the left singular
/// vector of the second singular value gives the split. Blocks with few rows
/// use a thin SVD of C, the rest LOBPCG on v ↦ C·(Cᵗ·v) over the stored
/// features.
pub fn truncated_svd(
    features: &FeatureMatrix,
    mass: &Array1<f64>,
    config: &LobpcgConfig,
) -> SolveOutcome {
    let scale = match inverse_sqrt(mass) {
        Some(scale) => scale,
        None => {
            return SolveOutcome::NumericFailure(
                "row sums must be positive for the truncated SVD".to_string(),
            )
        }
    };

    let (sigma_sq, left) = if features.nrows() < 5 * PAIRS + 1 {
        match thin_svd(features, &scale) {
            Ok(pairs) => pairs,
            Err(msg) => return SolveOutcome::NumericFailure(msg),
        }
    } else {
        let gram = SymmetricScaling::new(GramOperator::new(features), scale.clone());
        match largest_pairs(&gram, config) {
            Ok(pairs) => pairs,
            Err(msg) => return SolveOutcome::NumericFailure(msg),
        }
    };
    debug!("Truncated SVD: sigma^2 = {:?}", sigma_sq);

    let lambdas: Vec<f64> = sigma_sq.iter().map(|s| 1.0 - s).collect();
    select_split(&lambdas, &scale_rows(left, &scale), mass)
}

/// Top two σ² and left singular vectors of D^{-1/2}·B, from nalgebra
fn thin_svd(
    features: &FeatureMatrix,
    scale: &Array1<f64>,
) -> Result<(Array1<f64>, Array2<f64>), String> {
    let scaled = features.scale_rows(scale).to_dense();
    let svd = SVD::try_new(clone_to_dmatrix(scaled.view()), true, false, f64::EPSILON, 0)
        .ok_or_else(|| "SVD did not converge".to_string())?;
    let u = svd
        .u
        .ok_or_else(|| "SVD returned no left vectors".to_string())?;

    let sigma = &svd.singular_values;
    if sigma.len() < PAIRS {
        return Err("fewer than two singular values".to_string());
    }
    let mut order: Vec<usize> = (0..sigma.len()).collect();
    order.sort_by(|&a, &b| sigma[b].total_cmp(&sigma[a]));
    order.truncate(PAIRS);

    let values = order.iter().map(|&k| sigma[k] * sigma[k]).collect();
    let vectors = Array2::from_shape_fn((u.nrows(), PAIRS), |(i, k)| u[(i, order[k])]);
    Ok((values, vectors))
}

/// General solver on a dense (L, M) pencil
///
/// Rows with zero mass only carry infinite eigenvalues and are eliminated by
/// a Schur complement: K = L_PP − L_PZ·L_ZZ⁻¹·L_ZP, then M_P⁻¹·K is solved
/// with a general eigensolver and w_Z = −L_ZZ⁻¹·L_ZP·w_P.
pub fn general(laplacian: &Array2<f64>, mass: &Array1<f64>) -> Result<EigenSolution, PartitionError> {
    let n = laplacian.nrows();
    let (kept, zero): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| mass[i] != 0.0);
    if kept.len() < 2 {
        return Err(PartitionError::SolverFailure(format!(
            "only {} finite eigenvalues",
            kept.len()
        )));
    }

    let l_pp = laplacian.select(Axis(0), &kept).select(Axis(1), &kept);
    let (reduced, elimination) = if zero.is_empty() {
        (l_pp, None)
    } else {
        let l_zz = laplacian.select(Axis(0), &zero).select(Axis(1), &zero);
        let l_zp = laplacian.select(Axis(0), &zero).select(Axis(1), &kept);
        let l_pz = laplacian.select(Axis(0), &kept).select(Axis(1), &zero);
        let l_zz_inv = l_zz.inv().map_err(|e| {
            PartitionError::SolverFailure(format!("singular zero-mass block: {}", e))
        })?;
        let coupling = l_zz_inv.dot(&l_zp);
        (l_pp - l_pz.dot(&coupling), Some(coupling))
    };

    let mut pencil = reduced;
    for (mut row, &i) in pencil.rows_mut().into_iter().zip(kept.iter()) {
        let m = mass[i];
        row.mapv_inplace(|v| v / m);
    }

    let (values, vectors) = pencil
        .eig()
        .map_err(|e| PartitionError::SolverFailure(format!("eig failed: {}", e)))?;
    let magnitudes: Vec<f64> = values
        .iter()
        .map(|v| if v.re.is_finite() && v.im.is_finite() { v.norm() } else { f64::NAN })
        .collect();
    let idx = larger_of_two_smallest(&magnitudes).ok_or_else(|| {
        PartitionError::SolverFailure("fewer than two finite eigenvalues".to_string())
    })?;

    let column = vectors.column(idx);
    let real: Array1<f64> = column.mapv(|c| c.re);
    let w_kept = if real.iter().all(|&v| v.abs() < f64::EPSILON) {
        column.mapv(|c| c.im)
    } else {
        real
    };
    debug!("General eigenvalue: {}", values[idx]);

    let mut eigenvector = Array1::zeros(n);
    for (&i, &v) in kept.iter().zip(w_kept.iter()) {
        eigenvector[i] = v;
    }
    if let Some(coupling) = elimination {
        let w_zero = coupling.dot(&w_kept);
        for (&i, &v) in zero.iter().zip(w_zero.iter()) {
            eigenvector[i] = -v;
        }
    }

    Ok(EigenSolution {
        eigenvalue: values[idx].re,
        eigenvector,
    })
}
