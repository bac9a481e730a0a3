//! Shared fixtures for unit tests

/**
 * File: /src/test_utils.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Shared unit-test fixtures
 */

use ndarray::{array, Array2};
use sprs::{CsMat, TriMat};

use crate::types::PartitionResult;

pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// CSR copy of a dense matrix, zeros dropped
pub fn to_sparse(dense: &Array2<f64>) -> CsMat<f64> {
    let mut tri = TriMat::new(dense.dim());
    for ((i, j), &v) in dense.indexed_iter() {
        if v != 0.0 {
            tri.add_triplet(i, j, v);
        }
    }
    tri.to_csr()
}

/// Rows 0..4 around the origin, rows 4..8 around (2.5, 2.5, 2.5)
pub fn two_clusters() -> Array2<f64> {
    array![
        [0.0, 0.1, 0.0],
        [0.1, 0.0, 0.1],
        [0.0, 0.0, 0.2],
        [0.2, 0.1, 0.0],
        [2.5, 2.6, 2.5],
        [2.6, 2.5, 2.4],
        [2.4, 2.5, 2.6],
        [2.5, 2.4, 2.5],
    ]
}

/// Rows 0..3 near the origin, rows 3..6 near (10, 10, 10)
pub fn separated_clusters() -> Array2<f64> {
    array![
        [0.0, 0.0, 0.0],
        [0.1, 0.0, 0.0],
        [0.0, 0.1, 0.0],
        [10.0, 10.0, 10.0],
        [10.1, 10.0, 10.0],
        [10.0, 10.0, 10.1],
    ]
}

/// Rows 0..4 point along the first axis, rows 4..8 along the third
pub fn direction_clusters() -> Array2<f64> {
    array![
        [10.0, 0.1, 0.2],
        [9.0, 0.3, 0.1],
        [11.0, 0.2, 0.3],
        [10.5, 0.4, 0.2],
        [0.1, 0.2, 10.0],
        [0.3, 0.1, 9.5],
        [0.2, 0.3, 11.0],
        [0.1, 0.4, 10.5],
    ]
}

/// Vertices of a regular tetrahedron centred at the origin
pub fn tetrahedron() -> Array2<f64> {
    array![
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ]
}

/// Parts are empty or two non-empty disjoint sets covering `rows`
pub fn check_partition(rows: &[usize], result: &PartitionResult) {
    if !result.is_split() {
        assert_eq!(result.modularity, 0.0);
        return;
    }
    assert_eq!(result.parts.len(), 2);
    assert!(result.parts.iter().all(|p| !p.is_empty()));
    let mut union: Vec<usize> = result.parts.concat();
    union.sort_unstable();
    let mut expected = rows.to_vec();
    expected.sort_unstable();
    assert_eq!(union, expected);
}
