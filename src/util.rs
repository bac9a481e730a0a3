/**
 * File: /src/util.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Norm helpers, worker heuristic, label comparison
**/
use std::collections::HashMap;
extern crate nalgebra as na;
use na::DMatrix;
use ndarray::ArrayView1;

/// p-norm of a sequence of values; `p = ∞` gives the max norm
pub fn lp_norm<I>(values: I, p: f64) -> f64
where
    I: Iterator<Item = f64>,
{
    if p == 1.0 {
        values.map(f64::abs).sum()
    } else if p == 2.0 {
        values.map(|v| v * v).sum::<f64>().sqrt()
    } else if p.is_infinite() {
        values.fold(0.0, |acc, v| acc.max(v.abs()))
    } else {
        values.map(|v| v.abs().powf(p)).sum::<f64>().powf(1.0 / p)
    }
}

/// ‖x − y‖ₚ
pub fn lp_distance(x: ArrayView1<f64>, y: ArrayView1<f64>, p: f64) -> f64 {
    lp_norm(x.iter().zip(y.iter()).map(|(a, b)| a - b), p)
}

/// Worker count for dense pairwise evaluation
///
/// 1 below 500 rows, up to 8 below 5000, up to 16 below 50000 and up to 25
/// above, never more than `available`.
pub fn workers_for_rows(n_rows: usize, available: usize) -> usize {
    let wanted = if n_rows < 500 {
        1
    } else if n_rows < 5000 {
        8
    } else if n_rows < 50000 {
        16
    } else {
        25
    };
    wanted.min(available.max(1))
}

/// 检查两个分类结果是否等价
pub fn are_equivalent_classifications(a: Vec<usize>, b: Vec<usize>) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut a_to_b_map = HashMap::new();
    let mut b_to_a_map = HashMap::new();

    for (&a_class, &b_class) in a.iter().zip(b.iter()) {
        let a_mapped = a_to_b_map.entry(a_class).or_insert(b_class);
        let b_mapped = b_to_a_map.entry(b_class).or_insert(a_class);

        if a_mapped != &b_class || b_mapped != &a_class {
            return false;
        }
    }

    true
}

/// Labels (0 / 1) of `rows` according to a 2-way split
pub fn labels_from_parts(rows: &[usize], parts: &[Vec<usize>]) -> Vec<usize> {
    rows.iter()
        .map(|r| {
            parts
                .iter()
                .position(|part| part.contains(r))
                .unwrap_or(usize::MAX)
        })
        .collect()
}

pub fn clone_to_dmatrix<T>(array_view: ndarray::ArrayView2<T>) -> DMatrix<T>
where
    T: Clone,
    T: na::Scalar,
{
    let nrows = array_view.ncols();
    let ncols = array_view.nrows();
    let elements = array_view.iter().cloned().collect::<Vec<T>>();
    DMatrix::from_vec(nrows, ncols, elements).transpose()
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_lp_norm() {
        let v = [3.0, -4.0];
        assert_eq!(lp_norm(v.iter().copied(), 1.0), 7.0);
        assert_eq!(lp_norm(v.iter().copied(), 2.0), 5.0);
        assert_eq!(lp_norm(v.iter().copied(), f64::INFINITY), 4.0);
        let p3 = lp_norm(v.iter().copied(), 3.0);
        assert!((p3 - 91.0_f64.powf(1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_lp_distance() {
        let x = array![1.0, 2.0, 3.0];
        let y = array![1.0, 0.0, 0.0];
        assert_eq!(lp_distance(x.view(), y.view(), 1.0), 5.0);
        assert!((lp_distance(x.view(), y.view(), 2.0) - 13.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_workers_for_rows() {
        assert_eq!(workers_for_rows(10, 64), 1);
        assert_eq!(workers_for_rows(499, 64), 1);
        assert_eq!(workers_for_rows(500, 64), 8);
        assert_eq!(workers_for_rows(500, 4), 4);
        assert_eq!(workers_for_rows(5000, 64), 16);
        assert_eq!(workers_for_rows(50000, 64), 25);
        assert_eq!(workers_for_rows(50000, 12), 12);
        assert_eq!(workers_for_rows(50000, 0), 1);
    }

    #[test]
    fn test_are_equivalent_classifications() {
        assert!(are_equivalent_classifications(
            vec![0, 2, 1, 1],
            vec![1, 2, 0, 0]
        ));
        assert!(!are_equivalent_classifications(
            vec![0, 1, 1, 2],
            vec![1, 2, 0, 0]
        ));
        assert!(!are_equivalent_classifications(
            vec![0, 1, 1],
            vec![1, 2, 0, 0]
        ));
    }

    #[test]
    fn test_labels_from_parts() {
        let rows = [4, 7, 9, 2];
        let parts = vec![vec![7, 2], vec![4, 9]];
        assert_eq!(labels_from_parts(&rows, &parts), vec![1, 0, 1, 0]);
    }

    /// Test for cloning an ndarray array view into a nalgebra DMatrix.
    #[test]
    fn test_clone_to_dmatrix() {
        let array = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let array_view = array.view();
        let dmatrix = clone_to_dmatrix(array_view);

        assert_eq!(array_view.nrows(), dmatrix.nrows());
        assert_eq!(array_view.ncols(), dmatrix.ncols());
        for i in 0..array_view.nrows() {
            for j in 0..array_view.ncols() {
                assert_eq!(array_view[(i, j)], dmatrix[(i, j)]);
            }
        }
    }
}
