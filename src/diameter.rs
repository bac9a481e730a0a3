//! Diameter (maximum pairwise distance) of the rows of a feature matrix.

/**
 * File: /src/diameter.rs
 * Created Date: Monday, October 19th 2026
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-19		    	Diameter estimation for norm_sparse
 */

use log::{debug, warn};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::matrix::FeatureMatrix;
use crate::types::SimilarityError;
use crate::util::{lp_distance, lp_norm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiameterStrategy {
    /// Hull vertices, then all pairs among them
    ConvexHull,
    /// All pairs, exact, O(n²)
    BruteForce,
    /// 2 × max distance to the centroid, an upper bound in O(n·m)
    #[default]
    CentroidBound,
}

#[derive(Debug, Clone)]
pub struct DiameterEstimator {
    strategy: DiameterStrategy,
}

impl Default for DiameterEstimator {
    fn default() -> Self {
        Self::new(DiameterStrategy::default())
    }
}

impl DiameterEstimator {
    pub fn new(strategy: DiameterStrategy) -> Self {
        Self { strategy }
    }

    pub fn estimate(&self, points: &FeatureMatrix, p: f64) -> Result<f64, SimilarityError> {
        if p != 1.0 && p != 2.0 {
            return Err(SimilarityError::InvalidParameter(format!(
                "diameter norm must be 1 or 2, got {}",
                p
            )));
        }
        if points.nrows() < 2 {
            return Ok(0.0);
        }
        let diameter = match self.strategy {
            DiameterStrategy::ConvexHull => convex_hull_diameter(&points.to_dense(), p),
            DiameterStrategy::BruteForce => brute_force_diameter(&points.to_dense(), p),
            DiameterStrategy::CentroidBound => centroid_bound(points, p),
        };
        debug!(
            "Diameter of {} points ({:?}, p = {}): {}",
            points.nrows(),
            self.strategy,
            p,
            diameter
        );
        Ok(diameter)
    }
}

fn brute_force_diameter(points: &Array2<f64>, p: f64) -> f64 {
    let n = points.nrows();
    let mut best = 0.0_f64;
    for i in 0..n {
        for j in (i + 1)..n {
            best = best.max(lp_distance(points.row(i), points.row(j), p));
        }
    }
    best
}

/// By the triangle inequality ‖x − y‖ ≤ ‖x − c‖ + ‖c − y‖ ≤ 2·max‖z − c‖.
fn centroid_bound(points: &FeatureMatrix, p: f64) -> f64 {
    let centroid = points.centroid();
    let max_norm = match points {
        FeatureMatrix::Dense(d) => d
            .rows()
            .into_iter()
            .map(|row| lp_distance(row, centroid.view(), p))
            .fold(0.0, f64::max),
        FeatureMatrix::Sparse(s) => s
            .outer_iterator()
            .map(|row| {
                let mut diff = centroid.mapv(|c| -c);
                for (j, &v) in row.iter() {
                    diff[j] += v;
                }
                lp_norm(diff.iter().copied(), p)
            })
            .fold(0.0, f64::max),
    };
    2.0 * max_norm
}

fn convex_hull_diameter(points: &Array2<f64>, p: f64) -> f64 {
    let candidates: Vec<Array1<f64>> = match points.ncols() {
        0 => return 0.0,
        1 => {
            let (lo, hi) = points
                .column(0)
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            return hi - lo;
        }
        2 => hull_vertices_2d(points)
            .into_iter()
            .map(|i| points.row(i).to_owned())
            .collect(),
        dims => {
            warn!(
                "Convex hull is only computed up to 2 dimensions (got {}); using brute force",
                dims
            );
            return brute_force_diameter(points, p);
        }
    };
    let mut best = 0.0_f64;
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            best = best.max(lp_distance(candidates[i].view(), candidates[j].view(), p));
        }
    }
    best
}

/// Andrew's monotone chain, returns the row indices of the hull vertices
fn hull_vertices_2d(points: &Array2<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.nrows()).collect();
    order.sort_by(|&a, &b| {
        points[(a, 0)]
            .total_cmp(&points[(b, 0)])
            .then(points[(a, 1)].total_cmp(&points[(b, 1)]))
    });
    order.dedup_by(|a, b| {
        points[(*a, 0)] == points[(*b, 0)] && points[(*a, 1)] == points[(*b, 1)]
    });
    if order.len() < 3 {
        return order;
    }

    let cross = |o: usize, a: usize, b: usize| {
        (points[(a, 0)] - points[(o, 0)]) * (points[(b, 1)] - points[(o, 1)])
            - (points[(a, 1)] - points[(o, 1)]) * (points[(b, 0)] - points[(o, 0)])
    };

    let mut lower: Vec<usize> = Vec::new();
    for &i in &order {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], i) <= 0.0 {
            lower.pop();
        }
        lower.push(i);
    }
    let mut upper: Vec<usize> = Vec::new();
    for &i in order.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], i) <= 0.0 {
            upper.pop();
        }
        upper.push(i);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
