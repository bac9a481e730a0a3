//! Integration tests for similarity construction and spectral bipartition
//!
//! Builds every kernel from raw features and splits row subsets through the
//! public API only.

use std::fs::File;

use approx::assert_relative_eq;
use fast_bipartition::util::{are_equivalent_classifications, labels_from_parts};
use fast_bipartition::*;
use ndarray::{array, Array1, Array2};
use ndarray_npy::ReadNpyExt;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use sprs::TriMat;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two planted groups of `per_group` rows in `n_cols` dimensions
fn create_planted_matrix(per_group: usize, n_cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut matrix = Array2::random_using((2 * per_group, n_cols), Uniform::new(0.0, 0.2), &mut rng);
    for i in 0..2 * per_group {
        let (start, end) = if i < per_group {
            (0, n_cols / 2)
        } else {
            (n_cols / 2, n_cols)
        };
        for j in start..end {
            matrix[[i, j]] += 1.0;
        }
    }
    matrix
}

fn build(kernel: Kernel, features: FeatureMatrix) -> SimilarityMatrix {
    SimilarityBuilder::new(SimilarityConfig::new(kernel))
        .unwrap()
        .build(&features)
        .unwrap()
}

fn assert_valid_partition(rows: &[usize], result: &PartitionResult) {
    if !result.is_split() {
        assert_eq!(result.modularity, 0.0);
        return;
    }
    assert_eq!(result.parts.len(), 2);
    let mut union = result.parts.concat();
    union.sort_unstable();
    let mut expected = rows.to_vec();
    expected.sort_unstable();
    assert_eq!(union, expected);
}

fn to_csr(dense: &Array2<f64>) -> sprs::CsMat<f64> {
    let mut tri = TriMat::new(dense.dim());
    for ((i, j), &v) in dense.indexed_iter() {
        if v != 0.0 {
            tri.add_triplet(i, j, v);
        }
    }
    tri.to_csr()
}

#[test]
fn test_every_kernel_recovers_planted_groups() {
    init_logger();
    let x = create_planted_matrix(6, 8, 7);
    let rows: Vec<usize> = (0..12).collect();
    let truth: Vec<usize> = (0..12).map(|i| i / 6).collect();
    let bipartitioner = SpectralBipartitioner::new(BipartitionConfig::default()).unwrap();

    for kernel in Kernel::ALL {
        let similarity = build(kernel, FeatureMatrix::dense(x.clone()));
        let result = bipartitioner.partition(&similarity, &rows).unwrap();
        assert_valid_partition(&rows, &result);
        assert!(result.is_split(), "{} did not split", kernel);
        assert!(result.modularity > 0.0, "{} gave Q = {}", kernel, result.modularity);
        assert!(
            are_equivalent_classifications(labels_from_parts(&rows, &result.parts), truth.clone()),
            "{} mixed the planted groups",
            kernel
        );
    }
}

#[test]
fn test_far_apart_gaussian_clusters() {
    init_logger();
    let x = array![
        [0.0, 0.0, 0.0],
        [0.1, 0.0, 0.0],
        [0.0, 0.1, 0.0],
        [10.0, 10.0, 10.0],
        [10.1, 10.0, 10.0],
        [10.0, 10.0, 10.1]
    ];
    let rows: Vec<usize> = (0..6).collect();
    let bipartitioner = SpectralBipartitioner::new(BipartitionConfig::default()).unwrap();

    for features in [FeatureMatrix::dense(x.clone()), FeatureMatrix::sparse(to_csr(&x))] {
        let similarity = build(Kernel::Gaussian, features);
        let result = bipartitioner.partition(&similarity, &rows).unwrap();
        assert_valid_partition(&rows, &result);
        assert!(result.is_split());
        assert!(result.modularity > 0.0);
        assert!(are_equivalent_classifications(
            labels_from_parts(&rows, &result.parts),
            vec![0, 0, 0, 1, 1, 1]
        ));
    }
}

#[test]
fn test_random_subsets_are_partitions() {
    let mut rng = StdRng::seed_from_u64(21);
    let x = Array2::random_using((30, 5), Uniform::new(0.0, 1.0), &mut rng);
    let bipartitioner = SpectralBipartitioner::new(BipartitionConfig::default()).unwrap();
    let subsets: Vec<Vec<usize>> = vec![
        (0..30).collect(),
        (0..30).step_by(2).collect(),
        vec![29, 3, 17, 8, 11, 0],
        vec![4, 5, 6],
    ];

    for kernel in Kernel::ALL {
        let similarity = build(kernel, FeatureMatrix::dense(x.clone()));
        for rows in &subsets {
            match bipartitioner.partition(&similarity, rows) {
                Ok(result) => assert_valid_partition(rows, &result),
                Err(e) => panic!("{} failed on {:?}: {}", kernel, rows, e),
            }
        }
    }
}

#[test]
fn test_sparse_and_dense_input_agree() {
    let x = create_planted_matrix(5, 6, 3);
    let rows: Vec<usize> = (0..10).collect();
    let bipartitioner = SpectralBipartitioner::new(BipartitionConfig::default()).unwrap();

    for kernel in [Kernel::CosineSparse, Kernel::NormSparse, Kernel::Gaussian] {
        let dense = build(kernel, FeatureMatrix::dense(x.clone()));
        let sparse = build(kernel, FeatureMatrix::sparse(to_csr(&x)));
        let a = bipartitioner.partition(&dense, &rows).unwrap();
        let b = bipartitioner.partition(&sparse, &rows).unwrap();
        assert_relative_eq!(a.modularity, b.modularity, epsilon = 1e-8);
        assert!(are_equivalent_classifications(
            labels_from_parts(&rows, &a.parts),
            labels_from_parts(&rows, &b.parts)
        ));
    }
}

#[test]
fn test_norm_operator_matches_materialized_similarity() {
    let mut rng = StdRng::seed_from_u64(13);
    let x = Array2::random_using((20, 4), Uniform::new(-1.0, 1.0), &mut rng);
    let similarity = build(Kernel::NormSparse, FeatureMatrix::sparse(to_csr(&x)));

    for rows in [vec![0, 5, 19, 7], (0..20).rev().collect::<Vec<usize>>()] {
        let block = similarity.restrict(&rows);
        let dense = block.materialize();
        for _ in 0..3 {
            let v = Array1::random_using(rows.len(), Uniform::new(-1.0, 1.0), &mut rng);
            let got = block.apply(v.view());
            let want = dense.dot(&v);
            for (a, b) in got.iter().zip(want.iter()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-10);
            }
        }
        let row_sums = block.row_sums();
        for (i, s) in row_sums.iter().enumerate() {
            assert_relative_eq!(*s, dense.row(i).sum(), epsilon = 1e-10);
        }
    }
}

#[test]
fn test_label_swap_keeps_modularity() {
    let x = create_planted_matrix(4, 6, 5);
    let similarity = build(Kernel::Laplacian, FeatureMatrix::dense(x));
    let rows: Vec<usize> = (0..8).collect();
    let block = similarity.restrict(&rows);
    let row_sums = block.row_sums();
    let labels = vec![0, 0, 1, 0, 1, 1, 0, 1];
    let swapped: Vec<usize> = labels.iter().map(|&l| 1 - l).collect();
    assert_relative_eq!(
        modularity(&block, &row_sums, &labels),
        modularity(&block, &row_sums, &swapped),
        epsilon = 1e-12
    );
}

#[test]
fn test_unknown_kernel_name() {
    match SimilarityConfig::from_kernel_name("bogus") {
        Err(SimilarityError::InvalidParameter(msg)) => assert!(msg.contains("bogus")),
        Err(e) => panic!("Expected InvalidParameter, got {}", e),
        Ok(_) => panic!("Expected an error"),
    }
}

#[test]
fn test_unprocessable_matrix() {
    let similarity = SimilarityMatrix::Dense(array![
        [1.0, -1.0, 0.0],
        [-1.0, 1.0, -1.0],
        [0.0, -1.0, 1.0]
    ]);
    let bipartitioner = SpectralBipartitioner::new(BipartitionConfig::default()).unwrap();
    assert!(matches!(
        bipartitioner.partition(&similarity, &[0, 1, 2]),
        Err(PartitionError::UnprocessableMatrix)
    ));
}

#[test]
fn test_shifted_cosine_splits_opposite_directions() {
    init_logger();
    let x = array![
        [1.0, 0.1],
        [0.9, 0.2],
        [1.1, 0.0],
        [-1.0, -0.1],
        [-0.9, -0.2],
        [-1.1, 0.05]
    ];
    let mut config = SimilarityConfig::new(Kernel::Cosine);
    config.shift = ShiftPolicy::UntilNonNegative;
    let similarity = SimilarityBuilder::new(config)
        .unwrap()
        .build(&FeatureMatrix::dense(x))
        .unwrap();
    assert!(similarity.as_dense().unwrap().iter().all(|&s| s >= 0.0));

    let rows: Vec<usize> = (0..6).collect();
    let result = SpectralBipartitioner::new(BipartitionConfig::default())
        .unwrap()
        .partition(&similarity, &rows)
        .unwrap();
    assert!(result.modularity > 0.0);
    assert!(are_equivalent_classifications(
        labels_from_parts(&rows, &result.parts),
        vec![0, 0, 0, 1, 1, 1]
    ));
}

#[test]
fn test_store_similarity_matrix() {
    let dir = std::env::temp_dir().join(format!("fast_bipartition_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let target = dir.join("gaussian.npy");

    let mut config = SimilarityConfig::new(Kernel::Gaussian);
    config.store_path = Some(target.clone());
    let similarity = SimilarityBuilder::new(config)
        .unwrap()
        .build(&FeatureMatrix::dense(create_planted_matrix(3, 4, 1)))
        .unwrap();

    let stored = Array2::<f64>::read_npy(File::open(&target).unwrap()).unwrap();
    assert_eq!(&stored, similarity.as_dense().unwrap());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_partition_many_subsets() {
    let x = create_planted_matrix(6, 8, 9);
    let similarity = build(Kernel::Gaussian, FeatureMatrix::dense(x));
    let bipartitioner = SpectralBipartitioner::new(BipartitionConfig::default()).unwrap();
    let subsets = vec![vec![0, 1, 2, 6, 7, 8], vec![3, 4, 5, 9, 10, 11]];
    let results = bipartitioner.partition_many(&similarity, &subsets).unwrap();
    for (rows, result) in subsets.iter().zip(results.iter()) {
        assert_valid_partition(rows, result);
        assert!(are_equivalent_classifications(
            labels_from_parts(rows, &result.parts),
            vec![0, 0, 0, 1, 1, 1]
        ));
    }
}

#[test]
fn test_init_logging_twice_fails() {
    // The test harness may already own the global logger.
    let first = init_logging(log::LevelFilter::Warn);
    let second = init_logging(log::LevelFilter::Warn);
    assert!(first.is_err() || second.is_err());
}
