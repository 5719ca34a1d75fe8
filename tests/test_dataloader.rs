//! Tests for mini-batch data loading
//!
//! This file tests SimpleDataLoader through the DataLoader trait:
//! - Batch sizes and the final partial batch
//! - Exhaustion and reset
//! - Seeded shuffling

use micro_nn::data::{Batch, DataLoader, DataLoaderSettings, SimpleDataLoader};
use micro_nn::linalg::Matrix;
use micro_nn::NnError;

fn rows(n: usize, width: usize) -> Vec<Matrix<f64>> {
    (0..n)
        .map(|i| Matrix::from_vec(1, width, vec![i as f64; width]).unwrap())
        .collect()
}

fn drain(loader: &mut dyn DataLoader<f64>) -> Vec<Batch<f64>> {
    let mut batches = Vec::new();
    while loader.has_next() {
        batches.push(loader.next_batch().unwrap());
    }
    batches
}

fn first_column(batches: &[Batch<f64>]) -> Vec<f64> {
    batches
        .iter()
        .flat_map(|batch| (0..batch.x.rows()).map(move |r| *batch.x.at(r, 0).unwrap()))
        .collect()
}

// ============================================================================
// Batching Tests
// ============================================================================

mod batching_tests {
    use super::*;

    #[test]
    fn test_batches_cover_all_samples() {
        let settings = DataLoaderSettings {
            batch_size: 4,
            ..Default::default()
        };
        let mut loader = SimpleDataLoader::new(rows(10, 3), rows(10, 1), settings).unwrap();
        let batches = drain(&mut loader);

        let sizes: Vec<usize> = batches.iter().map(|batch| batch.x.rows()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert!(batches.iter().all(|batch| batch.x.cols() == 3 && batch.y.cols() == 1));
        assert_eq!(first_column(&batches), (0..10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_exhausted_loader_errors() {
        let mut loader =
            SimpleDataLoader::new(rows(2, 1), rows(2, 1), DataLoaderSettings::default()).unwrap();
        drain(&mut loader);
        assert!(matches!(loader.next_batch(), Err(NnError::DataExhausted)));
    }

    #[test]
    fn test_mixed_widths_fail_when_stacked() {
        let x = vec![Matrix::from_vec(1, 2, vec![1.0, 2.0]).unwrap(), Matrix::from_scalar(3.0)];
        let y = rows(2, 1);
        let mut loader = SimpleDataLoader::new(x, y, DataLoaderSettings::default()).unwrap();
        assert!(matches!(loader.next_batch(), Err(NnError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            SimpleDataLoader::new(rows(3, 1), rows(4, 1), DataLoaderSettings::default()),
            Err(NnError::Configuration(_))
        ));
        let zero = DataLoaderSettings {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            SimpleDataLoader::new(rows(3, 1), rows(3, 1), zero),
            Err(NnError::Configuration(_))
        ));
    }
}

// ============================================================================
// Shuffle Tests
// ============================================================================

mod shuffle_tests {
    use super::*;

    fn shuffled(seed: u64) -> SimpleDataLoader<f64> {
        let settings = DataLoaderSettings {
            batch_size: 3,
            shuffle: true,
            seed: Some(seed),
        };
        SimpleDataLoader::new(rows(20, 1), rows(20, 1), settings).unwrap()
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = shuffled(7);
        let mut b = shuffled(7);
        assert_eq!(first_column(&drain(&mut a)), first_column(&drain(&mut b)));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut loader = shuffled(21);
        let mut order = first_column(&drain(&mut loader));
        assert_ne!(order, (0..20).map(|i| i as f64).collect::<Vec<_>>());
        order.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(order, (0..20).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_reset_reshuffles() {
        let mut loader = shuffled(5);
        let first_pass = first_column(&drain(&mut loader));
        loader.reset();
        let second_pass = first_column(&drain(&mut loader));
        assert_eq!(second_pass.len(), 20);
        assert_ne!(first_pass, second_pass);
    }

    #[test]
    fn test_pairs_stay_aligned() {
        let mut loader = shuffled(13);
        for batch in drain(&mut loader) {
            assert_eq!(batch.x, batch.y);
        }
    }
}
