use anyhow::Result;
use dialog_learn::{
    FeatureVector, HyperParameter, Instance, Method, OnlineOptimizer, OptimizerKind,
    RegularizedDualAveraging, SparseVector, from_bytes, to_bytes,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LABELS: usize = 4;

/// A reproducible stream of instances whose label correlates with the
/// first active feature.
fn corpus(seed: u64, size: usize) -> Vec<Instance> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..size)
        .map(|_| {
            let label = rng.gen_range(0..LABELS);
            let mut sparse = SparseVector::new();
            sparse.add(1 + label * 3, 1.0);
            for _ in 0..3 {
                sparse.add(rng.gen_range(1..20), rng.gen_range(0.5..1.5));
            }
            let dense = vec![rng.gen_range(-1.0..1.0), label as f32 * 0.25];
            Instance::single(FeatureVector::mixed(sparse, dense), label)
        })
        .collect()
}

fn optimizer(method: Method, bias: f32) -> Result<OnlineOptimizer> {
    let mut optimizer = OnlineOptimizer::new(method, 0.05, bias)?;
    for label in 0..LABELS {
        optimizer.labels_mut().add(&format!("L{label}"));
    }
    Ok(optimizer)
}

fn train_all(optimizer: &mut OnlineOptimizer, instances: &[Instance]) -> Result<()> {
    for instance in instances {
        optimizer.train(&mut instance.clone())?;
        optimizer.update_mini_batch();
    }
    Ok(())
}

#[test]
fn ada_grad_is_deterministic() -> Result<()> {
    let instances = corpus(7, 200);

    let mut first = optimizer(Method::ada_grad(), 1.0)?;
    let mut second = optimizer(Method::ada_grad(), 1.0)?;
    train_all(&mut first, &instances)?;
    train_all(&mut second, &instances)?;

    assert!(first.count_non_zero() > 0);
    assert_eq!(first.weights(), second.weights());
    Ok(())
}

#[test]
fn mini_batch_of_one_follows_plain_ada_grad() -> Result<()> {
    let instances = corpus(11, 150);

    let mut plain = optimizer(Method::ada_grad(), 1.0)?;
    let mut batched = optimizer(Method::ada_grad_mini_batch(), 1.0)?;

    for instance in &instances {
        let mut left = instance.clone();
        let mut right = instance.clone();
        plain.train(&mut left)?;
        batched.train(&mut right)?;
        batched.update_mini_batch();

        assert_eq!(left.predicted_label(), right.predicted_label());
        assert_eq!(plain.weights(), batched.weights());
    }
    Ok(())
}

#[test]
fn mini_batch_of_one_follows_plain_ada_grad_under_regularization() -> Result<()> {
    let instances = corpus(17, 400);
    let regularized = |method: Method| -> Result<OnlineOptimizer> {
        let mut optimizer = OnlineOptimizer::new(method, 2.0, 0.0)?
            .with_regularizer(RegularizedDualAveraging::new(0.001)?);
        for label in 0..LABELS {
            optimizer.labels_mut().add(&format!("L{label}"));
        }
        Ok(optimizer)
    };
    let mut plain = regularized(Method::ada_grad())?;
    let mut batched = regularized(Method::ada_grad_mini_batch())?;

    // Confident instances leave the weights alone but still count as a
    // step of the regularizer schedule.
    let mut untouched = 0;
    for instance in &instances {
        let before = plain.weights().clone();
        plain.train(&mut instance.clone())?;
        batched.train(&mut instance.clone())?;
        batched.update_mini_batch();

        if plain.weights() == &before {
            untouched += 1;
        }
        assert_eq!(plain.weights(), batched.weights());
    }
    assert!(untouched > 0);
    Ok(())
}

#[test]
fn other_zero_cost_predictions_are_not_mistakes() -> Result<()> {
    let mut optimizer = optimizer(Method::ada_grad(), 0.0)?;
    let features = |index: usize| {
        let mut sparse = SparseVector::new();
        sparse.add(index, 1.0);
        FeatureVector::sparse(sparse)
    };
    optimizer.train(&mut Instance::single(features(1), 2))?;
    let before = optimizer.weights().clone();

    // The margin turns label 1 into the prediction. It is zero-cost too,
    // so nothing moves.
    let mut instance = Instance::new(features(1), vec![1, 2]);
    optimizer.train(&mut instance)?;
    assert_eq!(instance.gold_label(), Some(2));
    assert_eq!(instance.predicted_label(), Some(1));
    assert_eq!(optimizer.weights(), &before);
    Ok(())
}

#[test]
fn mini_batch_flushes_are_reproducible() -> Result<()> {
    let instances = corpus(3, 120);
    let mut runs = Vec::new();

    for _ in 0..2 {
        let mut optimizer = optimizer(Method::ada_delta_mini_batch(0.9)?, 0.0)?;
        for chunk in instances.chunks(8) {
            for instance in chunk {
                optimizer.train(&mut instance.clone())?;
            }
            optimizer.update_mini_batch();
        }
        runs.push(optimizer);
    }

    assert_eq!(runs[0].weights(), runs[1].weights());
    Ok(())
}

#[test]
fn l1_regularization_never_reduces_sparsity() -> Result<()> {
    let instances = corpus(5, 200);

    let mut unregularized = optimizer(Method::perceptron(), 0.0)?
        .with_regularizer(RegularizedDualAveraging::new(0.0)?);
    let mut regularized = optimizer(Method::perceptron(), 0.0)?
        .with_regularizer(RegularizedDualAveraging::new(10.0)?);
    train_all(&mut unregularized, &instances)?;
    train_all(&mut regularized, &instances)?;

    let cells = |o: &OnlineOptimizer| {
        let weights = o.weights();
        weights.label_size() * (weights.sparse_feature_size() + weights.dense_feature_size())
    };
    assert_eq!(cells(&unregularized), cells(&regularized));

    let zeros = |o: &OnlineOptimizer| cells(o) - o.count_non_zero();
    assert!(zeros(&regularized) >= zeros(&unregularized));
    assert!(unregularized.count_non_zero() > 0);
    Ok(())
}

#[test]
fn trained_models_round_trip_through_bytes() -> Result<()> {
    let hyper = HyperParameter {
        optimizer: OptimizerKind::AdaGradMiniBatch,
        bias: 1.0,
        l1_regularization: Some(0.0001),
        ..HyperParameter::default()
    };
    let mut optimizer = hyper.optimizer()?;
    for label in 0..LABELS {
        optimizer.labels_mut().add(&format!("L{label}"));
    }
    let instances = corpus(13, 60);
    for chunk in instances.chunks(4) {
        for instance in chunk {
            optimizer.train(&mut instance.clone())?;
        }
        optimizer.update_mini_batch();
    }

    let restored: OnlineOptimizer = from_bytes(&to_bytes(&optimizer)?)?;
    assert_eq!(restored, optimizer);
    for instance in &instances {
        assert_eq!(
            restored.scores(instance.features()),
            optimizer.scores(instance.features())
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn perceptron_ignores_correct_predictions(seed in any::<u64>(), warmup in 0usize..40) {
        let instances = corpus(seed, warmup + 1);
        let mut optimizer = optimizer(Method::perceptron(), 1.0).unwrap();
        train_all(&mut optimizer, &instances[..=warmup]).unwrap();

        let features = instances[warmup].features().clone();
        let predicted = dialog_learn::argmax(&optimizer.scores(&features)).unwrap();
        let before = optimizer.weights().clone();

        let mut instance = Instance::single(features, predicted);
        optimizer.train(&mut instance).unwrap();

        prop_assert_eq!(instance.predicted_label(), Some(predicted));
        prop_assert_eq!(optimizer.weights(), &before);
    }
}
