use anyhow::Result;
use dialog_learn::{HyperParameter, Method, OnlineOptimizer, OptimizerKind};
use dialog_nlp::component::{OnlineComponent, Task};
use dialog_nlp::eval::{AttachmentScore, Evaluator};
use dialog_nlp::feature::FeatureTemplate;
use dialog_nlp::lexicon::{Lexica, WordClusters};
use dialog_nlp::parser::{DependencyParser, OnlineDependencyParser};
use dialog_nlp::state::State;
use dialog_nlp::token::{Sentence, Token};
use dialog_nlp::train::{RollIn, RollInConfig, TrainInfo, Trainer};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const RELATIONS: [&str; 4] = ["det", "nsubj", "obj", "root"];

/// A random, possibly non-projective tree over `len` tokens.
fn random_sentence(seed: u64, len: usize) -> Sentence {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut order: Vec<usize> = (1..=len).collect();
    order.shuffle(&mut rng);

    let mut heads = vec![0; len + 1];
    for (position, node) in order.iter().enumerate() {
        heads[*node] = if position == 0 || rng.gen_bool(0.1) {
            0
        } else {
            order[rng.gen_range(0..position)]
        };
    }

    (1..=len)
        .map(|id| {
            let form = format!("w{}", rng.gen_range(0..5));
            let deprel = RELATIONS[rng.gen_range(0..RELATIONS.len())];
            Token::new(form).with_head(heads[id], deprel)
        })
        .collect()
}

/// token 1 ← root, token 2 ← token 1, token 3 ← token 2
fn chain() -> Sentence {
    Sentence::new(vec![
        Token::new("John").with_lemma("john").with_pos("NNP").with_head(0, "root"),
        Token::new("saw").with_lemma("see").with_pos("VBD").with_head(1, "dep"),
        Token::new("Mary").with_lemma("mary").with_pos("NNP").with_head(2, "dep"),
    ])
}

fn component(corpus: &[Sentence], optimizer: OnlineOptimizer) -> Result<OnlineDependencyParser> {
    let parser = DependencyParser::from_corpus(corpus)?;
    let template = FeatureTemplate::preset("dep0", 0)?;
    Ok(OnlineComponent::new(parser, template, optimizer)?)
}

#[test]
fn perceptron_learns_a_chain() -> Result<()> {
    let corpus = vec![chain()];
    let mut parser = component(&corpus, OnlineOptimizer::new(Method::perceptron(), 1.0, 0.0)?)?;

    let trainer = Trainer::new(TrainInfo {
        max_epochs: 20,
        ..TrainInfo::default()
    })?;
    let report = trainer.train(&mut parser, &corpus, &[], &Lexica::new())?;
    assert_eq!(report.best_score, 100.0);

    let eval = parser.evaluate(&corpus, &Lexica::new())?;
    assert_eq!(eval.labeled(), 100.0);
    assert_eq!(eval.unlabeled(), 100.0);

    let decoded = parser.decode(&chain(), &Lexica::new())?.sentence();
    assert_eq!(decoded, chain());
    Ok(())
}

#[test]
fn gold_roll_in_applies_zero_cost_labels() -> Result<()> {
    let corpus: Vec<Sentence> = (0..20).map(|seed| random_sentence(seed, 7)).collect();
    let optimizer = HyperParameter {
        optimizer: OptimizerKind::AdaGrad,
        learning_rate: 0.1,
        ..HyperParameter::default()
    }
    .optimizer()?;
    let mut parser = component(&corpus, optimizer)?;
    let mut roll_in = RollIn::new(RollInConfig::default(), 3);

    for sentence in &corpus {
        let mut state = parser.task().state(sentence);
        parser.train_state(&mut state, &mut roll_in, &Lexica::new())?;
        assert_eq!(state.loss(), 0);

        let mut eval = AttachmentScore::default();
        state.evaluate(&mut eval);
        assert_eq!(eval.score(), 100.0);
    }
    Ok(())
}

#[test]
fn predicted_roll_in_still_terminates() -> Result<()> {
    let corpus: Vec<Sentence> = (0..5).map(|seed| random_sentence(seed, 6)).collect();
    let mut parser = component(&corpus, OnlineOptimizer::new(Method::softmax(), 0.1, 1.0)?)?;
    let mut roll_in = RollIn::new(
        RollInConfig {
            decay: 0.0,
            fixed_stage: 0,
        },
        3,
    );
    roll_in.update();

    for sentence in &corpus {
        let steps = parser.train_sentence(sentence, &mut roll_in, &Lexica::new())?;
        assert!(steps >= sentence.len());
    }
    Ok(())
}

#[test]
fn training_keeps_the_best_epoch() -> Result<()> {
    let train: Vec<Sentence> = (0..30).map(|seed| random_sentence(seed, 6)).collect();
    let dev: Vec<Sentence> = (100..110).map(|seed| random_sentence(seed, 6)).collect();
    let mut parser = component(&train, OnlineOptimizer::new(Method::ada_grad(), 0.05, 0.0)?)?;

    let trainer = Trainer::new(TrainInfo {
        max_epochs: 8,
        patience: Some(2),
        seed: 11,
        ..TrainInfo::default()
    })?;
    let report = trainer.train(&mut parser, &train, &dev, &Lexica::new())?;

    assert!(!report.epochs.is_empty() && report.epochs.len() <= 8);
    assert!(report.epochs[report.best_epoch - 1].improved);
    assert!(report.epochs.iter().all(|epoch| epoch.score <= report.best_score));
    assert!(report
        .epochs
        .windows(2)
        .all(|pair| pair[1].gold_probability <= pair[0].gold_probability));
    assert_eq!(parser.evaluate(&dev, &Lexica::new())?.score(), report.best_score);
    Ok(())
}

#[test]
fn unknown_relations_are_rejected_before_training() -> Result<()> {
    let mut parser = component(&[chain()], OnlineOptimizer::new(Method::perceptron(), 1.0, 0.0)?)?;
    let unseen = Sentence::new(vec![Token::new("Go").with_head(0, "imperative")]);

    let trainer = Trainer::new(TrainInfo::default())?;
    assert!(trainer.train(&mut parser, &[unseen], &[], &Lexica::new()).is_err());
    assert_eq!(parser.count_non_zero(), 0);
    Ok(())
}

#[test]
fn trained_parsers_round_trip_through_bytes() -> Result<()> {
    let corpus = vec![chain(), random_sentence(1, 5)];
    let mut clusters = WordClusters::new();
    clusters.insert("saw", "0110");
    let lexica = Lexica::new().with("brown", clusters);

    let mut parser = component(&corpus, OnlineOptimizer::new(Method::ada_grad_mini_batch(), 0.05, 1.0)?)?;
    let trainer = Trainer::new(TrainInfo {
        max_epochs: 3,
        batch_size: 2,
        ..TrainInfo::default()
    })?;
    trainer.train(&mut parser, &corpus, &[], &lexica)?;

    let restored = OnlineDependencyParser::from_bytes(&parser.to_bytes()?)?;
    assert_eq!(restored, parser);
    for sentence in &corpus {
        assert_eq!(
            restored.decode(sentence, &lexica)?.sentence(),
            parser.decode(sentence, &lexica)?.sentence()
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn oracle_rebuilds_any_tree(seed in any::<u64>(), len in 1usize..10) {
        let parser = DependencyParser::with_relations(RELATIONS).unwrap();
        let sentence = random_sentence(seed, len);
        let mut state = parser.state(&sentence);

        let mut steps = 0;
        while !state.is_terminal() {
            let oracle = state.oracle();
            let candidates = state.candidates().unwrap_or_default().to_vec();
            prop_assert!(!oracle.is_empty());
            prop_assert!(oracle.iter().all(|label| candidates.contains(label)));

            state.apply(oracle[0]);
            prop_assert_eq!(state.loss(), 0);

            steps += 1;
            prop_assert!(steps <= (len + 1) * (len + 2));
        }

        let mut eval = AttachmentScore::default();
        state.evaluate(&mut eval);
        prop_assert_eq!(eval.las, len);
        prop_assert_eq!(eval.uas, len);
    }

    #[test]
    fn oracle_survives_wrong_moves(
        seed in any::<u64>(),
        len in 1usize..10,
        noise in 0.0f64..1.0,
        switch in 0usize..40,
    ) {
        let parser = DependencyParser::with_relations(RELATIONS).unwrap();
        let sentence = random_sentence(seed, len);
        let mut state = parser.state(&sentence);
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

        let mut steps = 0;
        let mut committed = None;
        while !state.is_terminal() {
            let oracle = state.oracle();
            let candidates = state.candidates().unwrap_or_default().to_vec();
            prop_assert!(!oracle.is_empty());
            prop_assert!(oracle.iter().all(|label| candidates.contains(label)));

            let label = if committed.is_none() && steps < switch && rng.gen_bool(noise) {
                candidates[rng.gen_range(0..candidates.len())]
            } else {
                committed.get_or_insert(state.loss());
                oracle[0]
            };
            let before = state.loss();
            state.apply(label);
            prop_assert!(state.loss() >= before);

            steps += 1;
            prop_assert!(steps <= (len + 1) * (len + 2));
        }

        for id in 0..=len {
            prop_assert!(!state.graph().is_descendant_of(id, id));
        }
        prop_assert!(!state.graph().has_head(0));

        // Following the oracle from any point loses exactly the arcs the
        // loss promised.
        let mut eval = AttachmentScore::default();
        state.evaluate(&mut eval);
        if let Some(committed) = committed {
            prop_assert_eq!(eval.total - eval.las, committed);
        }
        prop_assert_eq!(eval.total - eval.las, state.loss());
    }
}
