use rstest::rstest;
use wandforge::config::ScoringWeights;
use wandforge::matcher::accuracy::{count_score, ratio_score};
use wandforge::matcher::{RulesValidator, SpellAccuracyScorer, SpellWindowMatcher};
use wandforge::spell::{SpellDefinition, SpellStepGroup};
use wandforge::types::{AccuracyBreakdown, Direction};

mod common;
use common::{compile, history, history_with_paths, step, three_step_def};

fn flat_weights() -> ScoringWeights {
    ScoringWeights {
        jitter: 0.0,
        ..Default::default()
    }
}

#[rstest]
#[case(0.5, 0.5, 0.15, 1.0)]
#[case(0.9, 0.5, 0.15, 0.0)]
#[case(0.55, 0.5, 0.1, 0.5)]
#[case(0.5, 0.5, 0.0, 1.0)]
#[case(0.51, 0.5, 0.0, 0.0)]
fn test_ratio_score(
    #[case] actual: f32,
    #[case] target: f32,
    #[case] tolerance: f32,
    #[case] expected: f32,
) {
    let got = ratio_score(actual, target, tolerance);
    assert!(
        (got - expected).abs() < 1e-3,
        "ratio_score({}, {}, {}) = {}",
        actual,
        target,
        tolerance,
        got
    );
}

#[test]
fn test_count_score_blends_coverage() {
    // 2/3 required, 1/2 optional, bias 0.7
    let s = count_score(0.7, 2, 3, 1, 2);
    assert!((s - (0.7 * 2.0 / 3.0 + 0.3 * 0.5)).abs() < 1e-5);

    // No optional steps: the optional side counts as covered
    assert!((count_score(0.7, 3, 3, 0, 0) - 1.0).abs() < 1e-6);
    assert!((count_score(0.7, 0, 3, 0, 0) - 0.3).abs() < 1e-6);
}

#[test]
fn test_perfect_match_scores_full_marks() {
    println!("\n=== TEST: Perfect Match ===");
    let spell = compile(three_step_def(1.2));
    let segs = history(&[
        (Direction::North, 0.4),
        (Direction::SouthWest, 0.5),
        (Direction::East, 0.3),
    ]);
    let validator = RulesValidator::for_spell(&spell.definition);
    let metrics = SpellWindowMatcher::default()
        .find(&segs, &spell, &validator)
        .expect("match");

    let mut scorer = SpellAccuracyScorer::new(flat_weights(), None);
    let (score, breakdown) = scorer.score(&spell, &metrics);
    println!("  -> {:.2} {:?}", score, breakdown);

    assert_eq!(
        breakdown,
        AccuracyBreakdown {
            count: 1.0,
            distance: 1.0,
            duration: 1.0
        }
    );
    assert!((score - 100.0).abs() < 1e-4);
}

#[test]
fn test_group_ratio_miss_lowers_score() {
    println!("\n=== TEST: Distance Ratio Miss ===");
    let def = SpellDefinition::builder()
        .id("lopsided")
        .name("Lopsided")
        .groups(vec![
            SpellStepGroup::builder()
                .name("a")
                .steps(vec![step(Direction::North)])
                .relative_distance(0.5)
                .build(),
            SpellStepGroup::builder()
                .name("b")
                .steps(vec![step(Direction::South)])
                .relative_distance(0.5)
                .build(),
        ])
        .build();
    let spell = compile(def);

    // Ratios are scored even though the ratio rule is off
    let segs = history_with_paths(&[(Direction::North, 0.3, 90.0), (Direction::South, 0.3, 10.0)]);
    let validator = RulesValidator::for_spell(&spell.definition);
    let metrics = SpellWindowMatcher::default()
        .find(&segs, &spell, &validator)
        .expect("match");

    let scorer = SpellAccuracyScorer::new(flat_weights(), None);
    let b = scorer.breakdown(&spell, &metrics);
    println!("  -> {:?}", b);

    // Group a: |0.9 - 0.5| / 0.15 clamps to a zero score, same for b
    assert!(b.distance.abs() < 1e-4);
    assert!((b.count - 1.0).abs() < 1e-6);
    assert!((b.duration - 1.0).abs() < 1e-6);

    // 0.5 * 1 + 0.25 * 0 + 0.25 * 1
    assert!((scorer.blend(&b) - 75.0).abs() < 1e-3);
}

#[test]
fn test_group_duration_ratio_scoring() {
    println!("\n=== TEST: Duration Ratio ===");
    let def = SpellDefinition::builder()
        .id("paced")
        .name("Paced")
        .groups(vec![
            SpellStepGroup::builder()
                .name("a")
                .steps(vec![step(Direction::North)])
                .relative_duration(0.5)
                .build(),
            SpellStepGroup::builder()
                .name("b")
                .steps(vec![step(Direction::South)])
                .relative_duration(0.5)
                .build(),
        ])
        .build();
    let spell = compile(def);
    let validator = RulesValidator::for_spell(&spell.definition);
    let scorer = SpellAccuracyScorer::new(flat_weights(), None);

    let even = history(&[(Direction::North, 0.5), (Direction::South, 0.5)]);
    let metrics = SpellWindowMatcher::default()
        .find(&even, &spell, &validator)
        .expect("match");
    let b = scorer.breakdown(&spell, &metrics);
    assert!((b.duration - 1.0).abs() < 1e-4);

    let uneven = history(&[(Direction::North, 0.4), (Direction::South, 0.6)]);
    let metrics = SpellWindowMatcher::default()
        .find(&uneven, &spell, &validator)
        .expect("match");
    let b = scorer.breakdown(&spell, &metrics);
    println!("  -> {:?}", b);

    // Each group is 0.1 off its 0.5 share: 1 - 0.1 / 0.15
    assert!((b.duration - 1.0 / 3.0).abs() < 1e-3);
    // No distance targets declared
    assert!((b.distance - 1.0).abs() < 1e-6);
    // 0.5 * 1 + 0.25 * 1 + 0.25 / 3
    assert!((scorer.blend(&b) - 83.333).abs() < 1e-2);
}

#[test]
fn test_jitter_is_bounded_and_seedable() {
    let spell = compile(three_step_def(1.2));
    let segs = history(&[
        (Direction::North, 0.4),
        (Direction::SouthWest, 0.5),
        (Direction::East, 0.3),
    ]);
    let validator = RulesValidator::for_spell(&spell.definition);
    let metrics = SpellWindowMatcher::default()
        .find(&segs, &spell, &validator)
        .expect("match");

    let weights = ScoringWeights {
        jitter: 2.0,
        ..Default::default()
    };
    let mut a = SpellAccuracyScorer::new(weights.clone(), Some(42));
    let mut b = SpellAccuracyScorer::new(weights, Some(42));

    for _ in 0..50 {
        let (sa, _) = a.score(&spell, &metrics);
        let (sb, _) = b.score(&spell, &metrics);
        assert_eq!(sa, sb, "Same seed must give the same sequence");
        assert!((98.0..=100.0).contains(&sa), "score {} outside jitter band", sa);
    }
}

#[test]
fn test_blend_of_empty_breakdown_is_zero() {
    let weights = ScoringWeights {
        jitter: 0.0,
        ..Default::default()
    };
    let scorer = SpellAccuracyScorer::new(weights, Some(1));
    let zero = AccuracyBreakdown::default();
    assert_eq!(scorer.blend(&zero), 0.0);
}
