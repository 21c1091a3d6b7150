use super::window::MatchMetrics;
use crate::config::ScoringWeights;
use crate::consts::{MAX_REPORTED_SCORE, MIN_REPORTED_SCORE, RATIO_EPSILON};
use crate::spell::CompiledSpell;
use crate::types::AccuracyBreakdown;

/// Coverage score. A side with nothing to match counts as fully covered.
pub fn count_score(
    bias: f32,
    required_matched: usize,
    required_total: usize,
    optional_matched: usize,
    optional_total: usize,
) -> f32 {
    let coverage = |matched: usize, total: usize| {
        if total == 0 {
            1.0
        } else {
            (matched as f32 / total as f32).min(1.0)
        }
    };
    bias * coverage(required_matched, required_total)
        + (1.0 - bias) * coverage(optional_matched, optional_total)
}

/// `1 - min(|actual - target| / tolerance, 1)`; zero tolerance means exact-or-nothing.
pub fn ratio_score(actual: f32, target: f32, tolerance: f32) -> f32 {
    let diff = (actual - target).abs();
    if tolerance <= 0.0 {
        return if diff <= RATIO_EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - (diff / tolerance).min(1.0)
}

fn mean_or_one(scores: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = scores.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        1.0
    } else {
        sum / n as f32
    }
}

/// Blends coverage and shape fit into a 0-100 score.
///
/// The final value carries a small uniform jitter. Seed the scorer (or set
/// `jitter` to 0) when repeatable output is needed.
#[derive(Debug, Clone)]
pub struct SpellAccuracyScorer {
    weights: ScoringWeights,
    rng: fastrand::Rng,
}

impl SpellAccuracyScorer {
    pub fn new(weights: ScoringWeights, seed: Option<u64>) -> Self {
        let rng = if let Some(s) = seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };
        Self { weights, rng }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn breakdown(&self, spell: &CompiledSpell, m: &MatchMetrics) -> AccuracyBreakdown {
        let def = &spell.definition;

        let count = count_score(
            self.weights.count_bias,
            m.required_matched,
            spell.required_total,
            m.optional_matched,
            spell.optional_total,
        );

        let dist_denom = m.total_distance.max(def.min_total_distance.unwrap_or(0.0));
        let distance = mean_or_one(def.groups.iter().enumerate().filter_map(|(g, group)| {
            let target = group.relative_distance?;
            let actual = if dist_denom > 0.0 {
                m.group_distance[g] / dist_denom
            } else {
                0.0
            };
            Some(ratio_score(actual, target, def.distance_tolerance))
        }));

        let dur_denom = m.scorable_duration();
        let duration = mean_or_one(def.groups.iter().enumerate().filter_map(|(g, group)| {
            let target = group.relative_duration?;
            let actual = if dur_denom > 0.0 {
                m.group_duration[g] / dur_denom
            } else {
                0.0
            };
            Some(ratio_score(actual, target, def.duration_tolerance))
        }));

        AccuracyBreakdown {
            count,
            distance,
            duration,
        }
    }

    /// Weighted blend of the breakdown on a 0-100 scale, before jitter.
    pub fn blend(&self, b: &AccuracyBreakdown) -> f32 {
        let w = &self.weights;
        let total = w.total_weight();
        if total <= 0.0 {
            return 0.0;
        }
        let mean =
            (w.weight_count * b.count + w.weight_distance * b.distance + w.weight_duration * b.duration)
                / total;
        mean * MAX_REPORTED_SCORE
    }

    pub fn score(&mut self, spell: &CompiledSpell, m: &MatchMetrics) -> (f32, AccuracyBreakdown) {
        let breakdown = self.breakdown(spell, m);
        let jitter = self.weights.jitter * (self.rng.f32() * 2.0 - 1.0);
        let score = (self.blend(&breakdown) + jitter).clamp(MIN_REPORTED_SCORE, MAX_REPORTED_SCORE);
        (score, breakdown)
    }
}
