use super::filler::{FillerDecision, FillerPolicy, StepRef};
use super::rules::{RuleContext, RulesValidator};
use crate::config::FillerParams;
use crate::spell::{CompiledSpell, SpellStep};
use crate::types::GestureSegment;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Accumulator for a single backward attempt from one anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub step_ptr: usize,
    pub required_matched: usize,
    pub optional_matched: usize,
    pub pause_matched: usize,

    // Per group, indexed like CompiledSpell::group_names
    pub group_distance: Vec<f32>,
    pub group_duration: Vec<f32>,
    pub group_steps: Vec<usize>,

    /// (segment index, duration) of every filler segment consumed.
    pub filler: Vec<(usize, f32)>,
    pub absorbed_distance: f32,

    pub min_used: Option<usize>,
    pub max_used: Option<usize>,
    /// Position in `steps_rev` of the last matched scorable step.
    pub last_scorable: Option<usize>,
}

impl MatchState {
    pub fn new(group_count: usize) -> Self {
        Self {
            step_ptr: 0,
            required_matched: 0,
            optional_matched: 0,
            pause_matched: 0,
            group_distance: vec![0.0; group_count],
            group_duration: vec![0.0; group_count],
            group_steps: vec![0; group_count],
            filler: Vec::new(),
            absorbed_distance: 0.0,
            min_used: None,
            max_used: None,
            last_scorable: None,
        }
    }

    fn mark_used(&mut self, idx: usize) {
        self.min_used = Some(self.min_used.map_or(idx, |m| m.min(idx)));
        self.max_used = Some(self.max_used.map_or(idx, |m| m.max(idx)));
    }

    fn record_step(&mut self, idx: usize, seg: &GestureSegment, step: &SpellStep, group: usize) {
        if step.is_pause {
            self.pause_matched += 1;
        } else {
            if step.required {
                self.required_matched += 1;
            } else {
                self.optional_matched += 1;
            }
            self.group_distance[group] += seg.path_length;
            self.group_duration[group] += seg.duration;
            self.group_steps[group] += 1;
            self.last_scorable = Some(self.step_ptr);
        }
        self.mark_used(idx);
    }

    /// Inclusive index range of segments used by step matches or absorption.
    pub fn window(&self) -> Option<(usize, usize)> {
        Some((self.min_used?, self.max_used?))
    }

    fn into_metrics(self, history: &[GestureSegment], lo: usize, hi: usize) -> MatchMetrics {
        let filler_duration: f32 = self
            .filler
            .iter()
            .filter(|(idx, _)| (lo..=hi).contains(idx))
            .map(|(_, d)| d)
            .sum();
        let window_duration: f32 = history[lo..=hi].iter().map(|s| s.duration).sum();
        let total_distance = self.group_distance.iter().sum();

        MatchMetrics {
            window_start: lo,
            window_end: hi,
            start_ts: history[lo].start_ts,
            end_ts: history[hi].end_ts,
            total_duration: (window_duration - filler_duration).max(0.0),
            filler_duration,
            total_distance,
            absorbed_distance: self.absorbed_distance,
            used_steps: self.required_matched + self.optional_matched,
            required_matched: self.required_matched,
            optional_matched: self.optional_matched,
            pause_matched: self.pause_matched,
            group_distance: self.group_distance,
            group_duration: self.group_duration,
            group_steps: self.group_steps,
        }
    }
}

/// What a realized window measured, handed to the rules and the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchMetrics {
    pub window_start: usize,
    pub window_end: usize,
    pub start_ts: u64,
    pub end_ts: u64,

    /// Seconds spent inside the window, filler excluded.
    pub total_duration: f32,
    /// Seconds of filler inside the window.
    pub filler_duration: f32,
    pub total_distance: f32,
    pub absorbed_distance: f32,

    pub group_distance: Vec<f32>,
    pub group_duration: Vec<f32>,
    pub group_steps: Vec<usize>,

    pub used_steps: usize,
    pub required_matched: usize,
    pub optional_matched: usize,
    pub pause_matched: usize,
}

impl MatchMetrics {
    pub fn scorable_duration(&self) -> f32 {
        self.group_duration.iter().sum()
    }

    pub fn span_seconds(&self) -> f32 {
        self.end_ts.saturating_sub(self.start_ts) as f32 / 1000.0
    }
}

/// Backward-scanning, filler-tolerant matcher over a compressed history.
#[derive(Debug, Clone, Default)]
pub struct SpellWindowMatcher {
    filler: FillerPolicy,
}

impl SpellWindowMatcher {
    pub fn new(filler: FillerPolicy) -> Self {
        Self { filler }
    }

    pub fn from_params(params: &FillerParams) -> Self {
        Self::new(FillerPolicy::from_params(params))
    }

    /// Tries anchors newest first and returns the first window that passes
    /// every rule. `history` is ordered oldest to newest.
    pub fn find(
        &self,
        history: &[GestureSegment],
        spell: &CompiledSpell,
        validator: &RulesValidator,
    ) -> Option<MatchMetrics> {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for anchor in (0..history.len()).rev() {
            let Some(state) = self.attempt(history, spell, anchor) else {
                continue;
            };
            let Some((lo, hi)) = state.window() else {
                continue;
            };
            if !seen.insert((lo, hi)) {
                continue;
            }

            let metrics = state.into_metrics(history, lo, hi);
            let ctx = RuleContext {
                spell,
                segments: history,
                metrics: &metrics,
            };
            match validator.validate(&ctx) {
                Ok(()) => return Some(metrics),
                Err(violation) => {
                    debug!(
                        "spell '{}' window [{}, {}] rejected: {}",
                        spell.id(),
                        lo,
                        hi,
                        violation
                    );
                }
            }
        }

        None
    }

    /// Runs one backward attempt from `anchor`. `None` when the anchor aborts
    /// or no required step matched.
    pub fn attempt(
        &self,
        history: &[GestureSegment],
        spell: &CompiledSpell,
        anchor: usize,
    ) -> Option<MatchState> {
        let max_idle_gap = spell.definition.max_idle_gap;
        let mut state = MatchState::new(spell.group_count());
        let mut cursor = (anchor < history.len()).then_some(anchor);

        while let Some(i) = cursor {
            if state.step_ptr >= spell.steps_rev.len() {
                break;
            }
            let seg = &history[i];
            let step = &spell.steps_rev[state.step_ptr];
            let group = spell.step_to_group_rev[state.step_ptr];

            if step.accepts(seg) {
                state.record_step(i, seg, step, group);
                state.step_ptr += 1;
                cursor = i.checked_sub(1);
                continue;
            }

            if !step.required {
                state.step_ptr += 1;
                continue;
            }

            let last = state.last_scorable.map(|p| StepRef {
                step: &spell.steps_rev[p],
                group: spell.step_to_group_rev[p],
            });
            match self
                .filler
                .evaluate(seg, StepRef { step, group }, last, max_idle_gap)
            {
                FillerDecision::Reject => {
                    trace!("anchor {} aborted: idle gap {:.3}s at {}", anchor, seg.duration, i);
                    return None;
                }
                FillerDecision::Idle { duration } | FillerDecision::Filler { duration } => {
                    state.filler.push((i, duration));
                }
                FillerDecision::Absorbed { group, distance } => {
                    state.group_distance[group] += distance;
                    state.absorbed_distance += distance;
                    state.mark_used(i);
                }
            }
            cursor = i.checked_sub(1);
        }

        (state.required_matched > 0).then_some(state)
    }
}
