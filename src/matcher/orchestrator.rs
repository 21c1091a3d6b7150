use super::accuracy::SpellAccuracyScorer;
use super::rules::RulesValidator;
use super::window::{MatchMetrics, SpellWindowMatcher};
use crate::config::Config;
use crate::error::WfResult;
use crate::motion::{compress_segments, SegmentHistory};
use crate::spell::{CompiledSpell, TemplateRegistry};
use crate::types::{ControllerId, GestureSegment, SpellMatch};
use std::sync::Arc;
use tracing::info;

/// The spell currently being listened for, with its rule pipeline.
#[derive(Debug, Clone)]
struct ActiveSpell {
    compiled: Arc<CompiledSpell>,
    validator: RulesValidator,
}

/// Runs compression, matching, validation and scoring for one controller.
#[derive(Debug, Clone)]
pub struct SpellMatcher {
    controller_id: ControllerId,
    active: Option<ActiveSpell>,
    history: SegmentHistory,
    window: SpellWindowMatcher,
    scorer: SpellAccuracyScorer,
}

impl SpellMatcher {
    pub fn new(controller_id: impl Into<ControllerId>, config: &Config, seed: Option<u64>) -> Self {
        Self {
            controller_id: controller_id.into(),
            active: None,
            history: SegmentHistory::from_params(&config.history),
            window: SpellWindowMatcher::from_params(&config.filler),
            scorer: SpellAccuracyScorer::new(config.weights.clone(), seed),
        }
    }

    pub fn controller_id(&self) -> &str {
        &self.controller_id
    }

    /// Switches the active spell. Segments gathered for the previous one are dropped.
    pub fn select(&mut self, compiled: Arc<CompiledSpell>) {
        info!(
            "controller '{}' listening for spell '{}'",
            self.controller_id,
            compiled.id()
        );
        let validator = RulesValidator::for_spell(&compiled.definition);
        self.active = Some(ActiveSpell {
            compiled,
            validator,
        });
        self.history.clear();
    }

    pub fn select_spell(&mut self, registry: &TemplateRegistry, spell_id: &str) -> WfResult<()> {
        let compiled = registry.require(spell_id)?;
        self.select(compiled);
        Ok(())
    }

    pub fn clear_spell(&mut self) {
        self.active = None;
        self.history.clear();
    }

    pub fn active_spell(&self) -> Option<&CompiledSpell> {
        self.active.as_ref().map(|a| a.compiled.as_ref())
    }

    pub fn history(&self) -> &SegmentHistory {
        &self.history
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Appends a closed segment and attempts a match.
    ///
    /// On `Some`, the caller is expected to reset history so the same
    /// gesture is not reported twice.
    pub fn on_segment(&mut self, segment: GestureSegment) -> Option<SpellMatch> {
        self.history.push(segment);
        self.attempt()
    }

    /// Attempts a match against the current history without modifying it.
    pub fn attempt(&mut self) -> Option<SpellMatch> {
        let active = self.active.as_ref()?;
        let compressed = compress_segments(self.history.iter());
        let metrics = self
            .window
            .find(&compressed, &active.compiled, &active.validator)?;

        let compiled = Arc::clone(&active.compiled);
        let result = self.build_match(&compiled, &metrics);
        info!(
            "controller '{}' cast '{}' ({:.1}%, {}/{} required, {:.2}s filler)",
            result.controller_id,
            result.spell_id,
            result.accuracy,
            result.required_matched,
            result.required_total,
            result.filler_duration
        );
        Some(result)
    }

    fn build_match(&mut self, spell: &CompiledSpell, metrics: &MatchMetrics) -> SpellMatch {
        let (accuracy, breakdown) = self.scorer.score(spell, metrics);
        SpellMatch {
            controller_id: self.controller_id.clone(),
            spell_id: spell.definition.id.clone(),
            spell_name: spell.definition.name.clone(),
            start_ts: metrics.start_ts,
            end_ts: metrics.end_ts,
            duration: metrics.span_seconds(),
            used_steps: metrics.used_steps,
            total_steps: spell.scorable_total,
            required_matched: metrics.required_matched,
            required_total: spell.required_total,
            optional_matched: metrics.optional_matched,
            optional_total: spell.optional_total,
            pause_steps_matched: metrics.pause_matched,
            filler_duration: metrics.filler_duration,
            accuracy,
            breakdown,
        }
    }
}
