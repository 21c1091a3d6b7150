use super::model::{SpellDefinition, SpellStep};
use crate::error::{WandError, WfResult};
use std::sync::Arc;
use tracing::debug;

/// Matching view of a [`SpellDefinition`].
///
/// Steps are flattened across groups and stored newest-first, because the
/// window matcher walks history backwards. `step_to_group_rev[i]` is the
/// group index of `steps_rev[i]`.
#[derive(Debug, Clone)]
pub struct CompiledSpell {
    pub definition: Arc<SpellDefinition>,
    pub steps_rev: Vec<SpellStep>,
    pub step_to_group_rev: Vec<usize>,
    pub group_names: Vec<String>,

    pub scorable_total: usize,
    pub required_total: usize,
    pub optional_total: usize,
}

impl CompiledSpell {
    #[inline(always)]
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    #[inline(always)]
    pub fn group_count(&self) -> usize {
        self.group_names.len()
    }

    #[inline(always)]
    pub fn step_count(&self) -> usize {
        self.steps_rev.len()
    }
}

pub struct SpellCompiler;

impl SpellCompiler {
    pub fn compile(definition: Arc<SpellDefinition>) -> WfResult<CompiledSpell> {
        validate(&definition)?;

        let mut steps_rev = Vec::with_capacity(definition.step_count());
        let mut step_to_group_rev = Vec::with_capacity(definition.step_count());
        for (g_idx, group) in definition.groups.iter().enumerate() {
            for step in &group.steps {
                steps_rev.push(step.clone());
                step_to_group_rev.push(g_idx);
            }
        }
        steps_rev.reverse();
        step_to_group_rev.reverse();

        let scorable_total = steps_rev.iter().filter(|s| s.is_scorable()).count();
        let required_total = steps_rev
            .iter()
            .filter(|s| s.is_scorable() && s.required)
            .count();

        if required_total == 0 {
            return Err(invalid(&definition, "spell has no required scorable steps"));
        }
        if definition.min_total_steps > scorable_total {
            return Err(invalid(
                &definition,
                format!(
                    "min_total_steps {} exceeds {} scorable steps",
                    definition.min_total_steps, scorable_total
                ),
            ));
        }

        let group_names = definition.groups.iter().map(|g| g.name.clone()).collect();

        debug!(
            "compiled spell '{}': {} steps ({} required, {} optional)",
            definition.id,
            steps_rev.len(),
            required_total,
            scorable_total - required_total
        );

        Ok(CompiledSpell {
            definition,
            steps_rev,
            step_to_group_rev,
            group_names,
            scorable_total,
            required_total,
            optional_total: scorable_total - required_total,
        })
    }
}

fn invalid(def: &SpellDefinition, reason: impl Into<String>) -> WandError {
    WandError::InvalidSpell {
        spell_id: def.id.clone(),
        reason: reason.into(),
    }
}

fn check_ratio(def: &SpellDefinition, what: &str, value: Option<f32>) -> WfResult<()> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => {
            Err(invalid(def, format!("{} {} is outside [0, 1]", what, v)))
        }
        _ => Ok(()),
    }
}

fn validate(def: &SpellDefinition) -> WfResult<()> {
    if def.id.trim().is_empty() {
        return Err(invalid(def, "missing id"));
    }
    if def.groups.is_empty() {
        return Err(invalid(def, "spell has no step groups"));
    }

    for group in &def.groups {
        if group.steps.is_empty() && group.min_steps.is_none() {
            return Err(invalid(
                def,
                format!("group '{}' has no steps and no min_steps override", group.name),
            ));
        }

        let scorable = group.steps.iter().filter(|s| s.is_scorable()).count();
        if let Some(min) = group.min_steps {
            if min > scorable {
                return Err(invalid(
                    def,
                    format!(
                        "group '{}' requires {} steps but has {} scorable",
                        group.name, min, scorable
                    ),
                ));
            }
        }

        check_ratio(def, "relative_distance", group.relative_distance)?;
        check_ratio(def, "relative_duration", group.relative_duration)?;

        for step in &group.steps {
            if step.directions.is_empty() {
                return Err(invalid(
                    def,
                    format!("group '{}' has a step with no directions", group.name),
                ));
            }
            if step.min_duration < 0.0 {
                return Err(invalid(def, "negative step min_duration"));
            }
            if let Some(max) = step.max_duration {
                if max < step.min_duration {
                    return Err(invalid(
                        def,
                        format!(
                            "group '{}' step max_duration {} < min_duration {}",
                            group.name, max, step.min_duration
                        ),
                    ));
                }
            }
        }
    }

    if let (Some(min), Some(max)) = (def.min_total_duration, def.max_total_duration) {
        if min > max {
            return Err(invalid(def, "min_total_duration exceeds max_total_duration"));
        }
    }
    if let (Some(min), Some(max)) = (def.min_total_distance, def.max_total_distance) {
        if min > max {
            return Err(invalid(def, "min_total_distance exceeds max_total_distance"));
        }
    }
    if def.max_idle_gap < 0.0 || def.max_filler_duration < 0.0 {
        return Err(invalid(def, "negative filler limit"));
    }
    if def.distance_tolerance < 0.0 || def.duration_tolerance < 0.0 {
        return Err(invalid(def, "negative ratio tolerance"));
    }
    if def.pre_pause.is_some_and(|p| p < 0.0) || def.post_pause.is_some_and(|p| p < 0.0) {
        return Err(invalid(def, "negative pause duration"));
    }

    Ok(())
}
