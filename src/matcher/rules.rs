use super::window::MatchMetrics;
use crate::spell::{CompiledSpell, SpellDefinition};
use crate::types::GestureSegment;
use std::fmt;
use strum_macros::Display;

/// Everything a rule may look at for one candidate window.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub spell: &'a CompiledSpell,
    /// The full compressed history the window indexes into.
    pub segments: &'a [GestureSegment],
    pub metrics: &'a MatchMetrics,
}

impl RuleContext<'_> {
    #[inline(always)]
    fn def(&self) -> &SpellDefinition {
        &self.spell.definition
    }
}

/// Independent pass/fail predicates over a candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Rule {
    RequiredSteps,
    MinScorableSteps,
    TotalDuration,
    TotalDistance,
    DistanceRatios,
    GroupMinSteps,
    PrePause,
    PostPause,
    FillerCeiling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleViolation {
    pub rule: Rule,
    pub detail: String,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.detail)
    }
}

impl Rule {
    pub fn check(&self, ctx: &RuleContext<'_>) -> Result<(), String> {
        let m = ctx.metrics;
        let def = ctx.def();
        match self {
            Rule::RequiredSteps => {
                if m.required_matched >= ctx.spell.required_total {
                    Ok(())
                } else {
                    Err(format!(
                        "{}/{} required steps",
                        m.required_matched, ctx.spell.required_total
                    ))
                }
            }
            Rule::MinScorableSteps => {
                if m.used_steps >= def.min_total_steps {
                    Ok(())
                } else {
                    Err(format!(
                        "{} scorable steps, need {}",
                        m.used_steps, def.min_total_steps
                    ))
                }
            }
            Rule::TotalDuration => within(
                "duration",
                m.total_duration,
                def.min_total_duration,
                def.max_total_duration,
            ),
            Rule::TotalDistance => within(
                "distance",
                m.total_distance,
                def.min_total_distance,
                def.max_total_distance,
            ),
            Rule::DistanceRatios => {
                let denom = m.total_distance.max(def.min_total_distance.unwrap_or(0.0));
                for (g, group) in def.groups.iter().enumerate() {
                    let Some(target) = group.relative_distance else {
                        continue;
                    };
                    let actual = if denom > 0.0 {
                        m.group_distance[g] / denom
                    } else {
                        0.0
                    };
                    if (actual - target).abs() > def.distance_tolerance {
                        return Err(format!(
                            "group '{}' distance share {:.2}, target {:.2}",
                            group.name, actual, target
                        ));
                    }
                }
                Ok(())
            }
            Rule::GroupMinSteps => {
                for (g, group) in def.groups.iter().enumerate() {
                    if let Some(min) = group.min_steps {
                        if m.group_steps[g] < min {
                            return Err(format!(
                                "group '{}' matched {} steps, need {}",
                                group.name, m.group_steps[g], min
                            ));
                        }
                    }
                }
                Ok(())
            }
            Rule::PrePause => {
                let required = def.pre_pause.unwrap_or(0.0);
                let before = ctx.segments[..m.window_start].iter().rev();
                quiet_period("pre", before, required, def.pause_speed_threshold)
            }
            Rule::PostPause => {
                let required = def.post_pause.unwrap_or(0.0);
                let after = ctx.segments[m.window_end + 1..].iter();
                quiet_period("post", after, required, def.pause_speed_threshold)
            }
            Rule::FillerCeiling => {
                if m.filler_duration <= def.max_filler_duration {
                    Ok(())
                } else {
                    Err(format!(
                        "filler {:.3}s exceeds {:.3}s",
                        m.filler_duration, def.max_filler_duration
                    ))
                }
            }
        }
    }
}

fn within(what: &str, value: f32, min: Option<f32>, max: Option<f32>) -> Result<(), String> {
    if let Some(min) = min {
        if value < min {
            return Err(format!("{} {:.3} below {:.3}", what, value, min));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(format!("{} {:.3} above {:.3}", what, value, max));
        }
    }
    Ok(())
}

/// Walks away from the window edge summing quiet time until `required` is met.
fn quiet_period<'a, I>(edge: &str, segments: I, required: f32, speed_threshold: f32) -> Result<(), String>
where
    I: Iterator<Item = &'a GestureSegment>,
{
    if required <= 0.0 {
        return Ok(());
    }

    let mut quiet = 0.0;
    for seg in segments {
        if !(seg.direction.is_idle() || seg.mean_speed <= speed_threshold) {
            return Err(format!(
                "{}-pause interrupted after {:.3}s of {:.3}s",
                edge, quiet, required
            ));
        }
        quiet += seg.duration;
        if quiet >= required {
            return Ok(());
        }
    }

    Err(format!(
        "{}-pause {:.3}s of {:.3}s before history edge",
        edge, quiet, required
    ))
}

/// Per-spell rule pipeline; every rule must pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RulesValidator {
    rules: Vec<Rule>,
}

impl RulesValidator {
    /// Instantiates only the rules `def` asks for.
    pub fn for_spell(def: &SpellDefinition) -> Self {
        let mut rules = vec![Rule::RequiredSteps, Rule::MinScorableSteps];

        if def.min_total_duration.is_some() || def.max_total_duration.is_some() {
            rules.push(Rule::TotalDuration);
        }
        if def.rules.check_total_distance
            && (def.min_total_distance.is_some() || def.max_total_distance.is_some())
        {
            rules.push(Rule::TotalDistance);
        }
        if def.rules.check_distance_ratios && def.has_distance_targets() {
            rules.push(Rule::DistanceRatios);
        }
        if def.rules.check_group_min_steps && def.has_group_minimums() {
            rules.push(Rule::GroupMinSteps);
        }
        if def.pre_pause.is_some() {
            rules.push(Rule::PrePause);
        }
        if def.post_pause.is_some() {
            rules.push(Rule::PostPause);
        }
        if def.rules.check_filler_duration {
            rules.push(Rule::FillerCeiling);
        }

        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn validate(&self, ctx: &RuleContext<'_>) -> Result<(), RuleViolation> {
        for rule in &self.rules {
            rule.check(ctx).map_err(|detail| RuleViolation {
                rule: *rule,
                detail,
            })?;
        }
        Ok(())
    }
}
