use crate::types::{Direction, GestureSegment};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

fn default_true() -> bool {
    true
}
fn default_min_total_steps() -> usize {
    1
}
fn default_max_idle_gap() -> f32 {
    1.0
}
fn default_max_filler_duration() -> f32 {
    1.0
}
fn default_pause_speed() -> f32 {
    30.0
}
fn default_tolerance() -> f32 {
    0.15
}

/// One directional stroke of a spell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct SpellStep {
    pub directions: Vec<Direction>,
    /// Seconds.
    #[serde(default)]
    #[builder(default = 0.0)]
    pub min_duration: f32,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub max_duration: Option<f32>,
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub required: bool,
    /// Structural placeholder, never scored for distance or duration.
    #[serde(default)]
    #[builder(default = false)]
    pub is_pause: bool,
}

impl SpellStep {
    pub fn required(directions: &[Direction], min_duration: f32) -> Self {
        Self::builder()
            .directions(directions.to_vec())
            .min_duration(min_duration)
            .build()
    }

    pub fn optional(directions: &[Direction], min_duration: f32) -> Self {
        Self::builder()
            .directions(directions.to_vec())
            .min_duration(min_duration)
            .required(false)
            .build()
    }

    pub fn pause(min_duration: f32) -> Self {
        Self::builder()
            .directions(vec![Direction::Idle])
            .min_duration(min_duration)
            .is_pause(true)
            .build()
    }

    #[inline(always)]
    pub fn allows(&self, direction: Direction) -> bool {
        self.directions.contains(&direction)
    }

    #[inline(always)]
    pub fn fits_duration(&self, duration: f32) -> bool {
        duration >= self.min_duration && self.max_duration.map_or(true, |max| duration <= max)
    }

    pub fn accepts(&self, segment: &GestureSegment) -> bool {
        self.allows(segment.direction) && self.fits_duration(segment.duration)
    }

    #[inline(always)]
    pub fn is_scorable(&self) -> bool {
        !self.is_pause
    }

    /// Smallest circular sector distance from `direction` to any allowed direction.
    pub fn adjacency(&self, direction: Direction) -> Option<u8> {
        self.directions
            .iter()
            .filter_map(|d| d.adjacency(direction))
            .min()
    }
}

/// Named run of steps sharing a semantic role (e.g. "stem", "loop").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct SpellStepGroup {
    #[builder(setter(into))]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<SpellStep>,
    /// Target share of the spell's total distance, in [0, 1].
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub relative_distance: Option<f32>,
    /// Target share of the spell's scorable duration, in [0, 1].
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub relative_duration: Option<f32>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub min_steps: Option<usize>,
}

/// Which optional validation rules a spell opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFlags {
    pub check_total_distance: bool,
    pub check_distance_ratios: bool,
    pub check_group_min_steps: bool,
    pub check_filler_duration: bool,
}

impl Default for RuleFlags {
    fn default() -> Self {
        Self {
            check_total_distance: false,
            check_distance_ratios: false,
            check_group_min_steps: false,
            check_filler_duration: true,
        }
    }
}

/// Declarative gesture template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct SpellDefinition {
    #[builder(setter(into))]
    pub id: String,
    #[builder(setter(into))]
    pub name: String,
    pub groups: Vec<SpellStepGroup>,

    // === WHOLE-SPELL CONSTRAINTS ===
    /// Minimum number of scorable steps a match must use.
    #[serde(default = "default_min_total_steps")]
    #[builder(default = 1)]
    pub min_total_steps: usize,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub min_total_duration: Option<f32>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub max_total_duration: Option<f32>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub min_total_distance: Option<f32>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub max_total_distance: Option<f32>,

    // === FILLER ===
    #[serde(default = "default_max_idle_gap")]
    #[builder(default = 1.0)]
    pub max_idle_gap: f32,
    #[serde(default = "default_max_filler_duration")]
    #[builder(default = 1.0)]
    pub max_filler_duration: f32,

    // === QUIET PERIODS ===
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub pre_pause: Option<f32>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub post_pause: Option<f32>,
    /// Mean speed at or below which a motion segment counts as paused.
    #[serde(default = "default_pause_speed")]
    #[builder(default = 30.0)]
    pub pause_speed_threshold: f32,

    // === TOLERANCES ===
    #[serde(default = "default_tolerance")]
    #[builder(default = 0.15)]
    pub distance_tolerance: f32,
    #[serde(default = "default_tolerance")]
    #[builder(default = 0.15)]
    pub duration_tolerance: f32,

    #[serde(default)]
    #[builder(default)]
    pub rules: RuleFlags,
}

impl SpellDefinition {
    pub fn step_count(&self) -> usize {
        self.groups.iter().map(|g| g.steps.len()).sum()
    }

    pub fn has_distance_targets(&self) -> bool {
        self.groups.iter().any(|g| g.relative_distance.is_some())
    }

    pub fn has_group_minimums(&self) -> bool {
        self.groups.iter().any(|g| g.min_steps.is_some())
    }
}
