use crate::error::{WandError, WfResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub motion: MotionParams,
    #[command(flatten)]
    pub filler: FillerParams,
    #[command(flatten)]
    pub weights: ScoringWeights,
    #[command(flatten)]
    pub history: HistoryParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    // === PHASE HYSTERESIS (deg/s) ===
    #[arg(long, default_value_t = 60.0)]
    pub speed_start: f32,
    #[arg(long, default_value_t = 25.0)]
    pub speed_stop: f32,
    #[arg(long, default_value_t = 15.0)]
    pub axis_deadband: f32,

    // === DWELLS (ms) ===
    #[arg(long, default_value_t = 40)]
    pub direction_dwell_ms: u64,
    #[arg(long, default_value_t = 30)]
    pub min_state_duration_ms: u64,
    #[arg(long, default_value_t = 120)]
    pub min_stopped_duration_ms: u64,

    // Used for the first sample of a stream, before a real interval exists
    #[arg(long, default_value_t = 10)]
    pub nominal_sample_interval_ms: u64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            speed_start: 60.0,
            speed_stop: 25.0,
            axis_deadband: 15.0,
            direction_dwell_ms: 40,
            min_state_duration_ms: 30,
            min_stopped_duration_ms: 120,
            nominal_sample_interval_ms: 10,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillerParams {
    /// Motion segments at most this long (s) may be absorbed into a neighbouring group.
    #[arg(long, default_value_t = 0.12)]
    pub absorbable_duration: f32,
    /// Maximum circular sector distance for absorption.
    #[arg(long, default_value_t = 1)]
    pub adjacency_tolerance: u8,
}

impl Default for FillerParams {
    fn default() -> Self {
        Self {
            absorbable_duration: 0.12,
            adjacency_tolerance: 1,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // Share of the count score given to required coverage
    #[arg(long, default_value_t = 0.7)]
    pub count_bias: f32,

    // === BLEND ===
    #[arg(long, default_value_t = 0.5)]
    pub weight_count: f32,
    #[arg(long, default_value_t = 0.25)]
    pub weight_distance: f32,
    #[arg(long, default_value_t = 0.25)]
    pub weight_duration: f32,

    /// Half-width of the uniform jitter added to the final score, in points.
    #[arg(long, default_value_t = 0.35)]
    pub jitter: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            count_bias: 0.7,
            weight_count: 0.5,
            weight_distance: 0.25,
            weight_duration: 0.25,
            jitter: 0.35,
        }
    }
}

impl ScoringWeights {
    #[inline(always)]
    pub fn total_weight(&self) -> f32 {
        self.weight_count + self.weight_distance + self.weight_duration
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryParams {
    #[arg(long, default_value_t = 32)]
    pub history_capacity: usize,
    #[arg(long, default_value_t = 8_000)]
    pub history_max_age_ms: u64,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            history_capacity: 32,
            history_max_age_ms: 8_000,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> WfResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WfResult<()> {
        let m = &self.motion;
        if m.speed_start <= 0.0 || m.speed_stop <= 0.0 {
            return Err(WandError::Config(
                "speed thresholds must be positive".to_string(),
            ));
        }
        if m.speed_stop > m.speed_start {
            return Err(WandError::Config(format!(
                "speed_stop ({}) must not exceed speed_start ({})",
                m.speed_stop, m.speed_start
            )));
        }
        if m.axis_deadband < 0.0 {
            return Err(WandError::Config("axis_deadband is negative".to_string()));
        }
        if self.filler.absorbable_duration < 0.0 {
            return Err(WandError::Config(
                "absorbable_duration is negative".to_string(),
            ));
        }
        if self.history.history_capacity == 0 {
            return Err(WandError::Config(
                "history_capacity must be at least 1".to_string(),
            ));
        }

        let w = &self.weights;
        if !(0.0..=1.0).contains(&w.count_bias) {
            return Err(WandError::Config(format!(
                "count_bias {} is outside [0, 1]",
                w.count_bias
            )));
        }
        if w.weight_count < 0.0 || w.weight_distance < 0.0 || w.weight_duration < 0.0 {
            return Err(WandError::Config("score weights are negative".to_string()));
        }
        if w.total_weight() <= 0.0 {
            return Err(WandError::Config("score weights sum to zero".to_string()));
        }
        if w.jitter < 0.0 {
            return Err(WandError::Config("jitter is negative".to_string()));
        }
        Ok(())
    }

    /// Overwrites fields the user passed explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(motion.speed_start);
        update_if_present!(motion.speed_stop);
        update_if_present!(motion.axis_deadband);
        update_if_present!(motion.direction_dwell_ms);
        update_if_present!(motion.min_state_duration_ms);
        update_if_present!(motion.min_stopped_duration_ms);
        update_if_present!(motion.nominal_sample_interval_ms);

        update_if_present!(filler.absorbable_duration);
        update_if_present!(filler.adjacency_tolerance);

        update_if_present!(weights.count_bias);
        update_if_present!(weights.weight_count);
        update_if_present!(weights.weight_distance);
        update_if_present!(weights.weight_duration);
        update_if_present!(weights.jitter);

        update_if_present!(history.history_capacity);
        update_if_present!(history.history_max_age_ms);
    }
}
