#![allow(dead_code)]

use std::sync::Arc;
use wandforge::config::Config;
use wandforge::spell::{CompiledSpell, SpellCompiler, SpellDefinition, SpellStep, SpellStepGroup};
use wandforge::types::{Direction, GestureSegment, RotationSample};

/// Builder for GestureSegment to keep scenario tests readable
pub struct SegBuilder {
    seg: GestureSegment,
}

impl SegBuilder {
    pub fn new(direction: Direction, duration: f32) -> Self {
        let speed = if direction.is_idle() { 0.0 } else { 100.0 };
        Self {
            seg: GestureSegment {
                start_ts: 0,
                end_ts: (duration * 1000.0).round() as u64,
                duration,
                sample_count: ((duration * 100.0).round() as u32).max(1),
                direction,
                net_dx: 0.0,
                net_dy: 0.0,
                dir_x: 0.0,
                dir_y: 0.0,
                mean_speed: speed,
                path_length: speed * duration,
            },
        }
    }

    pub fn at(mut self, start_ts: u64) -> Self {
        let len = self.seg.end_ts - self.seg.start_ts;
        self.seg.start_ts = start_ts;
        self.seg.end_ts = start_ts + len;
        self
    }

    pub fn path(mut self, path_length: f32) -> Self {
        self.seg.path_length = path_length;
        self.seg.mean_speed = if self.seg.duration > 0.0 {
            path_length / self.seg.duration
        } else {
            0.0
        };
        self
    }

    pub fn speed(mut self, mean_speed: f32) -> Self {
        self.seg.mean_speed = mean_speed;
        self.seg.path_length = mean_speed * self.seg.duration;
        self
    }

    pub fn build(self) -> GestureSegment {
        self.seg
    }
}

/// Lays segments end to end starting at t=1000ms. Moving segments travel at
/// 100 deg/s, idle ones at 0.
pub fn history(specs: &[(Direction, f32)]) -> Vec<GestureSegment> {
    let mut t = 1_000;
    specs
        .iter()
        .map(|&(dir, dur)| {
            let seg = SegBuilder::new(dir, dur).at(t).build();
            t = seg.end_ts;
            seg
        })
        .collect()
}

/// Same as [`history`] but with explicit path lengths.
pub fn history_with_paths(specs: &[(Direction, f32, f32)]) -> Vec<GestureSegment> {
    let mut t = 1_000;
    specs
        .iter()
        .map(|&(dir, dur, path)| {
            let seg = SegBuilder::new(dir, dur).at(t).path(path).build();
            t = seg.end_ts;
            seg
        })
        .collect()
}

pub fn step(dir: Direction) -> SpellStep {
    SpellStep::required(&[dir], 0.0)
}

/// North, Southwest, East, each in its own group.
pub fn three_step_def(max_idle_gap: f32) -> SpellDefinition {
    SpellDefinition::builder()
        .id("arc")
        .name("Arc")
        .groups(vec![
            SpellStepGroup::builder()
                .name("rise")
                .steps(vec![step(Direction::North)])
                .build(),
            SpellStepGroup::builder()
                .name("sweep")
                .steps(vec![step(Direction::SouthWest)])
                .build(),
            SpellStepGroup::builder()
                .name("flick")
                .steps(vec![step(Direction::East)])
                .build(),
        ])
        .max_idle_gap(max_idle_gap)
        .build()
}

pub fn compile(def: SpellDefinition) -> CompiledSpell {
    SpellCompiler::compile(Arc::new(def)).expect("spell should compile")
}

/// Default config with jitter disabled so scores are exact.
pub fn quiet_config() -> Config {
    let mut config = Config::default();
    config.weights.jitter = 0.0;
    config
}

/// Constant-velocity stroke at `speed` deg/s along `angle_deg`, one sample every `interval_ms`.
pub fn stroke(
    id: &str,
    start_ms: u64,
    angle_deg: f32,
    speed: f32,
    duration_ms: u64,
    interval_ms: u64,
) -> Vec<RotationSample> {
    let per_sample = speed * interval_ms as f32 / 1000.0;
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    (0..duration_ms / interval_ms)
        .map(|i| {
            RotationSample::new(
                id,
                start_ms + i * interval_ms,
                per_sample * cos,
                per_sample * sin,
            )
        })
        .collect()
}

pub fn stillness(id: &str, start_ms: u64, duration_ms: u64, interval_ms: u64) -> Vec<RotationSample> {
    (0..duration_ms / interval_ms)
        .map(|i| RotationSample::new(id, start_ms + i * interval_ms, 0.0, 0.0))
        .collect()
}

/// North 400ms, Southwest 500ms, East 300ms, then 300ms of stillness.
pub fn arc_gesture(id: &str, start_ms: u64) -> Vec<RotationSample> {
    let mut samples = stroke(id, start_ms, 90.0, 200.0, 400, 10);
    samples.extend(stroke(id, start_ms + 400, 225.0, 200.0, 500, 10));
    samples.extend(stroke(id, start_ms + 900, 0.0, 200.0, 300, 10));
    samples.extend(stillness(id, start_ms + 1200, 300, 10));
    samples
}
