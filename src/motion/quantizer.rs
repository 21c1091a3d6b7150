use crate::config::MotionParams;
use crate::types::Direction;
use tracing::trace;

/// Buckets instantaneous velocity into compass directions, debounced by a dwell.
///
/// `current` is the last committed direction. `candidate` is the most recent
/// distinct bucket, which must repeat after its dwell elapses before it is
/// committed. Readings below the idle threshold are ignored entirely: they do
/// not replace the candidate and do not restart its dwell clock. Idle is only
/// ever committed through [`DirectionQuantizer::force`].
#[derive(Debug, Clone)]
pub struct DirectionQuantizer {
    idle_speed: f32,
    dwell_ms: u64,

    current: Direction,
    candidate: Direction,
    candidate_since: Option<u64>,
}

impl DirectionQuantizer {
    pub fn new(axis_deadband: f32, speed_stop: f32, dwell_ms: u64) -> Self {
        Self {
            idle_speed: axis_deadband.max(speed_stop),
            dwell_ms,
            current: Direction::Idle,
            candidate: Direction::Idle,
            candidate_since: None,
        }
    }

    pub fn from_params(params: &MotionParams) -> Self {
        Self::new(
            params.axis_deadband,
            params.speed_stop,
            params.direction_dwell_ms,
        )
    }

    #[inline(always)]
    pub fn current(&self) -> Direction {
        self.current
    }

    #[inline(always)]
    pub fn candidate(&self) -> Direction {
        self.candidate
    }

    /// True while a candidate is waiting for its dwell to elapse.
    #[inline(always)]
    pub fn is_dwelling(&self) -> bool {
        self.candidate_since.is_some()
    }

    /// Buckets a reading without touching any state. Non-finite readings are idle.
    pub fn classify(&self, vx: f32, vy: f32, speed: f32) -> Direction {
        if !(speed.is_finite() && vx.is_finite() && vy.is_finite()) || speed < self.idle_speed {
            return Direction::Idle;
        }
        Direction::from_angle_deg(vy.atan2(vx).to_degrees())
    }

    /// Feeds one time step. Returns the direction committed by this step, if any.
    pub fn update(&mut self, vx: f32, vy: f32, speed: f32, now_ms: u64) -> Option<Direction> {
        let bucket = self.classify(vx, vy, speed);
        if bucket.is_idle() {
            return None;
        }

        if bucket != self.candidate {
            self.candidate = bucket;
            self.candidate_since = Some(now_ms);
            return None;
        }

        let since = self.candidate_since?;
        if now_ms.saturating_sub(since) < self.dwell_ms {
            return None;
        }

        self.candidate_since = None;
        if self.candidate == self.current {
            return None;
        }

        trace!("direction commit {} -> {}", self.current, self.candidate);
        self.current = self.candidate;
        Some(self.current)
    }

    /// Commits `direction` immediately and cancels any pending dwell.
    pub fn force(&mut self, direction: Direction) {
        self.current = direction;
        self.candidate = direction;
        self.candidate_since = None;
    }

    pub fn reset(&mut self) {
        self.force(Direction::Idle);
    }
}
