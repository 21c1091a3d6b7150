use crate::config::MotionParams;
use crate::types::MotionPhase;
use tracing::debug;

/// Result of one [`MotionPhaseTracker::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseUpdate {
    pub phase: MotionPhase,
    /// Set on the step that committed a new phase.
    pub changed: Option<MotionPhase>,
    /// Set once per stop episode, on the step that committed `Stationary`.
    pub stop_began: bool,
}

/// Hysteresis state machine over scalar speed.
///
/// Speeds in the band between `speed_stop` and `speed_start` hold the
/// committed phase and leave both pending dwells untouched.
#[derive(Debug, Clone)]
pub struct MotionPhaseTracker {
    speed_start: f32,
    speed_stop: f32,
    min_state_duration_ms: u64,
    min_stopped_duration_ms: u64,

    phase: MotionPhase,
    move_since: Option<u64>,
    stop_since: Option<u64>,
    stop_reported: bool,
}

impl MotionPhaseTracker {
    pub fn new(
        speed_start: f32,
        speed_stop: f32,
        min_state_duration_ms: u64,
        min_stopped_duration_ms: u64,
    ) -> Self {
        Self {
            speed_start,
            speed_stop,
            min_state_duration_ms,
            min_stopped_duration_ms,
            phase: MotionPhase::None,
            move_since: None,
            stop_since: None,
            stop_reported: false,
        }
    }

    pub fn from_params(params: &MotionParams) -> Self {
        Self::new(
            params.speed_start,
            params.speed_stop,
            params.min_state_duration_ms,
            params.min_stopped_duration_ms,
        )
    }

    #[inline(always)]
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn step(&mut self, speed: f32, now_ms: u64) -> PhaseUpdate {
        let mut update = PhaseUpdate {
            phase: self.phase,
            ..Default::default()
        };

        if speed >= self.speed_start {
            self.stop_since = None;
            if self.phase != MotionPhase::Moving {
                let since = *self.move_since.get_or_insert(now_ms);
                if now_ms.saturating_sub(since) >= self.min_state_duration_ms {
                    self.commit(MotionPhase::Moving, &mut update);
                    self.move_since = None;
                    self.stop_reported = false;
                }
            }
        } else if speed <= self.speed_stop {
            self.move_since = None;
            if self.phase != MotionPhase::Stationary {
                let since = *self.stop_since.get_or_insert(now_ms);
                if now_ms.saturating_sub(since) >= self.min_stopped_duration_ms {
                    self.commit(MotionPhase::Stationary, &mut update);
                    self.stop_since = None;
                    if !self.stop_reported {
                        self.stop_reported = true;
                        update.stop_began = true;
                    }
                }
            }
        }

        update
    }

    fn commit(&mut self, phase: MotionPhase, update: &mut PhaseUpdate) {
        debug!("motion phase {} -> {}", self.phase, phase);
        self.phase = phase;
        update.phase = phase;
        update.changed = Some(phase);
    }

    /// Returns to the initial phase and drops any partial dwell.
    pub fn stop(&mut self) {
        self.phase = MotionPhase::None;
        self.move_since = None;
        self.stop_since = None;
        self.stop_reported = false;
    }
}
