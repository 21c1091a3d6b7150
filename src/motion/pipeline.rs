use super::phase::{MotionPhaseTracker, PhaseUpdate};
use super::quantizer::DirectionQuantizer;
use super::segment::SegmentBuilder;
use crate::config::MotionParams;
use crate::consts::MIN_SAMPLE_INTERVAL_MS;
use crate::types::{Direction, GestureSegment, MotionPhase, RotationSample};
use tracing::warn;

/// Outcome of feeding one sample through a [`MotionPipeline`].
#[derive(Debug, Clone, Default)]
pub struct MotionStep {
    pub phase: PhaseUpdate,
    pub segment: Option<GestureSegment>,
}

/// Turns one controller's sample stream into closed gesture segments.
///
/// Rates are derived from the deltas and the time since the previous sample.
/// A stop episode forces the quantizer to idle and rolls the open segment
/// over into an idle one.
#[derive(Debug, Clone)]
pub struct MotionPipeline {
    nominal_interval_ms: u64,
    quantizer: DirectionQuantizer,
    tracker: MotionPhaseTracker,
    builder: SegmentBuilder,
    last_ts: Option<u64>,
}

impl MotionPipeline {
    pub fn new(params: &MotionParams) -> Self {
        Self {
            nominal_interval_ms: params.nominal_sample_interval_ms,
            quantizer: DirectionQuantizer::from_params(params),
            tracker: MotionPhaseTracker::from_params(params),
            builder: SegmentBuilder::new(),
            last_ts: None,
        }
    }

    pub fn phase(&self) -> MotionPhase {
        self.tracker.phase()
    }

    pub fn direction(&self) -> Direction {
        self.quantizer.current()
    }

    pub fn process(&mut self, sample: &RotationSample) -> MotionStep {
        if !(sample.x_delta.is_finite() && sample.y_delta.is_finite()) {
            warn!(
                "dropping non-finite sample for '{}' at {} ms",
                sample.id, sample.timestamp_ms
            );
            return MotionStep {
                phase: PhaseUpdate {
                    phase: self.tracker.phase(),
                    ..PhaseUpdate::default()
                },
                segment: None,
            };
        }

        let dt_ms = match self.last_ts {
            Some(prev) => sample.timestamp_ms.saturating_sub(prev),
            None => self.nominal_interval_ms,
        }
        .max(MIN_SAMPLE_INTERVAL_MS);
        self.last_ts = Some(sample.timestamp_ms);

        let dt = dt_ms as f32 / 1000.0;
        let vx = sample.x_delta / dt;
        let vy = sample.y_delta / dt;
        let speed = (vx * vx + vy * vy).sqrt();

        let phase = self.tracker.step(speed, sample.timestamp_ms);

        let segment = if phase.stop_began {
            self.quantizer.force(Direction::Idle);
            self.roll_over(Direction::Idle, sample)
        } else if let Some(direction) =
            self.quantizer
                .update(vx, vy, speed, sample.timestamp_ms)
        {
            self.roll_over(direction, sample)
        } else {
            self.builder.accumulate(sample);
            None
        };

        MotionStep { phase, segment }
    }

    fn roll_over(&mut self, direction: Direction, sample: &RotationSample) -> Option<GestureSegment> {
        match self.builder.active_direction() {
            Some(open) if open == direction => {
                self.builder.accumulate(sample);
                None
            }
            Some(_) => self.builder.commit(direction, sample),
            None => {
                self.builder.start(direction, sample);
                None
            }
        }
    }

    /// Closes the open segment at end of stream.
    pub fn finish(&mut self) -> Option<GestureSegment> {
        self.builder.finish()
    }

    pub fn reset(&mut self) {
        self.quantizer.reset();
        self.tracker.stop();
        self.builder.reset();
        self.last_ts = None;
    }
}
