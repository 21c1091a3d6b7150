use crate::types::{Direction, GestureSegment, RotationSample};
use tracing::trace;

/// Running totals of the segment currently being built.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSegment {
    pub direction: Direction,
    pub start_ts: u64,
    pub last_ts: u64,
    pub sample_count: u32,
    pub net_dx: f32,
    pub net_dy: f32,
    pub path_length: f32,
}

impl ActiveSegment {
    fn open(direction: Direction, sample: &RotationSample) -> Self {
        let mut seg = Self {
            direction,
            start_ts: sample.timestamp_ms,
            last_ts: sample.timestamp_ms,
            sample_count: 0,
            net_dx: 0.0,
            net_dy: 0.0,
            path_length: 0.0,
        };
        seg.push(sample);
        seg
    }

    fn push(&mut self, sample: &RotationSample) {
        self.last_ts = self.last_ts.max(sample.timestamp_ms);
        self.sample_count += 1;
        self.net_dx += sample.x_delta;
        self.net_dy += sample.y_delta;
        self.path_length += sample.magnitude();
    }

    fn close(self) -> GestureSegment {
        let duration = self.last_ts.saturating_sub(self.start_ts) as f32 / 1000.0;
        let net = (self.net_dx * self.net_dx + self.net_dy * self.net_dy).sqrt();
        let (dir_x, dir_y) = if net > 0.0 {
            (self.net_dx / net, self.net_dy / net)
        } else {
            (0.0, 0.0)
        };
        let mean_speed = if duration > 0.0 {
            self.path_length / duration
        } else {
            0.0
        };

        GestureSegment {
            start_ts: self.start_ts,
            end_ts: self.last_ts,
            duration,
            sample_count: self.sample_count,
            direction: self.direction,
            net_dx: self.net_dx,
            net_dy: self.net_dy,
            dir_x,
            dir_y,
            mean_speed,
            path_length: self.path_length,
        }
    }
}

/// Holds at most one in-progress segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BuilderSlot {
    #[default]
    Idle,
    Active(ActiveSegment),
}

/// Accumulates samples into closed [`GestureSegment`] records.
#[derive(Debug, Clone, Default)]
pub struct SegmentBuilder {
    slot: BuilderSlot,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.slot, BuilderSlot::Active(_))
    }

    pub fn active_direction(&self) -> Option<Direction> {
        match &self.slot {
            BuilderSlot::Active(seg) => Some(seg.direction),
            BuilderSlot::Idle => None,
        }
    }

    pub fn slot(&self) -> &BuilderSlot {
        &self.slot
    }

    /// Opens a segment seeded with `sample`. Any open segment is discarded.
    pub fn start(&mut self, direction: Direction, sample: &RotationSample) {
        self.slot = BuilderSlot::Active(ActiveSegment::open(direction, sample));
    }

    /// Adds a sample to the open segment. Ignored when nothing is open.
    pub fn accumulate(&mut self, sample: &RotationSample) {
        if let BuilderSlot::Active(seg) = &mut self.slot {
            seg.push(sample);
        }
    }

    /// Closes the open segment, if any.
    pub fn finish(&mut self) -> Option<GestureSegment> {
        match std::mem::take(&mut self.slot) {
            BuilderSlot::Active(seg) => Some(seg.close()),
            BuilderSlot::Idle => None,
        }
    }

    /// Closes the open segment at `sample`'s timestamp and opens the next one there.
    pub fn commit(
        &mut self,
        direction: Direction,
        sample: &RotationSample,
    ) -> Option<GestureSegment> {
        let closed = match std::mem::take(&mut self.slot) {
            BuilderSlot::Active(mut seg) => {
                seg.last_ts = seg.last_ts.max(sample.timestamp_ms);
                let closed = seg.close();
                trace!(
                    "segment closed: {} {:.3}s ({} samples)",
                    closed.direction,
                    closed.duration,
                    closed.sample_count
                );
                Some(closed)
            }
            BuilderSlot::Idle => None,
        };
        self.start(direction, sample);
        closed
    }

    /// Drops the open segment without emitting it.
    pub fn reset(&mut self) {
        self.slot = BuilderSlot::Idle;
    }
}
