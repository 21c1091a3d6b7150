use crate::config::HistoryParams;
use crate::types::GestureSegment;
use std::collections::VecDeque;

/// Bounded, age-pruned ring of closed segments, oldest first.
#[derive(Debug, Clone)]
pub struct SegmentHistory {
    segments: VecDeque<GestureSegment>,
    capacity: usize,
    max_age_ms: u64,
}

impl SegmentHistory {
    pub fn new(capacity: usize, max_age_ms: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            segments: VecDeque::with_capacity(capacity),
            capacity,
            max_age_ms,
        }
    }

    pub fn from_params(params: &HistoryParams) -> Self {
        Self::new(params.history_capacity, params.history_max_age_ms)
    }

    pub fn push(&mut self, segment: GestureSegment) {
        let newest_end = segment.end_ts;
        self.segments.push_back(segment);

        while self.segments.len() > self.capacity {
            self.segments.pop_front();
        }
        while let Some(front) = self.segments.front() {
            if newest_end.saturating_sub(front.end_ts) > self.max_age_ms {
                self.segments.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &GestureSegment> {
        self.segments.iter()
    }

    pub fn newest(&self) -> Option<&GestureSegment> {
        self.segments.back()
    }
}
