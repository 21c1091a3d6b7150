use crate::config::FillerParams;
use crate::spell::SpellStep;
use crate::types::GestureSegment;

/// How a segment that failed a required step is treated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillerDecision {
    /// Idle gap short enough to step over.
    Idle { duration: f32 },
    /// Short stroke adjacent to a neighbouring step; its distance goes to `group`.
    Absorbed { group: usize, distance: f32 },
    /// Unrelated motion, tolerated but not credited.
    Filler { duration: f32 },
    /// Idle gap longer than the spell allows; the anchor is abandoned.
    Reject,
}

impl FillerDecision {
    pub fn is_reject(&self) -> bool {
        matches!(self, Self::Reject)
    }
}

/// A step that the current attempt may compare a mismatching segment against.
#[derive(Debug, Clone, Copy)]
pub struct StepRef<'a> {
    pub step: &'a SpellStep,
    pub group: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FillerPolicy {
    absorbable_duration: f32,
    adjacency_tolerance: u8,
}

impl Default for FillerPolicy {
    fn default() -> Self {
        Self::from_params(&FillerParams::default())
    }
}

impl FillerPolicy {
    pub fn new(absorbable_duration: f32, adjacency_tolerance: u8) -> Self {
        Self {
            absorbable_duration,
            adjacency_tolerance,
        }
    }

    pub fn from_params(params: &FillerParams) -> Self {
        Self::new(params.absorbable_duration, params.adjacency_tolerance)
    }

    /// `pending` is the step the segment failed; `last_matched` is the most
    /// recently matched scorable step of this attempt, if any.
    pub fn evaluate(
        &self,
        segment: &GestureSegment,
        pending: StepRef<'_>,
        last_matched: Option<StepRef<'_>>,
        max_idle_gap: f32,
    ) -> FillerDecision {
        if segment.direction.is_idle() {
            return if segment.duration <= max_idle_gap {
                FillerDecision::Idle {
                    duration: segment.duration,
                }
            } else {
                FillerDecision::Reject
            };
        }

        if segment.duration <= self.absorbable_duration {
            if let Some(group) = self.absorbing_group(segment, pending, last_matched) {
                return FillerDecision::Absorbed {
                    group,
                    distance: segment.path_length,
                };
            }
        }

        FillerDecision::Filler {
            duration: segment.duration,
        }
    }

    fn absorbing_group(
        &self,
        segment: &GestureSegment,
        pending: StepRef<'_>,
        last_matched: Option<StepRef<'_>>,
    ) -> Option<usize> {
        let to_pending = pending
            .step
            .adjacency(segment.direction)
            .map(|d| (d, pending.group));
        let to_last = last_matched
            .and_then(|r| r.step.adjacency(segment.direction).map(|d| (d, r.group)));

        let best = match (to_pending, to_last) {
            (Some(p), Some(l)) if l.0 < p.0 => Some(l),
            (Some(p), _) => Some(p),
            (None, l) => l,
        };

        best.filter(|(dist, _)| *dist <= self.adjacency_tolerance)
            .map(|(_, group)| group)
    }
}
