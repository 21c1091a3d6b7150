use crate::consts::{DIRECTION_COUNT, SECTOR_OFFSET_DEG, SECTOR_WIDTH_DEG};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Identifies one physical controller. Streams from different ids never mix.
pub type ControllerId = String;

/// One rotation reading from a controller, as produced by the packet interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSample {
    pub id: ControllerId,
    pub timestamp_ms: u64,
    pub x_delta: f32,
    pub y_delta: f32,
    /// Normalized absolute position, when the interpreter provides one.
    #[serde(default)]
    pub abs_position: Option<(f32, f32)>,
}

impl RotationSample {
    pub fn new(id: impl Into<ControllerId>, timestamp_ms: u64, x_delta: f32, y_delta: f32) -> Self {
        Self {
            id: id.into(),
            timestamp_ms,
            x_delta,
            y_delta,
            abs_position: None,
        }
    }

    #[inline(always)]
    pub fn magnitude(&self) -> f32 {
        (self.x_delta * self.x_delta + self.y_delta * self.y_delta).sqrt()
    }
}

/// Compass direction of sustained motion, or `Idle` when there is none.
///
/// The first eight variants are ordered counter-clockwise starting at East,
/// so the discriminant doubles as the sector index.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
    Idle,
}

impl Direction {
    pub fn from_sector(sector: u8) -> Self {
        match sector % DIRECTION_COUNT {
            0 => Self::East,
            1 => Self::NorthEast,
            2 => Self::North,
            3 => Self::NorthWest,
            4 => Self::West,
            5 => Self::SouthWest,
            6 => Self::South,
            _ => Self::SouthEast,
        }
    }

    /// Buckets an angle in degrees (East = 0, counter-clockwise) into a sector.
    pub fn from_angle_deg(angle: f32) -> Self {
        let shifted = (angle + SECTOR_OFFSET_DEG).rem_euclid(360.0);
        Self::from_sector((shifted / SECTOR_WIDTH_DEG) as u8)
    }

    pub fn sector(self) -> Option<u8> {
        match self {
            Self::East => Some(0),
            Self::NorthEast => Some(1),
            Self::North => Some(2),
            Self::NorthWest => Some(3),
            Self::West => Some(4),
            Self::SouthWest => Some(5),
            Self::South => Some(6),
            Self::SouthEast => Some(7),
            Self::Idle => None,
        }
    }

    #[inline(always)]
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Circular distance in sectors (0..=4). `None` when either side is idle.
    pub fn adjacency(self, other: Direction) -> Option<u8> {
        let a = self.sector()?;
        let b = other.sector()?;
        let d = a.abs_diff(b);
        Some(d.min(DIRECTION_COUNT - d))
    }
}

/// Coarse motion state derived from scalar speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    #[default]
    None,
    Stationary,
    Moving,
}

/// A closed interval of consistent committed direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureSegment {
    pub start_ts: u64,
    pub end_ts: u64,
    /// Seconds.
    pub duration: f32,
    pub sample_count: u32,
    pub direction: Direction,

    // Net displacement
    pub net_dx: f32,
    pub net_dy: f32,

    // Normalized net displacement; zeroed once segments are merged
    pub dir_x: f32,
    pub dir_y: f32,

    pub mean_speed: f32,
    pub path_length: f32,
}

/// Sub-scores behind a match's accuracy, each in [0, 1].
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyBreakdown {
    pub count: f32,
    pub distance: f32,
    pub duration: f32,
}

/// A validated, scored spell recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellMatch {
    pub controller_id: ControllerId,
    pub spell_id: String,
    pub spell_name: String,

    pub start_ts: u64,
    pub end_ts: u64,
    pub duration: f32,

    // Coverage
    pub used_steps: usize,
    pub total_steps: usize,
    pub required_matched: usize,
    pub required_total: usize,
    pub optional_matched: usize,
    pub optional_total: usize,
    pub pause_steps_matched: usize,

    pub filler_duration: f32,
    pub accuracy: f32,
    pub breakdown: AccuracyBreakdown,
}
