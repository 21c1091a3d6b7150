/// Number of compass sectors a motion direction is bucketed into.
pub const DIRECTION_COUNT: u8 = 8;

/// Angular width of one compass sector, in degrees.
pub const SECTOR_WIDTH_DEG: f32 = 360.0 / DIRECTION_COUNT as f32;

/// Offset applied before bucketing so that East spans [-22.5, 22.5).
pub const SECTOR_OFFSET_DEG: f32 = SECTOR_WIDTH_DEG / 2.0;

/// Tolerance used when comparing ratios for exact equality.
pub const RATIO_EPSILON: f32 = 1e-4;

/// Lowest score a successful match can report.
pub const MIN_REPORTED_SCORE: f32 = 0.01;

/// Highest score a successful match can report.
pub const MAX_REPORTED_SCORE: f32 = 100.0;

/// Shortest time step used when converting deltas to rates (ms).
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 1;
