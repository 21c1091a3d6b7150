pub mod compress;
pub mod history;
pub mod phase;
pub mod pipeline;
pub mod quantizer;
pub mod segment;

pub use self::compress::compress_segments;
pub use self::history::SegmentHistory;
pub use self::phase::{MotionPhaseTracker, PhaseUpdate};
pub use self::pipeline::{MotionPipeline, MotionStep};
pub use self::quantizer::DirectionQuantizer;
pub use self::segment::{ActiveSegment, BuilderSlot, SegmentBuilder};
