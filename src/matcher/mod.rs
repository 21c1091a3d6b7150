pub mod accuracy;
pub mod filler;
pub mod orchestrator;
pub mod rules;
pub mod window;

pub use self::accuracy::SpellAccuracyScorer;
pub use self::filler::{FillerDecision, FillerPolicy, StepRef};
pub use self::orchestrator::SpellMatcher;
pub use self::rules::{Rule, RuleContext, RuleViolation, RulesValidator};
pub use self::window::{MatchMetrics, MatchState, SpellWindowMatcher};
