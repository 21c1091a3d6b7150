pub mod compiler;
pub mod model;
pub mod registry;

pub use self::compiler::{CompiledSpell, SpellCompiler};
pub use self::model::{RuleFlags, SpellDefinition, SpellStep, SpellStepGroup};
pub use self::registry::{SpellLibrary, TemplateRegistry};
