use super::compiler::{CompiledSpell, SpellCompiler};
use super::model::SpellDefinition;
use crate::error::{WandError, WfResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// On-disk layout of a spell library file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellLibrary {
    #[serde(default)]
    pub spells: Vec<SpellDefinition>,
}

/// Immutable set of spell templates, compiled once at load.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    compiled: Vec<Arc<CompiledSpell>>,
    by_id: HashMap<String, usize>,
}

impl TemplateRegistry {
    pub fn from_definitions(definitions: Vec<SpellDefinition>) -> WfResult<Self> {
        let mut reg = Self::default();
        for def in definitions {
            if reg.by_id.contains_key(&def.id) {
                return Err(WandError::DuplicateSpell(def.id));
            }
            let compiled = SpellCompiler::compile(Arc::new(def))?;
            reg.by_id
                .insert(compiled.id().to_string(), reg.compiled.len());
            reg.compiled.push(Arc::new(compiled));
        }
        Ok(reg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> WfResult<Self> {
        let content = fs::read_to_string(&path)?;
        let library: SpellLibrary = serde_json::from_str(&content)?;
        if library.spells.is_empty() {
            warn!(
                "spell library '{}' contains no spells",
                path.as_ref().display()
            );
        }
        let reg = Self::from_definitions(library.spells)?;
        info!(
            "loaded {} spells from '{}'",
            reg.len(),
            path.as_ref().display()
        );
        Ok(reg)
    }

    pub fn get(&self, id: &str) -> Option<&SpellDefinition> {
        self.compiled(id).map(|c| c.definition.as_ref())
    }

    pub fn compiled(&self, id: &str) -> Option<&Arc<CompiledSpell>> {
        self.by_id.get(id).map(|&i| &self.compiled[i])
    }

    pub fn require(&self, id: &str) -> WfResult<Arc<CompiledSpell>> {
        self.compiled(id)
            .cloned()
            .ok_or_else(|| WandError::UnknownSpell(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledSpell>> {
        self.compiled.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.compiled.iter().map(|c| c.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
