use crate::config::Config;
use crate::error::WfResult;
use crate::events::{EventBus, SegmentEvent};
use crate::loader::split_by_controller;
use crate::matcher::SpellMatcher;
use crate::motion::MotionPipeline;
use crate::spell::TemplateRegistry;
use crate::types::{ControllerId, GestureSegment, RotationSample, SpellMatch};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-controller state: segmentation feeding spell matching.
#[derive(Debug, Clone)]
pub struct ControllerSession {
    pub pipeline: MotionPipeline,
    pub matcher: SpellMatcher,
}

/// Entry point for raw samples. Each controller id gets an independent session.
#[derive(Debug)]
pub struct GestureEngine {
    config: Config,
    registry: Arc<TemplateRegistry>,
    active_spell: Option<String>,
    seed: Option<u64>,
    sessions: HashMap<ControllerId, ControllerSession>,

    pub segments: EventBus<SegmentEvent>,
    pub matches: EventBus<SpellMatch>,
}

impl GestureEngine {
    pub fn new(config: Config, registry: Arc<TemplateRegistry>, seed: Option<u64>) -> Self {
        Self {
            config,
            registry,
            active_spell: None,
            seed,
            sessions: HashMap::new(),
            segments: EventBus::new(),
            matches: EventBus::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn active_spell(&self) -> Option<&str> {
        self.active_spell.as_deref()
    }

    /// Selects the spell every controller, current and future, listens for.
    pub fn select_spell(&mut self, spell_id: &str) -> WfResult<()> {
        let compiled = self.registry.require(spell_id)?;
        for session in self.sessions.values_mut() {
            session.matcher.select(Arc::clone(&compiled));
        }
        self.active_spell = Some(spell_id.to_string());
        Ok(())
    }

    pub fn session(&self, id: &str) -> Option<&ControllerSession> {
        self.sessions.get(id)
    }

    pub fn controller_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn process(&mut self, sample: &RotationSample) -> Option<SpellMatch> {
        if !self.sessions.contains_key(&sample.id) {
            let session = self.open_session(&sample.id);
            self.sessions.insert(sample.id.clone(), session);
        }
        let session = self.sessions.get_mut(&sample.id)?;
        let segment = session.pipeline.process(sample).segment?;
        self.dispatch(&sample.id, segment)
    }

    /// Flushes every open segment, as at end of stream.
    pub fn finish_all(&mut self) -> Vec<SpellMatch> {
        let mut ids: Vec<ControllerId> = self.sessions.keys().cloned().collect();
        ids.sort();

        let mut found = Vec::new();
        for id in ids {
            let segment = self
                .sessions
                .get_mut(&id)
                .and_then(|s| s.pipeline.finish());
            if let Some(m) = segment.and_then(|seg| self.dispatch(&id, seg)) {
                found.push(m);
            }
        }
        found
    }

    pub fn remove_controller(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    fn open_session(&self, id: &str) -> ControllerSession {
        debug!("opening session for controller '{}'", id);
        let seed = self.seed.map(|s| s.wrapping_add(self.sessions.len() as u64));
        let mut matcher = SpellMatcher::new(id, &self.config, seed);
        if let Some(compiled) = self
            .active_spell
            .as_deref()
            .and_then(|spell_id| self.registry.compiled(spell_id))
        {
            matcher.select(Arc::clone(compiled));
        }
        ControllerSession {
            pipeline: MotionPipeline::new(&self.config.motion),
            matcher,
        }
    }

    fn dispatch(&mut self, id: &str, segment: GestureSegment) -> Option<SpellMatch> {
        self.segments.publish(&SegmentEvent {
            controller_id: id.to_string(),
            segment: segment.clone(),
        });

        let session = self.sessions.get_mut(id)?;
        let found = session.matcher.on_segment(segment)?;
        session.matcher.reset_history();
        self.matches.publish(&found);
        Some(found)
    }
}

/// Streams one controller's samples through a fresh engine.
pub fn replay_stream(
    config: &Config,
    registry: Arc<TemplateRegistry>,
    spell_id: &str,
    samples: &[RotationSample],
    seed: Option<u64>,
) -> WfResult<Vec<SpellMatch>> {
    let mut engine = GestureEngine::new(config.clone(), registry, seed);
    engine.select_spell(spell_id)?;

    let mut found: Vec<SpellMatch> = samples.iter().filter_map(|s| engine.process(s)).collect();
    found.extend(engine.finish_all());
    Ok(found)
}

/// Replays an interleaved recording, one controller per worker.
pub fn replay_recording(
    config: &Config,
    registry: Arc<TemplateRegistry>,
    spell_id: &str,
    samples: Vec<RotationSample>,
    seed: Option<u64>,
) -> WfResult<Vec<SpellMatch>> {
    registry.require(spell_id)?;
    let streams = split_by_controller(samples);

    let per_controller: Vec<WfResult<Vec<SpellMatch>>> = streams
        .par_iter()
        .enumerate()
        .map(|(i, (_, stream))| {
            let stream_seed = seed.map(|s| s.wrapping_add(i as u64));
            replay_stream(config, Arc::clone(&registry), spell_id, stream, stream_seed)
        })
        .collect();

    let mut all = Vec::new();
    for result in per_controller {
        all.extend(result?);
    }
    all.sort_by(|a, b| {
        a.end_ts
            .cmp(&b.end_ts)
            .then_with(|| a.controller_id.cmp(&b.controller_id))
    });
    Ok(all)
}
