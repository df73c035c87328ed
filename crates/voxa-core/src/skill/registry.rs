//! Registry of skill factories and the currently enabled skill instances.
//!
//! The registry owns the factories in registration order (which is also the
//! tie-break order of the ranker) and publishes the built, enabled skills on
//! a `watch` channel so the engine and the auto-skill scheduler always see a
//! consistent set.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info};

use voxa_types::error::RegistryError;

use super::context::SkillContext;
use super::info::SkillInfo;
use super::traits::Skill;

/// An enabled skill: its factory and the instance built from it.
#[derive(Clone)]
pub struct BuiltSkill {
    pub info: Arc<dyn SkillInfo>,
    pub skill: Arc<dyn Skill>,
}

impl fmt::Debug for BuiltSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltSkill")
            .field("id", &self.info.id())
            .finish()
    }
}

pub type EnabledSkills = Arc<Vec<BuiltSkill>>;

/// Registered skills and the enabled subset.
pub struct SkillRegistry {
    infos: Vec<Arc<dyn SkillInfo>>,
    ctx: Arc<SkillContext>,
    enabled_ids: Mutex<HashSet<String>>,
    published: watch::Sender<EnabledSkills>,
}

impl SkillRegistry {
    /// Register factories in order. Nothing is enabled yet.
    pub fn new(
        infos: Vec<Arc<dyn SkillInfo>>,
        ctx: Arc<SkillContext>,
    ) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for info in &infos {
            if !seen.insert(info.id().to_string()) {
                return Err(RegistryError::DuplicateSkill(info.id().to_string()));
            }
        }

        let (published, _) = watch::channel(Arc::new(Vec::new()));
        Ok(Self {
            infos,
            ctx,
            enabled_ids: Mutex::new(HashSet::new()),
            published,
        })
    }

    pub fn infos(&self) -> &[Arc<dyn SkillInfo>] {
        &self.infos
    }

    pub fn info(&self, id: &str) -> Option<&Arc<dyn SkillInfo>> {
        self.infos.iter().find(|info| info.id() == id)
    }

    pub fn context(&self) -> &Arc<SkillContext> {
        &self.ctx
    }

    /// Enable exactly `ids`, rebuilding every enabled instance.
    pub fn set_enabled<I, S>(&self, ids: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = HashSet::new();
        for id in ids {
            let id = id.as_ref();
            if self.info(id).is_none() {
                return Err(RegistryError::UnknownSkill(id.to_string()));
            }
            wanted.insert(id.to_string());
        }

        let mut enabled = self.enabled_ids.lock().expect("skill registry lock poisoned");
        self.rebuild(&wanted)?;
        *enabled = wanted;
        Ok(())
    }

    /// Enable every registered skill whose id is not in `disabled`.
    /// Unknown ids in `disabled` are ignored.
    pub fn enable_all_except(&self, disabled: &[String]) -> Result<(), RegistryError> {
        let ids: Vec<String> = self
            .infos
            .iter()
            .map(|info| info.id().to_string())
            .filter(|id| !disabled.contains(id))
            .collect();
        self.set_enabled(ids)
    }

    /// Toggle one skill, leaving the rest of the enabled set unchanged.
    pub fn set_skill_enabled(&self, id: &str, enable: bool) -> Result<(), RegistryError> {
        if self.info(id).is_none() {
            return Err(RegistryError::UnknownSkill(id.to_string()));
        }

        let mut enabled = self.enabled_ids.lock().expect("skill registry lock poisoned");
        let mut wanted = enabled.clone();
        let changed = if enable {
            wanted.insert(id.to_string())
        } else {
            wanted.remove(id)
        };
        if !changed {
            return Ok(());
        }
        self.rebuild(&wanted)?;
        *enabled = wanted;
        Ok(())
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled_ids
            .lock()
            .expect("skill registry lock poisoned")
            .contains(id)
    }

    /// The current enabled set, in registration order.
    pub fn enabled(&self) -> EnabledSkills {
        self.published.borrow().clone()
    }

    pub fn enabled_skills(&self) -> Vec<Arc<dyn Skill>> {
        self.enabled().iter().map(|built| Arc::clone(&built.skill)).collect()
    }

    /// Receive every future change of the enabled set.
    pub fn subscribe(&self) -> watch::Receiver<EnabledSkills> {
        self.published.subscribe()
    }

    fn rebuild(&self, wanted: &HashSet<String>) -> Result<(), RegistryError> {
        let mut built = Vec::new();
        for info in &self.infos {
            if !wanted.contains(info.id()) {
                continue;
            }
            if !info.is_available(&self.ctx) {
                debug!(skill = info.id(), "skill unavailable, not enabling");
                continue;
            }
            let skill = info
                .build(&self.ctx)
                .map_err(|source| RegistryError::MalformedPattern {
                    skill: info.id().to_string(),
                    source,
                })?;
            built.push(BuiltSkill {
                info: Arc::clone(info),
                skill,
            });
        }

        info!(count = built.len(), "enabled skills updated");
        self.published.send_replace(Arc::new(built));
        Ok(())
    }
}

impl fmt::Debug for SkillRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillRegistry")
            .field("registered", &self.infos.len())
            .field("enabled", &self.enabled().len())
            .finish()
    }
}
