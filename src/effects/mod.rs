//! Effect behaviors and their factory registry.
//!
//! The engine ships no effect catalogue - damage formulas, buff stacking
//! and the rest live in a handler subsystem that registers factories
//! here *before* compilation starts. The compiler resolves behavior
//! names against the registry exactly once, at compile time; runtime
//! dispatch is a plain trait-object call.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use skill_engine::effects::{EffectRegistry, SkillEffect};
//! use skill_engine::skills::StatSet;
//! use skill_engine::world::Creature;
//!
//! struct FlatDamage { power: i64 }
//!
//! impl SkillEffect for FlatDamage {
//!     fn apply(&self, _caster: &dyn Creature, _target: &dyn Creature) {
//!         // deal self.power damage
//!     }
//! }
//!
//! let mut registry = EffectRegistry::new();
//! registry.register("damage", |config: &StatSet| {
//!     Ok(Arc::new(FlatDamage { power: config.get_int("power", 0) }) as _)
//! });
//! assert!(registry.contains("damage"));
//! ```

use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Result as SkillResult;
use crate::skills::StatSet;
use crate::world::Creature;

/// Attachment point determining when an effect fires relative to a cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectScope {
    /// Fires on every ordinary application of the skill.
    #[default]
    General,
    /// Fires once when the cast starts.
    Start,
    /// Fires on every channeling tick.
    Channeling,
    /// Fires when the cast ends.
    End,
    /// Fires on the caster regardless of target.
    Self_,
}

impl FromStr for EffectScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(EffectScope::General),
            "start" => Ok(EffectScope::Start),
            "channeling" => Ok(EffectScope::Channeling),
            "end" => Ok(EffectScope::End),
            "self" => Ok(EffectScope::Self_),
            _ => Err(()),
        }
    }
}

/// An executable effect behavior.
///
/// Instances are constructed by a registered factory from a flat
/// configuration record and shared (`Arc`) across every skill variant
/// with an identical parameterization.
pub trait SkillEffect: Send + Sync {
    /// Apply the effect from `caster` onto `target`.
    fn apply(&self, caster: &dyn Creature, target: &dyn Creature);
}

/// Factory turning a configuration record into an effect instance.
pub type EffectFactory =
    Box<dyn Fn(&StatSet) -> SkillResult<Arc<dyn SkillEffect>> + Send + Sync>;

/// Name-keyed registry of effect factories.
///
/// Must be fully populated before `SkillCompiler::load` runs.
#[derive(Default)]
pub struct EffectRegistry {
    factories: FxHashMap<String, EffectFactory>,
}

impl EffectRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a behavior name.
    ///
    /// A repeated name replaces the previous factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&StatSet) -> SkillResult<Arc<dyn SkillEffect>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Look up a factory by behavior name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&EffectFactory> {
        self.factories.get(name)
    }

    /// Whether a behavior name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("factories", &self.factories.len())
            .finish()
    }
}
