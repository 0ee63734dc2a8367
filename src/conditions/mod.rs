//! Cast conditions and their factory registry.
//!
//! Conditions gate a cast the way effects implement it: a registered
//! factory turns a flat configuration record into a predicate attached
//! to a skill variant under a [`ConditionScope`]. Like the effect
//! registry, this must be fully populated before compilation.

use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Result as SkillResult;
use crate::skills::StatSet;
use crate::world::Creature;

/// When a condition is checked relative to a cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionScope {
    /// Checked before any cast of the skill.
    #[default]
    General,
    /// Checked against the resolved target.
    Target,
    /// Checked while a passive skill is in force.
    Passive,
}

impl FromStr for ConditionScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(ConditionScope::General),
            "target" => Ok(ConditionScope::Target),
            "passive" => Ok(ConditionScope::Passive),
            _ => Err(()),
        }
    }
}

/// A cast precondition.
pub trait SkillCondition: Send + Sync {
    /// Whether the cast may proceed.
    ///
    /// `target` is `None` for scopes checked before target resolution.
    fn test(&self, caster: &dyn Creature, target: Option<&dyn Creature>) -> bool;
}

/// Factory turning a configuration record into a condition instance.
pub type ConditionFactory =
    Box<dyn Fn(&StatSet) -> SkillResult<Arc<dyn SkillCondition>> + Send + Sync>;

/// Name-keyed registry of condition factories.
#[derive(Default)]
pub struct ConditionRegistry {
    factories: FxHashMap<String, ConditionFactory>,
}

impl ConditionRegistry {
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
        F: Fn(&StatSet) -> SkillResult<Arc<dyn SkillCondition>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Look up a factory by behavior name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ConditionFactory> {
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

impl std::fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("factories", &self.factories.len())
            .finish()
    }
}
