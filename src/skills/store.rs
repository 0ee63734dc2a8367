//! Skill definition store.
//!
//! In-memory table of every compiled `(id, level)` variant, keyed by the
//! composite [`skill_key`]. Written only by the compiler; read-only for
//! every other consumer.
//!
//! ## Nearest-lower inheritance
//!
//! The compiler only materializes a variant at the first level whose
//! attributes diverge from the level below. [`SkillStore::resolve`]
//! therefore answers an arbitrary level with the variant at the greatest
//! existing level at or below it.
//!
//! ## Reload
//!
//! `clear` + recompile rebuilds the table in place. Readers holding the
//! store during a reload may observe a transiently empty or partially
//! rebuilt table - reload is a maintenance operation with external
//! synchronization, not an atomic swap.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::{skill_key, SkillId};

use super::definition::SkillVariant;

/// Table of compiled skill variants.
#[derive(Debug, Default)]
pub struct SkillStore {
    skills: RwLock<FxHashMap<u64, Arc<SkillVariant>>>,
}

impl SkillStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a skill at a level with nearest-lower inheritance.
    ///
    /// Returns the variant at the greatest existing level `<= level`,
    /// or `None` when the skill is unknown or `level` is 0.
    #[must_use]
    pub fn resolve(&self, id: SkillId, level: u16) -> Option<Arc<SkillVariant>> {
        let skills = self.skills.read();
        (1..=level)
            .rev()
            .find_map(|l| skills.get(&skill_key(id, l)).cloned())
    }

    /// Resolve only an exactly materialized variant.
    #[must_use]
    pub fn resolve_exact(&self, id: SkillId, level: u16) -> Option<Arc<SkillVariant>> {
        self.skills.read().get(&skill_key(id, level)).cloned()
    }

    /// Highest declared level for a skill, 0 when unknown.
    #[must_use]
    pub fn max_level(&self, id: SkillId) -> u16 {
        self.resolve_exact(id, 1).map_or(0, |v| v.max_level)
    }

    /// Number of materialized variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.read().len()
    }

    /// Whether the store holds no variants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.read().is_empty()
    }

    /// Materialized levels for a skill, ascending. Mostly for tests and
    /// diagnostics.
    #[must_use]
    pub fn materialized_levels(&self, id: SkillId) -> Vec<u16> {
        let skills = self.skills.read();
        let mut levels: Vec<u16> = skills
            .values()
            .filter(|v| v.id == id)
            .map(|v| v.level)
            .collect();
        levels.sort_unstable();
        levels
    }

    /// Insert a variant. Compiler-only.
    pub(crate) fn insert(&self, variant: SkillVariant) {
        let key = variant.key();
        self.skills.write().insert(key, Arc::new(variant));
    }

    /// Drop every variant. Compiler-only, used by reload.
    pub(crate) fn clear(&self) {
        self.skills.write().clear();
    }
}
