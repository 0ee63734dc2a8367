//! Back-reference registries held by channeling targets.
//!
//! Every actor that can be channeled owns a `ChannelTargets`: a map from
//! channeling skill id to the set of actors currently channeling it.
//! Sessions add their own entry when a tick affects the actor and remove
//! exactly that entry on stop - no third party removes another session's
//! reference.
//!
//! Several sessions mutate the same registry concurrently, so the map
//! lives behind a mutex. Operations are short (insert/remove/len).

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{ActorId, SkillId};

/// Which channelizers currently affect an actor, per channeling skill.
#[derive(Debug, Default)]
pub struct ChannelTargets {
    channelizers: Mutex<FxHashMap<SkillId, FxHashSet<ActorId>>>,
}

impl ChannelTargets {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `channelizer` as channeling this actor with `skill`.
    ///
    /// Re-adding an existing pair is a no-op, so a session may re-affirm
    /// its targets every tick.
    pub fn add(&self, skill: SkillId, channelizer: ActorId) {
        self.channelizers
            .lock()
            .entry(skill)
            .or_default()
            .insert(channelizer);
    }

    /// Remove `channelizer`'s back-reference for `skill`.
    ///
    /// Empty per-skill sets are dropped so `is_channelized` reflects
    /// live sessions only.
    pub fn remove(&self, skill: SkillId, channelizer: ActorId) {
        let mut map = self.channelizers.lock();
        if let Some(set) = map.get_mut(&skill) {
            set.remove(&channelizer);
            if set.is_empty() {
                map.remove(&skill);
            }
        }
    }

    /// How many actors are channeling this actor with `skill`.
    ///
    /// Drives the effective level of a linked channeled skill: more
    /// channelizers, higher level.
    #[must_use]
    pub fn channelizer_count(&self, skill: SkillId) -> usize {
        self.channelizers
            .lock()
            .get(&skill)
            .map_or(0, FxHashSet::len)
    }

    /// Whether a specific back-reference exists.
    #[must_use]
    pub fn contains(&self, skill: SkillId, channelizer: ActorId) -> bool {
        self.channelizers
            .lock()
            .get(&skill)
            .is_some_and(|set| set.contains(&channelizer))
    }

    /// Whether any session currently channels this actor.
    #[must_use]
    pub fn is_channelized(&self) -> bool {
        !self.channelizers.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_symmetry() {
        let targets = ChannelTargets::new();
        let skill = SkillId::new(5);
        let a = ActorId::new(1);
        let b = ActorId::new(2);

        targets.add(skill, a);
        targets.add(skill, b);
        targets.add(skill, a); // idempotent
        assert_eq!(targets.channelizer_count(skill), 2);

        targets.remove(skill, a);
        assert_eq!(targets.channelizer_count(skill), 1);
        assert!(targets.contains(skill, b));
        assert!(!targets.contains(skill, a));

        targets.remove(skill, b);
        assert!(!targets.is_channelized());
    }

    #[test]
    fn test_counts_are_per_skill() {
        let targets = ChannelTargets::new();
        targets.add(SkillId::new(1), ActorId::new(9));
        targets.add(SkillId::new(2), ActorId::new(9));

        assert_eq!(targets.channelizer_count(SkillId::new(1)), 1);
        assert_eq!(targets.channelizer_count(SkillId::new(2)), 1);
        assert_eq!(targets.channelizer_count(SkillId::new(3)), 0);
    }
}
