//! World and actor collaborator traits.
//!
//! The channeling runtime never touches world internals - spatial
//! indexing, line of sight, packet encoding and resource bookkeeping all
//! live behind these two traits. The game server implements them; tests
//! implement them with in-memory fakes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::channeling::ChannelTargets;
use crate::core::{ActorId, SkillId};
use crate::skills::{ShotKind, SkillVariant};

/// A unicast user-facing message.
///
/// Wire encoding belongs to the network layer; the engine only says
/// *which* message to send.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// The channeling skill was deactivated for lack of mana.
    ChannelingDeactivatedLackOfMana,
    /// The current cast was aborted.
    CastAborted,
}

/// A live actor (player, creature, summon) as the channeling runtime
/// sees it.
///
/// Mutating methods take `&self`: implementations own their interior
/// synchronization, since several channelizer sessions may touch the
/// same actor concurrently.
pub trait Creature: Send + Sync {
    /// World-unique actor id.
    fn id(&self) -> ActorId;

    /// Whether this actor is a player (players receive notifications).
    fn is_player(&self) -> bool;

    /// Current mana.
    fn current_mana(&self) -> f64;

    /// Consume mana. Implementations clamp at zero.
    fn consume_mana(&self, amount: f64);

    /// Abort whatever this actor is casting.
    fn abort_cast(&self);

    /// Send a unicast notification. No-op for non-players.
    fn notify(&self, notification: Notification);

    /// The back-reference registry of channelizers affecting this actor.
    fn channel_targets(&self) -> &ChannelTargets;

    /// Level of the named skill's effect currently active on this
    /// actor, if any. Used to skip redundant reapplication.
    fn active_effect_level(&self, skill: SkillId) -> Option<u16>;

    /// Consume one ammunition-equivalent charge.
    fn consume_shot(&self, kind: ShotKind);

    /// Re-charge consumed shots, as happens after every cast.
    fn recharge_shots(&self);
}

/// World-state queries and broadcasts consumed by the channelizer.
pub trait World: Send + Sync {
    /// Locate the primary cast target for a skill, if any.
    fn find_cast_target(
        &self,
        caster: &dyn Creature,
        skill: &SkillVariant,
    ) -> Option<Arc<dyn Creature>>;

    /// Expand a primary target into the affected set per the skill's
    /// area/target descriptors.
    fn affected_targets(
        &self,
        caster: &dyn Creature,
        target: &dyn Creature,
        skill: &SkillVariant,
    ) -> Vec<Arc<dyn Creature>>;

    /// Range test between two actors.
    fn check_range(&self, from: &dyn Creature, to: &dyn Creature, range: i32) -> bool;

    /// Line-of-sight test between two actors.
    fn can_see(&self, from: &dyn Creature, to: &dyn Creature) -> bool;

    /// Broadcast the visual launch of a skill against a target.
    fn broadcast_launch(&self, caster: &dyn Creature, skill: &SkillVariant, target: &dyn Creature);
}
