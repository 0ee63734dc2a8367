//! Resolved skill variants.
//!
//! A `SkillVariant` is the fully materialized attribute set of a skill
//! at one specific level, produced by the compiler. Variants are
//! immutable once the store is published and are shared read-only by
//! every runtime consumer.
//!
//! Cloning a variant is how the compiler implements copy-on-divergence:
//! attached behaviors are `Arc`s, so a clone shares instances with its
//! lower-level neighbor until a per-level table forces a distinct one.

use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::conditions::{ConditionScope, SkillCondition};
use crate::core::{skill_key, SkillId};
use crate::effects::{EffectScope, SkillEffect};
use crate::world::Creature;

use super::targets::{AffectObject, AffectScope, FanRange, TargetType};
use super::types::{AbnormalType, AbnormalVisual, OperateType, ShotKind, SkillType};

type EffectList = SmallVec<[Arc<dyn SkillEffect>; 4]>;
type ConditionList = SmallVec<[Arc<dyn SkillCondition>; 2]>;

/// The per-level materialization of a skill.
#[derive(Clone)]
pub struct SkillVariant {
    /// Skill identity.
    pub id: SkillId,
    /// Level this variant materializes. Starts at 1.
    pub level: u16,
    /// Display name.
    pub name: String,
    /// Highest declared level for this skill.
    pub max_level: u16,
    /// Whether the skill is a debuff.
    pub debuff: bool,
    /// How the skill operates when triggered.
    pub operate: OperateType,
    /// Ability type tag.
    pub skill_type: SkillType,

    // === Resource costs ===
    /// Mana consumed when the cast starts.
    pub mana_init_consume: i32,
    /// Mana consumed by the cast itself.
    pub mana_consume: i32,
    /// HP consumed by the cast.
    pub hp_consume: i32,
    /// Item consumed by the cast, if any.
    pub item_consume: Option<u32>,
    /// How many of `item_consume` are consumed.
    pub item_consume_count: i32,
    /// Souls consumed by the cast.
    pub soul_consume: i32,
    /// Charges consumed by the cast.
    pub charge_consume: i32,

    // === Casting attributes ===
    /// Magic level the skill operates at (0 = caster's level).
    pub magic_level: i32,
    /// Maximum cast distance.
    pub cast_range: i32,
    /// Reuse delay in milliseconds.
    pub reuse: i32,
    /// Cool time in milliseconds.
    pub cool_time: i32,
    /// Aggression/heal weight of the skill's effects.
    pub effect_point: i32,
    /// Maximum distance at which effects still land.
    pub effect_range: i32,
    /// Cast animation time in milliseconds.
    pub hit_time: i32,
    /// Activation rate for chance-based skills.
    pub activate_rate: i32,
    /// Client icon path.
    pub icon: String,

    // === Targeting ===
    /// Primary target kind.
    pub target_type: TargetType,
    /// Area shape expanding the primary target.
    pub affect_scope: AffectScope,
    /// Object filter inside the area.
    pub affect_object: AffectObject,
    /// Area radius.
    pub affect_range: i32,
    /// Minimum affected count.
    pub affect_min: i32,
    /// Extra random affected count.
    pub affect_random: i32,
    /// Fan parameters for [`AffectScope::Fan`].
    pub fan_range: Option<FanRange>,

    // === Abnormal status ===
    /// Abnormal category.
    pub abnormal_type: AbnormalType,
    /// Abnormal visual.
    pub abnormal_visual: AbnormalVisual,
    /// Category this abnormal is subordinate to.
    pub abnormal_subordination: AbnormalType,
    /// Whether the abnormal lands instantly.
    pub abnormal_instant: bool,
    /// Abnormal strength level.
    pub abnormal_level: i32,
    /// Abnormal duration in seconds.
    pub abnormal_time: i32,
    /// Abnormal land chance, percent.
    pub abnormal_chance: i32,

    // === Channeling ===
    /// Distinct skill whose effects are applied per tick, if any.
    pub channeling_skill: Option<SkillId>,
    /// Mana consumed per channeling tick.
    pub channeling_mp_consume: i32,
    /// Delay before the first tick.
    pub channeling_initial_delay: Duration,
    /// Interval between ticks.
    pub channeling_interval: Duration,

    /// Ammunition-equivalent charge consumed per validated target.
    pub shot_kind: Option<ShotKind>,

    effects: FxHashMap<EffectScope, EffectList>,
    conditions: FxHashMap<ConditionScope, ConditionList>,
}

impl SkillVariant {
    /// Create the level-1 variant with neutral attributes.
    #[must_use]
    pub fn new(
        id: SkillId,
        name: impl Into<String>,
        max_level: u16,
        debuff: bool,
        operate: OperateType,
        skill_type: SkillType,
    ) -> Self {
        Self {
            id,
            level: 1,
            name: name.into(),
            max_level,
            debuff,
            operate,
            skill_type,
            mana_init_consume: 0,
            mana_consume: 0,
            hp_consume: 0,
            item_consume: None,
            item_consume_count: 0,
            soul_consume: 0,
            charge_consume: 0,
            magic_level: 0,
            cast_range: 0,
            reuse: 0,
            cool_time: 0,
            effect_point: 0,
            effect_range: 0,
            hit_time: 0,
            activate_rate: 0,
            icon: String::new(),
            target_type: TargetType::default(),
            affect_scope: AffectScope::default(),
            affect_object: AffectObject::default(),
            affect_range: 0,
            affect_min: 0,
            affect_random: 0,
            fan_range: None,
            abnormal_type: AbnormalType::default(),
            abnormal_visual: AbnormalVisual::default(),
            abnormal_subordination: AbnormalType::default(),
            abnormal_instant: false,
            abnormal_level: 0,
            abnormal_time: 0,
            abnormal_chance: 0,
            channeling_skill: None,
            channeling_mp_consume: 0,
            channeling_initial_delay: Duration::ZERO,
            channeling_interval: Duration::ZERO,
            shot_kind: None,
            effects: FxHashMap::default(),
            conditions: FxHashMap::default(),
        }
    }

    /// Store key of this variant.
    #[must_use]
    pub fn key(&self) -> u64 {
        skill_key(self.id, self.level)
    }

    /// Whether triggering this skill opens a channeling session.
    #[must_use]
    pub fn is_channeling(&self) -> bool {
        self.operate.is_channeling()
    }

    /// Whether this skill is a toggle.
    #[must_use]
    pub fn is_toggle(&self) -> bool {
        self.operate.is_toggle()
    }

    /// Back-reference registry key for channeling sessions of this
    /// skill: the linked channeled-skill id when one is configured,
    /// otherwise the skill's own id.
    #[must_use]
    pub fn channel_key(&self) -> SkillId {
        self.channeling_skill.unwrap_or(self.id)
    }

    /// Attach an effect instance under a scope.
    pub fn add_effect(&mut self, scope: EffectScope, effect: Arc<dyn SkillEffect>) {
        self.effects.entry(scope).or_default().push(effect);
    }

    /// Effect instances attached under a scope.
    #[must_use]
    pub fn effects(&self, scope: EffectScope) -> &[Arc<dyn SkillEffect>] {
        self.effects.get(&scope).map_or(&[], |list| list.as_slice())
    }

    /// Whether any effect is attached under a scope.
    #[must_use]
    pub fn has_effects(&self, scope: EffectScope) -> bool {
        !self.effects(scope).is_empty()
    }

    /// Apply every effect attached under a scope.
    pub fn apply_effects(&self, scope: EffectScope, caster: &dyn Creature, target: &dyn Creature) {
        for effect in self.effects(scope) {
            effect.apply(caster, target);
        }
    }

    /// Attach a condition instance under a scope.
    pub fn add_condition(&mut self, scope: ConditionScope, condition: Arc<dyn SkillCondition>) {
        self.conditions.entry(scope).or_default().push(condition);
    }

    /// Condition instances attached under a scope.
    #[must_use]
    pub fn conditions(&self, scope: ConditionScope) -> &[Arc<dyn SkillCondition>] {
        self.conditions
            .get(&scope)
            .map_or(&[], |list| list.as_slice())
    }

    /// Whether every condition under a scope passes.
    #[must_use]
    pub fn check_conditions(
        &self,
        scope: ConditionScope,
        caster: &dyn Creature,
        target: Option<&dyn Creature>,
    ) -> bool {
        self.conditions(scope)
            .iter()
            .all(|condition| condition.test(caster, target))
    }
}

impl std::fmt::Debug for SkillVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillVariant")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("name", &self.name)
            .field("operate", &self.operate)
            .field("effects", &self.effects.values().map(|l| l.len()).sum::<usize>())
            .field("conditions", &self.conditions.values().map(|l| l.len()).sum::<usize>())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for SkillVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} `{}` lv.{}", self.id, self.name, self.level)
    }
}
