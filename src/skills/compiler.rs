//! Skill compiler.
//!
//! Turns a definition document into resolved per-level variants in a
//! [`SkillStore`]. The walk is two-pass per skill node:
//!
//! 1. **Constants** - level-independent sections (`consume` costs,
//!    `target`, `abnormal`, `channeling`, `conditions`) set on the
//!    level-1 variant, so later clones inherit them.
//! 2. **Mapped values and effects** - sections declaring `(level, value)`
//!    override pairs, resolved with clone-on-divergence: a changed value
//!    materializes the variant at that level by cloning forward from its
//!    nearest lower neighbor, then applies the single changed field.
//!
//! Error policy: a malformed skill node is logged and skipped; an
//! unknown behavior name drops only that effect/condition. Only a
//! structural violation of the document aborts the load.
//!
//! Compilation is single-threaded. Publish the store for concurrent
//! readers only after `load` returns; reload needs external
//! synchronization.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::conditions::{ConditionRegistry, ConditionScope};
use crate::core::{EngineConfig, Result, SkillError, SkillId};
use crate::document::Node;
use crate::effects::{EffectRegistry, EffectScope};

use super::definition::SkillVariant;
use super::stats::StatSet;
use super::store::SkillStore;
use super::targets::FanRange;

use std::time::Duration;

/// Attributes on behavior declarations that configure attachment rather
/// than the behavior itself.
const CONTROL_ATTRS: [&str; 4] = ["name", "scope", "start-level", "stop-level"];

/// Per-skill working set, sparse-keyed by level.
type LevelMap = BTreeMap<u16, SkillVariant>;

/// Compiles definition documents into a [`SkillStore`].
pub struct SkillCompiler<'a> {
    effects: &'a EffectRegistry,
    conditions: &'a ConditionRegistry,
    config: &'a EngineConfig,
}

impl<'a> SkillCompiler<'a> {
    /// Create a compiler over fully populated registries.
    #[must_use]
    pub fn new(
        effects: &'a EffectRegistry,
        conditions: &'a ConditionRegistry,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            effects,
            conditions,
            config,
        }
    }

    /// Compile a document into the store.
    ///
    /// Returns the number of skill declarations compiled. Fails only on
    /// a structural schema violation; malformed individual declarations
    /// are logged and skipped.
    pub fn load(&self, doc: &Node, store: &SkillStore) -> Result<usize> {
        if doc.tag != "list" {
            return Err(SkillError::Schema(format!(
                "expected root <list>, found <{}>",
                doc.tag
            )));
        }

        let mut loaded = 0;
        for skill_node in doc.children_by_tag("skill") {
            match self.compile_skill(skill_node) {
                Ok(levels) => {
                    for (_, variant) in levels {
                        store.insert(variant);
                    }
                    loaded += 1;
                }
                Err(err) => {
                    warn!(
                        id = skill_node.attr_str("id").unwrap_or("?"),
                        %err,
                        "could not compile skill declaration, skipping"
                    );
                }
            }
        }

        info!(skills = loaded, variants = store.len(), "skill load complete");
        Ok(loaded)
    }

    /// Clear the store and fully rebuild it from a document.
    pub fn reload(&self, doc: &Node, store: &SkillStore) -> Result<usize> {
        store.clear();
        self.load(doc, store)
    }

    fn compile_skill(&self, node: &Node) -> Result<LevelMap> {
        let id = SkillId::new(node.attr_u32_req("id")?);
        let name = node.attr_str_req("name")?;
        let max_level = node.attr_u16_req("max-level")?;
        if max_level == 0 {
            return Err(SkillError::Parse(format!("{id}: max-level must be >= 1")));
        }
        let debuff = node.attr_or("debuff", false)?;
        let operate = node.attr_or("action", Default::default())?;
        let skill_type = node.attr_or("type", Default::default())?;

        let mut levels = LevelMap::new();
        levels.insert(
            1,
            SkillVariant::new(id, name, max_level, debuff, operate, skill_type),
        );

        // Constants first: they land on the level-1 variant and ride
        // along in every clone the mapped pass produces.
        for child in &node.children {
            match child.tag.as_str() {
                "consume" => self.parse_consume_constants(&mut levels, child)?,
                "target" => self.parse_target_constants(&mut levels, child)?,
                "abnormal" => self.parse_abnormal_constants(&mut levels, child)?,
                "channeling" => self.parse_channeling_constants(&mut levels, child)?,
                "conditions" => self.parse_conditions(&mut levels, child),
                _ => {}
            }
        }

        for child in &node.children {
            match child.tag.as_str() {
                "icon" => Self::parse_mapped_text(&mut levels, child, max_level, |v, text| {
                    v.icon = text;
                })?,
                "attributes" => self.parse_mapped_attributes(&mut levels, child, max_level)?,
                "consume" => self.parse_mapped_consume(&mut levels, child, max_level)?,
                "abnormal" => self.parse_mapped_abnormal(&mut levels, child, max_level)?,
                "effects" => self.parse_effects(&mut levels, child, max_level),
                _ => {}
            }
        }

        debug!(%id, levels = levels.len(), "compiled skill");
        Ok(levels)
    }

    // === Constant sections ===

    fn parse_consume_constants(&self, levels: &mut LevelMap, node: &Node) -> Result<()> {
        let base = base_variant(levels);
        base.soul_consume = node.attr_or("soul", 0)?;
        base.charge_consume = node.attr_or("charge", 0)?;
        Ok(())
    }

    fn parse_target_constants(&self, levels: &mut LevelMap, node: &Node) -> Result<()> {
        let fan_range = match node.first_child("fan-range") {
            Some(fan) => Some(FanRange {
                start_angle: fan.attr_or("start-angle", 0)?,
                radius: fan.attr_or("radius", 0)?,
                angle: fan.attr_or("angle", 0)?,
            }),
            None => None,
        };

        let base = base_variant(levels);
        base.target_type = node.attr_or("type", Default::default())?;
        base.affect_scope = node.attr_or("scope", Default::default())?;
        base.affect_object = node.attr_or("object", Default::default())?;
        base.affect_range = node.attr_or("range", 0)?;
        base.affect_min = node.attr_or("affect-min", 0)?;
        base.affect_random = node.attr_or("affect-random", 0)?;
        base.fan_range = fan_range;
        Ok(())
    }

    fn parse_abnormal_constants(&self, levels: &mut LevelMap, node: &Node) -> Result<()> {
        let base = base_variant(levels);
        base.abnormal_type = node.attr_or("type", Default::default())?;
        base.abnormal_visual = node.attr_or("visual", Default::default())?;
        base.abnormal_subordination = node.attr_or("subordination", Default::default())?;
        base.abnormal_instant = node.attr_or("instant", false)?;
        Ok(())
    }

    fn parse_channeling_constants(&self, levels: &mut LevelMap, node: &Node) -> Result<()> {
        let linked = match node.attr_str("skill") {
            Some(_) => Some(SkillId::new(node.attr_u32_req("skill")?)),
            None => None,
        };
        let interval = match node.attr_or("interval", 0u64)? {
            0 => self.config.channeling_tick_interval,
            secs => Duration::from_secs(secs),
        };
        let initial_delay = match node.attr_or("initial-delay", 0u64)? {
            0 => self.config.channeling_initial_delay.unwrap_or(interval),
            secs => Duration::from_secs(secs),
        };

        let base = base_variant(levels);
        base.channeling_skill = linked;
        base.channeling_mp_consume = node.attr_or("mp-consume", 0)?;
        base.channeling_interval = interval;
        base.channeling_initial_delay = initial_delay;

        // Shot usage is configured alongside channeling since that is
        // where per-target consumption happens.
        base.shot_kind = match node.attr_str("shot") {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|()| SkillError::bad_attr(&node.tag, "shot", raw))?,
            ),
            None => None,
        };
        Ok(())
    }

    fn parse_conditions(&self, levels: &mut LevelMap, node: &Node) {
        for child in &node.children {
            if let Err(err) = self.parse_condition_decl(levels, child) {
                warn!(
                    skill = %base_variant(levels).id,
                    behavior = behavior_name(child).unwrap_or("?"),
                    %err,
                    "skipping condition"
                );
            }
        }
    }

    fn parse_condition_decl(&self, levels: &mut LevelMap, node: &Node) -> Result<()> {
        let name = behavior_name(node)
            .ok_or_else(|| SkillError::missing_attr(&node.tag, "name"))?
            .to_string();
        let factory = self
            .conditions
            .lookup(&name)
            .ok_or_else(|| SkillError::UnknownBehavior(name.clone()))?;
        let scope: ConditionScope = node.attr_or("scope", Default::default())?;

        let config = stat_set_from_attrs(node, &CONTROL_ATTRS);
        let condition = factory(&config)?;
        base_variant(levels).add_condition(scope, condition);
        Ok(())
    }

    // === Mapped sections ===

    fn parse_mapped_attributes(
        &self,
        levels: &mut LevelMap,
        node: &Node,
        max_level: u16,
    ) -> Result<()> {
        for child in &node.children {
            match child.tag.as_str() {
                "magic-level" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.magic_level = n)?;
                }
                "cast-range" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.cast_range = n)?;
                }
                "reuse" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.reuse = n)?;
                }
                "cool-time" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.cool_time = n)?;
                }
                "effect-point" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.effect_point = n)?;
                }
                "effect-range" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.effect_range = n)?;
                }
                "hit-time" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.hit_time = n)?;
                }
                "activate-rate" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.activate_rate = n)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_mapped_consume(
        &self,
        levels: &mut LevelMap,
        node: &Node,
        max_level: u16,
    ) -> Result<()> {
        for child in &node.children {
            match child.tag.as_str() {
                "mana-init" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| {
                        v.mana_init_consume = n;
                    })?;
                }
                "mana" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.mana_consume = n)?;
                }
                "hp" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.hp_consume = n)?;
                }
                "item" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| {
                        v.item_consume = (n > 0).then_some(n as u32);
                    })?;
                }
                "item-count" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| {
                        v.item_consume_count = n;
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_mapped_abnormal(
        &self,
        levels: &mut LevelMap,
        node: &Node,
        max_level: u16,
    ) -> Result<()> {
        for child in &node.children {
            match child.tag.as_str() {
                "level" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.abnormal_level = n)?;
                }
                "time" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| v.abnormal_time = n)?;
                }
                "chance" => {
                    Self::parse_mapped_i32(levels, child, max_level, |v, n| {
                        v.abnormal_chance = n;
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Walk one mapped-value element: an `initial` attribute plus
    /// `(level, value)` override rows in ascending level order. A row is
    /// applied only when its value differs from the last seen one.
    fn parse_mapped_i32(
        levels: &mut LevelMap,
        node: &Node,
        max_level: u16,
        set: impl Fn(&mut SkillVariant, i32),
    ) -> Result<()> {
        let mut last: i32 = node.attr_or("initial", 0)?;
        set(base_variant(levels), last);

        for row in node.children_by_tag("value") {
            let raw = row.text_content();
            let value: i32 = raw
                .parse()
                .map_err(|_| SkillError::bad_attr(&node.tag, "value", raw))?;
            if value != last {
                last = value;
                let level = row.attr_u16_req("level")?;
                if level <= max_level {
                    set(variant_at_or_clone(levels, level), last);
                }
            }
        }
        Ok(())
    }

    /// Text twin of `parse_mapped_i32`, used for icons.
    fn parse_mapped_text(
        levels: &mut LevelMap,
        node: &Node,
        max_level: u16,
        set: impl Fn(&mut SkillVariant, String),
    ) -> Result<()> {
        let mut last = node.attr_str("initial").unwrap_or_default().to_string();
        set(base_variant(levels), last.clone());

        for row in node.children_by_tag("value") {
            let value = row.text_content();
            if value != last {
                last = value.to_string();
                let level = row.attr_u16_req("level")?;
                if level <= max_level {
                    set(variant_at_or_clone(levels, level), last.clone());
                }
            }
        }
        Ok(())
    }

    // === Effects ===

    fn parse_effects(&self, levels: &mut LevelMap, node: &Node, max_level: u16) {
        for child in &node.children {
            if let Err(err) = self.parse_effect_decl(levels, child, max_level) {
                warn!(
                    skill = %base_variant(levels).id,
                    behavior = behavior_name(child).unwrap_or("?"),
                    %err,
                    "skipping effect"
                );
            }
        }
    }

    fn parse_effect_decl(&self, levels: &mut LevelMap, node: &Node, max_level: u16) -> Result<()> {
        let name = behavior_name(node)
            .ok_or_else(|| SkillError::missing_attr(&node.tag, "name"))?
            .to_string();
        let factory = self
            .effects
            .lookup(&name)
            .ok_or_else(|| SkillError::UnknownBehavior(name.clone()))?;

        let start_level: u16 = node.attr_or("start-level", 1)?;
        let stop_level: u16 = node.attr_or("stop-level", max_level)?.min(max_level);
        let scope: EffectScope = node.attr_or("scope", Default::default())?;
        if start_level == 0 || start_level > stop_level {
            return Err(SkillError::Parse(format!(
                "bad level range [{start_level}, {stop_level}] for effect `{name}`"
            )));
        }

        let static_config = stat_set_from_attrs(node, &CONTROL_ATTRS);

        let mut rows: BTreeMap<u16, StatSet> = BTreeMap::new();
        for row in node.children_by_tag("level") {
            let level = row.attr_u16_req("level")?;
            rows.insert(level, stat_set_from_attrs(row, &["level"]));
        }

        // Levels past stop-level must resolve to a variant without this
        // effect, so a bounded range needs a clean variant right above it
        // before anything is attached.
        if stop_level < max_level {
            variant_at_or_clone(levels, stop_level + 1);
        }

        if rows.is_empty() {
            // One shared instance for the whole range: identical
            // parameterization means identical behavior object.
            let instance = factory(&static_config)?;
            variant_at_or_clone(levels, start_level);
            for (_, variant) in levels.range_mut(start_level..=stop_level) {
                variant.add_effect(scope, instance.clone());
            }
        } else {
            // Per-level parameterizations: one instance per level from
            // the nearest-applicable row merged under the static config.
            for level in start_level..=stop_level {
                let mut config = rows
                    .range(..=level)
                    .next_back()
                    .map(|(_, row)| row.clone())
                    .unwrap_or_default();
                config.merge_under(&static_config);
                let instance = factory(&config)?;
                variant_at_or_clone(levels, level).add_effect(scope, instance);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for SkillCompiler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillCompiler")
            .field("effects", &self.effects)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}

/// Behavior name of a declaration: the `name` attribute on generic
/// `effect`/`condition` tags, otherwise the tag itself.
fn behavior_name(node: &Node) -> Option<&str> {
    if node.tag == "effect" || node.tag == "condition" {
        node.attr_str("name")
    } else {
        Some(&node.tag)
    }
}

/// Collect a node's attributes into a flat configuration record, minus
/// the listed control attributes.
fn stat_set_from_attrs(node: &Node, excluded: &[&str]) -> StatSet {
    let mut set = StatSet::new();
    for (key, value) in &node.attributes {
        if !excluded.contains(&key.as_str()) {
            set.set(key.clone(), value.clone());
        }
    }
    set
}

/// The level-1 variant. Present for the whole life of a working set.
fn base_variant(levels: &mut LevelMap) -> &mut SkillVariant {
    levels
        .get_mut(&1)
        .expect("working set always holds the level-1 variant")
}

/// Obtain the variant at `level`, materializing it by clone-on-divergence:
/// clone the nearest existing lower variant and rekey the copy at `level`.
/// Levels in between stay unmaterialized and resolve to that same lower
/// neighbor at lookup time.
fn variant_at_or_clone(levels: &mut LevelMap, level: u16) -> &mut SkillVariant {
    if !levels.contains_key(&level) {
        let mut cloned = levels
            .range(..=level)
            .next_back()
            .map(|(_, v)| v.clone())
            .expect("working set always holds the level-1 variant");
        cloned.level = level;
        levels.insert(level, cloned);
    }
    levels
        .get_mut(&level)
        .expect("variant present or materialized above")
}
