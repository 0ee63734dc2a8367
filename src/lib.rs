//! # skill-engine
//!
//! A data-driven ability engine: compiles declarative skill documents
//! into per-level-resolved, immutable definitions, and executes the
//! continuous ("channeling") class of those abilities under real-time
//! concurrency.
//!
//! ## Design Principles
//!
//! 1. **Data-Described Abilities**: Skills are documents, not code.
//!    Behaviors (effects, conditions) are the only executable pieces and
//!    arrive through factory registries populated by the host.
//!
//! 2. **Delta-Encoded Levels**: A skill's levels are stored as the
//!    level-1 variant plus clone-on-divergence copies at the levels
//!    where attributes change. Lookup follows nearest-lower inheritance.
//!
//! 3. **Narrow Collaborator Seams**: World queries, line of sight,
//!    notifications, and scheduling sit behind traits. No networking,
//!    persistence, or spatial indexing lives in this crate.
//!
//! ## Modules
//!
//! - `core`: Identifiers, store key scheme, errors, configuration
//! - `document`: Abstract hierarchical definition documents
//! - `skills`: Stat records, variants, store, and the compiler
//! - `effects` / `conditions`: Behavior traits and factory registries
//! - `world`: Actor and world collaborator traits
//! - `channeling`: Sessions, back-references, periodic scheduling

pub mod channeling;
pub mod conditions;
pub mod core;
pub mod document;
pub mod effects;
pub mod skills;
pub mod world;

// Re-export commonly used types
pub use crate::core::{skill_key, ActorId, EngineConfig, Result, SkillError, SkillId};

pub use crate::document::Node;

pub use crate::skills::{
    AbnormalType, AbnormalVisual, AffectObject, AffectScope, FanRange, OperateType, ShotKind,
    SkillCompiler, SkillStore, SkillType, SkillVariant, StatSet, StatValue, TargetType,
};

pub use crate::effects::{EffectFactory, EffectRegistry, EffectScope, SkillEffect};

pub use crate::conditions::{ConditionFactory, ConditionRegistry, ConditionScope, SkillCondition};

pub use crate::world::{Creature, Notification, World};

pub use crate::channeling::{
    ChannelTargets, ScheduledTask, Scheduler, SkillChannelizer, TaskHandle, TokioScheduler,
};
