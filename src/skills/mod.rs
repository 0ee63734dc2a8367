//! Skill system: configuration records, variants, store, and compiler.
//!
//! ## Key Types
//!
//! - [`StatSet`]: Flat configuration record handed to behavior factories
//! - [`SkillVariant`]: Fully resolved attribute set of a skill at one level
//! - [`SkillStore`]: `(id, level)`-keyed variant table with
//!   nearest-lower inheritance
//! - [`SkillCompiler`]: Document-to-store compiler with delta-encoded
//!   per-level overrides and clone-on-divergence

pub mod compiler;
pub mod definition;
pub mod stats;
pub mod store;
pub mod targets;
pub mod types;

pub use compiler::SkillCompiler;
pub use definition::SkillVariant;
pub use stats::{StatSet, StatValue};
pub use store::SkillStore;
pub use targets::{AffectObject, AffectScope, FanRange, TargetType};
pub use types::{AbnormalType, AbnormalVisual, OperateType, ShotKind, SkillType};
