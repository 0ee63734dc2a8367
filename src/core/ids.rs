//! Identifier types for skills and actors.
//!
//! Every compiled skill variant is addressed by `(SkillId, level)`.
//! The store flattens that pair into a single `u64` key, see [`skill_key`].
//!
//! ## Key Layout
//!
//! ```text
//! key = id * 65536 + level
//! ```
//!
//! Levels occupy the low 16 bits, ids the bits above. A `u64` key is
//! collision-free for every level in `[1, 65535]` and the full positive
//! id range - a 32-bit key would overflow past id 65535.
//!
//! ## Usage
//!
//! ```
//! use skill_engine::core::{SkillId, skill_key};
//!
//! let heal = SkillId::new(1011);
//! assert_eq!(skill_key(heal, 3), 1011 * 65536 + 3);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a skill declaration.
///
/// Identifies the skill as declared in a definition document,
/// not a specific level variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(pub u32);

impl SkillId {
    /// Create a new skill ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Skill({})", self.0)
    }
}

/// Unique identifier for a world actor (player, creature, summon).
///
/// The engine never allocates these - the world collaborator owns
/// actor identity. They are only compared and stored in back-reference
/// registries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl ActorId {
    /// Create a new actor ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Actor({})", self.0)
    }
}

/// Composite store key for a skill variant at a specific level.
///
/// Collision-free for `level` in `[1, 65535]` across the full id range.
#[must_use]
pub const fn skill_key(id: SkillId, level: u16) -> u64 {
    id.raw() as u64 * 65536 + level as u64
}
