//! Error taxonomy for compilation and channeling.
//!
//! Most failures in this crate are *recoverable* and are handled at the
//! point of detection: a malformed skill declaration is skipped, an
//! unknown behavior name drops only that behavior, an invalid session
//! transition is a logged no-op. Only a structural schema violation is
//! fatal to a document load.
//!
//! Callers that want to distinguish outcomes match on `SkillError`;
//! callers that only care about fatality check [`SkillError::is_fatal`].

use thiserror::Error;

use super::ids::SkillId;

/// Errors raised by the compiler, store, and channelizer.
#[derive(Error, Debug)]
pub enum SkillError {
    /// A skill declaration or attribute is malformed.
    ///
    /// Recoverable: the offending declaration is skipped and the load
    /// continues with the remaining skills.
    #[error("malformed declaration: {0}")]
    Parse(String),

    /// The document fails structural validation.
    ///
    /// Fatal: aborts the entire load.
    #[error("document schema violation: {0}")]
    Schema(String),

    /// A behavior name has no registered factory.
    ///
    /// Recoverable: only that effect/condition is dropped; the
    /// surrounding skill still compiles.
    #[error("no registered factory for behavior `{0}`")]
    UnknownBehavior(String),

    /// `start` was called on an already-channeling session.
    #[error("channeling session already active")]
    AlreadyChanneling,

    /// `stop` was called with no active session.
    #[error("no channeling session active")]
    NotChanneling,

    /// The actor cannot pay the per-tick resource cost.
    ///
    /// Aborts the cast and the session, not the process.
    #[error("insufficient mana to sustain channeling")]
    ResourceShortfall,

    /// A configured channeled-skill id has no resolvable definition.
    ///
    /// Aborts the session and the underlying cast.
    #[error("linked channeling skill {0} has no definition")]
    MissingLinkedSkill(SkillId),
}

impl SkillError {
    /// Whether this error aborts an entire document load.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, SkillError::Schema(_))
    }

    /// Build a parse error for a missing mandatory attribute.
    pub(crate) fn missing_attr(tag: &str, attr: &str) -> Self {
        SkillError::Parse(format!("missing attribute `{attr}` on <{tag}>"))
    }

    /// Build a parse error for an attribute that failed to parse.
    pub(crate) fn bad_attr(tag: &str, attr: &str, value: &str) -> Self {
        SkillError::Parse(format!("bad value `{value}` for attribute `{attr}` on <{tag}>"))
    }
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, SkillError>;
