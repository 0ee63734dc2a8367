//! Core engine types: identifiers, errors, configuration.
//!
//! This module contains the building blocks shared by the compiler and
//! the channeling runtime. Everything here is constructed explicitly and
//! passed to consumers - no process-wide singletons.

pub mod config;
pub mod error;
pub mod ids;

pub use config::{EngineConfig, DEFAULT_TICK_INTERVAL};
pub use error::{Result, SkillError};
pub use ids::{skill_key, ActorId, SkillId};
