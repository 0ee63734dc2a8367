//! Channeling runtime: sessions, scheduling, back-references.
//!
//! ## Key Types
//!
//! - [`SkillChannelizer`]: One session per channeling actor;
//!   Idle -> Active -> Idle state machine driven by `start`/`stop` and
//!   a scheduled periodic tick
//! - [`ChannelTargets`]: Per-target registry of who is channeling it,
//!   kept symmetric with the session's affected-target list
//! - [`Scheduler`] / [`TokioScheduler`]: Fixed-rate task submission
//!   behind a trait so tests drive ticks deterministically

pub mod channelized;
pub mod scheduler;
pub mod session;

pub use channelized::ChannelTargets;
pub use scheduler::{ScheduledTask, Scheduler, TaskHandle, TokioScheduler};
pub use session::SkillChannelizer;
