//! Channeling sessions.
//!
//! One `SkillChannelizer` per channeling actor. A session is either
//! Idle (no task scheduled) or Active (periodic task registered with
//! the scheduler); `start` and `stop` transition between the two, the
//! scheduled tick does the per-interval work.
//!
//! ## Concurrency
//!
//! `start`/`stop` may be called from a different thread than the
//! scheduled tick. All session fields live behind one mutex and every
//! tick begins by snapshotting the active skill, so an in-flight tick
//! never observes a half-updated session. A tick that loses the race
//! against `stop` registers nothing: new back-references are committed
//! under the session lock only while the task handle is still present.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::{Result, SkillError};
use crate::effects::EffectScope;
use crate::skills::{SkillStore, SkillVariant};
use crate::world::{Creature, Notification, World};

use super::scheduler::{ScheduledTask, Scheduler, TaskHandle};

#[derive(Default)]
struct ChannelState {
    skill: Option<Arc<SkillVariant>>,
    task: Option<Box<dyn TaskHandle>>,
    channelized: Vec<Arc<dyn Creature>>,
}

/// A channeling session bound to one actor.
pub struct SkillChannelizer {
    caster: Arc<dyn Creature>,
    world: Arc<dyn World>,
    store: Arc<SkillStore>,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<ChannelState>,
}

impl SkillChannelizer {
    /// Create an idle session for `caster`.
    ///
    /// Returned in an `Arc` because the scheduled task shares ownership
    /// of the session.
    #[must_use]
    pub fn new(
        caster: Arc<dyn Creature>,
        world: Arc<dyn World>,
        store: Arc<SkillStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            caster,
            world,
            store,
            scheduler,
            state: Mutex::new(ChannelState::default()),
        })
    }

    /// The actor channeling through this session.
    #[must_use]
    pub fn caster(&self) -> &Arc<dyn Creature> {
        &self.caster
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_channeling(&self) -> bool {
        self.state.lock().task.is_some()
    }

    /// The skill being channeled, if any.
    #[must_use]
    pub fn skill(&self) -> Option<Arc<SkillVariant>> {
        self.state.lock().skill.clone()
    }

    /// Snapshot of the currently affected targets.
    #[must_use]
    pub fn channelized(&self) -> Vec<Arc<dyn Creature>> {
        self.state.lock().channelized.clone()
    }

    /// Transition Idle -> Active: record the skill and register the
    /// periodic tick with the scheduler.
    ///
    /// Calling `start` on an active session is a recoverable error that
    /// leaves the existing session untouched.
    pub fn start(self: &Arc<Self>, skill: Arc<SkillVariant>) -> Result<()> {
        let mut state = self.state.lock();
        if state.task.is_some() {
            warn!(caster = %self.caster.id(), skill = %skill.id, "already channeling, ignoring start");
            return Err(SkillError::AlreadyChanneling);
        }

        debug!(caster = %self.caster.id(), skill = %skill.id, "channeling started");
        state.skill = Some(Arc::clone(&skill));
        state.channelized.clear();
        state.task = Some(self.scheduler.schedule_at_fixed_rate(
            Arc::clone(self) as Arc<dyn ScheduledTask>,
            skill.channeling_initial_delay,
            skill.channeling_interval,
        ));
        Ok(())
    }

    /// Transition Active -> Idle: cancel the task and remove exactly
    /// the back-references this session added.
    ///
    /// Calling `stop` on an idle session is a recoverable error and a
    /// no-op. Safe against a concurrently running tick: cancellation
    /// does not interrupt an in-flight invocation, but that invocation
    /// will not commit anything once the handle is gone.
    pub fn stop(&self) -> Result<()> {
        let (task, skill, channelized) = {
            let mut state = self.state.lock();
            let Some(task) = state.task.take() else {
                warn!(caster = %self.caster.id(), "not channeling, ignoring stop");
                return Err(SkillError::NotChanneling);
            };
            (
                task,
                state.skill.take(),
                std::mem::take(&mut state.channelized),
            )
        };

        task.cancel();
        if let Some(skill) = skill {
            let key = skill.channel_key();
            for target in channelized {
                target.channel_targets().remove(key, self.caster.id());
            }
            debug!(caster = %self.caster.id(), skill = %skill.id, "channeling stopped");
        }
        Ok(())
    }

    /// One scheduled tick.
    pub fn tick(&self) {
        // Snapshot the skill up front: stop() may race the scheduler's
        // cancellation and this invocation must tolerate it.
        let Some(skill) = ({
            let state = self.state.lock();
            state.task.as_ref().and(state.skill.clone())
        }) else {
            return;
        };

        match self.run_tick(&skill) {
            Ok(()) => {}
            // These two already ended the session inside the tick.
            Err(SkillError::ResourceShortfall) | Err(SkillError::MissingLinkedSkill(_)) => {}
            Err(err) => {
                warn!(
                    caster = %self.caster.id(),
                    skill = %skill.id,
                    %err,
                    "error while channeling, session continues"
                );
            }
        }
    }

    fn run_tick(&self, skill: &Arc<SkillVariant>) -> Result<()> {
        let caster = self.caster.as_ref();

        // Validate and consume the per-tick resource.
        if skill.channeling_mp_consume > 0 {
            let cost = f64::from(skill.channeling_mp_consume);
            if caster.current_mana() < cost {
                if caster.is_player() {
                    caster.notify(Notification::ChannelingDeactivatedLackOfMana);
                }
                caster.abort_cast();
                let _ = self.stop();
                return Err(SkillError::ResourceShortfall);
            }
            caster.consume_mana(cost);
        }

        // Recompute the affected set from live world state.
        let targets = match self.world.find_cast_target(caster, skill) {
            Some(primary) => self
                .world
                .affected_targets(caster, primary.as_ref(), skill),
            None => Vec::new(),
        };
        if targets.is_empty() {
            // Prior back-references deliberately stay in place on an
            // empty recompute; only stop() clears them.
            return Ok(());
        }

        // Commit the new target list. A concurrent stop() wins: once
        // the task handle is gone, nothing may be re-added.
        let key = skill.channel_key();
        {
            let mut state = self.state.lock();
            if state.task.is_none() {
                return Ok(());
            }
            for target in &targets {
                target.channel_targets().add(key, caster.id());
            }
            state.channelized = targets.clone();
        }

        for target in &targets {
            if !self
                .world
                .check_range(caster, target.as_ref(), skill.effect_range)
            {
                continue;
            }
            if !self.world.can_see(caster, target.as_ref()) {
                continue;
            }

            if let Some(linked) = skill.channeling_skill {
                // Effective level scales with how many actors channel
                // this target, capped at the linked skill's max level.
                let max_level = self.store.max_level(linked);
                let level =
                    (target.channel_targets().channelizer_count(linked) as u16).min(max_level);

                // Skip reapplication when an equal-or-higher effect is
                // already active on the target.
                let active = target.active_effect_level(linked);
                if active.map_or(true, |l| l < level) {
                    let Some(channeled) = self.store.resolve(linked, level) else {
                        warn!(
                            caster = %self.caster.id(),
                            skill = %skill.id,
                            linked = %linked,
                            "non-existent channeling skill requested"
                        );
                        if caster.is_player() {
                            caster.notify(Notification::CastAborted);
                        }
                        caster.abort_cast();
                        let _ = self.stop();
                        return Err(SkillError::MissingLinkedSkill(linked));
                    };
                    channeled.apply_effects(EffectScope::General, caster, target.as_ref());
                }
                if !skill.is_toggle() {
                    self.world.broadcast_launch(caster, skill, target.as_ref());
                }
            } else {
                skill.apply_effects(EffectScope::Channeling, caster, target.as_ref());
            }

            // Shots are consumed per validated target and re-charged
            // as after every cast.
            if let Some(kind) = skill.shot_kind {
                caster.consume_shot(kind);
                caster.recharge_shots();
            }
        }
        Ok(())
    }
}

impl ScheduledTask for SkillChannelizer {
    fn run(&self) {
        self.tick();
    }
}

impl std::fmt::Debug for SkillChannelizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SkillChannelizer")
            .field("caster", &self.caster.id())
            .field("skill", &state.skill.as_ref().map(|s| s.id))
            .field("active", &state.task.is_some())
            .field("channelized", &state.channelized.len())
            .finish_non_exhaustive()
    }
}
