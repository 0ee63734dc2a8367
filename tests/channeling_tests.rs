//! Channeling session integration tests.
//!
//! Scheduling is driven through a manual scheduler so ticks run
//! deterministically on the test thread; the world and actors are
//! in-memory fakes. One test at the bottom exercises the tokio-backed
//! scheduler end to end.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use skill_engine::channeling::{
    ChannelTargets, ScheduledTask, Scheduler, SkillChannelizer, TaskHandle, TokioScheduler,
};
use skill_engine::conditions::ConditionRegistry;
use skill_engine::core::{ActorId, EngineConfig, SkillError, SkillId};
use skill_engine::document::Node;
use skill_engine::effects::{EffectRegistry, EffectScope, SkillEffect};
use skill_engine::skills::{
    OperateType, ShotKind, SkillCompiler, SkillStore, SkillType, SkillVariant, StatSet,
};
use skill_engine::world::{Creature, Notification, World};

// === Scheduler driven by the test thread ===

struct ManualEntry {
    task: Arc<dyn ScheduledTask>,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualScheduler {
    entries: Mutex<Vec<ManualEntry>>,
}

struct ManualHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle for ManualHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_at_fixed_rate(
        &self,
        task: Arc<dyn ScheduledTask>,
        _initial_delay: Duration,
        _interval: Duration,
    ) -> Box<dyn TaskHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.entries.lock().unwrap().push(ManualEntry {
            task,
            cancelled: Arc::clone(&cancelled),
        });
        Box::new(ManualHandle { cancelled })
    }
}

impl ManualScheduler {
    /// Run one tick of every live (non-cancelled) schedule.
    fn fire(&self) {
        let tasks: Vec<Arc<dyn ScheduledTask>> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::SeqCst))
            .map(|e| Arc::clone(&e.task))
            .collect();
        for task in tasks {
            task.run();
        }
    }

    /// Run one tick of every schedule ever registered, cancelled or
    /// not. Models the trailing invocation a real pool may deliver
    /// after cancellation.
    fn fire_all(&self) {
        let tasks: Vec<Arc<dyn ScheduledTask>> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| Arc::clone(&e.task))
            .collect();
        for task in tasks {
            task.run();
        }
    }

    fn scheduled(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn live(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::SeqCst))
            .count()
    }
}

// === Actor and world fakes ===

struct FakeCreature {
    id: ActorId,
    player: bool,
    mana: Mutex<f64>,
    channel_targets: ChannelTargets,
    notifications: Mutex<Vec<Notification>>,
    casts_aborted: AtomicUsize,
    active_levels: Mutex<HashMap<SkillId, u16>>,
    shots_consumed: Mutex<Vec<ShotKind>>,
    recharges: AtomicUsize,
}

impl FakeCreature {
    fn new(id: u32, player: bool, mana: f64) -> Arc<Self> {
        Arc::new(Self {
            id: ActorId::new(id),
            player,
            mana: Mutex::new(mana),
            channel_targets: ChannelTargets::new(),
            notifications: Mutex::new(Vec::new()),
            casts_aborted: AtomicUsize::new(0),
            active_levels: Mutex::new(HashMap::new()),
            shots_consumed: Mutex::new(Vec::new()),
            recharges: AtomicUsize::new(0),
        })
    }

    fn set_active_level(&self, skill: SkillId, level: u16) {
        self.active_levels.lock().unwrap().insert(skill, level);
    }
}

impl Creature for FakeCreature {
    fn id(&self) -> ActorId {
        self.id
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn current_mana(&self) -> f64 {
        *self.mana.lock().unwrap()
    }

    fn consume_mana(&self, amount: f64) {
        let mut mana = self.mana.lock().unwrap();
        *mana = (*mana - amount).max(0.0);
    }

    fn abort_cast(&self) {
        self.casts_aborted.fetch_add(1, Ordering::SeqCst);
    }

    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    fn channel_targets(&self) -> &ChannelTargets {
        &self.channel_targets
    }

    fn active_effect_level(&self, skill: SkillId) -> Option<u16> {
        self.active_levels.lock().unwrap().get(&skill).copied()
    }

    fn consume_shot(&self, kind: ShotKind) {
        self.shots_consumed.lock().unwrap().push(kind);
    }

    fn recharge_shots(&self) {
        self.recharges.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeWorld {
    targets: Mutex<Vec<Arc<FakeCreature>>>,
    visible: AtomicBool,
    in_range: AtomicBool,
    launches: AtomicUsize,
}

impl FakeWorld {
    fn new(targets: Vec<Arc<FakeCreature>>) -> Arc<Self> {
        Arc::new(Self {
            targets: Mutex::new(targets),
            visible: AtomicBool::new(true),
            in_range: AtomicBool::new(true),
            launches: AtomicUsize::new(0),
        })
    }

    fn set_targets(&self, targets: Vec<Arc<FakeCreature>>) {
        *self.targets.lock().unwrap() = targets;
    }
}

impl World for FakeWorld {
    fn find_cast_target(
        &self,
        _caster: &dyn Creature,
        _skill: &SkillVariant,
    ) -> Option<Arc<dyn Creature>> {
        self.targets
            .lock()
            .unwrap()
            .first()
            .cloned()
            .map(|c| c as Arc<dyn Creature>)
    }

    fn affected_targets(
        &self,
        _caster: &dyn Creature,
        _target: &dyn Creature,
        _skill: &SkillVariant,
    ) -> Vec<Arc<dyn Creature>> {
        self.targets
            .lock()
            .unwrap()
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn Creature>)
            .collect()
    }

    fn check_range(&self, _from: &dyn Creature, _to: &dyn Creature, _range: i32) -> bool {
        self.in_range.load(Ordering::SeqCst)
    }

    fn can_see(&self, _from: &dyn Creature, _to: &dyn Creature) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn broadcast_launch(
        &self,
        _caster: &dyn Creature,
        _skill: &SkillVariant,
        _target: &dyn Creature,
    ) {
        self.launches.fetch_add(1, Ordering::SeqCst);
    }
}

// === Skill fixtures ===

/// Applications as `(caster, target, power)` triples, so tests can tell
/// which per-level parameterization fired.
type HitLog = Arc<Mutex<Vec<(ActorId, ActorId, i64)>>>;

struct RecordingEffect {
    power: i64,
    hits: HitLog,
}

impl SkillEffect for RecordingEffect {
    fn apply(&self, caster: &dyn Creature, target: &dyn Creature) {
        self.hits
            .lock()
            .unwrap()
            .push((caster.id(), target.id(), self.power));
    }
}

const DRAIN: SkillId = SkillId::new(1000);
const VOLLEY: SkillId = SkillId::new(1001);
const SIPHON: SkillId = SkillId::new(2000);
const SIPHON_AURA: SkillId = SkillId::new(2100);
const BROKEN_LINK: SkillId = SkillId::new(3000);
const NO_SUCH_SKILL: SkillId = SkillId::new(9999);

fn channeling_skill(id: SkillId, name: &str, max_level: u16) -> Node {
    Node::new("skill")
        .attr("id", id.raw().to_string())
        .attr("name", name)
        .attr("max-level", max_level.to_string())
        .attr("action", "channeling")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fixture() -> (Arc<SkillStore>, HitLog) {
    init_tracing();
    let hits: HitLog = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&hits);

    let mut effects = EffectRegistry::new();
    effects.register("drain", move |config: &StatSet| {
        Ok(Arc::new(RecordingEffect {
            power: config.get_int("power", 0),
            hits: Arc::clone(&log),
        }) as Arc<dyn SkillEffect>)
    });
    let conditions = ConditionRegistry::new();
    let config = EngineConfig::default();

    let doc = Node::new("list")
        .child(
            channeling_skill(DRAIN, "soul-drain", 1)
                .child(Node::new("channeling").attr("mp-consume", "10"))
                .child(
                    Node::new("effects")
                        .child(Node::new("drain").attr("scope", "channeling").attr("power", "5")),
                ),
        )
        .child(
            channeling_skill(VOLLEY, "soul-volley", 1)
                .child(Node::new("channeling").attr("shot", "soul"))
                .child(
                    Node::new("effects")
                        .child(Node::new("drain").attr("scope", "channeling").attr("power", "1")),
                ),
        )
        .child(
            channeling_skill(SIPHON, "siphon", 1)
                .child(Node::new("channeling").attr("skill", SIPHON_AURA.raw().to_string())),
        )
        .child(
            Node::new("skill")
                .attr("id", SIPHON_AURA.raw().to_string())
                .attr("name", "siphon-aura")
                .attr("max-level", "3")
                .child(
                    Node::new("effects").child(
                        Node::new("drain")
                            .attr("power", "10")
                            .child(Node::new("level").attr("level", "2").attr("power", "20"))
                            .child(Node::new("level").attr("level", "3").attr("power", "30")),
                    ),
                ),
        )
        .child(
            channeling_skill(BROKEN_LINK, "broken-link", 1)
                .child(Node::new("channeling").attr("skill", NO_SUCH_SKILL.raw().to_string())),
        );

    let store = Arc::new(SkillStore::new());
    let compiler = SkillCompiler::new(&effects, &conditions, &config);
    compiler.load(&doc, &store).expect("fixture must compile");
    (store, hits)
}

fn session(
    caster: &Arc<FakeCreature>,
    world: &Arc<FakeWorld>,
    store: &Arc<SkillStore>,
    scheduler: &Arc<ManualScheduler>,
) -> Arc<SkillChannelizer> {
    SkillChannelizer::new(
        Arc::clone(caster) as Arc<dyn Creature>,
        Arc::clone(world) as Arc<dyn World>,
        Arc::clone(store),
        Arc::clone(scheduler) as Arc<dyn Scheduler>,
    )
}

// === Session lifecycle ===

#[test]
fn test_start_is_exclusive_per_session() {
    let (store, _) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let world = FakeWorld::new(vec![]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    let drain = store.resolve(DRAIN, 1).unwrap();
    let volley = store.resolve(VOLLEY, 1).unwrap();

    channelizer.start(Arc::clone(&drain)).unwrap();
    let err = channelizer.start(volley).unwrap_err();
    assert!(matches!(err, SkillError::AlreadyChanneling));

    // The original session is untouched.
    assert_eq!(channelizer.skill().unwrap().id, DRAIN);
    assert_eq!(scheduler.scheduled(), 1);
}

#[test]
fn test_stop_when_idle_is_recoverable_noop() {
    let (store, _) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let world = FakeWorld::new(vec![]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    let err = channelizer.stop().unwrap_err();
    assert!(matches!(err, SkillError::NotChanneling));
    assert!(!channelizer.is_channeling());
}

#[test]
fn test_tick_applies_effects_and_registers_back_references() {
    let (store, hits) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let victim_a = FakeCreature::new(10, false, 0.0);
    let victim_b = FakeCreature::new(11, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim_a), Arc::clone(&victim_b)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(DRAIN, 1).unwrap()).unwrap();
    scheduler.fire();

    // Mana drawn once per tick, not per target.
    assert_eq!(caster.current_mana(), 90.0);

    // Channeling-scope effect on every validated target.
    assert_eq!(
        *hits.lock().unwrap(),
        vec![(caster.id(), victim_a.id(), 5), (caster.id(), victim_b.id(), 5)]
    );

    // Back-references point from each target to the caster, keyed by
    // the channeling skill itself since no linked skill is configured.
    assert!(victim_a.channel_targets.contains(DRAIN, caster.id()));
    assert!(victim_b.channel_targets.contains(DRAIN, caster.id()));
    assert_eq!(channelizer.channelized().len(), 2);

    channelizer.stop().unwrap();
    assert!(!victim_a.channel_targets.is_channelized());
    assert!(!victim_b.channel_targets.is_channelized());
    assert!(channelizer.channelized().is_empty());
    assert_eq!(scheduler.live(), 0);
}

#[test]
fn test_out_of_range_or_unseen_targets_keep_back_references_only() {
    let (store, hits) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    world.visible.store(false, Ordering::SeqCst);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(DRAIN, 1).unwrap()).unwrap();
    scheduler.fire();

    // Registered as channelized, but no effect lands without sight.
    assert!(victim.channel_targets.contains(DRAIN, caster.id()));
    assert!(hits.lock().unwrap().is_empty());
}

#[test]
fn test_mana_shortfall_ends_session_with_single_notification() {
    let (store, hits) = fixture();
    let caster = FakeCreature::new(1, true, 5.0);
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(DRAIN, 1).unwrap()).unwrap();
    scheduler.fire();

    assert_eq!(
        *caster.notifications.lock().unwrap(),
        vec![Notification::ChannelingDeactivatedLackOfMana]
    );
    assert_eq!(caster.casts_aborted.load(Ordering::SeqCst), 1);
    assert!(!channelizer.is_channeling());
    assert_eq!(scheduler.live(), 0);

    // The tick ended before reaching any target.
    assert!(hits.lock().unwrap().is_empty());
    assert!(!victim.channel_targets.is_channelized());
    assert_eq!(caster.current_mana(), 5.0);
}

#[test]
fn test_non_player_shortfall_gets_no_notification() {
    let (store, _) = fixture();
    let caster = FakeCreature::new(1, false, 5.0);
    let world = FakeWorld::new(vec![]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(DRAIN, 1).unwrap()).unwrap();
    scheduler.fire();

    assert!(caster.notifications.lock().unwrap().is_empty());
    assert_eq!(caster.casts_aborted.load(Ordering::SeqCst), 1);
    assert!(!channelizer.is_channeling());
}

#[test]
fn test_empty_recompute_preserves_previous_back_references() {
    let (store, _) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(DRAIN, 1).unwrap()).unwrap();
    scheduler.fire();
    assert!(victim.channel_targets.contains(DRAIN, caster.id()));

    // Target walks away; the recompute finds nothing.
    world.set_targets(vec![]);
    scheduler.fire();

    // The stale reference stays until stop() clears it.
    assert!(victim.channel_targets.contains(DRAIN, caster.id()));
    assert_eq!(channelizer.channelized().len(), 1);
    assert!(channelizer.is_channeling());

    channelizer.stop().unwrap();
    assert!(!victim.channel_targets.is_channelized());
}

#[test]
fn test_trailing_tick_after_stop_commits_nothing() {
    let (store, hits) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(DRAIN, 1).unwrap()).unwrap();
    channelizer.stop().unwrap();

    // A pool may deliver one more invocation after cancellation.
    scheduler.fire_all();

    assert!(hits.lock().unwrap().is_empty());
    assert!(!victim.channel_targets.is_channelized());
    assert_eq!(caster.current_mana(), 100.0);
}

/// World fake whose target recompute stops the session from inside the
/// tick, landing between the skill snapshot and the commit.
struct StopDuringRecomputeWorld {
    target: Arc<FakeCreature>,
    session: Mutex<Option<Arc<SkillChannelizer>>>,
}

impl World for StopDuringRecomputeWorld {
    fn find_cast_target(
        &self,
        _caster: &dyn Creature,
        _skill: &SkillVariant,
    ) -> Option<Arc<dyn Creature>> {
        Some(Arc::clone(&self.target) as Arc<dyn Creature>)
    }

    fn affected_targets(
        &self,
        _caster: &dyn Creature,
        _target: &dyn Creature,
        _skill: &SkillVariant,
    ) -> Vec<Arc<dyn Creature>> {
        if let Some(session) = self.session.lock().unwrap().take() {
            session.stop().unwrap();
        }
        vec![Arc::clone(&self.target) as Arc<dyn Creature>]
    }

    fn check_range(&self, _from: &dyn Creature, _to: &dyn Creature, _range: i32) -> bool {
        true
    }

    fn can_see(&self, _from: &dyn Creature, _to: &dyn Creature) -> bool {
        true
    }

    fn broadcast_launch(
        &self,
        _caster: &dyn Creature,
        _skill: &SkillVariant,
        _target: &dyn Creature,
    ) {
    }
}

#[test]
fn test_stop_during_target_recompute_blocks_commit() {
    init_tracing();
    let (store, hits) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let victim = FakeCreature::new(10, false, 0.0);
    let world = Arc::new(StopDuringRecomputeWorld {
        target: Arc::clone(&victim),
        session: Mutex::new(None),
    });
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = SkillChannelizer::new(
        Arc::clone(&caster) as Arc<dyn Creature>,
        Arc::clone(&world) as Arc<dyn World>,
        Arc::clone(&store),
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
    );
    *world.session.lock().unwrap() = Some(Arc::clone(&channelizer));

    channelizer.start(store.resolve(DRAIN, 1).unwrap()).unwrap();
    // The recompute stops the session mid-tick; the rest of this tick
    // must register nothing even though it found a live target.
    channelizer.tick();

    assert!(!victim.channel_targets.is_channelized());
    assert!(channelizer.channelized().is_empty());
    assert!(!channelizer.is_channeling());
    assert!(hits.lock().unwrap().is_empty());
}

// === Linked channeled skills ===

#[test]
fn test_linked_skill_level_tracks_channelizer_count() {
    let (store, hits) = fixture();
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let scheduler = Arc::new(ManualScheduler::default());

    let caster_a = FakeCreature::new(1, true, 100.0);
    let caster_b = FakeCreature::new(2, true, 100.0);
    let session_a = session(&caster_a, &world, &store, &scheduler);
    let session_b = session(&caster_b, &world, &store, &scheduler);

    // One channelizer: the aura lands at level 1 (power 10).
    session_a.start(store.resolve(SIPHON, 1).unwrap()).unwrap();
    session_a.tick();
    assert_eq!(*hits.lock().unwrap(), vec![(caster_a.id(), victim.id(), 10)]);
    assert!(victim.channel_targets.contains(SIPHON_AURA, caster_a.id()));

    // A second channelizer raises the count to 2: level-2 row (power 20).
    session_b.start(store.resolve(SIPHON, 1).unwrap()).unwrap();
    session_b.tick();
    assert_eq!(hits.lock().unwrap().last(), Some(&(caster_b.id(), victim.id(), 20)));

    // Launch animation goes out for non-toggle skills either way.
    assert_eq!(world.launches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_linked_skill_level_caps_at_max_level() {
    let (store, hits) = fixture();
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let caster = FakeCreature::new(1, true, 100.0);
    let channelizer = session(&caster, &world, &store, &scheduler);

    // Five other actors already channel this target.
    for other in 50..55 {
        victim.channel_targets.add(SIPHON_AURA, ActorId::new(other));
    }

    channelizer.start(store.resolve(SIPHON, 1).unwrap()).unwrap();
    channelizer.tick();

    // Count 6 clamps to the aura's max level 3 (power 30).
    assert_eq!(*hits.lock().unwrap(), vec![(caster.id(), victim.id(), 30)]);
}

#[test]
fn test_equal_or_higher_active_effect_skips_reapplication() {
    let (store, hits) = fixture();
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let caster = FakeCreature::new(1, true, 100.0);
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(SIPHON, 1).unwrap()).unwrap();
    channelizer.tick();
    assert_eq!(hits.lock().unwrap().len(), 1);

    // The aura is now active at the level the tick applied.
    victim.set_active_level(SIPHON_AURA, 1);
    channelizer.tick();

    // No reapplication, but the launch broadcast still happens.
    assert_eq!(hits.lock().unwrap().len(), 1);
    assert_eq!(world.launches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_linked_skill_aborts_session() {
    let (store, hits) = fixture();
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let caster = FakeCreature::new(1, true, 100.0);
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(BROKEN_LINK, 1).unwrap()).unwrap();
    channelizer.tick();

    assert_eq!(caster.casts_aborted.load(Ordering::SeqCst), 1);
    assert_eq!(
        *caster.notifications.lock().unwrap(),
        vec![Notification::CastAborted]
    );
    assert!(!channelizer.is_channeling());
    assert!(hits.lock().unwrap().is_empty());
    // stop() took the freshly committed back-reference down with it.
    assert!(!victim.channel_targets.is_channelized());
}

// === Shots ===

#[test]
fn test_shots_consumed_per_target_and_recharged() {
    let (store, _) = fixture();
    let caster = FakeCreature::new(1, true, 100.0);
    let victim_a = FakeCreature::new(10, false, 0.0);
    let victim_b = FakeCreature::new(11, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim_a), Arc::clone(&victim_b)]);
    let scheduler = Arc::new(ManualScheduler::default());
    let channelizer = session(&caster, &world, &store, &scheduler);

    channelizer.start(store.resolve(VOLLEY, 1).unwrap()).unwrap();
    scheduler.fire();

    assert_eq!(
        *caster.shots_consumed.lock().unwrap(),
        vec![ShotKind::Soul, ShotKind::Soul]
    );
    assert_eq!(caster.recharges.load(Ordering::SeqCst), 2);
}

// === Tokio-backed scheduling ===

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_scheduler_drives_and_cancels_ticks() {
    init_tracing();
    let hits: HitLog = Arc::new(Mutex::new(Vec::new()));

    let mut skill = SkillVariant::new(
        SkillId::new(77),
        "pulse",
        1,
        false,
        OperateType::Channeling,
        SkillType::Magic,
    );
    skill.channeling_initial_delay = Duration::from_millis(5);
    skill.channeling_interval = Duration::from_millis(10);
    skill.add_effect(
        EffectScope::Channeling,
        Arc::new(RecordingEffect {
            power: 1,
            hits: Arc::clone(&hits),
        }),
    );
    let skill = Arc::new(skill);

    let caster = FakeCreature::new(1, true, 100.0);
    let victim = FakeCreature::new(10, false, 0.0);
    let world = FakeWorld::new(vec![Arc::clone(&victim)]);
    let channelizer = SkillChannelizer::new(
        Arc::clone(&caster) as Arc<dyn Creature>,
        Arc::clone(&world) as Arc<dyn World>,
        Arc::new(SkillStore::new()),
        Arc::new(TokioScheduler::new()),
    );

    channelizer.start(skill).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let ticked = hits.lock().unwrap().len();
    assert!(ticked >= 1, "expected at least one scheduled tick");

    channelizer.stop().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let after = hits.lock().unwrap().len();
    // At most one trailing invocation after cancellation.
    assert!(after <= ticked + 1, "ticks continued after stop");
}
