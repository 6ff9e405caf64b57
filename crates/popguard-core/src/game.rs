//! The round state machine.
//!
//! [`Game`] owns every piece of mutable state (pool, arena, level, phase
//! timer, pending draft) and advances it one fixed tick per [`Game::step`].
//!
//! # Tick Order
//!
//! 1. **PHASE**: run the active phase (spawning, combat, clearing, shop)
//! 2. **FORCES**: one force pass over defenders and enemies
//! 3. **INTEGRATE**: hand forces to the integrator, advance projectiles
//! 4. **DESTROY**: remove contact casualties, projectile hits and expired
//!    projectiles
//! 5. **DISPATCH**: forward the tick's events to the collaborators
//!
//! # Time
//!
//! Each tick lasts `fixed_dt` seconds, multiplied by the player time scale
//! during StartRound, PlayRound and RoundWin. StartRound and RoundWin also
//! ramp the scale up by `phase_ramp` every tick. Every transition resets the
//! phase timer and the ramp.
//!
//! # Determinism
//!
//! One `ChaCha8Rng` seeded from the master seed drives every random draw.
//! Two games built from the same config and seed, fed the same calls, stay in
//! lockstep; [`Game::state_hash`] makes that checkable.
//!
//! # Example
//!
//! ```
//! use popguard_core::config::GameConfig;
//! use popguard_core::game::Game;
//! use popguard_core::round::RoundState;
//!
//! let mut game = Game::new(GameConfig::default(), 42).unwrap();
//! assert_eq!(game.phase(), RoundState::Init);
//!
//! game.step();
//! assert_eq!(game.phase(), RoundState::StartRound);
//! assert_eq!(game.tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arena::Arena;
use crate::collab::Collaborators;
use crate::config::GameConfig;
use crate::entity::{Archetype, EntityRef};
use crate::error::{ConfigError, DraftError};
use crate::event::{DestroyCause, EventLog, GameEvent};
use crate::pool::EntityPool;
use crate::resolver::{
    CombatResolver, FieldEntity, ForceField, ForceSimulator, SpawnScheduler,
};
use crate::round::{RoundState, TimeScale};
use crate::upgrade::{DraftChoice, PendingDraft, UpgradeRule, UpgradeSelector};

// =============================================================================
// Game
// =============================================================================

/// The arena-defense simulation.
pub struct Game {
    /// Validated configuration.
    config: GameConfig,
    /// Master seed the RNG was built from.
    seed: u64,
    /// Single source of randomness.
    rng: ChaCha8Rng,
    /// Active phase.
    phase: RoundState,
    /// Completed rounds.
    level: u32,
    /// Seconds accumulated in the active phase.
    timer: f32,
    /// Time scale ramp of the active phase.
    ramp: f32,
    /// Player-selected speed.
    time_scale: TimeScale,
    /// Ticks stepped so far.
    tick: u64,
    /// Defender archetype assignment.
    pool: EntityPool,
    /// Live entities.
    arena: Arena,
    /// Draft awaiting a decision, only while in Shop.
    draft: Option<PendingDraft>,
    selector: UpgradeSelector,
    spawner: SpawnScheduler,
    combat: CombatResolver,
    forces: ForceSimulator,
    /// Events since the start of the last tick.
    events: EventLog,
    collaborators: Collaborators,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("seed", &self.seed)
            .field("tick", &self.tick)
            .field("phase", &self.phase)
            .field("level", &self.level)
            .field("timer", &self.timer)
            .field("time_scale", &self.time_scale)
            .field("defenders", &self.arena.defenders().len())
            .field("enemies", &self.arena.enemies().len())
            .field("projectiles", &self.arena.projectiles().len())
            .field("draft", &self.draft)
            .field("collaborators", &self.collaborators)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates a game with no-op collaborators and the default integrator
    /// and contact detector.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_collaborators(config, seed, Collaborators::default())
    }

    /// Creates a game talking to the given collaborators.
    ///
    /// The game starts in [`RoundState::Init`]; the first step resets it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn with_collaborators(
        config: GameConfig,
        seed: u64,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            selector: UpgradeSelector::new(config.upgrades.clone()),
            spawner: SpawnScheduler::new(
                config.enemy_tier_count,
                config.enemy_spawn_radius,
                config.defender_spawn_radius,
            ),
            combat: CombatResolver::new(config.engagement_radius, config.projectile_ttl),
            forces: ForceSimulator::new(config.relocation_radius),
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: RoundState::Init,
            level: 0,
            timer: 0.0,
            ramp: 1.0,
            time_scale: TimeScale::default(),
            tick: 0,
            pool: EntityPool::new(),
            arena: Arena::new(),
            draft: None,
            events: EventLog::new(),
            collaborators,
        })
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the simulation by one fixed tick.
    pub fn step(&mut self) {
        self.events.clear();

        let phase = self.phase;
        let dt = self.phase_dt();

        match phase {
            RoundState::Init => self.run_init(),
            RoundState::StartRound => self.run_start_round(dt),
            RoundState::PlayRound => self.run_play_round(dt),
            RoundState::RoundWin => self.run_round_win(dt),
            RoundState::Shop => self.run_shop(dt),
            RoundState::GameOver => {
                if self.config.restart_on_game_over {
                    self.transition(RoundState::Init);
                }
            }
        }

        let update_enemies = match phase {
            RoundState::StartRound | RoundState::RoundWin | RoundState::Shop => Some(false),
            RoundState::PlayRound => Some(true),
            RoundState::Init | RoundState::GameOver => None,
        };
        self.run_physics(dt, update_enemies);

        self.tick += 1;
        self.dispatch_from(0);
    }

    /// Returns this tick's delta, advancing the ramp in ramped phases.
    fn phase_dt(&mut self) -> f32 {
        if self.phase.is_ramped() {
            self.ramp *= self.config.phase_ramp;
        }
        if self.phase.is_scaled() {
            self.config.fixed_dt * self.time_scale.factor() * self.ramp
        } else {
            self.config.fixed_dt
        }
    }

    fn run_init(&mut self) {
        self.pool.reset();
        self.arena.clear();
        self.level = 0;
        self.draft = None;
        self.events.record(GameEvent::SceneCleared);
        self.transition(RoundState::StartRound);
    }

    fn run_start_round(&mut self, dt: f32) {
        self.timer += dt;
        while self.timer >= self.config.spawn_interval {
            self.timer -= self.config.spawn_interval;
            if self.arena.defenders().len() >= self.config.play_threshold {
                self.transition(RoundState::PlayRound);
                return;
            }
            self.spawn_once();
        }
    }

    fn spawn_once(&mut self) {
        let wave_level = i32::try_from(self.level).unwrap_or(i32::MAX) - 1;
        let plan = self.spawner.tick(
            wave_level,
            self.arena.defenders().len(),
            &self.pool,
            &mut self.rng,
        );

        if let Some((tier, position)) = plan.enemy {
            let id = self.arena.spawn_enemy(tier, position);
            self.events.record(GameEvent::EnemySpawned { id, tier, position });
        }

        let id = self
            .arena
            .spawn_defender(plan.defender, plan.defender_position);
        self.events.record(GameEvent::DefenderSpawned {
            id,
            archetype: plan.defender,
            position: plan.defender_position,
        });
    }

    fn run_play_round(&mut self, dt: f32) {
        if self.arena.defenders().is_empty() {
            info!(tick = self.tick, level = self.level, "game over");
            self.transition(RoundState::GameOver);
            return;
        }
        if self.arena.enemies().is_empty() {
            self.transition(RoundState::RoundWin);
            return;
        }

        for shot in self.combat.resolve(&mut self.arena, dt, &mut self.rng) {
            self.events.record(GameEvent::ProjectileFired {
                id: shot.id,
                source: shot.source,
                tag: shot.tag,
                position: shot.position,
                velocity: shot.velocity,
            });
        }
    }

    fn run_round_win(&mut self, dt: f32) {
        self.timer += dt;
        while self.timer >= self.config.spawn_interval {
            self.timer -= self.config.spawn_interval;
            match self.arena.defenders().first() {
                Some(oldest) => {
                    let entity = EntityRef::Defender(oldest);
                    self.arena.despawn(entity);
                    self.events.record(GameEvent::Destroyed {
                        entity,
                        cause: DestroyCause::RoundCleared,
                    });
                }
                None => {
                    self.complete_level();
                    return;
                }
            }
        }
    }

    fn complete_level(&mut self) {
        self.level += 1;
        info!(tick = self.tick, level = self.level, "level completed");
        self.events
            .record(GameEvent::LevelCompleted { level: self.level });

        let rules = self.selector.select(&self.pool, &mut self.rng);
        match PendingDraft::new(rules, self.config.draft_slots) {
            Some(draft) => {
                let choices = draft.choices();
                debug!(
                    eligible = draft.rules().len(),
                    visible = choices.len(),
                    "draft offered"
                );
                self.events.record(GameEvent::DraftOffered { choices });
                self.draft = Some(draft);
                self.transition(RoundState::Shop);
            }
            None => {
                debug!("no affordable upgrade, skipping shop");
                self.transition(RoundState::StartRound);
            }
        }
    }

    fn run_shop(&mut self, dt: f32) {
        self.timer += dt;
        if self.timer < self.config.shop_timeout {
            return;
        }
        if let Some(draft) = self.draft.take() {
            self.apply_rule(draft.fallback(), true);
        }
        self.transition(RoundState::StartRound);
    }

    fn apply_rule(&mut self, rule: UpgradeRule, auto: bool) {
        let converted = rule.apply(&mut self.pool);
        debug!(
            from = %rule.prerequisite,
            to = %rule.result,
            converted,
            auto,
            "draft resolved"
        );
        self.events.record(GameEvent::DraftResolved {
            rule,
            converted,
            auto,
        });
    }

    fn transition(&mut self, to: RoundState) {
        let from = self.phase;
        debug!(tick = self.tick, %from, %to, "phase transition");
        self.events.record(GameEvent::PhaseChanged { from, to });
        self.phase = to;
        self.timer = 0.0;
        self.ramp = 1.0;
    }

    // =========================================================================
    // Physics
    // =========================================================================

    fn run_physics(&mut self, dt: f32, update_enemies: Option<bool>) {
        let total = self.arena.defenders().len() + self.arena.enemies().len();
        let mut refs = Vec::with_capacity(total);
        let mut participants = Vec::with_capacity(total);
        for (id, defender) in self.arena.defenders().iter() {
            refs.push(EntityRef::Defender(id));
            participants.push(FieldEntity::defender(
                defender.body.position,
                defender.archetype.is_spike(),
            ));
        }
        for (id, enemy) in self.arena.enemies().iter() {
            refs.push(EntityRef::Enemy(id));
            participants.push(FieldEntity::enemy(enemy.body.position));
        }

        let field = match update_enemies {
            Some(update_enemies) => {
                self.forces
                    .compute(&mut participants, update_enemies, &mut self.rng)
            }
            None => ForceField {
                forces: vec![Vec2::ZERO; participants.len()],
                ..ForceField::default()
            },
        };

        for &index in &field.relocated {
            if let Some(body) = self.arena.body_mut(refs[index]) {
                body.position = participants[index].position;
            }
        }

        let integrator = &self.collaborators.integrator;
        for (entity, force) in refs.iter().zip(&field.forces) {
            if let Some(body) = self.arena.body_mut(*entity) {
                integrator.integrate(body, *force, dt);
            }
        }
        for (_, projectile) in self.arena.projectiles_mut().iter_mut() {
            integrator.advance(&mut projectile.body, dt);
        }

        for &(index, cause) in &field.destroyed {
            self.destroy(refs[index], cause);
        }

        for contact in self.collaborators.contacts.detect(&self.arena) {
            self.destroy(contact.target, DestroyCause::ProjectileHit);
            self.destroy(EntityRef::Projectile(contact.projectile), DestroyCause::Impact);
        }

        let mut expired = Vec::new();
        for (id, projectile) in self.arena.projectiles_mut().iter_mut() {
            projectile.time_to_live -= dt;
            if projectile.is_expired() {
                expired.push(EntityRef::Projectile(id));
            }
        }
        for entity in expired {
            self.destroy(entity, DestroyCause::Expired);
        }
    }

    fn destroy(&mut self, entity: EntityRef, cause: DestroyCause) {
        if self.arena.despawn(entity) {
            self.events.record(GameEvent::Destroyed { entity, cause });
        }
    }

    fn dispatch_from(&mut self, start: usize) {
        let events = &self.events.events()[start..];
        self.collaborators.dispatch(events);
    }

    // =========================================================================
    // Player Input
    // =========================================================================

    /// Accepts visible draft choice `index`.
    ///
    /// Converts up to the rule's threshold of pool slots, closes the draft and
    /// starts the next round. The resulting events are dispatched immediately
    /// and stay readable through [`Game::events`] until the next step.
    ///
    /// # Errors
    ///
    /// - [`DraftError::NoPendingDraft`] outside the shop or once resolved
    /// - [`DraftError::ChoiceOutOfRange`] if `index` is not a visible choice
    ///
    /// State is untouched on error.
    pub fn resolve_draft(&mut self, index: usize) -> Result<UpgradeRule, DraftError> {
        let draft = match (&self.draft, self.phase) {
            (Some(draft), RoundState::Shop) => draft,
            _ => return Err(DraftError::NoPendingDraft),
        };
        let rule = draft.choice(index).ok_or(DraftError::ChoiceOutOfRange {
            index,
            available: draft.visible(),
        })?;

        let start = self.events.len();
        self.draft = None;
        self.apply_rule(rule, false);
        self.transition(RoundState::StartRound);
        self.dispatch_from(start);
        Ok(rule)
    }

    /// Re-enters Init; the next step resets pool, arena and level.
    pub fn restart(&mut self) {
        let start = self.events.len();
        self.draft = None;
        self.transition(RoundState::Init);
        self.dispatch_from(start);
    }

    /// Forces the phase from an externally stored name.
    ///
    /// Unknown names heal to Init. Leaving the shop this way discards the draft.
    pub fn restore_phase(&mut self, name: &str) {
        let to = RoundState::from_name_or_init(name);
        let start = self.events.len();
        if to != RoundState::Shop {
            self.draft = None;
        }
        self.transition(to);
        self.dispatch_from(start);
    }

    /// Sets the player time scale.
    pub fn set_time_scale(&mut self, time_scale: TimeScale) {
        self.time_scale = time_scale;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the active phase.
    #[must_use]
    pub fn phase(&self) -> RoundState {
        self.phase
    }

    /// Returns the number of completed rounds.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the number of ticks stepped.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the seconds accumulated in the active phase.
    #[must_use]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Returns the player time scale.
    #[must_use]
    pub fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    /// Returns the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the defender pool.
    #[must_use]
    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    /// Returns the live entities.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the live entities mutably, for scenario setup.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns the events of the last tick, plus any input events since.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        self.events.events()
    }

    /// Returns the pending draft while in the shop.
    #[must_use]
    pub fn draft(&self) -> Option<&PendingDraft> {
        self.draft.as_ref()
    }

    /// Returns the visible draft choices; empty outside the shop.
    #[must_use]
    pub fn draft_choices(&self) -> Vec<DraftChoice> {
        self.draft.as_ref().map(PendingDraft::choices).unwrap_or_default()
    }

    /// Returns the shop countdown fill, `1` at shop entry and `0` after the
    /// countdown length. `None` outside the shop.
    #[must_use]
    pub fn shop_countdown(&self) -> Option<f32> {
        (self.phase == RoundState::Shop)
            .then(|| (self.config.shop_countdown - self.timer) / self.config.shop_countdown)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Summarises the observable state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            tick: self.tick,
            phase: self.phase,
            level: self.level,
            time_scale: self.time_scale,
            defenders: self.arena.defenders().len(),
            enemies: self.arena.enemies().len(),
            projectiles: self.arena.projectiles().len(),
            pool: self.pool.counts(),
            draft: self.draft_choices(),
            shop_countdown: self.shop_countdown(),
        }
    }

    /// Hashes the full simulation state for determinism checks.
    ///
    /// Floats are hashed by bit pattern, so any divergence shows.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        self.tick.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.level.hash(&mut hasher);
        self.timer.to_bits().hash(&mut hasher);
        self.ramp.to_bits().hash(&mut hasher);
        self.pool.slots().hash(&mut hasher);

        for (id, defender) in self.arena.defenders().iter() {
            id.hash(&mut hasher);
            defender.archetype.hash(&mut hasher);
            hash_vec2(defender.body.position, &mut hasher);
            hash_vec2(defender.body.velocity, &mut hasher);
            defender.cooldown.scale().to_bits().hash(&mut hasher);
        }
        for (id, enemy) in self.arena.enemies().iter() {
            id.hash(&mut hasher);
            enemy.tier.hash(&mut hasher);
            hash_vec2(enemy.body.position, &mut hasher);
            hash_vec2(enemy.body.velocity, &mut hasher);
        }
        for (id, projectile) in self.arena.projectiles().iter() {
            id.hash(&mut hasher);
            projectile.tag.hash(&mut hasher);
            hash_vec2(projectile.body.position, &mut hasher);
            hash_vec2(projectile.body.velocity, &mut hasher);
            projectile.time_to_live.to_bits().hash(&mut hasher);
        }
        if let Some(draft) = &self.draft {
            draft.rules().hash(&mut hasher);
        }
        hasher.finish()
    }
}

fn hash_vec2<H: Hasher>(value: Vec2, hasher: &mut H) {
    value.x.to_bits().hash(hasher);
    value.y.to_bits().hash(hasher);
}

/// Serialisable summary of a [`Game`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Ticks stepped.
    pub tick: u64,
    /// Active phase.
    pub phase: RoundState,
    /// Completed rounds.
    pub level: u32,
    /// Player time scale.
    pub time_scale: TimeScale,
    /// Live defenders.
    pub defenders: usize,
    /// Live enemies.
    pub enemies: usize,
    /// Live projectiles.
    pub projectiles: usize,
    /// Pool slots per archetype.
    pub pool: BTreeMap<Archetype, usize>,
    /// Visible draft choices.
    pub draft: Vec<DraftChoice>,
    /// Shop countdown fill, while in the shop.
    pub shop_countdown: Option<f32>,
}

// =============================================================================
// Tests
// =============================================================================
