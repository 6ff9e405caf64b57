//! Per-tick event log.
//!
//! Everything observable that happens during a tick is recorded as a
//! [`GameEvent`]. Collaborators (audio, scene, draft UI) are driven from this
//! log at the end of the tick, and tests read it through
//! [`Game::events`](crate::game::Game::events).

use glam::Vec2;

use crate::entity::{Archetype, DefenderId, EnemyId, EnemyTier, EntityRef, ProjectileId};
use crate::round::RoundState;
use crate::upgrade::{DraftChoice, UpgradeRule};

/// Why an entity left the field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DestroyCause {
    /// A defender touched an enemy.
    EnemyContact,
    /// An enemy touched a Spike defender.
    SpikeContact,
    /// An enemy was hit by a projectile.
    ProjectileHit,
    /// A projectile struck its target.
    Impact,
    /// A projectile's lifetime ran out.
    Expired,
    /// A defender was swept during the round-win clear.
    RoundCleared,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The round state machine changed phase.
    PhaseChanged {
        /// Phase left.
        from: RoundState,
        /// Phase entered.
        to: RoundState,
    },
    /// A defender was spawned from a pool slot.
    DefenderSpawned {
        /// New defender.
        id: DefenderId,
        /// Archetype drawn from the pool.
        archetype: Archetype,
        /// Spawn position.
        position: Vec2,
    },
    /// An enemy was spawned on the arena edge.
    EnemySpawned {
        /// New enemy.
        id: EnemyId,
        /// Difficulty tier.
        tier: EnemyTier,
        /// Spawn position.
        position: Vec2,
    },
    /// A defender fired a projectile.
    ProjectileFired {
        /// New projectile.
        id: ProjectileId,
        /// Defender that fired.
        source: DefenderId,
        /// Archetype of the firing defender.
        tag: Archetype,
        /// Muzzle position.
        position: Vec2,
        /// Launch velocity.
        velocity: Vec2,
    },
    /// An entity was removed from the field.
    Destroyed {
        /// Removed entity.
        entity: EntityRef,
        /// Reason for removal.
        cause: DestroyCause,
    },
    /// Every entity was removed silently during Init.
    SceneCleared,
    /// A round was won and the level advanced.
    LevelCompleted {
        /// The new level.
        level: u32,
    },
    /// The upgrade draft was put on offer.
    DraftOffered {
        /// Visible choices.
        choices: Vec<DraftChoice>,
    },
    /// The upgrade draft was resolved.
    DraftResolved {
        /// Rule applied.
        rule: UpgradeRule,
        /// Pool slots converted.
        converted: usize,
        /// True when applied by the shop timeout.
        auto: bool,
    },
}

impl GameEvent {
    /// Returns true for events that spawn an entity.
    #[must_use]
    pub const fn is_spawn(&self) -> bool {
        matches!(
            self,
            Self::DefenderSpawned { .. } | Self::EnemySpawned { .. } | Self::ProjectileFired { .. }
        )
    }
}

/// Ordered record of the events of one tick.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Returns the recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clears the log.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
