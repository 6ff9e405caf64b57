//! Arena module holding every on-field entity.
//!
//! The Arena owns three collections, one per entity kind. It provides:
//! - Storage with deterministic iteration order (`BTreeMap`)
//! - Typed handles that are never reused
//! - Entity lifecycle management (spawn/despawn)
//!
//! # Iteration Order
//!
//! Every per-tick loop in the simulation walks entities in spawn order: the
//! force pass, targeting, contact detection and the round-clear sweep all rely
//! on it. Handles are assigned from a monotonically increasing serial, and the
//! `BTreeMap` keyed by handle yields entities oldest first.
//!
//! # Example
//!
//! ```
//! use popguard_core::arena::Arena;
//! use popguard_core::entity::{Archetype, EnemyTier};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let first = arena.spawn_defender(Archetype::Shooter, Vec2::ZERO);
//! let second = arena.spawn_defender(Archetype::Bubble, Vec2::new(1.0, 0.0));
//! arena.spawn_enemy(EnemyTier::new(0), Vec2::new(30.0, 0.0));
//!
//! let ids: Vec<_> = arena.defenders().handles().collect();
//! assert_eq!(ids, vec![first, second]);
//! assert_eq!(arena.enemies().len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;

use crate::entity::{
    Archetype, Body, Defender, DefenderId, Enemy, EnemyId, EnemyTier, EntityRef, Handle, Projectile,
    ProjectileId,
};

// =============================================================================
// Entity Set
// =============================================================================

/// Ordered storage for entities of one kind.
///
/// Entities are addressed by [`Handle`] and iterated oldest first. Clearing the
/// set keeps the serial counter, so handles issued before a clear never match
/// entities inserted after it.
pub struct EntitySet<T> {
    /// Serial assigned to the next inserted entity.
    next_serial: u64,
    /// Entity storage in spawn order.
    entries: BTreeMap<Handle<T>, T>,
}

impl<T> EntitySet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_serial: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Inserts an entity and returns its handle.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let handle = Handle::new(self.next_serial);
        self.next_serial += 1;
        self.entries.insert(handle, value);
        handle
    }

    /// Removes an entity, returning it if it was still live.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        self.entries.remove(&handle)
    }

    /// Returns a reference to a live entity.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.entries.get(&handle)
    }

    /// Returns a mutable reference to a live entity.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.entries.get_mut(&handle)
    }

    /// Returns true if the handle refers to a live entity.
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the oldest live entity's handle.
    #[must_use]
    pub fn first(&self) -> Option<Handle<T>> {
        self.entries.keys().next().copied()
    }

    /// Iterates handles in spawn order.
    pub fn handles(&self) -> impl Iterator<Item = Handle<T>> + '_ {
        self.entries.keys().copied()
    }

    /// Iterates entities in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.entries.iter().map(|(handle, value)| (*handle, value))
    }

    /// Iterates mutable entities in spawn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> + '_ {
        self.entries.iter_mut().map(|(handle, value)| (*handle, value))
    }
}

impl<T> Default for EntitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for EntitySet<T> {
    fn clone(&self) -> Self {
        Self {
            next_serial: self.next_serial,
            entries: self.entries.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for EntitySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySet")
            .field("next_serial", &self.next_serial)
            .field("entries", &self.entries)
            .finish()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Container for all live defenders, enemies and projectiles.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    defenders: EntitySet<Defender>,
    enemies: EntitySet<Enemy>,
    projectiles: EntitySet<Projectile>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a ready defender at `position`.
    pub fn spawn_defender(&mut self, archetype: Archetype, position: Vec2) -> DefenderId {
        self.defenders.insert(Defender::new(archetype, position))
    }

    /// Spawns a resting enemy at `position`.
    pub fn spawn_enemy(&mut self, tier: EnemyTier, position: Vec2) -> EnemyId {
        self.enemies.insert(Enemy::new(tier, position))
    }

    /// Spawns a projectile.
    pub fn spawn_projectile(&mut self, projectile: Projectile) -> ProjectileId {
        self.projectiles.insert(projectile)
    }

    /// Despawns an entity of any kind.
    ///
    /// Returns true if the entity was live.
    pub fn despawn(&mut self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Defender(id) => self.defenders.remove(id).is_some(),
            EntityRef::Enemy(id) => self.enemies.remove(id).is_some(),
            EntityRef::Projectile(id) => self.projectiles.remove(id).is_some(),
        }
    }

    /// Returns true if the entity is live.
    #[must_use]
    pub fn contains(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Defender(id) => self.defenders.contains(id),
            EntityRef::Enemy(id) => self.enemies.contains(id),
            EntityRef::Projectile(id) => self.projectiles.contains(id),
        }
    }

    /// Returns the position of a live entity.
    #[must_use]
    pub fn position(&self, entity: EntityRef) -> Option<Vec2> {
        match entity {
            EntityRef::Defender(id) => self.defenders.get(id).map(|d| d.body.position),
            EntityRef::Enemy(id) => self.enemies.get(id).map(|e| e.body.position),
            EntityRef::Projectile(id) => self.projectiles.get(id).map(|p| p.body.position),
        }
    }

    /// Returns the motion state of a live entity mutably.
    #[must_use]
    pub fn body_mut(&mut self, entity: EntityRef) -> Option<&mut Body> {
        match entity {
            EntityRef::Defender(id) => self.defenders.get_mut(id).map(|d| &mut d.body),
            EntityRef::Enemy(id) => self.enemies.get_mut(id).map(|e| &mut e.body),
            EntityRef::Projectile(id) => self.projectiles.get_mut(id).map(|p| &mut p.body),
        }
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.defenders.clear();
        self.enemies.clear();
        self.projectiles.clear();
    }

    /// Returns the live defenders.
    #[must_use]
    pub fn defenders(&self) -> &EntitySet<Defender> {
        &self.defenders
    }

    /// Returns the live defenders mutably.
    #[must_use]
    pub fn defenders_mut(&mut self) -> &mut EntitySet<Defender> {
        &mut self.defenders
    }

    /// Returns the live enemies.
    #[must_use]
    pub fn enemies(&self) -> &EntitySet<Enemy> {
        &self.enemies
    }

    /// Returns the live projectiles.
    #[must_use]
    pub fn projectiles(&self) -> &EntitySet<Projectile> {
        &self.projectiles
    }

    /// Returns the live projectiles mutably.
    #[must_use]
    pub fn projectiles_mut(&mut self) -> &mut EntitySet<Projectile> {
        &mut self.projectiles
    }

    /// Returns the total number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.defenders.len() + self.enemies.len() + self.projectiles.len()
    }

    /// Returns true if the arena holds no entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
