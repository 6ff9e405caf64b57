//! Entity types for the round simulation.
//!
//! This module provides:
//! - [`Archetype`]: the defender roles and their combat table
//! - [`Defender`], [`Enemy`], [`Projectile`]: per-kind component storage
//! - [`Handle`]: typed, never-reused identifiers for stored entities
//! - [`EntityRef`]: a handle of any kind, used in events and contacts
//!
//! # Handles
//!
//! Handles carry a serial number assigned on insertion. Serials are never
//! reused within a collection, so a handle to a destroyed entity stays invalid
//! forever instead of silently aliasing a newer entity.
//!
//! # Example
//!
//! ```
//! use popguard_core::arena::Arena;
//! use popguard_core::entity::{Archetype, EntityRef};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let id = arena.spawn_defender(Archetype::Shooter, Vec2::ZERO);
//!
//! assert!(arena.contains(EntityRef::Defender(id)));
//! arena.despawn(EntityRef::Defender(id));
//! assert!(arena.defenders().get(id).is_none());
//! ```

mod archetype;
pub mod components;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub use archetype::{strip_label, Archetype, CombatStats};
pub use components::{Body, Cooldown, Defender, Enemy, EnemyTier, Projectile};

/// Typed identifier for an entity stored in an [`EntitySet`](crate::arena::EntitySet).
///
/// The type parameter ties a handle to the collection it came from, so a
/// defender handle cannot be used to look up an enemy.
pub struct Handle<T> {
    serial: u64,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Creates a handle from a raw serial.
    #[must_use]
    pub const fn new(serial: u64) -> Self {
        Self {
            serial,
            _kind: PhantomData,
        }
    }

    /// Returns the raw serial of this handle.
    #[must_use]
    pub const fn serial(self) -> u64 {
        self.serial
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serial.cmp(&other.serial)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.serial)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serial)
    }
}

/// Handle to a live defender.
pub type DefenderId = Handle<Defender>;
/// Handle to a live enemy.
pub type EnemyId = Handle<Enemy>;
/// Handle to a live projectile.
pub type ProjectileId = Handle<Projectile>;

/// Entity kind classification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Pool-spawned defender.
    Defender,
    /// Hostile unit.
    Enemy,
    /// In-flight projectile.
    Projectile,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defender => write!(f, "Defender"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

/// A handle to an entity of any kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A defender handle.
    Defender(DefenderId),
    /// An enemy handle.
    Enemy(EnemyId),
    /// A projectile handle.
    Projectile(ProjectileId),
}

impl EntityRef {
    /// Returns the kind of entity this handle refers to.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Defender(_) => EntityKind::Defender,
            Self::Enemy(_) => EntityKind::Enemy,
            Self::Projectile(_) => EntityKind::Projectile,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defender(id) => write!(f, "defender:{id}"),
            Self::Enemy(id) => write!(f, "enemy:{id}"),
            Self::Projectile(id) => write!(f, "projectile:{id}"),
        }
    }
}
