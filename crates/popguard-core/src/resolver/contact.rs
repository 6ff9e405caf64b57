//! Projectile contact detection.
//!
//! Contacts are reported by a [`ContactDetector`]. The default
//! [`CircleContacts`] treats every entity as a circle and filters candidate
//! targets by collision [`Layers`], so projectiles never touch defenders or
//! each other.

use bitflags::bitflags;

use crate::arena::Arena;
use crate::entity::{EntityKind, EntityRef, ProjectileId};

bitflags! {
    /// Collision layers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Layers: u8 {
        /// Pool-spawned defenders.
        const DEFENDER = 1 << 0;
        /// Hostile units.
        const ENEMY = 1 << 1;
        /// Fired projectiles.
        const PROJECTILE = 1 << 2;
    }
}

impl Layers {
    /// Returns the layer entities of `kind` live on.
    #[must_use]
    pub const fn of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Defender => Self::DEFENDER,
            EntityKind::Enemy => Self::ENEMY,
            EntityKind::Projectile => Self::PROJECTILE,
        }
    }
}

/// A projectile touching a target this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// The projectile.
    pub projectile: ProjectileId,
    /// What it hit.
    pub target: EntityRef,
}

/// Reports projectile contacts over the current arena.
pub trait ContactDetector {
    /// Returns this tick's contacts.
    ///
    /// Each projectile appears at most once and each target at most once.
    fn detect(&self, arena: &Arena) -> Vec<Contact>;
}

/// Circle-overlap contact detection.
///
/// Projectiles are checked in spawn order against candidate targets in spawn
/// order. The first overlapping target that has not already been hit this
/// tick is taken.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleContacts {
    projectile_radius: f32,
    target_radius: f32,
    mask: Layers,
}

impl CircleContacts {
    /// Creates a detector.
    #[must_use]
    pub fn new(projectile_radius: f32, target_radius: f32, mask: Layers) -> Self {
        Self {
            projectile_radius,
            target_radius,
            mask,
        }
    }

    fn candidates(&self, arena: &Arena) -> Vec<(EntityRef, glam::Vec2)> {
        let defenders = arena
            .defenders()
            .iter()
            .map(|(id, d)| (EntityRef::Defender(id), d.body.position));
        let enemies = arena
            .enemies()
            .iter()
            .map(|(id, e)| (EntityRef::Enemy(id), e.body.position));
        defenders
            .chain(enemies)
            .filter(|(target, _)| self.mask.contains(Layers::of(target.kind())))
            .collect()
    }
}

impl Default for CircleContacts {
    fn default() -> Self {
        Self::new(0.25, 0.5, Layers::ENEMY)
    }
}

impl ContactDetector for CircleContacts {
    fn detect(&self, arena: &Arena) -> Vec<Contact> {
        let mut candidates = self.candidates(arena);
        let reach = self.projectile_radius + self.target_radius;
        let reach_squared = reach * reach;

        let mut contacts = Vec::new();
        for (projectile, state) in arena.projectiles().iter() {
            let hit = candidates.iter().position(|(_, position)| {
                state.body.position.distance_squared(*position) <= reach_squared
            });
            if let Some(index) = hit {
                let (target, _) = candidates.remove(index);
                contacts.push(Contact { projectile, target });
            }
        }
        contacts
    }
}
