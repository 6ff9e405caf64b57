//! Component structs for the three on-field entity kinds.
//!
//! The component structs hold all state for a particular entity kind. Motion
//! state lives in [`Body`], which is what the force pass reads and the
//! integrator writes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Archetype;

// =============================================================================
// Shared State
// =============================================================================

/// Position and velocity of an on-field entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position; the arena centre is the origin.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
}

impl Body {
    /// Creates a resting body at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    /// Creates a body at `position` moving with `velocity`.
    #[must_use]
    pub const fn moving(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }
}

/// Firing readiness of a defender, expressed as a visual scale.
///
/// A scale of `1.0` means ready. Firing drops it to `0.75`, after which it
/// recovers linearly in normalized units at the archetype's fire rate. The
/// value never leaves `[0.75, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown(f32);

impl Cooldown {
    /// Scale right after firing.
    pub const MIN: f32 = 0.75;
    /// Scale when ready to fire.
    pub const READY: f32 = 1.0;

    /// A cooldown that is ready to fire.
    #[must_use]
    pub const fn ready() -> Self {
        Self(Self::READY)
    }

    /// A cooldown that has just fired.
    #[must_use]
    pub const fn spent() -> Self {
        Self(Self::MIN)
    }

    /// Creates a cooldown from a raw scale, clamped into range.
    #[must_use]
    pub fn from_scale(scale: f32) -> Self {
        Self(scale.clamp(Self::MIN, Self::READY))
    }

    /// Returns the current scale.
    #[must_use]
    pub const fn scale(self) -> f32 {
        self.0
    }

    /// Returns true if the defender may fire this tick.
    #[must_use]
    pub fn is_ready(self) -> bool {
        self.0 >= Self::READY
    }

    /// Starts a reload.
    pub fn trigger(&mut self) {
        self.0 = Self::MIN;
    }

    /// Advances the reload by `fire_rate * dt` normalized units.
    ///
    /// ```
    /// use popguard_core::entity::Cooldown;
    ///
    /// let mut cooldown = Cooldown::spent();
    /// cooldown.recover(0.5, 1.0);
    /// assert!((cooldown.scale() - 0.875).abs() < 1e-6);
    /// cooldown.recover(0.5, 10.0);
    /// assert!(cooldown.is_ready());
    /// ```
    pub fn recover(&mut self, fire_rate: f32, dt: f32) {
        let progress = (self.0 - Self::MIN) / (Self::READY - Self::MIN) + dt * fire_rate;
        let t = progress.clamp(0.0, 1.0);
        self.0 = Self::MIN + (Self::READY - Self::MIN) * t;
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::ready()
    }
}

// =============================================================================
// Entity Components
// =============================================================================

/// A defender spawned from a pool slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defender {
    /// Role inherited from the pool slot.
    pub archetype: Archetype,
    /// Motion state.
    pub body: Body,
    /// Firing readiness.
    pub cooldown: Cooldown,
}

impl Defender {
    /// Creates a ready defender at rest.
    #[must_use]
    pub fn new(archetype: Archetype, position: Vec2) -> Self {
        Self {
            archetype,
            body: Body::at(position),
            cooldown: Cooldown::ready(),
        }
    }
}

/// Index into the configured enemy tier list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyTier(u32);

impl EnemyTier {
    /// Creates a tier from its index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the tier index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A hostile unit drifting toward the arena centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Difficulty tier.
    pub tier: EnemyTier,
    /// Motion state.
    pub body: Body,
}

impl Enemy {
    /// Creates an enemy at rest.
    #[must_use]
    pub fn new(tier: EnemyTier, position: Vec2) -> Self {
        Self {
            tier,
            body: Body::at(position),
        }
    }
}

/// A projectile fired by a defender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Archetype of the defender that fired it.
    pub tag: Archetype,
    /// Motion state; projectiles fly ballistically.
    pub body: Body,
    /// Remaining lifetime in simulated seconds.
    pub time_to_live: f32,
}

impl Projectile {
    /// Creates a projectile.
    #[must_use]
    pub fn new(tag: Archetype, position: Vec2, velocity: Vec2, time_to_live: f32) -> Self {
        Self {
            tag,
            body: Body::moving(position, velocity),
            time_to_live,
        }
    }

    /// Returns true once the lifetime has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.time_to_live <= 0.0
    }
}
