//! Auto-targeting and firing.
//!
//! The `CombatResolver` runs once per PlayRound tick. It handles:
//! - Reload: defenders below full scale recover at their fire rate
//! - Targeting: the nearest in-range enemy not yet claimed this tick
//! - Firing: a volley of projectiles with angular spread
//!
//! # Claiming
//!
//! Enemies inside the engagement radius form the candidate set for the tick.
//! A defender that fires removes its target from the set, so an enemy is
//! engaged by at most one defender per tick. When the set is empty nobody
//! reloads or fires.

use glam::Vec2;
use rand::Rng;
use tracing::trace;

use crate::arena::Arena;
use crate::entity::{Archetype, DefenderId, EnemyId, Projectile, ProjectileId};

/// A projectile fired this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// The spawned projectile.
    pub id: ProjectileId,
    /// Defender that fired.
    pub source: DefenderId,
    /// Enemy aimed at.
    pub target: EnemyId,
    /// Archetype of the firing defender.
    pub tag: Archetype,
    /// Muzzle position.
    pub position: Vec2,
    /// Launch velocity.
    pub velocity: Vec2,
}

/// Resolver for reload, targeting and firing.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use popguard_core::arena::Arena;
/// use popguard_core::entity::{Archetype, EnemyTier};
/// use popguard_core::resolver::CombatResolver;
/// use rand::SeedableRng;
///
/// let mut arena = Arena::new();
/// arena.spawn_defender(Archetype::Sniper, Vec2::ZERO);
/// arena.spawn_enemy(EnemyTier::new(0), Vec2::new(15.0, 0.0));
///
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
/// let shots = CombatResolver::default().resolve(&mut arena, 0.02, &mut rng);
/// assert_eq!(shots.len(), 1);
/// assert_eq!(shots[0].velocity, Vec2::new(12.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CombatResolver {
    engagement_radius: f32,
    max_spread_degrees: f32,
    muzzle_offset: f32,
    projectile_ttl: f32,
}

impl CombatResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(engagement_radius: f32, projectile_ttl: f32) -> Self {
        Self {
            engagement_radius,
            max_spread_degrees: 5.0,
            muzzle_offset: 0.5,
            projectile_ttl,
        }
    }

    /// Returns the engagement radius around the arena centre.
    #[must_use]
    pub fn engagement_radius(&self) -> f32 {
        self.engagement_radius
    }

    /// Runs one combat tick: reloads cooldowns, fires volleys and spawns the
    /// projectiles into `arena`. Returns every projectile fired, in order.
    pub fn resolve<R: Rng + ?Sized>(&self, arena: &mut Arena, dt: f32, rng: &mut R) -> Vec<Shot> {
        let radius_squared = self.engagement_radius * self.engagement_radius;
        let mut in_range: Vec<(EnemyId, Vec2)> = arena
            .enemies()
            .iter()
            .map(|(id, enemy)| (id, enemy.body.position))
            .filter(|(_, position)| position.length_squared() <= radius_squared)
            .collect();

        if in_range.is_empty() {
            return Vec::new();
        }

        let mut volleys = Vec::new();
        for (id, defender) in arena.defenders_mut().iter_mut() {
            let Some(stats) = defender.archetype.combat_stats() else {
                continue;
            };

            if !defender.cooldown.is_ready() {
                defender.cooldown.recover(stats.fire_rate, dt);
                continue;
            }

            let origin = defender.body.position;
            let Some(index) = nearest(&in_range, origin, stats.range_squared()) else {
                continue;
            };
            let (target, target_position) = in_range.remove(index);

            defender.cooldown.trigger();
            let direction = (target_position - origin).normalize_or_zero();
            let muzzle = origin + direction * self.muzzle_offset;
            let spread = if defender.archetype.is_sniper() {
                0.0
            } else {
                self.max_spread_degrees
            };

            for _ in 0..stats.projectile_count {
                let angle = if spread > 0.0 {
                    rng.gen_range(-spread..=spread)
                } else {
                    0.0
                };
                let velocity =
                    Vec2::from_angle(angle.to_radians()).rotate(direction) * stats.projectile_speed;
                volleys.push((id, target, defender.archetype, muzzle, velocity));
            }
            trace!(defender = %id, enemy = %target, archetype = %defender.archetype, "volley");
        }

        volleys
            .into_iter()
            .map(|(source, target, tag, position, velocity)| {
                let id = arena.spawn_projectile(Projectile::new(
                    tag,
                    position,
                    velocity,
                    self.projectile_ttl,
                ));
                Shot {
                    id,
                    source,
                    target,
                    tag,
                    position,
                    velocity,
                }
            })
            .collect()
    }
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(30.0, 10.0)
    }
}

/// Index of the nearest candidate within `range_squared`; the first wins ties.
fn nearest(candidates: &[(EnemyId, Vec2)], origin: Vec2, range_squared: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, (_, position)) in candidates.iter().enumerate() {
        let distance_squared = origin.distance_squared(*position);
        if distance_squared > range_squared {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance_squared < closest) {
            best = Some((index, distance_squared));
        }
    }
    best.map(|(index, _)| index)
}
