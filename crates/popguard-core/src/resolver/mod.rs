//! Per-tick resolvers for the round simulation.
//!
//! Each resolver owns one concern and is driven by the round state machine in
//! [`Game::step`](crate::game::Game::step):
//!
//! - [`SpawnScheduler`]: defender and enemy spawns during StartRound
//! - [`CombatResolver`]: reload, targeting and firing during PlayRound
//! - [`ForceSimulator`]: pairwise and centering forces, contact destruction
//! - [`Integrator`]: turns forces into motion ([`EulerIntegrator`] by default)
//! - [`ContactDetector`]: projectile hits ([`CircleContacts`] by default)
//!
//! # Invariants
//!
//! - Resolvers MUST iterate entities in spawn order
//! - Resolvers MUST draw random numbers only from the RNG they are handed,
//!   in a fixed order, so a seeded game replays exactly

mod combat;
mod contact;
mod force;
mod integrate;
mod spawn;

pub use combat::{CombatResolver, Shot};
pub use contact::{CircleContacts, Contact, ContactDetector, Layers};
pub use force::{FieldEntity, FieldRole, ForceField, ForceSimulator};
pub use integrate::{EulerIntegrator, Integrator};
pub use spawn::{SpawnPlan, SpawnScheduler, WaveParameters};

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

/// Samples a uniformly random point on the circle of radius `radius`.
pub(crate) fn point_on_circle<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU)) * radius
}

/// Samples a uniformly random point inside the disk of radius `radius`.
pub(crate) fn point_in_disk<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    let distance = radius * rng.gen::<f32>().sqrt();
    Vec2::from_angle(angle) * distance
}
