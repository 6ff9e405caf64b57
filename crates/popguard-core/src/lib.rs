//! # Popguard Core
//!
//! Round and combat simulation core for the Popguard arena-defense game.
//!
//! Defenders spawn from a weighted pool at the arena centre, enemies ring in
//! from the edge, and the round state machine cycles through spawning,
//! fighting, clearing and an upgrade draft that rewrites the pool. Rendering,
//! audio and UI stay outside the crate behind the [`collab`] traits.
//!
//! ## Architecture
//!
//! - **Entities**: defenders, enemies and projectiles in an [`arena::Arena`]
//! - **Resolvers**: spawning, combat, force and contact passes in [`resolver`]
//! - **State machine**: [`game::Game`] drives the phases in fixed ticks
//!
//! ## Usage
//!
//! ```
//! use popguard_core::{Game, GameConfig, RoundState};
//!
//! let mut game = Game::new(GameConfig::default(), 42).unwrap();
//! for _ in 0..200 {
//!     game.step();
//! }
//! assert_ne!(game.phase(), RoundState::Init);
//! assert!(!game.arena().defenders().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod collab;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod game;
pub mod pool;
pub mod resolver;
pub mod round;
pub mod upgrade;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use collab::{AudioSink, Collaborators, DraftUi, SceneSink};
pub use config::GameConfig;
pub use entity::{Archetype, EntityRef};
pub use error::{ConfigError, DraftError};
pub use event::{DestroyCause, GameEvent};
pub use game::{Game, GameSnapshot};
pub use pool::EntityPool;
pub use round::{RoundState, TimeScale};
pub use upgrade::{DraftChoice, UpgradeRule, UpgradeSelector};
