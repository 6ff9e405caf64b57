//! Game configuration.
//!
//! Every tunable lives in [`GameConfig`]. Missing fields deserialize to their
//! defaults, so a config file only needs to name what it overrides:
//!
//! ```
//! use popguard_core::config::GameConfig;
//!
//! let config: GameConfig = serde_json::from_str(r#"{ "draft_slots": 4 }"#).unwrap();
//! assert_eq!(config.draft_slots, 4);
//! assert_eq!(config.play_threshold, 110);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::upgrade::{default_rules, UpgradeRule};

/// Tunables for a [`Game`](crate::game::Game).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of one logical tick in seconds, before time scaling.
    pub fixed_dt: f32,
    /// Spawn and round-clear cadence in scaled seconds.
    pub spawn_interval: f32,
    /// Live defender count that ends the spawn phase.
    pub play_threshold: usize,
    /// Number of enemy tiers the scheduler can choose from.
    pub enemy_tier_count: u32,
    /// Choices shown in the upgrade draft.
    pub draft_slots: usize,
    /// Unscaled seconds before the shop auto-applies the first drafted rule.
    pub shop_timeout: f32,
    /// Length of the countdown fill shown by the draft UI.
    pub shop_countdown: f32,
    /// Lifetime of a fired projectile in scaled seconds.
    pub projectile_ttl: f32,
    /// Per-tick growth of the time scale during spawn and clear phases.
    pub phase_ramp: f32,
    /// Re-enter Init automatically after a loss.
    pub restart_on_game_over: bool,
    /// Radius around the centre inside which enemies can be targeted.
    pub engagement_radius: f32,
    /// Base radius of the enemy spawn circle; grows by one per five defenders.
    pub enemy_spawn_radius: f32,
    /// Radius of the disk defenders spawn in.
    pub defender_spawn_radius: f32,
    /// Radius enemies are pushed back to after touching a defender.
    pub relocation_radius: f32,
    /// Upgrade tree offered between rounds.
    pub upgrades: Vec<UpgradeRule>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 0.02,
            spawn_interval: 0.05,
            play_threshold: 110,
            enemy_tier_count: 6,
            draft_slots: 3,
            shop_timeout: 31.0,
            shop_countdown: 30.0,
            projectile_ttl: 10.0,
            phase_ramp: 1.001,
            restart_on_game_over: false,
            engagement_radius: 30.0,
            enemy_spawn_radius: 30.0,
            defender_spawn_radius: 0.2,
            relocation_radius: 30.0,
            upgrades: default_rules(),
        }
    }
}

impl GameConfig {
    /// Checks that the configuration can drive a game.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enemy_tier_count == 0 {
            return Err(ConfigError::ZeroEnemyTiers);
        }
        if self.draft_slots == 0 {
            return Err(ConfigError::NoDraftSlots);
        }
        if self.play_threshold == 0 {
            return Err(ConfigError::ZeroPlayThreshold);
        }

        for (field, value) in [
            ("fixed_dt", self.fixed_dt),
            ("spawn_interval", self.spawn_interval),
            ("shop_timeout", self.shop_timeout),
            ("shop_countdown", self.shop_countdown),
            ("projectile_ttl", self.projectile_ttl),
            ("engagement_radius", self.engagement_radius),
            ("enemy_spawn_radius", self.enemy_spawn_radius),
            ("defender_spawn_radius", self.defender_spawn_radius),
            ("relocation_radius", self.relocation_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if !(self.phase_ramp.is_finite() && self.phase_ramp >= 1.0) {
            return Err(ConfigError::PhaseRampBelowOne(self.phase_ramp));
        }

        for (index, rule) in self.upgrades.iter().enumerate() {
            if rule.threshold == 0 {
                return Err(ConfigError::ZeroThreshold { index });
            }
            if rule.prerequisite == rule.result {
                return Err(ConfigError::IdentityRule {
                    index,
                    archetype: rule.result,
                });
            }
        }

        Ok(())
    }
}
