//! Procedural spawning during StartRound.
//!
//! Every spawn tick produces exactly one defender, drawn from the pool, and
//! at most one enemy whose tier depends on the wave level. Waves come in
//! cycles of five levels: each cycle raises the starting tier, and within a
//! cycle the odds of base-tier and next-tier enemies climb until the fifth
//! level, which ends in a boss once the field holds 100 defenders.
//!
//! Random numbers are drawn lazily: a rule whose cheap conditions already
//! fail draws nothing, so the consumed sequence depends on the branch taken.

use glam::Vec2;
use rand::Rng;
use tracing::trace;

use super::{point_in_disk, point_on_circle};
use crate::entity::{Archetype, EnemyTier};
use crate::pool::EntityPool;

/// Tier selection inputs derived from the wave level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParameters {
    /// Wave level; negative for the warm-up round.
    pub level: i32,
    /// Base tier of the current five-level cycle.
    pub start_index: u32,
    /// Chance of a base-tier enemy.
    pub base_amount: f32,
    /// Chance of a next-tier enemy.
    pub second_amount: f32,
}

/// What to spawn on one spawn tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    /// Archetype of the defender to spawn.
    pub defender: Archetype,
    /// Spawn position of the defender.
    pub defender_position: Vec2,
    /// Tier and position of the enemy, if one spawns.
    pub enemy: Option<(EnemyTier, Vec2)>,
}

/// Decides what spawns each spawn tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnScheduler {
    tier_count: u32,
    enemy_spawn_radius: f32,
    defender_spawn_radius: f32,
}

impl SpawnScheduler {
    /// Defender count at which the boss of a cycle appears.
    pub const BOSS_DEFENDER_COUNT: usize = 100;
    /// Warm-up enemies only spawn below this defender count.
    pub const WARM_UP_LIMIT: usize = 12;

    /// Creates a scheduler over `tier_count` enemy tiers.
    #[must_use]
    pub fn new(tier_count: u32, enemy_spawn_radius: f32, defender_spawn_radius: f32) -> Self {
        Self {
            tier_count,
            enemy_spawn_radius,
            defender_spawn_radius,
        }
    }

    /// Returns the number of enemy tiers.
    #[must_use]
    pub fn tier_count(&self) -> u32 {
        self.tier_count
    }

    /// Derives the tier selection inputs for `level`.
    ///
    /// ```
    /// use popguard_core::resolver::SpawnScheduler;
    ///
    /// let scheduler = SpawnScheduler::new(6, 30.0, 0.2);
    /// let wave = scheduler.parameters(7);
    /// assert_eq!(wave.start_index, 1);
    /// assert!((wave.base_amount - 0.6).abs() < 1e-6);
    /// assert!((wave.second_amount - 0.2).abs() < 1e-6);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn parameters(&self, level: i32) -> WaveParameters {
        let cycle = level / 5;
        let phase = level % 5;
        let start_index = u32::try_from(cycle)
            .unwrap_or(0)
            .min(self.tier_count.saturating_sub(1));

        WaveParameters {
            level,
            start_index,
            base_amount: phase as f32 * 0.2 + 0.2,
            second_amount: (phase / 2) as f32 * 0.2,
        }
    }

    /// Picks the enemy tier for this spawn tick, if any.
    ///
    /// Rules are tried in order and the first match wins:
    /// 1. warm-up (negative level): tier 0 on every third defender below 12
    /// 2. boss: last level of a cycle with 100 defenders, two tiers up
    /// 3. next tier with probability `second_amount`
    /// 4. base tier for the very first defender, or with probability `base_amount`
    /// 5. from level 5 on, one tier down
    pub fn decide_enemy<R: Rng + ?Sized>(
        &self,
        wave: &WaveParameters,
        defenders: usize,
        rng: &mut R,
    ) -> Option<EnemyTier> {
        let start = wave.start_index;

        if wave.level < 0 {
            return (defenders % 3 == 0 && defenders < Self::WARM_UP_LIMIT)
                .then_some(EnemyTier::new(0));
        }
        if wave.level % 5 == 4
            && start + 2 < self.tier_count
            && defenders == Self::BOSS_DEFENDER_COUNT
        {
            return Some(EnemyTier::new(start + 2));
        }
        if start + 1 < self.tier_count && rng.gen::<f32>() <= wave.second_amount {
            return Some(EnemyTier::new(start + 1));
        }
        if defenders == 1 || rng.gen::<f32>() <= wave.base_amount {
            return Some(EnemyTier::new(start));
        }
        if wave.level >= 5 {
            return start.checked_sub(1).map(EnemyTier::new);
        }
        None
    }

    /// Plans one spawn tick.
    ///
    /// `defenders` is the live defender count before this tick's spawn. The
    /// enemy is placed on a circle that widens by one unit per five defenders.
    #[allow(clippy::cast_precision_loss)]
    pub fn tick<R: Rng + ?Sized>(
        &self,
        level: i32,
        defenders: usize,
        pool: &EntityPool,
        rng: &mut R,
    ) -> SpawnPlan {
        let wave = self.parameters(level);
        let enemy = self.decide_enemy(&wave, defenders, rng).map(|tier| {
            let radius = self.enemy_spawn_radius + defenders as f32 / 5.0;
            (tier, point_on_circle(rng, radius))
        });

        let defender = pool.draw(rng);
        let defender_position = point_in_disk(rng, self.defender_spawn_radius);
        trace!(level, defenders, %defender, enemy = ?enemy.map(|(tier, _)| tier.index()), "spawn tick");

        SpawnPlan {
            defender,
            defender_position,
            enemy,
        }
    }
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new(6, 30.0, 0.2)
    }
}
