//! Defender archetypes and their combat stats.
//!
//! Every defender is spawned from a pool slot holding an [`Archetype`]. The
//! archetype decides whether the defender fires at all, and if so with which
//! range, fire rate, projectile speed and volley size.
//!
//! Two archetypes are deliberately absent from the combat table:
//! - [`Archetype::Bubble`]: the neutral filler that makes up most of the pool
//! - [`Archetype::Spike`]: never fires, but destroys any enemy it touches
//!
//! Looking up stats for either returns `None`, and callers treat that as an
//! inert defender rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named role of a defender.
///
/// The variant name doubles as the archetype's display and tag name, so
/// name-based rules (for example "contains `Sniper`") are evaluated against
/// [`Archetype::name`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Neutral, unarmed filler.
    Bubble,
    /// Base combat archetype.
    Shooter,
    /// Shooter with doubled fire rate.
    RapidShooter,
    /// Shooter with quadrupled fire rate.
    RapiderShooter,
    /// Shooter with eight times the base fire rate.
    RapidestShooter,
    /// Fires two projectiles per volley.
    DoubleShooter,
    /// Fires five projectiles per volley.
    QuintupleShooter,
    /// Long range, slow firing, no spread.
    Sniper,
    /// Sniper firing three projectiles per volley.
    Sniperer,
    /// Sniper firing five projectiles per volley.
    Sniperest,
    /// Contact killer: destroys the enemy it collides with.
    Spike,
}

impl Archetype {
    /// Every archetype, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Bubble,
        Self::Shooter,
        Self::RapidShooter,
        Self::RapiderShooter,
        Self::RapidestShooter,
        Self::DoubleShooter,
        Self::QuintupleShooter,
        Self::Sniper,
        Self::Sniperer,
        Self::Sniperest,
        Self::Spike,
    ];

    /// The neutral archetype that fills the pool by default.
    pub const BASE_NEUTRAL: Self = Self::Bubble;

    /// The combat archetype the pool starts with.
    pub const BASE_COMBAT: Self = Self::Shooter;

    /// Returns the tag name of this archetype.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bubble => "Bubble",
            Self::Shooter => "Shooter",
            Self::RapidShooter => "RapidShooter",
            Self::RapiderShooter => "RapiderShooter",
            Self::RapidestShooter => "RapidestShooter",
            Self::DoubleShooter => "DoubleShooter",
            Self::QuintupleShooter => "QuintupleShooter",
            Self::Sniper => "Sniper",
            Self::Sniperer => "Sniperer",
            Self::Sniperest => "Sniperest",
            Self::Spike => "Spike",
        }
    }

    /// Returns true for the sniper family, which fires without spread.
    #[must_use]
    pub fn is_sniper(self) -> bool {
        self.name().contains("Sniper")
    }

    /// Returns true for archetypes that destroy enemies on contact.
    #[must_use]
    pub fn is_spike(self) -> bool {
        self.name().contains("Spike")
    }

    /// Returns the combat stats for this archetype, or `None` if it never fires.
    ///
    /// # Example
    ///
    /// ```
    /// use popguard_core::entity::Archetype;
    ///
    /// assert!(Archetype::Bubble.combat_stats().is_none());
    /// let sniper = Archetype::Sniper.combat_stats().unwrap();
    /// assert_eq!(sniper.range, 20.0);
    /// ```
    #[must_use]
    pub const fn combat_stats(self) -> Option<CombatStats> {
        let stats = match self {
            Self::Shooter => CombatStats::new(10.0, 0.25, 5.0, 1),
            Self::RapidShooter => CombatStats::new(10.0, 0.5, 5.0, 1),
            Self::RapiderShooter => CombatStats::new(10.0, 1.0, 5.0, 1),
            Self::RapidestShooter => CombatStats::new(10.0, 2.0, 5.0, 1),
            Self::DoubleShooter => CombatStats::new(10.0, 0.5, 5.0, 2),
            Self::QuintupleShooter => CombatStats::new(10.0, 0.5, 5.0, 5),
            Self::Sniper => CombatStats::new(20.0, 0.1, 12.0, 1),
            Self::Sniperer => CombatStats::new(20.0, 0.1, 12.0, 3),
            Self::Sniperest => CombatStats::new(20.0, 0.1, 12.0, 5),
            Self::Bubble | Self::Spike => return None,
        };
        Some(stats)
    }

    /// Returns the name shown to players: the tag with digits and whitespace removed.
    #[must_use]
    pub fn display_name(self) -> String {
        strip_label(self.name())
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Removes digits and whitespace from a tag name.
///
/// Asset tags often carry variant suffixes such as `"Shooter 2"`; the draft UI
/// shows the bare name.
///
/// ```
/// use popguard_core::entity::strip_label;
///
/// assert_eq!(strip_label("Rapid Shooter 2"), "RapidShooter");
/// ```
#[must_use]
pub fn strip_label(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_ascii_digit() && !c.is_whitespace())
        .collect()
}

/// Firing characteristics of an armed archetype.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Maximum engagement distance.
    pub range: f32,
    /// Reload progress per simulated second, in normalized cooldown units.
    pub fire_rate: f32,
    /// Projectile speed in units per second.
    pub projectile_speed: f32,
    /// Projectiles spawned per volley.
    pub projectile_count: u32,
}

impl CombatStats {
    /// Creates a stats entry.
    #[must_use]
    pub const fn new(range: f32, fire_rate: f32, projectile_speed: f32, projectile_count: u32) -> Self {
        Self {
            range,
            fire_rate,
            projectile_speed,
            projectile_count,
        }
    }

    /// Squared engagement range.
    #[must_use]
    pub fn range_squared(&self) -> f32 {
        self.range * self.range
    }
}
