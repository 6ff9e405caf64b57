//! Round phases and the player time scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The active phase of the round state machine.
///
/// Exactly one phase is active at a time. Phases are stored by name in
/// external state (UI, save slots of host applications), and an unknown name
/// heals to [`RoundState::Init`] instead of failing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// Reset pool, arena and level.
    #[default]
    Init,
    /// Defenders and enemies are spawning.
    StartRound,
    /// Defenders engage the enemies on field.
    PlayRound,
    /// Enemies are gone; defenders are being cleared.
    RoundWin,
    /// Upgrade draft on offer.
    Shop,
    /// Every defender was destroyed.
    GameOver,
}

impl RoundState {
    /// Every phase, in cycle order.
    pub const ALL: [Self; 6] = [
        Self::Init,
        Self::StartRound,
        Self::PlayRound,
        Self::RoundWin,
        Self::Shop,
        Self::GameOver,
    ];

    /// Returns the phase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::StartRound => "StartRound",
            Self::PlayRound => "PlayRound",
            Self::RoundWin => "RoundWin",
            Self::Shop => "Shop",
            Self::GameOver => "GameOver",
        }
    }

    /// Parses a phase name, falling back to [`RoundState::Init`].
    ///
    /// ```
    /// use popguard_core::round::RoundState;
    ///
    /// assert_eq!(RoundState::from_name_or_init("Shop"), RoundState::Shop);
    /// assert_eq!(RoundState::from_name_or_init("Intermission"), RoundState::Init);
    /// ```
    #[must_use]
    pub fn from_name_or_init(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Returns true while the user time scale applies to this phase.
    #[must_use]
    pub const fn is_scaled(self) -> bool {
        matches!(self, Self::StartRound | Self::PlayRound | Self::RoundWin)
    }

    /// Returns true for phases whose time scale ramps up every tick.
    #[must_use]
    pub const fn is_ramped(self) -> bool {
        matches!(self, Self::StartRound | Self::RoundWin)
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown phase name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown round state `{0}`")]
pub struct UnknownRoundState(pub String);

impl FromStr for RoundState {
    type Err = UnknownRoundState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.name() == s)
            .ok_or_else(|| UnknownRoundState(s.to_owned()))
    }
}

/// Player-selected simulation speed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    /// Real time.
    #[default]
    X1,
    /// Double speed.
    X2,
    /// Quadruple speed.
    X4,
}

impl TimeScale {
    /// Returns the delta multiplier.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::X1 => 1.0,
            Self::X2 => 2.0,
            Self::X4 => 4.0,
        }
    }

    /// Maps a multiplier to a time scale, if it is one of 1, 2 or 4.
    #[must_use]
    pub fn from_factor(factor: u32) -> Option<Self> {
        match factor {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            4 => Some(Self::X4),
            _ => None,
        }
    }
}
