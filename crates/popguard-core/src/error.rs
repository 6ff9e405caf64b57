//! Error types for configuration and draft resolution.

use thiserror::Error;

/// A [`GameConfig`](crate::config::GameConfig) that cannot drive a game.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The spawn scheduler needs at least one enemy tier.
    #[error("enemy_tier_count must be at least 1")]
    ZeroEnemyTiers,
    /// A duration or distance that must be strictly positive is not.
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value found.
        value: f32,
    },
    /// The draft must show at least one choice.
    #[error("draft_slots must be at least 1")]
    NoDraftSlots,
    /// The spawn phase would never end.
    #[error("play_threshold must be at least 1")]
    ZeroPlayThreshold,
    /// An upgrade rule converts nothing.
    #[error("upgrade rule {index} has a zero threshold")]
    ZeroThreshold {
        /// Position of the rule in the configured list.
        index: usize,
    },
    /// An upgrade rule converts an archetype into itself.
    #[error("upgrade rule {index} converts {archetype} into itself")]
    IdentityRule {
        /// Position of the rule in the configured list.
        index: usize,
        /// The archetype named on both sides.
        archetype: crate::entity::Archetype,
    },
    /// The phase ramp would slow phases down.
    #[error("phase_ramp must be at least 1.0, got {0}")]
    PhaseRampBelowOne(f32),
}

/// Failure to resolve the upgrade draft. State is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    /// No draft is on offer, or it was already resolved.
    #[error("no upgrade draft is pending")]
    NoPendingDraft,
    /// The index does not name a visible choice.
    #[error("draft choice {index} out of range ({available} available)")]
    ChoiceOutOfRange {
        /// Requested choice.
        index: usize,
        /// Number of visible choices.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = ConfigError::NonPositive {
            field: "fixed_dt",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "fixed_dt must be positive and finite, got 0");

        let err = DraftError::ChoiceOutOfRange {
            index: 4,
            available: 3,
        };
        assert_eq!(err.to_string(), "draft choice 4 out of range (3 available)");
    }
}
