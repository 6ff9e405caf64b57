//! Upgrade rules, eligibility and the between-round draft.
//!
//! An [`UpgradeRule`] converts `threshold` pool slots of one archetype into
//! another. After each won round the [`UpgradeSelector`] finds every rule the
//! current pool can afford, shuffles them, and the first few are offered to
//! the player as a [`PendingDraft`].
//!
//! # Bootstrapping
//!
//! Rules that consume Bubbles would become unreachable once the pool has no
//! Bubbles left. For such rules (unless they produce the base Shooter) the
//! selector substitutes Shooter as the prerequisite, so late-game pools can
//! still branch into new archetypes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::Archetype;
use crate::pool::EntityPool;

/// A conversion offer: `threshold` slots of `prerequisite` become `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeRule {
    /// Slots required to be eligible, and slots converted when applied.
    pub threshold: usize,
    /// Archetype consumed.
    pub prerequisite: Archetype,
    /// Archetype produced.
    pub result: Archetype,
}

impl UpgradeRule {
    /// Creates a rule.
    #[must_use]
    pub const fn new(threshold: usize, prerequisite: Archetype, result: Archetype) -> Self {
        Self {
            threshold,
            prerequisite,
            result,
        }
    }

    /// Returns the draft button text for this rule.
    ///
    /// ```
    /// use popguard_core::entity::Archetype;
    /// use popguard_core::upgrade::UpgradeRule;
    ///
    /// let rule = UpgradeRule::new(10, Archetype::Bubble, Archetype::Sniper);
    /// assert_eq!(rule.label(), "Convert\n10% Bubble\nto\n10% Sniper");
    /// ```
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "Convert\n{n}% {from}\nto\n{n}% {to}",
            n = self.threshold,
            from = self.prerequisite.display_name(),
            to = self.result.display_name(),
        )
    }

    /// Applies the rule to `pool`, returning the number of slots converted.
    pub fn apply(&self, pool: &mut EntityPool) -> usize {
        pool.convert(self.prerequisite, self.result, self.threshold)
    }
}

/// The default upgrade tree.
#[must_use]
pub fn default_rules() -> Vec<UpgradeRule> {
    use Archetype::{
        Bubble, DoubleShooter, QuintupleShooter, RapidShooter, RapiderShooter, RapidestShooter,
        Shooter, Sniper, Sniperer, Sniperest, Spike,
    };

    vec![
        UpgradeRule::new(10, Bubble, Shooter),
        UpgradeRule::new(10, Shooter, RapidShooter),
        UpgradeRule::new(10, RapidShooter, RapiderShooter),
        UpgradeRule::new(10, RapiderShooter, RapidestShooter),
        UpgradeRule::new(10, Shooter, DoubleShooter),
        UpgradeRule::new(10, DoubleShooter, QuintupleShooter),
        UpgradeRule::new(10, Bubble, Sniper),
        UpgradeRule::new(5, Sniper, Sniperer),
        UpgradeRule::new(5, Sniperer, Sniperest),
        UpgradeRule::new(10, Bubble, Spike),
    ]
}

// =============================================================================
// Selector
// =============================================================================

/// Derives the affordable upgrade rules from the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeSelector {
    rules: Vec<UpgradeRule>,
}

impl UpgradeSelector {
    /// Creates a selector over the given rule set.
    #[must_use]
    pub fn new(rules: Vec<UpgradeRule>) -> Self {
        Self { rules }
    }

    /// Returns the configured rules.
    #[must_use]
    pub fn rules(&self) -> &[UpgradeRule] {
        &self.rules
    }

    /// Returns every affordable rule in configuration order.
    ///
    /// Returned rules carry their *effective* prerequisite, i.e. after the
    /// bootstrap substitution, so applying them converts what was counted.
    #[must_use]
    pub fn eligible(&self, pool: &EntityPool) -> Vec<UpgradeRule> {
        let counts = pool.counts();
        let count_of = |archetype: Archetype| counts.get(&archetype).copied().unwrap_or(0);

        self.rules
            .iter()
            .filter_map(|rule| {
                let mut effective = *rule;
                let mut count = count_of(rule.prerequisite);
                if rule.prerequisite == Archetype::BASE_NEUTRAL
                    && count == 0
                    && rule.result != Archetype::BASE_COMBAT
                {
                    effective.prerequisite = Archetype::BASE_COMBAT;
                    count = count_of(Archetype::BASE_COMBAT);
                }
                (count >= effective.threshold).then_some(effective)
            })
            .collect()
    }

    /// Returns every affordable rule in uniformly random order.
    pub fn select<R: Rng + ?Sized>(&self, pool: &EntityPool, rng: &mut R) -> Vec<UpgradeRule> {
        let mut rules = self.eligible(pool);
        rules.shuffle(rng);
        rules
    }
}

// =============================================================================
// Draft
// =============================================================================

/// One visible draft option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftChoice {
    /// Index to pass to [`Game::resolve_draft`](crate::game::Game::resolve_draft).
    pub index: usize,
    /// The rule applied when chosen.
    pub rule: UpgradeRule,
    /// Button text.
    pub label: String,
}

/// The shuffled eligible rules awaiting a player decision.
///
/// Only the first `slots` rules are visible; the first rule is the one
/// applied automatically when the shop times out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDraft {
    rules: Vec<UpgradeRule>,
    slots: usize,
}

impl PendingDraft {
    /// Creates a draft, or `None` if no rule is eligible.
    #[must_use]
    pub fn new(rules: Vec<UpgradeRule>, slots: usize) -> Option<Self> {
        if rules.is_empty() {
            None
        } else {
            Some(Self { rules, slots })
        }
    }

    /// Returns all drafted rules in shuffled order, visible or not.
    #[must_use]
    pub fn rules(&self) -> &[UpgradeRule] {
        &self.rules
    }

    /// Returns the number of choices shown to the player.
    #[must_use]
    pub fn visible(&self) -> usize {
        self.rules.len().min(self.slots)
    }

    /// Returns the visible choice at `index`.
    #[must_use]
    pub fn choice(&self, index: usize) -> Option<UpgradeRule> {
        if index < self.visible() {
            self.rules.get(index).copied()
        } else {
            None
        }
    }

    /// Returns the rule applied on timeout.
    #[must_use]
    pub fn fallback(&self) -> UpgradeRule {
        self.rules[0]
    }

    /// Builds the visible choices for the draft UI.
    #[must_use]
    pub fn choices(&self) -> Vec<DraftChoice> {
        self.rules
            .iter()
            .take(self.visible())
            .enumerate()
            .map(|(index, rule)| DraftChoice {
                index,
                rule: *rule,
                label: rule.label(),
            })
            .collect()
    }
}
