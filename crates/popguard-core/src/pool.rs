//! The defender pool: 100 archetype slots.
//!
//! Each defender spawn draws a uniformly random slot and uses its archetype,
//! so the pool's composition is the player's army composition. The pool is
//! only ever changed by upgrade conversion, which rewrites the first matching
//! slots in index order.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::Archetype;

/// Number of slots in the pool.
pub const POOL_SIZE: usize = 100;

/// Number of leading slots that start as the base combat archetype.
pub const STARTING_COMBAT_SLOTS: usize = 10;

/// Fixed-size archetype assignment for defender spawns.
///
/// The backing array makes the slot count a type-level invariant.
///
/// # Example
///
/// ```
/// use popguard_core::entity::Archetype;
/// use popguard_core::pool::EntityPool;
///
/// let mut pool = EntityPool::new();
/// assert_eq!(pool.count_of(Archetype::Shooter), 10);
///
/// let converted = pool.convert(Archetype::Bubble, Archetype::Sniper, 5);
/// assert_eq!(converted, 5);
/// assert_eq!(pool.archetype_at(10), Some(Archetype::Sniper));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPool {
    #[serde(with = "slot_array")]
    slots: [Archetype; POOL_SIZE],
}

impl EntityPool {
    /// Creates a pool in the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Self::default_layout(),
        }
    }

    fn default_layout() -> [Archetype; POOL_SIZE] {
        std::array::from_fn(|slot| {
            if slot < STARTING_COMBAT_SLOTS {
                Archetype::BASE_COMBAT
            } else {
                Archetype::BASE_NEUTRAL
            }
        })
    }

    /// Restores the default layout: 10 Shooters followed by 90 Bubbles.
    pub fn reset(&mut self) {
        self.slots = Self::default_layout();
    }

    /// Returns the archetype in `slot`, or `None` if out of range.
    #[must_use]
    pub fn archetype_at(&self, slot: usize) -> Option<Archetype> {
        self.slots.get(slot).copied()
    }

    /// Returns all slots in index order.
    #[must_use]
    pub fn slots(&self) -> &[Archetype] {
        &self.slots
    }

    /// Returns the number of slots (always [`POOL_SIZE`]).
    #[must_use]
    pub const fn len(&self) -> usize {
        POOL_SIZE
    }

    /// Always false; the pool is never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Converts up to `limit` slots holding `prerequisite` into `result`.
    ///
    /// Slots are scanned in index order. Returns the number of slots actually
    /// converted, which is less than `limit` when fewer matches exist.
    pub fn convert(&mut self, prerequisite: Archetype, result: Archetype, limit: usize) -> usize {
        let mut converted = 0;
        for slot in &mut self.slots {
            if converted >= limit {
                break;
            }
            if *slot == prerequisite {
                *slot = result;
                converted += 1;
            }
        }
        converted
    }

    /// Returns how many slots hold `archetype`.
    #[must_use]
    pub fn count_of(&self, archetype: Archetype) -> usize {
        self.slots.iter().filter(|slot| **slot == archetype).count()
    }

    /// Tallies slots per archetype. Archetypes with no slot are absent.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<Archetype, usize> {
        let mut counts = BTreeMap::new();
        for slot in &self.slots {
            *counts.entry(*slot).or_insert(0) += 1;
        }
        counts
    }

    /// Draws the archetype of a uniformly random slot.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Archetype {
        self.slots[rng.gen_range(0..POOL_SIZE)]
    }
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Serde adapter for the slot array; serde only derives arrays up to 32.
mod slot_array {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::POOL_SIZE;
    use crate::entity::Archetype;

    pub(super) fn serialize<S: Serializer>(
        slots: &[Archetype; POOL_SIZE],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        slots.as_slice().serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[Archetype; POOL_SIZE], D::Error> {
        let slots = Vec::<Archetype>::deserialize(deserializer)?;
        let len = slots.len();
        slots
            .try_into()
            .map_err(|_| D::Error::invalid_length(len, &"exactly 100 pool slots"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn default_layout() {
        let pool = EntityPool::new();
        assert_eq!(pool.len(), POOL_SIZE);
        assert_eq!(pool.count_of(Archetype::Shooter), 10);
        assert_eq!(pool.count_of(Archetype::Bubble), 90);
        assert_eq!(pool.archetype_at(9), Some(Archetype::Shooter));
        assert_eq!(pool.archetype_at(10), Some(Archetype::Bubble));
        assert_eq!(pool.archetype_at(100), None);
    }

    #[test]
    fn convert_bubbles_to_shooters() {
        let mut pool = EntityPool::new();
        let converted = pool.convert(Archetype::Bubble, Archetype::Shooter, 10);
        assert_eq!(converted, 10);
        assert_eq!(pool.count_of(Archetype::Shooter), 20);
        // First matching slots in index order.
        assert!(pool.slots()[..20].iter().all(|a| *a == Archetype::Shooter));
        assert_eq!(pool.archetype_at(20), Some(Archetype::Bubble));
    }

    #[test]
    fn convert_stops_when_matches_run_out() {
        let mut pool = EntityPool::new();
        let converted = pool.convert(Archetype::Shooter, Archetype::Sniper, 25);
        assert_eq!(converted, 10);
        assert_eq!(pool.count_of(Archetype::Shooter), 0);
        assert_eq!(pool.count_of(Archetype::Sniper), 10);
    }

    #[test]
    fn convert_missing_prerequisite_is_noop() {
        let mut pool = EntityPool::new();
        assert_eq!(pool.convert(Archetype::Sniperer, Archetype::Sniperest, 5), 0);
        assert_eq!(pool, EntityPool::new());
    }

    #[test]
    fn reset_restores_default() {
        let mut pool = EntityPool::new();
        pool.convert(Archetype::Bubble, Archetype::Spike, 50);
        pool.reset();
        assert_eq!(pool, EntityPool::new());
    }

    #[test]
    fn counts_tally_all_slots() {
        let mut pool = EntityPool::new();
        pool.convert(Archetype::Shooter, Archetype::DoubleShooter, 4);
        let counts = pool.counts();
        assert_eq!(counts.get(&Archetype::DoubleShooter), Some(&4));
        assert_eq!(counts.get(&Archetype::Shooter), Some(&6));
        assert_eq!(counts.get(&Archetype::Sniper), None);
        assert_eq!(counts.values().sum::<usize>(), POOL_SIZE);
    }

    #[test]
    fn draw_returns_slot_archetypes() {
        let pool = EntityPool::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let drawn = pool.draw(&mut rng);
            assert!(matches!(drawn, Archetype::Shooter | Archetype::Bubble));
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let mut pool = EntityPool::new();
        pool.convert(Archetype::Bubble, Archetype::Sniper, 3);
        let json = serde_json::to_string(&pool).unwrap();
        let back: EntityPool = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pool);
    }

    #[test]
    fn deserialize_rejects_wrong_length() {
        let json = serde_json::to_string(&vec![Archetype::Bubble; 99]).unwrap();
        let wrapped = format!("{{\"slots\":{json}}}");
        assert!(serde_json::from_str::<EntityPool>(&wrapped).is_err());
    }

    fn archetype_strategy() -> impl Strategy<Value = Archetype> {
        (0..Archetype::ALL.len()).prop_map(|i| Archetype::ALL[i])
    }

    proptest! {
        #[test]
        fn conversions_preserve_pool_size(
            ops in proptest::collection::vec(
                (archetype_strategy(), archetype_strategy(), 0usize..120),
                0..32,
            ),
        ) {
            let mut pool = EntityPool::new();
            for (from, to, limit) in ops {
                let before = pool.count_of(from);
                let converted = pool.convert(from, to, limit);
                prop_assert!(converted <= limit);
                prop_assert!(converted <= before);
                prop_assert_eq!(pool.slots().len(), POOL_SIZE);
                prop_assert_eq!(pool.counts().values().sum::<usize>(), POOL_SIZE);
            }
        }
    }
}
