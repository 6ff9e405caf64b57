//! Pairwise force field over defenders and enemies.
//!
//! Every on-field defender and enemy takes part in one O(n²) pass per tick.
//! The pass produces a force per entity and a list of contact casualties; it
//! never moves anything except enemies knocked back by a defender contact.
//!
//! # Force Rules
//!
//! For each entity `i` (defenders first, then enemies when enabled):
//!
//! - **Centering**: pulls `i` towards the origin with strength
//!   `base * clamp01(|p|/3)`, `base` 1 for defenders and 4 for enemies,
//!   twenty times stronger beyond distance 60.
//! - **Contact** (`d² < 1`): a defender touching an enemy is destroyed and the
//!   enemy is knocked back to the relocation circle; a Spike defender takes
//!   the enemy with it. Any other overlapping pair repels with
//!   `lerp(10, 0, d²)`.
//! - **Cohesion** (`1 ≤ d² < 3`): the pair attracts with
//!   `clamp01(1 - (d² - 2)²)`, peaking at `d² = 2`.
//!
//! The partner index `j` starts at 1, so the first entity is never a partner.

use glam::Vec2;
use rand::Rng;

use super::point_on_circle;
use crate::event::DestroyCause;

/// What an entity in the force pass is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// A defender; `spike` defenders destroy the enemies they touch.
    Defender {
        /// True for contact-killing archetypes.
        spike: bool,
    },
    /// An enemy.
    Enemy,
}

impl FieldRole {
    fn centering_base(self) -> f32 {
        match self {
            Self::Defender { .. } => 1.0,
            Self::Enemy => 4.0,
        }
    }
}

/// One participant in the force pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldEntity {
    /// Current position; rewritten when the entity is relocated.
    pub position: Vec2,
    /// Defender or enemy.
    pub role: FieldRole,
}

impl FieldEntity {
    /// Creates a defender participant.
    #[must_use]
    pub const fn defender(position: Vec2, spike: bool) -> Self {
        Self {
            position,
            role: FieldRole::Defender { spike },
        }
    }

    /// Creates an enemy participant.
    #[must_use]
    pub const fn enemy(position: Vec2) -> Self {
        Self {
            position,
            role: FieldRole::Enemy,
        }
    }
}

/// Result of one force pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceField {
    /// Net force per participant, indexed like the input.
    pub forces: Vec<Vec2>,
    /// Participants to destroy, in marking order, without duplicates.
    pub destroyed: Vec<(usize, DestroyCause)>,
    /// Participants whose position was rewritten, without duplicates.
    pub relocated: Vec<usize>,
}

impl ForceField {
    fn mark(&mut self, index: usize, cause: DestroyCause) {
        if !self.destroyed.iter().any(|(marked, _)| *marked == index) {
            self.destroyed.push((index, cause));
        }
    }

    fn relocate(&mut self, index: usize) {
        if !self.relocated.contains(&index) {
            self.relocated.push(index);
        }
    }
}

/// Computes the per-tick force field.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceSimulator {
    relocation_radius: f32,
}

impl ForceSimulator {
    /// Squared distance below which two entities touch.
    pub const CONTACT_DISTANCE_SQUARED: f32 = 1.0;
    /// Squared distance below which two entities attract.
    pub const COHESION_DISTANCE_SQUARED: f32 = 3.0;
    /// Peak repulsion between touching entities.
    pub const REPULSION: f32 = 10.0;
    /// Centering distance divisor.
    pub const CENTERING_SCALE: f32 = 3.0;
    /// Scaled distance beyond which centering is amplified.
    pub const FAR_THRESHOLD: f32 = 20.0;
    /// Centering amplification for far entities.
    pub const FAR_MULTIPLIER: f32 = 20.0;

    /// Creates a simulator that knocks enemies back to `relocation_radius`.
    #[must_use]
    pub fn new(relocation_radius: f32) -> Self {
        Self { relocation_radius }
    }

    /// Returns the knock-back radius.
    #[must_use]
    pub fn relocation_radius(&self) -> f32 {
        self.relocation_radius
    }

    /// Runs one force pass.
    ///
    /// `entities` must list every defender before any enemy, each group in
    /// spawn order. With `update_enemies == false` enemies are never the
    /// outer entity: they get no centering force, but still receive the
    /// reactions of defender pairs.
    pub fn compute<R: Rng + ?Sized>(
        &self,
        entities: &mut [FieldEntity],
        update_enemies: bool,
        rng: &mut R,
    ) -> ForceField {
        let total = entities.len();
        let mut field = ForceField {
            forces: vec![Vec2::ZERO; total],
            ..ForceField::default()
        };

        for i in 0..total {
            let role = entities[i].role;
            if role == FieldRole::Enemy && !update_enemies {
                break;
            }

            field.forces[i] -= Self::centering(entities[i].position, role);

            for j in 1..total {
                if j == i {
                    continue;
                }
                let delta = entities[i].position - entities[j].position;
                let distance_squared = delta.length_squared();

                if distance_squared < Self::CONTACT_DISTANCE_SQUARED {
                    if let (FieldRole::Defender { spike }, FieldRole::Enemy) =
                        (role, entities[j].role)
                    {
                        field.mark(i, DestroyCause::EnemyContact);
                        if spike {
                            field.mark(j, DestroyCause::SpikeContact);
                        }
                        entities[j].position = point_on_circle(rng, self.relocation_radius);
                        field.relocate(j);
                        break;
                    }

                    let push = delta.normalize_or_zero()
                        * Self::REPULSION
                        * (1.0 - distance_squared);
                    field.forces[i] += push;
                    field.forces[j] -= push;
                } else if distance_squared < Self::COHESION_DISTANCE_SQUARED {
                    let offset = distance_squared - 2.0;
                    let pull = delta.normalize_or_zero() * (1.0 - offset * offset).clamp(0.0, 1.0);
                    field.forces[i] -= pull;
                    field.forces[j] += pull;
                }
            }
        }

        field
    }

    fn centering(position: Vec2, role: FieldRole) -> Vec2 {
        let scaled = position.length() / Self::CENTERING_SCALE;
        let mut base = role.centering_base();
        if scaled > Self::FAR_THRESHOLD {
            base *= Self::FAR_MULTIPLIER;
        }
        position.normalize_or_zero() * base * scaled.clamp(0.0, 1.0)
    }
}

impl Default for ForceSimulator {
    fn default() -> Self {
        Self::new(30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            actual.abs_diff_eq(expected, 1e-4),
            "expected {expected:?}, got {actual:?}"
        );
    }

    mod contact_tests {
        use super::*;

        #[test]
        fn touching_enemy_destroys_defender_and_relocates_enemy() {
            let mut entities = [
                FieldEntity::defender(Vec2::ZERO, false),
                FieldEntity::enemy(Vec2::new(0.999_f32.sqrt(), 0.0)),
            ];
            let field = ForceSimulator::default().compute(&mut entities, true, &mut rng());

            assert_eq!(field.destroyed, vec![(0, DestroyCause::EnemyContact)]);
            assert_eq!(field.relocated, vec![1]);
            assert!((entities[1].position.length() - 30.0).abs() < 1e-3);
        }

        #[test]
        fn spike_takes_enemy_with_it() {
            let mut entities = [
                FieldEntity::defender(Vec2::ZERO, true),
                FieldEntity::enemy(Vec2::new(0.5, 0.0)),
            ];
            let field = ForceSimulator::default().compute(&mut entities, false, &mut rng());

            assert_eq!(
                field.destroyed,
                vec![(0, DestroyCause::EnemyContact), (1, DestroyCause::SpikeContact)]
            );
        }

        #[test]
        fn contact_stops_partner_scan() {
            // Defender 0 touches enemy 2 first; enemy 3 is never examined.
            let mut entities = [
                FieldEntity::defender(Vec2::ZERO, false),
                FieldEntity::defender(Vec2::new(10.0, 0.0), false),
                FieldEntity::enemy(Vec2::new(0.2, 0.0)),
                FieldEntity::enemy(Vec2::new(-0.2, 0.0)),
            ];
            let field = ForceSimulator::default().compute(&mut entities, false, &mut rng());

            assert_eq!(field.relocated, vec![2]);
            assert_eq!(entities[3].position, Vec2::new(-0.2, 0.0));
        }

        #[test]
        fn enemy_outer_touching_defender_only_repels() {
            let mut entities = [
                FieldEntity::defender(Vec2::new(20.0, 0.0), false),
                FieldEntity::defender(Vec2::ZERO, false),
                FieldEntity::enemy(Vec2::new(0.3, 0.0)),
                FieldEntity::enemy(Vec2::new(-0.3, 0.0)),
            ];
            let field = ForceSimulator::default().compute(&mut entities, true, &mut rng());

            // Defender 1 stops at enemy 2, so enemy 3 meets it as the outer entity.
            assert_eq!(field.destroyed, vec![(1, DestroyCause::EnemyContact)]);
            assert_eq!(field.relocated, vec![2]);
            assert_eq!(entities[3].position, Vec2::new(-0.3, 0.0));
            // Repulsion lerp(10, 0, 0.09) minus centering 4 * 0.1.
            assert_close(field.forces[3], Vec2::new(-9.1 + 0.4, 0.0));
        }
    }

    mod impulse_tests {
        use super::*;

        #[test]
        fn cohesion_band_is_impulse_only() {
            let mut entities = [
                FieldEntity::defender(Vec2::ZERO, false),
                FieldEntity::enemy(Vec2::new(1.5_f32.sqrt(), 0.0)),
            ];
            let field = ForceSimulator::default().compute(&mut entities, false, &mut rng());

            assert!(field.destroyed.is_empty());
            assert!(field.relocated.is_empty());
            // clamp01(1 - (1.5 - 2)²) = 0.75, pulling the pair together.
            assert_close(field.forces[0], Vec2::new(0.75, 0.0));
            assert_close(field.forces[1], Vec2::new(-0.75, 0.0));
        }

        #[test]
        fn overlapping_defenders_repel() {
            let mut entities = [
                FieldEntity::defender(Vec2::ZERO, false),
                FieldEntity::defender(Vec2::new(0.5, 0.0), false),
            ];
            let field = ForceSimulator::default().compute(&mut entities, false, &mut rng());

            // lerp(10, 0, 0.25) = 7.5 apart; defender 1 also feels centering 0.5/3.
            assert_close(field.forces[0], Vec2::new(-7.5, 0.0));
            assert_close(field.forces[1], Vec2::new(7.5 - 0.5 / 3.0, 0.0));
        }

        #[test]
        fn distant_pairs_do_not_interact() {
            let mut entities = [
                FieldEntity::defender(Vec2::ZERO, false),
                FieldEntity::defender(Vec2::new(0.0, 2.0), false),
            ];
            let field = ForceSimulator::default().compute(&mut entities, false, &mut rng());
            assert_close(field.forces[0], Vec2::ZERO);
        }
    }

    mod centering_tests {
        use super::*;

        #[test]
        fn centering_saturates_at_three_units() {
            assert_close(
                ForceSimulator::centering(Vec2::new(1.5, 0.0), FieldRole::Enemy),
                Vec2::new(2.0, 0.0),
            );
            assert_close(
                ForceSimulator::centering(Vec2::new(0.0, 9.0), FieldRole::Enemy),
                Vec2::new(0.0, 4.0),
            );
        }

        #[test]
        fn far_entities_are_pulled_harder() {
            let far = Vec2::new(61.0, 0.0);
            assert_close(
                ForceSimulator::centering(far, FieldRole::Defender { spike: false }),
                Vec2::new(20.0, 0.0),
            );
        }

        #[test]
        fn enemies_skipped_as_outer_when_disabled() {
            let mut entities = [
                FieldEntity::defender(Vec2::new(0.0, 40.0), false),
                FieldEntity::enemy(Vec2::new(30.0, 0.0)),
            ];
            let field = ForceSimulator::default().compute(&mut entities, false, &mut rng());
            assert_eq!(field.forces[1], Vec2::ZERO);

            let field = ForceSimulator::default().compute(&mut entities, true, &mut rng());
            assert_close(field.forces[1], Vec2::new(-4.0, 0.0));
        }

        #[test]
        fn origin_feels_no_centering() {
            assert_eq!(
                ForceSimulator::centering(Vec2::ZERO, FieldRole::Enemy),
                Vec2::ZERO
            );
        }
    }

    #[test]
    fn empty_input_is_empty_field() {
        let field = ForceSimulator::default().compute(&mut [], true, &mut rng());
        assert_eq!(field, ForceField::default());
    }
}
