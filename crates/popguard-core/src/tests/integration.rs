//! Integration tests for the full round cycle.
//!
//! These tests drive [`Game`] through its public API only:
//! - Spawning until the play threshold
//! - Combat, round clearing and the upgrade draft
//! - Loss, restart and phase restoration
//! - Collaborator notifications

use glam::Vec2;
use proptest::prelude::*;

use crate::config::GameConfig;
use crate::entity::{Archetype, Cooldown, EnemyTier, EntityKind, EntityRef};
use crate::error::DraftError;
use crate::event::{DestroyCause, GameEvent};
use crate::game::Game;
use crate::pool::{EntityPool, POOL_SIZE};
use crate::round::{RoundState, TimeScale};

use super::helpers::{
    new_game, play_to_shop, recorded_game, run_ticks, run_until, setup_duel,
};

fn count_spawned_defenders(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, GameEvent::DefenderSpawned { .. }))
        .count()
}

fn count_destroyed(events: &[GameEvent], kind: EntityKind, cause: DestroyCause) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(event, GameEvent::Destroyed { entity, cause: c }
                if entity.kind() == kind && *c == cause)
        })
        .count()
}

// =============================================================================
// Spawn Phase
// =============================================================================

#[test]
fn spawn_phase_ends_at_exactly_play_threshold() {
    let mut game = new_game(1);
    let events = run_until(&mut game, RoundState::PlayRound, 2000);

    assert_eq!(game.arena().defenders().len(), 110);
    assert_eq!(count_spawned_defenders(&events), 110);
    assert!(events.contains(&GameEvent::PhaseChanged {
        from: RoundState::StartRound,
        to: RoundState::PlayRound,
    }));
}

#[test]
fn enemy_spawns_before_defender_within_a_tick() {
    let mut game = new_game(4);
    let events = run_ticks(&mut game, 4);

    let first_enemy = events
        .iter()
        .position(|event| matches!(event, GameEvent::EnemySpawned { .. }))
        .expect("warm-up spawns an enemy with the first defender");
    let first_defender = events
        .iter()
        .position(|event| matches!(event, GameEvent::DefenderSpawned { .. }))
        .expect("first defender spawned");
    assert!(first_enemy < first_defender);
}

#[test]
fn warm_up_enemies_wait_on_the_spawn_circle() {
    let mut game = new_game(8);
    run_until(&mut game, RoundState::PlayRound, 2000);

    // Warm-up spawns at 0, 3, 6 and 9 defenders; none move before play.
    assert_eq!(game.arena().enemies().len(), 4);
    for (_, enemy) in game.arena().enemies().iter() {
        assert_eq!(enemy.tier, EnemyTier::new(0));
        assert!(enemy.body.position.length() >= 30.0 - 1e-3);
    }
}

#[test]
fn faster_time_scale_reaches_play_sooner() {
    let mut slow = new_game(2);
    let mut fast = new_game(2);
    fast.set_time_scale(TimeScale::X4);

    run_until(&mut slow, RoundState::PlayRound, 2000);
    run_until(&mut fast, RoundState::PlayRound, 2000);
    assert!(fast.tick() * 2 < slow.tick());
}

// =============================================================================
// Round Cycle
// =============================================================================

#[test]
fn duel_runs_through_round_win_to_shop() {
    let mut game = new_game(5);
    let (defender, enemy) = setup_duel(&mut game);
    let events = run_until(&mut game, RoundState::Shop, 500);

    assert!(events.contains(&GameEvent::Destroyed {
        entity: EntityRef::Enemy(enemy),
        cause: DestroyCause::ProjectileHit,
    }));
    assert!(events.contains(&GameEvent::PhaseChanged {
        from: RoundState::PlayRound,
        to: RoundState::RoundWin,
    }));
    assert!(events.contains(&GameEvent::Destroyed {
        entity: EntityRef::Defender(defender),
        cause: DestroyCause::RoundCleared,
    }));
    assert!(events.contains(&GameEvent::LevelCompleted { level: 1 }));

    assert_eq!(game.level(), 1);
    assert!(game.arena().defenders().is_empty());
    assert_eq!(game.draft_choices().len(), 3);
    let countdown = game.shop_countdown().expect("in shop");
    assert!(countdown > 0.99 && countdown <= 1.0);
}

#[test]
fn resolving_draft_converts_pool_and_starts_next_round() {
    let mut game = new_game(6);
    play_to_shop(&mut game);

    let choices = game.draft_choices();
    let chosen = choices[1].rule;
    let before_from = game.pool().count_of(chosen.prerequisite);
    let before_to = game.pool().count_of(chosen.result);

    assert_eq!(
        game.resolve_draft(3),
        Err(DraftError::ChoiceOutOfRange {
            index: 3,
            available: 3
        })
    );
    assert_eq!(game.phase(), RoundState::Shop);

    assert_eq!(game.resolve_draft(1), Ok(chosen));
    assert_eq!(game.phase(), RoundState::StartRound);
    assert_eq!(game.pool().count_of(chosen.prerequisite), before_from - chosen.threshold);
    assert_eq!(game.pool().count_of(chosen.result), before_to + chosen.threshold);
    assert!(game.events().contains(&GameEvent::DraftResolved {
        rule: chosen,
        converted: chosen.threshold,
        auto: false,
    }));

    assert_eq!(game.resolve_draft(0), Err(DraftError::NoPendingDraft));
    assert!(game.draft_choices().is_empty());
}

#[test]
fn shop_timeout_applies_first_drafted_rule() {
    let config = GameConfig {
        shop_timeout: 1.0,
        shop_countdown: 1.0,
        ..GameConfig::default()
    };
    let mut game = Game::new(config, 9).expect("valid config");
    play_to_shop(&mut game);

    let fallback = game.draft().expect("draft pending").fallback();
    let events = run_until(&mut game, RoundState::StartRound, 100);

    // 1s of unscaled 0.02s ticks.
    assert!(events.contains(&GameEvent::DraftResolved {
        rule: fallback,
        converted: fallback.threshold,
        auto: true,
    }));
    assert!(game.draft().is_none());
}

#[test]
fn shop_timeout_ignores_time_scale() {
    let mut game = new_game(10);
    play_to_shop(&mut game);
    game.set_time_scale(TimeScale::X4);

    run_ticks(&mut game, 1500);
    assert_eq!(game.phase(), RoundState::Shop);
    run_until(&mut game, RoundState::StartRound, 100);
}

#[test]
fn round_win_skips_shop_without_affordable_upgrade() {
    let config = GameConfig {
        upgrades: Vec::new(),
        ..GameConfig::default()
    };
    let mut game = Game::new(config, 18).expect("valid config");
    setup_duel(&mut game);
    let events = run_until(&mut game, RoundState::StartRound, 500);

    assert!(events.contains(&GameEvent::PhaseChanged {
        from: RoundState::RoundWin,
        to: RoundState::StartRound,
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, GameEvent::DraftOffered { .. })));
    assert!(events.contains(&GameEvent::LevelCompleted { level: 1 }));
    assert_eq!(game.level(), 1);
    assert!(game.draft().is_none());
}

#[test]
fn second_round_spawns_into_the_upgraded_pool() {
    let mut game = new_game(11);
    play_to_shop(&mut game);
    let rule = game.resolve_draft(0).expect("draft pending");
    run_until(&mut game, RoundState::PlayRound, 2000);

    for (_, defender) in game.arena().defenders().iter() {
        assert!(game.pool().count_of(defender.archetype) > 0);
    }
    assert_eq!(game.level(), 1);
    assert!(game.pool().count_of(rule.result) >= rule.threshold);
}

// =============================================================================
// Loss and Restart
// =============================================================================

#[test]
fn losing_the_last_defender_is_game_over() {
    let mut game = new_game(12);
    game.restore_phase("PlayRound");
    let defender = game
        .arena_mut()
        .spawn_defender(Archetype::Bubble, Vec2::ZERO);
    let enemy = game
        .arena_mut()
        .spawn_enemy(EnemyTier::new(1), Vec2::new(3.0, 0.0));

    let events = run_until(&mut game, RoundState::GameOver, 500);
    assert!(events.contains(&GameEvent::Destroyed {
        entity: EntityRef::Defender(defender),
        cause: DestroyCause::EnemyContact,
    }));

    // The enemy survives the contact and is knocked back out.
    let position = game
        .arena()
        .enemies()
        .get(enemy)
        .expect("enemy survives")
        .body
        .position;
    assert!(position.length() > 20.0);
}

#[test]
fn spike_trades_itself_for_the_enemy() {
    let mut game = new_game(13);
    game.restore_phase("PlayRound");
    game.arena_mut()
        .spawn_defender(Archetype::Spike, Vec2::ZERO);
    game.arena_mut()
        .spawn_defender(Archetype::Bubble, Vec2::new(-8.0, 0.0));
    let enemy = game
        .arena_mut()
        .spawn_enemy(EnemyTier::new(0), Vec2::new(3.0, 0.0));

    let events = run_ticks(&mut game, 300);
    assert_eq!(
        count_destroyed(&events, EntityKind::Defender, DestroyCause::EnemyContact),
        1
    );
    assert!(events.contains(&GameEvent::Destroyed {
        entity: EntityRef::Enemy(enemy),
        cause: DestroyCause::SpikeContact,
    }));
    assert!(!game.arena().enemies().contains(enemy));
}

#[test]
fn restart_after_game_over_resets_the_run() {
    let mut game = new_game(14);
    play_to_shop(&mut game);
    game.resolve_draft(0).expect("draft pending");
    game.restore_phase("GameOver");
    run_ticks(&mut game, 20);
    assert_eq!(game.phase(), RoundState::GameOver);

    game.restart();
    game.step();
    assert_eq!(game.phase(), RoundState::StartRound);
    assert_eq!(game.level(), 0);
    assert_eq!(game.pool(), &EntityPool::new());
    assert!(game.events().contains(&GameEvent::SceneCleared));
}

#[test]
fn unknown_phase_name_heals_to_init_and_drops_draft() {
    let mut game = new_game(15);
    play_to_shop(&mut game);

    game.restore_phase("Intermission");
    assert_eq!(game.phase(), RoundState::Init);
    assert!(game.draft().is_none());
    assert_eq!(game.resolve_draft(0), Err(DraftError::NoPendingDraft));
}

// =============================================================================
// Collaborators
// =============================================================================

#[test]
fn collaborators_hear_every_spawn() {
    let (mut game, transcript) = recorded_game(16);
    let events = run_ticks(&mut game, 60);

    assert_eq!(transcript.count("clear"), 1);
    assert_eq!(transcript.count("pop"), count_spawned_defenders(&events));
    let spawned_lines = transcript
        .lines()
        .iter()
        .filter(|line| line.starts_with("spawn "))
        .count();
    let spawn_events = events.iter().filter(|event| event.is_spawn()).count();
    assert_eq!(spawned_lines, spawn_events);
}

#[test]
fn collaborators_follow_the_draft() {
    let (mut game, transcript) = recorded_game(17);
    game.step();
    let events = play_to_shop(&mut game);

    // Enemy hit, projectile impact, then the cleared defender.
    let destroyed = events
        .iter()
        .filter(|event| matches!(event, GameEvent::Destroyed { .. }))
        .count();
    assert_eq!(destroyed, 3);
    assert_eq!(transcript.count("destroyed"), destroyed);
    assert_eq!(transcript.count("present 3"), 1);

    game.resolve_draft(0).expect("draft pending");
    assert_eq!(transcript.count("dismiss"), 1);
    assert_eq!(transcript.lines().last().map(String::as_str), Some("dismiss"));
}

// =============================================================================
// Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn state_stays_within_bounds(seed in any::<u64>(), scale in 0usize..3) {
        let mut game = new_game(seed);
        game.set_time_scale([TimeScale::X1, TimeScale::X2, TimeScale::X4][scale]);

        for _ in 0..600 {
            game.step();
            prop_assert_eq!(game.pool().len(), POOL_SIZE);
            prop_assert!(game.arena().defenders().len() <= game.config().play_threshold);
            for (_, defender) in game.arena().defenders().iter() {
                let cooldown = defender.cooldown.scale();
                prop_assert!((Cooldown::MIN..=Cooldown::READY).contains(&cooldown));
            }
            for (_, projectile) in game.arena().projectiles().iter() {
                prop_assert!(!projectile.is_expired());
            }
            if game.phase() == RoundState::Shop {
                let draft = game.draft().expect("shop always holds a draft");
                prop_assert!(draft.visible() <= game.config().draft_slots);
            }
        }
    }
}
