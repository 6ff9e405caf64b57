//! Test helper functions for setting up games and scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::collab::{AudioSink, Collaborators, DraftUi, SceneSink};
use crate::config::GameConfig;
use crate::entity::{Archetype, DefenderId, EnemyId, EnemyTier, EntityRef};
use crate::event::GameEvent;
use crate::game::Game;
use crate::round::RoundState;
use crate::upgrade::DraftChoice;

// =============================================================================
// Game Setup
// =============================================================================

/// Creates a game with the default config.
pub fn new_game(seed: u64) -> Game {
    Game::new(GameConfig::default(), seed).expect("default config is valid")
}

/// Steps `game` until it reaches `phase`, for at most `max_ticks` ticks.
///
/// Returns the events of every tick stepped, oldest first.
pub fn run_until(game: &mut Game, phase: RoundState, max_ticks: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        if game.phase() == phase {
            return events;
        }
        game.step();
        events.extend_from_slice(game.events());
    }
    assert_eq!(
        game.phase(),
        phase,
        "did not reach {phase} within {max_ticks} ticks"
    );
    events
}

/// Steps `game` `ticks` times, collecting every event.
pub fn run_ticks(game: &mut Game, ticks: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        game.step();
        events.extend_from_slice(game.events());
    }
    events
}

// =============================================================================
// Scenarios
// =============================================================================

/// Puts a lone sniper at the centre facing one tier-0 enemy straight above it.
///
/// The game is forced into PlayRound; the sniper kills the enemy well before
/// it arrives.
pub fn setup_duel(game: &mut Game) -> (DefenderId, EnemyId) {
    game.restore_phase(RoundState::PlayRound.name());
    let defender = game
        .arena_mut()
        .spawn_defender(Archetype::Sniper, Vec2::ZERO);
    let enemy = game
        .arena_mut()
        .spawn_enemy(EnemyTier::new(0), Vec2::new(0.0, 5.0));
    (defender, enemy)
}

/// Plays a duel through to the shop.
pub fn play_to_shop(game: &mut Game) -> Vec<GameEvent> {
    setup_duel(game);
    run_until(game, RoundState::Shop, 500)
}

// =============================================================================
// Recording Collaborators
// =============================================================================

/// Shared log written by the recording collaborators.
#[derive(Debug, Default, Clone)]
pub struct Transcript(Rc<RefCell<Vec<String>>>);

impl Transcript {
    fn push(&self, line: String) {
        self.0.borrow_mut().push(line);
    }

    /// Returns a copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Counts lines equal to `line`.
    pub fn count(&self, line: &str) -> usize {
        self.0.borrow().iter().filter(|l| *l == line).count()
    }
}

impl AudioSink for Transcript {
    fn play_pop(&mut self) {
        self.push("pop".into());
    }

    fn play_destroyed(&mut self) {
        self.push("destroyed".into());
    }
}

impl SceneSink for Transcript {
    fn spawned(&mut self, entity: EntityRef, tag: &str, _position: Vec2) {
        self.push(format!("spawn {entity} {tag}"));
    }

    fn despawned(&mut self, entity: EntityRef) {
        self.push(format!("despawn {entity}"));
    }

    fn cleared(&mut self) {
        self.push("clear".into());
    }
}

impl DraftUi for Transcript {
    fn present(&mut self, choices: &[DraftChoice]) {
        self.push(format!("present {}", choices.len()));
    }

    fn dismiss(&mut self) {
        self.push("dismiss".into());
    }
}

/// Creates a game whose audio, scene and draft UI all write to one transcript.
pub fn recorded_game(seed: u64) -> (Game, Transcript) {
    let transcript = Transcript::default();
    let collaborators = Collaborators::default()
        .with_audio(transcript.clone())
        .with_scene(transcript.clone())
        .with_draft_ui(transcript.clone());
    let game = Game::with_collaborators(GameConfig::default(), seed, collaborators)
        .expect("default config is valid");
    (game, transcript)
}
