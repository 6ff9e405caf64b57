//! Headless runner: steps a game without rendering and prints a JSON report.
//!
//! ```text
//! popguard-headless --seed 7 --ticks 20000 --draft first --time-scale 4
//! RUST_LOG=popguard_core=debug popguard-headless --config tuned.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

use popguard_core::collab::{AudioSink, Collaborators, DraftUi};
use popguard_core::upgrade::DraftChoice;
use popguard_core::{Game, GameConfig, GameEvent, GameSnapshot, RoundState, TimeScale, UpgradeRule};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless runner for the Popguard simulation core", long_about = None)]
struct Args {
    /// Master seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of ticks to run
    #[arg(long, default_value_t = 10_000)]
    ticks: u64,

    /// Player time scale (1, 2 or 4)
    #[arg(long, default_value_t = 1)]
    time_scale: u32,

    /// Path to a JSON config; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// How the runner answers upgrade drafts
    #[arg(long, value_enum, default_value_t = DraftPolicy::First)]
    draft: DraftPolicy,

    /// Log a progress line every N ticks (0 disables)
    #[arg(long, default_value_t = 1000)]
    summary_every: u64,

    /// Stop early when the game is lost
    #[arg(long)]
    stop_on_game_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DraftPolicy {
    /// Take the first visible choice immediately.
    First,
    /// Take the last visible choice immediately.
    Last,
    /// Never answer; let the shop time out.
    Wait,
}

impl DraftPolicy {
    fn pick(self, choices: &[DraftChoice]) -> Option<usize> {
        match self {
            Self::First => choices.first().map(|choice| choice.index),
            Self::Last => choices.last().map(|choice| choice.index),
            Self::Wait => None,
        }
    }
}

/// Logs sounds at trace level.
struct TracingAudio;

impl AudioSink for TracingAudio {
    fn play_pop(&mut self) {
        tracing::trace!("audio: pop");
    }

    fn play_destroyed(&mut self) {
        tracing::trace!("audio: destroyed");
    }
}

/// Logs the draft panel.
struct TracingDraftUi;

impl DraftUi for TracingDraftUi {
    fn present(&mut self, choices: &[DraftChoice]) {
        for choice in choices {
            debug!(index = choice.index, label = %choice.label.replace('\n', " "), "draft choice");
        }
    }

    fn dismiss(&mut self) {
        debug!("draft closed");
    }
}

#[derive(Debug, Serialize)]
struct RunReport {
    seed: u64,
    ticks: u64,
    game_overs: u32,
    levels_completed: u32,
    drafts: Vec<DraftRecord>,
    snapshot: GameSnapshot,
}

#[derive(Debug, Serialize)]
struct DraftRecord {
    tick: u64,
    rule: UpgradeRule,
    converted: usize,
    auto: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    let time_scale = TimeScale::from_factor(args.time_scale)
        .ok_or_else(|| anyhow!("time scale must be 1, 2 or 4, got {}", args.time_scale))?;

    let collaborators = Collaborators::default()
        .with_audio(TracingAudio)
        .with_draft_ui(TracingDraftUi);
    let mut game = Game::with_collaborators(config, args.seed, collaborators)
        .context("invalid game configuration")?;
    game.set_time_scale(time_scale);

    info!(seed = args.seed, ticks = args.ticks, ?time_scale, policy = ?args.draft, "starting run");

    let mut report = RunReport {
        seed: args.seed,
        ticks: 0,
        game_overs: 0,
        levels_completed: 0,
        drafts: Vec::new(),
        snapshot: game.snapshot(),
    };

    for _ in 0..args.ticks {
        game.step();
        if let Some(index) = args.draft.pick(&game.draft_choices()) {
            game.resolve_draft(index)
                .with_context(|| format!("resolving draft choice {index} at tick {}", game.tick()))?;
        }
        // Draft events land in the same log as the step's.
        record(&mut report, game.tick(), game.events());

        if game.phase() == RoundState::GameOver && args.stop_on_game_over {
            break;
        }

        if args.summary_every > 0 && game.tick() % args.summary_every == 0 {
            let snapshot = game.snapshot();
            info!(
                tick = snapshot.tick,
                phase = %snapshot.phase,
                level = snapshot.level,
                defenders = snapshot.defenders,
                enemies = snapshot.enemies,
                projectiles = snapshot.projectiles,
                "progress"
            );
        }
    }

    report.ticks = game.tick();
    report.snapshot = game.snapshot();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config JSON at {}", path.display()))
}

/// Folds one tick's events into the report.
fn record(report: &mut RunReport, tick: u64, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::LevelCompleted { level } => report.levels_completed = *level,
            GameEvent::PhaseChanged {
                to: RoundState::GameOver,
                ..
            } => report.game_overs += 1,
            GameEvent::DraftResolved {
                rule,
                converted,
                auto,
            } => report.drafts.push(DraftRecord {
                tick,
                rule: *rule,
                converted: *converted,
                auto: *auto,
            }),
            _ => {}
        }
    }
}
