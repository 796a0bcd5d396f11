//! Swarm Siege headless runner
//!
//! Drives a session with a scripted pilot at a simulated 60 FPS frame rate,
//! feeding the fixed-timestep simulation through an accumulator, and prints a
//! summary. `RUST_LOG=info` shows the session milestones.
//!
//! Usage: `swarm-siege [seed] [seconds] [--config path.json]`

use std::path::{Path, PathBuf};

use clap::Parser;
use swarm_siege::audio::AudioManager;
use swarm_siege::consts::*;
use swarm_siege::sim::{GameEvent, GamePhase, GameState, TickInput, UpgradeId, tick};
use swarm_siege::{SessionConfig, Settings};

#[derive(Parser, Debug)]
#[command(name = "swarm-siege")]
#[command(about = "Run a headless Swarm Siege session with a scripted pilot")]
struct Args {
    /// RNG seed; overrides the config file
    seed: Option<u64>,
    /// Session length in simulated seconds
    #[arg(default_value_t = 120)]
    seconds: u64,
    /// Session config JSON
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Simulated display frame length
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Runner holding the session and frame pacing
struct Game {
    state: GameState,
    audio: AudioManager,
    accumulator: f64,
    frames: u64,
    kills: u64,
    shots: u64,
    cues: usize,
}

impl Game {
    fn new(config: SessionConfig, settings: &Settings) -> Self {
        Self {
            state: GameState::new(config),
            audio: AudioManager::from_settings(settings),
            accumulator: 0.0,
            frames: 0,
            kills: 0,
            shots: 0,
            cues: 0,
        }
    }

    /// Advance one display frame, running as many fixed ticks as fit
    fn frame(&mut self, frame_ms: f64) {
        self.frames += 1;
        self.accumulator += frame_ms;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS as f64 && substeps < MAX_SUBSTEPS {
            let input = self.pilot();
            tick(&mut self.state, &input, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS as f64;
            substeps += 1;
        }
        // Drop the backlog rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        let events = self.state.drain_events();
        self.audio.handle_events(&events);
        self.cues += self.audio.drain_cues().len();
        for event in &events {
            self.observe(event);
        }
    }

    /// Weave toward the nearest enemy's row and keep the trigger held
    fn pilot(&self) -> TickInput {
        let player_y = self.state.player.pos.y;
        let mut out = Vec::new();
        self.state.snapshot(&mut out);
        let target_y = out
            .iter()
            .skip(1)
            .filter(|s| matches!(s.kind, swarm_siege::sim::BodyKind::Enemy(..)))
            .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
            .map_or(WORLD_HEIGHT / 2.0, |s| s.pos.y);

        TickInput {
            move_up: target_y < player_y - 8.0,
            move_down: target_y > player_y + 8.0,
            action: true,
            pause: false,
        }
    }

    fn observe(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Destroyed { .. } => self.kills += 1,
            GameEvent::Fired { .. } => self.shots += 1,
            GameEvent::WaveComplete { wave } => {
                // Between waves: take the next upgrade in menu order
                let pick = UpgradeId::ALL
                    .into_iter()
                    .find(|id| !self.state.upgrades.has(*id));
                if let Some(id) = pick {
                    self.state.apply_upgrade(id);
                }
                log::info!("wave {} cleared, moving on", wave);
                self.state.next_wave();
            }
            _ => log::trace!("{:?}", event),
        }
    }
}

fn load_config(path: &Path) -> SessionConfig {
    match std::fs::read_to_string(path) {
        Ok(json) => match SessionConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("bad config {}: {}, using defaults", path.display(), e);
                SessionConfig::default()
            }
        },
        Err(e) => {
            log::warn!("cannot read {}: {}, using defaults", path.display(), e);
            SessionConfig::default()
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = args
        .config
        .as_deref()
        .map_or_else(SessionConfig::default, load_config);
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seconds = args.seconds;

    log::info!("Swarm Siege starting: seed {}, {} s", config.seed, seconds);
    let mut game = Game::new(config, &Settings::default());

    let total_frames = (seconds as f64 * 1000.0 / FRAME_MS) as u64;
    for _ in 0..total_frames {
        game.frame(FRAME_MS);
        if game.state.phase == GamePhase::GameOver {
            break;
        }
    }

    let hud = game.state.hud();
    println!("phase:     {:?}", hud.phase);
    println!("wave:      {}", hud.wave);
    println!("score:     {}", hud.score);
    println!("hp:        {}/{}", hud.hp, hud.max_hp);
    println!("kills:     {}", game.kills);
    println!("shots:     {}", game.shots);
    println!("sim time:  {} ms over {} frames", game.state.now(), game.frames);
    println!("audio:     {} cues", game.cues);
    println!(
        "upgrades:  {}",
        game.state
            .upgrades
            .unlocked()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
}
