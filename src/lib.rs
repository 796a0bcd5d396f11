//! Swarm Siege - wave-based arcade combat simulation
//!
//! Core modules:
//! - `sim`: Simulation core (entity pools, behaviors, timed effects, combat)
//! - `config`: Session configuration (seed, wave length, pool capacities)
//! - `settings`: Player-facing preferences with an edit/confirm workflow
//! - `audio`: Maps simulation events to sound cues for an external backend

pub mod audio;
pub mod config;
pub mod settings;
pub mod sim;

pub use config::SessionConfig;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (~60 Hz)
    pub const SIM_DT_MS: u64 = 16;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (origin top-left, +y down)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Entities further than this outside the world are culled
    pub const OFFSCREEN_MARGIN: f32 = 120.0;
    /// Enemies enter from the right edge, this far outside it
    pub const SPAWN_X: f32 = WORLD_WIDTH + 40.0;
    /// Vertical margin kept clear when picking a spawn Y
    pub const SPAWN_MARGIN_Y: f32 = 50.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_MIN_Y: f32 = 40.0;
    pub const PLAYER_MAX_Y: f32 = WORLD_HEIGHT - 40.0;
    pub const PLAYER_RADIUS: f32 = 18.0;
    pub const PLAYER_BASE_HP: i32 = 100;
    pub const PLAYER_BASE_SPEED: f32 = 300.0;
    /// Base time between player shots
    pub const PLAYER_FIRE_INTERVAL_MS: u64 = 250;
    pub const PLAYER_SHOT_SPEED: f32 = 600.0;
    pub const PLAYER_SHOT_DAMAGE: i32 = 10;
    pub const PLAYER_SHOT_RADIUS: f32 = 5.0;

    /// Status effect timings
    pub const ENEMY_FLASH_MS: u64 = 100;
    pub const PLAYER_FLASH_MS: u64 = 200;
    pub const INVINCIBILITY_MS: u64 = 1500;
    pub const FLICKER_PERIOD_MS: u64 = 100;
    pub const AUTO_HEAL_PERIOD_MS: u64 = 2000;
    pub const AUTO_HEAL_AMOUNT: i32 = 5;
    pub const ACID_DELAY_MS: u64 = 1000;
    pub const ACID_DAMAGE: i32 = 10;

    /// Default pool capacities
    pub const ASTEROID_CAPACITY: usize = 20;
    pub const KAMIKAZE_CAPACITY: usize = 10;
    pub const GUNNER_CAPACITY: usize = 8;
    pub const LEAPER_CAPACITY: usize = 8;
    pub const MOTHERSHIP_CAPACITY: usize = 1;
    pub const PLAYER_SHOT_CAPACITY: usize = 40;
    pub const ENEMY_SHOT_CAPACITY: usize = 64;

    /// Default wave length (logical time)
    pub const WAVE_DURATION_MS: u64 = 90_000;
}
