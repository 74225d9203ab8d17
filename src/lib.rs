//! Split Second Spark - a tap-the-target reflex game
//!
//! Core modules:
//! - `sim`: Gameplay simulation (spawning, hit testing, frame advance)
//! - `renderer`: Draws a session onto an abstract 2D surface
//! - `game`: Frame loop driver and Idle/Running/GameOver state machine
//! - `platform`: Frame scheduling and HUD seams
//! - `persistence`: Key-value storage (LocalStorage on web)

pub mod error;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result, StoreError};
pub use game::Game;
pub use highscores::HighScore;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Target colors, RGB 0-1 (#00ffff, #ff00ff, #ffff00, #00ff00)
    pub const PALETTE: [[f32; 3]; 4] = [
        [0.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];

    /// Lives at session start
    pub const INITIAL_LIVES: u32 = 3;

    /// Target lifetime at speed factor 1 (ms)
    pub const TARGET_LIFETIME_MS: f32 = 2000.0;
    /// Lifetime never drops below this no matter how fast the game gets
    pub const MIN_TARGET_LIFETIME_MS: f32 = 1000.0;
    pub const TARGET_RADIUS: f32 = 30.0;

    /// Spawn interval bounds (ms)
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 800.0;
    pub const MAX_SPAWN_INTERVAL_MS: f64 = 1500.0;
    /// Interval for a fresh session, before the first spawn ramps it
    pub const INITIAL_SPAWN_INTERVAL_MS: f64 = 1200.0;
    /// Speed factor added per spawned target
    pub const SPEED_INCREASE_RATE: f64 = 0.02;

    /// Spawn area: inset from every canvas edge
    pub const SPAWN_MARGIN: f32 = 60.0;
    /// Spawn area: extra top band kept clear for the HUD
    pub const HUD_HEIGHT: f32 = 80.0;

    /// Scoring
    pub const BASE_SCORE: u64 = 100;
    pub const MAX_REACTION_BONUS: f32 = 100.0;

    /// Particles per explosion burst
    pub const EXPLOSION_PARTICLES: usize = 15;
    /// Life lost per frame (life starts at 1.0)
    pub const PARTICLE_LIFE_DECAY: f32 = 0.02;
    /// Per-frame multiplicative decay for size
    pub const PARTICLE_SIZE_DECAY: f32 = 0.98;
    /// Per-frame multiplicative damping for velocity
    pub const PARTICLE_DRAG: f32 = 0.98;
    /// Max initial speed per axis (px/frame)
    pub const PARTICLE_MAX_SPEED: f32 = 4.0;

    /// Screen flash after a hit fades out over this long (ms)
    pub const FLASH_DURATION_MS: f32 = 200.0;
}

/// Linear RGB palette entry with alpha, for a target color id
#[inline]
pub fn palette_color(color_id: usize, alpha: f32) -> [f32; 4] {
    let [r, g, b] = consts::PALETTE[color_id % consts::PALETTE.len()];
    [r, g, b, alpha]
}
