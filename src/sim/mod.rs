//! Gameplay simulation
//!
//! All gameplay rules live here, with no rendering or platform dependencies:
//! - Time comes in as host timestamps (ms), canvas size as a `Vec2`
//! - Taps come in as canvas-space points
//! - Randomness comes from the session's seeded RNG

pub mod hit;
pub mod spawn;
pub mod state;
pub mod tick;

pub use hit::{HitOutcome, handle_tap, reaction_score};
pub use spawn::{SpawnArea, maybe_spawn, spawn_interval, target_lifetime};
pub use state::{GameEvent, GameSession, Particle, SessionPhase, Target};
pub use tick::{FrameReport, advance};
