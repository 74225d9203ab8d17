//! Time-gated target spawning with a difficulty ramp

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, GameSession, Target};
use crate::consts::*;

/// Rectangle targets may be placed in, derived from the canvas size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnArea {
    pub min: Vec2,
    pub max: Vec2,
}

impl SpawnArea {
    /// Playable area for a canvas of `size`, inset by the margin and HUD band.
    /// `None` when the canvas is too small (or not finite) to place anything.
    pub fn from_canvas(size: Vec2) -> Option<Self> {
        if !size.is_finite() {
            return None;
        }
        let min = Vec2::new(SPAWN_MARGIN, SPAWN_MARGIN + HUD_HEIGHT);
        let max = Vec2::new(size.x - SPAWN_MARGIN, size.y - SPAWN_MARGIN);
        if max.x < min.x || max.y < min.y {
            return None;
        }
        Some(Self { min, max })
    }

    /// Uniform point inside the area
    pub fn sample(&self, rng: &mut impl Rng) -> Vec2 {
        let t = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
        (self.min + (self.max - self.min) * t).clamp(self.min, self.max)
    }
}

/// Lifetime for a target spawned at the given speed factor
pub fn target_lifetime(speed_factor: f64) -> f32 {
    (TARGET_LIFETIME_MS / speed_factor as f32).max(MIN_TARGET_LIFETIME_MS)
}

/// Spawn interval for the given speed factor, clamped to the allowed range
pub fn spawn_interval(speed_factor: f64) -> f64 {
    (MAX_SPAWN_INTERVAL_MS / speed_factor).clamp(MIN_SPAWN_INTERVAL_MS, MAX_SPAWN_INTERVAL_MS)
}

/// Spawn a target if the interval has elapsed.
///
/// On spawn the speed factor ramps up and the interval shrinks. A degenerate
/// canvas skips the spawn entirely and leaves the timer and ramp untouched.
/// Returns the index of the new target in `session.targets`.
pub fn maybe_spawn(session: &mut GameSession, now_ms: f64, canvas: Vec2) -> Option<usize> {
    if now_ms - session.last_spawn_ms <= session.spawn_interval_ms {
        return None;
    }

    let Some(area) = SpawnArea::from_canvas(canvas) else {
        log::debug!("Spawn skipped: canvas {}x{} too small", canvas.x, canvas.y);
        return None;
    };

    let pos = area.sample(session.rng());
    let color_id = session.rng().random_range(0..PALETTE.len());
    let pulse_phase = session.rng().random_range(0.0..TAU);
    let lifetime = target_lifetime(session.speed_factor);
    let id = session.next_entity_id();

    session.targets.push(Target::new(id, pos, color_id, lifetime, pulse_phase));
    session.events.push(GameEvent::TargetSpawned { id });

    session.last_spawn_ms = now_ms;
    session.speed_factor += SPEED_INCREASE_RATE;
    session.spawn_interval_ms = spawn_interval(session.speed_factor);

    Some(session.targets.len() - 1)
}
