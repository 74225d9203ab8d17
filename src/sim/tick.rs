//! Per-frame simulation step
//!
//! Advances a running session to `now_ms`: spawn, update and cull targets
//! (charging misses), then update and cull particles. Pure with respect to
//! rendering; drawing happens afterwards from the resulting state.

use glam::Vec2;

use super::spawn::maybe_spawn;
use super::state::{GameEvent, GameSession};
use crate::consts::FLASH_DURATION_MS;

/// Summary of one advanced frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Elapsed time used for this frame (ms)
    pub dt_ms: f32,
    pub spawned: bool,
    /// Targets that expired without being hit this frame
    pub missed: u32,
}

/// Frame delta from the last timestamp; clock anomalies count as zero
fn frame_delta(last_ms: f64, now_ms: f64) -> f32 {
    let dt = now_ms - last_ms;
    if dt.is_finite() && dt > 0.0 { dt as f32 } else { 0.0 }
}

/// Advance the session by one frame ending at `now_ms` on a canvas of `canvas` pixels
pub fn advance(session: &mut GameSession, now_ms: f64, canvas: Vec2) -> FrameReport {
    if !session.is_running() {
        return FrameReport::default();
    }

    // A broken timestamp freezes time for this frame
    let now_ms = if now_ms.is_finite() { now_ms } else { session.last_frame_ms };
    let dt = frame_delta(session.last_frame_ms, now_ms);
    session.last_frame_ms = now_ms;

    // A target spawned at `now_ms` has not aged yet
    let fresh = maybe_spawn(session, now_ms, canvas).map(|i| session.targets[i].id);

    // Targets: order-preserving cull, misses charged after the pass
    let mut expired = Vec::new();
    session.targets.retain_mut(|target| {
        let step = if Some(target.id) == fresh { 0.0 } else { dt };
        let alive = target.update(step, now_ms);
        if !alive && !target.hit {
            expired.push(target.id);
        }
        alive
    });
    for id in &expired {
        session.events.push(GameEvent::TargetMissed { id: *id });
        session.lose_life();
    }

    // Particles: order doesn't matter, swap-remove the dead
    let mut i = 0;
    while i < session.particles.len() {
        if session.particles[i].update() {
            i += 1;
        } else {
            session.particles.swap_remove(i);
        }
    }

    if session.flash > 0.0 {
        session.flash = (session.flash - dt / FLASH_DURATION_MS).max(0.0);
    }

    FrameReport {
        dt_ms: dt,
        spawned: fresh.is_some(),
        missed: expired.len() as u32,
    }
}
