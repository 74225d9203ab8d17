//! Pointer-to-target hit resolution and scoring

use glam::Vec2;

use super::state::{GameEvent, GameSession};
use crate::consts::{BASE_SCORE, MAX_REACTION_BONUS};

/// What a successful tap did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub target_id: u32,
    pub score_delta: u64,
    /// Where the target was (explosion origin)
    pub pos: Vec2,
    pub color_id: usize,
}

/// Score for hitting a target with `remaining` of `total` lifetime left.
///
/// Base score plus a reaction bonus of up to 100 for tapping early.
pub fn reaction_score(remaining: f32, total: f32) -> u64 {
    let fraction = if total > 0.0 {
        (remaining / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    BASE_SCORE + (fraction * MAX_REACTION_BONUS).floor() as u64
}

/// Resolve a tap at `point` (canvas pixels).
///
/// Most recently spawned targets win ties. At most one target is scored per
/// tap; tapping empty space changes nothing.
pub fn handle_tap(session: &mut GameSession, point: Vec2) -> Option<HitOutcome> {
    if !session.is_running() {
        return None;
    }

    let index = session
        .targets
        .iter()
        .rposition(|t| !t.hit && t.contains(point))?;

    let target = &mut session.targets[index];
    target.hit = true;
    let outcome = HitOutcome {
        target_id: target.id,
        score_delta: reaction_score(target.lifetime, target.max_lifetime),
        pos: target.pos,
        color_id: target.color_id,
    };

    session.score += outcome.score_delta;
    session.spawn_explosion(outcome.pos, outcome.color_id);
    session.flash = 1.0;
    // Keep spawn order for the remaining targets
    session.targets.remove(index);
    session.events.push(GameEvent::TargetHit {
        id: outcome.target_id,
        score_delta: outcome.score_delta,
    });

    Some(outcome)
}
