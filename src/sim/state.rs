//! Session state and entity types
//!
//! Everything a single playthrough mutates lives in [`GameSession`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::*;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionPhase {
    /// Not started, or stopped by the player (menu, tab hidden)
    #[default]
    Idle,
    /// Frames are being simulated and input is accepted
    Running,
    /// Lives ran out; the score is final
    GameOver,
}

/// Something that happened during a frame or a tap, for HUD/log consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    TargetSpawned { id: u32 },
    TargetHit { id: u32, score_delta: u64 },
    /// Target expired without being hit
    TargetMissed { id: u32 },
    LifeLost { lives: u32 },
    GameOver { score: u64 },
}

/// A tappable, time-limited circle
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// Index into [`PALETTE`]
    pub color_id: usize,
    /// Milliseconds left before the target expires
    pub lifetime: f32,
    pub max_lifetime: f32,
    /// Glow pulse offset so simultaneous targets don't pulse in lockstep
    pub pulse_phase: f32,
    /// Current glow intensity (0-1)
    pub glow: f32,
    /// Set once when tapped; a hit target never counts as a miss
    pub hit: bool,
}

impl Target {
    pub fn new(id: u32, pos: Vec2, color_id: usize, lifetime: f32, pulse_phase: f32) -> Self {
        Self {
            id,
            pos,
            radius: TARGET_RADIUS,
            color_id,
            lifetime,
            max_lifetime: lifetime,
            pulse_phase,
            glow: 0.0,
            hit: false,
        }
    }

    /// Advance by `dt_ms` and refresh the glow pulse from wall-clock time.
    /// Returns whether the target is still alive.
    pub fn update(&mut self, dt_ms: f32, now_ms: f64) -> bool {
        self.lifetime -= dt_ms;
        self.glow = ((now_ms * 0.01 + self.pulse_phase as f64).sin() * 0.5 + 0.5) as f32;
        self.lifetime > 0.0
    }

    /// Fraction of the lifetime still left (1 at spawn, 0 at expiry)
    pub fn remaining_fraction(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            return 0.0;
        }
        (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }

    /// Point-in-circle against the base radius, not the shrunk draw radius
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance_squared(self.pos) <= self.radius * self.radius
    }
}

/// Decorative debris from a destroyed target
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    /// 0-1, decreases every frame
    pub life: f32,
    pub size: f32,
    pub color_id: usize,
}

impl Particle {
    /// Per-frame step. Frame-based rather than time-based, like the rest of the debris FX.
    pub fn update(&mut self) -> bool {
        self.pos += self.vel;
        self.vel *= PARTICLE_DRAG;
        self.life -= PARTICLE_LIFE_DECAY;
        self.size *= PARTICLE_SIZE_DECAY;
        self.life > 0.0
    }
}

/// Mutable state for one playthrough
#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    /// RNG seed for this session
    pub seed: u64,
    pub score: u64,
    pub lives: u32,
    /// Difficulty multiplier, starts at 1 and grows per spawn
    pub speed_factor: f64,
    /// Current gap between spawns (ms)
    pub spawn_interval_ms: f64,
    /// Host timestamp of the last spawn (ms)
    pub last_spawn_ms: f64,
    /// Host timestamp of the last simulated frame (ms)
    pub last_frame_ms: f64,
    pub phase: SessionPhase,
    /// Live targets in spawn order (hit testing relies on this order)
    pub targets: Vec<Target>,
    /// Live particles, unordered
    pub particles: Vec<Particle>,
    /// Screen flash intensity (0-1)
    pub flash: f32,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip)]
    rng: Pcg32,
    next_id: u32,
}

impl GameSession {
    /// Create an idle session with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            score: 0,
            lives: INITIAL_LIVES,
            speed_factor: 1.0,
            spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            last_spawn_ms: 0.0,
            last_frame_ms: 0.0,
            phase: SessionPhase::Idle,
            targets: Vec::new(),
            particles: Vec::new(),
            flash: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Reset to a fresh playthrough and begin running at `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        let seed = self.seed;
        *self = Self::new(seed);
        self.last_spawn_ms = now_ms;
        self.last_frame_ms = now_ms;
        self.phase = SessionPhase::Running;
    }

    /// Stop a running session without ending it (exit to menu, tab hidden).
    /// Returns false if it wasn't running.
    pub fn stop(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.phase = SessionPhase::Idle;
        true
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Charge one life for an expired target; ends the session at zero
    pub fn lose_life(&mut self) {
        if self.lives == 0 {
            return;
        }
        self.lives -= 1;
        self.events.push(GameEvent::LifeLost { lives: self.lives });
        if self.lives == 0 && self.phase == SessionPhase::Running {
            self.phase = SessionPhase::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
        }
    }

    /// Burst of debris at `pos` in the given palette color
    pub fn spawn_explosion(&mut self, pos: Vec2, color_id: usize) {
        self.particles.reserve(EXPLOSION_PARTICLES);
        for _ in 0..EXPLOSION_PARTICLES {
            let vel = Vec2::new(
                self.rng.random_range(-PARTICLE_MAX_SPEED..PARTICLE_MAX_SPEED),
                self.rng.random_range(-PARTICLE_MAX_SPEED..PARTICLE_MAX_SPEED),
            );
            let size = self.rng.random_range(2.0..6.0);
            self.particles.push(Particle {
                pos,
                vel,
                life: 1.0,
                size,
                color_id,
            });
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = GameSession::new(7);
        assert_eq!(session.phase, SessionPhase::Idle);
        assert_eq!(session.lives, INITIAL_LIVES);
        assert_eq!(session.score, 0);
        assert!(!session.is_running());
    }

    #[test]
    fn test_start_resets_state() {
        let mut session = GameSession::new(7);
        session.start(0.0);
        session.score = 900;
        session.lives = 1;
        session.speed_factor = 1.4;
        session.spawn_explosion(Vec2::new(10.0, 10.0), 0);

        session.start(5000.0);
        assert!(session.is_running());
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, INITIAL_LIVES);
        assert_eq!(session.speed_factor, 1.0);
        assert!(session.particles.is_empty());
        assert_eq!(session.last_spawn_ms, 5000.0);
        assert_eq!(session.last_frame_ms, 5000.0);
    }

    #[test]
    fn test_target_update_and_expiry() {
        let mut target = Target::new(1, Vec2::new(100.0, 200.0), 0, 1000.0, 0.0);
        assert!(target.update(400.0, 0.0));
        assert!((target.remaining_fraction() - 0.6).abs() < 1e-6);
        assert!(!target.update(600.0, 16.0));
        assert_eq!(target.remaining_fraction(), 0.0);
    }

    #[test]
    fn test_target_glow_in_unit_range() {
        let mut target = Target::new(1, Vec2::ZERO, 0, 2000.0, 1.3);
        for i in 0..200 {
            target.update(1.0, i as f64 * 17.0);
            assert!((0.0..=1.0).contains(&target.glow));
        }
    }

    #[test]
    fn test_contains_uses_base_radius() {
        let mut target = Target::new(1, Vec2::new(100.0, 100.0), 0, 2000.0, 0.0);
        // Nearly expired: drawn at ~70% radius, hit area unchanged
        target.update(1990.0, 0.0);
        assert!(target.contains(Vec2::new(100.0 + TARGET_RADIUS, 100.0)));
        assert!(target.contains(Vec2::new(120.0, 110.0)));
        assert!(!target.contains(Vec2::new(100.0 + TARGET_RADIUS + 0.5, 100.0)));
    }

    #[test]
    fn test_particle_decay() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(2.0, -1.0),
            life: 1.0,
            size: 5.0,
            color_id: 2,
        };
        assert!(p.update());
        assert_eq!(p.pos, Vec2::new(2.0, -1.0));
        assert!((p.life - 0.98).abs() < 1e-6);
        assert!((p.size - 4.9).abs() < 1e-5);

        // 1.0 / 0.02 = 50 frames total
        let mut frames = 1;
        while p.update() {
            frames += 1;
        }
        assert!((49..=51).contains(&frames));
    }

    #[test]
    fn test_explosion_burst() {
        let mut session = GameSession::new(3);
        session.spawn_explosion(Vec2::new(50.0, 60.0), 3);
        assert_eq!(session.particles.len(), EXPLOSION_PARTICLES);
        for p in &session.particles {
            assert_eq!(p.pos, Vec2::new(50.0, 60.0));
            assert_eq!(p.color_id, 3);
            assert_eq!(p.life, 1.0);
            assert!((2.0..6.0).contains(&p.size));
            assert!(p.vel.x.abs() <= PARTICLE_MAX_SPEED && p.vel.y.abs() <= PARTICLE_MAX_SPEED);
        }
    }

    #[test]
    fn test_lose_life_to_game_over() {
        let mut session = GameSession::new(1);
        session.start(0.0);
        session.score = 450;
        session.lose_life();
        session.lose_life();
        assert!(session.is_running());
        session.lose_life();
        assert_eq!(session.phase, SessionPhase::GameOver);
        assert_eq!(session.lives, 0);

        // Saturates
        session.lose_life();
        assert_eq!(session.lives, 0);

        let events = session.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::GameOver { score: 450 }));
        assert!(session.events.is_empty());
    }

    #[test]
    fn test_stop_only_from_running() {
        let mut session = GameSession::new(1);
        assert!(!session.stop());
        session.start(0.0);
        assert!(session.stop());
        assert_eq!(session.phase, SessionPhase::Idle);
    }
}
