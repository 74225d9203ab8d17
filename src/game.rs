//! Frame loop driver
//!
//! [`Game`] owns the session and the host seams, and runs the
//! Idle/Running/GameOver state machine: it schedules and cancels frames,
//! forwards session events to the HUD, and records the high score when a
//! session ends.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::platform::{FrameHandle, FrameScheduler, Hud};
use crate::renderer::{Surface, render};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameSession, HitOutcome, SessionPhase, advance, handle_tap};

/// Game instance holding all state
pub struct Game<S, K, H> {
    session: GameSession,
    /// Seeds each new session, so restarts don't replay the same targets
    seeds: Pcg32,
    high_score: HighScore,
    settings: Settings,
    scheduler: S,
    store: K,
    hud: H,
    /// Frame requested but not yet run
    pending_frame: Option<FrameHandle>,
}

impl<S: FrameScheduler, K: KeyValueStore, H: Hud> Game<S, K, H> {
    /// Create an idle game; loads the high score and settings from `store`
    pub fn new(seed: u64, scheduler: S, store: K, hud: H) -> Self {
        let high_score = HighScore::load(&store);
        let settings = Settings::load(&store);
        Self {
            session: GameSession::new(seed),
            seeds: Pcg32::seed_from_u64(seed),
            high_score,
            settings,
            scheduler,
            store,
            hud,
            pending_frame: None,
        }
    }

    /// Begin a fresh session at host time `now_ms` (from Idle or GameOver)
    pub fn start(&mut self, now_ms: f64) {
        // Restarting mid-session must not leave a second loop running
        self.cancel_pending_frame();

        self.session = GameSession::new(self.seeds.random());
        self.session.start(now_ms);
        log::info!("Session started (seed {})", self.session.seed);

        self.hud.show_score(self.session.score);
        self.hud.show_lives(self.session.lives);
        self.request_next_frame();
    }

    /// Stop a running session (exit to menu, tab hidden). Returns false if
    /// nothing was running.
    pub fn stop(&mut self) -> bool {
        if !self.session.stop() {
            return false;
        }
        self.cancel_pending_frame();
        log::info!("Session stopped at score {}", self.session.score);
        true
    }

    /// Run one scheduled frame at host time `now_ms`.
    ///
    /// Frames arriving while not running are ignored and not rescheduled.
    pub fn frame(&mut self, now_ms: f64, surface: &mut impl Surface) {
        // The callback that got us here consumed the pending request
        self.pending_frame = None;
        if !self.session.is_running() {
            return;
        }

        advance(&mut self.session, now_ms, surface.size());
        render(&self.session, surface, &self.settings);
        self.flush_events();

        if self.session.is_running() {
            self.request_next_frame();
        }
    }

    /// Pointer press at canvas coordinates
    pub fn tap(&mut self, point: Vec2) -> Option<HitOutcome> {
        let outcome = handle_tap(&mut self.session, point);
        self.flush_events();
        outcome
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    pub fn high_score(&self) -> HighScore {
        self.high_score
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Apply new display settings and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(&mut self.store);
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    /// Session state as JSON, for debugging from the host
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.session)
    }

    fn request_next_frame(&mut self) {
        self.pending_frame = self.scheduler.request_frame();
        if self.pending_frame.is_none() {
            log::warn!("Frame request refused - loop halted");
        }
    }

    fn cancel_pending_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Forward session events to the HUD and the log
    fn flush_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::TargetSpawned { id } => log::trace!("Target {} spawned", id),
                GameEvent::TargetHit { id, score_delta } => {
                    log::debug!("Target {} hit for {}", id, score_delta);
                    self.hud.show_score(self.session.score);
                }
                GameEvent::TargetMissed { id } => log::debug!("Target {} missed", id),
                GameEvent::LifeLost { lives } => self.hud.show_lives(lives),
                GameEvent::GameOver { score } => self.finish(score),
            }
        }
    }

    fn finish(&mut self, score: u64) {
        log::info!("Game over with score {}", score);
        self.high_score.submit(score, &mut self.store);
        self.hud.show_game_over(score, self.high_score.best);
        self.cancel_pending_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::ManualScheduler;
    use crate::renderer::tests::{DrawCall, RecordingSurface};
    use crate::sim::Target;

    /// HUD double that remembers everything shown
    #[derive(Debug, Default)]
    struct RecordingHud {
        scores: Vec<u64>,
        lives: Vec<u32>,
        game_over: Option<(u64, u64)>,
    }

    impl Hud for RecordingHud {
        fn show_score(&mut self, score: u64) {
            self.scores.push(score);
        }

        fn show_lives(&mut self, lives: u32) {
            self.lives.push(lives);
        }

        fn show_game_over(&mut self, score: u64, best: u64) {
            self.game_over = Some((score, best));
        }
    }

    type TestGame = Game<ManualScheduler, MemoryStore, RecordingHud>;

    const FRAME_MS: f64 = 16.0;

    fn new_game(store: MemoryStore) -> TestGame {
        Game::new(7, ManualScheduler::new(), store, RecordingHud::default())
    }

    /// Run scheduled frames until the loop stops rescheduling (or `max` frames)
    fn run_frames(game: &mut TestGame, surface: &mut RecordingSurface, now: &mut f64, max: usize) -> usize {
        let mut frames = 0;
        while frames < max && game.scheduler_mut().fire().is_some() {
            *now += FRAME_MS;
            game.frame(*now, surface);
            frames += 1;
        }
        frames
    }

    #[test]
    fn test_start_shows_hud_and_requests_frame() {
        let mut game = new_game(MemoryStore::new());
        assert_eq!(game.phase(), SessionPhase::Idle);

        game.start(100.0);
        assert_eq!(game.phase(), SessionPhase::Running);
        assert_eq!(game.hud().scores, vec![0]);
        assert_eq!(game.hud().lives, vec![3]);
        assert!(game.scheduler().pending().is_some());
        assert_eq!(game.session().last_frame_ms, 100.0);
    }

    #[test]
    fn test_frame_renders_and_reschedules() {
        let mut game = new_game(MemoryStore::new());
        let mut surface = RecordingSurface::new(800.0, 600.0);
        game.start(0.0);

        let mut now = 0.0;
        let frames = run_frames(&mut game, &mut surface, &mut now, 5);
        assert_eq!(frames, 5);
        assert_eq!(surface.calls.first(), Some(&DrawCall::Clear));
        assert!(game.scheduler().pending().is_some());
        assert_eq!(game.scheduler().requested.len(), 6);
    }

    #[test]
    fn test_untouched_game_ends_after_three_misses() {
        let mut game = new_game(MemoryStore::new());
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now = 0.0;
        game.start(now);

        run_frames(&mut game, &mut surface, &mut now, 100_000);

        assert_eq!(game.phase(), SessionPhase::GameOver);
        assert_eq!(game.session().lives, 0);
        assert_eq!(game.hud().lives, vec![3, 2, 1, 0]);
        // Loop halted: nothing pending and a stale frame changes nothing
        assert_eq!(game.scheduler().pending(), None);
        let requested = game.scheduler().requested.len();
        game.frame(now + 1000.0, &mut surface);
        assert_eq!(game.scheduler().requested.len(), requested);
        // Zero doesn't beat an empty record
        assert_eq!(game.hud().game_over, Some((0, 0)));
        assert_eq!(game.store().get(HighScore::STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_game_over_records_high_score() {
        let store = MemoryStore::new().with_entry(HighScore::STORAGE_KEY, "150");
        let mut game = new_game(store);
        assert_eq!(game.high_score().best, 150);

        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now = 0.0;
        game.start(now);

        // Play until the first target appears, then hit it straight away
        while game.session().targets.is_empty() {
            assert_eq!(run_frames(&mut game, &mut surface, &mut now, 1), 1);
        }
        let pos = game.session().targets[0].pos;
        let outcome = game.tap(pos).expect("fresh target should be hit");
        assert_eq!(outcome.score_delta, 200);
        assert_eq!(game.hud().scores, vec![0, 200]);

        run_frames(&mut game, &mut surface, &mut now, 100_000);

        assert_eq!(game.phase(), SessionPhase::GameOver);
        assert_eq!(game.session().score, 200);
        assert_eq!(game.high_score().best, 200);
        assert_eq!(game.hud().game_over, Some((200, 200)));
        assert_eq!(game.store().get_int(HighScore::STORAGE_KEY).unwrap(), Some(200));
    }

    #[test]
    fn test_lower_score_keeps_best() {
        let store = MemoryStore::new().with_entry(HighScore::STORAGE_KEY, "9000");
        let mut game = new_game(store);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now = 0.0;
        game.start(now);
        run_frames(&mut game, &mut surface, &mut now, 100_000);

        assert_eq!(game.hud().game_over, Some((0, 9000)));
        assert_eq!(game.store().get_int(HighScore::STORAGE_KEY).unwrap(), Some(9000));
    }

    #[test]
    fn test_game_over_frame_draws_last_explosion() {
        let mut game = new_game(MemoryStore::new());
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now = 0.0;
        game.start(now);
        game.session.lives = 1;
        game.session.targets.push(Target::new(101, Vec2::new(100.0, 200.0), 0, 2000.0, 0.0));
        game.session.targets.push(Target::new(102, Vec2::new(500.0, 300.0), 1, 10.0, 0.0));

        assert!(game.tap(Vec2::new(100.0, 200.0)).is_some());
        // The short-lived target expires on the next frame and takes the last life
        assert_eq!(run_frames(&mut game, &mut surface, &mut now, 1), 1);

        assert_eq!(game.phase(), SessionPhase::GameOver);
        assert!(game.session().targets.is_empty());
        assert_eq!(surface.circles().len(), crate::consts::EXPLOSION_PARTICLES);
        assert_eq!(game.scheduler().pending(), None);
        assert_eq!(game.hud().game_over, Some((200, 200)));
    }

    #[test]
    fn test_unreadable_store_still_plays_to_game_over() {
        let mut game = new_game(MemoryStore::unavailable());
        assert_eq!(game.high_score().best, 0);
        assert_eq!(game.settings(), Settings::default());

        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now = 0.0;
        game.start(now);
        game.session.targets.push(Target::new(101, Vec2::new(300.0, 300.0), 2, 2000.0, 0.0));
        assert_eq!(game.tap(Vec2::new(300.0, 300.0)).map(|o| o.score_delta), Some(200));

        run_frames(&mut game, &mut surface, &mut now, 100_000);

        assert_eq!(game.phase(), SessionPhase::GameOver);
        assert_eq!(game.high_score().best, 200);
        assert_eq!(game.hud().game_over, Some((200, 200)));
        assert!(game.store().get(HighScore::STORAGE_KEY).is_err());
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let mut game = new_game(MemoryStore::new());
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now = 0.0;
        game.start(now);
        run_frames(&mut game, &mut surface, &mut now, 3);

        let pending = game.scheduler().pending().expect("loop should be running");
        assert!(game.stop());
        assert_eq!(game.phase(), SessionPhase::Idle);
        assert_eq!(game.scheduler().pending(), None);
        assert_eq!(game.scheduler().cancelled, vec![pending]);

        // A callback that slipped through after the cancel is a no-op
        let last_frame = game.session().last_frame_ms;
        let requested = game.scheduler().requested.len();
        game.frame(now + 5000.0, &mut surface);
        assert_eq!(game.session().last_frame_ms, last_frame);
        assert_eq!(game.scheduler().requested.len(), requested);

        assert!(!game.stop());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut game = new_game(MemoryStore::new());
        let mut surface = RecordingSurface::new(800.0, 600.0);
        let mut now = 0.0;
        game.start(now);
        run_frames(&mut game, &mut surface, &mut now, 100_000);
        assert_eq!(game.phase(), SessionPhase::GameOver);
        let first_seed = game.session().seed;

        game.start(now);
        assert_eq!(game.phase(), SessionPhase::Running);
        assert_eq!(game.session().lives, 3);
        assert_eq!(game.session().score, 0);
        assert!(game.session().targets.is_empty());
        assert_ne!(game.session().seed, first_seed);
        assert!(game.scheduler().pending().is_some());
    }

    #[test]
    fn test_restart_while_running_keeps_one_loop() {
        let mut game = new_game(MemoryStore::new());
        game.start(0.0);
        let first = game.scheduler().pending().unwrap();
        game.start(50.0);
        assert_eq!(game.scheduler().cancelled, vec![first]);
        assert_ne!(game.scheduler().pending(), Some(first));
        assert!(game.scheduler().pending().is_some());
    }

    #[test]
    fn test_tap_when_idle_is_ignored() {
        let mut game = new_game(MemoryStore::new());
        game.session.targets.push(Target::new(1, Vec2::new(100.0, 100.0), 0, 2000.0, 0.0));
        assert_eq!(game.tap(Vec2::new(100.0, 100.0)), None);
        assert!(game.hud().scores.is_empty());
    }

    #[test]
    fn test_whiff_tap_changes_nothing() {
        let mut game = new_game(MemoryStore::new());
        game.start(0.0);
        game.session.targets.push(Target::new(99, Vec2::new(100.0, 200.0), 1, 2000.0, 0.0));
        assert_eq!(game.tap(Vec2::new(700.0, 500.0)), None);
        assert_eq!(game.session().score, 0);
        assert_eq!(game.session().lives, 3);
        assert_eq!(game.hud().scores, vec![0]);
    }

    #[test]
    fn test_settings_persist() {
        let mut game = new_game(MemoryStore::new());
        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        game.set_settings(calm);
        assert_eq!(game.settings(), calm);
        assert_eq!(Settings::load(game.store()), calm);
    }

    #[test]
    fn test_snapshot_json() {
        let mut game = new_game(MemoryStore::new());
        game.start(0.0);
        let json = game.snapshot_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lives"], 3);
        assert_eq!(value["phase"], "Running");
        assert!(value.get("events").is_none());
    }
}
