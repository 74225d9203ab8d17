//! Platform abstraction layer
//!
//! Seams between the game driver and its host:
//! - Frame scheduling (requestAnimationFrame on web)
//! - HUD output (DOM elements on web, the log elsewhere)

/// Opaque handle for a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Requests and cancels display-refresh callbacks
pub trait FrameScheduler {
    /// Ask for one more frame. `None` means the host refused the request.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Write-only heads-up display
pub trait Hud {
    fn show_score(&mut self, score: u64);
    fn show_lives(&mut self, lives: u32);
    fn show_game_over(&mut self, score: u64, best: u64);
}

/// Scheduler that only records requests; the caller decides when frames run
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: i32,
    pending: Option<FrameHandle>,
    pub requested: Vec<FrameHandle>,
    pub cancelled: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding request, if any
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Consume the outstanding request, as if its callback fired
    pub fn fire(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        self.requested.push(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled.push(handle);
    }
}

/// HUD that writes to the log
#[derive(Debug, Default)]
pub struct LogHud;

impl Hud for LogHud {
    fn show_score(&mut self, score: u64) {
        log::debug!("Score: {}", score);
    }

    fn show_lives(&mut self, lives: u32) {
        log::debug!("Lives: {}", lives);
    }

    fn show_game_over(&mut self, score: u64, best: u64) {
        log::info!("Game over - score {} (best {})", score, best);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_handles_are_unique() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame().unwrap();
        let b = s.request_frame().unwrap();
        assert_ne!(a, b);
        assert_eq!(s.pending(), Some(b));
        assert_eq!(s.requested, vec![a, b]);
    }

    #[test]
    fn test_cancel_clears_pending() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame().unwrap();
        s.cancel_frame(a);
        assert_eq!(s.pending(), None);
        assert_eq!(s.cancelled, vec![a]);
    }

    #[test]
    fn test_cancel_stale_handle_keeps_pending() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame().unwrap();
        let b = s.request_frame().unwrap();
        s.cancel_frame(a);
        assert_eq!(s.pending(), Some(b));
    }

    #[test]
    fn test_fire_consumes() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame().unwrap();
        assert_eq!(s.fire(), Some(a));
        assert_eq!(s.fire(), None);
    }
}
