//! Split Second Spark entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use glam::Vec2;
    use split_second_spark::Game;
    use split_second_spark::persistence::LocalStore;
    use split_second_spark::platform::{FrameHandle, FrameScheduler, Hud};
    use split_second_spark::renderer::CanvasSurface;
    use split_second_spark::sim::SessionPhase;

    const CANVAS_ID: &str = "gameCanvas";
    /// Pause between the last frame and the game over screen (ms)
    const GAME_OVER_DELAY_MS: i32 = 1000;

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// requestAnimationFrame with a single reusable callback
    struct RafScheduler {
        window: web_sys::Window,
        callback: FrameCallback,
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            let callback = self.callback.borrow();
            let closure = callback.as_ref()?;
            match self
                .window
                .request_animation_frame(closure.as_ref().unchecked_ref())
            {
                Ok(id) => Some(FrameHandle(id)),
                Err(e) => {
                    log::warn!("requestAnimationFrame failed: {:?}", e);
                    None
                }
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.window.cancel_animation_frame(handle.0).ok();
        }
    }

    /// HUD elements in the DOM
    struct DomHud {
        document: Document,
    }

    impl DomHud {
        /// Score with the browser locale's digit grouping ("12,345")
        fn format_score(score: u64) -> String {
            let locale = web_sys::window()
                .and_then(|w| w.navigator().language())
                .unwrap_or_else(|| "en-US".to_string());
            js_sys::Number::from(score as f64)
                .to_locale_string(&locale)
                .into()
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }
    }

    impl Hud for DomHud {
        fn show_score(&mut self, score: u64) {
            self.set_text("scoreDisplay", &Self::format_score(score));
        }

        fn show_lives(&mut self, lives: u32) {
            let Some(container) = self.document.get_element_by_id("livesDisplay") else {
                return;
            };
            container.set_inner_html("");
            for _ in 0..lives {
                if let Ok(heart) = self.document.create_element("div") {
                    heart.set_class_name("life-heart");
                    container.append_child(&heart).ok();
                }
            }
        }

        fn show_game_over(&mut self, score: u64, best: u64) {
            self.set_text("finalScore", &Self::format_score(score));
            self.set_text("highScore", &Self::format_score(best));

            // Let the last explosion play out before switching screens
            let show = Closure::once_into_js(|| {
                let over = with_app(|app| app.game.phase() == SessionPhase::GameOver);
                if over.unwrap_or(false) {
                    show_screen("gameOverScreen");
                }
            });
            if let Some(window) = web_sys::window() {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        show.unchecked_ref(),
                        GAME_OVER_DELAY_MS,
                    )
                    .ok();
            }
        }
    }

    /// Game instance plus the surface it draws on
    struct App {
        game: Game<RafScheduler, LocalStore, DomHud>,
        surface: CanvasSurface,
    }

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    /// Run `f` against the app unless it is missing or already borrowed
    fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
        APP.with(|slot| {
            let app = slot.borrow().clone()?;
            let mut app = app.try_borrow_mut().ok()?;
            Some(f(&mut app))
        })
    }

    /// Session state as JSON, for poking at from the devtools console
    #[wasm_bindgen]
    pub fn debug_snapshot() -> String {
        with_app(|app| app.game.snapshot_json().ok())
            .flatten()
            .unwrap_or_default()
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn show_screen(screen_id: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Ok(screens) = document.query_selector_all(".screen") {
            for i in 0..screens.length() {
                if let Some(screen) = screens.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    screen.class_list().remove_1("active").ok();
                }
            }
        }
        match document.get_element_by_id(screen_id) {
            Some(screen) => {
                screen.class_list().add_1("active").ok();
            }
            None => log::error!("Screen not found: {}", screen_id),
        }
    }

    fn fit_to_window(surface: &mut CanvasSurface) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        surface.resize(width as u32, height as u32);
    }

    /// Pointer position in canvas pixels
    fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            (client_x as f64 - rect.left()) as f32,
            (client_y as f64 - rect.top()) as f32,
        )
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Split Second Spark starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let mut surface = CanvasSurface::from_element_id(CANVAS_ID).map_err(|e| {
            log::error!("{}", e);
            JsValue::from_str(&e.to_string())
        })?;
        fit_to_window(&mut surface);
        let canvas = surface.canvas().clone();

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let scheduler = RafScheduler {
            window: window.clone(),
            callback: callback.clone(),
        };
        let hud = DomHud {
            document: document.clone(),
        };
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(seed, scheduler, LocalStore::new(), hud);
        log::info!("High score: {}", game.high_score().best);

        let app = Rc::new(RefCell::new(App { game, surface }));
        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

        // The frame callback only holds a weak reference, so the app owns the loop
        {
            let weak: Weak<RefCell<App>> = Rc::downgrade(&app);
            *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                if let Some(app) = weak.upgrade() {
                    let mut app = app.borrow_mut();
                    let App { game, surface } = &mut *app;
                    game.frame(time, surface);
                }
            }));
        }

        setup_input_handlers(&canvas, app.clone())?;
        setup_menu_buttons(&document, app.clone())?;
        setup_auto_stop(&window, &document, app)?;

        show_screen("startScreen");
        log::info!("Split Second Spark ready");
        Ok(())
    }

    fn start_game(app: &Rc<RefCell<App>>) {
        show_screen("gameScreen");
        let mut app = app.borrow_mut();
        fit_to_window(&mut app.surface);
        app.game.start(now());
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        // Mouse click
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let point = canvas_point(&canvas_clone, event.client_x(), event.client_y());
                app.borrow_mut().game.tap(point);
            });
            canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let point = canvas_point(&canvas_clone, touch.client_x(), touch.client_y());
                    app.borrow_mut().game.tap(point);
                }
            });
            canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // No context menu on long-press / right click
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
            });
            canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_menu_buttons(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        for id in ["startButton", "playAgainButton"] {
            let Some(btn) = document.get_element_by_id(id) else {
                log::error!("Button not found: {}", id);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                start_game(&app);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let screen_buttons = [
            ("instructionsButton", "instructionsScreen"),
            ("backToMenuButton", "startScreen"),
            ("backToMenuFromGameOver", "startScreen"),
        ];
        for (id, screen) in screen_buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                show_screen(screen);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_auto_stop(
        window: &web_sys::Window,
        document: &Document,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        // Escape: back to the menu
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Escape" && app.borrow_mut().game.stop() {
                    show_screen("startScreen");
                }
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && app.borrow_mut().game.stop()
                {
                    log::info!("Stopped (tab hidden)");
                    show_screen("startScreen");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                fit_to_window(&mut app.borrow_mut().surface);
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Split Second Spark (native) starting...");
    log::info!("Native mode runs a headless autoplayer - run with `trunk serve` for the web version");

    let seed = rand::random();
    let report = headless::run(seed);
    log::info!(
        "Autoplayer finished: score {} ({} hits, {} misses) after {:.1}s{}",
        report.score,
        report.hits,
        report.misses,
        report.elapsed_ms / 1000.0,
        if report.finished { "" } else { " (time limit)" }
    );
}

/// Headless session driven by a simulated player
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::collections::HashMap;

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use split_second_spark::Game;
    use split_second_spark::consts::INITIAL_LIVES;
    use split_second_spark::persistence::MemoryStore;
    use split_second_spark::platform::{LogHud, ManualScheduler};
    use split_second_spark::renderer::{Color, GradientStop, Surface};
    use split_second_spark::sim::SessionPhase;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after five minutes of game time
    const MAX_FRAMES: usize = 60 * 60 * 5;
    /// Simulated reaction time range (ms); the top end misses young targets
    const REACTION_MS: std::ops::Range<f32> = 150.0..2400.0;

    /// Surface that draws nothing
    struct NullSurface {
        size: Vec2,
    }

    impl Surface for NullSurface {
        fn size(&self) -> Vec2 {
            self.size
        }
        fn clear(&mut self) {}
        fn fill_circle(&mut self, _: Vec2, _: f32, _: Color) {}
        fn stroke_arc(&mut self, _: Vec2, _: f32, _: f32, _: f32, _: f32, _: Color) {}
        fn fill_radial_gradient(&mut self, _: Vec2, _: f32, _: f32, _: &[GradientStop]) {}
        fn fill_rect(&mut self, _: Vec2, _: Vec2, _: Color) {}
    }

    pub struct Report {
        pub score: u64,
        pub hits: u32,
        pub misses: u32,
        pub elapsed_ms: f64,
        /// Lives ran out before the time limit
        pub finished: bool,
    }

    pub fn run(seed: u64) -> Report {
        let mut player = Pcg32::seed_from_u64(seed ^ 0x5EED);
        let mut reactions: HashMap<u32, f32> = HashMap::new();
        let mut surface = NullSurface {
            size: Vec2::new(1280.0, 720.0),
        };
        let mut game = Game::new(seed, ManualScheduler::new(), MemoryStore::new(), LogHud);

        let mut now = 0.0;
        let mut hits = 0;
        let mut frames = 0;
        game.start(now);

        while frames < MAX_FRAMES && game.scheduler_mut().fire().is_some() {
            now += FRAME_MS;
            frames += 1;
            game.frame(now, &mut surface);

            // Tap every target the simulated player has "seen" for long enough
            let due: Vec<Vec2> = game
                .session()
                .targets
                .iter()
                .filter(|t| {
                    let reaction = *reactions
                        .entry(t.id)
                        .or_insert_with(|| player.random_range(REACTION_MS));
                    t.max_lifetime - t.lifetime >= reaction
                })
                .map(|t| t.pos)
                .collect();
            for pos in due {
                if game.tap(pos).is_some() {
                    hits += 1;
                }
            }
            reactions.retain(|id, _| game.session().targets.iter().any(|t| t.id == *id));
        }

        let session = game.session();
        Report {
            score: session.score,
            hits,
            misses: INITIAL_LIVES - session.lives,
            elapsed_ms: now,
            finished: game.phase() == SessionPhase::GameOver,
        }
    }
}
