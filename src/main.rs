//! Fly Frog entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use fly_frog::audio::AudioManager;
    use fly_frog::platform::web::{CanvasPresenter, now_ms};
    use fly_frog::platform::{dispatch, present};
    use fly_frog::sim::{FrameOutcome, GameState, InputKind, LoopToken, handle_input, on_frame};
    use fly_frog::{HighScore, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        presenter: CanvasPresenter,
        audio: AudioManager,
        store: HighScore,
        settings: Settings,
        /// Pending requestAnimationFrame handle
        raf_handle: Option<i32>,
    }

    impl Game {
        /// Route drained events, then redraw
        fn flush(&mut self) {
            let events = self.state.drain_events();
            dispatch(&events, &mut self.presenter, &mut self.audio, &mut self.store);
            present(&self.state, &mut self.presenter, self.settings.show_fps);
        }

        fn input(&mut self, kind: InputKind) -> Option<LoopToken> {
            self.audio.unlock();
            if !self.state.is_running() {
                self.settings.apply_to(&mut self.state.tuning);
            }
            let token = handle_input(&mut self.state, kind, now_ms());
            self.flush();
            token
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Fly Frog starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();
        let store = HighScore::load();
        let mut tuning = Tuning::default();
        settings.apply_to(&mut tuning);

        let presenter = CanvasPresenter::new(&canvas, &tuning).expect("no 2d context");
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(tuning, seed, store.best);
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            presenter,
            audio,
            store,
            settings,
            raf_handle: None,
        }));
        game.borrow_mut().flush();

        setup_input_handlers(&canvas, game);

        log::info!("Fly Frog ready, waiting for input");
    }

    fn send_input(game: &Rc<RefCell<Game>>, kind: InputKind) {
        let token = game.borrow_mut().input(kind);
        if let Some(token) = token {
            request_animation_frame(game.clone(), token);
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        send_input(&game, InputKind::Flap);
                    }
                    "Enter" => send_input(&game, InputKind::Start),
                    "t" | "T" | "ArrowRight" => {
                        event.prevent_default();
                        send_input(&game, InputKind::TongueExtend);
                    }
                    "m" | "M" => {
                        let mut g = game.borrow_mut();
                        let muted = g.settings.toggle_mute();
                        let settings = g.settings.clone();
                        g.audio.apply_settings(&settings);
                        settings.save();
                        log::info!("Muted: {}", muted);
                    }
                    "f" | "F" => {
                        let mut g = game.borrow_mut();
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start (flap)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                send_input(&game, InputKind::Flap);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click (flap)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                send_input(&game, InputKind::Flap);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Schedule the next frame for the chain `token`, cancelling any pending one
    fn request_animation_frame(game: Rc<RefCell<Game>>, token: LoopToken) {
        let window = web_sys::window().unwrap();
        if let Some(handle) = game.borrow_mut().raf_handle.take() {
            let _ = window.cancel_animation_frame(handle);
        }

        let loop_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(loop_game, token, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().raf_handle = Some(handle),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, token: LoopToken, time: f64) {
        let outcome = {
            let mut g = game.borrow_mut();
            g.raf_handle = None;
            let outcome = on_frame(&mut g.state, token, time);
            g.flush();
            outcome
        };

        if outcome == FrameOutcome::Continue {
            request_animation_frame(game, token);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use fly_frog::platform::{Presenter, Silent, dispatch};
    use fly_frog::sim::{FrameOutcome, GameState, InputKind, handle_input, on_frame};
    use fly_frog::{HighScore, Tuning};
    use glam::Vec2;

    /// Presenter that only counts what scrolled away
    #[derive(Default)]
    struct Tally {
        pipes_cleared: u32,
        flies_cleared: u32,
    }

    impl Presenter for Tally {
        fn render_player(&mut self, _y: f32) {}
        fn render_obstacle(&mut self, _id: u32, _x: f32, _top: f32, _bottom: f32) {}
        fn remove_obstacle(&mut self, _id: u32) {
            self.pipes_cleared += 1;
        }
        fn render_collectible(&mut self, _id: u32, _x: f32, _y: f32) {}
        fn remove_collectible(&mut self, _id: u32) {
            self.flies_cleared += 1;
        }
        fn render_tongue(&mut self, _anchor: Vec2, _length: f32) {}
        fn hide_tongue(&mut self) {}
    }

    /// Flap whenever the frog sinks below the next gap's center
    fn wants_flap(state: &GameState) -> bool {
        let pipes = &state.tuning.pipes;
        let player = &state.player;
        let target = state
            .obstacles
            .iter()
            .find(|o| o.x + pipes.width > player.left())
            .map(|o| o.gap_center(pipes.gap) + 15.0)
            .unwrap_or(state.tuning.playfield.height / 2.0);
        player.vel_y >= 0.0 && player.bottom() > target
    }

    /// Play one run at 60 Hz until game over or `max_seconds` elapse
    pub fn autoplay(tuning: Tuning, seed: u64, max_seconds: f64) {
        let mut store = HighScore::load();
        let mut tally = Tally::default();
        let mut state = GameState::new(tuning, seed, store.best);
        let frame_ms = 1000.0 / 60.0;

        let mut now = 0.0;
        let Some(token) = handle_input(&mut state, InputKind::Start, now) else {
            return;
        };

        while now < max_seconds * 1000.0 {
            if on_frame(&mut state, token, now) == FrameOutcome::Stop {
                break;
            }
            if state.is_running() && wants_flap(&state) {
                handle_input(&mut state, InputKind::Flap, now);
            }
            let events = state.drain_events();
            dispatch(&events, &mut tally, &mut Silent, &mut store);
            now += frame_ms;
        }
        let events = state.drain_events();
        dispatch(&events, &mut tally, &mut Silent, &mut store);

        let stats = &state.stats;
        log::info!(
            "Run finished after {:.1}s: phase {:?}, {} steps, {} flaps",
            now / 1000.0,
            state.phase,
            stats.steps,
            stats.flap_count
        );
        println!(
            "score {} (best {}), flies caught {}, pipes cleared {}, flies gone {}",
            stats.score, stats.high_score, stats.flies_caught, tally.pipes_cleared, tally.flies_cleared
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fly Frog (native) starting...");
    log::info!("Native mode runs a headless autoplay session - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => {
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| fly_frog::Tuning::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(tuning) => tuning,
                Err(e) => {
                    log::error!("Failed to load tuning from {}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        None => fly_frog::Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    headless::autoplay(tuning, seed, 120.0);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
