//! Drop Catch entry point
//!
//! Browser: drives the simulation from animation frames and draws on a 2D
//! canvas. Native: runs a headless autoplay session and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, MouseEvent,
        TouchEvent,
    };

    use drop_catch::GameConfig;
    use drop_catch::platform::{AssetProvider, AssetTracker, FrameClock};
    use drop_catch::renderer::canvas::CanvasSurface;
    use drop_catch::renderer::draw_frame;
    use drop_catch::sim::{DisplayRect, GameEvent, GamePhase, GameState, PointerEvent, tick};

    /// Host-side state shared by the event handlers and the frame loop
    struct Game {
        state: GameState,
        assets: AssetTracker<HtmlImageElement>,
        surface: CanvasSurface,
        clock: FrameClock,
        /// An animation frame is pending
        looping: bool,
    }

    impl Game {
        fn draw(&mut self) {
            draw_frame(&self.state, &mut self.surface, &self.assets);
        }

        /// Push pending events into the DOM
        fn update_hud(&mut self) {
            let Some(document) = document() else {
                return;
            };
            for event in self.state.drain_events() {
                match event {
                    GameEvent::ScoreChanged { score, lives, level } => {
                        set_text(&document, "hud-score", &score.to_string());
                        set_text(&document, "hud-lives", &lives.to_string());
                        set_text(&document, "hud-level", &level.to_string());
                    }
                    GameEvent::SessionStarted => set_hidden(&document, "game-over", true),
                    GameEvent::SessionEnded { final_score } => {
                        set_text(&document, "final-score", &final_score.to_string());
                        set_hidden(&document, "game-over", false);
                        set_text(&document, "start-btn", "Restart");
                    }
                    _ => {}
                }
            }
            let effect = self.state.snapshot().active_effect_label.unwrap_or_default();
            set_text(&document, "hud-effect", &effect);
        }

        fn update_start_button(&self) {
            let Some(document) = document() else {
                return;
            };
            let settled = self.assets.is_settled();
            let label = if settled { "Start" } else { "Loading..." };
            set_text(&document, "start-btn", label);
            set_disabled(&document, "start-btn", !settled);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_disabled(document: &Document, id: &str, disabled: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if disabled {
                el.set_attribute("disabled", "")
            } else {
                el.remove_attribute("disabled")
            };
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Drop Catch starting...");

        let document = document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let config = GameConfig {
            seed: Some(js_sys::Date::now() as u64),
            ..Default::default()
        };
        canvas.set_width(config.field_width as u32);
        canvas.set_height(config.field_height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let state = GameState::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let keys: Vec<&'static str> = state.registry().iter().map(|s| s.visual).collect();

        let game = Rc::new(RefCell::new(Game {
            state,
            assets: AssetTracker::new(keys.iter().copied()),
            surface: CanvasSurface::new(ctx),
            clock: FrameClock::new(),
            looping: false,
        }));

        game.borrow().update_start_button();
        load_images(&keys, game.clone())?;
        setup_input_handlers(&canvas, game.clone());
        setup_start_button(game.clone());
        game.borrow_mut().draw();

        log::info!("Drop Catch ready");
        Ok(())
    }

    /// Start loading every visual. Both outcomes settle the asset.
    fn load_images(keys: &[&'static str], game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        for &key in keys {
            let image = HtmlImageElement::new()?;

            let onload = {
                let game = game.clone();
                let image = image.clone();
                Closure::<dyn FnMut()>::new(move || {
                    let mut g = game.borrow_mut();
                    g.assets.mark_loaded(key, image.clone());
                    g.update_start_button();
                    if !g.looping {
                        g.draw();
                    }
                })
            };
            let onerror = {
                let game = game.clone();
                Closure::<dyn FnMut()>::new(move || {
                    let mut g = game.borrow_mut();
                    g.assets.mark_failed(key, "image load error");
                    g.update_start_button();
                })
            };
            image.set_onload(Some(onload.as_ref().unchecked_ref()));
            image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onload.forget();
            onerror.forget();

            image.set_src(&format!("assets/{key}.png"));
        }
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                let pointer = PointerEvent::new(event.client_x() as f32, event.client_y() as f32);
                handle_press(&game, &canvas_clone, pointer);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch (first contact point only)
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pointer =
                        PointerEvent::new(touch.client_x() as f32, touch.client_y() as f32);
                    handle_press(&game, &canvas_clone, pointer);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn handle_press(game: &Rc<RefCell<Game>>, canvas: &HtmlCanvasElement, pointer: PointerEvent) {
        let rect = canvas.get_bounding_client_rect();
        let rect = DisplayRect {
            left: rect.left() as f32,
            top: rect.top() as f32,
            width: rect.width() as f32,
            height: rect.height() as f32,
        };
        let mut g = game.borrow_mut();
        if let Some(caught) = g.state.handle_pointer(pointer, rect) {
            log::debug!("Caught {:?} #{}", caught.kind, caught.id);
        }
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };
        let Some(btn) = document.get_element_by_id("start-btn") else {
            log::warn!("No start button found");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let start_loop = {
                let mut g = game.borrow_mut();
                let Game { state, assets, .. } = &mut *g;
                if let Err(e) = state.restart(&*assets) {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&e.to_string());
                    }
                    return;
                }
                g.clock.reset();
                g.update_hud();
                !std::mem::replace(&mut g.looping, true)
            };
            if start_loop {
                request_animation_frame(game.clone());
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_going = {
            let mut g = game.borrow_mut();
            let dt = g.clock.step(time);
            tick(&mut g.state, dt);
            g.draw();
            g.update_hud();

            let running = g.state.phase() == GamePhase::Running;
            g.looping = running;
            running
        };

        // No frames are requested once the session has ended
        if keep_going {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Drop Catch (native) starting...");

    let arg = std::env::args().nth(1);
    match autoplay::run(arg.as_deref()) {
        Ok(snapshot) => match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        },
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless session with a simple bot tapping through a scaled display
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use drop_catch::consts::REFERENCE_FRAME_SECS;
    use drop_catch::platform::AssetTracker;
    use drop_catch::sim::{DisplayRect, EntityKind, GameEvent, PointerEvent, Snapshot, tick};
    use drop_catch::{ConfigError, GameConfig, GameState, Preset};

    /// Ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 600;
    /// Chance per frame that the bot reacts
    const TAP_CHANCE: f64 = 0.12;
    /// Aim error in display pixels
    const AIM_JITTER: f32 = 12.0;

    /// Display the field at half size, offset like a centred canvas
    const DISPLAY: DisplayRect = DisplayRect {
        left: 40.0,
        top: 16.0,
        width: 200.0,
        height: 300.0,
    };

    /// Load a config from a preset name or a JSON file path
    fn load_config(arg: Option<&str>) -> Result<GameConfig, ConfigError> {
        let Some(arg) = arg else {
            return Ok(GameConfig::default());
        };
        if let Some(preset) = Preset::from_str(arg) {
            log::info!("Using preset '{}'", preset.as_str());
            return Ok(preset.config());
        }
        match std::fs::read_to_string(arg) {
            Ok(json) => GameConfig::from_json(&json),
            Err(e) => {
                log::warn!("Cannot read config '{}': {}, using defaults", arg, e);
                Ok(GameConfig::default())
            }
        }
    }

    pub fn run(arg: Option<&str>) -> Result<Snapshot, ConfigError> {
        let mut config = load_config(arg)?;
        let seed = *config.seed.get_or_insert(0x5eed);
        let sim_size = Vec2::new(config.field_width, config.field_height);

        let mut state = GameState::new(config)?;
        let keys: Vec<&'static str> = state.registry().iter().map(|s| s.visual).collect();
        let mut assets: AssetTracker<()> = AssetTracker::new(keys.iter().copied());
        for key in &keys {
            assets.mark_loaded(key, ());
        }

        if let Err(e) = state.start(&assets) {
            log::error!("{}", e);
            return Ok(state.snapshot());
        }

        let mut rng = Pcg32::seed_from_u64(seed ^ 0xb07);
        let scale = Vec2::new(DISPLAY.width, DISPLAY.height) / sim_size;
        let mut frames = 0;

        while state.is_running() && frames < MAX_FRAMES {
            let dt = REFERENCE_FRAME_SECS * rng.random_range(0.5..1.5);
            tick(&mut state, dt);

            if rng.random_bool(TAP_CHANCE) {
                // Lowest entity that is not harmful
                let target = state
                    .entities()
                    .iter()
                    .filter(|e| e.kind != EntityKind::Harmful && e.pos.y >= 0.0)
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|e| e.center());
                if let Some(center) = target {
                    let jitter = Vec2::new(
                        rng.random_range(-AIM_JITTER..AIM_JITTER),
                        rng.random_range(-AIM_JITTER..AIM_JITTER),
                    );
                    let on_screen = Vec2::new(DISPLAY.left, DISPLAY.top) + center * scale + jitter;
                    state.handle_pointer(PointerEvent::new(on_screen.x, on_screen.y), DISPLAY);
                }
            }

            for event in state.drain_events() {
                match event {
                    GameEvent::LevelChanged { from, to } => {
                        log::info!("Level {} -> {} after {} frames", from, to, frames)
                    }
                    GameEvent::EffectActivated { effect, remaining_ms } => {
                        log::info!("{} for {} ms", effect.label(), remaining_ms)
                    }
                    other => log::debug!("{:?}", other),
                }
            }
            frames += 1;
        }

        if state.is_running() {
            state.end();
        }
        log::info!("Autoplay finished after {} frames", frames);
        Ok(state.snapshot())
    }
}
