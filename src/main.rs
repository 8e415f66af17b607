//! Layer Breach entry point
//!
//! On wasm32 this hosts the frame loop, keyboard input and HUD. Natively it
//! plays one seeded run with a simple autopilot and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use layer_breach::consts::*;
    use layer_breach::persistence::{KeyValueStore, LocalStore, MemoryStore};
    use layer_breach::sim::RunPhase;
    use layer_breach::{GameEvent, Progression, RunState, TickInput, Tuning, tick};

    /// Game instance holding all state
    struct Game {
        state: RunState,
        progression: Progression<Box<dyn KeyValueStore>>,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        last_phase: RunPhase,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let store: Box<dyn KeyValueStore> = match LocalStore::open() {
                Ok(store) => Box::new(store),
                Err(e) => {
                    log::warn!("{}; progress will not be saved", e);
                    Box::new(MemoryStore::new())
                }
            };
            let progression = Progression::open(store);
            let state = RunState::new(
                seed,
                progression.prestige(),
                progression.identity(),
                Tuning::default(),
            );
            Self {
                state,
                progression,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                last_phase: RunPhase::Running,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.pause = false;
            }

            let now = js_sys::Date::now();
            for event in self.state.drain_events() {
                if let GameEvent::LayerReached { layer, name } = &event {
                    log::info!("Entered layer {} ({})", layer, name);
                }
                self.progression.handle_event(&event, now);
            }

            // Summarise the run once when it ends
            if self.state.phase != self.last_phase {
                if self.state.phase == RunPhase::GameOver {
                    let report = self.progression.record_run_result(&self.state.summary());
                    for id in &report.new_achievements {
                        log::info!("Achievement unlocked: {}", id);
                    }
                }
                self.last_phase = self.state.phase;
            }
        }

        fn restart(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.state.restart_with(seed, self.progression.prestige());
            self.accumulator = 0.0;
            self.input = TickInput::default();
            self.last_phase = RunPhase::Running;
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snapshot = self.state.snapshot();

            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };
            set_text("#hud-score .hud-value", &snapshot.score.to_string());
            set_text("#hud-combo .hud-value", &format!("x{:.1}", snapshot.combo));
            set_text(
                "#hud-layer .hud-value",
                &format!("{} {}", snapshot.layer, snapshot.layer_name),
            );
            set_text("#hud-lives .hud-value", &snapshot.lives.to_string());
            set_text("#hud-rank .hud-value", snapshot.rank.name);

            if let Some(el) = document.get_element_by_id("pause-menu") {
                let class = if snapshot.paused { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if snapshot.game_over { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
            if snapshot.game_over {
                set_text("#final-score", &snapshot.final_score.to_string());
            }

            // Entity views for the JS renderer
            if let Some(el) = document.get_element_by_id("sim-snapshot") {
                if let Ok(json) = serde_json::to_string(&snapshot) {
                    let _ = el.set_attribute("data-snapshot", &json);
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Layer Breach starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(loading) = window
            .document()
            .and_then(|d| d.get_element_by_id("loading"))
        {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Layer Breach running!");
    }

    /// Apply a key press or release to the held input state
    fn apply_key(input: &mut TickInput, key: &str, down: bool) {
        match key {
            "ArrowLeft" | "a" | "A" => input.left = down,
            "ArrowRight" | "d" | "D" => input.right = down,
            "ArrowUp" | "w" | "W" => input.up = down,
            "ArrowDown" | "s" | "S" => input.down = down,
            " " | "j" | "J" => input.fire = down,
            "Escape" | "p" | "P" if down => input.pause = true,
            _ => {}
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (event_name, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if down && event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                if down && g.state.is_game_over() && event.key() == "Enter" {
                    g.restart();
                    return;
                }
                apply_key(&mut g.input, &event.key(), down);
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if !g.state.paused && !g.state.is_game_over() {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if !g.state.paused && !g.state.is_game_over() {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Layer Breach (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x1a7e_b4ea);
    headless::play(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use layer_breach::consts::SIM_DT;
    use layer_breach::persistence::MemoryStore;
    use layer_breach::sim::{EntityTag, RunSnapshot};
    use layer_breach::{GameEvent, Progression, RunState, TickInput, Tuning, tick};

    /// Ten simulated minutes
    const MAX_TICKS: u32 = 120 * 600;

    /// Follow the nearest hostile's row and keep firing
    fn autopilot(snapshot: &RunSnapshot) -> TickInput {
        let player = &snapshot.player;
        let target = snapshot
            .entities
            .iter()
            .filter(|e| matches!(e.tag, EntityTag::Enemy | EntityTag::Boss))
            .filter(|e| e.x > player.x)
            .min_by(|a, b| a.x.total_cmp(&b.x));
        let mut input = TickInput {
            fire: true,
            ..Default::default()
        };
        if let Some(target) = target {
            let dy = target.y - player.y;
            input.up = dy < -4.0;
            input.down = dy > 4.0;
        }
        input
    }

    pub fn play(seed: u64) {
        let mut progression = Progression::open(MemoryStore::new());
        let mut state = RunState::new(
            seed,
            progression.prestige(),
            "autopilot",
            Tuning::default(),
        );

        let mut submitted = false;
        for _ in 0..MAX_TICKS {
            let input = autopilot(&state.snapshot());
            tick(&mut state, &input, SIM_DT);
            for event in state.drain_events() {
                submitted |= matches!(event, GameEvent::SubmitScore { .. });
                progression.handle_event(&event, state.time_ms);
            }
            if submitted {
                break;
            }
        }

        let summary = state.summary();
        let report = progression.record_run_result(&summary);
        log::info!(
            "Run finished: score {}, layer {}, accuracy {:.0}%, {} new achievements",
            summary.final_score,
            summary.deepest_layer,
            summary.accuracy * 100.0,
            report.new_achievements.len()
        );
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::warn!("Failed to serialise summary: {}", e),
        }
    }
}
