//! Lantern Dash entry point
//!
//! On the web: wires keyboard events and requestAnimationFrame to the game
//! loop, and hands the renderer a JSON snapshot each frame. Natively: plays a
//! scripted attract-mode run headlessly and prints the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use lantern_dash::audio::AudioManager;
    use lantern_dash::sim::Action;
    use lantern_dash::{Command, GameLoop, PhaseChange, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        game_loop: GameLoop,
        audio: AudioManager,
        /// Latest snapshot, serialized for the canvas renderer
        snapshot_json: String,
        /// Audio was muted by losing focus and comes back on focus
        muted_by_blur: bool,
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Snapshot of the last frame for the renderer (empty before the first frame)
    #[wasm_bindgen]
    pub fn snapshot_json() -> String {
        GAME.with(|slot| {
            slot.borrow()
                .as_ref()
                .map(|game| game.borrow().snapshot_json.clone())
                .unwrap_or_default()
        })
    }

    /// Overlay buttons (play again / restart) post the same confirm action as Enter
    #[wasm_bindgen]
    pub fn confirm() {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.game_loop.post(Command::Press(Action::Confirm));
                g.game_loop.post(Command::Release(Action::Confirm));
            }
        });
    }

    /// Apply audio preferences passed by the host page as JSON
    #[wasm_bindgen]
    pub fn set_settings(json: &str) {
        let settings = Settings::from_json(json);
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                let mut g = game.borrow_mut();
                g.muted_by_blur = false;
                g.audio.set_settings(settings);
            }
        });
    }

    pub fn run(settings: Settings) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let seed = window
            .performance()
            .map(|p| (p.time_origin() + p.now()) as u64)
            .unwrap_or(0);
        log::info!("Lantern Dash starting with seed {}", seed);

        let game = Rc::new(RefCell::new(Game {
            game_loop: GameLoop::new(seed, Tuning::default()),
            audio: AudioManager::new(settings),
            snapshot_json: String::new(),
            muted_by_blur: false,
        }));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        setup_keyboard(&window, game.clone())?;
        setup_focus(&window, game.clone())?;
        request_animation_frame(game);
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(action) = Action::from_key(&event.key()) else {
                    return;
                };
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.game_loop.post(Command::Press(action));
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(action) = Action::from_key(&event.key()) {
                game.borrow_mut().game_loop.post(Command::Release(action));
            }
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Keyups are lost while unfocused, so drop held keys on blur
    fn setup_focus(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                let mut g = game.borrow_mut();
                g.game_loop.post(Command::ReleaseAll);
                let settings = g.audio.settings();
                if settings.mute_on_blur && !settings.muted {
                    g.audio.set_muted(true);
                    g.muted_by_blur = true;
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut g = game.borrow_mut();
            if g.muted_by_blur {
                g.audio.set_muted(false);
                g.muted_by_blur = false;
            }
        });
        window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
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
            let Game {
                game_loop, audio, ..
            } = &mut *g;
            let changes = game_loop.frame(time, audio);
            let json = serde_json::to_string(&game_loop.snapshot()).unwrap_or_default();
            g.snapshot_json = json;
            for change in changes {
                show_overlay(change);
            }
        }

        request_animation_frame(game);
    }

    /// Mirror the phase onto the root element so CSS can show the overlays
    fn show_overlay(change: PhaseChange) {
        let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        let _ = root.set_attribute("data-phase", &format!("{:?}", change.to));
        match change.reason {
            Some(reason) => {
                let _ = root.set_attribute("data-reason", &format!("{:?}", reason));
            }
            None => {
                let _ = root.remove_attribute("data-reason");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    wasm_game::run(lantern_dash::Settings::default())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use serde::Serialize;

    use lantern_dash::sim::{Action, AudioSink, GameOverReason, GamePhase, Session};
    use lantern_dash::{Command, GameLoop, Tuning};

    /// Simulated frame length
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Hard stop so a stuck run still terminates
    const MAX_FRAMES: u32 = 60 * 450;

    /// Logs cues instead of playing them
    struct LogAudio;

    impl AudioSink for LogAudio {
        fn on_jump(&mut self) {
            log::debug!("sound: jump");
        }
        fn on_coin(&mut self) {
            log::debug!("sound: coin");
        }
        fn on_hurt(&mut self) {
            log::debug!("sound: hurt");
        }
        fn on_bells(&mut self) {
            log::info!("sound: bells");
        }
        fn on_festive(&mut self) {
            log::info!("sound: festive");
        }
    }

    #[derive(Debug, Serialize)]
    struct RunSummary {
        seed: u64,
        frames: u32,
        phase: GamePhase,
        reason: Option<GameOverReason>,
        session: Session,
        player_x: f32,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let mut args = std::env::args().skip(1);
        let tuning = match args.next() {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(&path)?)?,
            None => Tuning::default(),
        };
        let seed = match args.next() {
            Some(seed) => seed.parse()?,
            None => 2024,
        };

        let mut game = GameLoop::new(seed, tuning);
        let mut audio = LogAudio;
        game.post(Command::Press(Action::Confirm));
        game.post(Command::Release(Action::Confirm));
        game.post(Command::Press(Action::MoveRight));

        let mut frames = 0;
        while frames < MAX_FRAMES {
            // Charge for 12 frames, release, repeat every 40 frames
            match frames % 40 {
                0 => game.post(Command::Press(Action::Jump)),
                12 => game.post(Command::Release(Action::Jump)),
                _ => {}
            }

            for change in game.frame(frames as f64 * FRAME_MS, &mut audio) {
                log::info!("{:?} -> {:?} ({:?})", change.from, change.to, change.reason);
            }
            frames += 1;
            if game.state().phase.is_terminal() {
                break;
            }
        }
        game.shutdown();

        let state = game.state();
        let summary = RunSummary {
            seed: state.seed,
            frames,
            phase: state.phase,
            reason: state.game_over_reason,
            session: state.session,
            player_x: state.player.body.pos.x,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lantern Dash (native, headless attract mode) starting...");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
