//! Hacker Breach entry point
//!
//! Wires the browser (canvas, DOM overlays, keyboard and touch, Web Audio,
//! LocalStorage, the terminal panel) to the engine and runs the frame loop.
//! The native build runs a short headless session for smoke testing.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use hacker_breach::SetupError;
    use hacker_breach::audio::WebSynth;
    use hacker_breach::cues::{Cue, CueQueue};
    use hacker_breach::platform::storage::LocalStorage;
    use hacker_breach::platform::{
        AudioNotifier, Collaborators, InputState, LineStyle, TextSink, VisualNotifier,
    };
    use hacker_breach::renderer::{Canvas2d, draw_frame};
    use hacker_breach::sim::{EngineConfig, FrameStep, GameEngine, LevelPhase};
    use hacker_breach::terminal::{self, Terminal};

    const MASTER_VOLUME: f32 = 0.8;

    fn document() -> Result<Document, SetupError> {
        web_sys::window()
            .ok_or(SetupError::NoWindow)?
            .document()
            .ok_or(SetupError::NoDocument)
    }

    /// Toggle the `active` class that shows an overlay
    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if visible {
                classes.add_1("active")
            } else {
                classes.remove_1("active")
            };
        }
    }

    fn set_text(el: &Option<Element>, text: &str) {
        if let Some(el) = el {
            el.set_text_content(Some(text));
        }
    }

    /// Find an element by id, or create it under `parent` with a class
    fn ensure_element(
        document: &Document,
        parent: &Element,
        id: &str,
        class: &str,
    ) -> Result<Element, SetupError> {
        if let Some(el) = document.get_element_by_id(id) {
            return Ok(el);
        }
        let el = document
            .create_element("div")
            .map_err(|_| SetupError::MissingElement(id.to_string()))?;
        el.set_id(id);
        el.set_class_name(class);
        parent
            .append_child(&el)
            .map_err(|_| SetupError::MissingElement(id.to_string()))?;
        Ok(el)
    }

    /// Full-screen distortion layer toggled by the `active` class
    struct GlitchOverlay {
        element: Element,
        remaining_ms: f64,
    }

    impl GlitchOverlay {
        fn advance(&mut self, delta_ms: f64) {
            if self.remaining_ms <= 0.0 {
                return;
            }
            self.remaining_ms -= delta_ms;
            if self.remaining_ms <= 0.0 {
                let _ = self.element.class_list().remove_1("active");
            }
        }
    }

    impl VisualNotifier for GlitchOverlay {
        fn trigger_intense_glitch(&mut self, duration_ms: u32) {
            self.remaining_ms = self.remaining_ms.max(f64::from(duration_ms));
            let _ = self.element.class_list().add_1("active");
        }
    }

    /// DOM mirror of the terminal buffer
    struct TerminalView {
        output: Element,
        input: Element,
    }

    impl TerminalView {
        fn attach(document: &Document) -> Result<Self, SetupError> {
            let body = document
                .body()
                .ok_or_else(|| SetupError::MissingElement("body".into()))?;
            let container =
                ensure_element(document, &body, "terminal-container", "terminal-container")?;
            let output = ensure_element(document, &container, "terminal-output", "terminal-output")?;
            let input =
                ensure_element(document, &container, "terminal-input", "terminal-input-line")?;
            Ok(Self { output, input })
        }

        fn render(&self, document: &Document, terminal: &Terminal) {
            self.output.set_inner_html("");
            for line in terminal.lines() {
                let Ok(div) = document.create_element("div") else {
                    continue;
                };
                div.set_class_name(line.style.map_or("terminal-line", LineStyle::class_name));
                div.set_text_content(Some(&line.text));
                let _ = self.output.append_child(&div);
            }
            self.output.set_scroll_top(self.output.scroll_height());
            self.input
                .set_text_content(Some(&format!("{}{}", terminal::PROMPT, terminal.input())));
        }
    }

    struct Hud {
        score: Option<Element>,
        health: Option<Element>,
        level: Option<Element>,
    }

    /// Everything the browser callbacks share
    struct Game {
        document: Document,
        canvas: HtmlCanvasElement,
        painter: Canvas2d,
        engine: GameEngine,
        input: InputState,
        terminal: Rc<RefCell<Terminal>>,
        terminal_view: Option<TerminalView>,
        glitch: Option<Rc<RefCell<GlitchOverlay>>>,
        synth: Option<Rc<RefCell<WebSynth>>>,
        cues: CueQueue,
        /// Terminal-only randomness (status, decrypt)
        rng: Pcg32,
        last_time: Option<f64>,
        hud: Hud,
        booted: bool,
    }

    impl Game {
        fn tick(&mut self, time: f64) {
            let dt = self.last_time.map_or(0.0, |last| (time - last).max(0.0));
            self.last_time = Some(time);

            for cue in self.cues.advance(dt) {
                self.apply(cue);
            }
            self.terminal.borrow_mut().advance(dt);
            if let Some(glitch) = &self.glitch {
                glitch.borrow_mut().advance(dt);
            }

            self.engine.set_intent(Some(self.input.intent()));
            if self.engine.frame(time) == FrameStep::Simulated {
                draw_frame(&self.engine, &mut self.painter);
                self.update_hud();
            }

            if self.terminal.borrow_mut().take_dirty() {
                if let Some(view) = &self.terminal_view {
                    view.render(&self.document, &self.terminal.borrow());
                }
            }
        }

        fn apply(&mut self, cue: Cue) {
            match cue {
                Cue::Line { text, style } => {
                    if !self.booted {
                        set_text(
                            &self.document.get_element_by_id("loading-text"),
                            text.trim_start_matches("> "),
                        );
                    }
                    self.terminal.borrow_mut().write_line(&text, style);
                }
                Cue::Glitch { duration_ms } => {
                    if let Some(glitch) = &self.glitch {
                        glitch.borrow_mut().trigger_intense_glitch(duration_ms);
                    }
                }
                Cue::BootComplete => self.finish_boot(),
            }
        }

        fn finish_boot(&mut self) {
            log::info!("Boot sequence complete");
            self.booted = true;
            if let Some(el) = self.document.get_element_by_id("loading-screen") {
                let _ = el.set_attribute("style", "display: none");
            }
            show(&self.document, "instructions", true);
            if let Some(synth) = &self.synth {
                synth.borrow_mut().start_ambient();
            }
        }

        fn update_hud(&self) {
            let health = self.engine.player.as_ref().map_or(0, |p| p.health.max(0));
            set_text(&self.hud.score, &format!("Score: {}", self.engine.state.score));
            set_text(&self.hud.health, &format!("Health: {}", health));
            set_text(&self.hud.level, &format!("Level: {}", self.engine.state.level));
        }

        fn say(&self, message: &str) {
            self.terminal
                .borrow_mut()
                .write_line(message, Some(LineStyle::System));
        }

        fn start_game(&mut self) {
            show(&self.document, "instructions", false);
            self.input.release_all();
            self.engine.init();
            self.engine.start();
            self.say("> Infiltration started. Objective: bypass all security layers.");
        }

        fn restart_game(&mut self) {
            show(&self.document, "game-over", false);
            show(&self.document, "pause-menu", false);
            show(&self.document, "level-complete", false);
            self.input.release_all();
            if let Some(synth) = &self.synth {
                synth.borrow_mut().resume();
            }
            self.engine.reset_game_state();
            self.engine.start();
            self.say("> System rebooted. Starting new infiltration attempt.");
        }

        fn next_level(&mut self) {
            if self.engine.load_next_level() {
                show(&self.document, "level-complete", false);
                self.input.release_all();
            }
        }

        fn toggle_pause(&mut self) {
            let state = &self.engine.state;
            if !state.running || state.game_over || self.engine.phase() == LevelPhase::LevelComplete {
                return;
            }
            let paused = self.engine.toggle_pause();
            show(&self.document, "pause-menu", paused);
            self.input.release_all();
            if let Some(synth) = &self.synth {
                let mut synth = synth.borrow_mut();
                if paused {
                    synth.pause();
                } else {
                    synth.resume();
                }
            }
        }

        /// Keys typed while no run is live go to the terminal
        fn terminal_key(&mut self, key: &str) {
            let mut terminal = self.terminal.borrow_mut();
            match key {
                "Enter" => {
                    let date: String = js_sys::Date::new_0().to_string().into();
                    let cues = terminal.submit(&mut self.rng, &date);
                    self.cues.extend(cues);
                }
                "Backspace" => terminal.backspace(),
                "ArrowUp" => terminal.history_up(),
                "ArrowDown" => terminal.history_down(),
                _ => {
                    let mut chars = key.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        terminal.push_char(c);
                    }
                }
            }
        }

        fn resize(&mut self) {
            let Some(container) = self.document.get_element_by_id("game-container") else {
                return;
            };
            let config = EngineConfig::fit_container(
                container.client_width() as f32,
                container.client_height() as f32,
            );
            self.canvas.set_width(config.width as u32);
            self.canvas.set_height(config.height as u32);
            self.engine.resize(config.width, config.height);
        }

        fn touch_pos(&self, event: &TouchEvent) -> Option<Vec2> {
            let touch = event.touches().get(0)?;
            let rect = self.canvas.get_bounding_client_rect();
            Some(Vec2::new(
                touch.client_x() as f32 - rect.left() as f32,
                touch.client_y() as f32 - rect.top() as f32,
            ))
        }

        fn canvas_size(&self) -> Vec2 {
            Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
        }
    }

    pub fn run() -> Result<(), SetupError> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Hacker Breach starting...");

        let document = document()?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or_else(|| SetupError::MissingElement("gameCanvas".into()))?
            .dyn_into()
            .map_err(|_| SetupError::NotACanvas("gameCanvas".into()))?;
        let painter = Canvas2d::new(&canvas)?;

        let terminal = Rc::new(RefCell::new(Terminal::new()));
        terminal
            .borrow_mut()
            .write_line("> System boot sequence initiated...", None);
        let terminal_view = TerminalView::attach(&document)
            .map_err(|err| log::warn!("Terminal panel unavailable: {}", err))
            .ok();

        let mut collaborators = Collaborators::none().with_terminal(terminal.clone());

        let synth = match WebSynth::new(MASTER_VOLUME) {
            Ok(synth) => {
                let synth = Rc::new(RefCell::new(synth));
                collaborators = collaborators.with_audio(synth.clone());
                Some(synth)
            }
            Err(err) => {
                log::warn!("{} - audio disabled", err);
                None
            }
        };

        let glitch = document.body().and_then(|body| {
            ensure_element(&document, &body, "glitch-overlay", "glitch-container")
                .map_err(|err| log::warn!("Glitch overlay unavailable: {}", err))
                .ok()
        });
        let glitch = glitch.map(|element| {
            let overlay = Rc::new(RefCell::new(GlitchOverlay {
                element,
                remaining_ms: 0.0,
            }));
            collaborators = std::mem::take(&mut collaborators).with_visuals(overlay.clone());
            overlay
        });

        match LocalStorage::open() {
            Ok(storage) => collaborators = collaborators.with_storage(storage),
            Err(err) => log::warn!("{} - high score will not persist", err),
        }

        let seed = js_sys::Date::now() as u64;
        let mut engine = GameEngine::new(EngineConfig::default().with_seed(seed), collaborators);

        {
            let document = document.clone();
            engine.set_on_game_over(move |score| {
                set_text(&document.get_element_by_id("final-score"), &score.to_string());
                show(&document, "game-over", true);
            });
        }
        {
            let document = document.clone();
            engine.set_on_level_complete(move |_level, _score| {
                show(&document, "level-complete", true);
            });
        }

        let hud = Hud {
            score: document.get_element_by_id("score"),
            health: document.get_element_by_id("health"),
            level: document.get_element_by_id("level"),
        };

        let mut cues = CueQueue::new();
        cues.extend(terminal::boot_sequence());

        let game = Rc::new(RefCell::new(Game {
            document: document.clone(),
            canvas: canvas.clone(),
            painter,
            engine,
            input: InputState::new(),
            terminal,
            terminal_view,
            glitch,
            synth,
            cues,
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            last_time: None,
            hud,
            booted: false,
        }));
        game.borrow_mut().resize();

        setup_keyboard(game.clone());
        setup_touch(&canvas, game.clone());
        setup_touch_buttons(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_window_events(game.clone());

        request_animation_frame(game);

        log::info!("Hacker Breach running (seed {})", seed);
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if key == "Escape" {
                    g.toggle_pause();
                    return;
                }
                if g.engine.state.is_live() {
                    if g.input.key_down(&key) {
                        event.prevent_default();
                    }
                } else {
                    g.terminal_key(&key);
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if let Some(pos) = g.touch_pos(&event) {
                    let size = g.canvas_size();
                    g.input.touch_start(pos, size);
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if let Some(pos) = g.touch_pos(&event) {
                    g.input.touch_move(pos);
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().input.touch_end();
            });
            let _ = canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// On-screen buttons, when the page provides them
    fn setup_touch_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let bindings: [(&str, fn(&mut InputState, bool)); 6] = [
            ("touch-up", |input, held| hold_key(input, "ArrowUp", held)),
            ("touch-down", |input, held| hold_key(input, "ArrowDown", held)),
            ("touch-left", |input, held| hold_key(input, "ArrowLeft", held)),
            ("touch-right", |input, held| hold_key(input, "ArrowRight", held)),
            ("touch-fire", InputState::set_fire),
            ("touch-special", InputState::set_special),
        ];

        for (id, apply) in bindings {
            let Some(button) = document.get_element_by_id(id) else {
                continue;
            };
            for (event_name, held) in [("touchstart", true), ("touchend", false)] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    apply(&mut game.borrow_mut().input, held);
                });
                let _ = button.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(pad) = document.get_element_by_id("touch-joystick") {
            for event_name in ["touchstart", "touchmove"] {
                let game = game.clone();
                let pad_el = pad.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    let Some(touch) = event.touches().get(0) else { return };
                    let rect = pad_el.get_bounding_client_rect();
                    let center = Vec2::new(
                        (rect.left() + rect.width() / 2.0) as f32,
                        (rect.top() + rect.height() / 2.0) as f32,
                    );
                    let offset = Vec2::new(touch.client_x() as f32, touch.client_y() as f32) - center;
                    game.borrow_mut()
                        .input
                        .joystick(offset, (rect.width() / 2.0) as f32);
                });
                let _ = pad.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }

            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().input.joystick_release();
            });
            let _ = pad.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn hold_key(input: &mut InputState, key: &str, held: bool) {
        if held {
            input.key_down(key);
        } else {
            input.key_up(key);
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let actions: [(&str, fn(&mut Game)); 5] = [
            ("start-button", Game::start_game),
            ("restart-button", Game::restart_game),
            ("restart-from-pause", Game::restart_game),
            ("next-level-button", Game::next_level),
            ("resume-button", Game::toggle_pause),
        ];

        for (id, action) in actions {
            let Some(button) = document.get_element_by_id(id) else {
                log::warn!("Button #{} not found", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                event.prevent_default();
                action(&mut game.borrow_mut());
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_events(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Auto-pause when the tab is hidden
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let hidden = g.document.visibility_state() == web_sys::VisibilityState::Hidden;
                if hidden && g.engine.state.is_live() {
                    g.toggle_pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            if let Some(document) = window.document() {
                let _ = document.add_event_listener_with_callback(
                    "visibilitychange",
                    closure.as_ref().unchecked_ref(),
                );
            }
            closure.forget();
        }

        // Held keys would otherwise stick after focus loss
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().tick(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(err) = web_game::run() {
        log::error!("Hacker Breach failed to start: {}", err);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use hacker_breach::consts::FRAME_MS;
    use hacker_breach::platform::{Collaborators, Intent, LineStyle, MemoryStorage, TextSink};
    use hacker_breach::sim::{EngineConfig, FrameStep, GameEngine};

    /// Terminal lines go to the log
    struct LogSink;

    impl TextSink for LogSink {
        fn write_line(&mut self, message: &str, style: Option<LineStyle>) {
            match style {
                Some(LineStyle::Error) => log::warn!("{}", message),
                _ => log::info!("{}", message),
            }
        }
    }

    /// Scripted input: sweep left and right while firing
    fn scripted_intent(frame: u32) -> Intent {
        let x = if (frame / 90) % 2 == 0 { -1.0 } else { 1.0 };
        Intent {
            movement: glam::Vec2::new(x, 0.0),
            fire: true,
            special: frame % 600 == 0,
        }
    }

    pub fn run(frames: u32, seed: u64) {
        let collaborators = Collaborators::none()
            .with_terminal(LogSink)
            .with_storage(MemoryStorage::new());
        let mut engine = GameEngine::new(EngineConfig::default().with_seed(seed), collaborators);
        engine.set_on_game_over(|score| log::info!("Game over callback: {}", score));
        engine.set_on_level_complete(|level, score| {
            log::info!("Level {} complete callback (score {})", level, score)
        });

        engine.init();
        engine.start();

        let mut time = 0.0;
        for frame in 0..frames {
            engine.set_intent(Some(scripted_intent(frame)));
            time += f64::from(FRAME_MS);
            if engine.frame(time) == FrameStep::Stopped {
                break;
            }
            if engine.load_next_level() {
                log::info!("Advanced to level {}", engine.state.level);
            }
        }

        let health = engine.player.as_ref().map_or(0, |p| p.health);
        log::info!(
            "Session over: level {}, score {}, high score {}, health {}, enemies {}, data nodes {}",
            engine.state.level,
            engine.state.score,
            engine.state.high_score,
            health,
            engine.enemies.len(),
            engine.data_nodes.len()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hacker Breach (native) starting...");
    log::info!("Native mode runs a headless session - build for wasm32 to play in the browser");

    let mut args = std::env::args().skip(1);
    let frames = args.next().and_then(|a| a.parse().ok()).unwrap_or(3600);
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);
    headless::run(frames, seed);
}
