//! Mini Arcade entry point
//!
//! The browser build mounts a game on the page canvas. The native binary runs
//! headless sessions for inspection:
//!
//! ```text
//! mini-arcade list
//! mini-arcade morse <text>
//! mini-arcade <game> [seconds] [seed]
//! ```

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    mini_arcade::platform::web::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("list") => {
            headless::list();
            Ok(())
        }
        Some("morse") => {
            headless::morse(&args[1..].join(" "));
            Ok(())
        }
        Some(game) => headless::run(game, args.get(1), args.get(2)),
    };
    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use rand::Rng;

    use mini_arcade::audio::SilentPlayer;
    use mini_arcade::consts::REFERENCE_DT;
    use mini_arcade::games::{self, morse};
    use mini_arcade::input::{InputState, Key};
    use mini_arcade::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
    use mini_arcade::renderer::{DrawCommand, DrawList};
    use mini_arcade::sim::{GameRng, seeded};
    use mini_arcade::{ArcadeError, GameKind, LoopDriver, Settings};

    const STORE_PATH: &str = "mini-arcade.json";
    const DEFAULT_SECONDS: f32 = 30.0;
    /// Frames between autopilot actions
    const ACTION_EVERY: u64 = 8;

    pub fn list() {
        for kind in GameKind::ALL {
            println!("{:<14} {:<16} {}", kind.slug(), kind.title(), kind.controls());
        }
    }

    pub fn morse(text: &str) {
        let (code, decoded) = if morse::looks_like_morse(text) {
            (text.trim().to_string(), morse::decode(text))
        } else {
            (morse::encode(text), text.to_uppercase())
        };
        println!("{decoded}");
        println!("{code}");
        for tone in morse::playback_schedule(&code, 1.0) {
            println!(
                "{:>7.0} ms  {:>4.0} Hz  {:>4.0} ms",
                tone.start_ms, tone.frequency, tone.duration_ms
            );
        }
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match JsonFileStore::open(STORE_PATH) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{e}; scores kept in memory");
                Box::new(MemoryStore::new())
            }
        }
    }

    /// Keys the autopilot mashes for each game
    fn action_keys(kind: GameKind) -> &'static [Key] {
        match kind {
            GameKind::Twenty48 | GameKind::Snake => &[Key::Up, Key::Right, Key::Down, Key::Left],
            GameKind::Blackjack => &[Key::Enter, Key::H, Key::S],
            GameKind::War => &[Key::Space],
            GameKind::RideTheBus => &[
                Key::Enter,
                Key::Left,
                Key::Right,
                Key::W,
                Key::A,
                Key::S,
                Key::D,
            ],
            GameKind::Pong => &[Key::W, Key::S, Key::Up, Key::Down],
            GameKind::Breakout => &[Key::Left, Key::Right],
            GameKind::Dino => &[Key::Space, Key::Up],
            GameKind::Pool => &[Key::Left, Key::Right, Key::Space],
            GameKind::AimTraining => &[Key::R],
            GameKind::BallAvoidance => &[],
            GameKind::TouchTyping | GameKind::Morse => &[Key::Enter],
        }
    }

    /// Scripted input: start the game, then random presses, pointer moves and typing
    struct Autopilot {
        kind: GameKind,
        size: Vec2,
        rng: GameRng,
        last: Option<Key>,
    }

    impl Autopilot {
        fn new(kind: GameKind, seed: u64) -> Self {
            let (w, h) = kind.surface_size();
            Self {
                kind,
                size: Vec2::new(w, h),
                rng: seeded(seed ^ 0x5eed),
                last: None,
            }
        }

        fn drive(&mut self, frame: u64, input: &mut InputState) {
            if let Some(key) = self.last.take() {
                input.key_up(key);
            }
            if frame == 0 {
                for key in [Key::Enter, Key::Space] {
                    input.key_down(key);
                    input.key_up(key);
                }
                input.click(self.size / 2.0);
                return;
            }
            if frame % ACTION_EVERY != 0 {
                return;
            }
            let pointer = Vec2::new(
                self.rng.random_range(0.0..self.size.x),
                self.rng.random_range(0.0..self.size.y),
            );
            input.pointer_move(pointer);
            if self.kind == GameKind::AimTraining {
                input.click(pointer);
            }
            if matches!(self.kind, GameKind::TouchTyping | GameKind::Morse) {
                input.type_char(self.rng.random_range('a'..='z'));
            }
            let keys = action_keys(self.kind);
            if !keys.is_empty() {
                let key = keys[self.rng.random_range(0..keys.len())];
                input.key_down(key);
                self.last = Some(key);
            }
        }
    }

    pub fn run(
        game: &str,
        seconds: Option<&String>,
        seed: Option<&String>,
    ) -> Result<(), ArcadeError> {
        let kind: GameKind = game.parse()?;
        let seconds = seconds
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(DEFAULT_SECONDS)
            .max(0.0);
        let seed = seed.and_then(|s| s.parse::<u64>().ok()).unwrap_or(1);

        let store = open_store();
        let settings = Settings::load(store.as_ref());
        let mut driver = LoopDriver::new(games::create(kind, seed, &settings))
            .with_max_substeps(settings.max_substeps)
            .with_audio(Box::new(SilentPlayer::new()))
            .with_store(store);
        let (w, h) = kind.surface_size();
        let mut surface = DrawList::new(w, h);
        let mut pilot = Autopilot::new(kind, seed);

        log::info!("Running {} headless for {seconds:.0} s (seed {seed})", kind.title());
        driver.start();
        let frames = (seconds / REFERENCE_DT).round() as u64;
        let mut draws = 0usize;
        let mut sessions = Vec::new();
        for frame in 0..frames {
            pilot.drive(frame, driver.input_mut());
            driver.advance(REFERENCE_DT, &mut surface);
            draws += surface.take().len();
            if let Some(result) = driver.take_finished() {
                sessions.push(result);
            }
        }

        // One last frame to report on
        driver.advance(REFERENCE_DT, &mut surface);
        let last_frame = surface.take();
        let texts: Vec<&str> = last_frame
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        let game = driver.game();
        println!("{}: {:?}, score {}", kind.title(), game.status(), game.score());
        println!(
            "ticks {} (skipped {}), draw calls {draws}",
            driver.ticks(),
            driver.skipped()
        );
        for result in &sessions {
            let best = if result.new_best { " new best" } else { "" };
            println!("  session ended {:?} with {}{best}", result.status, result.score);
        }
        if !texts.is_empty() {
            println!("  last frame: {}", texts.join(" | "));
        }
        driver.stop();
        Ok(())
    }
}
