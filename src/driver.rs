//! Loop driver
//!
//! Owns one game session: the game world, the shared input state, the
//! listener registrations and the fixed-step accumulator. Each tick runs the
//! game's simulation step (which resolves collisions and rules) and then its
//! renderer, exactly once each.

use crate::audio::{Tone, TonePlayer};
use crate::consts::{FRAME_DT, MAX_FRAME_TIME, MAX_SUBSTEPS};
use crate::error::AudioError;
use crate::games::GameKind;
use crate::highscores::HighScore;
use crate::input::{InputState, ListenerGuard};
use crate::persistence::KeyValueStore;
use crate::renderer::Surface;
use crate::sim::Timers;

/// Session state of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Waiting for the player to start (e.g. Snake before Enter)
    Ready,
    Running,
    Won,
    Lost,
    /// Ended without a win/loss verdict (time up, match over)
    Finished,
}

impl Status {
    pub fn is_over(self) -> bool {
        matches!(self, Status::Won | Status::Lost | Status::Finished)
    }
}

/// One game world plus its rules
///
/// `step` advances the world by `dt` seconds and resolves collisions and
/// rules before returning; `render` only reads.
pub trait Game {
    fn kind(&self) -> GameKind;

    /// Tick length in seconds
    fn tick_interval(&self) -> f32 {
        FRAME_DT
    }

    /// Recreate the world (start, reset, in-game restart)
    fn restart(&mut self);

    fn step(&mut self, input: &InputState, dt: f32);

    fn render(&self, surface: &mut dyn Surface);

    fn status(&self) -> Status;

    /// Current score; may be negative for the betting games
    fn score(&self) -> i64;

    /// Pending simulation timers owned by the world
    fn timers_mut(&mut self) -> &mut Timers;

    /// Tones queued since the last call
    fn take_tones(&mut self) -> Vec<Tone> {
        Vec::new()
    }

    /// Best stored score, offered when a session starts
    fn set_high_score(&mut self, _best: u64) {}

    /// Audio output failed; games that depend on sound may say so
    fn audio_failed(&mut self, _err: &AudioError) {}
}

/// What a call to [`LoopDriver::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Driver not running
    Stopped,
    /// Surface unavailable; nothing changed
    Skipped,
    Ticked,
}

/// Score of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionResult {
    pub kind: GameKind,
    pub status: Status,
    pub score: i64,
    /// True if the score beat the stored best
    pub new_best: bool,
}

/// Drives one game at its fixed cadence
pub struct LoopDriver {
    game: Box<dyn Game>,
    input: InputState,
    running: bool,
    accumulator: f32,
    max_substeps: u32,
    listeners: Option<ListenerGuard>,
    audio: Option<Box<dyn TonePlayer>>,
    store: Option<Box<dyn KeyValueStore>>,
    ticks: u64,
    skipped: u64,
    /// Result already recorded for the current session
    reported: bool,
    finished: Option<SessionResult>,
}

impl LoopDriver {
    pub fn new(game: Box<dyn Game>) -> Self {
        Self {
            game,
            input: InputState::new(),
            running: false,
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
            listeners: None,
            audio: None,
            store: None,
            ticks: 0,
            skipped: 0,
            reported: false,
            finished: None,
        }
    }

    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn TonePlayer>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// High scores are read from and written to `store`
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    // === Lifecycle ===

    /// Initialize the world and begin ticking; no-op while running
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.game.restart();
        self.input.clear();
        self.accumulator = 0.0;
        self.reported = false;
        self.finished = None;
        if let Some(store) = self.store.as_deref() {
            let best = HighScore::for_game(self.game.kind()).best(store);
            self.game.set_high_score(best);
        }
        self.running = true;
        log::info!("{} started", self.game.kind().title());
    }

    /// Cancel pending timers and release listeners
    ///
    /// Idempotent and safe before `start`. Returns false if there was nothing
    /// to stop.
    pub fn stop(&mut self) -> bool {
        let was_active = self.running || self.listeners.is_some();
        self.halt();
        if let Some(guard) = self.listeners.take() {
            guard.release();
        }
        if was_active {
            log::info!("{} stopped", self.game.kind().title());
        }
        was_active
    }

    /// Stop ticking, restart the world, start again
    ///
    /// Listener registrations survive a reset.
    pub fn reset(&mut self) {
        self.halt();
        self.start();
    }

    fn halt(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
        self.game.timers_mut().cancel_all();
    }

    /// Hand over the session's listener registrations
    pub fn attach_listeners(&mut self, guard: ListenerGuard) {
        if let Some(old) = self.listeners.replace(guard) {
            old.release();
        }
    }

    // === Ticking ===

    /// Run one tick: simulation step, then render
    pub fn tick(&mut self, surface: &mut dyn Surface) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        if !surface.is_ready() {
            self.skipped += 1;
            log::debug!("Surface unavailable, skipping tick");
            return TickOutcome::Skipped;
        }

        let dt = self.game.tick_interval();
        self.game.step(&self.input, dt);
        self.input.end_tick();
        self.play_tones();
        self.record_result();

        surface.clear_all();
        self.game.render(surface);
        self.ticks += 1;
        TickOutcome::Ticked
    }

    /// Run as many ticks as `elapsed` wall seconds cover
    ///
    /// Elapsed time is clamped, and at most `max_substeps` ticks run per call;
    /// time beyond that is dropped. Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: f32, surface: &mut dyn Surface) -> u32 {
        if !self.running {
            return 0;
        }
        let dt = self.game.tick_interval();
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_TIME);

        let mut substeps = 0;
        // Small epsilon keeps float drift from eating a whole tick
        while self.accumulator + 1e-6 >= dt && substeps < self.max_substeps {
            match self.tick(surface) {
                TickOutcome::Ticked => {
                    self.accumulator -= dt;
                    substeps += 1;
                }
                TickOutcome::Skipped | TickOutcome::Stopped => {
                    self.accumulator = 0.0;
                    break;
                }
            }
        }
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(dt);
        }
        self.accumulator = self.accumulator.max(0.0);
        substeps
    }

    fn play_tones(&mut self) {
        let tones = self.game.take_tones();
        if tones.is_empty() {
            return;
        }
        let Some(audio) = self.audio.as_mut() else {
            return;
        };
        if let Err(e) = audio.play(&tones) {
            log::warn!("Audio failed: {e}");
            self.game.audio_failed(&e);
        }
    }

    /// Record the session result once, when the game first reports an end
    fn record_result(&mut self) {
        let status = self.game.status();
        if !status.is_over() {
            self.reported = false;
            return;
        }
        if self.reported {
            return;
        }
        self.reported = true;

        let kind = self.game.kind();
        let score = self.game.score();
        let mut new_best = false;
        if let (Some(store), Ok(score)) = (self.store.as_deref_mut(), u64::try_from(score)) {
            match HighScore::for_game(kind).submit(store, score) {
                Ok(improved) => new_best = improved,
                Err(e) => log::warn!("Could not save high score: {e}"),
            }
        }
        log::info!("{} ended: {status:?} with score {score}", kind.title());
        self.finished = Some(SessionResult {
            kind,
            status,
            score,
            new_best,
        });
    }

    // === Accessors ===

    /// Result of the most recent finished session, if not taken yet
    pub fn take_finished(&mut self) -> Option<SessionResult> {
        self.finished.take()
    }

    /// Input state the platform's listeners write into
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn game(&self) -> &dyn Game {
        self.game.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_listeners(&self) -> bool {
        self.listeners.is_some()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn store(&self) -> Option<&dyn KeyValueStore> {
        self.store.as_deref()
    }
}

impl Drop for LoopDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
