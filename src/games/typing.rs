//! Touch Typing
//!
//! A 60 s round of typing single words. Words come from a [`WordSource`];
//! requests are fire-and-forget and their results land in a [`WordInbox`]
//! that the game drains at tick time, so a slow fetch never blocks a tick.
//! Each request carries a [`WordTicket`] for the round that issued it; a
//! reply arriving after a restart is dropped.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;
use rand::seq::IndexedRandom;

use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::error::FetchError;
use crate::games::GameKind;
use crate::input::{InputState, Key, TextEdit};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::sim::{GameRng, Timers, seeded};

pub const ROUND_SECONDS: f32 = 60.0;
pub const FETCH_FAILED: &str = "Failed to load word. Check your connection!";
const CORRECT: &str = "Correct!";
/// Characters per "word" in the WPM formula
const CHARS_PER_WORD: f32 = 5.0;

const WIDTH: f32 = 640.0;

/// Mailbox word requests report into
#[derive(Debug, Clone, Default)]
pub struct WordInbox {
    results: Rc<RefCell<VecDeque<Result<String, FetchError>>>>,
    round: Rc<Cell<u64>>,
}

impl WordInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply slot for a request issued now
    pub fn ticket(&self) -> WordTicket {
        WordTicket {
            inbox: self.clone(),
            round: self.round.get(),
        }
    }

    /// Start a new round; queued results and outstanding tickets go stale
    pub fn next_round(&self) {
        self.round.set(self.round.get().wrapping_add(1));
        self.results.borrow_mut().clear();
    }

    pub fn drain(&self) -> Vec<Result<String, FetchError>> {
        self.results.borrow_mut().drain(..).collect()
    }
}

/// One pending request's way back into the inbox
#[derive(Debug)]
pub struct WordTicket {
    inbox: WordInbox,
    round: u64,
}

impl WordTicket {
    /// Queue the result unless its round has ended; returns whether it was kept
    pub fn deliver(self, result: Result<String, FetchError>) -> bool {
        if self.inbox.round.get() != self.round {
            log::debug!("Dropping word reply from round {}", self.round);
            return false;
        }
        self.inbox.results.borrow_mut().push_back(result);
        true
    }
}

/// Supplier of words to type
pub trait WordSource {
    /// Ask for one word; the result goes through `inbox.ticket()`, possibly later
    fn request(&mut self, inbox: &WordInbox);
}

/// Offline source picking from a built-in list
pub struct WordList {
    words: Vec<&'static str>,
    rng: GameRng,
}

const BUILTIN_WORDS: &[&str] = &[
    "anchor", "binary", "canvas", "dragon", "ember", "falcon", "glacier", "harbor", "island",
    "jungle", "kernel", "lantern", "marble", "nectar", "orbit", "pepper", "quartz", "ribbon",
    "saddle", "timber", "umbrella", "velvet", "walnut", "yonder", "zephyr", "pixel", "arcade",
    "paddle", "bounce", "rocket",
];

impl WordList {
    pub fn new(seed: u64) -> Self {
        Self::from_words(BUILTIN_WORDS.to_vec(), seed)
    }

    pub fn from_words(words: Vec<&'static str>, seed: u64) -> Self {
        Self {
            words,
            rng: seeded(seed),
        }
    }
}

impl WordSource for WordList {
    fn request(&mut self, inbox: &WordInbox) {
        let result = self
            .words
            .choose(&mut self.rng)
            .map(|w| w.to_string())
            .ok_or(FetchError::Exhausted);
        inbox.ticket().deliver(result);
    }
}

/// Touch Typing world
pub struct TouchTyping {
    pub word: String,
    pub typed: String,
    pub feedback: String,
    pub score: u32,
    pub status: Status,
    /// Seconds into the round
    pub elapsed: f32,
    pub keystrokes: u32,
    source: Box<dyn WordSource>,
    inbox: WordInbox,
    timers: Timers,
    tones: Vec<Tone>,
}

impl TouchTyping {
    pub fn new(source: Box<dyn WordSource>) -> Self {
        let mut game = Self {
            word: String::new(),
            typed: String::new(),
            feedback: String::new(),
            score: 0,
            status: Status::Ready,
            elapsed: 0.0,
            keystrokes: 0,
            source,
            inbox: WordInbox::new(),
            timers: Timers::new(),
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    pub fn time_left(&self) -> u32 {
        (ROUND_SECONDS - self.elapsed).max(0.0).ceil() as u32
    }

    fn correct_chars(&self) -> usize {
        self.typed
            .chars()
            .zip(self.word.chars())
            .filter(|(a, b)| a == b)
            .count()
    }

    /// Share of typed characters matching the word position by position
    pub fn accuracy(&self) -> u32 {
        let typed = self.typed.chars().count();
        if typed == 0 {
            return 100;
        }
        (self.correct_chars() as f32 / typed as f32 * 100.0).round() as u32
    }

    /// Words per minute over the elapsed round time
    pub fn wpm(&self) -> u32 {
        let minutes = self.elapsed / 60.0;
        if minutes <= 0.0 {
            return 0;
        }
        (self.correct_chars() as f32 / CHARS_PER_WORD / minutes).round() as u32
    }

    fn begin(&mut self) {
        self.restart();
        self.status = Status::Running;
        self.source.request(&self.inbox);
    }

    fn receive_words(&mut self) {
        for result in self.inbox.drain() {
            match result {
                Ok(word) => {
                    self.word = word;
                    self.typed.clear();
                    self.feedback.clear();
                }
                Err(e) => {
                    log::warn!("Word fetch failed: {e}");
                    self.feedback = FETCH_FAILED.to_string();
                }
            }
        }
    }

    fn edit(&mut self, edits: &[TextEdit]) {
        for edit in edits {
            match edit {
                TextEdit::Insert(c) if !c.is_whitespace() => self.typed.push(*c),
                TextEdit::Insert(_) => continue,
                TextEdit::Backspace => {
                    self.typed.pop();
                }
            }
            self.keystrokes += 1;
        }
        if !self.word.is_empty() && self.typed == self.word {
            self.score += 1;
            self.feedback = CORRECT.to_string();
            self.typed.clear();
            self.tones.extend(SoundCue::Score.tones());
            self.source.request(&self.inbox);
        }
    }

    fn end(&mut self) {
        self.elapsed = ROUND_SECONDS;
        self.status = Status::Finished;
        self.feedback = format!(
            "Game Over! Final Score: {} | WPM: {} | Accuracy: {}%",
            self.score,
            self.wpm(),
            self.accuracy()
        );
        self.tones.extend(SoundCue::GameOver.tones());
        log::info!("Typing round over: {} words", self.score);
    }
}

impl Game for TouchTyping {
    fn kind(&self) -> GameKind {
        GameKind::TouchTyping
    }

    fn restart(&mut self) {
        self.word.clear();
        self.typed.clear();
        self.feedback.clear();
        self.score = 0;
        self.status = Status::Ready;
        self.elapsed = 0.0;
        self.keystrokes = 0;
        self.timers = Timers::new();
        self.tones.clear();
        // Late replies from the previous round are dropped
        self.inbox.next_round();
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        match self.status {
            Status::Running => {}
            _ => {
                if input.was_pressed(Key::Enter) {
                    self.begin();
                }
                return;
            }
        }
        self.receive_words();
        self.elapsed += dt;
        if self.elapsed >= ROUND_SECONDS {
            self.end();
            return;
        }
        self.edit(input.text());
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.text(
            &format!(
                "Time: {}s  Score: {}  WPM: {}  Accuracy: {}%",
                self.time_left(),
                self.score,
                self.wpm(),
                self.accuracy()
            ),
            Vec2::new(8.0, 24.0),
            16.0,
            Color::GREEN,
        );
        centered_text(surface, &self.word, WIDTH / 2.0, 110.0, 36.0, Color::WHITE);
        centered_text(
            surface,
            &format!("> {}_", self.typed),
            WIDTH / 2.0,
            170.0,
            24.0,
            Color::GREEN,
        );
        let color = if self.feedback == CORRECT { Color::GREEN } else { Color::AMBER };
        centered_text(surface, &self.feedback, WIDTH / 2.0, 220.0, 16.0, color);
        if self.status != Status::Running {
            let label = if self.score > 0 {
                "Press Enter to play again"
            } else {
                "Press Enter to start"
            };
            centered_text(surface, label, WIDTH / 2.0, 270.0, 16.0, Color::GREEN);
        }
    }

    fn status(&self) -> Status {
        self.status
    }

    fn score(&self) -> i64 {
        i64::from(self.score)
    }

    fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    fn take_tones(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.tones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays canned results; a request with nothing queued stays pending
    struct Scripted {
        queue: Rc<RefCell<VecDeque<Result<String, FetchError>>>>,
        requests: Rc<RefCell<u32>>,
    }

    impl WordSource for Scripted {
        fn request(&mut self, inbox: &WordInbox) {
            *self.requests.borrow_mut() += 1;
            if let Some(result) = self.queue.borrow_mut().pop_front() {
                inbox.ticket().deliver(result);
            }
        }
    }

    fn scripted(results: Vec<Result<String, FetchError>>) -> (TouchTyping, Rc<RefCell<u32>>) {
        let requests = Rc::new(RefCell::new(0));
        let source = Scripted {
            queue: Rc::new(RefCell::new(results.into())),
            requests: Rc::clone(&requests),
        };
        (TouchTyping::new(Box::new(source)), requests)
    }

    fn enter() -> InputState {
        let mut input = InputState::new();
        input.key_down(Key::Enter);
        input
    }

    fn typing(text: &str) -> InputState {
        let mut input = InputState::new();
        for c in text.chars() {
            input.type_char(c);
        }
        input
    }

    const DT: f32 = 0.016;

    #[test]
    fn test_correct_word_scores_and_requests_next() {
        let (mut game, requests) = scripted(vec![Ok("cat".into()), Ok("dog".into())]);
        game.step(&enter(), DT);
        assert_eq!(*requests.borrow(), 1);
        game.step(&InputState::new(), DT);
        assert_eq!(game.word, "cat");

        game.step(&typing("ca"), DT);
        assert_eq!(game.score, 0);
        game.step(&typing("t"), DT);
        assert_eq!(game.score, 1);
        assert_eq!(game.feedback, "Correct!");
        assert_eq!(*requests.borrow(), 2);

        game.step(&InputState::new(), DT);
        assert_eq!(game.word, "dog");
        assert!(game.typed.is_empty());
    }

    #[test]
    fn test_failed_fetch_keeps_prior_word() {
        let (mut game, _) =
            scripted(vec![Ok("cat".into()), Err(FetchError::Network("offline".into()))]);
        game.step(&enter(), DT);
        game.step(&typing("cat"), DT);
        assert_eq!(game.score, 1);
        game.step(&InputState::new(), DT);
        assert_eq!(game.word, "cat");
        assert_eq!(game.feedback, FETCH_FAILED);
        assert_eq!(game.status, Status::Running);
    }

    #[test]
    fn test_accuracy_and_wpm() {
        let (mut game, _) = scripted(vec![Ok("planet".into())]);
        game.step(&enter(), DT);
        assert_eq!(game.accuracy(), 100);
        game.step(&typing("plx"), DT);
        assert_eq!(game.accuracy(), 67);
        game.step(&InputState::new(), DT);

        game.typed = "plane".into();
        game.elapsed = 6.0;
        // 5 correct chars = 1 word in 0.1 min
        assert_eq!(game.wpm(), 10);
    }

    #[test]
    fn test_backspace_and_keystrokes() {
        let (mut game, _) = scripted(vec![Ok("cat".into())]);
        game.step(&enter(), DT);
        let mut input = typing("cx");
        input.backspace();
        input.type_char('a');
        game.step(&input, DT);
        assert_eq!(game.typed, "ca");
        assert_eq!(game.keystrokes, 4);
    }

    #[test]
    fn test_round_ends_after_sixty_seconds() {
        let (mut game, _) = scripted(vec![Ok("cat".into())]);
        game.step(&InputState::new(), DT);
        assert_eq!(game.status, Status::Ready);
        game.step(&enter(), DT);
        for _ in 0..59 {
            game.step(&InputState::new(), 1.0);
        }
        assert_eq!(game.status, Status::Running);
        assert_eq!(game.time_left(), 1);
        game.step(&InputState::new(), 1.0);
        assert_eq!(game.status, Status::Finished);
        assert!(game.feedback.starts_with("Game Over! Final Score: 0"));
        // Typing after time is up does nothing
        game.step(&typing("cat"), DT);
        assert_eq!(game.score, 0);
    }

    /// Holds every ticket until the test answers it
    struct Deferred {
        pending: Rc<RefCell<Vec<WordTicket>>>,
    }

    impl WordSource for Deferred {
        fn request(&mut self, inbox: &WordInbox) {
            self.pending.borrow_mut().push(inbox.ticket());
        }
    }

    #[test]
    fn test_reply_from_previous_round_is_dropped() {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let mut game = TouchTyping::new(Box::new(Deferred {
            pending: Rc::clone(&pending),
        }));
        game.step(&enter(), DT);
        let stale = pending.borrow_mut().remove(0);

        // Round ends and a new one starts before the first reply lands
        game.restart();
        game.step(&enter(), DT);
        assert!(!stale.deliver(Ok("stale".into())));
        game.step(&InputState::new(), DT);
        assert!(game.word.is_empty());

        let fresh = pending.borrow_mut().remove(0);
        assert!(fresh.deliver(Ok("fresh".into())));
        game.step(&InputState::new(), DT);
        assert_eq!(game.word, "fresh");
    }

    #[test]
    fn test_word_list_source() {
        let inbox = WordInbox::new();
        let mut list = WordList::new(4);
        list.request(&inbox);
        list.request(&inbox);
        let words = inbox.drain();
        assert_eq!(words.len(), 2);
        assert!(words.iter().all(|w| matches!(w, Ok(w) if BUILTIN_WORDS.contains(&w.as_str()))));

        let mut empty = WordList::from_words(Vec::new(), 1);
        empty.request(&inbox);
        assert_eq!(inbox.drain(), vec![Err(FetchError::Exhausted)]);
    }
}
