//! Morse code trainer
//!
//! Type text and press Enter: plain text is encoded and played back as
//! tones, Morse input (dots, dashes, spaces and `/`) is decoded and played
//! as typed. Up/Down change the playback speed, Escape clears.

use glam::Vec2;

use crate::audio::Tone;
use crate::driver::{Game, Status};
use crate::error::AudioError;
use crate::games::GameKind;
use crate::input::{InputState, Key, TextEdit};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::settings::Settings;
use crate::sim::{TimerId, Timers};

pub const DOT_HZ: f32 = 800.0;
pub const DOT_MS: f32 = 100.0;
pub const DASH_HZ: f32 = 600.0;
pub const DASH_MS: f32 = 300.0;
/// Pause after every symbol at 1× speed
pub const SYMBOL_GAP_MS: f32 = 100.0;
/// Extra pause after every letter at 1× speed
pub const LETTER_GAP_MS: f32 = 300.0;
pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;
const SPEED_STEP: f32 = 0.1;

const WIDTH: f32 = 640.0;

const TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    (' ', "/"),
];

fn code_for(c: char) -> Option<&'static str> {
    let upper = c.to_ascii_uppercase();
    TABLE.iter().find(|(ch, _)| *ch == upper).map(|(_, code)| *code)
}

fn char_for(code: &str) -> Option<char> {
    TABLE.iter().find(|(_, c)| *c == code).map(|(ch, _)| *ch)
}

/// Encode text; letters are separated by spaces, words by `/`
///
/// Characters without a code are skipped.
pub fn encode(text: &str) -> String {
    text.chars().filter_map(code_for).collect::<Vec<_>>().join(" ")
}

/// Decode Morse; letters separated by spaces, words by `/`
///
/// Unknown symbol groups are skipped.
pub fn decode(code: &str) -> String {
    code.split('/')
        .map(|word| word.split_whitespace().filter_map(char_for).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// True when `text` contains only Morse symbols and at least one dot or dash
pub fn looks_like_morse(text: &str) -> bool {
    text.chars().any(|c| c == '.' || c == '-')
        && text.chars().all(|c| matches!(c, '.' | '-' | '/' | ' '))
}

/// Tone schedule for playing `code` at `speed` (clamped to 0.5-2.0)
///
/// Dots and dashes keep their length at every speed; only the gaps scale.
pub fn playback_schedule(code: &str, speed: f32) -> Vec<Tone> {
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    let symbol_gap = SYMBOL_GAP_MS / speed;
    let letter_gap = LETTER_GAP_MS / speed;
    let mut tones = Vec::new();
    let mut t = 0.0;
    for letter in code.split(' ').filter(|l| !l.is_empty()) {
        for symbol in letter.chars() {
            let tone = match symbol {
                '.' => Some(Tone::new(DOT_HZ, t, DOT_MS)),
                '-' => Some(Tone::new(DASH_HZ, t, DASH_MS)),
                _ => None,
            };
            if let Some(tone) = tone {
                t += tone.duration_ms;
                tones.push(tone);
            }
            t += symbol_gap;
        }
        t += letter_gap;
    }
    tones
}

/// Morse trainer world
#[derive(Debug, Clone)]
pub struct MorseTrainer {
    pub input: String,
    pub output: String,
    pub speed: f32,
    pub message: Option<String>,
    playing: Option<TimerId>,
    timers: Timers,
    tones: Vec<Tone>,
}

impl MorseTrainer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            speed: settings.morse_speed.clamp(MIN_SPEED, MAX_SPEED),
            message: None,
            playing: None,
            timers: Timers::new(),
            tones: Vec::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Convert the typed text and queue its playback
    pub fn submit(&mut self) {
        if self.is_playing() || self.input.trim().is_empty() {
            return;
        }
        let code = if looks_like_morse(&self.input) {
            self.output = decode(&self.input);
            self.input.trim().to_string()
        } else {
            self.output = encode(&self.input);
            self.output.clone()
        };
        self.message = None;

        let schedule = playback_schedule(&code, self.speed);
        let Some(last) = schedule.last() else {
            return;
        };
        let total_ms = last.end_ms();
        log::debug!("Playing {} tones over {total_ms:.0} ms", schedule.len());
        self.tones.extend(schedule);
        self.playing = Some(self.timers.after(total_ms / 1000.0));
    }

    fn edit(&mut self, edits: &[TextEdit]) {
        if edits.is_empty() {
            return;
        }
        for edit in edits {
            match edit {
                TextEdit::Insert(c) => self.input.push(*c),
                TextEdit::Backspace => {
                    self.input.pop();
                }
            }
        }
        self.output.clear();
    }
}

impl Game for MorseTrainer {
    fn kind(&self) -> GameKind {
        GameKind::Morse
    }

    fn restart(&mut self) {
        self.input.clear();
        self.output.clear();
        self.message = None;
        self.playing = None;
        self.timers = Timers::new();
        self.tones.clear();
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        for id in self.timers.advance(dt) {
            if Some(id) == self.playing {
                self.playing = None;
            }
        }
        if input.was_pressed(Key::Escape) {
            self.input.clear();
            self.output.clear();
            self.message = None;
            return;
        }
        if !self.is_playing() {
            if input.was_pressed(Key::Up) {
                self.speed = (self.speed + SPEED_STEP).min(MAX_SPEED);
            }
            if input.was_pressed(Key::Down) {
                self.speed = (self.speed - SPEED_STEP).max(MIN_SPEED);
            }
        }
        self.edit(input.text());
        if input.was_pressed(Key::Enter) {
            self.submit();
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.text("Input:", Vec2::new(8.0, 30.0), 14.0, Color::GREEN);
        surface.text(&format!("{}_", self.input), Vec2::new(8.0, 60.0), 20.0, Color::WHITE);
        surface.text("Output:", Vec2::new(8.0, 110.0), 14.0, Color::GREEN);
        surface.text(&self.output, Vec2::new(8.0, 140.0), 20.0, Color::WHITE);
        let state = if self.is_playing() { "Playing..." } else { "Enter: play" };
        surface.text(
            &format!("Speed: {:.1}x  {state}", self.speed),
            Vec2::new(8.0, 200.0),
            14.0,
            Color::GREEN,
        );
        if let Some(message) = &self.message {
            centered_text(surface, message, WIDTH / 2.0, 260.0, 14.0, Color::AMBER);
        }
    }

    fn status(&self) -> Status {
        Status::Running
    }

    fn score(&self) -> i64 {
        0
    }

    fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    fn take_tones(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.tones)
    }

    fn audio_failed(&mut self, err: &AudioError) {
        self.message = Some(format!("Sound unavailable: {err}"));
        if let Some(id) = self.playing.take() {
            self.timers.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode("SOS"), "... --- ...");
        assert_eq!(encode("hi 5"), ".... .. / .....");
        // Unknown characters are skipped
        assert_eq!(encode("a?b"), ".- -...");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("... --- ..."), "SOS");
        assert_eq!(decode(".... .. / .----"), "HI 1");
        assert_eq!(decode(".- ........ -..."), "AB");
        assert_eq!(decode(&encode("morse code 42")), "MORSE CODE 42");
    }

    #[test]
    fn test_schedule_timing() {
        let tones = playback_schedule(".- .", 1.0);
        assert_eq!(
            tones,
            vec![
                Tone::new(DOT_HZ, 0.0, 100.0),
                Tone::new(DASH_HZ, 200.0, 300.0),
                // dash ends at 500, +100 symbol gap, +300 letter gap
                Tone::new(DOT_HZ, 900.0, 100.0),
            ]
        );
        let fast = playback_schedule(".- .", 2.0);
        assert_eq!(fast[1].start_ms, 150.0);
        assert_eq!(fast[2].start_ms, 150.0 + 300.0 + 50.0 + 150.0);
        // Out-of-range speeds clamp
        assert_eq!(playback_schedule(".- .", 10.0), fast);
    }

    #[test]
    fn test_word_gap_has_no_tone() {
        let tones = playback_schedule(". / .", 1.0);
        assert_eq!(tones.len(), 2);
        // 100 + 100 + 300, then "/" adds 100 + 300
        assert_eq!(tones[1].start_ms, 900.0);
    }

    #[test]
    fn test_enter_encodes_and_queues_playback() {
        let mut game = MorseTrainer::new(&Settings::default());
        let mut input = InputState::new();
        for c in "et".chars() {
            input.type_char(c);
        }
        input.key_down(Key::Enter);
        game.step(&input, 0.016);
        assert_eq!(game.output, ". -");
        assert!(game.is_playing());
        let tones = game.take_tones();
        assert_eq!(tones.len(), 2);

        // Busy while playing
        game.submit();
        assert!(game.take_tones().is_empty());

        for _ in 0..80 {
            game.step(&InputState::new(), 0.016);
        }
        assert!(!game.is_playing());
    }

    #[test]
    fn test_morse_input_is_decoded() {
        let mut game = MorseTrainer::new(&Settings::default());
        game.input = "... --- ...".into();
        game.submit();
        assert_eq!(game.output, "SOS");
        assert_eq!(game.take_tones().len(), 9);
    }

    #[test]
    fn test_audio_failure_is_reported() {
        let mut game = MorseTrainer::new(&Settings::default());
        game.input = "e".into();
        game.submit();
        game.audio_failed(&AudioError::Unavailable("blocked".into()));
        assert!(!game.is_playing());
        assert!(game.message.as_deref().is_some_and(|m| m.contains("blocked")));
        assert_eq!(game.status(), Status::Running);
    }

    #[test]
    fn test_escape_clears_and_speed_keys() {
        let mut game = MorseTrainer::new(&Settings::default());
        game.input = "abc".into();
        let mut input = InputState::new();
        input.key_down(Key::Escape);
        game.step(&input, 0.016);
        assert!(game.input.is_empty());

        let mut input = InputState::new();
        for _ in 0..20 {
            input.key_up(Key::Up);
            input.key_down(Key::Up);
            game.step(&input, 0.016);
            input.end_tick();
        }
        assert_eq!(game.speed, MAX_SPEED);
    }
}
