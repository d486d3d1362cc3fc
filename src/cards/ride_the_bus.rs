//! Ride the Bus
//!
//! Four guesses in a row, each against a freshly drawn card: color, higher or
//! lower than the first card, inside or outside the first two, then the suit.
//! A wrong guess discards the revealed cards, costs an attempt and sends the
//! player back to the first round.

use glam::Vec2;

use super::{Card, Deck, Suit, TurnError, draw_hand};
use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::sim::{GameRng, Timers, seeded};

pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Round {
    Color,
    HigherLower,
    InsideOutside,
    Suit,
}

impl Round {
    fn next(self) -> Option<Round> {
        match self {
            Round::Color => Some(Round::HigherLower),
            Round::HigherLower => Some(Round::InsideOutside),
            Round::InsideOutside => Some(Round::Suit),
            Round::Suit => None,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Round::Color => "Red (Left) or black (Right)?",
            Round::HigherLower => "Higher (Left) or lower (Right)?",
            Round::InsideOutside => "Inside (Left) or outside (Right)?",
            Round::Suit => "Suit? W hearts, A clubs, S spades, D diamonds",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Red,
    Black,
    Higher,
    Lower,
    Inside,
    Outside,
    Suit(Suit),
}

impl Guess {
    fn round(self) -> Round {
        match self {
            Guess::Red | Guess::Black => Round::Color,
            Guess::Higher | Guess::Lower => Round::HigherLower,
            Guess::Inside | Guess::Outside => Round::InsideOutside,
            Guess::Suit(_) => Round::Suit,
        }
    }

    /// Key binding for `round`
    fn from_input(input: &InputState, round: Round) -> Option<Guess> {
        let (left, right) = match round {
            Round::Color => (Guess::Red, Guess::Black),
            Round::HigherLower => (Guess::Higher, Guess::Lower),
            Round::InsideOutside => (Guess::Inside, Guess::Outside),
            Round::Suit => {
                return [
                    (Key::W, Suit::Hearts),
                    (Key::A, Suit::Clubs),
                    (Key::S, Suit::Spades),
                    (Key::D, Suit::Diamonds),
                ]
                .into_iter()
                .find(|(key, _)| input.was_pressed(*key))
                .map(|(_, suit)| Guess::Suit(suit));
            }
        };
        if input.was_pressed(Key::Left) {
            Some(left)
        } else if input.was_pressed(Key::Right) {
            Some(right)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Guessing(Round),
    Won,
    Lost,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Guessing(_) => "guessing",
            Phase::Won => "the bus has been ridden",
            Phase::Lost => "out of attempts",
        }
    }
}

/// Whether `guess` holds for `card` given the cards already revealed
///
/// Equal ranks and boundary values are never correct.
pub fn is_correct(guess: Guess, card: Card, revealed: &[Card]) -> bool {
    let value = card.rank.value();
    match guess {
        Guess::Red => card.suit.is_red(),
        Guess::Black => !card.suit.is_red(),
        Guess::Higher | Guess::Lower => {
            let Some(first) = revealed.first() else {
                return false;
            };
            let first = first.rank.value();
            if guess == Guess::Higher { value > first } else { value < first }
        }
        Guess::Inside | Guess::Outside => {
            let [a, b, ..] = revealed else {
                return false;
            };
            let (lo, hi) = {
                let (a, b) = (a.rank.value(), b.rank.value());
                (a.min(b), a.max(b))
            };
            if guess == Guess::Inside {
                lo < value && value < hi
            } else {
                value < lo || value > hi
            }
        }
        Guess::Suit(suit) => card.suit == suit,
    }
}

/// Ride the Bus table
#[derive(Debug, Clone)]
pub struct RideTheBusGame {
    pub phase: Phase,
    pub deck: Deck,
    /// Cards drawn in the current run, oldest first
    pub revealed: Vec<Card>,
    pub discard: Vec<Card>,
    pub attempts: u32,
    /// Outcome of the last guess
    pub last_correct: Option<bool>,
    rng: GameRng,
    timers: Timers,
    tones: Vec<Tone>,
}

impl RideTheBusGame {
    pub fn new(seed: u64) -> Self {
        let mut rng = seeded(seed);
        let deck = Deck::shuffled(&mut rng);
        Self {
            phase: Phase::Idle,
            deck,
            revealed: Vec::new(),
            discard: Vec::new(),
            attempts: 0,
            last_correct: None,
            rng,
            timers: Timers::new(),
            tones: Vec::new(),
        }
    }

    pub fn card_count(&self) -> usize {
        self.deck.len() + self.revealed.len() + self.discard.len()
    }

    /// Collect every card, shuffle and begin round one
    pub fn start(&mut self) {
        let loose = self.revealed.drain(..).chain(self.discard.drain(..));
        self.deck.put_bottom(loose);
        self.deck.shuffle(&mut self.rng);
        self.attempts = 0;
        self.last_correct = None;
        self.phase = Phase::Guessing(Round::Color);
    }

    fn next_card(&mut self) -> Result<Card, TurnError> {
        if self.deck.is_empty() {
            log::debug!("Reshuffling {} discarded cards", self.discard.len());
            self.deck.put_bottom(self.discard.drain(..));
            self.deck.shuffle(&mut self.rng);
        }
        self.deck.deal()
    }

    /// Draw a card and judge `guess`; returns whether it was right
    pub fn guess(&mut self, guess: Guess) -> Result<bool, TurnError> {
        let Phase::Guessing(round) = self.phase else {
            return Err(TurnError::WrongPhase {
                action: "guess",
                phase: self.phase.name(),
            });
        };
        if guess.round() != round {
            return Err(TurnError::WrongGuess);
        }
        let card = self.next_card()?;
        let correct = is_correct(guess, card, &self.revealed);
        self.revealed.push(card);
        self.last_correct = Some(correct);

        if correct {
            self.phase = match round.next() {
                Some(next) => Phase::Guessing(next),
                None => {
                    self.tones.extend(SoundCue::Win.tones());
                    log::info!("Rode the bus with {} wrong guesses", self.attempts);
                    Phase::Won
                }
            };
        } else {
            self.attempts += 1;
            self.discard.append(&mut self.revealed);
            if self.attempts >= MAX_ATTEMPTS {
                self.tones.extend(SoundCue::GameOver.tones());
                self.phase = Phase::Lost;
            } else {
                self.tones.extend(SoundCue::Hit.tones());
                self.phase = Phase::Guessing(Round::Color);
            }
        }
        Ok(correct)
    }
}

impl Game for RideTheBusGame {
    fn kind(&self) -> GameKind {
        GameKind::RideTheBus
    }

    fn restart(&mut self) {
        self.start();
        self.phase = Phase::Idle;
        self.timers = Timers::new();
        self.tones.clear();
    }

    fn step(&mut self, input: &InputState, _dt: f32) {
        match self.phase {
            Phase::Guessing(round) => {
                if let Some(guess) = Guess::from_input(input, round) {
                    if let Err(e) = self.guess(guess) {
                        log::debug!("Ignored: {e}");
                    }
                }
            }
            _ if input.was_pressed(Key::Enter) => self.start(),
            _ => {}
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        const W: f32 = 640.0;
        surface.text(
            &format!("Attempts: {}/{MAX_ATTEMPTS}", self.attempts),
            Vec2::new(8.0, 24.0),
            16.0,
            Color::GREEN,
        );
        draw_hand(surface, Vec2::new(W / 2.0 - 136.0, 100.0), &self.revealed, false);
        let message = match self.phase {
            Phase::Idle => "Press Enter to ride the bus",
            Phase::Guessing(round) => round.prompt(),
            Phase::Won => "You rode the bus! Enter to play again",
            Phase::Lost => "Out of attempts. Enter to try again",
        };
        centered_text(surface, message, W / 2.0, 300.0, 18.0, Color::AMBER);
        if let (Some(false), Phase::Guessing(Round::Color)) = (self.last_correct, self.phase) {
            centered_text(surface, "Wrong! Back to the start", W / 2.0, 330.0, 14.0, Color::RED);
        }
    }

    fn status(&self) -> Status {
        match self.phase {
            Phase::Idle => Status::Ready,
            Phase::Guessing(_) => Status::Running,
            Phase::Won => Status::Won,
            Phase::Lost => Status::Lost,
        }
    }

    /// Attempts left when the bus is ridden
    fn score(&self) -> i64 {
        match self.phase {
            Phase::Won => i64::from(MAX_ATTEMPTS - self.attempts),
            _ => 0,
        }
    }

    fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    fn take_tones(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.tones)
    }
}
