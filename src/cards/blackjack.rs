//! Blackjack
//!
//! One player against the dealer, fresh shuffled deck every deal. The
//! running score moves by 10 per decided hand.

use glam::Vec2;

use super::{Card, Deck, TurnError, draw_hand};
use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::{Color, Surface};
use crate::sim::{GameRng, Timers, seeded};

pub const BLACKJACK: u32 = 21;
/// Dealer draws while below this
pub const DEALER_STAND: u32 = 17;
pub const STAKE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PlayerBust,
    DealerBust,
    PlayerWins,
    DealerWins,
    Push,
}

impl Outcome {
    /// Score change for the player
    pub fn delta(self) -> i64 {
        match self {
            Outcome::DealerBust | Outcome::PlayerWins => STAKE,
            Outcome::PlayerBust | Outcome::DealerWins => -STAKE,
            Outcome::Push => 0,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::PlayerBust => "You busted!",
            Outcome::DealerBust => "Dealer busted! You win!",
            Outcome::PlayerWins => "You win!",
            Outcome::DealerWins => "You lose!",
            Outcome::Push => "It's a tie!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PlayerTurn,
    DealerTurn,
    Resolved(Outcome),
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::PlayerTurn => "the player's turn",
            Phase::DealerTurn => "the dealer's turn",
            Phase::Resolved(_) => "the hand is resolved",
        }
    }
}

/// Best total for a hand: aces count 11, then drop to 1 one at a time while
/// the total is over 21
pub fn hand_value(hand: &[Card]) -> u32 {
    let mut total: u32 = hand.iter().map(|c| c.rank.blackjack_value()).sum();
    let mut soft_aces = hand.iter().filter(|c| c.rank == super::Rank::Ace).count();
    while total > BLACKJACK && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

/// Blackjack table
#[derive(Debug, Clone)]
pub struct BlackjackGame {
    pub phase: Phase,
    pub deck: Deck,
    pub player: Vec<Card>,
    pub dealer: Vec<Card>,
    pub score: i64,
    rng: GameRng,
    timers: Timers,
    tones: Vec<Tone>,
}

impl BlackjackGame {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Idle,
            deck: Deck::standard(),
            player: Vec::new(),
            dealer: Vec::new(),
            score: 0,
            rng: seeded(seed),
            timers: Timers::new(),
            tones: Vec::new(),
        }
    }

    fn wrong_phase(&self, action: &'static str) -> TurnError {
        TurnError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }

    pub fn player_total(&self) -> u32 {
        hand_value(&self.player)
    }

    pub fn dealer_total(&self) -> u32 {
        hand_value(&self.dealer)
    }

    /// The dealer's first card stays face down until the dealer plays
    pub fn dealer_hidden(&self) -> bool {
        self.phase == Phase::PlayerTurn
    }

    /// Fresh deck, two cards each
    pub fn deal(&mut self) -> Result<(), TurnError> {
        if !matches!(self.phase, Phase::Idle | Phase::Resolved(_)) {
            return Err(self.wrong_phase("deal"));
        }
        self.deck = Deck::shuffled(&mut self.rng);
        self.player.clear();
        self.dealer.clear();
        for _ in 0..2 {
            self.player.push(self.deck.deal()?);
        }
        for _ in 0..2 {
            self.dealer.push(self.deck.deal()?);
        }
        self.phase = Phase::PlayerTurn;
        Ok(())
    }

    pub fn hit(&mut self) -> Result<(), TurnError> {
        if self.phase != Phase::PlayerTurn {
            return Err(self.wrong_phase("hit"));
        }
        self.player.push(self.deck.deal()?);
        if self.player_total() > BLACKJACK {
            self.resolve(Outcome::PlayerBust);
        }
        Ok(())
    }

    pub fn stand(&mut self) -> Result<(), TurnError> {
        if self.phase != Phase::PlayerTurn {
            return Err(self.wrong_phase("stand"));
        }
        self.phase = Phase::DealerTurn;
        Ok(())
    }

    /// Dealer draws to 17, then the hand is settled
    pub fn play_dealer(&mut self) -> Result<Outcome, TurnError> {
        if self.phase != Phase::DealerTurn {
            return Err(self.wrong_phase("play the dealer"));
        }
        while self.dealer_total() < DEALER_STAND {
            self.dealer.push(self.deck.deal()?);
        }
        let (player, dealer) = (self.player_total(), self.dealer_total());
        let outcome = if dealer > BLACKJACK {
            Outcome::DealerBust
        } else if player > dealer {
            Outcome::PlayerWins
        } else if player == dealer {
            Outcome::Push
        } else {
            Outcome::DealerWins
        };
        self.resolve(outcome);
        Ok(outcome)
    }

    fn resolve(&mut self, outcome: Outcome) {
        self.phase = Phase::Resolved(outcome);
        self.score += outcome.delta();
        let cue = match outcome.delta() {
            d if d > 0 => SoundCue::Win,
            d if d < 0 => SoundCue::GameOver,
            _ => SoundCue::Bounce,
        };
        self.tones.extend(cue.tones());
        log::debug!("Blackjack hand: {outcome:?}, score {}", self.score);
    }

    /// Cards in every zone
    pub fn card_count(&self) -> usize {
        self.deck.len() + self.player.len() + self.dealer.len()
    }
}

impl Game for BlackjackGame {
    fn kind(&self) -> GameKind {
        GameKind::Blackjack
    }

    fn restart(&mut self) {
        self.phase = Phase::Idle;
        self.deck = Deck::standard();
        self.player.clear();
        self.dealer.clear();
        self.score = 0;
        self.timers = Timers::new();
        self.tones.clear();
    }

    fn step(&mut self, input: &InputState, _dt: f32) {
        let result = if self.phase == Phase::DealerTurn {
            self.play_dealer().map(|_| ())
        } else if input.was_pressed(Key::Enter) {
            self.deal()
        } else if input.was_pressed(Key::H) {
            self.hit()
        } else if input.was_pressed(Key::S) {
            self.stand()
        } else {
            Ok(())
        };
        if let Err(e) = result {
            log::debug!("Ignored: {e}");
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.text(&format!("Score: {}", self.score), Vec2::new(8.0, 24.0), 18.0, Color::GREEN);

        surface.text("Dealer Hand", Vec2::new(8.0, 60.0), 14.0, Color::GREEN);
        draw_hand(surface, Vec2::new(8.0, 70.0), &self.dealer, self.dealer_hidden());
        if !self.dealer_hidden() && !self.dealer.is_empty() {
            surface.text(
                &format!("Dealer: {}", self.dealer_total()),
                Vec2::new(8.0, 172.0),
                14.0,
                Color::WHITE,
            );
        }

        surface.text("Player Hand", Vec2::new(8.0, 200.0), 14.0, Color::GREEN);
        draw_hand(surface, Vec2::new(8.0, 210.0), &self.player, false);
        if !self.player.is_empty() {
            surface.text(
                &format!("Player: {}", self.player_total()),
                Vec2::new(8.0, 312.0),
                14.0,
                Color::WHITE,
            );
        }

        let message = match self.phase {
            Phase::Idle => "Press Enter to deal",
            Phase::PlayerTurn => "Hit (H) or Stand (S)?",
            Phase::DealerTurn => "Dealer plays...",
            Phase::Resolved(outcome) => outcome.message(),
        };
        surface.text(message, Vec2::new(8.0, 350.0), 16.0, Color::AMBER);
    }

    /// Hands repeat indefinitely; the table never closes
    fn status(&self) -> Status {
        Status::Running
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    fn take_tones(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.tones)
    }
}
