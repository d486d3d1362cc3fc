//! War
//!
//! The deck is split 26/26. Each flip compares top cards; the higher rank
//! takes both. Equal ranks start a war: each side commits four cards and the
//! fourth decides, ties escalating into another war. A side that cannot
//! commit four cards, or has nothing left to flip, loses.

use glam::Vec2;

use super::{Card, Deck, TurnError, draw_card};
use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::sim::{GameRng, Timers, seeded};

/// Cards each side commits to a war (three down, one up)
pub const WAR_STAKE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "You",
            Side::Opponent => "Opponent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    WarPending,
    GameOver { winner: Side },
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::WarPending => "a war is pending",
            Phase::GameOver { .. } => "the game is over",
        }
    }
}

/// What a flip or war produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Battle {
    Taken { by: Side, cards: usize },
    Tie,
    Over { winner: Side },
}

/// War table
#[derive(Debug, Clone)]
pub struct WarGame {
    pub phase: Phase,
    pub player: Deck,
    pub opponent: Deck,
    /// Cards in the middle of the table
    pub pot: Vec<Card>,
    /// Face-up cards of the last comparison
    pub shown: Option<(Card, Card)>,
    pub rounds_won: u32,
    pub wars: u32,
    rng: GameRng,
    timers: Timers,
    tones: Vec<Tone>,
}

impl WarGame {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Idle,
            player: Deck::empty(),
            opponent: Deck::empty(),
            pot: Vec::new(),
            shown: None,
            rounds_won: 0,
            wars: 0,
            rng: seeded(seed),
            timers: Timers::new(),
            tones: Vec::new(),
        }
    }

    /// Table with fixed piles (top first), already playing
    pub fn from_piles(player: Vec<Card>, opponent: Vec<Card>) -> Self {
        let mut game = Self::new(0);
        game.player = player.into_iter().collect();
        game.opponent = opponent.into_iter().collect();
        game.phase = Phase::Playing;
        game
    }

    fn wrong_phase(&self, action: &'static str) -> TurnError {
        TurnError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }

    pub fn card_count(&self) -> usize {
        self.player.len() + self.opponent.len() + self.pot.len()
    }

    /// Shuffle and split the deck
    pub fn start(&mut self) {
        let mut deck = Deck::shuffled(&mut self.rng);
        self.opponent = deck.split_off(26);
        self.player = deck;
        self.pot.clear();
        self.shown = None;
        self.rounds_won = 0;
        self.wars = 0;
        self.phase = Phase::Playing;
    }

    /// Flip one card each
    pub fn flip(&mut self) -> Result<Battle, TurnError> {
        if self.phase != Phase::Playing {
            return Err(self.wrong_phase("flip"));
        }
        if self.player.is_empty() || self.opponent.is_empty() {
            return Err(TurnError::DeckEmpty);
        }
        let mine = self.player.deal()?;
        let theirs = self.opponent.deal()?;
        self.pot.extend([mine, theirs]);
        Ok(self.compare(mine, theirs))
    }

    /// Commit four cards each and compare the last
    pub fn resolve_war(&mut self) -> Result<Battle, TurnError> {
        if self.phase != Phase::WarPending {
            return Err(self.wrong_phase("resolve a war"));
        }
        self.wars += 1;
        let (mine, theirs) = (self.player.len(), self.opponent.len());
        if mine < WAR_STAKE || theirs < WAR_STAKE {
            // Short on cards: the side with fewer loses, the opponent on a tie
            let winner = if mine > theirs { Side::Player } else { Side::Opponent };
            return Ok(self.finish(winner));
        }
        let mut last = Vec::with_capacity(2);
        for pile in [&mut self.player, &mut self.opponent] {
            let committed: Vec<Card> = (0..WAR_STAKE).filter_map(|_| pile.draw()).collect();
            last.push(committed[WAR_STAKE - 1]);
            self.pot.extend(committed);
        }
        Ok(self.compare(last[0], last[1]))
    }

    fn compare(&mut self, mine: Card, theirs: Card) -> Battle {
        self.shown = Some((mine, theirs));
        if mine.rank == theirs.rank {
            self.phase = Phase::WarPending;
            self.tones.extend(SoundCue::Hit.tones());
            return Battle::Tie;
        }
        let by = if mine.rank > theirs.rank { Side::Player } else { Side::Opponent };
        let cards = self.pot.len();
        let pot = std::mem::take(&mut self.pot);
        match by {
            Side::Player => {
                self.player.put_bottom(pot);
                self.rounds_won += 1;
            }
            Side::Opponent => self.opponent.put_bottom(pot),
        }
        self.phase = Phase::Playing;

        if self.opponent.is_empty() {
            self.finish(Side::Player)
        } else if self.player.is_empty() {
            self.finish(Side::Opponent)
        } else {
            Battle::Taken { by, cards }
        }
    }

    /// End the game; the winner collects everything on the table
    fn finish(&mut self, winner: Side) -> Battle {
        let mut rest: Vec<Card> = std::mem::take(&mut self.pot);
        let (winning, losing) = match winner {
            Side::Player => (&mut self.player, &mut self.opponent),
            Side::Opponent => (&mut self.opponent, &mut self.player),
        };
        while let Some(card) = losing.draw() {
            rest.push(card);
        }
        winning.put_bottom(rest);
        self.phase = Phase::GameOver { winner };
        let cue = if winner == Side::Player { SoundCue::Win } else { SoundCue::GameOver };
        self.tones.extend(cue.tones());
        log::info!("War over: {} won after {} wars", winner.label(), self.wars);
        Battle::Over { winner }
    }

    /// Advance whatever the table is waiting for
    pub fn play(&mut self) -> Result<Battle, TurnError> {
        match self.phase {
            Phase::Playing => self.flip(),
            Phase::WarPending => self.resolve_war(),
            _ => Err(self.wrong_phase("play")),
        }
    }
}

impl Game for WarGame {
    fn kind(&self) -> GameKind {
        GameKind::War
    }

    fn restart(&mut self) {
        self.phase = Phase::Idle;
        self.player = Deck::empty();
        self.opponent = Deck::empty();
        self.pot.clear();
        self.shown = None;
        self.rounds_won = 0;
        self.wars = 0;
        self.timers = Timers::new();
        self.tones.clear();
    }

    fn step(&mut self, input: &InputState, _dt: f32) {
        let space = input.was_pressed(Key::Space);
        match self.phase {
            Phase::Idle if space => self.start(),
            Phase::GameOver { .. } if space || input.was_pressed(Key::R) => self.start(),
            Phase::Playing | Phase::WarPending if space => {
                if let Err(e) = self.play() {
                    log::debug!("Ignored: {e}");
                }
            }
            _ if input.was_pressed(Key::R) => self.restart(),
            _ => {}
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        const W: f32 = 640.0;
        surface.text(
            &format!("You: {} cards", self.player.len()),
            Vec2::new(8.0, 24.0),
            16.0,
            Color::GREEN,
        );
        surface.text(
            &format!("Opponent: {} cards", self.opponent.len()),
            Vec2::new(W - 200.0, 24.0),
            16.0,
            Color::GREEN,
        );
        if let Some((mine, theirs)) = self.shown {
            draw_card(surface, Vec2::new(W / 2.0 - 80.0, 120.0), Some(mine));
            draw_card(surface, Vec2::new(W / 2.0 + 20.0, 120.0), Some(theirs));
        }
        if !self.pot.is_empty() {
            surface.text(
                &format!("Pot: {}", self.pot.len()),
                Vec2::new(W / 2.0 - 30.0, 230.0),
                14.0,
                Color::WHITE,
            );
        }
        let message = match self.phase {
            Phase::Idle => "Press Space to deal".to_string(),
            Phase::Playing => "Space: flip".to_string(),
            Phase::WarPending => "WAR! Space: commit four cards".to_string(),
            Phase::GameOver { winner } => format!(
                "{} won the war! Space to play again",
                winner.label(),
            ),
        };
        centered_text(surface, &message, W / 2.0, 320.0, 18.0, Color::AMBER);
    }

    fn status(&self) -> Status {
        match self.phase {
            Phase::Idle => Status::Ready,
            Phase::GameOver { winner: Side::Player } => Status::Won,
            Phase::GameOver { winner: Side::Opponent } => Status::Lost,
            _ => Status::Running,
        }
    }

    fn score(&self) -> i64 {
        i64::from(self.rounds_won)
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
    use crate::cards::{Rank, Suit};
    use proptest::prelude::*;

    fn cards(ranks: &[Rank], suit: Suit) -> Vec<Card> {
        ranks.iter().map(|&r| Card::new(r, suit)).collect()
    }

    #[test]
    fn test_start_splits_evenly() {
        let mut game = WarGame::new(4);
        game.start();
        assert_eq!((game.player.len(), game.opponent.len()), (26, 26));
        assert_eq!(game.phase, Phase::Playing);
    }

    #[test]
    fn test_higher_card_takes_both() {
        let mut game = WarGame::from_piles(
            cards(&[Rank::King, Rank::Two], Suit::Hearts),
            cards(&[Rank::Five, Rank::Three], Suit::Clubs),
        );
        assert_eq!(game.flip(), Ok(Battle::Taken { by: Side::Player, cards: 2 }));
        assert_eq!((game.player.len(), game.opponent.len()), (3, 1));
        assert_eq!(game.rounds_won, 1);
    }

    #[test]
    fn test_tie_goes_to_war_and_commits_four() {
        let mut game = WarGame::from_piles(
            cards(
                &[Rank::Nine, Rank::Two, Rank::Two, Rank::Two, Rank::Ace, Rank::Three],
                Suit::Hearts,
            ),
            cards(
                &[Rank::Nine, Rank::Four, Rank::Four, Rank::Four, Rank::King, Rank::Five],
                Suit::Clubs,
            ),
        );
        assert_eq!(game.flip(), Ok(Battle::Tie));
        assert_eq!(game.phase, Phase::WarPending);
        assert!(game.flip().is_err());

        let before = (game.player.len(), game.opponent.len());
        assert_eq!(game.resolve_war(), Ok(Battle::Taken { by: Side::Player, cards: 10 }));
        assert_eq!(before, (5, 5));
        assert_eq!((game.player.len(), game.opponent.len()), (11, 1));
    }

    #[test]
    fn test_repeated_tie_escalates() {
        let mut game = WarGame::from_piles(
            cards(
                &[
                    Rank::Nine,
                    Rank::Two,
                    Rank::Two,
                    Rank::Two,
                    Rank::Jack,
                    Rank::Two,
                    Rank::Two,
                    Rank::Two,
                    Rank::Ace,
                    Rank::Six,
                ],
                Suit::Hearts,
            ),
            cards(
                &[
                    Rank::Nine,
                    Rank::Three,
                    Rank::Three,
                    Rank::Three,
                    Rank::Jack,
                    Rank::Three,
                    Rank::Three,
                    Rank::Three,
                    Rank::Queen,
                    Rank::Six,
                ],
                Suit::Clubs,
            ),
        );
        assert_eq!(game.flip(), Ok(Battle::Tie));
        assert_eq!(game.resolve_war(), Ok(Battle::Tie));
        assert_eq!(game.pot.len(), 10);
        assert_eq!(game.phase, Phase::WarPending);
        assert_eq!(game.resolve_war(), Ok(Battle::Taken { by: Side::Player, cards: 18 }));
        assert_eq!(game.wars, 2);
        assert_eq!(game.card_count(), 20);
    }

    #[test]
    fn test_short_stack_loses_war() {
        let mut game = WarGame::from_piles(
            cards(&[Rank::Nine, Rank::Two, Rank::Three], Suit::Hearts),
            cards(&[Rank::Nine, Rank::Four, Rank::Five, Rank::Six, Rank::Seven], Suit::Clubs),
        );
        game.flip().unwrap();
        assert_eq!(game.resolve_war(), Ok(Battle::Over { winner: Side::Opponent }));
        assert_eq!(game.phase, Phase::GameOver { winner: Side::Opponent });
        assert_eq!(game.opponent.len(), 8);
        assert_eq!(game.status(), Status::Lost);
    }

    #[test]
    fn test_empty_pile_loses() {
        let mut game = WarGame::from_piles(
            cards(&[Rank::Ace], Suit::Hearts),
            cards(&[Rank::Two], Suit::Clubs),
        );
        assert_eq!(game.flip(), Ok(Battle::Over { winner: Side::Player }));
        assert_eq!(game.status(), Status::Won);
        assert!(game.flip().is_err());
    }

    #[test]
    fn test_space_drives_game() {
        let mut game = WarGame::new(8);
        assert_eq!(game.status(), Status::Ready);
        let mut input = InputState::new();
        input.key_down(Key::Space);
        game.step(&input, 0.016);
        assert_eq!(game.phase, Phase::Playing);
        game.step(&input, 0.016);
        assert!(game.shown.is_some());
        assert_eq!(game.card_count(), 52);
    }

    proptest! {
        #[test]
        fn test_cards_are_conserved(seed in 0u64..500, plays in 1usize..400) {
            let mut game = WarGame::new(seed);
            game.start();
            for _ in 0..plays {
                if game.play().is_err() {
                    break;
                }
                prop_assert_eq!(game.card_count(), 52);
            }
        }
    }
}
