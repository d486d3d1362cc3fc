//! Card games
//!
//! A shared 52-card model plus one turn resolver per game. Resolvers are
//! explicit phase machines: every action checks the phase it is legal in and
//! returns a [`TurnError`] otherwise. Cards only ever move between zones
//! (deck, hands, piles), so each game holds exactly 52 unique cards at all
//! times.

pub mod blackjack;
pub mod ride_the_bus;
pub mod war;

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

pub use crate::error::TurnError;
use crate::renderer::{Color, Surface};
use crate::sim::Rect;

pub const CARD_WIDTH: f32 = 60.0;
pub const CARD_HEIGHT: f32 = 84.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Comparison value: 2-10 face, J=11, Q=12, K=13, A=14
    pub fn value(self) -> u32 {
        self as u32
    }

    /// Blackjack points before ace reduction: faces 10, ace 11
    pub fn blackjack_value(self) -> u32 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
            other => other.value(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// Ordered pile of cards; the top is the front
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    pub fn empty() -> Self {
        Self::default()
    }

    /// All 52 cards, suit by suit
    pub fn standard() -> Self {
        Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
            .collect()
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// Take the top card
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    /// Take the top card or fail with [`TurnError::DeckEmpty`]
    pub fn deal(&mut self) -> Result<Card, TurnError> {
        self.draw().ok_or(TurnError::DeckEmpty)
    }

    pub fn put_bottom(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    /// Split off the bottom `len() - at` cards into a new deck
    pub fn split_off(&mut self, at: usize) -> Deck {
        Deck {
            cards: self.cards.split_off(at.min(self.cards.len())),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

impl FromIterator<Card> for Deck {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

/// Draw one card face at `pos` (top-left); `None` draws the card back
pub fn draw_card(surface: &mut dyn Surface, pos: Vec2, card: Option<Card>) {
    let rect = Rect::from_pos_size(pos, Vec2::new(CARD_WIDTH, CARD_HEIGHT));
    match card {
        Some(card) => {
            surface.fill_rect(rect, Color::WHITE);
            let ink = if card.suit.is_red() { Color::RED } else { Color::BLACK };
            surface.text(&card.to_string(), pos + Vec2::new(6.0, 24.0), 18.0, ink);
        }
        None => {
            surface.fill_rect(rect, Color::DARK_GREEN);
            surface.fill_rect(rect.expanded(-4.0), Color::GREY);
        }
    }
}

/// Draw a row of cards left to right
pub fn draw_hand(surface: &mut dyn Surface, pos: Vec2, cards: &[Card], hide_first: bool) {
    for (i, &card) in cards.iter().enumerate() {
        let at = pos + Vec2::new(i as f32 * (CARD_WIDTH + 8.0), 0.0);
        let face = if i == 0 && hide_first { None } else { Some(card) };
        draw_card(surface, at, face);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck_is_complete() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), 52);
        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut rng = seeded(11);
        let deck = Deck::shuffled(&mut rng);
        assert_ne!(deck, Deck::standard());
        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_draw_and_put_bottom() {
        let mut deck = Deck::standard();
        let top = deck.draw().unwrap();
        assert_eq!(top, Card::new(Rank::Two, Suit::Hearts));
        deck.put_bottom([top]);
        assert_eq!(deck.len(), 52);
        assert_eq!(deck.iter().last(), Some(&top));

        let mut empty = Deck::empty();
        assert_eq!(empty.deal(), Err(TurnError::DeckEmpty));
    }

    #[test]
    fn test_split_halves() {
        let mut deck = Deck::standard();
        let bottom = deck.split_off(26);
        assert_eq!((deck.len(), bottom.len()), (26, 26));
    }

    #[test]
    fn test_rank_values() {
        assert_eq!(Rank::Two.value(), 2);
        assert_eq!(Rank::Ten.value(), 10);
        assert_eq!(Rank::Jack.value(), 11);
        assert_eq!(Rank::Ace.value(), 14);
        assert_eq!(Rank::King.blackjack_value(), 10);
        assert_eq!(Rank::Ace.blackjack_value(), 11);
        assert!(Suit::Diamonds.is_red() && !Suit::Spades.is_red());
        assert_eq!(Card::new(Rank::Ten, Suit::Clubs).to_string(), "10♣");
    }
}
