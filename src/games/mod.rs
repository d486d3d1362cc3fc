//! Game catalogue
//!
//! Every game is an owned world implementing [`Game`]. The real-time games
//! live here; the card games live in [`crate::cards`].

pub mod aim;
pub mod avoidance;
pub mod breakout;
pub mod dino;
pub mod morse;
pub mod pong;
pub mod pool;
pub mod snake;
pub mod twenty48;
pub mod typing;

use std::fmt;
use std::str::FromStr;

use crate::cards::{blackjack::BlackjackGame, ride_the_bus::RideTheBusGame, war::WarGame};
use crate::driver::Game;
use crate::error::ArcadeError;
use crate::settings::Settings;

/// The games in the cabinet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Twenty48,
    Blackjack,
    War,
    RideTheBus,
    Snake,
    Pong,
    Breakout,
    Dino,
    Pool,
    AimTraining,
    BallAvoidance,
    TouchTyping,
    Morse,
}

impl GameKind {
    pub const ALL: [GameKind; 13] = [
        GameKind::Twenty48,
        GameKind::Blackjack,
        GameKind::War,
        GameKind::RideTheBus,
        GameKind::Snake,
        GameKind::Pong,
        GameKind::Breakout,
        GameKind::Dino,
        GameKind::Pool,
        GameKind::AimTraining,
        GameKind::BallAvoidance,
        GameKind::TouchTyping,
        GameKind::Morse,
    ];

    /// Identifier used for URLs, the CLI and storage keys
    pub fn slug(self) -> &'static str {
        match self {
            GameKind::Twenty48 => "2048",
            GameKind::Blackjack => "blackjack",
            GameKind::War => "war",
            GameKind::RideTheBus => "rideTheBus",
            GameKind::Snake => "snake",
            GameKind::Pong => "pong",
            GameKind::Breakout => "breakout",
            GameKind::Dino => "dino",
            GameKind::Pool => "pool",
            GameKind::AimTraining => "aimTraining",
            GameKind::BallAvoidance => "ballAvoidance",
            GameKind::TouchTyping => "touchTyping",
            GameKind::Morse => "morse",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Twenty48 => "2048",
            GameKind::Blackjack => "Blackjack",
            GameKind::War => "War",
            GameKind::RideTheBus => "Ride the Bus",
            GameKind::Snake => "Snake",
            GameKind::Pong => "Pong",
            GameKind::Breakout => "Breakout",
            GameKind::Dino => "Dino",
            GameKind::Pool => "Pool",
            GameKind::AimTraining => "Aim Training",
            GameKind::BallAvoidance => "Ball Avoidance",
            GameKind::TouchTyping => "Touch Typing",
            GameKind::Morse => "Morse Code",
        }
    }

    /// Surface size the game is laid out for
    pub fn surface_size(self) -> (f32, f32) {
        match self {
            GameKind::Twenty48 => (400.0, 430.0),
            GameKind::Blackjack | GameKind::War | GameKind::RideTheBus => (640.0, 400.0),
            GameKind::Snake => (400.0, 400.0),
            GameKind::Pong => (pong::WIDTH, pong::HEIGHT),
            GameKind::Breakout => (breakout::WIDTH, breakout::HEIGHT),
            GameKind::Dino => (dino::WIDTH, dino::HEIGHT),
            GameKind::Pool => (pool::WIDTH, pool::HEIGHT),
            GameKind::AimTraining => (aim::WIDTH, aim::HEIGHT),
            GameKind::BallAvoidance => (avoidance::WIDTH, avoidance::HEIGHT),
            GameKind::TouchTyping => (640.0, 300.0),
            GameKind::Morse => (640.0, 300.0),
        }
    }

    /// Short control summary
    pub fn controls(self) -> &'static str {
        match self {
            GameKind::Twenty48 => "Arrows slide, R restarts",
            GameKind::Blackjack => "Enter deals, H hits, S stands",
            GameKind::War => "Space flips, R restarts",
            GameKind::RideTheBus => {
                "Enter starts; Left/Right: red/black, then higher/lower, \
                 then inside/outside; W A S D: suit"
            }
            GameKind::Snake => "Enter starts, arrows steer, R restarts",
            GameKind::Pong => "W/S and Up/Down move paddles",
            GameKind::Breakout => "Pointer or Left/Right moves paddle",
            GameKind::Dino => "Space or Up jumps, R restarts",
            GameKind::Pool => {
                "Pointer or Left/Right aims, Up/Down sets strength, Space or click shoots"
            }
            GameKind::AimTraining => "Click to shoot, R reloads",
            GameKind::BallAvoidance => "Keep the pointer away from the balls",
            GameKind::TouchTyping => "Type the word, Enter restarts when time is up",
            GameKind::Morse => "Type text, Enter plays it, Escape clears",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for GameKind {
    type Err = ArcadeError;

    /// Accepts the slug in any case, with or without dashes/underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.slug().to_lowercase() == wanted)
            .ok_or_else(|| ArcadeError::UnknownGame(s.to_string()))
    }
}

/// Build a fresh game world
pub fn create(kind: GameKind, seed: u64, settings: &Settings) -> Box<dyn Game> {
    match kind {
        GameKind::Twenty48 => Box::new(twenty48::Twenty48::new(seed)),
        GameKind::Blackjack => Box::new(BlackjackGame::new(seed)),
        GameKind::War => Box::new(WarGame::new(seed)),
        GameKind::RideTheBus => Box::new(RideTheBusGame::new(seed)),
        GameKind::Snake => Box::new(snake::Snake::new(seed, settings)),
        GameKind::Pong => Box::new(pong::Pong::new(seed)),
        GameKind::Breakout => Box::new(breakout::Breakout::new()),
        GameKind::Dino => Box::new(dino::Dino::new()),
        GameKind::Pool => Box::new(pool::Pool::new(seed)),
        GameKind::AimTraining => Box::new(aim::AimTraining::new(seed, settings)),
        GameKind::BallAvoidance => Box::new(avoidance::BallAvoidance::new(seed, settings)),
        GameKind::TouchTyping => {
            Box::new(typing::TouchTyping::new(crate::platform::word_source(seed)))
        }
        GameKind::Morse => Box::new(morse::MorseTrainer::new(settings)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_roundtrip() {
        for kind in GameKind::ALL {
            assert_eq!(kind.slug().parse::<GameKind>().unwrap(), kind);
        }
        assert_eq!("ball-avoidance".parse::<GameKind>().unwrap(), GameKind::BallAvoidance);
        assert_eq!("RIDE_THE_BUS".parse::<GameKind>().unwrap(), GameKind::RideTheBus);
        assert!(matches!(
            "tetris".parse::<GameKind>(),
            Err(ArcadeError::UnknownGame(_))
        ));
    }

    #[test]
    fn test_create_matches_kind() {
        let settings = Settings::default();
        for kind in GameKind::ALL {
            let game = create(kind, 1, &settings);
            assert_eq!(game.kind(), kind);
        }
    }
}
