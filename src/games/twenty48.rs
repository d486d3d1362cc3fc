//! 2048
//!
//! Slide the 4×4 board with the arrow keys; equal tiles merge once per move.
//! A move that changes nothing spawns nothing.

use glam::Vec2;
use rand::Rng;

use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::sim::{GameRng, Rect, Timers, seeded};

pub const SIZE: usize = 4;
pub const WIN_TILE: u32 = 2048;
const TILE: f32 = 90.0;
const GAP: f32 = 8.0;

pub type Board = [[u32; SIZE]; SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    fn from_key(key: Key) -> Option<Move> {
        match key {
            Key::Up => Some(Move::Up),
            Key::Down => Some(Move::Down),
            Key::Left => Some(Move::Left),
            Key::Right => Some(Move::Right),
            _ => None,
        }
    }
}

/// Slide one line toward index 0, merging each tile at most once
///
/// Returns the new line and the points gained (sum of merged tiles).
pub fn slide_line(line: [u32; SIZE]) -> ([u32; SIZE], u32) {
    let mut out = [0; SIZE];
    let mut gained = 0;
    let mut len = 0;
    let mut merged_last = false;
    for value in line.into_iter().filter(|&v| v != 0) {
        if len > 0 && out[len - 1] == value && !merged_last {
            out[len - 1] *= 2;
            gained += out[len - 1];
            merged_last = true;
        } else {
            out[len] = value;
            len += 1;
            merged_last = false;
        }
    }
    (out, gained)
}

/// Cells of line `i` for a move, ordered from the edge tiles slide toward
fn line_cells(dir: Move, i: usize) -> [(usize, usize); SIZE] {
    std::array::from_fn(|j| match dir {
        Move::Left => (i, j),
        Move::Right => (i, SIZE - 1 - j),
        Move::Up => (j, i),
        Move::Down => (SIZE - 1 - j, i),
    })
}

/// Apply a move to a board; returns the new board and points gained
pub fn slide_board(board: &Board, dir: Move) -> (Board, u32) {
    let mut next = *board;
    let mut gained = 0;
    for i in 0..SIZE {
        let cells = line_cells(dir, i);
        let line = cells.map(|(r, c)| board[r][c]);
        let (slid, points) = slide_line(line);
        gained += points;
        for (&(r, c), value) in cells.iter().zip(slid) {
            next[r][c] = value;
        }
    }
    (next, gained)
}

/// True when no move can change the board
pub fn is_stuck(board: &Board) -> bool {
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = board[r][c];
            if v == 0 {
                return false;
            }
            if c + 1 < SIZE && board[r][c + 1] == v {
                return false;
            }
            if r + 1 < SIZE && board[r + 1][c] == v {
                return false;
            }
        }
    }
    true
}

/// 2048 world
#[derive(Debug, Clone)]
pub struct Twenty48 {
    pub board: Board,
    pub score: u32,
    pub status: Status,
    rng: GameRng,
    timers: Timers,
    tones: Vec<Tone>,
}

impl Twenty48 {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            board: [[0; SIZE]; SIZE],
            score: 0,
            status: Status::Running,
            rng: seeded(seed),
            timers: Timers::new(),
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    /// Drop a 2 (90%) or 4 (10%) on a random empty cell
    fn spawn_tile(&mut self) {
        let empty: Vec<(usize, usize)> = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.board[r][c] == 0)
            .collect();
        if empty.is_empty() {
            return;
        }
        let (r, c) = empty[self.rng.random_range(0..empty.len())];
        self.board[r][c] = if self.rng.random::<f32>() < 0.9 { 2 } else { 4 };
    }

    /// Apply a player move; returns false if nothing changed
    pub fn apply(&mut self, dir: Move) -> bool {
        let (next, gained) = slide_board(&self.board, dir);
        if next == self.board {
            return false;
        }
        self.board = next;
        self.score += gained;
        if gained > 0 {
            self.tones.extend(SoundCue::Score.tones());
        }
        self.spawn_tile();

        if self.board.iter().flatten().any(|&v| v >= WIN_TILE) {
            self.status = Status::Won;
            self.tones.extend(SoundCue::Win.tones());
            log::info!("2048 reached with score {}", self.score);
        } else if is_stuck(&self.board) {
            self.status = Status::Lost;
            self.tones.extend(SoundCue::GameOver.tones());
            log::info!("Board locked with score {}", self.score);
        }
        true
    }

    fn tile_color(value: u32) -> Color {
        match value {
            0 => Color::DARK_GREEN,
            2 | 4 => Color::LIGHT_GREY,
            8..=64 => Color::AMBER,
            _ => Color::GREEN,
        }
    }
}

impl Game for Twenty48 {
    fn kind(&self) -> GameKind {
        GameKind::Twenty48
    }

    fn restart(&mut self) {
        self.board = [[0; SIZE]; SIZE];
        self.score = 0;
        self.status = Status::Running;
        self.tones.clear();
        self.spawn_tile();
        self.spawn_tile();
    }

    fn step(&mut self, input: &InputState, _dt: f32) {
        if input.was_pressed(Key::R) {
            self.restart();
            return;
        }
        if self.status.is_over() {
            return;
        }
        for &key in input.pressed() {
            if let Some(dir) = Move::from_key(key) {
                self.apply(dir);
                if self.status.is_over() {
                    break;
                }
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        for (r, row) in self.board.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                let x = GAP + c as f32 * (TILE + GAP);
                let y = GAP + r as f32 * (TILE + GAP);
                surface.fill_rect(Rect::new(x, y, TILE, TILE), Self::tile_color(value));
                if value != 0 {
                    centered_text(
                        surface,
                        &value.to_string(),
                        x + TILE / 2.0,
                        y + TILE / 2.0 + 8.0,
                        24.0,
                        Color::BLACK,
                    );
                }
            }
        }
        let bottom = GAP + SIZE as f32 * (TILE + GAP);
        surface.text(
            &format!("Score: {}", self.score),
            Vec2::new(GAP, bottom + 4.0),
            16.0,
            Color::GREEN,
        );
        let banner = match self.status {
            Status::Won => Some("You win!"),
            Status::Lost => Some("Game Over! Press R"),
            _ => None,
        };
        if let Some(banner) = banner {
            centered_text(surface, banner, bottom / 2.0, bottom / 2.0, 28.0, Color::WHITE);
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
    use proptest::prelude::*;

    fn tiles(board: &Board) -> usize {
        board.iter().flatten().filter(|&&v| v != 0).count()
    }

    #[test]
    fn test_slide_line_merges_once() {
        assert_eq!(slide_line([2, 2, 4, 0]), ([4, 4, 0, 0], 4));
        assert_eq!(slide_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
        assert_eq!(slide_line([4, 0, 0, 4]), ([8, 0, 0, 0], 8));
        assert_eq!(slide_line([2, 4, 8, 16]), ([2, 4, 8, 16], 0));
        assert_eq!(slide_line([0, 0, 0, 2]), ([2, 0, 0, 0], 0));
    }

    #[test]
    fn test_slide_board_directions() {
        let board = [[2, 0, 0, 2], [0, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0]];
        let (right, gained) = slide_board(&board, Move::Right);
        assert_eq!(right[0], [0, 0, 0, 4]);
        assert_eq!(gained, 4);
        let (down, gained) = slide_board(&board, Move::Down);
        assert_eq!(down[3], [4, 0, 0, 2]);
        assert_eq!(gained, 4);
    }

    #[test]
    fn test_start_has_two_tiles() {
        let game = Twenty48::new(9);
        assert_eq!(tiles(&game.board), 2);
        assert!(game.board.iter().flatten().all(|&v| v == 0 || v == 2 || v == 4));
    }

    #[test]
    fn test_noop_move_spawns_nothing() {
        let mut game = Twenty48::new(1);
        game.board = [[2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]];
        assert!(!game.apply(Move::Left));
        assert_eq!(tiles(&game.board), 2);
        assert!(game.apply(Move::Right));
        assert_eq!(tiles(&game.board), 3);
    }

    #[test]
    fn test_stuck_board_loses() {
        let stuck = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        assert!(is_stuck(&stuck));
        let mut open = stuck;
        open[3][3] = 4;
        assert!(!is_stuck(&open));

        let mut game = Twenty48::new(2);
        // The spawned tile lands next to an 8 and a 32, whichever value it gets
        game.board = [[2, 4, 2, 4], [4, 2, 4, 2], [8, 4, 2, 4], [32, 8, 16, 0]];
        assert!(game.apply(Move::Right));
        assert_eq!(&game.board[3][1..], &[32, 8, 16]);
        assert_eq!(game.status, Status::Lost);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_reaching_2048_wins() {
        let mut game = Twenty48::new(3);
        game.board = [[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]];
        let mut input = InputState::new();
        input.key_down(Key::Left);
        game.step(&input, 0.016);
        assert_eq!(game.status, Status::Won);
        assert_eq!(game.board[0][0], 2048);

        let mut input = InputState::new();
        input.key_down(Key::R);
        game.step(&input, 0.016);
        assert_eq!(game.status, Status::Running);
        assert_eq!(game.score, 0);
    }

    fn arb_board() -> impl Strategy<Value = Board> {
        let cell = prop_oneof![Just(0u32), Just(2), Just(4), Just(8), Just(16)];
        proptest::array::uniform4(proptest::array::uniform4(cell))
    }

    proptest! {
        #[test]
        fn test_slide_preserves_sum(board in arb_board(), dir in 0usize..4) {
            let dir = [Move::Up, Move::Down, Move::Left, Move::Right][dir];
            let (next, _) = slide_board(&board, dir);
            let before: u32 = board.iter().flatten().sum();
            let after: u32 = next.iter().flatten().sum();
            prop_assert_eq!(before, after);
            prop_assert!(tiles(&next) <= tiles(&board));
        }

        #[test]
        fn test_gain_matches_merges(
            line in proptest::array::uniform4(prop_oneof![Just(0u32), Just(2), Just(4)]),
        ) {
            let (out, gained) = slide_line(line);
            // Every merge removes one tile and scores the merged value
            let tiles = |l: &[u32; 4]| l.iter().filter(|&&v| v != 0).count();
            let merges = tiles(&line) - tiles(&out);
            prop_assert_eq!(gained == 0, merges == 0);
            // Tiles are packed toward the front
            let first_gap = out.iter().position(|&v| v == 0).unwrap_or(SIZE);
            prop_assert!(out[first_gap..].iter().all(|&v| v == 0));
        }
    }
}
