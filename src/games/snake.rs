//! Snake
//!
//! Grid snake with obstacles. The snake moves one cell per 100 ms tick;
//! eating food grows it by one and reshuffles the obstacles. Walls, obstacles
//! and the snake's own body are fatal.

use glam::Vec2;

use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::settings::Settings;
use crate::sim::{GameRng, GridPos, Rect, Timers, place_on_grid, seeded};

/// Cell size in pixels
pub const CELL: f32 = 16.0;
pub const GRID: i32 = 25;
pub const SIZE: f32 = GRID as f32 * CELL;
pub const TICK: f32 = 0.1;
pub const NUM_OBSTACLES: usize = 5;
const START: GridPos = GridPos::new(10, 10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn from_key(key: Key) -> Option<Direction> {
        match key {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Snake world
#[derive(Debug, Clone)]
pub struct Snake {
    /// Head first
    pub body: Vec<GridPos>,
    pub direction: Direction,
    /// Direction of the last completed move; reversals are checked against it
    moved: Direction,
    pub food: GridPos,
    pub obstacles: Vec<GridPos>,
    pub score: u32,
    pub high_score: u64,
    pub status: Status,
    spawn_attempts: u32,
    rng: GameRng,
    timers: Timers,
    tones: Vec<Tone>,
}

impl Snake {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let mut game = Self {
            body: vec![START],
            direction: Direction::Right,
            moved: Direction::Right,
            food: START,
            obstacles: Vec::new(),
            score: 0,
            high_score: 0,
            status: Status::Ready,
            spawn_attempts: settings.spawn_attempts,
            rng: seeded(seed),
            timers: Timers::new(),
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    pub fn head(&self) -> GridPos {
        self.body[0]
    }

    fn place_food(&mut self) {
        let body = &self.body;
        let obstacles = &self.obstacles;
        let cell = place_on_grid(
            &mut self.rng,
            GRID,
            GRID,
            |c| body.contains(&c) || obstacles.contains(&c),
            self.spawn_attempts,
        );
        match cell {
            Some(cell) => self.food = cell,
            None => log::warn!("No free cell left for food"),
        }
    }

    fn place_obstacles(&mut self) {
        self.obstacles.clear();
        for _ in 0..NUM_OBSTACLES {
            let body = &self.body;
            let obstacles = &self.obstacles;
            let food = self.food;
            let cell = place_on_grid(
                &mut self.rng,
                GRID,
                GRID,
                |c| c == food || body.contains(&c) || obstacles.contains(&c),
                self.spawn_attempts,
            );
            let Some(cell) = cell else {
                log::warn!("Grid full, placed {} obstacles", self.obstacles.len());
                break;
            };
            self.obstacles.push(cell);
        }
    }

    fn steer(&mut self, input: &InputState) {
        for &key in input.pressed() {
            if let Some(dir) = Direction::from_key(key) {
                if dir != self.moved.opposite() {
                    self.direction = dir;
                }
            }
        }
    }

    fn advance(&mut self) {
        let (dx, dy) = self.direction.offset();
        let head = self.head();
        let next = GridPos::new(head.x + dx, head.y + dy);
        self.moved = self.direction;

        let outside = next.x < 0 || next.x >= GRID || next.y < 0 || next.y >= GRID;
        // The tail vacates its cell only after the check, as in the classic game
        let bites = self.body.iter().skip(1).any(|&c| c == next);
        if outside || bites || self.obstacles.contains(&next) {
            self.status = Status::Lost;
            self.high_score = self.high_score.max(u64::from(self.score));
            self.tones.extend(SoundCue::GameOver.tones());
            log::info!("Snake crashed with score {}", self.score);
            return;
        }

        self.body.insert(0, next);
        if next == self.food {
            self.score += 1;
            self.tones.extend(SoundCue::Score.tones());
            self.place_food();
            self.place_obstacles();
        } else {
            self.body.pop();
        }
    }

    fn cell_rect(cell: GridPos) -> Rect {
        Rect::new(cell.x as f32 * CELL, cell.y as f32 * CELL, CELL - 1.0, CELL - 1.0)
    }
}

impl Game for Snake {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn tick_interval(&self) -> f32 {
        TICK
    }

    fn restart(&mut self) {
        self.body = vec![START];
        self.direction = Direction::Right;
        self.moved = Direction::Right;
        self.score = 0;
        self.status = Status::Ready;
        self.timers = Timers::new();
        self.tones.clear();
        self.obstacles.clear();
        self.place_food();
        self.place_obstacles();
    }

    fn step(&mut self, input: &InputState, _dt: f32) {
        match self.status {
            Status::Ready => {
                if input.was_pressed(Key::Enter) {
                    self.status = Status::Running;
                }
            }
            Status::Running => {
                self.steer(input);
                self.advance();
            }
            _ => {
                if input.was_pressed(Key::R) || input.was_pressed(Key::Enter) {
                    self.restart();
                    self.status = Status::Running;
                }
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect(Self::cell_rect(self.food), Color::RED);
        for &obstacle in &self.obstacles {
            surface.fill_rect(Self::cell_rect(obstacle), Color::GREY);
        }
        for &segment in &self.body {
            surface.fill_rect(Self::cell_rect(segment), Color::GREEN);
        }
        surface.text(
            &format!("Score: {}  High Score: {}", self.score, self.high_score),
            Vec2::new(8.0, 16.0),
            14.0,
            Color::WHITE,
        );
        match self.status {
            Status::Ready => {
                centered_text(
                    surface,
                    "Press Enter to Start",
                    SIZE / 2.0,
                    SIZE / 2.0,
                    20.0,
                    Color::GREEN,
                );
                centered_text(
                    surface,
                    "Avoid obstacles and don't hit the walls!",
                    SIZE / 2.0,
                    SIZE / 2.0 + 24.0,
                    12.0,
                    Color::GREEN,
                );
            }
            Status::Lost => {
                centered_text(surface, "Game Over!", SIZE / 2.0, SIZE / 2.0, 24.0, Color::GREEN);
                centered_text(
                    surface,
                    &format!("Final Score: {} - press R", self.score),
                    SIZE / 2.0,
                    SIZE / 2.0 + 24.0,
                    14.0,
                    Color::GREEN,
                );
            }
            _ => {}
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

    fn set_high_score(&mut self, best: u64) {
        self.high_score = best;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> Snake {
        let mut game = Snake::new(1, &Settings::default());
        // Keep the row ahead clear for deterministic tests
        game.obstacles.clear();
        game.food = GridPos::new(0, 0);
        let mut input = InputState::new();
        input.key_down(Key::Enter);
        game.step(&input, TICK);
        game
    }

    fn press(key: Key) -> InputState {
        let mut input = InputState::new();
        input.key_down(key);
        input
    }

    #[test]
    fn test_waits_for_enter() {
        let mut game = Snake::new(1, &Settings::default());
        game.step(&InputState::new(), TICK);
        game.step(&press(Key::Up), TICK);
        assert_eq!(game.status, Status::Ready);
        assert_eq!(game.body, vec![START]);
        game.step(&press(Key::Enter), TICK);
        assert_eq!(game.status, Status::Running);
    }

    #[test]
    fn test_layout_never_overlaps() {
        for seed in 0..30 {
            let game = Snake::new(seed, &Settings::default());
            assert_eq!(game.obstacles.len(), NUM_OBSTACLES);
            assert!(!game.obstacles.contains(&game.food));
            assert!(!game.obstacles.contains(&START));
            assert_ne!(game.food, START);
            for (i, a) in game.obstacles.iter().enumerate() {
                assert!(!game.obstacles[i + 1..].contains(a));
            }
        }
    }

    #[test]
    fn test_moves_one_cell_per_tick() {
        let mut game = running();
        game.step(&InputState::new(), TICK);
        assert_eq!(game.head(), GridPos::new(11, 10));
        assert_eq!(game.body.len(), 1);
        game.step(&press(Key::Down), TICK);
        assert_eq!(game.head(), GridPos::new(11, 11));
    }

    #[test]
    fn test_reversal_ignored() {
        let mut game = running();
        game.step(&press(Key::Left), TICK);
        assert_eq!(game.head(), GridPos::new(11, 10));

        // Up then Left within one tick: Left is still a reversal of the last move
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.key_down(Key::Left);
        game.step(&input, TICK);
        assert_eq!(game.head(), GridPos::new(11, 9));
        assert_eq!(game.direction, Direction::Up);
    }

    #[test]
    fn test_food_grows_and_reshuffles() {
        let mut game = running();
        game.food = GridPos::new(11, 10);
        game.step(&InputState::new(), TICK);
        assert_eq!(game.score, 1);
        assert_eq!(game.body, vec![GridPos::new(11, 10), GridPos::new(10, 10)]);
        assert_eq!(game.obstacles.len(), NUM_OBSTACLES);
        assert!(!game.body.contains(&game.food));
        assert!(game.obstacles.iter().all(|o| !game.body.contains(o)));
    }

    #[test]
    fn test_wall_is_fatal() {
        let mut game = running();
        for _ in 0..GRID {
            game.step(&InputState::new(), TICK);
        }
        assert_eq!(game.status, Status::Lost);
        assert_eq!(game.head(), GridPos::new(GRID - 1, 10));
    }

    #[test]
    fn test_obstacle_is_fatal_and_restart() {
        let mut game = running();
        game.score = 3;
        game.obstacles = vec![GridPos::new(11, 10)];
        game.step(&InputState::new(), TICK);
        assert_eq!(game.status, Status::Lost);
        assert_eq!(game.high_score, 3);

        game.step(&press(Key::R), TICK);
        assert_eq!(game.status, Status::Running);
        assert_eq!(game.score, 0);
        assert_eq!(game.body, vec![START]);
    }

    #[test]
    fn test_self_bite_is_fatal() {
        let mut game = running();
        game.body = vec![
            GridPos::new(5, 5),
            GridPos::new(4, 5),
            GridPos::new(4, 6),
            GridPos::new(5, 6),
            GridPos::new(6, 6),
        ];
        game.moved = Direction::Right;
        game.step(&press(Key::Down), TICK);
        assert_eq!(game.status, Status::Lost);
    }
}
