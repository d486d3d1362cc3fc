//! Breakout
//!
//! A 3×5 brick wall, one ball, a paddle driven by the pointer or the arrow
//! keys. Missing the ball resets ball and paddle but keeps the score; clearing
//! the wall wins.

use glam::Vec2;

use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::sim::{Rect, Timers, circle_rect_overlap, reflect_circle_in_bounds};
use crate::{dt_factor, integrate};

pub const WIDTH: f32 = 480.0;
pub const HEIGHT: f32 = 360.0;

pub const BALL_RADIUS: f32 = 10.0;
const BALL_SPEED: Vec2 = Vec2::new(2.0, -2.0);

pub const PADDLE_WIDTH: f32 = 75.0;
pub const PADDLE_HEIGHT: f32 = 10.0;
const PADDLE_SPEED: f32 = 7.0;

pub const BRICK_ROWS: usize = 3;
pub const BRICK_COLS: usize = 5;
const BRICK_WIDTH: f32 = 75.0;
const BRICK_HEIGHT: f32 = 20.0;
const BRICK_PADDING: f32 = 10.0;
const BRICK_OFFSET_TOP: f32 = 30.0;
const BRICK_OFFSET_LEFT: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brick {
    pub rect: Rect,
    pub alive: bool,
}

/// Breakout world
#[derive(Debug, Clone)]
pub struct Breakout {
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub paddle_x: f32,
    pub bricks: Vec<Brick>,
    pub score: u32,
    pub misses: u32,
    pub status: Status,
    /// Times the win was signalled this session
    win_signals: u32,
    last_pointer: Option<Vec2>,
    timers: Timers,
    tones: Vec<Tone>,
}

impl Breakout {
    pub fn new() -> Self {
        let mut game = Self {
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            paddle_x: 0.0,
            bricks: Vec::new(),
            score: 0,
            misses: 0,
            status: Status::Running,
            win_signals: 0,
            last_pointer: None,
            timers: Timers::new(),
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    fn build_wall() -> Vec<Brick> {
        let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
        for col in 0..BRICK_COLS {
            for row in 0..BRICK_ROWS {
                let x = col as f32 * (BRICK_WIDTH + BRICK_PADDING) + BRICK_OFFSET_LEFT;
                let y = row as f32 * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_OFFSET_TOP;
                bricks.push(Brick {
                    rect: Rect::new(x, y, BRICK_WIDTH, BRICK_HEIGHT),
                    alive: true,
                });
            }
        }
        bricks
    }

    /// Serve position; score is untouched
    fn reset_ball(&mut self) {
        self.ball_pos = Vec2::new(WIDTH / 2.0, HEIGHT - 30.0);
        self.ball_vel = BALL_SPEED;
        self.paddle_x = (WIDTH - PADDLE_WIDTH) / 2.0;
    }

    pub fn paddle_rect(&self) -> Rect {
        Rect::new(self.paddle_x, HEIGHT - PADDLE_HEIGHT, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    pub fn win_signals(&self) -> u32 {
        self.win_signals
    }

    fn move_paddle(&mut self, input: &InputState, dt: f32) {
        // Pointer only drives the paddle when it actually moved
        if let Some(pointer) = input.pointer() {
            if self.last_pointer != Some(pointer) && pointer.x > 0.0 && pointer.x < WIDTH {
                self.paddle_x = pointer.x - PADDLE_WIDTH / 2.0;
            }
            self.last_pointer = Some(pointer);
        }

        let mut dir = 0.0;
        if input.is_held(Key::Right) || input.is_held(Key::D) {
            dir += 1.0;
        }
        if input.is_held(Key::Left) || input.is_held(Key::A) {
            dir -= 1.0;
        }
        self.paddle_x += dir * PADDLE_SPEED * dt_factor(dt);
        self.paddle_x = self.paddle_x.clamp(0.0, WIDTH - PADDLE_WIDTH);
    }

    /// Side and top walls reflect; the bottom is open
    fn bounce_walls(&mut self) {
        let hits = reflect_circle_in_bounds(
            &mut self.ball_pos,
            &mut self.ball_vel,
            BALL_RADIUS,
            Vec2::new(WIDTH, f32::INFINITY),
            1.0,
        );
        if hits.any() {
            self.tones.extend(SoundCue::Bounce.tones());
        }
    }

    fn resolve_paddle(&mut self) {
        let paddle = self.paddle_rect();
        if self.ball_vel.y > 0.0 && circle_rect_overlap(self.ball_pos, BALL_RADIUS, &paddle) {
            self.ball_pos.y = paddle.y - BALL_RADIUS;
            self.ball_vel.y = -self.ball_vel.y.abs();
            self.tones.extend(SoundCue::Bounce.tones());
        } else if self.ball_pos.y > HEIGHT - BALL_RADIUS {
            self.misses += 1;
            log::debug!("Ball missed ({} so far), serving again", self.misses);
            self.reset_ball();
        }
    }

    fn resolve_bricks(&mut self) {
        // At most one brick per tick
        let hit = self
            .bricks
            .iter_mut()
            .find(|b| b.alive && circle_rect_overlap(self.ball_pos, BALL_RADIUS, &b.rect));
        if let Some(brick) = hit {
            brick.alive = false;
            self.ball_vel.y = -self.ball_vel.y;
            self.score += 1;
            self.tones.extend(SoundCue::Hit.tones());
        }

        if self.bricks_left() == 0 && self.status == Status::Running {
            self.status = Status::Won;
            self.win_signals += 1;
            self.tones.extend(SoundCue::Win.tones());
            log::info!("Breakout cleared with score {}", self.score);
        }
    }
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Breakout {
    fn kind(&self) -> GameKind {
        GameKind::Breakout
    }

    fn restart(&mut self) {
        self.bricks = Self::build_wall();
        self.score = 0;
        self.misses = 0;
        self.status = Status::Running;
        self.win_signals = 0;
        self.last_pointer = None;
        self.timers = Timers::new();
        self.tones.clear();
        self.reset_ball();
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        if self.status.is_over() {
            if input.was_pressed(Key::R) || input.was_pressed(Key::Space) {
                self.restart();
            }
            return;
        }
        self.move_paddle(input, dt);
        self.ball_pos = integrate(self.ball_pos, self.ball_vel, dt);

        self.bounce_walls();
        self.resolve_paddle();
        self.resolve_bricks();
    }

    fn render(&self, surface: &mut dyn Surface) {
        for brick in self.bricks.iter().filter(|b| b.alive) {
            surface.fill_rect(brick.rect, Color::GREEN);
        }
        surface.fill_rect(self.paddle_rect(), Color::GREEN);
        surface.fill_circle(self.ball_pos, BALL_RADIUS, Color::GREEN);
        surface.text(
            &format!("Score: {}", self.score),
            Vec2::new(8.0, 20.0),
            16.0,
            Color::GREEN,
        );
        if self.status == Status::Won {
            centered_text(
                surface,
                "YOU WIN, CONGRATULATIONS!",
                WIDTH / 2.0,
                HEIGHT / 2.0 + 40.0,
                20.0,
                Color::GREEN,
            );
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
    use crate::consts::FRAME_DT;
    use crate::renderer::{DrawCommand, DrawList};

    #[test]
    fn test_wall_layout() {
        let game = Breakout::new();
        assert_eq!(game.bricks.len(), BRICK_ROWS * BRICK_COLS);
        // Column-major: first brick top-left, second directly below it
        assert_eq!(game.bricks[0].rect, Rect::new(30.0, 30.0, 75.0, 20.0));
        assert_eq!(game.bricks[1].rect, Rect::new(30.0, 60.0, 75.0, 20.0));
        assert!(game.bricks.iter().all(|b| b.rect.right() <= WIDTH));
    }

    #[test]
    fn test_brick_hit_scores_and_flips() {
        let mut game = Breakout::new();
        let target = game.bricks[0].rect;
        game.ball_pos = Vec2::new(target.center().x, target.bottom() + BALL_RADIUS - 1.0);
        game.ball_vel = Vec2::new(0.0, -0.5);
        game.step(&InputState::new(), FRAME_DT);
        assert!(!game.bricks[0].alive);
        assert_eq!(game.score, 1);
        assert!(game.ball_vel.y > 0.0);
    }

    #[test]
    fn test_win_signalled_exactly_once() {
        let mut game = Breakout::new();
        for brick in game.bricks.iter_mut().skip(1) {
            brick.alive = false;
        }
        let last = game.bricks[0].rect;
        game.ball_pos = last.center();
        game.ball_vel = Vec2::ZERO;
        let input = InputState::new();
        for _ in 0..20 {
            game.step(&input, FRAME_DT);
        }
        assert_eq!(game.status, Status::Won);
        assert_eq!(game.win_signals(), 1);

        let mut list = DrawList::new(WIDTH, HEIGHT);
        game.render(&mut list);
        assert!(list.texts().contains(&"YOU WIN, CONGRATULATIONS!"));
        // Destroyed bricks leave the render set
        let rects = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect(..)))
            .count();
        assert_eq!(rects, 1);
    }

    #[test]
    fn test_miss_resets_ball_keeps_score() {
        let mut game = Breakout::new();
        game.score = 4;
        game.paddle_x = 0.0;
        game.ball_pos = Vec2::new(WIDTH - 20.0, HEIGHT - 5.0);
        game.ball_vel = Vec2::new(0.0, 2.0);
        game.step(&InputState::new(), FRAME_DT);
        assert_eq!(game.misses, 1);
        assert_eq!(game.score, 4);
        assert_eq!(game.ball_pos, Vec2::new(WIDTH / 2.0, HEIGHT - 30.0));
        assert_eq!(game.status, Status::Running);
    }

    #[test]
    fn test_paddle_bounce() {
        let mut game = Breakout::new();
        game.ball_pos = Vec2::new(
            game.paddle_rect().center().x,
            HEIGHT - PADDLE_HEIGHT - BALL_RADIUS + 1.0,
        );
        game.ball_vel = Vec2::new(0.0, 1.0);
        game.step(&InputState::new(), FRAME_DT);
        assert!(game.ball_vel.y < 0.0);
        assert_eq!(game.misses, 0);
    }

    #[test]
    fn test_paddle_follows_pointer_and_clamps() {
        let mut game = Breakout::new();
        let mut input = InputState::new();
        input.pointer_move(Vec2::new(100.0, 200.0));
        game.step(&input, FRAME_DT);
        assert!((game.paddle_x - (100.0 - PADDLE_WIDTH / 2.0)).abs() < 1e-4);

        // Keys move it afterwards even though the pointer is still known
        input.key_down(Key::Left);
        for _ in 0..100 {
            game.step(&input, FRAME_DT);
        }
        assert_eq!(game.paddle_x, 0.0);
    }
}
