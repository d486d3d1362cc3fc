//! Two-player Pong
//!
//! Left paddle on W/S, right paddle on Up/Down. A ball leaving the left or
//! right edge scores for the opposite side; first to [`WINNING_SCORE`] wins.

use glam::Vec2;
use rand::Rng;

use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::{centered_text, dashed_vline};
use crate::renderer::{Color, Surface};
use crate::sim::{GameRng, Rect, Timers, circle_rect_overlap, reflect_circle_in_bounds, seeded};
use crate::{dt_factor, integrate};

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 600.0;

pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
const LEFT_PADDLE_X: f32 = 50.0;
const RIGHT_PADDLE_X: f32 = 740.0;
const PADDLE_SPEED: f32 = 6.0;

pub const BALL_RADIUS: f32 = 10.0;
const BALL_SPEED: f32 = 5.0;

pub const WINNING_SCORE: u32 = 5;

/// Which player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "Player 1",
            Side::Right => "Player 2",
        }
    }
}

/// Pong world
#[derive(Debug, Clone)]
pub struct Pong {
    pub left_y: f32,
    pub right_y: f32,
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub left_score: u32,
    pub right_score: u32,
    pub winner: Option<Side>,
    rng: GameRng,
    timers: Timers,
    tones: Vec<Tone>,
}

impl Pong {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            left_y: 0.0,
            right_y: 0.0,
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            left_score: 0,
            right_score: 0,
            winner: None,
            rng: seeded(seed),
            timers: Timers::new(),
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    pub fn left_paddle(&self) -> Rect {
        Rect::new(LEFT_PADDLE_X, self.left_y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    pub fn right_paddle(&self) -> Rect {
        Rect::new(RIGHT_PADDLE_X, self.right_y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    /// Center serve in a random diagonal direction
    fn serve(&mut self) {
        let sx = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let sy = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball_pos = Vec2::new(WIDTH / 2.0, HEIGHT / 2.0);
        self.ball_vel = Vec2::new(BALL_SPEED * sx, BALL_SPEED * sy);
    }

    fn move_paddles(&mut self, input: &InputState, dt: f32) {
        let step = PADDLE_SPEED * dt_factor(dt);
        let axis = |up: Key, down: Key| -> f32 {
            let mut dir = 0.0;
            if input.is_held(up) {
                dir -= 1.0;
            }
            if input.is_held(down) {
                dir += 1.0;
            }
            dir
        };
        let max_y = HEIGHT - PADDLE_HEIGHT;
        self.left_y = (self.left_y + axis(Key::W, Key::S) * step).clamp(0.0, max_y);
        self.right_y = (self.right_y + axis(Key::Up, Key::Down) * step).clamp(0.0, max_y);
    }

    fn point_for(&mut self, side: Side) {
        let score = match side {
            Side::Left => &mut self.left_score,
            Side::Right => &mut self.right_score,
        };
        *score += 1;
        let total = *score;
        self.tones.extend(SoundCue::Score.tones());
        if total >= WINNING_SCORE {
            self.winner = Some(side);
            self.tones.extend(SoundCue::Win.tones());
            log::info!("{} wins {}-{}", side.label(), self.left_score, self.right_score);
        } else {
            self.serve();
        }
    }
}

impl Game for Pong {
    fn kind(&self) -> GameKind {
        GameKind::Pong
    }

    fn restart(&mut self) {
        self.left_y = 200.0;
        self.right_y = 200.0;
        self.left_score = 0;
        self.right_score = 0;
        self.winner = None;
        self.timers = Timers::new();
        self.tones.clear();
        self.serve();
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        if self.winner.is_some() {
            if input.was_pressed(Key::R) || input.was_pressed(Key::Space) {
                self.restart();
            }
            return;
        }
        self.move_paddles(input, dt);
        self.ball_pos = integrate(self.ball_pos, self.ball_vel, dt);

        // Top/bottom walls reflect; the side edges are open
        let (mut pos, mut vel) = (self.ball_pos, self.ball_vel);
        let hits = reflect_circle_in_bounds(
            &mut pos,
            &mut vel,
            BALL_RADIUS,
            Vec2::new(f32::INFINITY, HEIGHT),
            1.0,
        );
        self.ball_pos.y = pos.y;
        self.ball_vel.y = vel.y;
        if hits.top || hits.bottom {
            self.tones.extend(SoundCue::Bounce.tones());
        }

        if self.ball_vel.x < 0.0
            && circle_rect_overlap(self.ball_pos, BALL_RADIUS, &self.left_paddle())
        {
            self.ball_vel.x = self.ball_vel.x.abs();
            self.tones.extend(SoundCue::Bounce.tones());
        } else if self.ball_vel.x > 0.0
            && circle_rect_overlap(self.ball_pos, BALL_RADIUS, &self.right_paddle())
        {
            self.ball_vel.x = -self.ball_vel.x.abs();
            self.tones.extend(SoundCue::Bounce.tones());
        }

        if self.ball_pos.x <= 0.0 {
            self.point_for(Side::Right);
        } else if self.ball_pos.x >= WIDTH {
            self.point_for(Side::Left);
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        dashed_vline(surface, WIDTH / 2.0, HEIGHT, 10.0, Color::GREEN);
        surface.fill_rect(self.left_paddle(), Color::GREEN);
        surface.fill_rect(self.right_paddle(), Color::GREEN);
        surface.fill_circle(self.ball_pos, BALL_RADIUS, Color::GREEN);
        surface.text(&self.left_score.to_string(), Vec2::new(300.0, 50.0), 30.0, Color::GREEN);
        surface.text(&self.right_score.to_string(), Vec2::new(500.0, 50.0), 30.0, Color::GREEN);
        if let Some(winner) = self.winner {
            centered_text(
                surface,
                &format!("{} Wins!", winner.label()),
                WIDTH / 2.0,
                HEIGHT / 2.0,
                30.0,
                Color::GREEN,
            );
            centered_text(
                surface,
                "Press R to play again",
                WIDTH / 2.0,
                HEIGHT / 2.0 + 40.0,
                16.0,
                Color::GREEN,
            );
        }
    }

    fn status(&self) -> Status {
        if self.winner.is_some() {
            Status::Finished
        } else {
            Status::Running
        }
    }

    /// Winning side's points
    fn score(&self) -> i64 {
        i64::from(self.left_score.max(self.right_score))
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

    #[test]
    fn test_serve_is_diagonal_at_center() {
        let game = Pong::new(9);
        assert_eq!(game.ball_pos, Vec2::new(400.0, 300.0));
        assert_eq!(game.ball_vel.x.abs(), 5.0);
        assert_eq!(game.ball_vel.y.abs(), 5.0);
    }

    #[test]
    fn test_paddles_move_and_clamp() {
        let mut game = Pong::new(1);
        let mut input = InputState::new();
        input.key_down(Key::W);
        input.key_down(Key::Down);
        for _ in 0..200 {
            game.step(&input, FRAME_DT);
            if game.winner.is_some() {
                break;
            }
        }
        assert_eq!(game.left_y, 0.0);
        assert_eq!(game.right_y, HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_left_paddle_returns_ball() {
        let mut game = Pong::new(1);
        game.left_y = 250.0;
        game.ball_pos = Vec2::new(LEFT_PADDLE_X + PADDLE_WIDTH + BALL_RADIUS + 2.0, 300.0);
        game.ball_vel = Vec2::new(-5.0, 0.0);
        game.step(&InputState::new(), FRAME_DT);
        assert!(game.ball_vel.x > 0.0);
    }

    #[test]
    fn test_exit_scores_for_opponent_and_first_to_five_wins() {
        let mut game = Pong::new(5);
        let input = InputState::new();
        for point in 1..=WINNING_SCORE {
            game.left_y = 0.0;
            game.ball_pos = Vec2::new(2.0, 500.0);
            game.ball_vel = Vec2::new(-5.0, 0.0);
            game.step(&input, FRAME_DT);
            assert_eq!(game.right_score, point);
        }
        assert_eq!(game.winner, Some(Side::Right));
        assert_eq!(game.status(), Status::Finished);
        assert_eq!(game.score(), 5);

        // Frozen until restarted
        game.step(&input, FRAME_DT);
        assert_eq!(game.right_score, 5);
    }

    #[test]
    fn test_ball_stays_between_walls() {
        let mut game = Pong::new(3);
        let input = InputState::new();
        for _ in 0..2000 {
            game.step(&input, FRAME_DT);
            assert!(game.ball_pos.y >= BALL_RADIUS && game.ball_pos.y <= HEIGHT - BALL_RADIUS);
        }
    }
}
