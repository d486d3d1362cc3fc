//! Dino runner
//!
//! The dino jumps over obstacles scrolling in from the right. Score ticks up
//! every 100 ms and the scroll speed grows by one for every 100 points.
//! Touching an obstacle ends the run.

use glam::Vec2;

use crate::audio::{SoundCue, Tone};
use crate::driver::{Game, Status};
use crate::dt_factor;
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::sim::{Rect, TimerId, Timers, aabb_overlap};

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 200.0;

const DINO_X: f32 = 50.0;
const DINO_SIZE: Vec2 = Vec2::new(40.0, 60.0);
/// Resting y of the dino's top edge
pub const DINO_GROUND_Y: f32 = 150.0;
const GRAVITY: f32 = 0.5;
const JUMP_VELOCITY: f32 = -10.0;

const GROUND_Y: f32 = 180.0;
const GROUND_HEIGHT: f32 = 20.0;

const OBSTACLE_SIZE: f32 = 30.0;
const OBSTACLE_INTERVAL: f32 = 2.0;
const SCORE_INTERVAL: f32 = 0.1;
const BASE_SPEED: f32 = 3.0;

/// Dino world
#[derive(Debug, Clone)]
pub struct Dino {
    pub dino_y: f32,
    pub dino_vy: f32,
    pub airborne: bool,
    pub obstacles: Vec<Rect>,
    pub score: u32,
    pub status: Status,
    /// Animation frame counter (leg flicker)
    frame: u32,
    timers: Timers,
    score_timer: Option<TimerId>,
    obstacle_timer: Option<TimerId>,
    tones: Vec<Tone>,
}

impl Dino {
    pub fn new() -> Self {
        let mut game = Self {
            dino_y: DINO_GROUND_Y,
            dino_vy: 0.0,
            airborne: false,
            obstacles: Vec::new(),
            score: 0,
            status: Status::Running,
            frame: 0,
            timers: Timers::new(),
            score_timer: None,
            obstacle_timer: None,
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    pub fn dino_rect(&self) -> Rect {
        Rect::from_pos_size(Vec2::new(DINO_X, self.dino_y), DINO_SIZE)
    }

    /// Scroll speed in pixels per reference frame
    pub fn speed(&self) -> f32 {
        BASE_SPEED + (self.score / 100) as f32
    }

    fn spawn_obstacle(&mut self) {
        self.obstacles.push(Rect::new(
            WIDTH,
            GROUND_Y - OBSTACLE_SIZE,
            OBSTACLE_SIZE,
            OBSTACLE_SIZE,
        ));
    }

    fn run_timers(&mut self, dt: f32) {
        for id in self.timers.advance(dt) {
            if Some(id) == self.score_timer {
                self.score += 1;
            } else if Some(id) == self.obstacle_timer {
                self.spawn_obstacle();
            }
        }
    }

    fn jump(&mut self, input: &InputState) {
        let pressed = input.was_pressed(Key::Space)
            || input.was_pressed(Key::Up)
            || input.was_pressed(Key::W);
        if pressed && !self.airborne {
            self.dino_vy = JUMP_VELOCITY;
            self.airborne = true;
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        if !self.airborne {
            return;
        }
        let f = dt_factor(dt);
        self.dino_y += self.dino_vy * f;
        self.dino_vy += GRAVITY * f;
        if self.dino_y > DINO_GROUND_Y {
            self.dino_y = DINO_GROUND_Y;
            self.dino_vy = 0.0;
            self.airborne = false;
        }
    }

    fn scroll(&mut self, dt: f32) {
        let dx = self.speed() * dt_factor(dt);
        for obstacle in &mut self.obstacles {
            obstacle.x -= dx;
        }
        self.obstacles.retain(|o| o.right() > 0.0);
    }

    fn check_collision(&mut self) {
        let dino = self.dino_rect();
        if self.obstacles.iter().any(|o| aabb_overlap(&dino, o)) {
            self.status = Status::Lost;
            self.timers.cancel_all();
            self.score_timer = None;
            self.obstacle_timer = None;
            self.tones.extend(SoundCue::GameOver.tones());
            log::info!("Dino crashed at score {}", self.score);
        }
    }
}

impl Default for Dino {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Dino {
    fn kind(&self) -> GameKind {
        GameKind::Dino
    }

    fn restart(&mut self) {
        self.dino_y = DINO_GROUND_Y;
        self.dino_vy = 0.0;
        self.airborne = false;
        self.obstacles.clear();
        self.score = 0;
        self.status = Status::Running;
        self.frame = 0;
        self.tones.clear();
        self.timers = Timers::new();
        self.score_timer = Some(self.timers.every(SCORE_INTERVAL));
        self.obstacle_timer = Some(self.timers.every(OBSTACLE_INTERVAL));
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        if self.status.is_over() {
            if input.was_pressed(Key::R) || input.was_pressed(Key::Space) {
                self.restart();
            }
            return;
        }
        self.frame = self.frame.wrapping_add(1);
        self.run_timers(dt);
        self.jump(input);
        self.apply_gravity(dt);
        self.scroll(dt);
        self.check_collision();
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect(Rect::new(0.0, GROUND_Y, WIDTH, GROUND_HEIGHT), Color::LIGHT_GREY);
        let dino = self.dino_rect();
        surface.fill_rect(dino, Color::GREEN);
        // Legs alternate while running
        if !self.airborne && self.status == Status::Running {
            let leg_x = if (self.frame / 6) % 2 == 0 { dino.x + 6.0 } else { dino.x + 24.0 };
            surface.fill_rect(Rect::new(leg_x, dino.bottom() - 8.0, 10.0, 8.0), Color::BLACK);
        }
        for obstacle in &self.obstacles {
            surface.fill_rect(*obstacle, Color::RED);
        }
        surface.text(
            &format!("Score: {}", self.score),
            Vec2::new(WIDTH - 140.0, 24.0),
            16.0,
            Color::GREEN,
        );
        if self.status == Status::Lost {
            centered_text(
                surface,
                "GAME OVER - press R",
                WIDTH / 2.0,
                HEIGHT / 2.0,
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
    use crate::consts::REFERENCE_DT;

    fn press(key: Key) -> InputState {
        let mut input = InputState::new();
        input.key_down(key);
        input
    }

    #[test]
    fn test_jump_arc_returns_to_ground() {
        let mut game = Dino::new();
        game.step(&press(Key::Space), REFERENCE_DT);
        assert!(game.airborne);
        assert!(game.dino_y < DINO_GROUND_Y);

        let idle = InputState::new();
        let mut peak = DINO_GROUND_Y;
        for _ in 0..60 {
            game.step(&idle, REFERENCE_DT);
            peak = peak.min(game.dino_y);
        }
        assert!(!game.airborne);
        assert_eq!(game.dino_y, DINO_GROUND_Y);
        // v0 = 10, g = 0.5: roughly 100 px of lift
        assert!(DINO_GROUND_Y - peak > 90.0);
    }

    #[test]
    fn test_no_double_jump() {
        let mut game = Dino::new();
        game.step(&press(Key::Space), REFERENCE_DT);
        let vy = game.dino_vy;
        game.step(&press(Key::Up), REFERENCE_DT);
        assert!(game.dino_vy > vy);
    }

    #[test]
    fn test_score_and_obstacle_timers() {
        let mut game = Dino::new();
        let idle = InputState::new();
        // 1.0 s of 10 ms steps
        for _ in 0..100 {
            game.step(&idle, 0.01);
        }
        assert!((9..=10).contains(&game.score));
        assert!(game.obstacles.is_empty());
        for _ in 0..110 {
            game.step(&idle, 0.01);
        }
        assert_eq!(game.obstacles.len(), 1);
    }

    #[test]
    fn test_speed_grows_per_hundred_points() {
        let mut game = Dino::new();
        assert_eq!(game.speed(), 3.0);
        game.score = 250;
        assert_eq!(game.speed(), 5.0);
    }

    #[test]
    fn test_obstacle_collision_ends_run() {
        let mut game = Dino::new();
        game.obstacles.push(Rect::new(
            DINO_X + 10.0,
            GROUND_Y - OBSTACLE_SIZE,
            OBSTACLE_SIZE,
            OBSTACLE_SIZE,
        ));
        game.step(&InputState::new(), REFERENCE_DT);
        assert_eq!(game.status, Status::Lost);
        assert!(game.timers_mut().is_empty());

        let score = game.score;
        game.step(&InputState::new(), 1.0);
        assert_eq!(game.score, score);

        game.step(&press(Key::R), REFERENCE_DT);
        assert_eq!(game.status, Status::Running);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_jump_clears_obstacle() {
        let mut game = Dino::new();
        // Reaches the dino on the 9th step, leaves it after the 31st
        game.obstacles.push(Rect::new(
            DINO_X + 65.0,
            GROUND_Y - OBSTACLE_SIZE,
            OBSTACLE_SIZE,
            OBSTACLE_SIZE,
        ));
        game.step(&press(Key::Space), REFERENCE_DT);
        let idle = InputState::new();
        for _ in 0..40 {
            game.step(&idle, REFERENCE_DT);
        }
        assert_eq!(game.status, Status::Running);
    }
}
