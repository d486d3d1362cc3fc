//! Ball Avoidance
//!
//! Balls spawn away from the pointer, sit still for a second, then wander
//! with random jitter and a slight pull toward the pointer. A moving ball
//! touching the pointer ends the run; the score is the seconds survived.
//! Every 5 s balls get faster and spawn more often, up to configured limits.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::audio::{SoundCue, Tone};
use crate::consts::{AVOID_RADIUS, DIFFICULTY_INTERVAL, SPAWN_GROWTH, SPEED_GROWTH};
use crate::driver::{Game, Status};
use crate::dt_factor;
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::settings::Settings;
use crate::sim::{
    Difficulty, GameRng, TimerId, Timers, place_away_from, point_in_circle, reflect_in_bounds,
    seeded,
};

pub const WIDTH: f32 = 600.0;
pub const HEIGHT: f32 = 400.0;

pub const BALL_SIZE: f32 = 20.0;
const BALL_RADIUS: f32 = BALL_SIZE / 2.0;
/// Ball radius plus a small buffer
pub const COLLISION_RADIUS: f32 = BALL_RADIUS + 8.0;
/// Seconds a fresh ball stays still
pub const WAKE_DELAY: f32 = 1.0;
const INITIAL_SPAWN_INTERVAL: f32 = 3.0;

const DAMPING: f32 = 0.97;
const RANDOM_FORCE: f32 = 0.5;
const ATTRACTION: f32 = 0.15 * 0.3;
const MAX_SPEED: f32 = 10.0;
const WALL_RESTITUTION: f32 = 0.8;
/// Share of the spawn heading taken from the direction to the pointer
const CURSOR_BIAS: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallState {
    Stationary,
    Moving,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvoidBall {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: BallState,
    wake: Option<TimerId>,
}

impl AvoidBall {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(BALL_RADIUS)
    }

    fn touches(&self, pointer: Option<Vec2>) -> bool {
        match pointer {
            Some(p) => self.state == BallState::Moving && point_in_circle(
                p,
                self.center(),
                COLLISION_RADIUS,
            ),
            None => false,
        }
    }
}

/// Ball Avoidance world
#[derive(Debug, Clone)]
pub struct BallAvoidance {
    pub balls: Vec<AvoidBall>,
    pub status: Status,
    /// Seconds survived
    pub elapsed: f32,
    pub speed: Difficulty,
    pub spawn_interval: Difficulty,
    spawn_attempts: u32,
    rng: GameRng,
    timers: Timers,
    spawn_timer: Option<TimerId>,
    difficulty_timer: Option<TimerId>,
    tones: Vec<Tone>,
}

impl BallAvoidance {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            balls: Vec::new(),
            status: Status::Ready,
            elapsed: 0.0,
            speed: Difficulty::new(1.0, SPEED_GROWTH).with_limit(settings.max_speed_multiplier),
            spawn_interval: Difficulty::new(INITIAL_SPAWN_INTERVAL, SPAWN_GROWTH)
                .with_limit(settings.min_spawn_interval),
            spawn_attempts: settings.spawn_attempts,
            rng: seeded(seed),
            timers: Timers::new(),
            spawn_timer: None,
            difficulty_timer: None,
            tones: Vec::new(),
        }
    }

    fn area() -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    /// Seconds survived, whole
    pub fn survived(&self) -> u32 {
        self.elapsed.floor() as u32
    }

    fn begin(&mut self, pointer: Option<Vec2>) {
        self.status = Status::Running;
        self.spawn_timer = Some(self.timers.every(self.spawn_interval.value()));
        self.difficulty_timer = Some(self.timers.every(DIFFICULTY_INTERVAL));
        self.spawn_ball(pointer);
        log::info!("Ball Avoidance started");
    }

    pub fn spawn_ball(&mut self, pointer: Option<Vec2>) {
        let offset = Vec2::splat(BALL_RADIUS);
        let placed = place_away_from(
            &mut self.rng,
            Self::area() - Vec2::splat(BALL_SIZE),
            pointer.map(|p| p - offset),
            AVOID_RADIUS,
            self.spawn_attempts,
        );
        let pos = placed.pos;

        let base_speed = 4.0 + self.rng.random::<f32>() * 4.0;
        let mut angle = self.rng.random::<f32>() * TAU;
        if let Some(p) = pointer {
            let to = p - (pos + offset);
            angle = angle * (1.0 - CURSOR_BIAS) + to.y.atan2(to.x) * CURSOR_BIAS;
        }
        let vel = Vec2::new(angle.cos(), angle.sin()) * base_speed * self.speed.value();
        let wake = Some(self.timers.after(WAKE_DELAY));
        self.balls.push(AvoidBall {
            pos,
            vel,
            state: BallState::Stationary,
            wake,
        });
    }

    fn run_timers(&mut self, dt: f32, pointer: Option<Vec2>) {
        for id in self.timers.advance(dt) {
            if Some(id) == self.spawn_timer {
                self.spawn_ball(pointer);
            } else if Some(id) == self.difficulty_timer {
                self.speed.step();
                self.spawn_interval.step();
                if let Some(spawn) = self.spawn_timer {
                    self.timers.set_interval(spawn, self.spawn_interval.value());
                }
                log::debug!(
                    "Difficulty up: speed x{:.2}, spawn every {:.2}s",
                    self.speed.value(),
                    self.spawn_interval.value()
                );
            } else if let Some(ball) = self.balls.iter_mut().find(|b| b.wake == Some(id)) {
                ball.state = BallState::Moving;
                ball.wake = None;
            }
        }
    }

    /// Next position and velocity of a moving ball
    fn drift(&mut self, ball: &AvoidBall, pointer: Option<Vec2>, dt: f32) -> (Vec2, Vec2) {
        let f = dt_factor(dt);
        let mult = self.speed.value();
        let jitter = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5);
        let mut vel = ball.vel * DAMPING.powf(f) + jitter * RANDOM_FORCE * mult * f;

        if let Some(p) = pointer {
            let to = p - ball.center();
            vel += to / to.length().max(1.0) * ATTRACTION * mult * f;
        }
        vel = vel.clamp_length_max(MAX_SPEED * mult);

        let mut pos = ball.pos + vel * f;
        reflect_in_bounds(
            &mut pos,
            &mut vel,
            Vec2::splat(BALL_SIZE),
            Self::area(),
            WALL_RESTITUTION,
        );
        (pos, vel)
    }

    fn end(&mut self) {
        self.status = Status::Lost;
        self.timers.cancel_all();
        self.spawn_timer = None;
        self.difficulty_timer = None;
        self.tones.extend(SoundCue::GameOver.tones());
        log::info!("Caught after {} seconds", self.survived());
    }
}

impl Game for BallAvoidance {
    fn kind(&self) -> GameKind {
        GameKind::BallAvoidance
    }

    fn restart(&mut self) {
        self.balls.clear();
        self.status = Status::Ready;
        self.elapsed = 0.0;
        self.speed.reset();
        self.spawn_interval.reset();
        self.timers = Timers::new();
        self.spawn_timer = None;
        self.difficulty_timer = None;
        self.tones.clear();
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        let pointer = input.pointer();
        let start =
            input.was_pressed(Key::Enter) || input.was_pressed(Key::Space) || input.clicked();
        match self.status {
            Status::Running => {}
            Status::Ready if start => {
                self.begin(pointer);
                return;
            }
            _ if self.status.is_over() && start => {
                self.restart();
                self.begin(pointer);
                return;
            }
            _ => return,
        }

        self.elapsed += dt;
        self.run_timers(dt, pointer);

        // Contact at the current positions ends the run before anything moves
        if self.balls.iter().any(|b| b.touches(pointer)) {
            self.end();
            return;
        }

        let mut moved = self.balls.clone();
        for ball in moved.iter_mut().filter(|b| b.state == BallState::Moving) {
            let (pos, vel) = self.drift(ball, pointer, dt);
            ball.pos = pos;
            ball.vel = vel;
        }
        // A collision at the new positions keeps the last frame on screen
        if moved.iter().any(|b| b.touches(pointer)) {
            self.end();
            return;
        }
        self.balls = moved;
    }

    fn render(&self, surface: &mut dyn Surface) {
        match self.status {
            Status::Ready => {
                centered_text(
                    surface,
                    "Ball Avoidance",
                    WIDTH / 2.0,
                    HEIGHT / 2.0 - 30.0,
                    24.0,
                    Color::GREEN,
                );
                centered_text(
                    surface,
                    "Move the pointer to avoid the balls",
                    WIDTH / 2.0,
                    HEIGHT / 2.0,
                    14.0,
                    Color::GREEN,
                );
                centered_text(
                    surface,
                    "Press Enter or click to start",
                    WIDTH / 2.0,
                    HEIGHT / 2.0 + 24.0,
                    14.0,
                    Color::GREEN,
                );
            }
            Status::Running => {
                for ball in &self.balls {
                    let color = match ball.state {
                        BallState::Stationary => Color::GREY,
                        BallState::Moving => Color::RED,
                    };
                    surface.fill_circle(ball.center(), BALL_RADIUS, color);
                }
                surface.text(
                    &format!("Time: {}s", self.survived()),
                    Vec2::new(8.0, 20.0),
                    16.0,
                    Color::GREEN,
                );
            }
            _ => {
                centered_text(
                    surface,
                    "Game Over!",
                    WIDTH / 2.0,
                    HEIGHT / 2.0 - 20.0,
                    24.0,
                    Color::GREEN,
                );
                centered_text(
                    surface,
                    &format!("You survived for {} seconds", self.survived()),
                    WIDTH / 2.0,
                    HEIGHT / 2.0 + 10.0,
                    16.0,
                    Color::GREEN,
                );
            }
        }
    }

    fn status(&self) -> Status {
        self.status
    }

    fn score(&self) -> i64 {
        i64::from(self.survived())
    }

    fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    fn take_tones(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.tones)
    }
}
