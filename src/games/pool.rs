//! Pool
//!
//! A cue ball and an eight ball on a cushioned table. Aim with the pointer or
//! Left/Right, set strength with Up/Down, shoot with Space or a click. Every
//! ball-on-ball impact scores a point.

use glam::Vec2;

use crate::audio::{SoundCue, Tone};
use crate::consts::SPAWN_ATTEMPTS;
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::dotted_ray;
use crate::renderer::{Color, Surface};
use crate::sim::{
    GameRng, Rect, Timers, approaching, circles_overlap, elastic_collision, place_away_from,
    reflect_circle_in_bounds, seeded, separate_circles,
};
use crate::{dt_factor, integrate};

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 400.0;

pub const BALL_RADIUS: f32 = 10.0;
/// Velocity kept per reference frame
const FRICTION: f32 = 0.99;
/// Below this speed a ball is at rest
pub const STOP_SPEED: f32 = 0.05;

const MIN_STRENGTH: u32 = 1;
const MAX_STRENGTH: u32 = 10;
/// Degrees per reference frame while an aim key is held
const AIM_SPEED: f32 = 2.0;
const AIM_GUIDE_LENGTH: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Ball {
    fn at(pos: Vec2) -> Self {
        Self { pos, vel: Vec2::ZERO }
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    fn roll(&mut self, dt: f32) {
        self.vel *= FRICTION.powf(dt_factor(dt));
        if self.vel.length() < STOP_SPEED {
            self.vel = Vec2::ZERO;
        }
        self.pos = integrate(self.pos, self.vel, dt);
    }
}

/// Pool world
#[derive(Debug, Clone)]
pub struct Pool {
    pub cue: Ball,
    pub eight: Ball,
    /// Aim angle in degrees, [0, 360)
    pub angle: f32,
    pub strength: u32,
    pub score: u32,
    pub shots: u32,
    last_pointer: Option<Vec2>,
    rng: GameRng,
    timers: Timers,
    tones: Vec<Tone>,
}

impl Pool {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            cue: Ball::at(Vec2::ZERO),
            eight: Ball::at(Vec2::ZERO),
            angle: 45.0,
            strength: 5,
            score: 0,
            shots: 0,
            last_pointer: None,
            rng: seeded(seed),
            timers: Timers::new(),
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    /// Random spot on the cloth, kept clear of `avoid`
    fn rack_position(&mut self, avoid: Option<Vec2>) -> Vec2 {
        let inset = Vec2::splat(BALL_RADIUS);
        let area = Vec2::new(WIDTH, HEIGHT) - inset * 2.0;
        let avoid = avoid.map(|p| p - inset);
        let placed = place_away_from(&mut self.rng, area, avoid, BALL_RADIUS * 4.0, SPAWN_ATTEMPTS);
        placed.pos + inset
    }

    pub fn at_rest(&self) -> bool {
        !self.cue.is_moving() && !self.eight.is_moving()
    }

    fn aim_direction(&self) -> Vec2 {
        let rad = self.angle.to_radians();
        Vec2::new(rad.cos(), rad.sin())
    }

    /// Strike the cue ball along the aim; ignored while anything rolls
    pub fn shoot(&mut self) -> bool {
        if !self.at_rest() {
            return false;
        }
        self.cue.vel = self.aim_direction() * self.strength as f32;
        self.shots += 1;
        true
    }

    fn handle_input(&mut self, input: &InputState, dt: f32) {
        if let Some(pointer) = input.pointer() {
            if self.last_pointer != Some(pointer) {
                let to = pointer - self.cue.pos;
                if to != Vec2::ZERO {
                    self.angle = to.y.atan2(to.x).to_degrees().rem_euclid(360.0);
                }
            }
            self.last_pointer = Some(pointer);
        }
        let turn = AIM_SPEED * dt_factor(dt);
        if input.is_held(Key::Left) {
            self.angle = (self.angle - turn).rem_euclid(360.0);
        }
        if input.is_held(Key::Right) {
            self.angle = (self.angle + turn).rem_euclid(360.0);
        }
        if input.was_pressed(Key::Up) {
            self.strength = (self.strength + 1).min(MAX_STRENGTH);
        }
        if input.was_pressed(Key::Down) {
            self.strength = self.strength.saturating_sub(1).max(MIN_STRENGTH);
        }
        if input.was_pressed(Key::Space) || input.clicked() {
            self.shoot();
        }
    }

    fn resolve_cushions(&mut self) {
        let bounds = Vec2::new(WIDTH, HEIGHT);
        for ball in [&mut self.cue, &mut self.eight] {
            let hits =
                reflect_circle_in_bounds(&mut ball.pos, &mut ball.vel, BALL_RADIUS, bounds, 1.0);
            if hits.any() {
                self.tones.extend(SoundCue::Bounce.tones());
            }
        }
    }

    fn resolve_impact(&mut self) {
        if !circles_overlap(self.cue.pos, BALL_RADIUS, self.eight.pos, BALL_RADIUS) {
            return;
        }
        // Only bodies closing in exchange momentum; separating ones just get unstuck
        if approaching(self.cue.pos, self.cue.vel, self.eight.pos, self.eight.vel) {
            let (v1, v2) = elastic_collision(
                self.cue.pos,
                self.cue.vel,
                self.eight.pos,
                self.eight.vel,
            );
            self.cue.vel = v1;
            self.eight.vel = v2;
            self.score += 1;
            self.tones.extend(SoundCue::Hit.tones());
        }
        separate_circles(&mut self.cue.pos, BALL_RADIUS, &mut self.eight.pos, BALL_RADIUS);
    }
}

impl Game for Pool {
    fn kind(&self) -> GameKind {
        GameKind::Pool
    }

    fn restart(&mut self) {
        let cue = self.rack_position(None);
        let eight = self.rack_position(Some(cue));
        self.cue = Ball::at(cue);
        self.eight = Ball::at(eight);
        self.angle = 45.0;
        self.strength = 5;
        self.score = 0;
        self.shots = 0;
        self.last_pointer = None;
        self.timers = Timers::new();
        self.tones.clear();
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        if input.was_pressed(Key::R) {
            self.restart();
            return;
        }
        self.handle_input(input, dt);
        self.cue.roll(dt);
        self.eight.roll(dt);
        self.resolve_impact();
        self.resolve_cushions();
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.fill_rect(Rect::new(0.0, 0.0, WIDTH, HEIGHT), Color::DARK_GREEN);
        surface.fill_circle(self.cue.pos, BALL_RADIUS, Color::WHITE);
        surface.fill_circle(self.eight.pos, BALL_RADIUS, Color::BLACK);
        if self.at_rest() {
            dotted_ray(
                surface,
                self.cue.pos,
                self.angle.to_radians(),
                AIM_GUIDE_LENGTH,
                8,
                Color::GREEN,
            );
        }
        surface.text(
            &format!(
                "Angle: {:.0}°  Strength: {}  Score: {}",
                self.angle, self.strength, self.score
            ),
            Vec2::new(8.0, 20.0),
            14.0,
            Color::GREEN,
        );
    }

    /// Free play: never ends
    fn status(&self) -> Status {
        Status::Running
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
