//! Aim Training
//!
//! Targets pop up away from the pointer, shrink over their lifetime and
//! vanish. Each click fires one round; hitting a target scores. The session
//! ends once the magazine and the reserve are both empty.

use glam::Vec2;

use crate::audio::{SoundCue, Tone};
use crate::consts::AVOID_RADIUS;
use crate::driver::{Game, Status};
use crate::games::GameKind;
use crate::input::{InputState, Key};
use crate::renderer::shapes::centered_text;
use crate::renderer::{Color, Surface};
use crate::settings::Settings;
use crate::sim::{GameRng, TimerId, Timers, place_away_from, point_in_circle, seeded};

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 500.0;

pub const TARGET_RADIUS: f32 = 30.0;
/// Seconds a target stays up
pub const TARGET_LIFETIME: f32 = 2.0;
pub const SPAWN_INTERVAL: f32 = 0.8;
/// Extra slack around a target that still counts as a hit
const HIT_BUFFER: f32 = 4.0;

pub const MAGAZINE_SIZE: u32 = 10;
pub const RESERVE_AMMO: u32 = 30;
pub const RELOAD_TIME: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub center: Vec2,
    /// Seconds since spawn
    pub age: f32,
}

impl Target {
    /// Radius shrinks linearly to zero over the lifetime
    pub fn radius(&self) -> f32 {
        TARGET_RADIUS * (1.0 - self.age / TARGET_LIFETIME).max(0.0)
    }

    fn expired(&self) -> bool {
        self.age >= TARGET_LIFETIME
    }
}

/// Aim Training world
#[derive(Debug, Clone)]
pub struct AimTraining {
    pub targets: Vec<Target>,
    pub magazine: u32,
    pub reserve: u32,
    pub score: u32,
    pub shots: u32,
    pub status: Status,
    spawn_attempts: u32,
    rng: GameRng,
    timers: Timers,
    spawn_timer: Option<TimerId>,
    reload_timer: Option<TimerId>,
    tones: Vec<Tone>,
}

impl AimTraining {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let mut game = Self {
            targets: Vec::new(),
            magazine: MAGAZINE_SIZE,
            reserve: RESERVE_AMMO,
            score: 0,
            shots: 0,
            status: Status::Running,
            spawn_attempts: settings.spawn_attempts,
            rng: seeded(seed),
            timers: Timers::new(),
            spawn_timer: None,
            reload_timer: None,
            tones: Vec::new(),
        };
        game.restart();
        game
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_timer.is_some()
    }

    /// Hit percentage, 0 before the first shot
    pub fn accuracy(&self) -> f32 {
        if self.shots == 0 {
            0.0
        } else {
            self.score as f32 / self.shots as f32 * 100.0
        }
    }

    pub fn spawn_target(&mut self, pointer: Option<Vec2>) {
        let inset = Vec2::splat(TARGET_RADIUS);
        let placed = place_away_from(
            &mut self.rng,
            Vec2::new(WIDTH, HEIGHT) - inset * 2.0,
            pointer.map(|p| p - inset),
            AVOID_RADIUS + TARGET_RADIUS,
            self.spawn_attempts,
        );
        self.targets.push(Target {
            center: placed.pos + inset,
            age: 0.0,
        });
    }

    /// Fire one round at `at`; returns true on a hit
    pub fn fire(&mut self, at: Vec2) -> bool {
        if self.magazine == 0 || self.is_reloading() {
            return false;
        }
        self.magazine -= 1;
        self.shots += 1;
        // Newest target on top
        let hit = self
            .targets
            .iter()
            .rposition(|t| point_in_circle(at, t.center, t.radius() + HIT_BUFFER));
        match hit {
            Some(index) => {
                self.targets.remove(index);
                self.score += 1;
                self.tones.extend(SoundCue::Hit.tones());
                true
            }
            None => false,
        }
    }

    pub fn reload(&mut self) {
        if self.is_reloading() || self.magazine == MAGAZINE_SIZE || self.reserve == 0 {
            return;
        }
        self.reload_timer = Some(self.timers.after(RELOAD_TIME));
        log::debug!("Reloading ({} in reserve)", self.reserve);
    }

    fn finish_reload(&mut self) {
        let moved = (MAGAZINE_SIZE - self.magazine).min(self.reserve);
        self.magazine += moved;
        self.reserve -= moved;
        self.reload_timer = None;
    }

    fn run_timers(&mut self, dt: f32, pointer: Option<Vec2>) {
        for id in self.timers.advance(dt) {
            if Some(id) == self.spawn_timer {
                self.spawn_target(pointer);
            } else if Some(id) == self.reload_timer {
                self.finish_reload();
            }
        }
    }

    fn out_of_ammo(&self) -> bool {
        self.magazine == 0 && self.reserve == 0 && !self.is_reloading()
    }
}

impl Game for AimTraining {
    fn kind(&self) -> GameKind {
        GameKind::AimTraining
    }

    fn restart(&mut self) {
        self.targets.clear();
        self.magazine = MAGAZINE_SIZE;
        self.reserve = RESERVE_AMMO;
        self.score = 0;
        self.shots = 0;
        self.status = Status::Running;
        self.tones.clear();
        self.timers = Timers::new();
        self.reload_timer = None;
        self.spawn_timer = Some(self.timers.every(SPAWN_INTERVAL));
    }

    fn step(&mut self, input: &InputState, dt: f32) {
        if self.status.is_over() {
            if input.was_pressed(Key::Enter) || input.was_pressed(Key::Space) {
                self.restart();
            }
            return;
        }
        let pointer = input.pointer();
        self.run_timers(dt, pointer);

        for target in &mut self.targets {
            target.age += dt;
        }
        self.targets.retain(|t| !t.expired());

        for &click in input.clicks() {
            self.fire(click);
        }
        if input.was_pressed(Key::R) {
            self.reload();
        }

        if self.out_of_ammo() {
            self.status = Status::Finished;
            self.timers.cancel_all();
            self.spawn_timer = None;
            self.tones.extend(SoundCue::GameOver.tones());
            log::info!("Out of ammo: {} hits from {} shots", self.score, self.shots);
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        for target in &self.targets {
            let r = target.radius();
            surface.fill_circle(target.center, r, Color::RED);
            surface.fill_circle(target.center, r * 0.6, Color::WHITE);
            surface.fill_circle(target.center, r * 0.3, Color::RED);
        }
        let ammo = if self.is_reloading() {
            "Reloading...".to_string()
        } else {
            format!("Ammo: {} / {}", self.magazine, self.reserve)
        };
        surface.text(&ammo, Vec2::new(8.0, 20.0), 16.0, Color::GREEN);
        surface.text(
            &format!("Score: {}  Accuracy: {:.0}%", self.score, self.accuracy()),
            Vec2::new(WIDTH - 260.0, 20.0),
            16.0,
            Color::GREEN,
        );
        if self.magazine == 0 && self.reserve > 0 && !self.is_reloading() {
            centered_text(
                surface,
                "Press R to reload",
                WIDTH / 2.0,
                HEIGHT - 20.0,
                16.0,
                Color::AMBER,
            );
        }
        if self.status == Status::Finished {
            centered_text(
                surface,
                "Out of ammo!",
                WIDTH / 2.0,
                HEIGHT / 2.0 - 20.0,
                24.0,
                Color::GREEN,
            );
            centered_text(
                surface,
                &format!("Hits: {}  Accuracy: {:.0}%", self.score, self.accuracy()),
                WIDTH / 2.0,
                HEIGHT / 2.0 + 10.0,
                16.0,
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

    fn game() -> AimTraining {
        AimTraining::new(1, &Settings::default())
    }

    fn click_at(pos: Vec2) -> InputState {
        let mut input = InputState::new();
        input.click(pos);
        input
    }

    #[test]
    fn test_targets_spawn_shrink_and_expire() {
        let mut game = game();
        let idle = InputState::new();
        for _ in 0..85 {
            game.step(&idle, 0.01);
        }
        assert_eq!(game.targets.len(), 1);
        let first = game.targets[0];
        assert!(first.radius() < TARGET_RADIUS);
        // 2 s after its spawn the first target is gone
        for _ in 0..200 {
            game.step(&idle, 0.01);
        }
        assert!(game.targets.iter().all(|t| t.age < TARGET_LIFETIME));
        assert!(!game.targets.contains(&first));
    }

    #[test]
    fn test_spawn_keeps_away_from_pointer() {
        let mut game = game();
        let pointer = Vec2::new(400.0, 250.0);
        for _ in 0..200 {
            game.spawn_target(Some(pointer));
        }
        assert!(game.targets.iter().all(|t| t.center.distance(pointer) >= AVOID_RADIUS));
        assert!(game.targets.iter().all(|t| {
            t.center.x >= TARGET_RADIUS
                && t.center.x <= WIDTH - TARGET_RADIUS
                && t.center.y >= TARGET_RADIUS
                && t.center.y <= HEIGHT - TARGET_RADIUS
        }));
    }

    #[test]
    fn test_hit_and_miss() {
        let mut game = game();
        game.targets.push(Target {
            center: Vec2::new(200.0, 200.0),
            age: 0.0,
        });
        game.step(&click_at(Vec2::new(10.0, 10.0)), 0.01);
        assert_eq!((game.score, game.shots, game.magazine), (0, 1, 9));
        game.step(&click_at(Vec2::new(220.0, 200.0)), 0.01);
        assert_eq!((game.score, game.shots, game.magazine), (1, 2, 8));
        assert!(game.targets.is_empty());
        assert!((game.accuracy() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_reload_takes_a_second() {
        let mut game = game();
        for _ in 0..4 {
            game.fire(Vec2::ZERO);
        }
        let mut input = InputState::new();
        input.key_down(Key::R);
        game.step(&input, 0.01);
        assert!(game.is_reloading());
        // No firing while reloading
        assert!(!game.fire(Vec2::ZERO));
        assert_eq!(game.magazine, 6);
        let idle = InputState::new();
        for _ in 0..110 {
            game.step(&idle, 0.01);
        }
        assert!(!game.is_reloading());
        assert_eq!((game.magazine, game.reserve), (MAGAZINE_SIZE, RESERVE_AMMO - 4));
    }

    #[test]
    fn test_out_of_ammo_ends_session() {
        let mut game = game();
        game.magazine = 1;
        game.reserve = 0;
        game.step(&click_at(Vec2::ZERO), 0.01);
        assert_eq!(game.status, Status::Finished);
        assert!(game.timers_mut().is_empty());

        let mut input = InputState::new();
        input.key_down(Key::Enter);
        game.step(&input, 0.01);
        assert_eq!(game.status, Status::Running);
        assert_eq!(game.magazine, MAGAZINE_SIZE);
    }

    #[test]
    fn test_empty_magazine_with_reserve_keeps_playing() {
        let mut game = game();
        game.magazine = 0;
        game.step(&click_at(Vec2::ZERO), 0.01);
        assert_eq!(game.status, Status::Running);
        assert_eq!(game.shots, 0);
    }
}
