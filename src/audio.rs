//! Audio system
//!
//! Everything is built from short oscillator tones, no sound files. Games
//! queue [`Tone`]s (directly for Morse playback, or through a [`SoundCue`]);
//! the loop driver hands them to a [`TonePlayer`]. The browser build plays
//! them on a Web Audio `AudioContext`; native builds log them.

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

/// One sine tone, scheduled relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Pitch in Hz
    pub frequency: f32,
    /// Offset from the time the batch is played
    pub start_ms: f32,
    pub duration_ms: f32,
}

impl Tone {
    pub const fn new(frequency: f32, start_ms: f32, duration_ms: f32) -> Self {
        Self {
            frequency,
            start_ms,
            duration_ms,
        }
    }

    pub fn end_ms(&self) -> f32 {
        self.start_ms + self.duration_ms
    }
}

/// Short game sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Ball bounces off a paddle or wall
    Bounce,
    /// Point scored or item collected
    Score,
    /// Brick or target hit
    Hit,
    GameOver,
    Win,
}

impl SoundCue {
    pub fn tones(self) -> Vec<Tone> {
        match self {
            SoundCue::Bounce => vec![Tone::new(400.0, 0.0, 80.0)],
            SoundCue::Score => vec![Tone::new(660.0, 0.0, 90.0), Tone::new(880.0, 90.0, 120.0)],
            SoundCue::Hit => vec![Tone::new(300.0, 0.0, 60.0)],
            SoundCue::GameOver => [400.0, 350.0, 300.0, 200.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| Tone::new(f, i as f32 * 200.0, 300.0))
                .collect(),
            SoundCue::Win => [500.0, 600.0, 700.0, 800.0, 1000.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| Tone::new(f, i as f32 * 80.0, 250.0))
                .collect(),
        }
    }
}

/// Output for scheduled tones
pub trait TonePlayer {
    /// Schedule a batch of tones starting now
    fn play(&mut self, tones: &[Tone]) -> Result<(), AudioError>;

    /// Volume controls (0.0 - 1.0)
    fn set_volume(&mut self, master: f32, sfx: f32, muted: bool);
}

fn effective_volume(master: f32, sfx: f32, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        master.clamp(0.0, 1.0) * sfx.clamp(0.0, 1.0)
    }
}

/// Player that only logs and counts what it would play
#[derive(Debug)]
pub struct SilentPlayer {
    played: usize,
    volume: f32,
}

impl SilentPlayer {
    pub fn new() -> Self {
        Self {
            played: 0,
            volume: 1.0,
        }
    }

    /// Tones scheduled so far
    pub fn played(&self) -> usize {
        self.played
    }
}

impl Default for SilentPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl TonePlayer for SilentPlayer {
    fn play(&mut self, tones: &[Tone]) -> Result<(), AudioError> {
        if self.volume <= 0.0 {
            return Ok(());
        }
        for tone in tones {
            log::trace!(
                "tone {:.0} Hz at +{:.0} ms for {:.0} ms",
                tone.frequency,
                tone.start_ms,
                tone.duration_ms
            );
        }
        self.played += tones.len();
        Ok(())
    }

    fn set_volume(&mut self, master: f32, sfx: f32, muted: bool) {
        self.volume = effective_volume(master, sfx, muted);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Tone, TonePlayer, effective_volume};
    use crate::error::AudioError;

    /// Web Audio tone player
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebAudio {
        /// Try to create the context; a missing context is reported on play
        pub fn new() -> Self {
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 0.8 }
        }

        /// Oscillator wired through a gain node to the destination
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
        ) -> Result<(OscillatorNode, GainNode), AudioError> {
            let err = |e: wasm_bindgen::JsValue| AudioError::Schedule(format!("{e:?}"));
            let osc = ctx.create_oscillator().map_err(err)?;
            let gain = ctx.create_gain().map_err(err)?;
            osc.set_type(OscillatorType::Sine);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).map_err(err)?;
            gain.connect_with_audio_node(&ctx.destination())
                .map_err(err)?;
            Ok((osc, gain))
        }
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TonePlayer for WebAudio {
        fn play(&mut self, tones: &[Tone]) -> Result<(), AudioError> {
            if self.volume <= 0.0 || tones.is_empty() {
                return Ok(());
            }
            let Some(ctx) = &self.ctx else {
                return Err(AudioError::Unavailable(
                    "AudioContext could not be created".into(),
                ));
            };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let now = ctx.current_time();
            for tone in tones {
                let (osc, gain) = Self::create_osc(ctx, tone.frequency)?;
                let t = now + f64::from(tone.start_ms) / 1000.0;
                let end = t + f64::from(tone.duration_ms) / 1000.0;
                gain.gain().set_value_at_time(self.volume * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.001, end)
                    .ok();
                osc.start_with_when(t)
                    .map_err(|e| AudioError::Schedule(format!("{e:?}")))?;
                osc.stop_with_when(end).ok();
            }
            Ok(())
        }

        fn set_volume(&mut self, master: f32, sfx: f32, muted: bool) {
            self.volume = effective_volume(master, sfx, muted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cues_are_nonempty_and_ordered() {
        for cue in [
            SoundCue::Bounce,
            SoundCue::Score,
            SoundCue::Hit,
            SoundCue::GameOver,
            SoundCue::Win,
        ] {
            let tones = cue.tones();
            assert!(!tones.is_empty());
            assert!(tones.windows(2).all(|w| w[0].start_ms <= w[1].start_ms));
        }
    }

    #[test]
    fn test_muted_player_plays_nothing() {
        let mut player = SilentPlayer::new();
        player.set_volume(0.8, 1.0, true);
        player.play(&SoundCue::Win.tones()).unwrap();
        assert_eq!(player.played(), 0);
        player.set_volume(0.8, 1.0, false);
        player.play(&SoundCue::Win.tones()).unwrap();
        assert_eq!(player.played(), 5);
    }

    #[test]
    fn test_default_player_is_audible() {
        let mut player = SilentPlayer::default();
        player.play(&SoundCue::Bounce.tones()).unwrap();
        assert_eq!(player.played(), SoundCue::Bounce.tones().len());
    }
}
