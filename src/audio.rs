//! Sound cue vocabulary
//!
//! The simulation only names cues; synthesis belongs to the host. Cues are
//! emitted as `GameEvent::Sound` and routed to an `AudioSink` once per frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Golem swings
    Attack,
    /// Something took a hit
    Hit,
    /// Enemy lands an attack
    EnemyAttack,
    /// Enemy dies
    EnemyDeath,
    /// Wave begins
    WaveStart,
    /// Wave cleared
    WaveComplete,
    /// Boss enters the village
    BossSpawn,
    /// Boss enrages
    BossRage,
    /// Resource picked up
    ResourceCollect,
    /// Golem footstep
    Footstep,
    /// Golem jumps
    Jump,
    /// Upgrade or repair bought
    Purchase,
    /// Run ended
    GameOver,
}

impl SoundEffect {
    /// Base cue volume before settings are applied
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundEffect::Attack => 0.8,
            SoundEffect::Hit => 0.6,
            SoundEffect::EnemyAttack => 1.0,
            SoundEffect::EnemyDeath => 0.7,
            SoundEffect::WaveStart => 0.8,
            SoundEffect::Footstep => 0.3,
            SoundEffect::BossSpawn | SoundEffect::BossRage => 1.0,
            _ => 0.7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Attack => "attack",
            SoundEffect::Hit => "hit",
            SoundEffect::EnemyAttack => "enemy_attack",
            SoundEffect::EnemyDeath => "enemy_death",
            SoundEffect::WaveStart => "wave_start",
            SoundEffect::WaveComplete => "wave_complete",
            SoundEffect::BossSpawn => "boss_spawn",
            SoundEffect::BossRage => "boss_rage",
            SoundEffect::ResourceCollect => "resource_collect",
            SoundEffect::Footstep => "footstep",
            SoundEffect::Jump => "jump",
            SoundEffect::Purchase => "purchase",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// Playback backend. Cues are fire-and-forget.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, position: Option<Vec3>, volume: f32);
}

/// Sink that only logs cues (headless runs, tests)
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: usize,
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, position: Option<Vec3>, volume: f32) {
        self.played += 1;
        log::trace!("sound {} at {:?} vol {:.2}", effect.name(), position, volume);
    }
}

/// Route the sound events of a frame to a sink, applying volume settings
///
/// Returns the number of cues played. Muted settings play nothing.
pub fn dispatch_sounds<S: AudioSink + ?Sized>(events: &[GameEvent], sink: &mut S, settings: &Settings) -> usize {
    let gain = settings.effective_sfx_volume();
    if gain <= 0.0 {
        return 0;
    }

    let mut played = 0;
    for event in events {
        if let GameEvent::Sound { effect, position } = event {
            sink.play(*effect, *position, (effect.base_volume() * gain).clamp(0.0, 1.0));
            played += 1;
        }
    }
    played
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(SoundEffect, f32)>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, _position: Option<Vec3>, volume: f32) {
            self.0.push((effect, volume));
        }
    }

    #[test]
    fn test_dispatch_applies_volume_and_skips_other_events() {
        let events = vec![
            GameEvent::Sound {
                effect: SoundEffect::Hit,
                position: None,
            },
            GameEvent::WaveStarted {
                wave: 1,
                enemies: 7,
                boss_wave: false,
            },
            GameEvent::Sound {
                effect: SoundEffect::Footstep,
                position: Some(Vec3::ZERO),
            },
        ];
        let settings = Settings {
            master_volume: 1.0,
            sfx_volume: 0.5,
            ..Default::default()
        };

        let mut sink = Recorder::default();
        assert_eq!(dispatch_sounds(&events, &mut sink, &settings), 2);
        assert_eq!(sink.0[0].0, SoundEffect::Hit);
        assert!((sink.0[0].1 - 0.3).abs() < 1e-5);
        assert!((sink.0[1].1 - 0.15).abs() < 1e-5);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let events = vec![GameEvent::Sound {
            effect: SoundEffect::Attack,
            position: None,
        }];
        let settings = Settings {
            master_volume: 0.0,
            ..Default::default()
        };
        let mut sink = LogAudio::default();
        assert_eq!(dispatch_sounds(&events, &mut sink, &settings), 0);
        assert_eq!(sink.played, 0);
    }
}
