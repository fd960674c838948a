//! Outbound notifications
//!
//! The engine collects events during a tick and hands them to the host in a
//! `TickReport`. Nothing the host does with them feeds back into the
//! simulation.

use serde::{Deserialize, Serialize};

use super::powerup::PowerUpKind;

/// Discrete gameplay events, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Brick damaged but still standing
    BrickHit { id: u32 },
    BrickDestroyed { id: u32, points: u64 },
    /// Ball or laser bounced off an indestructible brick
    IndestructibleHit { id: u32 },
    Combo(u32),
    Explosion { x: f32, y: f32 },
    PowerUpCollected { kind: PowerUpKind },
    /// Power-up fell past the paddle
    PowerUpMissed { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    LaserFired,
    WallBounce,
    PaddleBounce,
    BallCaptured,
    BallLaunched,
    ShieldSave,
    CoinCollected { value: u32 },
    CarrierSpawned,
    LifeLost,
    ExtraLife,
    LevelComplete,
    GameWon,
    GameOver,
}

/// Named audio cue for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    PaddleHit,
    WallHit,
    BrickHit,
    BrickBreak,
    MetalClang,
    Combo,
    Explosion,
    PowerUpGood,
    PowerUpBad,
    Laser,
    Coin,
    Shield,
    Launch,
    Plane,
    LifeLost,
    ExtraLife,
    LevelClear,
    Victory,
    GameOver,
}

impl GameEvent {
    /// Which cue the audio collaborator should play, if any
    pub fn sound_cue(&self) -> Option<SoundCue> {
        let cue = match self {
            Self::BrickHit { .. } => SoundCue::BrickHit,
            Self::BrickDestroyed { .. } => SoundCue::BrickBreak,
            Self::IndestructibleHit { .. } => SoundCue::MetalClang,
            Self::Combo(_) => SoundCue::Combo,
            Self::Explosion { .. } => SoundCue::Explosion,
            Self::PowerUpCollected { kind } if kind.is_negative() => SoundCue::PowerUpBad,
            Self::PowerUpCollected { .. } => SoundCue::PowerUpGood,
            Self::PowerUpMissed { .. } | Self::PowerUpExpired { .. } => return None,
            Self::LaserFired => SoundCue::Laser,
            Self::WallBounce => SoundCue::WallHit,
            Self::PaddleBounce | Self::BallCaptured => SoundCue::PaddleHit,
            Self::BallLaunched => SoundCue::Launch,
            Self::ShieldSave => SoundCue::Shield,
            Self::CoinCollected { .. } => SoundCue::Coin,
            Self::CarrierSpawned => SoundCue::Plane,
            Self::LifeLost => SoundCue::LifeLost,
            Self::ExtraLife => SoundCue::ExtraLife,
            Self::LevelComplete => SoundCue::LevelClear,
            Self::GameWon => SoundCue::Victory,
            Self::GameOver => SoundCue::GameOver,
        };
        Some(cue)
    }
}

/// Everything a tick produced for the outside world
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub score_delta: u64,
    pub coin_delta: u64,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.score_delta == 0 && self.coin_delta == 0
    }

    /// Count events matching a predicate
    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Append another report (used when stepping several ticks at once)
    pub fn merge(&mut self, other: TickReport) {
        self.events.extend(other.events);
        self.score_delta += other.score_delta;
        self.coin_delta += other.coin_delta;
    }
}
