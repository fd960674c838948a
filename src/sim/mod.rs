//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module renders, plays
//! sound or reads input devices:
//! - `dt` is passed explicitly every tick
//! - randomness comes from the engine's seeded RNG only
//! - entity pools iterate in insertion order

pub mod context;
pub mod events;
pub mod geometry;
pub mod level;
pub mod powerup;
pub mod resolve;
pub mod schedule;
pub mod state;
pub mod tick;

#[cfg(test)]
pub(crate) mod test_support;

pub use events::{GameEvent, SoundCue, TickReport};
pub use geometry::Rect;
pub use level::{BrickSpec, LevelCatalog, LevelConfig, MoveSpec, seed_level};
pub use powerup::PowerUpKind;
pub use schedule::{Scheduler, Task, TimerSlot};
pub use state::{
    Ball, Brick, BrickKind, GameState, GameStatus, Paddle, PowerUp, SimulationState,
};
pub use tick::Engine;
