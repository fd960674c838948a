//! Brick Rush - arcade brick breaker simulation core
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (physics, collisions, power-ups, game state)
//! - `catalog`: Level tables, static (JSON) or procedurally generated
//! - `settings`: Data-driven game balance
//! - `progress`: The two persisted counters (high score, unlocked level)

pub mod catalog;
pub mod error;
pub mod progress;
pub mod settings;
pub mod sim;

pub use catalog::{GeneratedCatalog, StaticCatalog};
pub use error::Error;
pub use progress::Progress;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Play-field dimensions (game space, y grows downward)
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 700.0;
    /// Balls below `FIELD_HEIGHT + BALL_LOSS_MARGIN` are lost
    pub const BALL_LOSS_MARGIN: f32 = 50.0;
    /// Where the shield puts a saved ball back
    pub const SHIELD_SAVE_Y: f32 = FIELD_HEIGHT - 20.0;

    /// Paddle defaults
    pub const PADDLE_Y: f32 = FIELD_HEIGHT - 40.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
    pub const PADDLE_BASE_WIDTH: f32 = 80.0;
    pub const PADDLE_MIN_WIDTH: f32 = 40.0;
    pub const PADDLE_MAX_WIDTH: f32 = 150.0;
    /// Exponential follow rate toward the target x (per second)
    pub const PADDLE_FOLLOW_RATE: f32 = 18.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 7.0;
    pub const BIG_BALL_SCALE: f32 = 1.8;
    /// Minimum |vy| / speed after integration
    pub const MIN_VERTICAL_RATIO: f32 = 0.25;
    /// Minimum |vy| / speed after a paddle bounce
    pub const PADDLE_MIN_VERTICAL_RATIO: f32 = 0.3;
    /// Launch aim is clamped to this angle from vertical (radians, 75°)
    pub const MAX_LAUNCH_ANGLE: f32 = 75.0 * std::f32::consts::PI / 180.0;

    /// Combo decay window (seconds)
    pub const COMBO_WINDOW: f32 = 2.0;
    /// Combo count from which `GameEvent::Combo` fires
    pub const COMBO_EVENT_THRESHOLD: u32 = 3;

    /// Brick adjacency for chain and shock (max edge gap in px)
    pub const TOUCH_GAP: f32 = 5.0;
    /// Ghost bricks: solid seconds, then phased seconds
    pub const GHOST_SOLID_TIME: f32 = 2.0;
    pub const GHOST_PHASED_TIME: f32 = 1.0;

    /// Explosions
    pub const EXPLOSION_MAX_RADIUS: f32 = 90.0;
    pub const EXPLOSION_GROW_TIME: f32 = 0.25;
    pub const EXPLOSION_LIFETIME: f32 = 0.6;
    /// Fraction of the current radius that destroys bricks
    pub const EXPLOSION_REACH: f32 = 0.8;

    /// Falling pickups
    pub const POWERUP_WIDTH: f32 = 24.0;
    pub const POWERUP_HEIGHT: f32 = 12.0;
    pub const POWERUP_FALL_SPEED: f32 = 150.0;
    pub const COIN_RADIUS: f32 = 6.0;
    pub const COIN_FALL_SPEED: f32 = 160.0;
    pub const COIN_VALUE: u32 = 2;
    /// Coins awarded for catching a positive power-up
    pub const POWERUP_COIN_REWARD: u32 = 5;
    pub const LEVEL_COIN_RADIUS: f32 = 8.0;
    pub const LEVEL_COIN_VALUE: u32 = 10;

    /// Lasers
    pub const LASER_SPEED: f32 = 600.0;
    pub const LASER_INTERVAL: f32 = 0.3;

    /// Carrier plane
    pub const CARRIER_Y: f32 = 90.0;
    pub const CARRIER_SPEED: f32 = 120.0;
    pub const CARRIER_WIDTH: f32 = 40.0;

    /// Autopaddle yields to manual input for this long (seconds)
    pub const MANUAL_OVERRIDE_TIME: f32 = 1.5;

    /// Multiball and sevenball stop spawning at this many live balls
    pub const MAX_BALLS: usize = 64;

    /// Cosmetic particle cap
    pub const MAX_PARTICLES: usize = 256;

    /// Fixed simulation timestep used by the demo driver (seconds)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Longest step a single tick will integrate (seconds)
    pub const MAX_TICK_DT: f32 = 1.0 / 20.0;
}
