//! Game state and core simulation types
//!
//! `GameState` is the record shared with the menu/display layer;
//! `SimulationState` holds every entity pool and is owned by the engine.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::powerup::PowerUpKind;
use crate::consts::*;

/// Top-level game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
    /// Level cleared; the menu layer decides when to start the next one
    LevelComplete,
    /// Final catalog level cleared
    Won,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
        }
    }

    /// Moving balls have nonzero velocity (captured ones are parked)
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.vel.length_squared() > 0.0
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Centre x
    pub x: f32,
    /// Centre y
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Where smoothing is steering toward
    pub target_x: f32,
    pub has_laser: bool,
    pub has_magnet: bool,
    pub has_shield: bool,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: FIELD_WIDTH / 2.0,
            y: PADDLE_Y,
            width: PADDLE_BASE_WIDTH,
            height: PADDLE_HEIGHT,
            target_x: FIELD_WIDTH / 2.0,
            has_laser: false,
            has_magnet: false,
            has_shield: false,
        }
    }
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::centered(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    /// Set width, clamped to the legal range
    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(PADDLE_MIN_WIDTH, PADDLE_MAX_WIDTH);
        self.clamp_to_field();
    }

    /// Keep the whole paddle inside the field
    pub fn clamp_to_field(&mut self) {
        let half = self.width / 2.0;
        self.x = self.x.clamp(half, FIELD_WIDTH - half);
    }

    /// Ease toward `target_x` at a fixed exponential rate
    pub fn move_toward_target(&mut self, dt: f32) {
        let half = self.width / 2.0;
        let target = self.target_x.clamp(half, FIELD_WIDTH - half);
        let blend = (PADDLE_FOLLOW_RATE * dt).min(1.0);
        self.x += (target - self.x) * blend;
        self.clamp_to_field();
    }

    /// Where a captured ball of `radius` rests
    pub fn rest_position(&self, radius: f32) -> Vec2 {
        Vec2::new(self.x, self.top() - radius - 1.0)
    }
}

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrickKind {
    #[default]
    Normal,
    Explosive,
    /// Cannot be destroyed, doesn't count for level clear
    Indestructible,
    Moving,
    Chain,
    Coin,
    Rainbow,
    Ghost,
}

/// Horizontal oscillation of a moving brick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub original_x: f32,
    pub speed: f32,
    pub range: f32,
    /// +1 or -1
    pub direction: f32,
}

/// Hit count used for indestructible bricks
pub const INDESTRUCTIBLE_HITS: u32 = u32::MAX;

/// Rainbow palette, cycled over time
pub const RAINBOW_COLORS: [u32; 6] = [0xFF4040, 0xFF9F1A, 0xFFE14D, 0x4DDB6B, 0x4DA6FF, 0xB266FF];

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub hits: u32,
    pub max_hits: u32,
    pub color: u32,
    pub destroyed: bool,
    pub kind: BrickKind,
    #[serde(default)]
    pub motion: Option<Oscillation>,
    /// Phase offset for ghost fading / rainbow cycling (seconds)
    #[serde(default)]
    pub phase: f32,
}

impl Brick {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    #[inline]
    pub fn is_indestructible(&self) -> bool {
        self.kind == BrickKind::Indestructible
    }

    /// Returns true if this brick must be destroyed to clear the level
    pub fn counts_for_clear(&self) -> bool {
        !self.is_indestructible() && !self.destroyed
    }

    /// Ghost bricks phase out periodically; everything else is always solid
    pub fn is_solid(&self, elapsed: f32) -> bool {
        if self.kind != BrickKind::Ghost {
            return true;
        }
        let cycle = GHOST_SOLID_TIME + GHOST_PHASED_TIME;
        (elapsed + self.phase).rem_euclid(cycle) < GHOST_SOLID_TIME
    }

    /// Live and currently collidable
    #[inline]
    pub fn is_hittable(&self, elapsed: f32) -> bool {
        !self.destroyed && self.is_solid(elapsed)
    }

    /// Oscillate moving bricks between `original_x ± range`, cycle rainbow colours
    pub fn animate(&mut self, dt: f32, elapsed: f32) {
        if let Some(motion) = self.motion.as_mut() {
            self.pos.x += motion.speed * motion.direction * dt;
            let lo = motion.original_x - motion.range;
            let hi = motion.original_x + motion.range;
            if self.pos.x >= hi {
                self.pos.x = hi;
                motion.direction = -1.0;
            } else if self.pos.x <= lo {
                self.pos.x = lo;
                motion.direction = 1.0;
            }
        }
        if self.kind == BrickKind::Rainbow {
            let step = ((elapsed + self.phase) * 4.0) as usize;
            self.color = RAINBOW_COLORS[step % RAINBOW_COLORS.len()];
        }
    }
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    /// Centre
    pub pos: Vec2,
    pub size: Vec2,
    pub fall_speed: f32,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            size: Vec2::new(POWERUP_WIDTH, POWERUP_HEIGHT),
            fall_speed: POWERUP_FALL_SPEED,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, self.size)
    }
}

/// A laser bolt (a point moving upward)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Laser {
    pub pos: Vec2,
}

/// A coin falling from a coin brick
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub fall_speed: f32,
    pub value: u32,
}

impl Coin {
    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, Vec2::splat(COIN_RADIUS * 2.0))
    }
}

/// Static collectible placed at level start
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelCoin {
    pub pos: Vec2,
    pub radius: f32,
    pub value: u32,
}

/// A growing, fading blast
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub age: f32,
}

impl Explosion {
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            radius: 0.0,
            max_radius: EXPLOSION_MAX_RADIUS,
            age: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.age += dt;
        self.radius = self.max_radius * (self.age / EXPLOSION_GROW_TIME).min(1.0);
    }

    /// Opacity for the renderer, 1 → 0 over the lifetime
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / EXPLOSION_LIFETIME).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.age < EXPLOSION_LIFETIME
    }

    /// Distance within which bricks are destroyed this frame
    #[inline]
    pub fn reach(&self) -> f32 {
        self.radius * EXPLOSION_REACH
    }
}

/// The carrier plane that guarantees a power-up after long droughts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Carrier {
    /// Centre
    pub pos: Vec2,
    pub speed: f32,
    pub dropped: bool,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
}

/// Global timed effects that are not paddle flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub fireball: bool,
    pub bigball: bool,
    pub shock: bool,
    pub autopaddle: bool,
    /// Multiplier on the level ball speed (slow / speedup)
    pub speed_factor: f32,
}

impl Default for ActiveEffects {
    fn default() -> Self {
        Self {
            fireball: false,
            bigball: false,
            shock: false,
            autopaddle: false,
            speed_factor: 1.0,
        }
    }
}

/// Score and progress record shared with the menu/display layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub status: GameStatus,
    pub score: u64,
    pub lives: u32,
    /// 1-based level index
    pub level: u32,
    pub high_score: u64,
    pub coins: u64,
    pub combo: u32,
    pub max_combo: u32,
}

impl GameState {
    pub fn new(lives: u32) -> Self {
        Self {
            status: GameStatus::Menu,
            score: 0,
            lives,
            level: 1,
            high_score: 0,
            coins: 0,
            combo: 0,
            max_combo: 0,
        }
    }
}

/// Every entity pool plus the timers the tick driver owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    /// Id of the ball held by the paddle, if any
    pub captured: Option<u32>,
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    pub lasers: Vec<Laser>,
    pub coins: Vec<Coin>,
    pub level_coins: Vec<LevelCoin>,
    pub explosions: Vec<Explosion>,
    pub carrier: Option<Carrier>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: VecDeque<Particle>,
    pub effects: ActiveEffects,
    /// Seconds left before combo resets
    pub combo_timer: f32,
    /// 0-1 shake magnitude for the renderer
    pub screen_shake: f32,
    /// Seconds of play in this level
    pub elapsed: f32,
    /// Seconds since the last power-up drop
    pub powerup_idle: f32,
    /// Launch angle from vertical for the captured ball
    pub aim_angle: f32,
    /// `elapsed` at the last pointer input (None = never)
    pub last_manual_input: Option<f32>,
    /// Ball speed from the level catalog (px/s)
    pub level_speed: f32,
    /// Clearable bricks left after the previous tick
    pub clearable_remaining: usize,
    /// Level-complete transition is scheduled
    pub completion_pending: bool,
    next_id: u32,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            paddle: Paddle::default(),
            balls: Vec::new(),
            captured: None,
            bricks: Vec::new(),
            power_ups: Vec::new(),
            lasers: Vec::new(),
            coins: Vec::new(),
            level_coins: Vec::new(),
            explosions: Vec::new(),
            carrier: None,
            particles: VecDeque::new(),
            effects: ActiveEffects::default(),
            combo_timer: 0.0,
            screen_shake: 0.0,
            elapsed: 0.0,
            powerup_idle: 0.0,
            aim_angle: 0.0,
            last_manual_input: None,
            level_speed: 300.0,
            clearable_remaining: 0,
            completion_pending: false,
            next_id: 1,
        }
    }
}

impl SimulationState {
    /// Empty world for a level launched at `level_speed` px/s
    pub fn for_level(level_speed: f32) -> Self {
        Self {
            level_speed,
            ..Self::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Radius new balls get under the current effects
    pub fn ball_radius(&self) -> f32 {
        if self.effects.bigball {
            BALL_RADIUS * BIG_BALL_SCALE
        } else {
            BALL_RADIUS
        }
    }

    /// Launch/target speed under the current effects
    pub fn ball_speed(&self) -> f32 {
        self.level_speed * self.effects.speed_factor
    }

    /// Spawn a ball parked on the paddle and mark it captured
    pub fn spawn_captured_ball(&mut self) -> u32 {
        let id = self.next_entity_id();
        let radius = self.ball_radius();
        let pos = self.paddle.rest_position(radius);
        self.balls.push(Ball::new(id, pos, Vec2::ZERO, radius));
        self.captured = Some(id);
        id
    }

    pub fn captured_ball_mut(&mut self) -> Option<&mut Ball> {
        let id = self.captured?;
        self.balls.iter_mut().find(|b| b.id == id)
    }

    #[inline]
    pub fn is_captured(&self, ball: &Ball) -> bool {
        self.captured == Some(ball.id)
    }

    /// Non-indestructible bricks still standing
    pub fn clearable_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| b.counts_for_clear()).count()
    }

    /// Add a screen-shake kick (saturates at 1)
    pub fn shake(&mut self, amount: f32) {
        self.screen_shake = (self.screen_shake + amount).min(1.0);
    }

    /// Push a particle, evicting the oldest when full
    pub fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }
}
