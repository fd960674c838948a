//! Tick driver
//!
//! `Engine` owns the simulation and is the only thing hosts talk to:
//! commands between ticks, then `tick(dt)` once per frame. Each tick runs
//! the same fixed sequence (timers, paddle, motion, resolver, completion,
//! ball loss) so a seeded engine fed the same commands replays exactly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::context::TickContext;
use super::events::{GameEvent, TickReport};
use super::geometry::{enforce_min_vertical, velocity_from_angle};
use super::level::{LevelCatalog, seed_level};
use super::powerup;
use super::resolve::resolve;
use super::schedule::{Scheduler, Task, TimerSlot};
use super::state::{GameState, GameStatus, SimulationState};
use crate::consts::*;
use crate::settings::Settings;

/// The simulation engine for one player session
pub struct Engine<C: LevelCatalog> {
    catalog: C,
    settings: Settings,
    game: GameState,
    world: SimulationState,
    scheduler: Scheduler,
    rng: Pcg32,
    /// Events raised by commands, delivered with the next tick
    pending: TickReport,
}

impl<C: LevelCatalog> Engine<C> {
    pub fn new(catalog: C, settings: Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            game: GameState::new(settings.starting_lives),
            world: SimulationState::default(),
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            pending: TickReport::default(),
            catalog,
            settings,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn world(&self) -> &SimulationState {
        &self.world
    }

    /// Direct state access for tools and tests
    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// Direct world access for tools and tests
    pub fn world_mut(&mut self) -> &mut SimulationState {
        &mut self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn total_levels(&self) -> u32 {
        self.catalog.total_levels().max(1)
    }

    /// Seed the persisted best score
    pub fn set_high_score(&mut self, score: u64) {
        self.game.high_score = self.game.high_score.max(score);
    }

    /// Begin `level` (1-based, clamped to the catalog).
    ///
    /// Always reseeds, even when called for the level already in play.
    /// Starting from GameOver or Won begins a fresh run.
    pub fn start(&mut self, level: u32) {
        let total = self.total_levels();
        let clamped = level.clamp(1, total);
        if clamped != level {
            log::warn!("Level {} out of range 1..={}, using {}", level, total, clamped);
        }
        if matches!(self.game.status, GameStatus::GameOver | GameStatus::Won) {
            self.reset_run();
        }

        let config = self.catalog.level(clamped);
        self.scheduler.invalidate();
        seed_level(&mut self.world, &config, clamped, &mut self.rng);
        self.game.level = clamped;
        self.game.combo = 0;
        self.game.status = GameStatus::Playing;
        log::info!("Starting level {}/{}", clamped, total);
    }

    pub fn pause(&mut self) {
        if self.game.status == GameStatus::Playing {
            self.game.status = GameStatus::Paused;
            log::debug!("Paused");
        }
    }

    /// Continue a paused level without reseeding; pending timers resume
    /// with the time they had left
    pub fn resume(&mut self) {
        if self.game.status == GameStatus::Paused {
            self.game.status = GameStatus::Playing;
            log::debug!("Resumed");
        }
    }

    /// New run from the current level
    pub fn restart(&mut self) {
        self.reset_run();
        self.start(self.game.level);
    }

    pub fn next_level(&mut self) {
        self.start(self.game.level.saturating_add(1));
    }

    /// Point at game-space `(x, y)`: steers the paddle and, with a captured
    /// ball, aims the launch
    pub fn set_aim(&mut self, x: f32, y: f32) {
        let world = &mut self.world;
        world.paddle.target_x = x;
        world.last_manual_input = Some(world.elapsed);

        if let Some(ball) = world.captured_ball_mut() {
            let dx = x - ball.pos.x;
            let dy = y - ball.pos.y;
            // Downward or sideways aims clamp to the nearer bound
            let angle = dx.atan2(-dy).clamp(-MAX_LAUNCH_ANGLE, MAX_LAUNCH_ANGLE);
            world.aim_angle = angle;
        }
    }

    /// Launch the captured ball at the current aim
    pub fn release(&mut self) {
        if self.game.status != GameStatus::Playing {
            return;
        }
        let speed = self.world.ball_speed();
        let angle = self.world.aim_angle;
        let Some(ball) = self.world.captured_ball_mut() else {
            return;
        };
        ball.vel = velocity_from_angle(angle, speed);
        self.world.captured = None;
        self.pending.events.push(GameEvent::BallLaunched);
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Only `Playing` advances anything; other statuses just flush events
    /// raised by commands. Steps longer than `MAX_TICK_DT` are clamped.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = std::mem::take(&mut self.pending);
        if self.game.status != GameStatus::Playing || dt.is_nan() || dt <= 0.0 {
            return report;
        }
        let dt = dt.min(MAX_TICK_DT);
        let total = self.total_levels();

        let mut ctx = TickContext {
            world: &mut self.world,
            game: &mut self.game,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            settings: &self.settings,
            report: &mut report,
        };
        step(&mut ctx, dt, total);

        if self.game.score > self.game.high_score {
            self.game.high_score = self.game.score;
        }
        report
    }

    fn reset_run(&mut self) {
        self.game.score = 0;
        self.game.lives = self.settings.starting_lives;
        self.game.combo = 0;
        self.game.max_combo = 0;
    }
}

fn step(ctx: &mut TickContext, dt: f32, total_levels: u32) {
    ctx.world.elapsed += dt;
    let due = ctx.scheduler.advance(dt);
    for task in due {
        if task == Task::CompleteLevel {
            complete_level(ctx, total_levels);
            return;
        }
        powerup::expire(ctx, task);
    }

    update_combo(ctx, dt);
    decay_shake(ctx.world, dt);
    powerup::update_carrier(ctx, dt);
    steer_paddle(ctx.world, dt);
    let elapsed = ctx.world.elapsed;
    for brick in ctx.world.bricks.iter_mut().filter(|b| !b.destroyed) {
        brick.animate(dt, elapsed);
    }
    move_balls(ctx, dt);
    move_projectiles(ctx.world, dt);

    resolve(ctx);
    detect_completion(ctx);

    if handle_ball_loss(ctx) {
        return;
    }
    age_effects(ctx.world, dt);
}

fn update_combo(ctx: &mut TickContext, dt: f32) {
    if ctx.world.combo_timer > 0.0 {
        ctx.world.combo_timer -= dt;
        if ctx.world.combo_timer <= 0.0 {
            ctx.world.combo_timer = 0.0;
            ctx.game.combo = 0;
        }
    }
}

fn decay_shake(world: &mut SimulationState, dt: f32) {
    world.screen_shake *= (-8.0 * dt).exp();
    if world.screen_shake < 0.01 {
        world.screen_shake = 0.0;
    }
}

/// Autopaddle targeting, smoothing, and carrying the captured ball
fn steer_paddle(world: &mut SimulationState, dt: f32) {
    let manual_recent = world
        .last_manual_input
        .is_some_and(|t| world.elapsed - t < MANUAL_OVERRIDE_TIME);
    if world.effects.autopaddle && !manual_recent {
        // Lowest moving ball = largest y
        let lowest = world
            .balls
            .iter()
            .filter(|b| b.is_moving())
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
        if let Some(ball) = lowest {
            world.paddle.target_x = ball.pos.x;
        }
    }

    world.paddle.move_toward_target(dt);

    if let Some(id) = world.captured {
        let paddle = &world.paddle;
        if let Some(ball) = world.balls.iter_mut().find(|b| b.id == id) {
            ball.pos = paddle.rest_position(ball.radius);
        }
    }
}

fn move_balls(ctx: &mut TickContext, dt: f32) {
    let captured = ctx.world.captured;
    let mut bounces = 0;

    for ball in &mut ctx.world.balls {
        if captured == Some(ball.id) {
            continue;
        }
        ball.pos += ball.vel * dt;
        let r = ball.radius;

        if ball.pos.x - r < 0.0 {
            ball.pos.x = r;
            ball.vel.x = ball.vel.x.abs();
            bounces += 1;
        } else if ball.pos.x + r > FIELD_WIDTH {
            ball.pos.x = FIELD_WIDTH - r;
            ball.vel.x = -ball.vel.x.abs();
            bounces += 1;
        }
        if ball.pos.y - r < 0.0 {
            ball.pos.y = r;
            ball.vel.y = ball.vel.y.abs();
            bounces += 1;
        }

        ball.vel = enforce_min_vertical(ball.vel, MIN_VERTICAL_RATIO);
    }

    for _ in 0..bounces {
        ctx.emit(GameEvent::WallBounce);
    }
}

fn move_projectiles(world: &mut SimulationState, dt: f32) {
    for laser in &mut world.lasers {
        laser.pos.y -= LASER_SPEED * dt;
    }
    world.lasers.retain(|l| l.pos.y >= 0.0);

    for p in &mut world.power_ups {
        p.pos.y += p.fall_speed * dt;
    }
    for coin in &mut world.coins {
        coin.pos.y += coin.fall_speed * dt;
    }
}

/// Shield saves, lost balls and the life check. Returns true on game over.
fn handle_ball_loss(ctx: &mut TickContext) -> bool {
    let shield = ctx.world.paddle.has_shield;
    let captured = ctx.world.captured;
    let mut saves = 0;

    ctx.world.balls.retain_mut(|ball| {
        if captured == Some(ball.id) {
            return true;
        }
        if shield && ball.pos.y + ball.radius >= FIELD_HEIGHT {
            ball.pos.y = SHIELD_SAVE_Y;
            ball.vel.y = -ball.vel.y.abs();
            saves += 1;
            return true;
        }
        ball.pos.y <= FIELD_HEIGHT + BALL_LOSS_MARGIN
    });
    for _ in 0..saves {
        ctx.emit(GameEvent::ShieldSave);
    }

    if !ctx.world.balls.is_empty() {
        return false;
    }
    if ctx.world.completion_pending {
        // Level is already won; don't charge a life for the last ball
        ctx.world.spawn_captured_ball();
        return false;
    }
    lose_life(ctx)
}

fn lose_life(ctx: &mut TickContext) -> bool {
    ctx.game.lives = ctx.game.lives.saturating_sub(1);
    ctx.game.combo = 0;
    ctx.world.combo_timer = 0.0;
    ctx.emit(GameEvent::LifeLost);

    if ctx.game.lives == 0 {
        ctx.game.status = GameStatus::GameOver;
        ctx.scheduler.invalidate();
        ctx.emit(GameEvent::GameOver);
        log::info!(
            "Game over on level {} with score {}",
            ctx.game.level,
            ctx.game.score
        );
        return true;
    }

    log::debug!("Life lost, {} remaining", ctx.game.lives);
    ctx.world.spawn_captured_ball();
    false
}

fn age_effects(world: &mut SimulationState, dt: f32) {
    for blast in &mut world.explosions {
        blast.advance(dt);
    }
    world.explosions.retain(|e| e.is_alive());

    for particle in &mut world.particles {
        particle.pos += particle.vel * dt;
        particle.vel *= 0.98;
        particle.life -= dt * 1.5;
    }
    world.particles.retain(|p| p.life > 0.0);
}

/// Schedule the level-complete transition the tick the last clearable
/// brick goes
fn detect_completion(ctx: &mut TickContext) {
    let remaining = ctx.world.clearable_bricks();
    if !ctx.world.completion_pending && ctx.world.clearable_remaining > 0 && remaining == 0 {
        ctx.world.completion_pending = true;
        ctx.scheduler.schedule_slot(
            TimerSlot::LevelComplete,
            ctx.settings.level_complete_delay_secs,
            Task::CompleteLevel,
        );
        log::debug!("Level {} cleared, completing shortly", ctx.game.level);
    }
    ctx.world.clearable_remaining = remaining;
}

fn complete_level(ctx: &mut TickContext, total_levels: u32) {
    ctx.world.completion_pending = false;
    ctx.scheduler.invalidate();
    ctx.world.shake(1.0);

    if ctx.game.level >= total_levels {
        ctx.game.status = GameStatus::Won;
        ctx.emit(GameEvent::GameWon);
        log::info!("All {} levels cleared, score {}", total_levels, ctx.game.score);
    } else {
        ctx.game.status = GameStatus::LevelComplete;
        ctx.emit(GameEvent::LevelComplete);
        log::info!("Level {} complete, score {}", ctx.game.level, ctx.game.score);
    }

    // Celebration ring
    let center = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0);
    for i in 0..24 {
        let angle = std::f32::consts::TAU * (i as f32 / 24.0);
        ctx.world.push_particle(super::state::Particle {
            pos: center,
            vel: Vec2::from_angle(angle) * 220.0,
            color: 0xFFD700,
            life: 1.0,
        });
    }
}
