//! Collision & destruction resolver
//!
//! Runs once per tick after motion integration, in fixed phases:
//!
//! 1. ball vs paddle (bounce or magnet capture)
//! 2. laser vs brick
//! 3. ball vs brick damage, one brick per ball unless fireball/bigball
//! 4. explosion vs brick
//! 5. ball vs brick bounce, against the bricks live when the pass began
//! 6. pickups (power-ups, falling coins, level coins)
//!
//! Destruction funnels through [`destroy_brick`], which scores the brick,
//! applies its kind effects and runs chain / shock cascades. Cascaded
//! destructions never start further cascades.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;

use super::context::TickContext;
use super::events::GameEvent;
use super::geometry::{
    ball_hits_rect, bounce_angle, enforce_min_vertical, laser_hits_rect, reflect_velocity,
    velocity_from_angle,
};
use super::powerup::{self, choose_kind, roll_drop, spawn_power_up};
use super::state::{Brick, BrickKind, Coin, Explosion, Particle};
use crate::consts::*;

/// What destroyed a brick; decides which cascades may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    Ball,
    Laser,
    Explosion,
    Chain,
    Shock,
}

impl Cause {
    /// Chain floods start from direct hits and blasts
    fn starts_chain(self) -> bool {
        matches!(self, Cause::Ball | Cause::Laser | Cause::Explosion)
    }

    /// Shock only radiates from ball and laser kills
    fn starts_shock(self) -> bool {
        matches!(self, Cause::Ball | Cause::Laser)
    }
}

/// Run every phase for one tick
pub fn resolve(ctx: &mut TickContext) {
    let elapsed = ctx.world.elapsed;
    let live_at_start: Vec<usize> = ctx
        .world
        .bricks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_hittable(elapsed))
        .map(|(i, _)| i)
        .collect();

    paddle_phase(ctx);
    laser_phase(ctx);
    damage_phase(ctx);
    explosion_phase(ctx);
    bounce_phase(ctx, &live_at_start);
    pickup_phase(ctx);
}

/// Points for destroying a brick at the given combo (before increment)
pub fn brick_score(max_hits: u32, combo: u32) -> u64 {
    let raw = f64::from(max_hits) * 10.0 * (1.0 + f64::from(combo) * 0.1);
    raw.round() as u64
}

/// Take one hit; destroys the brick when its hits run out
pub fn damage_brick(ctx: &mut TickContext, idx: usize, cause: Cause) {
    let brick = &mut ctx.world.bricks[idx];
    if brick.destroyed {
        return;
    }
    if brick.is_indestructible() {
        let (id, center) = (brick.id, brick.center());
        ctx.emit(GameEvent::IndestructibleHit { id });
        burst(ctx, center, 0xC8C8D0, 3);
        return;
    }

    brick.hits = brick.hits.saturating_sub(1);
    if brick.hits == 0 {
        destroy_brick(ctx, idx, cause);
    } else {
        let id = brick.id;
        ctx.emit(GameEvent::BrickHit { id });
    }
}

/// Destroy a brick outright, then run the cascades its cause allows
pub fn destroy_brick(ctx: &mut TickContext, idx: usize, cause: Cause) {
    if !destroy_one(ctx, idx) {
        return;
    }

    if ctx.world.bricks[idx].kind == BrickKind::Chain && cause.starts_chain() {
        for j in chain_group(&ctx.world.bricks, idx) {
            destroy_brick(ctx, j, Cause::Chain);
        }
    }

    if ctx.world.effects.shock && cause.starts_shock() {
        let origin = ctx.world.bricks[idx].rect();
        let neighbours: Vec<usize> = ctx
            .world
            .bricks
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                !b.destroyed && !b.is_indestructible() && origin.touches(&b.rect(), TOUCH_GAP)
            })
            .map(|(j, _)| j)
            .collect();
        for j in neighbours {
            destroy_brick(ctx, j, Cause::Shock);
        }
    }
}

/// Mark destroyed, score it and apply kind effects. Returns false if the
/// brick was already gone or cannot be destroyed.
fn destroy_one(ctx: &mut TickContext, idx: usize) -> bool {
    let brick = &mut ctx.world.bricks[idx];
    if brick.destroyed || brick.is_indestructible() {
        return false;
    }
    brick.destroyed = true;
    brick.hits = 0;
    let Brick {
        id,
        kind,
        max_hits,
        color,
        ..
    } = *brick;
    let center = brick.center();

    let points = brick_score(max_hits, ctx.game.combo);
    ctx.add_score(points);
    ctx.game.combo += 1;
    ctx.game.max_combo = ctx.game.max_combo.max(ctx.game.combo);
    ctx.world.combo_timer = COMBO_WINDOW;
    ctx.emit(GameEvent::BrickDestroyed { id, points });
    if ctx.game.combo >= COMBO_EVENT_THRESHOLD {
        ctx.emit(GameEvent::Combo(ctx.game.combo));
    }

    match kind {
        BrickKind::Explosive => {
            ctx.world.explosions.push(Explosion::new(center));
            ctx.world.shake(0.4);
            ctx.emit(GameEvent::Explosion {
                x: center.x,
                y: center.y,
            });
        }
        BrickKind::Coin => ctx.world.coins.push(Coin {
            pos: center,
            fall_speed: COIN_FALL_SPEED,
            value: COIN_VALUE,
        }),
        _ => {}
    }

    // Coin bricks pay out coins instead of rolling for a drop
    let drops = match kind {
        BrickKind::Coin => false,
        _ => roll_drop(&mut *ctx.rng, ctx.settings.powerup_drop_chance),
    };
    if drops {
        let power_kind = choose_kind(&mut *ctx.rng);
        spawn_power_up(ctx, power_kind, center);
    }

    ctx.world.shake(0.05);
    burst(ctx, center, color, 8);
    true
}

/// Live chain bricks reachable from `start` through touching chain bricks.
///
/// Worklist traversal; `start` itself is excluded.
fn chain_group(bricks: &[Brick], start: usize) -> Vec<usize> {
    let mut visited: HashSet<u32> = HashSet::from([bricks[start].id]);
    let mut work = vec![start];
    let mut group = Vec::new();

    while let Some(i) = work.pop() {
        let rect = bricks[i].rect();
        for (j, other) in bricks.iter().enumerate() {
            if other.kind != BrickKind::Chain || other.destroyed || visited.contains(&other.id) {
                continue;
            }
            if rect.touches(&other.rect(), TOUCH_GAP) {
                visited.insert(other.id);
                group.push(j);
                work.push(j);
            }
        }
    }
    group
}

fn paddle_phase(ctx: &mut TickContext) {
    let rect = ctx.world.paddle.rect();
    let top = rect.top();

    for k in 0..ctx.world.balls.len() {
        let ball = &ctx.world.balls[k];
        if ctx.world.is_captured(ball) || ball.vel.y <= 0.0 {
            continue;
        }
        if !ball_hits_rect(ball.pos, ball.radius, &rect) {
            continue;
        }

        if ctx.world.paddle.has_magnet && ctx.world.captured.is_none() {
            let id = ball.id;
            let rest = ctx.world.paddle.rest_position(ball.radius);
            let ball = &mut ctx.world.balls[k];
            ball.vel = Vec2::ZERO;
            ball.pos = rest;
            ctx.world.captured = Some(id);
            ctx.emit(GameEvent::BallCaptured);
            continue;
        }

        let ball = &mut ctx.world.balls[k];
        let speed = ball.vel.length();
        let angle = bounce_angle(ball.pos.x, &rect);
        ball.vel = enforce_min_vertical(velocity_from_angle(angle, speed), PADDLE_MIN_VERTICAL_RATIO);
        ball.pos.y = top - ball.radius;
        ctx.emit(GameEvent::PaddleBounce);
    }
}

fn laser_phase(ctx: &mut TickContext) {
    let elapsed = ctx.world.elapsed;
    let lasers = std::mem::take(&mut ctx.world.lasers);
    let mut kept = Vec::with_capacity(lasers.len());

    for laser in lasers {
        let hit = ctx
            .world
            .bricks
            .iter()
            .position(|b| b.is_hittable(elapsed) && laser_hits_rect(laser.pos, &b.rect()));
        match hit {
            Some(idx) => damage_brick(ctx, idx, Cause::Laser),
            None => kept.push(laser),
        }
    }
    kept.append(&mut ctx.world.lasers);
    ctx.world.lasers = kept;
}

fn damage_phase(ctx: &mut TickContext) {
    let elapsed = ctx.world.elapsed;
    let one_hit_kill = ctx.world.effects.fireball || ctx.world.effects.bigball;
    let mut used: HashSet<u32> = HashSet::new();

    for k in 0..ctx.world.balls.len() {
        let ball = &ctx.world.balls[k];
        if ctx.world.is_captured(ball) {
            continue;
        }
        let (id, pos, radius) = (ball.id, ball.pos, ball.radius);

        for idx in 0..ctx.world.bricks.len() {
            if !one_hit_kill && used.contains(&id) {
                break;
            }
            let brick = &ctx.world.bricks[idx];
            if !brick.is_hittable(elapsed) || !ball_hits_rect(pos, radius, &brick.rect()) {
                continue;
            }
            used.insert(id);
            if one_hit_kill && !brick.is_indestructible() {
                destroy_brick(ctx, idx, Cause::Ball);
            } else {
                damage_brick(ctx, idx, Cause::Ball);
            }
        }
    }
}

fn explosion_phase(ctx: &mut TickContext) {
    // Blasts spawned during this phase start working next tick
    let count = ctx.world.explosions.len();
    for e in 0..count {
        let blast = ctx.world.explosions[e];
        if !blast.is_alive() {
            continue;
        }
        let reach = blast.reach();
        for idx in 0..ctx.world.bricks.len() {
            let brick = &ctx.world.bricks[idx];
            if brick.destroyed || brick.is_indestructible() {
                continue;
            }
            if brick.center().distance(blast.center) <= reach {
                destroy_brick(ctx, idx, Cause::Explosion);
            }
        }
    }
}

fn bounce_phase(ctx: &mut TickContext, live_at_start: &[usize]) {
    if ctx.world.effects.fireball {
        return;
    }

    for k in 0..ctx.world.balls.len() {
        if ctx.world.is_captured(&ctx.world.balls[k]) {
            continue;
        }
        for &idx in live_at_start {
            let rect = ctx.world.bricks[idx].rect();
            let ball = &mut ctx.world.balls[k];
            let (pos, r) = (ball.pos, ball.radius);
            if !ball_hits_rect(pos, r, &rect) {
                continue;
            }

            let overlap_x = (pos.x + r).min(rect.right()) - (pos.x - r).max(rect.left());
            let overlap_y = (pos.y + r).min(rect.bottom()) - (pos.y - r).max(rect.top());
            let center = rect.center();
            let normal = if overlap_x < overlap_y {
                if pos.x < center.x { Vec2::NEG_X } else { Vec2::X }
            } else if pos.y < center.y {
                Vec2::NEG_Y
            } else {
                Vec2::Y
            };

            if ball.vel.dot(normal) < 0.0 {
                ball.vel = reflect_velocity(ball.vel, normal);
            }
            if normal.x < 0.0 {
                ball.pos.x = rect.left() - r;
            } else if normal.x > 0.0 {
                ball.pos.x = rect.right() + r;
            } else if normal.y < 0.0 {
                ball.pos.y = rect.top() - r;
            } else {
                ball.pos.y = rect.bottom() + r;
            }
            break;
        }
    }
}

fn pickup_phase(ctx: &mut TickContext) {
    let paddle = ctx.world.paddle.rect();

    let mut caught = Vec::new();
    let power_ups = std::mem::take(&mut ctx.world.power_ups);
    for p in power_ups {
        if p.rect().overlaps(&paddle) {
            caught.push(p.kind);
        } else if p.rect().top() > FIELD_HEIGHT {
            ctx.emit(GameEvent::PowerUpMissed { kind: p.kind });
        } else {
            ctx.world.power_ups.push(p);
        }
    }
    for kind in caught {
        powerup::apply(ctx, kind);
    }

    let coins = std::mem::take(&mut ctx.world.coins);
    for coin in coins {
        if coin.rect().overlaps(&paddle) {
            ctx.add_coins(coin.value);
            ctx.emit(GameEvent::CoinCollected { value: coin.value });
        } else if coin.rect().top() <= FIELD_HEIGHT {
            ctx.world.coins.push(coin);
        }
    }

    let level_coins = std::mem::take(&mut ctx.world.level_coins);
    for coin in level_coins {
        let touched = ctx
            .world
            .balls
            .iter()
            .any(|b| b.pos.distance(coin.pos) <= b.radius + coin.radius);
        if touched {
            ctx.add_coins(coin.value);
            ctx.emit(GameEvent::CoinCollected { value: coin.value });
            burst(ctx, coin.pos, 0xFFD700, 4);
        } else {
            ctx.world.level_coins.push(coin);
        }
    }
}

/// Cosmetic particle spray
fn burst(ctx: &mut TickContext, at: Vec2, color: u32, count: usize) {
    for _ in 0..count {
        let angle: f32 = ctx.rng.random_range(0.0..std::f32::consts::TAU);
        let speed: f32 = ctx.rng.random_range(40.0..160.0);
        ctx.world.push_particle(Particle {
            pos: at,
            vel: Vec2::from_angle(angle) * speed,
            color,
            life: 1.0,
        });
    }
}
