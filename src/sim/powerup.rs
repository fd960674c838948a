//! Power-up policy
//!
//! Drop rolls, weighted type selection, and the dispatch table that says
//! what each kind does, how long it lasts and which task undoes it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::TickContext;
use super::events::GameEvent;
use super::geometry::{enforce_min_vertical, velocity_from_angle, with_speed};
use super::schedule::{Task, TimerSlot};
use super::state::{Ball, Carrier, Laser, PowerUp};
use crate::consts::*;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    Widen,
    Multiball,
    Sevenball,
    Bigball,
    Slow,
    Speedup,
    Extralife,
    Fireball,
    Laser,
    Magnet,
    Shield,
    Shrink,
    Autopaddle,
    Shock,
}

/// When and how a timed effect is undone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expiry {
    pub slot: TimerSlot,
    pub duration: f32,
    pub task: Task,
}

/// One row of the dispatch table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSpec {
    pub kind: PowerUpKind,
    /// Selection weight (the column sums to 1)
    pub weight: f64,
    /// Negative kinds get the "bad" cue and no coin reward
    pub positive: bool,
    pub expiry: Option<Expiry>,
}

const fn timed(slot: TimerSlot, duration: f32, task: Task) -> Option<Expiry> {
    Some(Expiry {
        slot,
        duration,
        task,
    })
}

/// Indexed by `PowerUpKind as usize`
pub const EFFECT_TABLE: [EffectSpec; 14] = [
    EffectSpec {
        kind: PowerUpKind::Widen,
        weight: 0.12,
        positive: true,
        expiry: timed(TimerSlot::PaddleWidth, 10.0, Task::RevertPaddleWidth),
    },
    EffectSpec {
        kind: PowerUpKind::Multiball,
        weight: 0.10,
        positive: true,
        expiry: None,
    },
    EffectSpec {
        kind: PowerUpKind::Sevenball,
        weight: 0.04,
        positive: true,
        expiry: None,
    },
    EffectSpec {
        kind: PowerUpKind::Bigball,
        weight: 0.07,
        positive: true,
        expiry: timed(TimerSlot::BigBall, 15.0, Task::EndBigBall),
    },
    EffectSpec {
        kind: PowerUpKind::Slow,
        weight: 0.08,
        positive: true,
        expiry: timed(TimerSlot::BallSpeed, 15.0, Task::RevertBallSpeed),
    },
    EffectSpec {
        kind: PowerUpKind::Speedup,
        weight: 0.07,
        positive: false,
        expiry: timed(TimerSlot::BallSpeed, 15.0, Task::RevertBallSpeed),
    },
    EffectSpec {
        kind: PowerUpKind::Extralife,
        weight: 0.04,
        positive: true,
        expiry: None,
    },
    EffectSpec {
        kind: PowerUpKind::Fireball,
        weight: 0.06,
        positive: true,
        expiry: timed(TimerSlot::Fireball, 10.0, Task::EndFireball),
    },
    EffectSpec {
        kind: PowerUpKind::Laser,
        weight: 0.08,
        positive: true,
        expiry: timed(TimerSlot::Laser, 7.0, Task::EndLaser),
    },
    EffectSpec {
        kind: PowerUpKind::Magnet,
        weight: 0.07,
        positive: true,
        expiry: timed(TimerSlot::Magnet, 10.0, Task::EndMagnet),
    },
    EffectSpec {
        kind: PowerUpKind::Shield,
        weight: 0.08,
        positive: true,
        expiry: timed(TimerSlot::Shield, 10.0, Task::EndShield),
    },
    EffectSpec {
        kind: PowerUpKind::Shrink,
        weight: 0.07,
        positive: false,
        expiry: timed(TimerSlot::PaddleWidth, 10.0, Task::RevertPaddleWidth),
    },
    EffectSpec {
        kind: PowerUpKind::Autopaddle,
        weight: 0.06,
        positive: true,
        expiry: timed(TimerSlot::AutoPaddle, 10.0, Task::EndAutoPaddle),
    },
    EffectSpec {
        kind: PowerUpKind::Shock,
        weight: 0.06,
        positive: true,
        expiry: timed(TimerSlot::Shock, 10.0, Task::EndShock),
    },
];

/// Fan half-angle for sevenball siblings (70° total)
const SEVENBALL_HALF_FAN: f32 = 35.0 * std::f32::consts::PI / 180.0;

impl PowerUpKind {
    pub fn spec(self) -> &'static EffectSpec {
        &EFFECT_TABLE[self as usize]
    }

    pub fn is_negative(self) -> bool {
        !self.spec().positive
    }
}

/// Bernoulli drop roll for one destroyed brick
pub fn roll_drop(rng: &mut impl Rng, chance: f64) -> bool {
    rng.random_bool(chance.clamp(0.0, 1.0))
}

/// Weighted choice from one uniform draw in [0, 1)
pub fn kind_for_draw(draw: f64) -> PowerUpKind {
    let mut cumulative = 0.0;
    for spec in &EFFECT_TABLE {
        cumulative += spec.weight;
        if draw < cumulative {
            return spec.kind;
        }
    }
    // Rounding can leave the last bucket a hair short of 1.0
    PowerUpKind::Widen
}

pub fn choose_kind(rng: &mut impl Rng) -> PowerUpKind {
    kind_for_draw(rng.random::<f64>())
}

/// Drop a capsule at `pos`; resets the carrier idle timer
pub fn spawn_power_up(ctx: &mut TickContext, kind: PowerUpKind, pos: Vec2) {
    let id = ctx.world.next_entity_id();
    ctx.world.power_ups.push(PowerUp::new(id, kind, pos));
    ctx.world.powerup_idle = 0.0;
}

/// Apply a caught power-up and schedule its reversal
pub fn apply(ctx: &mut TickContext, kind: PowerUpKind) {
    let spec = kind.spec();
    log::debug!("Power-up {:?} applied", kind);

    match kind {
        PowerUpKind::Widen => {
            let width = ctx.world.paddle.width + 30.0;
            ctx.world.paddle.set_width(width);
        }
        PowerUpKind::Shrink => {
            let width = ctx.world.paddle.width - 20.0;
            ctx.world.paddle.set_width(width);
        }
        PowerUpKind::Multiball => spawn_siblings(ctx, |vel, speed| vec![upward_sibling(vel, speed)]),
        PowerUpKind::Sevenball => spawn_siblings(ctx, |_, speed| {
            (0..6)
                .map(|i| {
                    let angle = -SEVENBALL_HALF_FAN + i as f32 * (2.0 * SEVENBALL_HALF_FAN / 5.0);
                    velocity_from_angle(angle, speed)
                })
                .collect()
        }),
        PowerUpKind::Bigball => {
            ctx.world.effects.bigball = true;
            let radius = ctx.world.ball_radius();
            for ball in &mut ctx.world.balls {
                ball.radius = radius;
            }
        }
        PowerUpKind::Slow | PowerUpKind::Speedup => {
            ctx.world.effects.speed_factor = if kind == PowerUpKind::Slow { 0.7 } else { 1.3 };
            let speed = ctx.world.ball_speed();
            for ball in &mut ctx.world.balls {
                ball.vel = with_speed(ball.vel, speed);
            }
        }
        PowerUpKind::Extralife => {
            ctx.game.lives += 1;
            ctx.emit(GameEvent::ExtraLife);
        }
        PowerUpKind::Fireball => ctx.world.effects.fireball = true,
        PowerUpKind::Laser => {
            ctx.world.paddle.has_laser = true;
            fire_laser_pair(ctx);
            ctx.scheduler
                .schedule_slot(TimerSlot::LaserCadence, LASER_INTERVAL, Task::LaserVolley);
        }
        PowerUpKind::Magnet => ctx.world.paddle.has_magnet = true,
        PowerUpKind::Shield => ctx.world.paddle.has_shield = true,
        PowerUpKind::Autopaddle => ctx.world.effects.autopaddle = true,
        PowerUpKind::Shock => ctx.world.effects.shock = true,
    }

    if let Some(expiry) = spec.expiry {
        ctx.scheduler
            .schedule_slot(expiry.slot, expiry.duration, expiry.task);
    }
    if spec.positive {
        ctx.add_coins(POWERUP_COIN_REWARD);
    }
    ctx.emit(GameEvent::PowerUpCollected { kind });
}

/// Undo a timed effect (or run the laser cadence)
pub fn expire(ctx: &mut TickContext, task: Task) {
    let expired = match task {
        Task::RevertPaddleWidth => {
            ctx.world.paddle.set_width(PADDLE_BASE_WIDTH);
            None
        }
        Task::RevertBallSpeed => {
            ctx.world.effects.speed_factor = 1.0;
            let speed = ctx.world.level_speed;
            for ball in &mut ctx.world.balls {
                ball.vel = with_speed(ball.vel, speed);
            }
            None
        }
        Task::EndBigBall => {
            ctx.world.effects.bigball = false;
            for ball in &mut ctx.world.balls {
                ball.radius = BALL_RADIUS;
            }
            Some(PowerUpKind::Bigball)
        }
        Task::EndFireball => {
            ctx.world.effects.fireball = false;
            Some(PowerUpKind::Fireball)
        }
        Task::EndLaser => {
            ctx.world.paddle.has_laser = false;
            ctx.scheduler.cancel_slot(TimerSlot::LaserCadence);
            Some(PowerUpKind::Laser)
        }
        Task::LaserVolley => {
            if ctx.world.paddle.has_laser {
                fire_laser_pair(ctx);
                ctx.scheduler
                    .schedule_slot(TimerSlot::LaserCadence, LASER_INTERVAL, Task::LaserVolley);
            }
            return;
        }
        Task::EndMagnet => {
            ctx.world.paddle.has_magnet = false;
            Some(PowerUpKind::Magnet)
        }
        Task::EndShield => {
            ctx.world.paddle.has_shield = false;
            Some(PowerUpKind::Shield)
        }
        Task::EndAutoPaddle => {
            ctx.world.effects.autopaddle = false;
            Some(PowerUpKind::Autopaddle)
        }
        Task::EndShock => {
            ctx.world.effects.shock = false;
            Some(PowerUpKind::Shock)
        }
        // Owned by the tick driver
        Task::CompleteLevel => return,
    };
    log::debug!("Timed effect {:?} expired", task);
    if let Some(kind) = expired {
        ctx.emit(GameEvent::PowerUpExpired { kind });
    }
}

/// Two bolts from the paddle's edges
pub fn fire_laser_pair(ctx: &mut TickContext) {
    let paddle = &ctx.world.paddle;
    let top = paddle.top();
    let half = paddle.width / 2.0 - 4.0;
    let (left, right) = (paddle.x - half, paddle.x + half);
    ctx.world.lasers.push(Laser {
        pos: Vec2::new(left, top),
    });
    ctx.world.lasers.push(Laser {
        pos: Vec2::new(right, top),
    });
    ctx.emit(GameEvent::LaserFired);
}

/// Mirror a ball's heading horizontally and force it upward
fn upward_sibling(vel: Vec2, speed: f32) -> Vec2 {
    let base = if vel.length_squared() > 0.0 {
        Vec2::new(-vel.x, -vel.y.abs())
    } else {
        velocity_from_angle(0.5, 1.0)
    };
    enforce_min_vertical(with_speed(base, speed), MIN_VERTICAL_RATIO)
}

/// Every existing ball spawns the siblings `make` returns, up to `MAX_BALLS`
fn spawn_siblings(ctx: &mut TickContext, make: impl Fn(Vec2, f32) -> Vec<Vec2>) {
    let default_speed = ctx.world.ball_speed();
    let parents: Vec<(Vec2, Vec2)> = ctx.world.balls.iter().map(|b| (b.pos, b.vel)).collect();
    let radius = ctx.world.ball_radius();

    'parents: for (pos, vel) in parents {
        let speed = if vel.length_squared() > 0.0 {
            vel.length()
        } else {
            default_speed
        };
        for sibling_vel in make(vel, speed) {
            if ctx.world.balls.len() >= MAX_BALLS {
                log::debug!("Ball cap of {} reached", MAX_BALLS);
                break 'parents;
            }
            let id = ctx.world.next_entity_id();
            ctx.world.balls.push(Ball::new(id, pos, sibling_vel, radius));
        }
    }
}

/// Fly the carrier plane; spawn one when power-ups have been scarce
pub fn update_carrier(ctx: &mut TickContext, dt: f32) {
    ctx.world.powerup_idle += dt;

    if ctx.world.carrier.is_none() && ctx.world.powerup_idle >= ctx.settings.carrier_interval_secs {
        log::debug!("Carrier spawned after {:.1}s without drops", ctx.world.powerup_idle);
        ctx.world.carrier = Some(Carrier {
            pos: Vec2::new(-CARRIER_WIDTH / 2.0, CARRIER_Y),
            speed: CARRIER_SPEED,
            dropped: false,
        });
        ctx.world.powerup_idle = 0.0;
        ctx.emit(GameEvent::CarrierSpawned);
    }

    let Some(mut carrier) = ctx.world.carrier.take() else {
        return;
    };
    carrier.pos.x += carrier.speed * dt;
    if !carrier.dropped && carrier.pos.x >= FIELD_WIDTH / 2.0 {
        carrier.dropped = true;
        let kind = choose_kind(&mut *ctx.rng);
        spawn_power_up(ctx, kind, carrier.pos);
    }
    if carrier.pos.x - CARRIER_WIDTH / 2.0 <= FIELD_WIDTH {
        ctx.world.carrier = Some(carrier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::Harness;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_table_matches_enum_order_and_weights_sum_to_one() {
        for (i, spec) in EFFECT_TABLE.iter().enumerate() {
            assert_eq!(spec.kind as usize, i);
        }
        let total: f64 = EFFECT_TABLE.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_kind_for_draw_walks_cumulative_weights() {
        assert_eq!(kind_for_draw(0.0), PowerUpKind::Widen);
        assert_eq!(kind_for_draw(0.119), PowerUpKind::Widen);
        assert_eq!(kind_for_draw(0.12), PowerUpKind::Multiball);
        assert_eq!(kind_for_draw(0.9999), PowerUpKind::Shock);
        // Fallback guard
        assert_eq!(kind_for_draw(1.5), PowerUpKind::Widen);
    }

    #[test]
    fn test_negative_kinds() {
        let negative: Vec<_> = EFFECT_TABLE
            .iter()
            .filter(|s| !s.positive)
            .map(|s| s.kind)
            .collect();
        assert_eq!(negative, vec![PowerUpKind::Speedup, PowerUpKind::Shrink]);
    }

    #[test]
    fn test_roll_drop_extremes() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!((0..100).all(|_| !roll_drop(&mut rng, 0.0)));
        assert!((0..100).all(|_| roll_drop(&mut rng, 1.0)));
    }

    #[test]
    fn test_widen_twice_caps_and_reverts_once() {
        let mut h = Harness::new();
        for _ in 0..5 {
            apply(&mut h.ctx(), PowerUpKind::Widen);
        }
        assert_eq!(h.world.paddle.width, PADDLE_MAX_WIDTH);
        assert_eq!(h.scheduler.pending(), 1);

        assert_eq!(h.run_timers(10.5), 1);
        assert_eq!(h.world.paddle.width, PADDLE_BASE_WIDTH);
        assert_eq!(h.run_timers(20.0), 0);
    }

    #[test]
    fn test_shrink_floors_at_min_width() {
        let mut h = Harness::new();
        for _ in 0..4 {
            apply(&mut h.ctx(), PowerUpKind::Shrink);
        }
        assert_eq!(h.world.paddle.width, PADDLE_MIN_WIDTH);
        // Negative: no coins
        assert_eq!(h.game.coins, 0);
    }

    #[test]
    fn test_positive_catch_awards_coins() {
        let mut h = Harness::new();
        apply(&mut h.ctx(), PowerUpKind::Magnet);
        assert_eq!(h.game.coins, u64::from(POWERUP_COIN_REWARD));
        assert!(h.world.paddle.has_magnet);
        h.run_timers(10.1);
        assert!(!h.world.paddle.has_magnet);
    }

    #[test]
    fn test_shield_reacquire_restarts_timer() {
        let mut h = Harness::new();
        apply(&mut h.ctx(), PowerUpKind::Shield);
        h.run_timers(8.0);
        apply(&mut h.ctx(), PowerUpKind::Shield);
        h.run_timers(8.0);
        assert!(h.world.paddle.has_shield, "restarted timer must not expire at 10s");
        h.run_timers(2.5);
        assert!(!h.world.paddle.has_shield);
    }

    #[test]
    fn test_multiball_spawns_upward_sibling() {
        let mut h = Harness::new();
        let vel = Vec2::new(120.0, 260.0);
        h.add_ball(Vec2::new(200.0, 300.0), vel);
        apply(&mut h.ctx(), PowerUpKind::Multiball);

        assert_eq!(h.world.balls.len(), 2);
        assert_eq!(h.world.balls[0].vel, vel);
        assert!(h.world.balls[1].vel.y < 0.0);
        assert!((h.world.balls[1].vel.length() - vel.length()).abs() < 1e-3);
    }

    #[test]
    fn test_sevenball_fans_upward() {
        let mut h = Harness::new();
        h.add_ball(Vec2::new(200.0, 300.0), Vec2::new(0.0, 300.0));
        apply(&mut h.ctx(), PowerUpKind::Sevenball);
        assert_eq!(h.world.balls.len(), 7);
        for ball in &h.world.balls[1..] {
            assert!(ball.vel.y < 0.0);
            let from_vertical = ball.vel.x.atan2(-ball.vel.y).abs();
            assert!(from_vertical <= SEVENBALL_HALF_FAN + 1e-4);
        }
    }

    #[test]
    fn test_sevenball_stops_at_ball_cap() {
        let mut h = Harness::new();
        h.add_ball(Vec2::new(200.0, 300.0), Vec2::new(0.0, 300.0));
        apply(&mut h.ctx(), PowerUpKind::Sevenball);
        apply(&mut h.ctx(), PowerUpKind::Sevenball);
        assert_eq!(h.world.balls.len(), 49);

        apply(&mut h.ctx(), PowerUpKind::Sevenball);
        assert_eq!(h.world.balls.len(), MAX_BALLS);
        apply(&mut h.ctx(), PowerUpKind::Multiball);
        assert_eq!(h.world.balls.len(), MAX_BALLS);

        let ids: std::collections::HashSet<u32> = h.world.balls.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), MAX_BALLS);
    }

    #[test]
    fn test_slow_then_revert_restores_level_speed() {
        let mut h = Harness::new();
        h.world.level_speed = 300.0;
        h.add_ball(Vec2::ZERO, Vec2::new(0.0, -300.0));
        // A parked ball must not turn into NaN
        h.add_ball(Vec2::ZERO, Vec2::ZERO);

        apply(&mut h.ctx(), PowerUpKind::Slow);
        assert!((h.world.balls[0].vel.length() - 210.0).abs() < 1e-3);
        apply(&mut h.ctx(), PowerUpKind::Speedup);
        assert!((h.world.balls[0].vel.length() - 390.0).abs() < 1e-3);

        h.run_timers(15.1);
        assert!((h.world.balls[0].vel.length() - 300.0).abs() < 1e-3);
        assert_eq!(h.world.balls[1].vel, Vec2::ZERO);
        assert_eq!(h.world.effects.speed_factor, 1.0);
    }

    #[test]
    fn test_bigball_scales_and_reverts() {
        let mut h = Harness::new();
        h.add_ball(Vec2::ZERO, Vec2::new(0.0, -300.0));
        apply(&mut h.ctx(), PowerUpKind::Bigball);
        apply(&mut h.ctx(), PowerUpKind::Bigball);
        assert!((h.world.balls[0].radius - BALL_RADIUS * BIG_BALL_SCALE).abs() < 1e-5);
        h.run_timers(15.1);
        assert_eq!(h.world.balls[0].radius, BALL_RADIUS);
        assert!(!h.world.effects.bigball);
    }

    #[test]
    fn test_laser_fires_now_and_on_cadence_until_expiry() {
        let mut h = Harness::new();
        apply(&mut h.ctx(), PowerUpKind::Laser);
        assert_eq!(h.world.lasers.len(), 2);

        h.run_timers(0.31);
        assert_eq!(h.world.lasers.len(), 4);

        // Run past the 7s expiry in small steps
        for _ in 0..80 {
            h.run_timers(0.1);
        }
        assert!(!h.world.paddle.has_laser);
        let fired = h.world.lasers.len();
        h.run_timers(1.0);
        assert_eq!(h.world.lasers.len(), fired);
        assert!(!h.scheduler.is_slot_pending(TimerSlot::LaserCadence));
    }

    #[test]
    fn test_extralife() {
        let mut h = Harness::new();
        apply(&mut h.ctx(), PowerUpKind::Extralife);
        assert_eq!(h.game.lives, 4);
        assert!(h.report.events.contains(&GameEvent::ExtraLife));
    }

    #[test]
    fn test_carrier_drops_once_at_midfield() {
        let mut h = Harness::new();
        h.settings.carrier_interval_secs = 1.0;
        let dt = 1.0 / 60.0;
        for _ in 0..61 {
            update_carrier(&mut h.ctx(), dt);
        }
        assert!(h.world.carrier.is_some());
        assert!(h.report.events.contains(&GameEvent::CarrierSpawned));

        // No second plane while this one crosses the whole field
        h.settings.carrier_interval_secs = 1000.0;
        for _ in 0..(60 * 5) {
            update_carrier(&mut h.ctx(), dt);
        }
        assert!(h.world.carrier.is_none());
        assert_eq!(h.world.power_ups.len(), 1);
        let drop = &h.world.power_ups[0];
        assert!((drop.pos.x - FIELD_WIDTH / 2.0).abs() < CARRIER_SPEED * dt + 1e-3);
    }
}
