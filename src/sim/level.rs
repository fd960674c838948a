//! Level lifecycle
//!
//! Catalog contract plus `seed_level`, which replaces the whole simulation
//! world with a fresh layout for one level.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{
    Brick, BrickKind, INDESTRUCTIBLE_HITS, LevelCoin, Oscillation, SimulationState,
};
use crate::consts::*;

/// Oscillation parameters for a moving brick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveSpec {
    /// px/s
    pub speed: f32,
    /// Max offset either side of the start x
    pub range: f32,
}

impl Default for MoveSpec {
    fn default() -> Self {
        Self {
            speed: 60.0,
            range: 40.0,
        }
    }
}

fn default_hits() -> u32 {
    1
}

fn default_color() -> u32 {
    0x4DA6FF
}

/// One brick in a level layout (top-left position)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_color")]
    pub color: u32,
    #[serde(default)]
    pub kind: BrickKind,
    #[serde(default = "default_hits")]
    pub hits: u32,
    #[serde(default)]
    pub motion: Option<MoveSpec>,
}

/// A level as supplied by a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    #[serde(default)]
    pub theme: String,
    /// Launch speed in px/s
    pub ball_speed: f32,
    pub bricks: Vec<BrickSpec>,
}

/// Source of level layouts
pub trait LevelCatalog {
    fn total_levels(&self) -> u32;

    /// Layout for 1-based level `n`; the engine clamps `n` to
    /// `1..=total_levels()` before asking
    fn level(&self, n: u32) -> LevelConfig;
}

/// Static coins placed for a 1-based level
pub fn level_coin_count(level: u32) -> usize {
    3 + (level / 50) as usize
}

/// Replace `world` with a fresh instance of `config`.
///
/// Effects, timers and every entity pool start empty; a single captured
/// ball waits on the centred paddle.
pub fn seed_level(world: &mut SimulationState, config: &LevelConfig, level: u32, rng: &mut impl Rng) {
    *world = SimulationState::for_level(config.ball_speed.max(1.0));

    let ghost_cycle = GHOST_SOLID_TIME + GHOST_PHASED_TIME;
    for (i, spec) in config.bricks.iter().enumerate() {
        let id = world.next_entity_id();
        let hits = match spec.kind {
            BrickKind::Indestructible => INDESTRUCTIBLE_HITS,
            _ => spec.hits.max(1),
        };
        let motion = match (spec.motion, spec.kind) {
            (Some(m), _) => Some(m),
            (None, BrickKind::Moving) => Some(MoveSpec::default()),
            (None, _) => None,
        }
        .map(|m| Oscillation {
            original_x: spec.x,
            speed: m.speed,
            range: m.range,
            direction: 1.0,
        });
        let phase = match spec.kind {
            BrickKind::Ghost => rng.random_range(0.0..ghost_cycle),
            BrickKind::Rainbow => i as f32 * 0.25,
            _ => 0.0,
        };

        world.bricks.push(Brick {
            id,
            pos: Vec2::new(spec.x, spec.y),
            size: Vec2::new(spec.width, spec.height),
            hits,
            max_hits: hits,
            color: spec.color,
            destroyed: false,
            kind: spec.kind,
            motion,
            phase,
        });
    }

    place_level_coins(world, level, rng);
    world.spawn_captured_ball();
    world.clearable_remaining = world.clearable_bricks();

    log::info!(
        "Level {} \"{}\" seeded: {} bricks ({} clearable), speed {:.0}",
        level,
        config.name,
        world.bricks.len(),
        world.clearable_remaining,
        world.level_speed
    );
}

/// Scatter level coins through the open band between bricks and paddle
fn place_level_coins(world: &mut SimulationState, level: u32, rng: &mut impl Rng) {
    let lowest_brick = world
        .bricks
        .iter()
        .map(|b| b.rect().bottom())
        .fold(0.0_f32, f32::max);
    let hi = PADDLE_Y - 80.0;
    let lo = (lowest_brick + 30.0).min(hi - 40.0);
    let margin = LEVEL_COIN_RADIUS + 20.0;

    for _ in 0..level_coin_count(level) {
        let pos = Vec2::new(
            rng.random_range(margin..FIELD_WIDTH - margin),
            rng.random_range(lo..hi),
        );
        world.level_coins.push(LevelCoin {
            pos,
            radius: LEVEL_COIN_RADIUS,
            value: LEVEL_COIN_VALUE,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spec(kind: BrickKind, x: f32, y: f32) -> BrickSpec {
        BrickSpec {
            x,
            y,
            width: 40.0,
            height: 15.0,
            color: 0xFFFFFF,
            kind,
            hits: 2,
            motion: None,
        }
    }

    fn config() -> LevelConfig {
        LevelConfig {
            name: "test".into(),
            theme: "classic".into(),
            ball_speed: 320.0,
            bricks: vec![
                spec(BrickKind::Normal, 10.0, 60.0),
                spec(BrickKind::Indestructible, 60.0, 60.0),
                spec(BrickKind::Moving, 110.0, 60.0),
                spec(BrickKind::Ghost, 160.0, 60.0),
            ],
        }
    }

    #[test]
    fn test_seed_builds_bricks_and_one_captured_ball() {
        let mut world = SimulationState::default();
        let mut rng = Pcg32::seed_from_u64(3);
        seed_level(&mut world, &config(), 1, &mut rng);

        assert_eq!(world.bricks.len(), 4);
        assert_eq!(world.balls.len(), 1);
        assert_eq!(world.captured, Some(world.balls[0].id));
        assert_eq!(world.balls[0].vel, Vec2::ZERO);
        assert_eq!(world.level_speed, 320.0);
        assert_eq!(world.clearable_remaining, 3);

        assert_eq!(world.bricks[0].hits, 2);
        assert_eq!(world.bricks[1].hits, INDESTRUCTIBLE_HITS);
        let motion = world.bricks[2].motion.expect("moving brick gets default motion");
        assert_eq!(motion.original_x, 110.0);
        assert!(world.bricks[0].motion.is_none());
        let cycle = GHOST_SOLID_TIME + GHOST_PHASED_TIME;
        assert!((0.0..cycle).contains(&world.bricks[3].phase));
    }

    #[test]
    fn test_reseed_clears_previous_level() {
        let mut world = SimulationState::default();
        let mut rng = Pcg32::seed_from_u64(3);
        seed_level(&mut world, &config(), 1, &mut rng);
        world.effects.fireball = true;
        world.paddle.set_width(150.0);
        world.bricks[0].destroyed = true;
        world.lasers.push(crate::sim::state::Laser { pos: Vec2::ZERO });
        world.powerup_idle = 40.0;

        seed_level(&mut world, &config(), 1, &mut rng);
        assert!(!world.effects.fireball);
        assert_eq!(world.paddle.width, PADDLE_BASE_WIDTH);
        assert!(world.bricks.iter().all(|b| !b.destroyed));
        assert!(world.lasers.is_empty());
        assert_eq!(world.powerup_idle, 0.0);
        assert_eq!(world.balls.len(), 1);
    }

    #[test]
    fn test_level_coins_scale_and_sit_below_bricks() {
        assert_eq!(level_coin_count(1), 3);
        assert_eq!(level_coin_count(49), 3);
        assert_eq!(level_coin_count(50), 4);
        assert_eq!(level_coin_count(120), 5);

        let mut world = SimulationState::default();
        let mut rng = Pcg32::seed_from_u64(11);
        seed_level(&mut world, &config(), 100, &mut rng);
        assert_eq!(world.level_coins.len(), 5);
        for coin in &world.level_coins {
            assert!(coin.pos.y >= 75.0 + 30.0);
            assert!(coin.pos.y < PADDLE_Y - 80.0);
            assert!(coin.pos.x > 0.0 && coin.pos.x < FIELD_WIDTH);
        }
    }

    #[test]
    fn test_brick_spec_json_defaults() {
        let json = r#"{"x": 1, "y": 2, "width": 30, "height": 10}"#;
        let spec: BrickSpec = serde_json::from_str(json).expect("valid brick");
        assert_eq!(spec.kind, BrickKind::Normal);
        assert_eq!(spec.hits, 1);
        assert!(spec.motion.is_none());

        let json = r#"{"x": 1, "y": 2, "width": 30, "height": 10, "kind": "moving",
                       "motion": {"speed": 30, "range": 10}}"#;
        let spec: BrickSpec = serde_json::from_str(json).expect("valid brick");
        assert_eq!(spec.kind, BrickKind::Moving);
        assert_eq!(spec.motion, Some(MoveSpec { speed: 30.0, range: 10.0 }));
    }
}
