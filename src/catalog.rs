//! Level catalogs
//!
//! `StaticCatalog` serves hand-authored layouts loaded from JSON.
//! `GeneratedCatalog` builds every level on demand from a seed, ramping
//! difficulty and unlocking brick kinds as the level number climbs.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::FIELD_WIDTH;
use crate::error::Error;
use crate::sim::{BrickKind, BrickSpec, LevelCatalog, LevelConfig, MoveSpec};

/// Levels in the default generated campaign
pub const DEFAULT_LEVELS: u32 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    levels: Vec<LevelConfig>,
}

/// Catalog backed by a fixed list of layouts
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    levels: Vec<LevelConfig>,
}

impl StaticCatalog {
    /// Validate and wrap a list of levels
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, Error> {
        if levels.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        for (i, level) in levels.iter().enumerate() {
            validate(i as u32 + 1, level)?;
        }
        Ok(Self { levels })
    }

    /// Parse `{"levels": [...]}`
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let file: CatalogFile = serde_json::from_str(json).map_err(Error::Catalog)?;
        let catalog = Self::new(file.levels)?;
        log::info!("Loaded {} levels", catalog.levels.len());
        Ok(catalog)
    }

    pub fn to_json(&self) -> String {
        let file = CatalogFile {
            levels: self.levels.clone(),
        };
        serde_json::to_string_pretty(&file).unwrap_or_default()
    }
}

impl LevelCatalog for StaticCatalog {
    fn total_levels(&self) -> u32 {
        self.levels.len() as u32
    }

    fn level(&self, n: u32) -> LevelConfig {
        let idx = n.clamp(1, self.total_levels()) as usize - 1;
        self.levels[idx].clone()
    }
}

fn validate(level: u32, config: &LevelConfig) -> Result<(), Error> {
    if !(config.ball_speed.is_finite() && config.ball_speed > 0.0) {
        return Err(Error::InvalidLevel {
            level,
            reason: "ball speed must be positive",
        });
    }
    for (index, brick) in config.bricks.iter().enumerate() {
        let invalid = |reason| Error::InvalidBrick {
            level,
            index,
            reason,
        };
        if !(brick.x.is_finite() && brick.y.is_finite()) {
            return Err(invalid("position is not finite"));
        }
        if !(brick.width > 0.0 && brick.height > 0.0) {
            return Err(invalid("size must be positive"));
        }
        if brick.hits == 0 && brick.kind != BrickKind::Indestructible {
            return Err(invalid("hits must be at least 1"));
        }
    }
    if !config
        .bricks
        .iter()
        .any(|b| b.kind != BrickKind::Indestructible)
    {
        return Err(Error::InvalidLevel {
            level,
            reason: "no destructible bricks",
        });
    }
    Ok(())
}

const THEMES: [&str; 6] = ["classic", "neon", "forest", "ocean", "lava", "space"];

const ROW_COLORS: [u32; 8] = [
    0xFF4D4D, 0xFF944D, 0xFFD24D, 0x7BD84D, 0x4DD8C0, 0x4D8CFF, 0x9B4DFF, 0xFF4DB8,
];

const COLUMNS: usize = 8;
const BRICK_WIDTH: f32 = 44.0;
const BRICK_HEIGHT: f32 = 18.0;
const BRICK_GAP: f32 = 4.0;
const TOP_MARGIN: f32 = 60.0;
const BASE_SPEED: f32 = 300.0;
const MAX_SPEED: f32 = 480.0;

/// Procedural campaign: layouts are derived from `(seed, level)` only
#[derive(Debug, Clone)]
pub struct GeneratedCatalog {
    total: u32,
    seed: u64,
}

impl Default for GeneratedCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_LEVELS, 0x5EED_B41C)
    }
}

impl GeneratedCatalog {
    pub fn new(total: u32, seed: u64) -> Self {
        Self {
            total: total.max(1),
            seed,
        }
    }

    /// Launch speed ramps linearly across the campaign
    pub fn ball_speed(&self, level: u32) -> f32 {
        if self.total <= 1 {
            return BASE_SPEED;
        }
        let t = (level.clamp(1, self.total) - 1) as f32 / (self.total - 1) as f32;
        BASE_SPEED + (MAX_SPEED - BASE_SPEED) * t
    }

    fn generate(&self, n: u32) -> LevelConfig {
        // Same level, same layout for a given campaign seed
        let level_seed = self
            .seed
            .wrapping_add(u64::from(n).wrapping_mul(2_654_435_761));
        let mut rng = Pcg32::seed_from_u64(level_seed);

        let rows = 3 + (n / 4).min(7) as usize;
        let left = (FIELD_WIDTH - (COLUMNS as f32 * (BRICK_WIDTH + BRICK_GAP) - BRICK_GAP)) / 2.0;
        // Odd levels from 5 on get one sparse oscillating row
        let moving_row = (n >= 5 && n % 2 == 1).then_some(1.min(rows - 1));
        let tough = (n / 15).min(3);

        let mut bricks = Vec::with_capacity(rows * COLUMNS);
        for row in 0..rows {
            let y = TOP_MARGIN + row as f32 * (BRICK_HEIGHT + BRICK_GAP);
            let color = ROW_COLORS[row % ROW_COLORS.len()];

            for col in 0..COLUMNS {
                let x = left + col as f32 * (BRICK_WIDTH + BRICK_GAP);

                if moving_row == Some(row) {
                    // Centred over each column pair so neighbours never meet
                    if col % 2 == 0 {
                        bricks.push(BrickSpec {
                            x: x + (BRICK_WIDTH + BRICK_GAP) / 2.0,
                            y,
                            width: BRICK_WIDTH,
                            height: BRICK_HEIGHT,
                            color,
                            kind: BrickKind::Moving,
                            hits: 1,
                            motion: Some(MoveSpec {
                                speed: 40.0 + n as f32,
                                range: 24.0,
                            }),
                        });
                    }
                    continue;
                }

                // Gaps for variety after the opening level
                if n > 1 && rng.random_bool(0.12) {
                    continue;
                }

                let roll: u32 = rng.random_range(0..100);
                let kind = brick_kind_for(n, roll);
                let hits = match kind {
                    BrickKind::Normal if tough > 0 && rng.random_bool(0.3) => 1 + tough,
                    _ => 1,
                };
                bricks.push(BrickSpec {
                    x,
                    y,
                    width: BRICK_WIDTH,
                    height: BRICK_HEIGHT,
                    color,
                    kind,
                    hits,
                    motion: None,
                });
            }
        }

        // Every level must be clearable
        if !bricks.iter().any(|b| b.kind != BrickKind::Indestructible) {
            match bricks.first_mut() {
                Some(first) => {
                    first.kind = BrickKind::Normal;
                    first.hits = 1;
                }
                None => bricks.push(BrickSpec {
                    x: left,
                    y: TOP_MARGIN,
                    width: BRICK_WIDTH,
                    height: BRICK_HEIGHT,
                    color: ROW_COLORS[0],
                    kind: BrickKind::Normal,
                    hits: 1,
                    motion: None,
                }),
            }
        }

        LevelConfig {
            name: format!("Level {}", n),
            theme: THEMES[((n - 1) / 10) as usize % THEMES.len()].to_string(),
            ball_speed: self.ball_speed(n),
            bricks,
        }
    }
}

impl LevelCatalog for GeneratedCatalog {
    fn total_levels(&self) -> u32 {
        self.total
    }

    fn level(&self, n: u32) -> LevelConfig {
        self.generate(n.clamp(1, self.total))
    }
}

/// Kind for a brick given the level and a 0-99 roll.
/// Kinds unlock as the campaign progresses.
fn brick_kind_for(level: u32, roll: u32) -> BrickKind {
    match roll {
        0..5 if level >= 10 => BrickKind::Indestructible,
        5..12 if level >= 3 => BrickKind::Explosive,
        12..22 if level >= 8 => BrickKind::Chain,
        22..28 if level >= 2 => BrickKind::Coin,
        28..31 if level >= 12 => BrickKind::Rainbow,
        31..37 if level >= 15 => BrickKind::Ghost,
        _ => BrickKind::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_json() -> &'static str {
        r#"{
            "levels": [
                {
                    "name": "Opening",
                    "theme": "classic",
                    "ball_speed": 300,
                    "bricks": [
                        {"x": 20, "y": 60, "width": 40, "height": 16},
                        {"x": 70, "y": 60, "width": 40, "height": 16, "kind": "explosive"}
                    ]
                },
                {
                    "name": "Walls",
                    "ball_speed": 320,
                    "bricks": [
                        {"x": 20, "y": 60, "width": 40, "height": 16, "kind": "indestructible", "hits": 0},
                        {"x": 70, "y": 60, "width": 40, "height": 16, "hits": 3}
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn test_static_catalog_loads_and_clamps() {
        let catalog = StaticCatalog::from_json(layout_json()).expect("valid catalog");
        assert_eq!(catalog.total_levels(), 2);
        assert_eq!(catalog.level(1).name, "Opening");
        assert_eq!(catalog.level(0).name, "Opening");
        assert_eq!(catalog.level(7).name, "Walls");
        assert_eq!(catalog.level(2).bricks[1].hits, 3);
        assert_eq!(catalog.level(1).bricks[1].kind, BrickKind::Explosive);
    }

    #[test]
    fn test_static_catalog_rejects_bad_input() {
        assert!(matches!(
            StaticCatalog::from_json(r#"{"levels": []}"#),
            Err(Error::EmptyCatalog)
        ));
        assert!(matches!(
            StaticCatalog::from_json("{not json"),
            Err(Error::Catalog(_))
        ));

        let zero_width = r#"{"levels": [{"name": "x", "ball_speed": 300,
            "bricks": [{"x": 0, "y": 0, "width": 0, "height": 10}]}]}"#;
        assert!(matches!(
            StaticCatalog::from_json(zero_width),
            Err(Error::InvalidBrick { level: 1, index: 0, .. })
        ));

        let only_walls = r#"{"levels": [{"name": "x", "ball_speed": 300,
            "bricks": [{"x": 0, "y": 0, "width": 10, "height": 10, "kind": "indestructible"}]}]}"#;
        assert!(matches!(
            StaticCatalog::from_json(only_walls),
            Err(Error::InvalidLevel { level: 1, .. })
        ));
    }

    #[test]
    fn test_static_catalog_json_round_trip() {
        let catalog = StaticCatalog::from_json(layout_json()).expect("valid catalog");
        let reloaded = StaticCatalog::from_json(&catalog.to_json()).expect("round trip");
        assert_eq!(reloaded.level(2), catalog.level(2));
    }

    #[test]
    fn test_generated_is_deterministic_per_seed() {
        let a = GeneratedCatalog::new(120, 42);
        let b = GeneratedCatalog::new(120, 42);
        let c = GeneratedCatalog::new(120, 43);
        assert_eq!(a.level(37), b.level(37));
        assert_ne!(a.level(37), c.level(37));
    }

    #[test]
    fn test_generated_speed_ramps() {
        let catalog = GeneratedCatalog::new(101, 1);
        assert_eq!(catalog.level(1).ball_speed, 300.0);
        assert!((catalog.level(51).ball_speed - 390.0).abs() < 1e-3);
        assert_eq!(catalog.level(101).ball_speed, 480.0);
        assert_eq!(catalog.level(500).ball_speed, 480.0);
        assert_eq!(GeneratedCatalog::new(1, 1).level(1).ball_speed, 300.0);
    }

    #[test]
    fn test_generated_unlocks_kinds_gradually() {
        let catalog = GeneratedCatalog::default();
        assert!(catalog
            .level(1)
            .bricks
            .iter()
            .all(|b| b.kind == BrickKind::Normal));

        let kinds_up_to = |last: u32| -> Vec<BrickKind> {
            (1..=last)
                .flat_map(|n| catalog.level(n).bricks)
                .map(|b| b.kind)
                .collect()
        };
        let early = kinds_up_to(7);
        assert!(!early.contains(&BrickKind::Chain));
        assert!(!early.contains(&BrickKind::Indestructible));
        assert!(!early.contains(&BrickKind::Ghost));
        assert!(early.contains(&BrickKind::Moving));

        assert!(kinds_up_to(40).contains(&BrickKind::Ghost));
    }

    #[test]
    fn test_generated_levels_are_clearable_and_in_field() {
        let catalog = GeneratedCatalog::default();
        for n in 1..=catalog.total_levels() {
            let level = catalog.level(n);
            assert!(level.bricks.iter().any(|b| b.kind != BrickKind::Indestructible));
            for brick in &level.bricks {
                let reach = brick.motion.map_or(0.0, |m| m.range);
                assert!(brick.x - reach >= 0.0);
                assert!(brick.x + brick.width + reach <= FIELD_WIDTH);
            }
        }
    }

    #[test]
    fn test_kind_unlock_thresholds() {
        assert_eq!(brick_kind_for(9, 0), BrickKind::Normal);
        assert_eq!(brick_kind_for(10, 0), BrickKind::Indestructible);
        assert_eq!(brick_kind_for(2, 5), BrickKind::Normal);
        assert_eq!(brick_kind_for(3, 5), BrickKind::Explosive);
        assert_eq!(brick_kind_for(2, 25), BrickKind::Coin);
        assert_eq!(brick_kind_for(14, 32), BrickKind::Normal);
        assert_eq!(brick_kind_for(15, 32), BrickKind::Ghost);
        assert_eq!(brick_kind_for(99, 99), BrickKind::Normal);
    }
}
