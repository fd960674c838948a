//! Brick Rush headless demo
//!
//! Plays a generated campaign with a simple autopilot and logs what
//! happens. Usage: `brick-rush [settings.json] [levels]`; set `RUST_LOG`
//! to see the log output.

use std::collections::BTreeMap;

use glam::Vec2;

use brick_rush::consts::*;
use brick_rush::sim::{Engine, GameStatus, LevelCatalog};
use brick_rush::{Error, GeneratedCatalog, Progress, Settings};

/// Give up after ten simulated minutes
const MAX_DEMO_TICKS: u64 = (600.0 / SIM_DT) as u64;

/// Frames between autopilot launches
const SERVE_DELAY_TICKS: u64 = 60;

fn main() {
    env_logger::init();
    log::info!("Brick Rush (headless) starting...");

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::from_json(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    let levels: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    let mut progress = Progress::new();
    let catalog = GeneratedCatalog::new(levels, settings.seed);
    let mut engine = Engine::new(catalog, settings);
    engine.set_high_score(progress.high_score);
    engine.start(1);

    let mut cues = BTreeMap::new();
    let mut ticks: u64 = 0;
    let mut serve_wait: u64 = 0;

    while ticks < MAX_DEMO_TICKS {
        autopilot(&mut engine, &mut serve_wait);
        let report = engine.tick(SIM_DT);
        for cue in report.events.iter().filter_map(|e| e.sound_cue()) {
            *cues.entry(format!("{:?}", cue)).or_insert(0u32) += 1;
        }
        ticks += 1;

        match engine.game().status {
            GameStatus::LevelComplete => {
                progress.record(engine.game());
                engine.next_level();
            }
            GameStatus::GameOver | GameStatus::Won => break,
            _ => {}
        }
    }
    if ticks >= MAX_DEMO_TICKS {
        log::warn!("Demo stopped after {} ticks", ticks);
    }

    progress.record(engine.game());
    let game = engine.game();
    log::info!(
        "Finished: {:?} on level {} with score {} ({} coins, best combo {})",
        game.status,
        game.level,
        game.score,
        game.coins,
        game.max_combo
    );
    for (cue, count) in &cues {
        log::debug!("{:>14}: {}", cue, count);
    }
    println!("{}", progress.to_json());
    Ok(())
}

/// Serve toward the nearest live brick, then chase the lowest falling ball
fn autopilot<C: LevelCatalog>(engine: &mut Engine<C>, serve_wait: &mut u64) {
    let world = engine.world();

    if world.captured.is_some() {
        let target = world
            .bricks
            .iter()
            .find(|b| !b.destroyed && !b.is_indestructible())
            .map(|b| b.center())
            .unwrap_or(Vec2::new(FIELD_WIDTH / 2.0, 0.0));
        engine.set_aim(target.x, target.y);

        *serve_wait += 1;
        if *serve_wait >= SERVE_DELAY_TICKS {
            *serve_wait = 0;
            engine.release();
        }
        return;
    }

    let lowest = world
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|b| b.pos.x);
    let paddle_y = world.paddle.y;
    if let Some(x) = lowest {
        engine.set_aim(x, paddle_y);
    }
}
