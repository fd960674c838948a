//! Shared fixtures for simulation unit tests

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::context::TickContext;
use super::events::{GameEvent, TickReport};
use super::powerup::expire;
use super::schedule::Scheduler;
use super::state::{Ball, Brick, BrickKind, GameState, INDESTRUCTIBLE_HITS, SimulationState};
use crate::consts::BALL_RADIUS;
use crate::settings::Settings;

/// Owns everything a `TickContext` borrows
pub struct Harness {
    pub world: SimulationState,
    pub game: GameState,
    pub scheduler: Scheduler,
    pub rng: Pcg32,
    pub settings: Settings,
    pub report: TickReport,
}

impl Harness {
    /// Drops disabled so brick layouts behave deterministically
    pub fn new() -> Self {
        Self {
            world: SimulationState::default(),
            game: GameState::new(3),
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(7),
            settings: Settings::without_drops(),
            report: TickReport::default(),
        }
    }

    pub fn ctx(&mut self) -> TickContext<'_> {
        TickContext {
            world: &mut self.world,
            game: &mut self.game,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            settings: &self.settings,
            report: &mut self.report,
        }
    }

    /// Advance the scheduler and run due expiries; returns how many ran
    pub fn run_timers(&mut self, dt: f32) -> usize {
        let tasks = self.scheduler.advance(dt);
        let n = tasks.len();
        for task in tasks {
            expire(&mut self.ctx(), task);
        }
        n
    }

    pub fn add_brick(&mut self, kind: BrickKind, x: f32, y: f32, hits: u32) -> usize {
        let id = self.world.next_entity_id();
        let hits = if kind == BrickKind::Indestructible {
            INDESTRUCTIBLE_HITS
        } else {
            hits
        };
        self.world.bricks.push(Brick {
            id,
            pos: Vec2::new(x, y),
            size: Vec2::new(40.0, 15.0),
            hits,
            max_hits: hits,
            color: 0xFF8800,
            destroyed: false,
            kind,
            motion: None,
            phase: 0.0,
        });
        self.world.bricks.len() - 1
    }

    pub fn add_ball(&mut self, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.world.next_entity_id();
        self.world.balls.push(Ball::new(id, pos, vel, BALL_RADIUS));
        id
    }

    pub fn destroyed_ids(&self) -> Vec<u32> {
        self.report
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::BrickDestroyed { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }
}
