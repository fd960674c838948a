//! Mutable borrow bundle handed to the resolver and power-up policy
//!
//! The engine owns all of these; during a tick (or a command) it lends them
//! out together so helper functions don't need six parameters.

use rand_pcg::Pcg32;

use super::events::{GameEvent, TickReport};
use super::schedule::Scheduler;
use super::state::{GameState, SimulationState};
use crate::settings::Settings;

pub struct TickContext<'a> {
    pub world: &'a mut SimulationState,
    pub game: &'a mut GameState,
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut Pcg32,
    pub settings: &'a Settings,
    pub report: &'a mut TickReport,
}

impl TickContext<'_> {
    #[inline]
    pub fn emit(&mut self, event: GameEvent) {
        self.report.events.push(event);
    }

    pub fn add_score(&mut self, points: u64) {
        self.game.score += points;
        self.report.score_delta += points;
    }

    pub fn add_coins(&mut self, coins: u32) {
        self.game.coins += u64::from(coins);
        self.report.coin_delta += u64::from(coins);
    }
}
