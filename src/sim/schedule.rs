//! Delayed tasks with cancellation
//!
//! Power-up reversals, the laser cadence and the level-complete pause are
//! queued here instead of living in closures. Every entry carries the
//! generation it was scheduled in; `invalidate` bumps the generation so
//! nothing queued for a previous level can ever fire into a reseeded one.
//! Each entry occupies a `TimerSlot`, and scheduling into an occupied
//! slot replaces the pending entry (restart, not stack).

use serde::{Deserialize, Serialize};

/// Exclusive timer slots: at most one pending entry per slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerSlot {
    /// Shared by widen and shrink
    PaddleWidth,
    /// Shared by slow and speedup
    BallSpeed,
    BigBall,
    Fireball,
    Laser,
    LaserCadence,
    Magnet,
    Shield,
    AutoPaddle,
    Shock,
    LevelComplete,
}

/// Work the driver performs when an entry comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    RevertPaddleWidth,
    RevertBallSpeed,
    EndBigBall,
    EndFireball,
    EndLaser,
    LaserVolley,
    EndMagnet,
    EndShield,
    EndAutoPaddle,
    EndShock,
    CompleteLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    due: f32,
    seq: u64,
    generation: u64,
    slot: TimerSlot,
    task: Task,
}

/// Queue of pending tasks on the simulation clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: f32,
    generation: u64,
    seq: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock (seconds of `Playing` time since the last invalidate)
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Queue `task` in `slot` to run `delay` seconds from now, cancelling
    /// whatever the slot held
    pub fn schedule_slot(&mut self, slot: TimerSlot, delay: f32, task: Task) {
        self.cancel_slot(slot);
        self.seq += 1;
        self.entries.push(Entry {
            due: self.now + delay.max(0.0),
            seq: self.seq,
            generation: self.generation,
            slot,
            task,
        });
    }

    /// Drop any pending entry in `slot`; returns true if one was pending
    pub fn cancel_slot(&mut self, slot: TimerSlot) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.slot != slot);
        self.entries.len() != before
    }

    pub fn is_slot_pending(&self, slot: TimerSlot) -> bool {
        self.entries.iter().any(|e| e.slot == slot)
    }

    /// Forget everything queued so far and reset the clock
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.entries.clear();
        self.now = 0.0;
    }

    /// Advance the clock and return due tasks in due order
    pub fn advance(&mut self, dt: f32) -> Vec<Task> {
        self.now += dt;
        let now = self.now;
        let generation = self.generation;

        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due <= now {
                if e.generation == generation {
                    due.push(e.clone());
                }
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.task).collect()
    }
}
