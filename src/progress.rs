//! AgentProgress - per-agent lap and countdown state
//!
//! One record per agent, created when the race starts. The transition rule
//! runs once per fixed tick per agent and reports what happened so the
//! director can respawn the agent or end the race.

use serde::{Deserialize, Serialize};

/// Outcome of a single progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Nothing notable; the countdown merely ticked down.
    None,
    /// The agent reached its target; `wrapped` means a new lap started.
    Advanced { wrapped: bool },
    /// The countdown hit zero this tick; the agent must be respawned.
    Expired,
}

/// Mutable race progress for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProgress {
    /// Checkpoint the agent must reach next, cycling through `0..K`.
    pub next_checkpoint: usize,
    /// 1-based lap count, incremented when `next_checkpoint` wraps to 0.
    pub lap: u32,
    /// Seconds left before a forced respawn.
    pub time_remaining: f32,
    /// 1-based rank among all agents; 0 until the first standings refresh.
    pub place: u32,
}

impl AgentProgress {
    pub fn new(bonus_seconds: f32) -> Self {
        Self {
            next_checkpoint: 0,
            lap: 1,
            time_remaining: bonus_seconds,
            place: 0,
        }
    }

    /// Combined lap + checkpoint scalar, the primary ranking criterion.
    pub fn progress_key(&self, checkpoint_count: usize) -> u64 {
        self.next_checkpoint as u64 + (self.lap as u64 - 1) * checkpoint_count as u64
    }

    /// Apply one fixed tick.
    ///
    /// `reported_checkpoint` is the controller's view of the agent's next
    /// target; a mismatch means the current target gate was crossed.
    /// Advancing and expiring are mutually exclusive within a tick, since
    /// advancing always leaves `time_remaining` positive, and expiry is
    /// edge-triggered because it immediately restores the bonus.
    pub fn tick(
        &mut self,
        reported_checkpoint: usize,
        dt: f32,
        checkpoint_count: usize,
        bonus_seconds: f32,
    ) -> ProgressEvent {
        if reported_checkpoint != self.next_checkpoint {
            self.next_checkpoint = (self.next_checkpoint + 1) % checkpoint_count;
            self.time_remaining = bonus_seconds;

            let wrapped = self.next_checkpoint == 0;
            if wrapped {
                self.lap += 1;
            }
            return ProgressEvent::Advanced { wrapped };
        }

        self.time_remaining = (self.time_remaining - dt).max(0.0);
        if self.time_remaining == 0.0 {
            self.time_remaining = bonus_seconds;
            return ProgressEvent::Expired;
        }

        ProgressEvent::None
    }
}
