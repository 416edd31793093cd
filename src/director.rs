//! RaceDirector - session state machine and fixed-tick orchestration
//!
//! Owns the race state, the per-agent progress arena, and race-time
//! accounting that excludes paused spans. Everything mutates inside `tick`
//! or an explicit signal handler; the read accessors only ever see committed
//! state between ticks. External systems (countdown UI, pause input) drive
//! the state machine through one-shot signal methods, and presentation
//! subscribes to transitions through injected observers.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentController, AgentId, AgentKind, Pose};
use crate::error::RaceError;
use crate::progress::{AgentProgress, ProgressEvent};
use crate::ranking::{compare_standing, place_string};
use crate::track::CheckpointTrack;

/// Session-wide race state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceState {
    PreRace,
    Countdown,
    Playing,
    Paused,
    GameOver,
}

/// Race configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Laps the tracked agent must complete to end the race.
    pub num_laps: u32,
    /// Seconds granted on reaching a checkpoint.
    pub checkpoint_bonus_time: f32,
    /// Simulated seconds between standings refreshes.
    pub rank_refresh_interval: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            num_laps: 2,
            checkpoint_bonus_time: 15.0,
            rank_refresh_interval: 0.5,
        }
    }
}

/// Callback invoked on every state transition.
pub type StateObserver = Box<dyn FnMut(RaceState)>;

struct AgentEntry {
    controller: Box<dyn AgentController>,
    kind: AgentKind,
    is_tracked: bool,
    progress: Option<AgentProgress>,
}

/// Read-only projection of one agent for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: u32,
    pub kind: AgentKind,
    pub is_tracked: bool,
    pub place: u32,
    pub place_string: String,
    pub lap: u32,
    pub time_remaining: f32,
    pub next_checkpoint: usize,
}

/// Read-only projection of the whole session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub state: RaceState,
    pub race_time: f32,
    pub agents: Vec<AgentSnapshot>,
}

/// Drives one race session over a fixed-rate tick.
pub struct RaceDirector {
    track: CheckpointTrack,
    config: RaceConfig,
    state: RaceState,
    agents: Vec<AgentEntry>,
    /// Agent indices in current standing order; stable-sorted each refresh
    /// so dead heats keep their previous relative order.
    standings: Vec<usize>,
    observers: Vec<StateObserver>,
    race_time: f32,
    next_rank_refresh: f32,
}

impl RaceDirector {
    pub fn new(track: CheckpointTrack, config: RaceConfig) -> Self {
        Self {
            track,
            config,
            state: RaceState::PreRace,
            agents: Vec::new(),
            standings: Vec::new(),
            observers: Vec::new(),
            race_time: 0.0,
            next_rank_refresh: 0.0,
        }
    }

    /// Register an agent before the race starts.
    ///
    /// The agent is frozen until the countdown finishes. `is_tracked` marks
    /// the one agent whose lap completion ends the race.
    pub fn register_agent(
        &mut self,
        mut controller: Box<dyn AgentController>,
        kind: AgentKind,
        is_tracked: bool,
    ) -> Result<AgentId, RaceError> {
        if self.state != RaceState::PreRace {
            return Err(RaceError::Configuration(
                "agents must be registered before the countdown".into(),
            ));
        }

        controller.set_frozen(true);
        let id = AgentId(self.agents.len() as u32);
        self.agents.push(AgentEntry {
            controller,
            kind,
            is_tracked,
            progress: None,
        });
        log::info!("registered {id} ({kind:?}, tracked: {is_tracked})");
        Ok(id)
    }

    /// Subscribe to state transitions. Observers live until `shutdown`.
    pub fn subscribe(&mut self, observer: impl FnMut(RaceState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Signal: begin the pre-race countdown.
    pub fn start_countdown(&mut self) {
        if self.state != RaceState::PreRace {
            return;
        }
        self.transition(RaceState::Countdown);
    }

    /// Signal: the external countdown finished; start playing.
    ///
    /// One-shot resumption point: creates the progress records, drops the
    /// whole grid onto the start line, and thaws everyone.
    pub fn countdown_finished(&mut self) {
        if self.state != RaceState::Countdown {
            return;
        }

        let total = self.agents.len();
        for (ordinal, entry) in self.agents.iter_mut().enumerate() {
            entry.progress = Some(AgentProgress::new(self.config.checkpoint_bonus_time));
            // Everyone starts aiming at checkpoint 0, spawned on the grid
            // behind the finish line.
            self.track
                .place_agent(entry.controller.as_mut(), 0, ordinal, total);
        }
        self.standings = (0..total).collect();
        self.race_time = 0.0;
        self.next_rank_refresh = 0.0;

        self.transition(RaceState::Playing);
    }

    /// Signal: pause input. Toggles between `Playing` and `Paused`.
    pub fn toggle_pause(&mut self) {
        match self.state {
            RaceState::Playing => self.transition(RaceState::Paused),
            RaceState::Paused => self.transition(RaceState::Playing),
            _ => {}
        }
    }

    /// Advance the simulation by one fixed tick of `dt` seconds.
    ///
    /// Order per tick: refresh standings when the cadence elapsed, apply the
    /// progress rule to every agent (respawning expired ones), then check
    /// the game-over condition.
    pub fn tick(&mut self, dt: f32) {
        if self.state != RaceState::Playing {
            return;
        }
        self.race_time += dt;

        if self.race_time >= self.next_rank_refresh {
            self.next_rank_refresh = self.race_time + self.config.rank_refresh_interval;
            self.refresh_places();
        }

        let checkpoint_count = self.track.checkpoint_count();
        let bonus = self.config.checkpoint_bonus_time;
        let total = self.agents.len();
        let mut tracked_finished = false;

        for (ordinal, entry) in self.agents.iter_mut().enumerate() {
            let Some(progress) = entry.progress.as_mut() else {
                continue;
            };

            let reported = entry.controller.next_checkpoint_index();
            match progress.tick(reported, dt, checkpoint_count, bonus) {
                ProgressEvent::Advanced { wrapped } => {
                    if wrapped && entry.is_tracked && progress.lap > self.config.num_laps {
                        tracked_finished = true;
                    }
                }
                ProgressEvent::Expired => {
                    let target = progress.next_checkpoint;
                    self.track
                        .place_agent(entry.controller.as_mut(), target, ordinal, total);
                    log::debug!("agent {ordinal} ran out of time, respawned before checkpoint {target}");
                }
                ProgressEvent::None => {}
            }
        }

        if tracked_finished {
            self.transition(RaceState::GameOver);
        }
    }

    /// Tear down the session: drop all observers and agents.
    pub fn shutdown(&mut self) {
        self.observers.clear();
        self.agents.clear();
        self.standings.clear();
        self.state = RaceState::PreRace;
        log::info!("race session shut down");
    }

    // ---- read accessors (same-thread, between ticks) ----

    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Elapsed race seconds, excluding paused spans. 0 before the first tick.
    pub fn race_time(&self) -> f32 {
        self.race_time
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn track(&self) -> &CheckpointTrack {
        &self.track
    }

    /// The agent whose lap completion ends the race, if one was registered.
    pub fn tracked_agent(&self) -> Option<AgentId> {
        self.agents
            .iter()
            .position(|entry| entry.is_tracked)
            .map(|i| AgentId(i as u32))
    }

    pub fn agent_lap(&self, id: AgentId) -> Result<u32, RaceError> {
        Ok(self.progress(id)?.lap)
    }

    pub fn agent_place(&self, id: AgentId) -> Result<u32, RaceError> {
        Ok(self.progress(id)?.place)
    }

    pub fn agent_place_string(&self, id: AgentId) -> Result<String, RaceError> {
        Ok(place_string(self.progress(id)?.place))
    }

    pub fn agent_time_remaining(&self, id: AgentId) -> Result<f32, RaceError> {
        Ok(self.progress(id)?.time_remaining)
    }

    pub fn agent_next_checkpoint(&self, id: AgentId) -> Result<usize, RaceError> {
        Ok(self.progress(id)?.next_checkpoint)
    }

    /// World transform of the agent's next checkpoint gate.
    pub fn next_checkpoint_pose(&self, id: AgentId) -> Result<Pose, RaceError> {
        self.track
            .checkpoint_transform(self.progress(id)?.next_checkpoint)
    }

    /// Serializable projection of the whole session for the presentation
    /// layer. Agents without progress records yet (pre-race) are omitted.
    pub fn snapshot(&self) -> RaceSnapshot {
        let agents = self
            .agents
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let progress = entry.progress.as_ref()?;
                Some(AgentSnapshot {
                    id: i as u32,
                    kind: entry.kind,
                    is_tracked: entry.is_tracked,
                    place: progress.place,
                    place_string: place_string(progress.place),
                    lap: progress.lap,
                    time_remaining: progress.time_remaining,
                    next_checkpoint: progress.next_checkpoint,
                })
            })
            .collect();

        RaceSnapshot {
            state: self.state,
            race_time: self.race_time,
            agents,
        }
    }

    // ---- internals ----

    fn progress(&self, id: AgentId) -> Result<&AgentProgress, RaceError> {
        self.agents
            .get(id.index())
            .and_then(|entry| entry.progress.as_ref())
            .ok_or(RaceError::AgentNotFound(id))
    }

    /// Stable re-sort of the standings and reassignment of 1-based places.
    fn refresh_places(&mut self) {
        let checkpoint_count = self.track.checkpoint_count();
        let checkpoints = self.track.checkpoints();

        let keyed: Vec<(u64, f32)> = self
            .agents
            .iter()
            .map(|entry| match entry.progress.as_ref() {
                Some(progress) => {
                    let gate = checkpoints[progress.next_checkpoint].pose.position;
                    let dist = entry.controller.pose().position.distance(gate);
                    (progress.progress_key(checkpoint_count), dist)
                }
                None => (0, f32::MAX),
            })
            .collect();

        self.standings.sort_by(|&a, &b| {
            let (key_a, dist_a) = keyed[a];
            let (key_b, dist_b) = keyed[b];
            compare_standing(key_a, dist_a, key_b, dist_b)
        });

        for (rank, &index) in self.standings.iter().enumerate() {
            if let Some(progress) = self.agents[index].progress.as_mut() {
                progress.place = rank as u32 + 1;
            }
        }
    }

    /// Apply a state transition, its freeze/thaw side effects, and notify
    /// the observers.
    fn transition(&mut self, next: RaceState) {
        if self.state == next {
            return;
        }
        self.state = next;

        match next {
            RaceState::Playing => self.set_all_frozen(false),
            RaceState::Paused | RaceState::GameOver => self.set_all_frozen(true),
            RaceState::PreRace | RaceState::Countdown => {}
        }

        log::info!("race state -> {next:?}");
        for observer in &mut self.observers {
            observer(next);
        }
    }

    fn set_all_frozen(&mut self, frozen: bool) {
        for entry in &mut self.agents {
            entry.controller.set_frozen(frozen);
        }
    }
}
