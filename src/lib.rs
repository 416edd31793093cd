//! Frostrun - checkpoint-racing game mode core
//!
//! Generates a closed checkpoint track from a waypoint path, tracks each
//! agent's lap progress under a reach-the-next-gate countdown, ranks the
//! field on a fixed cadence, and drives the session state machine from an
//! external fixed-rate tick. Rendering, input, physics and UI live outside
//! this crate and talk to it through [`AgentController`], the signal methods
//! on [`RaceDirector`], and read-only snapshots.

pub mod agent;
pub mod director;
pub mod error;
pub mod path;
pub mod progress;
pub mod ranking;
pub mod track;

pub use agent::{AgentController, AgentId, AgentKind, Pose};
pub use director::{AgentSnapshot, RaceConfig, RaceDirector, RaceSnapshot, RaceState};
pub use error::RaceError;
pub use path::RacePath;
pub use progress::{AgentProgress, ProgressEvent};
pub use ranking::{compare_standing, place_string};
pub use track::{Checkpoint, CheckpointTrack};
