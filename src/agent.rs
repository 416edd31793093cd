//! Agent - identity, world pose, and the vehicle controller seam
//!
//! The race core never owns the physical craft. It reads poses and
//! checkpoint signals through [`AgentController`] and writes back respawn
//! poses and freeze/thaw commands.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World-space position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Local right axis (+X rotated into world space).
    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Local forward axis (+Z rotated into world space).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Stable agent id handed out at registration.
///
/// Ids are dense and index the director's progress arena directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent {}", self.0)
    }
}

/// Who is driving the craft, decided once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Player,
    Ai,
}

/// Seam to the external vehicle controller.
///
/// The controller owns movement and collision; the core reads its pose and
/// its reported next-checkpoint index, teleports it on respawn, and toggles
/// whether it may move at all.
pub trait AgentController {
    /// Current world pose of the craft.
    fn pose(&self) -> Pose;

    /// Teleport the craft (grid placement and forced respawns).
    fn set_pose(&mut self, pose: Pose);

    /// Disable or re-enable movement.
    fn set_frozen(&mut self, frozen: bool);

    /// Index of the checkpoint the craft should reach next.
    ///
    /// The controller advances this when the craft crosses a checkpoint
    /// region; the core treats a change as "target reached".
    fn next_checkpoint_index(&self) -> usize;
}
