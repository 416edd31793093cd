//! CheckpointTrack - checkpoint generation and spawn placement
//!
//! Builds the immutable checkpoint sequence from a race path at setup and
//! places agents back on the track, laterally spaced so a whole grid can be
//! dropped at once without stacking.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentController, Pose};
use crate::error::RaceError;
use crate::path::RacePath;

/// A gate on the track. The last index doubles as the start/finish line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Checkpoint {
    pub index: usize,
    pub pose: Pose,
    pub is_finish: bool,
}

/// The generated checkpoint sequence; read-only geometry after `build`.
#[derive(Debug, Clone)]
pub struct CheckpointTrack {
    path: RacePath,
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointTrack {
    /// Generate one checkpoint per whole path unit.
    ///
    /// Checkpoint `i` sits at the path's pose at unit `i`; the final one is
    /// flagged as the finish line.
    pub fn build(path: RacePath) -> Result<Self, RaceError> {
        let count = path.max_unit() as usize;
        if count < 2 {
            return Err(RaceError::Configuration(format!(
                "track needs at least 2 checkpoints, got {count}"
            )));
        }

        let checkpoints = (0..count)
            .map(|i| Checkpoint {
                index: i,
                pose: path.pose_at_unit(i as f32),
                is_finish: i == count - 1,
            })
            .collect();

        log::info!("generated {count} checkpoints along the race path");
        Ok(Self { path, checkpoints })
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn checkpoint(&self, index: usize) -> Result<&Checkpoint, RaceError> {
        self.checkpoints.get(index).ok_or(RaceError::IndexOutOfRange {
            index,
            len: self.checkpoints.len(),
        })
    }

    /// World transform of a checkpoint gate.
    pub fn checkpoint_transform(&self, index: usize) -> Result<Pose, RaceError> {
        Ok(self.checkpoint(index)?.pose)
    }

    /// Spawn pose one checkpoint behind `target_checkpoint`.
    ///
    /// The pose is shifted along the gate's local right vector by grid slot:
    /// `(ordinal - total / 2) * U(9, 10)` meters, the uniform draw taken
    /// fresh per call, so agents placed in the same pass do not overlap.
    pub fn spawn_pose(&self, target_checkpoint: usize, ordinal: usize, total: usize) -> Pose {
        let previous = if target_checkpoint == 0 {
            self.checkpoints.len() - 1
        } else {
            target_checkpoint - 1
        };

        let base = self.path.position_at_unit(previous as f32);
        let orientation = self.path.orientation_at_unit(previous as f32);

        let spacing = 9.0 + rand::random::<f32>();
        let offset = (ordinal as f32 - total as f32 / 2.0) * spacing;

        Pose::new(base + orientation * (Vec3::X * offset), orientation)
    }

    /// Teleport an agent to its respawn slot behind `target_checkpoint`.
    ///
    /// Never fails once the track is built; target indices come from agent
    /// progress and are in range by construction.
    pub fn place_agent(
        &self,
        controller: &mut dyn AgentController,
        target_checkpoint: usize,
        ordinal: usize,
        total: usize,
    ) {
        controller.set_pose(self.spawn_pose(target_checkpoint, ordinal, total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct TestCraft {
        pose: Pose,
    }

    impl AgentController for TestCraft {
        fn pose(&self) -> Pose {
            self.pose
        }
        fn set_pose(&mut self, pose: Pose) {
            self.pose = pose;
        }
        fn set_frozen(&mut self, _frozen: bool) {}
        fn next_checkpoint_index(&self) -> usize {
            0
        }
    }

    fn square_track() -> CheckpointTrack {
        let path = RacePath::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 100.0),
            Vec3::new(0.0, 0.0, 100.0),
        ])
        .unwrap();
        CheckpointTrack::build(path).unwrap()
    }

    #[test]
    fn checkpoints_sample_the_path() {
        let track = square_track();
        assert_eq!(track.checkpoint_count(), 4);

        for (i, checkpoint) in track.checkpoints().iter().enumerate() {
            assert_eq!(checkpoint.index, i);
            let expected = track.path.position_at_unit(i as f32);
            assert_relative_eq!(checkpoint.pose.position.x, expected.x);
            assert_relative_eq!(checkpoint.pose.position.z, expected.z);
        }
    }

    #[test]
    fn last_checkpoint_is_finish() {
        let track = square_track();
        let finish: Vec<usize> = track
            .checkpoints()
            .iter()
            .filter(|c| c.is_finish)
            .map(|c| c.index)
            .collect();
        assert_eq!(finish, vec![3]);
    }

    #[test]
    fn out_of_range_lookup_fails() {
        let track = square_track();
        assert!(track.checkpoint_transform(3).is_ok());
        let err = track.checkpoint_transform(4).unwrap_err();
        assert!(matches!(
            err,
            RaceError::IndexOutOfRange { index: 4, len: 4 }
        ));
    }

    #[test]
    fn spawn_offsets_are_spaced_along_right_vector() {
        let track = square_track();
        let total = 4;
        let base = track.checkpoint(0).unwrap().pose;

        let mut laterals = Vec::new();
        for ordinal in 0..total {
            // Target 1 spawns behind checkpoint 0.
            let spawn = track.spawn_pose(1, ordinal, total);
            assert_eq!(spawn.orientation, base.orientation);
            let lateral = (spawn.position - base.position).dot(base.right());
            laterals.push(lateral);

            let multiplier = ordinal as f32 - total as f32 / 2.0;
            if multiplier == 0.0 {
                assert_relative_eq!(lateral, 0.0, epsilon = 1e-4);
            } else {
                let ratio = lateral / multiplier;
                assert!(
                    (9.0..=10.0).contains(&ratio),
                    "per-slot spacing {ratio} outside [9, 10]"
                );
            }
        }

        // All four slots are distinct.
        for i in 0..laterals.len() {
            for j in (i + 1)..laterals.len() {
                assert!((laterals[i] - laterals[j]).abs() > 1.0);
            }
        }
    }

    #[test]
    fn spawn_behind_first_checkpoint_wraps_to_finish() {
        let track = square_track();
        let finish = track.checkpoint(3).unwrap().pose.position;
        // Ordinal 2 of 4 has a zero multiplier, so no lateral offset.
        let spawn = track.spawn_pose(0, 2, 4);
        assert_relative_eq!(spawn.position.x, finish.x, epsilon = 1e-4);
        assert_relative_eq!(spawn.position.z, finish.z, epsilon = 1e-4);
    }

    #[test]
    fn place_agent_moves_the_craft() {
        let track = square_track();
        let mut craft = TestCraft {
            pose: Pose::IDENTITY,
        };
        track.place_agent(&mut craft, 2, 0, 1);
        let expected = track.checkpoint(1).unwrap().pose.position;
        // Single agent, ordinal 0 of 1: multiplier -0.5, so within 5 m.
        assert!(craft.pose.position.distance(expected) <= 5.0);
    }
}
