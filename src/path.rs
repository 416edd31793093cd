//! RacePath - closed waypoint path sampling
//!
//! Parametrizes an ordered loop of waypoints over `[0, N)` path units, where
//! `N` is the waypoint count, and samples positions and tangential
//! orientations anywhere along the loop. Integer units land exactly on
//! waypoints, which is what lines them up with generated checkpoint indices.

use glam::{Mat3, Quat, Vec3};

use crate::agent::Pose;
use crate::error::RaceError;

/// A closed race line through ordered waypoints.
#[derive(Debug, Clone)]
pub struct RacePath {
    positions: Vec<Vec3>,
    orientations: Vec<Quat>,
}

impl RacePath {
    /// Build a closed path from ordered waypoint positions.
    ///
    /// Orientation at each waypoint is the look-rotation along the
    /// central-difference tangent (previous waypoint toward next), so the
    /// local +Z axis points down the track.
    pub fn new(waypoints: Vec<Vec3>) -> Result<Self, RaceError> {
        if waypoints.len() < 2 {
            return Err(RaceError::Configuration(format!(
                "race path needs at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }

        let n = waypoints.len();
        let orientations = (0..n)
            .map(|i| {
                let prev = waypoints[(i + n - 1) % n];
                let next = waypoints[(i + 1) % n];
                look_along(next - prev)
            })
            .collect();

        Ok(Self {
            positions: waypoints,
            orientations,
        })
    }

    /// Upper bound of the path-unit parametrization (= waypoint count).
    pub fn max_unit(&self) -> f32 {
        self.positions.len() as f32
    }

    /// Sampled position at `u` path units, linear between waypoints.
    pub fn position_at_unit(&self, u: f32) -> Vec3 {
        let (i, j, frac) = self.segment(u);
        self.positions[i].lerp(self.positions[j], frac)
    }

    /// Tangential orientation at `u` path units.
    pub fn orientation_at_unit(&self, u: f32) -> Quat {
        let (i, j, frac) = self.segment(u);
        self.orientations[i].slerp(self.orientations[j], frac)
    }

    /// Position and orientation at `u` path units.
    pub fn pose_at_unit(&self, u: f32) -> Pose {
        Pose::new(self.position_at_unit(u), self.orientation_at_unit(u))
    }

    /// Normalized `[0, 1)` path parameter, for callers that separate the
    /// discrete checkpoint index from the continuous parametrization.
    pub fn unit_to_native_param(&self, u: f32) -> f32 {
        self.wrap(u) / self.max_unit()
    }

    fn wrap(&self, u: f32) -> f32 {
        u.rem_euclid(self.max_unit())
    }

    /// Segment endpoints and interpolation fraction for `u`.
    fn segment(&self, u: f32) -> (usize, usize, f32) {
        let u = self.wrap(u);
        // rem_euclid can round up to max_unit itself for tiny negatives.
        let i = (u.floor() as usize).min(self.positions.len() - 1);
        let frac = u - i as f32;
        (i, (i + 1) % self.positions.len(), frac)
    }
}

/// Look-rotation facing `dir`, upright with respect to world up.
fn look_along(dir: Vec3) -> Quat {
    let forward = dir.normalize_or(Vec3::Z);
    // Near-vertical tangents need a different up reference.
    let up_ref = if forward.y.abs() > 0.999 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = up_ref.cross(forward).normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_path() -> RacePath {
        RacePath::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(100.0, 0.0, 100.0),
            Vec3::new(0.0, 0.0, 100.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_path() {
        let err = RacePath::new(vec![Vec3::ZERO]).unwrap_err();
        assert!(matches!(err, RaceError::Configuration(_)));
    }

    #[test]
    fn integer_units_land_on_waypoints() {
        let path = square_path();
        assert_relative_eq!(path.position_at_unit(0.0).x, 0.0);
        let p1 = path.position_at_unit(1.0);
        assert_relative_eq!(p1.x, 100.0);
        assert_relative_eq!(p1.z, 0.0);
        // Wraps past the end back to the first waypoint.
        let p4 = path.position_at_unit(4.0);
        assert_relative_eq!(p4.x, 0.0);
        assert_relative_eq!(p4.z, 0.0);
    }

    #[test]
    fn fractional_units_interpolate() {
        let path = square_path();
        let mid = path.position_at_unit(0.5);
        assert_relative_eq!(mid.x, 50.0);
        assert_relative_eq!(mid.z, 0.0);
        // Last segment closes the loop.
        let closing = path.position_at_unit(3.5);
        assert_relative_eq!(closing.x, 0.0);
        assert_relative_eq!(closing.z, 50.0);
    }

    #[test]
    fn orientation_is_tangential() {
        let path = square_path();
        // At waypoint 1 the central-difference tangent points from waypoint 0
        // toward waypoint 2.
        let forward = path.orientation_at_unit(1.0) * Vec3::Z;
        let expected = Vec3::new(100.0, 0.0, 100.0).normalize();
        assert_relative_eq!(forward.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(forward.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn native_param_is_normalized() {
        let path = square_path();
        assert_relative_eq!(path.unit_to_native_param(2.0), 0.5);
        assert_relative_eq!(path.unit_to_native_param(5.0), 0.25);
        assert_relative_eq!(path.unit_to_native_param(0.0), 0.0);
    }
}
