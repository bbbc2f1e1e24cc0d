//! Turn a sparse pose list into a kinematically feasible trajectory.
//!
//! The vehicle stops at every input pose. Each leg first rotates in place
//! to face the direction of travel, then translates along the straight
//! line, both under a trapezoidal speed profile clamped by the vehicle's
//! traits (triangular when the leg is too short to reach cruise speed).
//! Waypoints are emitted at every motion phase boundary, so the cubic
//! segments between them reproduce the profile closely.

use std::f64::consts::PI;

use nalgebra::Vector3;

use fleetway_error::Result;
use fleetway_types::{Duration, Time};

use crate::profile::ProfileHandle;
use crate::trajectory::Trajectory;
use crate::vehicle::{Limits, VehicleTraits};

/// Tunable thresholds for skipping negligible motion.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Options {
    /// Translations shorter than this (meters) are skipped.
    pub translation_threshold: f64,
    /// Rotations smaller than this (radians) are skipped.
    pub rotation_threshold: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            translation_threshold: 1e-3,
            rotation_threshold: 1.0 * PI / 180.0,
        }
    }
}

/// One trapezoidal (or triangular) speed profile.
struct SpeedProfile {
    peak: f64,
    accel_time: f64,
    cruise_time: f64,
}

impl SpeedProfile {
    fn plan(distance: f64, limits: Limits) -> Self {
        let peak = limits.velocity.min((distance * limits.acceleration).sqrt());
        let accel_time = peak / limits.acceleration;
        let accel_distance = 0.5 * peak * accel_time;
        let cruise_distance = (distance - 2.0 * accel_distance).max(0.0);
        Self {
            peak,
            accel_time,
            cruise_time: cruise_distance / peak,
        }
    }

    /// Distance covered by the end of the acceleration ramp.
    fn accel_distance(&self) -> f64 {
        0.5 * self.peak * self.accel_time
    }
}

fn wrap_to_pi(angle: f64) -> f64 {
    let wrapped = angle % (2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else if wrapped < -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Motion along one axis of travel: emits the phase-boundary waypoints of
/// a stop-to-stop profile, advancing the clock as it goes.
fn emit_profile(
    trajectory: &mut Trajectory,
    profile: &ProfileHandle,
    clock: &mut Time,
    pose: &mut Vector3<f64>,
    direction: Vector3<f64>,
    distance: f64,
    limits: Limits,
) {
    let speed = SpeedProfile::plan(distance, limits);

    // End of the acceleration ramp.
    *clock += Duration::from_secs_f64(speed.accel_time);
    *pose += direction * speed.accel_distance();
    trajectory.insert(*clock, profile.clone(), *pose, direction * speed.peak);

    // End of the cruise, if there is one.
    if speed.cruise_time > 0.0 {
        *clock += Duration::from_secs_f64(speed.cruise_time);
        *pose += direction * speed.peak * speed.cruise_time;
        trajectory.insert(*clock, profile.clone(), *pose, direction * speed.peak);
    }

    // Stopped at the goal.
    *clock += Duration::from_secs_f64(speed.accel_time);
    *pose += direction * speed.accel_distance();
    trajectory.insert(*clock, profile.clone(), *pose, Vector3::zeros());
}

/// Interpolate a stop-at-every-pose trajectory through `positions`.
///
/// Poses are (x, y, θ); the θ of intermediate input poses is replaced by
/// the heading of travel, since the vehicle turns to face each leg.
/// Fails with [`fleetway_error::FleetwayError::InvalidTraits`] when the
/// traits are unusable. A single input pose produces a one-waypoint
/// trajectory; an empty input produces an empty trajectory.
pub fn positions(
    map_name: impl Into<String>,
    start_time: Time,
    traits: &VehicleTraits,
    profile: &ProfileHandle,
    positions: &[Vector3<f64>],
    options: &Options,
) -> Result<Trajectory> {
    traits.validate()?;

    let mut trajectory = Trajectory::new(map_name);
    let Some(&first) = positions.first() else {
        return Ok(trajectory);
    };

    let mut clock = start_time;
    let mut pose = first;
    trajectory.insert(clock, profile.clone(), pose, Vector3::zeros());

    for &target in &positions[1..] {
        let leg = Vector3::new(target.x - pose.x, target.y - pose.y, 0.0);
        let distance = leg.norm();
        if distance < options.translation_threshold {
            continue;
        }
        let heading = leg.y.atan2(leg.x);

        // Rotate in place to face the leg.
        let turn = wrap_to_pi(heading - pose.z);
        if turn.abs() >= options.rotation_threshold {
            emit_profile(
                &mut trajectory,
                profile,
                &mut clock,
                &mut pose,
                Vector3::new(0.0, 0.0, turn.signum()),
                turn.abs(),
                traits.rotational,
            );
        }
        pose.z = heading;

        // Translate down the leg.
        emit_profile(
            &mut trajectory,
            profile,
            &mut clock,
            &mut pose,
            leg / distance,
            distance,
            traits.linear,
        );
        // Land exactly on the target; the profile accumulates rounding.
        pose.x = target.x;
        pose.y = target.y;
    }

    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use fleetway_types::{ConvexShape, make_final_convex};

    fn test_profile() -> ProfileHandle {
        Profile::strict(make_final_convex(&ConvexShape::circle(0.5)))
    }

    fn traits() -> VehicleTraits {
        VehicleTraits::new(Limits::new(1.0, 0.5), Limits::new(1.0, 1.0))
    }

    fn strictly_increasing(trajectory: &Trajectory) -> bool {
        let times: Vec<_> = trajectory.iter().map(|wp| wp.time()).collect();
        times.windows(2).all(|pair| pair[0] < pair[1])
    }

    #[test]
    fn invalid_traits_are_rejected() {
        let bad = VehicleTraits::new(Limits::new(-1.0, 0.5), Limits::new(1.0, 1.0));
        let result = positions(
            "test_map",
            Time::EPOCH,
            &bad,
            &test_profile(),
            &[Vector3::zeros()],
            &Options::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_and_single_pose_inputs() {
        let empty = positions(
            "test_map",
            Time::EPOCH,
            &traits(),
            &test_profile(),
            &[],
            &Options::default(),
        )
        .unwrap();
        assert!(empty.is_empty());

        let single = positions(
            "test_map",
            Time::EPOCH,
            &traits(),
            &test_profile(),
            &[Vector3::new(1.0, 2.0, 0.0)],
            &Options::default(),
        )
        .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.start_time(), Some(Time::EPOCH));
    }

    #[test]
    fn straight_leg_reaches_the_goal_and_stops() {
        // 10m straight ahead: long enough to hit cruise speed.
        let trajectory = positions(
            "test_map",
            Time::EPOCH,
            &traits(),
            &test_profile(),
            &[Vector3::zeros(), Vector3::new(10.0, 0.0, 0.0)],
            &Options::default(),
        )
        .unwrap();

        assert!(strictly_increasing(&trajectory));
        // Start, end-of-accel, end-of-cruise, arrival.
        assert_eq!(trajectory.len(), 4);

        let last = trajectory.last().unwrap();
        assert!((last.position().x - 10.0).abs() < 1e-9);
        assert_eq!(last.velocity(), Vector3::zeros());

        // Trapezoid timing: accel 2s covering 1m each end, cruise 8m at
        // 1 m/s, so 2 + 8 + 2 = 12 seconds overall.
        assert_eq!(trajectory.duration(), Duration::from_secs(12));
    }

    #[test]
    fn short_leg_uses_a_triangular_profile() {
        // 0.25m: peak speed sqrt(0.25 * 0.5) ≈ 0.35 m/s < 1 m/s.
        let trajectory = positions(
            "test_map",
            Time::EPOCH,
            &traits(),
            &test_profile(),
            &[Vector3::zeros(), Vector3::new(0.25, 0.0, 0.0)],
            &Options::default(),
        )
        .unwrap();

        assert!(strictly_increasing(&trajectory));
        // Start, apex, arrival: no cruise phase.
        assert_eq!(trajectory.len(), 3);
        assert!((trajectory.last().unwrap().position().x - 0.25).abs() < 1e-9);
    }

    #[test]
    fn turning_legs_rotate_before_translating() {
        // Travel east then north: the second leg needs a 90° turn.
        let trajectory = positions(
            "test_map",
            Time::EPOCH,
            &traits(),
            &test_profile(),
            &[
                Vector3::zeros(),
                Vector3::new(5.0, 0.0, 0.0),
                Vector3::new(5.0, 5.0, 0.0),
            ],
            &Options::default(),
        )
        .unwrap();

        assert!(strictly_increasing(&trajectory));
        let final_pose = trajectory.last().unwrap().position();
        assert!((final_pose.x - 5.0).abs() < 1e-9);
        assert!((final_pose.y - 5.0).abs() < 1e-9);
        assert!((final_pose.z - PI / 2.0).abs() < 1e-9);

        // Some waypoint rotates in place at x=5, y=0.
        assert!(trajectory.iter().any(|wp| {
            (wp.position().x - 5.0).abs() < 1e-9
                && wp.position().y.abs() < 1e-9
                && wp.velocity().z.abs() > 0.0
        }));
    }

    #[test]
    fn coincident_poses_are_skipped() {
        let trajectory = positions(
            "test_map",
            Time::EPOCH,
            &traits(),
            &test_profile(),
            &[
                Vector3::zeros(),
                Vector3::new(0.0, 1e-6, 0.0),
                Vector3::new(2.0, 0.0, 0.0),
            ],
            &Options::default(),
        )
        .unwrap();

        assert!(strictly_increasing(&trajectory));
        assert!((trajectory.last().unwrap().position().x - 2.0).abs() < 1e-9);
    }
}
