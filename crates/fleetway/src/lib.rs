//! Public API facade for fleetway.
//!
//! Fleetway coordinates the motion of automated ground vehicles sharing a
//! space: trajectories model planned motion, and the schedule database
//! keeps every participant's plan in one versioned, queryable store with
//! an incremental change log.

pub use fleetway_error::{FleetwayError, Result};
pub use fleetway_motion::{
    Conflict, Insertion, Limits, Movement, MovementKind, Profile, ProfileHandle, RangeErasure,
    Trajectory, VehicleTraits, Waypoint, conflict, interpolate, movements_conflict,
};
pub use fleetway_schedule::{
    Change, ChangeMode, Database, MapFilter, Mirror, Patch, Query, SharedSchedule,
    VersionedChange, Viewer,
};
pub use fleetway_types::{
    ConvexShape, Duration, EntryId, FinalConvexShape, ShapeHandle, Time, Version,
    make_final_convex,
};

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn unit_box_strict() -> ProfileHandle {
        Profile::strict(make_final_convex(&ConvexShape::unit_box()))
    }

    #[test]
    fn public_api_trajectory_round() {
        let t0 = Time::from_secs(0);
        let mut trajectory = Trajectory::new("lobby");
        let profile = unit_box_strict();
        trajectory.insert(t0, profile.clone(), Vector3::zeros(), Vector3::zeros());
        trajectory.insert(
            t0 + Duration::from_secs(10),
            profile,
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::zeros(),
        );
        assert_eq!(trajectory.duration(), Duration::from_secs(10));
    }

    #[test]
    fn public_api_schedule_round() {
        let t0 = Time::from_secs(0);
        let mut trajectory = Trajectory::new("lobby");
        let profile = unit_box_strict();
        trajectory.insert(t0, profile.clone(), Vector3::zeros(), Vector3::zeros());
        trajectory.insert(
            t0 + Duration::from_secs(10),
            profile,
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::zeros(),
        );

        let mut db = Database::new();
        let version = db.insert(trajectory).expect("insert should succeed");
        assert_eq!(version, Version::new(1));
        assert_eq!(db.changes(&Query::after(Version::ZERO)).len(), 1);
    }

    #[test]
    fn public_api_error_paths_surface() {
        let mut db = Database::new();
        let err = db.erase(EntryId::new(5)).expect_err("ghost id should fail");
        assert!(matches!(err, FleetwayError::UnknownId { .. }));
    }
}
