//! Thread-shared handle over the schedule database.
//!
//! The database itself relies on `&self`/`&mut self` to separate readers
//! from writers. Sharing it across threads wraps it in a reader-writer
//! lock: readers evaluate queries concurrently, writers serialise, and
//! version assignment stays totally ordered because only one writer runs
//! at a time.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use fleetway_error::Result;
use fleetway_motion::Trajectory;
use fleetway_types::{Duration, EntryId, Time, Version};

use crate::database::Database;
use crate::patch::Patch;
use crate::query::Query;

/// Cloneable, thread-safe handle to one [`Database`].
#[derive(Debug, Default, Clone)]
pub struct SharedSchedule {
    inner: Arc<RwLock<Database>>,
}

impl SharedSchedule {
    /// Wrap a fresh, empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for reading. Readers run concurrently with each other.
    pub fn read(&self) -> RwLockReadGuard<'_, Database> {
        self.inner.read()
    }

    /// Lock for writing. Writers are serialised.
    pub fn write(&self) -> RwLockWriteGuard<'_, Database> {
        self.inner.write()
    }

    /// Insert a trajectory; see [`Database::insert`].
    pub fn insert(&self, trajectory: Trajectory) -> Result<Version> {
        self.write().insert(trajectory)
    }

    /// Splice an interruption; see [`Database::interrupt`].
    pub fn interrupt(
        &self,
        id: EntryId,
        insertion: Trajectory,
        delay: Duration,
    ) -> Result<Version> {
        self.write().interrupt(id, insertion, delay)
    }

    /// Delay an entry's suffix; see [`Database::delay`].
    pub fn delay(&self, id: EntryId, from: Time, duration: Duration) -> Result<Version> {
        self.write().delay(id, from, duration)
    }

    /// Replace an entry's trajectory; see [`Database::replace`].
    pub fn replace(&self, id: EntryId, trajectory: Trajectory) -> Result<Version> {
        self.write().replace(id, trajectory)
    }

    /// Erase an entry; see [`Database::erase`].
    pub fn erase(&self, id: EntryId) -> Result<Version> {
        self.write().erase(id)
    }

    /// Cull stale waypoints; see [`Database::cull`].
    pub fn cull(&self, before: Time) -> Version {
        self.write().cull(before)
    }

    /// Evaluate a query; see [`Database::changes`].
    #[must_use]
    pub fn changes(&self, query: &Query) -> Patch {
        self.read().changes(query)
    }

    /// The current database version.
    #[must_use]
    pub fn latest_version(&self) -> Version {
        self.read().latest_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetway_motion::Profile;
    use fleetway_types::{ConvexShape, make_final_convex};
    use nalgebra::Vector3;

    fn two_point(t0: Time) -> Trajectory {
        let profile = Profile::strict(make_final_convex(&ConvexShape::unit_box()));
        let mut trajectory = Trajectory::new("test_map");
        trajectory.insert(t0, profile.clone(), Vector3::zeros(), Vector3::zeros());
        trajectory.insert(
            t0 + Duration::from_secs(10),
            profile,
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zeros(),
        );
        trajectory
    }

    #[test]
    fn clones_share_one_database() {
        let schedule = SharedSchedule::new();
        let alias = schedule.clone();

        schedule.insert(two_point(Time::EPOCH)).unwrap();
        assert_eq!(alias.latest_version(), Version::new(1));
        assert_eq!(alias.changes(&Query::everything()).len(), 1);
    }

    #[test]
    fn parallel_writers_serialise_version_assignment() {
        let schedule = SharedSchedule::new();
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let handle = schedule.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        handle.insert(two_point(Time::EPOCH)).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        // 100 accepted writes: versions 1..=100, each consumed once.
        assert_eq!(schedule.latest_version(), Version::new(100));
        let patch = schedule.changes(&Query::after(Version::ZERO));
        let versions: Vec<u64> = patch.iter().map(|vc| vc.version.get()).collect();
        assert_eq!(versions, (1..=100).collect::<Vec<u64>>());
    }

    #[test]
    fn readers_see_committed_prefixes() {
        let schedule = SharedSchedule::new();
        let writer = {
            let handle = schedule.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    handle.insert(two_point(Time::EPOCH)).unwrap();
                }
            })
        };

        // However the race lands, a patch never has gaps: a reader that
        // observes version v sees every change up to v.
        for _ in 0..20 {
            let patch = schedule.changes(&Query::after(Version::ZERO));
            let versions: Vec<u64> = patch.iter().map(|vc| vc.version.get()).collect();
            let expected: Vec<u64> = (1..=patch.latest_version().get()).collect();
            assert_eq!(versions, expected);
        }
        writer.join().unwrap();
    }
}
