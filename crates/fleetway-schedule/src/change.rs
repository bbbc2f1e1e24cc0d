//! The schedule change log's records.
//!
//! Every accepted database mutation appends exactly one [`Change`],
//! stamped with the version it took effect at. An observer that applies
//! changes in version order reconstructs database state exactly; the
//! reconstruction rule for each mode is documented on its variant.

use fleetway_motion::Trajectory;
use fleetway_types::{Duration, EntryId, Time, Version};

/// The mode tag of a [`Change`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChangeMode {
    Insert,
    Interrupt,
    Delay,
    Replace,
    Erase,
    Cull,
}

/// One recorded mutation of the schedule database.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Change {
    /// Install an entry with the given id and trajectory.
    Insert {
        id: EntryId,
        trajectory: Trajectory,
    },
    /// Splice `insertion` into the entry's trajectory, pushing every
    /// original waypoint at or after the insertion's start time back by
    /// the insertion's duration plus `delay`.
    Interrupt {
        id: EntryId,
        insertion: Trajectory,
        delay: Duration,
    },
    /// Shift every waypoint of the entry at or after `from` by
    /// `duration`.
    Delay {
        id: EntryId,
        from: Time,
        duration: Duration,
    },
    /// Replace the entry's trajectory wholesale.
    Replace {
        id: EntryId,
        trajectory: Trajectory,
    },
    /// Drop the entry.
    Erase { id: EntryId },
    /// Drop every waypoint before `before` from every entry; entries
    /// left empty are dropped too.
    Cull { before: Time },
}

impl Change {
    /// The mode tag of this change.
    #[must_use]
    pub const fn mode(&self) -> ChangeMode {
        match self {
            Self::Insert { .. } => ChangeMode::Insert,
            Self::Interrupt { .. } => ChangeMode::Interrupt,
            Self::Delay { .. } => ChangeMode::Delay,
            Self::Replace { .. } => ChangeMode::Replace,
            Self::Erase { .. } => ChangeMode::Erase,
            Self::Cull { .. } => ChangeMode::Cull,
        }
    }

    /// The entry this change targets; `None` for [`Change::Cull`], which
    /// sweeps every entry.
    #[must_use]
    pub const fn target(&self) -> Option<EntryId> {
        match self {
            Self::Insert { id, .. }
            | Self::Interrupt { id, .. }
            | Self::Delay { id, .. }
            | Self::Replace { id, .. }
            | Self::Erase { id } => Some(*id),
            Self::Cull { .. } => None,
        }
    }

    /// The trajectory payload carried by this change, if any.
    #[must_use]
    pub const fn trajectory(&self) -> Option<&Trajectory> {
        match self {
            Self::Insert { trajectory, .. } | Self::Replace { trajectory, .. } => Some(trajectory),
            Self::Interrupt { insertion, .. } => Some(insertion),
            Self::Delay { .. } | Self::Erase { .. } | Self::Cull { .. } => None,
        }
    }
}

/// A [`Change`] stamped with the version it took effect at.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct VersionedChange {
    /// The database version this change produced.
    pub version: Version,
    /// The recorded mutation.
    pub change: Change,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetway_motion::Profile;
    use fleetway_types::{ConvexShape, make_final_convex};
    use nalgebra::Vector3;

    fn one_point_trajectory() -> Trajectory {
        let mut trajectory = Trajectory::new("test_map");
        trajectory.insert(
            Time::EPOCH,
            Profile::strict(make_final_convex(&ConvexShape::unit_box())),
            Vector3::zeros(),
            Vector3::zeros(),
        );
        trajectory
    }

    #[test]
    fn modes_and_targets() {
        let id = EntryId::FIRST;
        let change = Change::Insert {
            id,
            trajectory: one_point_trajectory(),
        };
        assert_eq!(change.mode(), ChangeMode::Insert);
        assert_eq!(change.target(), Some(id));
        assert!(change.trajectory().is_some());

        let change = Change::Erase { id };
        assert_eq!(change.mode(), ChangeMode::Erase);
        assert_eq!(change.target(), Some(id));
        assert!(change.trajectory().is_none());

        let change = Change::Cull {
            before: Time::EPOCH,
        };
        assert_eq!(change.mode(), ChangeMode::Cull);
        assert_eq!(change.target(), None);
    }

    #[test]
    fn interrupt_carries_the_insertion() {
        let change = Change::Interrupt {
            id: EntryId::FIRST,
            insertion: one_point_trajectory(),
            delay: Duration::from_secs(2),
        };
        assert_eq!(change.mode(), ChangeMode::Interrupt);
        assert_eq!(change.trajectory().map(Trajectory::len), Some(1));
    }
}
