//! The read-only surface the planner consumes.

use fleetway_motion::Trajectory;
use fleetway_types::{EntryId, Version};

use crate::patch::Patch;
use crate::query::Query;

/// Read-only access to a schedule.
///
/// Implemented by the authoritative [`crate::Database`] and by observer-
/// side [`crate::Mirror`]s, so a planner can run against either without
/// caring which side of the transport it is on. Everything a viewer
/// returns is a value copy (or a borrow the borrow checker scopes); no
/// caller holds state into the schedule across calls.
pub trait Viewer {
    /// Evaluate a query, producing a patch of matching changes.
    fn changes(&self, query: &Query) -> Patch;

    /// The current version of the viewed schedule.
    fn latest_version(&self) -> Version;

    /// Number of live entries.
    fn entry_count(&self) -> usize;

    /// The current trajectory of the entry with the given id.
    fn trajectory_of(&self, id: EntryId) -> Option<&Trajectory>;
}
