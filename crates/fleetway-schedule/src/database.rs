//! The authoritative schedule database.
//!
//! The append-only change log is the authoritative state; the live entry
//! map is a cache derived from it. That split keeps version semantics
//! trivial: evaluating a watermark query is a filter over the log, and an
//! observer replaying a patch in order reconstructs the cache exactly.

use std::collections::BTreeMap;

use tracing::debug;

use fleetway_error::{FleetwayError, Result};
use fleetway_motion::Trajectory;
use fleetway_types::{Duration, EntryId, Time, Version};

use crate::change::{Change, VersionedChange};
use crate::patch::Patch;
use crate::query::Query;
use crate::viewer::Viewer;

#[derive(Debug, Clone)]
struct Entry {
    trajectory: Trajectory,
}

/// A versioned database of participant-owned trajectories.
///
/// Every accepted mutation is assigned the next version and appends one
/// change to the log; failed mutations change nothing and consume no
/// version. Writers take `&mut self` and readers `&self`, so the borrow
/// checker enforces the multi-reader/single-writer model; wrap the
/// database in [`crate::SharedSchedule`] to share it across threads.
#[derive(Debug)]
pub struct Database {
    log: Vec<VersionedChange>,
    /// Derived cache of live entries. `BTreeMap` keyed by id keeps
    /// iteration in insertion order, since ids ascend.
    entries: BTreeMap<EntryId, Entry>,
    latest_version: Version,
    next_entry_id: EntryId,
}

impl Database {
    /// An empty database at version zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            entries: BTreeMap::new(),
            latest_version: Version::ZERO,
            next_entry_id: EntryId::FIRST,
        }
    }

    /// Insert a new trajectory, returning the version of the insertion.
    ///
    /// The trajectory must have at least one waypoint; scheduling an
    /// empty trajectory is an [`FleetwayError::InvariantViolation`].
    pub fn insert(&mut self, trajectory: Trajectory) -> Result<Version> {
        if trajectory.is_empty() {
            return Err(FleetwayError::invariant(
                "cannot schedule an empty trajectory",
            ));
        }
        let id = self.next_entry_id;
        self.next_entry_id = id.next();
        self.entries.insert(
            id,
            Entry {
                trajectory: trajectory.clone(),
            },
        );
        Ok(self.commit(Change::Insert { id, trajectory }))
    }

    /// Splice `insertion` into entry `id`, pushing the remainder of the
    /// original waypoints back by the insertion's duration plus `delay`.
    pub fn interrupt(
        &mut self,
        id: EntryId,
        insertion: Trajectory,
        delay: Duration,
    ) -> Result<Version> {
        let entry = self.entry(id)?;
        let spliced = entry.trajectory.with_interruption(&insertion, delay)?;
        self.entry_mut(id)?.trajectory = spliced;
        Ok(self.commit(Change::Interrupt {
            id,
            insertion,
            delay,
        }))
    }

    /// Shift every waypoint of entry `id` at or after `from` by
    /// `duration`.
    pub fn delay(&mut self, id: EntryId, from: Time, duration: Duration) -> Result<Version> {
        let entry = self.entry(id)?;
        let delayed = entry.trajectory.with_delay(from, duration)?;
        self.entry_mut(id)?.trajectory = delayed;
        Ok(self.commit(Change::Delay { id, from, duration }))
    }

    /// Replace entry `id`'s trajectory wholesale.
    pub fn replace(&mut self, id: EntryId, trajectory: Trajectory) -> Result<Version> {
        if trajectory.is_empty() {
            return Err(FleetwayError::invariant(
                "cannot replace an entry with an empty trajectory",
            ));
        }
        self.entry_mut(id)?.trajectory = trajectory.clone();
        Ok(self.commit(Change::Replace { id, trajectory }))
    }

    /// Remove entry `id`.
    pub fn erase(&mut self, id: EntryId) -> Result<Version> {
        if self.entries.remove(&id).is_none() {
            return Err(FleetwayError::UnknownId { id });
        }
        Ok(self.commit(Change::Erase { id }))
    }

    /// Drop every waypoint strictly before `before` from every entry;
    /// entries left empty are removed. Always records one `Cull` change,
    /// even when nothing matched, so replicas stay in lockstep.
    pub fn cull(&mut self, before: Time) -> Version {
        self.entries.retain(|_, entry| {
            entry.trajectory.cull_before(before);
            !entry.trajectory.is_empty()
        });
        self.commit(Change::Cull { before })
    }

    /// Evaluate `query`, returning the matching slice of the change log.
    ///
    /// With a watermark this is exactly the changes with version in
    /// `(after, latest]`, ascending. Without one it is a compacted
    /// snapshot: one synthetic `Insert` per currently-live entry, in
    /// insertion order, each stamped with the current version.
    #[must_use]
    pub fn changes(&self, query: &Query) -> Patch {
        match query.after_version() {
            Some(after) => Patch::new(
                self.log
                    .iter()
                    .filter(|vc| vc.version > after)
                    .filter(|vc| self.change_matches(&vc.change, query))
                    .cloned(),
                self.latest_version,
            ),
            None => Patch::new(
                self.entries
                    .iter()
                    .filter(|(_, entry)| Self::trajectory_matches(&entry.trajectory, query))
                    .map(|(&id, entry)| VersionedChange {
                        version: self.latest_version,
                        change: Change::Insert {
                            id,
                            trajectory: entry.trajectory.clone(),
                        },
                    }),
                self.latest_version,
            ),
        }
    }

    /// The current trajectory of entry `id`.
    #[must_use]
    pub fn trajectory_of(&self, id: EntryId) -> Option<&Trajectory> {
        self.entries.get(&id).map(|entry| &entry.trajectory)
    }

    /// Iterate the live entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &Trajectory)> + '_ {
        self.entries.iter().map(|(&id, entry)| (id, &entry.trajectory))
    }

    /// Number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// The version of the most recent accepted mutation.
    #[must_use]
    pub fn latest_version(&self) -> Version {
        self.latest_version
    }

    fn entry(&self, id: EntryId) -> Result<&Entry> {
        self.entries
            .get(&id)
            .ok_or(FleetwayError::UnknownId { id })
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry> {
        self.entries
            .get_mut(&id)
            .ok_or(FleetwayError::UnknownId { id })
    }

    /// Assign the next version, append to the log, and return the
    /// version. Only called once a mutation is certain to succeed.
    fn commit(&mut self, change: Change) -> Version {
        self.latest_version = self.latest_version.next();
        debug!(
            version = self.latest_version.get(),
            mode = ?change.mode(),
            id = change.target().map(EntryId::get),
            "schedule change committed"
        );
        self.log.push(VersionedChange {
            version: self.latest_version,
            change,
        });
        self.latest_version
    }

    fn trajectory_matches(trajectory: &Trajectory, query: &Query) -> bool {
        if !query.map_filter().matches(trajectory.map_name()) {
            return false;
        }
        match (trajectory.start_time(), trajectory.finish_time()) {
            (Some(start), Some(finish)) => query.window_overlaps(start, finish),
            _ => true,
        }
    }

    /// Whether a logged change passes the query's map and time filters.
    ///
    /// Changes carrying a trajectory are matched against it. `Delay` and
    /// `Erase` match via the live entry when it still exists and pass
    /// otherwise, so an observer never misses a removal it needs for
    /// consistency. `Cull` always passes.
    fn change_matches(&self, change: &Change, query: &Query) -> bool {
        if let Some(trajectory) = change.trajectory() {
            return Self::trajectory_matches(trajectory, query);
        }
        match change.target() {
            Some(id) => match self.entries.get(&id) {
                Some(entry) => Self::trajectory_matches(&entry.trajectory, query),
                None => true,
            },
            None => true,
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer for Database {
    fn changes(&self, query: &Query) -> Patch {
        Database::changes(self, query)
    }

    fn latest_version(&self) -> Version {
        Database::latest_version(self)
    }

    fn entry_count(&self) -> usize {
        Database::entry_count(self)
    }

    fn trajectory_of(&self, id: EntryId) -> Option<&Trajectory> {
        Database::trajectory_of(self, id)
    }
}
