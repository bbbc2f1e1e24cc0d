//! Observer-side replica of the schedule database.
//!
//! A mirror applies patches in order and reconstructs the database's live
//! entries exactly. The usual loop: ask the database (through whatever
//! transport) for `Query::after(mirror.latest_version())`, apply the
//! patch, repeat. The first patch may equally be a compacted snapshot
//! from `Query::everything()`.

use std::collections::BTreeMap;

use tracing::trace;

use fleetway_error::{FleetwayError, Result};
use fleetway_motion::Trajectory;
use fleetway_types::{EntryId, Version};

use crate::change::{Change, VersionedChange};
use crate::patch::Patch;
use crate::query::Query;
use crate::viewer::Viewer;

/// A downstream replica built by replaying patches.
#[derive(Debug, Default)]
pub struct Mirror {
    entries: BTreeMap<EntryId, Trajectory>,
    latest_version: Version,
}

impl Mirror {
    /// An empty mirror at version zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a patch, advancing this mirror to the patch's
    /// `latest_version`.
    ///
    /// Changes at or below the mirror's current version are skipped, so
    /// overlapping patches are harmless. A change referencing an entry
    /// this mirror has never seen fails with
    /// [`FleetwayError::UnknownId`]; the patch is then partially applied
    /// and the mirror should be rebuilt from a snapshot query.
    pub fn apply(&mut self, patch: &Patch) -> Result<Version> {
        for versioned in patch {
            if versioned.version <= self.latest_version {
                trace!(
                    version = versioned.version.get(),
                    "skipping already-applied change"
                );
                continue;
            }
            self.apply_change(versioned)?;
        }
        self.latest_version = self.latest_version.max(patch.latest_version());
        Ok(self.latest_version)
    }

    fn apply_change(&mut self, versioned: &VersionedChange) -> Result<()> {
        match &versioned.change {
            Change::Insert { id, trajectory } => {
                self.entries.insert(*id, trajectory.clone());
            }
            Change::Interrupt {
                id,
                insertion,
                delay,
            } => {
                let entry = self.entry_mut(*id)?;
                *entry = entry.with_interruption(insertion, *delay)?;
            }
            Change::Delay { id, from, duration } => {
                let entry = self.entry_mut(*id)?;
                *entry = entry.with_delay(*from, *duration)?;
            }
            Change::Replace { id, trajectory } => {
                let entry = self.entry_mut(*id)?;
                *entry = trajectory.clone();
            }
            Change::Erase { id } => {
                if self.entries.remove(id).is_none() {
                    return Err(FleetwayError::UnknownId { id: *id });
                }
            }
            Change::Cull { before } => {
                self.entries.retain(|_, trajectory| {
                    trajectory.cull_before(*before);
                    !trajectory.is_empty()
                });
            }
        }
        self.latest_version = versioned.version;
        Ok(())
    }

    /// Iterate the mirrored entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &Trajectory)> + '_ {
        self.entries.iter().map(|(&id, trajectory)| (id, trajectory))
    }

    /// The version this mirror has caught up to.
    #[must_use]
    pub fn latest_version(&self) -> Version {
        self.latest_version
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut Trajectory> {
        self.entries
            .get_mut(&id)
            .ok_or(FleetwayError::UnknownId { id })
    }
}

impl Viewer for Mirror {
    /// A mirror holds reconstructed state, not the log, so every query is
    /// answered as a compacted snapshot of the mirrored entries; the
    /// watermark only decides whether anything is returned at all.
    fn changes(&self, query: &Query) -> Patch {
        if query.after_version().is_some_and(|after| after >= self.latest_version) {
            return Patch::new([], self.latest_version);
        }
        Patch::new(
            self.entries
                .iter()
                .filter(|(_, trajectory)| {
                    query.map_filter().matches(trajectory.map_name())
                        && match (trajectory.start_time(), trajectory.finish_time()) {
                            (Some(start), Some(finish)) => query.window_overlaps(start, finish),
                            _ => true,
                        }
                })
                .map(|(&id, trajectory)| VersionedChange {
                    version: self.latest_version,
                    change: Change::Insert {
                        id,
                        trajectory: trajectory.clone(),
                    },
                }),
            self.latest_version,
        )
    }

    fn latest_version(&self) -> Version {
        Mirror::latest_version(self)
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn trajectory_of(&self, id: EntryId) -> Option<&Trajectory> {
        self.entries.get(&id)
    }
}
