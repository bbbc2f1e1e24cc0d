//! Version-bounded slices of the change log.

use smallvec::SmallVec;

use fleetway_types::Version;

use crate::change::VersionedChange;

/// An ordered sequence of changes catching an observer up to
/// `latest_version`.
///
/// Changes are ordered by ascending version. A patch is a value: the
/// trajectories inside it are copies, so holding a patch never pins the
/// database.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Patch {
    changes: SmallVec<[VersionedChange; 2]>,
    latest_version: Version,
}

impl Patch {
    pub(crate) fn new(
        changes: impl IntoIterator<Item = VersionedChange>,
        latest_version: Version,
    ) -> Self {
        let changes: SmallVec<[VersionedChange; 2]> = changes.into_iter().collect();
        debug_assert!(
            changes.windows(2).all(|w| w[0].version <= w[1].version),
            "patch changes must be version-ordered"
        );
        Self {
            changes,
            latest_version,
        }
    }

    /// Number of changes carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The database version at the time the patch was produced. Feed this
    /// into the next watermark query to continue catching up.
    #[must_use]
    pub fn latest_version(&self) -> Version {
        self.latest_version
    }

    /// Iterate the changes in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = &VersionedChange> + '_ {
        self.changes.iter()
    }
}

impl IntoIterator for Patch {
    type Item = VersionedChange;
    type IntoIter = smallvec::IntoIter<[VersionedChange; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a VersionedChange;
    type IntoIter = std::slice::Iter<'a, VersionedChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
