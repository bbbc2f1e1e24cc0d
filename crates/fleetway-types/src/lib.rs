//! Foundation value types shared across the fleetway workspace.
//!
//! Everything here is a plain value: cheap to copy (or clone), comparable,
//! and serialisable so the transport layer can ship schedule state between
//! participants.

pub mod geometry;
pub mod time;

pub use geometry::{ConvexShape, FinalConvexShape, ShapeHandle, make_final_convex};
pub use time::{Duration, Time};

use std::fmt;

/// A schedule database version.
///
/// Versions are monotonically increasing and process-wide within one
/// database: every accepted mutation is assigned the next version, and a
/// failed mutation never consumes one. `Version::ZERO` is the watermark of
/// an observer that has seen nothing yet.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(transparent)]
pub struct Version(u64);

impl Version {
    /// The version of an empty database; also the "seen nothing" watermark.
    pub const ZERO: Self = Self(0);

    /// Create a version from a raw u64.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The version that follows this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identifier of a schedule entry.
///
/// Assigned by the database on first insertion and stable across every
/// later mutation of the entry until it is erased or culled. Distinct from
/// [`Version`]: an entry keeps its id while its trajectory is replaced,
/// delayed, or interrupted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// The id handed to the first entry ever inserted.
    pub const FIRST: Self = Self(1);

    /// Create an entry id from a raw u64.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id that will be handed to the next inserted entry.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering_and_next() {
        assert_eq!(Version::ZERO.next(), Version::new(1));
        assert!(Version::ZERO < Version::new(1));
        assert_eq!(Version::new(7).get(), 7);
    }

    #[test]
    fn version_display() {
        assert_eq!(Version::new(3).to_string(), "v3");
    }

    #[test]
    fn entry_id_display_and_next() {
        assert_eq!(EntryId::FIRST.to_string(), "#1");
        assert_eq!(EntryId::FIRST.next(), EntryId::new(2));
    }
}
