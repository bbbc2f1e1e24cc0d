use fleetway_types::{EntryId, Time};
use thiserror::Error;

/// Primary error type for fleetway operations.
///
/// Structured variants for the failure kinds the schedule core can
/// produce. Every failure leaves the operated-on state unchanged, and a
/// failed database mutation never consumes a version number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FleetwayError {
    // === Trajectory ordering ===
    /// An operation would create two waypoints sharing a time.
    #[error("a waypoint already exists at {time}")]
    DuplicateTime { time: Time },

    /// An operation would break strict time ordering.
    #[error("trajectory ordering violation: {detail}")]
    InvariantViolation { detail: String },

    /// A waypoint cursor no longer names a waypoint.
    ///
    /// Time-keyed cursors go stale when the waypoint they named is
    /// re-keyed or erased; this is the safe surface of that staleness.
    #[error("no waypoint at {time}")]
    WaypointNotFound { time: Time },

    // === Schedule database ===
    /// A database operation referenced a nonexistent entry id.
    #[error("no schedule entry with id {id}")]
    UnknownId { id: EntryId },

    // === Collaborator boundaries ===
    /// Vehicle traits inconsistent with the requested interpolation.
    #[error("invalid vehicle traits: {detail}")]
    InvalidTraits { detail: String },

    /// A trajectory too short to run through conflict detection.
    #[error(
        "cannot check conflicts on a trajectory with {waypoints} waypoint(s); \
         at least 2 are required"
    )]
    InvalidTrajectory { waypoints: usize },
}

impl FleetwayError {
    /// Whether this failure is a violation of the trajectory ordering
    /// invariants (as opposed to a bad reference or boundary input).
    #[must_use]
    pub const fn is_ordering_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTime { .. } | Self::InvariantViolation { .. }
        )
    }

    /// Whether the caller can likely fix this by adjusting its request
    /// (pick a different time, re-query for live ids, repair traits).
    #[must_use]
    pub const fn is_caller_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTime { .. }
                | Self::UnknownId { .. }
                | Self::WaypointNotFound { .. }
                | Self::InvalidTraits { .. }
        )
    }

    /// Create an ordering-invariant violation.
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            detail: detail.into(),
        }
    }

    /// Create an invalid-traits error.
    pub fn invalid_traits(detail: impl Into<String>) -> Self {
        Self::InvalidTraits {
            detail: detail.into(),
        }
    }
}

/// Result type alias using [`FleetwayError`].
pub type Result<T> = std::result::Result<T, FleetwayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fleetway_types::Duration;

    #[test]
    fn error_display() {
        let err = FleetwayError::DuplicateTime {
            time: Time::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            format!("a waypoint already exists at {}", Time::from_secs(10))
        );
    }

    #[test]
    fn error_display_unknown_id() {
        let err = FleetwayError::UnknownId {
            id: EntryId::new(42),
        };
        assert_eq!(err.to_string(), "no schedule entry with id #42");
    }

    #[test]
    fn ordering_violations() {
        assert!(FleetwayError::invariant("suffix crosses predecessor").is_ordering_violation());
        assert!(
            FleetwayError::DuplicateTime {
                time: Time::EPOCH + Duration::from_secs(1),
            }
            .is_ordering_violation()
        );
        assert!(
            !FleetwayError::UnknownId {
                id: EntryId::FIRST,
            }
            .is_ordering_violation()
        );
    }

    #[test]
    fn caller_recoverable() {
        assert!(
            FleetwayError::UnknownId {
                id: EntryId::FIRST,
            }
            .is_caller_recoverable()
        );
        assert!(FleetwayError::invalid_traits("zero linear velocity").is_caller_recoverable());
        assert!(!FleetwayError::invariant("overlapping splice").is_caller_recoverable());
        assert!(!FleetwayError::InvalidTrajectory { waypoints: 1 }.is_caller_recoverable());
    }

    #[test]
    fn convenience_constructors() {
        let err = FleetwayError::invariant("negative shift");
        assert!(matches!(
            err,
            FleetwayError::InvariantViolation { detail } if detail == "negative shift"
        ));

        let err = FleetwayError::invalid_traits("rotation acceleration is NaN");
        assert!(matches!(err, FleetwayError::InvalidTraits { .. }));
    }
}
