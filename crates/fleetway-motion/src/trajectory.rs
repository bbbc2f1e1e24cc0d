//! Time-ordered motion waypoints on a named map.
//!
//! A trajectory is an ordered sequence of waypoints, each pairing a time
//! with a kinematic state and a shared [`ProfileHandle`]. The sequence is
//! keyed by time, which makes the strict-ordering invariant structural:
//! two waypoints can never share a time because a time is a key.
//!
//! Waypoints are addressed by their time key. A `Time` acts as a cursor:
//! `insert` never disturbs other cursors, and a cursor goes stale (and
//! surfaces as [`FleetwayError::WaypointNotFound`]) only when its waypoint
//! is re-keyed by `change_time`/`adjust_times` or erased.

use std::collections::BTreeMap;
use std::ops::Bound;

use nalgebra::Vector3;

use fleetway_error::{FleetwayError, Result};
use fleetway_types::{Duration, Time};

use crate::profile::ProfileHandle;

/// The mutable payload of one waypoint.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct WaypointData {
    profile: ProfileHandle,
    /// 2-D pose: x, y, and rotation about the vertical axis.
    position: Vector3<f64>,
    /// 2-D twist: x and y velocity, plus rotational velocity.
    velocity: Vector3<f64>,
}

/// Read-only view of one waypoint.
#[derive(Debug, Clone, Copy)]
pub struct Waypoint<'a> {
    time: Time,
    data: &'a WaypointData,
}

impl Waypoint<'_> {
    /// The time this waypoint is scheduled for.
    #[must_use]
    pub fn time(&self) -> Time {
        self.time
    }

    /// Pose at this waypoint: x, y, rotation about the vertical axis.
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        self.data.position
    }

    /// Twist at this waypoint: x and y velocity, rotational velocity.
    #[must_use]
    pub fn velocity(&self) -> Vector3<f64> {
        self.data.velocity
    }

    /// The shared profile attached to this waypoint.
    #[must_use]
    pub fn profile(&self) -> &ProfileHandle {
        &self.data.profile
    }
}

/// Outcome of [`Trajectory::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    /// Cursor to the waypoint at the requested time: the new waypoint, or
    /// the pre-existing one when `inserted` is false.
    pub time: Time,
    /// Whether a waypoint was actually inserted.
    pub inserted: bool,
}

/// Outcome of [`Trajectory::erase_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeErasure {
    /// How many waypoints were removed.
    pub removed: usize,
    /// The first waypoint at or after the (excluded) end of the range:
    /// the successor cursor of the erased range, if any waypoint remains
    /// there.
    pub successor: Option<Time>,
}

/// An ordered, time-indexed sequence of motion waypoints on a named map.
///
/// Value semantics: cloning a trajectory duplicates the waypoint sequence,
/// so mutating the clone never alters the source. Profiles stay shared
/// across the copy by design.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "TrajectoryRepr", into = "TrajectoryRepr")]
pub struct Trajectory {
    map_name: String,
    waypoints: BTreeMap<Time, WaypointData>,
}

impl Trajectory {
    /// Create an empty trajectory on the given map.
    #[must_use]
    pub fn new(map_name: impl Into<String>) -> Self {
        Self {
            map_name: map_name.into(),
            waypoints: BTreeMap::new(),
        }
    }

    /// The map this trajectory is on.
    #[must_use]
    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Rename the map this trajectory is on.
    pub fn set_map_name(&mut self, map_name: impl Into<String>) {
        self.map_name = map_name.into();
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the trajectory has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Time of the first waypoint, absent when empty.
    #[must_use]
    pub fn start_time(&self) -> Option<Time> {
        self.waypoints.keys().next().copied()
    }

    /// Time of the last waypoint, absent when empty.
    #[must_use]
    pub fn finish_time(&self) -> Option<Time> {
        self.waypoints.keys().next_back().copied()
    }

    /// `finish_time - start_time`; zero when empty.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match (self.start_time(), self.finish_time()) {
            (Some(start), Some(finish)) => finish - start,
            _ => Duration::ZERO,
        }
    }

    /// Insert a waypoint at `time`.
    ///
    /// If a waypoint already exists exactly at `time`, nothing changes and
    /// the returned [`Insertion`] has `inserted == false` with its cursor
    /// pointing at the pre-existing waypoint. No other cursor is disturbed
    /// either way.
    pub fn insert(
        &mut self,
        time: Time,
        profile: ProfileHandle,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Insertion {
        use std::collections::btree_map::Entry;

        match self.waypoints.entry(time) {
            Entry::Occupied(_) => Insertion {
                time,
                inserted: false,
            },
            Entry::Vacant(slot) => {
                slot.insert(WaypointData {
                    profile,
                    position,
                    velocity,
                });
                Insertion {
                    time,
                    inserted: true,
                }
            }
        }
    }

    /// The waypoint active at `time`: the earliest waypoint whose time is
    /// at or after the query. `None` when the query falls before the first
    /// waypoint's span begins or after the last waypoint.
    #[must_use]
    pub fn find(&self, time: Time) -> Option<Waypoint<'_>> {
        let start = self.start_time()?;
        if time < start {
            return None;
        }
        self.waypoints
            .range(time..)
            .next()
            .map(|(&time, data)| Waypoint { time, data })
    }

    /// Exact-key lookup.
    #[must_use]
    pub fn get(&self, time: Time) -> Option<Waypoint<'_>> {
        self.waypoints.get(&time).map(|data| Waypoint { time, data })
    }

    /// The first waypoint at or after `time`, ignoring whether `time`
    /// falls inside the trajectory's span. Lower-bound lookup.
    #[must_use]
    pub fn first_from(&self, time: Time) -> Option<Waypoint<'_>> {
        self.waypoints
            .range(time..)
            .next()
            .map(|(&time, data)| Waypoint { time, data })
    }

    /// The first waypoint, if any.
    #[must_use]
    pub fn first(&self) -> Option<Waypoint<'_>> {
        self.waypoints
            .iter()
            .next()
            .map(|(&time, data)| Waypoint { time, data })
    }

    /// The last waypoint, if any.
    #[must_use]
    pub fn last(&self) -> Option<Waypoint<'_>> {
        self.waypoints
            .iter()
            .next_back()
            .map(|(&time, data)| Waypoint { time, data })
    }

    /// Iterate waypoints in time order.
    pub fn iter(&self) -> impl Iterator<Item = Waypoint<'_>> + '_ {
        self.waypoints
            .iter()
            .map(|(&time, data)| Waypoint { time, data })
    }

    /// Remove the waypoint at `at`, returning the successor's time.
    pub fn erase(&mut self, at: Time) -> Result<Option<Time>> {
        if self.waypoints.remove(&at).is_none() {
            return Err(FleetwayError::WaypointNotFound { time: at });
        }
        Ok(self.waypoints.range(at..).next().map(|(&t, _)| t))
    }

    /// Remove every waypoint in the half-open range `[first, last)`.
    ///
    /// `first == last` (or an inverted range) removes nothing. The
    /// successor reported is the first waypoint at or after `last`.
    pub fn erase_range(&mut self, first: Time, last: Time) -> RangeErasure {
        let doomed: Vec<Time> = self
            .waypoints
            .range((Bound::Included(first), Bound::Excluded(last)))
            .map(|(&t, _)| t)
            .collect();
        for time in &doomed {
            self.waypoints.remove(time);
        }
        RangeErasure {
            removed: doomed.len(),
            successor: self.waypoints.range(last..).next().map(|(&t, _)| t),
        }
    }

    /// Drop every waypoint strictly before `cutoff`; returns how many
    /// were removed.
    pub fn cull_before(&mut self, cutoff: Time) -> usize {
        match self.start_time() {
            Some(start) if start < cutoff => self.erase_range(start, cutoff).removed,
            _ => 0,
        }
    }

    /// Replace the profile of the waypoint at `at`.
    pub fn set_profile(&mut self, at: Time, profile: ProfileHandle) -> Result<()> {
        self.data_mut(at)?.profile = profile;
        Ok(())
    }

    /// Replace the pose of the waypoint at `at`.
    pub fn set_position(&mut self, at: Time, position: Vector3<f64>) -> Result<()> {
        self.data_mut(at)?.position = position;
        Ok(())
    }

    /// Replace the twist of the waypoint at `at`.
    pub fn set_velocity(&mut self, at: Time, velocity: Vector3<f64>) -> Result<()> {
        self.data_mut(at)?.velocity = velocity;
        Ok(())
    }

    /// Move the waypoint at `from` to the time `to`, leaving every other
    /// waypoint untouched. This may reorder the waypoint relative to its
    /// neighbours; the `from` cursor is stale afterwards.
    ///
    /// Fails with [`FleetwayError::DuplicateTime`] when `to` is already
    /// another waypoint's exact time.
    pub fn change_time(&mut self, from: Time, to: Time) -> Result<()> {
        if !self.waypoints.contains_key(&from) {
            return Err(FleetwayError::WaypointNotFound { time: from });
        }
        if to != from && self.waypoints.contains_key(&to) {
            return Err(FleetwayError::DuplicateTime { time: to });
        }
        if let Some(data) = self.waypoints.remove(&from) {
            self.waypoints.insert(to, data);
        }
        Ok(())
    }

    /// Shift the waypoint at `from` and every waypoint after it by
    /// `delta`. The shift preserves the relative times of the suffix, so
    /// it can never reorder within it; the only hazard is a negative
    /// shift dragging the suffix onto or past the receiver's predecessor,
    /// which fails with [`FleetwayError::InvariantViolation`] and leaves
    /// the trajectory unchanged. On the first waypoint the check is
    /// vacuous.
    ///
    /// The whole suffix is re-keyed, so this costs O(k) in the suffix
    /// length; cursors into the suffix are stale afterwards.
    pub fn adjust_times(&mut self, from: Time, delta: Duration) -> Result<()> {
        if !self.waypoints.contains_key(&from) {
            return Err(FleetwayError::WaypointNotFound { time: from });
        }
        if delta.is_zero() {
            return Ok(());
        }
        if delta.is_negative() {
            if let Some((&predecessor, _)) = self.waypoints.range(..from).next_back() {
                if from + delta <= predecessor {
                    return Err(FleetwayError::invariant(format!(
                        "shifting {from} by {delta} would cross the previous waypoint at \
                         {predecessor}"
                    )));
                }
            }
        }
        let suffix = self.waypoints.split_off(&from);
        for (time, data) in suffix {
            self.waypoints.insert(time + delta, data);
        }
        Ok(())
    }

    /// A copy of this trajectory with `insertion` spliced into it.
    ///
    /// Every original waypoint at or after the insertion's start time is
    /// pushed back by the insertion's duration plus `delay`, then the
    /// insertion's waypoints merge in. Fails with
    /// [`FleetwayError::InvariantViolation`] when the insertion is empty
    /// or the merge would land two waypoints on the same time.
    pub fn with_interruption(&self, insertion: &Trajectory, delay: Duration) -> Result<Trajectory> {
        let Some(splice_start) = insertion.start_time() else {
            return Err(FleetwayError::invariant(
                "cannot interrupt with an empty trajectory",
            ));
        };
        let push_back = insertion.duration() + delay;
        if push_back.is_negative() {
            return Err(FleetwayError::invariant(format!(
                "interruption would pull the remaining waypoints {push_back} backwards"
            )));
        }

        let mut result = Trajectory::new(self.map_name.clone());
        for wp in self.iter() {
            let time = if wp.time() >= splice_start {
                wp.time() + push_back
            } else {
                wp.time()
            };
            result.insert(time, wp.profile().clone(), wp.position(), wp.velocity());
        }
        for wp in insertion.iter() {
            let outcome = result.insert(
                wp.time(),
                wp.profile().clone(),
                wp.position(),
                wp.velocity(),
            );
            if !outcome.inserted {
                return Err(FleetwayError::invariant(format!(
                    "interruption waypoint at {} collides with the interrupted trajectory",
                    wp.time()
                )));
            }
        }
        Ok(result)
    }

    /// A copy of this trajectory with every waypoint at or after `from`
    /// shifted by `duration`. Shifting an empty suffix is a no-op copy.
    pub fn with_delay(&self, from: Time, duration: Duration) -> Result<Trajectory> {
        let mut result = self.clone();
        if let Some(first) = result.first_from(from).map(|wp| wp.time()) {
            result.adjust_times(first, duration)?;
        }
        Ok(result)
    }

    fn data_mut(&mut self, at: Time) -> Result<&mut WaypointData> {
        self.waypoints
            .get_mut(&at)
            .ok_or(FleetwayError::WaypointNotFound { time: at })
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename = "Trajectory")]
struct TrajectoryRepr {
    map_name: String,
    waypoints: Vec<(Time, WaypointData)>,
}

impl From<Trajectory> for TrajectoryRepr {
    fn from(trajectory: Trajectory) -> Self {
        Self {
            map_name: trajectory.map_name,
            waypoints: trajectory.waypoints.into_iter().collect(),
        }
    }
}

impl TryFrom<TrajectoryRepr> for Trajectory {
    type Error = String;

    fn try_from(repr: TrajectoryRepr) -> std::result::Result<Self, Self::Error> {
        let mut waypoints = BTreeMap::new();
        for (time, data) in repr.waypoints {
            if waypoints.insert(time, data).is_some() {
                return Err(format!("duplicate waypoint time {time} in trajectory"));
            }
        }
        Ok(Self {
            map_name: repr.map_name,
            waypoints,
        })
    }
}
