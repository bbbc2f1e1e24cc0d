//! Schedule time primitives.
//!
//! Trajectory waypoints are keyed by [`Time`], and the strict-ordering
//! invariant compares times exactly. Both types are integer nanosecond
//! counts so that arithmetic is exact: shifting a suffix of waypoints by a
//! [`Duration`] and shifting it back restores every key bit-for-bit.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A point in schedule time: nanoseconds from an arbitrary epoch.
///
/// The epoch is whatever the deployment agrees on (commonly "when the
/// fleet came up"); the core only ever compares and subtracts times.
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
pub struct Time(i64);

impl Time {
    /// The arbitrary zero point.
    pub const EPOCH: Self = Self(0);

    /// Create a time from raw nanoseconds since the epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Create a time from whole seconds since the epoch.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * NANOS_PER_SEC)
    }

    /// Raw nanoseconds since the epoch.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// The signed duration from `earlier` to `self`.
    #[inline]
    #[must_use]
    pub const fn since(self, earlier: Self) -> Duration {
        Duration(self.0 - earlier.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}ns", self.0)
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    #[inline]
    fn add(self, rhs: Duration) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    #[inline]
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub<Duration> for Time {
    type Output = Time;

    #[inline]
    fn sub(self, rhs: Duration) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl SubAssign<Duration> for Time {
    #[inline]
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 -= rhs.0;
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Time) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// A signed span of schedule time in nanoseconds.
///
/// Negative durations are meaningful: `adjust_times` accepts them to pull
/// a trajectory suffix earlier, subject to the ordering invariant.
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
pub struct Duration(i64);

impl Duration {
    /// The zero-length span.
    pub const ZERO: Self = Self(0);

    /// Create a duration from raw nanoseconds.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Create a duration from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * NANOS_PER_MILLI)
    }

    /// Create a duration from whole seconds.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * NANOS_PER_SEC)
    }

    /// Create a duration from fractional seconds, rounding to nanoseconds.
    ///
    /// Useful at the kinematics boundary where motion math runs in f64.
    #[inline]
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self((secs * NANOS_PER_SEC as f64).round() as i64)
    }

    /// Raw nanoseconds.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// This span as fractional seconds.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            self.0 as f64 / NANOS_PER_SEC as f64
        }
    }

    /// Whether this span is negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether this span is exactly zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

impl Add for Duration {
    type Output = Duration;

    #[inline]
    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl Neg for Duration {
    type Output = Duration;

    #[inline]
    fn neg(self) -> Duration {
        Duration(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_duration_arithmetic() {
        let t0 = Time::from_secs(100);
        let t1 = t0 + Duration::from_secs(10);
        assert_eq!(t1 - t0, Duration::from_secs(10));
        assert_eq!(t1 - Duration::from_secs(10), t0);
        assert_eq!(t1.since(t0), Duration::from_secs(10));
    }

    #[test]
    fn shift_round_trip_is_exact() {
        let t = Time::from_nanos(1_234_567_891);
        let d = Duration::from_nanos(987_654_321);
        assert_eq!((t + d) - d, t);
    }

    #[test]
    fn negative_durations() {
        let d = Duration::from_secs(-5);
        assert!(d.is_negative());
        assert_eq!(-d, Duration::from_secs(5));
        assert!(Duration::ZERO.is_zero());
    }

    #[test]
    fn fractional_seconds_round_to_nanos() {
        assert_eq!(Duration::from_secs_f64(1.5), Duration::from_millis(1500));
        assert!((Duration::from_secs(3).as_secs_f64() - 3.0).abs() < 1e-12);
    }
}
