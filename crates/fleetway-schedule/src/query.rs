//! Declarative predicates over schedule entries.
//!
//! A query is a pure value: cheap to copy, comparable, and serialisable
//! so observers can ship their catch-up requests over the transport.

use fleetway_types::{Time, Version};

/// Which maps a query covers.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MapFilter {
    /// Entries on every map.
    #[default]
    All,
    /// Only entries on the named map.
    Name(String),
}

impl MapFilter {
    /// Whether a trajectory on `map_name` passes this filter.
    #[must_use]
    pub fn matches(&self, map_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Name(name) => name == map_name,
        }
    }
}

/// A declarative predicate over schedule entries.
///
/// Combines a map filter, an optional time window (inclusive at both
/// ends), and an optional version watermark. With a watermark, the
/// resulting patch contains only changes that took effect after it.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Query {
    map: MapFilter,
    lower_time_bound: Option<Time>,
    upper_time_bound: Option<Time>,
    after_version: Option<Version>,
}

impl Query {
    /// A query with no filters and no watermark: everything, as a
    /// compacted snapshot.
    #[must_use]
    pub fn everything() -> Self {
        Self::default()
    }

    /// A query for every change that took effect after `version`.
    #[must_use]
    pub fn after(version: Version) -> Self {
        Self {
            after_version: Some(version),
            ..Self::default()
        }
    }

    /// Restrict to entries on the named map.
    #[must_use]
    pub fn on_map(mut self, map_name: impl Into<String>) -> Self {
        self.map = MapFilter::Name(map_name.into());
        self
    }

    /// Restrict to trajectories active at or after `time`.
    #[must_use]
    pub fn starting_from(mut self, time: Time) -> Self {
        self.lower_time_bound = Some(time);
        self
    }

    /// Restrict to trajectories active at or before `time`.
    #[must_use]
    pub fn until(mut self, time: Time) -> Self {
        self.upper_time_bound = Some(time);
        self
    }

    /// Restrict to trajectories overlapping `[lower, upper]`.
    #[must_use]
    pub fn between(self, lower: Time, upper: Time) -> Self {
        self.starting_from(lower).until(upper)
    }

    /// The map filter.
    #[must_use]
    pub fn map_filter(&self) -> &MapFilter {
        &self.map
    }

    /// The inclusive time window, as `(lower, upper)` bounds.
    #[must_use]
    pub fn time_window(&self) -> (Option<Time>, Option<Time>) {
        (self.lower_time_bound, self.upper_time_bound)
    }

    /// The version watermark, if any.
    #[must_use]
    pub fn after_version(&self) -> Option<Version> {
        self.after_version
    }

    /// Whether a trajectory spanning `[start, finish]` overlaps the
    /// query's time window. Inclusive at both ends.
    #[must_use]
    pub fn window_overlaps(&self, start: Time, finish: Time) -> bool {
        if let Some(lower) = self.lower_time_bound {
            if finish < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper_time_bound {
            if upper < start {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetway_types::Duration;

    #[test]
    fn everything_has_no_filters() {
        let query = Query::everything();
        assert_eq!(query.map_filter(), &MapFilter::All);
        assert_eq!(query.time_window(), (None, None));
        assert_eq!(query.after_version(), None);
    }

    #[test]
    fn watermark_query() {
        let query = Query::after(Version::new(7));
        assert_eq!(query.after_version(), Some(Version::new(7)));
        assert_eq!(query.map_filter(), &MapFilter::All);
    }

    #[test]
    fn queries_compare_by_value() {
        let a = Query::after(Version::new(1)).on_map("lobby");
        let b = Query::after(Version::new(1)).on_map("lobby");
        assert_eq!(a, b);
        assert_ne!(a, Query::after(Version::new(2)).on_map("lobby"));
        assert_ne!(a, a.clone().on_map("depot"));
    }

    #[test]
    fn map_filter_matching() {
        assert!(MapFilter::All.matches("anything"));
        assert!(MapFilter::Name("lobby".into()).matches("lobby"));
        assert!(!MapFilter::Name("lobby".into()).matches("depot"));
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let t0 = Time::EPOCH;
        let t10 = t0 + Duration::from_secs(10);
        let query = Query::everything().between(t0, t10);

        // Trajectory finishing exactly at the lower bound overlaps.
        assert!(query.window_overlaps(t0 - Duration::from_secs(5), t0));
        // Trajectory starting exactly at the upper bound overlaps.
        assert!(query.window_overlaps(t10, t10 + Duration::from_secs(5)));
        // Fully outside on either side does not.
        assert!(!query.window_overlaps(
            t0 - Duration::from_secs(5),
            t0 - Duration::from_secs(1)
        ));
        assert!(!query.window_overlaps(
            t10 + Duration::from_secs(1),
            t10 + Duration::from_secs(5)
        ));
    }

    #[test]
    fn half_open_bounds() {
        let t0 = Time::EPOCH;
        let from_only = Query::everything().starting_from(t0);
        assert!(from_only.window_overlaps(t0 - Duration::from_secs(10), t0));
        assert!(!from_only.window_overlaps(
            t0 - Duration::from_secs(10),
            t0 - Duration::from_secs(1)
        ));

        let until_only = Query::everything().until(t0);
        assert!(until_only.window_overlaps(t0, t0 + Duration::from_secs(10)));
        assert!(!until_only.window_overlaps(
            t0 + Duration::from_secs(1),
            t0 + Duration::from_secs(10)
        ));
    }
}
