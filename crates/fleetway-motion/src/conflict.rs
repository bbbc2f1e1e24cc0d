//! Spatiotemporal conflict detection between two trajectories.
//!
//! Detection runs in two phases. The broad phase walks the two segment
//! sequences with a two-pointer sweep and rejects pairs whose inflated
//! bounding boxes cannot touch. The narrow phase samples the cubic motion
//! of the surviving segment pairs over their common time window and
//! reports an approach closer than the combined footprint radii.
//!
//! The profile layer filters first: segment pairs whose movements cannot
//! conflict (any pairing that involves Autonomous) are never reported,
//! regardless of geometry.

use tracing::debug;

use fleetway_error::{FleetwayError, Result};
use fleetway_types::Time;

use crate::profile::{MovementKind, movements_conflict};
use crate::spline::{Spline, inflated_boxes_overlap};
use crate::trajectory::Trajectory;

/// Samples per overlapping segment pair in the narrow phase.
const NARROW_PHASE_SAMPLES: u32 = 64;

/// One detected conflict between two trajectories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conflict {
    /// When the footprints first come within reach of each other.
    pub time: Time,
    /// The conflicting segment of the first trajectory, named by the time
    /// of its finishing waypoint.
    pub a_segment: Time,
    /// The conflicting segment of the second trajectory.
    pub b_segment: Time,
}

struct Segment {
    spline: Spline,
    movement: MovementKind,
    /// Containing-circle radius of the finishing waypoint's footprint.
    radius: f64,
}

fn segments(trajectory: &Trajectory) -> Result<Vec<Segment>> {
    if trajectory.len() < 2 {
        return Err(FleetwayError::InvalidTrajectory {
            waypoints: trajectory.len(),
        });
    }
    let waypoints: Vec<_> = trajectory.iter().collect();
    Ok(waypoints
        .windows(2)
        .map(|pair| Segment {
            spline: Spline::from_segment(&pair[0], &pair[1]),
            movement: pair[1].profile().movement_kind(),
            radius: pair[1].profile().shape().characteristic_length(),
        })
        .collect())
}

/// Whether the trajectories share a map and an overlapping time range.
fn share_spacetime(a: &Trajectory, b: &Trajectory) -> bool {
    if a.map_name() != b.map_name() {
        return false;
    }
    let (Some(a_start), Some(a_finish)) = (a.start_time(), a.finish_time()) else {
        return false;
    };
    let (Some(b_start), Some(b_finish)) = (b.start_time(), b.finish_time()) else {
        return false;
    };
    b_start <= a_finish && a_start <= b_finish
}

/// Walk overlapping segment pairs of two trajectories in time order.
fn each_overlapping_pair(
    a: &[Segment],
    b: &[Segment],
    mut visit: impl FnMut(&Segment, &Segment) -> bool,
) {
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        let sa = &a[i];
        let sb = &b[j];
        if sa.spline.finish_time() < sb.spline.start_time() {
            i += 1;
            continue;
        }
        if sb.spline.finish_time() < sa.spline.start_time() {
            j += 1;
            continue;
        }
        if visit(sa, sb) {
            return;
        }
        if sa.spline.finish_time() < sb.spline.finish_time() {
            i += 1;
        } else if sb.spline.finish_time() < sa.spline.finish_time() {
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }
}

/// Cheap rejection test: can these trajectories possibly conflict?
///
/// Fails with [`FleetwayError::InvalidTrajectory`] when either trajectory
/// has fewer than two waypoints.
pub fn broad_phase(a: &Trajectory, b: &Trajectory) -> Result<bool> {
    let a_segments = segments(a)?;
    let b_segments = segments(b)?;
    if !share_spacetime(a, b) {
        return Ok(false);
    }

    let mut overlapping = false;
    each_overlapping_pair(&a_segments, &b_segments, |sa, sb| {
        if inflated_boxes_overlap(
            sa.spline.bounding_box(),
            sa.radius,
            sb.spline.bounding_box(),
            sb.radius,
        ) {
            overlapping = true;
            return true;
        }
        false
    });
    Ok(overlapping)
}

fn narrow_phase(a: &[Segment], b: &[Segment], quit_after_one: bool) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    each_overlapping_pair(a, b, |sa, sb| {
        if !movements_conflict(sa.movement, sb.movement) {
            return false;
        }
        if !inflated_boxes_overlap(
            sa.spline.bounding_box(),
            sa.radius,
            sb.spline.bounding_box(),
            sb.radius,
        ) {
            return false;
        }

        let window_start = sa.spline.start_time().max(sb.spline.start_time());
        let window_finish = sa.spline.finish_time().min(sb.spline.finish_time());
        let window = window_finish - window_start;
        let reach = sa.radius + sb.radius;
        for step in 0..=NARROW_PHASE_SAMPLES {
            let offset = fleetway_types::Duration::from_nanos(
                window.nanos() * i64::from(step) / i64::from(NARROW_PHASE_SAMPLES),
            );
            let time = window_start + offset;
            let pa = sa.spline.position(time);
            let pb = sb.spline.position(time);
            let distance = (pa.x - pb.x).hypot(pa.y - pb.y);
            if distance < reach {
                conflicts.push(Conflict {
                    time,
                    a_segment: sa.spline.finish_time(),
                    b_segment: sb.spline.finish_time(),
                });
                return quit_after_one;
            }
        }
        false
    });
    conflicts
}

/// All conflicts between two trajectories, in time order of discovery.
///
/// Returns an empty list when the trajectories are on different maps or
/// their time ranges do not overlap. Fails with
/// [`FleetwayError::InvalidTrajectory`] when either trajectory has fewer
/// than two waypoints.
pub fn between(a: &Trajectory, b: &Trajectory) -> Result<Vec<Conflict>> {
    let a_segments = segments(a)?;
    let b_segments = segments(b)?;
    if !share_spacetime(a, b) {
        return Ok(Vec::new());
    }
    let conflicts = narrow_phase(&a_segments, &b_segments, false);
    if !conflicts.is_empty() {
        debug!(
            map = a.map_name(),
            count = conflicts.len(),
            "trajectory conflict detected"
        );
    }
    Ok(conflicts)
}

/// Like [`between`], but stops at the first conflict found.
pub fn first_between(a: &Trajectory, b: &Trajectory) -> Result<Option<Conflict>> {
    let a_segments = segments(a)?;
    let b_segments = segments(b)?;
    if !share_spacetime(a, b) {
        return Ok(None);
    }
    Ok(narrow_phase(&a_segments, &b_segments, true).into_iter().next())
}
