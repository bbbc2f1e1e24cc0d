//! Cubic motion segments between consecutive waypoints.
//!
//! Between two waypoints the vehicle is modelled as a cubic Hermite curve
//! per axis, matching position and velocity at both ends. Conflict
//! detection evaluates these curves and bounds them by their local
//! extrema.

use nalgebra::{Vector2, Vector3};

use fleetway_types::Time;

use crate::trajectory::Waypoint;

/// Hermite coefficients for one axis on the unit interval:
/// `p(u) = a·u³ + b·u² + c·u + d` with `u = (t - start) / (finish - start)`.
#[derive(Debug, Clone, Copy)]
struct AxisCoeffs {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl AxisCoeffs {
    /// Fit the endpoint positions and velocities. Velocities are given in
    /// units per second and scaled onto the unit interval.
    fn fit(p0: f64, p1: f64, v0: f64, v1: f64, segment_secs: f64) -> Self {
        let m0 = v0 * segment_secs;
        let m1 = v1 * segment_secs;
        Self {
            a: 2.0 * p0 - 2.0 * p1 + m0 + m1,
            b: -3.0 * p0 + 3.0 * p1 - 2.0 * m0 - m1,
            c: m0,
            d: p0,
        }
    }

    fn position(&self, u: f64) -> f64 {
        ((self.a * u + self.b) * u + self.c) * u + self.d
    }

    /// Derivative with respect to `u` (not wall time).
    fn derivative(&self, u: f64) -> f64 {
        (3.0 * self.a * u + 2.0 * self.b) * u + self.c
    }

    /// Minimum and maximum of `p(u)` over `u ∈ [0, 1]`: the boundary
    /// values plus any interior roots of the derivative.
    fn extrema(&self) -> (f64, f64) {
        let mut lo = self.position(0.0);
        let mut hi = lo;
        let mut consider = |value: f64| {
            lo = lo.min(value);
            hi = hi.max(value);
        };
        consider(self.position(1.0));

        // p'(u) = 3a·u² + 2b·u + c
        let (qa, qb, qc) = (3.0 * self.a, 2.0 * self.b, self.c);
        if qa.abs() < f64::EPSILON {
            if qb.abs() > f64::EPSILON {
                let u = -qc / qb;
                if (0.0..=1.0).contains(&u) {
                    consider(self.position(u));
                }
            }
        } else {
            let discriminant = qb * qb - 4.0 * qa * qc;
            if discriminant >= 0.0 {
                let sqrt_d = discriminant.sqrt();
                for u in [(-qb + sqrt_d) / (2.0 * qa), (-qb - sqrt_d) / (2.0 * qa)] {
                    if (0.0..=1.0).contains(&u) {
                        consider(self.position(u));
                    }
                }
            }
        }
        (lo, hi)
    }
}

/// One motion segment: the cubic between a waypoint and its successor.
#[derive(Debug, Clone, Copy)]
pub struct Spline {
    start_time: Time,
    finish_time: Time,
    x: AxisCoeffs,
    y: AxisCoeffs,
    theta: AxisCoeffs,
}

impl Spline {
    /// Fit the segment from `start` to `finish`.
    ///
    /// Callers guarantee `start.time() < finish.time()`; consecutive
    /// trajectory waypoints always satisfy this.
    #[must_use]
    pub fn from_segment(start: &Waypoint<'_>, finish: &Waypoint<'_>) -> Self {
        let segment_secs = (finish.time() - start.time()).as_secs_f64();
        let p0 = start.position();
        let p1 = finish.position();
        let v0 = start.velocity();
        let v1 = finish.velocity();
        Self {
            start_time: start.time(),
            finish_time: finish.time(),
            x: AxisCoeffs::fit(p0.x, p1.x, v0.x, v1.x, segment_secs),
            y: AxisCoeffs::fit(p0.y, p1.y, v0.y, v1.y, segment_secs),
            theta: AxisCoeffs::fit(p0.z, p1.z, v0.z, v1.z, segment_secs),
        }
    }

    /// When this segment begins.
    #[must_use]
    pub fn start_time(&self) -> Time {
        self.start_time
    }

    /// When this segment ends.
    #[must_use]
    pub fn finish_time(&self) -> Time {
        self.finish_time
    }

    fn unit_parameter(&self, time: Time) -> f64 {
        let span = (self.finish_time - self.start_time).as_secs_f64();
        let offset = (time - self.start_time).as_secs_f64();
        (offset / span).clamp(0.0, 1.0)
    }

    /// Pose at `time`, clamped to the segment's span.
    #[must_use]
    pub fn position(&self, time: Time) -> Vector3<f64> {
        let u = self.unit_parameter(time);
        Vector3::new(
            self.x.position(u),
            self.y.position(u),
            self.theta.position(u),
        )
    }

    /// Twist at `time` in units per second, clamped to the segment's span.
    #[must_use]
    pub fn velocity(&self, time: Time) -> Vector3<f64> {
        let span = (self.finish_time - self.start_time).as_secs_f64();
        let u = self.unit_parameter(time);
        Vector3::new(
            self.x.derivative(u) / span,
            self.y.derivative(u) / span,
            self.theta.derivative(u) / span,
        )
    }

    /// Axis-aligned bounds of the planar motion over the whole segment,
    /// as `(min, max)` corners.
    #[must_use]
    pub fn bounding_box(&self) -> (Vector2<f64>, Vector2<f64>) {
        let (x_lo, x_hi) = self.x.extrema();
        let (y_lo, y_hi) = self.y.extrema();
        (Vector2::new(x_lo, y_lo), Vector2::new(x_hi, y_hi))
    }
}

/// Whether two axis-aligned boxes, each inflated by a radius, overlap.
#[must_use]
pub fn inflated_boxes_overlap(
    a: (Vector2<f64>, Vector2<f64>),
    a_inflation: f64,
    b: (Vector2<f64>, Vector2<f64>),
    b_inflation: f64,
) -> bool {
    let inflation = a_inflation + b_inflation;
    a.0.x - inflation <= b.1.x
        && b.0.x - inflation <= a.1.x
        && a.0.y - inflation <= b.1.y
        && b.0.y - inflation <= a.1.y
}
