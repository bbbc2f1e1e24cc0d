//! Planar convex footprints and the finalised handles the core stores.
//!
//! Geometry proper (hull construction, exact distance queries) lives with
//! the collision collaborator; the schedule core only needs an opaque,
//! shareable handle to a footprint plus a conservative radius for
//! broad-phase inflation.

use std::sync::Arc;

/// A mutable source description of a convex footprint.
///
/// Sources are working values: a caller may keep adjusting one while
/// tuning a vehicle. Nothing in the schedule references a source directly;
/// profiles hold [`ShapeHandle`]s produced by [`make_final_convex`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ConvexShape {
    /// An axis-aligned rectangle, dimensions in meters.
    Box { x_length: f64, y_length: f64 },
    /// A circle, radius in meters.
    Circle { radius: f64 },
}

impl ConvexShape {
    /// A 1m x 1m box.
    #[must_use]
    pub const fn unit_box() -> Self {
        Self::Box {
            x_length: 1.0,
            y_length: 1.0,
        }
    }

    /// A circle of the given radius.
    #[must_use]
    pub const fn circle(radius: f64) -> Self {
        Self::Circle { radius }
    }

    /// Radius of the smallest circle centred on the footprint's origin
    /// that contains it. Broad-phase checks inflate bounding boxes by this.
    #[must_use]
    pub fn characteristic_length(&self) -> f64 {
        match *self {
            Self::Box { x_length, y_length } => 0.5 * x_length.hypot(y_length),
            Self::Circle { radius } => radius,
        }
    }
}

/// An immutable snapshot of a [`ConvexShape`].
///
/// Finalisation copies the source, so mutating the source afterwards does
/// not affect any profile holding the handle.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FinalConvexShape {
    source: ConvexShape,
}

impl FinalConvexShape {
    /// The snapshotted source description.
    #[must_use]
    pub fn source(&self) -> &ConvexShape {
        &self.source
    }

    /// Conservative containing-circle radius; see
    /// [`ConvexShape::characteristic_length`].
    #[must_use]
    pub fn characteristic_length(&self) -> f64 {
        self.source.characteristic_length()
    }
}

/// Shared handle to a finalised footprint.
///
/// Handles are freely cloned across waypoints, trajectories, and
/// participants; the snapshot behind them never changes.
pub type ShapeHandle = Arc<FinalConvexShape>;

/// Finalise a source shape into a shareable, immutable handle.
#[must_use]
pub fn make_final_convex(source: &ConvexShape) -> ShapeHandle {
    Arc::new(FinalConvexShape {
        source: source.clone(),
    })
}
