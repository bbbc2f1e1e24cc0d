//! Motion model for the fleetway traffic schedule.
//!
//! Trajectories (time-ordered waypoint sequences), the shared motion
//! profiles attached to their waypoints, spatiotemporal conflict
//! detection between trajectories, and the interpolation helper that
//! turns sparse pose lists into feasible trajectories.

pub mod conflict;
pub mod interpolate;
pub mod profile;
pub mod spline;
pub mod trajectory;
pub mod vehicle;

pub use conflict::Conflict;
pub use profile::{Movement, MovementKind, Profile, ProfileHandle, movements_conflict};
pub use spline::Spline;
pub use trajectory::{Insertion, RangeErasure, Trajectory, Waypoint};
pub use vehicle::{Limits, VehicleTraits};
