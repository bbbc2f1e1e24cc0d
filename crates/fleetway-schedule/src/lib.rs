//! The shared traffic schedule: a versioned database of trajectories.
//!
//! Participants submit trajectories to the [`Database`], which assigns
//! each accepted mutation a monotonically increasing version and records
//! it in an append-only change log. Observers catch up deterministically
//! by issuing [`Query`]s carrying the last version they saw and applying
//! the returned [`Patch`]es, typically through a [`Mirror`].

pub mod change;
pub mod database;
pub mod mirror;
pub mod patch;
pub mod query;
pub mod shared;
pub mod viewer;

pub use change::{Change, ChangeMode, VersionedChange};
pub use database::Database;
pub use mirror::Mirror;
pub use patch::Patch;
pub use query::{MapFilter, Query};
pub use shared::SharedSchedule;
pub use viewer::Viewer;
