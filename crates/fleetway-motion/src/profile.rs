//! Motion profiles: footprint shape + movement autonomy.
//!
//! A profile describes how a vehicle occupies space at one instant: the
//! shape of its footprint and how it intends to move through that space.
//! Profiles are shared by many waypoints (often across trajectories), and
//! mutating one is observed by every waypoint aliasing it. That sharing is
//! deliberate: flipping a fleet's profile from Strict to Queued at run
//! time must take effect everywhere at once.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use fleetway_types::ShapeHandle;

/// How a vehicle intends to move while following its trajectory.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Movement {
    /// Follow the specified trajectory exactly.
    Strict,
    /// Navigate autonomously within the specified space.
    Autonomous,
    /// Wait in the named queue until told to proceed.
    Queued {
        /// The queue the vehicle will be waiting in.
        queue_id: String,
    },
}

impl Movement {
    /// The data-free tag of this movement.
    #[must_use]
    pub const fn kind(&self) -> MovementKind {
        match self {
            Self::Strict => MovementKind::Strict,
            Self::Autonomous => MovementKind::Autonomous,
            Self::Queued { .. } => MovementKind::Queued,
        }
    }
}

/// The movement tag without its associated data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum MovementKind {
    Strict,
    Autonomous,
    Queued,
}

/// Profile-layer collision rule.
///
/// ```text
/// |============================================|
/// | Movement   | Strict  | Autonomous | Queued |
/// |------------+---------+------------+--------|
/// | Strict     | collide |    okay    | collide|
/// | Autonomous |  okay   |    okay    |  okay  |
/// | Queued     | collide |    okay    | collide|
/// |============================================|
/// ```
///
/// Pairs involving `Autonomous` never conflict at this layer: a vehicle
/// navigating freely is expected to yield on its own, so the schedule
/// does not referee its interactions.
#[must_use]
pub const fn movements_conflict(a: MovementKind, b: MovementKind) -> bool {
    !matches!(
        (a, b),
        (MovementKind::Autonomous, _) | (_, MovementKind::Autonomous)
    )
}

/// Shared handle to a [`Profile`].
pub type ProfileHandle = Arc<Profile>;

struct ProfileState {
    shape: ShapeHandle,
    movement: Movement,
}

/// Shape + movement descriptor attached to waypoints.
///
/// Construct with [`Profile::strict`], [`Profile::autonomous`], or
/// [`Profile::queued`]; all three hand back a [`ProfileHandle`] because a
/// profile is only useful shared.
pub struct Profile {
    state: RwLock<ProfileState>,
}

impl Profile {
    /// Create a profile with Strict movement.
    #[must_use]
    pub fn strict(shape: ShapeHandle) -> ProfileHandle {
        Self::with_movement(shape, Movement::Strict)
    }

    /// Create a profile with Autonomous movement.
    #[must_use]
    pub fn autonomous(shape: ShapeHandle) -> ProfileHandle {
        Self::with_movement(shape, Movement::Autonomous)
    }

    /// Create a profile waiting in the queue named by `queue_id`.
    #[must_use]
    pub fn queued(shape: ShapeHandle, queue_id: impl Into<String>) -> ProfileHandle {
        Self::with_movement(
            shape,
            Movement::Queued {
                queue_id: queue_id.into(),
            },
        )
    }

    fn with_movement(shape: ShapeHandle, movement: Movement) -> ProfileHandle {
        Arc::new(Self {
            state: RwLock::new(ProfileState { shape, movement }),
        })
    }

    /// The shape handle currently used by this profile.
    #[must_use]
    pub fn shape(&self) -> ShapeHandle {
        Arc::clone(&self.state.read().shape)
    }

    /// Swap the shape handle.
    pub fn set_shape(&self, shape: ShapeHandle) {
        self.state.write().shape = shape;
    }

    /// Snapshot of the current movement (tag plus queue id, if any).
    #[must_use]
    pub fn movement(&self) -> Movement {
        self.state.read().movement.clone()
    }

    /// The current movement tag.
    #[must_use]
    pub fn movement_kind(&self) -> MovementKind {
        self.state.read().movement.kind()
    }

    /// Set the movement of this profile to Strict.
    ///
    /// Switching out of Queued drops the queue id.
    pub fn set_to_strict(&self) {
        self.state.write().movement = Movement::Strict;
    }

    /// Set the movement of this profile to Autonomous.
    ///
    /// Switching out of Queued drops the queue id.
    pub fn set_to_autonomous(&self) {
        self.state.write().movement = Movement::Autonomous;
    }

    /// Set the movement of this profile to Queued, waiting in `queue_id`.
    pub fn set_to_queued(&self, queue_id: impl Into<String>) {
        self.state.write().movement = Movement::Queued {
            queue_id: queue_id.into(),
        };
    }

    /// The queue this profile is waiting in, or `None` when the profile
    /// is not Queued. The returned string is a snapshot; later mutations
    /// of the profile do not change it.
    #[must_use]
    pub fn queue_info(&self) -> Option<String> {
        match &self.state.read().movement {
            Movement::Queued { queue_id } => Some(queue_id.clone()),
            Movement::Strict | Movement::Autonomous => None,
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Profile")
            .field("shape", &state.shape)
            .field("movement", &state.movement)
            .finish()
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename = "Profile")]
struct ProfileRepr {
    shape: fleetway_types::FinalConvexShape,
    movement: Movement,
}

// Serialisation snapshots the state; deserialisation necessarily produces
// a fresh handle, so aliasing does not survive a wire round trip.
impl serde::Serialize for Profile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let state = self.state.read();
        let repr = ProfileRepr {
            shape: (*state.shape).clone(),
            movement: state.movement.clone(),
        };
        repr.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Profile {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = ProfileRepr::deserialize(deserializer)?;
        Ok(Self {
            state: RwLock::new(ProfileState {
                shape: Arc::new(repr.shape),
                movement: repr.movement,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetway_types::{ConvexShape, make_final_convex};

    fn unit_box() -> ShapeHandle {
        make_final_convex(&ConvexShape::unit_box())
    }

    #[test]
    fn construction() {
        let strict = Profile::strict(unit_box());
        assert_eq!(strict.movement_kind(), MovementKind::Strict);
        assert_eq!(strict.queue_info(), None);

        let queued = Profile::queued(make_final_convex(&ConvexShape::circle(1.0)), "5");
        assert_eq!(queued.movement_kind(), MovementKind::Queued);
        assert_eq!(queued.queue_info().as_deref(), Some("5"));
    }

    #[test]
    fn movement_transitions() {
        let profile = Profile::strict(unit_box());

        profile.set_to_autonomous();
        assert_eq!(profile.movement_kind(), MovementKind::Autonomous);
        assert_eq!(profile.queue_info(), None);

        profile.set_to_queued("2");
        assert_eq!(profile.movement_kind(), MovementKind::Queued);
        assert_eq!(profile.queue_info().as_deref(), Some("2"));

        // Switching out of Queued drops the queue id.
        profile.set_to_strict();
        assert_eq!(profile.movement_kind(), MovementKind::Strict);
        assert_eq!(profile.queue_info(), None);
    }

    #[test]
    fn queue_info_is_a_snapshot() {
        let profile = Profile::queued(unit_box(), "5");
        let info = profile.queue_info();
        profile.set_to_queued("6");
        assert_eq!(info.as_deref(), Some("5"));
        assert_eq!(profile.queue_info().as_deref(), Some("6"));
    }

    #[test]
    fn shape_swap() {
        let profile = Profile::strict(unit_box());
        let circle = make_final_convex(&ConvexShape::circle(2.0));
        profile.set_shape(Arc::clone(&circle));
        assert!(Arc::ptr_eq(&profile.shape(), &circle));
    }

    #[test]
    fn mutation_observed_by_aliases() {
        let profile = Profile::strict(unit_box());
        let alias = Arc::clone(&profile);
        profile.set_to_queued("9");
        assert_eq!(alias.queue_info().as_deref(), Some("9"));
    }

    #[test]
    fn collision_table() {
        use MovementKind::{Autonomous, Queued, Strict};

        assert!(movements_conflict(Strict, Strict));
        assert!(movements_conflict(Queued, Queued));
        assert!(movements_conflict(Strict, Queued));
        assert!(movements_conflict(Queued, Strict));

        assert!(!movements_conflict(Autonomous, Autonomous));
        assert!(!movements_conflict(Autonomous, Strict));
        assert!(!movements_conflict(Strict, Autonomous));
        assert!(!movements_conflict(Autonomous, Queued));
        assert!(!movements_conflict(Queued, Autonomous));
    }
}
