//! Kinematic limits of a scheduled vehicle.

use fleetway_error::{FleetwayError, Result};

/// Velocity and acceleration ceilings for one degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Limits {
    /// Maximum speed, in m/s (linear) or rad/s (rotational).
    pub velocity: f64,
    /// Maximum acceleration, in m/s² or rad/s².
    pub acceleration: f64,
}

impl Limits {
    /// Create a limits pair.
    #[must_use]
    pub const fn new(velocity: f64, acceleration: f64) -> Self {
        Self {
            velocity,
            acceleration,
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        if !self.velocity.is_finite() || self.velocity <= 0.0 {
            return Err(FleetwayError::invalid_traits(format!(
                "{what} velocity must be finite and positive, got {}",
                self.velocity
            )));
        }
        if !self.acceleration.is_finite() || self.acceleration <= 0.0 {
            return Err(FleetwayError::invalid_traits(format!(
                "{what} acceleration must be finite and positive, got {}",
                self.acceleration
            )));
        }
        Ok(())
    }
}

/// The kinematic envelope interpolation plans within.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VehicleTraits {
    /// Translational limits.
    pub linear: Limits,
    /// Rotational limits about the vertical axis.
    pub rotational: Limits,
}

impl VehicleTraits {
    /// Create traits from linear and rotational limits.
    #[must_use]
    pub const fn new(linear: Limits, rotational: Limits) -> Self {
        Self { linear, rotational }
    }

    /// Check that every limit is usable for interpolation.
    pub fn validate(&self) -> Result<()> {
        self.linear.validate("linear")?;
        self.rotational.validate("rotational")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_traits_pass() {
        let traits = VehicleTraits::new(Limits::new(0.7, 0.5), Limits::new(0.6, 1.5));
        assert!(traits.validate().is_ok());
    }

    #[test]
    fn non_positive_limits_fail() {
        let traits = VehicleTraits::new(Limits::new(0.0, 0.5), Limits::new(0.6, 1.5));
        assert!(matches!(
            traits.validate(),
            Err(FleetwayError::InvalidTraits { .. })
        ));

        let traits = VehicleTraits::new(Limits::new(0.7, 0.5), Limits::new(0.6, -1.0));
        assert!(matches!(
            traits.validate(),
            Err(FleetwayError::InvalidTraits { .. })
        ));
    }

    #[test]
    fn non_finite_limits_fail() {
        let traits = VehicleTraits::new(Limits::new(f64::NAN, 0.5), Limits::new(0.6, 1.5));
        assert!(traits.validate().is_err());
        let traits = VehicleTraits::new(Limits::new(0.7, f64::INFINITY), Limits::new(0.6, 1.5));
        assert!(traits.validate().is_err());
    }
}
