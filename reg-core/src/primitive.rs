use crate::{RegistrationError, Result};
use nalgebra::{Point3, Unit, UnitVector3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Directions and normals shorter than this are treated as zero.
pub const DEGENERATE_LENGTH: f64 = 1e-12;

/// An infinite line through `origin` along `direction`.
///
/// The corresponding point is known to lie somewhere on the line, but not where.
/// The direction does not have to be normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Line {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Line {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Creates the line passing through `a` and then `b`.
    pub fn through(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self::new(a, b - a)
    }

    /// Normalized direction of the line.
    ///
    /// Fails with [`RegistrationError::DegenerateDirection`] if the direction has no length.
    pub fn unit_direction(&self) -> Result<UnitVector3<f64>> {
        Unit::try_new(self.direction, DEGENERATE_LENGTH)
            .ok_or(RegistrationError::DegenerateDirection)
    }

    /// The point `t` units of `direction` along the line (not normalized).
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

/// A plane through `origin` with the given `normal`.
///
/// The normal does not have to be normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    pub origin: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { origin, normal }
    }

    /// Normalized normal of the plane.
    ///
    /// Fails with [`RegistrationError::DegenerateNormal`] if the normal has no length.
    pub fn unit_normal(&self) -> Result<UnitVector3<f64>> {
        Unit::try_new(self.normal, DEGENERATE_LENGTH).ok_or(RegistrationError::DegenerateNormal)
    }
}
