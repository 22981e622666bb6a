use crate::{PointMatch, RegistrationError, Result};
use core::ops::Mul;
use derive_more::{AsMut, AsRef, From, Into};
use nalgebra::{IsometryMatrix3, Matrix3, Matrix4, Point3, Rotation3, Vector3};
use sample_consensus::Model;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Relative tolerance used to decide whether a linear part is a scaled rotation.
const SIMILARITY_EPSILON: f64 = 1e-9;

/// A 4x4 homogeneous transform from the source frame to the target frame.
///
/// The upper-left 3x3 block is the linear part and the last column holds the translation.
/// Points are column vectors, so a point `p` maps to `linear * p + translation`.
///
/// Rigid and similarity registrations always produce a linear part that is a non-negative
/// multiple of a proper rotation (no reflection). Affine registrations produce an arbitrary
/// linear part.
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Transform(pub Matrix4<f64>);

impl Transform {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// The all-zero matrix (identity scaled by zero).
    ///
    /// This is only meaningful to legacy callers which read it as "registration failed".
    /// It is never returned by a solver in this workspace.
    pub fn zero() -> Self {
        Self(Matrix4::zeros())
    }

    /// Create the transform from its linear part and translation.
    pub fn from_parts(linear: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        let mut homogeneous = Matrix4::identity();
        homogeneous.fixed_slice_mut::<3, 3>(0, 0).copy_from(&linear);
        homogeneous.fixed_slice_mut::<3, 1>(0, 3).copy_from(&translation);
        Self(homogeneous)
    }

    /// Create the transform `scale * rotation * p + translation`.
    pub fn from_similarity(scale: f64, rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self::from_parts(rotation.matrix() * scale, translation)
    }

    pub fn from_isometry(isometry: IsometryMatrix3<f64>) -> Self {
        Self(isometry.to_homogeneous())
    }

    /// Retrieve the homogeneous matrix.
    pub fn homogeneous(self) -> Matrix4<f64> {
        self.into()
    }

    /// The upper-left 3x3 block.
    pub fn linear(&self) -> Matrix3<f64> {
        self.0.fixed_slice::<3, 3>(0, 0).into_owned()
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.0.fixed_slice::<3, 1>(0, 3).into_owned()
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.linear().determinant()
    }

    /// The uniform scale of the linear part.
    ///
    /// This is exact for similarity transforms. For affine transforms it is the root mean square
    /// of the singular values of the linear part.
    pub fn scale(&self) -> f64 {
        let linear = self.linear();
        ((linear.transpose() * linear).trace() / 3.0).sqrt()
    }

    /// The rotation of a similarity transform, with the scale divided out.
    ///
    /// Returns `None` if the transform is not a similarity or has zero scale.
    pub fn rotation(&self) -> Option<Rotation3<f64>> {
        let scale = self.scale();
        if !self.is_similarity() || scale <= SIMILARITY_EPSILON {
            return None;
        }
        Some(Rotation3::from_matrix_unchecked(self.linear() / scale))
    }

    /// Checks if the linear part is a non-negative multiple of a proper rotation.
    pub fn is_similarity(&self) -> bool {
        let linear = self.linear();
        let gram = linear.transpose() * linear;
        let squared_scale = gram.trace() / 3.0;
        let deviation = (gram - Matrix3::identity() * squared_scale).norm();
        deviation <= SIMILARITY_EPSILON * squared_scale.max(1.0) && linear.determinant() >= 0.0
    }

    /// Checks that no element is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|n| n.is_finite())
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.linear() * point.coords + self.translation())
    }

    /// Transforms a direction, ignoring the translation.
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.linear() * vector
    }

    /// Returns the transform which applies `first` and then `self`.
    #[must_use]
    pub fn compose(self, first: Transform) -> Self {
        Self(self.0 * first.0)
    }

    /// Inverts the transform, mapping the target frame back to the source frame.
    ///
    /// Similarity transforms are inverted in closed form (`linear^T / scale^2`), which is
    /// exact and cheap. Other transforms use a checked 4x4 inverse and fail with
    /// [`RegistrationError::SingularSystem`] if the linear part is not invertible.
    pub fn inverse(&self) -> Result<Self> {
        let linear = self.linear();
        let squared_scale = (linear.transpose() * linear).trace() / 3.0;
        if self.is_similarity() && squared_scale > SIMILARITY_EPSILON {
            let inverse_linear = linear.transpose() / squared_scale;
            let translation = -(inverse_linear * self.translation());
            return Ok(Self::from_parts(inverse_linear, translation));
        }
        self.0
            .try_inverse()
            .map(Self)
            .filter(Transform::is_finite)
            .ok_or(RegistrationError::SingularSystem)
    }

    /// The matrix as nested rows, for consumers which expect row-major data.
    pub fn to_row_major(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.0[(r, c)];
            }
        }
        rows
    }

    pub fn from_row_major(rows: [[f64; 4]; 4]) -> Self {
        Self(Matrix4::from_fn(|r, c| rows[r][c]))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(rhs)
    }
}

impl Model<PointMatch> for Transform {
    #[inline(always)]
    fn residual(&self, data: &PointMatch) -> f64 {
        let &PointMatch(source, target) = data;
        (self.transform_point(&source) - target).norm()
    }
}
