use reg_core::{
    nalgebra::{Point3, Unit, Vector3},
    Plane, RegistrationError, Result, DEGENERATE_LENGTH,
};

/// Finds the point on the plane through `origin` with the given `normal` that is closest to `point`.
///
/// The normal is normalized here, so it may have any non-zero length. A zero normal does not
/// describe a plane and fails with [`RegistrationError::DegenerateNormal`].
///
/// ```
/// use reg_core::nalgebra::{Point3, Vector3};
/// use reg_geom::closest_point_on_plane;
///
/// let closest = closest_point_on_plane(
///     Point3::new(1.0, 2.0, 5.0),
///     Point3::new(0.0, 0.0, 3.0),
///     Vector3::new(0.0, 0.0, 10.0),
/// )
/// .unwrap();
/// assert_eq!(closest, Point3::new(1.0, 2.0, 3.0));
/// ```
#[inline(always)]
pub fn closest_point_on_plane(
    point: Point3<f64>,
    origin: Point3<f64>,
    normal: Vector3<f64>,
) -> Result<Point3<f64>> {
    let normal =
        Unit::try_new(normal, DEGENERATE_LENGTH).ok_or(RegistrationError::DegenerateNormal)?;
    Ok(point - (point - origin).dot(&normal) * normal.into_inner())
}

/// Same as [`closest_point_on_plane`], taking a [`Plane`].
#[inline(always)]
pub fn project_onto_plane(point: Point3<f64>, plane: &Plane) -> Result<Point3<f64>> {
    closest_point_on_plane(point, plane.origin, plane.normal)
}

/// Unsigned distance from `point` to `plane`.
#[inline(always)]
pub fn point_to_plane_distance(point: Point3<f64>, plane: &Plane) -> Result<f64> {
    let normal = plane.unit_normal()?;
    Ok((point - plane.origin).dot(&normal).abs())
}
