use log::debug;
use reg_core::{
    nalgebra::{Matrix3, Point3, Vector3},
    Line, RegistrationError, Result, DEGENERATE_LENGTH,
};

/// Relative size of the determinant below which the accumulated projector is singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Distance from `point` to the line through `origin` along `direction`.
///
/// Computed as `|(p - o) x d| / |d|`, so the direction may have any non-zero length.
///
/// ```
/// use reg_core::nalgebra::{Point3, Vector3};
/// use reg_geom::point_to_line_distance;
///
/// let distance = point_to_line_distance(
///     Point3::new(3.0, 4.0, 7.0),
///     Point3::origin(),
///     Vector3::new(0.0, 0.0, 0.5),
/// )
/// .unwrap();
/// assert!((distance - 5.0).abs() < 1e-12);
/// ```
#[inline(always)]
pub fn point_to_line_distance(
    point: Point3<f64>,
    origin: Point3<f64>,
    direction: Vector3<f64>,
) -> Result<f64> {
    let length = direction.norm();
    if length < DEGENERATE_LENGTH {
        return Err(RegistrationError::DegenerateDirection);
    }
    Ok((point - origin).cross(&direction).norm() / length)
}

/// Foot of the perpendicular from `point` onto `line`.
#[inline(always)]
pub fn project_onto_line(point: Point3<f64>, line: &Line) -> Result<Point3<f64>> {
    let direction = line.unit_direction()?;
    Ok(line.origin + (point - line.origin).dot(&direction) * direction.into_inner())
}

/// The least-squares intersection of several lines.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineIntersection {
    /// The point minimizing the sum of squared distances to all lines.
    pub point: Point3<f64>,
    /// Mean perpendicular distance from `point` to each line.
    pub mean_residual: f64,
}

/// Finds the point closest to all `lines` in the least-squares sense.
///
/// From "Least-Squares Intersection of Lines" (Traa, 2013). Each line contributes the projector
/// `R = I - n n^T` onto the plane perpendicular to its unit direction `n`. The point solves
/// `(sum R) p = sum (R o)`.
///
/// A single line has no unique intersection, so its origin is returned with a residual of zero.
/// Two or more lines that are all parallel leave the system singular and fail with
/// [`RegistrationError::SingularSystem`].
///
/// # Example
/// ```
/// use reg_core::{nalgebra::{Point3, Vector3}, Line};
/// use reg_geom::lines_intersection;
///
/// // Two skew lines separated by 2 along z.
/// let lines = [
///     Line::new(Point3::new(0.0, 0.0, 0.0), Vector3::x()),
///     Line::new(Point3::new(0.0, 0.0, 2.0), Vector3::y()),
/// ];
/// let intersection = lines_intersection(&lines).unwrap();
/// assert!((intersection.point - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
/// assert!((intersection.mean_residual - 1.0).abs() < 1e-12);
/// ```
pub fn lines_intersection(lines: &[Line]) -> Result<LineIntersection> {
    let first = match lines {
        [] => {
            return Err(RegistrationError::InsufficientCorrespondences {
                required: 1,
                provided: 0,
            })
        }
        [line] => {
            line.unit_direction()?;
            return Ok(LineIntersection {
                point: line.origin,
                mean_residual: 0.0,
            });
        }
        [first, ..] => first,
    };

    let mut projector_sum: Matrix3<f64> = Matrix3::zeros();
    let mut origin_sum: Vector3<f64> = Vector3::zeros();
    for line in lines {
        let direction: Vector3<f64> = line.unit_direction()?.into_inner();
        let projector = Matrix3::identity() - direction * direction.transpose();
        projector_sum += projector;
        origin_sum += projector * line.origin.coords;
    }

    // The projector sum is positive semi-definite with a trace of 2 per line, so scale the
    // singularity test by its size.
    let size = projector_sum.trace() / 3.0;
    if projector_sum.determinant().abs() <= SINGULAR_EPSILON * size * size * size {
        debug!(
            "lines intersection is singular for {} lines, first direction {}",
            lines.len(),
            first.direction
        );
        return Err(RegistrationError::SingularSystem);
    }
    let point = Point3::from(
        projector_sum
            .try_inverse()
            .ok_or(RegistrationError::SingularSystem)?
            * origin_sum,
    );
    if !point.coords.iter().all(|n| n.is_finite()) {
        return Err(RegistrationError::NonFinite);
    }

    let mean_residual = lines
        .iter()
        .map(|line| point_to_line_distance(point, line.origin, line.direction))
        .sum::<Result<f64>>()?
        / lines.len() as f64;

    Ok(LineIntersection {
        point,
        mean_residual,
    })
}
