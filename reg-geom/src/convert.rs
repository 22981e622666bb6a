use reg_core::{
    nalgebra::{Matrix3xX, Point3, Vector3},
    RegistrationError, Result,
};

/// Mean of the points, or `None` if there are none.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().map(|p| p.coords).sum::<Vector3<f64>>();
    Some(Point3::from(sum / points.len() as f64))
}

/// Stacks the points as the columns of a `3xN` matrix.
pub fn points_to_matrix(points: &[Point3<f64>]) -> Matrix3xX<f64> {
    Matrix3xX::from_fn(points.len(), |r, c| points[c][r])
}

/// Stacks `point - centroid` for every point as the columns of a `3xN` matrix.
pub fn centered_matrix(points: &[Point3<f64>], centroid: &Point3<f64>) -> Matrix3xX<f64> {
    Matrix3xX::from_fn(points.len(), |r, c| points[c][r] - centroid[r])
}

/// Splits the columns of a `3xN` matrix back into points.
pub fn matrix_to_points(matrix: &Matrix3xX<f64>) -> Vec<Point3<f64>> {
    matrix
        .column_iter()
        .map(|column| Point3::from(column.into_owned()))
        .collect()
}

/// Reads a flat `[x0, y0, z0, x1, y1, z1, ...]` buffer as points.
///
/// Fails with [`RegistrationError::MalformedBuffer`] if the length is not a multiple of 3.
pub fn points_from_flat(coordinates: &[f64]) -> Result<Vec<Point3<f64>>> {
    if coordinates.len() % 3 != 0 {
        return Err(RegistrationError::MalformedBuffer {
            len: coordinates.len(),
        });
    }
    Ok(coordinates
        .chunks_exact(3)
        .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
        .collect())
}

/// The `3xN` matrix of `target - source` displacement vectors.
///
/// Both slices must have the same length.
pub fn displacements(source: &[Point3<f64>], target: &[Point3<f64>]) -> Matrix3xX<f64> {
    debug_assert_eq!(source.len(), target.len());
    Matrix3xX::from_fn(source.len(), |r, c| target[c][r] - source[c][r])
}
