//! Closed-form landmark registration.
//!
//! Given two sets of corresponding points, this finds the transform `T` minimizing
//! `sum |T * source_i - target_i|^2`. The rigid and similarity solutions follow
//! "Least-Squares Estimation of Transformation Parameters Between Two Point Patterns"
//! (Umeyama, 1991): the rotation comes from the singular value decomposition of the
//! cross-covariance of the centered point sets. The affine solution is the unconstrained
//! linear least-squares fit.
//!
//! The solve is not iterative. It is `O(N)` to accumulate the covariance followed by a
//! fixed-size `3x3` decomposition, so it is cheap enough to run inside the outer loops of
//! the point-to-line and point-to-plane solvers, or inside a consensus algorithm.
//!
//! ```
//! use landmark_registration::LandmarkRegistration;
//! use reg_core::{nalgebra::{Point3, Rotation3, Vector3}, AlignmentMode, Transform};
//!
//! let truth = Transform::from_similarity(
//!     2.0,
//!     Rotation3::from_axis_angle(&Vector3::z_axis(), 0.5),
//!     Vector3::new(1.0, -2.0, 3.0),
//! );
//! let source = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let target = source.map(|p| truth.transform_point(&p));
//!
//! let registration = LandmarkRegistration::new()
//!     .mode(AlignmentMode::Similarity)
//!     .solve(&source, &target)
//!     .unwrap();
//! assert!((registration.transform.0 - truth.0).norm() < 1e-9);
//! assert!(registration.fre < 1e-9);
//! ```

use float_ord::FloatOrd;
use log::trace;
use reg_core::{
    nalgebra::{Matrix3, Point3},
    sample_consensus::Estimator,
    AlignmentMode, PointMatch, Registration, RegistrationError, Result, Transform,
};
use reg_geom::{centered_matrix, centroid, points_from_flat};

/// The minimum number of correspondences that determine a rotation.
pub const MIN_CORRESPONDENCES: usize = 3;

/// The minimum number of correspondences that determine an affine transform. They must not be
/// coplanar.
pub const MIN_AFFINE_CORRESPONDENCES: usize = 4;

/// Ratio of the smallest to the largest eigenvalue of the source scatter below which
/// the affine normal equations are considered singular.
const AFFINE_CONDITION_EPSILON: f64 = 1e-12;

/// Solves for the transform which best aligns source landmarks to target landmarks.
///
/// The [`AlignmentMode`] picks the family of transforms:
///
/// * [`AlignmentMode::Rigid`] - rotation and translation
/// * [`AlignmentMode::Similarity`] - uniform scale, rotation and translation
/// * [`AlignmentMode::Affine`] - any linear map and translation
///
/// Rigid and similarity solutions never contain a reflection. If the unconstrained orthogonal
/// solution has a negative determinant (which happens with planar or noisy points), the singular
/// vector of the smallest singular value is flipped to produce the best proper rotation.
///
/// Collinear points do not determine the rotation about their common line. The solve still
/// returns a finite proper transform for them, but it is only accurate along the line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LandmarkRegistration {
    mode: AlignmentMode,
    epsilon: f64,
    max_iterations: usize,
}

impl LandmarkRegistration {
    /// Creates a rigid `LandmarkRegistration` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the family of transforms to solve for.
    ///
    /// Default is [`AlignmentMode::Rigid`].
    #[must_use]
    pub fn mode(self, mode: AlignmentMode) -> Self {
        Self { mode, ..self }
    }

    /// Set the epsilon used in the SVD and symmetric eigen solvers.
    ///
    /// Default is `1e-12`.
    #[must_use]
    pub fn epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    /// Set the maximum number of iterations for the SVD and symmetric eigen solvers.
    ///
    /// Default is `1000`.
    #[must_use]
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// The family of transforms this solver produces.
    pub fn alignment_mode(&self) -> AlignmentMode {
        self.mode
    }

    /// Solves for the transform and reports its fiducial registration error.
    pub fn solve(&self, source: &[Point3<f64>], target: &[Point3<f64>]) -> Result<Registration> {
        let transform = self.align(source, target)?;
        let fre = fiducial_registration_error(&transform, source, target);
        trace!(
            "{:?} landmark registration of {} points, fre {}",
            self.mode,
            source.len(),
            fre
        );
        Ok(Registration {
            transform,
            fre,
            iterations: 1,
        })
    }

    /// Same as [`LandmarkRegistration::solve`], reading points from flat `xyz` buffers.
    pub fn solve_flat(&self, source: &[f64], target: &[f64]) -> Result<Registration> {
        self.solve(&points_from_flat(source)?, &points_from_flat(target)?)
    }

    /// Solves for the transform only.
    pub fn align(&self, source: &[Point3<f64>], target: &[Point3<f64>]) -> Result<Transform> {
        if source.len() != target.len() {
            return Err(RegistrationError::MismatchedCorrespondences {
                sources: source.len(),
                targets: target.len(),
            });
        }
        if source.len() < MIN_CORRESPONDENCES {
            return Err(RegistrationError::InsufficientCorrespondences {
                required: MIN_CORRESPONDENCES,
                provided: source.len(),
            });
        }

        let transform = match self.mode {
            AlignmentMode::Rigid => self.orthogonal(source, target, false)?,
            AlignmentMode::Similarity => self.orthogonal(source, target, true)?,
            AlignmentMode::Affine => self.affine(source, target)?,
        };

        if transform.is_finite() {
            Ok(transform)
        } else {
            Err(RegistrationError::NonFinite)
        }
    }

    /// Rigid or similarity solve, depending on `scaled`.
    fn orthogonal(
        &self,
        source: &[Point3<f64>],
        target: &[Point3<f64>],
        scaled: bool,
    ) -> Result<Transform> {
        let (source_centroid, target_centroid) = centroids(source, target)?;
        let source_centered = centered_matrix(source, &source_centroid);
        let target_centered = centered_matrix(target, &target_centroid);

        let spread = source_centered.norm_squared();
        if scaled {
            let magnitude = source.iter().map(|p| p.coords.norm_squared()).sum::<f64>();
            if spread <= 1e-20 * magnitude.max(1.0) {
                return Err(RegistrationError::DegenerateGeometry(
                    "source points are coincident",
                ));
            }
        }

        // Cross-covariance H = sum (t_i - t)(s_i - s)^T.
        let covariance: Matrix3<f64> = &target_centered * source_centered.transpose();
        let svd = covariance
            .try_svd(true, true, self.epsilon, self.max_iterations)
            .ok_or(RegistrationError::DecompositionFailed)?;
        let mut u = svd.u.ok_or(RegistrationError::DecompositionFailed)?;
        let v_t = svd.v_t.ok_or(RegistrationError::DecompositionFailed)?;
        let mut singular_values = svd.singular_values;

        let mut rotation = u * v_t;
        if rotation.determinant() < 0.0 {
            // The unconstrained optimum is a reflection. Flipping the axis with the least
            // support gives the best proper rotation.
            let smallest = singular_values
                .iter()
                .enumerate()
                .min_by_key(|&(_, &n)| FloatOrd(n))
                .map(|(ix, _)| ix)
                .unwrap_or(2);
            u.column_mut(smallest).scale_mut(-1.0);
            singular_values[smallest] = -singular_values[smallest];
            rotation = u * v_t;
            trace!("corrected reflection along singular vector {}", smallest);
        }

        let scale = if scaled {
            singular_values.sum() / spread
        } else {
            1.0
        };

        let linear = rotation * scale;
        let translation = target_centroid.coords - linear * source_centroid.coords;
        Ok(Transform::from_parts(linear, translation))
    }

    /// Unconstrained linear least squares through the normal equations of the centered sets.
    fn affine(&self, source: &[Point3<f64>], target: &[Point3<f64>]) -> Result<Transform> {
        let (source_centroid, target_centroid) = centroids(source, target)?;
        let source_centered = centered_matrix(source, &source_centroid);
        let target_centered = centered_matrix(target, &target_centroid);

        let scatter: Matrix3<f64> = &source_centered * source_centered.transpose();
        let eigen = scatter
            .try_symmetric_eigen(self.epsilon, self.max_iterations)
            .ok_or(RegistrationError::DecompositionFailed)?;
        let largest = eigen.eigenvalues.max();
        let smallest = eigen.eigenvalues.min();
        if largest <= 0.0 || smallest <= AFFINE_CONDITION_EPSILON * largest {
            return Err(RegistrationError::SingularSystem);
        }
        let inverse_scatter = scatter
            .try_inverse()
            .ok_or(RegistrationError::SingularSystem)?;

        let linear: Matrix3<f64> = &target_centered * source_centered.transpose() * inverse_scatter;
        let translation = target_centroid.coords - linear * source_centroid.coords;
        Ok(Transform::from_parts(linear, translation))
    }
}

impl Default for LandmarkRegistration {
    fn default() -> Self {
        Self {
            mode: AlignmentMode::Rigid,
            epsilon: 1e-12,
            max_iterations: 1000,
        }
    }
}

/// Samples [`MIN_CORRESPONDENCES`] matches per hypothesis, which is only enough for the rigid
/// and similarity modes. Three points are always coplanar, so in affine mode every hypothesis
/// fails. Use [`AffineLandmarkEstimator`] for affine consensus.
impl Estimator<PointMatch> for LandmarkRegistration {
    type Model = Transform;
    type ModelIter = Option<Transform>;
    const MIN_SAMPLES: usize = MIN_CORRESPONDENCES;

    fn estimate<I>(&self, data: I) -> Self::ModelIter
    where
        I: Iterator<Item = PointMatch> + Clone,
    {
        let (source, target): (Vec<Point3<f64>>, Vec<Point3<f64>>) =
            data.map(|PointMatch(s, t)| (s, t)).unzip();
        self.align(&source, &target).ok()
    }
}

/// Affine landmark registration as a consensus estimator.
///
/// Draws [`MIN_AFFINE_CORRESPONDENCES`] matches per hypothesis and always solves in
/// [`AlignmentMode::Affine`], whatever the mode of the wrapped solver.
///
/// ```
/// use landmark_registration::AffineLandmarkEstimator;
/// use reg_core::{nalgebra::{Matrix3, Point3, Vector3}, sample_consensus::Estimator, PointMatch, Transform};
///
/// let truth = Transform::from_parts(
///     Matrix3::new(1.0, 0.5, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0),
///     Vector3::new(1.0, 2.0, 3.0),
/// );
/// let matches = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ]
/// .map(|p| PointMatch(p, truth.transform_point(&p)));
/// let transform = AffineLandmarkEstimator::default()
///     .estimate(matches.iter().copied())
///     .unwrap();
/// assert!((transform.0 - truth.0).norm() < 1e-9);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AffineLandmarkEstimator(pub LandmarkRegistration);

impl Default for AffineLandmarkEstimator {
    fn default() -> Self {
        Self(LandmarkRegistration::new().mode(AlignmentMode::Affine))
    }
}

impl Estimator<PointMatch> for AffineLandmarkEstimator {
    type Model = Transform;
    type ModelIter = Option<Transform>;
    const MIN_SAMPLES: usize = MIN_AFFINE_CORRESPONDENCES;

    fn estimate<I>(&self, data: I) -> Self::ModelIter
    where
        I: Iterator<Item = PointMatch> + Clone,
    {
        self.0.mode(AlignmentMode::Affine).estimate(data)
    }
}

/// Mean distance between each transformed source point and its target point.
///
/// Returns `0.0` for empty input.
pub fn fiducial_registration_error(
    transform: &Transform,
    source: &[Point3<f64>],
    target: &[Point3<f64>],
) -> f64 {
    if source.is_empty() {
        return 0.0;
    }
    source
        .iter()
        .zip(target)
        .map(|(s, t)| (transform.transform_point(s) - t).norm())
        .sum::<f64>()
        / source.len() as f64
}

fn centroids(
    source: &[Point3<f64>],
    target: &[Point3<f64>],
) -> Result<(Point3<f64>, Point3<f64>)> {
    centroid(source)
        .zip(centroid(target))
        .ok_or(RegistrationError::InsufficientCorrespondences {
            required: MIN_CORRESPONDENCES,
            provided: 0,
        })
}
