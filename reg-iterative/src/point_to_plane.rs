use crate::{session::validate_pairs, BackgroundSolve, IterativeSettings, Session, SessionState};
use landmark_registration::{LandmarkRegistration, MIN_CORRESPONDENCES};
use log::{debug, trace};
use reg_core::{
    nalgebra::{Matrix3, Matrix3xX, Point3},
    AlignmentMode, Plane, Registration, RegistrationError, Result,
};
use reg_geom::{displacements, point_to_plane_distance, project_onto_plane};
use std::sync::atomic::{AtomicBool, Ordering};

/// Smallest to largest eigenvalue ratio of the normal scatter below which the planes do not
/// pin down all three translation axes.
const NORMAL_SPAN_EPSILON: f64 = 1e-9;

/// Registers source points to planes in the target frame with a rigid transform.
///
/// Each source point is known to lie on its plane once transformed, such as a point digitized on
/// a bone surface. Starting from the identity, every iteration moves each transformed source to
/// the closest point on its plane, then solves the rigid landmark registration from the original
/// sources to those closest points.
///
/// Unlike [`crate::PointToLineRegistration`], the planes must constrain all three directions:
/// if the normals are all parallel or all perpendicular to one direction, the translation along
/// it is arbitrary and the solve fails with [`RegistrationError::DegenerateGeometry`].
#[derive(Debug, Clone, Default)]
pub struct PointToPlaneRegistration {
    session: Session<Plane>,
    settings: IterativeSettings,
}

impl PointToPlaneRegistration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_settings(settings: IterativeSettings) -> Self {
        Self {
            session: Session::new(),
            settings,
        }
    }

    /// Set the convergence tolerance.
    ///
    /// Default is `1e-4`.
    #[must_use]
    pub fn tolerance(self, tolerance: f64) -> Self {
        Self {
            settings: IterativeSettings {
                tolerance,
                ..self.settings
            },
            ..self
        }
    }

    /// Set the maximum number of iterations.
    ///
    /// Default is `2000`.
    #[must_use]
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            settings: IterativeSettings {
                max_iterations,
                ..self.settings
            },
            ..self
        }
    }

    pub fn settings(&self) -> IterativeSettings {
        self.settings
    }

    pub fn add_point(&mut self, point: Point3<f64>) -> Result<()> {
        self.session.add_source(point)
    }

    pub fn add_plane(&mut self, plane: Plane) -> Result<()> {
        self.session.add_target(plane)
    }

    pub fn add_correspondence(&mut self, point: Point3<f64>, plane: Plane) -> Result<()> {
        self.session.add_pair(point, plane)
    }

    /// The number of complete point-plane pairs.
    ///
    /// A point or plane still waiting for its partner is not counted, so this can be `0` while
    /// [`Self::is_empty`] is `false`.
    pub fn len(&self) -> usize {
        self.session.len()
    }

    /// `true` only when no point and no plane has been added.
    pub fn is_empty(&self) -> bool {
        self.session.is_empty()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &Session<Plane> {
        &self.session
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Solves for the rigid transform over the accumulated correspondences.
    pub fn compute(&mut self) -> Result<Registration> {
        self.compute_cancellable(&AtomicBool::new(false))
    }

    pub fn compute_cancellable(&mut self, cancel: &AtomicBool) -> Result<Registration> {
        self.session.validate(MIN_CORRESPONDENCES)?;
        self.session.mark_computed();
        point_to_plane(
            self.session.sources(),
            self.session.targets(),
            &self.settings,
            cancel,
        )
    }

    /// Runs the solve over a snapshot of the correspondences on a new thread.
    pub fn spawn(&self) -> BackgroundSolve {
        let sources = self.session.sources().to_vec();
        let planes = self.session.targets().to_vec();
        let settings = self.settings;
        BackgroundSolve::spawn(move |cancel| {
            if sources.is_empty() && planes.is_empty() {
                return Err(RegistrationError::EmptySession);
            }
            point_to_plane(&sources, &planes, &settings, cancel)
        })
    }
}

/// Iterative point-to-plane registration over parallel slices.
pub fn point_to_plane(
    sources: &[Point3<f64>],
    planes: &[Plane],
    settings: &IterativeSettings,
    cancel: &AtomicBool,
) -> Result<Registration> {
    validate_pairs(sources.len(), planes.len(), MIN_CORRESPONDENCES)?;
    let normals = planes
        .iter()
        .map(|plane| plane.unit_normal())
        .collect::<Result<Vec<_>>>()?;

    let scatter: Matrix3<f64> = normals
        .iter()
        .map(|n| n.into_inner() * n.transpose())
        .sum();
    let eigenvalues = scatter
        .try_symmetric_eigen(1e-12, 1000)
        .ok_or(RegistrationError::DecompositionFailed)?
        .eigenvalues;
    if eigenvalues.min() < NORMAL_SPAN_EPSILON * eigenvalues.max() {
        debug!("plane normal scatter eigenvalues {}", eigenvalues.transpose());
        return Err(RegistrationError::DegenerateGeometry(
            "plane normals do not span three dimensions",
        ));
    }

    let solver = LandmarkRegistration::new().mode(AlignmentMode::Rigid);
    // Start from the identity.
    let mut transformed = sources.to_vec();
    let mut previous = Matrix3xX::zeros(sources.len());
    let mut iterations = 0;

    let transform = loop {
        if cancel.load(Ordering::Relaxed) {
            debug!("point-to-plane registration cancelled after {} iterations", iterations);
            return Err(RegistrationError::Cancelled { iterations });
        }

        let closest = transformed
            .iter()
            .zip(planes)
            .map(|(&point, plane)| project_onto_plane(point, plane))
            .collect::<Result<Vec<_>>>()?;

        let transform = solver.align(sources, &closest)?;
        iterations += 1;
        for (moved, source) in transformed.iter_mut().zip(sources) {
            *moved = transform.transform_point(source);
        }

        let displacement = displacements(&transformed, &closest);
        let residual = (&displacement - &previous).norm();
        previous = displacement;
        trace!("point-to-plane iteration {} residual {}", iterations, residual);

        if residual <= settings.tolerance {
            break transform;
        }
        if iterations >= settings.max_iterations {
            debug!(
                "point-to-plane registration did not converge, residual {}",
                residual
            );
            return Err(RegistrationError::NotConverged {
                iterations,
                residual,
            });
        }
    };

    let fre = transformed
        .iter()
        .zip(planes)
        .map(|(&point, plane)| point_to_plane_distance(point, plane))
        .sum::<Result<f64>>()?
        / sources.len() as f64;
    debug!(
        "point-to-plane registration of {} points converged after {} iterations, fre {}",
        sources.len(),
        iterations,
        fre
    );

    Ok(Registration {
        transform,
        fre,
        iterations,
    })
}
