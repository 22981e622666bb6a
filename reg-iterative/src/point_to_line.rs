use crate::{session::validate_pairs, BackgroundSolve, IterativeSettings, Session, SessionState};
use landmark_registration::{LandmarkRegistration, MIN_CORRESPONDENCES};
use log::{debug, trace};
use reg_core::{
    nalgebra::{Matrix3xX, Point3},
    AlignmentMode, Line, Registration, RegistrationError, Result,
};
use reg_geom::{displacements, point_to_line_distance, project_onto_line};
use std::sync::atomic::{AtomicBool, Ordering};

/// Registers source points to lines in the target frame.
///
/// Each source point is known to lie somewhere on its line once transformed, such as a
/// fiducial seen along a line of sight. The solve alternates between a similarity landmark
/// solve onto a set of virtual target points and moving every virtual target to the foot of
/// the perpendicular from its transformed source onto its line. The first virtual targets are
/// `origin + direction` for each line.
///
/// The projection onto each line uses the normalized direction, so it is exact for directions of
/// any length. Projecting with the raw direction, as older navigation systems did, scales the
/// projection by `|direction|^2`; results for non-unit directions differ from those systems.
///
/// ```
/// use reg_core::{nalgebra::{Point3, Rotation3, Vector3}, Line, Transform};
/// use reg_iterative::PointToLineRegistration;
///
/// let truth = Transform::from_similarity(
///     1.0,
///     Rotation3::from_axis_angle(&Vector3::z_axis(), 0.3),
///     Vector3::new(10.0, 0.0, 0.0),
/// );
/// let mut registration = PointToLineRegistration::new();
/// for (source, direction) in [
///     (Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
///     (Point3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 0.0)),
///     (Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 1.0)),
///     (Point3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 1.0)),
/// ] {
///     let target = truth.transform_point(&source);
///     registration.add_correspondence(source, Line::new(target - direction, direction)).unwrap();
/// }
/// let result = registration.compute().unwrap();
/// assert!((result.transform.0 - truth.0).norm() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PointToLineRegistration {
    session: Session<Line>,
    settings: IterativeSettings,
}

impl PointToLineRegistration {
    /// Creates an empty registration with default settings.
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

    pub fn add_line(&mut self, line: Line) -> Result<()> {
        self.session.add_target(line)
    }

    pub fn add_correspondence(&mut self, point: Point3<f64>, line: Line) -> Result<()> {
        self.session.add_pair(point, line)
    }

    /// The number of complete point-line pairs.
    ///
    /// A point or line still waiting for its partner is not counted, so this can be `0` while
    /// [`Self::is_empty`] is `false`.
    pub fn len(&self) -> usize {
        self.session.len()
    }

    /// `true` only when no point and no line has been added.
    pub fn is_empty(&self) -> bool {
        self.session.is_empty()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &Session<Line> {
        &self.session
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Solves for the similarity transform over the accumulated correspondences.
    ///
    /// Once the correspondences pass validation, the session moves to [`SessionState::Computed`]
    /// whatever the outcome of the solve.
    pub fn compute(&mut self) -> Result<Registration> {
        self.compute_cancellable(&AtomicBool::new(false))
    }

    /// Same as [`PointToLineRegistration::compute`], but stops with
    /// [`RegistrationError::Cancelled`] once `cancel` is set.
    pub fn compute_cancellable(&mut self, cancel: &AtomicBool) -> Result<Registration> {
        self.session.validate(MIN_CORRESPONDENCES)?;
        self.session.mark_computed();
        point_to_line(
            self.session.sources(),
            self.session.targets(),
            &self.settings,
            cancel,
        )
    }

    /// Runs the solve over a snapshot of the correspondences on a new thread.
    ///
    /// The session state is not changed.
    pub fn spawn(&self) -> BackgroundSolve {
        let sources = self.session.sources().to_vec();
        let lines = self.session.targets().to_vec();
        let settings = self.settings;
        BackgroundSolve::spawn(move |cancel| {
            if sources.is_empty() && lines.is_empty() {
                return Err(RegistrationError::EmptySession);
            }
            point_to_line(&sources, &lines, &settings, cancel)
        })
    }
}

/// Iterative point-to-line registration over parallel slices.
pub fn point_to_line(
    sources: &[Point3<f64>],
    lines: &[Line],
    settings: &IterativeSettings,
    cancel: &AtomicBool,
) -> Result<Registration> {
    validate_pairs(sources.len(), lines.len(), MIN_CORRESPONDENCES)?;
    for line in lines {
        line.unit_direction()?;
    }

    let solver = LandmarkRegistration::new().mode(AlignmentMode::Similarity);
    let mut virtual_targets: Vec<Point3<f64>> = lines
        .iter()
        .map(|line| line.origin + line.direction)
        .collect();
    let mut previous = Matrix3xX::zeros(sources.len());
    let mut iterations = 0;

    let (transform, transformed) = loop {
        if cancel.load(Ordering::Relaxed) {
            debug!("point-to-line registration cancelled after {} iterations", iterations);
            return Err(RegistrationError::Cancelled { iterations });
        }

        let transform = solver.align(sources, &virtual_targets)?;
        iterations += 1;

        let transformed: Vec<Point3<f64>> =
            sources.iter().map(|p| transform.transform_point(p)).collect();
        virtual_targets = transformed
            .iter()
            .zip(lines)
            .map(|(&point, line)| project_onto_line(point, line))
            .collect::<Result<Vec<_>>>()?;

        let displacement = displacements(&transformed, &virtual_targets);
        let residual = (&displacement - &previous).norm();
        previous = displacement;
        trace!("point-to-line iteration {} residual {}", iterations, residual);

        if residual <= settings.tolerance {
            break (transform, transformed);
        }
        if iterations >= settings.max_iterations {
            debug!(
                "point-to-line registration did not converge, residual {}",
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
        .zip(lines)
        .map(|(&point, line)| point_to_line_distance(point, line.origin, line.direction))
        .sum::<Result<f64>>()?
        / sources.len() as f64;
    debug!(
        "point-to-line registration of {} points converged after {} iterations, fre {}",
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
