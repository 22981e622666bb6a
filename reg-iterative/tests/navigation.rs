use approx::assert_relative_eq;
use reg_core::{
    nalgebra::{Point3, Rotation3, Vector3},
    Line, Plane, RegistrationError, Transform,
};
use reg_iterative::{
    legacy::matrix_or_sentinel, IterativeSettings, PointToLineRegistration,
    PointToPlaneRegistration, SessionState,
};

fn tetrahedron() -> [Point3<f64>; 4] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(0.0, 10.0, 0.0),
        Point3::new(0.0, 0.0, 10.0),
    ]
}

/// 30 degrees about z followed by a translation of 10 along x.
fn tetrahedron_pose() -> Transform {
    Transform::from_similarity(
        1.0,
        Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_6),
        Vector3::new(10.0, 0.0, 0.0),
    )
}

/// Points spread over the six faces of a cube of side 20 centered at the origin, with the
/// outward normal of the face each lies on.
fn cube_faces() -> Vec<(Point3<f64>, Vector3<f64>)> {
    let offsets = [(3.0, -4.0), (-5.0, 2.0), (6.0, 7.0)];
    let mut samples = vec![];
    for axis in 0..3 {
        for side in [-1.0, 1.0] {
            for &(a, b) in &offsets {
                let mut point = Point3::origin();
                point[axis] = 10.0 * side;
                point[(axis + 1) % 3] = a * side;
                point[(axis + 2) % 3] = b;
                let mut normal = Vector3::zeros();
                normal[axis] = side;
                samples.push((point, normal));
            }
        }
    }
    samples
}

fn cube_registration(truth: &Transform) -> PointToPlaneRegistration {
    let rotation = truth.rotation().unwrap();
    let mut registration = PointToPlaneRegistration::new();
    for (point, normal) in cube_faces() {
        let normal = rotation * normal;
        // Slide the plane origin within the plane so it is not the answer.
        let slide = normal.cross(&Vector3::new(0.3, 0.5, 0.7)) * 4.0;
        let origin = truth.transform_point(&point) + slide;
        registration
            .add_correspondence(point, Plane::new(origin, normal * 2.5))
            .unwrap();
    }
    registration
}

#[test]
fn point_to_line_exact_virtual_targets() {
    let truth = tetrahedron_pose();
    let directions = [
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 2.0, 1.0),
        Vector3::new(-1.0, 0.0, 3.0),
    ];
    let mut registration = PointToLineRegistration::new();
    for (source, direction) in tetrahedron().iter().zip(directions) {
        registration.add_point(*source).unwrap();
        let target = truth.transform_point(source);
        registration
            .add_line(Line::new(target - direction, direction))
            .unwrap();
    }
    let result = registration.compute().unwrap();
    assert_relative_eq!(result.transform.0, truth.0, epsilon = 1e-9);
    assert!(result.fre < 1e-9);
    assert_eq!(result.iterations, 1);
    assert_eq!(registration.state(), SessionState::Computed);
}

/// Lines through the true targets of the tetrahedron whose origins are not `target - direction`,
/// so the first virtual targets are off the answer.
fn shifted_tetrahedron_lines(registration: &mut PointToLineRegistration) {
    let truth = tetrahedron_pose();
    let directions = [
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 2.0, 1.0),
        Vector3::new(-1.0, 0.0, 3.0),
    ];
    let shifts = [0.5, -0.25, 0.4, -0.5];
    for ((source, direction), shift) in tetrahedron().iter().zip(directions).zip(shifts) {
        let origin = truth.transform_point(source) - direction + direction * shift;
        registration
            .add_correspondence(*source, Line::new(origin, direction))
            .unwrap();
    }
}

#[test]
fn point_to_line_iterates_on_tetrahedron() {
    let mut registration = PointToLineRegistration::new().tolerance(1e-6);
    shifted_tetrahedron_lines(&mut registration);
    let result = registration.compute().unwrap();
    assert!(result.iterations > 1);
    assert!(result.fre < 1e-3);
    assert_relative_eq!(result.transform.0, tetrahedron_pose().0, epsilon = 1e-3);
}

#[test]
fn point_to_line_iteration_cap() {
    let mut registration = PointToLineRegistration::new()
        .tolerance(1e-12)
        .max_iterations(2);
    shifted_tetrahedron_lines(&mut registration);
    assert!(matches!(
        registration.compute(),
        Err(RegistrationError::NotConverged { iterations: 2, .. })
    ));
}

#[test]
fn unpaired_point_is_not_counted() {
    let mut registration = PointToLineRegistration::new();
    registration.add_point(Point3::origin()).unwrap();
    assert_eq!(registration.len(), 0);
    assert!(!registration.is_empty());
    registration
        .add_line(Line::new(Point3::origin(), Vector3::x()))
        .unwrap();
    assert_eq!(registration.len(), 1);
}

#[test]
fn background_solve_can_be_cancelled() {
    // A negative tolerance is never reached, so only cancellation ends the solve.
    let mut registration = PointToLineRegistration::new()
        .tolerance(-1.0)
        .max_iterations(usize::MAX);
    shifted_tetrahedron_lines(&mut registration);
    let background = registration.spawn();
    std::thread::sleep(std::time::Duration::from_millis(20));
    background.cancel();
    assert!(matches!(
        background.join(),
        Err(RegistrationError::Cancelled { .. })
    ));
}

#[test]
fn point_to_line_slides_along_lines() {
    let truth = Transform::from_similarity(
        1.2,
        Rotation3::from_euler_angles(0.2, -0.1, 0.4),
        Vector3::new(5.0, -3.0, 12.0),
    );
    let sources = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(20.0, 0.0, 0.0),
        Point3::new(0.0, 20.0, 0.0),
        Point3::new(0.0, 0.0, 20.0),
        Point3::new(15.0, 15.0, 0.0),
        Point3::new(-10.0, 5.0, 12.0),
        Point3::new(8.0, -12.0, 6.0),
        Point3::new(-6.0, -9.0, -14.0),
    ];
    let directions = [
        Vector3::new(1.0, 0.2, 0.1),
        Vector3::new(0.1, 1.0, -0.3),
        Vector3::new(-0.2, 0.1, 1.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 1.0),
        Vector3::new(1.0, 0.0, -1.0),
        Vector3::new(0.5, -1.0, 0.5),
        Vector3::new(-1.0, 0.3, 0.8),
    ];
    let offsets = [-1.5, 0.5, -0.5, 0.25, -1.0, 0.75, -0.25, 0.0];

    let mut registration = PointToLineRegistration::new().tolerance(1e-9);
    for ((source, direction), offset) in sources.iter().zip(directions).zip(offsets) {
        // Directions of differing lengths; the origin is off the true point along the line.
        let direction = direction * 3.0;
        let origin = truth.transform_point(source) + direction * offset;
        registration
            .add_correspondence(*source, Line::new(origin, direction))
            .unwrap();
    }
    let result = registration.compute().unwrap();
    assert!(result.iterations > 1);
    assert!(result.fre < 1e-4);
    assert_relative_eq!(result.transform.0, truth.0, epsilon = 1e-3);
    assert_relative_eq!(result.transform.scale(), 1.2, epsilon = 1e-4);
}

#[test]
fn point_to_plane_recovers_pose() {
    let truth = Transform::from_similarity(
        1.0,
        Rotation3::from_euler_angles(0.05, -0.03, 0.08),
        Vector3::new(1.0, -2.0, 0.5),
    );
    let mut registration = cube_registration(&truth).tolerance(1e-10);
    let result = registration.compute().unwrap();
    assert_relative_eq!(result.transform.0, truth.0, epsilon = 1e-6);
    assert!(result.fre < 1e-6);
    assert_relative_eq!(result.transform.determinant(), 1.0, epsilon = 1e-9);
}

#[test]
fn point_to_plane_iteration_cap() {
    let truth = tetrahedron_pose();
    let mut registration = cube_registration(&truth).tolerance(1e-12).max_iterations(1);
    assert!(matches!(
        registration.compute(),
        Err(RegistrationError::NotConverged { iterations: 1, .. })
    ));
}

#[test]
fn session_must_be_reset() {
    let truth = Transform::from_similarity(
        1.0,
        Rotation3::from_euler_angles(0.0, 0.0, 0.1),
        Vector3::new(0.0, 1.0, 0.0),
    );
    let mut registration = cube_registration(&truth);
    let first = registration.compute().unwrap();
    // Solving again over the same correspondences is allowed.
    assert_eq!(registration.compute().unwrap(), first);

    let (point, normal) = cube_faces()[0];
    assert_eq!(
        registration.add_correspondence(point, Plane::new(point, normal)),
        Err(RegistrationError::SessionComputed)
    );
    registration.reset();
    assert_eq!(registration.state(), SessionState::Empty);
    assert!(registration.is_empty());
    assert_eq!(registration.compute(), Err(RegistrationError::EmptySession));
    registration
        .add_correspondence(point, Plane::new(point, normal))
        .unwrap();
    assert_eq!(registration.len(), 1);
    assert_eq!(registration.state(), SessionState::Accumulating);
}

#[test]
fn background_solve_matches_compute() {
    let truth = Transform::from_similarity(
        1.0,
        Rotation3::from_euler_angles(0.02, 0.04, -0.06),
        Vector3::new(0.5, 0.5, -1.0),
    );
    let mut registration = cube_registration(&truth);
    let background = registration.spawn();
    assert_eq!(registration.state(), SessionState::Accumulating);
    assert_eq!(background.join(), registration.compute());
}

#[test]
fn background_solve_of_empty_session() {
    let registration = PointToLineRegistration::with_settings(IterativeSettings::default());
    assert_eq!(
        registration.spawn().join(),
        Err(RegistrationError::EmptySession)
    );
}

#[test]
fn legacy_sentinel_on_mismatch() {
    let mut registration = PointToLineRegistration::new();
    for point in tetrahedron() {
        registration.add_point(point).unwrap();
    }
    registration
        .add_line(Line::new(Point3::origin(), Vector3::x()))
        .unwrap();
    let (matrix, fre) = matrix_or_sentinel(registration.compute());
    assert_eq!(matrix, Transform::zero());
    assert_eq!(fre, 0.0);
}
