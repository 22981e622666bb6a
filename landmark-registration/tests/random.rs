use approx::assert_relative_eq;
use landmark_registration::LandmarkRegistration;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use reg_core::{
    nalgebra::{Point3, Rotation3, Vector3},
    AlignmentMode, Transform,
};

const SAMPLE_POINTS: usize = 12;
const ROUNDS: usize = 500;

const POINT_BOX_SIZE: f64 = 200.0;
const MAX_TRANSLATION: f64 = 500.0;

/// Gets a random similarity, source points and the exactly transformed target points.
fn some_test_data(
    rng: &mut Pcg64,
    scale: f64,
) -> (Transform, Vec<Point3<f64>>, Vec<Point3<f64>>) {
    let axis = Vector3::new(rng.gen(), rng.gen(), rng.gen::<f64>()) - Vector3::repeat(0.5);
    let angle = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
    let rotation = Rotation3::new(axis.normalize() * angle);
    let translation = Vector3::from_fn(|_, _| rng.gen_range(-MAX_TRANSLATION..MAX_TRANSLATION));
    let truth = Transform::from_similarity(scale, rotation, translation);

    let source = (0..SAMPLE_POINTS)
        .map(|_| Point3::from(Vector3::from_fn(|_, _| rng.gen::<f64>() - 0.5) * POINT_BOX_SIZE))
        .collect::<Vec<_>>();
    let target = source.iter().map(|p| truth.transform_point(p)).collect();
    (truth, source, target)
}

#[test]
fn randomized_rigid() {
    let mut rng = Pcg64::from_seed([1; 32]);
    let solver = LandmarkRegistration::new();
    for _ in 0..ROUNDS {
        let (truth, source, target) = some_test_data(&mut rng, 1.0);
        let registration = solver.solve(&source, &target).unwrap();
        assert_relative_eq!(registration.transform.0, truth.0, epsilon = 1e-6);
        assert_relative_eq!(registration.transform.determinant(), 1.0, epsilon = 1e-9);
        assert!(registration.fre < 1e-6);
    }
}

#[test]
fn randomized_similarity() {
    let mut rng = Pcg64::from_seed([2; 32]);
    let solver = LandmarkRegistration::new().mode(AlignmentMode::Similarity);
    for _ in 0..ROUNDS {
        let scale = rng.gen_range(0.1..10.0);
        let (truth, source, target) = some_test_data(&mut rng, scale);
        let transform = solver.align(&source, &target).unwrap();
        assert_relative_eq!(transform.0, truth.0, epsilon = 1e-6);
        assert_relative_eq!(transform.scale(), scale, max_relative = 1e-9);
        assert!(transform.is_similarity());
    }
}

#[test]
fn noisy_similarity_stays_proper() {
    let mut rng = Pcg64::from_seed([3; 32]);
    let solver = LandmarkRegistration::new().mode(AlignmentMode::Similarity);
    for _ in 0..ROUNDS {
        let (truth, source, mut target) = some_test_data(&mut rng, 2.0);
        for point in &mut target {
            point.coords += Vector3::from_fn(|_, _| rng.gen_range(-0.5..0.5));
        }
        let registration = solver.solve(&source, &target).unwrap();
        assert!(registration.transform.determinant() > 0.0);
        assert!(registration.fre < 1.0);
        assert_relative_eq!(registration.transform.scale(), truth.scale(), max_relative = 1e-2);
    }
}

#[test]
fn inverse_undoes_registration() {
    let mut rng = Pcg64::from_seed([4; 32]);
    let solver = LandmarkRegistration::new().mode(AlignmentMode::Similarity);
    let (_, source, target) = some_test_data(&mut rng, 3.5);
    let transform = solver.align(&source, &target).unwrap();
    let inverse = transform.inverse().unwrap();
    for (s, t) in source.iter().zip(&target) {
        assert_relative_eq!(inverse.transform_point(t), *s, epsilon = 1e-6);
    }
    let backwards = solver.align(&target, &source).unwrap();
    assert_relative_eq!(backwards.0, inverse.0, epsilon = 1e-6);
}
