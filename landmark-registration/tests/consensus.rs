use approx::assert_relative_eq;
use arrsac::Arrsac;
use landmark_registration::{AffineLandmarkEstimator, LandmarkRegistration};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use reg_core::{
    nalgebra::{Matrix3, Point3, Rotation3, Vector3},
    sample_consensus::{Consensus, Estimator},
    PointMatch, Transform,
};

const INLIERS: usize = 60;
const OUTLIERS: usize = 20;
const INLIER_THRESHOLD: f64 = 0.5;

#[test]
fn arrsac_rejects_tracking_outliers() {
    let mut rng = Pcg64::from_seed([5; 32]);
    let truth = Transform::from_similarity(
        1.0,
        Rotation3::from_euler_angles(0.1, 0.2, 0.3),
        Vector3::new(10.0, -20.0, 30.0),
    );

    let mut matches = (0..INLIERS)
        .map(|_| {
            let source = Point3::from(Vector3::from_fn(|_, _| rng.gen_range(-100.0..100.0)));
            let noise = Vector3::from_fn(|_, _| rng.gen_range(-0.01..0.01));
            PointMatch(source, truth.transform_point(&source) + noise)
        })
        .collect::<Vec<_>>();
    // Outliers are matched to unrelated points far from the true target.
    matches.extend((0..OUTLIERS).map(|_| {
        let source = Point3::from(Vector3::from_fn(|_, _| rng.gen_range(-100.0..100.0)));
        let target = Point3::from(Vector3::from_fn(|_, _| rng.gen_range(-100.0..100.0)));
        PointMatch(source, target + Vector3::repeat(500.0))
    }));

    let mut arrsac = Arrsac::new(INLIER_THRESHOLD, Pcg64::from_seed([1; 32]));
    let (transform, inliers) = arrsac
        .model_inliers(&LandmarkRegistration::new(), matches.iter().copied())
        .unwrap();

    assert!(inliers.len() >= INLIERS - 2);
    assert!(inliers.iter().all(|&ix| ix < INLIERS));

    // Refit on the consensus set.
    let refined = LandmarkRegistration::new()
        .estimate(inliers.iter().map(|&ix| matches[ix]))
        .unwrap();
    assert_relative_eq!(refined.0, truth.0, epsilon = 1e-2);
    assert!(transform.determinant() > 0.0);
}

#[test]
fn arrsac_affine_samples_four_points() {
    let mut rng = Pcg64::from_seed([6; 32]);
    let truth = Transform::from_parts(
        Matrix3::new(1.1, 0.4, 0.0, 0.0, 1.5, -0.2, 0.3, 0.0, 0.8),
        Vector3::new(-4.0, 2.0, 7.0),
    );

    let mut matches = (0..INLIERS)
        .map(|_| {
            let source = Point3::from(Vector3::from_fn(|_, _| rng.gen_range(-100.0..100.0)));
            PointMatch(source, truth.transform_point(&source))
        })
        .collect::<Vec<_>>();
    matches.extend((0..OUTLIERS).map(|_| {
        let source = Point3::from(Vector3::from_fn(|_, _| rng.gen_range(-100.0..100.0)));
        PointMatch(source, source + Vector3::repeat(500.0))
    }));

    // Three points are always coplanar, so the rigid sample size never yields an affine model.
    let mut arrsac = Arrsac::new(INLIER_THRESHOLD, Pcg64::from_seed([5; 32]));
    let affine_mode = LandmarkRegistration::new().mode(reg_core::AlignmentMode::Affine);
    assert!(arrsac
        .model(&affine_mode, matches.iter().copied())
        .is_none());

    let mut arrsac = Arrsac::new(INLIER_THRESHOLD, Pcg64::from_seed([5; 32]));
    let (transform, inliers) = arrsac
        .model_inliers(&AffineLandmarkEstimator::default(), matches.iter().copied())
        .unwrap();
    assert_eq!(inliers.len(), INLIERS);
    assert!(inliers.iter().all(|&ix| ix < INLIERS));
    assert_relative_eq!(transform.0, truth.0, epsilon = 1e-6);
}
