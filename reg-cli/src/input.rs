//! The JSON documents read and written by the tool.
//!
//! Points and vectors are `[x, y, z]` arrays. Transforms are written as four rows of four.

use reg::{
    geom::LineIntersection,
    nalgebra::{Point3, Vector3},
    Line, Plane, Registration,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct LandmarkInput {
    pub sources: Vec<[f64; 3]>,
    pub targets: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LineInput {
    pub origin: [f64; 3],
    pub direction: [f64; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointToLineInput {
    pub sources: Vec<[f64; 3]>,
    pub lines: Vec<LineInput>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlaneInput {
    pub origin: [f64; 3],
    pub normal: [f64; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointToPlaneInput {
    pub sources: Vec<[f64; 3]>,
    pub planes: Vec<PlaneInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntersectInput {
    pub lines: Vec<LineInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    pub transform: [[f64; 4]; 4],
    pub fre: f64,
    pub iterations: usize,
    /// Indices of the correspondences kept by consensus, when it was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inliers: Option<Vec<usize>>,
}

impl From<Registration> for RegistrationReport {
    fn from(registration: Registration) -> Self {
        Self {
            transform: registration.transform.to_row_major(),
            fre: registration.fre,
            iterations: registration.iterations,
            inliers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntersectionReport {
    pub point: [f64; 3],
    pub mean_residual: f64,
}

impl From<LineIntersection> for IntersectionReport {
    fn from(intersection: LineIntersection) -> Self {
        let p = intersection.point;
        Self {
            point: [p.x, p.y, p.z],
            mean_residual: intersection.mean_residual,
        }
    }
}

pub fn points(coordinates: &[[f64; 3]]) -> Vec<Point3<f64>> {
    coordinates.iter().map(|&xyz| Point3::from(xyz)).collect()
}

impl From<LineInput> for Line {
    fn from(line: LineInput) -> Self {
        Line::new(Point3::from(line.origin), Vector3::from(line.direction))
    }
}

impl From<PlaneInput> for Plane {
    fn from(plane: PlaneInput) -> Self {
        Plane::new(Point3::from(plane.origin), Vector3::from(plane.normal))
    }
}
