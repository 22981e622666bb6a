use crate::Transform;
use core::str::FromStr;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The family of transforms a landmark solve is allowed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(rename_all = "lowercase"))]
pub enum AlignmentMode {
    /// Rotation and translation.
    Rigid,
    /// Uniform scale, rotation and translation.
    Similarity,
    /// Any linear map and translation.
    Affine,
}

impl Default for AlignmentMode {
    fn default() -> Self {
        Self::Rigid
    }
}

impl FromStr for AlignmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rigid" => Ok(Self::Rigid),
            "similarity" => Ok(Self::Similarity),
            "affine" => Ok(Self::Affine),
            other => Err(format!("unknown alignment mode: {}", other)),
        }
    }
}

/// The outcome of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Registration {
    /// Maps source points into the target frame.
    pub transform: Transform,
    /// Fiducial registration error: the mean distance from each transformed source point
    /// to its target point, line or plane, in the units of the input coordinates.
    pub fre: f64,
    /// The number of closed-form solves performed.
    pub iterations: usize,
}
