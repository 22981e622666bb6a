use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Source point to target point match, the input of landmark registration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PointMatch(pub Point3<f64>, pub Point3<f64>);

impl PointMatch {
    /// Pairs up parallel source and target slices.
    ///
    /// Extra elements of the longer slice are ignored, so check the lengths first if they matter.
    pub fn zip<'a>(
        source: &'a [Point3<f64>],
        target: &'a [Point3<f64>],
    ) -> impl Iterator<Item = PointMatch> + Clone + 'a {
        source.iter().zip(target).map(|(&s, &t)| PointMatch(s, t))
    }
}
