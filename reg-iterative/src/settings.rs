#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Convergence settings shared by the iterative registrations.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IterativeSettings {
    /// The solve stops once the Frobenius norm of the change in the displacement matrix
    /// between two iterations is at or below this value.
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_tolerance"))]
    pub tolerance: f64,
    /// The maximum number of closed-form solves before giving up with
    /// [`reg_core::RegistrationError::NotConverged`].
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_max_iterations")
    )]
    pub max_iterations: usize,
}

impl Default for IterativeSettings {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_max_iterations() -> usize {
    2000
}
