//! # `reg`
//!
//! Batteries-included 3d registration crate
//!
//! This crate gathers the registration crates of this workspace in one place. It is convenient
//! for tools, tests and quick experiments. An application that only needs one solver should
//! depend on that solver's crate directly. Default features can be disabled to pick the
//! functionality you want.
//!
//! All of the basic types (transforms, lines, planes, errors) are included in the root of the
//! crate.
//!
//! ## Modules
//! * [`consensus`] - finding the best estimated model from noisy data
//! * [`geom`] - closest points, distances and line intersection
//! * [`estimate`] - closed-form landmark registration
//! * [`iterative`] - point-to-line and point-to-plane registration

pub use reg_core::{sample_consensus::*, *};

/// Consensus algorithms (RANSAC)
pub mod consensus {
    #[cfg(feature = "arrsac")]
    pub use arrsac::Arrsac;
}

/// Computational geometry
pub mod geom {
    #[cfg(feature = "reg-geom")]
    pub use reg_geom::*;
}

/// Estimation algorithms
pub mod estimate {
    #[cfg(feature = "landmark-registration")]
    pub use landmark_registration::{
        fiducial_registration_error, AffineLandmarkEstimator, LandmarkRegistration,
    };
}

/// Iterative registration against lines and planes
pub mod iterative {
    #[cfg(feature = "reg-iterative")]
    pub use reg_iterative::*;
}
