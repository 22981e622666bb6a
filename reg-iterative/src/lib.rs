//! # Iterative Registration
//!
//! Registration against targets that are only partially known. A tracked tool tip touching a
//! surface gives a point on a plane, and a fiducial sighted through a headset gives a point
//! somewhere along a line. Neither pins down a target point, so the solvers in this crate
//! alternate between guessing the target points from the current transform and re-solving the
//! closed-form landmark registration, in the manner of iterative closest point.
//!
//! * [`PointToLineRegistration`] solves for a similarity transform.
//! * [`PointToPlaneRegistration`] solves for a rigid transform.
//!
//! Both accumulate correspondences in a [`Session`], converge according to
//! [`IterativeSettings`], and can be run on a worker thread with `spawn`, which returns a
//! [`BackgroundSolve`].

mod background;
pub mod legacy;
mod point_to_line;
mod point_to_plane;
mod session;
mod settings;

pub use background::*;
pub use point_to_line::*;
pub use point_to_plane::*;
pub use session::{Session, SessionState};
pub use settings::*;
