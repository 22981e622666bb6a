//! This crate contains the computational geometry used by the registration solvers.
//!
//! ## Lines
//!
//! A point-to-line correspondence says that a transformed source point should lie somewhere on a
//! line, typically a line of sight. The solvers repeatedly need the perpendicular foot of a point
//! on such a line ([`line::project_onto_line`]) and the distance to it
//! ([`line::point_to_line_distance`]).
//!
//! - `p` the transformed source point
//! - `f` the foot of the perpendicular from `p`
//! - `o` the origin of the line
//! - `d` the direction of the line
//!
//! ```text
//!                 p
//!                 |
//!                 |  distance
//!                 |
//!     o---d------>f---------------
//! ```
//!
//! Several lines that should meet at one point can be intersected in the least-squares sense
//! with [`line::lines_intersection`].
//!
//! ## Planes
//!
//! A point-to-plane correspondence says that the transformed source point should lie on a plane.
//! [`plane::closest_point_on_plane`] drops the point onto the plane along its normal.
//!
//! ## Conversions
//!
//! The [`convert`] module moves between slices of points and `3xN` matrices, which is the form
//! the solvers use for centered coordinates and displacement sets.

pub mod convert;
pub mod line;
pub mod plane;

pub use convert::*;
pub use line::*;
pub use plane::*;
