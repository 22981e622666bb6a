//! # Registration Core
//!
//! This library provides the common types shared by the registration crates in this workspace.
//! Every solver consumes correspondences expressed with these types and produces a [`Transform`]
//! wrapped in a [`Registration`], so that a landmark solve, a point-to-line solve and a
//! point-to-plane solve can be swapped for one another by the caller.
//!
//! The crate is kept small on purpose. Linear algebra comes from [`nalgebra`], which is
//! re-exported so that downstream crates agree on its version. [`sample_consensus`] is
//! re-exported as well, since [`Transform`] is a [`sample_consensus::Model`] of [`PointMatch`]
//! data and can be fed to any consensus algorithm.
//!
//! ## Correspondences
//!
//! A registration aligns a *source* frame to a *target* frame. Each correspondence pairs a
//! source point with something in the target frame that the transformed point should touch:
//!
//! * a point ([`PointMatch`]), when both sides are fully known (landmark registration)
//! * a [`Line`], when the target is only known up to a ray, such as a line of sight
//! * a [`Plane`], when the target is only known to lie on a surface
//!
//! ```text
//!     source frame                      target frame
//!
//!        s0 *  ------- T ------->   *----------------- line 0
//!                                          /
//!        s1 *  ------- T ------->   ______*__________ plane 1
//!                                        /
//!        s2 *  ------- T ------->       * t2  (point)
//! ```
//!
//! ## Conventions
//!
//! Transforms act on column vectors: `p' = M * [p; 1]`. The underlying [`nalgebra::Matrix4`]
//! is stored column-major. Use [`Transform::to_row_major`] when handing the matrix to a consumer
//! that expects rows.

mod error;
mod matches;
mod primitive;
mod registration;
mod transform;

pub use error::*;
pub use matches::*;
pub use nalgebra;
pub use primitive::*;
pub use registration::*;
pub use sample_consensus;
pub use transform::*;
