//! Compatibility with callers that expect a matrix on every outcome.
//!
//! Older consumers read an all-zero 4x4 matrix (the identity scaled by zero) as "registration
//! failed" and never look at an error value. New code should match on the [`Result`] instead.

use log::warn;
use reg_core::{Registration, Result, Transform};

/// Flattens a registration result into a matrix and fit error.
///
/// Any error becomes [`Transform::zero`] with a fit error of `0.0`.
///
/// ```
/// use reg_core::{RegistrationError, Transform};
/// use reg_iterative::legacy::matrix_or_sentinel;
///
/// let (matrix, fre) = matrix_or_sentinel(Err(RegistrationError::EmptySession));
/// assert_eq!(matrix, Transform::zero());
/// assert_eq!(fre, 0.0);
/// ```
pub fn matrix_or_sentinel(result: Result<Registration>) -> (Transform, f64) {
    match result {
        Ok(Registration { transform, fre, .. }) => (transform, fre),
        Err(e) => {
            warn!("registration failed, returning zero matrix: {}", e);
            (Transform::zero(), 0.0)
        }
    }
}
