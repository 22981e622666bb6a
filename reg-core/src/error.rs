use thiserror::Error;

/// Errors produced while building or solving a registration.
///
/// None of these are fatal: the caller can always recover by supplying more or better
/// correspondences, or by relaxing the convergence settings and solving again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// The source and target sequences must pair up index by index.
    #[error("mismatched correspondences: {sources} source points but {targets} targets")]
    MismatchedCorrespondences { sources: usize, targets: usize },
    #[error("at least {required} correspondences are required, but {provided} were provided")]
    InsufficientCorrespondences { required: usize, provided: usize },
    /// A flat coordinate buffer did not contain a whole number of `xyz` triples.
    #[error("coordinate buffer of length {len} is not a multiple of 3")]
    MalformedBuffer { len: usize },
    #[error("no correspondences have been added to the session")]
    EmptySession,
    #[error("line direction has zero length")]
    DegenerateDirection,
    #[error("plane normal has zero length")]
    DegenerateNormal,
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("linear system is singular")]
    SingularSystem,
    /// A singular value or symmetric eigen decomposition did not converge.
    #[error("matrix decomposition did not converge")]
    DecompositionFailed,
    #[error("solution contains NaN or infinity")]
    NonFinite,
    #[error("did not converge after {iterations} iterations (last residual {residual})")]
    NotConverged { iterations: usize, residual: f64 },
    #[error("cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },
    /// Correspondences were added to a session that was already solved without resetting it first.
    #[error("session was already computed; reset it before adding correspondences")]
    SessionComputed,
    #[error("background registration worker panicked")]
    WorkerPanicked,
}

pub type Result<T, E = RegistrationError> = core::result::Result<T, E>;
