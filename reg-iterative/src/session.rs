use log::warn;
use reg_core::{nalgebra::Point3, RegistrationError, Result};

/// Where a [`Session`] is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing has been added since creation or the last reset.
    Empty,
    /// Correspondences are being added.
    Accumulating,
    /// A solve has run over the current correspondences. Call `reset` before adding more.
    Computed,
}

/// An accumulated set of source points and their targets.
///
/// Sources and targets are added separately, typically one pair per capture event, and are paired
/// by index when solving. The two lists may be temporarily uneven while a pair is being added.
#[derive(Debug, Clone)]
pub struct Session<T> {
    sources: Vec<Point3<f64>>,
    targets: Vec<T>,
    state: SessionState,
}

impl<T> Session<T> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            targets: Vec::new(),
            state: SessionState::Empty,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn sources(&self) -> &[Point3<f64>] {
        &self.sources
    }

    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    /// The number of complete source-target pairs.
    pub fn len(&self) -> usize {
        self.sources.len().min(self.targets.len())
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.targets.is_empty()
    }

    pub fn add_source(&mut self, source: Point3<f64>) -> Result<()> {
        self.accumulate()?;
        self.sources.push(source);
        Ok(())
    }

    pub fn add_target(&mut self, target: T) -> Result<()> {
        self.accumulate()?;
        self.targets.push(target);
        Ok(())
    }

    pub fn add_pair(&mut self, source: Point3<f64>, target: T) -> Result<()> {
        self.accumulate()?;
        self.sources.push(source);
        self.targets.push(target);
        Ok(())
    }

    /// Clears all correspondences and returns to [`SessionState::Empty`].
    pub fn reset(&mut self) {
        self.sources.clear();
        self.targets.clear();
        self.state = SessionState::Empty;
    }

    /// Checks that the session holds a solvable set of at least `required` pairs.
    pub fn validate(&self, required: usize) -> Result<()> {
        if self.is_empty() {
            return Err(RegistrationError::EmptySession);
        }
        validate_pairs(self.sources.len(), self.targets.len(), required)
    }

    pub(crate) fn mark_computed(&mut self) {
        self.state = SessionState::Computed;
    }

    fn accumulate(&mut self) -> Result<()> {
        if self.state == SessionState::Computed {
            warn!("correspondence added to a computed session without a reset");
            return Err(RegistrationError::SessionComputed);
        }
        self.state = SessionState::Accumulating;
        Ok(())
    }
}

impl<T> Default for Session<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_pairs(sources: usize, targets: usize, required: usize) -> Result<()> {
    if sources != targets {
        return Err(RegistrationError::MismatchedCorrespondences { sources, targets });
    }
    if sources < required {
        return Err(RegistrationError::InsufficientCorrespondences {
            required,
            provided: sources,
        });
    }
    Ok(())
}
