use reg_core::{Registration, RegistrationError, Result};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

/// A registration running on its own thread.
///
/// The solve works on a snapshot of the correspondences taken when it was spawned, so the
/// registration it came from can keep accumulating or be reset meanwhile.
#[derive(Debug)]
pub struct BackgroundSolve {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<Registration>>,
}

impl BackgroundSolve {
    pub(crate) fn spawn<F>(solve: F) -> Self
    where
        F: FnOnce(&AtomicBool) -> Result<Registration> + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let handle = thread::spawn(move || solve(&flag));
        Self { cancel, handle }
    }

    /// Asks the solve to stop at the start of its next iteration.
    ///
    /// [`BackgroundSolve::join`] then returns [`RegistrationError::Cancelled`], unless the solve
    /// had already finished.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the solve finishes.
    pub fn join(self) -> Result<Registration> {
        self.handle
            .join()
            .map_err(|_| RegistrationError::WorkerPanicked)?
    }
}
