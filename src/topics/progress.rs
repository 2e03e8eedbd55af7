// Progress observer: how long-running training reports liveness.
//
// Training calls the observer synchronously at every chunk boundary (and the
// sweep at every K boundary). The observer is also the only place where
// cancellation can be requested: returning `Flow::Cancel` stops the run and
// the in-progress model is discarded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Units of work finished so far (iterations, or K values in a sweep)
    pub completed: usize,
    /// Total units of work in this run
    pub total: usize,
    /// Latest metric value (log-likelihood per word, or the sweep metric);
    /// `None` before anything has been measured
    pub metric: Option<f64>,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.completed as f64 / self.total as f64).min(1.0)
        }
    }
}

/// What the observer wants the engine to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Cancel,
}

/// A failure inside an observer.
///
/// Training logs it and carries on; a sweep stops and reports `Failed`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Receives progress notifications from training and sweeps.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &Progress) -> Result<Flow, ObserverError>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress) -> Result<Flow, ObserverError>,
{
    fn on_progress(&mut self, progress: &Progress) -> Result<Flow, ObserverError> {
        self(progress)
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&mut self, _progress: &Progress) -> Result<Flow, ObserverError> {
        Ok(Flow::Continue)
    }
}
