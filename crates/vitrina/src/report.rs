//! Step reporting.
//!
//! Page-object actions are grouped into named steps so a failure points at
//! the exact action that broke. Recording is purely observational: a [`Step`]
//! guard mirrors start/end into `tracing` and appends a [`StepEntry`] to the
//! session's [`RunReport`]. A step dropped without [`Step::complete`] is
//! recorded as failed, which is what happens when an error propagates out of
//! an action mid-way.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step ran to completion
    Completed,
    /// The step was abandoned (an error propagated out of it)
    Failed,
}

impl StepStatus {
    /// Check if the step completed
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if the step failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// A recorded step
#[derive(Debug, Clone)]
pub struct StepEntry {
    /// Step name
    pub name: String,
    /// Wall-clock duration of the step
    pub duration: Duration,
    /// Outcome
    pub status: StepStatus,
}

/// All steps recorded during a run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    entries: Vec<StepEntry>,
}

impl RunReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn record(&mut self, entry: StepEntry) {
        self.entries.push(entry);
    }

    /// Recorded entries in execution order
    #[must_use]
    pub fn entries(&self) -> &[StepEntry] {
        &self.entries
    }

    /// Number of recorded steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the recorded steps, in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Number of completed steps
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status.is_completed())
            .count()
    }

    /// Number of failed steps
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_failed()).count()
    }
}

/// Shared recorder handed to page objects through the session
#[derive(Debug, Clone, Default)]
pub struct StepRecorder {
    inner: Arc<Mutex<RunReport>>,
}

impl StepRecorder {
    /// Create a new recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn report_mut(&self) -> MutexGuard<'_, RunReport> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a named step
    pub fn start(&self, name: impl Into<String>) -> Step {
        let name = name.into();
        tracing::debug!(step = %name, "step started");
        Step {
            recorder: self.clone(),
            name,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Snapshot of the report so far
    #[must_use]
    pub fn report(&self) -> RunReport {
        self.report_mut().clone()
    }

    /// Names recorded so far, in order
    #[must_use]
    pub fn step_names(&self) -> Vec<String> {
        self.report_mut()
            .entries()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }
}

/// RAII guard for one named step
#[derive(Debug)]
pub struct Step {
    recorder: StepRecorder,
    name: String,
    started: Instant,
    finished: bool,
}

impl Step {
    /// Mark the step as completed and record it
    pub fn complete(mut self) {
        let duration = self.started.elapsed();
        tracing::debug!(step = %self.name, ?duration, "step completed");
        self.recorder.report_mut().record(StepEntry {
            name: self.name.clone(),
            duration,
            status: StepStatus::Completed,
        });
        self.finished = true;
    }
}

impl Drop for Step {
    fn drop(&mut self) {
        if !self.finished {
            let duration = self.started.elapsed();
            tracing::debug!(step = %self.name, ?duration, "step abandoned");
            self.recorder.report_mut().record(StepEntry {
                name: self.name.clone(),
                duration,
                status: StepStatus::Failed,
            });
        }
    }
}
