//! Deferred work requested by the viewport controller.
//!
//! The controller never paints or computes diff masks on its own. It asks a
//! [`FrameScheduler`] for a redraw (the host answers by calling
//! `ViewportController::frame` on its next display refresh) and hands diff
//! jobs to it (the host runs them wherever it likes and passes the result
//! back through `ViewportController::accept_diff`).

use std::collections::VecDeque;

use crate::diff::{DiffJob, DiffOutcome};

pub trait FrameScheduler {
    /// Ask for one call to `frame` on the next display refresh.
    fn request_redraw(&mut self);

    /// Run `job` outside the input path and report the outcome back.
    fn defer(&mut self, job: DiffJob);
}

/// Coalesces redraw requests between two frames into one.
#[derive(Debug, Default)]
pub struct RedrawFlag {
    pending: bool,
}

impl RedrawFlag {
    /// Forward a request to `scheduler` unless one is already pending.
    /// Returns whether a request was sent.
    pub fn request(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        scheduler.request_redraw();
        true
    }

    /// Called at the start of a frame.
    pub fn clear(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// In-process scheduler that queues everything until the owner drains it.
///
/// Used by headless rendering and tests, where "the next frame" is whenever
/// the caller decides.
#[derive(Debug, Default)]
pub struct TaskQueue {
    redraw_requests: usize,
    jobs: VecDeque<DiffJob>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of redraw requests received since the last call.
    pub fn take_redraw_requests(&mut self) -> usize {
        std::mem::take(&mut self.redraw_requests)
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Run every queued job in order.
    pub fn run_jobs(&mut self) -> Vec<DiffOutcome> {
        self.jobs.drain(..).map(DiffJob::run).collect()
    }
}

impl FrameScheduler for TaskQueue {
    fn request_redraw(&mut self) {
        self.redraw_requests += 1;
    }

    fn defer(&mut self, job: DiffJob) {
        self.jobs.push_back(job);
    }
}
