//! Collaborator traits for the analysis pipeline.
//!
//! The core performs no network I/O. Run metadata and raw logs come from an
//! [`ExecutionHistoryProvider`]; root-cause synthesis is delegated to a
//! [`ReasoningService`]. Concrete adapters live outside this crate.

use async_trait::async_trait;

use crate::domain::ci::run::{JobRun, WorkflowRun};
use crate::domain::Result;

/// Source of run/job metadata and raw job logs for one repository.
#[async_trait]
pub trait ExecutionHistoryProvider: Send + Sync {
    /// Fetch a run by id.
    async fn fetch_run(&self, run_id: u64) -> Result<WorkflowRun>;

    /// Most recent run that concluded with a failure, if any.
    async fn fetch_latest_failed_run(&self) -> Result<Option<WorkflowRun>>;

    /// Jobs of a run, each with its ordered steps and outcome.
    async fn fetch_jobs(&self, run_id: u64) -> Result<Vec<JobRun>>;

    /// Full raw log text of one job.
    async fn fetch_job_log(&self, job_id: u64) -> Result<String>;
}

/// Unary text completion: one prompt in, one reply out.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
