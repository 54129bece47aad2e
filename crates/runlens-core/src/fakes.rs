//! In-memory collaborators (testing only)
//!
//! Provides `StaticHistoryProvider` and `ScriptedReasoningService` that satisfy
//! the collaborator traits without any network access.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ci::run::{JobRun, WorkflowRun};
use crate::domain::{Result, RunlensError};
use crate::providers::{ExecutionHistoryProvider, ReasoningService};

// ---------------------------------------------------------------------------
// StaticHistoryProvider
// ---------------------------------------------------------------------------

/// Provider answering from fixed runs, jobs and logs.
///
/// Runs are kept newest first; `fetch_latest_failed_run` returns the first
/// failed one. Every call is recorded for assertions.
#[derive(Debug, Default)]
pub struct StaticHistoryProvider {
    runs: Vec<WorkflowRun>,
    jobs: HashMap<u64, Vec<JobRun>>,
    logs: HashMap<u64, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a run with its jobs.
    pub fn with_run(mut self, run: WorkflowRun, jobs: Vec<JobRun>) -> Self {
        self.jobs.insert(run.id, jobs);
        self.runs.push(run);
        self
    }

    /// Set the raw log text returned for a job.
    pub fn with_log(mut self, job_id: u64, log: impl Into<String>) -> Self {
        self.logs.insert(job_id, log.into());
        self
    }

    /// Calls received so far, e.g. `jobs:7` or `log:12`.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, request: String) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }
}

#[async_trait]
impl ExecutionHistoryProvider for StaticHistoryProvider {
    async fn fetch_run(&self, run_id: u64) -> Result<WorkflowRun> {
        self.record(format!("run:{}", run_id));
        self.runs
            .iter()
            .find(|r| r.id == run_id)
            .cloned()
            .ok_or(RunlensError::RunNotFound(run_id))
    }

    async fn fetch_latest_failed_run(&self) -> Result<Option<WorkflowRun>> {
        self.record("latest_failed".to_string());
        Ok(self
            .runs
            .iter()
            .find(|r| r.conclusion.as_ref().is_some_and(|c| c.is_failure()))
            .cloned())
    }

    async fn fetch_jobs(&self, run_id: u64) -> Result<Vec<JobRun>> {
        self.record(format!("jobs:{}", run_id));
        self.jobs
            .get(&run_id)
            .cloned()
            .ok_or(RunlensError::RunNotFound(run_id))
    }

    async fn fetch_job_log(&self, job_id: u64) -> Result<String> {
        self.record(format!("log:{}", job_id));
        self.logs
            .get(&job_id)
            .cloned()
            .ok_or_else(|| RunlensError::Provider(format!("no log for job {}", job_id)))
    }
}

// ---------------------------------------------------------------------------
// ScriptedReasoningService
// ---------------------------------------------------------------------------

/// Reasoning service returning a fixed reply (or failing) and keeping every
/// prompt it receives.
#[derive(Debug)]
pub struct ScriptedReasoningService {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedReasoningService {
    /// Always answer with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with a reasoning error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoningService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        self.reply.clone().map_err(RunlensError::Reasoning)
    }
}
