//! GitHub Actions history provider
//!
//! Reads workflow runs, jobs and raw job logs through the GitHub REST API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use runlens_core::{
    Conclusion, ExecutionHistoryProvider, JobRun, StepRun, WorkflowRun,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{RemoteError, Result};
use crate::USER_AGENT;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const GITHUB_API_URL_VAR: &str = "GITHUB_API_URL";

const ACCEPT: &str = "application/vnd.github.v3+json";
const JOBS_PER_PAGE: u32 = 100;

/// GitHub connection settings for one repository
#[derive(Clone)]
pub struct GitHubConfig {
    /// API base URL, without trailing slash
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub timeout: Duration,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GitHubConfig {
    pub fn new(owner: &str, repo: &str, token: &str) -> Self {
        GitHubConfig {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from a token read from the environment or the command line.
    /// A missing or empty token is a [`RemoteError::MissingCredential`].
    pub fn from_token(owner: &str, repo: &str, token: Option<String>) -> Result<Self> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(RemoteError::MissingCredential(GITHUB_TOKEN_VAR))?;
        Ok(Self::new(owner, repo, &token))
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn actions_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/actions/{}",
            self.api_url, self.owner, self.repo, path
        )
    }
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RunPayload {
    id: u64,
    name: Option<String>,
    status: Option<String>,
    conclusion: Option<String>,
    html_url: String,
    head_branch: Option<String>,
    head_sha: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RunPayload {
    fn into_run(self, repository: String) -> WorkflowRun {
        WorkflowRun {
            id: self.id,
            name: self.name.unwrap_or_default(),
            repository,
            head_branch: self.head_branch.unwrap_or_default(),
            head_sha: self.head_sha,
            status: self.status.unwrap_or_default(),
            conclusion: self.conclusion.map(Conclusion::from),
            html_url: self.html_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunListPayload {
    #[serde(default)]
    workflow_runs: Vec<RunPayload>,
}

#[derive(Debug, Deserialize)]
struct JobPayload {
    id: u64,
    name: String,
    status: String,
    conclusion: Option<String>,
    html_url: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    steps: Vec<StepPayload>,
}

impl From<JobPayload> for JobRun {
    fn from(job: JobPayload) -> Self {
        JobRun {
            id: job.id,
            name: job.name,
            status: job.status,
            conclusion: job.conclusion.map(Conclusion::from),
            html_url: job.html_url,
            started_at: job.started_at,
            completed_at: job.completed_at,
            steps: job.steps.into_iter().map(StepRun::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobListPayload {
    #[serde(default)]
    jobs: Vec<JobPayload>,
}

#[derive(Debug, Deserialize)]
struct StepPayload {
    number: u32,
    name: String,
    status: String,
    conclusion: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<StepPayload> for StepRun {
    fn from(step: StepPayload) -> Self {
        StepRun {
            number: step.number,
            name: step.name,
            status: step.status,
            conclusion: step.conclusion.map(Conclusion::from),
            started_at: step.started_at,
            completed_at: step.completed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// GitHub Actions client implementing [`ExecutionHistoryProvider`]
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!(url = %url, "GitHub request");
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("token {}", self.config.token))
            .header("Accept", ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn workflow_run(&self, run_id: u64) -> Result<WorkflowRun> {
        let url = self.config.actions_url(&format!("runs/{}", run_id));
        let payload: RunPayload = self.get_json(&url).await?;
        Ok(payload.into_run(self.config.full_name()))
    }

    async fn latest_failed_run(&self) -> Result<Option<WorkflowRun>> {
        let url = self.config.actions_url("runs?status=failure&per_page=1");
        let payload: RunListPayload = self.get_json(&url).await?;
        let repository = self.config.full_name();
        Ok(payload
            .workflow_runs
            .into_iter()
            .next()
            .map(|run| run.into_run(repository)))
    }

    async fn jobs(&self, run_id: u64) -> Result<Vec<JobRun>> {
        let url = self
            .config
            .actions_url(&format!("runs/{}/jobs?per_page={}", run_id, JOBS_PER_PAGE));
        let payload: JobListPayload = self.get_json(&url).await?;
        Ok(payload.jobs.into_iter().map(JobRun::from).collect())
    }

    async fn job_log(&self, job_id: u64) -> Result<String> {
        let url = self.config.actions_url(&format!("jobs/{}/logs", job_id));
        let log = self.get(&url).await?.text().await?;
        info!(job_id = job_id, bytes = log.len(), "Fetched job log");
        Ok(log)
    }
}

#[async_trait]
impl ExecutionHistoryProvider for GitHubClient {
    async fn fetch_run(&self, run_id: u64) -> runlens_core::Result<WorkflowRun> {
        self.workflow_run(run_id)
            .await
            .map_err(RemoteError::into_provider_error)
    }

    async fn fetch_latest_failed_run(&self) -> runlens_core::Result<Option<WorkflowRun>> {
        self.latest_failed_run()
            .await
            .map_err(RemoteError::into_provider_error)
    }

    async fn fetch_jobs(&self, run_id: u64) -> runlens_core::Result<Vec<JobRun>> {
        self.jobs(run_id)
            .await
            .map_err(RemoteError::into_provider_error)
    }

    async fn fetch_job_log(&self, job_id: u64) -> runlens_core::Result<String> {
        self.job_log(job_id)
            .await
            .map_err(RemoteError::into_provider_error)
    }
}
