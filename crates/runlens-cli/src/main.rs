//! runlens - CI failure root-cause analysis CLI
//!
//! ## Commands
//!
//! - `analyze`: Diagnose a failed GitHub Actions run (latest failure by default)
//! - `config`: Show which credentials are configured

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use runlens_core::{
    render_report_text, write_analysis_json, AnalyzerConfig, ExecutionHistoryProvider,
    FailureAnalyzer, LogFormat, ReasoningService, RunReport,
};
use runlens_remote::anthropic::{ANTHROPIC_API_KEY_VAR, ANTHROPIC_API_URL_VAR, ANTHROPIC_MODEL_VAR};
use runlens_remote::github::{GITHUB_API_URL_VAR, GITHUB_TOKEN_VAR};
use runlens_remote::{AnthropicClient, AnthropicConfig, GitHubClient, GitHubConfig, DEFAULT_MODEL};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "runlens")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Root-cause analysis for failed CI runs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a failed workflow run
    Analyze {
        /// Repository owner
        #[arg(long)]
        owner: String,

        /// Repository name
        #[arg(long)]
        repo: String,

        /// Workflow run ID (default: most recent failed run)
        #[arg(long)]
        run_id: Option<u64>,

        /// Report format on stdout
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the analysis as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// GitHub token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,

        /// GitHub API base URL
        #[arg(long, env = "GITHUB_API_URL")]
        github_api_url: Option<String>,

        /// Anthropic API key
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        anthropic_api_key: Option<String>,

        /// Anthropic API base URL
        #[arg(long, env = "ANTHROPIC_API_URL")]
        anthropic_api_url: Option<String>,

        /// Model used for the diagnosis
        #[arg(long, env = "ANTHROPIC_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        /// Maximum number of errors sent to the model
        #[arg(long, default_value_t = AnalyzerConfig::default().max_context_errors)]
        max_errors: usize,
    },

    /// Show current configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let log_format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    runlens_core::init_tracing(log_format, level);

    match cli.command {
        Commands::Analyze {
            owner,
            repo,
            run_id,
            format,
            output,
            github_token,
            github_api_url,
            anthropic_api_key,
            anthropic_api_url,
            model,
            max_errors,
        } => {
            let github = github_config(&owner, &repo, github_token, github_api_url)?;
            let anthropic = anthropic_config(anthropic_api_key, anthropic_api_url, &model)?;
            let config = AnalyzerConfig {
                max_context_errors: max_errors,
                ..AnalyzerConfig::default()
            };
            cmd_analyze(github, anthropic, config, run_id, format, output.as_deref()).await
        }
        Commands::Config => {
            print!("{}", render_config(&|var| std::env::var(var).ok()));
            Ok(())
        }
    }
}

fn github_config(
    owner: &str,
    repo: &str,
    token: Option<String>,
    api_url: Option<String>,
) -> Result<GitHubConfig> {
    let mut config =
        GitHubConfig::from_token(owner, repo, token).context("GitHub token required")?;
    if let Some(url) = api_url {
        config = config.with_api_url(&url);
    }
    Ok(config)
}

fn anthropic_config(
    api_key: Option<String>,
    api_url: Option<String>,
    model: &str,
) -> Result<AnthropicConfig> {
    let mut config =
        AnthropicConfig::from_api_key(api_key).context("Anthropic API key required")?;
    if let Some(url) = api_url {
        config = config.with_api_url(&url);
    }
    Ok(config.with_model(model))
}

async fn cmd_analyze(
    github: GitHubConfig,
    anthropic: AnthropicConfig,
    config: AnalyzerConfig,
    run_id: Option<u64>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let repository = github.full_name();
    let provider: Arc<dyn ExecutionHistoryProvider> =
        Arc::new(GitHubClient::new(github).context("Failed to create GitHub client")?);
    let reasoning: Arc<dyn ReasoningService> =
        Arc::new(AnthropicClient::new(anthropic).context("Failed to create Anthropic client")?);
    let analyzer = FailureAnalyzer::with_config(provider, reasoning, config);

    let report = match run_id {
        Some(id) => {
            info!("Analyzing workflow run {} in {}", id, repository);
            analyzer
                .analyze_run(id)
                .await
                .with_context(|| format!("Failed to analyze run {}", id))?
        }
        None => {
            info!("Looking up latest failed workflow run in {}", repository);
            match analyzer
                .analyze_latest_failure()
                .await
                .context("Failed to analyze latest failed run")?
            {
                Some(report) => report,
                None => {
                    println!("No failed workflow runs found.");
                    return Ok(());
                }
            }
        }
    };

    if let Some(path) = output {
        write_analysis_json(path, &report.analysis)?;
        info!("Wrote analysis to {:?}", path);
    }

    println!("{}", render_report(&report, format)?);
    Ok(())
}

fn render_report(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_report_text(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report.analysis).context("serialize analysis")
        }
    }
}

fn render_config(lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let is_set = |var: &str| lookup(var).is_some_and(|v| !v.is_empty());
    let status = |var: &str| if is_set(var) { "set" } else { "not set" };

    let mut out = String::new();
    out.push_str("runlens configuration\n\n");
    for var in [GITHUB_TOKEN_VAR, ANTHROPIC_API_KEY_VAR] {
        out.push_str(&format!("  {:<18} {}\n", var, status(var)));
    }
    out.push_str(&format!(
        "  {:<18} {}\n",
        GITHUB_API_URL_VAR,
        lookup(GITHUB_API_URL_VAR).unwrap_or_else(|| "(default)".to_string())
    ));
    out.push_str(&format!(
        "  {:<18} {}\n",
        ANTHROPIC_API_URL_VAR,
        lookup(ANTHROPIC_API_URL_VAR).unwrap_or_else(|| "(default)".to_string())
    ));
    out.push_str(&format!(
        "  {:<18} {}\n",
        ANTHROPIC_MODEL_VAR,
        lookup(ANTHROPIC_MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string())
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlens_remote::RemoteError;

    fn missing_credential(err: &anyhow::Error) -> Option<&'static str> {
        match err.downcast_ref::<RemoteError>() {
            Some(RemoteError::MissingCredential(var)) => Some(*var),
            _ => None,
        }
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse")
    }

    #[test]
    fn test_analyze_args_parse() {
        let cli = parse(&[
            "runlens",
            "analyze",
            "--owner",
            "acme",
            "--repo",
            "widgets",
            "--run-id",
            "42",
            "--format",
            "json",
            "--github-token",
            "t0k",
            "--anthropic-api-key",
            "sk",
        ]);
        match cli.command {
            Commands::Analyze {
                owner,
                repo,
                run_id,
                format,
                max_errors,
                ..
            } => {
                assert_eq!(owner, "acme");
                assert_eq!(repo, "widgets");
                assert_eq!(run_id, Some(42));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(max_errors, 5);
            }
            Commands::Config => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_defaults_to_latest_failure_and_text() {
        let cli = parse(&["runlens", "analyze", "--owner", "acme", "--repo", "widgets"]);
        match cli.command {
            Commands::Analyze { run_id, format, .. } => {
                assert_eq!(run_id, None);
                assert_eq!(format, OutputFormat::Text);
            }
            Commands::Config => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["runlens", "config", "--verbose", "--json"]);
        assert!(cli.verbose);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn test_analyze_requires_owner_and_repo() {
        assert!(Cli::try_parse_from(["runlens", "analyze", "--owner", "acme"]).is_err());
    }

    #[test]
    fn test_missing_credentials_fail_before_work() {
        let err = github_config("acme", "widgets", None, None).expect_err("no token");
        assert_eq!(missing_credential(&err), Some("GITHUB_TOKEN"));
        assert!(format!("{:#}", err).contains("GITHUB_TOKEN environment variable is not set"));

        let err =
            anthropic_config(Some(String::new()), None, DEFAULT_MODEL).expect_err("empty key");
        assert_eq!(missing_credential(&err), Some("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_anthropic_config_applies_api_url() {
        let config = anthropic_config(
            Some("sk-test".to_string()),
            Some("http://127.0.0.1:8080/".to_string()),
            "claude-3-5-haiku-latest",
        )
        .expect("config");
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.model, "claude-3-5-haiku-latest");

        let config =
            anthropic_config(Some("sk-test".to_string()), None, DEFAULT_MODEL).expect("config");
        assert_eq!(config.api_url, runlens_remote::anthropic::DEFAULT_ANTHROPIC_API_URL);
    }

    #[test]
    fn test_anthropic_api_url_flag_parses() {
        let cli = parse(&[
            "runlens",
            "analyze",
            "--owner",
            "acme",
            "--repo",
            "widgets",
            "--anthropic-api-url",
            "http://localhost:9000",
        ]);
        match cli.command {
            Commands::Analyze {
                anthropic_api_url, ..
            } => assert_eq!(anthropic_api_url.as_deref(), Some("http://localhost:9000")),
            Commands::Config => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_dotenv_file_feeds_env_backed_args() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        std::fs::write(&path, "GITHUB_API_URL=https://ghe.example.com/api/v3\n").expect("write");
        dotenvy::from_path(&path).expect("load .env");

        let cli = parse(&["runlens", "analyze", "--owner", "acme", "--repo", "widgets"]);
        match cli.command {
            Commands::Analyze { github_api_url, .. } => {
                assert_eq!(github_api_url.as_deref(), Some("https://ghe.example.com/api/v3"))
            }
            Commands::Config => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_github_config_applies_api_url() {
        let config = github_config(
            "acme",
            "widgets",
            Some("t0k".to_string()),
            Some("https://ghe.example.com/api/v3".to_string()),
        )
        .expect("config");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.full_name(), "acme/widgets");
    }

    #[test]
    fn test_render_config_reports_status() {
        let out = render_config(&|var| match var {
            "GITHUB_TOKEN" => Some("t0k".to_string()),
            _ => None,
        });
        assert!(out.contains("GITHUB_TOKEN       set\n"));
        assert!(out.contains("ANTHROPIC_API_KEY  not set\n"));
        assert!(out.contains("ANTHROPIC_API_URL  (default)\n"));
        assert!(out.contains(DEFAULT_MODEL));
    }
}
