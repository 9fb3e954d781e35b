//! CLI argument parsing via clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::runner::settings::DEFAULT_CONFIG_PATH;

/// Launch and follow automated job-application runs.
#[derive(Debug, Parser)]
#[command(name = "applybot", version)]
pub struct Cli {
    /// Path to the settings file.
    #[arg(short = 'c', long = "config", global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the backend base URL.
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Debug-level logging.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the stored bearer token.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Print the current run status once.
    Status,
    /// Follow the current run until it settles.
    Watch,
    /// Start a new run, then follow it.
    Launch(LaunchArgs),
}

#[derive(Debug, Subcommand)]
pub enum TokenAction {
    Set { token: String },
    Clear,
}

/// Name and location fall back to the stored profile when omitted.
/// Numbers are taken as typed and checked before anything is sent.
#[derive(Debug, Args)]
pub struct LaunchArgs {
    #[arg(long)]
    pub specialization: Option<String>,

    #[arg(long = "full-name")]
    pub full_name: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    /// For example "junior" or "senior".
    #[arg(long = "experience-level")]
    pub experience_level: Option<String>,

    /// Free-text instructions for the search agent.
    #[arg(long = "request")]
    pub user_request: Option<String>,

    /// Number of search results to collect.
    #[arg(long, default_value = "20", allow_hyphen_values = true)]
    pub limit: String,

    #[arg(long = "max-applications", default_value = "3", allow_hyphen_values = true)]
    pub max_applications: String,

    #[arg(long = "llm-model")]
    pub llm_model: Option<String>,

    /// Run the browser without a window (true/false).
    #[arg(long)]
    pub headless: Option<bool>,

    /// Page timeout in seconds (5-120).
    #[arg(long = "timeout-sec", allow_hyphen_values = true)]
    pub timeout_sec: Option<String>,

    /// How long to wait for a human to solve a captcha, in seconds (0-900).
    #[arg(long = "captcha-wait-sec", allow_hyphen_values = true)]
    pub captcha_wait_sec: Option<String>,

    /// Delay between browser actions in milliseconds (0-2000).
    #[arg(long = "slow-mo-ms", allow_hyphen_values = true)]
    pub slow_mo_ms: Option<String>,

    /// Return once the run is accepted instead of following it.
    #[arg(long)]
    pub detach: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_keeps_numbers_as_typed() {
        let cli = Cli::parse_from([
            "applybot",
            "launch",
            "--limit",
            "abc",
            "--max-applications",
            "-1",
            "--detach",
        ]);
        match cli.command {
            Command::Launch(args) => {
                assert_eq!(args.limit, "abc");
                assert_eq!(args.max_applications, "-1");
                assert!(args.detach);
                assert!(args.specialization.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn launch_defaults_and_tuning_flags() {
        let cli = Cli::parse_from([
            "applybot",
            "launch",
            "--specialization",
            "QA",
            "--headless",
            "false",
            "--slow-mo-ms",
            "250",
            "--request",
            "remote only",
        ]);
        match cli.command {
            Command::Launch(args) => {
                assert_eq!(args.limit, "20");
                assert_eq!(args.max_applications, "3");
                assert_eq!(args.headless, Some(false));
                assert_eq!(args.slow_mo_ms.as_deref(), Some("250"));
                assert_eq!(args.user_request.as_deref(), Some("remote only"));
                assert!(args.timeout_sec.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["applybot", "watch", "--base-url", "http://x:1", "-v"]);
        assert!(matches!(cli.command, Command::Watch));
        assert_eq!(cli.base_url.as_deref(), Some("http://x:1"));
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn token_set_takes_value() {
        let cli = Cli::parse_from(["applybot", "token", "set", "abc"]);
        match cli.command {
            Command::Token {
                action: TokenAction::Set { token },
            } => assert_eq!(token, "abc"),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
