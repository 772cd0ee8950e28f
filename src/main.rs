//! Command-line interface for the setup-badge binary.
//!
//! Parses badge options, reads the CI test marker from the environment once,
//! and runs the publication workflow against the repository in the current
//! directory.

use std::{
    env, io,
    path::{Path, PathBuf},
    process
};

use clap::{ArgAction, Parser};
use setup_badge::{
    BadgeSettings, Error, GitCli, Progress, SettingsLayer, WorkflowOptions, WorkflowReport,
    load_settings, run_workflow
};
use tracing_subscriber::EnvFilter;

/// Environment variable whose presence marks a CI test run.
const CI_TEST_MARKER: &str = "COVERAGE_RUN";

/// Generate an endpoint badge descriptor and publish it to a git branch.
#[derive(Debug, Parser)]
#[command(name = "setup-badge", version, about = "Publish a shields.io endpoint badge to a git branch")]
struct Cli {
    /// Badge file name without extension (default: badge).
    #[arg(long = "badge-name", value_name = "NAME")]
    badge_name: Option<String>,

    /// Branch that receives the badge (default: badges).
    #[arg(long = "badge-branch", value_name = "BRANCH")]
    badge_branch: Option<String>,

    /// Clickable target for the badge (default: none).
    #[arg(long = "badge-url", value_name = "URL")]
    badge_url: Option<String>,

    /// Badge appearance: flat, flat-square, plastic, for-the-badge, social
    /// (default: flat).
    #[arg(long = "badge-style", value_name = "STYLE")]
    badge_style: Option<String>,

    /// Badge left side text (default: demo).
    #[arg(long = "label", value_name = "TEXT")]
    label: Option<String>,

    /// Badge left side hex color (default: 2e2e2e).
    #[arg(long = "label-color", value_name = "HEX")]
    label_color: Option<String>,

    /// Badge right side text (default: no status).
    #[arg(long = "message", value_name = "TEXT")]
    message: Option<String>,

    /// Badge right side hex color (default: 2986CC).
    #[arg(long = "message-color", value_name = "HEX")]
    message_color: Option<String>,

    /// Remote to publish to (default: origin).
    #[arg(long = "remote-name", value_name = "REMOTE")]
    remote_name: Option<String>,

    /// Commit author name used when none is configured (default: Mona Lisa).
    #[arg(long = "gitconfig-name", value_name = "NAME")]
    gitconfig_name: Option<String>,

    /// Commit author email used when none is configured
    /// (default: mona.lisa@github.com).
    #[arg(long = "gitconfig-email", value_name = "EMAIL")]
    gitconfig_email: Option<String>,

    /// YAML file providing any of the options above.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Exit with status 1 when any stage fails.
    #[arg(long = "strict", action = ArgAction::SetTrue)]
    strict: bool
}

impl Cli {
    fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            badge_name:      self.badge_name.clone(),
            badge_branch:    self.badge_branch.clone(),
            badge_url:       self.badge_url.clone(),
            badge_style:     self.badge_style.clone(),
            label:           self.label.clone(),
            label_color:     self.label_color.clone(),
            message:         self.message.clone(),
            message_color:   self.message_color.clone(),
            remote_name:     self.remote_name.clone(),
            gitconfig_name:  self.gitconfig_name.clone(),
            gitconfig_email: self.gitconfig_email.clone()
        }
    }
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main() {
    init_tracing();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            eprintln!("{}", error.to_display_string());
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Executes the CLI and returns whether the process should exit cleanly.
///
/// # Errors
///
/// Propagates settings file errors and the failure to open the repository;
/// workflow stage failures are reported on stdout instead.
fn run() -> Result<bool, Error> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    let options = WorkflowOptions {
        ci_test_mode: env::var_os(CI_TEST_MARKER).is_some()
    };

    let repo = GitCli::open(Path::new("."))?;
    let mut progress = Progress::new(io::stdout().lock());
    let report = run_workflow(&repo, &settings, options, &mut progress);
    progress.finish();

    Ok(exits_cleanly(&report, cli.strict))
}

fn resolve_settings(cli: &Cli) -> Result<BadgeSettings, Error> {
    let file = match cli.config.as_deref() {
        Some(path) => load_settings(path)?,
        None => SettingsLayer::default()
    };

    Ok(cli.settings_layer().or(file).resolve())
}

/// Stage failures only change the exit status in strict mode.
fn exits_cleanly(report: &WorkflowReport, strict: bool) -> bool {
    !strict || report.succeeded()
}
