// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end badge publication.
//!
//! Runs validation, branch reconciliation, a re-sync pull, descriptor
//! writing, publishing and formatting in that order, stopping at the first
//! failed stage. In CI test mode the remote badge branch is deleted
//! afterwards whether or not the main sequence succeeded.

use std::{fmt, io::Write};

use tracing::{error, info};

use crate::{
    badge::{BadgeDescriptor, badge_relative_path, write_descriptor},
    config::BadgeSettings,
    endpoint::endpoint_badge,
    error::Error,
    git::Repository,
    progress::Progress,
    publish::{
        BadgeChange, CI_TEST_SUFFIX, CommitId, PublishRequest, delete_remote_badge_branch,
        detect_change, publish_change
    },
    reconcile::{Identity, ReconcileRequest, reconcile_branch},
    validate::validate_inputs
};

/// Switches that are decided once at the process boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Marks commits as test commits and deletes the remote branch at the
    /// end of the run.
    pub ci_test_mode: bool
}

/// Workflow stage, used to report where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Reconcile,
    Sync,
    Write,
    Publish,
    Format
}

impl fmt::Display for Stage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Validate => "validate inputs",
            Self::Reconcile => "checkout branch",
            Self::Sync => "pull latest",
            Self::Write => "write descriptor",
            Self::Publish => "publish changes",
            Self::Format => "format badge"
        })
    }
}

/// Result of the main sequence.
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// A new descriptor was committed and pushed.
    Published {
        commit: CommitId,
        badge:  String
    },
    /// The committed descriptor was already current.
    UpToDate {
        badge: String
    },
    /// The run stopped at `stage`.
    Failed {
        stage: Stage,
        error: Error
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct WorkflowReport {
    pub outcome: WorkflowOutcome,
    /// Present only in CI test mode.
    pub cleanup: Option<Result<(), Error>>
}

impl WorkflowReport {
    /// Whether the main sequence finished; cleanup failures do not count.
    pub fn succeeded(&self) -> bool {
        !matches!(self.outcome, WorkflowOutcome::Failed { .. })
    }

    /// The markdown reference, when one was produced.
    pub fn badge(&self) -> Option<&str> {
        match &self.outcome {
            WorkflowOutcome::Published {
                badge, ..
            }
            | WorkflowOutcome::UpToDate {
                badge
            } => Some(badge.as_str()),
            WorkflowOutcome::Failed {
                ..
            } => None
        }
    }
}

/// Publishes the badge described by `settings` into `repo`.
///
/// Failures never escape as errors; they are printed to `progress` and
/// recorded in the returned report.
///
/// # Example
///
/// ```no_run
/// use setup_badge::{BadgeSettings, GitCli, Progress, WorkflowOptions, run_workflow};
///
/// # fn example() -> Result<(), setup_badge::Error> {
/// let repo = GitCli::open(std::path::Path::new("."))?;
/// let mut progress = Progress::new(std::io::stdout());
/// let report = run_workflow(
///     &repo,
///     &BadgeSettings::default(),
///     WorkflowOptions::default(),
///     &mut progress
/// );
/// assert!(report.succeeded());
/// # Ok(())
/// # }
/// ```
pub fn run_workflow<R, W>(
    repo: &R,
    settings: &BadgeSettings,
    options: WorkflowOptions,
    progress: &mut Progress<W>
) -> WorkflowReport
where
    R: Repository + ?Sized,
    W: Write
{
    progress.start(&format!(
        "Starting to create a badge ({}.json) on branch ({})...",
        settings.badge_name, settings.badge_branch
    ));

    let outcome = match main_sequence(repo, settings, options, progress) {
        Ok(outcome) => outcome,
        Err((stage, error)) => {
            error!("stage '{stage}' failed: {error}");
            WorkflowOutcome::Failed {
                stage,
                error
            }
        }
    };

    let cleanup = options.ci_test_mode.then(|| {
        progress.step(format!("Deleting remote branch ({})...", settings.badge_branch));
        let result =
            delete_remote_badge_branch(repo, &settings.remote_name, &settings.badge_branch);
        match &result {
            Ok(()) => progress.removed(&format!(
                "deleted remote branch ({})",
                settings.badge_branch
            )),
            Err(error) => progress.failure(&error.to_display_string())
        }
        result
    });

    WorkflowReport {
        outcome,
        cleanup
    }
}

type StageResult<T> = Result<T, (Stage, Error)>;

fn at<T>(stage: Stage, result: Result<T, Error>) -> StageResult<T> {
    result.map_err(|error| (stage, error))
}

fn main_sequence<R, W>(
    repo: &R,
    settings: &BadgeSettings,
    options: WorkflowOptions,
    progress: &mut Progress<W>
) -> StageResult<WorkflowOutcome>
where
    R: Repository + ?Sized,
    W: Write
{
    let style = match validate_inputs(settings) {
        Ok(style) => style,
        Err(error) => {
            progress.failure(&format!(
                "one or more of your inputs failed validations ({})",
                error.to_display_string()
            ));
            return Err((Stage::Validate, error));
        }
    };
    progress.success("validated inputs from command line options");

    progress.step(format!("Preparing branch ({})...", settings.badge_branch));
    let request = ReconcileRequest {
        remote:   &settings.remote_name,
        branch:   &settings.badge_branch,
        identity: Identity {
            name:  &settings.gitconfig_name,
            email: &settings.gitconfig_email
        }
    };
    let branch = reported(progress, Stage::Reconcile, reconcile_branch(repo, &request))?;
    info!("{} ready at {} ({})", branch.name, branch.tip, branch.scenario.describe());
    progress.success(&format!("checkout local branch ({})", branch.name));

    progress.step(format!("Pulling latest changes of ({})...", branch.name));
    let synced = repo.pull(&settings.remote_name, &branch.name).map_err(|error| Error::Reconcile {
        message: format!(
            "failed to pull latest changes of branch ({}): {}",
            branch.name,
            error.to_display_string()
        )
    });
    reported(progress, Stage::Sync, synced)?;

    let descriptor = BadgeDescriptor::new(
        style,
        &settings.label,
        &settings.label_color,
        &settings.message,
        &settings.message_color
    );
    let relative = badge_relative_path(&settings.badge_name);
    let written = write_descriptor(repo.workdir(), &settings.badge_name, &descriptor);
    reported(progress, Stage::Write, written)?;
    progress.success(&format!("created {}", relative.display()));

    let change = detect_change(repo, &relative).map_err(|error| Error::Publish {
        message: format!(
            "failed to compare {} with HEAD: {}",
            relative.display(),
            error.to_display_string()
        )
    });
    let change = reported(progress, Stage::Publish, change)?;

    let commit = match change {
        BadgeChange::Unchanged => {
            progress.success("found no changes (current is up to date)");
            None
        }
        BadgeChange::New | BadgeChange::Modified => {
            progress.success(&format!(
                "found changes ({}) ready to stage, commit, and push to {}",
                change.describe(),
                settings.remote_name
            ));

            progress.step(format!("Publishing to {}...", settings.remote_name));
            let suffix = if options.ci_test_mode { CI_TEST_SUFFIX } else { "" };
            let published = publish_change(repo, &PublishRequest {
                remote:         &settings.remote_name,
                branch:         &settings.badge_branch,
                path:           &relative,
                message_suffix: suffix
            })
            .map_err(|error| Error::Publish {
                message: format!(
                    "failed to push changes to {}: {}",
                    settings.remote_name,
                    error.to_display_string()
                )
            });
            let commit = reported(progress, Stage::Publish, published)?;
            progress.success(&format!(
                "pushed commit ({}) to remote branch ({})",
                commit.short(),
                settings.badge_branch
            ));
            Some(commit)
        }
    };

    let remote_url = repo.remote_url(&settings.remote_name);
    let remote_url = reported(progress, Stage::Format, remote_url)?;
    let badge = endpoint_badge(
        &remote_url,
        &settings.badge_branch,
        &settings.badge_name,
        &settings.badge_url
    );
    progress.badge(&badge);

    Ok(match commit {
        Some(commit) => WorkflowOutcome::Published {
            commit,
            badge
        },
        None => WorkflowOutcome::UpToDate {
            badge
        }
    })
}

/// Prints a failure line for `result` and tags it with `stage`.
fn reported<T, W: Write>(
    progress: &mut Progress<W>,
    stage: Stage,
    result: Result<T, Error>
) -> StageResult<T> {
    if let Err(error) = &result {
        progress.failure(&error.to_display_string());
    }
    at(stage, result)
}
