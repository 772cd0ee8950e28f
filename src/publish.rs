// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Committing and pushing the badge descriptor.
//!
//! The publisher runs on the branch produced by the reconciler. It commits
//! only when the descriptor is new or differs from `HEAD`, and never rolls
//! back a partially staged index.

use std::{fmt, path::Path};

use tracing::{debug, info, warn};

use crate::{error::Error, git::Repository};

/// Commit message suffix used for CI test runs.
pub const CI_TEST_SUFFIX: &str = "[CI - Testing]";

/// How the written descriptor relates to the committed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeChange {
    /// The file is not tracked yet.
    New,
    /// The file differs from `HEAD`.
    Modified,
    /// The file matches `HEAD` byte for byte.
    Unchanged
}

impl BadgeChange {
    /// Whether a commit is needed.
    pub const fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Wording used in progress lines.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::New => "new file",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged"
        }
    }
}

/// Full commit id returned by a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used in progress output.
    ///
    /// # Examples
    ///
    /// ```
    /// use setup_badge::CommitId;
    ///
    /// let id = CommitId::new("0123456789abcdef0123456789abcdef01234567");
    /// assert_eq!(id.short(), "0123456");
    /// ```
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Outcome of [`publish_badge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    /// The descriptor matched `HEAD`; nothing was committed or pushed.
    NoChanges,
    /// A commit was created and pushed.
    Committed {
        change: BadgeChange,
        commit: CommitId
    }
}

/// Inputs of a publish run.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub remote:         &'a str,
    pub branch:         &'a str,
    /// Descriptor path relative to the repository root.
    pub path:           &'a Path,
    /// Appended to the commit message; may be empty.
    pub message_suffix: &'a str
}

/// Builds the commit message for `branch`.
///
/// # Examples
///
/// ```
/// use setup_badge::commit_message;
///
/// assert_eq!(commit_message("badges", ""), "add/update to branch (badges)");
/// assert_eq!(
///     commit_message("badges", "[CI - Testing]"),
///     "add/update to branch (badges) [CI - Testing]"
/// );
/// ```
pub fn commit_message(branch: &str, suffix: &str) -> String {
    format!("add/update to branch ({branch}) {suffix}")
        .trim_end()
        .to_owned()
}

/// Compares the descriptor at `path` with `HEAD`.
///
/// # Errors
///
/// Propagates collaborator failures unchanged.
pub fn detect_change<R>(repo: &R, path: &Path) -> Result<BadgeChange, Error>
where
    R: Repository + ?Sized
{
    if repo.is_untracked(path)? {
        return Ok(BadgeChange::New);
    }
    if !repo.diff_head(path)?.is_empty() {
        return Ok(BadgeChange::Modified);
    }
    Ok(BadgeChange::Unchanged)
}

/// Stages, commits and pushes the descriptor when it changed.
///
/// # Errors
///
/// Any failure is reported as [`Error::Publish`]; whatever was staged
/// before the failure stays staged.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use setup_badge::{GitCli, PublishRequest, PublishResult, publish_badge};
///
/// # fn example() -> Result<(), setup_badge::Error> {
/// let repo = GitCli::open(Path::new("."))?;
/// let request = PublishRequest {
///     remote:         "origin",
///     branch:         "badges",
///     path:           Path::new("badges/badge.json"),
///     message_suffix: ""
/// };
/// if let PublishResult::Committed { commit, .. } = publish_badge(&repo, &request)? {
///     println!("pushed {}", commit.short());
/// }
/// # Ok(())
/// # }
/// ```
pub fn publish_badge<R>(repo: &R, request: &PublishRequest<'_>) -> Result<PublishResult, Error>
where
    R: Repository + ?Sized
{
    run_publish(repo, request).map_err(|error| {
        warn!("publishing {} failed: {error}", request.path.display());
        error.into_publish()
    })
}

fn run_publish<R>(repo: &R, request: &PublishRequest<'_>) -> Result<PublishResult, Error>
where
    R: Repository + ?Sized
{
    let change = detect_change(repo, request.path)?;
    if !change.is_changed() {
        debug!("{} matches HEAD", request.path.display());
        return Ok(PublishResult::NoChanges);
    }

    let commit = commit_and_push(repo, request)?;
    Ok(PublishResult::Committed {
        change,
        commit
    })
}

/// Stages, commits and pushes the descriptor without checking for changes.
///
/// # Errors
///
/// Any failure is reported as [`Error::Publish`].
pub fn publish_change<R>(repo: &R, request: &PublishRequest<'_>) -> Result<CommitId, Error>
where
    R: Repository + ?Sized
{
    commit_and_push(repo, request).map_err(|error| {
        warn!("publishing {} failed: {error}", request.path.display());
        error.into_publish()
    })
}

fn commit_and_push<R>(repo: &R, request: &PublishRequest<'_>) -> Result<CommitId, Error>
where
    R: Repository + ?Sized
{
    repo.stage(request.path)?;
    let commit = CommitId::new(repo.commit(&commit_message(request.branch, request.message_suffix))?);
    repo.push(request.remote, request.branch, true)?;
    info!("pushed {} to {}/{}", commit.short(), request.remote, request.branch);
    Ok(commit)
}

/// Deletes `branch` from `remote` after a CI test run.
///
/// # Errors
///
/// Any failure is reported as [`Error::Cleanup`].
pub fn delete_remote_badge_branch<R>(repo: &R, remote: &str, branch: &str) -> Result<(), Error>
where
    R: Repository + ?Sized
{
    repo.delete_remote_branch(remote, branch).map_err(|error| {
        warn!("deleting {remote}/{branch} failed: {error}");
        error.into_cleanup()
    })
}
