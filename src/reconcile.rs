// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Branch reconciliation.
//!
//! Brings the badge branch into a checked-out, remote-tracking state no
//! matter where the repository starts: detached `HEAD` from a pull request
//! build, branch present only locally, only on the remote, or on both.
//!
//! The work is split in two. [`classify`] is a pure function from a
//! [`RepositorySnapshot`] to a [`Scenario`]; [`reconcile_branch`] performs
//! the setup steps, reads the snapshot, and carries out the actions the
//! scenario calls for. Ordering is fixed: identity, fetch with prune,
//! snapshot, scenario actions, checkout.

use tracing::{debug, info, warn};

use crate::{
    error::Error,
    git::{HeadState, Repository}
};

/// Author name git-based CI runners fall back to when none is configured.
pub const PLACEHOLDER_NAME: &str = "runner";
/// Author email git-based CI runners fall back to when none is configured.
pub const PLACEHOLDER_EMAIL: &str = "runner@github.com";

/// Commit identity applied when the repository lacks a usable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity<'a> {
    pub name:  &'a str,
    pub email: &'a str
}

/// Inputs of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileRequest<'a> {
    /// Remote to fetch from and push to.
    pub remote:   &'a str,
    /// Branch that must end up checked out.
    pub branch:   &'a str,
    /// Fallback identity for automated commits.
    pub identity: Identity<'a>
}

/// Repository state read after fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub head:            HeadState,
    pub dirty:           bool,
    pub local_branches:  Vec<String>,
    /// Remote-tracking references in `<remote>/<branch>` form.
    pub remote_branches: Vec<String>
}

impl RepositorySnapshot {
    /// Reads the current state of `repo` for `remote`.
    ///
    /// # Errors
    ///
    /// Propagates any collaborator failure.
    pub fn read<R>(repo: &R, remote: &str) -> Result<Self, Error>
    where
        R: Repository + ?Sized
    {
        Ok(Self {
            head:            repo.head()?,
            dirty:           repo.is_dirty()?,
            local_branches:  repo.local_branches()?,
            remote_branches: repo.remote_branches(remote)?
        })
    }

    fn has_local(&self, branch: &str) -> bool {
        self.local_branches.iter().any(|name| name == branch)
    }

    fn has_remote(&self, remote: &str, branch: &str) -> bool {
        let tracking = format!("{remote}/{branch}");
        self.remote_branches.iter().any(|name| *name == tracking)
    }
}

/// The situation the repository is in relative to the target branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    /// `HEAD` is detached; branch off the current commit.
    DetachedHead {
        commit: String
    },
    /// Remote has the branch, local does not; create a tracking branch.
    TrackRemote,
    /// Both have the branch but the working tree has uncommitted work.
    DirtyWorkingTree,
    /// Both have the branch and the tree is clean; pull the remote tip.
    PullRemote,
    /// Remote lacks the branch and it is already the active branch.
    ActiveTarget,
    /// Remote lacks the branch; create it from the active branch tip.
    BranchFromActive {
        source: String
    }
}

impl Scenario {
    /// Short description used in progress logs.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::DetachedHead {
                ..
            } => "detached head",
            Self::TrackRemote => "branch exists on remote only",
            Self::DirtyWorkingTree => "branch exists locally with uncommitted changes",
            Self::PullRemote => "branch exists locally and on remote",
            Self::ActiveTarget => "branch is active and missing on remote",
            Self::BranchFromActive {
                ..
            } => "branch missing on remote"
        }
    }
}

/// Classifies `snapshot` for `branch` on `remote`.
///
/// Cases are tried in order and the first match wins: a detached head,
/// then remote presence, then local presence and dirtiness, then whether
/// the target is already active.
///
/// # Examples
///
/// ```
/// use setup_badge::{HeadState, RepositorySnapshot, Scenario, classify};
///
/// let snapshot = RepositorySnapshot {
///     head:            HeadState::Attached { branch: "main".to_owned() },
///     dirty:           false,
///     local_branches:  vec!["main".to_owned()],
///     remote_branches: vec!["origin/main".to_owned(), "origin/badges".to_owned()]
/// };
/// assert_eq!(classify(&snapshot, "origin", "badges"), Scenario::TrackRemote);
/// ```
pub fn classify(snapshot: &RepositorySnapshot, remote: &str, branch: &str) -> Scenario {
    let on_remote = snapshot.has_remote(remote, branch);
    let on_local = snapshot.has_local(branch);

    match (&snapshot.head, on_remote, on_local, snapshot.dirty) {
        (HeadState::Detached {
            commit
        }, ..) => Scenario::DetachedHead {
            commit: commit.clone()
        },
        (HeadState::Attached {
            ..
        }, true, false, _) => Scenario::TrackRemote,
        (HeadState::Attached {
            ..
        }, true, true, true) => Scenario::DirtyWorkingTree,
        (HeadState::Attached {
            ..
        }, true, true, false) => Scenario::PullRemote,
        (HeadState::Attached {
            branch: active
        }, false, ..)
            if active == branch =>
        {
            Scenario::ActiveTarget
        }
        (HeadState::Attached {
            branch: active
        }, false, ..) => Scenario::BranchFromActive {
            source: active.clone()
        }
    }
}

/// A branch checked out and ready to receive the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledBranch {
    /// Branch name.
    pub name:     String,
    /// Case that was applied.
    pub scenario: Scenario,
    /// Commit the branch points at after checkout.
    pub tip:      String
}

/// Makes `request.branch` exist, track the remote, and be checked out.
///
/// Nothing is retried and partially created state is not rolled back.
///
/// # Errors
///
/// Every failure, including collaborator errors and the dirty-tree guard,
/// is reported as [`Error::Reconcile`].
///
/// # Example
///
/// ```no_run
/// use setup_badge::{GitCli, Identity, ReconcileRequest, reconcile_branch};
///
/// # fn example() -> Result<(), setup_badge::Error> {
/// let repo = GitCli::open(std::path::Path::new("."))?;
/// let request = ReconcileRequest {
///     remote:   "origin",
///     branch:   "badges",
///     identity: Identity {
///         name:  "Mona Lisa",
///         email: "mona.lisa@github.com"
///     }
/// };
/// let branch = reconcile_branch(&repo, &request)?;
/// println!("{} at {}", branch.name, branch.tip);
/// # Ok(())
/// # }
/// ```
pub fn reconcile_branch<R>(repo: &R, request: &ReconcileRequest<'_>) -> Result<ReconciledBranch, Error>
where
    R: Repository + ?Sized
{
    run_reconcile(repo, request).map_err(|error| {
        warn!("reconciling branch {} failed: {error}", request.branch);
        error.into_reconcile()
    })
}

fn run_reconcile<R>(repo: &R, request: &ReconcileRequest<'_>) -> Result<ReconciledBranch, Error>
where
    R: Repository + ?Sized
{
    if request.branch.trim().is_empty() {
        return Err(Error::Reconcile {
            message: "badge branch name must not be empty".to_owned()
        });
    }

    ensure_identity(repo, request.identity)?;

    debug!("fetching {} with prune", request.remote);
    repo.fetch_prune(request.remote)?;

    let snapshot = RepositorySnapshot::read(repo, request.remote)?;
    let scenario = classify(&snapshot, request.remote, request.branch);
    info!("branch {}: {}", request.branch, scenario.describe());

    apply(repo, request, &snapshot, &scenario)?;

    repo.checkout(request.branch)?;
    let tip = repo.head_commit()?;

    Ok(ReconciledBranch {
        name: request.branch.to_owned(),
        scenario,
        tip
    })
}

/// Returns `true` when the identity had to be written.
fn ensure_identity<R>(repo: &R, identity: Identity<'_>) -> Result<bool, Error>
where
    R: Repository + ?Sized
{
    let name = repo.config_get("user.name")?;
    let email = repo.config_get("user.email")?;

    let placeholder_name = name.as_deref().is_none_or(|value| value == PLACEHOLDER_NAME);
    let placeholder_email = email.as_deref().is_none_or(|value| value == PLACEHOLDER_EMAIL);
    if !placeholder_name && !placeholder_email {
        return Ok(false);
    }

    debug!("applying fallback git identity {} <{}>", identity.name, identity.email);
    repo.config_set("user.name", identity.name)?;
    repo.config_set("user.email", identity.email)?;
    repo.config_set("pull.rebase", "false")?;
    Ok(true)
}

fn apply<R>(
    repo: &R,
    request: &ReconcileRequest<'_>,
    snapshot: &RepositorySnapshot,
    scenario: &Scenario
) -> Result<(), Error>
where
    R: Repository + ?Sized
{
    let ReconcileRequest {
        remote,
        branch,
        ..
    } = *request;

    match scenario {
        Scenario::DetachedHead {
            commit
        } => {
            repo.create_branch(branch, commit, false)?;
            repo.push(remote, branch, true)
        }
        Scenario::TrackRemote => {
            repo.create_branch(branch, &format!("{remote}/{branch}"), true)?;
            repo.push(remote, branch, true)
        }
        Scenario::DirtyWorkingTree => Err(Error::Reconcile {
            message: format!(
                "branch ({branch}) has uncommitted local changes; stage and commit your local changes and try again"
            )
        }),
        Scenario::PullRemote => {
            let already_active = matches!(
                &snapshot.head,
                HeadState::Attached { branch: active } if active == branch
            );
            if !already_active {
                repo.checkout(branch)?;
            }
            repo.pull(remote, branch)
        }
        Scenario::ActiveTarget => repo.push(remote, branch, true),
        Scenario::BranchFromActive {
            source
        } => {
            repo.create_branch(branch, source, false)?;
            repo.push(remote, branch, true)
        }
    }
}
