// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Version-control collaborator used by the reconciler and the publisher.
//!
//! [`Repository`] is the capability surface the workflow needs from git.
//! [`GitCli`] implements it by running the `git` executable inside the
//! working tree; tests substitute an in-memory fake.

use std::{
    path::{Path, PathBuf},
    process::{Command, Output}
};

use tracing::debug;

use crate::error::Error;

/// Where `HEAD` currently points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// `HEAD` is a symbolic reference to a local branch.
    Attached {
        /// Short branch name, e.g. `main`.
        branch: String
    },
    /// `HEAD` points directly at a commit.
    Detached {
        /// Full commit id.
        commit: String
    }
}

/// Operations the badge workflow performs against a repository.
///
/// Every method is synchronous and blocks until git finishes.
pub trait Repository {
    /// Root of the working tree.
    fn workdir(&self) -> &Path;

    /// Reads the current head state.
    fn head(&self) -> Result<HeadState, Error>;

    /// Reads a repository configuration value; `None` when unset.
    fn config_get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Writes a repository-local configuration value.
    fn config_set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Short names of local branches.
    fn local_branches(&self) -> Result<Vec<String>, Error>;

    /// Short names of remote-tracking references of `remote`, e.g.
    /// `origin/badges`.
    fn remote_branches(&self, remote: &str) -> Result<Vec<String>, Error>;

    /// Creates `name` at `start_point`; with `track` the new branch tracks
    /// the start point as its upstream.
    fn create_branch(&self, name: &str, start_point: &str, track: bool) -> Result<(), Error>;

    /// Makes `name` the active branch.
    fn checkout(&self, name: &str) -> Result<(), Error>;

    /// Whether tracked changes or untracked files are present.
    fn is_dirty(&self) -> Result<bool, Error>;

    /// Fetches `remote`, pruning stale remote-tracking references.
    fn fetch_prune(&self, remote: &str) -> Result<(), Error>;

    /// Fetches `branch` from `remote` and merges it into the active branch.
    fn pull(&self, remote: &str, branch: &str) -> Result<(), Error>;

    /// Pushes `branch` to `remote`, optionally recording it as upstream.
    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), Error>;

    /// Deletes `branch` on `remote` by pushing an empty source refspec.
    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<(), Error>;

    /// Stages `path` and writes the index.
    fn stage(&self, path: &Path) -> Result<(), Error>;

    /// Commits the index and returns the new commit id.
    fn commit(&self, message: &str) -> Result<String, Error>;

    /// Commit id `HEAD` resolves to.
    fn head_commit(&self) -> Result<String, Error>;

    /// Whether `path` is untracked (and not ignored).
    fn is_untracked(&self, path: &Path) -> Result<bool, Error>;

    /// Textual diff of `path` against `HEAD`; empty when unchanged.
    fn diff_head(&self, path: &Path) -> Result<String, Error>;

    /// Fetch URL configured for `remote`.
    fn remote_url(&self, remote: &str) -> Result<String, Error>;
}

/// [`Repository`] backed by the `git` command line client.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf
}

impl GitCli {
    /// Opens the repository whose working tree contains `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Git`] when `path` is not inside a git work tree.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use setup_badge::{GitCli, Repository};
    ///
    /// # fn example() -> Result<(), setup_badge::Error> {
    /// let repo = GitCli::open(std::path::Path::new("."))?;
    /// println!("{:?}", repo.head()?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: &Path) -> Result<Self, Error> {
        let probe = Self {
            workdir: path.to_path_buf()
        };
        let toplevel = probe.run(&["rev-parse", "--show-toplevel"])?;
        Ok(Self {
            workdir: PathBuf::from(toplevel)
        })
    }

    fn output(&self, args: &[&str]) -> Result<Output, Error> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| Error::git(args, format!("could not run git: {e}")))
    }

    /// Runs git and returns trimmed stdout, failing on a non-zero exit.
    fn run(&self, args: &[&str]) -> Result<String, Error> {
        let output = self.output(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(args, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn lines(&self, args: &[&str]) -> Result<Vec<String>, Error> {
        Ok(self
            .run(args)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl Repository for GitCli {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn head(&self) -> Result<HeadState, Error> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let output = self.output(&args)?;

        if output.status.success() {
            let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !branch.is_empty() {
                return Ok(HeadState::Attached {
                    branch
                });
            }
        }

        Ok(HeadState::Detached {
            commit: self.head_commit()?
        })
    }

    fn config_get(&self, key: &str) -> Result<Option<String>, Error> {
        let args = ["config", "--get", key];
        let output = self.output(&args)?;

        // exit status 1 means the key is unset
        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(value))
            }
            Some(1) => Ok(None),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(Error::git(&args, stderr.trim()))
            }
        }
    }

    fn config_set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.run(&["config", "--local", key, value]).map(drop)
    }

    fn local_branches(&self) -> Result<Vec<String>, Error> {
        self.lines(&["for-each-ref", "--format=%(refname:lstrip=2)", "refs/heads/"])
    }

    fn remote_branches(&self, remote: &str) -> Result<Vec<String>, Error> {
        let prefix = format!("refs/remotes/{remote}/");
        self.lines(&["for-each-ref", "--format=%(refname:lstrip=2)", &prefix])
    }

    fn create_branch(&self, name: &str, start_point: &str, track: bool) -> Result<(), Error> {
        let mode = if track { "--track" } else { "--no-track" };
        self.run(&["branch", mode, name, start_point]).map(drop)
    }

    fn checkout(&self, name: &str) -> Result<(), Error> {
        self.run(&["checkout", name]).map(drop)
    }

    fn is_dirty(&self) -> Result<bool, Error> {
        let status = self.run(&["status", "--porcelain", "--untracked-files=normal"])?;
        Ok(!status.is_empty())
    }

    fn fetch_prune(&self, remote: &str) -> Result<(), Error> {
        self.run(&["fetch", "--prune", remote]).map(drop)
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<(), Error> {
        self.run(&["pull", "--no-rebase", remote, branch]).map(drop)
    }

    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), Error> {
        if set_upstream {
            self.run(&["push", "--set-upstream", remote, branch]).map(drop)
        } else {
            self.run(&["push", remote, branch]).map(drop)
        }
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<(), Error> {
        let refspec = format!(":{branch}");
        self.run(&["push", remote, &refspec]).map(drop)
    }

    fn stage(&self, path: &Path) -> Result<(), Error> {
        let path = path_arg(path);
        self.run(&["add", "--", &path]).map(drop)
    }

    fn commit(&self, message: &str) -> Result<String, Error> {
        self.run(&["commit", "--quiet", "-m", message])?;
        self.head_commit()
    }

    fn head_commit(&self) -> Result<String, Error> {
        self.run(&["rev-parse", "HEAD"])
    }

    fn is_untracked(&self, path: &Path) -> Result<bool, Error> {
        let path = path_arg(path);
        let listed = self.run(&["ls-files", "--others", "--exclude-standard", "--", &path])?;
        Ok(!listed.is_empty())
    }

    fn diff_head(&self, path: &Path) -> Result<String, Error> {
        let path = path_arg(path);
        self.run(&["diff", "HEAD", "--", &path])
    }

    fn remote_url(&self, remote: &str) -> Result<String, Error> {
        self.run(&["remote", "get-url", remote])
    }
}
