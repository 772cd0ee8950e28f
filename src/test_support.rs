// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Test doubles shared by the module tests.
//!
//! [`GitFixture`] builds a real working clone backed by a bare remote inside
//! a temp directory. [`FakeRepository`] is an in-memory [`Repository`] that
//! records every call and can be told to fail specific operations.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    process::Command
};

use tempfile::TempDir;

use crate::{
    error::Error,
    git::{GitCli, HeadState, Repository}
};

pub fn run_git(directory: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(directory)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(directory: &Path) {
    run_git(directory, &["config", "user.name", "Fixture User"]);
    run_git(directory, &["config", "user.email", "fixture@example.com"]);
    run_git(directory, &["config", "commit.gpgsign", "false"]);
    run_git(directory, &["config", "pull.rebase", "false"]);
}

/// A working clone with one commit on `main`, pushed to a bare `origin`.
pub struct GitFixture {
    root:    TempDir,
    workdir: PathBuf
}

impl GitFixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create tempdir");
        let remote = root.path().join("remote.git");
        let workdir = root.path().join("work");

        run_git(root.path(), &["init", "--quiet", "--bare", "remote.git"]);
        run_git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run_git(root.path(), &["init", "--quiet", "work"]);
        run_git(&workdir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&workdir);

        fs::write(workdir.join("README.md"), "# fixture\n").expect("write readme");
        run_git(&workdir, &["add", "README.md"]);
        run_git(&workdir, &["commit", "--quiet", "-m", "initial"]);

        let remote_path = remote.to_string_lossy().into_owned();
        run_git(&workdir, &["remote", "add", "origin", &remote_path]);
        run_git(&workdir, &["push", "--quiet", "--set-upstream", "origin", "main"]);

        Self {
            root,
            workdir
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn repo(&self) -> GitCli {
        GitCli::open(&self.workdir).expect("fixture is a git work tree")
    }

    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.workdir, args)
    }

    /// Clones the fixture remote into a sibling directory.
    pub fn second_clone(&self, name: &str) -> PathBuf {
        let remote = self.root.path().join("remote.git");
        let remote_path = remote.to_string_lossy().into_owned();
        run_git(self.root.path(), &["clone", "--quiet", &remote_path, name]);
        let directory = self.root.path().join(name);
        configure_identity(&directory);
        directory
    }

    /// Tip of `branch` on the remote, if the branch exists there.
    pub fn remote_tip(&self, branch: &str) -> Option<String> {
        let listing = run_git(&self.workdir, &["ls-remote", "--heads", "origin", branch]);
        listing
            .lines()
            .find(|line| line.ends_with(&format!("refs/heads/{branch}")))
            .and_then(|line| line.split_whitespace().next())
            .map(str::to_owned)
    }

    pub fn remote_has_branch(&self, branch: &str) -> bool {
        self.remote_tip(branch).is_some()
    }
}

/// Mutable state of a [`FakeRepository`].
#[derive(Debug, Clone)]
pub struct FakeState {
    pub head:            HeadState,
    pub head_commit:     String,
    pub config:          BTreeMap<String, String>,
    pub remotes:         BTreeSet<String>,
    pub local_branches:  BTreeSet<String>,
    pub remote_branches: BTreeSet<String>,
    pub dirty:           bool,
    pub untracked:       BTreeSet<PathBuf>,
    pub modified:        BTreeSet<PathBuf>,
    pub failing:         BTreeSet<&'static str>,
    pub commits:         usize,
    pub calls:           Vec<String>
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            head:            HeadState::Attached {
                branch: "main".to_owned()
            },
            head_commit:     "1".repeat(40),
            config:          BTreeMap::new(),
            remotes:         BTreeSet::from(["origin".to_owned()]),
            local_branches:  BTreeSet::from(["main".to_owned()]),
            remote_branches: BTreeSet::from(["origin/main".to_owned()]),
            dirty:           false,
            untracked:       BTreeSet::new(),
            modified:        BTreeSet::new(),
            failing:         BTreeSet::new(),
            commits:         0,
            calls:           Vec::new()
        }
    }
}

/// In-memory [`Repository`] for exercising decision logic without git.
#[derive(Debug)]
pub struct FakeRepository {
    workdir: PathBuf,
    state:   RefCell<FakeState>
}

impl FakeRepository {
    pub fn new(state: FakeState) -> Self {
        Self {
            workdir: PathBuf::from("/fake/repository"),
            state:   RefCell::new(state)
        }
    }

    pub fn with_workdir(workdir: &Path, state: FakeState) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            state:   RefCell::new(state)
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn state(&self) -> FakeState {
        self.state.borrow().clone()
    }

    pub fn pushed(&self) -> bool {
        self.calls().iter().any(|call| call.starts_with("push"))
    }

    fn record(&self, operation: &'static str, call: String) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call.clone());
        if state.failing.contains(operation) {
            return Err(Error::git(&[operation], format!("scripted failure of {call}")));
        }
        Ok(())
    }

    fn require_remote(&self, operation: &str, remote: &str) -> Result<(), Error> {
        if self.state.borrow().remotes.contains(remote) {
            Ok(())
        } else {
            Err(Error::git(
                &[operation, remote],
                format!("'{remote}' does not appear to be a git repository")
            ))
        }
    }
}

impl Repository for FakeRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn head(&self) -> Result<HeadState, Error> {
        Ok(self.state.borrow().head.clone())
    }

    fn config_get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.state.borrow().config.get(key).cloned())
    }

    fn config_set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.record("config", format!("config {key}={value}"))?;
        self.state.borrow_mut().config.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn local_branches(&self) -> Result<Vec<String>, Error> {
        Ok(self.state.borrow().local_branches.iter().cloned().collect())
    }

    fn remote_branches(&self, remote: &str) -> Result<Vec<String>, Error> {
        let prefix = format!("{remote}/");
        Ok(self
            .state
            .borrow()
            .remote_branches
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn create_branch(&self, name: &str, start_point: &str, track: bool) -> Result<(), Error> {
        let suffix = if track { " --track" } else { "" };
        self.record("branch", format!("branch {name} {start_point}{suffix}"))?;
        let mut state = self.state.borrow_mut();
        if !state.local_branches.insert(name.to_owned()) {
            return Err(Error::git(
                &["branch", name],
                format!("a branch named '{name}' already exists")
            ));
        }
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<(), Error> {
        self.record("checkout", format!("checkout {name}"))?;
        let mut state = self.state.borrow_mut();
        if !state.local_branches.contains(name) {
            return Err(Error::git(&["checkout", name], "pathspec did not match"));
        }
        state.head = HeadState::Attached {
            branch: name.to_owned()
        };
        Ok(())
    }

    fn is_dirty(&self) -> Result<bool, Error> {
        Ok(self.state.borrow().dirty)
    }

    fn fetch_prune(&self, remote: &str) -> Result<(), Error> {
        self.record("fetch", format!("fetch {remote}"))?;
        self.require_remote("fetch", remote)
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<(), Error> {
        self.record("pull", format!("pull {remote} {branch}"))?;
        self.require_remote("pull", remote)
    }

    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), Error> {
        let suffix = if set_upstream { " --set-upstream" } else { "" };
        self.record("push", format!("push {remote} {branch}{suffix}"))?;
        self.require_remote("push", remote)?;
        self.state
            .borrow_mut()
            .remote_branches
            .insert(format!("{remote}/{branch}"));
        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<(), Error> {
        self.record("delete", format!("delete {remote}/{branch}"))?;
        self.require_remote("push", remote)?;
        let removed = self
            .state
            .borrow_mut()
            .remote_branches
            .remove(&format!("{remote}/{branch}"));
        if removed {
            Ok(())
        } else {
            Err(Error::git(
                &["push", remote, branch],
                format!("unable to delete '{branch}': remote ref does not exist")
            ))
        }
    }

    fn stage(&self, path: &Path) -> Result<(), Error> {
        self.record("stage", format!("stage {}", path.display()))
    }

    fn commit(&self, message: &str) -> Result<String, Error> {
        self.record("commit", format!("commit {message}"))?;
        let mut state = self.state.borrow_mut();
        state.commits += 1;
        state.head_commit = format!("{:040x}", 0xc0ffee + state.commits);
        state.untracked.clear();
        state.modified.clear();
        Ok(state.head_commit.clone())
    }

    fn head_commit(&self) -> Result<String, Error> {
        Ok(self.state.borrow().head_commit.clone())
    }

    fn is_untracked(&self, path: &Path) -> Result<bool, Error> {
        Ok(self.state.borrow().untracked.contains(path))
    }

    fn diff_head(&self, path: &Path) -> Result<String, Error> {
        if self.state.borrow().modified.contains(path) {
            Ok(format!("diff --git a/{0} b/{0}\n+changed\n", path.display()))
        } else {
            Ok(String::new())
        }
    }

    fn remote_url(&self, remote: &str) -> Result<String, Error> {
        self.require_remote("remote", remote)?;
        Ok("https://github.com/acme/widgets.git".to_owned())
    }
}
