// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Publish a shields.io endpoint badge into a dedicated git branch.
//!
//! The library validates badge inputs, prepares the badge branch in an
//! existing checkout, writes `badges/<name>.json`, commits and pushes it when
//! it changed, and formats a markdown reference for a README. Git is driven
//! through the [`Repository`] trait so the branch logic can be exercised
//! without a network.

mod badge;
mod config;
mod endpoint;
mod error;
mod git;
mod progress;
mod publish;
mod reconcile;
mod validate;
mod workflow;

#[cfg(test)]
mod test_support;

pub use badge::{
    BADGE_DIR, BadgeDescriptor, SCHEMA_VERSION, badge_relative_path, write_descriptor
};
pub use config::{BadgeSettings, SettingsLayer, load_settings, parse_settings};
pub use endpoint::{descriptor_url, endpoint_badge, owner_repo};
pub use error::{Error, badge_io_error, io_error};
pub use git::{GitCli, HeadState, Repository};
pub use progress::Progress;
pub use publish::{
    BadgeChange, CI_TEST_SUFFIX, CommitId, PublishRequest, PublishResult, commit_message,
    delete_remote_badge_branch, detect_change, publish_badge, publish_change
};
pub use reconcile::{
    Identity, ReconcileRequest, ReconciledBranch, RepositorySnapshot, Scenario, classify,
    reconcile_branch
};
pub use validate::{BadgeStyle, is_hex_color, is_valid_url, validate_inputs};
pub use workflow::{Stage, WorkflowOptions, WorkflowOutcome, WorkflowReport, run_workflow};
