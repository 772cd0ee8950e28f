// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Markdown snippet pointing shields.io at the published descriptor.

use crate::badge::BADGE_DIR;

/// Shields.io endpoint renderer.
pub const SHIELDS_ENDPOINT: &str = "https://img.shields.io/endpoint";
/// Host serving raw repository files.
pub const RAW_GITHUB: &str = "https://raw.githubusercontent.com";

const SSH_PREFIX: &str = "git@github.com:";

/// Derives `owner/repo` from a remote URL.
///
/// Takes the last two path segments, then strips a trailing `.git` and the
/// GitHub SSH prefix.
///
/// # Examples
///
/// ```
/// use setup_badge::owner_repo;
///
/// assert_eq!(owner_repo("https://github.com/acme/widgets.git"), "acme/widgets");
/// assert_eq!(owner_repo("git@github.com:acme/widgets.git"), "acme/widgets");
/// ```
pub fn owner_repo(remote_url: &str) -> &str {
    let trimmed = remote_url.trim().trim_end_matches('/');
    let mut segments = trimmed.rsplitn(3, '/');
    let repository = segments.next().unwrap_or_default();
    let tail = match segments.next() {
        Some(owner) => {
            let start = trimmed.len() - repository.len() - owner.len() - 1;
            &trimmed[start..]
        }
        None => repository
    };

    let tail = tail.strip_suffix(".git").unwrap_or(tail);
    tail.strip_prefix(SSH_PREFIX).unwrap_or(tail)
}

/// Raw URL of the descriptor on the badge branch.
///
/// # Examples
///
/// ```
/// use setup_badge::descriptor_url;
///
/// assert_eq!(
///     descriptor_url("acme/widgets", "badges", "demo"),
///     "https://raw.githubusercontent.com/acme/widgets/refs/heads/badges/badges/demo.json"
/// );
/// ```
pub fn descriptor_url(owner_repo: &str, branch: &str, badge_name: &str) -> String {
    format!("{RAW_GITHUB}/{owner_repo}/refs/heads/{branch}/{BADGE_DIR}/{badge_name}.json")
}

/// Builds the markdown image reference, linked when `target_url` is set.
///
/// # Examples
///
/// ```
/// use setup_badge::endpoint_badge;
///
/// let plain = endpoint_badge("https://github.com/acme/widgets.git", "badges", "demo", "");
/// assert!(plain.starts_with("![demo]("));
///
/// let linked = endpoint_badge(
///     "https://github.com/acme/widgets.git",
///     "badges",
///     "demo",
///     "https://ci.example.com"
/// );
/// assert!(linked.starts_with("[![demo]("));
/// assert!(linked.ends_with("](https://ci.example.com)"));
/// ```
pub fn endpoint_badge(remote_url: &str, branch: &str, badge_name: &str, target_url: &str) -> String {
    let json = descriptor_url(owner_repo(remote_url), branch, badge_name);
    let image = format!("![{badge_name}]({SHIELDS_ENDPOINT}?url={json})");

    if target_url.is_empty() {
        image
    } else {
        format!("[{image}]({target_url})")
    }
}
