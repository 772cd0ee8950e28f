// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Settings that drive a single badge publication.
//!
//! Values are resolved from three layers: explicit command line flags, an
//! optional YAML settings file, and built-in defaults. The file mirrors the
//! command line option names and accepts both snake_case and kebab-case keys.

use std::{fs, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::error::{self, Error};

/// Default descriptor file stem.
pub const DEFAULT_BADGE_NAME: &str = "badge";
/// Default branch receiving the descriptor.
pub const DEFAULT_BADGE_BRANCH: &str = "badges";
/// Default badge appearance.
pub const DEFAULT_BADGE_STYLE: &str = "flat";
/// Default left-hand text.
pub const DEFAULT_LABEL: &str = "demo";
/// Default left-hand background color.
pub const DEFAULT_LABEL_COLOR: &str = "2e2e2e";
/// Default right-hand text.
pub const DEFAULT_MESSAGE: &str = "no status";
/// Default right-hand background color.
pub const DEFAULT_MESSAGE_COLOR: &str = "2986CC";
/// Default remote name.
pub const DEFAULT_REMOTE_NAME: &str = "origin";
/// Fallback commit author name.
pub const DEFAULT_GITCONFIG_NAME: &str = "Mona Lisa";
/// Fallback commit author email.
pub const DEFAULT_GITCONFIG_EMAIL: &str = "mona.lisa@github.com";

/// Fully resolved settings for one workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSettings {
    /// Descriptor file stem, written to `badges/<badge_name>.json`.
    pub badge_name:      String,
    /// Branch that receives the descriptor.
    pub badge_branch:    String,
    /// Optional click-through target; empty means no link.
    pub badge_url:       String,
    /// Requested style; checked by the validator.
    pub badge_style:     String,
    /// Left-hand text.
    pub label:           String,
    /// Left-hand background color.
    pub label_color:     String,
    /// Right-hand text.
    pub message:         String,
    /// Right-hand background color.
    pub message_color:   String,
    /// Remote used for fetch, pull and push.
    pub remote_name:     String,
    /// Author name applied when the repository has no usable identity.
    pub gitconfig_name:  String,
    /// Author email applied when the repository has no usable identity.
    pub gitconfig_email: String
}

impl Default for BadgeSettings {
    fn default() -> Self {
        Self {
            badge_name:      DEFAULT_BADGE_NAME.to_owned(),
            badge_branch:    DEFAULT_BADGE_BRANCH.to_owned(),
            badge_url:       String::new(),
            badge_style:     DEFAULT_BADGE_STYLE.to_owned(),
            label:           DEFAULT_LABEL.to_owned(),
            label_color:     DEFAULT_LABEL_COLOR.to_owned(),
            message:         DEFAULT_MESSAGE.to_owned(),
            message_color:   DEFAULT_MESSAGE_COLOR.to_owned(),
            remote_name:     DEFAULT_REMOTE_NAME.to_owned(),
            gitconfig_name:  DEFAULT_GITCONFIG_NAME.to_owned(),
            gitconfig_email: DEFAULT_GITCONFIG_EMAIL.to_owned()
        }
    }
}

/// Partial settings, as supplied by the command line or a settings file.
///
/// Every field is optional; unset fields fall through to the next layer.
///
/// # Examples
///
/// ```
/// use setup_badge::SettingsLayer;
///
/// let yaml = r#"
/// badge-name: coverage
/// message_color: "#44cc11"
/// "#;
/// let layer: SettingsLayer = serde_yaml::from_str(yaml).expect("valid settings");
/// assert_eq!(layer.badge_name.as_deref(), Some("coverage"));
/// assert_eq!(layer.message_color.as_deref(), Some("#44cc11"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsLayer {
    #[serde(default, alias = "badge-name")]
    pub badge_name:      Option<String>,
    #[serde(default, alias = "badge-branch")]
    pub badge_branch:    Option<String>,
    #[serde(default, alias = "badge-url")]
    pub badge_url:       Option<String>,
    #[serde(default, alias = "badge-style")]
    pub badge_style:     Option<String>,
    #[serde(default)]
    pub label:           Option<String>,
    #[serde(default, alias = "label-color")]
    pub label_color:     Option<String>,
    #[serde(default)]
    pub message:         Option<String>,
    #[serde(default, alias = "message-color")]
    pub message_color:   Option<String>,
    #[serde(default, alias = "remote-name")]
    pub remote_name:     Option<String>,
    #[serde(default, alias = "gitconfig-name")]
    pub gitconfig_name:  Option<String>,
    #[serde(default, alias = "gitconfig-email")]
    pub gitconfig_email: Option<String>
}

impl SettingsLayer {
    /// Returns a layer where values of `self` win over `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            badge_name:      self.badge_name.or(fallback.badge_name),
            badge_branch:    self.badge_branch.or(fallback.badge_branch),
            badge_url:       self.badge_url.or(fallback.badge_url),
            badge_style:     self.badge_style.or(fallback.badge_style),
            label:           self.label.or(fallback.label),
            label_color:     self.label_color.or(fallback.label_color),
            message:         self.message.or(fallback.message),
            message_color:   self.message_color.or(fallback.message_color),
            remote_name:     self.remote_name.or(fallback.remote_name),
            gitconfig_name:  self.gitconfig_name.or(fallback.gitconfig_name),
            gitconfig_email: self.gitconfig_email.or(fallback.gitconfig_email)
        }
    }

    /// Fills unset values with the built-in defaults.
    pub fn resolve(self) -> BadgeSettings {
        let defaults = BadgeSettings::default();
        BadgeSettings {
            badge_name:      self.badge_name.unwrap_or(defaults.badge_name),
            badge_branch:    self.badge_branch.unwrap_or(defaults.badge_branch),
            badge_url:       self.badge_url.unwrap_or(defaults.badge_url),
            badge_style:     self.badge_style.unwrap_or(defaults.badge_style),
            label:           self.label.unwrap_or(defaults.label),
            label_color:     self.label_color.unwrap_or(defaults.label_color),
            message:         self.message.unwrap_or(defaults.message),
            message_color:   self.message_color.unwrap_or(defaults.message_color),
            remote_name:     self.remote_name.unwrap_or(defaults.remote_name),
            gitconfig_name:  self.gitconfig_name.unwrap_or(defaults.gitconfig_name),
            gitconfig_email: self.gitconfig_email.unwrap_or(defaults.gitconfig_email)
        }
    }
}

/// Parses a settings layer from a YAML document.
///
/// An empty document yields an empty layer.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the document is not valid YAML or contains
/// values of the wrong type.
pub fn parse_settings(contents: &str) -> Result<SettingsLayer, Error> {
    if contents.trim().is_empty() {
        return Ok(SettingsLayer::default());
    }

    Ok(serde_yaml::from_str(contents)?)
}

/// Loads a settings layer from the YAML file at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when it cannot be decoded.
pub fn load_settings(path: &Path) -> Result<SettingsLayer, Error> {
    debug!("Reading badge settings from {}", path.display());
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_settings(&contents)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn defaults_match_command_line_documentation() {
        let settings = BadgeSettings::default();
        assert_eq!(settings.badge_name, "badge");
        assert_eq!(settings.badge_branch, "badges");
        assert_eq!(settings.badge_url, "");
        assert_eq!(settings.badge_style, "flat");
        assert_eq!(settings.label, "demo");
        assert_eq!(settings.label_color, "2e2e2e");
        assert_eq!(settings.message, "no status");
        assert_eq!(settings.message_color, "2986CC");
        assert_eq!(settings.remote_name, "origin");
        assert_eq!(settings.gitconfig_name, "Mona Lisa");
        assert_eq!(settings.gitconfig_email, "mona.lisa@github.com");
    }

    #[test]
    fn empty_layer_resolves_to_defaults() {
        assert_eq!(SettingsLayer::default().resolve(), BadgeSettings::default());
    }

    #[test]
    fn command_line_layer_wins_over_file_layer() {
        let cli = SettingsLayer {
            label: Some("coverage".to_owned()),
            ..SettingsLayer::default()
        };
        let file = SettingsLayer {
            label: Some("from-file".to_owned()),
            message: Some("97%".to_owned()),
            ..SettingsLayer::default()
        };

        let settings = cli.or(file).resolve();
        assert_eq!(settings.label, "coverage");
        assert_eq!(settings.message, "97%");
        assert_eq!(settings.badge_branch, "badges");
    }

    #[test]
    fn parse_settings_accepts_both_key_spellings() {
        let yaml = "badge_branch: status\nremote-name: upstream\nbadge-style: social\n";
        let layer = parse_settings(yaml).expect("valid yaml");
        assert_eq!(layer.badge_branch.as_deref(), Some("status"));
        assert_eq!(layer.remote_name.as_deref(), Some("upstream"));
        assert_eq!(layer.badge_style.as_deref(), Some("social"));
    }

    #[test]
    fn parse_settings_treats_blank_document_as_empty() {
        assert_eq!(parse_settings("  \n").expect("blank"), SettingsLayer::default());
    }

    #[test]
    fn parse_settings_rejects_wrong_types() {
        let error = parse_settings("label: [1, 2]\n").expect_err("sequence is not a string");
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn load_settings_reads_file() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("badge.yaml");
        fs::write(&path, "message: passing\nmessage-color: 44cc11\n").expect("write settings");

        let layer = load_settings(&path).expect("settings load");
        assert_eq!(layer.message.as_deref(), Some("passing"));
        assert_eq!(layer.message_color.as_deref(), Some("44cc11"));
    }

    #[test]
    fn load_settings_reports_missing_file() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("absent.yaml");

        match load_settings(&path).expect_err("missing file") {
            Error::Io {
                path: stored, ..
            } => assert_eq!(stored, path),
            other => panic!("expected io error, got {other:?}")
        }
    }
}
