#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the setup-badge crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Low-level failures reported by the git collaborator surface as
//! [`Error::Git`]. The branch reconciler, the change publisher and the CI
//! cleanup step each convert whatever went wrong underneath them into their
//! own boundary variant, so callers only ever match on the stage that failed.

use std::path::{Path, PathBuf};

/// Unified error type returned by every component of the badge workflow.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading the settings file.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors of the settings file.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when command line inputs violate badge constraints.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing every failed check.
        message: String
    },
    /// Wraps serialization errors when encoding the badge descriptor.
    #[error("failed to serialize badge descriptor: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing the badge descriptor.
    #[error("failed to write badge descriptor at {path:?}: {source}")]
    BadgeIo {
        /// Location of the descriptor being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// A single git invocation failed.
    #[error("git {command} failed: {message}")]
    Git {
        /// Arguments passed to git, joined by spaces.
        command: String,
        /// Trimmed stderr output or spawn failure description.
        message: String
    },
    /// The target branch could not be prepared for publishing.
    #[error("{message}")]
    Reconcile {
        /// Human readable reason reported to the user.
        message: String
    },
    /// Staging, committing or pushing the descriptor failed.
    #[error("{message}")]
    Publish {
        /// Human readable reason reported to the user.
        message: String
    },
    /// Deleting the remote badge branch after a CI test run failed.
    #[error("{message}")]
    Cleanup {
        /// Human readable reason reported to the user.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a git error for the given argument list.
    ///
    /// # Parameters
    ///
    /// * `args` - Arguments that were passed to the git executable.
    /// * `message` - Diagnostic output explaining the failure.
    pub fn git<M>(args: &[&str], message: M) -> Self
    where
        M: Into<String>
    {
        Self::Git {
            command: args.join(" "),
            message: message.into()
        }
    }

    /// Converts any error into a reconciliation failure, keeping its text.
    pub fn into_reconcile(self) -> Self {
        match self {
            reconcile @ Self::Reconcile {
                ..
            } => reconcile,
            other => Self::Reconcile {
                message: other.to_display_string()
            }
        }
    }

    /// Converts any error into a publish failure, keeping its text.
    pub fn into_publish(self) -> Self {
        match self {
            publish @ Self::Publish {
                ..
            } => publish,
            other => Self::Publish {
                message: other.to_display_string()
            }
        }
    }

    /// Converts any error into a cleanup failure, keeping its text.
    pub fn into_cleanup(self) -> Self {
        match self {
            cleanup @ Self::Cleanup {
                ..
            } => cleanup,
            other => Self::Cleanup {
                message: other.to_display_string()
            }
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::BadgeIo`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the badge descriptor that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn badge_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::BadgeIo {
        path: path.to_path_buf(),
        source
    }
}
