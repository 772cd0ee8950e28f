// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge descriptor construction and persistence.
//!
//! The descriptor follows the shields.io endpoint schema. Field names and
//! their order are fixed by the consumer, so the struct layout below is the
//! wire format.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    validate::BadgeStyle
};

/// Directory, relative to the repository root, that holds descriptors.
pub const BADGE_DIR: &str = "badges";

/// Schema version expected by the endpoint renderer.
pub const SCHEMA_VERSION: u32 = 1;

/// Shields.io endpoint badge descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDescriptor {
    /// Always [`SCHEMA_VERSION`].
    pub schema_version: u32,
    /// Appearance preset.
    pub style:          BadgeStyle,
    /// Left-hand text.
    pub label:          String,
    /// Left-hand background color.
    pub label_color:    String,
    /// Right-hand text.
    pub message:        String,
    /// Right-hand background color.
    pub color:          String
}

impl BadgeDescriptor {
    /// Builds a descriptor from validated fields.
    ///
    /// Colors are kept exactly as supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use setup_badge::{BadgeDescriptor, BadgeStyle};
    ///
    /// let descriptor = BadgeDescriptor::new(BadgeStyle::Flat, "demo", "2e2e2e", "ok", "2986CC");
    /// assert_eq!(descriptor.schema_version, 1);
    /// assert_eq!(descriptor.color, "2986CC");
    /// ```
    pub fn new(
        style: BadgeStyle,
        label: &str,
        label_color: &str,
        message: &str,
        message_color: &str
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            style,
            label: label.to_owned(),
            label_color: label_color.to_owned(),
            message: message.to_owned(),
            color: message_color.to_owned()
        }
    }

    /// Renders the persisted form: pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if encoding fails.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut rendered = serde_json::to_string_pretty(self)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

/// Path of the descriptor relative to the repository root.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use setup_badge::badge_relative_path;
///
/// assert_eq!(badge_relative_path("coverage"), Path::new("badges/coverage.json"));
/// ```
pub fn badge_relative_path(badge_name: &str) -> PathBuf {
    Path::new(BADGE_DIR).join(format!("{badge_name}.json"))
}

/// Writes `descriptor` to `<root>/badges/<badge_name>.json`.
///
/// Missing directories are created. The file is overwritten in place; the
/// repository history is the recovery mechanism, so no temp-file dance is
/// performed. Returns the absolute path of the written file.
///
/// # Errors
///
/// Returns [`Error::BadgeIo`] when the directory or file cannot be written
/// and [`Error::Serialize`] if the descriptor cannot be encoded.
pub fn write_descriptor(
    root: &Path,
    badge_name: &str,
    descriptor: &BadgeDescriptor
) -> Result<PathBuf, Error> {
    let directory = root.join(BADGE_DIR);
    fs::create_dir_all(&directory).map_err(|source| error::badge_io_error(&directory, source))?;

    let path = root.join(badge_relative_path(badge_name));
    let contents = descriptor.to_json()?;

    let file = File::create(&path).map_err(|source| error::badge_io_error(&path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|source| error::badge_io_error(&path, source))?;
    writer
        .flush()
        .map_err(|source| error::badge_io_error(&path, source))?;

    Ok(path)
}
