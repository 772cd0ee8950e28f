// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Static validation of command line inputs.
//!
//! Every check runs before the repository is touched. Validation is
//! all-or-nothing: a single failing field rejects the whole input set, and
//! the resulting error lists every field that failed.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{config::BadgeSettings, error::Error};

/// Appearance presets understood by the shields.io endpoint renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeStyle {
    /// Default flat style.
    Flat,
    /// Flat style without rounded corners.
    FlatSquare,
    /// Glossy style.
    Plastic,
    /// Large uppercase style.
    ForTheBadge,
    /// GitHub social style.
    Social
}

impl BadgeStyle {
    /// All styles accepted by [`validate_inputs`].
    pub const ALL: [Self; 5] = [
        Self::Flat,
        Self::FlatSquare,
        Self::Plastic,
        Self::ForTheBadge,
        Self::Social
    ];

    /// Returns the identifier written into the badge descriptor.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::FlatSquare => "flat-square",
            Self::Plastic => "plastic",
            Self::ForTheBadge => "for-the-badge",
            Self::Social => "social"
        }
    }
}

impl fmt::Display for BadgeStyle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for BadgeStyle {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == value)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|style| style.as_str()).collect();
                Error::validation(format!(
                    "badge style '{value}' is not one of: {}",
                    allowed.join(", ")
                ))
            })
    }
}

/// Returns `true` when `value` is a 3 or 6 digit hexadecimal color.
///
/// A single leading `#` is ignored.
///
/// # Examples
///
/// ```
/// use setup_badge::is_hex_color;
///
/// assert!(is_hex_color("#2986CC"));
/// assert!(is_hex_color("fff"));
/// assert!(!is_hex_color("GGG"));
/// assert!(!is_hex_color("0000"));
/// ```
pub fn is_hex_color(value: &str) -> bool {
    let digits = value.strip_prefix('#').unwrap_or(value);
    matches!(digits.len(), 3 | 6) && digits.chars().all(|character| character.is_ascii_hexdigit())
}

/// Schemes accepted for the badge click-through target.
const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Returns `true` when `value` parses as an absolute http(s) or ftp(s) URL
/// with a host.
///
/// # Examples
///
/// ```
/// use setup_badge::is_valid_url;
///
/// assert!(is_valid_url("https://github.com/acme/widgets"));
/// assert!(is_valid_url("http://[::1]:8080/status"));
/// assert!(!is_valid_url("hxxp://example.com"));
/// ```
pub fn is_valid_url(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match Url::parse(value) {
        Ok(parsed) => {
            URL_SCHEMES.contains(&parsed.scheme())
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false
    }
}

/// Validates colors, style and badge URL of the resolved settings.
///
/// An empty badge URL skips the URL check. On success the parsed
/// [`BadgeStyle`] is returned.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming every field that failed.
///
/// # Examples
///
/// ```
/// use setup_badge::{BadgeSettings, BadgeStyle, validate_inputs};
///
/// let settings = BadgeSettings::default();
/// assert_eq!(validate_inputs(&settings).unwrap(), BadgeStyle::Flat);
/// ```
pub fn validate_inputs(settings: &BadgeSettings) -> Result<BadgeStyle, Error> {
    let mut problems = Vec::new();

    if !is_hex_color(&settings.label_color) {
        problems.push(format!(
            "label color '{}' is not a 3 or 6 digit hex color",
            settings.label_color
        ));
    }
    if !is_hex_color(&settings.message_color) {
        problems.push(format!(
            "message color '{}' is not a 3 or 6 digit hex color",
            settings.message_color
        ));
    }

    let style = settings.badge_style.parse::<BadgeStyle>();
    if let Err(error) = &style {
        problems.push(validation_text(error));
    }

    if !settings.badge_url.is_empty() && !is_valid_url(&settings.badge_url) {
        problems.push(format!("badge url '{}' is not a valid URL", settings.badge_url));
    }

    match style {
        Ok(style) if problems.is_empty() => Ok(style),
        _ => Err(Error::validation(problems.join("; ")))
    }
}

fn validation_text(error: &Error) -> String {
    match error {
        Error::Validation {
            message
        } => message.clone(),
        other => other.to_display_string()
    }
}
