//! Core types used throughout the project.

use std::fmt;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

/// Status of a translation, taken from the `type` attribute of `<translation>`.
///
/// A missing attribute means the translation is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    #[default]
    Finished,
    /// Not translated yet, or translated but not reviewed.
    Unfinished,
    /// The source string no longer exists in the application.
    Vanished,
    /// Legacy spelling of `Vanished` written by older `lupdate` versions.
    Obsolete,
}

impl TranslationStatus {
    /// Value of the `type` attribute, `None` for finished translations.
    #[must_use]
    pub const fn as_attribute(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// True for messages whose source string is gone from the application.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Vanished | Self::Obsolete)
    }
}

impl FromStr for TranslationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Finished),
            "unfinished" => Ok(Self::Unfinished),
            "vanished" => Ok(Self::Vanished),
            "obsolete" => Ok(Self::Obsolete),
            other => Err(format!("unknown translation type '{other}'")),
        }
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_attribute().unwrap_or("finished"))
    }
}

/// Line reference of a `<location>` element.
///
/// `lupdate` writes relative offsets (`+12`, `-3`) against the previous
/// location of the same file unless absolute locations were requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineNumber {
    Absolute(u32),
    Relative(i32),
}

impl FromStr for LineNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(['+', '-']) { s.parse().map(Self::Relative) } else { s.parse().map(Self::Absolute) }
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(line) => write!(f, "{line}"),
            Self::Relative(offset) => write!(f, "{offset:+}"),
        }
    }
}

/// Advisory source location of a message. Not part of the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// Omitted when it repeats the file of the previous location.
    pub filename: Option<String>,
    pub line: Option<LineNumber>,
}
