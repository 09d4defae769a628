//! Log levels as defined by the native protocol's log enum.

use serde::{Deserialize, Serialize};

/// Verbosity level carried in log subscriptions and log frames.
///
/// Numeric values match the wire enum and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Config = 4,
    Debug = 5,
    Verbose = 6,
    VeryVerbose = 7,
}

impl LogLevel {
    /// Wire value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Decode a wire value; anything out of range maps to `None`.
    #[must_use]
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Config,
            5 => Self::Debug,
            6 => Self::Verbose,
            7 => Self::VeryVerbose,
            _ => Self::None,
        }
    }

    /// Single-letter tag used when rendering log lines.
    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Error => "E",
            Self::Warn => "W",
            Self::Info => "I",
            Self::Config => "C",
            Self::Debug => "D",
            Self::Verbose => "V",
            Self::VeryVerbose => "VV",
        }
    }
}
