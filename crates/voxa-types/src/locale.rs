//! Supported assistant languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language used for spoken replies and sentence examples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ru => write!(f, "ru"),
            Self::En => write!(f, "en"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" | "ru-ru" | "russian" => Ok(Self::Ru),
            "en" | "en-us" | "en-gb" | "english" => Ok(Self::En),
            other => Err(format!("unsupported locale: '{other}'")),
        }
    }
}
