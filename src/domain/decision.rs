use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Ignored,
    Visited,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Ignored => "ignored",
            Reason::Visited => "visited",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Reason::Ignored => "(ignored)",
            Reason::Visited => "(visited)",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reason {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ignored" => Ok(Reason::Ignored),
            "visited" => Ok(Reason::Visited),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub reason: Reason,
    /// Absent for decisions synthesized from history that are not stored yet.
    #[serde(rename = "recordedAt", default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Decision {
    pub fn recorded(reason: Reason, at: DateTime<Utc>) -> Self {
        Self {
            reason,
            recorded_at: Some(at),
        }
    }

    pub fn from_history() -> Self {
        Self {
            reason: Reason::Visited,
            recorded_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyStyle {
    #[default]
    #[serde(rename = "grayout")]
    GrayOut,
    #[serde(rename = "hide")]
    Hide,
}

impl ApplyStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyStyle::GrayOut => "grayout",
            ApplyStyle::Hide => "hide",
        }
    }

    pub fn css(&self) -> &'static str {
        match self {
            ApplyStyle::GrayOut => "opacity: 0.5",
            ApplyStyle::Hide => "display: none",
        }
    }
}

impl fmt::Display for ApplyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplyStyle {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grayout" | "gray-out" => Ok(ApplyStyle::GrayOut),
            "hide" => Ok(ApplyStyle::Hide),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "applyStyle", default)]
    pub apply_style: ApplyStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value `{0}`")]
pub struct UnknownVariant(pub String);
