//! Media type and rule action enums shared by every layer.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of catalog item a rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Movie,
    TvSeries,
    Episode,
}

impl MediaType {
    pub const ALL: &'static [MediaType] = &[Self::Movie, Self::TvSeries, Self::Episode];

    /// Stable string representation matching serde's `SCREAMING_SNAKE_CASE`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "MOVIE",
            Self::TvSeries => "TV_SERIES",
            Self::Episode => "EPISODE",
        }
    }
}

impl FromStr for MediaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOVIE" => Ok(Self::Movie),
            "TV_SERIES" => Ok(Self::TvSeries),
            "EPISODE" => Ok(Self::Episode),
            other => Err(CoreError::Validation(format!(
                "Unknown media type '{other}'. Valid types: MOVIE, TV_SERIES, EPISODE"
            ))),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to items a rule flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Candidates wait for an admin decision.
    FlagForReview,
    /// Candidates are approved as soon as they are flagged.
    AutoDelete,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FlagForReview => "FLAG_FOR_REVIEW",
            Self::AutoDelete => "AUTO_DELETE",
        }
    }
}

impl FromStr for ActionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FLAG_FOR_REVIEW" => Ok(Self::FlagForReview),
            "AUTO_DELETE" => Ok(Self::AutoDelete),
            other => Err(CoreError::Validation(format!(
                "Unknown action type '{other}'. Valid types: FLAG_FOR_REVIEW, AUTO_DELETE"
            ))),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
