//! The four news categories and their class-index mapping.
//!
//! Index order is the training label order of the exported classifier
//! (AG News): changing it silently relabels every prediction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Predicted news category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "World")]
    World,
    #[serde(rename = "Sports")]
    Sports,
    #[serde(rename = "Business")]
    Business,
    #[serde(rename = "Sci/Tech")]
    SciTech,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category label: {0:?}")]
pub struct ParseLabelError(pub String);

impl Label {
    /// All labels, ordered by class index.
    pub const ALL: [Label; 4] = [Label::World, Label::Sports, Label::Business, Label::SciTech];

    /// Number of classes the classifier head must produce.
    pub const COUNT: usize = Self::ALL.len();

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Self::World => 0,
            Self::Sports => 1,
            Self::Business => 2,
            Self::SciTech => 3,
        }
    }

    /// Category name as stored in `user_login.predicted_category`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::World => "World",
            Self::Sports => "Sports",
            Self::Business => "Business",
            Self::SciTech => "Sci/Tech",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}
