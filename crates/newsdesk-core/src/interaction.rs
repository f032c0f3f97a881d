//! Rows of the `user_login` interaction log.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::label::Label;

/// An interaction about to be appended. The store assigns the id.
///
/// `interaction_time` is kept at whole-second precision, matching the
/// `DATETIME` column it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
    pub name: String,
    pub interaction_time: NaiveDateTime,
    pub input_text: Option<String>,
    pub predicted_category: Option<Label>,
}

impl NewInteraction {
    /// A classification: the submitted text and the label shown to the user.
    pub fn classified(
        name: impl Into<String>,
        interaction_time: NaiveDateTime,
        input_text: impl Into<String>,
        label: Label,
    ) -> Self {
        Self {
            name: name.into(),
            interaction_time: truncate_to_seconds(interaction_time),
            input_text: Some(input_text.into()),
            predicted_category: Some(label),
        }
    }

    /// A visit without a prediction; text and category are stored as NULL.
    pub fn login(name: impl Into<String>, interaction_time: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            interaction_time: truncate_to_seconds(interaction_time),
            input_text: None,
            predicted_category: None,
        }
    }
}

/// A stored interaction as read back from the table.
///
/// `predicted_category` stays a string: rows written by other tools are not
/// guaranteed to hold one of the four labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: i64,
    pub name: Option<String>,
    pub interaction_time: Option<NaiveDateTime>,
    pub input_text: Option<String>,
    pub predicted_category: Option<String>,
}

impl InteractionRecord {
    pub fn label(&self) -> Option<Label> {
        self.predicted_category.as_deref()?.parse().ok()
    }
}

fn truncate_to_seconds(t: NaiveDateTime) -> NaiveDateTime {
    t.with_nanosecond(0).unwrap_or(t)
}
