use serde::{Deserialize, Serialize};

/// Completion state of a goal.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotComplete,
    Complete,
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalStatus::NotComplete => write!(fmt, "not_complete"),
            GoalStatus::Complete => write!(fmt, "complete"),
        }
    }
}
