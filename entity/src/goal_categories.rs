use crate::{goals, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    /// XP awarded to the owner for each goal in this category that gets completed.
    pub xp_per_goal: i32,
    #[serde(default)]
    pub goals: Vec<goals::Model>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
