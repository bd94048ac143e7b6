use serde::{Deserialize, Serialize};

/// A step on the progression ladder. Users start on level 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: i32,
    /// XP needed to advance past this level.
    #[serde(rename = "xp")]
    pub level_up_xp: i32,
    #[serde(rename = "cash")]
    pub cash_reward: i32,
}
