use entity::{goal_categories, goals, users};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag identifying the kind of an event. Subscriptions are keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    UserCreated,
    GoalCategoryCreated,
    DefaultGoalCreated,
    GoalUpdated,
    XpUpdated,
    /// Synthetic greeting written to a freshly opened SSE stream.
    SseConnected,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::UserCreated,
        EventType::GoalCategoryCreated,
        EventType::DefaultGoalCreated,
        EventType::GoalUpdated,
        EventType::XpUpdated,
        EventType::SseConnected,
    ];

    /// Wire name, used as the SSE `event:` field and the JSON `event_type` member.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UserCreated => "user_created",
            EventType::GoalCategoryCreated => "goal_category_created",
            EventType::DefaultGoalCreated => "default_goal_created",
            EventType::GoalUpdated => "goal_updated",
            EventType::XpUpdated => "xp_updated",
            EventType::SseConnected => "sse_connected",
        }
    }

    /// Whether events of this type are streamed to the target user's live connections.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            EventType::GoalCategoryCreated
                | EventType::DefaultGoalCreated
                | EventType::GoalUpdated
                | EventType::XpUpdated
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `goal_updated` event: the goal before and after the change and
/// the XP its category awards on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalUpdatedData {
    pub old_goal: goals::Model,
    pub new_goal: goals::Model,
    pub xp_per_goal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpUpdatedData {
    pub level_id: i32,
    pub xp: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedData {
    pub connection_id: String,
}

/// Every event kind together with its concrete payload type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    UserCreated(users::Model),
    GoalCategoryCreated(goal_categories::Model),
    DefaultGoalCreated(goals::Model),
    GoalUpdated(GoalUpdatedData),
    XpUpdated(XpUpdatedData),
    SseConnected(ConnectedData),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::UserCreated(_) => EventType::UserCreated,
            EventPayload::GoalCategoryCreated(_) => EventType::GoalCategoryCreated,
            EventPayload::DefaultGoalCreated(_) => EventType::DefaultGoalCreated,
            EventPayload::GoalUpdated(_) => EventType::GoalUpdated,
            EventPayload::XpUpdated(_) => EventType::XpUpdated,
            EventPayload::SseConnected(_) => EventType::SseConnected,
        }
    }

    /// JSON of the payload alone, without the envelope.
    pub fn data_json(&self) -> Result<String, serde_json::Error> {
        match self {
            EventPayload::UserCreated(user) => serde_json::to_string(user),
            EventPayload::GoalCategoryCreated(category) => serde_json::to_string(category),
            EventPayload::DefaultGoalCreated(goal) => serde_json::to_string(goal),
            EventPayload::GoalUpdated(data) => serde_json::to_string(data),
            EventPayload::XpUpdated(data) => serde_json::to_string(data),
            EventPayload::SseConnected(data) => serde_json::to_string(data),
        }
    }
}

/// Types that can be borrowed out of an [`EventPayload`].
pub trait FromPayload: Sized {
    const EVENT_TYPE: EventType;

    fn from_payload(payload: &EventPayload) -> Option<&Self>;
}

impl FromPayload for users::Model {
    const EVENT_TYPE: EventType = EventType::UserCreated;

    fn from_payload(payload: &EventPayload) -> Option<&Self> {
        match payload {
            EventPayload::UserCreated(user) => Some(user),
            _ => None,
        }
    }
}

impl FromPayload for goal_categories::Model {
    const EVENT_TYPE: EventType = EventType::GoalCategoryCreated;

    fn from_payload(payload: &EventPayload) -> Option<&Self> {
        match payload {
            EventPayload::GoalCategoryCreated(category) => Some(category),
            _ => None,
        }
    }
}

impl FromPayload for goals::Model {
    const EVENT_TYPE: EventType = EventType::DefaultGoalCreated;

    fn from_payload(payload: &EventPayload) -> Option<&Self> {
        match payload {
            EventPayload::DefaultGoalCreated(goal) => Some(goal),
            _ => None,
        }
    }
}

impl FromPayload for GoalUpdatedData {
    const EVENT_TYPE: EventType = EventType::GoalUpdated;

    fn from_payload(payload: &EventPayload) -> Option<&Self> {
        match payload {
            EventPayload::GoalUpdated(data) => Some(data),
            _ => None,
        }
    }
}

impl FromPayload for XpUpdatedData {
    const EVENT_TYPE: EventType = EventType::XpUpdated;

    fn from_payload(payload: &EventPayload) -> Option<&Self> {
        match payload {
            EventPayload::XpUpdated(data) => Some(data),
            _ => None,
        }
    }
}

impl FromPayload for ConnectedData {
    const EVENT_TYPE: EventType = EventType::SseConnected;

    fn from_payload(payload: &EventPayload) -> Option<&Self> {
        match payload {
            EventPayload::SseConnected(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_unique() {
        let mut names: Vec<&str> = EventType::ALL.iter().map(EventType::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EventType::ALL.len());
    }

    #[test]
    fn only_user_facing_updates_are_live() {
        assert!(!EventType::UserCreated.is_live());
        assert!(!EventType::SseConnected.is_live());
        assert!(EventType::DefaultGoalCreated.is_live());
        assert!(EventType::XpUpdated.is_live());
    }

    #[test]
    fn payload_serializes_with_event_type_tag() {
        let payload = EventPayload::XpUpdated(XpUpdatedData {
            level_id: 3,
            xp: 40,
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["event_type"], "xp_updated");
        assert_eq!(json["data"]["level_id"], 3);
        assert_eq!(json["data"]["xp"], 40);
    }

    #[test]
    fn data_json_omits_the_envelope() {
        let payload = EventPayload::XpUpdated(XpUpdatedData {
            level_id: 2,
            xp: 10,
        });
        assert_eq!(payload.data_json().unwrap(), r#"{"level_id":2,"xp":10}"#);
    }
}
