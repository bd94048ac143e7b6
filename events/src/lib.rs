//! Event system infrastructure for Goalify.
//!
//! This crate provides the event system that enables loose coupling between
//! business operations and the reactions to them (awarding XP, seeding default
//! data, pushing live updates to connected clients).
//!
//! # Architecture
//!
//! - **Event**: immutable envelope of a typed payload and an optional target user
//! - **EventHandler**: trait implemented by anything that subscribes to events
//! - **EventBus**: registry of handlers per event type with in-order dispatch
//! - **Publisher**: what business services publish through, either the bus
//!   itself (synchronous) or a [`QueuedDispatcher`] (decoupled)
//!
//! Business services must publish only after the state change that caused the
//! event has been committed.

use async_trait::async_trait;
use serde::Serialize;

pub mod bus;
pub mod dispatcher;
pub mod error;
pub mod payload;

pub use bus::EventBus;
pub use dispatcher::QueuedDispatcher;
pub use error::{Error, EventErrorKind};
pub use payload::{
    ConnectedData, EventPayload, EventType, FromPayload, GoalUpdatedData, XpUpdatedData,
};

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = entity::Id;

/// An immutable event. Created by a business operation, read by subscribers.
///
/// Serializes as `{"event_type": ..., "data": ..., "user_id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(flatten)]
    payload: EventPayload,
    user_id: Option<Id>,
}

impl Event {
    /// An event not addressed to any particular user.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            user_id: None,
        }
    }

    /// An event addressed to `user_id`. Only that user's live connections see it.
    pub fn for_user(payload: EventPayload, user_id: Id) -> Self {
        Self {
            payload,
            user_id: Some(user_id),
        }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn user_id(&self) -> Option<Id> {
        self.user_id
    }

    pub fn is_for(&self, user_id: Id) -> bool {
        self.user_id == Some(user_id)
    }

    /// Borrows the payload as `T`, failing if the event is of a different type.
    pub fn parse<T: FromPayload>(&self) -> Result<&T, Error> {
        T::from_payload(&self.payload).ok_or(Error {
            source: None,
            error_kind: EventErrorKind::PayloadMismatch {
                expected: T::EVENT_TYPE,
                found: self.event_type(),
            },
        })
    }

    /// JSON encoding of the full envelope.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Free-function form of [`Event::parse`].
pub fn parse_event_data<T: FromPayload>(event: &Event) -> Result<&T, Error> {
    event.parse::<T>()
}

/// Trait for handling events.
///
/// Domain services implement it to react to what other services did; live
/// connections implement it to receive what they should stream. Returning an
/// error only aborts this handler's processing of this event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: &Event) -> Result<(), Error>;
}

/// Entry point business services publish through.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, event: Event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use entity::{goals, status::GoalStatus};

    fn goal() -> goals::Model {
        let now = Utc::now();
        goals::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            category_id: Id::new_v4(),
            title: "read".to_string(),
            description: "read a chapter".to_string(),
            status: GoalStatus::NotComplete,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn parse_returns_the_concrete_payload() {
        let data = XpUpdatedData {
            level_id: 1,
            xp: 20,
        };
        let event = Event::new(EventPayload::XpUpdated(data.clone()));

        let parsed = parse_event_data::<XpUpdatedData>(&event).unwrap();
        assert_eq!(parsed, &data);
    }

    #[test]
    fn parse_reports_a_typed_mismatch() {
        let event = Event::new(EventPayload::DefaultGoalCreated(goal()));

        let err = event.parse::<GoalUpdatedData>().unwrap_err();
        assert_eq!(
            err.error_kind,
            EventErrorKind::PayloadMismatch {
                expected: EventType::GoalUpdated,
                found: EventType::DefaultGoalCreated,
            }
        );
    }

    #[test]
    fn encode_produces_the_envelope() {
        let user_id = Id::new_v4();
        let event = Event::for_user(
            EventPayload::XpUpdated(XpUpdatedData {
                level_id: 4,
                xp: 75,
            }),
            user_id,
        );

        let json: serde_json::Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert_eq!(json["event_type"], "xp_updated");
        assert_eq!(json["data"]["xp"], 75);
        assert_eq!(json["user_id"], user_id.to_string());
    }

    #[test]
    fn untargeted_events_encode_a_null_user() {
        let event = Event::new(EventPayload::DefaultGoalCreated(goal()));
        let json: serde_json::Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert!(json["user_id"].is_null());
        assert!(!event.is_for(Id::new_v4()));
    }
}
