//! Business operations that publish events and the handlers that react to them.
//!
//! Services depend on the `events::Publisher` trait, never on a concrete bus,
//! and publish only after the store has committed the change an event describes.

use events::{EventBus, EventType};
use std::sync::Arc;

pub use entity::{goal_categories, goals, levels, status, users, Id};

pub mod error;
pub mod goal;
pub mod jwt;
pub mod memory;
pub mod store;
pub mod user;

pub use goal::GoalService;
pub use user::UserService;

/// Subscribes the domain services to the events they react to.
pub fn register_handlers(bus: &EventBus, users: Arc<UserService>, goals: Arc<GoalService>) {
    bus.subscribe(EventType::GoalUpdated, users);
    bus.subscribe(EventType::UserCreated, goals.clone());
    bus.subscribe(EventType::GoalCategoryCreated, goals);
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use events::{Event, EventHandler, EventType, Publisher};
    use std::sync::Mutex;

    /// Keeps every event published or handed to it.
    #[derive(Default)]
    pub struct Recorder {
        events: Mutex<Vec<Event>>,
    }

    impl Recorder {
        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        pub fn of_type(&self, event_type: EventType) -> Vec<Event> {
            self.events()
                .into_iter()
                .filter(|event| event.event_type() == event_type)
                .collect()
        }
    }

    #[async_trait]
    impl Publisher for Recorder {
        async fn publish(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle_event(&self, event: &Event) -> Result<(), events::Error> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryGoalStore, MemoryUserStore};
    use crate::test_support::Recorder;
    use events::{GoalUpdatedData, XpUpdatedData};
    use crate::status::GoalStatus;

    struct Fixture {
        users: Arc<UserService>,
        goals: Arc<GoalService>,
        seen: Arc<Recorder>,
    }

    fn fixture() -> Fixture {
        let bus = Arc::new(EventBus::new());
        let users = Arc::new(UserService::new(
            Arc::new(MemoryUserStore::default()),
            bus.clone(),
        ));
        let goals = Arc::new(GoalService::new(Arc::new(MemoryGoalStore::new()), bus.clone()));
        register_handlers(&bus, users.clone(), goals.clone());

        let seen = Arc::new(Recorder::default());
        for event_type in EventType::ALL {
            bus.subscribe(event_type, seen.clone());
        }

        Fixture { users, goals, seen }
    }

    #[tokio::test]
    async fn a_new_user_is_seeded_with_a_daily_category_and_example_goal() {
        let fixture = fixture();

        let user = fixture.users.create_user("new@goalify.dev").await.unwrap();

        let categories = fixture.goals.find_categories_by_user(user.id).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].title, goal::DEFAULT_CATEGORY_TITLE);
        assert_eq!(categories[0].xp_per_goal, goal::XP_PER_GOAL_MAX);
        assert_eq!(categories[0].goals.len(), 1);
        assert_eq!(categories[0].goals[0].title, goal::EXAMPLE_GOAL_TITLE);

        let types: Vec<EventType> = fixture.seen.events().iter().map(|e| e.event_type()).collect();
        assert!(types.contains(&EventType::UserCreated));
        assert!(types.contains(&EventType::GoalCategoryCreated));
        assert!(types.contains(&EventType::DefaultGoalCreated));
        assert!(fixture.seen.events().iter().all(|e| e.is_for(user.id)));
    }

    #[tokio::test]
    async fn completing_the_example_goal_levels_the_user_up() {
        let fixture = fixture();
        let user = fixture.users.create_user("new@goalify.dev").await.unwrap();
        let categories = fixture.goals.find_categories_by_user(user.id).await.unwrap();
        let goal = &categories[0].goals[0];

        fixture
            .goals
            .update_goal_status(goal.id, user.id, GoalStatus::Complete)
            .await
            .unwrap();

        let updated = fixture.users.find_by_id(user.id).await.unwrap();
        // The default category awards exactly the level 1 threshold.
        assert_eq!((updated.level_id, updated.xp), (2, 0));

        let goal_updates = fixture.seen.of_type(EventType::GoalUpdated);
        assert_eq!(goal_updates.len(), 1);
        assert_eq!(
            goal_updates[0].parse::<GoalUpdatedData>().unwrap().xp_per_goal,
            goal::XP_PER_GOAL_MAX
        );
        let xp_updates = fixture.seen.of_type(EventType::XpUpdated);
        assert_eq!(xp_updates.len(), 1);
        assert_eq!(
            xp_updates[0].parse::<XpUpdatedData>().unwrap(),
            &XpUpdatedData { level_id: 2, xp: 0 }
        );
    }
}
