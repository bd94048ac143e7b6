use crate::error::Error;
use crate::store::GoalStore;
use crate::{goal_categories, goals, Id};
use async_trait::async_trait;
use entity::status::GoalStatus;
use events::{Event, EventHandler, EventPayload, GoalUpdatedData, Publisher};
use log::*;
use std::sync::Arc;

/// Most XP a single goal of a category may award.
pub const XP_PER_GOAL_MAX: i32 = 100;

pub const DEFAULT_CATEGORY_TITLE: &str = "Daily";
pub const EXAMPLE_GOAL_TITLE: &str = "example";
pub const EXAMPLE_GOAL_DESCRIPTION: &str = "This is an example goal/task!";

/// Goal categories and goals.
///
/// Seeds new users with a default category, and every new category with an
/// example goal.
pub struct GoalService {
    store: Arc<dyn GoalStore>,
    publisher: Arc<dyn Publisher>,
}

impl GoalService {
    pub fn new(store: Arc<dyn GoalStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self { store, publisher }
    }

    pub async fn create_goal_category(
        &self,
        title: &str,
        xp_per_goal: i32,
        user_id: Id,
    ) -> Result<goal_categories::Model, Error> {
        let title = title.trim();
        if title.is_empty() || !(1..=XP_PER_GOAL_MAX).contains(&xp_per_goal) {
            warn!("Rejecting goal category {title:?} with {xp_per_goal} XP per goal");
            return Err(Error::invalid());
        }

        let category = self
            .store
            .create_category(user_id, title, xp_per_goal)
            .await?;
        debug!("New Goal Category: {category:?}");

        self.publisher
            .publish(Event::for_user(
                EventPayload::GoalCategoryCreated(category.clone()),
                user_id,
            ))
            .await;

        Ok(category)
    }

    pub async fn create_goal(
        &self,
        title: &str,
        description: &str,
        user_id: Id,
        category_id: Id,
    ) -> Result<goals::Model, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::invalid());
        }
        self.find_category(category_id, user_id).await?;

        let goal = self
            .store
            .create_goal(user_id, category_id, title, description)
            .await?;
        debug!("New Goal: {goal:?}");
        Ok(goal)
    }

    pub async fn update_goal_status(
        &self,
        goal_id: Id,
        user_id: Id,
        status: GoalStatus,
    ) -> Result<goals::Model, Error> {
        let old_goal = self.store.find_goal_by_id(goal_id).await?;
        if old_goal.user_id != user_id {
            warn!("User {user_id} attempted to update goal {goal_id} they do not own");
            return Err(Error::not_found());
        }
        let category = self.store.find_category_by_id(old_goal.category_id).await?;

        let new_goal = self.store.update_goal_status(goal_id, status).await?;
        debug!("Goal {goal_id} status {} -> {}", old_goal.status, new_goal.status);

        self.publisher
            .publish(Event::for_user(
                EventPayload::GoalUpdated(GoalUpdatedData {
                    old_goal,
                    new_goal: new_goal.clone(),
                    xp_per_goal: category.xp_per_goal,
                }),
                user_id,
            ))
            .await;

        Ok(new_goal)
    }

    pub async fn find_categories_by_user(
        &self,
        user_id: Id,
    ) -> Result<Vec<goal_categories::Model>, Error> {
        self.store.find_categories_by_user(user_id).await
    }

    async fn find_category(
        &self,
        category_id: Id,
        user_id: Id,
    ) -> Result<goal_categories::Model, Error> {
        let category = self.store.find_category_by_id(category_id).await?;
        if category.user_id != user_id {
            return Err(Error::not_found());
        }
        Ok(category)
    }

    async fn seed_example_goal(&self, category: &goal_categories::Model) -> Result<(), Error> {
        let goal = self
            .create_goal(
                EXAMPLE_GOAL_TITLE,
                EXAMPLE_GOAL_DESCRIPTION,
                category.user_id,
                category.id,
            )
            .await?;

        self.publisher
            .publish(Event::for_user(
                EventPayload::DefaultGoalCreated(goal),
                category.user_id,
            ))
            .await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for GoalService {
    async fn handle_event(&self, event: &Event) -> Result<(), events::Error> {
        match event.payload() {
            EventPayload::UserCreated(user) => {
                self.create_goal_category(DEFAULT_CATEGORY_TITLE, XP_PER_GOAL_MAX, user.id)
                    .await?;
            }
            EventPayload::GoalCategoryCreated(category) => {
                self.seed_example_goal(category).await?;
            }
            _ => error!("GoalService received unexpected {} event", event.event_type()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGoalStore;
    use crate::test_support::Recorder;
    use events::EventType;

    fn service() -> (GoalService, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let service = GoalService::new(Arc::new(MemoryGoalStore::new()), recorder.clone());
        (service, recorder)
    }

    #[tokio::test]
    async fn create_goal_category_publishes_to_its_owner() {
        let (service, recorder) = service();
        let user_id = Id::new_v4();

        let category = service
            .create_goal_category("Fitness", 30, user_id)
            .await
            .unwrap();

        let published = recorder.of_type(EventType::GoalCategoryCreated);
        assert_eq!(published.len(), 1);
        assert!(published[0].is_for(user_id));
        assert_eq!(
            published[0].parse::<goal_categories::Model>().unwrap().id,
            category.id
        );
    }

    #[tokio::test]
    async fn xp_per_goal_must_be_within_bounds() {
        let (service, recorder) = service();
        let user_id = Id::new_v4();

        assert!(service.create_goal_category("x", 0, user_id).await.is_err());
        assert!(service
            .create_goal_category("x", XP_PER_GOAL_MAX + 1, user_id)
            .await
            .is_err());
        assert!(service.create_goal_category("  ", 10, user_id).await.is_err());
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn create_goal_requires_the_users_own_category() {
        let (service, recorder) = service();
        let owner = Id::new_v4();
        let category = service.create_goal_category("Daily", 10, owner).await.unwrap();

        assert!(service
            .create_goal("steal", "", Id::new_v4(), category.id)
            .await
            .is_err());
        let goal = service.create_goal("walk", "", owner, category.id).await.unwrap();
        assert_eq!(goal.status, GoalStatus::NotComplete);
        // Creating a goal commits without publishing.
        assert_eq!(recorder.events().len(), 1);
    }

    #[tokio::test]
    async fn update_goal_status_publishes_old_and_new_goal_with_category_xp() {
        let (service, recorder) = service();
        let user_id = Id::new_v4();
        let category = service.create_goal_category("Daily", 50, user_id).await.unwrap();
        let goal = service.create_goal("walk", "", user_id, category.id).await.unwrap();

        let updated = service
            .update_goal_status(goal.id, user_id, GoalStatus::Complete)
            .await
            .unwrap();

        assert_eq!(updated.status, GoalStatus::Complete);
        let published = recorder.of_type(EventType::GoalUpdated);
        assert_eq!(published.len(), 1);
        let data = published[0].parse::<GoalUpdatedData>().unwrap();
        assert_eq!(data.old_goal.status, GoalStatus::NotComplete);
        assert_eq!(data.new_goal, updated);
        assert_eq!(data.xp_per_goal, 50);
    }

    #[tokio::test]
    async fn other_users_goals_are_not_found() {
        let (service, recorder) = service();
        let owner = Id::new_v4();
        let category = service.create_goal_category("Daily", 50, owner).await.unwrap();
        let goal = service.create_goal("walk", "", owner, category.id).await.unwrap();

        assert!(service
            .update_goal_status(goal.id, Id::new_v4(), GoalStatus::Complete)
            .await
            .is_err());
        assert!(recorder.of_type(EventType::GoalUpdated).is_empty());
    }

    #[tokio::test]
    async fn new_categories_get_an_example_goal() {
        let (service, recorder) = service();
        let user_id = Id::new_v4();
        let category = service.create_goal_category("Daily", 50, user_id).await.unwrap();
        let event = recorder.of_type(EventType::GoalCategoryCreated).remove(0);

        service.handle_event(&event).await.unwrap();

        let seeded = recorder.of_type(EventType::DefaultGoalCreated);
        assert_eq!(seeded.len(), 1);
        let goal = seeded[0].parse::<goals::Model>().unwrap();
        assert_eq!(goal.title, EXAMPLE_GOAL_TITLE);
        assert_eq!(goal.category_id, category.id);
        assert!(seeded[0].is_for(user_id));
    }
}
