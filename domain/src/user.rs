use crate::error::Error;
use crate::store::UserStore;
use crate::{users, Id};
use async_trait::async_trait;
use entity::status::GoalStatus;
use events::{Event, EventHandler, EventPayload, GoalUpdatedData, Publisher, XpUpdatedData};
use log::*;
use std::sync::Arc;

/// User accounts and their progression.
///
/// Reacts to `goal_updated`: completing a goal awards its category's XP,
/// levelling the user up when the current level's threshold is reached.
pub struct UserService {
    store: Arc<dyn UserStore>,
    publisher: Arc<dyn Publisher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self { store, publisher }
    }

    pub async fn create_user(&self, email: &str) -> Result<users::Model, Error> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            warn!("Rejecting sign up with malformed email {email:?}");
            return Err(Error::invalid());
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            warn!("User with email {email} already exists");
            return Err(Error::invalid());
        }

        let user = self.store.create_user(&email).await?;
        debug!("New User: {user:?}");

        self.publisher
            .publish(Event::for_user(EventPayload::UserCreated(user.clone()), user.id))
            .await;

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: Id) -> Result<users::Model, Error> {
        self.store.find_user_by_id(user_id).await
    }

    /// Applies the XP for a goal that just became complete. Returns the
    /// updated user, or `None` when the update was not a completion.
    pub async fn award_goal_xp(&self, data: &GoalUpdatedData) -> Result<Option<users::Model>, Error> {
        let completed = data.old_goal.status != data.new_goal.status
            && data.new_goal.status == GoalStatus::Complete;
        if !completed {
            return Ok(None);
        }

        let user = self
            .store
            .add_xp(data.new_goal.user_id, data.xp_per_goal)
            .await?;
        debug!(
            "User {} now has {} XP on level {}",
            user.id, user.xp, user.level_id
        );

        self.publisher
            .publish(Event::for_user(
                EventPayload::XpUpdated(XpUpdatedData {
                    level_id: user.level_id,
                    xp: user.xp,
                }),
                user.id,
            ))
            .await;

        Ok(Some(user))
    }
}

#[async_trait]
impl EventHandler for UserService {
    async fn handle_event(&self, event: &Event) -> Result<(), events::Error> {
        let data = event.parse::<GoalUpdatedData>()?;
        self.award_goal_xp(data).await?;
        Ok(())
    }
}
