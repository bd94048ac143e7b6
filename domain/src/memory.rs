//! In-memory stores backed by `DashMap`.

use crate::error::Error;
use crate::store::{GoalStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use entity::{goal_categories, goals, levels, status::GoalStatus, users, Id};
use log::*;

/// Number of levels in the default level table.
pub const DEFAULT_LEVEL_COUNT: i32 = 100;

/// Level table used when none is supplied: the XP needed to level up grows
/// by 50 per level starting at 100, and each level pays out 10 cash per level.
pub fn default_levels() -> Vec<levels::Model> {
    (1..=DEFAULT_LEVEL_COUNT)
        .map(|id| levels::Model {
            id,
            level_up_xp: 100 + (id - 1) * 50,
            cash_reward: id * 10,
        })
        .collect()
}

pub struct MemoryUserStore {
    users: DashMap<Id, users::Model>,
    levels: DashMap<i32, levels::Model>,
}

impl MemoryUserStore {
    pub fn new(levels: Vec<levels::Model>) -> Self {
        Self {
            users: DashMap::new(),
            levels: levels.into_iter().map(|level| (level.id, level)).collect(),
        }
    }
}

impl MemoryUserStore {
    fn find_level(&self, level_id: i32) -> Result<levels::Model, Error> {
        self.levels
            .get(&level_id)
            .map(|level| level.clone())
            .ok_or_else(|| {
                warn!("Level {level_id} is not in the level table");
                Error::not_found()
            })
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new(default_levels())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, email: &str) -> Result<users::Model, Error> {
        let now = Utc::now();
        let user = users::Model {
            id: Id::new_v4(),
            email: email.to_string(),
            xp: 0,
            level_id: 1,
            cash_available: 0,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Id) -> Result<users::Model, Error> {
        self.users
            .get(&user_id)
            .map(|user| user.clone())
            .ok_or_else(|| {
                debug!("User with id {user_id} not found");
                Error::not_found()
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>, Error> {
        Ok(self
            .users
            .iter()
            .find(|user| user.email == email)
            .map(|user| user.clone()))
    }

    async fn add_xp(&self, user_id: Id, xp: i32) -> Result<users::Model, Error> {
        // The entry guard is held across the read and the write so concurrent
        // awards for the same user serialize.
        let mut user = self.users.get_mut(&user_id).ok_or_else(|| {
            debug!("User with id {user_id} not found");
            Error::not_found()
        })?;
        let level_up_xp = self.find_level(user.level_id)?.level_up_xp;

        user.xp += xp;
        if user.xp >= level_up_xp {
            let next_level_id = user.level_id + 1;
            if self.levels.contains_key(&next_level_id) {
                user.xp %= level_up_xp;
                user.level_id = next_level_id;
                info!("User {user_id} reached level {next_level_id}");
            } else {
                debug!("User {user_id} is on the last level, keeping {} XP", user.xp);
            }
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn find_level_by_id(&self, level_id: i32) -> Result<levels::Model, Error> {
        self.find_level(level_id)
    }
}

#[derive(Default)]
pub struct MemoryGoalStore {
    categories: DashMap<Id, goal_categories::Model>,
    goals: DashMap<Id, goals::Model>,
}

impl MemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GoalStore for MemoryGoalStore {
    async fn create_category(
        &self,
        user_id: Id,
        title: &str,
        xp_per_goal: i32,
    ) -> Result<goal_categories::Model, Error> {
        let now = Utc::now();
        let category = goal_categories::Model {
            id: Id::new_v4(),
            user_id,
            title: title.to_string(),
            xp_per_goal,
            goals: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category_by_id(
        &self,
        category_id: Id,
    ) -> Result<goal_categories::Model, Error> {
        let mut category = self
            .categories
            .get(&category_id)
            .map(|category| category.clone())
            .ok_or_else(Error::not_found)?;

        let mut goals: Vec<goals::Model> = self
            .goals
            .iter()
            .filter(|goal| goal.category_id == category_id)
            .map(|goal| goal.clone())
            .collect();
        goals.sort_by_key(|goal| goal.created_at);
        category.goals = goals;

        Ok(category)
    }

    async fn find_categories_by_user(
        &self,
        user_id: Id,
    ) -> Result<Vec<goal_categories::Model>, Error> {
        let ids: Vec<Id> = self
            .categories
            .iter()
            .filter(|category| category.user_id == user_id)
            .map(|category| category.id)
            .collect();

        let mut categories = Vec::with_capacity(ids.len());
        for id in ids {
            categories.push(self.find_category_by_id(id).await?);
        }
        categories.sort_by_key(|category| category.created_at);
        Ok(categories)
    }

    async fn create_goal(
        &self,
        user_id: Id,
        category_id: Id,
        title: &str,
        description: &str,
    ) -> Result<goals::Model, Error> {
        let now = Utc::now();
        let goal = goals::Model {
            id: Id::new_v4(),
            user_id,
            category_id,
            title: title.to_string(),
            description: description.to_string(),
            status: GoalStatus::default(),
            created_at: now,
            updated_at: now,
        };
        self.goals.insert(goal.id, goal.clone());
        Ok(goal)
    }

    async fn find_goal_by_id(&self, goal_id: Id) -> Result<goals::Model, Error> {
        self.goals
            .get(&goal_id)
            .map(|goal| goal.clone())
            .ok_or_else(Error::not_found)
    }

    async fn update_goal_status(
        &self,
        goal_id: Id,
        status: GoalStatus,
    ) -> Result<goals::Model, Error> {
        let mut goal = self.goals.get_mut(&goal_id).ok_or_else(Error::not_found)?;
        goal.status = status;
        goal.updated_at = Utc::now();
        Ok(goal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_levels_grow_with_each_level() {
        let levels = default_levels();
        assert_eq!(levels.len(), DEFAULT_LEVEL_COUNT as usize);
        assert_eq!(levels[0].level_up_xp, 100);
        assert_eq!(levels[1].level_up_xp, 150);
        assert!(levels.windows(2).all(|w| w[0].level_up_xp < w[1].level_up_xp));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let users = MemoryUserStore::default();
        let goals = MemoryGoalStore::new();

        assert!(users.find_user_by_id(Id::new_v4()).await.is_err());
        assert!(users.find_level_by_id(DEFAULT_LEVEL_COUNT + 1).await.is_err());
        assert!(goals.find_goal_by_id(Id::new_v4()).await.is_err());
        assert!(goals.find_category_by_id(Id::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn add_xp_wraps_at_the_level_threshold() {
        let store = MemoryUserStore::default();
        let user = store.create_user("a@b.c").await.unwrap();

        let user_after = store.add_xp(user.id, 130).await.unwrap();

        assert_eq!((user_after.level_id, user_after.xp), (2, 30));
    }

    #[tokio::test]
    async fn the_last_level_keeps_accumulating_xp() {
        let store = MemoryUserStore::new(default_levels().into_iter().take(2).collect());
        let user = store.create_user("a@b.c").await.unwrap();

        store.add_xp(user.id, 100).await.unwrap();
        let capped = store.add_xp(user.id, 200).await.unwrap();
        assert_eq!((capped.level_id, capped.xp), (2, 200));

        // Later awards still find the level they are on.
        let capped = store.add_xp(user.id, 5).await.unwrap();
        assert_eq!((capped.level_id, capped.xp), (2, 205));
    }

    #[tokio::test]
    async fn categories_list_their_goals() {
        let store = MemoryGoalStore::new();
        let user_id = Id::new_v4();
        let category = store.create_category(user_id, "Daily", 100).await.unwrap();
        store
            .create_goal(user_id, category.id, "walk", "around the block")
            .await
            .unwrap();

        let categories = store.find_categories_by_user(user_id).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].goals.len(), 1);
        assert_eq!(categories[0].goals[0].title, "walk");
    }

    #[tokio::test]
    async fn update_goal_status_persists() {
        let store = MemoryGoalStore::new();
        let goal = store
            .create_goal(Id::new_v4(), Id::new_v4(), "read", "")
            .await
            .unwrap();
        assert_eq!(goal.status, GoalStatus::NotComplete);

        store
            .update_goal_status(goal.id, GoalStatus::Complete)
            .await
            .unwrap();
        assert_eq!(
            store.find_goal_by_id(goal.id).await.unwrap().status,
            GoalStatus::Complete
        );
    }
}
