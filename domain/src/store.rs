//! Persistence seams of the domain services.
//!
//! Every mutating call returns only once the change is committed, so a
//! service may publish the resulting event right after it returns.

use crate::error::Error;
use async_trait::async_trait;
use entity::{goal_categories, goals, levels, status::GoalStatus, users, Id};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, email: &str) -> Result<users::Model, Error>;

    async fn find_user_by_id(&self, user_id: Id) -> Result<users::Model, Error>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>, Error>;

    /// Adds `xp` to a user's total as one atomic read-modify-write. Reaching
    /// the current level's `level_up_xp` wraps the XP modulo that threshold and
    /// moves the user up a level, unless they are already on the last level of
    /// the table, in which case the XP keeps accumulating.
    async fn add_xp(&self, user_id: Id, xp: i32) -> Result<users::Model, Error>;

    async fn find_level_by_id(&self, level_id: i32) -> Result<levels::Model, Error>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn create_category(
        &self,
        user_id: Id,
        title: &str,
        xp_per_goal: i32,
    ) -> Result<goal_categories::Model, Error>;

    async fn find_category_by_id(&self, category_id: Id)
        -> Result<goal_categories::Model, Error>;

    async fn find_categories_by_user(
        &self,
        user_id: Id,
    ) -> Result<Vec<goal_categories::Model>, Error>;

    async fn create_goal(
        &self,
        user_id: Id,
        category_id: Id,
        title: &str,
        description: &str,
    ) -> Result<goals::Model, Error>;

    async fn find_goal_by_id(&self, goal_id: Id) -> Result<goals::Model, Error>;

    async fn update_goal_status(
        &self,
        goal_id: Id,
        status: GoalStatus,
    ) -> Result<goals::Model, Error>;
}
