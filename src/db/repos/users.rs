use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateUserRecord, User, UserPatch},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create(&self, input: CreateUserRecord) -> DbResult<User>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>>;
    /// Lookup is case-insensitive on the email.
    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>>;
    /// All users, newest first.
    async fn list(&self) -> DbResult<Vec<User>>;
    async fn count(&self) -> DbResult<i64>;
    async fn update(&self, id: Uuid, patch: UserPatch) -> DbResult<User>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}
