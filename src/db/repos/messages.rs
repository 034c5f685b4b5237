use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{ConversationKey, CreateMessageRecord, Message},
};

#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn create(&self, input: CreateMessageRecord) -> DbResult<Message>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Message>>;
    /// Newest first. `participant` restricts to messages sent or received by
    /// that user; `limit` caps the result.
    async fn list(&self, participant: Option<Uuid>, limit: Option<usize>) -> DbResult<Vec<Message>>;
    /// Both directions between the two users, oldest first.
    async fn conversation(&self, key: ConversationKey) -> DbResult<Vec<Message>>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}
