use async_trait::async_trait;
use uuid::Uuid;

use crate::db::error::DbResult;

/// Which students a parent account is responsible for.
#[async_trait]
pub trait ParentLinkRepo: Send + Sync {
    /// Idempotent; linking twice is not an error.
    async fn link(&self, parent_id: Uuid, student_id: Uuid) -> DbResult<()>;
    async fn unlink(&self, parent_id: Uuid, student_id: Uuid) -> DbResult<()>;
    /// Linked students in the order they were linked.
    async fn children_of(&self, parent_id: Uuid) -> DbResult<Vec<Uuid>>;
    /// Drop every link that mentions `user_id` on either side.
    async fn forget(&self, user_id: Uuid) -> DbResult<()>;
}
