use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateSubjectRecord, Subject, SubjectPatch},
};

#[async_trait]
pub trait SubjectRepo: Send + Sync {
    async fn create(&self, input: CreateSubjectRecord) -> DbResult<Subject>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Subject>>;
    /// Subjects newest first, optionally only those of one class.
    async fn list(&self, class_id: Option<Uuid>) -> DbResult<Vec<Subject>>;
    async fn count(&self) -> DbResult<i64>;
    async fn update(&self, id: Uuid, patch: SubjectPatch) -> DbResult<Subject>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    /// Returns how many subjects were removed.
    async fn delete_by_class(&self, class_id: Uuid) -> DbResult<u64>;
}
