use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{ClassRecord, SchoolClass},
};

#[async_trait]
pub trait ClassRepo: Send + Sync {
    async fn create(&self, input: ClassRecord) -> DbResult<SchoolClass>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<SchoolClass>>;
    /// All classes, newest first.
    async fn list(&self) -> DbResult<Vec<SchoolClass>>;
    async fn count(&self) -> DbResult<i64>;
    async fn count_by_teacher(&self, teacher_id: Uuid) -> DbResult<i64>;
    async fn update(&self, id: Uuid, input: ClassRecord) -> DbResult<SchoolClass>;
    /// Removes the class and every enrollment in it.
    async fn delete(&self, id: Uuid) -> DbResult<()>;

    // ========================================================================
    // Enrollment: each student belongs to at most one class
    // ========================================================================

    /// Place a student in a class, replacing any previous enrollment.
    async fn enroll(&self, student_id: Uuid, class_id: Uuid) -> DbResult<()>;
    async fn unenroll(&self, student_id: Uuid) -> DbResult<()>;
    async fn class_of(&self, student_id: Uuid) -> DbResult<Option<Uuid>>;
    async fn students_in(&self, class_id: Uuid) -> DbResult<Vec<Uuid>>;
}
