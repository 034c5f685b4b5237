use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{Attendance, AttendanceSheet, AttendanceStatus},
};

#[async_trait]
pub trait AttendanceRepo: Send + Sync {
    /// Store a whole register. Fails with `Conflict` if the class already
    /// has any attendance on that day; nothing is written in that case.
    async fn record_sheet(&self, sheet: AttendanceSheet) -> DbResult<Vec<Attendance>>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Attendance>>;
    async fn list_for_class_day(
        &self,
        class_id: Uuid,
        date: chrono::NaiveDate,
    ) -> DbResult<Vec<Attendance>>;
    /// Most recent first, at most `limit` entries across all given students.
    async fn recent_for_students(
        &self,
        student_ids: &[Uuid],
        limit: usize,
    ) -> DbResult<Vec<Attendance>>;
    async fn update_status(&self, id: Uuid, status: AttendanceStatus) -> DbResult<Attendance>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn delete_by_class(&self, class_id: Uuid) -> DbResult<u64>;
    async fn delete_by_student(&self, student_id: Uuid) -> DbResult<u64>;
}
