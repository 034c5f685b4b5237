use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::AttendanceRepo,
    },
    models::{Attendance, AttendanceSheet, AttendanceStatus},
};

/// In-memory attendance register.
///
/// `record_sheet` checks for an existing register and inserts the new one
/// under `write_lock`, so two teachers submitting the same class and day
/// cannot both succeed.
#[derive(Default)]
pub struct MemoryAttendanceRepo {
    records: DashMap<Uuid, Attendance>,
    write_lock: Mutex<()>,
}

impl MemoryAttendanceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect(&self, keep: impl Fn(&Attendance) -> bool) -> Vec<Attendance> {
        self.records
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait]
impl AttendanceRepo for MemoryAttendanceRepo {
    async fn record_sheet(&self, sheet: AttendanceSheet) -> DbResult<Vec<Attendance>> {
        let _guard = self.write_lock.lock();
        let taken = self
            .records
            .iter()
            .any(|e| e.value().class_id == sheet.class_id && e.value().date == sheet.date);
        if taken {
            return Err(DbError::Conflict(
                "Attendance already recorded for this class on this date".to_string(),
            ));
        }

        let now = Utc::now();
        let created: Vec<Attendance> = sheet
            .marks
            .iter()
            .map(|mark| Attendance {
                id: Uuid::new_v4(),
                class_id: sheet.class_id,
                student_id: mark.student_id,
                status: mark.status,
                date: sheet.date,
                created_at: now,
            })
            .collect();
        for record in &created {
            self.records.insert(record.id, record.clone());
        }
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Attendance>> {
        Ok(self.records.get(&id).map(|e| e.value().clone()))
    }

    async fn list_for_class_day(&self, class_id: Uuid, date: NaiveDate) -> DbResult<Vec<Attendance>> {
        let mut records = self.collect(|a| a.class_id == class_id && a.date == date);
        records.sort_by_key(|a| (a.created_at, a.student_id));
        Ok(records)
    }

    async fn recent_for_students(
        &self,
        student_ids: &[Uuid],
        limit: usize,
    ) -> DbResult<Vec<Attendance>> {
        let mut records = self.collect(|a| student_ids.contains(&a.student_id));
        records.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        records.truncate(limit);
        Ok(records)
    }

    async fn update_status(&self, id: Uuid, status: AttendanceStatus) -> DbResult<Attendance> {
        let mut entry = self.records.get_mut(&id).ok_or(DbError::NotFound)?;
        entry.value_mut().status = status;
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.records.remove(&id).ok_or(DbError::NotFound)?;
        Ok(())
    }

    async fn delete_by_class(&self, class_id: Uuid) -> DbResult<u64> {
        let before = self.records.len();
        self.records.retain(|_, a| a.class_id != class_id);
        Ok((before - self.records.len()) as u64)
    }

    async fn delete_by_student(&self, student_id: Uuid) -> DbResult<u64> {
        let before = self.records.len();
        self.records.retain(|_, a| a.student_id != student_id);
        Ok((before - self.records.len()) as u64)
    }
}
