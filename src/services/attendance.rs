use chrono::NaiveDate;
use uuid::Uuid;

use super::{ServiceError, ServiceResult, lookup::user_index};
use crate::{
    db::Repos,
    models::{Attendance, AttendanceSheet, AttendanceStatus, AttendanceView, ClassSummary, UserSummary},
};

/// Daily class registers.
#[derive(Clone)]
pub struct AttendanceService {
    db: Repos,
}

impl AttendanceService {
    pub fn new(db: Repos) -> Self {
        Self { db }
    }

    async fn views(&self, records: Vec<Attendance>) -> ServiceResult<Vec<AttendanceView>> {
        let users = user_index(self.db.users.as_ref()).await?;
        let mut classes = std::collections::HashMap::new();
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            if !classes.contains_key(&record.class_id) {
                let class = self.db.classes.get_by_id(record.class_id).await?;
                classes.insert(record.class_id, class.as_ref().map(ClassSummary::from));
            }
            views.push(AttendanceView {
                id: record.id,
                status: record.status,
                date: record.date,
                student: users.get(&record.student_id).map(UserSummary::from),
                class: classes.get(&record.class_id).cloned().flatten(),
            });
        }
        Ok(views)
    }

    /// Store a class register. Every student must be enrolled in the class
    /// and the class must not already have a register for that day.
    pub async fn record(&self, sheet: AttendanceSheet) -> ServiceResult<Vec<AttendanceView>> {
        if self.db.classes.get_by_id(sheet.class_id).await?.is_none() {
            return Err(ServiceError::NotFound("Class not found"));
        }
        let enrolled = self.db.classes.students_in(sheet.class_id).await?;
        if let Some(stray) = sheet.marks.iter().find(|m| !enrolled.contains(&m.student_id)) {
            return Err(ServiceError::Validation(format!(
                "Student {} is not enrolled in this class",
                stray.student_id
            )));
        }

        let (class_id, date) = (sheet.class_id, sheet.date);
        let created = self.db.attendance.record_sheet(sheet).await?;
        tracing::info!(class_id = %class_id, %date, marks = created.len(), "Attendance recorded");
        self.views(created).await
    }

    pub async fn list(&self, class_id: Uuid, date: NaiveDate) -> ServiceResult<Vec<AttendanceView>> {
        let records = self.db.attendance.list_for_class_day(class_id, date).await?;
        self.views(records).await
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<AttendanceView> {
        let record = self
            .db
            .attendance
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Attendance record not found"))?;
        let mut views = self.views(vec![record]).await?;
        views.pop().ok_or(ServiceError::NotFound("Attendance record not found"))
    }

    pub async fn update(&self, id: Uuid, status: AttendanceStatus) -> ServiceResult<AttendanceView> {
        self.db
            .attendance
            .update_status(id, status)
            .await
            .map_err(ServiceError::missing("Attendance record not found"))?;
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.db
            .attendance
            .delete(id)
            .await
            .map_err(ServiceError::missing("Attendance record not found"))
    }
}
