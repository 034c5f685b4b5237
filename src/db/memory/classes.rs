use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ClassRepo,
    },
    models::{ClassRecord, SchoolClass},
};

/// In-memory classes plus the student -> class enrollment index.
///
/// Deleting a class and rewriting its enrollments happen under `write_lock`
/// so no student is left pointing at a removed class.
#[derive(Default)]
pub struct MemoryClassRepo {
    classes: DashMap<Uuid, SchoolClass>,
    enrollment: DashMap<Uuid, Uuid>,
    write_lock: Mutex<()>,
}

impl MemoryClassRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClassRepo for MemoryClassRepo {
    async fn create(&self, input: ClassRecord) -> DbResult<SchoolClass> {
        let class = SchoolClass {
            id: Uuid::new_v4(),
            name: input.name,
            level: input.level,
            teacher_id: input.teacher_id,
            created_at: Utc::now(),
        };
        self.classes.insert(class.id, class.clone());
        Ok(class)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<SchoolClass>> {
        Ok(self.classes.get(&id).map(|e| e.value().clone()))
    }

    async fn list(&self) -> DbResult<Vec<SchoolClass>> {
        let mut classes: Vec<SchoolClass> = self.classes.iter().map(|e| e.value().clone()).collect();
        classes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(classes)
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.classes.len() as i64)
    }

    async fn count_by_teacher(&self, teacher_id: Uuid) -> DbResult<i64> {
        Ok(self
            .classes
            .iter()
            .filter(|e| e.value().teacher_id == teacher_id)
            .count() as i64)
    }

    async fn update(&self, id: Uuid, input: ClassRecord) -> DbResult<SchoolClass> {
        let mut entry = self.classes.get_mut(&id).ok_or(DbError::NotFound)?;
        let class = entry.value_mut();
        class.name = input.name;
        class.level = input.level;
        class.teacher_id = input.teacher_id;
        Ok(class.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let _guard = self.write_lock.lock();
        self.classes.remove(&id).ok_or(DbError::NotFound)?;
        self.enrollment.retain(|_, class_id| *class_id != id);
        Ok(())
    }

    async fn enroll(&self, student_id: Uuid, class_id: Uuid) -> DbResult<()> {
        let _guard = self.write_lock.lock();
        if !self.classes.contains_key(&class_id) {
            return Err(DbError::NotFound);
        }
        self.enrollment.insert(student_id, class_id);
        Ok(())
    }

    async fn unenroll(&self, student_id: Uuid) -> DbResult<()> {
        self.enrollment.remove(&student_id);
        Ok(())
    }

    async fn class_of(&self, student_id: Uuid) -> DbResult<Option<Uuid>> {
        Ok(self.enrollment.get(&student_id).map(|e| *e.value()))
    }

    async fn students_in(&self, class_id: Uuid) -> DbResult<Vec<Uuid>> {
        Ok(self
            .enrollment
            .iter()
            .filter(|e| *e.value() == class_id)
            .map(|e| *e.key())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, teacher_id: Uuid) -> ClassRecord {
        ClassRecord {
            name: name.to_string(),
            level: Some("JSS1".to_string()),
            teacher_id,
        }
    }

    #[tokio::test]
    async fn test_enrollment_replaces_previous_class() {
        let repo = MemoryClassRepo::new();
        let teacher = Uuid::new_v4();
        let a = repo.create(record("A", teacher)).await.unwrap();
        let b = repo.create(record("B", teacher)).await.unwrap();
        let student = Uuid::new_v4();

        repo.enroll(student, a.id).await.unwrap();
        repo.enroll(student, b.id).await.unwrap();
        assert_eq!(repo.class_of(student).await.unwrap(), Some(b.id));
        assert!(repo.students_in(a.id).await.unwrap().is_empty());
        assert_eq!(repo.students_in(b.id).await.unwrap(), vec![student]);
        assert_eq!(repo.count_by_teacher(teacher).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_enroll_in_missing_class_fails() {
        let repo = MemoryClassRepo::new();
        let err = repo.enroll(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_drops_enrollments() {
        let repo = MemoryClassRepo::new();
        let class = repo.create(record("A", Uuid::new_v4())).await.unwrap();
        let student = Uuid::new_v4();
        repo.enroll(student, class.id).await.unwrap();

        repo.delete(class.id).await.unwrap();
        assert_eq!(repo.class_of(student).await.unwrap(), None);
        assert!(matches!(repo.delete(class.id).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let repo = MemoryClassRepo::new();
        let class = repo.create(record("A", Uuid::new_v4())).await.unwrap();
        let teacher = Uuid::new_v4();
        let updated = repo
            .update(
                class.id,
                ClassRecord {
                    name: "A2".into(),
                    level: None,
                    teacher_id: teacher,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "A2");
        assert_eq!(updated.level, None);
        assert_eq!(updated.teacher_id, teacher);
        assert_eq!(updated.created_at, class.created_at);
    }
}
