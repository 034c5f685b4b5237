use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::SubjectRepo,
    },
    models::{CreateSubjectRecord, Subject, SubjectPatch},
};

#[derive(Default)]
pub struct MemorySubjectRepo {
    subjects: DashMap<Uuid, Subject>,
}

impl MemorySubjectRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubjectRepo for MemorySubjectRepo {
    async fn create(&self, input: CreateSubjectRecord) -> DbResult<Subject> {
        let subject = Subject {
            id: Uuid::new_v4(),
            name: input.name,
            code: input.code,
            class_id: input.class_id,
            created_at: Utc::now(),
        };
        self.subjects.insert(subject.id, subject.clone());
        Ok(subject)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Subject>> {
        Ok(self.subjects.get(&id).map(|e| e.value().clone()))
    }

    async fn list(&self, class_id: Option<Uuid>) -> DbResult<Vec<Subject>> {
        let mut subjects: Vec<Subject> = self
            .subjects
            .iter()
            .filter(|e| class_id.is_none_or(|c| e.value().class_id == c))
            .map(|e| e.value().clone())
            .collect();
        subjects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(subjects)
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.subjects.len() as i64)
    }

    async fn update(&self, id: Uuid, patch: SubjectPatch) -> DbResult<Subject> {
        let mut entry = self.subjects.get_mut(&id).ok_or(DbError::NotFound)?;
        let subject = entry.value_mut();
        if let Some(name) = patch.name {
            subject.name = name;
        }
        if let Some(code) = patch.code {
            subject.code = code;
        }
        if let Some(class_id) = patch.class_id {
            subject.class_id = class_id;
        }
        Ok(subject.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.subjects.remove(&id).ok_or(DbError::NotFound)?;
        Ok(())
    }

    async fn delete_by_class(&self, class_id: Uuid) -> DbResult<u64> {
        let before = self.subjects.len();
        self.subjects.retain(|_, s| s.class_id != class_id);
        Ok((before - self.subjects.len()) as u64)
    }
}
