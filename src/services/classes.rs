use uuid::Uuid;

use super::{
    ServiceError, ServiceResult,
    lookup::{class_index, user_index},
};
use crate::{
    db::Repos,
    models::{
        ClassRecord, ClassView, CreateSubjectRecord, Role, SchoolClass, SubjectPatch, SubjectView,
        UserSummary,
    },
};

/// Classes, their subjects and who teaches them.
#[derive(Clone)]
pub struct ClassService {
    db: Repos,
}

impl ClassService {
    pub fn new(db: Repos) -> Self {
        Self { db }
    }

    async fn view(&self, class: &SchoolClass) -> ServiceResult<ClassView> {
        let teacher = self.db.users.get_by_id(class.teacher_id).await?;
        let student_count = self.db.classes.students_in(class.id).await?.len();
        Ok(ClassView {
            id: class.id,
            name: class.name.clone(),
            level: class.level.clone(),
            teacher: teacher.as_ref().map(UserSummary::from),
            student_count,
        })
    }

    /// The teacher on a class record must be an existing TEACHER account.
    async fn check_teacher(&self, teacher_id: Uuid) -> ServiceResult<()> {
        match self.db.users.get_by_id(teacher_id).await? {
            Some(user) if user.role == Role::Teacher => Ok(()),
            _ => Err(ServiceError::Validation(
                "teacherId must reference a teacher".to_string(),
            )),
        }
    }

    pub async fn get_class(&self, id: Uuid) -> ServiceResult<SchoolClass> {
        self.db
            .classes
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Class not found"))
    }

    /// All classes, newest first.
    pub async fn list(&self) -> ServiceResult<Vec<ClassView>> {
        let classes = self.db.classes.list().await?;
        let users = user_index(self.db.users.as_ref()).await?;
        let mut views = Vec::with_capacity(classes.len());
        for class in &classes {
            views.push(ClassView {
                id: class.id,
                name: class.name.clone(),
                level: class.level.clone(),
                teacher: users.get(&class.teacher_id).map(UserSummary::from),
                student_count: self.db.classes.students_in(class.id).await?.len(),
            });
        }
        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<ClassView> {
        let class = self.get_class(id).await?;
        self.view(&class).await
    }

    pub async fn create(&self, input: ClassRecord) -> ServiceResult<ClassView> {
        self.check_teacher(input.teacher_id).await?;
        let class = self.db.classes.create(input).await?;
        tracing::info!(class_id = %class.id, teacher_id = %class.teacher_id, "Class created");
        self.view(&class).await
    }

    pub async fn update(&self, id: Uuid, input: ClassRecord) -> ServiceResult<ClassView> {
        self.check_teacher(input.teacher_id).await?;
        let class = self
            .db
            .classes
            .update(id, input)
            .await
            .map_err(ServiceError::missing("Class not found"))?;
        self.view(&class).await
    }

    /// Remove the class along with its subjects, attendance and enrollments.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.get_class(id).await?;
        let subjects = self.db.subjects.delete_by_class(id).await?;
        let attendance = self.db.attendance.delete_by_class(id).await?;
        self.db
            .classes
            .delete(id)
            .await
            .map_err(ServiceError::missing("Class not found"))?;
        tracing::info!(class_id = %id, subjects, attendance, "Class deleted");
        Ok(())
    }

    // ========================================================================
    // Subjects
    // ========================================================================

    async fn require_class(&self, class_id: Uuid) -> ServiceResult<SchoolClass> {
        self.db.classes.get_by_id(class_id).await?.ok_or_else(|| {
            ServiceError::Validation("classId must reference an existing class".to_string())
        })
    }

    pub async fn list_subjects(&self, class_id: Option<Uuid>) -> ServiceResult<Vec<SubjectView>> {
        let subjects = self.db.subjects.list(class_id).await?;
        let classes = class_index(self.db.classes.as_ref()).await?;
        Ok(subjects
            .into_iter()
            .map(|s| {
                let class = classes.get(&s.class_id);
                SubjectView::new(s, class)
            })
            .collect())
    }

    pub async fn get_subject(&self, id: Uuid) -> ServiceResult<SubjectView> {
        let subject = self
            .db
            .subjects
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Subject not found"))?;
        let class = self.db.classes.get_by_id(subject.class_id).await?;
        Ok(SubjectView::new(subject, class.as_ref()))
    }

    pub async fn create_subject(&self, input: CreateSubjectRecord) -> ServiceResult<SubjectView> {
        let class = self.require_class(input.class_id).await?;
        let subject = self.db.subjects.create(input).await?;
        Ok(SubjectView::new(subject, Some(&class)))
    }

    pub async fn update_subject(&self, id: Uuid, patch: SubjectPatch) -> ServiceResult<SubjectView> {
        if let Some(class_id) = patch.class_id {
            self.require_class(class_id).await?;
        }
        let subject = self
            .db
            .subjects
            .update(id, patch)
            .await
            .map_err(ServiceError::missing("Subject not found"))?;
        let class = self.db.classes.get_by_id(subject.class_id).await?;
        Ok(SubjectView::new(subject, class.as_ref()))
    }

    pub async fn delete_subject(&self, id: Uuid) -> ServiceResult<()> {
        self.db
            .subjects
            .delete(id)
            .await
            .map_err(ServiceError::missing("Subject not found"))
    }
}
