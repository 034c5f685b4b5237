use uuid::Uuid;

use super::{
    ServiceError, ServiceResult, UserService,
    lookup::{class_index, user_with_role},
};
use crate::{
    db::Repos,
    models::{
        ClassSummary, Page, PageQuery, Role, StudentQuery, StudentRequest, StudentView,
        TeacherRequest, TeacherView, UpdateUserRequest, User, matches_term,
    },
};

/// Student and teacher directories, plus parent-to-child links.
///
/// Accounts are created through [`UserService`] so passwords are hashed and
/// emails stay unique across every role.
#[derive(Clone)]
pub struct PeopleService {
    db: Repos,
    users: UserService,
}

fn matches(user: &User, term: Option<&str>) -> bool {
    term.is_none_or(|t| matches_term(t, [Some(user.name.as_str()), Some(user.email.as_str())]))
}

fn account_update(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    gender: Option<String>,
    password: Option<String>,
) -> UpdateUserRequest {
    UpdateUserRequest {
        name,
        email,
        phone,
        gender,
        password,
        ..Default::default()
    }
}

impl PeopleService {
    pub fn new(db: Repos, users: UserService) -> Self {
        Self { db, users }
    }

    async fn of_role(&self, role: Role, term: Option<&str>) -> ServiceResult<Vec<User>> {
        Ok(self
            .db
            .users
            .list()
            .await?
            .into_iter()
            .filter(|u| u.role == role && matches(u, term))
            .collect())
    }

    async fn class_summary(&self, student_id: Uuid) -> ServiceResult<Option<ClassSummary>> {
        let Some(class_id) = self.db.classes.class_of(student_id).await? else {
            return Ok(None);
        };
        Ok(self
            .db
            .classes
            .get_by_id(class_id)
            .await?
            .as_ref()
            .map(ClassSummary::from))
    }

    async fn require_class(&self, class_id: Uuid) -> ServiceResult<()> {
        match self.db.classes.get_by_id(class_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::Validation(
                "classId must reference an existing class".to_string(),
            )),
        }
    }

    // ========================================================================
    // Students
    // ========================================================================

    /// Students newest first, filtered by search term and class.
    pub async fn list_students(&self, query: &StudentQuery) -> ServiceResult<Page<StudentView>> {
        let paging = query.paging();
        let class_filter = crate::models::parse_id(query.class_id.as_deref(), "classId")
            .map_err(ServiceError::Validation)?;
        let term = paging.term();
        let classes = class_index(self.db.classes.as_ref()).await?;

        let mut rows = Vec::new();
        for user in self.of_role(Role::Student, term.as_deref()).await? {
            let class_id = self.db.classes.class_of(user.id).await?;
            if class_filter.is_some_and(|wanted| class_id != Some(wanted)) {
                continue;
            }
            let class = class_id
                .and_then(|id| classes.get(&id))
                .map(ClassSummary::from);
            rows.push(StudentView::new(&user, class));
        }
        Ok(Page::slice(rows, &paging))
    }

    pub async fn get_student(&self, id: Uuid) -> ServiceResult<StudentView> {
        let user = user_with_role(self.db.users.as_ref(), id, Role::Student, "Student not found").await?;
        let class = self.class_summary(id).await?;
        Ok(StudentView::new(&user, class))
    }

    /// Create a STUDENT account and enroll it in its class.
    pub async fn create_student(&self, input: StudentRequest) -> ServiceResult<StudentView> {
        let class_id = input.class_id().map_err(ServiceError::Validation)?;
        self.require_class(class_id).await?;
        let validated = input
            .account()
            .validate_input(self.users.password_min_length())
            .map_err(ServiceError::Validation)?;
        let user = self.users.create(validated).await?;
        self.db.classes.enroll(user.id, class_id).await?;
        self.get_student(user.id).await
    }

    /// Update the account fields and move the student to the given class.
    pub async fn update_student(&self, id: Uuid, input: StudentRequest) -> ServiceResult<StudentView> {
        let class_id = input.class_id().map_err(ServiceError::Validation)?;
        user_with_role(self.db.users.as_ref(), id, Role::Student, "Student not found").await?;
        self.require_class(class_id).await?;
        let update = account_update(input.name, input.email, input.phone, input.gender, input.password);
        self.users.update(id, update, Role::Admin).await?;
        self.db.classes.enroll(id, class_id).await?;
        self.get_student(id).await
    }

    /// Delete the account with its enrollment, attendance and parent links.
    pub async fn delete_student(&self, id: Uuid) -> ServiceResult<()> {
        user_with_role(self.db.users.as_ref(), id, Role::Student, "Student not found").await?;
        self.users.delete(id).await?;
        self.db.classes.unenroll(id).await?;
        self.db.parent_links.forget(id).await?;
        let attendance = self.db.attendance.delete_by_student(id).await?;
        tracing::info!(student_id = %id, attendance, "Student removed");
        Ok(())
    }

    // ========================================================================
    // Teachers
    // ========================================================================

    pub async fn list_teachers(&self, query: &PageQuery) -> ServiceResult<Page<TeacherView>> {
        let term = query.term();
        let teachers = self.of_role(Role::Teacher, term.as_deref()).await?;
        Ok(Page::slice(teachers, query).map(|u| TeacherView::from(&u)))
    }

    pub async fn get_teacher(&self, id: Uuid) -> ServiceResult<TeacherView> {
        let user = user_with_role(self.db.users.as_ref(), id, Role::Teacher, "Teacher not found").await?;
        Ok(TeacherView::from(&user))
    }

    pub async fn create_teacher(&self, input: TeacherRequest) -> ServiceResult<TeacherView> {
        input.require_identity().map_err(ServiceError::Validation)?;
        let validated = input
            .account()
            .validate_input(self.users.password_min_length())
            .map_err(ServiceError::Validation)?;
        let user = self.users.create(validated).await?;
        Ok(TeacherView::from(&user))
    }

    pub async fn update_teacher(&self, id: Uuid, input: TeacherRequest) -> ServiceResult<TeacherView> {
        input.require_identity().map_err(ServiceError::Validation)?;
        user_with_role(self.db.users.as_ref(), id, Role::Teacher, "Teacher not found").await?;
        let update = account_update(input.name, input.email, input.phone, input.gender, input.password);
        self.users.update(id, update, Role::Admin).await?;
        self.get_teacher(id).await
    }

    /// Refused while any class still names this teacher.
    pub async fn delete_teacher(&self, id: Uuid) -> ServiceResult<()> {
        user_with_role(self.db.users.as_ref(), id, Role::Teacher, "Teacher not found").await?;
        let assigned = self.db.classes.count_by_teacher(id).await?;
        if assigned > 0 {
            return Err(ServiceError::Validation(format!(
                "Teacher is still assigned to {} class(es)",
                assigned
            )));
        }
        self.users.delete(id).await?;
        Ok(())
    }

    // ========================================================================
    // Parent links
    // ========================================================================

    /// The parent account, or the errors the overview endpoint reports.
    pub async fn require_parent(&self, id: Uuid) -> ServiceResult<User> {
        let user = self
            .db
            .users
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Parent not found"))?;
        if user.role != Role::Parent {
            return Err(ServiceError::Validation(
                "User is not registered as a parent".to_string(),
            ));
        }
        Ok(user)
    }

    pub async fn children(&self, parent_id: Uuid) -> ServiceResult<Vec<StudentView>> {
        self.require_parent(parent_id).await?;
        let mut children = Vec::new();
        for id in self.db.parent_links.children_of(parent_id).await? {
            match self.get_student(id).await {
                Ok(view) => children.push(view),
                Err(ServiceError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(children)
    }

    pub async fn link_child(&self, parent_id: Uuid, student_id: Uuid) -> ServiceResult<Vec<StudentView>> {
        self.require_parent(parent_id).await?;
        user_with_role(self.db.users.as_ref(), student_id, Role::Student, "Student not found").await?;
        self.db.parent_links.link(parent_id, student_id).await?;
        tracing::info!(parent_id = %parent_id, student_id = %student_id, "Child linked to parent");
        self.children(parent_id).await
    }

    pub async fn unlink_child(&self, parent_id: Uuid, student_id: Uuid) -> ServiceResult<Vec<StudentView>> {
        self.require_parent(parent_id).await?;
        self.db.parent_links.unlink(parent_id, student_id).await?;
        self.children(parent_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        models::ClassRecord,
        services::{AvatarStore, lookup::seed_account},
    };

    fn service(db: &Repos, dir: &tempfile::TempDir) -> PeopleService {
        let avatars = Arc::new(AvatarStore::new(dir.path().join("avatars.json")));
        let users = UserService::new(db.users.clone(), avatars, 8);
        PeopleService::new(db.clone(), users)
    }

    async fn class(db: &Repos, name: &str) -> Uuid {
        let teacher = seed_account(db, &format!("{}@staff.io", name.to_lowercase()), Role::Teacher).await;
        db.classes
            .create(ClassRecord {
                name: name.to_string(),
                level: None,
                teacher_id: teacher.id,
            })
            .await
            .unwrap()
            .id
    }

    fn student(name: &str, class_id: Uuid) -> StudentRequest {
        StudentRequest {
            name: Some(name.to_string()),
            email: Some(format!("{}@school.io", name.to_lowercase())),
            class_id: Some(class_id.to_string()),
            password: Some("long-enough".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_student_directory_filters() {
        let dir = tempfile::tempdir().unwrap();
        let db = Repos::memory();
        let people = service(&db, &dir);
        let a = class(&db, "A").await;
        let b = class(&db, "B").await;
        people.create_student(student("Ada", a)).await.unwrap();
        people.create_student(student("Bea", b)).await.unwrap();
        people.create_student(student("Cal", a)).await.unwrap();

        let all = people.list_students(&StudentQuery::default()).await.unwrap();
        assert_eq!(all.total, 3);

        let in_a = people
            .list_students(&StudentQuery {
                class_id: Some(a.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_a.total, 2);
        assert!(in_a.data.iter().all(|s| s.class.as_ref().is_some_and(|c| c.id == a)));

        let search = people
            .list_students(&StudentQuery {
                search: Some("BEA".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search.data.len(), 1);
        assert_eq!(search.data[0].name, "Bea");
    }

    #[tokio::test]
    async fn test_student_requires_password_and_class() {
        let dir = tempfile::tempdir().unwrap();
        let db = Repos::memory();
        let people = service(&db, &dir);
        let a = class(&db, "A").await;

        let err = people
            .create_student(StudentRequest {
                password: None,
                ..student("Ada", a)
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Name, email and password are required");

        let err = people
            .create_student(student("Ada", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "classId must reference an existing class");
    }

    #[tokio::test]
    async fn test_update_student_moves_class() {
        let dir = tempfile::tempdir().unwrap();
        let db = Repos::memory();
        let people = service(&db, &dir);
        let a = class(&db, "A").await;
        let b = class(&db, "B").await;
        let created = people.create_student(student("Ada", a)).await.unwrap();

        let updated = people
            .update_student(
                created.id,
                StudentRequest {
                    phone: Some("555-0100".into()),
                    password: None,
                    ..student("Ada", b)
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.class.unwrap().id, b);
        assert_eq!(updated.phone, "555-0100");
    }

    #[tokio::test]
    async fn test_teacher_with_classes_cannot_be_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let db = Repos::memory();
        let people = service(&db, &dir);
        class(&db, "A").await;
        let teacher = db.users.get_by_email("a@staff.io").await.unwrap().unwrap();

        let err = people.delete_teacher(teacher.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let student = seed_account(&db, "kid@school.io", Role::Student).await;
        assert!(matches!(
            people.delete_teacher(student.id).await,
            Err(ServiceError::NotFound("Teacher not found"))
        ));
    }

    #[tokio::test]
    async fn test_parent_links() {
        let dir = tempfile::tempdir().unwrap();
        let db = Repos::memory();
        let people = service(&db, &dir);
        let parent = seed_account(&db, "mum@home.io", Role::Parent).await;
        let teacher = seed_account(&db, "t@staff.io", Role::Teacher).await;
        let a = class(&db, "A").await;
        let kid = people.create_student(student("Kid", a)).await.unwrap();

        let children = people.link_child(parent.id, kid.id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].class.as_ref().unwrap().id, a);

        let err = people.link_child(teacher.id, kid.id).await.unwrap_err();
        assert_eq!(err.to_string(), "User is not registered as a parent");

        people.delete_student(kid.id).await.unwrap();
        assert!(people.children(parent.id).await.unwrap().is_empty());
    }
}
