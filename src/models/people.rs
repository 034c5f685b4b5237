use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClassSummary, CreateUserRequest, PageQuery, Role, User, parse_id, present};

/// Body of `POST /api/students` and `PUT /api/students/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl StudentRequest {
    /// Name, email and class are required on both create and update.
    pub fn class_id(&self) -> Result<Uuid, String> {
        let class_id = parse_id(self.class_id.as_deref(), "classId")?;
        match (
            present(self.name.as_deref()),
            present(self.email.as_deref()),
            class_id,
        ) {
            (Some(_), Some(_), Some(class_id)) => Ok(class_id),
            _ => Err("name, email and classId are required".to_string()),
        }
    }

    /// The account half of the request, with the role pinned to STUDENT.
    pub fn account(&self) -> CreateUserRequest {
        CreateUserRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            role: Some(Role::Student.as_str().to_string()),
            phone: self.phone.clone(),
            gender: self.gender.clone(),
        }
    }
}

/// Body of `POST /api/teachers` and `PUT /api/teachers/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl TeacherRequest {
    pub fn require_identity(&self) -> Result<(), String> {
        match (present(self.name.as_deref()), present(self.email.as_deref())) {
            (Some(_), Some(_)) => Ok(()),
            _ => Err("name and email are required".to_string()),
        }
    }

    pub fn account(&self) -> CreateUserRequest {
        CreateUserRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            role: Some(Role::Teacher.as_str().to_string()),
            phone: self.phone.clone(),
            gender: self.gender.clone(),
        }
    }
}

/// A row of the student directory.
#[derive(Debug, Clone, Serialize)]
pub struct StudentView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub class: Option<ClassSummary>,
}

impl StudentView {
    pub fn new(user: &User, class: Option<ClassSummary>) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            gender: user.gender.clone().unwrap_or_default(),
            class,
        }
    }
}

/// A row of the teacher directory.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
}

impl From<&User> for TeacherView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            gender: user.gender.clone(),
        }
    }
}

/// `?page=&pageSize=&search=&classId=` on the student directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

impl StudentQuery {
    pub fn paging(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
            search: self.search.clone(),
        }
    }
}

/// Body of `POST /api/parents/{id}/children`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentLinkRequest {
    #[serde(default)]
    pub student_id: Option<String>,
}

impl ParentLinkRequest {
    pub fn student_id(&self) -> Result<Uuid, String> {
        parse_id(self.student_id.as_deref(), "studentId")?
            .ok_or_else(|| "studentId is required".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_request_requires_class() {
        let class = Uuid::new_v4();
        let request = StudentRequest {
            name: Some("Sam".into()),
            email: Some("sam@school.io".into()),
            class_id: Some(class.to_string()),
            ..Default::default()
        };
        assert_eq!(request.class_id(), Ok(class));
        assert_eq!(request.account().role.as_deref(), Some("STUDENT"));

        let missing = StudentRequest {
            class_id: None,
            ..request
        };
        assert_eq!(
            missing.class_id(),
            Err("name, email and classId are required".to_string())
        );
    }

    #[test]
    fn test_student_query_paging() {
        let query: StudentQuery = serde_json::from_value(serde_json::json!({
            "page": 2,
            "pageSize": 5,
            "classId": "abc",
        }))
        .unwrap();
        assert_eq!(query.paging().page(), 2);
        assert_eq!(query.paging().page_size(), 5);
        assert_eq!(query.class_id.as_deref(), Some("abc"));
    }
}
