use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{UserSummary, parse_id, present};

/// A class group taught by one teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: Uuid,
    pub name: String,
    pub level: Option<String>,
    pub teacher_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Full replacement of a class's editable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub name: String,
    pub level: Option<String>,
    pub teacher_id: Uuid,
}

/// Body of `POST /api/classes` and `PUT /api/classes/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}

impl ClassRequest {
    pub fn validate_input(&self) -> Result<ClassRecord, String> {
        let name = present(self.name.as_deref());
        let teacher_id = parse_id(self.teacher_id.as_deref(), "teacherId")?;
        let (Some(name), Some(teacher_id)) = (name, teacher_id) else {
            return Err("name and teacherId are required".to_string());
        };
        Ok(ClassRecord {
            name: name.to_string(),
            level: present(self.level.as_deref()).map(str::to_string),
            teacher_id,
        })
    }
}

/// A class as returned by the API, with its teacher resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassView {
    pub id: Uuid,
    pub name: String,
    pub level: Option<String>,
    pub teacher: Option<UserSummary>,
    pub student_count: usize,
}

/// `{id, name, level}` embedded in subject and child payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: Uuid,
    pub name: String,
    pub level: Option<String>,
}

impl From<&SchoolClass> for ClassSummary {
    fn from(class: &SchoolClass) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            level: class.level.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub class_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSubjectRecord {
    pub name: String,
    pub code: Option<String>,
    pub class_id: Uuid,
}

/// `None` leaves a field untouched; `code: Some(None)` clears the code.
#[derive(Debug, Clone, Default)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub code: Option<Option<String>>,
    pub class_id: Option<Uuid>,
}

/// Body of the subject endpoints. Create needs `name` and `classId`; update
/// applies whichever fields are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

impl SubjectRequest {
    pub fn validate_create(&self) -> Result<CreateSubjectRecord, String> {
        let name = present(self.name.as_deref());
        let class_id = parse_id(self.class_id.as_deref(), "classId")?;
        let (Some(name), Some(class_id)) = (name, class_id) else {
            return Err("name and classId are required".to_string());
        };
        Ok(CreateSubjectRecord {
            name: name.to_string(),
            code: present(self.code.as_deref()).map(str::to_string),
            class_id,
        })
    }

    pub fn validate_patch(&self) -> Result<SubjectPatch, String> {
        let name = match self.name.as_deref() {
            None => None,
            Some(raw) => Some(
                present(Some(raw))
                    .ok_or_else(|| "Subject name cannot be empty".to_string())?
                    .to_string(),
            ),
        };
        Ok(SubjectPatch {
            name,
            code: self
                .code
                .as_deref()
                .map(|raw| present(Some(raw)).map(str::to_string)),
            class_id: parse_id(self.class_id.as_deref(), "classId")?,
        })
    }
}

/// `?classId=` on `GET /api/subjects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectQuery {
    #[serde(default)]
    pub class_id: Option<String>,
}

impl SubjectQuery {
    pub fn class_id(&self) -> Result<Option<Uuid>, String> {
        parse_id(self.class_id.as_deref(), "classId")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub class: Option<ClassSummary>,
    pub created_at: DateTime<Utc>,
}

impl SubjectView {
    pub fn new(subject: Subject, class: Option<&SchoolClass>) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            code: subject.code,
            class: class.map(ClassSummary::from),
            created_at: subject.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_request_requires_name_and_teacher() {
        let teacher = Uuid::new_v4();
        let record = ClassRequest {
            name: Some(" JSS 1A ".into()),
            level: Some("".into()),
            teacher_id: Some(teacher.to_string()),
        }
        .validate_input()
        .unwrap();
        assert_eq!(record.name, "JSS 1A");
        assert_eq!(record.level, None);
        assert_eq!(record.teacher_id, teacher);

        let err = ClassRequest {
            name: Some("JSS 1A".into()),
            ..Default::default()
        }
        .validate_input()
        .unwrap_err();
        assert_eq!(err, "name and teacherId are required");
    }

    #[test]
    fn test_subject_patch_distinguishes_absent_and_cleared_code() {
        let patch = SubjectRequest {
            code: Some(" ".into()),
            ..Default::default()
        }
        .validate_patch()
        .unwrap();
        assert_eq!(patch.code, Some(None));
        assert!(patch.name.is_none());

        let patch = SubjectRequest::default().validate_patch().unwrap();
        assert!(patch.code.is_none());

        assert!(
            SubjectRequest {
                name: Some("".into()),
                ..Default::default()
            }
            .validate_patch()
            .is_err()
        );
    }
}
