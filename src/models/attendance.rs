use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClassSummary, UserSummary, parse_date, parse_id, present};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::Excused => "EXCUSED",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRESENT" => Ok(AttendanceStatus::Present),
            "ABSENT" => Ok(AttendanceStatus::Absent),
            "LATE" => Ok(AttendanceStatus::Late),
            "EXCUSED" => Ok(AttendanceStatus::Excused),
            other => Err(format!("Unknown attendance status: {}", other)),
        }
    }
}

/// One student's mark for one class on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: Uuid,
    pub status: AttendanceStatus,
}

/// A validated register for one class and day.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSheet {
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub marks: Vec<AttendanceMark>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMarkRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `POST /api/attendance`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheetRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub records: Option<Vec<AttendanceMarkRequest>>,
}

impl AttendanceSheetRequest {
    pub fn validate_input(&self) -> Result<AttendanceSheet, String> {
        let date = present(self.date.as_deref());
        let class_id = parse_id(self.class_id.as_deref(), "classId")?;
        let records = self.records.as_deref().filter(|r| !r.is_empty());
        let (Some(date), Some(class_id), Some(records)) = (date, class_id, records) else {
            return Err("date, classId and records are required".to_string());
        };

        let mut marks: Vec<AttendanceMark> = Vec::with_capacity(records.len());
        for record in records {
            let student_id = parse_id(record.student_id.as_deref(), "studentId")?
                .ok_or_else(|| "Every record needs a studentId".to_string())?;
            let status = present(record.status.as_deref())
                .ok_or_else(|| "Every record needs a status".to_string())?
                .parse::<AttendanceStatus>()?;
            if marks.iter().any(|m| m.student_id == student_id) {
                return Err(format!("Student {} is marked more than once", student_id));
            }
            marks.push(AttendanceMark { student_id, status });
        }

        Ok(AttendanceSheet {
            class_id,
            date: parse_date(date, "date")?,
            marks,
        })
    }
}

/// `?date=&classId=` on `GET /api/attendance`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

impl AttendanceQuery {
    pub fn validate_input(&self) -> Result<(Uuid, NaiveDate), String> {
        let date = present(self.date.as_deref());
        let class_id = parse_id(self.class_id.as_deref(), "classId")?;
        let (Some(date), Some(class_id)) = (date, class_id) else {
            return Err("date and classId are required".to_string());
        };
        Ok((class_id, parse_date(date, "date")?))
    }
}

/// Body of `PUT /api/attendance/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// A single attendance entry with its student and class resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub id: Uuid,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
    pub student: Option<UserSummary>,
    pub class: Option<ClassSummary>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sheet(body: serde_json::Value) -> Result<AttendanceSheet, String> {
        serde_json::from_value::<AttendanceSheetRequest>(body)
            .unwrap()
            .validate_input()
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("present".parse(), Ok(AttendanceStatus::Present));
        assert_eq!(" Late ".parse(), Ok(AttendanceStatus::Late));
        assert!("sick".parse::<AttendanceStatus>().is_err());
        assert_eq!(
            serde_json::to_value(AttendanceStatus::Excused).unwrap(),
            json!("EXCUSED")
        );
    }

    #[test]
    fn test_sheet_validation() {
        let class = Uuid::new_v4();
        let student = Uuid::new_v4();
        let valid = sheet(json!({
            "date": "2025-03-14",
            "classId": class,
            "records": [{"studentId": student, "status": "present"}],
        }))
        .unwrap();
        assert_eq!(valid.marks[0].status, AttendanceStatus::Present);

        let err = sheet(json!({"date": "2025-03-14", "classId": class, "records": []})).unwrap_err();
        assert_eq!(err, "date, classId and records are required");

        let err = sheet(json!({
            "date": "2025-03-14",
            "classId": class,
            "records": [
                {"studentId": student, "status": "present"},
                {"studentId": student, "status": "absent"},
            ],
        }))
        .unwrap_err();
        assert!(err.contains("more than once"));
    }
}
