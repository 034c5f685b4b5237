use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{User, parse_date, parse_id, present};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Overdue => "OVERDUE",
        })
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "OVERDUE" => Ok(PaymentStatus::Overdue),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

/// A fee owed for a student, optionally billed to a parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub amount: f64,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePaymentRecord {
    pub student_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub amount: f64,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub receipt_url: Option<String>,
}

/// `receipt_url: Some(None)` clears the receipt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentPatch {
    pub status: Option<PaymentStatus>,
    pub receipt_url: Option<Option<String>>,
}

impl PaymentPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.receipt_url.is_none()
    }
}

/// Body of `POST /api/payments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

impl PaymentRequest {
    pub fn validate_input(&self) -> Result<CreatePaymentRecord, String> {
        let student_id = parse_id(self.student_id.as_deref(), "studentId")?;
        let amount = self.amount.filter(|a| *a != 0.0);
        let (Some(student_id), Some(amount)) = (student_id, amount) else {
            return Err("studentId and amount are required".to_string());
        };
        if !amount.is_finite() || amount < 0.0 {
            return Err("amount must be a positive number".to_string());
        }
        Ok(CreatePaymentRecord {
            student_id,
            parent_id: parse_id(self.parent_id.as_deref(), "parentId")?,
            amount,
            description: present(self.description.as_deref())
                .unwrap_or_default()
                .to_string(),
            due_date: present(self.due_date.as_deref())
                .map(|raw| parse_date(raw, "dueDate"))
                .transpose()?,
            status: present(self.status.as_deref())
                .map(str::parse::<PaymentStatus>)
                .transpose()?
                .unwrap_or_default(),
            receipt_url: present(self.receipt_url.as_deref()).map(str::to_string),
        })
    }
}

/// Body of `PATCH /api/payments/{id}`. `receiptUrl: null` clears the
/// receipt; an absent key leaves it alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub receipt_url: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl PaymentUpdateRequest {
    pub fn validate_input(&self) -> Result<PaymentPatch, String> {
        let patch = PaymentPatch {
            status: present(self.status.as_deref())
                .map(str::parse::<PaymentStatus>)
                .transpose()?,
            receipt_url: self
                .receipt_url
                .as_ref()
                .map(|url| present(url.as_deref()).map(str::to_string)),
        };
        if patch.is_empty() {
            return Err("No fields provided to update".to_string());
        }
        Ok(patch)
    }
}

/// `?parentId=&studentId=` on `GET /api/payments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub parent_id: Option<Uuid>,
    pub student_id: Option<Uuid>,
}

impl PaymentQuery {
    pub fn validate_input(&self) -> Result<PaymentFilter, String> {
        Ok(PaymentFilter {
            parent_id: parse_id(self.parent_id.as_deref(), "parentId")?,
            student_id: parse_id(self.student_id.as_deref(), "studentId")?,
        })
    }
}

/// `{id, name}` of the student or parent on a payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayerRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for PayerRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub student: Option<PayerRef>,
    pub parent: Option<PayerRef>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_payment_request_defaults() {
        let student = Uuid::new_v4();
        let record = serde_json::from_value::<PaymentRequest>(json!({
            "studentId": student,
            "amount": 120.5,
            "dueDate": "2025-09-01",
        }))
        .unwrap()
        .validate_input()
        .unwrap();
        assert_eq!(record.status, PaymentStatus::Pending);
        assert_eq!(record.description, "");
        assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2025, 9, 1));

        let err = PaymentRequest {
            student_id: Some(student.to_string()),
            amount: Some(0.0),
            ..Default::default()
        }
        .validate_input()
        .unwrap_err();
        assert_eq!(err, "studentId and amount are required");

        let err = PaymentRequest {
            student_id: Some(student.to_string()),
            amount: Some(-5.0),
            ..Default::default()
        }
        .validate_input()
        .unwrap_err();
        assert!(err.contains("positive"));
    }

    #[test]
    fn test_update_request_tracks_explicit_null() {
        let patch = serde_json::from_value::<PaymentUpdateRequest>(json!({"receiptUrl": null}))
            .unwrap()
            .validate_input()
            .unwrap();
        assert_eq!(patch.receipt_url, Some(None));

        let err = serde_json::from_value::<PaymentUpdateRequest>(json!({}))
            .unwrap()
            .validate_input()
            .unwrap_err();
        assert_eq!(err, "No fields provided to update");

        let patch = serde_json::from_value::<PaymentUpdateRequest>(json!({"status": "paid"}))
            .unwrap()
            .validate_input()
            .unwrap();
        assert_eq!(patch.status, Some(PaymentStatus::Paid));
    }

    #[test]
    fn test_view_flattens_payment() {
        let payment = Payment {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            parent_id: None,
            amount: 10.0,
            description: "Books".into(),
            due_date: None,
            status: PaymentStatus::Overdue,
            receipt_url: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(PaymentView {
            payment,
            student: None,
            parent: None,
        })
        .unwrap();
        assert_eq!(json["status"], "OVERDUE");
        assert_eq!(json["description"], "Books");
        assert!(json["student"].is_null());
    }
}
