use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ClassSummary, MessageView, PaymentView, Role};

/// Characters of a message shown in the admin dashboard preview.
pub const MESSAGE_PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Serialize)]
pub struct OverviewStat {
    pub title: &'static str,
    pub value: usize,
    pub key: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestStudent {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Class name, or "Unassigned".
    pub class: String,
    pub registered: DateTime<Utc>,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePreview {
    pub id: Uuid,
    /// Sender name, or "Unknown" when the sender no longer exists.
    pub sender: String,
    pub preview: String,
    pub time: DateTime<Utc>,
}

/// Payload of `GET /api/admin/overview`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub stats: Vec<OverviewStat>,
    pub latest_students: Vec<LatestStudent>,
    pub latest_messages: Vec<MessagePreview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParentIdentity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceTally {
    pub present: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildOverview {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub class: Option<ClassSummary>,
    pub attendance: AttendanceTally,
}

/// Payload of `GET /api/parents/{id}/overview`.
#[derive(Debug, Clone, Serialize)]
pub struct ParentOverview {
    pub parent: ParentIdentity,
    pub children: Vec<ChildOverview>,
    pub payments: Vec<PaymentView>,
    pub messages: Vec<MessageView>,
}

/// First `MESSAGE_PREVIEW_CHARS` characters of `content`.
pub fn preview(content: &str) -> String {
    content.chars().take(MESSAGE_PREVIEW_CHARS).collect()
}
