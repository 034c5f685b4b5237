use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Participant, parse_id, present};

/// Longest message body accepted.
pub const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateMessageRecord {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
}

/// Body of `POST /api/messages`. The sender is the verified caller; a
/// `senderId` in the body must match it unless the caller is an admin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl MessageRequest {
    /// `caller` fills in a missing `senderId`.
    pub fn validate_input(&self, caller: Uuid) -> Result<CreateMessageRecord, String> {
        let sender_id = parse_id(self.sender_id.as_deref(), "senderId")?.unwrap_or(caller);
        let receiver_id = parse_id(self.receiver_id.as_deref(), "receiverId")?;
        let content = present(self.content.as_deref());
        let (Some(receiver_id), Some(content)) = (receiver_id, content) else {
            return Err("receiverId and content are required".to_string());
        };
        if content.chars().count() > MAX_MESSAGE_LEN {
            return Err(format!(
                "Message content is limited to {} characters",
                MAX_MESSAGE_LEN
            ));
        }
        Ok(CreateMessageRecord {
            sender_id,
            receiver_id,
            content: content.to_string(),
        })
    }
}

/// The two parties of a conversation, from the `{a}_{b}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationKey {
    pub a: Uuid,
    pub b: Uuid,
}

impl ConversationKey {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let invalid = || "Conversation id must be two user ids joined by '_'".to_string();
        let (a, b) = raw.split_once('_').ok_or_else(invalid)?;
        Ok(Self {
            a: Uuid::parse_str(a.trim()).map_err(|_| invalid())?,
            b: Uuid::parse_str(b.trim()).map_err(|_| invalid())?,
        })
    }

    pub fn includes(&self, user_id: Uuid) -> bool {
        self.a == user_id || self.b == user_id
    }

    pub fn matches(&self, message: &Message) -> bool {
        (message.sender_id == self.a && message.receiver_id == self.b)
            || (message.sender_id == self.b && message.receiver_id == self.a)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub sender: Option<Participant>,
    pub receiver: Option<Participant>,
}
