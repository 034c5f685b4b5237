use uuid::Uuid;

use super::{ServiceError, ServiceResult, lookup::user_index};
use crate::{
    db::Repos,
    models::{ConversationKey, CreateMessageRecord, Message, MessageView, Participant, Role},
};

/// Direct messages between portal users.
///
/// Non-administrators only ever see messages they sent or received.
#[derive(Clone)]
pub struct MessageService {
    db: Repos,
}

fn forbidden(message: &str) -> ServiceError {
    ServiceError::Forbidden(message.to_string())
}

impl MessageService {
    pub fn new(db: Repos) -> Self {
        Self { db }
    }

    pub(crate) async fn views(&self, messages: Vec<Message>) -> ServiceResult<Vec<MessageView>> {
        let users = user_index(self.db.users.as_ref()).await?;
        Ok(messages
            .into_iter()
            .map(|m| MessageView {
                id: m.id,
                sender: users.get(&m.sender_id).map(Participant::from),
                receiver: users.get(&m.receiver_id).map(Participant::from),
                content: m.content,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn fetch(&self, id: Uuid) -> ServiceResult<Message> {
        self.db
            .messages
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Message not found"))
    }

    /// Newest first.
    pub async fn list(&self, caller_id: Uuid, caller_role: Role) -> ServiceResult<Vec<MessageView>> {
        let participant = (caller_role != Role::Admin).then_some(caller_id);
        let messages = self.db.messages.list(participant, None).await?;
        self.views(messages).await
    }

    /// Only an administrator may send on someone else's behalf.
    pub async fn send(
        &self,
        input: CreateMessageRecord,
        caller_id: Uuid,
        caller_role: Role,
    ) -> ServiceResult<MessageView> {
        if caller_role != Role::Admin && input.sender_id != caller_id {
            return Err(forbidden("You can only send messages as yourself"));
        }
        if self.db.users.get_by_id(input.receiver_id).await?.is_none() {
            return Err(ServiceError::NotFound("Receiver not found"));
        }
        if self.db.users.get_by_id(input.sender_id).await?.is_none() {
            return Err(ServiceError::NotFound("Sender not found"));
        }
        let message = self.db.messages.create(input).await?;
        tracing::debug!(message_id = %message.id, sender_id = %message.sender_id, receiver_id = %message.receiver_id, "Message sent");
        let mut views = self.views(vec![message]).await?;
        views.pop().ok_or(ServiceError::NotFound("Message not found"))
    }

    pub async fn get(&self, id: Uuid, caller_id: Uuid, caller_role: Role) -> ServiceResult<MessageView> {
        let message = self.fetch(id).await?;
        if caller_role != Role::Admin && !message.involves(caller_id) {
            return Err(forbidden("You can only read your own messages"));
        }
        let mut views = self.views(vec![message]).await?;
        views.pop().ok_or(ServiceError::NotFound("Message not found"))
    }

    /// The sender or an administrator may delete.
    pub async fn delete(&self, id: Uuid, caller_id: Uuid, caller_role: Role) -> ServiceResult<()> {
        let message = self.fetch(id).await?;
        if caller_role != Role::Admin && message.sender_id != caller_id {
            return Err(forbidden("Only the sender can delete a message"));
        }
        self.db
            .messages
            .delete(id)
            .await
            .map_err(ServiceError::missing("Message not found"))
    }

    /// Both directions between two users, oldest first.
    pub async fn conversation(
        &self,
        key: ConversationKey,
        caller_id: Uuid,
        caller_role: Role,
    ) -> ServiceResult<Vec<MessageView>> {
        if caller_role != Role::Admin && !key.includes(caller_id) {
            return Err(forbidden("You can only read your own conversations"));
        }
        let messages = self.db.messages.conversation(key).await?;
        self.views(messages).await
    }
}
