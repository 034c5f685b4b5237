use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::MessageRepo,
    },
    models::{ConversationKey, CreateMessageRecord, Message},
};

#[derive(Default)]
pub struct MemoryMessageRepo {
    messages: DashMap<Uuid, Message>,
}

impl MemoryMessageRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepo for MemoryMessageRepo {
    async fn create(&self, input: CreateMessageRecord) -> DbResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: input.sender_id,
            receiver_id: input.receiver_id,
            content: input.content,
            created_at: Utc::now(),
        };
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|e| e.value().clone()))
    }

    async fn list(&self, participant: Option<Uuid>, limit: Option<usize>) -> DbResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|e| participant.is_none_or(|user| e.value().involves(user)))
            .map(|e| e.value().clone())
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    async fn conversation(&self, key: ConversationKey) -> DbResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|e| key.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.messages.remove(&id).ok_or(DbError::NotFound)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn record(sender_id: Uuid, receiver_id: Uuid, content: &str) -> CreateMessageRecord {
        CreateMessageRecord {
            sender_id,
            receiver_id,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_for_participant_newest_first() {
        let repo = MemoryMessageRepo::new();
        let (ada, bob, cy) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let first = repo.create(record(ada, bob, "one")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = repo.create(record(bob, ada, "two")).await.unwrap();
        repo.create(record(bob, cy, "elsewhere")).await.unwrap();

        let ids: Vec<Uuid> = repo.list(Some(ada), None).await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(repo.list(None, Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_conversation_is_oldest_first_both_directions() {
        let repo = MemoryMessageRepo::new();
        let (ada, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let first = repo.create(record(ada, bob, "hi")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let reply = repo.create(record(bob, ada, "hello")).await.unwrap();
        repo.create(record(ada, Uuid::new_v4(), "other")).await.unwrap();

        let thread = repo.conversation(ConversationKey { a: bob, b: ada }).await.unwrap();
        let ids: Vec<Uuid> = thread.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![first.id, reply.id]);
    }

    #[tokio::test]
    async fn test_delete_missing_message() {
        let repo = MemoryMessageRepo::new();
        assert!(matches!(repo.delete(Uuid::new_v4()).await, Err(DbError::NotFound)));
    }
}
