use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::db::{error::DbResult, repos::ParentLinkRepo};

#[derive(Default)]
pub struct MemoryParentLinkRepo {
    children: DashMap<Uuid, Vec<Uuid>>,
}

impl MemoryParentLinkRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParentLinkRepo for MemoryParentLinkRepo {
    async fn link(&self, parent_id: Uuid, student_id: Uuid) -> DbResult<()> {
        let mut children = self.children.entry(parent_id).or_default();
        if !children.contains(&student_id) {
            children.push(student_id);
        }
        Ok(())
    }

    async fn unlink(&self, parent_id: Uuid, student_id: Uuid) -> DbResult<()> {
        if let Some(mut children) = self.children.get_mut(&parent_id) {
            children.retain(|id| *id != student_id);
        }
        Ok(())
    }

    async fn children_of(&self, parent_id: Uuid) -> DbResult<Vec<Uuid>> {
        Ok(self
            .children
            .get(&parent_id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }

    async fn forget(&self, user_id: Uuid) -> DbResult<()> {
        self.children.remove(&user_id);
        for mut entry in self.children.iter_mut() {
            entry.value_mut().retain(|id| *id != user_id);
        }
        Ok(())
    }
}
