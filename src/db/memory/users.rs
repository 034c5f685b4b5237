use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::UserRepo,
    },
    models::{CreateUserRecord, User, UserPatch, normalize_email},
};

/// In-memory user repository using DashMap for concurrent access.
///
/// Reads never block. Mutations that touch the email index are serialized
/// through `write_lock` so the email uniqueness check and the insert happen
/// atomically.
///
/// **WARNING**: state is per-process and lost on restart.
#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<Uuid, User>,
    by_email: DashMap<String, Uuid>,
    write_lock: Mutex<()>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, input: CreateUserRecord) -> DbResult<User> {
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(DbError::Validation("Email is required".to_string()));
        }

        let _guard = self.write_lock.lock();
        if self.by_email.contains_key(&email) {
            return Err(DbError::Conflict("Email already in use".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: email.clone(),
            password_hash: input.password_hash,
            role: input.role,
            phone: input.phone,
            gender: input.gender,
            created_at: Utc::now(),
        };
        self.by_email.insert(email, user.id);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let Some(id) = self.by_email.get(&normalize_email(email)).map(|e| *e.value()) else {
            return Ok(None);
        };
        self.get_by_id(id).await
    }

    async fn list(&self) -> DbResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(users)
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.users.len() as i64)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> DbResult<User> {
        let _guard = self.write_lock.lock();
        let mut user = self
            .users
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(DbError::NotFound)?;

        if let Some(email) = patch.email.as_deref().map(normalize_email)
            && email != user.email
        {
            if email.is_empty() {
                return Err(DbError::Validation("Email is required".to_string()));
            }
            if self.by_email.contains_key(&email) {
                return Err(DbError::Conflict("Email already in use".to_string()));
            }
            self.by_email.remove(&user.email);
            self.by_email.insert(email.clone(), id);
            user.email = email;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(phone) = patch.phone {
            user.phone = phone;
        }
        if let Some(gender) = patch.gender {
            user.gender = gender;
        }

        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let _guard = self.write_lock.lock();
        let (_, user) = self.users.remove(&id).ok_or(DbError::NotFound)?;
        self.by_email.remove(&user.email);
        Ok(())
    }
}
