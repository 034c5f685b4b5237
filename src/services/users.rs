use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::{AvatarStore, AvatarStoreError};
use crate::{
    auth::{CredentialError, hash_password, verify_password},
    config::BootstrapAdminConfig,
    db::{DbError, UserRepo},
    models::{
        CreateUserRecord, Role, UpdateUserRequest, User, UserPatch, UserView, ValidatedUser,
        normalize_email, normalize_optional,
    },
};

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("User not found")]
    NotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Avatar(#[from] AvatarStoreError),
}

pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// Service layer for portal accounts and their avatars.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepo>,
    avatars: Arc<AvatarStore>,
    password_min_length: usize,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepo>,
        avatars: Arc<AvatarStore>,
        password_min_length: usize,
    ) -> Self {
        Self {
            repo,
            avatars,
            password_min_length,
        }
    }

    pub fn password_min_length(&self) -> usize {
        self.password_min_length
    }

    /// Attach the stored avatar to a user record.
    pub async fn view(&self, user: &User) -> UserView {
        let avatar_url = self.avatars.get(&user.id.to_string()).await;
        UserView::new(user, avatar_url)
    }

    pub async fn get(&self, id: Uuid) -> UserServiceResult<User> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound)
    }

    pub async fn get_view(&self, id: Uuid) -> UserServiceResult<UserView> {
        let user = self.get(id).await?;
        Ok(self.view(&user).await)
    }

    /// All users, newest first.
    pub async fn list_views(&self) -> UserServiceResult<Vec<UserView>> {
        let users = self.repo.list().await?;
        let mut views = Vec::with_capacity(users.len());
        for user in &users {
            views.push(self.view(user).await);
        }
        Ok(views)
    }

    pub async fn count(&self) -> UserServiceResult<i64> {
        Ok(self.repo.count().await?)
    }

    /// Hash the password and store the account.
    pub async fn create(&self, input: ValidatedUser) -> UserServiceResult<User> {
        let password_hash = hash_password(&input.password)?;
        let user = self
            .repo
            .create(CreateUserRecord {
                name: input.name,
                email: input.email,
                password_hash,
                role: input.role,
                phone: input.phone,
                gender: input.gender,
            })
            .await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Look up an account by email and check its password.
    pub async fn authenticate(&self, email: &str, password: &str) -> UserServiceResult<User> {
        let user = self
            .repo
            .get_by_email(email)
            .await?
            .ok_or(UserServiceError::NotFound)?;
        if !verify_password(password, &user.password_hash) {
            return Err(UserServiceError::InvalidPassword);
        }
        Ok(user)
    }

    /// Apply a partial update on behalf of a caller holding `actor_role`.
    ///
    /// `avatarUrl` goes to the avatar store; every other field goes to the
    /// repository. Only administrators may change a role.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateUserRequest,
        actor_role: Role,
    ) -> UserServiceResult<UserView> {
        input
            .validate()
            .map_err(|e| UserServiceError::Validation(e.to_string()))?;

        let avatar_url = input.avatar_url.clone();
        let current_role = match (&input.role, actor_role) {
            (Some(_), actor) if actor != Role::Admin => Some(self.get(id).await?.role),
            _ => None,
        };
        let patch = self.build_patch(input, actor_role, current_role)?;

        let user = if patch.is_empty() {
            self.get(id).await?
        } else {
            self.repo.update(id, patch).await.map_err(|e| match e {
                DbError::NotFound => UserServiceError::NotFound,
                other => UserServiceError::Database(other),
            })?
        };

        match avatar_url {
            Some(url) => {
                let url = url.trim().to_string();
                self.avatars.set(&user.id.to_string(), &url).await?;
                Ok(UserView::new(&user, url))
            }
            None => Ok(self.view(&user).await),
        }
    }

    /// `current_role` is the target's stored role; it is only consulted
    /// when a non-administrator sends a role, which must then be unchanged.
    fn build_patch(
        &self,
        input: UpdateUserRequest,
        actor_role: Role,
        current_role: Option<Role>,
    ) -> UserServiceResult<UserPatch> {
        let mut patch = UserPatch::default();

        if let Some(name) = input.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(UserServiceError::Validation("Name cannot be empty".into()));
            }
            patch.name = Some(name.to_string());
        }
        if let Some(email) = input.email {
            patch.email = Some(normalize_email(&email));
        }
        if let Some(raw) = input.role {
            let role = Role::parse(&raw)
                .ok_or_else(|| UserServiceError::Validation("Invalid role supplied".into()))?;
            if actor_role == Role::Admin {
                patch.role = Some(role);
            } else if current_role != Some(role) {
                return Err(UserServiceError::Forbidden(
                    "Only administrators can change roles".into(),
                ));
            }
        }
        if let Some(phone) = input.phone {
            patch.phone = Some(normalize_optional(Some(&phone)));
        }
        if let Some(gender) = input.gender {
            patch.gender = Some(normalize_optional(Some(&gender)));
        }
        if let Some(password) = input.password.filter(|p| !p.is_empty()) {
            if password.chars().count() < self.password_min_length {
                return Err(UserServiceError::Validation(format!(
                    "Password must be at least {} characters",
                    self.password_min_length
                )));
            }
            patch.password_hash = Some(hash_password(&password)?);
        }
        Ok(patch)
    }

    /// Delete the account and its avatar.
    pub async fn delete(&self, id: Uuid) -> UserServiceResult<()> {
        self.repo.delete(id).await.map_err(|e| match e {
            DbError::NotFound => UserServiceError::NotFound,
            other => UserServiceError::Database(other),
        })?;
        if let Err(e) = self.avatars.remove(&id.to_string()).await {
            tracing::warn!(user_id = %id, error = %e, "Failed to remove avatar for deleted user");
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create the configured administrator unless an account with that
    /// email already exists. Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(
        &self,
        config: &BootstrapAdminConfig,
    ) -> UserServiceResult<bool> {
        let email = normalize_email(&config.email);
        if self.repo.get_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "Bootstrap administrator already exists");
            return Ok(false);
        }
        self.create(ValidatedUser {
            name: config.name.trim().to_string(),
            email,
            password: config.password.clone(),
            role: Role::Admin,
            phone: None,
            gender: None,
        })
        .await?;
        Ok(true)
    }
}
