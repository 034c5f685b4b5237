//! Lookups shared by the services that join records for display.

use std::collections::HashMap;

use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::{
    db::{ClassRepo, DbResult, UserRepo},
    models::{Role, SchoolClass, User},
};

pub(crate) async fn user_index(users: &dyn UserRepo) -> DbResult<HashMap<Uuid, User>> {
    Ok(users.list().await?.into_iter().map(|u| (u.id, u)).collect())
}

pub(crate) async fn class_index(classes: &dyn ClassRepo) -> DbResult<HashMap<Uuid, SchoolClass>> {
    Ok(classes.list().await?.into_iter().map(|c| (c.id, c)).collect())
}

/// Fetch `id` and insist it holds `role`. A missing account and an account
/// with another role both report `missing`.
pub(crate) async fn user_with_role(
    users: &dyn UserRepo,
    id: Uuid,
    role: Role,
    missing: &'static str,
) -> ServiceResult<User> {
    users
        .get_by_id(id)
        .await?
        .filter(|u| u.role == role)
        .ok_or(ServiceError::NotFound(missing))
}

/// Store an account directly, skipping password hashing.
#[cfg(test)]
pub(crate) async fn seed_account(db: &crate::db::Repos, email: &str, role: Role) -> User {
    db.users
        .create(crate::models::CreateUserRecord {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
            phone: None,
            gender: None,
        })
        .await
        .unwrap()
}
