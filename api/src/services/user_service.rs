use chrono::Utc;
use sea_orm::DatabaseConnection;
use shared::password::hash_password;
use shared::{NewUser, User, UserSetting};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::dto::UserInput;
use crate::error::{AppError, AppResult};
use crate::repositories::UserRepository;

pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            repo: UserRepository::new(db),
        }
    }

    /// Username and email must not belong to any user other than `except`.
    async fn ensure_unique(&self, input: &UserInput, except: Option<i64>) -> AppResult<()> {
        let taken_by_other = |user: Option<shared::entity::users::Model>| {
            user.is_some_and(|u| Some(u.id) != except)
        };
        if taken_by_other(self.repo.find_by_username(&input.username).await?) {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }
        if taken_by_other(self.repo.find_by_email(&input.email).await?) {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }
        Ok(())
    }

    /// Hashing is CPU-bound, so it runs on the blocking pool.
    async fn into_new_user(input: UserInput) -> AppResult<NewUser> {
        let UserInput {
            username,
            email,
            password,
        } = input;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("password hashing task failed")))?;
        Ok(NewUser {
            username,
            email,
            password_hash,
        })
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = self.repo.list_all().await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub async fn create(&self, input: UserInput) -> AppResult<User> {
        self.ensure_unique(&input, None).await?;
        let user = Self::into_new_user(input).await?;
        let model = self.repo.create(user, Utc::now()).await?;
        info!(user_id = model.id, username = %model.username, "User created");
        Ok(model.into())
    }

    /// Full update, including a new password.
    pub async fn update(&self, id: i64, input: UserInput) -> AppResult<User> {
        self.get(id).await?;
        self.ensure_unique(&input, Some(id)).await?;
        let user = Self::into_new_user(input).await?;
        let model = self.repo.update(id, user, Utc::now()).await?;
        info!(user_id = id, "User updated");
        Ok(model.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.repo.delete_cascade(id).await? {
            return Err(AppError::not_found("User", id));
        }
        info!(user_id = id, "User deleted with settings");
        Ok(())
    }

    pub async fn settings(&self, id: i64) -> AppResult<Vec<UserSetting>> {
        self.get(id).await?;
        let settings = self.repo.settings(id).await?;
        Ok(settings.into_iter().map(UserSetting::from).collect())
    }

    pub async fn replace_settings(
        &self,
        id: i64,
        settings: BTreeMap<String, String>,
    ) -> AppResult<Vec<UserSetting>> {
        self.get(id).await?;
        let stored = self.repo.replace_settings(id, settings, Utc::now()).await?;
        info!(user_id = id, settings = stored.len(), "User settings replaced");
        Ok(stored.into_iter().map(UserSetting::from).collect())
    }
}
