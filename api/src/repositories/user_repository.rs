use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use sea_orm::{QueryOrder, TransactionTrait};
use shared::entity::{user_settings, users};
use shared::mapping::new_setting_active_model;
use shared::NewUser;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(self.db.as_ref())
            .await
    }

    pub async fn create(&self, user: NewUser, now: DateTime<Utc>) -> Result<users::Model, DbErr> {
        user.into_active_model(None, now)
            .insert(self.db.as_ref())
            .await
    }

    pub async fn update(&self, id: i64, user: NewUser, now: DateTime<Utc>) -> Result<users::Model, DbErr> {
        user.into_active_model(Some(id), now)
            .update(self.db.as_ref())
            .await
    }

    /// Removes the user's settings and then the user in one transaction.
    pub async fn delete_cascade(&self, id: i64) -> Result<bool, DbErr> {
        let txn = self.db.begin().await?;

        user_settings::Entity::delete_many()
            .filter(user_settings::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        let deleted = users::Entity::delete_by_id(id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        txn.commit().await?;
        Ok(true)
    }

    pub async fn settings(&self, user_id: i64) -> Result<Vec<user_settings::Model>, DbErr> {
        user_settings::Entity::find()
            .filter(user_settings::Column::UserId.eq(user_id))
            .order_by_asc(user_settings::Column::SettingKey)
            .all(self.db.as_ref())
            .await
    }

    /// Replaces the whole settings map in one transaction.
    pub async fn replace_settings(
        &self,
        user_id: i64,
        settings: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<user_settings::Model>, DbErr> {
        let txn = self.db.begin().await?;

        user_settings::Entity::delete_many()
            .filter(user_settings::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        let mut stored = Vec::with_capacity(settings.len());
        for (key, value) in settings {
            stored.push(
                new_setting_active_model(user_id, key, value, now)
                    .insert(&txn)
                    .await?,
            );
        }

        txn.commit().await?;
        Ok(stored)
    }
}
