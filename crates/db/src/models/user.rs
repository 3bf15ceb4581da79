use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{entities::user, models::ids};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("User not found")]
    UserNotFound,
    #[error("A user with this email already exists")]
    EmailTaken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub title: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub title: String,
    pub role: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl User {
    fn from_model(model: user::Model) -> Self {
        Self {
            id: model.uuid,
            email: model.email,
            name: model.name,
            title: model.title,
            role: model.role,
            password_hash: model.password_hash,
            is_active: model.is_active,
            is_admin: model.is_admin,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateUser,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        if Self::find_by_email(db, &data.email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let now = Utc::now();
        let active = user::ActiveModel {
            uuid: Set(user_id),
            email: Set(data.email.clone()),
            name: Set(data.name.clone()),
            title: Set(data.title.clone()),
            role: Set(data.role.clone()),
            password_hash: Set(data.password_hash.clone()),
            is_active: Set(true),
            is_admin: Set(data.is_admin),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Lists users, optionally narrowed by a case-insensitive substring
    /// match against name, title, role, or email.
    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        search: Option<&str>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut query = user::Entity::find().order_by_asc(user::Column::CreatedAt);
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Name.contains(search))
                    .add(user::Column::Title.contains(search))
                    .add(user::Column::Role.contains(search))
                    .add(user::Column::Email.contains(search)),
            );
        }
        let records = query.all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_recent_active<C: ConnectionTrait>(
        db: &C,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = user::Entity::find()
            .filter(user::Column::IsActive.eq(true))
            .order_by_desc(user::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn update_profile<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        name: Option<String>,
        title: Option<String>,
        role: Option<String>,
    ) -> Result<Self, UserError> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(UserError::UserNotFound)?;

        let mut active: user::ActiveModel = record.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(role) = role {
            active.role = Set(role);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn set_active<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        is_active: bool,
    ) -> Result<Self, UserError> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(UserError::UserNotFound)?;

        let mut active: user::ActiveModel = record.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn set_password_hash<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        password_hash: String,
    ) -> Result<(), UserError> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(UserError::UserNotFound)?;

        let mut active: user::ActiveModel = record.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, UserError> {
        let row_id = ids::user_id_by_uuid(db, id)
            .await?
            .ok_or(UserError::UserNotFound)?;
        let result = user::Entity::delete_many()
            .filter(user::Column::Id.eq(row_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_user, setup_db};

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let db = setup_db().await;
        seed_user(&db, "alice", false).await;

        let result = User::create(
            &db,
            &CreateUser {
                email: "alice@example.com".to_string(),
                name: "Other Alice".to_string(),
                title: "Engineer".to_string(),
                role: "Developer".to_string(),
                password_hash: "x".to_string(),
                is_admin: false,
            },
            Uuid::new_v4(),
        )
        .await;

        assert!(matches!(result, Err(UserError::EmailTaken)));
    }

    #[tokio::test]
    async fn find_all_matches_any_of_the_four_fields() {
        let db = setup_db().await;
        seed_user(&db, "alice", false).await;
        let bob = User::create(
            &db,
            &CreateUser {
                email: "bob@example.com".to_string(),
                name: "Bob".to_string(),
                title: "Designer".to_string(),
                role: "UX".to_string(),
                password_hash: "x".to_string(),
                is_admin: false,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let by_title = User::find_all(&db, Some("design")).await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, bob.id);

        let by_email = User::find_all(&db, Some("ALICE@")).await.unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].name, "alice");

        let all = User::find_all(&db, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn recent_active_excludes_disabled_accounts() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice", false).await;
        seed_user(&db, "bob", false).await;

        User::set_active(&db, alice.id, false).await.unwrap();

        let recent = User::find_recent_active(&db, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "bob");
    }

    #[tokio::test]
    async fn delete_removes_the_user() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice", false).await;

        let removed = User::delete(&db, alice.id).await.unwrap();
        assert_eq!(removed, 1);
        assert!(User::find_by_id(&db, alice.id).await.unwrap().is_none());

        let missing = User::delete(&db, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(UserError::UserNotFound)));
    }
}
