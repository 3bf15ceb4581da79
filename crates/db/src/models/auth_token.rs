use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    entities::auth_token,
    models::{ids, user::User},
};

pub struct AuthToken;

impl AuthToken {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;

        auth_token::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(row_id),
            created_at: Set(Utc::now()),
            expires_at: Set(expires_at),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(())
    }

    /// Resolves a token to its owner, treating expired tokens as absent.
    pub async fn find_valid_user<C: ConnectionTrait>(
        db: &C,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DbErr> {
        let record = auth_token::Entity::find()
            .filter(auth_token::Column::Token.eq(token))
            .filter(auth_token::Column::ExpiresAt.gt(now))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let owner_uuid = ids::user_uuid_by_id(db, record.user_id).await?;
        match owner_uuid {
            Some(uuid) => User::find_by_id(db, uuid).await,
            None => Ok(None),
        }
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, token: &str) -> Result<u64, DbErr> {
        let result = auth_token::Entity::delete_many()
            .filter(auth_token::Column::Token.eq(token))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
