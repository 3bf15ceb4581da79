use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
    sea_query::Query,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    entities::{notice, notice_read, notice_recipient},
    models::ids,
    types::NoticeType,
};

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub task_id: Uuid,
    pub text: String,
    pub noti_type: NoticeType,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    async fn from_model<C: ConnectionTrait>(db: &C, model: notice::Model) -> Result<Self, DbErr> {
        let task_uuid = ids::task_uuid_by_id(db, model.task_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            task_id: task_uuid,
            text: model.text,
            noti_type: model.noti_type,
            created_at: model.created_at,
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        notice_id: Uuid,
        task_id: Uuid,
        text: &str,
        noti_type: NoticeType,
        recipients: &[Uuid],
    ) -> Result<Self, DbErr> {
        let task_row_id = ids::task_id_by_uuid(db, task_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;

        let now = Utc::now();
        let model = notice::ActiveModel {
            uuid: Set(notice_id),
            task_id: Set(task_row_id),
            text: Set(text.to_string()),
            noti_type: Set(noti_type),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        for recipient in recipients {
            let user_row_id = ids::user_id_by_uuid(db, *recipient)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;
            notice_recipient::ActiveModel {
                notice_id: Set(model.id),
                user_id: Set(user_row_id),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        Self::from_model(db, model).await
    }

    /// Notices addressed to the user that they have not read yet,
    /// newest first.
    pub async fn unread_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;

        let records = notice::Entity::find()
            .filter(
                notice::Column::Id.in_subquery(
                    Query::select()
                        .column(notice_recipient::Column::NoticeId)
                        .from(notice_recipient::Entity)
                        .and_where(notice_recipient::Column::UserId.eq(user_row_id))
                        .to_owned(),
                ),
            )
            .filter(
                notice::Column::Id.not_in_subquery(
                    Query::select()
                        .column(notice_read::Column::NoticeId)
                        .from(notice_read::Entity)
                        .and_where(notice_read::Column::UserId.eq(user_row_id))
                        .to_owned(),
                ),
            )
            .order_by_desc(notice::Column::CreatedAt)
            .all(db)
            .await?;

        let mut notices = Vec::with_capacity(records.len());
        for record in records {
            notices.push(Self::from_model(db, record).await?);
        }
        Ok(notices)
    }

    /// Marks one notice read for the caller. The read set of the notice is
    /// rewritten so the caller ends up as its only reader; callers who are
    /// not unread recipients are ignored and `false` is returned.
    pub async fn mark_read_single<C: ConnectionTrait>(
        db: &C,
        notice_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DbErr> {
        let notice_row_id = ids::notice_id_by_uuid(db, notice_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Notice not found".to_string()))?;
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;

        let is_recipient = notice_recipient::Entity::find()
            .filter(notice_recipient::Column::NoticeId.eq(notice_row_id))
            .filter(notice_recipient::Column::UserId.eq(user_row_id))
            .one(db)
            .await?
            .is_some();
        let already_read = notice_read::Entity::find()
            .filter(notice_read::Column::NoticeId.eq(notice_row_id))
            .filter(notice_read::Column::UserId.eq(user_row_id))
            .one(db)
            .await?
            .is_some();
        if !is_recipient || already_read {
            return Ok(false);
        }

        notice_read::Entity::delete_many()
            .filter(notice_read::Column::NoticeId.eq(notice_row_id))
            .exec(db)
            .await?;
        notice_read::ActiveModel {
            notice_id: Set(notice_row_id),
            user_id: Set(user_row_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(true)
    }

    /// Marks every unread notice of the user as read. Returns how many
    /// read marks were added; calling it again is a no-op.
    pub async fn mark_all_read<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;

        let unread = notice::Entity::find()
            .filter(
                notice::Column::Id.in_subquery(
                    Query::select()
                        .column(notice_recipient::Column::NoticeId)
                        .from(notice_recipient::Entity)
                        .and_where(notice_recipient::Column::UserId.eq(user_row_id))
                        .to_owned(),
                ),
            )
            .filter(
                notice::Column::Id.not_in_subquery(
                    Query::select()
                        .column(notice_read::Column::NoticeId)
                        .from(notice_read::Entity)
                        .and_where(notice_read::Column::UserId.eq(user_row_id))
                        .to_owned(),
                ),
            )
            .all(db)
            .await?;

        let now = Utc::now();
        let mut marked = 0;
        for record in &unread {
            notice_read::ActiveModel {
                notice_id: Set(record.id),
                user_id: Set(user_row_id),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
            marked += 1;
        }
        Ok(marked)
    }
}
