use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    entities::{activity, user},
    models::ids,
    types::ActivityType,
};

/// A timeline entry on a task, carrying the author's display name.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: Uuid,
    pub activity_type: ActivityType,
    pub body: String,
    pub by: String,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
        activity_type: ActivityType,
        body: &str,
        author_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Self, DbErr> {
        let task_row_id = ids::task_id_by_uuid(db, task_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;
        let author_row_id = ids::user_id_by_uuid(db, author_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;

        let model = activity::ActiveModel {
            uuid: Set(activity_id),
            task_id: Set(task_row_id),
            activity_type: Set(activity_type),
            body: Set(body.to_string()),
            user_id: Set(author_row_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let by = author_name(db, model.user_id).await?;
        Ok(Self {
            id: model.uuid,
            activity_type: model.activity_type,
            body: model.body,
            by,
            created_at: model.created_at,
        })
    }

    /// Returns the task's timeline, newest first.
    pub async fn for_task<C: ConnectionTrait>(db: &C, task_id: Uuid) -> Result<Vec<Self>, DbErr> {
        let task_row_id = ids::task_id_by_uuid(db, task_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;

        let records = activity::Entity::find()
            .filter(activity::Column::TaskId.eq(task_row_id))
            .order_by_desc(activity::Column::Id)
            .all(db)
            .await?;

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let by = author_name(db, record.user_id).await?;
            entries.push(Self {
                id: record.uuid,
                activity_type: record.activity_type,
                body: record.body,
                by,
                created_at: record.created_at,
            });
        }
        Ok(entries)
    }
}

async fn author_name<C: ConnectionTrait>(db: &C, user_row_id: i64) -> Result<String, DbErr> {
    let name: Option<String> = user::Entity::find()
        .select_only()
        .column(user::Column::Name)
        .filter(user::Column::Id.eq(user_row_id))
        .into_tuple()
        .one(db)
        .await?;
    Ok(name.unwrap_or_default())
}
