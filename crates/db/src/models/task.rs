use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
    sea_query::Query,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::{activity, notice, notice_read, notice_recipient, task, task_team, user},
    models::{ids, user::User},
    types::{TaskPriority, TaskStage},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    pub title: String,
    pub date: String,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub stage: TaskStage,
    pub is_trashed: bool,
    pub sub_tasks: Vec<SubTask>,
    pub assets: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub stage: TaskStage,
    pub assets: Vec<String>,
    pub team: Vec<Uuid>,
}

/// Narrowing options for [`Task::list`]. `is_trashed` always applies;
/// the rest are opt-in.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub stage: Option<TaskStage>,
    pub is_trashed: bool,
    pub search: Option<String>,
    pub member_of: Option<Uuid>,
}

impl Task {
    fn from_model(model: task::Model) -> Result<Self, DbErr> {
        let sub_tasks: Vec<SubTask> = serde_json::from_value(model.sub_tasks)
            .map_err(|e| DbErr::Custom(format!("corrupt sub_tasks column: {e}")))?;
        let assets: Vec<String> = serde_json::from_value(model.assets)
            .map_err(|e| DbErr::Custom(format!("corrupt assets column: {e}")))?;
        Ok(Self {
            id: model.uuid,
            title: model.title,
            date: model.date,
            priority: model.priority,
            stage: model.stage,
            is_trashed: model.is_trashed,
            sub_tasks,
            assets,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn row_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<i64, DbErr> {
        ids::task_id_by_uuid(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))
    }

    async fn replace_team<C: ConnectionTrait>(
        db: &C,
        task_row_id: i64,
        team: &[Uuid],
    ) -> Result<(), DbErr> {
        task_team::Entity::delete_many()
            .filter(task_team::Column::TaskId.eq(task_row_id))
            .exec(db)
            .await?;
        for member in team {
            let user_row_id = ids::user_id_by_uuid(db, *member)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;
            task_team::ActiveModel {
                task_id: Set(task_row_id),
                user_id: Set(user_row_id),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let model = task::ActiveModel {
            uuid: Set(task_id),
            title: Set(data.title.clone()),
            date: Set(data.date),
            priority: Set(data.priority),
            stage: Set(data.stage),
            is_trashed: Set(false),
            sub_tasks: Set(serde_json::json!([])),
            assets: Set(serde_json::to_value(&data.assets)
                .map_err(|e| DbErr::Custom(e.to_string()))?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Self::replace_team(db, model.id, &data.team).await?;
        Self::from_model(model)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        record.map(Self::from_model).transpose()
    }

    pub async fn list<C: ConnectionTrait>(db: &C, filter: &TaskFilter) -> Result<Vec<Self>, DbErr> {
        let mut query = task::Entity::find()
            .filter(task::Column::IsTrashed.eq(filter.is_trashed))
            .order_by_desc(task::Column::Id);

        if let Some(stage) = filter.stage {
            query = query.filter(task::Column::Stage.eq(stage));
        }
        if let Some(member) = filter.member_of {
            let user_row_id = ids::user_id_by_uuid(db, member)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound("User not found".to_string()))?;
            query = query.filter(
                task::Column::Id.in_subquery(
                    Query::select()
                        .column(task_team::Column::TaskId)
                        .from(task_team::Entity)
                        .and_where(task_team::Column::UserId.eq(user_row_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(task::Column::Title.contains(search))
                    .add(task::Column::Stage.contains(search))
                    .add(task::Column::Priority.contains(search)),
            );
        }

        let records = query.all(db).await?;
        records.into_iter().map(Self::from_model).collect()
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &CreateTask,
    ) -> Result<Self, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;
        let row_id = record.id;

        let mut active: task::ActiveModel = record.into();
        active.title = Set(data.title.clone());
        active.date = Set(data.date);
        active.priority = Set(data.priority);
        active.stage = Set(data.stage);
        active.assets =
            Set(serde_json::to_value(&data.assets).map_err(|e| DbErr::Custom(e.to_string()))?);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        Self::replace_team(db, row_id, &data.team).await?;
        Self::from_model(updated)
    }

    pub async fn update_stage<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        stage: TaskStage,
    ) -> Result<Self, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;

        let mut active: task::ActiveModel = record.into();
        active.stage = Set(stage);
        active.updated_at = Set(Utc::now());
        Self::from_model(active.update(db).await?)
    }

    pub async fn set_trashed<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        is_trashed: bool,
    ) -> Result<Self, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;

        let mut active: task::ActiveModel = record.into();
        active.is_trashed = Set(is_trashed);
        active.updated_at = Set(Utc::now());
        Self::from_model(active.update(db).await?)
    }

    pub async fn push_subtask<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        sub_task: SubTask,
    ) -> Result<Self, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Task not found".to_string()))?;

        let mut sub_tasks: Vec<SubTask> = serde_json::from_value(record.sub_tasks.clone())
            .map_err(|e| DbErr::Custom(format!("corrupt sub_tasks column: {e}")))?;
        sub_tasks.push(sub_task);

        let mut active: task::ActiveModel = record.into();
        active.sub_tasks =
            Set(serde_json::to_value(&sub_tasks).map_err(|e| DbErr::Custom(e.to_string()))?);
        active.updated_at = Set(Utc::now());
        Self::from_model(active.update(db).await?)
    }

    async fn delete_related<C: ConnectionTrait>(db: &C, task_row_id: i64) -> Result<(), DbErr> {
        let notices = notice::Entity::find()
            .filter(notice::Column::TaskId.eq(task_row_id))
            .all(db)
            .await?;
        for n in &notices {
            notice_read::Entity::delete_many()
                .filter(notice_read::Column::NoticeId.eq(n.id))
                .exec(db)
                .await?;
            notice_recipient::Entity::delete_many()
                .filter(notice_recipient::Column::NoticeId.eq(n.id))
                .exec(db)
                .await?;
        }
        notice::Entity::delete_many()
            .filter(notice::Column::TaskId.eq(task_row_id))
            .exec(db)
            .await?;
        activity::Entity::delete_many()
            .filter(activity::Column::TaskId.eq(task_row_id))
            .exec(db)
            .await?;
        task_team::Entity::delete_many()
            .filter(task_team::Column::TaskId.eq(task_row_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let row_id = Self::row_id(db, id).await?;
        Self::delete_related(db, row_id).await?;
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(row_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Permanently removes every trashed task.
    pub async fn delete_trashed<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        let trashed = task::Entity::find()
            .filter(task::Column::IsTrashed.eq(true))
            .all(db)
            .await?;
        let mut removed = 0;
        for record in trashed {
            Self::delete_related(db, record.id).await?;
            removed += task::Entity::delete_many()
                .filter(task::Column::Id.eq(record.id))
                .exec(db)
                .await?
                .rows_affected;
        }
        Ok(removed)
    }

    pub async fn restore_trashed<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        let result = task::Entity::update_many()
            .col_expr(task::Column::IsTrashed, false.into())
            .col_expr(task::Column::UpdatedAt, Utc::now().into())
            .filter(task::Column::IsTrashed.eq(true))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn team<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Vec<User>, DbErr> {
        let row_id = Self::row_id(db, id).await?;
        let records = user::Entity::find()
            .filter(
                user::Column::Id.in_subquery(
                    Query::select()
                        .column(task_team::Column::UserId)
                        .from(task_team::Entity)
                        .and_where(task_team::Column::TaskId.eq(row_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?;
        Ok(records
            .into_iter()
            .map(|m| User {
                id: m.uuid,
                email: m.email,
                name: m.name,
                title: m.title,
                role: m.role,
                password_hash: m.password_hash,
                is_active: m.is_active,
                is_admin: m.is_admin,
                created_at: m.created_at,
                updated_at: m.updated_at,
            })
            .collect())
    }
}
