use sea_orm::entity::prelude::*;

use crate::types::{TaskPriority, TaskStage};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub title: String,
    pub date: DateTimeUtc,
    pub priority: TaskPriority,
    pub stage: TaskStage,
    pub is_trashed: bool,
    pub sub_tasks: Json,
    pub assets: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
