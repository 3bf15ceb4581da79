use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid))
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Title).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(bool_col(Users::IsActive, true))
                    .col(bool_col(Users::IsAdmin, false))
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_uuid")
                    .table(Users::Table)
                    .col(Users::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(AuthTokens::Table)
                    .col(pk_id_col(manager, AuthTokens::Id))
                    .col(ColumnDef::new(AuthTokens::Token).string().not_null())
                    .col(fk_id_col(manager, AuthTokens::UserId))
                    .col(timestamp_col(AuthTokens::CreatedAt))
                    .col(ColumnDef::new(AuthTokens::ExpiresAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auth_tokens_user_id")
                            .from(AuthTokens::Table, AuthTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_auth_tokens_token")
                    .table(AuthTokens::Table)
                    .col(AuthTokens::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(uuid_col(Tasks::Uuid))
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Date).timestamp().not_null())
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("normal")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Stage)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("todo")),
                    )
                    .col(bool_col(Tasks::IsTrashed, false))
                    .col(ColumnDef::new(Tasks::SubTasks).json().not_null())
                    .col(ColumnDef::new(Tasks::Assets).json().not_null())
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_uuid")
                    .table(Tasks::Table)
                    .col(Tasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_is_trashed")
                    .table(Tasks::Table)
                    .col(Tasks::IsTrashed)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(TaskTeam::Table)
                    .col(pk_id_col(manager, TaskTeam::Id))
                    .col(fk_id_col(manager, TaskTeam::TaskId))
                    .col(fk_id_col(manager, TaskTeam::UserId))
                    .col(timestamp_col(TaskTeam::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_team_task_id")
                            .from(TaskTeam::Table, TaskTeam::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_team_user_id")
                            .from(TaskTeam::Table, TaskTeam::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_task_team_task_user_unique")
                    .table(TaskTeam::Table)
                    .col(TaskTeam::TaskId)
                    .col(TaskTeam::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Activities::Table)
                    .col(pk_id_col(manager, Activities::Id))
                    .col(uuid_col(Activities::Uuid))
                    .col(fk_id_col(manager, Activities::TaskId))
                    .col(
                        ColumnDef::new(Activities::ActivityType)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("assigned")),
                    )
                    .col(ColumnDef::new(Activities::Body).text().not_null())
                    .col(fk_id_col(manager, Activities::UserId))
                    .col(timestamp_col(Activities::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_task_id")
                            .from(Activities::Table, Activities::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_user_id")
                            .from(Activities::Table, Activities::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_activities_uuid")
                    .table(Activities::Table)
                    .col(Activities::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_activities_task_id")
                    .table(Activities::Table)
                    .col(Activities::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Notices::Table)
                    .col(pk_id_col(manager, Notices::Id))
                    .col(uuid_col(Notices::Uuid))
                    .col(fk_id_col(manager, Notices::TaskId))
                    .col(ColumnDef::new(Notices::Text).text().not_null())
                    .col(
                        ColumnDef::new(Notices::NotiType)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("alert")),
                    )
                    .col(timestamp_col(Notices::CreatedAt))
                    .col(timestamp_col(Notices::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notices_task_id")
                            .from(Notices::Table, Notices::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_notices_uuid")
                    .table(Notices::Table)
                    .col(Notices::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(NoticeRecipients::Table)
                    .col(pk_id_col(manager, NoticeRecipients::Id))
                    .col(fk_id_col(manager, NoticeRecipients::NoticeId))
                    .col(fk_id_col(manager, NoticeRecipients::UserId))
                    .col(timestamp_col(NoticeRecipients::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_recipients_notice_id")
                            .from(NoticeRecipients::Table, NoticeRecipients::NoticeId)
                            .to(Notices::Table, Notices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_recipients_user_id")
                            .from(NoticeRecipients::Table, NoticeRecipients::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_notice_recipients_unique")
                    .table(NoticeRecipients::Table)
                    .col(NoticeRecipients::NoticeId)
                    .col(NoticeRecipients::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(NoticeReads::Table)
                    .col(pk_id_col(manager, NoticeReads::Id))
                    .col(fk_id_col(manager, NoticeReads::NoticeId))
                    .col(fk_id_col(manager, NoticeReads::UserId))
                    .col(timestamp_col(NoticeReads::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_reads_notice_id")
                            .from(NoticeReads::Table, NoticeReads::NoticeId)
                            .to(Notices::Table, Notices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_reads_user_id")
                            .from(NoticeReads::Table, NoticeReads::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_notice_reads_unique")
                    .table(NoticeReads::Table)
                    .col(NoticeReads::NoticeId)
                    .col(NoticeReads::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NoticeReads::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NoticeRecipients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskTeam::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn bool_col<T: Iden>(col: T, default: bool) -> ColumnDef {
    ColumnDef::new(col)
        .boolean()
        .not_null()
        .default(Expr::val(default))
        .to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Email,
    Name,
    Title,
    Role,
    PasswordHash,
    IsActive,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AuthTokens {
    Table,
    Id,
    Token,
    UserId,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Uuid,
    Title,
    Date,
    Priority,
    Stage,
    IsTrashed,
    SubTasks,
    Assets,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TaskTeam {
    Table,
    Id,
    TaskId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Activities {
    Table,
    Id,
    Uuid,
    TaskId,
    ActivityType,
    Body,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Notices {
    Table,
    Id,
    Uuid,
    TaskId,
    Text,
    NotiType,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum NoticeRecipients {
    Table,
    Id,
    NoticeId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum NoticeReads {
    Table,
    Id,
    NoticeId,
    UserId,
    CreatedAt,
}
