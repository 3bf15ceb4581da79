use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

const DEFAULT_DATABASE_URL: &str = "sqlite://taskboard.sqlite?mode=rwc";

#[derive(Clone)]
pub struct DBService {
    pub pool: DatabaseConnection,
}

impl DBService {
    /// Connects to `DATABASE_URL` (or a local sqlite file by default) and
    /// brings the schema up to date.
    pub async fn new() -> Result<DBService, DbErr> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        Self::from_url(&database_url).await
    }

    pub async fn from_url(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url);
        options.sqlx_logging(false);
        if database_url.contains(":memory:") {
            // A pooled in-memory sqlite gives every connection its own
            // database; force a single connection so tests see one store.
            options.max_connections(1);
        }
        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        tracing::debug!("Database ready");
        Ok(DBService { pool })
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use chrono::Utc;
    use sea_orm::DatabaseConnection;
    use uuid::Uuid;

    use crate::{
        DBService,
        models::user::{CreateUser, User},
    };

    pub async fn setup_db() -> DatabaseConnection {
        DBService::from_url("sqlite::memory:")
            .await
            .expect("in-memory db")
            .pool
    }

    pub async fn seed_user(db: &DatabaseConnection, name: &str, is_admin: bool) -> User {
        User::create(
            db,
            &CreateUser {
                email: format!("{name}@example.com"),
                name: name.to_string(),
                title: "Engineer".to_string(),
                role: "Developer".to_string(),
                password_hash: "x".to_string(),
                is_admin,
            },
            Uuid::new_v4(),
        )
        .await
        .expect("seed user")
    }

    pub fn now_plus_days(days: i64) -> chrono::DateTime<Utc> {
        Utc::now() + chrono::Duration::days(days)
    }
}
