use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use db::{
    DBService,
    models::{
        activity::Activity,
        notice::Notice,
        task::{CreateTask, SubTask, Task, TaskFilter},
        user::User,
    },
    types::{ActivityType, NoticeType, TaskPriority, TaskStage},
};
use serde::{Deserialize, Serialize};
use url::Url;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    http::auth::{self, CurrentUser},
    routes::dto::{TaskView, TeamMemberView},
};

fn require_admin(current: &CurrentUser) -> Result<(), ApiError> {
    if current.user.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "This action requires administrator access".to_string(),
        ))
    }
}

fn parse_stage(value: &str) -> Result<TaskStage, ApiError> {
    TaskStage::from_str(value.trim())
        .map_err(|_| ApiError::BadRequest(format!("Unknown task stage: {value}")))
}

fn parse_priority(value: &str) -> Result<TaskPriority, ApiError> {
    TaskPriority::from_str(value.trim())
        .map_err(|_| ApiError::BadRequest(format!("Unknown task priority: {value}")))
}

/// Accepts either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date,
/// the latter pinned to midnight UTC.
fn parse_task_date(value: &str) -> Result<DateTime<Utc>, ApiError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(DateTime::from_naive_utc_and_offset(
            date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            Utc,
        ));
    }
    Err(ApiError::BadRequest(format!("Invalid task date: {value}")))
}

fn validate_assets(assets: &[String]) -> Result<Vec<String>, ApiError> {
    let mut out = Vec::with_capacity(assets.len());
    for asset in assets {
        let asset = asset.trim();
        if Url::parse(asset).is_err() {
            return Err(ApiError::BadRequest(format!("Invalid asset URL: {asset}")));
        }
        out.push(asset.to_string());
    }
    Ok(out)
}

/// Assignment summary used for both the activity body and the notice
/// text. Keeps the legacy wording, quirks included.
fn assignment_text(team_size: usize, priority: TaskPriority, date: DateTime<Utc>) -> String {
    let mut text = String::from("New task has been assigned to you");
    if team_size > 1 {
        text.push_str(&format!(" and {} others.", team_size - 1));
    }
    text.push_str(&format!(
        " The task priority is set a {priority} priority, so check and act accordingly. The task date is {}. Thank you!!!",
        date.format("%A %B %d, %Y")
    ));
    text
}

async fn record_assignment(
    db: &DBService,
    task: &Task,
    team: &[Uuid],
    author: Uuid,
) -> Result<(), ApiError> {
    let text = assignment_text(team.len(), task.priority, task.date);
    Activity::create(
        &db.pool,
        task.id,
        ActivityType::Assigned,
        &text,
        author,
        Uuid::new_v4(),
    )
    .await?;
    Notice::create(
        &db.pool,
        Uuid::new_v4(),
        task.id,
        &text,
        NoticeType::Alert,
        team,
    )
    .await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub title: String,
    #[serde(default)]
    pub team: Vec<Uuid>,
    pub stage: Option<String>,
    pub date: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub assets: Vec<String>,
}

impl TaskRequest {
    fn into_create(self) -> Result<CreateTask, ApiError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::BadRequest("A task title is required".to_string()));
        }
        let stage = match self.stage.as_deref() {
            Some(value) => parse_stage(value)?,
            None => TaskStage::Todo,
        };
        let priority = match self.priority.as_deref() {
            Some(value) => parse_priority(value)?,
            None => TaskPriority::Normal,
        };
        let date = match self.date.as_deref() {
            Some(value) => parse_task_date(value)?,
            None => Utc::now(),
        };
        Ok(CreateTask {
            title,
            date,
            priority,
            stage,
            assets: validate_assets(&self.assets)?,
            team: self.team,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TaskPayload {
    pub task: TaskView,
}

pub async fn create_task(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<TaskRequest>,
) -> Result<Json<ApiResponse<TaskPayload>>, ApiError> {
    let data = payload.into_create()?;
    let task = Task::create(&db.pool, &data, Uuid::new_v4()).await?;
    record_assignment(&db, &task, &data.team, current.user.id).await?;

    let view = TaskView::load(&db.pool, &task).await?;
    Ok(Json(ApiResponse::success_with_message(
        TaskPayload { task: view },
        "Task created successfully.",
    )))
}

pub async fn duplicate_task(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TaskPayload>>, ApiError> {
    let source = Task::find_by_id(&db.pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let team: Vec<Uuid> = Task::team(&db.pool, source.id)
        .await?
        .iter()
        .map(|member| member.id)
        .collect();

    let copy = Task::create(
        &db.pool,
        &CreateTask {
            title: format!("Duplicate - {}", source.title),
            date: source.date,
            priority: source.priority,
            stage: source.stage,
            assets: source.assets.clone(),
            team: team.clone(),
        },
        Uuid::new_v4(),
    )
    .await?;
    record_assignment(&db, &copy, &team, current.user.id).await?;

    let view = TaskView::load(&db.pool, &copy).await?;
    Ok(Json(ApiResponse::success_with_message(
        TaskPayload { task: view },
        "Task duplicated successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub activity: String,
}

pub async fn post_activity(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<ActivityRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let activity_type = ActivityType::from_str(payload.activity_type.trim())
        .map_err(|_| ApiError::BadRequest(format!("Unknown activity type: {}", payload.activity_type)))?;
    let body = payload.activity.trim();
    if body.is_empty() {
        return Err(ApiError::BadRequest(
            "An activity message is required".to_string(),
        ));
    }

    Activity::create(
        &db.pool,
        task_id,
        activity_type,
        body,
        current.user.id,
        Uuid::new_v4(),
    )
    .await?;
    Ok(Json(ApiResponse::message("Activity posted successfully.")))
}

fn visible_filter(current: &CurrentUser) -> TaskFilter {
    TaskFilter {
        member_of: (!current.user.is_admin).then_some(current.user.id),
        ..Default::default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDatum {
    pub name: String,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub total_tasks: usize,
    pub tasks: BTreeMap<String, u64>,
    pub graph_data: Vec<GraphDatum>,
    pub last10_task: Vec<TaskView>,
    pub users: Vec<TeamMemberView>,
}

pub async fn dashboard(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<DashboardPayload>>, ApiError> {
    let visible = Task::list(&db.pool, &visible_filter(&current)).await?;

    let mut by_stage: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_priority: BTreeMap<String, u64> = BTreeMap::new();
    for task in &visible {
        *by_stage.entry(task.stage.to_string()).or_default() += 1;
        *by_priority.entry(task.priority.to_string()).or_default() += 1;
    }
    let graph_data = by_priority
        .into_iter()
        .map(|(name, total)| GraphDatum { name, total })
        .collect();

    let mut last10 = Vec::new();
    for task in visible.iter().take(10) {
        last10.push(TaskView::load(&db.pool, task).await?);
    }

    let users = if current.user.is_admin {
        User::find_recent_active(&db.pool, 10)
            .await?
            .iter()
            .map(TeamMemberView::from)
            .collect()
    } else {
        Vec::new()
    };

    Ok(Json(ApiResponse::success_with_message(
        DashboardPayload {
            total_tasks: visible.len(),
            tasks: by_stage,
            graph_data,
            last10_task: last10,
            users,
        },
        "Successfully.",
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub stage: Option<String>,
    pub is_trashed: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TasksPayload {
    pub tasks: Vec<TaskView>,
}

pub async fn list_tasks(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<TasksPayload>>, ApiError> {
    let mut filter = visible_filter(&current);
    if let Some(stage) = query.stage.as_deref().filter(|s| !s.trim().is_empty()) {
        filter.stage = Some(parse_stage(stage)?);
    }
    filter.is_trashed = query.is_trashed.as_deref() == Some("true");
    filter.search = query.search;

    let found = Task::list(&db.pool, &filter).await?;
    let mut tasks = Vec::with_capacity(found.len());
    for task in &found {
        tasks.push(TaskView::load(&db.pool, task).await?);
    }
    Ok(Json(ApiResponse::success(TasksPayload { tasks })))
}

pub async fn get_task(
    State(db): State<DBService>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TaskPayload>>, ApiError> {
    let task = Task::find_by_id(&db.pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let view = TaskView::load(&db.pool, &task).await?;
    Ok(Json(ApiResponse::success(TaskPayload { task: view })))
}

pub async fn trash_task(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&current)?;
    Task::set_trashed(&db.pool, task_id, true).await?;
    Ok(Json(ApiResponse::message("Task trashed successfully.")))
}

#[derive(Debug, Deserialize)]
pub struct SubTaskRequest {
    pub title: String,
    pub date: String,
    pub tag: String,
}

pub async fn create_subtask(
    State(db): State<DBService>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<SubTaskRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let title = payload.title.trim();
    let date = payload.date.trim();
    let tag = payload.tag.trim();
    if title.is_empty() || date.is_empty() || tag.is_empty() {
        return Err(ApiError::BadRequest(
            "Sub-task title, date and tag are required".to_string(),
        ));
    }

    Task::push_subtask(
        &db.pool,
        task_id,
        SubTask {
            title: title.to_string(),
            date: date.to_string(),
            tag: tag.to_string(),
        },
    )
    .await?;
    Ok(Json(ApiResponse::message("SubTask added successfully.")))
}

pub async fn update_task(
    State(db): State<DBService>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<TaskRequest>,
) -> Result<Json<ApiResponse<TaskPayload>>, ApiError> {
    let data = payload.into_create()?;
    let task = Task::update(&db.pool, task_id, &data).await?;
    let view = TaskView::load(&db.pool, &task).await?;
    Ok(Json(ApiResponse::success_with_message(
        TaskPayload { task: view },
        "Task updated successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct ChangeStageRequest {
    pub stage: String,
}

pub async fn change_stage(
    State(db): State<DBService>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<ChangeStageRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let stage = parse_stage(&payload.stage)?;
    Task::update_stage(&db.pool, task_id, stage).await?;
    Ok(Json(ApiResponse::message(
        "Task stage changed successfully.",
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRestoreQuery {
    pub action_type: Option<String>,
}

pub async fn delete_restore(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Query(query): Query<DeleteRestoreQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&current)?;
    match query.action_type.as_deref() {
        Some("delete") => {
            Task::delete(&db.pool, task_id).await?;
        }
        Some("deleteAll") => {
            Task::delete_trashed(&db.pool).await?;
        }
        Some("restore") => {
            Task::set_trashed(&db.pool, task_id, false).await?;
        }
        Some("restoreAll") => {
            Task::restore_trashed(&db.pool).await?;
        }
        _ => {
            return Err(ApiError::BadRequest(
                "actionType must be one of delete, deleteAll, restore, restoreAll".to_string(),
            ));
        }
    }
    Ok(Json(ApiResponse::message(
        "Operation performed successfully.",
    )))
}

pub fn router(db: &DBService) -> Router<DBService> {
    let routes = Router::new()
        .route("/create", post(create_task))
        .route("/duplicate/{task_id}", post(duplicate_task))
        .route("/activity/{task_id}", post(post_activity))
        .route("/dashboard", get(dashboard))
        .route("/", get(list_tasks))
        .route("/{task_id}", get(get_task).put(trash_task))
        .route("/create-subtask/{task_id}", put(create_subtask))
        .route("/update/{task_id}", put(update_task))
        .route("/change-stage/{task_id}", put(change_stage))
        .route("/delete-restore/{task_id}", delete(delete_restore))
        .layer(from_fn_with_state(db.clone(), auth::require_auth));

    Router::new().nest("/task", routes)
}
