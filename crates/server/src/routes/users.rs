use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use db::{
    DBService,
    models::{auth_token::AuthToken, notice::Notice, user::{CreateUser, User}},
};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;
use uuid::{Uuid, uuid};

use crate::{
    error::ApiError,
    http::auth::{self, CurrentUser},
    password::{hash_password, verify_password},
    routes::dto::{AuthUserView, NoticeView, TeamMemberView},
};

/// Shared demo account whose password must stay fixed.
const DEMO_USER_ID: Uuid = uuid!("7b3f3f2e-1f6a-4a8e-9a8e-2d2c6f1b5d10");

fn require_admin(current: &CurrentUser) -> Result<(), ApiError> {
    if current.user.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "This action requires administrator access".to_string(),
        ))
    }
}

async fn issue_session(db: &DBService, user: &User) -> Result<String, ApiError> {
    let token = auth::mint_token();
    AuthToken::create(&db.pool, user.id, &token, Utc::now() + auth::token_ttl()).await?;
    Ok(token)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub title: String,
    pub role: String,
    pub email: String,
    pub password: String,
    // Accepted under the legacy superuser spellings as well.
    #[serde(default, alias = "isSuperuser", alias = "is_superuser")]
    pub is_admin: bool,
}

pub async fn register(
    State(db): State<DBService>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::create(
        &db.pool,
        &CreateUser {
            email: email.to_string(),
            name: name.to_string(),
            title: payload.title.trim().to_string(),
            role: payload.role.trim().to_string(),
            password_hash,
            is_admin: payload.is_admin,
        },
        Uuid::new_v4(),
    )
    .await?;

    let body = Json(ApiResponse::success(AuthUserView::from(&user)));
    if user.is_admin {
        let token = issue_session(&db, &user).await?;
        Ok((
            StatusCode::CREATED,
            [(header::SET_COOKIE, auth::auth_cookie(&token))],
            body,
        )
            .into_response())
    } else {
        Ok((StatusCode::CREATED, body).into_response())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(db): State<DBService>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = User::find_by_email(&db.pool, payload.email.trim()).await?;
    let Some(user) = user else {
        return Err(ApiError::BadRequest(
            "Invalid email or password.".to_string(),
        ));
    };
    if !user.is_active {
        return Err(ApiError::AccountDeactivated);
    }
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::BadRequest(
            "Invalid email or password.".to_string(),
        ));
    }

    let token = issue_session(&db, &user).await?;
    Ok((
        [(header::SET_COOKIE, auth::auth_cookie(&token))],
        Json(ApiResponse::success(AuthUserView::from(&user))),
    )
        .into_response())
}

pub async fn logout(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    AuthToken::delete(&db.pool, &current.token).await?;
    Ok((
        [(header::SET_COOKIE, auth::clear_auth_cookie())],
        Json(ApiResponse::message("Logged out successfully")),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamPayload {
    pub team: Vec<TeamMemberView>,
}

pub async fn get_team(
    State(db): State<DBService>,
    Query(query): Query<TeamQuery>,
) -> Result<Json<ApiResponse<TeamPayload>>, ApiError> {
    let users = User::find_all(&db.pool, query.search.as_deref()).await?;
    let team = users.iter().map(TeamMemberView::from).collect();
    Ok(Json(ApiResponse::success(TeamPayload { team })))
}

#[derive(Debug, Serialize)]
pub struct NoticesPayload {
    pub notices: Vec<NoticeView>,
}

pub async fn notifications(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<NoticesPayload>>, ApiError> {
    let unread = Notice::unread_for_user(&db.pool, current.user.id).await?;
    let mut notices = Vec::with_capacity(unread.len());
    for notice in &unread {
        notices.push(NoticeView::load(&db.pool, notice).await?);
    }
    Ok(Json(ApiResponse::success(NoticesPayload { notices })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadNotiQuery {
    pub is_read_type: Option<String>,
    pub id: Option<Uuid>,
}

pub async fn read_notification(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ReadNotiQuery>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    match query.is_read_type.as_deref() {
        Some("all") => {
            Notice::mark_all_read(&db.pool, current.user.id).await?;
        }
        _ => {
            let id = query.id.ok_or_else(|| {
                ApiError::BadRequest("A notification id is required".to_string())
            })?;
            Notice::mark_read_single(&db.pool, id, current.user.id).await?;
        }
    }
    Ok(Json(ApiResponse::message("Done")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(rename = "_id")]
    pub _id: Option<Uuid>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub user: AuthUserView,
}

pub async fn update_profile(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<ProfilePayload>>, ApiError> {
    // Admins may edit any profile; everyone else only their own.
    let target = match payload._id {
        Some(id) if current.user.is_admin => id,
        _ => current.user.id,
    };

    let updated = User::update_profile(
        &db.pool,
        target,
        payload.name,
        payload.title,
        payload.role,
    )
    .await?;

    Ok(Json(ApiResponse::success_with_message(
        ProfilePayload {
            user: AuthUserView::from(&updated),
        },
        "Profile Updated Successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

pub async fn change_password(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if current.user.id == DEMO_USER_ID {
        return Err(ApiError::Forbidden(
            "This is a test user. You cannot change the password. Thank you!!!".to_string(),
        ));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("A password is required".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    User::set_password_hash(&db.pool, current.user.id, password_hash).await?;
    Ok(Json(ApiResponse::message("Password changed successfully.")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    pub is_active: bool,
}

pub async fn set_active_state(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ActivateRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&current)?;
    let updated = User::set_active(&db.pool, user_id, payload.is_active).await?;
    let state = if updated.is_active {
        "activated"
    } else {
        "disabled"
    };
    Ok(Json(ApiResponse::message(format!(
        "User account has been {state}"
    ))))
}

pub async fn delete_user(
    State(db): State<DBService>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_admin(&current)?;
    User::delete(&db.pool, user_id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

pub fn router(db: &DBService) -> Router<DBService> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/get-team", get(get_team))
        .route("/notifications", get(notifications))
        .route("/profile", put(update_profile))
        .route("/read-noti", put(read_notification))
        .route("/change-password", put(change_password))
        .route("/{user_id}", put(set_active_state).delete(delete_user))
        .layer(from_fn_with_state(db.clone(), auth::require_auth));

    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    Router::new().nest("/user", public.merge(protected))
}
