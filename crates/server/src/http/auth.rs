use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use db::{
    DBService,
    models::{auth_token::AuthToken, user::User},
};
use rand::{Rng, distributions::Alphanumeric};
use utils::response::ApiResponse;

pub const TOKEN_COOKIE: &str = "token";
const TOKEN_LENGTH: usize = 40;

/// Sessions last one day from sign-in.
pub fn token_ttl() -> Duration {
    Duration::days(1)
}

/// The authenticated caller, attached as a request extension by
/// [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

pub fn mint_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub fn auth_cookie(token: &str) -> String {
    format!(
        "{TOKEN_COOKIE}={token}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
        token_ttl().num_seconds()
    )
}

pub fn clear_auth_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict")
}

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn parse_token_cookie(value: &str) -> Option<&str> {
    for pair in value.split(';') {
        let pair = pair.trim();
        let (name, token) = pair.split_once('=')?;
        if name == TOKEN_COOKIE {
            let token = token.trim();
            if token.is_empty() {
                return None;
            }
            return Some(token);
        }
    }
    None
}

fn extract_request_token(req: &Request) -> Option<String> {
    // 1) Authorization: Bearer <token>
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
    {
        return Some(value.to_string());
    }

    // 2) token cookie from a browser session
    if let Some(value) = req
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_token_cookie)
    {
        return Some(value.to_string());
    }

    None
}

fn unauthorized(req: &Request, reason: &'static str) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        reason,
        "Unauthorized API request"
    );
    let response = ApiResponse::error("Unauthorized. Please sign in again.");
    (StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

pub async fn require_auth(State(db): State<DBService>, mut req: Request, next: Next) -> Response {
    let Some(token) = extract_request_token(&req) else {
        return unauthorized(&req, "missing_token");
    };

    let user = match AuthToken::find_valid_user(&db.pool, &token, Utc::now()).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized(&req, "invalid_token"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to resolve auth token");
            let response = ApiResponse::error("Internal server error".to_string());
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    req.extensions_mut().insert(CurrentUser { user, token });
    next.run(req).await
}
