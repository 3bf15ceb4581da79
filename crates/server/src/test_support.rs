use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use db::DBService;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::http;

pub async fn test_app() -> Router {
    let db = DBService::from_url("sqlite::memory:")
        .await
        .expect("in-memory db");
    http::router(db)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    dispatch(app, method, uri, token, None).await
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, HeaderMap, Value) {
    dispatch(app, method, uri, token, Some(body)).await
}

async fn dispatch(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

/// Registers a user with password `p` and returns the response body.
pub async fn register(app: &Router, name: &str, email: &str, is_admin: bool) -> Value {
    let (status, _, body) = send_json(
        app,
        Method::POST,
        "/api/user/register",
        None,
        json!({
            "name": name,
            "title": "Engineer",
            "role": "Developer",
            "email": email,
            "password": "p",
            "isAdmin": is_admin
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    body
}

/// Signs in with password `p` and returns the session token from the
/// Set-Cookie header.
pub async fn login(app: &Router, email: &str) -> String {
    let (status, headers, body) = send_json(
        app,
        Method::POST,
        "/api/user/login",
        None,
        json!({ "email": email, "password": "p" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");

    let cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login sets the token cookie");
    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("token="))
        .expect("cookie carries the token")
        .to_string()
}
