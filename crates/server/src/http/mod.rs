use axum::{Router, routing::get};
use db::DBService;

use crate::routes;

pub mod auth;

pub fn router(db: DBService) -> Router {
    let api_routes = Router::new()
        .merge(routes::users::router(&db))
        .merge(routes::tasks::router(&db));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .with_state(db)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::test_support::{login, register, send, send_json, test_app};

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app().await;
        let (status, _, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!(true));
    }

    #[tokio::test]
    async fn admin_registration_sets_the_auth_cookie() {
        let app = test_app().await;

        let (status, headers, body) = send_json(
            &app,
            Method::POST,
            "/api/user/register",
            None,
            json!({
                "name": "Ada",
                "title": "Lead",
                "role": "Manager",
                "email": "ada@example.com",
                "password": "p",
                "isAdmin": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], json!(true));
        assert_eq!(body["isAdmin"], json!(true));
        assert_eq!(body["_id"], body["id"]);

        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn registration_accepts_the_superuser_spelling() {
        let app = test_app().await;

        let (status, headers, body) = send_json(
            &app,
            Method::POST,
            "/api/user/register",
            None,
            json!({
                "email": "a@x.com",
                "password": "p",
                "name": "A",
                "title": "T",
                "role": "R",
                "isSuperuser": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["isAdmin"], json!(true));
        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.starts_with("token="));

        let (status, _, body) = send_json(
            &app,
            Method::POST,
            "/api/user/register",
            None,
            json!({
                "email": "b@x.com",
                "password": "p",
                "name": "B",
                "title": "T",
                "role": "R",
                "is_superuser": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["isAdmin"], json!(true));
    }

    #[tokio::test]
    async fn plain_registration_does_not_sign_in() {
        let app = test_app().await;

        let (status, headers, body) = send_json(
            &app,
            Method::POST,
            "/api/user/register",
            None,
            json!({
                "name": "Bob",
                "title": "Dev",
                "role": "Developer",
                "email": "bob@example.com",
                "password": "p"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["isAdmin"], json!(false));
        assert!(headers.get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn duplicate_email_registration_is_rejected() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", false).await;

        let (status, _, body) = send_json(
            &app,
            Method::POST,
            "/api/user/register",
            None,
            json!({
                "name": "Ada Again",
                "title": "Dev",
                "role": "Developer",
                "email": "ada@example.com",
                "password": "p"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], json!(false));
    }

    #[tokio::test]
    async fn api_routes_reject_unauthenticated_callers_with_the_envelope() {
        let app = test_app().await;
        let (status, _, body) = send(&app, Method::GET, "/api/task", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], json!(false));
        assert_eq!(body["message"], json!("Unauthorized. Please sign in again."));
    }

    #[tokio::test]
    async fn login_issues_a_working_cookie_session() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", false).await;
        let token = login(&app, "ada@example.com").await;

        let response = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .method(Method::GET)
                    .uri("/api/user/notifications")
                    .header(header::COOKIE, format!("token={token}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn authorization_header_wins_over_a_stale_cookie() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", false).await;
        let token = login(&app, "ada@example.com").await;

        let response = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .method(Method::GET)
                    .uri("/api/user/notifications")
                    .header(header::COOKIE, "token=stale-garbage")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn deactivated_accounts_cannot_sign_in() {
        let app = test_app().await;
        let admin_token = {
            register(&app, "Root", "root@example.com", true).await;
            login(&app, "root@example.com").await
        };
        let bob = register(&app, "Bob", "bob@example.com", false).await;

        let (status, _, _) = send_json(
            &app,
            Method::PUT,
            &format!("/api/user/{}", bob["id"].as_str().unwrap()),
            Some(&admin_token),
            json!({ "isActive": false }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, body) = send_json(
            &app,
            Method::POST,
            "/api/user/login",
            None,
            json!({ "email": "bob@example.com", "password": "p" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            json!("User account has been deactivated, contact the administrator")
        );
    }

    async fn create_task(app: &axum::Router, token: &str, title: &str, team: Vec<&str>) -> Value {
        let (status, _, body) = send_json(
            app,
            Method::POST,
            "/api/task/create",
            Some(token),
            json!({
                "title": title,
                "team": team,
                "stage": "Todo",
                "priority": "HIGH",
                "date": "2024-01-01",
                "assets": []
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn task_creation_folds_casing_and_notifies_the_team() {
        let app = test_app().await;
        let ada = register(&app, "Ada", "ada@example.com", true).await;
        let token = login(&app, "ada@example.com").await;

        let body = create_task(&app, &token, "T1", vec![ada["id"].as_str().unwrap()]).await;
        assert_eq!(body["task"]["stage"], json!("todo"));
        assert_eq!(body["task"]["priority"], json!("high"));
        assert_eq!(body["task"]["activities"].as_array().unwrap().len(), 1);

        let (status, _, body) =
            send(&app, Method::GET, "/api/user/notifications", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let notices = body["notices"].as_array().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0]["task"]["title"], json!("T1"));
        assert!(
            notices[0]["text"]
                .as_str()
                .unwrap()
                .starts_with("New task has been assigned to you")
        );
    }

    #[tokio::test]
    async fn duplication_copies_fields_and_counts_teammates() {
        let app = test_app().await;
        let ada = register(&app, "Ada", "ada@example.com", true).await;
        let bob = register(&app, "Bob", "bob@example.com", false).await;
        let token = login(&app, "ada@example.com").await;

        let created = create_task(
            &app,
            &token,
            "T1",
            vec![ada["id"].as_str().unwrap(), bob["id"].as_str().unwrap()],
        )
        .await;
        let task_id = created["task"]["id"].as_str().unwrap();

        let (status, _, body) = send(
            &app,
            Method::POST,
            &format!("/api/task/duplicate/{task_id}"),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task"]["title"], json!("Duplicate - T1"));
        assert_eq!(body["task"]["priority"], json!("high"));
        assert_eq!(body["task"]["team"].as_array().unwrap().len(), 2);
        let activity_text = body["task"]["activities"][0]["activity"].as_str().unwrap();
        assert!(activity_text.contains("and 1 others."));
    }

    #[tokio::test]
    async fn non_admins_only_see_their_own_tasks() {
        let app = test_app().await;
        let _ada = register(&app, "Ada", "ada@example.com", true).await;
        let bob = register(&app, "Bob", "bob@example.com", false).await;
        let admin_token = login(&app, "ada@example.com").await;
        let bob_token = login(&app, "bob@example.com").await;

        create_task(&app, &admin_token, "Bob's", vec![bob["id"].as_str().unwrap()]).await;
        create_task(&app, &admin_token, "Nobody's", vec![]).await;

        let (_, _, body) = send(&app, Method::GET, "/api/task", Some(&bob_token)).await;
        let tasks = body["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["title"], json!("Bob's"));

        let (_, _, body) = send(&app, Method::GET, "/api/task", Some(&admin_token)).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn admin_only_actions_reject_regular_users() {
        let app = test_app().await;
        let ada = register(&app, "Ada", "ada@example.com", true).await;
        register(&app, "Bob", "bob@example.com", false).await;
        let admin_token = login(&app, "ada@example.com").await;
        let bob_token = login(&app, "bob@example.com").await;

        let created = create_task(&app, &admin_token, "T1", vec![]).await;
        let task_id = created["task"]["id"].as_str().unwrap();

        let (status, _, body) = send(
            &app,
            Method::PUT,
            &format!("/api/task/{task_id}"),
            Some(&bob_token),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], json!(false));

        let (status, _, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/task/delete-restore/{task_id}?actionType=delete"),
            Some(&bob_token),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/user/{}", ada["id"].as_str().unwrap()),
            Some(&bob_token),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn trash_and_restore_round_trip_through_the_api() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", true).await;
        let token = login(&app, "ada@example.com").await;

        let created = create_task(&app, &token, "T1", vec![]).await;
        let task_id = created["task"]["id"].as_str().unwrap();

        let (status, _, _) = send(
            &app,
            Method::PUT,
            &format!("/api/task/{task_id}"),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = send(&app, Method::GET, "/api/task", Some(&token)).await;
        assert!(body["tasks"].as_array().unwrap().is_empty());
        let (_, _, body) = send(&app, Method::GET, "/api/task?isTrashed=true", Some(&token)).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

        let (status, _, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/task/delete-restore/{task_id}?actionType=restore"),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = send(&app, Method::GET, "/api/task", Some(&token)).await;
        let tasks = body["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["stage"], json!("todo"));
    }

    #[tokio::test]
    async fn dashboard_reports_counts_and_hides_users_from_non_admins() {
        let app = test_app().await;
        let bob = register(&app, "Bob", "bob@example.com", false).await;
        register(&app, "Ada", "ada@example.com", true).await;
        let admin_token = login(&app, "ada@example.com").await;
        let bob_token = login(&app, "bob@example.com").await;

        create_task(&app, &admin_token, "T1", vec![bob["id"].as_str().unwrap()]).await;
        create_task(&app, &admin_token, "T2", vec![]).await;

        let (status, _, body) = send(&app, Method::GET, "/api/task/dashboard", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalTasks"], json!(2));
        assert_eq!(body["tasks"]["todo"], json!(2));
        assert_eq!(body["graphData"][0]["name"], json!("high"));
        assert_eq!(body["graphData"][0]["total"], json!(2));
        assert_eq!(body["last10Task"].as_array().unwrap().len(), 2);
        assert_eq!(body["users"].as_array().unwrap().len(), 2);

        let (_, _, body) = send(&app, Method::GET, "/api/task/dashboard", Some(&bob_token)).await;
        assert_eq!(body["totalTasks"], json!(1));
        assert!(body["users"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn subtasks_append_through_the_api() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", true).await;
        let token = login(&app, "ada@example.com").await;

        let created = create_task(&app, &token, "T1", vec![]).await;
        let task_id = created["task"]["id"].as_str().unwrap();

        let (status, _, _) = send_json(
            &app,
            Method::PUT,
            &format!("/api/task/create-subtask/{task_id}"),
            Some(&token),
            json!({ "title": "Step one", "date": "2024-01-02", "tag": "prep" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send_json(
            &app,
            Method::PUT,
            &format!("/api/task/create-subtask/{task_id}"),
            Some(&token),
            json!({ "title": "", "date": "2024-01-02", "tag": "prep" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, _, body) = send(
            &app,
            Method::GET,
            &format!("/api/task/{task_id}"),
            Some(&token),
        )
        .await;
        let sub_tasks = body["task"]["subTasks"].as_array().unwrap();
        assert_eq!(sub_tasks.len(), 1);
        assert_eq!(sub_tasks[0]["title"], json!("Step one"));
    }

    #[tokio::test]
    async fn read_noti_supports_single_and_all() {
        let app = test_app().await;
        let ada = register(&app, "Ada", "ada@example.com", true).await;
        let token = login(&app, "ada@example.com").await;
        let ada_id = ada["id"].as_str().unwrap();

        create_task(&app, &token, "T1", vec![ada_id]).await;
        create_task(&app, &token, "T2", vec![ada_id]).await;

        let (_, _, body) = send(&app, Method::GET, "/api/user/notifications", Some(&token)).await;
        let notices = body["notices"].as_array().unwrap();
        assert_eq!(notices.len(), 2);
        let first_id = notices[0]["id"].as_str().unwrap().to_string();

        let (status, _, _) = send(
            &app,
            Method::PUT,
            &format!("/api/user/read-noti?isReadType=single&id={first_id}"),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = send(&app, Method::GET, "/api/user/notifications", Some(&token)).await;
        assert_eq!(body["notices"].as_array().unwrap().len(), 1);

        let (status, _, _) = send(
            &app,
            Method::PUT,
            "/api/user/read-noti?isReadType=all",
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = send(&app, Method::GET, "/api/user/notifications", Some(&token)).await;
        assert!(body["notices"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_team_filters_with_a_substring() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", true).await;
        register(&app, "Bob", "bob@example.com", false).await;
        let token = login(&app, "ada@example.com").await;

        let (_, _, body) = send(&app, Method::GET, "/api/user/get-team", Some(&token)).await;
        assert_eq!(body["team"].as_array().unwrap().len(), 2);

        let (_, _, body) = send(
            &app,
            Method::GET,
            "/api/user/get-team?search=bob",
            Some(&token),
        )
        .await;
        let team = body["team"].as_array().unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0]["name"], json!("Bob"));
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", false).await;
        let token = login(&app, "ada@example.com").await;

        let (status, headers, _) =
            send(&app, Method::POST, "/api/user/logout", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.contains("Max-Age=0"));

        let (status, _, _) = send(&app, Method::GET, "/api/user/notifications", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_updates_self_and_admin_updates_others() {
        let app = test_app().await;
        let bob = register(&app, "Bob", "bob@example.com", false).await;
        register(&app, "Ada", "ada@example.com", true).await;
        let admin_token = login(&app, "ada@example.com").await;
        let bob_token = login(&app, "bob@example.com").await;

        let (status, _, body) = send_json(
            &app,
            Method::PUT,
            "/api/user/profile",
            Some(&bob_token),
            json!({ "title": "Senior Dev" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], json!("Profile Updated Successfully."));
        assert_eq!(body["user"]["title"], json!("Senior Dev"));

        let (_, _, body) = send_json(
            &app,
            Method::PUT,
            "/api/user/profile",
            Some(&admin_token),
            json!({ "_id": bob["id"], "role": "Tech Lead" }),
        )
        .await;
        assert_eq!(body["user"]["role"], json!("Tech Lead"));
        assert_eq!(body["user"]["id"], bob["id"]);
    }

    #[tokio::test]
    async fn change_password_rotates_the_credential() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", false).await;
        let token = login(&app, "ada@example.com").await;

        let (status, _, _) = send_json(
            &app,
            Method::PUT,
            "/api/user/change-password",
            Some(&token),
            json!({ "password": "new-secret" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send_json(
            &app,
            Method::POST,
            "/api/user/login",
            None,
            json!({ "email": "ada@example.com", "password": "p" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = send_json(
            &app,
            Method::POST,
            "/api/user/login",
            None,
            json!({ "email": "ada@example.com", "password": "new-secret" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_enum_inputs_are_rejected_with_400() {
        let app = test_app().await;
        register(&app, "Ada", "ada@example.com", true).await;
        let token = login(&app, "ada@example.com").await;

        let (status, _, body) = send_json(
            &app,
            Method::POST,
            "/api/task/create",
            Some(&token),
            json!({ "title": "T1", "stage": "someday", "priority": "high" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], json!(false));

        let (status, _, _) = send_json(
            &app,
            Method::POST,
            "/api/task/create",
            Some(&token),
            json!({ "title": "T1", "assets": ["not a url"] }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
