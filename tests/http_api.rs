mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{app_state, harness, test_config};
use identity_backend::{middleware::TRACE_ID_HEADER, routes};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(h: &common::Harness) -> Router {
    routes::router(app_state(h, test_config(&[])))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            json!({ "name": name, "email": email, "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["resp_data"].clone()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": email, "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["resp_data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_cache_and_trace_id() {
    let h = harness();
    let app = app(&h);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(&TRACE_ID_HEADER));

    h.cache.set_unavailable(true);
    let (status, body) = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["cache"], json!(false));
}

#[tokio::test]
async fn incoming_trace_id_is_echoed() {
    let h = harness();
    let app = app(&h);

    let req = Request::builder()
        .uri("/health")
        .header(&TRACE_ID_HEADER, "abc123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.headers()[&TRACE_ID_HEADER], "abc123");
}

#[tokio::test]
async fn register_returns_profile_without_password() {
    let h = harness();
    let app = app(&h);

    let user = register(&app, "Ada", "ada@example.com").await;
    assert_eq!(user["email"], "ada@example.com");
    assert!(user["id"].as_i64().is_some());
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn invalid_registration_is_rejected() {
    let h = harness();
    let app = app(&h);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            json!({ "name": "A", "email": "not-an-email", "password": "123" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
    assert!(h.users.is_empty());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let h = harness();
    let app = app(&h);
    register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/users",
            json!({ "name": "Other", "email": "ada@example.com", "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn login_me_logout_flow() {
    let h = harness();
    let app = app(&h);
    let user = register(&app, "Ada", "ada@example.com").await;
    let token = login(&app, "ada@example.com").await;

    let (status, body) = send(&app, empty_request("GET", "/api/v1/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["user"]["id"], user["id"]);
    assert_eq!(body["resp_data"]["session_active"], json!(true));

    let (status, _) = send(&app, empty_request("POST", "/api/v1/auth/logout", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    // 令牌仍然有效，只是会话登记已删除
    let (status, body) = send(&app, empty_request("GET", "/api/v1/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["session_active"], json!(false));
}

#[tokio::test]
async fn wrong_credentials_share_one_response() {
    let h = harness();
    let app = app(&h);
    register(&app, "Ada", "ada@example.com").await;

    let (s1, b1) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": "ada@example.com", "password": "wrong!!" }),
            None,
        ),
    )
    .await;
    let (s2, b2) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": "nobody@example.com", "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s1, s2);
    assert_eq!(b1, b2);
}

#[tokio::test]
async fn protected_routes_require_bearer() {
    let h = harness();
    let app = app(&h);
    let user = register(&app, "Ada", "ada@example.com").await;
    let uri = format!("/api/v1/users/{}", user["id"]);

    let (status, body) = send(&app, empty_request("POST", "/api/v1/auth/logout", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);

    let (status, _) = send(&app, json_request("PUT", &uri, json!({ "name": "Eve" }), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, empty_request("DELETE", &uri, Some("not.a.token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.users.len(), 1);

    // 读取不需要认证
    let (status, body) = send(&app, empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["name"], "Ada");
}

#[tokio::test]
async fn authenticated_update_and_delete() {
    let h = harness();
    let app = app(&h);
    let user = register(&app, "Ada", "ada@example.com").await;
    let token = login(&app, "ada@example.com").await;
    let uri = format!("/api/v1/users/{}", user["id"]);

    let (status, body) = send(
        &app,
        json_request("PUT", &uri, json!({ "name": "Ada Lovelace" }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["name"], "Ada Lovelace");

    let (_, body) = send(&app, empty_request("GET", &uri, None)).await;
    assert_eq!(body["resp_data"]["name"], "Ada Lovelace");

    let (status, _) = send(&app, empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, empty_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);

    let (status, body) = send(&app, empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn malformed_user_id_is_bad_request() {
    let h = harness();
    let app = app(&h);

    let (status, body) = send(&app, empty_request("GET", "/api/v1/users/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
}

#[tokio::test]
async fn listing_tolerates_bad_paging_parameters() {
    let h = harness();
    let app = app(&h);
    for i in 0..3 {
        register(&app, &format!("User {}", i), &format!("user{}@example.com", i)).await;
    }

    let (status, body) = send(
        &app,
        empty_request("GET", "/api/v1/users?page=abc&per_page=-3", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page = &body["resp_data"];
    assert_eq!(page["page"], 1);
    assert_eq!(page["per_page"], 10);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 1);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);

    let (_, body) = send(&app, empty_request("GET", "/api/v1/users?page=2&per_page=2", None)).await;
    assert_eq!(body["resp_data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["resp_data"]["total_pages"], 2);
}

#[tokio::test]
async fn logout_reports_cache_outage() {
    let h = harness();
    let app = app(&h);
    register(&app, "Ada", "ada@example.com").await;
    let token = login(&app, "ada@example.com").await;

    h.cache.set_unavailable(true);
    let (status, body) = send(&app, empty_request("POST", "/api/v1/auth/logout", Some(&token))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 5003);
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let h = harness();
    let app = routes::router(app_state(&h, test_config(&[("RATE_LIMIT_REQUESTS", "2")])));

    let probe = |ip: &str| {
        Request::builder()
            .uri("/health")
            .header("x-real-ip", ip)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(send(&app, probe("10.0.0.1")).await.0, StatusCode::OK);
    assert_eq!(send(&app, probe("10.0.0.1")).await.0, StatusCode::OK);
    let (status, body) = send(&app, probe("10.0.0.1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 1005);

    // 其他客户端不受影响
    assert_eq!(send(&app, probe("10.0.0.2")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_fails_open_without_cache() {
    let h = harness();
    let app = routes::router(app_state(&h, test_config(&[("RATE_LIMIT_REQUESTS", "1")])));
    h.cache.set_unavailable(true);

    for _ in 0..3 {
        let (status, _) = send(&app, empty_request("GET", "/health", None)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn custom_base_uri_is_honoured() {
    let h = harness();
    let app = routes::router(app_state(&h, test_config(&[("API_BASE_URI", "/identity/")])));

    let (status, _) = send(&app, empty_request("GET", "/identity/users", None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, empty_request("GET", "/api/v1/users", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
