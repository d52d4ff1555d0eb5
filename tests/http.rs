use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use hoangtri_moto_api::{
    app::build_router,
    config::AppConfig,
    db::orm_from_pool,
    entity::users::Model as UserModel,
    middleware::auth::{ROLE_ADMIN, ROLE_USER},
    services::auth_service::issue_token,
    state::AppState,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

// These requests are answered before any query runs, so the pool never connects.
fn app() -> (Router, AppConfig) {
    let config = AppConfig {
        database_url: "postgres://postgres@127.0.0.1:1/unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "http-test-secret".into(),
        session_ttl_hours: 1,
        cookie_secure: false,
        cors_origin: Some("http://localhost:5173".into()),
        db_max_connections: 1,
    };
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    let orm = orm_from_pool(&pool);
    let router = build_router(AppState::new(pool, orm, config.clone())).expect("router");
    (router, config)
}

fn token(config: &AppConfig, role: &str) -> String {
    let now = Utc::now();
    let user = UserModel {
        id: Uuid::new_v4(),
        username: "khach".into(),
        email: None,
        full_name: None,
        password_hash: String::new(),
        role: role.into(),
        created_at: now.into(),
        updated_at: now.into(),
    };
    issue_token(config, &user).expect("token")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn health_route_answers_with_request_id() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unknown_path_returns_json_404() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::get("/khong-co").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["data"]["path"], "/khong-co");
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let (app, _) = app();
    let response = app
        .oneshot(
            Request::get("/api/admin/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_are_forbidden_from_admin_routes() {
    let (app, config) = app();
    let response = app
        .oneshot(
            Request::get("/api/admin/dashboard")
                .header(header::AUTHORIZATION, format!("Bearer {}", token(&config, ROLE_USER)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn session_cookie_is_accepted_like_a_bearer_token() {
    let (app, config) = app();
    let cookie = format!("hoangtri_session={}", token(&config, ROLE_ADMIN));
    let response = app
        .oneshot(
            Request::post("/api/admin/categories")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"  ","kind":"product"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Authenticated as admin, then rejected by validation before touching the database.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["data"]["fields"][0]["field"], "name");
}

#[tokio::test]
async fn add_to_cart_validates_quantity() {
    let (app, _) = app();
    let payload = serde_json::json!({ "product_id": Uuid::new_v4(), "quantity": 0 });
    let response = app
        .oneshot(
            Request::post("/api/cart")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn post_json(path: &str, body: String) -> axum::response::Response {
    let (app, _) = app();
    app.oneshot(
        Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn missing_body_field_is_a_field_error() {
    let response = post_json("/api/cart", r#"{"quantity":2}"#.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = json_body(response).await;
    assert_eq!(body["data"]["fields"][0]["field"], "product_id");
}

#[tokio::test]
async fn malformed_uuid_is_a_field_error() {
    let response =
        post_json("/api/cart", r#"{"product_id":"nope","quantity":1}"#.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["data"]["fields"][0]["field"], "product_id");
}

#[tokio::test]
async fn camel_case_product_id_reaches_validation() {
    let payload = serde_json::json!({ "productId": Uuid::new_v4(), "quantity": 0 });
    let response = post_json("/api/cart", payload.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["data"]["fields"][0]["field"], "quantity");
}

#[tokio::test]
async fn checkout_item_errors_name_the_item() {
    let payload = serde_json::json!({
        "name": "Nguyễn Văn A",
        "items": [{ "quantity": 1, "price": 100000 }],
    });
    let response = post_json("/api/checkout", payload.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["data"]["fields"][0]["field"], "items[0].product_id");
}

#[tokio::test]
async fn broken_json_uses_the_error_envelope() {
    let response = post_json("/api/contacts", "{\"name\":".to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Bad Request Request body is not valid JSON");
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let (app, _) = app();
    let response = app
        .oneshot(
            Request::post("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("hoangtri_session=; Path=/; Max-Age=0"));
}
