use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{NewsList, CreateNewsRequest, UpdateNewsRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    middleware::json::Json,
    models::NewsArticle,
    response::ApiResponse,
    routes::params::CatalogQuery,
    services::news_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_news))
        .route("/{slug}", get(get_news_by_slug))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_list_news).post(create_news))
        .route("/{id}", get(get_news).put(update_news).delete(delete_news))
}

#[utoipa::path(
    get,
    path = "/api/news",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Published articles, newest first", body = ApiResponse<NewsList>)
    ),
    tag = "News"
)]
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<NewsList>>> {
    let resp = news_service::list_news(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/news/{slug}",
    params(
        ("slug" = String, Path, description = "Article slug")
    ),
    responses(
        (status = 200, description = "Article detail", body = ApiResponse<NewsArticle>),
        (status = 404, description = "Not Found")
    ),
    tag = "News"
)]
pub async fn get_news_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<NewsArticle>>> {
    let resp = news_service::get_news_by_slug(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/news",
    params(CatalogQuery),
    responses(
        (status = 200, description = "List all articles, drafts included", body = ApiResponse<NewsList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_list_news(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<NewsList>>> {
    let resp = news_service::admin_list_news(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/news/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article by id", body = ApiResponse<NewsArticle>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_news(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<NewsArticle>>> {
    let resp = news_service::get_news(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/news",
    request_body = CreateNewsRequest,
    responses(
        (status = 200, description = "Article created", body = ApiResponse<NewsArticle>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_news(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateNewsRequest>,
) -> AppResult<Json<ApiResponse<NewsArticle>>> {
    let resp = news_service::create_news(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/news/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    request_body = UpdateNewsRequest,
    responses(
        (status = 200, description = "Article updated", body = ApiResponse<NewsArticle>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slug already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_news(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNewsRequest>,
) -> AppResult<Json<ApiResponse<NewsArticle>>> {
    let resp = news_service::update_news(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/news/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_news(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = news_service::delete_news(&state, &user, id).await?;
    Ok(Json(resp))
}
