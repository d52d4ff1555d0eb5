use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CreateNewsRequest, NewsList, UpdateNewsRequest},
    entity::news::{ActiveModel, Column, Entity as News, Model as NewsModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{CategoryKind, NewsArticle},
    response::{ApiResponse, Meta},
    routes::params::CatalogQuery,
    services::category_service,
    slug::slug_or_derive,
    state::AppState,
};

/// Published articles, newest first.
pub async fn list_news(state: &AppState, query: CatalogQuery) -> AppResult<ApiResponse<NewsList>> {
    search(state, query, false).await
}

pub async fn admin_list_news(
    state: &AppState,
    user: &AuthUser,
    query: CatalogQuery,
) -> AppResult<ApiResponse<NewsList>> {
    ensure_admin(user)?;
    search(state, query, true).await
}

async fn search(
    state: &AppState,
    query: CatalogQuery,
    include_drafts: bool,
) -> AppResult<ApiResponse<NewsList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if !include_drafts {
        condition = condition.add(Column::IsPublished.eq(true));
    }
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Title).ilike(format!("%{search}%")));
    }
    if let Some(slug) = query.category.as_deref().filter(|s| !s.is_empty()) {
        let ids = category_service::descendant_ids(&state.orm, CategoryKind::News, slug).await?;
        if ids.is_empty() {
            return Ok(ApiResponse::success(
                "News",
                NewsList { items: Vec::new() },
                Some(Meta::new(page, limit, 0)),
            ));
        }
        condition = condition.add(Column::CategoryId.is_in(ids));
    }
    if let Some(featured) = query.featured {
        condition = condition.add(Column::IsFeatured.eq(featured));
    }

    let finder = News::find()
        .filter(condition)
        .order_by_desc(Column::PublishedAt)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(news_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "News",
        NewsList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_news_by_slug(state: &AppState, slug: &str) -> AppResult<ApiResponse<NewsArticle>> {
    let model = News::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsPublished.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Article", news_from_entity(model), None))
}

pub async fn get_news(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<NewsArticle>> {
    ensure_admin(user)?;
    let model = News::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Article", news_from_entity(model), None))
}

pub async fn create_news(
    state: &AppState,
    user: &AuthUser,
    payload: CreateNewsRequest,
) -> AppResult<ApiResponse<NewsArticle>> {
    ensure_admin(user)?;
    payload.validate()?;

    let slug = slug_or_derive(payload.slug.as_deref(), &payload.title);
    category_service::require_slug(&slug)?;
    ensure_slug_free(&state.orm, &slug, None).await?;
    category_service::ensure_category_kind(&state.orm, payload.category_id, CategoryKind::News)
        .await?;

    let now = Utc::now();
    let article = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        summary: Set(payload.summary),
        content: Set(payload.content),
        image_url: Set(payload.image_url),
        category_id: Set(payload.category_id),
        is_published: Set(payload.is_published),
        is_featured: Set(payload.is_featured),
        published_at: Set(published_at(payload.is_published, None, now)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "news_create",
        "news",
        serde_json::json!({ "news_id": article.id, "published": article.is_published }),
    )
    .await;

    Ok(ApiResponse::success(
        "Article created",
        news_from_entity(article),
        Some(Meta::empty()),
    ))
}

pub async fn update_news(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateNewsRequest,
) -> AppResult<ApiResponse<NewsArticle>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = News::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if let Some(category_id) = payload.category_id {
        category_service::ensure_category_kind(&state.orm, category_id, CategoryKind::News).await?;
    }

    let is_published = payload.is_published.unwrap_or(existing.is_published);
    let stamp = published_at(is_published, existing.published_at, Utc::now());

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(slug) = payload.slug {
        let slug = slug_or_derive(Some(slug.as_str()), "");
        category_service::require_slug(&slug)?;
        ensure_slug_free(&state.orm, &slug, Some(id)).await?;
        active.slug = Set(slug);
    }
    if let Some(summary) = payload.summary {
        active.summary = Set(summary);
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    active.is_published = Set(is_published);
    active.published_at = Set(stamp);
    active.updated_at = Set(Utc::now().into());
    let article = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "news_update",
        "news",
        serde_json::json!({ "news_id": article.id, "published": article.is_published }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        news_from_entity(article),
        Some(Meta::empty()),
    ))
}

pub async fn delete_news(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = News::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "news_delete",
        "news",
        serde_json::json!({ "news_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// First publication stamps the article; later edits keep the original date.
fn published_at(
    is_published: bool,
    current: Option<DateTimeWithTimeZone>,
    now: DateTime<Utc>,
) -> Option<DateTimeWithTimeZone> {
    match (is_published, current) {
        (true, None) => Some(now.into()),
        (_, current) => current,
    }
}

async fn ensure_slug_free<C>(conn: &C, slug: &str, except: Option<Uuid>) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let mut select = News::find().filter(Column::Slug.eq(slug));
    if let Some(id) = except {
        select = select.filter(Column::Id.ne(id));
    }
    if select.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("Slug `{slug}` is already in use")));
    }
    Ok(())
}

fn news_from_entity(model: NewsModel) -> NewsArticle {
    NewsArticle {
        id: model.id,
        title: model.title,
        slug: model.slug,
        summary: model.summary,
        content: model.content,
        image_url: model.image_url,
        category_id: model.category_id,
        is_published: model.is_published,
        is_featured: model.is_featured,
        published_at: model.published_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishing_stamps_only_once() {
        let now = Utc::now();
        let earlier: DateTimeWithTimeZone = (now - chrono::Duration::days(3)).into();

        let stamped: DateTimeWithTimeZone = now.into();

        assert_eq!(published_at(true, None, now), Some(stamped));
        assert_eq!(published_at(true, Some(earlier), now), Some(earlier));
        assert_eq!(published_at(false, None, now), None);
        assert_eq!(published_at(false, Some(earlier), now), Some(earlier));
    }
}
