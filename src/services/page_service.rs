use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CreatePageRequest, PageList, UpdatePageRequest},
    entity::pages::{ActiveModel, Column, Entity as Pages, Model as PageModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Page,
    response::{ApiResponse, Meta},
    services::category_service::require_slug,
    slug::slug_or_derive,
    state::AppState,
};

pub async fn get_page_by_slug(state: &AppState, slug: &str) -> AppResult<ApiResponse<Page>> {
    let model = Pages::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Page", page_from_entity(model), None))
}

pub async fn list_pages(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<PageList>> {
    ensure_admin(user)?;
    let items: Vec<Page> = Pages::find()
        .order_by_asc(Column::Title)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(page_from_entity)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Pages",
        PageList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_page(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePageRequest,
) -> AppResult<ApiResponse<Page>> {
    ensure_admin(user)?;
    payload.validate()?;

    let slug = slug_or_derive(payload.slug.as_deref(), &payload.title);
    require_slug(&slug)?;
    ensure_slug_free(state, &slug, None).await?;

    let page = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        content: Set(payload.content),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "page_create",
        "pages",
        serde_json::json!({ "page_id": page.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Page created",
        page_from_entity(page),
        Some(Meta::empty()),
    ))
}

pub async fn update_page(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePageRequest,
) -> AppResult<ApiResponse<Page>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Pages::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(slug) = payload.slug {
        let slug = slug_or_derive(Some(slug.as_str()), "");
        require_slug(&slug)?;
        ensure_slug_free(state, &slug, Some(id)).await?;
        active.slug = Set(slug);
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let page = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        page_from_entity(page),
        Some(Meta::empty()),
    ))
}

pub async fn delete_page(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Pages::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "page_delete",
        "pages",
        serde_json::json!({ "page_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

async fn ensure_slug_free(state: &AppState, slug: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut select = Pages::find().filter(Column::Slug.eq(slug));
    if let Some(id) = except {
        select = select.filter(Column::Id.ne(id));
    }
    if select.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("Slug `{slug}` is already in use")));
    }
    Ok(())
}

fn page_from_entity(model: PageModel) -> Page {
    Page {
        id: model.id,
        title: model.title,
        slug: model.slug,
        content: model.content,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
