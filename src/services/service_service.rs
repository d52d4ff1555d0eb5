use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CreateServiceRequest, ServiceList, UpdateServiceRequest},
    entity::services::{ActiveModel, Column, Entity as Services, Model as ServiceModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{CategoryKind, RepairService},
    response::{ApiResponse, Meta},
    routes::params::CatalogQuery,
    services::category_service,
    slug::slug_or_derive,
    state::AppState,
};

pub async fn list_services(
    state: &AppState,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ServiceList>> {
    search(state, query, false).await
}

pub async fn admin_list_services(
    state: &AppState,
    user: &AuthUser,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ServiceList>> {
    ensure_admin(user)?;
    search(state, query, true).await
}

async fn search(
    state: &AppState,
    query: CatalogQuery,
    include_inactive: bool,
) -> AppResult<ApiResponse<ServiceList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if !include_inactive {
        condition = condition.add(Column::IsActive.eq(true));
    }
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{search}%")));
    }
    if let Some(slug) = query.category.as_deref().filter(|s| !s.is_empty()) {
        let ids = category_service::descendant_ids(&state.orm, CategoryKind::Service, slug).await?;
        if ids.is_empty() {
            return Ok(ApiResponse::success(
                "Services",
                ServiceList { items: Vec::new() },
                Some(Meta::new(page, limit, 0)),
            ));
        }
        condition = condition.add(Column::CategoryId.is_in(ids));
    }
    if let Some(featured) = query.featured {
        condition = condition.add(Column::IsFeatured.eq(featured));
    }

    let finder = Services::find()
        .filter(condition)
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(service_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Services",
        ServiceList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_service_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<RepairService>> {
    let model = Services::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Service", service_from_entity(model), None))
}

pub async fn get_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<RepairService>> {
    ensure_admin(user)?;
    let model = Services::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Service", service_from_entity(model), None))
}

pub async fn create_service(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<RepairService>> {
    ensure_admin(user)?;
    payload.validate()?;

    let slug = slug_or_derive(payload.slug.as_deref(), &payload.name);
    category_service::require_slug(&slug)?;
    ensure_slug_free(&state.orm, &slug, None).await?;
    category_service::ensure_category_kind(&state.orm, payload.category_id, CategoryKind::Service)
        .await?;

    let service = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        slug: Set(slug),
        summary: Set(payload.summary),
        content: Set(payload.content),
        price_from: Set(payload.price_from),
        image_url: Set(payload.image_url),
        category_id: Set(payload.category_id),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "service_create",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Service created",
        service_from_entity(service),
        Some(Meta::empty()),
    ))
}

pub async fn update_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateServiceRequest,
) -> AppResult<ApiResponse<RepairService>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Services::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if let Some(category_id) = payload.category_id {
        category_service::ensure_category_kind(&state.orm, category_id, CategoryKind::Service)
            .await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
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
    if let Some(price_from) = payload.price_from {
        active.price_from = Set(price_from);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    active.updated_at = Set(Utc::now().into());
    let service = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "service_update",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        service_from_entity(service),
        Some(Meta::empty()),
    ))
}

pub async fn delete_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Services::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "service_delete",
        "services",
        serde_json::json!({ "service_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

async fn ensure_slug_free<C>(conn: &C, slug: &str, except: Option<Uuid>) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let mut select = Services::find().filter(Column::Slug.eq(slug));
    if let Some(id) = except {
        select = select.filter(Column::Id.ne(id));
    }
    if select.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("Slug `{slug}` is already in use")));
    }
    Ok(())
}

fn service_from_entity(model: ServiceModel) -> RepairService {
    RepairService {
        id: model.id,
        name: model.name,
        slug: model.slug,
        summary: model.summary,
        content: model.content,
        price_from: model.price_from,
        image_url: model.image_url,
        category_id: model.category_id,
        sort_order: model.sort_order,
        is_active: model.is_active,
        is_featured: model.is_featured,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
