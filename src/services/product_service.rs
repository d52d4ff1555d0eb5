use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::products::{CreateProductRequest, ProductList, UpdateProductRequest};
use crate::{
    audit,
    entity::{
        cart_items::{Column as CartItemCol, Entity as CartItems, Relation as CartItemRel},
        carts::Column as CartCol,
        product_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{CartStatus, CategoryKind, Product},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{cart_service, category_service},
    slug::slug_or_derive,
    state::AppState,
};

/// Storefront listing: active products only.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    search(state, query, false).await
}

/// Back-office listing including inactive products.
pub async fn admin_list_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    search(state, query, true).await
}

async fn search(
    state: &AppState,
    query: ProductQuery,
    include_inactive: bool,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if !include_inactive {
        condition = condition.add(Column::IsActive.eq(true));
    }

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Sku).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_deref().filter(|s| !s.is_empty()) {
        let ids = category_service::descendant_ids(&state.orm, CategoryKind::Product, slug).await?;
        if ids.is_empty() {
            return Ok(ApiResponse::success(
                "Products",
                ProductList { items: Vec::new() },
                Some(Meta::new(page, limit, 0)),
            ));
        }
        condition = condition.add(Column::CategoryId.is_in(ids));
    }

    if let Some(featured) = query.featured {
        condition = condition.add(Column::IsFeatured.eq(featured));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_images(&state.orm, models).await?;

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product_by_slug(state: &AppState, slug: &str) -> AppResult<ApiResponse<Product>> {
    let model = Products::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let product = single_with_images(&state.orm, model).await?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let model = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let product = single_with_images(&state.orm, model).await?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let slug = slug_or_derive(payload.slug.as_deref(), &payload.name);
    category_service::require_slug(&slug)?;
    ensure_slug_free(&state.orm, &slug, None).await?;
    category_service::ensure_category_kind(&state.orm, payload.category_id, CategoryKind::Product)
        .await?;

    let txn = state.orm.begin().await?;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        slug: Set(slug),
        sku: Set(payload.sku.filter(|s| !s.trim().is_empty())),
        description: Set(payload.description),
        content: Set(payload.content),
        price: Set(payload.price),
        sale_price: Set(payload.sale_price),
        category_id: Set(payload.category_id),
        image_url: Set(payload.image_url),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    replace_images(&txn, product.id, &payload.images).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let product = single_with_images(&state.orm, product).await?;
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(Some(category_id)) = payload.category_id {
        category_service::ensure_category_kind(&state.orm, Some(category_id), CategoryKind::Product)
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
    if let Some(sku) = payload.sku {
        active.sku = Set(sku);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(sale_price) = payload.sale_price {
        active.sale_price = Set(sale_price);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    active.updated_at = Set(Utc::now().into());

    let txn = state.orm.begin().await?;
    let product = active.update(&txn).await?;
    if let Some(images) = payload.images.as_deref() {
        replace_images(&txn, product.id, images).await?;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let product = single_with_images(&state.orm, product).await?;
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

/// Delete a product. Refused once the product appears in a checked-out cart;
/// lines in ACTIVE carts are dropped and those totals recomputed.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    Products::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let ordered = CartItems::find()
        .join(sea_orm::JoinType::InnerJoin, CartItemRel::Carts.def())
        .filter(CartItemCol::ProductId.eq(id))
        .filter(CartCol::Status.ne(CartStatus::Active.as_str()))
        .count(&txn)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(
            "Product is part of existing orders; deactivate it instead".to_string(),
        ));
    }

    let affected_carts: Vec<Uuid> = CartItems::find()
        .filter(CartItemCol::ProductId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|line| line.cart_id)
        .collect();
    CartItems::delete_many()
        .filter(CartItemCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    for cart_id in &affected_carts {
        cart_service::recompute_total(&txn, *cart_id).await?;
    }
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = %id, carts = affected_carts.len(), "product deleted");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Swap the whole gallery: delete then recreate in the caller's transaction.
async fn replace_images(txn: &DatabaseTransaction, product_id: Uuid, urls: &[String]) -> AppResult<()> {
    ProductImages::delete_many()
        .filter(ImageCol::ProductId.eq(product_id))
        .exec(txn)
        .await?;

    let rows: Vec<ImageActive> = urls
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .enumerate()
        .map(|(pos, url)| ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            url: Set(url.to_string()),
            sort_order: Set(pos as i32),
            created_at: NotSet,
        })
        .collect();
    if !rows.is_empty() {
        ProductImages::insert_many(rows).exec(txn).await?;
    }
    Ok(())
}

async fn ensure_slug_free<C>(conn: &C, slug: &str, except: Option<Uuid>) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let mut select = Products::find().filter(Column::Slug.eq(slug));
    if let Some(id) = except {
        select = select.filter(Column::Id.ne(id));
    }
    if select.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("Slug `{slug}` is already in use")));
    }
    Ok(())
}

async fn single_with_images<C>(conn: &C, model: ProductModel) -> AppResult<Product>
where
    C: ConnectionTrait,
{
    with_images(conn, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

async fn with_images<C>(conn: &C, models: Vec<ProductModel>) -> AppResult<Vec<Product>>
where
    C: ConnectionTrait,
{
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut images: HashMap<Uuid, Vec<String>> = HashMap::new();
    for image in ProductImages::find()
        .filter(ImageCol::ProductId.is_in(ids))
        .order_by_asc(ImageCol::SortOrder)
        .all(conn)
        .await?
    {
        images.entry(image.product_id).or_default().push(image.url);
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let gallery = images.remove(&model.id).unwrap_or_default();
            product_from_entity(model, gallery)
        })
        .collect())
}

pub(crate) fn product_from_entity(model: ProductModel, images: Vec<String>) -> Product {
    Product {
        id: model.id,
        effective_price: pricing::effective_price(model.price, model.sale_price),
        name: model.name,
        slug: model.slug,
        sku: model.sku,
        description: model.description,
        content: model.content,
        price: model.price,
        sale_price: model.sale_price,
        category_id: model.category_id,
        image_url: model.image_url,
        images,
        is_active: model.is_active,
        is_featured: model.is_featured,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_effective_price() {
        let now = Utc::now().into();
        let model = ProductModel {
            id: Uuid::new_v4(),
            name: "Lốp Michelin".into(),
            slug: "lop-michelin".into(),
            sku: Some("LOP-01".into()),
            description: None,
            content: None,
            price: 1_200_000,
            sale_price: Some(990_000),
            category_id: None,
            image_url: None,
            is_active: true,
            is_featured: true,
            created_at: now,
            updated_at: now,
        };
        let product = product_from_entity(model, vec!["/a.jpg".into()]);
        assert_eq!(product.effective_price, 990_000);
        assert_eq!(product.images, vec!["/a.jpg".to_string()]);
    }
}
