use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    audit,
    category_tree::{CategoryArena, ParentError, TreeNode},
    dto::categories::{CategoryList, CategoryTree, CreateCategoryRequest, UpdateCategoryRequest},
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        news::{Column as NewsCol, Entity as News},
        products::{Column as ProductCol, Entity as Products},
        services::{Column as ServiceCol, Entity as Services},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, CategoryKind, CategoryNode},
    response::{ApiResponse, Meta},
    routes::params::CategoryQuery,
    slug::slug_or_derive,
    state::AppState,
    validation::Validator,
};

/// Public tree of active categories, optionally for one kind.
pub async fn category_tree(
    state: &AppState,
    query: CategoryQuery,
) -> AppResult<ApiResponse<CategoryTree>> {
    let mut select = Categories::find().filter(CategoryCol::IsActive.eq(true));
    if let Some(kind) = query.kind {
        select = select.filter(CategoryCol::Kind.eq(kind.as_str()));
    }
    let nodes = select
        .order_by_asc(CategoryCol::SortOrder)
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?;

    let arena = CategoryArena::new(nodes, |c: &CategoryModel| (c.id, c.parent_id));
    let items = arena.into_tree().into_iter().map(node_from_tree).collect();
    Ok(ApiResponse::success("Categories", CategoryTree { items }, None))
}

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
    query: CategoryQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    ensure_admin(user)?;
    let mut select = Categories::find();
    if let Some(kind) = query.kind {
        select = select.filter(CategoryCol::Kind.eq(kind.as_str()));
    }
    let items: Vec<Category> = select
        .order_by_asc(CategoryCol::Kind)
        .order_by_asc(CategoryCol::SortOrder)
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Category>> {
    let model = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Category", category_from_entity(model), None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    let slug = slug_or_derive(payload.slug.as_deref(), &payload.name);
    require_slug(&slug)?;
    ensure_slug_free(&state.orm, payload.kind, &slug, None).await?;

    if let Some(parent_id) = payload.parent_id {
        let parent = Categories::find_by_id(parent_id)
            .one(&state.orm)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_same_kind(&parent, payload.kind)?;
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        slug: Set(slug),
        kind: Set(payload.kind.as_str().to_string()),
        description: Set(payload.description),
        parent_id: Set(payload.parent_id),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let kind: CategoryKind = existing
        .kind
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;

    if let Some(Some(parent_id)) = payload.parent_id {
        let all = Categories::find().all(&state.orm).await?;
        let arena = CategoryArena::new(all, |c: &CategoryModel| (c.id, c.parent_id));
        arena
            .validate_parent(id, Some(parent_id))
            .map_err(parent_error)?;
        if let Some(parent) = arena.get(parent_id) {
            ensure_same_kind(parent, kind)?;
        }
    }

    let mut active: CategoryActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(slug) = payload.slug {
        let slug = slug_or_derive(Some(slug.as_str()), "");
        require_slug(&slug)?;
        ensure_slug_free(&state.orm, kind, &slug, Some(id)).await?;
        active.slug = Set(slug);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(parent_id) = payload.parent_id {
        active.parent_id = Set(parent_id);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Delete a category. Its children move up to its parent and anything filed
/// under it becomes uncategorized.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Categories::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let moved = Categories::update_many()
        .col_expr(CategoryCol::ParentId, Expr::value(existing.parent_id))
        .filter(CategoryCol::ParentId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    Products::update_many()
        .col_expr(ProductCol::CategoryId, Expr::value(Option::<Uuid>::None))
        .filter(ProductCol::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    Services::update_many()
        .col_expr(ServiceCol::CategoryId, Expr::value(Option::<Uuid>::None))
        .filter(ServiceCol::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    News::update_many()
        .col_expr(NewsCol::CategoryId, Expr::value(Option::<Uuid>::None))
        .filter(NewsCol::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    Categories::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(category_id = %id, children_moved = moved, "category deleted");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Ids of the category with `slug` and everything below it. Empty when the
/// slug is unknown.
pub async fn descendant_ids<C>(conn: &C, kind: CategoryKind, slug: &str) -> AppResult<Vec<Uuid>>
where
    C: ConnectionTrait,
{
    let all = Categories::find()
        .filter(CategoryCol::Kind.eq(kind.as_str()))
        .all(conn)
        .await?;
    let Some(root) = all.iter().find(|c| c.slug == slug).map(|c| c.id) else {
        return Ok(Vec::new());
    };
    let arena = CategoryArena::new(all, |c: &CategoryModel| (c.id, c.parent_id));
    Ok(arena.descendants_of(root))
}

/// Reject a `category_id` that does not exist or is filed under another kind.
pub async fn ensure_category_kind<C>(
    conn: &C,
    category_id: Option<Uuid>,
    kind: CategoryKind,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let Some(category_id) = category_id else {
        return Ok(());
    };
    let category = Categories::find_by_id(category_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_same_kind(&category, kind)
}

fn ensure_same_kind(category: &CategoryModel, kind: CategoryKind) -> AppResult<()> {
    if category.kind != kind.as_str() {
        return Err(AppError::BadRequest(format!(
            "Category `{}` is not a {} category",
            category.slug,
            kind.as_str()
        )));
    }
    Ok(())
}

async fn ensure_slug_free<C>(
    conn: &C,
    kind: CategoryKind,
    slug: &str,
    except: Option<Uuid>,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let mut select = Categories::find()
        .filter(CategoryCol::Kind.eq(kind.as_str()))
        .filter(CategoryCol::Slug.eq(slug));
    if let Some(id) = except {
        select = select.filter(CategoryCol::Id.ne(id));
    }
    if select.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("Slug `{slug}` is already in use")));
    }
    Ok(())
}

pub(crate) fn require_slug(slug: &str) -> AppResult<()> {
    if slug.is_empty() {
        return Validator::new()
            .add("slug", "could not be derived, provide one")
            .finish();
    }
    Ok(())
}

fn parent_error(err: ParentError) -> AppError {
    match err {
        ParentError::SelfParent => {
            AppError::BadRequest("A category cannot be its own parent".to_string())
        }
        ParentError::Cycle => AppError::BadRequest(
            "A category cannot be moved under one of its descendants".to_string(),
        ),
        ParentError::MissingParent => AppError::NotFound,
    }
}

fn node_from_tree(node: TreeNode<CategoryModel>) -> CategoryNode {
    let TreeNode { value, children } = node;
    CategoryNode {
        id: value.id,
        name: value.name,
        slug: value.slug,
        kind: value.kind,
        description: value.description,
        parent_id: value.parent_id,
        sort_order: value.sort_order,
        children: children.into_iter().map(node_from_tree).collect(),
    }
}

pub(crate) fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        kind: model.kind,
        description: model.description,
        parent_id: model.parent_id,
        sort_order: model.sort_order,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> CategoryModel {
        let now = Utc::now().into();
        CategoryModel {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: crate::slug::slugify(name),
            kind: "product".into(),
            description: None,
            parent_id,
            sort_order: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn tree_nodes_keep_nesting() {
        let root = category("Phụ tùng", None);
        let child = category("Nhớt", Some(root.id));
        let arena = CategoryArena::new(vec![root.clone(), child.clone()], |c: &CategoryModel| {
            (c.id, c.parent_id)
        });
        let tree: Vec<CategoryNode> = arena.into_tree().into_iter().map(node_from_tree).collect();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].slug, "phu-tung");
        assert_eq!(tree[0].children[0].id, child.id);
    }

    #[test]
    fn parent_errors_map_to_http_errors() {
        assert!(matches!(parent_error(ParentError::SelfParent), AppError::BadRequest(_)));
        assert!(matches!(parent_error(ParentError::Cycle), AppError::BadRequest(_)));
        assert!(matches!(parent_error(ParentError::MissingParent), AppError::NotFound));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let c = category("Bảo dưỡng", None);
        assert!(ensure_same_kind(&c, CategoryKind::Product).is_ok());
        assert!(matches!(
            ensure_same_kind(&c, CategoryKind::News),
            Err(AppError::BadRequest(_))
        ));
    }
}
