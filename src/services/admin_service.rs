use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::admin::{
        AuditLogList, CreateUserRequest, Dashboard, ResetPasswordRequest, StatusCounts,
        TopProduct, UpdateCartStatusRequest, UserList,
    },
    dto::checkout::OrderList,
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_USER, ensure_admin},
    models::{Cart, CartStatus, User},
    response::{ApiResponse, Meta},
    routes::params::{AuditLogQuery, OrderListQuery, Pagination, SortOrder},
    services::{auth_service, cart_service},
    state::AppState,
};

const RECENT_ORDERS: u64 = 5;
const TOP_PRODUCTS: i64 = 5;

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Dashboard>> {
    ensure_admin(user)?;

    let (active_products, active_services, published_news, open_contacts, users): (
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM products WHERE is_active),
            (SELECT COUNT(*) FROM services WHERE is_active),
            (SELECT COUNT(*) FROM news WHERE is_published),
            (SELECT COUNT(*) FROM contacts WHERE NOT handled),
            (SELECT COUNT(*) FROM users)
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let per_status: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM carts GROUP BY status")
            .fetch_all(&state.pool)
            .await?;
    let carts = status_counts(&per_status);

    let (revenue, pending_revenue): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(total) FILTER (WHERE status = 'COMPLETED'), 0)::BIGINT,
            COALESCE(SUM(total) FILTER (WHERE status = 'CHECKOUT'), 0)::BIGINT
        FROM carts
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let top: Vec<(Uuid, String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT ci.product_id, p.name,
               SUM(ci.quantity)::BIGINT AS quantity,
               SUM(ci.price * ci.quantity)::BIGINT AS revenue
        FROM cart_items ci
        JOIN carts c ON c.id = ci.cart_id
        JOIN products p ON p.id = ci.product_id
        WHERE c.status <> 'ACTIVE'
        GROUP BY ci.product_id, p.name
        ORDER BY quantity DESC, revenue DESC
        LIMIT $1
        "#,
    )
    .bind(TOP_PRODUCTS)
    .fetch_all(&state.pool)
    .await?;
    let top_products = top
        .into_iter()
        .map(|(product_id, name, quantity, revenue)| TopProduct {
            product_id,
            name,
            quantity,
            revenue,
        })
        .collect();

    let recent = Carts::find()
        .filter(CartCol::Status.ne(CartStatus::Active.as_str()))
        .order_by_desc(CartCol::CheckedOutAt)
        .limit(RECENT_ORDERS)
        .all(&state.orm)
        .await?;
    let recent_orders = cart_service::load_cart_views(&state.orm, recent).await?;

    let data = Dashboard {
        active_products,
        active_services,
        published_news,
        open_contacts,
        users,
        carts,
        revenue,
        pending_revenue,
        recent_orders,
        top_products,
    };
    Ok(ApiResponse::success("Dashboard", data, None))
}

fn status_counts(rows: &[(String, i64)]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        match status.parse::<CartStatus>() {
            Ok(CartStatus::Active) => counts.active += count,
            Ok(CartStatus::Checkout) => counts.checkout += count,
            Ok(CartStatus::Completed) => counts.completed += count,
            Err(_) => tracing::warn!(%status, "unknown cart status in dashboard"),
        }
    }
    counts
}

/// Every cart, ACTIVE ones included, for the back office.
pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(CartCol::Status.eq(status.as_str()));
    }

    let mut finder = Carts::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(CartCol::UpdatedAt),
        SortOrder::Desc => finder.order_by_desc(CartCol::UpdatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let carts = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = cart_service::load_cart_views(&state.orm, carts).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    ensure_admin(user)?;
    let cart = cart_service::reload(&state.orm, id).await?;
    Ok(ApiResponse::success("Order found", cart, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartStatusRequest,
) -> AppResult<ApiResponse<Cart>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Carts::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let current: CartStatus = existing
        .status
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))?;

    if !current.can_transition_to(payload.status) {
        return Err(AppError::BadRequest(format!(
            "Cannot move an order from {current} to {}",
            payload.status
        )));
    }
    if payload.status == CartStatus::Checkout {
        let lines = CartItems::find()
            .filter(CartItemCol::CartId.eq(id))
            .count(&txn)
            .await?;
        ensure_checkout_ready(lines, existing.address_id)?;
    }

    let now = Utc::now();
    let mut active: CartActive = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    if payload.status == CartStatus::Checkout {
        active.checked_out_at = Set(Some(now.into()));
    }
    active.updated_at = Set(now.into());
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(cart_id = %id, from = %current, to = %payload.status, "order status changed");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "carts",
        serde_json::json!({ "cart_id": id, "status": payload.status.as_str() }),
    )
    .await;

    let cart = cart_service::reload(&state.orm, id).await?;
    Ok(ApiResponse::success("Order updated", cart, Some(Meta::empty())))
}

/// Admins may only close out carts a visitor could have checked out themselves.
fn ensure_checkout_ready(lines: u64, address_id: Option<Uuid>) -> AppResult<()> {
    if lines == 0 {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }
    if address_id.is_none() {
        return Err(AppError::BadRequest(
            "Cart has no shipping address; check it out through /api/checkout".to_string(),
        ));
    }
    Ok(())
}

/// Hard-delete a cart, its lines and its shipping snapshot.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let cart = Carts::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    Carts::delete_by_id(id).exec(&txn).await?;
    // The shipping snapshot belongs to this order alone.
    if let Some(address_id) = cart.address_id {
        Addresses::delete_many()
            .filter(AddressCol::Id.eq(address_id))
            .filter(AddressCol::UserId.is_null())
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        "carts",
        serde_json::json!({ "cart_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_asc(UserCol::Username);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items: Vec<User> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(auth_service::user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    payload.validate()?;

    let role = payload.role.as_deref().unwrap_or(ROLE_USER);
    let created = auth_service::create_user(
        state,
        &payload.username,
        &payload.password,
        payload.email,
        payload.full_name,
        role,
    )
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_create",
        "users",
        serde_json::json!({ "user_id": created.id, "role": created.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        auth_service::user_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }

    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn reset_password(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: UserActive = existing.into();
    active.password_hash = Set(auth_service::hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "password_reset",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Password reset",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn list_audit_logs(
    state: &AppState,
    user: &AuthUser,
    query: AuditLogQuery,
) -> AppResult<ApiResponse<AuditLogList>> {
    ensure_admin(user)?;
    let (page, limit, _) = query.pagination().normalize();
    let (items, total) = audit::recent(&state.orm, &query).await?;
    Ok(ApiResponse::success(
        "Audit log",
        AuditLogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rows_fold_into_counts() {
        let rows = vec![
            ("ACTIVE".to_string(), 4),
            ("CHECKOUT".to_string(), 2),
            ("COMPLETED".to_string(), 7),
        ];
        assert_eq!(
            status_counts(&rows),
            StatusCounts {
                active: 4,
                checkout: 2,
                completed: 7
            }
        );
    }

    #[test]
    fn unknown_statuses_are_skipped() {
        let rows = vec![("SHIPPED".to_string(), 3)];
        assert_eq!(status_counts(&rows), StatusCounts::default());
    }

    #[test]
    fn forced_checkout_needs_lines_and_address() {
        let address = Some(Uuid::new_v4());
        assert!(matches!(ensure_checkout_ready(0, address), Err(AppError::BadRequest(_))));
        assert!(matches!(ensure_checkout_ready(2, None), Err(AppError::BadRequest(_))));
        assert!(ensure_checkout_ready(2, address).is_ok());
    }
}
