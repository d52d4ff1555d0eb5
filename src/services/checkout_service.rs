use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::checkout::{CheckoutItem, CheckoutRequest, CheckoutResponse, OrderList},
    entity::{
        addresses::{ActiveModel as AddressActive, Model as AddressModel},
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, RequestContext},
    models::{Cart, CartStatus},
    pricing::QuantityMode,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{address_service, cart_service},
    state::AppState,
};

/// Result of a checkout. `new_session` is set when an anonymous visitor
/// without a cart checked out an inline item list.
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub response: ApiResponse<CheckoutResponse>,
    pub new_session: Option<String>,
}

/// Turn the visitor's ACTIVE cart into an order.
///
/// The cart row is locked for the whole transaction. Client prices and totals
/// are only compared against the server's figures. The order gets its own
/// copy of the shipping address so later address book edits leave it intact.
pub async fn checkout(
    state: &AppState,
    ctx: &RequestContext,
    payload: CheckoutRequest,
) -> AppResult<CheckoutOutcome> {
    payload.validate_items()?;
    if payload.address_id.is_none() {
        payload.validate_shipping()?;
    }

    let txn = state.orm.begin().await?;

    let (cart, new_session) = match cart_service::resolve(&txn, ctx).await? {
        Some(cart) => (cart, None),
        None if payload.items.as_ref().is_some_and(|items| !items.is_empty()) => {
            cart_service::resolve_or_create(&txn, ctx).await?
        }
        None => return Err(AppError::BadRequest("Cart is empty".to_string())),
    };

    let cart = Carts::find_by_id(cart.id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if cart.status != CartStatus::Active.as_str() {
        return Err(AppError::Conflict("Cart has already been checked out".to_string()));
    }

    if let Some(items) = payload.items.as_deref() {
        sync_lines(&txn, cart.id, items).await?;
    }

    let line_count = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .count(&txn)
        .await?;
    if line_count == 0 {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let total = cart_service::recompute_total(&txn, cart.id).await?;
    if let Some(client_total) = payload.total.filter(|t| *t != total) {
        tracing::warn!(cart_id = %cart.id, client_total, total, "checkout total mismatch");
    }

    let snapshot = match payload.address_id {
        Some(address_id) => {
            let user = ctx.user.as_ref().ok_or(AppError::NotFound)?;
            let saved = address_service::find_owned(&txn, user.user_id, address_id).await?;
            ShippingAddress::from(&saved)
        }
        None => ShippingAddress::from(&payload),
    };
    let address = snapshot.insert(&txn).await?;

    let cart_id = cart.id;
    let now = Utc::now();
    let mut active: CartActive = cart.into();
    active.status = Set(CartStatus::Checkout.as_str().to_string());
    active.address_id = Set(Some(address.id));
    active.note = Set(payload.note.filter(|n| !n.trim().is_empty()));
    active.checked_out_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    if let Some(user_id) = ctx.user_id() {
        active.user_id = Set(Some(user_id));
    }
    active.update(&txn).await?;

    let cart = cart_service::reload(&txn, cart_id).await?;
    txn.commit().await?;

    tracing::info!(%cart_id, total, items = cart.items.len(), "cart checked out");
    audit::record(
        &state.pool,
        ctx.user_id(),
        "checkout",
        "carts",
        serde_json::json!({ "cart_id": cart_id, "total": total }),
    )
    .await;

    Ok(CheckoutOutcome {
        response: ApiResponse::success(
            "Checkout completed",
            CheckoutResponse {
                success: true,
                cart,
            },
            Some(Meta::empty()),
        ),
        new_session,
    })
}

/// Make the cart's lines match `items` exactly, in Set mode.
async fn sync_lines(txn: &DatabaseTransaction, cart_id: Uuid, items: &[CheckoutItem]) -> AppResult<()> {
    let wanted = merge_checkout_items(items);
    let ids: Vec<Uuid> = wanted.iter().map(|(id, _)| *id).collect();

    let mut stale = CartItems::delete_many().filter(CartItemCol::CartId.eq(cart_id));
    if !ids.is_empty() {
        stale = stale.filter(CartItemCol::ProductId.is_not_in(ids.clone()));
    }
    stale.exec(txn).await?;

    if ids.is_empty() {
        return Ok(());
    }

    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProductCol::Id.is_in(ids))
        .filter(ProductCol::IsActive.eq(true))
        .all(txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    for (product_id, quantity) in wanted {
        let product = products.get(&product_id).ok_or(AppError::NotFound)?;
        let line =
            cart_service::upsert_line(txn, cart_id, product, quantity, QuantityMode::Set).await?;

        let advertised = items
            .iter()
            .filter(|item| item.product_id == product_id)
            .find_map(|item| item.price)
            .filter(|price| *price != line.price);
        if let Some(price) = advertised {
            tracing::debug!(%cart_id, %product_id, client_price = price, price = line.price, "client price differs");
        }
    }
    Ok(())
}

/// Collapse repeated products into one entry, summing quantities, in first-seen order.
pub(crate) fn merge_checkout_items(items: &[CheckoutItem]) -> Vec<(Uuid, i32)> {
    let mut merged: Vec<(Uuid, i32)> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
            None => merged.push((item.product_id, item.quantity)),
        }
    }
    merged
}

/// Shipping details frozen onto an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShippingAddress {
    name: String,
    phone: String,
    address: String,
    city: String,
    district: String,
    ward: String,
}

impl From<&AddressModel> for ShippingAddress {
    fn from(saved: &AddressModel) -> Self {
        Self {
            name: saved.name.clone(),
            phone: saved.phone.clone(),
            address: saved.address.clone(),
            city: saved.city.clone(),
            district: saved.district.clone(),
            ward: saved.ward.clone(),
        }
    }
}

impl From<&CheckoutRequest> for ShippingAddress {
    fn from(payload: &CheckoutRequest) -> Self {
        Self {
            name: payload.name.trim().to_string(),
            phone: payload.phone.trim().to_string(),
            address: payload.address.trim().to_string(),
            city: payload.city.trim().to_string(),
            district: payload.district.trim().to_string(),
            ward: payload.ward.trim().to_string(),
        }
    }
}

impl ShippingAddress {
    /// Store as an unowned row, invisible to every address book.
    async fn insert<C>(self, conn: &C) -> AppResult<AddressModel>
    where
        C: ConnectionTrait,
    {
        let address = AddressActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(None),
            name: Set(self.name),
            phone: Set(self.phone),
            address: Set(self.address),
            city: Set(self.city),
            district: Set(self.district),
            ward: Set(self.ward),
            is_default: Set(false),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(conn)
        .await?;
        Ok(address)
    }
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let mut select = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::Status.ne(CartStatus::Active.as_str()));
    if let Some(status) = query.status {
        select = select.filter(CartCol::Status.eq(status.as_str()));
    }
    select = match query.sort_order {
        Some(SortOrder::Asc) => select.order_by_asc(CartCol::CheckedOutAt),
        _ => select.order_by_desc(CartCol::CheckedOutAt),
    };

    let total = select.clone().count(&state.orm).await? as i64;
    let carts = select
        .offset(offset as u64)
        .limit(per_page as u64)
        .all(&state.orm)
        .await?;
    let items = cart_service::load_cart_views(&state.orm, carts).await?;

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Cart>> {
    let cart = Carts::find_by_id(id)
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::Status.ne(CartStatus::Active.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let cart = cart_service::load_cart_view(&state.orm, cart).await?;
    Ok(ApiResponse::success("OK", cart, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: Uuid, quantity: i32) -> CheckoutItem {
        CheckoutItem {
            product_id,
            quantity,
            price: None,
        }
    }

    #[test]
    fn repeated_products_are_summed_in_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_checkout_items(&[item(a, 2), item(b, 1), item(a, 1)]);
        assert_eq!(merged, vec![(a, 3), (b, 1)]);
    }

    #[test]
    fn empty_list_merges_to_nothing() {
        assert!(merge_checkout_items(&[]).is_empty());
    }

    #[test]
    fn inline_shipping_details_are_trimmed() {
        let payload = CheckoutRequest {
            name: "  Trần Thị B ".into(),
            phone: " 0987654321".into(),
            address: "5 Nguyễn Huệ  ".into(),
            city: "Huế".into(),
            district: " Phú Nhuận".into(),
            ward: "Phường 2 ".into(),
            ..Default::default()
        };
        let snapshot = ShippingAddress::from(&payload);
        assert_eq!(snapshot.name, "Trần Thị B");
        assert_eq!(snapshot.phone, "0987654321");
        assert_eq!(snapshot.address, "5 Nguyễn Huệ");
        assert_eq!(snapshot.district, "Phú Nhuận");
        assert_eq!(snapshot.ward, "Phường 2");
    }
}
