use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, OnConflict};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::AddToCartRequest,
    entity::{
        addresses::{Entity as Addresses, Model as AddressModel},
        cart_items::{
            ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems,
            Model as CartItemModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::{Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::RequestContext,
    models::{Cart, CartLine, CartStatus},
    pricing::{self, QuantityMode},
    response::{ApiResponse, Meta},
    services::address_service::address_from_entity,
    state::AppState,
    validation::Validator,
};

/// Result of a cart write. `new_session` is set when an anonymous visitor was
/// issued a fresh session id that the client must keep.
#[derive(Debug)]
pub struct CartUpdate {
    pub response: ApiResponse<Cart>,
    pub new_session: Option<String>,
}

/// Find the visitor's ACTIVE cart.
///
/// A user-owned cart wins over a session cart. An unowned session cart is
/// re-owned by the signed-in user when the user has none of their own.
pub async fn resolve<C>(conn: &C, ctx: &RequestContext) -> AppResult<Option<CartModel>>
where
    C: ConnectionTrait,
{
    let active = CartStatus::Active.as_str();

    if let Some(user_id) = ctx.user_id() {
        let user_cart = Carts::find()
            .filter(CartCol::UserId.eq(user_id))
            .filter(CartCol::Status.eq(active))
            .order_by_desc(CartCol::UpdatedAt)
            .one(conn)
            .await?;
        if user_cart.is_some() {
            return Ok(user_cart);
        }
    }

    let Some(session_id) = ctx.session_id.as_deref() else {
        return Ok(None);
    };

    let session_cart = Carts::find()
        .filter(CartCol::SessionId.eq(session_id))
        .filter(CartCol::Status.eq(active))
        .order_by_desc(CartCol::UpdatedAt)
        .one(conn)
        .await?;

    match (session_cart, ctx.user_id()) {
        (Some(cart), Some(user_id)) if cart.user_id.is_none() => {
            let cart_id = cart.id;
            let mut active: CartActive = cart.into();
            active.user_id = Set(Some(user_id));
            // Owned carts are found by user id; the session may start a new cart later.
            active.session_id = Set(None);
            active.updated_at = Set(Utc::now().into());
            let cart = active.update(conn).await?;
            tracing::info!(%cart_id, %user_id, "session cart re-owned by user");
            Ok(Some(cart))
        }
        (Some(cart), user_id) if cart.user_id == user_id => Ok(Some(cart)),
        // Session cart belongs to somebody else; never hand it out.
        _ => Ok(None),
    }
}

/// Run cart reconciliation for a visitor who just signed in.
///
/// Returns the id of the cart the user now owns, if any.
pub async fn reconcile_on_login<C>(conn: &C, ctx: &RequestContext) -> AppResult<Option<Uuid>>
where
    C: ConnectionTrait,
{
    Ok(resolve(conn, ctx).await?.map(|cart| cart.id))
}

/// Like [`resolve`], creating an ACTIVE cart on first write.
///
/// Racing first writes for one visitor converge on a single cart through the
/// partial unique indexes on `carts`.
pub async fn resolve_or_create<C>(
    conn: &C,
    ctx: &RequestContext,
) -> AppResult<(CartModel, Option<String>)>
where
    C: ConnectionTrait,
{
    if let Some(cart) = resolve(conn, ctx).await? {
        return Ok((cart, None));
    }

    let (session_id, new_session) = match (ctx.user_id(), &ctx.session_id) {
        (Some(_), _) => (None, None),
        (None, Some(id)) => (Some(id.clone()), None),
        (None, None) => {
            let id = Uuid::new_v4().to_string();
            (Some(id.clone()), Some(id))
        }
    };
    let owner_column = match ctx.user_id() {
        Some(_) => CartCol::UserId,
        None => CartCol::SessionId,
    };

    let cart_id = Uuid::new_v4();
    let cart = CartActive {
        id: Set(cart_id),
        session_id: Set(session_id),
        user_id: Set(ctx.user_id()),
        status: Set(CartStatus::Active.as_str().to_string()),
        total: Set(0),
        address_id: Set(None),
        note: Set(None),
        checked_out_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let inserted = Carts::insert(cart)
        .on_conflict(
            OnConflict::column(owner_column)
                .target_and_where(Expr::cust("status = 'ACTIVE'"))
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    if inserted == 0 {
        let existing = resolve(conn, ctx).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("active cart vanished after insert conflict"))
        })?;
        tracing::debug!(cart_id = %existing.id, "joined concurrently created cart");
        return Ok((existing, None));
    }

    let cart = Carts::find_by_id(cart_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(cart_id = %cart.id, user_id = ?cart.user_id, "cart created");
    Ok((cart, new_session))
}

/// Insert or update the line for `product` in one statement. New lines
/// capture the product's effective price; existing lines keep the price
/// captured earlier.
pub async fn upsert_line<C>(
    conn: &C,
    cart_id: Uuid,
    product: &ProductModel,
    quantity: i32,
    mode: QuantityMode,
) -> AppResult<CartItemModel>
where
    C: ConnectionTrait,
{
    let line = CartItemActive {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart_id),
        product_id: Set(product.id),
        quantity: Set(quantity),
        price: Set(pricing::effective_price(product.price, product.sale_price)),
        created_at: NotSet,
        updated_at: Set(Utc::now().into()),
    };

    let mut on_conflict = OnConflict::columns([CartItemCol::CartId, CartItemCol::ProductId]);
    match mode {
        QuantityMode::Increment => on_conflict.value(
            CartItemCol::Quantity,
            Expr::col((CartItems, CartItemCol::Quantity)).add(quantity),
        ),
        QuantityMode::Set => on_conflict.update_column(CartItemCol::Quantity),
    };
    on_conflict.update_column(CartItemCol::UpdatedAt);

    let item = CartItems::insert(line)
        .on_conflict(on_conflict)
        .exec_with_returning(conn)
        .await?;
    Ok(item)
}

/// Recompute and persist `carts.total` from the current lines.
pub async fn recompute_total<C>(conn: &C, cart_id: Uuid) -> AppResult<i64>
where
    C: ConnectionTrait,
{
    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .all(conn)
        .await?;
    let total = pricing::cart_total(items.iter().map(|item| (item.price, item.quantity)));

    Carts::update_many()
        .col_expr(CartCol::Total, Expr::value(total))
        .col_expr(CartCol::UpdatedAt, Expr::current_timestamp().into())
        .filter(CartCol::Id.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(total)
}

pub async fn get_cart(state: &AppState, ctx: &RequestContext) -> AppResult<ApiResponse<Cart>> {
    let cart = match resolve(&state.orm, ctx).await? {
        Some(cart) => load_cart_view(&state.orm, cart).await?,
        None => Cart::empty(ctx.session_id.clone(), ctx.user_id()),
    };
    Ok(ApiResponse::success("OK", cart, Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    ctx: &RequestContext,
    payload: AddToCartRequest,
) -> AppResult<CartUpdate> {
    payload.validate()?;
    let product = find_purchasable(&state.orm, payload.product_id).await?;

    let txn = state.orm.begin().await?;
    let (cart, new_session) = resolve_or_create(&txn, ctx).await?;
    let item = upsert_line(&txn, cart.id, &product, payload.quantity, payload.mode).await?;
    let total = recompute_total(&txn, cart.id).await?;
    txn.commit().await?;

    tracing::info!(
        cart_id = %cart.id,
        product_id = %product.id,
        quantity = item.quantity,
        total,
        "cart item saved"
    );
    audit::record(
        &state.pool,
        ctx.user_id(),
        "cart_update",
        "cart_items",
        serde_json::json!({
            "cart_id": cart.id,
            "product_id": product.id,
            "quantity": item.quantity,
            "mode": format!("{:?}", payload.mode),
        }),
    )
    .await;

    let cart = reload(&state.orm, cart.id).await?;
    Ok(CartUpdate {
        response: ApiResponse::success("Added to cart", cart, Some(Meta::empty())),
        new_session,
    })
}

pub async fn set_quantity(
    state: &AppState,
    ctx: &RequestContext,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<ApiResponse<Cart>> {
    Validator::new()
        .positive("quantity", i64::from(quantity))
        .finish()?;

    let txn = state.orm.begin().await?;
    let cart = resolve(&txn, ctx).await?.ok_or(AppError::NotFound)?;
    let item = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product_id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CartItemActive = item.into();
    active.quantity = Set(pricing::merge_quantity(0, quantity, QuantityMode::Set));
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    recompute_total(&txn, cart.id).await?;
    txn.commit().await?;

    let cart = reload(&state.orm, cart.id).await?;
    Ok(ApiResponse::success("Cart updated", cart, Some(Meta::empty())))
}

pub async fn remove_from_cart(
    state: &AppState,
    ctx: &RequestContext,
    product_id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    let txn = state.orm.begin().await?;
    let cart = resolve(&txn, ctx).await?.ok_or(AppError::NotFound)?;
    let result = CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product_id))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    recompute_total(&txn, cart.id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        ctx.user_id(),
        "cart_remove",
        "cart_items",
        serde_json::json!({ "cart_id": cart.id, "product_id": product_id }),
    )
    .await;

    let cart = reload(&state.orm, cart.id).await?;
    Ok(ApiResponse::success("Removed from cart", cart, Some(Meta::empty())))
}

pub async fn clear_cart(state: &AppState, ctx: &RequestContext) -> AppResult<ApiResponse<Cart>> {
    let Some(cart) = resolve(&state.orm, ctx).await? else {
        return Ok(ApiResponse::success(
            "Cart cleared",
            Cart::empty(ctx.session_id.clone(), ctx.user_id()),
            Some(Meta::empty()),
        ));
    };

    let txn = state.orm.begin().await?;
    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;
    recompute_total(&txn, cart.id).await?;
    txn.commit().await?;

    let cart = reload(&state.orm, cart.id).await?;
    Ok(ApiResponse::success("Cart cleared", cart, Some(Meta::empty())))
}

/// Active product by id, or `NotFound`.
pub async fn find_purchasable<C>(conn: &C, product_id: Uuid) -> AppResult<ProductModel>
where
    C: ConnectionTrait,
{
    Products::find_by_id(product_id)
        .one(conn)
        .await?
        .filter(|product| product.is_active)
        .ok_or(AppError::NotFound)
}

pub async fn reload<C>(conn: &C, cart_id: Uuid) -> AppResult<Cart>
where
    C: ConnectionTrait,
{
    let cart = Carts::find_by_id(cart_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    load_cart_view(conn, cart).await
}

pub async fn load_cart_view<C>(conn: &C, cart: CartModel) -> AppResult<Cart>
where
    C: ConnectionTrait,
{
    let mut carts = load_cart_views(conn, vec![cart]).await?;
    carts
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart view missing")))
}

/// Attach lines and addresses to a batch of carts with one query per table.
pub async fn load_cart_views<C>(conn: &C, carts: Vec<CartModel>) -> AppResult<Vec<Cart>>
where
    C: ConnectionTrait,
{
    if carts.is_empty() {
        return Ok(Vec::new());
    }
    let cart_ids: Vec<Uuid> = carts.iter().map(|c| c.id).collect();
    let address_ids: Vec<Uuid> = carts.iter().filter_map(|c| c.address_id).collect();

    let rows = CartItems::find()
        .filter(CartItemCol::CartId.is_in(cart_ids))
        .find_also_related(Products)
        .order_by_asc(CartItemCol::CreatedAt)
        .all(conn)
        .await?;

    let mut lines: HashMap<Uuid, Vec<(CartItemModel, Option<ProductModel>)>> = HashMap::new();
    for (item, product) in rows {
        lines.entry(item.cart_id).or_default().push((item, product));
    }

    let addresses: HashMap<Uuid, AddressModel> = if address_ids.is_empty() {
        HashMap::new()
    } else {
        Addresses::find()
            .filter(crate::entity::addresses::Column::Id.is_in(address_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect()
    };

    carts
        .into_iter()
        .map(|cart| {
            let cart_lines = lines.remove(&cart.id).unwrap_or_default();
            let address = cart.address_id.and_then(|id| addresses.get(&id).cloned());
            cart_from_entity(cart, cart_lines, address)
        })
        .collect()
}

pub(crate) fn cart_from_entity(
    model: CartModel,
    lines: Vec<(CartItemModel, Option<ProductModel>)>,
    address: Option<AddressModel>,
) -> AppResult<Cart> {
    let status = model
        .status
        .parse::<CartStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    let items: Vec<CartLine> = lines
        .into_iter()
        .map(|(item, product)| line_from_entity(item, product))
        .collect();
    let item_count = items.iter().map(|line| line.quantity).sum();

    Ok(Cart {
        id: Some(model.id),
        session_id: model.session_id,
        user_id: model.user_id,
        status,
        total: model.total,
        item_count,
        items,
        address: address.map(address_from_entity),
        note: model.note,
        checked_out_at: model.checked_out_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: Some(model.created_at.with_timezone(&Utc)),
        updated_at: Some(model.updated_at.with_timezone(&Utc)),
    })
}

fn line_from_entity(item: CartItemModel, product: Option<ProductModel>) -> CartLine {
    let (product_name, product_slug, image_url) = match product {
        Some(p) => (p.name, p.slug, p.image_url),
        None => (String::new(), String::new(), None),
    };
    CartLine {
        id: item.id,
        product_id: item.product_id,
        product_name,
        product_slug,
        image_url,
        quantity: item.quantity,
        price: item.price,
        line_total: pricing::line_total(item.price, item.quantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> sea_orm::prelude::DateTimeWithTimeZone {
        Utc::now().into()
    }

    fn cart(status: &str) -> CartModel {
        CartModel {
            id: Uuid::new_v4(),
            session_id: Some("visitor-0001".into()),
            user_id: None,
            status: status.into(),
            total: 300_000,
            address_id: None,
            note: None,
            checked_out_at: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn line(cart_id: Uuid, price: i64, quantity: i32) -> (CartItemModel, Option<ProductModel>) {
        let product = ProductModel {
            id: Uuid::new_v4(),
            name: "Nhớt Motul 300V".into(),
            slug: "nhot-motul-300v".into(),
            sku: None,
            description: None,
            content: None,
            price,
            sale_price: None,
            category_id: None,
            image_url: Some("/img/motul.jpg".into()),
            is_active: true,
            is_featured: false,
            created_at: ts(),
            updated_at: ts(),
        };
        let item = CartItemModel {
            id: Uuid::new_v4(),
            cart_id,
            product_id: product.id,
            quantity,
            price,
            created_at: ts(),
            updated_at: ts(),
        };
        (item, Some(product))
    }

    #[test]
    fn view_carries_lines_totals_and_counts() {
        let model = cart("CHECKOUT");
        let lines = vec![line(model.id, 100_000, 3)];
        let view = cart_from_entity(model, lines, None).unwrap();
        assert_eq!(view.status, CartStatus::Checkout);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items[0].line_total, 300_000);
        assert_eq!(view.items[0].product_slug, "nhot-motul-300v");
        assert_eq!(view.total, 300_000);
    }

    #[test]
    fn unknown_status_is_an_internal_error() {
        let err = cart_from_entity(cart("SHIPPED"), Vec::new(), None).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
