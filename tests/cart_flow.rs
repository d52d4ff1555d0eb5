mod common;

use common::{add, address, category, create_product, create_user, shipping};
use hoangtri_moto_api::{
    dto::{
        addresses::UpdateAddressRequest,
        admin::UpdateCartStatusRequest,
        categories::UpdateCategoryRequest,
        checkout::CheckoutRequest,
    },
    error::AppError,
    middleware::auth::{ROLE_ADMIN, ROLE_USER, RequestContext},
    models::CartStatus,
    services::{
        address_service, admin_service, cart_service, category_service, checkout_service,
    },
};
use uuid::Uuid;

// Storefront flow against a real database: cart pricing, checkout, saved
// addresses and category hierarchy rules.
#[tokio::test]
async fn cart_checkout_address_and_category_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let customer = create_user(&state, "khach", ROLE_USER).await?;
    let admin = create_user(&state, "quanly", ROLE_ADMIN).await?;

    // Two additions of one product merge into a single line.
    let helmet = create_product(&state, "Mũ bảo hiểm 3/4", 100_000, None).await?;
    let visitor = RequestContext::anonymous(None);
    let first = cart_service::add_to_cart(&state, &visitor, add(helmet, 2)).await?;
    let session_id = first.new_session.clone().expect("new visitor gets a session id");
    let cart = first.response.data.expect("cart");
    assert_eq!(cart.total, 200_000);
    assert_eq!(cart.items.len(), 1);

    let visitor = RequestContext::anonymous(Some(session_id.clone()));
    let second = cart_service::add_to_cart(&state, &visitor, add(helmet, 1)).await?;
    assert!(second.new_session.is_none());
    let cart = second.response.data.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.total, 300_000);

    let placed = checkout_service::checkout(&state, &visitor, shipping()).await?;
    assert!(placed.new_session.is_none());
    let placed = placed.response.data.expect("checkout response");
    assert!(placed.success);
    assert_eq!(placed.cart.status, CartStatus::Checkout);
    assert_eq!(placed.cart.total, 300_000);
    assert!(placed.cart.checked_out_at.is_some());
    assert_eq!(
        placed.cart.address.as_ref().map(|a| a.ward.as_str()),
        Some("Phường 7")
    );

    // A checked-out cart is no longer the visitor's cart.
    let after = cart_service::get_cart(&state, &visitor).await?;
    assert!(after.data.expect("cart").id.is_none());

    // Empty checkout is rejected.
    let empty_visitor = RequestContext::anonymous(Some(format!("empty-{}", Uuid::new_v4())));
    let rejected = checkout_service::checkout(&state, &empty_visitor, shipping()).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    // Sale price below list price is captured on the line.
    let oil = create_product(&state, "Nhớt Motul 1L", 100_000, Some(85_000)).await?;
    let member = RequestContext::for_user(customer.clone(), None);
    let cart = cart_service::add_to_cart(&state, &member, add(oil, 2))
        .await?
        .response
        .data
        .expect("cart");
    assert_eq!(cart.user_id, Some(customer.user_id));
    assert_eq!(cart.items[0].price, 85_000);
    assert_eq!(cart.total, 170_000);

    // Setting a default address unsets the previous one.
    let home = address_service::create_address(&state, &customer, address("Nhà")).await?;
    let home = home.data.expect("address");
    assert!(home.is_default);
    let shop = address_service::create_address(&state, &customer, address("Cửa hàng")).await?;
    let shop = shop.data.expect("address");
    assert!(!shop.is_default);

    address_service::set_default(&state, &customer, shop.id).await?;
    let listed = address_service::list_addresses(&state, &customer)
        .await?
        .data
        .expect("addresses");
    let defaults: Vec<Uuid> = listed
        .items
        .iter()
        .filter(|a| a.is_default)
        .map(|a| a.id)
        .collect();
    assert_eq!(defaults, vec![shop.id]);

    // The order keeps its own copy of a reused saved address.
    let order = checkout_service::checkout(
        &state,
        &member,
        CheckoutRequest {
            address_id: Some(shop.id),
            ..Default::default()
        },
    )
    .await?
    .response
    .data
    .expect("checkout response")
    .cart;
    let order_id = order.id.expect("order id");
    let shipped_to = order.address.expect("shipping address");
    assert_ne!(shipped_to.id, shop.id);
    assert_eq!(shipped_to.user_id, None);
    assert_eq!(shipped_to.address, "34 Trần Hưng Đạo");

    address_service::update_address(
        &state,
        &customer,
        shop.id,
        UpdateAddressRequest {
            name: None,
            phone: None,
            address: Some("999 Đường Mới".into()),
            city: None,
            district: None,
            ward: None,
            is_default: None,
        },
    )
    .await?;
    address_service::delete_address(&state, &customer, shop.id).await?;

    let kept = checkout_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(
        kept.address.map(|a| a.address),
        Some("34 Trần Hưng Đạo".to_string())
    );
    let book: Vec<Uuid> = address_service::list_addresses(&state, &customer)
        .await?
        .data
        .expect("addresses")
        .items
        .iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(book, vec![home.id]);

    // Admins move placed orders forward but cannot check out a live cart.
    let completed = admin_service::update_order_status(
        &state,
        &admin,
        order_id,
        UpdateCartStatusRequest {
            status: CartStatus::Completed,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(completed.status, CartStatus::Completed);

    let browsing = RequestContext::anonymous(Some(format!("browse-{}", Uuid::new_v4())));
    let live = cart_service::add_to_cart(&state, &browsing, add(helmet, 1))
        .await?
        .response
        .data
        .expect("cart");
    let forced = admin_service::update_order_status(
        &state,
        &admin,
        live.id.expect("cart id"),
        UpdateCartStatusRequest {
            status: CartStatus::Checkout,
        },
    )
    .await;
    assert!(matches!(forced, Err(AppError::BadRequest(_))));

    // A category cannot be its own parent, nor the child of its descendant.
    let parts = category_service::create_category(&state, &admin, category("Phụ tùng", None))
        .await?
        .data
        .expect("category");
    let brakes =
        category_service::create_category(&state, &admin, category("Phanh", Some(parts.id)))
            .await?
            .data
            .expect("category");
    assert_eq!(brakes.parent_id, Some(parts.id));

    let self_parent = category_service::update_category(
        &state,
        &admin,
        parts.id,
        UpdateCategoryRequest {
            parent_id: Some(Some(parts.id)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(self_parent, Err(AppError::BadRequest(_))));

    let cycle = category_service::update_category(
        &state,
        &admin,
        parts.id,
        UpdateCategoryRequest {
            parent_id: Some(Some(brakes.id)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(cycle, Err(AppError::BadRequest(_))));

    // Customers cannot reach admin operations.
    let forbidden =
        category_service::create_category(&state, &customer, category("Đèn", None)).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    Ok(())
}
