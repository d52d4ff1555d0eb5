mod common;

use common::{PASSWORD, add, create_product, create_user, set, shipping};
use hoangtri_moto_api::{
    dto::{
        auth::LoginRequest,
        checkout::{CheckoutItem, CheckoutRequest},
    },
    middleware::auth::{ROLE_USER, RequestContext},
    models::CartStatus,
    services::{auth_service, cart_service, checkout_service},
};
use uuid::Uuid;

// Cart ownership across sign-in, forced quantities and concurrent writers.
#[tokio::test]
async fn cart_sessions_quantities_and_concurrency() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let chain = create_product(&state, "Nhông sên dĩa", 250_000, None).await?;
    let plug = create_product(&state, "Bugi NGK", 60_000, None).await?;

    // Forced quantities overwrite and every mutation refreshes the total.
    let visitor = RequestContext::anonymous(Some(format!("qty-{}", Uuid::new_v4())));
    cart_service::add_to_cart(&state, &visitor, add(chain, 2)).await?;
    let cart = cart_service::add_to_cart(&state, &visitor, set(chain, 1))
        .await?
        .response
        .data
        .expect("cart");
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.total, 250_000);

    cart_service::add_to_cart(&state, &visitor, add(plug, 3)).await?;
    let cart = cart_service::set_quantity(&state, &visitor, plug, 2)
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.total, 250_000 + 120_000);

    let cart = cart_service::remove_from_cart(&state, &visitor, chain)
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total, 120_000);

    let missing = cart_service::set_quantity(&state, &visitor, chain, 4).await;
    assert!(missing.is_err());

    let cart = cart_service::clear_cart(&state, &visitor)
        .await?
        .data
        .expect("cart");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);

    // Signing in hands an unowned session cart to the user.
    let rider = create_user(&state, "tayga", ROLE_USER).await?;
    let session = format!("login-{}", Uuid::new_v4());
    let guest = RequestContext::anonymous(Some(session.clone()));
    let guest_cart = cart_service::add_to_cart(&state, &guest, add(plug, 1))
        .await?
        .response
        .data
        .expect("cart");
    auth_service::login_user(&state, &guest, login("tayga")).await?;

    let signed_in = RequestContext::for_user(rider.clone(), None);
    let owned = cart_service::get_cart(&state, &signed_in)
        .await?
        .data
        .expect("cart");
    assert_eq!(owned.id, guest_cart.id);
    assert_eq!(owned.user_id, Some(rider.user_id));
    assert_eq!(owned.total, 60_000);

    // The session no longer reaches the user's cart once signed out.
    let signed_out = cart_service::get_cart(&state, &guest).await?.data.expect("cart");
    assert!(signed_out.id.is_none());

    // When both exist the user's own cart wins and the session cart is left alone.
    let other_session = format!("second-{}", Uuid::new_v4());
    let second_guest = RequestContext::anonymous(Some(other_session.clone()));
    let session_cart = cart_service::add_to_cart(&state, &second_guest, add(chain, 1))
        .await?
        .response
        .data
        .expect("cart");
    auth_service::login_user(&state, &second_guest, login("tayga")).await?;

    let both = RequestContext::for_user(rider.clone(), Some(other_session));
    let winner = cart_service::get_cart(&state, &both).await?.data.expect("cart");
    assert_eq!(winner.id, guest_cart.id);
    let untouched = cart_service::get_cart(&state, &second_guest)
        .await?
        .data
        .expect("cart");
    assert_eq!(untouched.id, session_cart.id);
    assert_eq!(untouched.user_id, None);

    // Racing additions of one product land on one line of one cart.
    for round in 0..5 {
        let racer = RequestContext::anonymous(Some(format!("race-{round}-{}", Uuid::new_v4())));
        let (left, right) = tokio::join!(
            cart_service::add_to_cart(&state, &racer, add(plug, 1)),
            cart_service::add_to_cart(&state, &racer, add(plug, 2)),
        );
        let left = left?.response.data.expect("cart");
        let right = right?.response.data.expect("cart");
        assert_eq!(left.id, right.id);

        let settled = cart_service::get_cart(&state, &racer).await?.data.expect("cart");
        assert_eq!(settled.items.len(), 1);
        assert_eq!(settled.items[0].quantity, 3);
        assert_eq!(settled.total, 180_000);
    }

    // Racing first writes for a signed-in user share the user's only cart.
    let racer = create_user(&state, "duaxe", ROLE_USER).await?;
    let member = RequestContext::for_user(racer, None);
    let (left, right) = tokio::join!(
        cart_service::add_to_cart(&state, &member, add(chain, 1)),
        cart_service::add_to_cart(&state, &member, add(plug, 1)),
    );
    let left = left?.response.data.expect("cart");
    let right = right?.response.data.expect("cart");
    assert_eq!(left.id, right.id);

    // A visitor without a cart can check out an item list and keeps a handle to it.
    let walk_in = RequestContext::anonymous(None);
    let outcome = checkout_service::checkout(
        &state,
        &walk_in,
        CheckoutRequest {
            items: Some(vec![CheckoutItem {
                product_id: chain,
                quantity: 2,
                price: Some(1),
            }]),
            ..shipping()
        },
    )
    .await?;
    let session_id = outcome.new_session.expect("session id for the new visitor");
    let order = outcome.response.data.expect("checkout response").cart;
    assert_eq!(order.session_id.as_deref(), Some(session_id.as_str()));
    assert_eq!(order.status, CartStatus::Checkout);
    assert_eq!(order.total, 500_000);

    Ok(())
}

fn login(username: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: PASSWORD.to_string(),
    }
}
