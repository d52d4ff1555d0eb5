use axum::{
    Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::checkout::{CheckoutRequest, CheckoutResponse, OrderList},
    error::AppResult,
    middleware::{
        auth::{AuthUser, RequestContext, cart_session_cookie},
        json::Json,
    },
    models::Cart,
    response::ApiResponse,
    routes::{auth::set_cookie, params::OrderListQuery},
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(checkout))
}

pub fn orders_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Cart moved to CHECKOUT; sets the cart_session cookie for new visitors", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Validation failed or cart is empty"),
        (status = 404, description = "Product or saved address not found"),
        (status = 409, description = "Cart already checked out"),
    ),
    security((), ("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(HeaderMap, Json<ApiResponse<CheckoutResponse>>)> {
    let outcome = checkout_service::checkout(&state, &ctx, payload).await?;

    let mut headers = HeaderMap::new();
    if let Some(session_id) = outcome.new_session.as_deref() {
        set_cookie(&mut headers, &cart_session_cookie(&state.config, session_id))?;
    }
    Ok((headers, Json(outcome.response)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders placed by the current user", body = ApiResponse<OrderList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = checkout_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with lines", body = ApiResponse<Cart>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let resp = checkout_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}
