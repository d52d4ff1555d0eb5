use axum::Router;

use crate::state::AppState;

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod contacts;
pub mod content;
pub mod doc;
pub mod health;
pub mod news;
pub mod pages;
pub mod params;
pub mod products;
pub mod services;
pub mod settings;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/cart", cart::router())
        .nest("/checkout", checkout::router())
        .nest("/orders", checkout::orders_router())
        .nest("/addresses", addresses::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/services", services::router())
        .nest("/news", news::router())
        .nest("/pages", pages::router())
        .nest("/settings", settings::router())
        .nest("/contacts", contacts::router())
        .merge(content::router())
        .nest("/admin", admin::router())
}
