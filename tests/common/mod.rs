#![allow(dead_code)]

use hoangtri_moto_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::{
        addresses::CreateAddressRequest, cart::AddToCartRequest,
        categories::CreateCategoryRequest, checkout::CheckoutRequest,
    },
    entity::products::ActiveModel as ProductActive,
    middleware::auth::AuthUser,
    models::CategoryKind,
    pricing::QuantityMode,
    services::auth_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

pub const PASSWORD: &str = "matkhau123";

/// Database URL for integration flows, or `None` to skip them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 5).await?;
    let orm = orm_from_pool(&pool);
    run_migrations(&orm).await?;
    orm.execute(Statement::from_string(
        orm.get_database_backend(),
        "TRUNCATE cart_items, carts, addresses, product_images, products, contacts, services, \
         news, categories, audit_logs, users RESTART IDENTITY CASCADE"
            .to_string(),
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "integration-secret".into(),
        session_ttl_hours: 1,
        cookie_secure: false,
        cors_origin: None,
        db_max_connections: 5,
    };
    Ok(AppState::new(pool, orm, config))
}

pub async fn create_user(state: &AppState, username: &str, role: &str) -> anyhow::Result<AuthUser> {
    let user = auth_service::create_user(state, username, PASSWORD, None, None, role).await?;
    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
    })
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    sale_price: Option<i64>,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(hoangtri_moto_api::slug::slugify(name)),
        sku: Set(None),
        description: Set(None),
        content: Set(None),
        price: Set(price),
        sale_price: Set(sale_price),
        category_id: Set(None),
        image_url: Set(None),
        is_active: Set(true),
        is_featured: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

pub fn add(product_id: Uuid, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        product_id,
        quantity,
        mode: QuantityMode::Increment,
    }
}

pub fn set(product_id: Uuid, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        product_id,
        quantity,
        mode: QuantityMode::Set,
    }
}

pub fn shipping() -> CheckoutRequest {
    CheckoutRequest {
        name: "Nguyễn Văn A".into(),
        phone: "0901234567".into(),
        address: "12 Lê Lợi".into(),
        city: "TP. Hồ Chí Minh".into(),
        district: "Quận 3".into(),
        ward: "Phường 7".into(),
        ..Default::default()
    }
}

pub fn address(name: &str) -> CreateAddressRequest {
    CreateAddressRequest {
        name: name.to_string(),
        phone: "0912345678".into(),
        address: "34 Trần Hưng Đạo".into(),
        city: "Cần Thơ".into(),
        district: "Ninh Kiều".into(),
        ward: "An Cư".into(),
        is_default: false,
    }
}

pub fn category(name: &str, parent_id: Option<Uuid>) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name: name.to_string(),
        slug: None,
        kind: CategoryKind::Product,
        description: None,
        parent_id,
        sort_order: None,
        is_active: None,
    }
}
