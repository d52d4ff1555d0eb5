use hoangtri_moto_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    middleware::auth::{ROLE_ADMIN, ROLE_USER},
    services::auth_service::hash_password,
    slug::slugify,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(&pool)).await?;

    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_id = ensure_user(&pool, "admin", &admin_password, ROLE_ADMIN).await?;
    let user_id = ensure_user(&pool, "khachhang", "khach123", ROLE_USER).await?;

    let parts = ensure_category(&pool, "Phụ tùng", "product", None).await?;
    let oil = ensure_category(&pool, "Dầu nhớt", "product", Some(parts)).await?;
    let tires = ensure_category(&pool, "Vỏ xe", "product", Some(parts)).await?;
    let repair = ensure_category(&pool, "Sửa chữa", "service", None).await?;
    ensure_category(&pool, "Tin tức", "news", None).await?;

    seed_products(&pool, oil, tires).await?;
    seed_services(&pool, repair).await?;
    seed_settings(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    name: &str,
    kind: &str,
    parent_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let slug = slugify(name);
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, kind, parent_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ON CONSTRAINT categories_kind_slug DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&slug)
    .bind(kind)
    .bind(parent_id)
    .fetch_one(pool)
    .await?;

    println!("Ensured {kind} category {slug}");
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, oil: Uuid, tires: Uuid) -> anyhow::Result<()> {
    let products = vec![
        ("Nhớt Motul 300V 1L", "NH-300V", 420000_i64, Some(390000_i64), oil, true),
        ("Nhớt Castrol Power1 0.8L", "NH-CP1", 135000, None, oil, false),
        ("Vỏ Michelin Pilot Street 80/90-17", "VO-MPS17", 650000, Some(600000), tires, true),
        ("Vỏ IRC NR73 90/80-14", "VO-IRC14", 380000, None, tires, false),
    ];

    for (name, sku, price, sale_price, category_id, featured) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, sku, price, sale_price, category_id, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .bind(sku)
        .bind(price)
        .bind(sale_price)
        .bind(category_id)
        .bind(featured)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_services(pool: &sqlx::PgPool, repair: Uuid) -> anyhow::Result<()> {
    let services = vec![
        ("Thay nhớt và vệ sinh lọc gió", Some(50000_i64)),
        ("Bảo dưỡng định kỳ", Some(150000)),
        ("Sửa hệ thống điện", None),
    ];

    for (idx, (name, price_from)) in services.into_iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO services (id, name, slug, price_from, category_id, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slugify(name))
        .bind(price_from)
        .bind(repair)
        .bind(idx as i32)
        .execute(pool)
        .await?;
    }

    println!("Seeded services");
    Ok(())
}

async fn seed_settings(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO store_settings (id, store_name, phone, working_hours)
        VALUES (1, $1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind("Hoàng Trí Moto")
    .bind("0909 000 000")
    .bind("07:30 - 18:00, Thứ 2 - Chủ nhật")
    .execute(pool)
    .await?;

    println!("Seeded store settings");
    Ok(())
}
