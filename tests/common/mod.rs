#![allow(dead_code)]

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use stockroom_api::database::MIGRATOR;
use stockroom_api::models::user::ROLE_STAFF;
use uuid::Uuid;

/// Pool against `TEST_DATABASE_URL`, migrated. `None` when the variable is unset,
/// in which case database tests return early.
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    MIGRATOR.run(&pool).await.expect("run migrations");
    Some(pool)
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn role_id(pool: &PgPool, role: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Inserts a user with the given role and password and returns `(id, email)`.
pub async fn seed_user_with(pool: &PgPool, role: &str, password: &str) -> (i64, String) {
    let email = format!("{}@stockroom.test", unique("user"));
    let hash = bcrypt::hash(password, 4).unwrap();
    let id = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Test User")
    .bind(&email)
    .bind(hash)
    .bind(role_id(pool, role).await)
    .fetch_one(pool)
    .await
    .unwrap();
    (id, email)
}

pub async fn seed_user(pool: &PgPool) -> i64 {
    seed_user_with(pool, ROLE_STAFF, "password1").await.0
}

/// Inserts an item on its own category, warehouse and rack.
pub async fn seed_item(pool: &PgPool, stock: i32, price: Decimal) -> i64 {
    let category_id: i64 = sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(unique("cat"))
        .fetch_one(pool)
        .await
        .unwrap();
    let warehouse_id: i64 =
        sqlx::query_scalar("INSERT INTO warehouses (name, location) VALUES ($1, 'Dock 4, North Yard') RETURNING id")
            .bind(unique("wh"))
            .fetch_one(pool)
            .await
            .unwrap();
    let rack_id: i64 = sqlx::query_scalar("INSERT INTO racks (warehouse_id, code) VALUES ($1, 'A-01') RETURNING id")
        .bind(warehouse_id)
        .fetch_one(pool)
        .await
        .unwrap();

    sqlx::query_scalar(
        "INSERT INTO items (sku, name, category_id, rack_id, stock, minimum_stock, price)
         VALUES ($1, $2, $3, $4, $5, 0, $6) RETURNING id",
    )
    .bind(unique("SKU"))
    .bind(unique("Item"))
    .bind(category_id)
    .bind(rack_id)
    .bind(stock)
    .bind(price)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn stock_of(pool: &PgPool, item_id: i64) -> i32 {
    sqlx::query_scalar("SELECT stock FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn set_price(pool: &PgPool, item_id: i64, price: Decimal) {
    sqlx::query("UPDATE items SET price = $1 WHERE id = $2")
        .bind(price)
        .bind(item_id)
        .execute(pool)
        .await
        .unwrap();
}
