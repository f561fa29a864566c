//! # Admin seeder
//!
//! Creates the first `super_admin` account so the API can be logged into.
//! Running it again is a no-op while the email already exists.
//!
//! ```bash
//! SEED_ADMIN_EMAIL=admin@example.com SEED_ADMIN_PASSWORD=change-me cargo run --bin seed
//! ```
//!
//! `SEED_ADMIN_NAME` defaults to `Administrator`.

use std::env;

use dotenvy::dotenv;
use stockroom_api::auth::password::hash_password;
use stockroom_api::config::AppConfig;
use stockroom_api::database;
use stockroom_api::models::user::ROLE_SUPER_ADMIN;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Seeding failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let email = env::var("SEED_ADMIN_EMAIL").map_err(|_| "SEED_ADMIN_EMAIL must be set")?;
    let password = env::var("SEED_ADMIN_PASSWORD").map_err(|_| "SEED_ADMIN_PASSWORD must be set")?;
    let name = env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());

    if password.len() < 6 {
        return Err("SEED_ADMIN_PASSWORD must be at least 6 characters".into());
    }

    let pool = database::create_pool(&config).await?;
    database::run_migrations(&pool).await?;

    let password_hash = hash_password(&password)?;
    let inserted = sqlx::query(
        "INSERT INTO users (name, email, password_hash, role_id)
         SELECT $1, $2, $3, id FROM roles WHERE name = $4
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(&name)
    .bind(email.trim())
    .bind(password_hash)
    .bind(ROLE_SUPER_ADMIN)
    .execute(&pool)
    .await?
    .rows_affected();

    if inserted == 0 {
        tracing::info!(%email, "Admin already exists, nothing to do");
    } else {
        tracing::info!(%email, "Admin user created");
    }
    Ok(())
}
