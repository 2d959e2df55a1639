use std::path::Path;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir().join(format!("lokapasar_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", dir.display())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Inserts a product row (and optional variants) directly, bypassing any catalog admin surface, so order flow
/// tests have something to price against.
pub async fn seed_product(
    db: &SqliteDatabase,
    id: i64,
    title: &str,
    price: i64,
    discount_percent: i64,
    variants: &[(i64, &str, Option<i64>)],
) {
    sqlx::query(
        r#"INSERT INTO products (id, title, price, discount_percent, weight) VALUES ($1, $2, $3, $4, 250)"#,
    )
    .bind(id)
    .bind(title)
    .bind(price)
    .bind(discount_percent)
    .execute(db.pool())
    .await
    .expect("Error seeding product");
    for (vid, value, vprice) in variants {
        sqlx::query(r#"INSERT INTO product_variants (id, product_id, value, price) VALUES ($1, $2, $3, $4)"#)
            .bind(vid)
            .bind(id)
            .bind(value)
            .bind(vprice)
            .execute(db.pool())
            .await
            .expect("Error seeding product variant");
    }
}
