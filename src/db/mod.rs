use crate::config::Config;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub mod models;
pub mod queries;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

pub async fn create_pool(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
}
