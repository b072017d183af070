//! Shared setup for the HTTP-level tests: an app over in-memory SQLite with
//! a config pointing the gateway wherever the test needs it.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use serde_json::Value;
use sha2::Sha512;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use lutan_pay::config::{AllowedOrigins, Config};
use lutan_pay::{create_app, db, AppState};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn test_config(gateway_base_url: &str, webhook_secret: Option<&str>) -> Config {
    Config {
        server_port: 0,
        database_url: "sqlite::memory:".to_string(),
        paystack_public_key: "pk_test_public".to_string(),
        paystack_secret_key: "sk_test_secret".to_string(),
        paystack_webhook_secret: webhook_secret.map(String::from),
        paystack_base_url: gateway_base_url.to_string(),
        allowed_origins: AllowedOrigins::Any,
    }
}

pub async fn test_pool() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::MIGRATOR.run(&pool).await.unwrap();
    pool
}

pub async fn test_app(gateway_base_url: &str, webhook_secret: Option<&str>) -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let state = AppState::new(pool.clone(), test_config(gateway_base_url, webhook_secret));
    (create_app(state), pool)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn post_json(path: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

pub async fn receipt_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM receipts")
        .fetch_one(pool)
        .await
        .unwrap()
}
