pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod services;
pub mod signature;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{AllowedOrigins, Config};
use crate::gateway::PaystackClient;
use crate::services::PaymentService;
use crate::signature::WebhookVerifier;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub payments: PaymentService,
    pub verifier: WebhookVerifier,
}

impl AppState {
    /// Wires the service graph from one pool and one immutable config.
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let gateway = PaystackClient::new(
            config.paystack_base_url.clone(),
            config.paystack_secret_key.clone(),
        );
        let payments = PaymentService::new(db.clone(), gateway);
        let verifier = WebhookVerifier::new(config.paystack_webhook_secret.clone());

        AppState {
            db,
            config,
            payments,
            verifier,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/pay/initiate", post(handlers::payments::initiate))
        .route("/pay/verify/:reference", get(handlers::payments::verify))
        .route("/pay/webhook", post(handlers::webhook::webhook))
        .route("/admin/transactions", get(handlers::admin::list_transactions))
        .route("/admin/clear_pending", post(handlers::admin::clear_pending))
        .route("/receipt/:id", get(handlers::receipts::get_receipt))
        .layer(cors)
        .layer(axum::middleware::from_fn(
            middleware::request_logger_middleware,
        ))
        .with_state(state)
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            layer.allow_origin(origins)
        }
    }
}
