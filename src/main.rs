//! Pizzeria Delivery API server
//! Mission: Wire config, storage, auth, and routes together and serve

use anyhow::{Context, Result};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Json, Router,
};
use dotenv::dotenv;
use pizzeria_backend::{
    auth::{api as auth_api, auth_middleware, AuthState, TokenService, UserStore},
    db,
    middleware::request_logging,
    orders::{api as orders_api, OrderStore, OrdersState},
};
use serde_json::json;
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Process configuration, read from the environment once at startup and
/// handed to the components that need it.
#[derive(Debug, Clone)]
struct AppConfig {
    bind_addr: String,
    db_path: String,
    secret_key: String,
    access_token_minutes: i64,
    refresh_token_days: i64,
}

impl AppConfig {
    fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8181".to_string());
        let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "pizzeria.db".to_string());

        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| {
            "dev-secret-change-in-production-minimum-32-characters".to_string()
        });

        let access_token_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .context("Invalid ACCESS_TOKEN_EXPIRE_MINUTES")?;

        let refresh_token_days = env::var("REFRESH_TOKEN_EXPIRE_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()
            .context("Invalid REFRESH_TOKEN_EXPIRE_DAYS")?;

        Ok(Self {
            bind_addr,
            db_path,
            secret_key,
            access_token_minutes,
            refresh_token_days,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    let _ = dotenv();
    init_tracing();

    let config = AppConfig::from_env()?;

    info!("🍕 Pizzeria Delivery API starting");

    let db = db::open(&config.db_path)?;
    let user_store = Arc::new(UserStore::new(db.clone())?);
    let order_store = Arc::new(OrderStore::new(db));
    let tokens = Arc::new(TokenService::new(
        config.secret_key.clone(),
        config.access_token_minutes,
        config.refresh_token_days,
    ));

    info!("🔐 Authentication initialized");

    let auth_state = AuthState { user_store, tokens };
    let orders_state = OrdersState { order_store };

    let app = build_router(auth_state, orders_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn build_router(auth_state: AuthState, orders_state: OrdersState) -> Router {
    let public_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check));

    let auth_public = Router::new()
        .route("/auth/", get(auth_api::auth_index))
        .route("/auth/signup", post(auth_api::signup))
        .route("/auth/login", post(auth_api::login))
        .with_state(auth_state.clone());

    let auth_protected = Router::new()
        .route("/auth/message", get(auth_api::auth_message))
        .route("/auth/refresh", get(auth_api::refresh_token))
        .route_layer(from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(auth_state.clone());

    let order_routes = Router::new()
        .route(
            "/orders/",
            post(orders_api::place_order).get(orders_api::list_all_orders),
        )
        .route("/orders/:id", get(orders_api::get_order_by_id))
        .route("/orders/user/orders", get(orders_api::list_user_orders))
        .route("/orders/user/order/:id", get(orders_api::get_user_order))
        .route("/orders/update/:id", put(orders_api::update_order))
        .route("/orders/status/:id", put(orders_api::update_order_status))
        .route("/orders/delete/:id", delete(orders_api::delete_order))
        .route_layer(from_fn_with_state(auth_state, auth_middleware))
        .with_state(orders_state);

    Router::new()
        .merge(public_routes)
        .merge(auth_public)
        .merge(auth_protected)
        .merge(order_routes)
        .layer(CorsLayer::permissive())
        .layer(from_fn(request_logging))
}

/// Welcome endpoint
async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the Pizza Delivery API!",
    }))
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Initialize tracing with env-filterable output
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pizzeria_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
