pub mod chain;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod naming;
pub mod util;
pub mod validation;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chain::name::Name;
use chain::network::Network;
use chain::ChainClient;
use middleware::rate_limit::RateLimiter;
use std::sync::Arc;
use validation::EndpointMode;

#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<dyn ChainClient>,
    pub rate_limiter: RateLimiter,
    pub endpoint_mode: EndpointMode,
    pub network: Network,
    /// Account paying for and authorizing new accounts.
    pub creator: Name,
    pub permission: Name,
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/activateAccount",
            post(handlers::accounts::activate_account),
        )
        .layer(axum_middleware::from_fn(
            middleware::client_ip::capture_client_ips,
        ))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Build the full application router (used by main and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(account_routes())
        .merge(health_routes())
        .with_state(state)
}
