use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use phoenix_activator::chain::rpc::EosRpcClient;
use phoenix_activator::config::Config;
use phoenix_activator::middleware::rate_limit::RateLimiter;
use phoenix_activator::{build_app, AppState};

fn build_cors(config: &Config) -> CorsLayer {
    let origin = match &config.cors_origins {
        Some(list) => {
            let origins: Vec<_> = list.iter().filter_map(|o| o.parse().ok()).collect();
            AllowOrigin::list(origins)
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let creator = config.creator.clone().unwrap_or_else(|| {
        panic!(
            "{} must be set as 'creator;permission;signingPublicKey'",
            config.network.account_var()
        )
    });

    let chain = EosRpcClient::new(
        &config.endpoint,
        &config.signer_url,
        &creator.signing_key,
        Duration::from_secs(config.rpc_timeout_secs),
    )
    .expect("Failed to build RPC client");

    tracing::info!(
        network = %config.network,
        endpoint = %config.endpoint,
        creator = %creator.account,
        mode = ?config.endpoint_mode,
        "Chain client initialized"
    );

    let state = AppState {
        chain: Arc::new(chain),
        rate_limiter: RateLimiter::new(
            config.rate_limit_threshold_ms,
            config.rate_limit_max_per_day,
        ),
        endpoint_mode: config.endpoint_mode,
        network: config.network,
        creator: creator.account.parse().expect("Invalid creator account name"),
        permission: creator.permission.parse().expect("Invalid creator permission name"),
    };

    let cors = build_cors(&config);

    let app = build_app(state)
        .layer(RequestBodyLimitLayer::new(config.max_payload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_request(trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    trace::DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        )
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        network = %config.network,
        "Starting server on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutting down...");
}
