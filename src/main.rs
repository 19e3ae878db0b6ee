use khidmap::core::db::{bootstrap_admin, init_pool, run_migrations};
use khidmap::{AppState, Config, create_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,khidmap=debug")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    config.print_info();

    let pool = init_pool(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;
    info!("Database ready");

    let state = Arc::new(AppState::new(
        pool,
        config.jwt_secret.clone(),
        config.jwt_ttl_hours,
    ));

    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            if let Err(e) = bootstrap_admin(&state, email, password).await {
                error!("Failed to bootstrap admin account: {:?}", e);
            }
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set to bootstrap an admin");
        }
        (None, None) => {}
    }

    let app = create_router(state)
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Any origin when `CORS_ORIGIN` is unset; otherwise that origin only, with credentials
fn cors_layer(config: &Config) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    use axum::http::{HeaderValue, Method, header};

    let Some(origin) = &config.cors_origin else {
        return Ok(CorsLayer::permissive());
    };

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(HeaderValue::from_str(origin)?))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::AUTHORIZATION])
        .allow_credentials(true))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
