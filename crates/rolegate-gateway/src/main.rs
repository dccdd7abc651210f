//! rolegate gateway binary.
//!
//! - Config: `ROLEGATE_CONFIG` (default `rolegate.yaml`), strict YAML
//! - Startup validation of every route; any failure exits before binding
//! - Bearer authentication + per-route authorization on configured routes

use std::fmt::Display;

use tracing_subscriber::{fmt, EnvFilter};

use rolegate_gateway::{app_state, config, router};

fn fatal(what: &str, err: impl Display) -> ! {
    tracing::error!(error = %err, "{what}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("ROLEGATE_CONFIG").unwrap_or_else(|_| "rolegate.yaml".to_string());
    let cfg = config::load_from_file(&path).unwrap_or_else(|e| fatal("config load failed", e));
    let listen = cfg
        .server
        .listen_addr()
        .unwrap_or_else(|e| fatal("invalid listen address", e));

    let state = app_state::AppState::new(cfg).unwrap_or_else(|e| fatal("startup validation failed", e));
    let app = router::build_router(state);

    tracing::info!(%listen, "rolegate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .unwrap_or_else(|e| fatal("failed to bind", e));

    if let Err(e) = axum::serve(listener, app).await {
        fatal("server failed", e);
    }
}
