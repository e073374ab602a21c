use axum::{Router, routing::get};
use meshcall_server::{SessionRegistry, ws_handler};
use std::env;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{Level, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Initializing signaling relay...");

    let addr: SocketAddr = env::var("MESHCALL_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3333".to_owned())
        .parse()
        .expect("MESHCALL_ADDR must be a socket address");
    let static_dir = env::var("MESHCALL_STATIC_DIR").unwrap_or_else(|_| "public".to_owned());

    let registry = SessionRegistry::new();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/ping", get(|| async { "pong" }))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(registry);

    info!("Signaling relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
