//! # forkline-api
//!
//! The HTTP surface over the Forkline core. Every privileged route runs
//! the same pipeline: rate limiter (auth routes only) → session & role
//! guard → persisted-state read → transition check → conditioned write →
//! audit append. Handlers contain no business logic of their own — they
//! translate HTTP to engine calls and map the error taxonomy onto status
//! codes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/admin/orders", get(routes::admin::list_orders))
        .route("/admin/orders/:id", get(routes::admin::get_order))
        .route(
            "/admin/orders/:id/confirm-payment",
            post(routes::admin::confirm_payment),
        )
        .route("/admin/orders/:id/status", post(routes::admin::update_status))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/callback", get(routes::auth::callback))
        .route("/internal/monitor", post(routes::internal::run_monitor))
        .route("/internal/sweep", post(routes::internal::run_sweep))
        .route("/account/export", get(routes::export::export_account))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until ctrl-c / SIGTERM.
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
