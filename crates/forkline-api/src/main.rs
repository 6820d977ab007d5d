//! Forkline API server.
//!
//! The storage engine and identity provider are external collaborators;
//! this binary wires the in-memory backends, which is what local
//! development and the test suite run against. A deployment swaps them
//! for the hosted implementations at [`forkline_api::AppState::new`].

use forkline_api::state::InMemoryApp;
use forkline_types::CoreConfig;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let app = InMemoryApp::new(config);
    forkline_api::serve(app.state).await
}
