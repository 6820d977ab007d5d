//! Timer-triggered endpoints: anomaly monitor and auto-cancel sweep.
//!
//! The external scheduler authenticates with a static bearer secret,
//! compared in constant time. No session, no role — these are
//! machine-to-machine routes.

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use forkline_audit::MonitorSummary;
use forkline_lifecycle::SweepReport;
use forkline_types::ForklineError;
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

fn require_cron_secret(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ForklineError::Unauthorized)?;
    let matches: bool = presented
        .as_bytes()
        .ct_eq(state.config.cron_secret.as_bytes())
        .into();
    if matches {
        Ok(())
    } else {
        Err(ForklineError::Unauthorized.into())
    }
}

pub async fn run_monitor(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MonitorSummary>, ApiError> {
    require_cron_secret(&state, &headers)?;
    let summary = state.monitor.run().await?;
    Ok(Json(summary))
}

pub async fn run_sweep(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SweepReport>, ApiError> {
    require_cron_secret(&state, &headers)?;
    let report = state.sweeper.run().await?;
    Ok(Json(report))
}
