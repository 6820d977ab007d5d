//! Self-service personal-data export.
//!
//! Any authenticated caller may download their own profile and order
//! history — and nothing else. Scoping is by the resolved identity,
//! never by a caller-supplied id. The export itself is a privileged read
//! of personal data, so it lands in the audit trail too.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use forkline_types::{Actor, AuditAction, AuditEntry, Order, Role, UserId};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;
use crate::extract::{client_ip, session_token};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub profile: ExportProfile,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct ExportProfile {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

pub async fn export_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // Any role — but only for the caller's own data.
    let identity = state.guard.authenticate(session_token(&headers)).await?;
    let orders = state.orders.for_customer(identity.user_id).await?;

    state
        .audit
        .record(AuditEntry::new(
            AuditAction::CustomerDataExported,
            &Actor::User(identity.clone()),
            "customer",
            identity.user_id.to_string(),
            client_ip(&headers),
            json!({ "order_count": orders.len() }),
        ))
        .await;

    let document = ExportDocument {
        exported_at: Utc::now(),
        profile: ExportProfile {
            user_id: identity.user_id,
            email: identity.email,
            role: identity.role,
        },
        orders,
    };

    let mut response = Json(document).into_response();
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"forkline-export.json\""),
    );
    Ok(response)
}
