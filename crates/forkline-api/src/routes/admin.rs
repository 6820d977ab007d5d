//! Privileged order mutation endpoints (role = admin).
//!
//! Every handler re-runs the session & role guard — nothing here trusts
//! an earlier request's authorization.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use forkline_types::{Actor, Order, OrderId, OrderStatus, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{client_ip, session_token};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentBody {
    pub payment_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
    pub cancellation_reason: Option<String>,
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Actor, ApiError> {
    let identity = state
        .guard
        .authenticate_role(session_token(headers), Role::Admin)
        .await?;
    Ok(Actor::User(identity))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    require_admin(&state, &headers).await?;
    let order = state.engine.fetch(OrderId(id)).await?;
    Ok(Json(order))
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<OrderList>, ApiError> {
    require_admin(&state, &headers).await?;
    let filter = params
        .status
        .as_deref()
        .map(OrderStatus::parse)
        .transpose()?;
    let page = params.page.unwrap_or(1).max(1);
    let orders = state.engine.list(filter, page).await?;
    Ok(Json(OrderList { orders, page }))
}

pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<ConfirmPaymentBody>,
) -> Result<Json<Order>, ApiError> {
    let actor = require_admin(&state, &headers).await?;
    let order = state
        .engine
        .confirm_payment(
            OrderId(id),
            body.payment_reference,
            &actor,
            client_ip(&headers),
        )
        .await?;
    Ok(Json(order))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Order>, ApiError> {
    let actor = require_admin(&state, &headers).await?;
    let requested = OrderStatus::parse(&body.status)?;
    let order = state
        .engine
        .apply_transition(
            OrderId(id),
            requested,
            &actor,
            client_ip(&headers),
            body.cancellation_reason,
        )
        .await?;
    Ok(Json(order))
}
