//! Prepaid account endpoints.

use api_types::{
    postpaid::{ToggleRequest, ToggleResponse},
    prepaid::{DeleteRequest, PrepaidNewRequest, PrepaidView, TopUpRequest},
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, views};
use engine::{AccountKind, MoneyCents, Principal};

pub async fn add(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PrepaidNewRequest>,
) -> Result<(StatusCode, Json<PrepaidView>), ServerError> {
    let start_money = match payload.start_money.as_deref() {
        Some(raw) => raw.parse()?,
        None => MoneyCents::ZERO,
    };
    let created = state
        .engine
        .add_prepaid_user(&principal, &payload.username, start_money)
        .await?;
    Ok((StatusCode::CREATED, Json(views::prepaid(created))))
}

pub async fn top_up(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<TopUpRequest>,
) -> Result<Json<PrepaidView>, ServerError> {
    let amount: MoneyCents = payload.amount.parse()?;
    let updated = state
        .engine
        .add_prepaid_money(&principal, &payload.username, amount)
        .await?;
    Ok(Json(views::prepaid(updated)))
}

pub async fn toggle_activated(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ServerError> {
    let activated = state
        .engine
        .toggle_activated(&principal, AccountKind::Prepaid, &payload.username)
        .await?;
    Ok(Json(ToggleResponse {
        username: payload.username,
        activated,
    }))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<DeleteRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_prepaid_user(&principal, &payload.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
