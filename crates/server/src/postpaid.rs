//! Postpaid account endpoints.

use api_types::postpaid::{MeResponse, PayUpRequest, SetMoneyRequest, ToggleRequest, ToggleResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, views};
use engine::{AccountKind, MoneyCents, Principal};

/// The caller's own ledger page: their postpaid record and the prepaid
/// accounts they sponsor.
pub async fn me(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<MeResponse>, ServerError> {
    let user = state.engine.postpaid_self(&principal).await?;
    // Non-members own no prepaid accounts by construction; show them an
    // empty list instead of a 403.
    let prepaid = if state.engine.policy().is_member(&principal) {
        state.engine.prepaid_users_for_owner(&principal).await?
    } else {
        Vec::new()
    };

    Ok(Json(MeResponse {
        user: views::postpaid(user),
        prepaid: prepaid.into_iter().map(views::prepaid).collect(),
    }))
}

pub async fn pay_up(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PayUpRequest>,
) -> Result<StatusCode, ServerError> {
    let amount: MoneyCents = payload.amount.parse()?;
    state
        .engine
        .pay_up(&principal, &payload.username, amount)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_money(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<SetMoneyRequest>,
) -> Result<Json<api_types::postpaid::PostpaidView>, ServerError> {
    let amount: MoneyCents = payload.amount.parse()?;
    let updated = state
        .engine
        .set_postpaid_money(&principal, &payload.username, amount)
        .await?;
    Ok(Json(views::postpaid(updated)))
}

pub async fn toggle_activated(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ServerError> {
    let activated = state
        .engine
        .toggle_activated(&principal, AccountKind::Postpaid, &payload.username)
        .await?;
    Ok(Json(ToggleResponse {
        username: payload.username,
        activated,
    }))
}
