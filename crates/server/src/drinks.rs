//! The drink button endpoints.
//!
//! These are the only mutating routes outside the identity gate: a prepaid
//! key is a credential of its own, so the point of sale can post here
//! without any login.

use api_types::drink::{DrinkReceiptView, DrinkRequest, RevertRequest, RevertResponse};
use axum::{Json, extract::State};
use axum_extra::TypedHeader;

use crate::{
    ServerError,
    server::{RemoteGroups, RemoteUser, ServerState, principal_from},
    views,
};
use engine::{DrinkTarget, MoneyCents};

fn parse_price(price: Option<&str>, fallback: MoneyCents) -> Result<MoneyCents, ServerError> {
    match price {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(fallback),
    }
}

fn target_from(
    user_key: Option<String>,
    account: Option<api_types::AccountKind>,
) -> DrinkTarget {
    match user_key {
        Some(key) => DrinkTarget::ByKey(key),
        None => match account.unwrap_or(api_types::AccountKind::Postpaid) {
            api_types::AccountKind::Postpaid => DrinkTarget::SelfPostpaid,
            api_types::AccountKind::Prepaid => DrinkTarget::SelfPrepaid,
        },
    }
}

pub async fn drink(
    State(state): State<ServerState>,
    user: Option<TypedHeader<RemoteUser>>,
    groups: Option<TypedHeader<RemoteGroups>>,
    Json(payload): Json<DrinkRequest>,
) -> Result<Json<DrinkReceiptView>, ServerError> {
    let principal = principal_from(user, groups);
    let price = parse_price(payload.price.as_deref(), state.drink_cost)?;
    let target = target_from(payload.user_key, payload.account);

    let receipt = state
        .engine
        .record_drink(principal.as_ref(), target, price, payload.drink_type)
        .await?;

    Ok(Json(views::receipt(receipt)))
}

pub async fn revert(
    State(state): State<ServerState>,
    user: Option<TypedHeader<RemoteUser>>,
    groups: Option<TypedHeader<RemoteGroups>>,
    Json(payload): Json<RevertRequest>,
) -> Result<Json<RevertResponse>, ServerError> {
    let principal = principal_from(user, groups);
    let price = parse_price(payload.price.as_deref(), state.drink_cost)?;
    let target = target_from(payload.user_key, payload.account);

    let money = state
        .engine
        .revert_last_drink(principal.as_ref(), target, price)
        .await?;

    Ok(Json(RevertResponse {
        money_cents: money.cents(),
        money: money.to_string(),
    }))
}
