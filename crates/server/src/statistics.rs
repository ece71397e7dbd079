//! Statistics and drink catalog endpoints.

use api_types::{
    catalog::{DrinkTypeNewRequest, DrinkTypeView, DrinkTypesResponse, SetQuantityRequest},
    stats::StatsResponse,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, views};
use engine::Principal;

/// The full administrative overview: both ledgers plus the catalog.
pub async fn get_stats(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<StatsResponse>, ServerError> {
    let postpaid = state.engine.list_postpaid_users(&principal).await?;
    let prepaid = state.engine.list_prepaid_users(&principal).await?;
    let drink_types = state.engine.list_drink_types().await?;

    Ok(Json(StatsResponse {
        postpaid: postpaid.into_iter().map(views::postpaid).collect(),
        prepaid: prepaid.into_iter().map(views::prepaid).collect(),
        drink_types: drink_types.into_iter().map(views::drink_type).collect(),
    }))
}

/// Public catalog read for the point of sale.
pub async fn list_drink_types(
    State(state): State<ServerState>,
) -> Result<Json<DrinkTypesResponse>, ServerError> {
    let drink_types = state.engine.list_drink_types().await?;
    Ok(Json(DrinkTypesResponse {
        drink_types: drink_types.into_iter().map(views::drink_type).collect(),
    }))
}

pub async fn add_drink_type(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<DrinkTypeNewRequest>,
) -> Result<(StatusCode, Json<DrinkTypeView>), ServerError> {
    let created = state
        .engine
        .add_drink_type(
            &principal,
            &payload.name,
            &payload.icon,
            payload.quantity.unwrap_or(0),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::drink_type(created))))
}

pub async fn set_drink_type_quantity(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<SetQuantityRequest>,
) -> Result<Json<DrinkTypeView>, ServerError> {
    let updated = state
        .engine
        .set_drink_type_quantity(&principal, payload.id, payload.quantity)
        .await?;
    Ok(Json(views::drink_type(updated)))
}
