//! Catalog maintenance. Trips referencing a removed place are left as they
//! are and report the place as dangling.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

use super::{ApiJson, ApiPath};
use crate::{
    error::AppError,
    models::place::{NewPlace, Place, PlaceId},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/places", post(insert_place))
        .route("/places/:id", delete(remove_place))
}

async fn insert_place(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewPlace>,
) -> Result<(StatusCode, Json<Place>), AppError> {
    let place = state.itinerary.insert_place(body).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

async fn remove_place(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, AppError> {
    state.itinerary.remove_catalog_place(PlaceId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
