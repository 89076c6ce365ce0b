use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{ApiPath, ApiQuery};
use crate::{
    error::AppError,
    models::place::{Place, PlaceId},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_places))
        .route("/:id", get(get_place))
}

#[derive(Deserialize)]
struct PlaceFilter {
    category: Option<String>,
}

async fn list_places(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PlaceFilter>,
) -> Json<Vec<Place>> {
    let listing = state.itinerary.list_places(filter.category.as_deref());
    Json(listing.iter().cloned().collect())
}

async fn get_place(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<Place>, AppError> {
    Ok(Json(state.itinerary.get_place(PlaceId(id))?))
}
