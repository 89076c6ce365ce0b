use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use super::{ApiJson, ApiPath};
use crate::{
    error::AppError,
    models::{
        place::PlaceId,
        trip::{NewTrip, Trip, TripDetail, TripId, TripPatch},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route(
            "/:id",
            get(get_trip).patch(update_trip).delete(delete_trip),
        )
        .route("/:id/detail", get(trip_detail))
        .route("/:id/places", post(add_place).put(reorder_places))
        .route("/:id/places/:place_id", delete(remove_place))
}

async fn list_trips(State(state): State<AppState>) -> Json<Vec<Trip>> {
    Json(state.itinerary.list_trips().await)
}

async fn create_trip(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewTrip>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let trip = state.itinerary.create_trip(body).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn get_trip(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.itinerary.get_trip(TripId(id)).await?))
}

async fn update_trip(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(patch): ApiJson<TripPatch>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.itinerary.update_trip(TripId(id), patch).await?))
}

async fn delete_trip(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<StatusCode, AppError> {
    state.itinerary.delete_trip(TripId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn trip_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<TripDetail>, AppError> {
    Ok(Json(state.itinerary.get_trip_detail(TripId(id)).await?))
}

#[derive(Deserialize)]
struct AddPlaceBody {
    place_id: u64,
    #[serde(default)]
    position: Option<usize>,
}

async fn add_place(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(body): ApiJson<AddPlaceBody>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .itinerary
        .add_place(TripId(id), PlaceId(body.place_id), body.position)
        .await?;
    Ok(Json(trip))
}

async fn remove_place(
    State(state): State<AppState>,
    ApiPath((id, place_id)): ApiPath<(u64, u64)>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .itinerary
        .remove_place(TripId(id), PlaceId(place_id))
        .await?;
    Ok(Json(trip))
}

#[derive(Deserialize)]
struct ReorderBody {
    place_ids: Vec<PlaceId>,
}

async fn reorder_places(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(body): ApiJson<ReorderBody>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .itinerary
        .reorder_places(TripId(id), body.place_ids)
        .await?;
    Ok(Json(trip))
}
