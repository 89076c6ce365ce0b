pub mod admin;
pub mod places;
pub mod trips;

use axum::{
    extract::{FromRequest, FromRequestParts},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{error::AppError, state::AppState};

/// JSON body whose rejections surface as [`AppError::InvalidArgument`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/places", places::router())
        .nest("/trips", trips::router())
        .nest("/admin", admin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
