//! Public entry point for callers: trips, their places, and the catalog.

use std::sync::Arc;

use tracing::warn;

use super::{
    catalog::{PlaceCatalog, PlaceListing},
    trips::TripStore,
};
use crate::{
    error::AppError,
    models::{
        place::{NewPlace, Place, PlaceId},
        trip::{NewTrip, PlaceEntry, Trip, TripDetail, TripId, TripPatch},
    },
    repository::ItineraryRepository,
};

#[derive(Clone)]
pub struct ItineraryService {
    catalog: Arc<PlaceCatalog>,
    trips: Arc<TripStore>,
}

impl ItineraryService {
    pub async fn load(
        repo: Arc<dyn ItineraryRepository>,
        seed_catalog: bool,
    ) -> Result<Self, AppError> {
        let catalog = Arc::new(PlaceCatalog::load(repo.clone()).await?);
        if seed_catalog {
            catalog.seed_if_empty().await?;
        }
        let trips = Arc::new(TripStore::load(repo, catalog.clone()).await?);
        Ok(Self { catalog, trips })
    }

    pub fn catalog(&self) -> &PlaceCatalog {
        &self.catalog
    }

    pub fn get_place(&self, id: PlaceId) -> Result<Place, AppError> {
        self.catalog.get_place(id)
    }

    pub fn list_places(&self, category: Option<&str>) -> PlaceListing {
        self.catalog.list_places(category)
    }

    pub async fn insert_place(&self, new_place: NewPlace) -> Result<Place, AppError> {
        self.catalog.insert_place(new_place).await
    }

    pub async fn remove_catalog_place(&self, id: PlaceId) -> Result<(), AppError> {
        self.catalog.remove_place(id).await
    }

    pub async fn create_trip(&self, new_trip: NewTrip) -> Result<Trip, AppError> {
        self.trips.create_trip(new_trip).await
    }

    pub async fn get_trip(&self, id: TripId) -> Result<Trip, AppError> {
        self.trips.get_trip(id).await
    }

    pub async fn list_trips(&self) -> Vec<Trip> {
        self.trips.list_trips().await
    }

    pub async fn update_trip(&self, id: TripId, patch: TripPatch) -> Result<Trip, AppError> {
        self.trips.update_trip(id, patch).await
    }

    pub async fn delete_trip(&self, id: TripId) -> Result<(), AppError> {
        self.trips.delete_trip(id).await
    }

    pub async fn add_place(
        &self,
        id: TripId,
        place_id: PlaceId,
        position: Option<usize>,
    ) -> Result<Trip, AppError> {
        self.trips.add_place(id, place_id, position).await
    }

    pub async fn remove_place(&self, id: TripId, place_id: PlaceId) -> Result<Trip, AppError> {
        self.trips.remove_place(id, place_id).await
    }

    pub async fn reorder_places(
        &self,
        id: TripId,
        new_order: Vec<PlaceId>,
    ) -> Result<Trip, AppError> {
        self.trips.reorder_places(id, new_order).await
    }

    /// Resolves every place of the trip against the catalog. Places that
    /// have since left the catalog come back marked as dangling instead of
    /// failing the request.
    pub async fn get_trip_detail(&self, id: TripId) -> Result<TripDetail, AppError> {
        let trip = self.trips.get_trip(id).await?;
        let places = trip
            .place_ids
            .iter()
            .map(|place_id| match self.catalog.get_place(*place_id) {
                Ok(place) => PlaceEntry::resolved(place),
                Err(_) => PlaceEntry::dangling(*place_id),
            })
            .collect();
        let detail = TripDetail {
            id: trip.id,
            title: trip.title,
            date: trip.date,
            notes: trip.notes,
            places,
        };
        let dangling = detail.dangling_count();
        if dangling > 0 {
            warn!("trip {id} references {dangling} place(s) missing from the catalog");
        }
        Ok(detail)
    }
}
