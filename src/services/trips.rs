//! Trip store: sole owner of trip records.
//!
//! Every trip sits in its own slot behind an async mutex. A mutation holds
//! that slot from validation until the repository has accepted the new
//! version, so writes to one trip never interleave while writes to
//! different trips run side by side. A slot holding `None` belongs to a
//! trip that was deleted while someone was waiting on it.

use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::catalog::PlaceCatalog;
use crate::{
    error::AppError,
    models::{
        place::PlaceId,
        trip::{NewTrip, Trip, TripId, TripPatch},
    },
    repository::{EntityKind, ItineraryRepository},
    validation::{
        validate_date_string, validate_permutation, validate_place_reference, validate_position,
        validate_title, validate_trip_patch,
    },
};

type TripSlot = Arc<Mutex<Option<Trip>>>;

pub struct TripStore {
    trips: RwLock<BTreeMap<TripId, TripSlot>>,
    catalog: Arc<PlaceCatalog>,
    repo: Arc<dyn ItineraryRepository>,
}

impl TripStore {
    pub async fn load(
        repo: Arc<dyn ItineraryRepository>,
        catalog: Arc<PlaceCatalog>,
    ) -> Result<Self, AppError> {
        let trips = repo
            .load_trips()
            .await?
            .into_iter()
            .map(|trip| (trip.id, Arc::new(Mutex::new(Some(trip)))))
            .collect::<BTreeMap<_, _>>();
        debug!("loaded {} trips", trips.len());
        Ok(Self {
            trips: RwLock::new(trips),
            catalog,
            repo,
        })
    }

    pub async fn create_trip(&self, new_trip: NewTrip) -> Result<Trip, AppError> {
        validate_title(&new_trip.title)?;
        let date = match new_trip.date.as_deref() {
            Some(raw) => validate_date_string(raw)?,
            None => None,
        };

        let id = TripId(self.repo.allocate_id(EntityKind::Trip).await?);
        let trip = Trip {
            id,
            title: new_trip.title,
            date,
            notes: new_trip.notes.unwrap_or_default(),
            place_ids: Vec::new(),
        };
        self.repo.save_trip(&trip).await?;
        self.trips
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(Some(trip.clone()))));
        info!("trip {id} created: {}", trip.title);
        Ok(trip)
    }

    pub async fn get_trip(&self, id: TripId) -> Result<Trip, AppError> {
        let slot = self.slot(id).await?;
        let guard = slot.lock().await;
        guard.clone().ok_or_else(|| trip_not_found(id))
    }

    /// All trips in creation order, each read as a consistent snapshot.
    pub async fn list_trips(&self) -> Vec<Trip> {
        let slots: Vec<TripSlot> = self.trips.read().await.values().cloned().collect();
        let mut trips = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(trip) = slot.lock().await.clone() {
                trips.push(trip);
            }
        }
        trips
    }

    pub async fn update_trip(&self, id: TripId, patch: TripPatch) -> Result<Trip, AppError> {
        let patch = validate_trip_patch(patch)?;
        self.mutate(id, |trip| {
            if patch.is_empty() {
                return Ok(None);
            }
            Ok(Some(patch.apply_to(trip)))
        })
        .await
    }

    /// Deleting twice reports `NotFound` the second time.
    pub async fn delete_trip(&self, id: TripId) -> Result<(), AppError> {
        let slot = self.slot(id).await?;
        let mut guard = slot.lock().await;
        if guard.is_none() {
            return Err(trip_not_found(id));
        }
        self.repo.delete_trip(id).await?;
        *guard = None;
        drop(guard);
        self.trips.write().await.remove(&id);
        info!("trip {id} deleted");
        Ok(())
    }

    /// Appends `place_id`, or inserts it at `position` (`0..=len`).
    pub async fn add_place(
        &self,
        id: TripId,
        place_id: PlaceId,
        position: Option<usize>,
    ) -> Result<Trip, AppError> {
        self.mutate(id, |trip| {
            validate_place_reference(&self.catalog, place_id)?;
            if trip.contains(place_id) {
                return Err(AppError::AlreadyExists(format!(
                    "place {place_id} is already in trip {id}"
                )));
            }
            let len = trip.place_ids.len();
            let position = position.unwrap_or(len);
            validate_position(position, len)?;

            let mut next = trip.clone();
            next.place_ids.insert(position, place_id);
            Ok(Some(next))
        })
        .await
    }

    /// Removing a place the trip does not list succeeds without a write.
    pub async fn remove_place(&self, id: TripId, place_id: PlaceId) -> Result<Trip, AppError> {
        self.mutate(id, |trip| {
            let Some(index) = trip.position_of(place_id) else {
                return Ok(None);
            };
            let mut next = trip.clone();
            next.place_ids.remove(index);
            Ok(Some(next))
        })
        .await
    }

    pub async fn reorder_places(&self, id: TripId, new_order: Vec<PlaceId>) -> Result<Trip, AppError> {
        self.mutate(id, |trip| {
            validate_permutation(&trip.place_ids, &new_order)?;
            if trip.place_ids == new_order {
                return Ok(None);
            }
            let mut next = trip.clone();
            next.place_ids = new_order;
            Ok(Some(next))
        })
        .await
    }

    async fn slot(&self, id: TripId) -> Result<TripSlot, AppError> {
        self.trips
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| trip_not_found(id))
    }

    /// Runs `change` against the current trip under its lock. `Ok(None)`
    /// means nothing changed; `Ok(Some(next))` is persisted before it
    /// replaces the in-memory copy.
    async fn mutate<F>(&self, id: TripId, change: F) -> Result<Trip, AppError>
    where
        F: FnOnce(&Trip) -> Result<Option<Trip>, AppError>,
    {
        let slot = self.slot(id).await?;
        let mut guard = slot.lock().await;
        let current = guard.as_ref().ok_or_else(|| trip_not_found(id))?;
        let Some(next) = change(current)? else {
            return Ok(current.clone());
        };
        self.repo.save_trip(&next).await?;
        *guard = Some(next.clone());
        info!("trip {id} updated");
        Ok(next)
    }
}

fn trip_not_found(id: TripId) -> AppError {
    AppError::NotFound(format!("trip {id} not found"))
}
