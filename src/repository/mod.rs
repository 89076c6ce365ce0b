//! Persistence port for the itinerary core.
//!
//! The services only speak to [`ItineraryRepository`]; which storage sits
//! behind it is chosen once at startup from [`StorageBackend`].

pub mod json;
pub mod sqlite;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;

use crate::{
    config::StorageBackend,
    error::AppError,
    models::{
        place::{Place, PlaceId},
        trip::{Trip, TripId},
    },
};

pub use json::JsonRepository;
pub use sqlite::SqliteRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Place,
    Trip,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Place => "place",
            EntityKind::Trip => "trip",
        }
    }
}

#[async_trait]
pub trait ItineraryRepository: Send + Sync {
    /// Hands out the next identifier for `kind`. Identifiers start at 1 and
    /// are never handed out twice, even after the entity is deleted.
    async fn allocate_id(&self, kind: EntityKind) -> Result<u64, AppError>;

    async fn load_places(&self) -> Result<Vec<Place>, AppError>;

    async fn save_place(&self, place: &Place) -> Result<(), AppError>;

    async fn delete_place(&self, id: PlaceId) -> Result<(), AppError>;

    /// Trips ordered by id.
    async fn load_trips(&self) -> Result<Vec<Trip>, AppError>;

    async fn save_trip(&self, trip: &Trip) -> Result<(), AppError>;

    async fn delete_trip(&self, id: TripId) -> Result<(), AppError>;
}

/// Keeps nothing; state lives only in the services.
#[derive(Debug)]
pub struct MemoryRepository {
    next_place: AtomicU64,
    next_trip: AtomicU64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            next_place: AtomicU64::new(1),
            next_trip: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItineraryRepository for MemoryRepository {
    async fn allocate_id(&self, kind: EntityKind) -> Result<u64, AppError> {
        let counter = match kind {
            EntityKind::Place => &self.next_place,
            EntityKind::Trip => &self.next_trip,
        };
        Ok(counter.fetch_add(1, Ordering::SeqCst))
    }

    async fn load_places(&self) -> Result<Vec<Place>, AppError> {
        Ok(Vec::new())
    }

    async fn save_place(&self, _place: &Place) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_place(&self, _id: PlaceId) -> Result<(), AppError> {
        Ok(())
    }

    async fn load_trips(&self) -> Result<Vec<Trip>, AppError> {
        Ok(Vec::new())
    }

    async fn save_trip(&self, _trip: &Trip) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_trip(&self, _id: TripId) -> Result<(), AppError> {
        Ok(())
    }
}

pub async fn connect(storage: &StorageBackend) -> Result<Arc<dyn ItineraryRepository>, AppError> {
    let repo: Arc<dyn ItineraryRepository> = match storage {
        StorageBackend::Memory => Arc::new(MemoryRepository::new()),
        StorageBackend::Json { root } => {
            let repo = JsonRepository::new(root.clone());
            repo.ensure_structure().await?;
            Arc::new(repo)
        }
        StorageBackend::Sqlite { database_url } => {
            Arc::new(SqliteRepository::connect(database_url).await?)
        }
    };
    Ok(repo)
}
