use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs, sync::Mutex};

use super::{EntityKind, ItineraryRepository};
use crate::{
    error::AppError,
    models::{
        place::{Place, PlaceId},
        trip::{Trip, TripId},
    },
};

const PLACES_DIR: &str = "places";
const TRIPS_DIR: &str = "trips";
const SEQUENCES_FILE: &str = "sequences.json";

#[derive(Debug, Serialize, Deserialize)]
struct Sequences {
    #[serde(default = "first_id")]
    next_place_id: u64,
    #[serde(default = "first_id")]
    next_trip_id: u64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            next_place_id: first_id(),
            next_trip_id: first_id(),
        }
    }
}

fn first_id() -> u64 {
    1
}

/// One pretty-printed JSON document per entity below `root`.
#[derive(Clone)]
pub struct JsonRepository {
    root: Arc<PathBuf>,
    sequences: Arc<Mutex<()>>,
}

impl JsonRepository {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
            sequences: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_structure(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.root().join(PLACES_DIR)).await?;
        fs::create_dir_all(self.root().join(TRIPS_DIR)).await?;
        Ok(())
    }

    fn entity_path(&self, dir: &str, id: u64) -> PathBuf {
        self.root().join(dir).join(format!("{id}.json"))
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), AppError> {
        let data = serde_json::to_vec_pretty(value)?;
        // Readers never see a half-written file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>, AppError> {
        let dir = self.root().join(dir);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }
        let mut items = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read(&path).await?;
            if raw.is_empty() {
                continue;
            }
            items.push(serde_json::from_slice(&raw)?);
        }
        Ok(items)
    }

    async fn remove(&self, path: PathBuf) -> Result<(), AppError> {
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn load_sequences(&self) -> Result<Sequences, AppError> {
        let path = self.root().join(SEQUENCES_FILE);
        if !fs::try_exists(&path).await? {
            return Ok(Sequences::default());
        }
        let raw = fs::read(&path).await?;
        if raw.is_empty() {
            return Ok(Sequences::default());
        }
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[async_trait]
impl ItineraryRepository for JsonRepository {
    async fn allocate_id(&self, kind: EntityKind) -> Result<u64, AppError> {
        let _guard = self.sequences.lock().await;
        let mut sequences = self.load_sequences().await?;
        let slot = match kind {
            EntityKind::Place => &mut sequences.next_place_id,
            EntityKind::Trip => &mut sequences.next_trip_id,
        };
        let id = *slot;
        *slot += 1;
        self.write_json(&self.root().join(SEQUENCES_FILE), &sequences)
            .await?;
        Ok(id)
    }

    async fn load_places(&self) -> Result<Vec<Place>, AppError> {
        let mut places: Vec<Place> = self.read_all(PLACES_DIR).await?;
        places.sort_by_key(|place| place.id);
        Ok(places)
    }

    async fn save_place(&self, place: &Place) -> Result<(), AppError> {
        let path = self.entity_path(PLACES_DIR, place.id.0);
        self.write_json(&path, place).await
    }

    async fn delete_place(&self, id: PlaceId) -> Result<(), AppError> {
        self.remove(self.entity_path(PLACES_DIR, id.0)).await
    }

    async fn load_trips(&self) -> Result<Vec<Trip>, AppError> {
        let mut trips: Vec<Trip> = self.read_all(TRIPS_DIR).await?;
        trips.sort_by_key(|trip| trip.id);
        Ok(trips)
    }

    async fn save_trip(&self, trip: &Trip) -> Result<(), AppError> {
        let path = self.entity_path(TRIPS_DIR, trip.id.0);
        self.write_json(&path, trip).await
    }

    async fn delete_trip(&self, id: TripId) -> Result<(), AppError> {
        self.remove(self.entity_path(TRIPS_DIR, id.0)).await
    }
}
