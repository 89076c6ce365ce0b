//! Place catalog: the reference set of places trips point at.

use std::{
    collections::BTreeMap,
    slice,
    sync::{Arc, PoisonError, RwLock},
};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    error::AppError,
    models::place::{NewPlace, Place, PlaceId},
    repository::{EntityKind, ItineraryRepository},
};

pub struct PlaceCatalog {
    places: RwLock<BTreeMap<PlaceId, Place>>,
    /// Held from check to commit by every catalog mutation.
    writes: Mutex<()>,
    repo: Arc<dyn ItineraryRepository>,
}

impl PlaceCatalog {
    /// Builds the catalog from whatever the repository already holds.
    pub async fn load(repo: Arc<dyn ItineraryRepository>) -> Result<Self, AppError> {
        let places = repo
            .load_places()
            .await?
            .into_iter()
            .map(|place| (place.id, place))
            .collect::<BTreeMap<_, _>>();
        debug!("loaded {} catalog places", places.len());
        Ok(Self {
            places: RwLock::new(places),
            writes: Mutex::new(()),
            repo,
        })
    }

    /// Inserts the bundled sample places when the catalog is empty.
    pub async fn seed_if_empty(&self) -> Result<usize, AppError> {
        if !self.is_empty() {
            return Ok(0);
        }
        let samples = sample_places();
        let count = samples.len();
        for place in samples {
            self.insert_place(place).await?;
        }
        info!("seeded catalog with {count} sample places");
        Ok(count)
    }

    pub fn get_place(&self, id: PlaceId) -> Result<Place, AppError> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("place {id} not found")))
    }

    pub fn contains(&self, id: PlaceId) -> bool {
        self.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the catalog, optionally narrowed to one category.
    ///
    /// The listing does not change when the catalog does and can be
    /// iterated as often as needed.
    pub fn list_places(&self, category: Option<&str>) -> PlaceListing {
        let snapshot: Arc<[Place]> = self.read().values().cloned().collect();
        PlaceListing {
            places: snapshot,
            category: category
                .map(str::trim)
                .filter(|category| !category.is_empty())
                .map(str::to_lowercase),
        }
    }

    pub async fn insert_place(&self, new_place: NewPlace) -> Result<Place, AppError> {
        if new_place.title.trim().is_empty() {
            return Err(AppError::invalid("place title must not be empty"));
        }
        if new_place.category.trim().is_empty() {
            return Err(AppError::invalid("place category must not be empty"));
        }
        let _writes = self.writes.lock().await;
        let id = PlaceId(self.repo.allocate_id(EntityKind::Place).await?);
        let place = new_place.into_place(id);
        self.repo.save_place(&place).await?;
        self.write().insert(id, place.clone());
        info!("catalog place {id} added: {}", place.title);
        Ok(place)
    }

    /// Trips that still list the place keep it as a dangling reference.
    pub async fn remove_place(&self, id: PlaceId) -> Result<(), AppError> {
        let _writes = self.writes.lock().await;
        if !self.contains(id) {
            return Err(AppError::NotFound(format!("place {id} not found")));
        }
        self.repo.delete_place(id).await?;
        self.write().remove(&id);
        info!("catalog place {id} removed");
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<PlaceId, Place>> {
        self.places.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<PlaceId, Place>> {
        self.places.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct PlaceListing {
    places: Arc<[Place]>,
    category: Option<String>,
}

impl PlaceListing {
    pub fn iter(&self) -> PlaceIter<'_> {
        PlaceIter {
            inner: self.places.iter(),
            category: self.category.as_deref(),
        }
    }
}

impl<'a> IntoIterator for &'a PlaceListing {
    type Item = &'a Place;
    type IntoIter = PlaceIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct PlaceIter<'a> {
    inner: slice::Iter<'a, Place>,
    category: Option<&'a str>,
}

impl<'a> Iterator for PlaceIter<'a> {
    type Item = &'a Place;

    fn next(&mut self) -> Option<Self::Item> {
        let category = self.category;
        self.inner.by_ref().find(|place| match category {
            Some(wanted) => place.category.to_lowercase() == wanted,
            None => true,
        })
    }
}

fn sample_places() -> Vec<NewPlace> {
    vec![
        NewPlace::new("Эрмитаж", "Музей")
            .address("Дворцовая площадь, 2")
            .description("Один из крупнейших художественных музеев мира в Зимнем дворце.")
            .opening_hours("10:30–18:00"),
        NewPlace::new("Летний сад", "Парк")
            .address("набережная Кутузова")
            .description("Старейший сад Петербурга с мраморными скульптурами."),
        NewPlace::new("Петропавловская крепость", "Достопримечательность")
            .address("Заячий остров, 3")
            .description("Крепость, с которой начался город."),
        NewPlace::new("Исаакиевский собор", "Собор")
            .address("Исаакиевская площадь, 4")
            .description("Собор с колоннадой и смотровой площадкой."),
        NewPlace::new("Дворцовая площадь", "Площадь")
            .address("Дворцовая площадь")
            .description("Главная площадь города с Александровской колонной."),
        NewPlace::new("Крейсер Аврора", "Музей")
            .address("Петроградская набережная")
            .description("Корабль-музей у Петроградской набережной."),
        NewPlace::new("Казанский собор", "Собор")
            .address("Казанская площадь, 2")
            .description("Собор с полукруглой колоннадой на Невском проспекте."),
    ]
}
