use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use tracing::debug;

use super::{EntityKind, ItineraryRepository};
use crate::{
    db::{init_pool, run_migrations, DbPool},
    error::AppError,
    models::{
        place::{Place, PlaceId},
        trip::{Trip, TripId},
    },
};

#[derive(Clone)]
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = init_pool(database_url).await?;
        run_migrations(&pool).await?;
        debug!("sqlite repository ready at {database_url}");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn to_db_id(id: u64) -> Result<i64, AppError> {
    i64::try_from(id).map_err(|_| AppError::invalid(format!("id {id} out of range")))
}

fn from_db_id(id: i64) -> Result<u64, AppError> {
    u64::try_from(id).map_err(|_| AppError::Other(anyhow::anyhow!("negative id {id} in database")))
}

#[async_trait]
impl ItineraryRepository for SqliteRepository {
    async fn allocate_id(&self, kind: EntityKind) -> Result<u64, AppError> {
        let id: i64 = sqlx::query_scalar(
            "UPDATE sequences SET next_id = next_id + 1 WHERE name = ?1 RETURNING next_id - 1",
        )
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;
        from_db_id(id)
    }

    async fn load_places(&self) -> Result<Vec<Place>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, category, address, description, opening_hours FROM places ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(Place {
                    id: PlaceId(from_db_id(row.get("id"))?),
                    title: row.get("title"),
                    category: row.get("category"),
                    address: row.get("address"),
                    description: row.get("description"),
                    opening_hours: row.get("opening_hours"),
                })
            })
            .collect()
    }

    async fn save_place(&self, place: &Place) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO places (id, title, category, address, description, opening_hours)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(to_db_id(place.id.0)?)
        .bind(&place.title)
        .bind(&place.category)
        .bind(&place.address)
        .bind(&place.description)
        .bind(&place.opening_hours)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_place(&self, id: PlaceId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM places WHERE id = ?1")
            .bind(to_db_id(id.0)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_trips(&self) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query("SELECT id, title, date, notes FROM trips ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let mut trips = BTreeMap::new();
        for row in rows {
            let id = TripId(from_db_id(row.get("id"))?);
            trips.insert(
                id,
                Trip {
                    id,
                    title: row.get("title"),
                    date: row.get::<Option<NaiveDate>, _>("date"),
                    notes: row.get("notes"),
                    place_ids: Vec::new(),
                },
            );
        }

        let links = sqlx::query(
            "SELECT trip_id, place_id FROM trip_places ORDER BY trip_id, position",
        )
        .fetch_all(&self.pool)
        .await?;
        for link in links {
            let trip_id = TripId(from_db_id(link.get("trip_id"))?);
            let place_id = PlaceId(from_db_id(link.get("place_id"))?);
            if let Some(trip) = trips.get_mut(&trip_id) {
                trip.place_ids.push(place_id);
            }
        }

        Ok(trips.into_values().collect())
    }

    async fn save_trip(&self, trip: &Trip) -> Result<(), AppError> {
        let trip_id = to_db_id(trip.id.0)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO trips (id, title, date, notes) VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(id) DO UPDATE SET title = excluded.title, date = excluded.date, notes = excluded.notes"#,
        )
        .bind(trip_id)
        .bind(&trip.title)
        .bind(trip.date)
        .bind(&trip.notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM trip_places WHERE trip_id = ?1")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;

        for (position, place_id) in trip.place_ids.iter().enumerate() {
            sqlx::query("INSERT INTO trip_places (trip_id, position, place_id) VALUES (?1, ?2, ?3)")
                .bind(trip_id)
                .bind(position as i64)
                .bind(to_db_id(place_id.0)?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_trip(&self, id: TripId) -> Result<(), AppError> {
        let trip_id = to_db_id(id.0)?;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM trip_places WHERE trip_id = ?1")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM trips WHERE id = ?1")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
