use std::sync::Arc;

use itinerary::{
    models::{
        place::PlaceId,
        trip::{NewTrip, TripId, TripPatch},
    },
    repository::{ItineraryRepository, JsonRepository, SqliteRepository},
    services::itinerary::ItineraryService,
};
use tempfile::TempDir;

async fn exercise(service: &ItineraryService) -> TripId {
    let first = service
        .create_trip(NewTrip {
            title: "Белые ночи".into(),
            date: Some("2024-06-21".into()),
            notes: Some("взять куртку".into()),
        })
        .await
        .expect("create");
    service.add_place(first.id, PlaceId(1), None).await.expect("add");
    service.add_place(first.id, PlaceId(3), None).await.expect("add");
    service
        .reorder_places(first.id, vec![PlaceId(3), PlaceId(1)])
        .await
        .expect("reorder");

    let second = service
        .create_trip(NewTrip::titled("Throwaway"))
        .await
        .expect("create");
    service.delete_trip(second.id).await.expect("delete");

    service
        .update_trip(
            first.id,
            TripPatch {
                notes: Some("взять зонт".into()),
                ..TripPatch::default()
            },
        )
        .await
        .expect("update");
    service
        .remove_catalog_place(PlaceId(1))
        .await
        .expect("remove catalog place");
    first.id
}

async fn verify_reloaded(service: &ItineraryService, trip_id: TripId) {
    let trips = service.list_trips().await;
    assert_eq!(trips.len(), 1);
    let trip = &trips[0];
    assert_eq!(trip.id, trip_id);
    assert_eq!(trip.title, "Белые ночи");
    assert_eq!(trip.date.map(|date| date.to_string()).as_deref(), Some("2024-06-21"));
    assert_eq!(trip.notes, "взять зонт");
    assert_eq!(trip.place_ids, vec![PlaceId(3), PlaceId(1)]);

    // the seeded catalog was not re-seeded and the removal stuck
    assert_eq!(service.catalog().len(), 6);
    let detail = service.get_trip_detail(trip_id).await.expect("detail");
    assert!(!detail.places[0].dangling);
    assert!(detail.places[1].dangling);

    // deleted trip 2 must not hand its id out again
    let next = service
        .create_trip(NewTrip::titled("Next"))
        .await
        .expect("create");
    assert_eq!(next.id, TripId(3));
}

#[tokio::test]
async fn json_backend_survives_reload() {
    let root = TempDir::new().expect("tempdir");
    let repo = JsonRepository::new(root.path().join("data"));
    repo.ensure_structure().await.expect("structure");

    let service = ItineraryService::load(Arc::new(repo.clone()), true)
        .await
        .expect("service");
    let trip_id = exercise(&service).await;
    drop(service);

    let reloaded = ItineraryService::load(Arc::new(repo), true)
        .await
        .expect("reload");
    verify_reloaded(&reloaded, trip_id).await;
}

#[tokio::test]
async fn sqlite_backend_survives_reload() {
    let root = TempDir::new().expect("tempdir");
    let database_url = format!(
        "sqlite://{}",
        root.path().join("itinerary.sqlite").to_string_lossy()
    );

    let repo = SqliteRepository::connect(&database_url)
        .await
        .expect("connect");
    let service = ItineraryService::load(Arc::new(repo.clone()), true)
        .await
        .expect("service");
    let trip_id = exercise(&service).await;
    drop(service);
    repo.pool().close().await;

    let repo = SqliteRepository::connect(&database_url)
        .await
        .expect("reconnect");
    let reloaded = ItineraryService::load(Arc::new(repo), true)
        .await
        .expect("reload");
    verify_reloaded(&reloaded, trip_id).await;
}

#[tokio::test]
async fn sqlite_ids_are_allocated_per_kind() {
    use itinerary::repository::EntityKind;

    let root = TempDir::new().expect("tempdir");
    let database_url = format!("sqlite://{}", root.path().join("ids.sqlite").to_string_lossy());
    let repo = SqliteRepository::connect(&database_url)
        .await
        .expect("connect");
    assert_eq!(repo.allocate_id(EntityKind::Trip).await.expect("id"), 1);
    assert_eq!(repo.allocate_id(EntityKind::Trip).await.expect("id"), 2);
    assert_eq!(repo.allocate_id(EntityKind::Place).await.expect("id"), 1);
}
