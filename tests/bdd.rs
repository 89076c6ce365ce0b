use std::{fmt, sync::Arc};

use cucumber::{given, then, when, World as _};
use itinerary::{
    error::{AppError, ErrorKind},
    models::{
        place::PlaceId,
        trip::{NewTrip, Trip, TripDetail, TripId, TripPatch},
    },
    repository::MemoryRepository,
    services::itinerary::ItineraryService,
};

#[derive(Debug, cucumber::World, Default)]
struct ItineraryWorld {
    service: Option<TestService>,
    last_trip: Option<Trip>,
    last_error: Option<ErrorKind>,
    detail: Option<TripDetail>,
}

impl ItineraryWorld {
    fn itinerary(&self) -> &ItineraryService {
        &self
            .service
            .as_ref()
            .expect("service must be initialised first")
            .0
    }

    fn record(&mut self, result: Result<Trip, AppError>) {
        match result {
            Ok(trip) => {
                self.last_trip = Some(trip);
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err.kind()),
        }
    }
}

struct TestService(ItineraryService);

impl fmt::Debug for TestService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestService").finish()
    }
}

fn parse_ids(raw: &str) -> Vec<PlaceId> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| PlaceId(part.parse().expect("numeric place id")))
        .collect()
}

fn kind_name(kind: Option<ErrorKind>) -> &'static str {
    kind.map(|kind| kind.as_str()).unwrap_or("ok")
}

#[given("a fresh itinerary service with the sample catalog")]
async fn given_fresh_service(world: &mut ItineraryWorld) {
    let service = ItineraryService::load(Arc::new(MemoryRepository::new()), true)
        .await
        .expect("service");
    world.service = Some(TestService(service));
    world.last_trip = None;
    world.last_error = None;
    world.detail = None;
}

#[given(regex = r#"^a trip titled "([^"]*)" with places "([^"]*)"$"#)]
async fn given_trip_with_places(world: &mut ItineraryWorld, title: String, places: String) {
    let trip = world
        .itinerary()
        .create_trip(NewTrip::titled(title))
        .await
        .expect("create trip");
    for place_id in parse_ids(&places) {
        world
            .itinerary()
            .add_place(trip.id, place_id, None)
            .await
            .expect("add place");
    }
}

#[when(regex = r#"^I create a trip titled "([^"]*)"$"#)]
async fn when_create_trip(world: &mut ItineraryWorld, title: String) {
    let result = world.itinerary().create_trip(NewTrip::titled(title)).await;
    world.record(result);
}

#[when(regex = r"^I add place (\d+) to trip (\d+)$")]
async fn when_add_place(world: &mut ItineraryWorld, place: u64, trip: u64) {
    let result = world
        .itinerary()
        .add_place(TripId(trip), PlaceId(place), None)
        .await;
    world.record(result);
}

#[when(regex = r"^I remove place (\d+) from trip (\d+)$")]
async fn when_remove_place(world: &mut ItineraryWorld, place: u64, trip: u64) {
    let result = world
        .itinerary()
        .remove_place(TripId(trip), PlaceId(place))
        .await;
    world.record(result);
}

#[when(regex = r#"^I reorder trip (\d+) to "([^"]*)"$"#)]
async fn when_reorder(world: &mut ItineraryWorld, trip: u64, order: String) {
    let result = world
        .itinerary()
        .reorder_places(TripId(trip), parse_ids(&order))
        .await;
    world.record(result);
}

#[when(regex = r"^I delete trip (\d+)$")]
async fn when_delete_trip(world: &mut ItineraryWorld, trip: u64) {
    let result = world.itinerary().delete_trip(TripId(trip)).await;
    world.last_error = result.err().map(|err| err.kind());
}

#[when(regex = r"^place (\d+) is removed from the catalog$")]
async fn when_catalog_place_removed(world: &mut ItineraryWorld, place: u64) {
    world
        .itinerary()
        .remove_catalog_place(PlaceId(place))
        .await
        .expect("remove catalog place");
}

#[when(regex = r"^I fetch the detail of trip (\d+)$")]
async fn when_fetch_detail(world: &mut ItineraryWorld, trip: u64) {
    let detail = world
        .itinerary()
        .get_trip_detail(TripId(trip))
        .await
        .expect("trip detail");
    world.detail = Some(detail);
}

#[then(regex = r"^the trip has id (\d+)$")]
async fn then_trip_id(world: &mut ItineraryWorld, id: u64) {
    let trip = world.last_trip.as_ref().expect("a trip was returned");
    assert_eq!(trip.id, TripId(id));
}

#[then(regex = r#"^the trip has title "([^"]*)"$"#)]
async fn then_trip_title(world: &mut ItineraryWorld, title: String) {
    let trip = world.last_trip.as_ref().expect("a trip was returned");
    assert_eq!(trip.title, title);
}

#[then(regex = r#"^trip (\d+) lists places "([^"]*)"$"#)]
async fn then_trip_places(world: &mut ItineraryWorld, trip: u64, places: String) {
    let trip = world
        .itinerary()
        .get_trip(TripId(trip))
        .await
        .expect("trip exists");
    assert_eq!(trip.place_ids, parse_ids(&places));
}

#[then(regex = r#"^the last call failed with "([a-z_]+)"$"#)]
async fn then_failed_with(world: &mut ItineraryWorld, kind: String) {
    assert_eq!(kind_name(world.last_error), kind);
}

#[then("the last call succeeded")]
async fn then_succeeded(world: &mut ItineraryWorld) {
    assert_eq!(kind_name(world.last_error), "ok");
}

#[then(regex = r"^the detail has (\d+) entries$")]
async fn then_detail_len(world: &mut ItineraryWorld, expected: usize) {
    let detail = world.detail.as_ref().expect("detail fetched");
    assert_eq!(detail.places.len(), expected);
}

#[then(regex = r"^entry (\d+) is dangling$")]
async fn then_entry_dangling(world: &mut ItineraryWorld, index: usize) {
    let detail = world.detail.as_ref().expect("detail fetched");
    let entry = &detail.places[index - 1];
    assert!(entry.dangling);
    assert!(entry.place.is_none());
}

#[then(regex = r#"^entry (\d+) resolves to "([^"]*)"$"#)]
async fn then_entry_resolves(world: &mut ItineraryWorld, index: usize, title: String) {
    let detail = world.detail.as_ref().expect("detail fetched");
    let entry = &detail.places[index - 1];
    assert!(!entry.dangling);
    assert_eq!(entry.place.as_ref().map(|place| place.title.as_str()), Some(title.as_str()));
}

#[then(regex = r#"^every trip operation on trip (\d+) fails with "([a-z_]+)"$"#)]
async fn then_every_operation_fails(world: &mut ItineraryWorld, trip: u64, kind: String) {
    let service = world.itinerary();
    let id = TripId(trip);
    let results = vec![
        service.get_trip(id).await.err(),
        service
            .update_trip(
                id,
                TripPatch {
                    title: Some("Again".into()),
                    ..TripPatch::default()
                },
            )
            .await
            .err(),
        service.delete_trip(id).await.err(),
        service.add_place(id, PlaceId(2), None).await.err(),
        service.remove_place(id, PlaceId(1)).await.err(),
        service.reorder_places(id, vec![PlaceId(1)]).await.err(),
        service.get_trip_detail(id).await.err(),
    ];
    for err in results {
        assert_eq!(kind_name(err.map(|err| err.kind())), kind);
    }
}

#[tokio::main]
async fn main() {
    ItineraryWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
