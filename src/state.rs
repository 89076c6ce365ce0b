use crate::services::itinerary::ItineraryService;

#[derive(Clone)]
pub struct AppState {
    pub itinerary: ItineraryService,
}

impl AppState {
    pub fn new(itinerary: ItineraryService) -> Self {
        Self { itinerary }
    }
}
