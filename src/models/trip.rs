use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};

use super::place::{Place, PlaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub u64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    /// Serialized as `""` when no date is planned yet.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    /// Ordered, no id appears twice.
    #[serde(default)]
    pub place_ids: Vec<PlaceId>,
}

impl Trip {
    pub fn contains(&self, place_id: PlaceId) -> bool {
        self.place_ids.contains(&place_id)
    }

    pub fn position_of(&self, place_id: PlaceId) -> Option<usize> {
        self.place_ids.iter().position(|id| *id == place_id)
    }
}

/// Request body for creating a trip. Dates arrive as raw strings and are
/// checked by the validation layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTrip {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewTrip {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One stop in a resolved itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceEntry {
    pub place_id: PlaceId,
    pub dangling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<Place>,
}

impl PlaceEntry {
    pub fn resolved(place: Place) -> Self {
        Self {
            place_id: place.id,
            dangling: false,
            place: Some(place),
        }
    }

    pub fn dangling(place_id: PlaceId) -> Self {
        Self {
            place_id,
            dangling: true,
            place: None,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripDetail {
    pub id: TripId,
    pub title: String,
    #[serde_as(as = "NoneAsEmptyString")]
    pub date: Option<NaiveDate>,
    pub notes: String,
    pub places: Vec<PlaceEntry>,
}

impl TripDetail {
    pub fn dangling_count(&self) -> usize {
        self.places.iter().filter(|entry| entry.dangling).count()
    }
}
