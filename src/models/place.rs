use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub u64);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalogued point of interest. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub title: String,
    pub category: String,
    pub address: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}

/// Input for adding a place to the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlace {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub opening_hours: Option<String>,
}

impl NewPlace {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn opening_hours(mut self, hours: impl Into<String>) -> Self {
        self.opening_hours = Some(hours.into());
        self
    }

    pub(crate) fn into_place(self, id: PlaceId) -> Place {
        Place {
            id,
            title: self.title,
            category: self.category,
            address: self.address,
            description: self.description,
            opening_hours: self.opening_hours.filter(|hours| !hours.trim().is_empty()),
        }
    }
}
