//! Input checks run before any trip mutation is attempted.
//!
//! Everything here is side-effect free: a check either hands back the
//! parsed value or an [`AppError::InvalidArgument`] / [`AppError::NotFound`],
//! and the caller only touches state once every check has passed.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    error::AppError,
    models::{
        place::PlaceId,
        trip::{Trip, TripPatch},
    },
    services::catalog::PlaceCatalog,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A [`TripPatch`] whose fields have all been checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidTripPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the date.
    pub date: Option<Option<NaiveDate>>,
    pub notes: Option<String>,
}

impl ValidTripPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.notes.is_none()
    }

    pub fn apply_to(self, trip: &Trip) -> Trip {
        let mut next = trip.clone();
        if let Some(title) = self.title {
            next.title = title;
        }
        if let Some(date) = self.date {
            next.date = date;
        }
        if let Some(notes) = self.notes {
            next.notes = notes;
        }
        next
    }
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::invalid("trip title must not be empty"));
    }
    Ok(())
}

/// Empty input means "no date"; anything else must be a real calendar day.
pub fn validate_date_string(raw: &str) -> Result<Option<NaiveDate>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let invalid = || AppError::invalid(format!("invalid date {raw:?}, expected YYYY-MM-DD"));
    if !is_padded_calendar_date(trimmed) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| invalid())
}

/// `NNNN-NN-NN`; chrono alone would also take `2024-6-1` or `+2024-06-01`.
fn is_padded_calendar_date(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

pub fn validate_trip_patch(patch: TripPatch) -> Result<ValidTripPatch, AppError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    let date = patch
        .date
        .as_deref()
        .map(validate_date_string)
        .transpose()?;
    Ok(ValidTripPatch {
        title: patch.title,
        date,
        notes: patch.notes,
    })
}

pub fn validate_place_reference(catalog: &PlaceCatalog, place_id: PlaceId) -> Result<(), AppError> {
    if catalog.contains(place_id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("place {place_id} not found")))
    }
}

pub fn validate_position(position: usize, len: usize) -> Result<(), AppError> {
    if position > len {
        return Err(AppError::invalid(format!(
            "position {position} out of range 0..={len}"
        )));
    }
    Ok(())
}

/// `proposed` must hold exactly the ids of `current`, each once.
pub fn validate_permutation(current: &[PlaceId], proposed: &[PlaceId]) -> Result<(), AppError> {
    if current.len() != proposed.len() {
        return Err(AppError::invalid(format!(
            "new order has {} places, trip has {}",
            proposed.len(),
            current.len()
        )));
    }
    let known: HashSet<PlaceId> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(proposed.len());
    for id in proposed {
        if !known.contains(id) {
            return Err(AppError::invalid(format!("place {id} is not part of the trip")));
        }
        if !seen.insert(*id) {
            return Err(AppError::invalid(format!("place {id} listed twice")));
        }
    }
    Ok(())
}
