#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Restaurant inspection types shared across the workspace.
//!
//! Every inspection decoded from the open-data endpoint becomes an
//! [`InspectionRecord`]. Records that carry a [`Coordinate`] can be placed
//! on a map, where inspections sharing a street address are collected into
//! a [`ProximityGroup`].

use chrono::NaiveDate;
use geo::{Distance, Haversine, Point};
use serde::Serialize;

/// A WGS84 latitude/longitude pair.
///
/// Can only be constructed through [`Coordinate::new`], so every value in
/// circulation is in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if the latitude is outside
    /// `[-90, 90]` or the longitude is outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        if is_valid_pair(latitude, longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinateError {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in meters.
    #[must_use]
    pub fn distance_meters(&self, other: &Self) -> f64 {
        Haversine.distance(self.to_point(), other.to_point())
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Returns `true` if the pair is finite and within WGS84 bounds.
#[must_use]
pub fn is_valid_pair(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Error returned when a latitude/longitude pair is out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinateError {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid coordinate ({}, {}): expected latitude in [-90, 90] and longitude in [-180, 180]",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// A single health inspection of a restaurant.
///
/// Equality compares every field. Two inspections of the same restaurant
/// share an `establishment_id` but differ in date, score, and
/// `facility_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    /// Restaurant name as published (e.g., "Joe's Diner").
    pub restaurant_name: String,
    /// Street address label (e.g., "1100 CONGRESS AVE").
    pub address: String,
    /// Inspection score, 0-100.
    pub score: u32,
    /// Day of the inspection.
    pub date: NaiveDate,
    /// Location of the restaurant. `None` if the dataset row has no
    /// coordinate; such records never appear on the map.
    pub coordinate: Option<Coordinate>,
    /// Identifier of this inspection row.
    pub facility_id: String,
    /// Identifier shared by every inspection of the same restaurant.
    pub establishment_id: String,
}

impl InspectionRecord {
    /// The identifier the favorites store keys on.
    #[must_use]
    pub fn favorite_id(&self) -> &str {
        &self.establishment_id
    }

    /// Inspection date for list display (e.g., "Jun 1, 2023").
    #[must_use]
    pub fn readable_date(&self) -> String {
        self.date.format("%b %-d, %Y").to_string()
    }

    /// Projects this record into the summary shown inside a map group.
    #[must_use]
    pub fn summary(&self) -> InspectionSummary {
        InspectionSummary {
            name: self.restaurant_name.clone(),
            score: self.score,
            date: self.date,
            facility_id: self.facility_id.clone(),
            establishment_id: self.establishment_id.clone(),
        }
    }
}

/// Lightweight view of one inspection inside a [`ProximityGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionSummary {
    /// Restaurant name.
    pub name: String,
    /// Inspection score.
    pub score: u32,
    /// Day of the inspection.
    pub date: NaiveDate,
    /// Inspection row identifier.
    pub facility_id: String,
    /// Establishment identifier, used to request the full history.
    pub establishment_id: String,
}

/// Every inspection observed at one street address.
///
/// Several restaurants can share an address (food courts, strip malls), so
/// a group may hold summaries for more than one establishment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityGroup {
    /// The literal address string the group is keyed on.
    pub address: String,
    /// Map position of the group (taken from the first record at the
    /// address).
    pub coordinate: Coordinate,
    /// Summaries in the order their records were encountered.
    pub data: Vec<InspectionSummary>,
}

impl ProximityGroup {
    /// Creates an empty group at `address`.
    #[must_use]
    pub const fn new(address: String, coordinate: Coordinate) -> Self {
        Self {
            address,
            coordinate,
            data: Vec::new(),
        }
    }

    /// Stable identity for map annotations.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.address,
            self.coordinate.latitude(),
            self.coordinate.longitude()
        )
    }
}
