//! Domain records shared by the blackout crates
//!
//! Rows coming out of the structural store are validated into these typed
//! records once, at the query boundary; downstream code never re-checks them.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Utility affected by an interruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionType {
    Electricity,
    ColdWater,
    HotWater,
    Heat,
}

impl InterruptionType {
    pub const ALL: [InterruptionType; 4] = [
        InterruptionType::Electricity,
        InterruptionType::ColdWater,
        InterruptionType::HotWater,
        InterruptionType::Heat,
    ];

    /// Wire/storage spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            InterruptionType::Electricity => "electricity",
            InterruptionType::ColdWater => "cold_water",
            InterruptionType::HotWater => "hot_water",
            InterruptionType::Heat => "heat",
        }
    }
}

impl fmt::Display for InterruptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterruptionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        InterruptionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown interruption type: {}", s)))
    }
}

/// WGS84 point; `Default` is the (0, 0) placeholder used in listings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a point only when both halves are present and finite
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Some(Self { latitude, longitude })
            }
            _ => None,
        }
    }
}

/// Building with its resolved reference names
///
/// Reference names are optional because the registry does not guarantee every
/// building is classified at every district level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub number: String,
    pub coordinates: Option<Coordinates>,
    pub street: Option<String>,
    pub district: Option<String>,
    pub folk_district: Option<String>,
    pub big_folk_district: Option<String>,
    pub city: Option<String>,
}

/// Recorded utility interruption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interruption {
    pub id: String,
    #[serde(rename = "start_date")]
    pub start: NaiveDateTime,
    #[serde(rename = "end_date")]
    pub end: NaiveDateTime,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InterruptionType,
}

impl Interruption {
    /// Validate the `start <= end` invariant
    pub fn new(
        id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: String,
        kind: InterruptionType,
    ) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidData(format!(
                "Interruption {} ends ({}) before it starts ({})",
                id, end, start
            )));
        }

        Ok(Self {
            id,
            start,
            end,
            description,
            kind,
        })
    }
}

/// Interruption joined with the building context it affects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlackoutInfo {
    #[serde(flatten)]
    pub interruption: Interruption,
    pub building_id: String,
    pub building_number: String,
    pub street: Option<String>,
    pub district: Option<String>,
    pub folk_district: Option<String>,
    pub big_folk_district: Option<String>,
    pub city: Option<String>,
    pub coordinates: Coordinates,
}

impl BlackoutInfo {
    pub fn new(interruption: Interruption, building: &Building) -> Self {
        Self {
            interruption,
            building_id: building.id.clone(),
            building_number: building.number.clone(),
            street: building.street.clone(),
            district: building.district.clone(),
            folk_district: building.folk_district.clone(),
            big_folk_district: building.big_folk_district.clone(),
            city: building.city.clone(),
            coordinates: building.coordinates.unwrap_or_default(),
        }
    }
}

/// Filters for the interruption listing; absent fields impose no constraint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlackoutFilter {
    pub kind: Option<InterruptionType>,
    /// Lower bound on the interruption start
    pub start_date: Option<NaiveDateTime>,
    /// Instant that must lie within `[start, end]`
    pub date: Option<NaiveDateTime>,
    /// Matches official, folk or big-folk district name
    pub district: Option<String>,
}

/// Daily weather observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub description: String,
}

/// Fuzzy address search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCandidate {
    pub street: String,
    pub building: String,
    pub building_id: String,
}

/// Nearby building with at least one active interruption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRecord {
    pub building_id: String,
    pub street: Option<String>,
    pub building: String,
    /// Active interruption types, sorted and distinct
    pub types: Vec<InterruptionType>,
}

/// District name at any of the three classification levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub name: String,
}
