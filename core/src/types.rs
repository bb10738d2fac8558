//! Domain types and wire DTOs for the discovery and saved-store APIs.
//!
//! # Design
//! The discovery endpoint nests address and coordinates
//! (`location.formatted_address`, `geocodes.main.{latitude,longitude}`); the
//! nested shape lives only in the private `VenueRecord` and is flattened into
//! `Venue` during deserialization, so nothing downstream sees it.
//!
//! Venue identifiers arrive as strings or numbers depending on the endpoint.
//! `VenueId` normalizes both into one canonical string at deserialization and
//! construction time, and always serializes as a JSON string. Every lookup and
//! every outbound body goes through `VenueId`, so the two representations can
//! never disagree.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Canonical venue identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VenueId(String);

impl VenueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_float(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < 1e15 {
            VenueId((value as i64).to_string())
        } else {
            VenueId(value.to_string())
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VenueId {
    fn from(value: &str) -> Self {
        VenueId(value.trim().to_string())
    }
}

impl From<String> for VenueId {
    fn from(value: String) -> Self {
        VenueId::from(value.as_str())
    }
}

macro_rules! venue_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for VenueId {
                fn from(value: $t) -> Self {
                    VenueId(value.to_string())
                }
            }
        )*
    };
}

venue_id_from_int!(i32, i64, u32, u64);

impl Serialize for VenueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VenueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = VenueId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a venue identifier string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<VenueId, E> {
                let id = VenueId::from(v);
                if id.0.is_empty() {
                    return Err(E::invalid_value(de::Unexpected::Str(v), &self));
                }
                Ok(id)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<VenueId, E> {
                Ok(VenueId::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<VenueId, E> {
                Ok(VenueId::from(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<VenueId, E> {
                Ok(VenueId::from_float(v))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Opaque identity of a signed-in user. Blank identities are anonymous and
/// cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(UserId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price tier forwarded to the discovery endpoint, 1 (cheapest) to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BudgetTier(u8);

impl BudgetTier {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(tier: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&tier).then_some(BudgetTier(tier))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for BudgetTier {
    fn default() -> Self {
        BudgetTier(2)
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one result-set query. Two loads with equal keys ask the
/// discovery endpoint the same question.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    location: String,
    budget: BudgetTier,
}

impl QueryKey {
    /// Returns `None` for an empty or whitespace-only location.
    pub fn new(location: &str, budget: BudgetTier) -> Option<Self> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }
        Some(QueryKey {
            location: location.to_string(),
            budget,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn budget(&self) -> BudgetTier {
        self.budget
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A venue as returned by the discovery endpoint, flattened.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "VenueRecord")]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub address: String,
    pub photo: Option<String>,
    pub coordinates: Coordinates,
}

#[derive(Deserialize)]
struct VenueRecord {
    id: VenueId,
    name: String,
    location: RecordLocation,
    geocodes: RecordGeocodes,
    #[serde(default)]
    photo: Option<String>,
}

#[derive(Deserialize)]
struct RecordLocation {
    formatted_address: String,
}

#[derive(Deserialize)]
struct RecordGeocodes {
    main: Coordinates,
}

impl From<VenueRecord> for Venue {
    fn from(record: VenueRecord) -> Self {
        Venue {
            id: record.id,
            name: record.name,
            address: record.location.formatted_address,
            photo: record.photo.filter(|p| !p.trim().is_empty()),
            coordinates: record.geocodes.main,
        }
    }
}

/// One row of `GET /saved-restaurants/:user`. Other columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedRecord {
    pub restaurant_id: VenueId,
}

/// Body of `POST /save-restaurant`: a denormalized snapshot of the venue.
#[derive(Debug, Clone, Serialize)]
pub struct SaveVenue<'a> {
    pub user_id: &'a UserId,
    #[serde(rename = "restaurantId")]
    pub venue_id: &'a VenueId,
    pub name: &'a str,
    pub address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<&'a str>,
    pub latitude: f64,
    pub longitude: f64,
}

impl<'a> SaveVenue<'a> {
    pub fn new(user: &'a UserId, venue: &'a Venue) -> Self {
        SaveVenue {
            user_id: user,
            venue_id: &venue.id,
            name: &venue.name,
            address: &venue.address,
            photo: venue.photo.as_deref(),
            latitude: venue.coordinates.latitude,
            longitude: venue.coordinates.longitude,
        }
    }
}

/// Body of `POST /delete-restaurant`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteVenue<'a> {
    pub user_id: &'a UserId,
    #[serde(rename = "restaurantId")]
    pub venue_id: &'a VenueId,
}
