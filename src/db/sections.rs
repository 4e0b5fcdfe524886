//! Semi-structured attribute shapes.
//!
//! Every type here is stored as a JSON column and read back through
//! [`crate::db::codec::decode`], so each one has a `Default` that doubles as
//! its decode-failure fallback. Containers use `#[serde(default)]` so partial
//! objects written by older clients still decode.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::db::codec::{lenient_f64, lenient_i64};
use crate::db::models::EntityKind;

/// Free-form JSON object (contact details, opening hours).
pub type JsonObject = Map<String, Value>;

fn default_unit() -> String {
    "km".to_string()
}

/// Accepts a string or a number and keeps it as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

// ============================================================================
// Photos
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Photo {
    pub url: String,
    pub caption: String,
    pub order: i64,
    pub public_id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PhotoInput {
    Url(String),
    Photo(Photo),
}

/// Ordered list of photos. Bare URL strings are upgraded to full records
/// whose `order` is their position in the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Gallery(pub Vec<Photo>);

impl<'de> Deserialize<'de> for Gallery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<PhotoInput>::deserialize(deserializer)?;
        let photos = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                PhotoInput::Url(url) => Photo {
                    url,
                    order: index as i64,
                    ..Photo::default()
                },
                PhotoInput::Photo(photo) => photo,
            })
            .collect();
        Ok(Gallery(photos))
    }
}

impl Gallery {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Amenities
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum AmenityInput {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        icon: String,
    },
}

/// Hotel amenity. A bare string is accepted as `{ name, icon: "" }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AmenityInput")]
pub struct Amenity {
    pub name: String,
    pub icon: String,
}

impl From<AmenityInput> for Amenity {
    fn from(input: AmenityInput) -> Self {
        match input {
            AmenityInput::Name(name) => Self {
                name,
                icon: String::new(),
            },
            AmenityInput::Full { name, icon } => Self { name, icon },
        }
    }
}

// ============================================================================
// Cross-reference tuples
// ============================================================================

/// An embedded `{<target>Id, distance, unit}` tuple pointing at another table.
pub trait NearbyRef: Clone + Serialize + Send + Sync {
    /// Table the id points into.
    const TARGET: EntityKind;

    fn target_id(&self) -> Option<i64>;
    fn distance(&self) -> Option<f64>;
    fn unit(&self) -> &str;
    fn from_parts(target_id: i64, distance: Option<f64>, unit: String) -> Self;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRef {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub hotel_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(default = "default_unit")]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRef {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub restaurant_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(default = "default_unit")]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRef {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub destination_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl NearbyRef for HotelRef {
    const TARGET: EntityKind = EntityKind::Hotel;

    fn target_id(&self) -> Option<i64> {
        self.hotel_id
    }

    fn distance(&self) -> Option<f64> {
        self.distance
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn from_parts(target_id: i64, distance: Option<f64>, unit: String) -> Self {
        Self {
            hotel_id: Some(target_id),
            distance,
            unit,
        }
    }
}

impl NearbyRef for RestaurantRef {
    const TARGET: EntityKind = EntityKind::Restaurant;

    fn target_id(&self) -> Option<i64> {
        self.restaurant_id
    }

    fn distance(&self) -> Option<f64> {
        self.distance
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn from_parts(target_id: i64, distance: Option<f64>, unit: String) -> Self {
        Self {
            restaurant_id: Some(target_id),
            distance,
            unit,
        }
    }
}

impl NearbyRef for DestinationRef {
    const TARGET: EntityKind = EntityKind::Destination;

    fn target_id(&self) -> Option<i64> {
        self.destination_id
    }

    fn distance(&self) -> Option<f64> {
        self.distance
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn from_parts(target_id: i64, distance: Option<f64>, unit: String) -> Self {
        Self {
            destination_id: Some(target_id),
            distance,
            unit,
        }
    }
}

// ============================================================================
// Destination sections
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Overview {
    pub description: String,
    pub images: Gallery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryAndLegend {
    pub description: String,
    pub historical_facts: String,
    pub legends: String,
    pub images: Gallery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhereIsLocated {
    pub description: String,
    pub city: String,
    pub coordinates: Coordinates,
    pub images: Gallery,
}

impl Default for WhereIsLocated {
    fn default() -> Self {
        // Geographic centre of Sri Lanka.
        Self {
            description: String::new(),
            city: String::new(),
            coordinates: Coordinates {
                lat: Some(7.8731),
                lng: Some(80.7718),
            },
            images: Gallery::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportMethod {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance: Option<String>,
    #[serde(
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fare: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HowToGo {
    pub description: String,
    pub methods: Vec<TransportMethod>,
    pub images: Gallery,
}

/// A titled item with an optional picture (sights, activities).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Highlight {
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhatToSee {
    pub description: String,
    pub highlights: Vec<Highlight>,
    pub images: Gallery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Season {
    pub name: String,
    pub months: String,
    pub weather: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub recommended: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BestTimeToVisit {
    pub description: String,
    pub seasons: Vec<Season>,
    pub images: Gallery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThingsToDo {
    pub description: String,
    pub activities: Vec<Highlight>,
    pub images: Gallery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhereToStay {
    pub description: String,
    pub hotels: Vec<HotelRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhereToEat {
    pub description: String,
    pub restaurants: Vec<RestaurantRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TravelTips {
    pub description: String,
    pub tips: Vec<Value>,
    pub images: Gallery,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NearbyDestinations {
    pub description: String,
    pub destinations: Vec<DestinationRef>,
}

// ============================================================================
// Hotel / restaurant
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub region: String,
    pub address: String,
    pub coordinates: Coordinates,
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stat {
    pub icon: String,
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyValue {
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub image: String,
    pub image_public_id: String,
    pub bio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessHours {
    pub day: String,
    pub time: String,
}
