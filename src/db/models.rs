//! Domain models returned by the store and serialized to clients.
//!
//! Semi-structured attributes are fully typed here; the row structs in
//! [`crate::db::rows`] hold their raw JSON form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::sections::*;

/// Declares a closed set of string values with `as_str`/`FromStr`/`Display`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Comma-separated list of accepted values, for error messages.
            pub fn allowed() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("'{}' is not one of: {}", s, Self::allowed())),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Lifecycle of destinations, hotels and restaurants.
    PublishStatus {
        Draft => "draft",
        Active => "active",
        Inactive => "inactive",
    }
);

impl Default for PublishStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl PublishStatus {
    /// active -> inactive, anything else -> active.
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Draft | Self::Inactive => Self::Active,
        }
    }
}

string_enum!(DestinationCategory {
    Beach => "beach",
    Nature => "nature",
    Cultural => "cultural",
    Wildlife => "wildlife",
});

impl Default for DestinationCategory {
    fn default() -> Self {
        Self::Beach
    }
}

string_enum!(HotelCategory {
    Luxury => "luxury",
    MidRange => "mid-range",
    Budget => "budget",
});

impl Default for HotelCategory {
    fn default() -> Self {
        Self::MidRange
    }
}

string_enum!(PriceRange {
    Budget => "$",
    Moderate => "$$",
    Expensive => "$$$",
    Luxury => "$$$$",
});

string_enum!(ReviewStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Pending
    }
}

string_enum!(SlideStatus {
    Active => "active",
    Inactive => "inactive",
});

impl Default for SlideStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl SlideStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

string_enum!(AdminRole {
    Admin => "admin",
    SuperAdmin => "super-admin",
});

impl Default for AdminRole {
    fn default() -> Self {
        Self::Admin
    }
}

string_enum!(
    /// The three listing tables. Also the polymorphic `itemType` of reviews.
    EntityKind {
        Destination => "Destination",
        Hotel => "Hotel",
        Restaurant => "Restaurant",
    }
);

impl EntityKind {
    /// Lowercase path segment, as used in `/api/reviews/{itemType}/...`.
    pub fn parse_loose(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub region: String,
    pub category: DestinationCategory,
    pub hero_image: String,
    pub hero_image_public_id: Option<String>,
    pub overview: Overview,
    pub history_and_legend: HistoryAndLegend,
    pub where_is_located: WhereIsLocated,
    pub how_to_go: HowToGo,
    pub what_to_see: WhatToSee,
    pub best_time_to_visit: BestTimeToVisit,
    pub things_to_do: ThingsToDo,
    pub where_to_stay: WhereToStay,
    pub where_to_eat: WhereToEat,
    pub travel_tips: TravelTips,
    pub nearby_destinations: NearbyDestinations,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub status: PublishStatus,
    pub published_date: Option<DateTime<Utc>>,
    pub completeness: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category: HotelCategory,
    pub price: Option<f64>,
    pub currency: String,
    pub hero_image: String,
    pub hero_image_public_id: Option<String>,
    pub photo_gallery: Gallery,
    pub quick_summary: String,
    pub full_description: String,
    pub amenities: Vec<Amenity>,
    pub location: Location,
    pub contact: JsonObject,
    pub nearby_destinations: Vec<DestinationRef>,
    pub rating: f64,
    pub review_count: i32,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub status: PublishStatus,
    pub published_date: Option<DateTime<Utc>>,
    pub completeness: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub cuisine: String,
    pub price: Option<f64>,
    pub price_range: Option<PriceRange>,
    pub currency: String,
    pub specialty: String,
    pub hero_image: String,
    pub hero_image_public_id: Option<String>,
    pub photo_gallery: Gallery,
    pub quick_summary: String,
    pub full_description: String,
    pub menu_highlights: Vec<serde_json::Value>,
    pub hours: JsonObject,
    pub location: Location,
    pub contact: JsonObject,
    pub nearby_destinations: Vec<DestinationRef>,
    pub rating: f64,
    pub review_count: i32,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub status: PublishStatus,
    pub published_date: Option<DateTime<Utc>>,
    pub completeness: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of a referenced listing embedded in detail views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(skip)]
    pub kind: Option<EntityKind>,
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub hero_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip)]
    pub status: PublishStatus,
}

impl From<&Destination> for Summary {
    fn from(d: &Destination) -> Self {
        Self {
            kind: Some(EntityKind::Destination),
            id: d.id,
            name: d.name.clone(),
            slug: d.slug.clone(),
            hero_image: d.hero_image.clone(),
            category: Some(d.category.as_str().to_string()),
            region: Some(d.region.clone()),
            cuisine: None,
            status: d.status,
        }
    }
}

impl From<&Hotel> for Summary {
    fn from(h: &Hotel) -> Self {
        Self {
            kind: Some(EntityKind::Hotel),
            id: h.id,
            name: h.name.clone(),
            slug: h.slug.clone(),
            hero_image: h.hero_image.clone(),
            category: Some(h.category.as_str().to_string()),
            region: Some(h.location.region.clone()),
            cuisine: None,
            status: h.status,
        }
    }
}

impl From<&Restaurant> for Summary {
    fn from(r: &Restaurant) -> Self {
        Self {
            kind: Some(EntityKind::Restaurant),
            id: r.id,
            name: r.name.clone(),
            slug: r.slug.clone(),
            hero_image: r.hero_image.clone(),
            category: None,
            region: Some(r.location.region.clone()),
            cuisine: Some(r.cuisine.clone()),
            status: r.status,
        }
    }
}

/// One row of the `nearby_links` association table.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyLink {
    pub source_kind: EntityKind,
    pub source_id: i64,
    pub target_kind: EntityKind,
    pub target_id: i64,
    pub distance: Option<f64>,
    pub unit: String,
}

// ============================================================================
// Reviews / slides / pages / admins
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub item_type: EntityKind,
    pub item_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub photos: Gallery,
    pub helpful: i32,
    pub status: ReviewStatus,
    pub moderated_by: Option<i64>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    pub id: i64,
    pub image: String,
    pub image_public_id: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub badge: String,
    pub order: i32,
    pub status: SlideStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutPage {
    pub id: i64,
    pub header_image: String,
    pub header_image_public_id: Option<String>,
    pub stats: Vec<Stat>,
    pub story_title: String,
    pub story_paragraph1: String,
    pub story_paragraph2: String,
    pub story_paragraph3: String,
    pub values: Vec<CompanyValue>,
    pub team_members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPage {
    pub id: i64,
    pub header_image: String,
    pub header_image_public_id: Option<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub address: Vec<String>,
    pub whatsapp: String,
    pub facebook: String,
    pub instagram: String,
    pub twitter: String,
    pub business_hours: Vec<BusinessHours>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_string_enum_round_trip() {
        assert_eq!(HotelCategory::from_str("mid-range"), Ok(HotelCategory::MidRange));
        assert_eq!(PriceRange::Expensive.as_str(), "$$$");
        assert!(DestinationCategory::from_str("desert").is_err());
        assert_eq!(
            serde_json::to_value(AdminRole::SuperAdmin).unwrap(),
            serde_json::json!("super-admin")
        );
    }

    #[test]
    fn test_toggle() {
        assert_eq!(PublishStatus::Draft.toggled(), PublishStatus::Active);
        assert_eq!(PublishStatus::Active.toggled(), PublishStatus::Inactive);
        assert_eq!(PublishStatus::Inactive.toggled(), PublishStatus::Active);
        assert_eq!(SlideStatus::Active.toggled(), SlideStatus::Inactive);
    }

    #[test]
    fn test_entity_kind_parse_loose() {
        assert_eq!(EntityKind::parse_loose("hotel"), Some(EntityKind::Hotel));
        assert_eq!(
            EntityKind::parse_loose("Destination"),
            Some(EntityKind::Destination)
        );
        assert_eq!(EntityKind::parse_loose("tour"), None);
    }

    #[test]
    fn test_admin_never_serializes_hash() {
        let now = Utc::now();
        let admin = Admin {
            id: 1,
            email: "a@b.c".into(),
            password_hash: "secret".into(),
            name: "A".into(),
            role: AdminRole::Admin,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&admin).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["isActive"], true);
    }
}
