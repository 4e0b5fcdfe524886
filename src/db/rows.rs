//! Raw table rows and their mapping to domain models.
//!
//! This is the single place where semi-structured columns go through the
//! JSON codec: `Row -> Model` decodes every JSON column, `Model -> Row`
//! encodes it back. Both store backends hold and exchange rows.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::db::codec::{decode, encode};
use crate::db::models::*;

fn parse_enum<T: FromStr + Default>(field: &'static str, raw: &str) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(field, value = raw, "unknown enum value, using default");
        T::default()
    })
}

// ============================================================================
// Destination
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DestinationRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub region: String,
    pub category: String,
    pub hero_image: String,
    pub hero_image_public_id: Option<String>,
    pub overview: Option<Value>,
    pub history_and_legend: Option<Value>,
    pub where_is_located: Option<Value>,
    pub how_to_go: Option<Value>,
    pub what_to_see: Option<Value>,
    pub best_time_to_visit: Option<Value>,
    pub things_to_do: Option<Value>,
    pub where_to_stay: Option<Value>,
    pub where_to_eat: Option<Value>,
    pub travel_tips: Option<Value>,
    pub nearby_destinations: Option<Value>,
    pub meta_description: Option<String>,
    pub keywords: Option<Value>,
    pub status: String,
    pub published_date: Option<DateTime<Utc>>,
    pub completeness: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DestinationRow> for Destination {
    fn from(row: DestinationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            region: row.region,
            category: parse_enum("category", &row.category),
            hero_image: row.hero_image,
            hero_image_public_id: row.hero_image_public_id,
            overview: decode("overview", row.overview),
            history_and_legend: decode("historyAndLegend", row.history_and_legend),
            where_is_located: decode("whereIsLocated", row.where_is_located),
            how_to_go: decode("howToGo", row.how_to_go),
            what_to_see: decode("whatToSee", row.what_to_see),
            best_time_to_visit: decode("bestTimeToVisit", row.best_time_to_visit),
            things_to_do: decode("thingsToDo", row.things_to_do),
            where_to_stay: decode("whereToStay", row.where_to_stay),
            where_to_eat: decode("whereToEat", row.where_to_eat),
            travel_tips: decode("travelTips", row.travel_tips),
            nearby_destinations: decode("nearbyDestinations", row.nearby_destinations),
            meta_description: row.meta_description,
            keywords: decode("keywords", row.keywords),
            status: parse_enum("status", &row.status),
            published_date: row.published_date,
            completeness: row.completeness,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<&Destination> for DestinationRow {
    type Error = serde_json::Error;

    fn try_from(d: &Destination) -> Result<Self, Self::Error> {
        Ok(Self {
            id: d.id,
            name: d.name.clone(),
            slug: d.slug.clone(),
            region: d.region.clone(),
            category: d.category.as_str().to_string(),
            hero_image: d.hero_image.clone(),
            hero_image_public_id: d.hero_image_public_id.clone(),
            overview: Some(encode(&d.overview)?),
            history_and_legend: Some(encode(&d.history_and_legend)?),
            where_is_located: Some(encode(&d.where_is_located)?),
            how_to_go: Some(encode(&d.how_to_go)?),
            what_to_see: Some(encode(&d.what_to_see)?),
            best_time_to_visit: Some(encode(&d.best_time_to_visit)?),
            things_to_do: Some(encode(&d.things_to_do)?),
            where_to_stay: Some(encode(&d.where_to_stay)?),
            where_to_eat: Some(encode(&d.where_to_eat)?),
            travel_tips: Some(encode(&d.travel_tips)?),
            nearby_destinations: Some(encode(&d.nearby_destinations)?),
            meta_description: d.meta_description.clone(),
            keywords: Some(encode(&d.keywords)?),
            status: d.status.as_str().to_string(),
            published_date: d.published_date,
            completeness: d.completeness,
            created_at: d.created_at,
            updated_at: d.updated_at,
        })
    }
}

// ============================================================================
// Hotel
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct HotelRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub price: Option<f64>,
    pub currency: String,
    pub hero_image: String,
    pub hero_image_public_id: Option<String>,
    pub photo_gallery: Option<Value>,
    pub quick_summary: String,
    pub full_description: String,
    pub amenities: Option<Value>,
    pub location: Option<Value>,
    pub contact: Option<Value>,
    pub nearby_destinations: Option<Value>,
    pub rating: f64,
    pub review_count: i32,
    pub meta_description: Option<String>,
    pub keywords: Option<Value>,
    pub status: String,
    pub published_date: Option<DateTime<Utc>>,
    pub completeness: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            category: parse_enum("category", &row.category),
            price: row.price,
            currency: row.currency,
            hero_image: row.hero_image,
            hero_image_public_id: row.hero_image_public_id,
            photo_gallery: decode("photoGallery", row.photo_gallery),
            quick_summary: row.quick_summary,
            full_description: row.full_description,
            amenities: decode("amenities", row.amenities),
            location: decode("location", row.location),
            contact: decode("contact", row.contact),
            nearby_destinations: decode("nearbyDestinations", row.nearby_destinations),
            rating: row.rating,
            review_count: row.review_count,
            meta_description: row.meta_description,
            keywords: decode("keywords", row.keywords),
            status: parse_enum("status", &row.status),
            published_date: row.published_date,
            completeness: row.completeness,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<&Hotel> for HotelRow {
    type Error = serde_json::Error;

    fn try_from(h: &Hotel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: h.id,
            name: h.name.clone(),
            slug: h.slug.clone(),
            category: h.category.as_str().to_string(),
            price: h.price,
            currency: h.currency.clone(),
            hero_image: h.hero_image.clone(),
            hero_image_public_id: h.hero_image_public_id.clone(),
            photo_gallery: Some(encode(&h.photo_gallery)?),
            quick_summary: h.quick_summary.clone(),
            full_description: h.full_description.clone(),
            amenities: Some(encode(&h.amenities)?),
            location: Some(encode(&h.location)?),
            contact: Some(encode(&h.contact)?),
            nearby_destinations: Some(encode(&h.nearby_destinations)?),
            rating: h.rating,
            review_count: h.review_count,
            meta_description: h.meta_description.clone(),
            keywords: Some(encode(&h.keywords)?),
            status: h.status.as_str().to_string(),
            published_date: h.published_date,
            completeness: h.completeness,
            created_at: h.created_at,
            updated_at: h.updated_at,
        })
    }
}

// ============================================================================
// Restaurant
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct RestaurantRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub cuisine: String,
    pub price: Option<f64>,
    pub price_range: Option<String>,
    pub currency: String,
    pub specialty: String,
    pub hero_image: String,
    pub hero_image_public_id: Option<String>,
    pub photo_gallery: Option<Value>,
    pub quick_summary: String,
    pub full_description: String,
    pub menu_highlights: Option<Value>,
    pub hours: Option<Value>,
    pub location: Option<Value>,
    pub contact: Option<Value>,
    pub nearby_destinations: Option<Value>,
    pub rating: f64,
    pub review_count: i32,
    pub meta_description: Option<String>,
    pub keywords: Option<Value>,
    pub status: String,
    pub published_date: Option<DateTime<Utc>>,
    pub completeness: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            cuisine: row.cuisine,
            price: row.price,
            price_range: row.price_range.as_deref().and_then(|s| s.parse().ok()),
            currency: row.currency,
            specialty: row.specialty,
            hero_image: row.hero_image,
            hero_image_public_id: row.hero_image_public_id,
            photo_gallery: decode("photoGallery", row.photo_gallery),
            quick_summary: row.quick_summary,
            full_description: row.full_description,
            menu_highlights: decode("menuHighlights", row.menu_highlights),
            hours: decode("hours", row.hours),
            location: decode("location", row.location),
            contact: decode("contact", row.contact),
            nearby_destinations: decode("nearbyDestinations", row.nearby_destinations),
            rating: row.rating,
            review_count: row.review_count,
            meta_description: row.meta_description,
            keywords: decode("keywords", row.keywords),
            status: parse_enum("status", &row.status),
            published_date: row.published_date,
            completeness: row.completeness,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<&Restaurant> for RestaurantRow {
    type Error = serde_json::Error;

    fn try_from(r: &Restaurant) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name.clone(),
            slug: r.slug.clone(),
            cuisine: r.cuisine.clone(),
            price: r.price,
            price_range: r.price_range.map(|p| p.as_str().to_string()),
            currency: r.currency.clone(),
            specialty: r.specialty.clone(),
            hero_image: r.hero_image.clone(),
            hero_image_public_id: r.hero_image_public_id.clone(),
            photo_gallery: Some(encode(&r.photo_gallery)?),
            quick_summary: r.quick_summary.clone(),
            full_description: r.full_description.clone(),
            menu_highlights: Some(encode(&r.menu_highlights)?),
            hours: Some(encode(&r.hours)?),
            location: Some(encode(&r.location)?),
            contact: Some(encode(&r.contact)?),
            nearby_destinations: Some(encode(&r.nearby_destinations)?),
            rating: r.rating,
            review_count: r.review_count,
            meta_description: r.meta_description.clone(),
            keywords: Some(encode(&r.keywords)?),
            status: r.status.as_str().to_string(),
            published_date: r.published_date,
            completeness: r.completeness,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

// ============================================================================
// Summary projection
// ============================================================================

/// Narrow row used to build [`Summary`] projections across all three tables.
/// `location` is only selected for hotels and restaurants.
#[derive(Debug, Clone, FromRow)]
pub struct SummaryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub hero_image: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub location: Option<Value>,
    pub cuisine: Option<String>,
    pub status: String,
}

impl SummaryRow {
    pub fn into_summary(self, kind: EntityKind) -> Summary {
        let region = match self.region {
            Some(region) => Some(region),
            None => {
                let location: crate::db::sections::Location = decode("location", self.location);
                Some(location.region)
            }
        };
        Summary {
            kind: Some(kind),
            id: self.id,
            name: self.name,
            slug: self.slug,
            hero_image: self.hero_image,
            category: self.category,
            region,
            cuisine: self.cuisine,
            status: parse_enum("status", &self.status),
        }
    }
}

// ============================================================================
// Review
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub item_type: String,
    pub item_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub photos: Option<Value>,
    pub helpful: i32,
    pub status: String,
    pub moderated_by: Option<i64>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            item_type: EntityKind::parse_loose(&row.item_type).unwrap_or_else(|| {
                tracing::warn!(value = %row.item_type, "unknown review itemType");
                EntityKind::Destination
            }),
            item_id: row.item_id,
            user_name: row.user_name,
            user_email: row.user_email,
            rating: row.rating,
            title: row.title,
            comment: row.comment,
            photos: decode("photos", row.photos),
            helpful: row.helpful,
            status: parse_enum("status", &row.status),
            moderated_by: row.moderated_by,
            moderated_at: row.moderated_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<&Review> for ReviewRow {
    type Error = serde_json::Error;

    fn try_from(r: &Review) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            item_type: r.item_type.as_str().to_string(),
            item_id: r.item_id,
            user_name: r.user_name.clone(),
            user_email: r.user_email.clone(),
            rating: r.rating,
            title: r.title.clone(),
            comment: r.comment.clone(),
            photos: Some(encode(&r.photos)?),
            helpful: r.helpful,
            status: r.status.as_str().to_string(),
            moderated_by: r.moderated_by,
            moderated_at: r.moderated_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

// ============================================================================
// Hero slide
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct HeroSlideRow {
    pub id: i64,
    pub image: String,
    pub image_public_id: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub badge: String,
    pub sort_order: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HeroSlideRow> for HeroSlide {
    fn from(row: HeroSlideRow) -> Self {
        Self {
            id: row.id,
            image: row.image,
            image_public_id: row.image_public_id,
            title: row.title,
            subtitle: row.subtitle,
            description: row.description,
            badge: row.badge,
            order: row.sort_order,
            status: parse_enum("status", &row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&HeroSlide> for HeroSlideRow {
    fn from(s: &HeroSlide) -> Self {
        Self {
            id: s.id,
            image: s.image.clone(),
            image_public_id: s.image_public_id.clone(),
            title: s.title.clone(),
            subtitle: s.subtitle.clone(),
            description: s.description.clone(),
            badge: s.badge.clone(),
            sort_order: s.order,
            status: s.status.as_str().to_string(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct AboutPageRow {
    pub id: i64,
    pub header_image: String,
    pub header_image_public_id: Option<String>,
    pub stats: Option<Value>,
    pub story_title: String,
    pub story_paragraph1: String,
    pub story_paragraph2: String,
    pub story_paragraph3: String,
    pub company_values: Option<Value>,
    pub team_members: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AboutPageRow> for AboutPage {
    fn from(row: AboutPageRow) -> Self {
        Self {
            id: row.id,
            header_image: row.header_image,
            header_image_public_id: row.header_image_public_id,
            stats: decode("stats", row.stats),
            story_title: row.story_title,
            story_paragraph1: row.story_paragraph1,
            story_paragraph2: row.story_paragraph2,
            story_paragraph3: row.story_paragraph3,
            values: decode("values", row.company_values),
            team_members: decode("teamMembers", row.team_members),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<&AboutPage> for AboutPageRow {
    type Error = serde_json::Error;

    fn try_from(p: &AboutPage) -> Result<Self, Self::Error> {
        Ok(Self {
            id: p.id,
            header_image: p.header_image.clone(),
            header_image_public_id: p.header_image_public_id.clone(),
            stats: Some(encode(&p.stats)?),
            story_title: p.story_title.clone(),
            story_paragraph1: p.story_paragraph1.clone(),
            story_paragraph2: p.story_paragraph2.clone(),
            story_paragraph3: p.story_paragraph3.clone(),
            company_values: Some(encode(&p.values)?),
            team_members: Some(encode(&p.team_members)?),
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ContactPageRow {
    pub id: i64,
    pub header_image: String,
    pub header_image_public_id: Option<String>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub address: Option<Value>,
    pub whatsapp: String,
    pub facebook: String,
    pub instagram: String,
    pub twitter: String,
    pub business_hours: Option<Value>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContactPageRow> for ContactPage {
    fn from(row: ContactPageRow) -> Self {
        Self {
            id: row.id,
            header_image: row.header_image,
            header_image_public_id: row.header_image_public_id,
            email: decode("email", row.email),
            phone: decode("phone", row.phone),
            address: decode("address", row.address),
            whatsapp: row.whatsapp,
            facebook: row.facebook,
            instagram: row.instagram,
            twitter: row.twitter,
            business_hours: decode("businessHours", row.business_hours),
            timezone: row.timezone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<&ContactPage> for ContactPageRow {
    type Error = serde_json::Error;

    fn try_from(p: &ContactPage) -> Result<Self, Self::Error> {
        Ok(Self {
            id: p.id,
            header_image: p.header_image.clone(),
            header_image_public_id: p.header_image_public_id.clone(),
            email: Some(encode(&p.email)?),
            phone: Some(encode(&p.phone)?),
            address: Some(encode(&p.address)?),
            whatsapp: p.whatsapp.clone(),
            facebook: p.facebook.clone(),
            instagram: p.instagram.clone(),
            twitter: p.twitter.clone(),
            business_hours: Some(encode(&p.business_hours)?),
            timezone: p.timezone.clone(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
    }
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            role: parse_enum("role", &row.role),
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Admin> for AdminRow {
    fn from(a: &Admin) -> Self {
        Self {
            id: a.id,
            email: a.email.clone(),
            password_hash: a.password_hash.clone(),
            name: a.name.clone(),
            role: a.role.as_str().to_string(),
            is_active: a.is_active,
            last_login: a.last_login,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hotel_row() -> HotelRow {
        let now = Utc::now();
        HotelRow {
            id: 1,
            name: "Jetwing".into(),
            slug: "jetwing".into(),
            category: "luxury".into(),
            price: Some(120.0),
            currency: "USD".into(),
            hero_image: String::new(),
            hero_image_public_id: None,
            photo_gallery: Some(json!("[\"https://img/a.jpg\"]")),
            quick_summary: String::new(),
            full_description: String::new(),
            amenities: Some(json!("{broken")),
            location: None,
            contact: Some(json!({ "phone": "123" })),
            nearby_destinations: Some(json!([{ "destinationId": "4", "distance": "x" }])),
            rating: 0.0,
            review_count: 0,
            meta_description: None,
            keywords: Some(Value::Null),
            status: "bogus".into(),
            published_date: None,
            completeness: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_to_model_decodes_every_json_column() {
        let hotel: Hotel = hotel_row().into();
        assert_eq!(hotel.photo_gallery.0[0].url, "https://img/a.jpg");
        assert!(hotel.amenities.is_empty());
        assert_eq!(hotel.location.region, "");
        assert_eq!(hotel.contact.get("phone"), Some(&json!("123")));
        assert_eq!(hotel.nearby_destinations[0].destination_id, Some(4));
        assert_eq!(hotel.nearby_destinations[0].distance, None);
        assert!(hotel.keywords.is_empty());
        assert_eq!(hotel.status, PublishStatus::Draft);
        assert_eq!(hotel.category, HotelCategory::Luxury);
    }

    #[test]
    fn test_model_to_row_stores_structured_json() {
        let hotel: Hotel = hotel_row().into();
        let row = HotelRow::try_from(&hotel).unwrap();
        assert!(row.photo_gallery.as_ref().unwrap().is_array());
        assert!(row.location.as_ref().unwrap().is_object());
        assert_eq!(row.status, "draft");
    }

    #[test]
    fn test_summary_row_reads_region_from_location() {
        let row = SummaryRow {
            id: 2,
            name: "Spice".into(),
            slug: "spice".into(),
            hero_image: String::new(),
            category: None,
            region: None,
            location: Some(json!(r#"{"region":"Kandy"}"#)),
            cuisine: Some("Sri Lankan".into()),
            status: "active".into(),
        };
        let summary = row.into_summary(EntityKind::Restaurant);
        assert_eq!(summary.region.as_deref(), Some("Kandy"));
        assert_eq!(summary.status, PublishStatus::Active);
    }
}
