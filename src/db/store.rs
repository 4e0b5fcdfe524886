//! Storage abstraction shared by the PostgreSQL and in-memory backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::*;
use crate::error::AppResult;

/// Filter for listing destinations, hotels and restaurants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub status: Option<PublishStatus>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub search: Option<String>,
}

/// Case-insensitive substring match, same semantics as `ILIKE '%needle%'`.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for health output.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> AppResult<()>;

    // Destinations
    async fn list_destinations(&self, filter: &ListFilter) -> AppResult<Vec<Destination>>;
    async fn find_destination(&self, id: i64) -> AppResult<Option<Destination>>;
    async fn insert_destination(&self, destination: &Destination) -> AppResult<Destination>;
    async fn update_destination(&self, destination: &Destination) -> AppResult<Option<Destination>>;
    async fn delete_destination(&self, id: i64) -> AppResult<bool>;

    // Hotels
    async fn list_hotels(&self, filter: &ListFilter) -> AppResult<Vec<Hotel>>;
    async fn find_hotel(&self, id: i64) -> AppResult<Option<Hotel>>;
    async fn insert_hotel(&self, hotel: &Hotel) -> AppResult<Hotel>;
    async fn update_hotel(&self, hotel: &Hotel) -> AppResult<Option<Hotel>>;
    async fn delete_hotel(&self, id: i64) -> AppResult<bool>;

    // Restaurants
    async fn list_restaurants(&self, filter: &ListFilter) -> AppResult<Vec<Restaurant>>;
    async fn find_restaurant(&self, id: i64) -> AppResult<Option<Restaurant>>;
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> AppResult<Restaurant>;
    async fn update_restaurant(&self, restaurant: &Restaurant) -> AppResult<Option<Restaurant>>;
    async fn delete_restaurant(&self, id: i64) -> AppResult<bool>;

    /// Summary projections of the given rows. Missing ids are skipped; order
    /// of the result is unspecified.
    async fn summaries(&self, kind: EntityKind, ids: &[i64]) -> AppResult<Vec<Summary>>;

    /// Replace every association row owned by `source`.
    async fn replace_links(
        &self,
        source_kind: EntityKind,
        source_id: i64,
        links: &[NearbyLink],
    ) -> AppResult<()>;

    /// Association rows of `source_kind` pointing at the given target.
    async fn links_to(
        &self,
        target_kind: EntityKind,
        target_id: i64,
        source_kind: EntityKind,
    ) -> AppResult<Vec<NearbyLink>>;

    // Reviews
    async fn list_reviews(
        &self,
        item_type: EntityKind,
        item_id: i64,
        status: Option<ReviewStatus>,
        limit: i64,
    ) -> AppResult<Vec<Review>>;
    async fn find_review(&self, id: i64) -> AppResult<Option<Review>>;
    async fn insert_review(&self, review: &Review) -> AppResult<Review>;
    async fn update_review(&self, review: &Review) -> AppResult<Option<Review>>;
    async fn delete_review(&self, id: i64) -> AppResult<bool>;

    // Hero slides
    async fn list_slides(&self, status: Option<SlideStatus>) -> AppResult<Vec<HeroSlide>>;
    async fn find_slide(&self, id: i64) -> AppResult<Option<HeroSlide>>;
    async fn insert_slide(&self, slide: &HeroSlide) -> AppResult<HeroSlide>;
    async fn update_slide(&self, slide: &HeroSlide) -> AppResult<Option<HeroSlide>>;
    async fn delete_slide(&self, id: i64) -> AppResult<bool>;
    async fn set_slide_order(&self, id: i64, order: i32) -> AppResult<bool>;

    // Singleton pages
    async fn find_about_page(&self) -> AppResult<Option<AboutPage>>;
    async fn save_about_page(&self, page: &AboutPage) -> AppResult<AboutPage>;
    /// Insert `page` unless a row already exists; returns the stored row.
    async fn ensure_about_page(&self, page: &AboutPage) -> AppResult<AboutPage>;
    async fn find_contact_page(&self) -> AppResult<Option<ContactPage>>;
    async fn save_contact_page(&self, page: &ContactPage) -> AppResult<ContactPage>;
    async fn ensure_contact_page(&self, page: &ContactPage) -> AppResult<ContactPage>;

    // Admins
    async fn count_admins(&self) -> AppResult<i64>;
    async fn find_admin(&self, id: i64) -> AppResult<Option<Admin>>;
    /// Case-insensitive email lookup.
    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<Admin>>;
    async fn insert_admin(&self, admin: &Admin) -> AppResult<Admin>;
    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> AppResult<()>;
}
