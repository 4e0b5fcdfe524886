//! In-process store used when no `DATABASE_URL` is configured, and by tests.
//!
//! Rows are kept in their raw form and go through the same row <-> model
//! mapping as the PostgreSQL backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::db::models::*;
use crate::db::rows::*;
use crate::db::store::{contains_ci, ListFilter, Store};
use crate::error::{AppError, AppResult, FieldError};

trait Record: Clone {
    /// Field reported when `unique_key` collides.
    const UNIQUE_FIELD: &'static str = "slug";

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn unique_key(&self) -> Option<String> {
        None
    }
}

macro_rules! slug_record {
    ($($row:ty),+) => {
        $(impl Record for $row {
            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }

            fn unique_key(&self) -> Option<String> {
                Some(self.slug.clone())
            }
        })+
    };
}

slug_record!(DestinationRow, HotelRow, RestaurantRow);

impl Record for ReviewRow {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Record for HeroSlideRow {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Record for AdminRow {
    const UNIQUE_FIELD: &'static str = "email";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_lowercase())
    }
}

struct Table<R> {
    rows: BTreeMap<i64, R>,
    last_id: i64,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<R: Record> Table<R> {
    fn check_unique(&self, row: &R) -> AppResult<()> {
        let Some(key) = row.unique_key() else {
            return Ok(());
        };
        let taken = self
            .rows
            .values()
            .any(|other| {
                other.id() != row.id() && other.unique_key().as_deref() == Some(key.as_str())
            });
        if taken {
            return Err(AppError::invalid_fields(vec![FieldError::new(
                R::UNIQUE_FIELD,
                format!("{} must be unique", R::UNIQUE_FIELD),
            )]));
        }
        Ok(())
    }

    fn insert(&mut self, mut row: R) -> AppResult<R> {
        row.set_id(0);
        self.check_unique(&row)?;
        self.last_id += 1;
        row.set_id(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        Ok(row)
    }

    fn update(&mut self, row: R) -> AppResult<Option<R>> {
        if !self.rows.contains_key(&row.id()) {
            return Ok(None);
        }
        self.check_unique(&row)?;
        self.rows.insert(row.id(), row.clone());
        Ok(Some(row))
    }

    fn get(&self, id: i64) -> Option<R> {
        self.rows.get(&id).cloned()
    }

    fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }
}

#[derive(Default)]
struct Tables {
    destinations: Table<DestinationRow>,
    hotels: Table<HotelRow>,
    restaurants: Table<RestaurantRow>,
    reviews: Table<ReviewRow>,
    slides: Table<HeroSlideRow>,
    admins: Table<AdminRow>,
    about: Option<AboutPageRow>,
    contact: Option<ContactPageRow>,
    links: Vec<NearbyLink>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

fn matches_category(filter: &ListFilter, category: Option<&str>) -> bool {
    match (&filter.category, category) {
        (Some(wanted), Some(actual)) => wanted == actual,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

fn matches_search(filter: &ListFilter, fields: &[&str]) -> bool {
    match &filter.search {
        Some(needle) => fields.iter().any(|field| contains_ci(field, needle)),
        None => true,
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Destinations
    // ------------------------------------------------------------------------

    async fn list_destinations(&self, filter: &ListFilter) -> AppResult<Vec<Destination>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Destination> = tables
            .destinations
            .rows
            .values()
            .cloned()
            .map(Destination::from)
            .filter(|d| filter.status.map_or(true, |s| d.status == s))
            .filter(|d| matches_category(filter, Some(d.category.as_str())))
            .filter(|d| matches_search(filter, &[d.name.as_str(), d.region.as_str()]))
            .collect();
        newest_first(&mut items, |d| (d.created_at, d.id));
        Ok(items)
    }

    async fn find_destination(&self, id: i64) -> AppResult<Option<Destination>> {
        Ok(self.tables.read().await.destinations.get(id).map(Into::into))
    }

    async fn insert_destination(&self, destination: &Destination) -> AppResult<Destination> {
        let row = DestinationRow::try_from(destination)?;
        let row = self.tables.write().await.destinations.insert(row)?;
        Ok(row.into())
    }

    async fn update_destination(&self, destination: &Destination) -> AppResult<Option<Destination>> {
        let row = DestinationRow::try_from(destination)?;
        let row = self.tables.write().await.destinations.update(row)?;
        Ok(row.map(Into::into))
    }

    async fn delete_destination(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.destinations.remove(id))
    }

    // ------------------------------------------------------------------------
    // Hotels
    // ------------------------------------------------------------------------

    async fn list_hotels(&self, filter: &ListFilter) -> AppResult<Vec<Hotel>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Hotel> = tables
            .hotels
            .rows
            .values()
            .cloned()
            .map(Hotel::from)
            .filter(|h| filter.status.map_or(true, |s| h.status == s))
            .filter(|h| matches_category(filter, Some(h.category.as_str())))
            .filter(|h| matches_search(filter, &[h.name.as_str()]))
            .collect();
        newest_first(&mut items, |h| (h.created_at, h.id));
        Ok(items)
    }

    async fn find_hotel(&self, id: i64) -> AppResult<Option<Hotel>> {
        Ok(self.tables.read().await.hotels.get(id).map(Into::into))
    }

    async fn insert_hotel(&self, hotel: &Hotel) -> AppResult<Hotel> {
        let row = HotelRow::try_from(hotel)?;
        let row = self.tables.write().await.hotels.insert(row)?;
        Ok(row.into())
    }

    async fn update_hotel(&self, hotel: &Hotel) -> AppResult<Option<Hotel>> {
        let row = HotelRow::try_from(hotel)?;
        let row = self.tables.write().await.hotels.update(row)?;
        Ok(row.map(Into::into))
    }

    async fn delete_hotel(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.hotels.remove(id))
    }

    // ------------------------------------------------------------------------
    // Restaurants
    // ------------------------------------------------------------------------

    async fn list_restaurants(&self, filter: &ListFilter) -> AppResult<Vec<Restaurant>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Restaurant> = tables
            .restaurants
            .rows
            .values()
            .cloned()
            .map(Restaurant::from)
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| match &filter.cuisine {
                Some(cuisine) => contains_ci(&r.cuisine, cuisine),
                None => true,
            })
            .filter(|r| matches_search(filter, &[r.name.as_str()]))
            .collect();
        newest_first(&mut items, |r| (r.created_at, r.id));
        Ok(items)
    }

    async fn find_restaurant(&self, id: i64) -> AppResult<Option<Restaurant>> {
        Ok(self.tables.read().await.restaurants.get(id).map(Into::into))
    }

    async fn insert_restaurant(&self, restaurant: &Restaurant) -> AppResult<Restaurant> {
        let row = RestaurantRow::try_from(restaurant)?;
        let row = self.tables.write().await.restaurants.insert(row)?;
        Ok(row.into())
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> AppResult<Option<Restaurant>> {
        let row = RestaurantRow::try_from(restaurant)?;
        let row = self.tables.write().await.restaurants.update(row)?;
        Ok(row.map(Into::into))
    }

    async fn delete_restaurant(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.restaurants.remove(id))
    }

    // ------------------------------------------------------------------------
    // Cross references
    // ------------------------------------------------------------------------

    async fn summaries(&self, kind: EntityKind, ids: &[i64]) -> AppResult<Vec<Summary>> {
        let tables = self.tables.read().await;
        let summaries = ids
            .iter()
            .filter_map(|&id| match kind {
                EntityKind::Destination => tables
                    .destinations
                    .get(id)
                    .map(|row| Summary::from(&Destination::from(row))),
                EntityKind::Hotel => tables
                    .hotels
                    .get(id)
                    .map(|row| Summary::from(&Hotel::from(row))),
                EntityKind::Restaurant => tables
                    .restaurants
                    .get(id)
                    .map(|row| Summary::from(&Restaurant::from(row))),
            })
            .collect();
        Ok(summaries)
    }

    async fn replace_links(
        &self,
        source_kind: EntityKind,
        source_id: i64,
        links: &[NearbyLink],
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .links
            .retain(|l| !(l.source_kind == source_kind && l.source_id == source_id));
        tables.links.extend(links.iter().cloned());
        Ok(())
    }

    async fn links_to(
        &self,
        target_kind: EntityKind,
        target_id: i64,
        source_kind: EntityKind,
    ) -> AppResult<Vec<NearbyLink>> {
        let tables = self.tables.read().await;
        let mut links: Vec<NearbyLink> = tables
            .links
            .iter()
            .filter(|l| {
                l.target_kind == target_kind
                    && l.target_id == target_id
                    && l.source_kind == source_kind
            })
            .cloned()
            .collect();
        links.sort_by_key(|l| l.source_id);
        Ok(links)
    }

    // ------------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------------

    async fn list_reviews(
        &self,
        item_type: EntityKind,
        item_id: i64,
        status: Option<ReviewStatus>,
        limit: i64,
    ) -> AppResult<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Review> = tables
            .reviews
            .rows
            .values()
            .cloned()
            .map(Review::from)
            .filter(|r| r.item_type == item_type && r.item_id == item_id)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        newest_first(&mut items, |r| (r.created_at, r.id));
        items.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(items)
    }

    async fn find_review(&self, id: i64) -> AppResult<Option<Review>> {
        Ok(self.tables.read().await.reviews.get(id).map(Into::into))
    }

    async fn insert_review(&self, review: &Review) -> AppResult<Review> {
        let row = ReviewRow::try_from(review)?;
        let row = self.tables.write().await.reviews.insert(row)?;
        Ok(row.into())
    }

    async fn update_review(&self, review: &Review) -> AppResult<Option<Review>> {
        let row = ReviewRow::try_from(review)?;
        let row = self.tables.write().await.reviews.update(row)?;
        Ok(row.map(Into::into))
    }

    async fn delete_review(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.reviews.remove(id))
    }

    // ------------------------------------------------------------------------
    // Hero slides
    // ------------------------------------------------------------------------

    async fn list_slides(&self, status: Option<SlideStatus>) -> AppResult<Vec<HeroSlide>> {
        let tables = self.tables.read().await;
        let mut items: Vec<HeroSlide> = tables
            .slides
            .rows
            .values()
            .cloned()
            .map(HeroSlide::from)
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .collect();
        items.sort_by_key(|s| (s.order, s.created_at, s.id));
        Ok(items)
    }

    async fn find_slide(&self, id: i64) -> AppResult<Option<HeroSlide>> {
        Ok(self.tables.read().await.slides.get(id).map(Into::into))
    }

    async fn insert_slide(&self, slide: &HeroSlide) -> AppResult<HeroSlide> {
        let row = self.tables.write().await.slides.insert(slide.into())?;
        Ok(row.into())
    }

    async fn update_slide(&self, slide: &HeroSlide) -> AppResult<Option<HeroSlide>> {
        let row = self.tables.write().await.slides.update(slide.into())?;
        Ok(row.map(Into::into))
    }

    async fn delete_slide(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.slides.remove(id))
    }

    async fn set_slide_order(&self, id: i64, order: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.slides.rows.get_mut(&id) {
            Some(row) => {
                row.sort_order = order;
                row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------------

    async fn find_about_page(&self) -> AppResult<Option<AboutPage>> {
        Ok(self.tables.read().await.about.clone().map(Into::into))
    }

    async fn save_about_page(&self, page: &AboutPage) -> AppResult<AboutPage> {
        let mut row = AboutPageRow::try_from(page)?;
        row.id = 1;
        self.tables.write().await.about = Some(row.clone());
        Ok(row.into())
    }

    async fn ensure_about_page(&self, page: &AboutPage) -> AppResult<AboutPage> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = &tables.about {
            return Ok(existing.clone().into());
        }
        let mut row = AboutPageRow::try_from(page)?;
        row.id = 1;
        tables.about = Some(row.clone());
        Ok(row.into())
    }

    async fn find_contact_page(&self) -> AppResult<Option<ContactPage>> {
        Ok(self.tables.read().await.contact.clone().map(Into::into))
    }

    async fn save_contact_page(&self, page: &ContactPage) -> AppResult<ContactPage> {
        let mut row = ContactPageRow::try_from(page)?;
        row.id = 1;
        self.tables.write().await.contact = Some(row.clone());
        Ok(row.into())
    }

    async fn ensure_contact_page(&self, page: &ContactPage) -> AppResult<ContactPage> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = &tables.contact {
            return Ok(existing.clone().into());
        }
        let mut row = ContactPageRow::try_from(page)?;
        row.id = 1;
        tables.contact = Some(row.clone());
        Ok(row.into())
    }

    // ------------------------------------------------------------------------
    // Admins
    // ------------------------------------------------------------------------

    async fn count_admins(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.admins.rows.len() as i64)
    }

    async fn find_admin(&self, id: i64) -> AppResult<Option<Admin>> {
        Ok(self.tables.read().await.admins.get(id).map(Into::into))
    }

    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let email = email.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .admins
            .rows
            .values()
            .find(|a| a.email.to_lowercase() == email)
            .cloned()
            .map(Into::into))
    }

    async fn insert_admin(&self, admin: &Admin) -> AppResult<Admin> {
        let row = self.tables.write().await.admins.insert(admin.into())?;
        Ok(row.into())
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(row) = self.tables.write().await.admins.rows.get_mut(&id) {
            row.last_login = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::defaults;

    fn slide(title: &str, order: i32) -> HeroSlide {
        let now = Utc::now();
        HeroSlide {
            id: 0,
            image: "https://img/x.jpg".into(),
            image_public_id: None,
            title: title.into(),
            subtitle: String::new(),
            description: String::new(),
            badge: String::new(),
            order,
            status: SlideStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_slides_ordered_and_reorderable() {
        let store = MemoryStore::new();
        let a = store.insert_slide(&slide("a", 2)).await.unwrap();
        let b = store.insert_slide(&slide("b", 1)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        let titles: Vec<_> = store
            .list_slides(None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["b", "a"]);

        assert!(store.set_slide_order(a.id, 0).await.unwrap());
        assert!(!store.set_slide_order(99, 0).await.unwrap());
        let first = store.list_slides(None).await.unwrap().remove(0);
        assert_eq!(first.title, "a");
    }

    #[tokio::test]
    async fn test_links_replaced_per_source() {
        let store = MemoryStore::new();
        let link = |source_id, target_id| NearbyLink {
            source_kind: EntityKind::Hotel,
            source_id,
            target_kind: EntityKind::Destination,
            target_id,
            distance: Some(1.0),
            unit: "km".into(),
        };
        store
            .replace_links(EntityKind::Hotel, 1, &[link(1, 10), link(1, 11)])
            .await
            .unwrap();
        store
            .replace_links(EntityKind::Hotel, 2, &[link(2, 10)])
            .await
            .unwrap();
        store
            .replace_links(EntityKind::Hotel, 1, &[link(1, 11)])
            .await
            .unwrap();

        let to_ten = store
            .links_to(EntityKind::Destination, 10, EntityKind::Hotel)
            .await
            .unwrap();
        assert_eq!(to_ten.len(), 1);
        assert_eq!(to_ten[0].source_id, 2);

        let from_restaurants = store
            .links_to(EntityKind::Destination, 11, EntityKind::Restaurant)
            .await
            .unwrap();
        assert!(from_restaurants.is_empty());
    }

    #[tokio::test]
    async fn test_pages_ensure_keeps_existing() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut page = defaults::about_page(now);
        let first = store.ensure_about_page(&page).await.unwrap();
        assert_eq!(first.id, 1);

        page.story_title = "Changed".into();
        store.save_about_page(&page).await.unwrap();
        let again = store.ensure_about_page(&defaults::about_page(now)).await.unwrap();
        assert_eq!(again.story_title, "Changed");
    }

    #[tokio::test]
    async fn test_admin_email_unique_case_insensitive() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let admin = Admin {
            id: 0,
            email: "Admin@Example.com".into(),
            password_hash: "x".into(),
            name: "Admin".into(),
            role: AdminRole::SuperAdmin,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_admin(&admin).await.unwrap();
        let dup = Admin {
            email: "admin@example.com".into(),
            ..admin.clone()
        };
        let err = store.insert_admin(&dup).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref errors, .. } if errors[0].field == "email"));

        let found = store.find_admin_by_email("ADMIN@example.COM").await.unwrap();
        assert!(found.is_some());
        assert_eq!(store.count_admins().await.unwrap(), 1);
    }
}
