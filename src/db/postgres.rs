//! PostgreSQL store. Semi-structured attributes live in JSONB columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::PgArguments, query::QueryAs, FromRow, PgPool, Postgres, QueryBuilder,
};

use crate::db::models::*;
use crate::db::rows::*;
use crate::db::store::{ListFilter, Store};
use crate::error::AppResult;

type RowQuery<'q, R> = QueryAs<'q, Postgres, R, PgArguments>;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const DESTINATION_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "region",
    "category",
    "hero_image",
    "hero_image_public_id",
    "overview",
    "history_and_legend",
    "where_is_located",
    "how_to_go",
    "what_to_see",
    "best_time_to_visit",
    "things_to_do",
    "where_to_stay",
    "where_to_eat",
    "travel_tips",
    "nearby_destinations",
    "meta_description",
    "keywords",
    "status",
    "published_date",
    "completeness",
    "created_at",
    "updated_at",
];

const HOTEL_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "category",
    "price",
    "currency",
    "hero_image",
    "hero_image_public_id",
    "photo_gallery",
    "quick_summary",
    "full_description",
    "amenities",
    "location",
    "contact",
    "nearby_destinations",
    "rating",
    "review_count",
    "meta_description",
    "keywords",
    "status",
    "published_date",
    "completeness",
    "created_at",
    "updated_at",
];

const RESTAURANT_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "cuisine",
    "price",
    "price_range",
    "currency",
    "specialty",
    "hero_image",
    "hero_image_public_id",
    "photo_gallery",
    "quick_summary",
    "full_description",
    "menu_highlights",
    "hours",
    "location",
    "contact",
    "nearby_destinations",
    "rating",
    "review_count",
    "meta_description",
    "keywords",
    "status",
    "published_date",
    "completeness",
    "created_at",
    "updated_at",
];

const REVIEW_COLUMNS: &[&str] = &[
    "item_type",
    "item_id",
    "user_name",
    "user_email",
    "rating",
    "title",
    "comment",
    "photos",
    "helpful",
    "status",
    "moderated_by",
    "moderated_at",
    "created_at",
    "updated_at",
];

const SLIDE_COLUMNS: &[&str] = &[
    "image",
    "image_public_id",
    "title",
    "subtitle",
    "description",
    "badge",
    "sort_order",
    "status",
    "created_at",
    "updated_at",
];

const ABOUT_COLUMNS: &[&str] = &[
    "header_image",
    "header_image_public_id",
    "stats",
    "story_title",
    "story_paragraph1",
    "story_paragraph2",
    "story_paragraph3",
    "company_values",
    "team_members",
    "created_at",
    "updated_at",
];

const CONTACT_COLUMNS: &[&str] = &[
    "header_image",
    "header_image_public_id",
    "email",
    "phone",
    "address",
    "whatsapp",
    "facebook",
    "instagram",
    "twitter",
    "business_hours",
    "timezone",
    "created_at",
    "updated_at",
];

const ADMIN_COLUMNS: &[&str] = &[
    "email",
    "password_hash",
    "name",
    "role",
    "is_active",
    "last_login",
    "created_at",
    "updated_at",
];

/// `INSERT INTO t (c1, ..) VALUES ($1, ..) RETURNING *`
fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders}) RETURNING *",
        columns.join(", ")
    )
}

/// `UPDATE t SET c1 = $2, .. WHERE id = $1 RETURNING *`
fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {table} SET {assignments} WHERE id = $1 RETURNING *")
}

/// Singleton upsert on the fixed row `id = 1`.
fn upsert_singleton_sql(table: &str, columns: &[&str], overwrite: bool) -> String {
    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let conflict = if overwrite {
        let assignments = columns
            .iter()
            .filter(|c| **c != "created_at")
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("DO UPDATE SET {assignments}")
    } else {
        "DO NOTHING".to_string()
    };
    format!(
        "INSERT INTO {table} (id, {}) VALUES (1, {placeholders}) ON CONFLICT (id) {conflict}",
        columns.join(", ")
    )
}

fn bind_destination(q: RowQuery<'_, DestinationRow>, r: DestinationRow) -> RowQuery<'_, DestinationRow> {
    q.bind(r.name)
        .bind(r.slug)
        .bind(r.region)
        .bind(r.category)
        .bind(r.hero_image)
        .bind(r.hero_image_public_id)
        .bind(r.overview)
        .bind(r.history_and_legend)
        .bind(r.where_is_located)
        .bind(r.how_to_go)
        .bind(r.what_to_see)
        .bind(r.best_time_to_visit)
        .bind(r.things_to_do)
        .bind(r.where_to_stay)
        .bind(r.where_to_eat)
        .bind(r.travel_tips)
        .bind(r.nearby_destinations)
        .bind(r.meta_description)
        .bind(r.keywords)
        .bind(r.status)
        .bind(r.published_date)
        .bind(r.completeness)
        .bind(r.created_at)
        .bind(r.updated_at)
}

fn bind_hotel(q: RowQuery<'_, HotelRow>, r: HotelRow) -> RowQuery<'_, HotelRow> {
    q.bind(r.name)
        .bind(r.slug)
        .bind(r.category)
        .bind(r.price)
        .bind(r.currency)
        .bind(r.hero_image)
        .bind(r.hero_image_public_id)
        .bind(r.photo_gallery)
        .bind(r.quick_summary)
        .bind(r.full_description)
        .bind(r.amenities)
        .bind(r.location)
        .bind(r.contact)
        .bind(r.nearby_destinations)
        .bind(r.rating)
        .bind(r.review_count)
        .bind(r.meta_description)
        .bind(r.keywords)
        .bind(r.status)
        .bind(r.published_date)
        .bind(r.completeness)
        .bind(r.created_at)
        .bind(r.updated_at)
}

fn bind_restaurant(q: RowQuery<'_, RestaurantRow>, r: RestaurantRow) -> RowQuery<'_, RestaurantRow> {
    q.bind(r.name)
        .bind(r.slug)
        .bind(r.cuisine)
        .bind(r.price)
        .bind(r.price_range)
        .bind(r.currency)
        .bind(r.specialty)
        .bind(r.hero_image)
        .bind(r.hero_image_public_id)
        .bind(r.photo_gallery)
        .bind(r.quick_summary)
        .bind(r.full_description)
        .bind(r.menu_highlights)
        .bind(r.hours)
        .bind(r.location)
        .bind(r.contact)
        .bind(r.nearby_destinations)
        .bind(r.rating)
        .bind(r.review_count)
        .bind(r.meta_description)
        .bind(r.keywords)
        .bind(r.status)
        .bind(r.published_date)
        .bind(r.completeness)
        .bind(r.created_at)
        .bind(r.updated_at)
}

fn bind_review(q: RowQuery<'_, ReviewRow>, r: ReviewRow) -> RowQuery<'_, ReviewRow> {
    q.bind(r.item_type)
        .bind(r.item_id)
        .bind(r.user_name)
        .bind(r.user_email)
        .bind(r.rating)
        .bind(r.title)
        .bind(r.comment)
        .bind(r.photos)
        .bind(r.helpful)
        .bind(r.status)
        .bind(r.moderated_by)
        .bind(r.moderated_at)
        .bind(r.created_at)
        .bind(r.updated_at)
}

fn bind_slide(q: RowQuery<'_, HeroSlideRow>, r: HeroSlideRow) -> RowQuery<'_, HeroSlideRow> {
    q.bind(r.image)
        .bind(r.image_public_id)
        .bind(r.title)
        .bind(r.subtitle)
        .bind(r.description)
        .bind(r.badge)
        .bind(r.sort_order)
        .bind(r.status)
        .bind(r.created_at)
        .bind(r.updated_at)
}

fn bind_admin(q: RowQuery<'_, AdminRow>, r: AdminRow) -> RowQuery<'_, AdminRow> {
    q.bind(r.email.to_lowercase())
        .bind(r.password_hash)
        .bind(r.name)
        .bind(r.role)
        .bind(r.is_active)
        .bind(r.last_login)
        .bind(r.created_at)
        .bind(r.updated_at)
}

/// Appends the shared listing predicates and the newest-first ordering.
fn push_listing_filter(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &ListFilter,
    search_columns: &[&str],
) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(cuisine) = &filter.cuisine {
        qb.push(" AND cuisine ILIKE ").push_bind(format!("%{cuisine}%"));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (");
        for (i, column) in search_columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
        }
        qb.push(")");
    }
    qb.push(" ORDER BY created_at DESC, id DESC");
}

#[derive(Debug, FromRow)]
struct LinkRow {
    source_kind: String,
    source_id: i64,
    target_kind: String,
    target_id: i64,
    distance: Option<f64>,
    unit: String,
}

impl LinkRow {
    fn into_link(self) -> Option<NearbyLink> {
        Some(NearbyLink {
            source_kind: EntityKind::parse_loose(&self.source_kind)?,
            source_id: self.source_id,
            target_kind: EntityKind::parse_loose(&self.target_kind)?,
            target_id: self.target_id,
            distance: self.distance,
            unit: self.unit,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Destinations
    // ------------------------------------------------------------------------

    async fn list_destinations(&self, filter: &ListFilter) -> AppResult<Vec<Destination>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM destinations WHERE 1 = 1");
        push_listing_filter(&mut qb, filter, &["name", "region"]);
        let rows = qb
            .build_query_as::<DestinationRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_destination(&self, id: i64) -> AppResult<Option<Destination>> {
        let row = sqlx::query_as::<_, DestinationRow>("SELECT * FROM destinations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_destination(&self, destination: &Destination) -> AppResult<Destination> {
        let sql = insert_sql("destinations", DESTINATION_COLUMNS);
        let row = DestinationRow::try_from(destination)?;
        let row = bind_destination(sqlx::query_as(&sql), row)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_destination(&self, destination: &Destination) -> AppResult<Option<Destination>> {
        let sql = update_sql("destinations", DESTINATION_COLUMNS);
        let row = DestinationRow::try_from(destination)?;
        let row = bind_destination(sqlx::query_as(&sql).bind(destination.id), row)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_destination(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM destinations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------------
    // Hotels
    // ------------------------------------------------------------------------

    async fn list_hotels(&self, filter: &ListFilter) -> AppResult<Vec<Hotel>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM hotels WHERE 1 = 1");
        push_listing_filter(&mut qb, filter, &["name"]);
        let rows = qb
            .build_query_as::<HotelRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_hotel(&self, id: i64) -> AppResult<Option<Hotel>> {
        let row = sqlx::query_as::<_, HotelRow>("SELECT * FROM hotels WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_hotel(&self, hotel: &Hotel) -> AppResult<Hotel> {
        let sql = insert_sql("hotels", HOTEL_COLUMNS);
        let row = HotelRow::try_from(hotel)?;
        let row = bind_hotel(sqlx::query_as(&sql), row)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_hotel(&self, hotel: &Hotel) -> AppResult<Option<Hotel>> {
        let sql = update_sql("hotels", HOTEL_COLUMNS);
        let row = HotelRow::try_from(hotel)?;
        let row = bind_hotel(sqlx::query_as(&sql).bind(hotel.id), row)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_hotel(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------------
    // Restaurants
    // ------------------------------------------------------------------------

    async fn list_restaurants(&self, filter: &ListFilter) -> AppResult<Vec<Restaurant>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM restaurants WHERE 1 = 1");
        push_listing_filter(&mut qb, filter, &["name"]);
        let rows = qb
            .build_query_as::<RestaurantRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_restaurant(&self, id: i64) -> AppResult<Option<Restaurant>> {
        let row = sqlx::query_as::<_, RestaurantRow>("SELECT * FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_restaurant(&self, restaurant: &Restaurant) -> AppResult<Restaurant> {
        let sql = insert_sql("restaurants", RESTAURANT_COLUMNS);
        let row = RestaurantRow::try_from(restaurant)?;
        let row = bind_restaurant(sqlx::query_as(&sql), row)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> AppResult<Option<Restaurant>> {
        let sql = update_sql("restaurants", RESTAURANT_COLUMNS);
        let row = RestaurantRow::try_from(restaurant)?;
        let row = bind_restaurant(sqlx::query_as(&sql).bind(restaurant.id), row)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_restaurant(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------------
    // Cross references
    // ------------------------------------------------------------------------

    async fn summaries(&self, kind: EntityKind, ids: &[i64]) -> AppResult<Vec<Summary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = match kind {
            EntityKind::Destination => {
                "SELECT id, name, slug, hero_image, category, region, \
                 NULL::jsonb AS location, NULL::text AS cuisine, status \
                 FROM destinations WHERE id = ANY($1)"
            }
            EntityKind::Hotel => {
                "SELECT id, name, slug, hero_image, category, NULL::text AS region, \
                 location, NULL::text AS cuisine, status \
                 FROM hotels WHERE id = ANY($1)"
            }
            EntityKind::Restaurant => {
                "SELECT id, name, slug, hero_image, NULL::text AS category, \
                 NULL::text AS region, location, cuisine, status \
                 FROM restaurants WHERE id = ANY($1)"
            }
        };
        let rows = sqlx::query_as::<_, SummaryRow>(sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.into_summary(kind)).collect())
    }

    async fn replace_links(
        &self,
        source_kind: EntityKind,
        source_id: i64,
        links: &[NearbyLink],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM nearby_links WHERE source_kind = $1 AND source_id = $2")
            .bind(source_kind.as_str())
            .bind(source_id)
            .execute(&mut *tx)
            .await?;

        for (position, link) in links.iter().enumerate() {
            sqlx::query(
                "INSERT INTO nearby_links \
                 (source_kind, source_id, target_kind, target_id, distance, unit, position) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(link.source_kind.as_str())
            .bind(link.source_id)
            .bind(link.target_kind.as_str())
            .bind(link.target_id)
            .bind(link.distance)
            .bind(&link.unit)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn links_to(
        &self,
        target_kind: EntityKind,
        target_id: i64,
        source_kind: EntityKind,
    ) -> AppResult<Vec<NearbyLink>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            "SELECT source_kind, source_id, target_kind, target_id, distance, unit \
             FROM nearby_links \
             WHERE target_kind = $1 AND target_id = $2 AND source_kind = $3 \
             ORDER BY source_id, position",
        )
        .bind(target_kind.as_str())
        .bind(target_id)
        .bind(source_kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(LinkRow::into_link).collect())
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
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews \
             WHERE item_type = $1 AND item_id = $2 AND ($3::text IS NULL OR status = $3) \
             ORDER BY created_at DESC, id DESC LIMIT $4",
        )
        .bind(item_type.as_str())
        .bind(item_id)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_review(&self, id: i64) -> AppResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_review(&self, review: &Review) -> AppResult<Review> {
        let sql = insert_sql("reviews", REVIEW_COLUMNS);
        let row = ReviewRow::try_from(review)?;
        let row = bind_review(sqlx::query_as(&sql), row)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_review(&self, review: &Review) -> AppResult<Option<Review>> {
        let sql = update_sql("reviews", REVIEW_COLUMNS);
        let row = ReviewRow::try_from(review)?;
        let row = bind_review(sqlx::query_as(&sql).bind(review.id), row)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_review(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------------
    // Hero slides
    // ------------------------------------------------------------------------

    async fn list_slides(&self, status: Option<SlideStatus>) -> AppResult<Vec<HeroSlide>> {
        let rows = sqlx::query_as::<_, HeroSlideRow>(
            "SELECT * FROM hero_slides \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY sort_order ASC, created_at ASC, id ASC",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_slide(&self, id: i64) -> AppResult<Option<HeroSlide>> {
        let row = sqlx::query_as::<_, HeroSlideRow>("SELECT * FROM hero_slides WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_slide(&self, slide: &HeroSlide) -> AppResult<HeroSlide> {
        let sql = insert_sql("hero_slides", SLIDE_COLUMNS);
        let row = bind_slide(sqlx::query_as(&sql), slide.into())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_slide(&self, slide: &HeroSlide) -> AppResult<Option<HeroSlide>> {
        let sql = update_sql("hero_slides", SLIDE_COLUMNS);
        let row = bind_slide(sqlx::query_as(&sql).bind(slide.id), slide.into())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_slide(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM hero_slides WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_slide_order(&self, id: i64, order: i32) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE hero_slides SET sort_order = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(order)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------------

    async fn find_about_page(&self) -> AppResult<Option<AboutPage>> {
        let row = sqlx::query_as::<_, AboutPageRow>("SELECT * FROM about_page WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn save_about_page(&self, page: &AboutPage) -> AppResult<AboutPage> {
        let sql = upsert_singleton_sql("about_page", ABOUT_COLUMNS, true);
        write_about(&self.pool, &sql, page).await?;
        self.find_about_page()
            .await?
            .ok_or_else(|| crate::error::AppError::internal("about page vanished after save"))
    }

    async fn ensure_about_page(&self, page: &AboutPage) -> AppResult<AboutPage> {
        let sql = upsert_singleton_sql("about_page", ABOUT_COLUMNS, false);
        write_about(&self.pool, &sql, page).await?;
        self.find_about_page()
            .await?
            .ok_or_else(|| crate::error::AppError::internal("about page missing after ensure"))
    }

    async fn find_contact_page(&self) -> AppResult<Option<ContactPage>> {
        let row = sqlx::query_as::<_, ContactPageRow>("SELECT * FROM contact_page WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn save_contact_page(&self, page: &ContactPage) -> AppResult<ContactPage> {
        let sql = upsert_singleton_sql("contact_page", CONTACT_COLUMNS, true);
        write_contact(&self.pool, &sql, page).await?;
        self.find_contact_page()
            .await?
            .ok_or_else(|| crate::error::AppError::internal("contact page vanished after save"))
    }

    async fn ensure_contact_page(&self, page: &ContactPage) -> AppResult<ContactPage> {
        let sql = upsert_singleton_sql("contact_page", CONTACT_COLUMNS, false);
        write_contact(&self.pool, &sql, page).await?;
        self.find_contact_page()
            .await?
            .ok_or_else(|| crate::error::AppError::internal("contact page missing after ensure"))
    }

    // ------------------------------------------------------------------------
    // Admins
    // ------------------------------------------------------------------------

    async fn count_admins(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_admin(&self, id: i64) -> AppResult<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let row =
            sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_admin(&self, admin: &Admin) -> AppResult<Admin> {
        let sql = insert_sql("admins", ADMIN_COLUMNS);
        let row = bind_admin(sqlx::query_as(&sql), admin.into())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE admins SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn write_about(pool: &PgPool, sql: &str, page: &AboutPage) -> AppResult<()> {
    let r = AboutPageRow::try_from(page)?;
    sqlx::query(sql)
        .bind(r.header_image)
        .bind(r.header_image_public_id)
        .bind(r.stats)
        .bind(r.story_title)
        .bind(r.story_paragraph1)
        .bind(r.story_paragraph2)
        .bind(r.story_paragraph3)
        .bind(r.company_values)
        .bind(r.team_members)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(pool)
        .await?;
    Ok(())
}

async fn write_contact(pool: &PgPool, sql: &str, page: &ContactPage) -> AppResult<()> {
    let r = ContactPageRow::try_from(page)?;
    sqlx::query(sql)
        .bind(r.header_image)
        .bind(r.header_image_public_id)
        .bind(r.email)
        .bind(r.phone)
        .bind(r.address)
        .bind(r.whatsapp)
        .bind(r.facebook)
        .bind(r.instagram)
        .bind(r.twitter)
        .bind(r.business_hours)
        .bind(r.timezone)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_placeholders() {
        assert_eq!(
            insert_sql("admins", &["email", "name"]),
            "INSERT INTO admins (email, name) VALUES ($1, $2) RETURNING *"
        );
    }

    #[test]
    fn test_update_sql_offsets_by_id() {
        assert_eq!(
            update_sql("hotels", &["name", "slug"]),
            "UPDATE hotels SET name = $2, slug = $3 WHERE id = $1 RETURNING *"
        );
    }

    #[test]
    fn test_singleton_upsert_keeps_created_at() {
        let sql = upsert_singleton_sql("about_page", &["story_title", "created_at"], true);
        assert!(sql.starts_with("INSERT INTO about_page (id, story_title, created_at) VALUES (1, $1, $2)"));
        assert!(sql.ends_with("DO UPDATE SET story_title = EXCLUDED.story_title"));

        let sql = upsert_singleton_sql("about_page", &["story_title"], false);
        assert!(sql.ends_with("ON CONFLICT (id) DO NOTHING"));
    }

    #[test]
    fn test_column_lists_match_bind_counts() {
        assert_eq!(DESTINATION_COLUMNS.len(), 24);
        assert_eq!(HOTEL_COLUMNS.len(), 23);
        assert_eq!(RESTAURANT_COLUMNS.len(), 26);
        assert_eq!(REVIEW_COLUMNS.len(), 14);
        assert_eq!(SLIDE_COLUMNS.len(), 10);
        assert_eq!(ABOUT_COLUMNS.len(), 11);
        assert_eq!(CONTACT_COLUMNS.len(), 13);
        assert_eq!(ADMIN_COLUMNS.len(), 8);
    }
}
