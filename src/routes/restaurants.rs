//! Restaurant endpoints. Same lifecycle as hotels; filtered by cuisine
//! instead of category.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AdminSession;
use crate::content::{crossref, defaults, hooks, visibility::Viewer};
use crate::db::codec::{lenient_f64, normalize, present};
use crate::db::models::{EntityKind, PriceRange, Restaurant};
use crate::error::{AppError, AppResult};
use crate::routes::destinations::toggle_verb;
use crate::routes::{attach, parse_id, ApiJson, ApiResponse, Checks, ListQuery};
use crate::state::AppState;

const NOT_FOUND: &str = "Restaurant not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInput {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    pub price_range: Option<String>,
    pub currency: Option<String>,
    pub specialty: Option<String>,
    pub hero_image: Option<String>,
    pub hero_image_public_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub photo_gallery: Option<Value>,
    pub quick_summary: Option<String>,
    pub full_description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub menu_highlights: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub hours: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub contact: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub nearby_destinations: Option<Value>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub meta_description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub keywords: Option<Value>,
    pub status: Option<String>,
    pub completeness: Option<i32>,
}

impl RestaurantInput {
    pub fn apply(self, r: &mut Restaurant) -> AppResult<()> {
        let mut checks = Checks::new();

        if let Some(name) = self.name {
            r.name = name.trim().to_string();
        }
        if let Some(cuisine) = self.cuisine {
            r.cuisine = cuisine.trim().to_string();
        }
        if let Some(price) = self.price {
            r.price = Some(price);
        }
        // An empty string clears the optional range.
        if let Some(raw) = self.price_range {
            if raw.trim().is_empty() {
                r.price_range = None;
            } else {
                let mut range = r.price_range.unwrap_or(PriceRange::Moderate);
                checks.parse_into("priceRange", &raw, &mut range);
                r.price_range = Some(range);
            }
        }
        if let Some(currency) = self.currency {
            r.currency = currency.trim().to_uppercase();
        }
        if let Some(specialty) = self.specialty {
            r.specialty = specialty;
        }
        if let Some(hero_image) = self.hero_image {
            r.hero_image = hero_image;
        }
        if let Some(public_id) = self.hero_image_public_id {
            r.hero_image_public_id = Some(public_id);
        }
        if let Some(v) = self.photo_gallery {
            r.photo_gallery = normalize("photoGallery", v);
        }
        if let Some(summary) = self.quick_summary {
            r.quick_summary = summary;
        }
        if let Some(description) = self.full_description {
            r.full_description = ammonia::clean(&description);
        }
        if let Some(v) = self.menu_highlights {
            r.menu_highlights = normalize("menuHighlights", v);
        }
        if let Some(v) = self.hours {
            r.hours = normalize("hours", v);
        }
        if let Some(v) = self.location {
            r.location = normalize("location", v);
        }
        if let Some(v) = self.contact {
            r.contact = normalize("contact", v);
        }
        if let Some(v) = self.nearby_destinations {
            r.nearby_destinations = normalize("nearbyDestinations", v);
        }
        if let Some(rating) = self.rating {
            r.rating = rating.clamp(0.0, 5.0);
        }
        if let Some(count) = self.review_count {
            r.review_count = count.max(0);
        }
        if let Some(meta) = self.meta_description {
            r.meta_description = Some(meta);
        }
        if let Some(v) = self.keywords {
            r.keywords = normalize("keywords", v);
        }
        if let Some(raw) = self.status {
            checks.parse_into("status", &raw, &mut r.status);
        }
        if let Some(completeness) = self.completeness {
            r.completeness = completeness.clamp(0, 100);
        }

        checks.require("name", &r.name);
        checks.require("cuisine", &r.cuisine);
        checks.require_some("price", &r.price);
        checks.require("heroImage", &r.hero_image);
        checks.require("fullDescription", &r.full_description);
        checks.require("specialty", &r.specialty);
        checks.finish()
    }
}

pub async fn detail(state: &AppState, restaurant: &Restaurant) -> AppResult<Value> {
    let mut data = serde_json::to_value(restaurant)?;
    let nearby = crossref::resolve(state.store.as_ref(), &restaurant.nearby_destinations).await?;
    attach(&mut data, None, "nearbyDestinationsDetails", nearby)?;
    Ok(data)
}

/// GET /api/restaurants
pub async fn list_restaurants(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut filter = query.into_filter(viewer)?;
    filter.category = None;
    let restaurants = state.store.list_restaurants(&filter).await?;
    Ok(ApiResponse::list(restaurants))
}

/// GET /api/restaurants/{id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let found = state.store.find_restaurant(id).await?;
    let restaurant = viewer.visible(found, |r| r.status, NOT_FOUND)?;
    Ok(ApiResponse::data(detail(&state, &restaurant).await?))
}

/// POST /api/restaurants
pub async fn create_restaurant(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ApiJson(input): ApiJson<RestaurantInput>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let mut restaurant = defaults::blank_restaurant(now);
    input.apply(&mut restaurant)?;
    hooks::before_save(None, &mut restaurant, now);

    let saved = state.store.insert_restaurant(&restaurant).await?;
    crossref::sync_links(
        state.store.as_ref(),
        EntityKind::Restaurant,
        saved.id,
        &saved.nearby_destinations,
    )
    .await?;
    tracing::info!(id = saved.id, slug = %saved.slug, admin = admin.id, "restaurant created");

    Ok(ApiResponse::data(saved)
        .with_message("Restaurant created successfully")
        .created())
}

/// PUT /api/restaurants/{id}
pub async fn update_restaurant(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<RestaurantInput>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let previous = state
        .store
        .find_restaurant(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let mut restaurant = previous.clone();
    input.apply(&mut restaurant)?;
    hooks::before_save(Some(&previous), &mut restaurant, Utc::now());

    let saved = state
        .store
        .update_restaurant(&restaurant)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    crossref::sync_links(
        state.store.as_ref(),
        EntityKind::Restaurant,
        saved.id,
        &saved.nearby_destinations,
    )
    .await?;

    Ok(ApiResponse::data(saved).with_message("Restaurant updated successfully"))
}

/// DELETE /api/restaurants/{id}
pub async fn delete_restaurant(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    if !state.store.delete_restaurant(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    state
        .store
        .replace_links(EntityKind::Restaurant, id, &[])
        .await?;
    tracing::info!(id, "restaurant deleted");
    Ok(ApiResponse::message("Restaurant deleted successfully"))
}

/// PATCH /api/restaurants/{id}/status
pub async fn toggle_restaurant_status(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let previous = state
        .store
        .find_restaurant(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let mut restaurant = previous.clone();
    restaurant.status = previous.status.toggled();
    hooks::before_save(Some(&previous), &mut restaurant, Utc::now());

    let saved = state
        .store
        .update_restaurant(&restaurant)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let message = format!("Restaurant {}", toggle_verb(saved.status));
    Ok(ApiResponse::data(saved).with_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Restaurant {
        let mut r = defaults::blank_restaurant(Utc::now());
        r.name = "Ministry of Crab".into();
        r.cuisine = "Seafood".into();
        r.price = Some(60.0);
        r.hero_image = "crab.jpg".into();
        r.full_description = "Crab".into();
        r.specialty = "Chilli crab".into();
        r
    }

    #[test]
    fn test_price_range_parse_and_clear() {
        let mut r = base();
        let input: RestaurantInput = serde_json::from_value(json!({ "priceRange": "$$$" })).unwrap();
        input.apply(&mut r).unwrap();
        assert_eq!(r.price_range, Some(PriceRange::Expensive));

        let input: RestaurantInput = serde_json::from_value(json!({ "priceRange": "" })).unwrap();
        input.apply(&mut r).unwrap();
        assert_eq!(r.price_range, None);

        let input: RestaurantInput = serde_json::from_value(json!({ "priceRange": "cheap" })).unwrap();
        assert!(input.apply(&mut r).is_err());
    }

    #[test]
    fn test_restaurant_requires_specialty() {
        let mut r = base();
        r.specialty.clear();
        let err = RestaurantInput::default().apply(&mut r).unwrap_err();
        assert_eq!(err.to_string(), "specialty is required");
    }

    #[test]
    fn test_hours_accepts_encoded_object() {
        let mut r = base();
        let input: RestaurantInput =
            serde_json::from_value(json!({ "hours": "{\"mon\":\"9-5\"}", "menuHighlights": "oops" }))
                .unwrap();
        input.apply(&mut r).unwrap();
        assert_eq!(r.hours.get("mon"), Some(&json!("9-5")));
        assert!(r.menu_highlights.is_empty());
    }
}
