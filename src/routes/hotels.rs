//! Hotel endpoints.

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
use crate::db::models::{EntityKind, Hotel};
use crate::error::{AppError, AppResult};
use crate::routes::destinations::toggle_verb;
use crate::routes::{attach, parse_id, ApiJson, ApiResponse, Checks, ListQuery};
use crate::state::AppState;

const NOT_FOUND: &str = "Hotel not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInput {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub hero_image: Option<String>,
    pub hero_image_public_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub photo_gallery: Option<Value>,
    pub quick_summary: Option<String>,
    pub full_description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub amenities: Option<Value>,
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

impl HotelInput {
    pub fn apply(self, h: &mut Hotel, creating: bool) -> AppResult<()> {
        let mut checks = Checks::new();
        if creating {
            checks.require_some("category", &self.category);
        }

        if let Some(name) = self.name {
            h.name = name.trim().to_string();
        }
        if let Some(raw) = self.category {
            checks.parse_into("category", &raw, &mut h.category);
        }
        if let Some(price) = self.price {
            h.price = Some(price);
        }
        if let Some(currency) = self.currency {
            h.currency = currency.trim().to_uppercase();
        }
        if let Some(hero_image) = self.hero_image {
            h.hero_image = hero_image;
        }
        if let Some(public_id) = self.hero_image_public_id {
            h.hero_image_public_id = Some(public_id);
        }
        if let Some(v) = self.photo_gallery {
            h.photo_gallery = normalize("photoGallery", v);
        }
        if let Some(summary) = self.quick_summary {
            h.quick_summary = summary;
        }
        if let Some(description) = self.full_description {
            h.full_description = ammonia::clean(&description);
        }
        if let Some(v) = self.amenities {
            h.amenities = normalize("amenities", v);
        }
        if let Some(v) = self.location {
            h.location = normalize("location", v);
        }
        if let Some(v) = self.contact {
            h.contact = normalize("contact", v);
        }
        if let Some(v) = self.nearby_destinations {
            h.nearby_destinations = normalize("nearbyDestinations", v);
        }
        if let Some(rating) = self.rating {
            h.rating = rating.clamp(0.0, 5.0);
        }
        if let Some(count) = self.review_count {
            h.review_count = count.max(0);
        }
        if let Some(meta) = self.meta_description {
            h.meta_description = Some(meta);
        }
        if let Some(v) = self.keywords {
            h.keywords = normalize("keywords", v);
        }
        if let Some(raw) = self.status {
            checks.parse_into("status", &raw, &mut h.status);
        }
        if let Some(completeness) = self.completeness {
            h.completeness = completeness.clamp(0, 100);
        }

        checks.require("name", &h.name);
        checks.require_some("price", &h.price);
        checks.require("heroImage", &h.hero_image);
        checks.require("fullDescription", &h.full_description);
        checks.finish()
    }
}

pub async fn detail(state: &AppState, hotel: &Hotel) -> AppResult<Value> {
    let mut data = serde_json::to_value(hotel)?;
    let nearby = crossref::resolve(state.store.as_ref(), &hotel.nearby_destinations).await?;
    attach(&mut data, None, "nearbyDestinationsDetails", nearby)?;
    Ok(data)
}

/// GET /api/hotels
pub async fn list_hotels(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut filter = query.into_filter(viewer)?;
    filter.cuisine = None;
    let hotels = state.store.list_hotels(&filter).await?;
    Ok(ApiResponse::list(hotels))
}

/// GET /api/hotels/{id}
pub async fn get_hotel(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let found = state.store.find_hotel(id).await?;
    let hotel = viewer.visible(found, |h| h.status, NOT_FOUND)?;
    Ok(ApiResponse::data(detail(&state, &hotel).await?))
}

/// POST /api/hotels
pub async fn create_hotel(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ApiJson(input): ApiJson<HotelInput>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let mut hotel = defaults::blank_hotel(now);
    input.apply(&mut hotel, true)?;
    hooks::before_save(None, &mut hotel, now);

    let saved = state.store.insert_hotel(&hotel).await?;
    crossref::sync_links(
        state.store.as_ref(),
        EntityKind::Hotel,
        saved.id,
        &saved.nearby_destinations,
    )
    .await?;
    tracing::info!(id = saved.id, slug = %saved.slug, admin = admin.id, "hotel created");

    Ok(ApiResponse::data(saved)
        .with_message("Hotel created successfully")
        .created())
}

/// PUT /api/hotels/{id}
pub async fn update_hotel(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<HotelInput>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let previous = state
        .store
        .find_hotel(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let mut hotel = previous.clone();
    input.apply(&mut hotel, false)?;
    hooks::before_save(Some(&previous), &mut hotel, Utc::now());

    let saved = state
        .store
        .update_hotel(&hotel)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    crossref::sync_links(
        state.store.as_ref(),
        EntityKind::Hotel,
        saved.id,
        &saved.nearby_destinations,
    )
    .await?;

    Ok(ApiResponse::data(saved).with_message("Hotel updated successfully"))
}

/// DELETE /api/hotels/{id}
pub async fn delete_hotel(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    if !state.store.delete_hotel(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    state
        .store
        .replace_links(EntityKind::Hotel, id, &[])
        .await?;
    tracing::info!(id, "hotel deleted");
    Ok(ApiResponse::message("Hotel deleted successfully"))
}

/// PATCH /api/hotels/{id}/status
pub async fn toggle_hotel_status(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let previous = state
        .store
        .find_hotel(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let mut hotel = previous.clone();
    hotel.status = previous.status.toggled();
    hooks::before_save(Some(&previous), &mut hotel, Utc::now());

    let saved = state
        .store
        .update_hotel(&hotel)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let message = format!("Hotel {}", toggle_verb(saved.status));
    Ok(ApiResponse::data(saved).with_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::HotelCategory;
    use serde_json::json;

    #[test]
    fn test_apply_hotel_input() {
        let mut h = defaults::blank_hotel(Utc::now());
        let input: HotelInput = serde_json::from_value(json!({
            "name": "Jetwing Lighthouse",
            "category": "luxury",
            "price": "180",
            "currency": "usd",
            "heroImage": "lighthouse.jpg",
            "fullDescription": "<p>Sea views</p><script>alert(1)</script>",
            "amenities": ["Pool", { "name": "Spa", "icon": "spa" }],
            "nearbyDestinations": [{ "destinationId": 4, "distance": 2.5 }]
        }))
        .unwrap();
        input.apply(&mut h, true).unwrap();

        assert_eq!(h.category, HotelCategory::Luxury);
        assert_eq!(h.price, Some(180.0));
        assert_eq!(h.currency, "USD");
        assert_eq!(h.full_description, "<p>Sea views</p>");
        assert_eq!(h.amenities[0].name, "Pool");
        assert_eq!(h.amenities[0].icon, "");
        assert_eq!(h.amenities[1].icon, "spa");
        assert_eq!(h.nearby_destinations[0].destination_id, Some(4));
        assert_eq!(h.nearby_destinations[0].unit, "km");
    }

    #[test]
    fn test_apply_hotel_requires_price() {
        let mut h = defaults::blank_hotel(Utc::now());
        let input: HotelInput = serde_json::from_value(json!({
            "name": "Nowhere Inn",
            "category": "budget",
            "price": "free",
            "heroImage": "x.jpg",
            "fullDescription": "desc"
        }))
        .unwrap();
        match input.apply(&mut h, true) {
            Err(AppError::Validation { errors, .. }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "price");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
