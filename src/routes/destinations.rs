//! Destination endpoints. The detail view resolves the hotel, restaurant and
//! destination references stored in its sections and adds the reverse
//! lookup of hotels and restaurants that list it as nearby.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AdminSession;
use crate::content::{crossref, defaults, hooks, visibility::Viewer};
use crate::db::codec::{normalize, present};
use crate::db::models::{Destination, EntityKind, PublishStatus};
use crate::db::sections::{HotelRef, RestaurantRef};
use crate::error::{AppError, AppResult};
use crate::routes::{attach, parse_id, ApiJson, ApiResponse, Checks, ListQuery};
use crate::state::AppState;

const NOT_FOUND: &str = "Destination not found";

/// Create/update payload. Every field is optional so the same type serves
/// partial updates; sections are accepted structured or JSON-encoded.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationInput {
    pub name: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub hero_image: Option<String>,
    pub hero_image_public_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub overview: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub history_and_legend: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub where_is_located: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub how_to_go: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub what_to_see: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub best_time_to_visit: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub things_to_do: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub where_to_stay: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub where_to_eat: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub travel_tips: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub nearby_destinations: Option<Value>,
    pub meta_description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub keywords: Option<Value>,
    pub status: Option<String>,
    pub completeness: Option<i32>,
}

impl DestinationInput {
    /// Copies the supplied fields onto `d`. `creating` additionally requires
    /// the fields a new destination cannot go without.
    pub fn apply(self, d: &mut Destination, creating: bool) -> AppResult<()> {
        let mut checks = Checks::new();
        if creating {
            checks.require_some("category", &self.category);
        }

        if let Some(name) = self.name {
            d.name = name.trim().to_string();
        }
        if let Some(region) = self.region {
            d.region = region.trim().to_string();
        }
        if let Some(raw) = self.category {
            checks.parse_into("category", &raw, &mut d.category);
        }
        if let Some(hero_image) = self.hero_image {
            d.hero_image = hero_image;
        }
        if let Some(public_id) = self.hero_image_public_id {
            d.hero_image_public_id = Some(public_id);
        }

        if let Some(v) = self.overview {
            d.overview = normalize("overview", v);
        }
        if let Some(v) = self.history_and_legend {
            d.history_and_legend = normalize("historyAndLegend", v);
        }
        if let Some(v) = self.where_is_located {
            d.where_is_located = normalize("whereIsLocated", v);
        }
        if let Some(v) = self.how_to_go {
            d.how_to_go = normalize("howToGo", v);
        }
        if let Some(v) = self.what_to_see {
            d.what_to_see = normalize("whatToSee", v);
        }
        if let Some(v) = self.best_time_to_visit {
            d.best_time_to_visit = normalize("bestTimeToVisit", v);
        }
        if let Some(v) = self.things_to_do {
            d.things_to_do = normalize("thingsToDo", v);
        }
        if let Some(v) = self.where_to_stay {
            d.where_to_stay = normalize("whereToStay", v);
        }
        if let Some(v) = self.where_to_eat {
            d.where_to_eat = normalize("whereToEat", v);
        }
        if let Some(v) = self.travel_tips {
            d.travel_tips = normalize("travelTips", v);
        }
        if let Some(v) = self.nearby_destinations {
            d.nearby_destinations = normalize("nearbyDestinations", v);
        }

        if let Some(meta) = self.meta_description {
            d.meta_description = Some(meta);
        }
        if let Some(v) = self.keywords {
            d.keywords = normalize("keywords", v);
        }
        if let Some(raw) = self.status {
            checks.parse_into("status", &raw, &mut d.status);
        }
        if let Some(completeness) = self.completeness {
            d.completeness = completeness.clamp(0, 100);
        }

        checks.require("name", &d.name);
        checks.require("region", &d.region);
        checks.require("heroImage", &d.hero_image);
        checks.finish()
    }
}

/// Destination as JSON with every embedded reference list resolved.
pub async fn detail(state: &AppState, destination: &Destination) -> AppResult<Value> {
    let store = state.store.as_ref();
    let mut data = serde_json::to_value(destination)?;

    let hotels = crossref::resolve(store, &destination.where_to_stay.hotels).await?;
    attach(&mut data, Some("whereToStay"), "hotelsDetails", hotels)?;

    let restaurants = crossref::resolve(store, &destination.where_to_eat.restaurants).await?;
    attach(&mut data, Some("whereToEat"), "restaurantsDetails", restaurants)?;

    let nearby = crossref::resolve(store, &destination.nearby_destinations.destinations).await?;
    attach(&mut data, Some("nearbyDestinations"), "destinationsDetails", nearby)?;

    let nearby_hotels =
        crossref::reverse::<HotelRef>(store, EntityKind::Destination, destination.id).await?;
    attach(&mut data, None, "nearbyHotels", nearby_hotels)?;

    let nearby_restaurants =
        crossref::reverse::<RestaurantRef>(store, EntityKind::Destination, destination.id).await?;
    attach(&mut data, None, "nearbyRestaurants", nearby_restaurants)?;

    Ok(data)
}

/// GET /api/destinations
pub async fn list_destinations(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let mut filter = query.into_filter(viewer)?;
    filter.cuisine = None;
    let destinations = state.store.list_destinations(&filter).await?;
    Ok(ApiResponse::list(destinations))
}

/// GET /api/destinations/{id}
pub async fn get_destination(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let found = state.store.find_destination(id).await?;
    let destination = viewer.visible(found, |d| d.status, NOT_FOUND)?;
    Ok(ApiResponse::data(detail(&state, &destination).await?))
}

/// POST /api/destinations
pub async fn create_destination(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ApiJson(input): ApiJson<DestinationInput>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let mut destination = defaults::blank_destination(now);
    input.apply(&mut destination, true)?;
    hooks::before_save(None, &mut destination, now);

    let saved = state.store.insert_destination(&destination).await?;
    tracing::info!(id = saved.id, slug = %saved.slug, admin = admin.id, "destination created");

    Ok(ApiResponse::data(saved)
        .with_message("Destination created successfully")
        .created())
}

/// PUT /api/destinations/{id}
pub async fn update_destination(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<DestinationInput>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let previous = state
        .store
        .find_destination(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let mut destination = previous.clone();
    input.apply(&mut destination, false)?;
    hooks::before_save(Some(&previous), &mut destination, Utc::now());

    let saved = state
        .store
        .update_destination(&destination)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::data(saved).with_message("Destination updated successfully"))
}

/// DELETE /api/destinations/{id}
pub async fn delete_destination(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    if !state.store.delete_destination(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    tracing::info!(id, "destination deleted");
    Ok(ApiResponse::message("Destination deleted successfully"))
}

/// PATCH /api/destinations/{id}/status
pub async fn toggle_destination_status(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let previous = state
        .store
        .find_destination(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let mut destination = previous.clone();
    destination.status = previous.status.toggled();
    hooks::before_save(Some(&previous), &mut destination, Utc::now());

    let saved = state
        .store
        .update_destination(&destination)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let message = format!("Destination {}", toggle_verb(saved.status));
    Ok(ApiResponse::data(saved).with_message(message))
}

pub(crate) fn toggle_verb(status: PublishStatus) -> &'static str {
    match status {
        PublishStatus::Active => "activated",
        PublishStatus::Draft | PublishStatus::Inactive => "deactivated",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DestinationCategory;
    use serde_json::json;

    fn input(value: Value) -> DestinationInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_apply_create_requires_fields() {
        let mut d = defaults::blank_destination(Utc::now());
        let err = input(json!({ "name": "Galle Fort" }))
            .apply(&mut d, true)
            .unwrap_err();
        match err {
            AppError::Validation { errors, .. } => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["category", "region", "heroImage"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_apply_normalizes_encoded_sections() {
        let mut d = defaults::blank_destination(Utc::now());
        input(json!({
            "name": "Galle Fort",
            "region": "Southern",
            "category": "cultural",
            "heroImage": "https://img/galle.jpg",
            "whereToStay": "{\"hotels\":[{\"hotelId\":\"3\",\"distance\":\"1.2\"}]}",
            "overview": { "description": "Old fort", "images": ["a.jpg", "b.jpg"] },
            "keywords": ["fort", "unesco"],
            "howToGo": "not json"
        }))
        .apply(&mut d, true)
        .unwrap();

        assert_eq!(d.category, DestinationCategory::Cultural);
        assert_eq!(d.where_to_stay.hotels[0].hotel_id, Some(3));
        assert_eq!(d.where_to_stay.hotels[0].distance, Some(1.2));
        assert_eq!(d.overview.images.0[1].url, "b.jpg");
        assert_eq!(d.overview.images.0[1].order, 1);
        assert_eq!(d.keywords, vec!["fort", "unesco"]);
        assert!(d.how_to_go.methods.is_empty());
    }

    #[test]
    fn test_apply_partial_update_keeps_other_fields() {
        let mut d = defaults::blank_destination(Utc::now());
        d.name = "Ella".into();
        d.region = "Uva".into();
        d.hero_image = "ella.jpg".into();

        input(json!({ "status": "active" })).apply(&mut d, false).unwrap();
        assert_eq!(d.name, "Ella");
        assert_eq!(d.status, PublishStatus::Active);

        let err = input(json!({ "status": "archived" })).apply(&mut d, false);
        assert!(err.is_err());
    }
}
