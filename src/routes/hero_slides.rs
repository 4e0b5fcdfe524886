//! Home page hero carousel.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AdminSession;
use crate::content::visibility::Viewer;
use crate::db::models::{HeroSlide, SlideStatus};
use crate::error::{AppError, AppResult};
use crate::routes::{parse_id, ApiJson, ApiResponse, Checks};
use crate::state::AppState;

const NOT_FOUND: &str = "Slide not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideInput {
    pub image: Option<String>,
    pub image_public_id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub badge: Option<String>,
    pub order: Option<i32>,
    pub status: Option<String>,
}

impl SlideInput {
    pub fn apply(self, slide: &mut HeroSlide) -> AppResult<()> {
        let mut checks = Checks::new();

        if let Some(image) = self.image {
            slide.image = image;
        }
        if let Some(public_id) = self.image_public_id {
            slide.image_public_id = Some(public_id);
        }
        if let Some(title) = self.title {
            slide.title = title;
        }
        if let Some(subtitle) = self.subtitle {
            slide.subtitle = subtitle;
        }
        if let Some(description) = self.description {
            slide.description = description;
        }
        if let Some(badge) = self.badge {
            slide.badge = badge;
        }
        if let Some(order) = self.order {
            slide.order = order;
        }
        if let Some(raw) = self.status {
            checks.parse_into("status", &raw, &mut slide.status);
        }

        checks.require("image", &slide.image);
        checks.require("title", &slide.title);
        checks.require("subtitle", &slide.subtitle);
        checks.require("description", &slide.description);
        checks.require("badge", &slide.badge);
        checks.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct SlideOrder {
    pub id: i64,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub slides: Vec<SlideOrder>,
}

/// GET /api/hero-slides
pub async fn list_slides(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<impl IntoResponse> {
    let status = viewer.status_filter::<SlideStatus>(None)?;
    let slides = state.store.list_slides(status).await?;
    Ok(ApiResponse::list(slides))
}

/// GET /api/hero-slides/{id}
pub async fn get_slide(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let found = state.store.find_slide(id).await?;
    let slide = viewer.visible(found, |s| s.status, NOT_FOUND)?;
    Ok(ApiResponse::data(slide))
}

/// POST /api/hero-slides
pub async fn create_slide(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiJson(input): ApiJson<SlideInput>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let mut slide = HeroSlide {
        id: 0,
        image: String::new(),
        image_public_id: None,
        title: String::new(),
        subtitle: String::new(),
        description: String::new(),
        badge: String::new(),
        order: 0,
        status: SlideStatus::default(),
        created_at: now,
        updated_at: now,
    };
    input.apply(&mut slide)?;

    let saved = state.store.insert_slide(&slide).await?;
    Ok(ApiResponse::data(saved)
        .with_message("Slide created successfully")
        .created())
}

/// PUT /api/hero-slides/{id}
pub async fn update_slide(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<SlideInput>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let mut slide = state
        .store
        .find_slide(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    input.apply(&mut slide)?;
    slide.updated_at = Utc::now();

    let saved = state
        .store
        .update_slide(&slide)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(ApiResponse::data(saved).with_message("Slide updated successfully"))
}

/// DELETE /api/hero-slides/{id}
pub async fn delete_slide(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    if !state.store.delete_slide(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    Ok(ApiResponse::message("Slide deleted successfully"))
}

/// PATCH /api/hero-slides/{id}/status
pub async fn toggle_slide_status(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let mut slide = state
        .store
        .find_slide(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    slide.status = slide.status.toggled();
    slide.updated_at = Utc::now();

    let saved = state
        .store
        .update_slide(&slide)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let verb = match saved.status {
        SlideStatus::Active => "activated",
        SlideStatus::Inactive => "deactivated",
    };
    Ok(ApiResponse::data(saved).with_message(format!("Slide {verb}")))
}

/// PUT /api/hero-slides/reorder
///
/// Applied one slide at a time; ids that no longer exist are skipped.
pub async fn reorder_slides(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    let mut skipped = 0usize;
    for entry in &request.slides {
        if !state.store.set_slide_order(entry.id, entry.order).await? {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "reorder referenced missing slides");
    }
    Ok(ApiResponse::message("Slides reordered successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slide_input_requires_fields() {
        let now = Utc::now();
        let mut slide = HeroSlide {
            id: 0,
            image: String::new(),
            image_public_id: None,
            title: String::new(),
            subtitle: String::new(),
            description: String::new(),
            badge: String::new(),
            order: 0,
            status: SlideStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let input: SlideInput =
            serde_json::from_value(json!({ "image": "sigiriya.jpg", "title": "Sigiriya" })).unwrap();
        let err = input.apply(&mut slide).unwrap_err();
        assert_eq!(err.to_string(), "subtitle is required, description is required, badge is required");
    }
}
