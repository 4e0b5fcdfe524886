//! Visitor reviews of destinations, hotels and restaurants. Anyone may
//! submit one; it stays `pending` until an admin approves it.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AdminSession;
use crate::content::visibility::Viewer;
use crate::db::codec::{lenient_i64, normalize, present};
use crate::db::models::{EntityKind, PublishStatus, Review, ReviewStatus};
use crate::db::sections::Gallery;
use crate::error::{AppError, AppResult, FieldError};
use crate::routes::{parse_id, ApiJson, ApiResponse, Checks};
use crate::state::AppState;

const NOT_FOUND: &str = "Review not found";
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub item_id: Option<i64>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub photos: Option<Value>,
    pub status: Option<String>,
}

impl ReviewInput {
    /// Applies the visitor-editable fields. `status` is only honoured when
    /// `moderating`.
    pub fn apply(self, review: &mut Review, creating: bool, moderating: bool) -> AppResult<()> {
        let mut checks = Checks::new();

        if creating {
            match self.item_type.as_deref().and_then(EntityKind::parse_loose) {
                Some(kind) => review.item_type = kind,
                None => checks.push(FieldError::new(
                    "itemType",
                    format!("itemType must be one of: {}", EntityKind::allowed()),
                )),
            }
            match self.item_id {
                Some(id) => review.item_id = id,
                None => checks.push(FieldError::new("itemId", "itemId is required")),
            }
        }

        if let Some(name) = self.user_name {
            review.user_name = ammonia::clean(name.trim());
        }
        if let Some(email) = self.user_email {
            let email = email.trim().to_lowercase();
            if !email.is_empty() && !email.contains('@') {
                checks.push(FieldError::new("userEmail", "Invalid email format"));
            }
            review.user_email = email;
        }
        match self.rating {
            Some(rating) if (1..=5).contains(&rating) => review.rating = rating as i32,
            Some(_) => checks.push(FieldError::new("rating", "rating must be between 1 and 5")),
            None if creating => checks.push(FieldError::new("rating", "rating is required")),
            None => {}
        }
        if let Some(title) = self.title {
            review.title = ammonia::clean(title.trim());
        }
        if let Some(comment) = self.comment {
            review.comment = ammonia::clean(comment.trim());
        }
        if let Some(v) = self.photos {
            review.photos = normalize("photos", v);
        }
        if moderating {
            if let Some(raw) = self.status {
                checks.parse_into("status", &raw, &mut review.status);
            }
        }

        checks.require("userName", &review.user_name);
        checks.require("comment", &review.comment);
        checks.finish()
    }
}

fn blank_review() -> Review {
    let now = Utc::now();
    Review {
        id: 0,
        item_type: EntityKind::Destination,
        item_id: 0,
        user_name: String::new(),
        user_email: String::new(),
        rating: 0,
        title: String::new(),
        comment: String::new(),
        photos: Gallery::default(),
        helpful: 0,
        status: ReviewStatus::Pending,
        moderated_by: None,
        moderated_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|l| l.trim().parse::<i64>().ok())
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT)
}

/// GET /api/reviews/{itemType}/{itemId}
pub async fn list_reviews(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((item_type, item_id)): Path<(String, String)>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<impl IntoResponse> {
    let kind = EntityKind::parse_loose(&item_type)
        .ok_or_else(|| AppError::validation("Invalid item type"))?;
    let item_id = item_id
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation("Invalid item id"))?;
    let status = viewer.status_filter::<ReviewStatus>(query.status.as_deref())?;
    let limit = parse_limit(query.limit.as_deref());

    let reviews = state
        .store
        .list_reviews(kind, item_id, status, limit)
        .await?;
    Ok(ApiResponse::list(reviews))
}

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> AppResult<impl IntoResponse> {
    let mut review = blank_review();
    input.apply(&mut review, true, false)?;

    // Only published listings can be reviewed.
    let target = state
        .store
        .summaries(review.item_type, &[review.item_id])
        .await?;
    if !target.iter().any(|s| s.status == PublishStatus::Active) {
        return Err(AppError::not_found(format!("{} not found", review.item_type)));
    }

    let saved = state.store.insert_review(&review).await?;
    tracing::info!(
        id = saved.id,
        item_type = %saved.item_type,
        item_id = saved.item_id,
        "review submitted"
    );

    Ok(ApiResponse::data(saved)
        .with_message("Review submitted successfully and pending approval")
        .created())
}

/// POST /api/reviews/{id}/helpful
pub async fn mark_helpful(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let found = state.store.find_review(id).await?;
    let mut review = viewer.visible(found, |r| r.status, NOT_FOUND)?;

    review.helpful += 1;
    let saved = state
        .store
        .update_review(&review)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::data(saved).with_message("Thank you for your feedback"))
}

async fn moderate(
    state: &AppState,
    admin_id: i64,
    id: &str,
    status: ReviewStatus,
) -> AppResult<Review> {
    let id = parse_id(id, NOT_FOUND)?;
    let mut review = state
        .store
        .find_review(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    let now = Utc::now();
    review.status = status;
    review.moderated_by = Some(admin_id);
    review.moderated_at = Some(now);
    review.updated_at = now;

    let saved = state
        .store
        .update_review(&review)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    tracing::info!(id, admin = admin_id, status = %status, "review moderated");
    Ok(saved)
}

/// PATCH /api/reviews/{id}/approve
pub async fn approve_review(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let review = moderate(&state, admin.id, &id, ReviewStatus::Approved).await?;
    Ok(ApiResponse::data(review).with_message("Review approved successfully"))
}

/// PATCH /api/reviews/{id}/reject
pub async fn reject_review(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let review = moderate(&state, admin.id, &id, ReviewStatus::Rejected).await?;
    Ok(ApiResponse::data(review).with_message("Review rejected successfully"))
}

/// PUT /api/reviews/{id}
pub async fn update_review(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    let mut review = state
        .store
        .find_review(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    input.apply(&mut review, false, true)?;
    review.updated_at = Utc::now();

    let saved = state
        .store
        .update_review(&review)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(ApiResponse::data(saved).with_message("Review updated successfully"))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id, NOT_FOUND)?;
    if !state.store.delete_review(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    Ok(ApiResponse::message("Review deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> ReviewInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), 50);
        assert_eq!(parse_limit(Some("10")), 10);
        assert_eq!(parse_limit(Some("abc")), 50);
        assert_eq!(parse_limit(Some("-3")), 50);
        assert_eq!(parse_limit(Some("100000")), MAX_LIMIT);
    }

    #[test]
    fn test_create_sanitizes_and_ignores_status() {
        let mut review = blank_review();
        input(json!({
            "itemType": "hotel",
            "itemId": "7",
            "userName": "Nimal",
            "rating": 5,
            "title": "<b>Great</b><script>x()</script>",
            "comment": "<img src=x onerror=alert(1)>Lovely stay",
            "photos": ["a.jpg"],
            "status": "approved"
        }))
        .apply(&mut review, true, false)
        .unwrap();

        assert_eq!(review.item_type, EntityKind::Hotel);
        assert_eq!(review.item_id, 7);
        assert_eq!(review.title, "<b>Great</b>");
        assert!(!review.comment.contains("onerror"));
        assert_eq!(review.photos.0[0].url, "a.jpg");
        assert_eq!(review.status, ReviewStatus::Pending);
    }

    #[test]
    fn test_create_validation() {
        let mut review = blank_review();
        let err = input(json!({ "itemType": "Tour", "rating": 9 }))
            .apply(&mut review, true, false)
            .unwrap_err();
        match err {
            AppError::Validation { errors, .. } => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["itemType", "itemId", "rating", "userName", "comment"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_admin_update_can_set_status() {
        let mut review = blank_review();
        review.user_name = "A".into();
        review.comment = "B".into();
        input(json!({ "status": "rejected" }))
            .apply(&mut review, false, true)
            .unwrap();
        assert_eq!(review.status, ReviewStatus::Rejected);
    }
}
