//! HTTP handlers, grouped by resource.
//!
//! Every handler answers with the `{success, message?, count?, data?}`
//! envelope on success and an [`AppError`] on failure.

pub mod auth;
pub mod destinations;
pub mod health;
pub mod hero_slides;
pub mod hotels;
pub mod pages;
pub mod restaurants;
pub mod reviews;
pub mod upload;

use std::str::FromStr;

use axum::{extract::FromRequest, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::visibility::Viewer;
use crate::db::models::PublishStatus;
use crate::db::store::ListFilter;
use crate::error::{AppError, AppResult, FieldError};

/// `Json` whose rejection is an [`AppError`], so malformed bodies come back
/// as a 400 in the standard envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// 201 with this body.
    pub fn created(self) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Json(self))
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            message: None,
            count: Some(items.len()),
            data: Some(items),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

// ============================================================================
// Listing queries
// ============================================================================

/// Query string shared by the destination, hotel and restaurant lists.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub search: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ListQuery {
    pub fn into_filter(self, viewer: Viewer) -> AppResult<ListFilter> {
        let status = viewer.status_filter::<PublishStatus>(self.status.as_deref())?;
        Ok(ListFilter {
            status,
            category: non_empty(self.category).filter(|c| c != "all"),
            cuisine: non_empty(self.cuisine).filter(|c| c != "all"),
            search: non_empty(self.search),
        })
    }
}

// ============================================================================
// Write validation
// ============================================================================

/// Collects field errors across a write payload.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Requires a non-blank string.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.errors
                .push(FieldError::new(field, format!("{field} is required")));
        }
    }

    pub fn require_some<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.errors
                .push(FieldError::new(field, format!("{field} is required")));
        }
    }

    /// Parses a closed-set value into `slot`, recording an error instead of
    /// failing outright.
    pub fn parse_into<E: FromStr<Err = String>>(&mut self, field: &str, raw: &str, slot: &mut E) {
        match raw.trim().parse::<E>() {
            Ok(value) => *slot = value,
            Err(e) => self
                .errors
                .push(FieldError::new(field, format!("Invalid {field}: {e}"))),
        }
    }

    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::invalid_fields(self.errors))
        }
    }
}

/// Path ids that are not integers cannot name a row, so they get the same
/// 404 as a missing one.
pub fn parse_id(raw: &str, not_found: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::not_found(not_found))
}

/// Sets `key` on the object at `section` (or at the top level).
pub fn attach(target: &mut Value, section: Option<&str>, key: &str, value: impl Serialize) -> AppResult<()> {
    let value = serde_json::to_value(value)?;
    let object = match section {
        Some(section) => target.get_mut(section),
        None => Some(target),
    }
    .and_then(Value::as_object_mut)
    .ok_or_else(|| AppError::internal(format!("cannot attach {key}: not an object")))?;
    object.insert(key.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_query_filter() {
        let query = ListQuery {
            status: Some("draft".into()),
            category: Some("all".into()),
            cuisine: Some("  ".into()),
            search: Some(" galle ".into()),
        };
        let filter = query.into_filter(Viewer::Public).unwrap();
        assert_eq!(filter.status, Some(PublishStatus::Active));
        assert_eq!(filter.category, None);
        assert_eq!(filter.cuisine, None);
        assert_eq!(filter.search.as_deref(), Some("galle"));

        let query = ListQuery {
            cuisine: Some("all".into()),
            ..ListQuery::default()
        };
        assert_eq!(query.into_filter(Viewer::Public).unwrap().cuisine, None);
    }

    #[test]
    fn test_checks_collects_every_field() {
        let mut checks = Checks::new();
        checks.require("name", " ");
        checks.require_some::<f64>("price", &None);
        let mut status = PublishStatus::Draft;
        checks.parse_into("status", "archived", &mut status);
        checks.parse_into("status", "active", &mut status);
        assert_eq!(status, PublishStatus::Active);

        match checks.finish() {
            Err(AppError::Validation { errors, .. }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "price", "status"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_attach() {
        let mut value = json!({ "whereToStay": { "hotels": [] } });
        attach(&mut value, Some("whereToStay"), "hotelsDetails", vec![1, 2]).unwrap();
        attach(&mut value, None, "nearbyHotels", Vec::<i64>::new()).unwrap();
        assert_eq!(value["whereToStay"]["hotelsDetails"], json!([1, 2]));
        assert_eq!(value["nearbyHotels"], json!([]));
        assert!(attach(&mut value, Some("missing"), "x", 1).is_err());
    }

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(value, json!({ "success": true, "count": 3, "data": [1, 2, 3] }));

        let value = serde_json::to_value(ApiResponse::message("Hotel deleted successfully")).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "message": "Hotel deleted successfully" })
        );
    }
}
