//! The about and contact pages. Each is a single row that is recreated
//! with seed content whenever it is read and found missing.

use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AdminSession;
use crate::content::defaults;
use crate::db::codec::{normalize, present};
use crate::db::models::{AboutPage, ContactPage};
use crate::error::AppResult;
use crate::routes::{ApiJson, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutPageInput {
    pub header_image: Option<String>,
    pub header_image_public_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub stats: Option<Value>,
    pub story_title: Option<String>,
    pub story_paragraph1: Option<String>,
    pub story_paragraph2: Option<String>,
    pub story_paragraph3: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub values: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub team_members: Option<Value>,
}

impl AboutPageInput {
    pub fn apply(self, page: &mut AboutPage) {
        if let Some(v) = self.header_image {
            page.header_image = v;
        }
        if let Some(v) = self.header_image_public_id {
            page.header_image_public_id = Some(v);
        }
        if let Some(v) = self.stats {
            page.stats = normalize("stats", v);
        }
        if let Some(v) = self.story_title {
            page.story_title = v;
        }
        if let Some(v) = self.story_paragraph1 {
            page.story_paragraph1 = v;
        }
        if let Some(v) = self.story_paragraph2 {
            page.story_paragraph2 = v;
        }
        if let Some(v) = self.story_paragraph3 {
            page.story_paragraph3 = v;
        }
        if let Some(v) = self.values {
            page.values = normalize("values", v);
        }
        if let Some(v) = self.team_members {
            page.team_members = normalize("teamMembers", v);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPageInput {
    pub header_image: Option<String>,
    pub header_image_public_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Value>,
    pub whatsapp: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub business_hours: Option<Value>,
    pub timezone: Option<String>,
}

impl ContactPageInput {
    pub fn apply(self, page: &mut ContactPage) {
        if let Some(v) = self.header_image {
            page.header_image = v;
        }
        if let Some(v) = self.header_image_public_id {
            page.header_image_public_id = Some(v);
        }
        if let Some(v) = self.email {
            page.email = normalize("email", v);
        }
        if let Some(v) = self.phone {
            page.phone = normalize("phone", v);
        }
        if let Some(v) = self.address {
            page.address = normalize("address", v);
        }
        if let Some(v) = self.whatsapp {
            page.whatsapp = v;
        }
        if let Some(v) = self.facebook {
            page.facebook = v;
        }
        if let Some(v) = self.instagram {
            page.instagram = v;
        }
        if let Some(v) = self.twitter {
            page.twitter = v;
        }
        if let Some(v) = self.business_hours {
            page.business_hours = normalize("businessHours", v);
        }
        if let Some(v) = self.timezone {
            page.timezone = v;
        }
    }
}

async fn current_about(state: &AppState) -> AppResult<AboutPage> {
    match state.store.find_about_page().await? {
        Some(page) => Ok(page),
        None => {
            tracing::warn!("about page missing, recreating defaults");
            state
                .store
                .ensure_about_page(&defaults::about_page(Utc::now()))
                .await
        }
    }
}

async fn current_contact(state: &AppState) -> AppResult<ContactPage> {
    match state.store.find_contact_page().await? {
        Some(page) => Ok(page),
        None => {
            tracing::warn!("contact page missing, recreating defaults");
            state
                .store
                .ensure_contact_page(&defaults::contact_page(Utc::now()))
                .await
        }
    }
}

/// GET /api/about-page
pub async fn get_about_page(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::data(current_about(&state).await?))
}

/// PUT /api/about-page
pub async fn update_about_page(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiJson(input): ApiJson<AboutPageInput>,
) -> AppResult<impl IntoResponse> {
    let mut page = current_about(&state).await?;
    input.apply(&mut page);
    page.updated_at = Utc::now();

    let saved = state.store.save_about_page(&page).await?;
    Ok(ApiResponse::data(saved).with_message("About page updated successfully"))
}

/// GET /api/contact-page
pub async fn get_contact_page(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::data(current_contact(&state).await?))
}

/// PUT /api/contact-page
pub async fn update_contact_page(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiJson(input): ApiJson<ContactPageInput>,
) -> AppResult<impl IntoResponse> {
    let mut page = current_contact(&state).await?;
    input.apply(&mut page);
    page.updated_at = Utc::now();

    let saved = state.store.save_contact_page(&page).await?;
    Ok(ApiResponse::data(saved).with_message("Contact page updated successfully"))
}
