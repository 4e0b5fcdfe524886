mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::*;

#[tokio::test]
async fn toggle_stamps_published_date_once() {
    let app = app();
    let token = admin_token(&app).await;
    let id = create(&app, &token, "hotels", hotel_body("Amangalla")).await;

    let (status, body) = patch(&app, &format!("/api/hotels/{id}/status"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hotel activated");
    assert_eq!(body["data"]["status"], "active");
    let published = body["data"]["publishedDate"].clone();
    assert!(published.is_string());

    let (_, body) = patch(&app, &format!("/api/hotels/{id}/status"), &token).await;
    assert_eq!(body["message"], "Hotel deactivated");
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["publishedDate"], published);

    let (_, body) = patch(&app, &format!("/api/hotels/{id}/status"), &token).await;
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["publishedDate"], published);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let token = admin_token(&app).await;

    let req = Request::post("/api/hotels")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from("{\"name\": \"Half"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn encoded_sections_are_decoded_and_bad_ones_default() {
    let app = app();
    let token = admin_token(&app).await;

    let mut body = hotel_body("Jetwing Lighthouse");
    body["amenities"] = json!("[\"Pool\", {\"name\": \"Spa\", \"icon\": \"spa\"}]");
    body["photoGallery"] = json!(["https://cdn.example.com/a.jpg"]);
    body["location"] = json!("{not json");
    body["fullDescription"] = json!("<script>alert(1)</script><b>Bawa</b>");
    let (status, created) = post(&app, "/api/hotels", Some(&token), body).await;
    assert_eq!(status, StatusCode::CREATED);

    let data = &created["data"];
    assert_eq!(data["amenities"][0], json!({ "name": "Pool", "icon": "" }));
    assert_eq!(data["amenities"][1]["icon"], "spa");
    assert_eq!(data["photoGallery"][0]["url"], "https://cdn.example.com/a.jpg");
    assert_eq!(data["photoGallery"][0]["order"], 0);
    assert_eq!(data["location"]["address"], "");
    assert_eq!(data["fullDescription"], "<b>Bawa</b>");
}

#[tokio::test]
async fn category_filter_and_missing_rows() {
    let app = app();
    let token = admin_token(&app).await;
    create_active(&app, &token, "hotels", hotel_body("Cape Weligama")).await;
    let mut budget = hotel_body("Hangover Hostel");
    budget["category"] = json!("budget");
    create_active(&app, &token, "hotels", budget).await;

    let (_, body) = get(&app, "/api/hotels?category=budget", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Hangover Hostel");

    let (status, body) = get(&app, "/api/hotels/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Hotel not found");

    let (status, _) = delete(&app, "/api/hotels/42", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn restaurants_filter_by_cuisine() {
    let app = app();
    let token = admin_token(&app).await;
    create_active(&app, &token, "restaurants", restaurant_body("Ministry of Crab")).await;
    let mut italian = restaurant_body("Il Mare");
    italian["cuisine"] = json!("Italian");
    italian["priceRange"] = json!("$$$");
    create_active(&app, &token, "restaurants", italian).await;

    let (_, body) = get(&app, "/api/restaurants?cuisine=ital", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["priceRange"], "$$$");

    let (_, body) = get(&app, "/api/restaurants?cuisine=all", None).await;
    assert_eq!(body["count"], 2);

    let (status, body) = post(
        &app,
        "/api/restaurants",
        Some(&token),
        json!({ "name": "Nameless" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].as_array().unwrap().len() >= 4);
}
