mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn galle_fort_resolves_only_live_hotels() {
    let app = app();
    let token = admin_token(&app).await;

    // ids 1..=7; only hotel 7 is published
    for n in 1..=7 {
        let id = create(&app, &token, "hotels", hotel_body(&format!("Hotel {n}"))).await;
        assert_eq!(id, n);
    }
    let (status, _) = patch(&app, "/api/hotels/7/status", &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = delete(&app, "/api/hotels/3", &token).await;
    assert_eq!(status, StatusCode::OK);

    let mut body = destination_body("Galle Fort");
    body["whereToStay"] = json!({
        "description": "Stay inside the ramparts",
        "hotels": [
            { "hotelId": 3, "distance": 1.2 },
            { "hotelId": 7, "distance": 0.5 }
        ]
    });
    let (status, created) = post(&app, "/api/destinations", Some(&token), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["slug"], "galle-fort");
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, detail) = get(&app, &format!("/api/destinations/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let details = detail["data"]["whereToStay"]["hotelsDetails"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["hotelId"], 7);
    assert_eq!(details[0]["distance"], 0.5);
    assert_eq!(details[0]["unit"], "km");
    assert_eq!(details[0]["hotel"]["name"], "Hotel 7");

    // the stored list itself is untouched
    assert_eq!(detail["data"]["whereToStay"]["hotels"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn hidden_destination_looks_missing_to_the_public() {
    let app = app();
    let token = admin_token(&app).await;
    let id = create(&app, &token, "destinations", destination_body("Sigiriya")).await;

    let (hidden_status, hidden) = get(&app, &format!("/api/destinations/{id}"), None).await;
    let (missing_status, missing) = get(&app, "/api/destinations/999", None).await;
    assert_eq!(hidden_status, StatusCode::NOT_FOUND);
    assert_eq!(hidden_status, missing_status);
    assert_eq!(hidden, missing);
    assert_eq!(hidden["message"], "Destination not found");

    // an invalid token on a public route is treated as public
    let (status, _) = get(&app, &format!("/api/destinations/{id}"), Some("garbage")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, &format!("/api/destinations/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn slug_collision_is_a_field_error() {
    let app = app();
    let token = admin_token(&app).await;
    create(&app, &token, "destinations", destination_body("Ella Rock")).await;

    let (status, body) = post(
        &app,
        "/api/destinations",
        Some(&token),
        destination_body("Ella  Rock!"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "slug");
}

#[tokio::test]
async fn missing_fields_are_reported_per_field() {
    let app = app();
    let token = admin_token(&app).await;

    let (status, body) = post(&app, "/api/destinations", Some(&token), json!({ "name": "Mirissa" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"category"));
    assert!(fields.contains(&"region"));
    assert!(fields.contains(&"heroImage"));
}

#[tokio::test]
async fn rename_recomputes_slug_and_keeps_other_fields() {
    let app = app();
    let token = admin_token(&app).await;
    let id = create(&app, &token, "destinations", destination_body("Nine Arch Bridge")).await;

    let (status, body) = put(
        &app,
        &format!("/api/destinations/{id}"),
        &token,
        json!({ "name": "Nine Arches Bridge" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "nine-arches-bridge");
    assert_eq!(body["data"]["region"], "Southern Province");
}

#[tokio::test]
async fn explicit_null_resets_a_section() {
    let app = app();
    let token = admin_token(&app).await;
    let mut body = destination_body("Mirissa");
    body["whereToStay"] = json!({ "description": "Beachfront", "hotels": [] });
    body["travelTips"] = json!({ "tips": ["Go early"] });
    let id = create(&app, &token, "destinations", body).await;

    let (status, _) = put(
        &app,
        &format!("/api/destinations/{id}"),
        &token,
        json!({ "whereToStay": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = get(&app, &format!("/api/destinations/{id}"), Some(&token)).await;
    assert_eq!(detail["data"]["whereToStay"]["description"], "");
    // absent keys are left alone
    assert_eq!(detail["data"]["travelTips"]["tips"][0], "Go early");
}

#[tokio::test]
async fn public_list_only_shows_active_rows() {
    let app = app();
    let token = admin_token(&app).await;
    create_active(&app, &token, "destinations", destination_body("Unawatuna")).await;
    create(&app, &token, "destinations", destination_body("Hiriketiya")).await;

    let (status, body) = get(&app, "/api/destinations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Unawatuna");

    // status is ignored for the public
    let (_, body) = get(&app, "/api/destinations?status=draft", None).await;
    assert_eq!(body["count"], 1);

    let (_, body) = get(&app, "/api/destinations?status=draft", Some(&token)).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Hiriketiya");

    let (_, body) = get(&app, "/api/destinations?category=all", Some(&token)).await;
    assert_eq!(body["count"], 2);

    let (_, body) = get(&app, "/api/destinations?search=unawa", Some(&token)).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn nearby_hotels_come_from_their_own_references() {
    let app = app();
    let token = admin_token(&app).await;
    let dest = create_active(&app, &token, "destinations", destination_body("Yala")).await;

    let mut far = hotel_body("Jungle Lodge");
    far["nearbyDestinations"] = json!([{ "destinationId": dest, "distance": "12" }]);
    let far_id = create_active(&app, &token, "hotels", far).await;

    let mut near = hotel_body("Safari Camp");
    near["nearbyDestinations"] = json!([{ "destinationId": dest, "distance": 2 }]);
    let near_id = create_active(&app, &token, "hotels", near).await;

    let mut eatery = restaurant_body("Park Cafe");
    eatery["nearbyDestinations"] = json!([{ "destinationId": dest, "distance": 3 }]);
    create_active(&app, &token, "restaurants", eatery).await;

    let (status, body) = get(&app, &format!("/api/destinations/{dest}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let hotels = body["data"]["nearbyHotels"].as_array().unwrap();
    assert_eq!(hotels.len(), 2);
    assert_eq!(hotels[0]["hotelId"], near_id);
    assert_eq!(hotels[1]["hotelId"], far_id);
    assert_eq!(hotels[1]["distance"], 12.0);
    assert_eq!(body["data"]["nearbyRestaurants"].as_array().unwrap().len(), 1);

    // deleting a hotel drops its links
    delete(&app, &format!("/api/hotels/{near_id}"), &token).await;
    let (_, body) = get(&app, &format!("/api/destinations/{dest}"), None).await;
    assert_eq!(body["data"]["nearbyHotels"].as_array().unwrap().len(), 1);

    // and the hotel detail resolves back to the destination
    let (_, body) = get(&app, &format!("/api/hotels/{far_id}"), None).await;
    let details = body["data"]["nearbyDestinationsDetails"].as_array().unwrap();
    assert_eq!(details[0]["destination"]["name"], "Yala");
}

#[tokio::test]
async fn writes_require_an_admin() {
    let app = app();
    let (status, body) = post(&app, "/api/destinations", None, destination_body("Kandy")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = post(&app, "/api/destinations", Some("not-a-jwt"), destination_body("Kandy")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
