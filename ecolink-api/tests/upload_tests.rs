//! Integration tests for the contribution pipeline
//!
//! Local mock servers stand in for object storage and the classifier, so
//! the whole multipart → validate → store → classify → reward → persist
//! chain runs for real against a tempfile database.

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::json;
use tower::util::ServiceExt;

/// Classifier reply wrapping its JSON answer in prose, as real models do
const PROSE_WRAPPED_RARITY_3: &str = "Certainly! Based on the species you \
provided, here is my assessment:\n{\"rarity\": 3, \"description\": \"A \
cultivated rose, moderately uncommon in the wild.\"}\nHope this helps!";

fn plant_parts<'a>(image_bytes: &'a [u8]) -> Vec<Part<'a>> {
    vec![
        Part::Text {
            name: "name",
            value: "Rose",
        },
        Part::Text {
            name: "latitude",
            value: "12.9",
        },
        Part::Text {
            name: "longitude",
            value: "77.6",
        },
        Part::File {
            name: "image",
            file_name: "rose.jpg",
            content_type: "image/jpeg",
            bytes: image_bytes,
        },
    ]
}

// ============================================================================
// Plant pipeline
// ============================================================================

#[tokio::test]
async fn test_plant_upload_end_to_end() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let request = multipart_request("/api/v1/plants/upload", "student-1", &plant_parts(&image));
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["plant"]["name"], "Rose");
    assert_eq!(body["plant"]["rarity"], 3);
    assert_eq!(body["plant"]["latitude"], 12.9);
    assert_eq!(body["plant"]["longitude"], 77.6);
    assert_eq!(body["ecoPoints"], 50);

    let image_url = body["plant"]["imageUrl"].as_str().unwrap();
    assert!(image_url.contains("/plant-images/"));
    assert!(image_url.ends_with(".jpg"));
    assert_eq!(mock.put_count(), 1);

    // Rarity 3 awards exactly 50 points, atomically with the insert
    let profile = fetch_user(&test.app, "student-1", "student-1").await;
    assert_eq!(profile["ecoPoints"], 50);
}

#[tokio::test]
async fn test_pdf_rejected_before_storage() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let doc = b"%PDF-1.4 not an image";
    let parts = vec![
        Part::Text {
            name: "name",
            value: "Rose",
        },
        Part::Text {
            name: "latitude",
            value: "12.9",
        },
        Part::Text {
            name: "longitude",
            value: "77.6",
        },
        Part::File {
            name: "image",
            file_name: "rose.pdf",
            content_type: "application/pdf",
            bytes: doc,
        },
    ];
    let request = multipart_request("/api/v1/plants/upload", "student-1", &parts);
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported content type"));

    // Rejected before any object-storage call
    assert_eq!(mock.put_count(), 0);

    // Nothing persisted, nothing awarded
    let profile = fetch_user(&test.app, "student-1", "student-1").await;
    assert_eq!(profile["ecoPoints"], 0);
}

#[tokio::test]
async fn test_classifier_garbage_degrades_to_default() {
    let mock = spawn_mock_services("the model rambled and returned no json at all").await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let request = multipart_request("/api/v1/plants/upload", "student-1", &plant_parts(&image));
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["plant"]["rarity"], 1);
    assert_eq!(body["ecoPoints"], 10);
}

#[tokio::test]
async fn test_classifier_error_status_degrades_to_default() {
    // Empty reply makes the mock answer 500
    let mock = spawn_mock_services("").await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let request = multipart_request("/api/v1/plants/upload", "student-1", &plant_parts(&image));
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["plant"]["rarity"], 1);
    assert_eq!(body["ecoPoints"], 10);
}

#[tokio::test]
async fn test_classifier_transport_failure_degrades_to_default() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    // Classifier pointed at a closed port: transport error, not a reply
    let test = setup_app(mock.base_url.clone(), Some("http://127.0.0.1:1/classify".to_string()))
        .await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let request = multipart_request("/api/v1/plants/upload", "student-1", &plant_parts(&image));
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["plant"]["rarity"], 1);
    assert_eq!(body["ecoPoints"], 10);

    let profile = fetch_user(&test.app, "student-1", "student-1").await;
    assert_eq!(profile["ecoPoints"], 10);
}

#[tokio::test]
async fn test_malformed_latitude_rejected() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let parts = vec![
        Part::Text {
            name: "name",
            value: "Rose",
        },
        Part::Text {
            name: "latitude",
            value: "somewhere",
        },
        Part::Text {
            name: "longitude",
            value: "77.6",
        },
        Part::File {
            name: "image",
            file_name: "rose.jpg",
            content_type: "image/jpeg",
            bytes: &image,
        },
    ];
    let request = multipart_request("/api/v1/plants/upload", "student-1", &parts);
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Invalid latitude");
}

#[tokio::test]
async fn test_missing_image_part_rejected() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let parts = vec![
        Part::Text {
            name: "name",
            value: "Rose",
        },
        Part::Text {
            name: "latitude",
            value: "12.9",
        },
        Part::Text {
            name: "longitude",
            value: "77.6",
        },
    ];
    let request = multipart_request("/api/v1/plants/upload", "student-1", &parts);
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Missing image part: image");
}

// ============================================================================
// Animal pipeline
// ============================================================================

#[tokio::test]
async fn test_animal_upload_classifies_image() {
    let reply = r#"{"rarity": 5, "description": "A leopard, rarely sighted."}"#;
    let mock = spawn_mock_services(reply).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let parts = vec![
        Part::Text {
            name: "latitude",
            value: "11.5",
        },
        Part::Text {
            name: "longitude",
            value: "76.2",
        },
        Part::File {
            name: "image",
            file_name: "leopard.png",
            content_type: "image/png",
            bytes: &image,
        },
    ];
    let request = multipart_request("/api/v1/animal/upload", "student-1", &parts);
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["animal"]["rarity"], 5);
    assert_eq!(body["ecoPoints"], 200);
    assert!(body["animal"]["imageUrl"]
        .as_str()
        .unwrap()
        .contains("/animal-images/"));

    let profile = fetch_user(&test.app, "student-1", "student-1").await;
    assert_eq!(profile["ecoPoints"], 200);
}

// ============================================================================
// Litter pipeline
// ============================================================================

async fn upload_litter(test: &TestApp, token: &str) -> serde_json::Value {
    let image = fake_jpeg();
    let parts = vec![
        Part::Text {
            name: "latitude",
            value: "12.9",
        },
        Part::Text {
            name: "longitude",
            value: "77.6",
        },
        Part::File {
            name: "beforeImage",
            file_name: "before.jpg",
            content_type: "image/jpeg",
            bytes: &image,
        },
        Part::File {
            name: "afterImage",
            file_name: "after.jpg",
            content_type: "image/jpeg",
            bytes: &image,
        },
    ];
    let request = multipart_request("/api/v1/litter/upload", token, &parts);
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response.into_body()).await
}

#[tokio::test]
async fn test_litter_upload_and_deferred_award() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;
    create_user(&test.app, "staff-1", "Meera Iyer", "SCHOOL_STAFF").await;

    let body = upload_litter(&test, "student-1").await;
    assert_eq!(body["litter"]["isAwarded"], false);
    let litter_id = body["litter"]["id"].as_str().unwrap().to_string();
    assert_eq!(mock.put_count(), 2);

    // No points until the explicit award
    let profile = fetch_user(&test.app, "student-1", "student-1").await;
    assert_eq!(profile["ecoPoints"], 0);

    // Award by a different caller credits the submitter
    let request = json_request(
        "POST",
        "/api/v1/eco-points/add",
        Some("staff-1"),
        &json!({ "litterId": litter_id, "points": 20 }),
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["litter"]["isAwarded"], true);

    let submitter = fetch_user(&test.app, "student-1", "student-1").await;
    assert_eq!(submitter["ecoPoints"], 20);
    let awarder = fetch_user(&test.app, "staff-1", "staff-1").await;
    assert_eq!(awarder["ecoPoints"], 0);
}

#[tokio::test]
async fn test_double_award_rejected() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;
    create_user(&test.app, "staff-1", "Meera Iyer", "SCHOOL_STAFF").await;

    let body = upload_litter(&test, "student-1").await;
    let litter_id = body["litter"]["id"].as_str().unwrap().to_string();

    let award = json!({ "litterId": litter_id, "points": 20 });
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/eco-points/add",
            Some("staff-1"),
            &award,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Retry must not double-award
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/eco-points/add",
            Some("staff-1"),
            &award,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body["message"].as_str().unwrap().contains("already awarded"));

    let submitter = fetch_user(&test.app, "student-1", "student-1").await;
    assert_eq!(submitter["ecoPoints"], 20);
}

#[tokio::test]
async fn test_litter_missing_after_image_rejected() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let parts = vec![
        Part::Text {
            name: "latitude",
            value: "12.9",
        },
        Part::Text {
            name: "longitude",
            value: "77.6",
        },
        Part::File {
            name: "beforeImage",
            file_name: "before.jpg",
            content_type: "image/jpeg",
            bytes: &image,
        },
    ];
    let request = multipart_request("/api/v1/litter/upload", "student-1", &parts);
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Missing image part: afterImage");
}

// ============================================================================
// Read endpoints fed by the pipeline
// ============================================================================

#[tokio::test]
async fn test_student_lists_and_markers() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;

    let image = fake_jpeg();
    let request = multipart_request("/api/v1/plants/upload", "student-1", &plant_parts(&image));
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    upload_litter(&test, "student-1").await;

    let response = test
        .app
        .clone()
        .oneshot(get_request("/api/v1/plants/student", Some("student-1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response.into_body()).await;
    assert_eq!(page["plants"].as_array().unwrap().len(), 1);
    assert_eq!(page["currentPage"], 1);

    let response = test
        .app
        .clone()
        .oneshot(get_request("/api/v1/litters/student", Some("student-1")))
        .await
        .unwrap();
    let page = body_json(response.into_body()).await;
    assert_eq!(page["litters"].as_array().unwrap().len(), 1);

    // Markers are public and span observation kinds
    let response = test
        .app
        .clone()
        .oneshot(get_request("/api/v1/markers", None))
        .await
        .unwrap();
    let body = body_json(response.into_body()).await;
    let markers = body["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 2);
    let kinds: Vec<&str> = markers
        .iter()
        .map(|m| m["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"plant"));
    assert!(kinds.contains(&"litter"));
}

#[tokio::test]
async fn test_litters_by_school() {
    let mock = spawn_mock_services(PROSE_WRAPPED_RARITY_3).await;
    let test = setup_app(mock.base_url.clone(), Some(mock.classifier_url())).await;
    create_user(&test.app, "staff-1", "Meera Iyer", "SCHOOL_STAFF").await;
    create_user(&test.app, "student-1", "Asha Rao", "STUDENT").await;
    create_user(&test.app, "student-2", "Vikram Shah", "STUDENT").await;

    // Staff founds the school; student-1 joins it, student-2 stays out
    let request = json_request(
        "POST",
        "/api/v1/org/School",
        Some("staff-1"),
        &json!({ "name": "Green Valley School", "phoneNo": "080-1234", "email": "gv@example.org" }),
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    let body = body_json(response.into_body()).await;
    let school_id = body["org"]["id"].as_str().unwrap().to_string();
    let code = body["org"]["code"].as_str().unwrap().to_string();

    let request = json_request(
        "POST",
        "/api/v1/org/join/School",
        Some("student-1"),
        &json!({ "organization_code": code }),
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    upload_litter(&test, "student-1").await;
    upload_litter(&test, "student-2").await;

    let request = get_request(
        &format!("/api/v1/litters/school/{}", school_id),
        Some("staff-1"),
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response.into_body()).await;

    // Only the affiliated student's report shows up
    assert_eq!(page["litters"].as_array().unwrap().len(), 1);
}
