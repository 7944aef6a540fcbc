mod common;

use axum::http::StatusCode;
use common::{DEVELOPER_KEY, MODERATOR_KEY, PREMIUM_KEY, read_json, request, test_app};
use tower::ServiceExt;

async fn create_brand(app: &axum::Router, api_key: &str, name: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/brands?api_key={api_key}&name={name}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    read_json(response).await
}

#[tokio::test]
async fn developer_created_brand_waits_for_approval() {
    let app = test_app().await;

    let body = create_brand(&app, DEVELOPER_KEY, "Tatuaje").await;
    assert_eq!(
        body["message"],
        "The brand has been created and is awaiting approval."
    );
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Not approved yet, so invisible on the public surface.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn moderator_created_brand_is_immediately_visible() {
    let app = test_app().await;

    let body = create_brand(&app, MODERATOR_KEY, "Oliva").await;
    assert_eq!(body["message"], "The brand has been created and approved.");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["name"], "Oliva");
    assert_eq!(body["data"]["status"], "approved");
}

#[tokio::test]
async fn brand_create_requires_a_name() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request("POST", &format!("/brands?api_key={DEVELOPER_KEY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "You must supply at least a name.");
}

#[tokio::test]
async fn unknown_fields_are_rejected() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/brands?api_key={DEVELOPER_KEY}&name=Padron&tier=legendary"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("tier"));
}

#[tokio::test]
async fn empty_catalog_answers_not_found() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/brands?api_key={DEVELOPER_KEY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], "No records found!");
}

#[tokio::test]
async fn brand_listing_paginates_for_developers() {
    let app = test_app().await;
    for i in 0..60 {
        create_brand(&app, MODERATOR_KEY, &format!("Brand{i:02}")).await;
    }

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands?api_key={DEVELOPER_KEY}&page=2"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["numberOfPages"], 2);
    assert_eq!(body["currentPage"], 2);
    let data = body["data"].as_array().unwrap();
    // Page 2 starts at record 51 of the name-sorted set.
    assert_eq!(data.len(), 10);
    assert_eq!(data[0]["name"], "Brand50");
    assert_eq!(data[9]["name"], "Brand59");
}

#[tokio::test]
async fn premium_listing_is_unpaginated() {
    let app = test_app().await;
    for i in 0..60 {
        create_brand(&app, MODERATOR_KEY, &format!("Brand{i:02}")).await;
    }

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/brands?api_key={PREMIUM_KEY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["numberOfPages"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 60);
}

#[tokio::test]
async fn brand_name_search_is_case_insensitive() {
    let app = test_app().await;
    create_brand(&app, MODERATOR_KEY, "Montecristo").await;
    create_brand(&app, MODERATOR_KEY, "Cohiba").await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands?api_key={DEVELOPER_KEY}&name=monte"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Montecristo");
}

#[tokio::test]
async fn cigar_listing_requires_a_filter_below_premium() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/cigars?api_key={DEVELOPER_KEY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "You must supply at least one field.");
}

#[tokio::test]
async fn cigar_create_requires_an_existing_brand() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/cigars?api_key={DEVELOPER_KEY}&brand=Ghost&name=Phantom"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("please create the brand first")
    );
}

#[tokio::test]
async fn cigar_create_accepts_a_pending_brand() {
    let app = test_app().await;
    create_brand(&app, DEVELOPER_KEY, "Fresh").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/cigars?api_key={DEVELOPER_KEY}&brand=Fresh&name=First"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn cigar_create_validates_vocabulary_values() {
    let app = test_app().await;
    create_brand(&app, MODERATOR_KEY, "Padron").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!(
                "/cigars?api_key={DEVELOPER_KEY}&brand=Padron&name=Serie&vitola=Banana&color=Plaid"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("color") && message.contains("vitola"));
}

#[tokio::test]
async fn cigar_filters_match_list_fields_on_overlap() {
    let app = test_app().await;
    create_brand(&app, MODERATOR_KEY, "Padron").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!(
                "/cigars?api_key={MODERATOR_KEY}&brand=Padron&name=Anniversary&wrappers=Habano,Corojo&strength=Full"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/cigars?api_key={DEVELOPER_KEY}&wrappers=Corojo"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"][0]["name"], "Anniversary");

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/cigars?api_key={DEVELOPER_KEY}&wrappers=Sumatra"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() {
    let app = test_app().await;
    create_brand(&app, MODERATOR_KEY, "Padron").await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands?api_key={DEVELOPER_KEY}&sort_field=website"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn domain_values_endpoint_serves_vocabularies() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/cigarDomainValues?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(!body["data"]["vitolas"].as_array().unwrap().is_empty());
    assert!(!body["data"]["wrappers"].as_array().unwrap().is_empty());
}
