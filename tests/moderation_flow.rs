mod common;

use axum::http::StatusCode;
use common::{DEVELOPER_KEY, MODERATOR_KEY, read_json, request, test_app};
use tower::ServiceExt;

async fn create_brand(app: &axum::Router, api_key: &str, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/brands?api_key={api_key}&name={name}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn queue_ids(app: &axum::Router, queue: &str) -> Vec<String> {
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/moderate/{queue}?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn creation_approval_publishes_the_brand_exactly_once() {
    let app = test_app().await;
    let brand_id = create_brand(&app, DEVELOPER_KEY, "Tatuaje").await;

    let ids = queue_ids(&app, "brandsCreateRequests").await;
    assert_eq!(ids, vec![brand_id.clone()]);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/moderate/brandsCreateRequests/{brand_id}?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "The brand has been approved.");

    // Now public.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second approval of the same creation loses.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/moderate/brandsCreateRequests/{brand_id}?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn denying_a_brand_creation_cascades_to_its_pending_cigars() {
    let app = test_app().await;
    let brand_id = create_brand(&app, DEVELOPER_KEY, "Shady").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/cigars?api_key={DEVELOPER_KEY}&brand=Shady&name=Knockoff"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(queue_ids(&app, "cigarsCreateRequests").await.len(), 1);

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!(
                "/moderate/brandsCreateRequests/{brand_id}?api_key={MODERATOR_KEY}&notes=fabricated"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The pending cigar went down with its brand.
    assert!(queue_ids(&app, "cigarsCreateRequests").await.is_empty());
    assert!(queue_ids(&app, "brandsCreateRequests").await.is_empty());
}

#[tokio::test]
async fn developer_update_queues_and_approval_applies_it() {
    let app = test_app().await;
    let brand_id = create_brand(&app, MODERATOR_KEY, "Oliva").await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}&country=Nicaragua"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json(response).await;
    assert_eq!(
        body["message"],
        "The update has been submitted and is awaiting approval."
    );

    // The canonical record is untouched while the request waits.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert!(body["data"].get("country").is_none());

    let request_ids = queue_ids(&app, "brandsUpdateRequests").await;
    assert_eq!(request_ids.len(), 1);
    let request_id = &request_ids[0];

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/moderate/brandsUpdateRequests/{request_id}?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"]["country"], "Nicaragua");

    // Approving the same request again must not re-apply anything.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/moderate/brandsUpdateRequests/{request_id}?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn denied_update_never_touches_the_entity() {
    let app = test_app().await;
    let brand_id = create_brand(&app, MODERATOR_KEY, "Padron").await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}&country=Cuba"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let request_id = queue_ids(&app, "brandsUpdateRequests").await[0].clone();
    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!(
                "/moderate/brandsUpdateRequests/{request_id}?api_key={MODERATOR_KEY}&notes=wrong"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert!(body["data"].get("country").is_none());

    // Resolved requests leave the pending queue.
    assert!(queue_ids(&app, "brandsUpdateRequests").await.is_empty());
}

#[tokio::test]
async fn moderator_update_applies_in_place() {
    let app = test_app().await;
    let brand_id = create_brand(&app, MODERATOR_KEY, "Fuente").await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!(
                "/brands/{brand_id}?api_key={MODERATOR_KEY}&country=Dominican%20Republic"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "The update has been processed.");

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"]["country"], "Dominican Republic");
}

#[tokio::test]
async fn delete_request_flow_marks_the_brand_deleted() {
    let app = test_app().await;
    let brand_id = create_brand(&app, MODERATOR_KEY, "Doomed").await;

    // A delete request without a reason is rejected.
    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "You must provide a reason.");

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}&reason=duplicate"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let request_id = queue_ids(&app, "brandsDeleteRequests").await[0].clone();
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/moderate/brandsDeleteRequests/{request_id}?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deleted records leave the public surface.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn moderator_delete_applies_directly_without_a_reason() {
    let app = test_app().await;
    let brand_id = create_brand(&app, MODERATOR_KEY, "ShortLived").await;

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/brands/{brand_id}?api_key={MODERATOR_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "The delete has been processed.");

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/brands/{brand_id}?api_key={DEVELOPER_KEY}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn approving_a_missing_request_is_not_found() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!(
                "/moderate/brandsUpdateRequests/0b1f8d8e-0000-0000-0000-000000000000?api_key={MODERATOR_KEY}"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Request not found!");
}
