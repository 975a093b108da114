//! REST surface over the record services.

mod support;

use axum::http::{Method, StatusCode};
use dealflow_test_utils::fixtures::seeded_store;
use dealflow_test_utils::{EntityType, InMemoryRecordStore, MockCompletionProvider};
use serde_json::json;
use support::TestApp;

fn app() -> TestApp {
    TestApp::new(seeded_store(), MockCompletionProvider::replying("Subject: Next steps"))
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();

    let (status, body) = app.send_raw(Method::GET, "/health/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"pong");

    let (status, body) = app.send(Method::GET, "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["record_store"]["status"], "healthy");
}

#[tokio::test]
async fn test_contact_crud_round_trip() {
    let app = app();

    let (status, created) = app
        .send(
            Method::POST,
            "/api/v1/contacts",
            Some(json!({"firstName": "Katherine", "lastName": "Johnson", "email": "kj@example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["Id"].as_i64().unwrap();
    assert!(id > 2);
    assert_eq!(created["first_name_c"], "Katherine");

    let (status, patched) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/contacts/{}", id),
            Some(json!({"phone": "555-0199"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["phone_c"], "555-0199");
    assert_eq!(patched["email_c"], "kj@example.com");

    let (status, fetched) = app
        .send(Method::GET, &format!("/api/v1/contacts/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["last_name_c"], "Johnson");

    let (status, deleted) = app
        .send(Method::DELETE, &format!("/api/v1/contacts/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"success": true}));
    assert_eq!(app.store.count(EntityType::Contact).unwrap(), 2);
}

#[tokio::test]
async fn test_missing_and_invalid_ids() {
    let app = app();

    let (status, body) = app.send(Method::GET, "/api/v1/contacts/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "ENTITY_NOT_FOUND");

    let (status, body) = app.send(Method::GET, "/api/v1/deals/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");

    let (status, body) = app
        .send(Method::PATCH, "/api/v1/companies/999", Some(json!({"name": "Ghost"})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "OPERATION_FAILED");
}

#[tokio::test]
async fn test_deal_crud_without_stage_email() {
    let app = app();

    let (status, deals) = app.send(Method::GET, "/api/v1/deals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deals.as_array().unwrap().len(), 3);

    let (status, created) = app
        .send(
            Method::POST,
            "/api/v1/deals",
            Some(json!({"title": "Harbour cranes", "value": 75000, "contactId": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["stage_c"], "Lead");
    let id = created["Id"].as_i64().unwrap();

    let (status, fetched) = app
        .send(Method::GET, &format!("/api/v1/deals/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title_c"], "Harbour cranes");

    let (status, deleted) = app
        .send(Method::DELETE, &format!("/api/v1/deals/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"success": true}));

    let (status, body) = app
        .send(Method::GET, &format!("/api/v1/deals/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ENTITY_NOT_FOUND");
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn test_delete_nonexistent_reports_unsuccessful() {
    let app = app();
    let (status, body) = app.send(Method::DELETE, "/api/v1/deals/999", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": false}));
    assert_eq!(app.store.count(EntityType::Deal).unwrap(), 3);
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let app = app();
    let (status, body) = app
        .send(Method::POST, "/api/v1/companies", Some(json!(["Acme"])))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(app.store.count(EntityType::Company).unwrap(), 0);
}

#[tokio::test]
async fn test_contact_search_and_related_records() {
    let app = app();

    let (status, found) = app
        .send(Method::GET, "/api/v1/contacts/search?q=hopper", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["first_name_c"], "Grace");

    let (_, deals) = app.send(Method::GET, "/api/v1/contacts/1/deals", None).await;
    assert_eq!(deals.as_array().unwrap().len(), 2);

    let (_, activities) = app
        .send(Method::GET, "/api/v1/contacts/1/activities", None)
        .await;
    let activities = activities.as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["Id"], 101);
}

#[tokio::test]
async fn test_deal_patch_with_stage_drafts_notes() {
    let app = app();
    let (status, deal) = app
        .send(
            Method::PATCH,
            "/api/v1/deals/10",
            Some(json!({"stage": "Proposal", "value": 42000})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(deal["stage_c"], "Proposal");
    assert_eq!(deal["notes_c"], "Subject: Next steps");
    assert_eq!(app.provider.call_count(), 1);
    let prompt = app.provider.last_prompt().unwrap();
    assert!(prompt.contains("Engine retrofit"));
    assert!(prompt.contains(" worth $42000"));
}

#[tokio::test]
async fn test_deal_patch_survives_generator_failure() {
    let app = TestApp::new(seeded_store(), MockCompletionProvider::unauthorized());
    let (status, deal) = app
        .send(
            Method::PATCH,
            "/api/v1/deals/10",
            Some(json!({"stage": "Qualified", "probability": 60})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(deal["stage_c"], "Qualified");
    assert_eq!(deal["probability_c"], 60);
    assert_eq!(deal["notes_c"], "Met at expo");
}

#[tokio::test]
async fn test_move_deal_endpoint() {
    let app = app();

    let (status, deal) = app
        .send(
            Method::POST,
            "/api/v1/deals/11/move",
            Some(json!({"stage": "negotiation"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deal["stage_c"], "Negotiation");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/deals/11/move",
            Some(json!({"stage": "Abandoned"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["message"], "Invalid deal stage: Abandoned");
    assert_eq!(body["details"]["allowedStages"][2], "Proposal");
}

#[tokio::test]
async fn test_pipeline_and_dashboard() {
    let app = app();

    let (status, pipeline) = app.send(Method::GET, "/api/v1/pipeline", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pipeline["total_deals"], 3);

    let (status, dashboard) = app.send(Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_contacts"], 2);
    assert_eq!(dashboard["active_deals"], 2);
}

#[tokio::test]
async fn test_quote_listing_filters_by_status() {
    let app = TestApp::new(InMemoryRecordStore::new(), MockCompletionProvider::default());
    for (status, method) in [("Draft", "Email"), ("Sent", "Courier"), ("Sent", "Email")] {
        let (code, _) = app
            .send(
                Method::POST,
                "/api/v1/quotes",
                Some(json!({"status": status, "deliveryMethod": method})),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, listing) = app
        .send(Method::GET, "/api/v1/quotes?status=Sent&search=courier", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 3);
    assert_eq!(listing["quotes"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(Method::GET, "/api/v1/quotes?status=Shredded", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_sales_orders_sorted_by_amount() {
    let app = TestApp::new(InMemoryRecordStore::new(), MockCompletionProvider::default());
    for (number, amount) in [("SO-1", 100), ("SO-2", 900), ("SO-3", 450)] {
        app.send(
            Method::POST,
            "/api/v1/sales-orders",
            Some(json!({"orderNumber": number, "totalAmount": amount})),
        )
        .await;
    }

    let (status, orders) = app
        .send(Method::GET, "/api/v1/sales-orders?sort=amount", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<&str> = orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["order_number_c"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["SO-2", "SO-3", "SO-1"]);
}
