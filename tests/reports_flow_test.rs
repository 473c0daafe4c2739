//! Selection preview and batch dispatch flow against a mock platform
//! backend: over-fetch dialect, local re-filtering, confirmation gating,
//! double-click safety, retry after failure, and preview coalescing.

mod fixtures;
mod helpers;

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use fixtures::{interleaved_orders, minute, order, orders_page};
use helpers::{spawn_app, spawn_app_with_debounce, TestApp, TEST_TOKEN};

const ORDERS_PATH: &str = "/api/admin/life-journey-orders";
const PROCESS_PATH: &str = "/api/life-journey-report/process-lcr-reports";

async fn preview(app: &TestApp, target_count: u32) -> Value {
    let response = app
        .api_get(&format!("/api/reports/selection?targetCount={target_count}"))
        .await;
    assert_eq!(response.status(), 200);
    response.json().await.expect("preview body not JSON")
}

fn picked_ids(preview: &Value) -> Vec<&str> {
    preview["orders"]
        .as_array()
        .expect("orders missing")
        .iter()
        .map(|order| order["id"].as_str().expect("order id missing"))
        .collect()
}

#[tokio::test]
async fn test_selection_picks_oldest_pending_with_overfetch() {
    let app = spawn_app().await;

    // One over-fetched, oldest-first query with the pending hint attached.
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .and(query_param("page", "1"))
        .and(query_param("limit", "15"))
        .and(query_param("sortBy", "createdAt"))
        .and(query_param("sortOrder", "asc"))
        .and(query_param("reportDeliveryStatus", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(interleaved_orders())))
        .expect(1)
        .mount(&app.backend)
        .await;

    let preview = preview(&app, 5).await;
    assert!(preview["batchId"].is_string());
    assert_eq!(preview["targetCount"], 5);
    assert_eq!(preview["qualifyingCount"], 10);
    // Delivered rows leaked by the backend filter are skipped locally.
    assert_eq!(picked_ids(&preview), vec!["o01", "o02", "o04", "o06", "o07"]);
}

#[tokio::test]
async fn test_selection_shorter_when_few_qualify() {
    let app = spawn_app().await;

    let items = vec![
        order("d1", Some("delivered"), &minute(1)),
        order("p1", Some("pending"), &minute(2)),
        order("d2", Some("delivered"), &minute(3)),
        order("f1", Some("failed"), &minute(4)),
        order("n1", None, &minute(5)),
    ];
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .and(query_param("limit", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(items)))
        .mount(&app.backend)
        .await;

    let preview = preview(&app, 10).await;
    // Failed and status-less rows qualify alongside pending ones.
    assert_eq!(picked_ids(&preview), vec!["p1", "f1", "n1"]);
    assert_eq!(preview["qualifyingCount"], 3);
    assert!(preview["batchId"].is_string());
}

#[tokio::test]
async fn test_empty_selection_has_no_batch_to_dispatch() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("d1", Some("delivered"), &minute(1)),
            order("d2", Some("delivered"), &minute(2)),
        ])))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let preview = preview(&app, 5).await;
    assert!(preview.get("batchId").is_none());
    assert_eq!(preview["qualifyingCount"], 0);
    assert!(preview["orders"].as_array().unwrap().is_empty());

    // With nothing selected there is no batch, so dispatch has no target.
    let response = app
        .api_post(
            "/api/reports/dispatch",
            &json!({ "batchId": uuid::Uuid::new_v4(), "confirmedCount": 1 }),
        )
        .await;
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "unknown_batch");
}

#[tokio::test]
async fn test_selection_rejects_bad_target_count() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![])))
        .expect(0)
        .mount(&app.backend)
        .await;

    for query in ["targetCount=0", "targetCount=501", ""] {
        let response = app.api_get(&format!("/api/reports/selection?{query}")).await;
        assert_eq!(response.status(), 422, "query {query:?}");
    }
}

#[tokio::test]
async fn test_dispatch_requires_exact_confirmed_count() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("p1", Some("pending"), &minute(1)),
            order("p2", Some("pending"), &minute(2)),
            order("p3", Some("pending"), &minute(3)),
        ])))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .and(body_json(json!({ "reportIds": ["p1", "p2", "p3"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobCount": 3 })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let preview = preview(&app, 5).await;
    let batch_id = preview["batchId"].as_str().unwrap().to_string();

    // A stale acknowledgment (count no longer matching) is refused.
    let response = app
        .api_post(
            "/api/reports/dispatch",
            &json!({ "batchId": batch_id, "confirmedCount": 2 }),
        )
        .await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "count_mismatch");

    // The refusal leaves the batch intact; a correct acknowledgment goes out.
    let response = app
        .api_post(
            "/api/reports/dispatch",
            &json!({ "batchId": batch_id, "confirmedCount": 3 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "succeeded");
    assert_eq!(body["batchId"], batch_id);
    assert_eq!(body["submitted"], 3);
    assert_eq!(body["jobCount"], 3);
}

#[tokio::test]
async fn test_double_click_submits_exactly_once() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("p1", Some("pending"), &minute(1)),
            order("p2", Some("pending"), &minute(2)),
        ])))
        .mount(&app.backend)
        .await;
    // Slow enough that the second click lands while the first is in flight;
    // expect(1) is the whole point of the test.
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "jobCount": 2 }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let preview = preview(&app, 2).await;
    let request = json!({
        "batchId": preview["batchId"],
        "confirmedCount": 2,
    });

    let first = app
        .client
        .post(app.url("/api/reports/dispatch"))
        .bearer_auth(TEST_TOKEN)
        .json(&request)
        .send();
    let second = app
        .client
        .post(app.url("/api/reports/dispatch"))
        .bearer_auth(TEST_TOKEN)
        .json(&request)
        .send();
    let results = futures::future::join_all([first, second]).await;

    let mut accepted = 0;
    let mut refused = 0;
    for result in results {
        let response = result.expect("request failed");
        match response.status().as_u16() {
            200 => accepted += 1,
            409 => {
                let body: Value = response.json().await.unwrap();
                assert_eq!(body["code"], "dispatch_in_flight");
                refused += 1;
            }
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!((accepted, refused), (1, 1));
}

#[tokio::test]
async fn test_preview_refused_while_submission_in_flight() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("p1", Some("pending"), &minute(1)),
        ])))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let first = preview(&app, 1).await;
    let request = json!({ "batchId": first["batchId"], "confirmedCount": 1 });

    let in_flight = {
        let client = app.client.clone();
        let url = app.url("/api/reports/dispatch");
        tokio::spawn(async move {
            client
                .post(url)
                .bearer_auth(TEST_TOKEN)
                .json(&request)
                .send()
                .await
                .expect("request failed")
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // A preview cannot replace a batch whose submission is still out.
    let response = app.api_get("/api/reports/selection?targetCount=1").await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "dispatch_in_flight");

    let dispatched = in_flight.await.expect("dispatch task panicked");
    assert_eq!(dispatched.status(), 200);
}

#[tokio::test]
async fn test_failed_dispatch_retries_with_same_ids() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("p1", Some("pending"), &minute(1)),
            order("p2", Some("pending"), &minute(2)),
        ])))
        .mount(&app.backend)
        .await;

    let expected_body = json!({ "reportIds": ["p1", "p2"] });

    // First attempt blows up server-side.
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.backend)
        .await;

    let preview = preview(&app, 2).await;
    let request = json!({ "batchId": preview["batchId"], "confirmedCount": 2 });

    let response = app.api_post("/api/reports/dispatch", &request).await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "backend_rejected");

    // The batch survived the failure; the retry carries the very same ids
    // (the body matcher is what proves it).
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobCount": 2 })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app.api_post("/api/reports/dispatch", &request).await;
    assert_eq!(response.status(), 200);

    // Success discards the batch; a third click has nothing to hit.
    let response = app.api_post("/api/reports/dispatch", &request).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_new_preview_invalidates_previous_batch() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("p1", Some("pending"), &minute(1)),
            order("p2", Some("pending"), &minute(2)),
        ])))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let first = preview(&app, 2).await;
    let second = preview(&app, 2).await;
    assert_ne!(first["batchId"], second["batchId"]);

    // The superseded draft is gone.
    let response = app
        .api_post(
            "/api/reports/dispatch",
            &json!({ "batchId": first["batchId"], "confirmedCount": 2 }),
        )
        .await;
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "unknown_batch");

    // The current one dispatches fine.
    let response = app
        .api_post(
            "/api/reports/dispatch",
            &json!({ "batchId": second["batchId"], "confirmedCount": 2 }),
        )
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rapid_previews_coalesce_into_one_query() {
    let app = spawn_app_with_debounce(200).await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("p1", Some("pending"), &minute(1)),
        ])))
        .expect(1)
        .mount(&app.backend)
        .await;

    let early = {
        let client = app.client.clone();
        let url = app.url("/api/reports/selection?targetCount=3");
        tokio::spawn(async move {
            client
                .get(url)
                .bearer_auth(TEST_TOKEN)
                .send()
                .await
                .expect("request failed")
        })
    };
    // Land inside the first request's debounce window.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let late = app.api_get("/api/reports/selection?targetCount=5").await;

    // Only the newest request queried the backend (expect(1) above); the
    // earlier one was superseded without ever leaving the gateway.
    let early = early.await.expect("preview task panicked");
    assert_eq!(early.status(), 409);
    let body: Value = early.json().await.unwrap();
    assert_eq!(body["code"], "superseded");

    assert_eq!(late.status(), 200);
    let preview: Value = late.json().await.unwrap();
    assert_eq!(preview["targetCount"], 5);
}

#[tokio::test]
async fn test_slow_stale_response_never_wins() {
    let app = spawn_app().await;

    // The first query's response is slow and stale by the time it arrives.
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(orders_page(vec![order("stale-1", Some("pending"), &minute(1))]))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_page(vec![
            order("fresh-1", Some("pending"), &minute(2)),
        ])))
        .mount(&app.backend)
        .await;

    let early = {
        let client = app.client.clone();
        let url = app.url("/api/reports/selection?targetCount=3");
        tokio::spawn(async move {
            client
                .get(url)
                .bearer_auth(TEST_TOKEN)
                .send()
                .await
                .expect("request failed")
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let late = app.api_get("/api/reports/selection?targetCount=3").await;

    assert_eq!(late.status(), 200);
    let fresh: Value = late.json().await.unwrap();
    assert_eq!(picked_ids(&fresh), vec!["fresh-1"]);

    let early = early.await.expect("preview task panicked");
    assert_eq!(early.status(), 409);
    let body: Value = early.json().await.unwrap();
    assert_eq!(body["code"], "superseded");

    // The draft on file is the fresh one, not the late-arriving stale one.
    Mock::given(method("POST"))
        .and(path(PROCESS_PATH))
        .and(body_json(json!({ "reportIds": ["fresh-1"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .api_post(
            "/api/reports/dispatch",
            &json!({ "batchId": fresh["batchId"], "confirmedCount": 1 }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    // jobCount falls back to the submitted size when the backend omits it.
    assert_eq!(body["jobCount"], 1);
}
