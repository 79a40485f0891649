use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::support::{Harness, StubDataPlatform, send, send_raw};

#[tokio::test]
async fn given_stored_submission_when_intake_then_202_reports_nocobase_true() {
    let harness = Harness::default();
    let submission = json!({"workgroup": "ramp", "text": "lighting is poor", "urgent": true});

    let (status, response) = send(
        harness.app(),
        Method::POST,
        "/intake",
        None,
        Some(submission.clone()),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(response, json!({"accepted": true, "nocobase": true}));
    let forwarded = harness.data.submissions.lock().expect("lock").clone();
    assert_eq!(forwarded, vec![submission], "payload must be forwarded verbatim");
}

#[tokio::test]
async fn given_data_platform_failure_when_intake_then_still_202_with_nocobase_false() {
    let harness = Harness::default().with_data(StubDataPlatform::failing(&["create_submission"]));

    let (status, response) = send(
        harness.app(),
        Method::POST,
        "/intake",
        None,
        Some(json!({"text": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(response, json!({"accepted": true, "nocobase": false}));
}

#[tokio::test]
async fn given_missing_body_when_intake_then_empty_object_is_forwarded() {
    let harness = Harness::default();

    let (status, _) = send(harness.app(), Method::POST, "/intake", None, None).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let forwarded = harness.data.submissions.lock().expect("lock").clone();
    assert_eq!(forwarded, vec![json!({})]);
}

#[tokio::test]
async fn given_malformed_json_when_intake_then_400_and_nothing_is_stored() {
    let harness = Harness::default();

    let (status, response) = send_raw(harness.app(), "/intake", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.get("error").is_some());
    assert_eq!(harness.data.calls(), Vec::<String>::new());
}
