use axum::http::StatusCode;
use serde_json::json;

use portal_backend::{
    config::{BookStackConfig, TimeoutConfig},
    integrations::{
        KnowledgeBase, adapters::bookstack::BookStackClient, error::IntegrationErrorKind,
    },
};

use crate::support::{Reply, closed_address, spawn_upstream};

fn client(base_url: &str, token_id: &str, token_secret: &str) -> BookStackClient {
    BookStackClient::new(
        &BookStackConfig {
            base_url: base_url.to_string(),
            token_id: token_id.to_string(),
            token_secret: token_secret.to_string(),
        },
        &TimeoutConfig::default(),
    )
}

fn results(count: usize) -> serde_json::Value {
    let data = (1..=count)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Page {id}"),
                "url": format!("http://bookstack/pages/{id}"),
                "type": "page",
                "preview_html": {"content": "..."},
            })
        })
        .collect::<Vec<_>>();
    json!({"data": data, "total": count})
}

#[tokio::test]
async fn given_results_when_searched_then_matches_are_trimmed_and_scored() {
    let (base_url, recorder) = spawn_upstream(Reply::ok(results(3))).await;

    let search = client(&base_url, "", "")
        .search("shift swap & leave")
        .await
        .expect("search should work");

    assert_eq!(search.matches.len(), 3);
    assert_eq!(search.matches[0].id, json!(1));
    assert_eq!(search.matches[0].name, "Page 1");
    assert_eq!(search.matches[0].url, "http://bookstack/pages/1");
    assert!((search.confidence - 0.6).abs() < 1e-9);

    let request = recorder.single();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/api/search");
    assert_eq!(request.query.as_deref(), Some("query=shift+swap+%26+leave"));
    assert_eq!(request.authorization, None);
}

#[tokio::test]
async fn given_result_with_string_id_and_null_name_when_searched_then_it_is_kept() {
    let (base_url, _) = spawn_upstream(Reply::ok(json!({"data": [
        {"id": "chapter-4", "name": null, "url": "http://bookstack/chapters/4"},
        {"id": 5, "name": "Rosters", "url": "http://bookstack/pages/5"},
    ]})))
    .await;

    let search = client(&base_url, "", "")
        .search("rosters")
        .await
        .expect("lenient ids must not fail the search");

    assert_eq!(search.matches.len(), 2);
    assert_eq!(search.matches[0].id, json!("chapter-4"));
    assert_eq!(search.matches[0].name, "");
    assert_eq!(search.matches[1].id, json!(5));
}

#[tokio::test]
async fn given_many_results_when_searched_then_confidence_caps_at_one() {
    let (base_url, _) = spawn_upstream(Reply::ok(results(10))).await;

    let search = client(&base_url, "", "")
        .search("rosters")
        .await
        .expect("search should work");

    assert_eq!(search.matches.len(), 10);
    assert_eq!(search.confidence, 1.0);
}

#[tokio::test]
async fn given_empty_reply_when_searched_then_confidence_is_zero() {
    let (base_url, _) = spawn_upstream(Reply::ok(json!({}))).await;

    let search = client(&base_url, "", "")
        .search("rosters")
        .await
        .expect("search should work");

    assert!(search.matches.is_empty());
    assert_eq!(search.confidence, 0.0);
}

#[tokio::test]
async fn given_api_token_configured_when_searched_then_token_header_is_sent() {
    let (base_url, recorder) = spawn_upstream(Reply::ok(results(1))).await;

    client(&base_url, "abc", "xyz")
        .search("rosters")
        .await
        .expect("search should work");

    assert_eq!(
        recorder.single().authorization.as_deref(),
        Some("Token abc:xyz")
    );
}

#[tokio::test]
async fn given_failures_when_searched_then_errors_are_classified() {
    let (base_url, _) = spawn_upstream(Reply::status(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let err = client(&base_url, "", "")
        .search("rosters")
        .await
        .expect_err("500 must fail");
    assert_eq!(err.to_string(), "BookStack error: 500");

    let err = client(&closed_address().await, "", "")
        .search("rosters")
        .await
        .expect_err("closed port must fail");
    assert_eq!(err.kind, IntegrationErrorKind::Transport);
}
