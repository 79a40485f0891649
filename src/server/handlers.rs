//! Endpoint handlers. Downstream failures are logged and masked as neutral
//! successful responses; only request validation produces a client error.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    integrations::types::{FaqMatch, Issue, IssueDraft, SummaryRequest},
    policy,
    server::{body::JsonBody, state::AppState},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeResponse {
    pub accepted: bool,
    pub nocobase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuesResponse {
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoteResponse {
    pub promoted: bool,
    #[serde(rename = "fiderLink")]
    pub fider_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub ok: bool,
    pub escalated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqCheckResponse {
    pub matches: Vec<FaqMatch>,
    pub summary: Option<String>,
    pub confident: bool,
}

impl FaqCheckResponse {
    fn empty() -> Self {
        Self {
            matches: Vec::new(),
            summary: None,
            confident: false,
        }
    }
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn intake(
    State(state): State<AppState>,
    JsonBody(submission): JsonBody,
) -> (StatusCode, Json<IntakeResponse>) {
    let created = state
        .integrations
        .data_platform
        .create_submission(submission)
        .await;

    if let Err(err) = &created {
        tracing::warn!(
            target: "portal.router",
            service = %err.service,
            error = %err,
            "Failed to store submission in NocoBase"
        );
    }

    (
        StatusCode::ACCEPTED,
        Json(IntakeResponse {
            accepted: true,
            nocobase: created.is_ok(),
        }),
    )
}

pub async fn list_issues(State(state): State<AppState>) -> Json<IssuesResponse> {
    match state.integrations.data_platform.list_published_issues().await {
        Ok(issues) => Json(IssuesResponse { issues }),
        Err(err) => {
            tracing::warn!(
                target: "portal.router",
                service = %err.service,
                error = %err,
                "Failed to load issues from NocoBase"
            );
            Json(IssuesResponse { issues: Vec::new() })
        }
    }
}

/// Promote a submission, then mirror it to the feedback tool and link the two.
/// Each step runs only if the one before it succeeded; the response is always 200.
pub async fn promote(
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Json<PromoteResponse> {
    let draft = IssueDraft {
        title: string_field(&body, "title"),
        description: string_field(&body, "description"),
    };
    let integrations = &state.integrations;

    let promoted = integrations
        .data_platform
        .promote_submission(&submission_id, &draft)
        .await;
    let issue = match promoted {
        Ok(issue) => issue,
        Err(err) => {
            tracing::warn!(
                target: "portal.router",
                submission_id = %submission_id,
                error = %err,
                "Failed to promote submission in NocoBase"
            );
            return Json(PromoteResponse {
                promoted: false,
                fider_link: None,
            });
        }
    };

    if draft.usable_title().is_none() {
        return Json(PromoteResponse {
            promoted: true,
            fider_link: None,
        });
    }

    let post = match integrations.feedback_tool.create_issue(&draft).await {
        Ok(post) => post,
        Err(err) => {
            tracing::warn!(
                target: "portal.router",
                submission_id = %submission_id,
                issue_id = %issue.id,
                error = %err,
                "Failed to create Fider post"
            );
            return Json(PromoteResponse {
                promoted: true,
                fider_link: None,
            });
        }
    };

    if let Err(err) = integrations
        .data_platform
        .attach_fider_link(&issue.id, &post.url)
        .await
    {
        tracing::warn!(
            target: "portal.router",
            issue_id = %issue.id,
            fider_link = %post.url,
            error = %err,
            "Failed to attach Fider link to issue"
        );
    }

    Json(PromoteResponse {
        promoted: true,
        fider_link: Some(post.url),
    })
}

pub async fn decision(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Json<DecisionResponse> {
    let status = policy::classify_payload(&body);

    let mut payload = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    payload.insert(
        "status".to_string(),
        Value::String(status.as_str().to_string()),
    );

    let saved = state.integrations.data_platform.create_decision(payload).await;
    if let Err(err) = &saved {
        tracing::warn!(
            target: "portal.router",
            status = status.as_str(),
            error = %err,
            "Failed to store decision in NocoBase"
        );
    }

    Json(DecisionResponse {
        ok: saved.is_ok(),
        escalated: status.is_escalated(),
    })
}

pub async fn faq_check(State(state): State<AppState>, JsonBody(body): JsonBody) -> Response {
    let Some(question) = string_field(&body, "question").filter(|question| !question.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "question is required" })),
        )
            .into_response();
    };

    let search = match state.integrations.knowledge_base.search(&question).await {
        Ok(search) => search,
        Err(err) => {
            tracing::warn!(
                target: "portal.router",
                service = %err.service,
                error = %err,
                "BookStack search failed"
            );
            return Json(FaqCheckResponse::empty()).into_response();
        }
    };

    let confident = policy::is_confident(search.confidence);
    let mut summary = None;
    if confident && !search.matches.is_empty() {
        let request = SummaryRequest {
            prompt: policy::summary_prompt(&search.matches, &question),
        };
        match state.integrations.inference.summarize(&request).await {
            Ok(text) => summary = Some(text),
            Err(err) => {
                tracing::warn!(
                    target: "portal.router",
                    service = %err.service,
                    error = %err,
                    "Ollama summarization failed"
                );
            }
        }
    }

    Json(FaqCheckResponse {
        matches: search.matches,
        summary,
        confident,
    })
    .into_response()
}
