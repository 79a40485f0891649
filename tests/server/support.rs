use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{Map, Value};
use tower::ServiceExt;

use portal_backend::{
    config::ServerConfig,
    integrations::{
        DataPlatform, FeedbackTool, InferenceService, Integrations, KnowledgeBase,
        error::{IntegrationResult, ServiceId, transport_error, upstream_status},
        types::{CreatedRecord, FaqMatch, FaqSearch, FeedbackPost, Issue, IssueDraft, SummaryRequest},
    },
    policy,
    server::{AppState, router},
};

pub const PROMOTED_ISSUE_ID: &str = "issue-7";
pub const FIDER_POST_URL: &str = "http://fider.test/posts/better-rosters";

#[derive(Default)]
pub struct StubDataPlatform {
    pub failing: HashSet<&'static str>,
    pub issues: Vec<Issue>,
    pub calls: Mutex<Vec<String>>,
    pub submissions: Mutex<Vec<Value>>,
    pub promotions: Mutex<Vec<(String, IssueDraft)>>,
    pub attached_links: Mutex<Vec<(String, String)>>,
    pub decisions: Mutex<Vec<Map<String, Value>>>,
}

impl StubDataPlatform {
    pub fn failing(operations: &[&'static str]) -> Self {
        Self {
            failing: operations.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, operation: &'static str) -> IntegrationResult<()> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(operation.to_string());
        if self.failing.contains(operation) {
            return Err(upstream_status(ServiceId::NocoBase, 500));
        }
        Ok(())
    }
}

#[async_trait]
impl DataPlatform for StubDataPlatform {
    async fn create_submission(&self, payload: Value) -> IntegrationResult<CreatedRecord> {
        self.submissions
            .lock()
            .expect("submissions lock")
            .push(payload);
        self.record("create_submission")?;
        Ok(CreatedRecord {
            id: "sub-1".to_string(),
        })
    }

    async fn list_published_issues(&self) -> IntegrationResult<Vec<Issue>> {
        self.record("list_published_issues")?;
        Ok(self.issues.clone())
    }

    async fn promote_submission(
        &self,
        submission_id: &str,
        draft: &IssueDraft,
    ) -> IntegrationResult<CreatedRecord> {
        self.promotions
            .lock()
            .expect("promotions lock")
            .push((submission_id.to_string(), draft.clone()));
        self.record("promote_submission")?;
        Ok(CreatedRecord {
            id: PROMOTED_ISSUE_ID.to_string(),
        })
    }

    async fn attach_fider_link(&self, issue_id: &str, link: &str) -> IntegrationResult<()> {
        self.attached_links
            .lock()
            .expect("links lock")
            .push((issue_id.to_string(), link.to_string()));
        self.record("attach_fider_link")
    }

    async fn create_decision(&self, payload: Map<String, Value>) -> IntegrationResult<CreatedRecord> {
        self.decisions.lock().expect("decisions lock").push(payload);
        self.record("create_decision")?;
        Ok(CreatedRecord {
            id: "dec-1".to_string(),
        })
    }

    async fn create_collection(&self, _name: &str) -> IntegrationResult<()> {
        self.record("create_collection")
    }
}

#[derive(Default)]
pub struct StubFeedbackTool {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubFeedbackTool {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedbackTool for StubFeedbackTool {
    async fn create_issue(&self, _draft: &IssueDraft) -> IntegrationResult<FeedbackPost> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(upstream_status(ServiceId::Fider, 502));
        }
        Ok(FeedbackPost {
            url: FIDER_POST_URL.to_string(),
        })
    }
}

#[derive(Default)]
pub struct StubKnowledgeBase {
    pub fail: bool,
    pub matches: Vec<FaqMatch>,
    pub calls: AtomicUsize,
}

impl StubKnowledgeBase {
    pub fn with_matches(count: usize) -> Self {
        Self {
            matches: (1..=count)
                .map(|id| FaqMatch {
                    id: Value::from(id),
                    name: format!("Page {id}"),
                    url: format!("http://bookstack.test/pages/{id}"),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeBase for StubKnowledgeBase {
    async fn search(&self, _query: &str) -> IntegrationResult<FaqSearch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(transport_error(ServiceId::BookStack, "connection refused"));
        }
        Ok(FaqSearch {
            matches: self.matches.clone(),
            confidence: policy::confidence_for(self.matches.len()),
        })
    }
}

#[derive(Default)]
pub struct StubInference {
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl StubInference {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl InferenceService for StubInference {
    async fn summarize(&self, request: &SummaryRequest) -> IntegrationResult<String> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(request.prompt.clone());
        if self.fail {
            return Err(upstream_status(ServiceId::Ollama, 500));
        }
        Ok("Swap shifts through the roster page.".to_string())
    }
}

pub struct Harness {
    pub data: Arc<StubDataPlatform>,
    pub feedback: Arc<StubFeedbackTool>,
    pub knowledge: Arc<StubKnowledgeBase>,
    pub inference: Arc<StubInference>,
    pub api_key: String,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            data: Arc::new(StubDataPlatform::default()),
            feedback: Arc::new(StubFeedbackTool::default()),
            knowledge: Arc::new(StubKnowledgeBase::default()),
            inference: Arc::new(StubInference::default()),
            api_key: String::new(),
        }
    }
}

impl Harness {
    pub fn with_data(mut self, data: StubDataPlatform) -> Self {
        self.data = Arc::new(data);
        self
    }

    pub fn with_feedback(mut self, feedback: StubFeedbackTool) -> Self {
        self.feedback = Arc::new(feedback);
        self
    }

    pub fn with_knowledge(mut self, knowledge: StubKnowledgeBase) -> Self {
        self.knowledge = Arc::new(knowledge);
        self
    }

    pub fn with_inference(mut self, inference: StubInference) -> Self {
        self.inference = Arc::new(inference);
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    pub fn app(&self) -> Router {
        let integrations = Integrations {
            data_platform: self.data.clone(),
            feedback_tool: self.feedback.clone(),
            knowledge_base: self.knowledge.clone(),
            inference: self.inference.clone(),
        };
        let server = ServerConfig {
            api_key: self.api_key.clone(),
            ..ServerConfig::default()
        };
        router::build(AppState::new(integrations, &server))
    }
}

/// Sends `body` verbatim with a JSON content type.
pub async fn send_raw(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request should build");
    into_parts(app.oneshot(request).await.expect("router should respond")).await
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(api_key) = api_key {
        builder = builder.header("x-api-key", api_key);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };

    into_parts(app.oneshot(request).await.expect("router should respond")).await
}

async fn into_parts(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .expect("body should be readable");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
