pub mod adapters;
pub mod error;
pub mod http_common;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{
    config::Config,
    integrations::{
        error::IntegrationResult,
        types::{CreatedRecord, FaqSearch, FeedbackPost, Issue, IssueDraft, SummaryRequest},
    },
};

/// Low-code data platform holding submissions, issues and decisions.
#[async_trait]
pub trait DataPlatform: Send + Sync {
    async fn create_submission(&self, payload: Value) -> IntegrationResult<CreatedRecord>;

    async fn list_published_issues(&self) -> IntegrationResult<Vec<Issue>>;

    async fn promote_submission(
        &self,
        submission_id: &str,
        draft: &IssueDraft,
    ) -> IntegrationResult<CreatedRecord>;

    async fn attach_fider_link(&self, issue_id: &str, link: &str) -> IntegrationResult<()>;

    async fn create_decision(&self, payload: Map<String, Value>) -> IntegrationResult<CreatedRecord>;

    async fn create_collection(&self, name: &str) -> IntegrationResult<()>;
}

/// Public voting tool that receives promoted issues.
#[async_trait]
pub trait FeedbackTool: Send + Sync {
    async fn create_issue(&self, draft: &IssueDraft) -> IntegrationResult<FeedbackPost>;
}

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn search(&self, query: &str) -> IntegrationResult<FaqSearch>;
}

#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> IntegrationResult<String>;
}

/// The four downstream capabilities the router composes.
#[derive(Clone)]
pub struct Integrations {
    pub data_platform: Arc<dyn DataPlatform>,
    pub feedback_tool: Arc<dyn FeedbackTool>,
    pub knowledge_base: Arc<dyn KnowledgeBase>,
    pub inference: Arc<dyn InferenceService>,
}

impl Integrations {
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_platform: Arc::new(adapters::nocobase::NocoBaseClient::new(
                &config.nocobase,
                &config.timeouts,
            )),
            feedback_tool: Arc::new(adapters::fider::FiderClient::new(
                &config.fider,
                &config.timeouts,
            )),
            knowledge_base: Arc::new(adapters::bookstack::BookStackClient::new(
                &config.bookstack,
                &config.timeouts,
            )),
            inference: Arc::new(adapters::ollama::OllamaClient::new(
                &config.ollama,
                &config.timeouts,
            )),
        }
    }
}
