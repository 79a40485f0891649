use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::{FiderConfig, TimeoutConfig},
    integrations::{
        FeedbackTool,
        error::{IntegrationResult, ServiceId, invalid_request},
        http_common,
        types::{FeedbackPost, IssueDraft},
    },
};

const SERVICE: ServiceId = ServiceId::Fider;

#[derive(Debug, Default, Deserialize)]
struct CreatedPost {
    #[serde(default)]
    slug: Option<String>,
}

#[derive(Clone)]
pub struct FiderClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl FiderClient {
    pub fn new(config: &FiderConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            client: http_common::build_client(),
            base_url: config.base_url.clone(),
            api_key: Some(config.api_key.clone()).filter(|key| !key.is_empty()),
            timeout: timeouts.default_timeout(),
        }
    }

    pub fn post_url(&self, slug: &str) -> String {
        http_common::join_url(&self.base_url, &format!("/posts/{slug}"))
    }
}

#[async_trait]
impl FeedbackTool for FiderClient {
    async fn create_issue(&self, draft: &IssueDraft) -> IntegrationResult<FeedbackPost> {
        let title = draft
            .usable_title()
            .ok_or_else(|| invalid_request(SERVICE, "Title is required"))?;

        let mut request = self
            .client
            .post(http_common::join_url(&self.base_url, "/api/v1/posts"))
            .json(&json!({
                "title": title,
                "description": draft.description.as_deref().unwrap_or_default(),
            }));
        if let Some(api_key) = &self.api_key {
            request = request.header(header::AUTHORIZATION, format!("Bearer {api_key}"));
        }

        let created: CreatedPost = http_common::call_json(SERVICE, request, self.timeout).await?;
        Ok(FeedbackPost {
            url: self.post_url(created.slug.as_deref().unwrap_or_default()),
        })
    }
}
