use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;

use crate::{
    config::{BookStackConfig, TimeoutConfig},
    integrations::{
        KnowledgeBase,
        error::{IntegrationResult, ServiceId},
        http_common,
        types::{FaqMatch, FaqSearch},
    },
    policy,
};

const SERVICE: ServiceId = ServiceId::BookStack;

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    data: Option<Vec<FaqMatch>>,
}

#[derive(Clone)]
pub struct BookStackClient {
    client: Client,
    base_url: String,
    auth_header: Option<String>,
    timeout: Duration,
}

impl BookStackClient {
    pub fn new(config: &BookStackConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            client: http_common::build_client(),
            base_url: config.base_url.clone(),
            auth_header: token_header(&config.token_id, &config.token_secret),
            timeout: timeouts.default_timeout(),
        }
    }
}

/// API tokens are optional; without both halves the wiki is queried anonymously.
fn token_header(token_id: &str, token_secret: &str) -> Option<String> {
    if token_id.is_empty() || token_secret.is_empty() {
        return None;
    }
    Some(format!("Token {token_id}:{token_secret}"))
}

#[async_trait]
impl KnowledgeBase for BookStackClient {
    async fn search(&self, query: &str) -> IntegrationResult<FaqSearch> {
        let mut request = self
            .client
            .get(http_common::join_url(&self.base_url, "/api/search"))
            .query(&[("query", query)]);
        if let Some(auth_header) = &self.auth_header {
            request = request.header(header::AUTHORIZATION, auth_header.clone());
        }

        let envelope: SearchEnvelope =
            http_common::call_json(SERVICE, request, self.timeout).await?;
        let matches = envelope.data.unwrap_or_default();
        let confidence = policy::confidence_for(matches.len());
        Ok(FaqSearch {
            matches,
            confidence,
        })
    }
}
