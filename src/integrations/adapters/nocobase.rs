use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{
    config::{NocoBaseConfig, TimeoutConfig},
    integrations::{
        DataPlatform,
        error::{IntegrationResult, ServiceId, not_configured},
        http_common::{self, deserialize_optional_id},
        types::{CreatedRecord, Issue, IssueDraft},
    },
};

const SERVICE: ServiceId = ServiceId::NocoBase;
const PUBLISHED_STATUS: &str = "published";
const UNKNOWN_ID: &str = "unknown";

#[derive(Debug, Default, Deserialize)]
struct CreatedEnvelope {
    #[serde(default)]
    data: Option<CreatedData>,
}

#[derive(Debug, Default, Deserialize)]
struct CreatedData {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IssueListEnvelope {
    #[serde(default)]
    data: Option<Vec<Issue>>,
}

#[derive(Clone)]
pub struct NocoBaseClient {
    client: Client,
    base_url: String,
    api_token: String,
    timeout: Duration,
    provisioning_timeout: Duration,
}

impl NocoBaseClient {
    pub fn new(config: &NocoBaseConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            client: http_common::build_client(),
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            timeout: timeouts.default_timeout(),
            provisioning_timeout: timeouts.provisioning_timeout(),
        }
    }

    fn ensure_token(&self) -> IntegrationResult<()> {
        if self.api_token.is_empty() {
            return Err(not_configured(SERVICE, "NOCOBASE_API_TOKEN is not set"));
        }
        Ok(())
    }

    fn post(&self, action: &str) -> RequestBuilder {
        self.client
            .post(http_common::join_url(&self.base_url, &format!("/api/{action}")))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_token))
    }

    async fn create_record(&self, collection: &str, values: Value) -> IntegrationResult<CreatedRecord> {
        self.ensure_token()?;
        let request = self
            .post(&format!("{collection}:create"))
            .json(&json!({ "values": values }));
        let envelope: CreatedEnvelope =
            http_common::call_json(SERVICE, request, self.timeout).await?;
        Ok(created_record(envelope))
    }
}

fn created_record(envelope: CreatedEnvelope) -> CreatedRecord {
    CreatedRecord {
        id: envelope
            .data
            .and_then(|data| data.id)
            .unwrap_or_else(|| UNKNOWN_ID.to_string()),
    }
}

fn collection_title(name: &str) -> String {
    name.replace('_', " ")
}

#[async_trait]
impl DataPlatform for NocoBaseClient {
    async fn create_submission(&self, payload: Value) -> IntegrationResult<CreatedRecord> {
        self.create_record("submissions", payload).await
    }

    async fn list_published_issues(&self) -> IntegrationResult<Vec<Issue>> {
        self.ensure_token()?;
        let request = self
            .client
            .get(http_common::join_url(&self.base_url, "/api/issues:list"))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_token))
            .query(&[("filter[status]", PUBLISHED_STATUS)]);
        let envelope: IssueListEnvelope =
            http_common::call_json(SERVICE, request, self.timeout).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn promote_submission(
        &self,
        submission_id: &str,
        draft: &IssueDraft,
    ) -> IntegrationResult<CreatedRecord> {
        let mut values = Map::new();
        values.insert("submissionId".into(), Value::String(submission_id.to_string()));
        if let Some(title) = &draft.title {
            values.insert("title".into(), Value::String(title.clone()));
        }
        if let Some(description) = &draft.description {
            values.insert("description".into(), Value::String(description.clone()));
        }
        values.insert("status".into(), Value::String(PUBLISHED_STATUS.to_string()));

        self.create_record("issues", Value::Object(values)).await
    }

    async fn attach_fider_link(&self, issue_id: &str, link: &str) -> IntegrationResult<()> {
        self.ensure_token()?;
        let request = self.post("issues:update").json(&json!({
            "values": { "fiderLink": link },
            "filterByTk": issue_id,
        }));
        http_common::call_status_only(SERVICE, request, self.timeout).await
    }

    async fn create_decision(&self, payload: Map<String, Value>) -> IntegrationResult<CreatedRecord> {
        self.create_record("decisions", Value::Object(payload)).await
    }

    async fn create_collection(&self, name: &str) -> IntegrationResult<()> {
        self.ensure_token()?;
        let request = self.post("collections:create").json(&json!({
            "values": {
                "name": name,
                "title": collection_title(name),
            }
        }));
        http_common::call_status_only(SERVICE, request, self.provisioning_timeout).await
    }
}
