use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::integrations::http_common::{deserialize_id, deserialize_nullable_string};

/// Issue record as stored in the data platform. `title` and `status` are
/// passed through as-is, null included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Title and description shared by promotion and feedback-tool posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IssueDraft {
    /// Title only when it is present and non-empty.
    pub fn usable_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecord {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackPost {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqMatch {
    #[serde(default)]
    pub id: Value,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaqSearch {
    pub matches: Vec<FaqMatch>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub prompt: String,
}
