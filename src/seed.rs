//! One-shot provisioning of the data-platform collections the router relies on.

use anyhow::{Result, bail};

use crate::integrations::{DataPlatform, error::IntegrationErrorKind};

pub const COLLECTIONS: [&str; 10] = [
    "workgroups",
    "crews",
    "submissions",
    "issues",
    "occurrences",
    "decisions",
    "changes",
    "procedure_drafts",
    "consultation_comments",
    "known_pain_points",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<(String, String)>,
}

/// Creates each collection in order. A collection that fails (already exists,
/// upstream error) is skipped; a missing token aborts before any call.
pub async fn seed_collections(platform: &dyn DataPlatform) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for name in COLLECTIONS {
        match platform.create_collection(name).await {
            Ok(()) => {
                tracing::info!(target: "portal.seed", collection = name, "Created collection");
                report.created.push(name.to_string());
            }
            Err(err) if err.kind == IntegrationErrorKind::NotConfigured => {
                bail!("{err}");
            }
            Err(err) => {
                tracing::warn!(
                    target: "portal.seed",
                    collection = name,
                    error = %err,
                    "Skip collection"
                );
                report.skipped.push((name.to_string(), err.to_string()));
            }
        }
    }

    Ok(report)
}
