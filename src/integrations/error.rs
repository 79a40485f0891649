use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    NocoBase,
    Fider,
    BookStack,
    Ollama,
}

impl ServiceId {
    pub fn display_name(self) -> &'static str {
        match self {
            ServiceId::NocoBase => "NocoBase",
            ServiceId::Fider => "Fider",
            ServiceId::BookStack => "BookStack",
            ServiceId::Ollama => "Ollama",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationErrorKind {
    NotConfigured,
    InvalidRequest,
    Transport,
    Timeout,
    UpstreamStatus,
    Decode,
}

/// Failure of a single outbound call. Every client operation reports through
/// this type instead of panicking or leaking transport errors.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct IntegrationError {
    pub kind: IntegrationErrorKind,
    pub service: ServiceId,
    pub message: String,
    pub http_status: Option<u16>,
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

impl IntegrationError {
    pub fn new(kind: IntegrationErrorKind, service: ServiceId, message: impl Into<String>) -> Self {
        Self {
            kind,
            service,
            message: message.into(),
            http_status: None,
        }
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

pub fn not_configured(service: ServiceId, message: impl Into<String>) -> IntegrationError {
    IntegrationError::new(IntegrationErrorKind::NotConfigured, service, message)
}

pub fn invalid_request(service: ServiceId, message: impl Into<String>) -> IntegrationError {
    IntegrationError::new(IntegrationErrorKind::InvalidRequest, service, message)
}

pub fn upstream_status(service: ServiceId, status: u16) -> IntegrationError {
    IntegrationError::new(
        IntegrationErrorKind::UpstreamStatus,
        service,
        format!("{} error: {}", service, status),
    )
    .with_http_status(status)
}

pub fn transport_error(service: ServiceId, cause: impl fmt::Display) -> IntegrationError {
    IntegrationError::new(
        IntegrationErrorKind::Transport,
        service,
        format!("{} request failed: {}", service, cause),
    )
}

pub fn timeout_error(service: ServiceId, timeout_ms: u128) -> IntegrationError {
    IntegrationError::new(
        IntegrationErrorKind::Timeout,
        service,
        format!("{} request timed out after {}ms", service, timeout_ms),
    )
}

pub fn decode_error(service: ServiceId, cause: impl fmt::Display) -> IntegrationError {
    IntegrationError::new(
        IntegrationErrorKind::Decode,
        service,
        format!("{} request failed: invalid response body: {}", service, cause),
    )
}
